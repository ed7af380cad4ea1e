// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Installing a process-wide crypto provider changes how service account
//! keys are loaded. The provider can be installed only once, so this test
//! lives in its own binary.

use aiplatform_auth::credentials::service_account;
use rustls::crypto::{CryptoProvider, KeyProvider};
use rustls::pki_types::PrivateKeyDer;
use rustls::sign::SigningKey;
use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const REJECTED: &str = "key rejected by the installed provider";

#[derive(Debug)]
struct RejectingKeys {
    calls: AtomicUsize,
}

impl KeyProvider for RejectingKeys {
    fn load_private_key(
        &self,
        _key_der: PrivateKeyDer<'static>,
    ) -> Result<Arc<dyn SigningKey>, rustls::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(rustls::Error::General(REJECTED.to_string()))
    }
}

static KEYS: RejectingKeys = RejectingKeys {
    calls: AtomicUsize::new(0),
};

#[tokio::test]
async fn service_account_uses_installed_provider() -> anyhow::Result<()> {
    let provider = CryptoProvider {
        key_provider: &KEYS,
        ..rustls::crypto::aws_lc_rs::default_provider()
    };
    provider
        .install_default()
        .map_err(|_| anyhow::anyhow!("a crypto provider is already installed"))?;

    let creds = service_account::Builder::new(serde_json::json!({
        "client_email": "vertex-runner@my-project.iam.gserviceaccount.com",
        "private_key_id": "key-0001",
        "private_key": include_str!("../testdata/test_key_pkcs8.pem"),
        "project_id": "my-project",
    }))
    .build()?;

    let err = creds
        .headers()
        .await
        .expect_err("the installed key provider rejects every key");
    assert!(!err.is_transient(), "{err:?}");
    let got = err.source().and_then(|e| e.downcast_ref::<rustls::Error>());
    assert!(
        matches!(got, Some(rustls::Error::General(m)) if m == REJECTED),
        "{err:?}"
    );
    assert!(KEYS.calls.load(Ordering::SeqCst) >= 1);
    Ok(())
}
