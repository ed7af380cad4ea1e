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

use aiplatform_auth::credentials::{Builder, Credentials, CredentialsProvider, from_info};
use aiplatform_auth::errors::CredentialsError;
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use scoped_env::ScopedEnv;
use serde_json::json;
use std::io::Write;

type Result<T> = std::result::Result<T, CredentialsError>;

#[derive(Debug)]
struct FixedCredentials;

impl CredentialsProvider for FixedCredentials {
    async fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer fixed"));
        Ok(headers)
    }

    async fn universe_domain(&self) -> Option<String> {
        None
    }
}

#[tokio::test]
async fn custom_provider() -> anyhow::Result<()> {
    let credentials = Credentials::from(FixedCredentials);
    let clone = credentials.clone();
    let headers = clone.headers().await?;
    assert_eq!(
        headers.get(AUTHORIZATION),
        Some(&HeaderValue::from_static("Bearer fixed"))
    );
    assert!(credentials.credential_info().is_none());
    let fmt = format!("{credentials:?}");
    assert!(fmt.contains("FixedCredentials"), "{fmt}");
    Ok(())
}

#[test]
#[serial_test::serial]
fn adc_env_is_not_a_file() {
    let _e = ScopedEnv::set("GOOGLE_APPLICATION_CREDENTIALS", "file-does-not-exist.json");
    let err = Builder::default().build().unwrap_err();
    assert!(err.is_loading(), "{err:?}");
}

#[test]
#[serial_test::serial]
fn adc_malformed_is_error() -> anyhow::Result<()> {
    for contents in ["{}", r#"{"type": 42}"#, "not-json"] {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        let path = file.path().to_string_lossy().to_string();
        let _e = ScopedEnv::set("GOOGLE_APPLICATION_CREDENTIALS", &path);
        let err = Builder::default().build().unwrap_err();
        assert!(err.is_parsing(), "{contents}: {err:?}");
    }
    Ok(())
}

#[test]
#[serial_test::serial]
fn adc_unknown_type() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(br#"{"type": "some_unknown_credential_type"}"#)?;
    let path = file.path().to_string_lossy().to_string();
    let _e = ScopedEnv::set("GOOGLE_APPLICATION_CREDENTIALS", &path);
    let err = Builder::default().build().unwrap_err();
    assert!(err.is_unknown_type(), "{err:?}");
    assert!(
        err.to_string().contains("some_unknown_credential_type"),
        "{err}"
    );
    Ok(())
}

#[test]
#[serial_test::serial]
fn adc_authorized_user_project_hint() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    let contents = json!({
        "type": "authorized_user",
        "client_id": "test-client-id",
        "client_secret": "test-client-secret",
        "refresh_token": "test-refresh-token",
        "quota_project_id": "test-quota-project",
    });
    file.write_all(contents.to_string().as_bytes())?;
    let path = file.path().to_string_lossy().to_string();
    let _e = ScopedEnv::set("GOOGLE_APPLICATION_CREDENTIALS", &path);
    let _p = ScopedEnv::remove("GOOGLE_CLOUD_PROJECT");
    let (credentials, project) = Builder::default().build_with_project_id()?;
    assert_eq!(project.as_deref(), Some("test-quota-project"));
    let info = credentials.credential_info().unwrap();
    assert_eq!(info["credential_type"], "user credentials");
    Ok(())
}

#[tokio::test]
async fn api_key_with_quota_project() -> anyhow::Result<()> {
    let credentials =
        aiplatform_auth::credentials::from_api_key("test-api-key").with_quota_project("qp");
    let headers = credentials.headers().await?;
    assert_eq!(
        headers.get("x-goog-api-key"),
        Some(&HeaderValue::from_static("test-api-key"))
    );
    assert_eq!(
        headers.get("x-goog-user-project"),
        Some(&HeaderValue::from_static("qp"))
    );
    Ok(())
}

#[test]
fn from_info_missing_type() {
    let err = from_info(json!({})).unwrap_err();
    assert!(err.is_parsing(), "{err:?}");
}
