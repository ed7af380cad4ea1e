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

use aiplatform_gax::error::rpc::{Code, Status, StatusDetails};
use aiplatform_gax::error::{CredentialsError, Error};
use std::error::Error as _;

static_assertions::assert_impl_all!(Error: Send, Sync, std::error::Error);
static_assertions::assert_impl_all!(Status: Clone, Send, Sync);

#[derive(Debug, thiserror::Error)]
#[error("leaf error")]
struct LeafError;

#[test]
fn source_chain() {
    let error = Error::io(LeafError);
    let leaf = error.source().and_then(|e| e.downcast_ref::<LeafError>());
    assert!(leaf.is_some(), "{error:?}");
    assert!(error.is_io(), "{error:?}");
}

#[test]
fn authentication_is_not_a_service_error() {
    let error = Error::authentication(CredentialsError::from_msg(false, "bad key"));
    assert!(error.is_authentication(), "{error:?}");
    assert!(error.status().is_none(), "{error:?}");
    assert!(error.code().is_none(), "{error:?}");
}

#[test]
fn credential_info_on_rejection() {
    let status = Status::default()
        .set_code(Code::PermissionDenied)
        .set_message("denied");
    let error = Error::service(status).with_credential_info(r#"{"principal":"x"}"#);
    let details = error.status().map(|s| s.details.clone()).unwrap_or_default();
    assert_eq!(
        details,
        vec![StatusDetails::CredentialInfo(r#"{"principal":"x"}"#.to_string())]
    );
}

#[test]
fn operation_error() {
    let status = Status::default()
        .set_code(Code::FailedPrecondition)
        .set_message("model not ready");
    let error = Error::operation(status.clone());
    assert!(error.is_operation(), "{error:?}");
    assert_eq!(error.status(), Some(&status));
    assert_eq!(error.code(), Some(Code::FailedPrecondition));
}
