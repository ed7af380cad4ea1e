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

//! Errors returned by [Credentials][crate::credentials::Credentials].
//!
//! Every error says whether retrying the same credential operation may
//! succeed. Clients use this to decide between another attempt and
//! surfacing an authentication error to the application.

use http::StatusCode;
use std::error::Error;

pub use gax::error::CredentialsError;

/// Token endpoints answering with these codes may succeed later.
pub(crate) fn is_retryable(code: StatusCode) -> bool {
    match code {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::NOT_IMPLEMENTED | StatusCode::BAD_GATEWAY => false,
        c => c.is_server_error(),
    }
}

pub(crate) fn retryable<E>(source: E) -> CredentialsError
where
    E: Error + Send + Sync + 'static,
{
    CredentialsError::from_source(true, source)
}

pub(crate) fn non_retryable<E>(source: E) -> CredentialsError
where
    E: Error + Send + Sync + 'static,
{
    CredentialsError::from_source(false, source)
}

pub(crate) fn non_retryable_from_str<M: Into<String>>(message: M) -> CredentialsError {
    CredentialsError::from_msg(false, message)
}
