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

use std::error::Error;
use std::fmt::{Debug, Display, Formatter, Result};
use std::sync::Arc;

/// Represents an error using [Credentials] to create authentication headers.
///
/// Problems creating credentials (e.g. a malformed key file) are reported at
/// client construction. This type represents problems *using* credentials,
/// for example, a temporary failure to refresh an [access token]. These
/// errors can happen long after the credentials were successfully loaded.
///
/// # Example
/// ```
/// # use aiplatform_gax::error::CredentialsError;
/// let err = CredentialsError::from_msg(
///     true, "simulated retryable error while trying to create credentials");
/// assert!(err.is_transient());
/// assert!(format!("{err}").contains("simulated retryable error"));
/// ```
///
/// [access token]: https://cloud.google.com/docs/authentication/token-types
/// [Credentials]: https://docs.rs/aiplatform-auth/latest/auth/credentials/struct.Credentials.html
#[derive(Clone, Debug)]
pub struct CredentialsError {
    is_transient: bool,
    message: Option<String>,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl CredentialsError {
    /// Creates a new `CredentialsError` wrapping `source`.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::error::CredentialsError;
    /// # use aiplatform_gax::error::Error;
    /// let err = CredentialsError::from_source(
    ///     false, Error::io("simulated non-retryable error while trying to create credentials"));
    /// assert!(!err.is_transient());
    /// assert!(format!("{err}").contains("simulated non-retryable error"));
    /// ```
    pub fn from_source<T: Error + Send + Sync + 'static>(is_transient: bool, source: T) -> Self {
        CredentialsError {
            is_transient,
            message: None,
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new `CredentialsError` with a message and a source.
    pub fn new<M, T>(is_transient: bool, message: M, source: T) -> Self
    where
        M: Into<String>,
        T: Error + Send + Sync + 'static,
    {
        CredentialsError {
            is_transient,
            message: Some(message.into()),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new `CredentialsError` from a message.
    pub fn from_msg<T: Into<String>>(is_transient: bool, message: T) -> Self {
        CredentialsError {
            is_transient,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Returns `true` if the error is transient and future attempts may succeed.
    pub fn is_transient(&self) -> bool {
        self.is_transient
    }
}

impl std::error::Error for CredentialsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|arc| arc.as_ref() as &(dyn std::error::Error + 'static))
    }
}

const TRANSIENT_MSG: &str = "but future attempts may succeed";
const PERMANENT_MSG: &str = "and future attempts will not succeed";

impl Display for CredentialsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let msg = if self.is_transient {
            TRANSIENT_MSG
        } else {
            PERMANENT_MSG
        };
        match (&self.message, &self.source) {
            (Some(m), Some(s)) => write!(f, "cannot create auth headers, {msg}: {m}, source: {s}"),
            (Some(m), None) => write!(f, "cannot create auth headers, {msg}: {m}"),
            (None, Some(s)) => write!(f, "cannot create auth headers, {msg}, source: {s}"),
            (None, None) => write!(f, "cannot create auth headers, {msg}"),
        }
    }
}
