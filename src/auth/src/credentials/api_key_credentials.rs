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

//! Credentials that send an [API key] instead of an access token.
//!
//! Vertex AI accepts API keys for the prediction and generation methods. The
//! key identifies the project for billing and quota, there is no principal.
//!
//! [API key]: https://cloud.google.com/docs/authentication/api-keys-use

use crate::Result;
use crate::credentials::{Credentials, CredentialsProvider};
use crate::headers_util::build_api_key_headers;
use crate::token::Token;
use http::HeaderMap;
use serde_json::{Value, json};

/// Builds [Credentials] that authenticate with an API key.
///
/// ```
/// # use aiplatform_auth::credentials::api_key_credentials::Builder;
/// let credentials = Builder::new("my-api-key")
///     .with_quota_project_id("my-billing-project")
///     .build();
/// ```
#[derive(Debug)]
pub struct Builder {
    key: ApiKey,
    quota_project_id: Option<String>,
}

impl Builder {
    pub fn new<T: Into<String>>(api_key: T) -> Self {
        Self {
            key: ApiKey(api_key.into()),
            quota_project_id: None,
        }
    }

    /// Bills the calls to a [quota project] other than the key's project.
    ///
    /// [quota project]: https://cloud.google.com/docs/quotas/quota-project
    pub fn with_quota_project_id<T: Into<String>>(mut self, quota_project_id: T) -> Self {
        self.quota_project_id = Some(quota_project_id.into());
        self
    }

    pub fn build(self) -> Credentials {
        Credentials::from(ApiKeyCredentials {
            key: self.key,
            quota_project_id: self.quota_project_id,
        })
    }
}

struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[censored]")
    }
}

#[derive(Debug)]
struct ApiKeyCredentials {
    key: ApiKey,
    quota_project_id: Option<String>,
}

impl CredentialsProvider for ApiKeyCredentials {
    // API keys do not expire, there is nothing to cache or refresh.
    async fn headers(&self) -> Result<HeaderMap> {
        let token = Token {
            token: self.key.0.clone(),
            token_type: String::new(),
            expires_at: None,
        };
        build_api_key_headers(&token, &self.quota_project_id)
    }

    async fn universe_domain(&self) -> Option<String> {
        None
    }

    fn credential_info(&self) -> Option<Value> {
        Some(json!({"credential_type": "API key"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{API_KEY_HEADER_KEY, QUOTA_PROJECT_KEY};
    use http::HeaderValue;

    #[test]
    fn debug_censors_key() {
        let credentials = Builder::new("super-secret-api-key").build();
        let fmt = format!("{credentials:?}");
        assert!(!fmt.contains("super-secret-api-key"), "{fmt}");
        assert!(fmt.contains("[censored]"), "{fmt}");
    }

    #[tokio::test]
    async fn headers() -> anyhow::Result<()> {
        let credentials = Builder::new("test-api-key").build();
        let headers = credentials.headers().await?;
        assert_eq!(headers.len(), 1, "{headers:?}");
        let value = headers.get(API_KEY_HEADER_KEY);
        assert_eq!(value, Some(&HeaderValue::from_static("test-api-key")));
        assert!(value.is_some_and(HeaderValue::is_sensitive), "{value:?}");
        assert!(headers.get(http::header::AUTHORIZATION).is_none(), "{headers:?}");
        assert_eq!(credentials.universe_domain().await, None);
        Ok(())
    }

    #[tokio::test]
    async fn quota_project() -> anyhow::Result<()> {
        let credentials = Builder::new("test-api-key")
            .with_quota_project_id("billing")
            .build();
        let headers = credentials.headers().await?;
        assert_eq!(headers.len(), 2, "{headers:?}");
        let quota = headers.get(QUOTA_PROJECT_KEY);
        assert_eq!(quota, Some(&HeaderValue::from_static("billing")));
        assert!(!quota.is_some_and(HeaderValue::is_sensitive), "{quota:?}");
        Ok(())
    }

    #[test]
    fn diagnostics() {
        let credentials = Builder::new("test-api-key").build();
        assert_eq!(
            credentials.credential_info(),
            Some(json!({"credential_type": "API key"}))
        );
    }
}
