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

//! Credentials for a person, backed by an OAuth 2.0 refresh token.
//!
//! `gcloud auth application-default login` writes these credentials to the
//! well-known ADC file. Applications rarely build them directly, the ADC
//! loader in [crate::credentials::Builder] does it for them.
//!
//! ```
//! # use aiplatform_auth::credentials::user_account::Builder;
//! let authorized_user = serde_json::json!({
//!     "type": "authorized_user",
//!     "client_id": "my-client.apps.googleusercontent.com",
//!     "client_secret": "my-client-secret",
//!     "refresh_token": "my-refresh-token",
//! });
//! let credentials = Builder::new(authorized_user)
//!     .with_quota_project_id("my-billing-project")
//!     .build()?;
//! # Ok::<(), aiplatform_auth::build_errors::Error>(())
//! ```

use crate::build_errors::Error as BuilderError;
use crate::constants::{DEFAULT_UNIVERSE_DOMAIN, OAUTH2_TOKEN_ENDPOINT};
use crate::credentials::{Credentials, CredentialsProvider, Source};
use crate::headers_util::build_bearer_headers;
use crate::token::{self, Token, TokenProvider};
use crate::token_cache::TokenCache;
use crate::{BuildResult, Result};
use http::HeaderMap;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Builds user account [Credentials] from an `authorized_user` JSON object.
#[derive(Clone)]
pub struct Builder {
    json: Value,
    scopes: Vec<String>,
    quota_project_id: Option<String>,
    token_uri: Option<String>,
    source: Option<PathBuf>,
}

impl Builder {
    pub fn new(authorized_user: Value) -> Self {
        Self {
            json: authorized_user,
            scopes: Vec::new(),
            quota_project_id: None,
            token_uri: None,
            source: None,
        }
    }

    /// Overrides the token endpoint, including any `token_uri` in the JSON.
    pub fn with_token_uri<S: Into<String>>(mut self, v: S) -> Self {
        self.token_uri = Some(v.into());
        self
    }

    /// Requests tokens restricted to these [scopes].
    ///
    /// [scopes]: https://developers.google.com/identity/protocols/oauth2/scopes
    pub fn with_scopes<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = v.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the quota project, including any `quota_project_id` in the
    /// JSON.
    pub fn with_quota_project_id<S: Into<String>>(mut self, v: S) -> Self {
        self.quota_project_id = Some(v.into());
        self
    }

    pub(crate) fn with_credential_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }

    /// # Errors
    ///
    /// Returns a parsing error if the JSON lacks the client id, the client
    /// secret, or the refresh token.
    pub fn build(self) -> BuildResult<Credentials> {
        let origin = Source::UserAccount(self.clone());
        let file: AuthorizedUserFile =
            serde_json::from_value(self.json).map_err(BuilderError::parsing)?;
        let provider = RefreshTokenProvider {
            endpoint: self
                .token_uri
                .or(file.token_uri)
                .unwrap_or_else(|| OAUTH2_TOKEN_ENDPOINT.to_string()),
            scopes: (!self.scopes.is_empty()).then(|| self.scopes.join(" ")),
            client_id: file.client_id,
            client_secret: file.client_secret,
            refresh_token: file.refresh_token,
        };
        Ok(Credentials::from(UserCredentials {
            tokens: TokenCache::new(provider),
            quota_project_id: self.quota_project_id.or(file.quota_project_id),
            source: self.source,
        })
        .with_source(origin))
    }
}

/// The fields used from an `authorized_user` file. Others are ignored.
#[derive(serde::Deserialize)]
struct AuthorizedUserFile {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token_uri: Option<String>,
    quota_project_id: Option<String>,
}

struct RefreshTokenProvider {
    endpoint: String,
    scopes: Option<String>,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl RefreshTokenProvider {
    fn body(&self) -> Value {
        let mut body = json!({
            "grant_type": "refresh_token",
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "refresh_token": self.refresh_token,
        });
        if let Some(scopes) = &self.scopes {
            body["scopes"] = json!(scopes);
        }
        body
    }
}

impl std::fmt::Debug for RefreshTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenProvider")
            .field("endpoint", &self.endpoint)
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[censored]")
            .field("refresh_token", &"[censored]")
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn token(&self) -> Result<Token> {
        let request = reqwest::Client::new()
            .post(&self.endpoint)
            .json(&self.body());
        token::fetch(request).await
    }
}

#[derive(Debug)]
struct UserCredentials<T> {
    tokens: T,
    quota_project_id: Option<String>,
    source: Option<PathBuf>,
}

impl<T> CredentialsProvider for UserCredentials<T>
where
    T: TokenProvider + 'static,
{
    async fn headers(&self) -> Result<HeaderMap> {
        let token = self.tokens.token().await?;
        build_bearer_headers(&token, &self.quota_project_id)
    }

    // User credentials only work in the default universe.
    async fn universe_domain(&self) -> Option<String> {
        Some(DEFAULT_UNIVERSE_DOMAIN.to_string())
    }

    fn credential_info(&self) -> Option<Value> {
        let mut info = json!({"credential_type": "user credentials"});
        if let Some(path) = &self.source {
            info["credential_source"] = json!(path.to_string_lossy());
        }
        Some(info)
    }
}
