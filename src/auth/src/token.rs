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

//! Access tokens and the providers that mint them.

use crate::Result;
use crate::errors::{self, CredentialsError, is_retryable};
use std::time::Duration;
use tokio::time::Instant;

/// An access token, or an API key, ready to attach to a request.
#[derive(Clone, PartialEq)]
pub struct Token {
    /// The secret. Never logged, see the `Debug` implementation.
    pub token: String,

    /// The scheme for the `authorization` header, usually `Bearer`.
    ///
    /// Empty for API keys, which use a separate header.
    pub token_type: String,

    /// When the token stops being valid, `None` if it never expires.
    ///
    /// Uses the tokio clock, so paused-time tests can expire tokens.
    pub expires_at: Option<Instant>,
}

impl Token {
    /// True if the token is expired, or expires in less than `margin`.
    pub(crate) fn expires_within(&self, margin: Duration) -> bool {
        match self.expires_at {
            None => false,
            Some(at) => at <= Instant::now() + margin,
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[censored]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The successful response from an OAuth 2.0 token endpoint.
#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "bearer_type")]
    token_type: String,
    expires_in: Option<u64>,
}

fn bearer_type() -> String {
    "Bearer".to_string()
}

/// Sends `request` to a token endpoint and decodes the access token.
///
/// Failed requests are transient when the status code suggests so. A body
/// that is not a token response is a permanent error.
pub(crate) async fn fetch(request: reqwest::RequestBuilder) -> Result<Token> {
    let response = request.send().await.map_err(errors::retryable)?;
    let status = response.status();
    if !status.is_success() {
        let transient = is_retryable(status);
        let body = response
            .text()
            .await
            .map_err(|e| CredentialsError::from_source(transient, e))?;
        return Err(CredentialsError::from_msg(
            transient,
            format!("the token endpoint returned {status}: {body}"),
        ));
    }
    let body = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| CredentialsError::from_source(!e.is_decode(), e))?;
    Ok(Token {
        token: body.access_token,
        token_type: body.token_type,
        expires_at: body
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    })
}

/// Mints new tokens. Wrapped by the token cache, which decides when to call it.
#[async_trait::async_trait]
pub(crate) trait TokenProvider: std::fmt::Debug + Send + Sync {
    async fn token(&self) -> Result<Token>;
}
