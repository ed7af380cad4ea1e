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

use crate::Result;
use crate::token::{Token, TokenProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

// Refresh tokens slightly before they expire, requests may take a while to
// reach the service.
const REFRESH_MARGIN: Duration = Duration::from_secs(10);

/// Caches the tokens returned by a [TokenProvider].
///
/// At most one refresh runs at a time. Callers arriving during a refresh wait
/// for it and share its token. Errors are not cached, the next caller starts a
/// new refresh.
#[derive(Debug)]
pub(crate) struct TokenCache<T>
where
    T: TokenProvider,
{
    current: Arc<Mutex<Option<Token>>>,
    inner: Arc<T>,
}

// Implemented manually, the derived version would require `T: Clone`.
impl<T: TokenProvider> Clone for TokenCache<T> {
    fn clone(&self) -> TokenCache<T> {
        TokenCache {
            current: self.current.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: TokenProvider> TokenCache<T> {
    pub fn new(inner: T) -> TokenCache<T> {
        TokenCache {
            current: Arc::new(Mutex::new(None)),
            inner: Arc::new(inner),
        }
    }
}

#[async_trait::async_trait]
impl<T: TokenProvider + 'static> TokenProvider for TokenCache<T> {
    async fn token(&self) -> Result<Token> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| !t.expires_within(REFRESH_MARGIN)) {
            return Ok(token.clone());
        }
        tracing::debug!("refreshing access token");
        let token = self.inner.token().await?;
        *current = Some(token.clone());
        Ok(token)
    }
}
