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

//! [Service Account] Credentials type.
//!
//! A service account is an account for an application or compute workload
//! instead of an individual end user. Sometimes you may need to create and
//! download a [service account key], for example, to use a service account
//! when running your application on a system that is not part of Google Cloud.
//!
//! You can create multiple service account keys for a single service account.
//! When you create a service account key, the key is returned as string, in the
//! format described by [aip/4112]. This string contains an id for the service
//! account, as well as the cryptographical materials (a RSA private key)
//! required to authenticate the caller.
//!
//! Therefore, services account keys should be treated as any other secret
//! with security implications. Think of them as unencrypted passwords. Do not
//! store them where unauthorized persons or programs may read them.
//!
//! By default, the credentials in this module use [Self-signed JWTs] to bypass
//! the intermediate step of exchanging client assertions for OAuth tokens.
//! Use [Builder::with_jwt_access] to exchange the assertion at the token
//! endpoint instead.
//!
//! Example usage:
//!
//! ```
//! # use aiplatform_auth::credentials::service_account::{AccessSpecifier, Builder};
//! let key = serde_json::json!({
//!     "client_email": "test-client-email",
//!     "private_key_id": "test-private-key-id",
//!     "private_key": "", // <-- Provide valid PKCS#8 PEM key here
//!     "project_id": "test-project-id",
//! });
//! let credentials = Builder::new(key)
//!     .with_access_specifier(AccessSpecifier::from_audience("https://aiplatform.googleapis.com/"))
//!     .with_quota_project_id("my-quota-project")
//!     .build()?;
//! # Ok::<(), aiplatform_auth::build_errors::Error>(())
//! ```
//!
//! [aip/4112]: https://google.aip.dev/auth/4112
//! [Self-signed JWTs]: https://google.aip.dev/auth/4111
//! [Service Account]: https://cloud.google.com/iam/docs/service-account-creds
//! [service account key]: https://cloud.google.com/iam/docs/keys-create-delete#creating

mod jws;

use crate::build_errors::Error as BuilderError;
use crate::constants::{
    DEFAULT_SCOPE, DEFAULT_UNIVERSE_DOMAIN, JWT_BEARER_GRANT_TYPE, OAUTH2_TOKEN_ENDPOINT,
};
use crate::credentials::{Credentials, CredentialsProvider, Source};
use crate::errors;
use crate::headers_util::build_bearer_headers;
use crate::token::{Token, TokenProvider};
use crate::token_cache::TokenCache;
use crate::{BuildResult, Result};
use http::HeaderMap;
use jws::{CLOCK_SKEW_FUDGE, DEFAULT_TOKEN_TIMEOUT, JwsClaims};
use rustls::crypto::CryptoProvider;
use rustls::sign::Signer;
use rustls_pki_types::{PrivateKeyDer, pem::PemObject};
use serde_json::Value;
use std::path::PathBuf;
use time::OffsetDateTime;
use tokio::time::Instant;

/// How the credentials restrict the access granted by their tokens.
///
/// A self-signed JWT carries either a `scope` claim or an `aud` claim, never
/// both.
#[derive(Clone, Debug, PartialEq)]
pub enum AccessSpecifier {
    /// The token is valid for a single service, for example
    /// `https://aiplatform.googleapis.com/`.
    Audience(String),
    /// The token is valid for the given [scopes].
    ///
    /// [scopes]: https://developers.google.com/identity/protocols/oauth2/scopes
    Scopes(Vec<String>),
}

impl AccessSpecifier {
    /// Restricts the token to one audience.
    pub fn from_audience<S: Into<String>>(audience: S) -> Self {
        AccessSpecifier::Audience(audience.into())
    }

    /// Restricts the token to the given scopes.
    pub fn from_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessSpecifier::Scopes(scopes.into_iter().map(|s| s.into()).collect())
    }
}

impl Default for AccessSpecifier {
    fn default() -> Self {
        AccessSpecifier::Scopes(vec![DEFAULT_SCOPE.to_string()])
    }
}

/// A builder for service account [Credentials].
#[derive(Clone)]
pub struct Builder {
    service_account_key: Value,
    access_specifier: AccessSpecifier,
    quota_project_id: Option<String>,
    jwt_access: bool,
    token_uri: Option<String>,
    credential_source: Option<PathBuf>,
}

impl Builder {
    /// Creates a new builder from the [service account key] JSON.
    ///
    /// [service account key]: https://cloud.google.com/iam/docs/keys-create-delete#creating
    pub fn new(service_account_key: Value) -> Self {
        Self {
            service_account_key,
            access_specifier: AccessSpecifier::default(),
            quota_project_id: None,
            jwt_access: true,
            token_uri: None,
            credential_source: None,
        }
    }

    /// Sets the audience or scopes of the tokens.
    ///
    /// The default is the `cloud-platform` scope.
    pub fn with_access_specifier(mut self, access_specifier: AccessSpecifier) -> Self {
        self.access_specifier = access_specifier;
        self
    }

    /// Set the [quota project] for these credentials.
    ///
    /// In some services, you can use a service account in
    /// one project for authentication and authorization, and charge
    /// the usage to a different project. This may require that the
    /// service account has `serviceusage.services.use` permissions on the quota project.
    ///
    /// [quota project]: https://cloud.google.com/docs/quotas/quota-project
    pub fn with_quota_project_id<S: Into<String>>(mut self, quota_project_id: S) -> Self {
        self.quota_project_id = Some(quota_project_id.into());
        self
    }

    /// Use self-signed JWTs (the default) or exchange the signed assertion for
    /// an OAuth access token.
    ///
    /// Tokens for an [AccessSpecifier::Audience] are always self-signed.
    pub fn with_jwt_access(mut self, v: bool) -> Self {
        self.jwt_access = v;
        self
    }

    /// Overrides the token endpoint used when exchanging assertions.
    ///
    /// Any value provided here overrides the `token_uri` in the key.
    pub fn with_token_uri<S: Into<String>>(mut self, token_uri: S) -> Self {
        self.token_uri = Some(token_uri.into());
        self
    }

    pub(crate) fn with_credential_source(mut self, path: PathBuf) -> Self {
        self.credential_source = Some(path);
        self
    }

    /// Returns a [Credentials] instance with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns a parsing error if the key is malformed, or missing required
    /// fields.
    pub fn build(self) -> BuildResult<Credentials> {
        let origin = Source::ServiceAccount(self.clone());
        let key = serde_json::from_value::<ServiceAccountKey>(self.service_account_key)
            .map_err(BuilderError::parsing)?;
        let token_uri = self
            .token_uri
            .or_else(|| key.token_uri.clone())
            .unwrap_or_else(|| OAUTH2_TOKEN_ENDPOINT.to_string());
        let mode = match self.access_specifier {
            AccessSpecifier::Audience(aud) => TokenMode::SelfSignedAudience(aud),
            AccessSpecifier::Scopes(scopes) if self.jwt_access => {
                TokenMode::SelfSignedScopes(scopes.join(" "))
            }
            AccessSpecifier::Scopes(scopes) => TokenMode::Exchange {
                scopes: scopes.join(" "),
                token_uri,
            },
        };
        let principal = key.client_email.clone();
        let universe_domain = key
            .universe_domain
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_UNIVERSE_DOMAIN.to_string());
        let token_provider = ServiceAccountTokenProvider {
            service_account_key: key,
            mode,
        };
        Ok(Credentials::from(ServiceAccountCredentials {
            token_provider: TokenCache::new(token_provider),
            quota_project_id: self.quota_project_id,
            universe_domain,
            principal,
            credential_source: self.credential_source,
        })
        .with_source(origin))
    }
}

/// A representation of a [service account key] in the format described by [aip/4112].
///
/// [aip/4112]: https://google.aip.dev/auth/4112
/// [service account key]: https://cloud.google.com/iam/docs/keys-create-delete#creating
#[derive(serde::Deserialize, Clone, PartialEq)]
pub(crate) struct ServiceAccountKey {
    client_email: String,
    #[serde(default)]
    private_key_id: Option<String>,
    private_key: String,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    universe_domain: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[censored]")
            .field("project_id", &self.project_id)
            .field("universe_domain", &self.universe_domain)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TokenMode {
    SelfSignedAudience(String),
    SelfSignedScopes(String),
    Exchange { scopes: String, token_uri: String },
}

#[derive(Debug)]
struct ServiceAccountTokenProvider {
    service_account_key: ServiceAccountKey,
    mode: TokenMode,
}

#[async_trait::async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn token(&self) -> Result<Token> {
        match &self.mode {
            TokenMode::SelfSignedAudience(aud) => self.self_signed(None, Some(aud.clone())),
            TokenMode::SelfSignedScopes(scopes) => self.self_signed(Some(scopes.clone()), None),
            TokenMode::Exchange { scopes, token_uri } => self.exchange(scopes, token_uri).await,
        }
    }
}

impl ServiceAccountTokenProvider {
    fn self_signed(&self, scope: Option<String>, aud: Option<String>) -> Result<Token> {
        let expires_at = Instant::now() - CLOCK_SKEW_FUDGE + DEFAULT_TOKEN_TIMEOUT;
        let token = self.assertion(scope, aud)?;
        Ok(Token {
            token,
            token_type: "Bearer".to_string(),
            expires_at: Some(expires_at),
        })
    }

    async fn exchange(&self, scopes: &str, token_uri: &str) -> Result<Token> {
        let assertion = self.assertion(Some(scopes.to_string()), Some(token_uri.to_string()))?;
        let form = [
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ];
        crate::token::fetch(reqwest::Client::new().post(token_uri).form(&form)).await
    }

    // Builds a signed JWT with either claim restriction.
    fn assertion(&self, scope: Option<String>, aud: Option<String>) -> Result<String> {
        let signer = self.signer(&self.service_account_key.private_key)?;

        // Claims carry unix timestamps, `Instant` has no epoch.
        let email = self.service_account_key.client_email.as_str();
        let claims = JwsClaims {
            scope: scope.as_deref(),
            aud: aud.as_deref(),
            ..JwsClaims::new(email, OffsetDateTime::now_utc())
        };
        let input = jws::signing_input(
            self.service_account_key.private_key_id.as_deref(),
            &claims,
        )?;
        let signature = signer
            .sign(input.as_bytes())
            .map_err(errors::non_retryable)?;
        Ok(jws::assemble(input, &signature))
    }

    // Creates a signer using the private key stored in the service account file.
    fn signer(&self, private_key: &str) -> Result<Box<dyn Signer>> {
        let key_provider = CryptoProvider::get_default().map_or_else(
            || rustls::crypto::aws_lc_rs::default_provider().key_provider,
            |p| p.key_provider,
        );

        let private_key =
            PrivateKeyDer::from_pem_slice(private_key.as_bytes()).map_err(errors::non_retryable)?;
        let pk = match private_key {
            PrivateKeyDer::Pkcs8(_) => key_provider.load_private_key(private_key),
            other => {
                return Err(errors::non_retryable_from_str(format!(
                    "expected key to be in form of PKCS8, found {}",
                    key_format(&other)
                )));
            }
        };
        let sk = pk.map_err(errors::non_retryable)?;
        sk.choose_scheme(&[rustls::SignatureScheme::RSA_PKCS1_SHA256])
            .ok_or_else(|| {
                errors::non_retryable_from_str(
                    "unable to choose RSA_PKCS1_SHA256 signing scheme as it is not supported by current signer",
                )
            })
    }
}

fn key_format(key: &PrivateKeyDer<'_>) -> &'static str {
    match key {
        PrivateKeyDer::Pkcs1(_) => "Pkcs1",
        PrivateKeyDer::Sec1(_) => "Sec1",
        PrivateKeyDer::Pkcs8(_) => "Pkcs8",
        _ => "unknown",
    }
}

#[derive(Debug)]
struct ServiceAccountCredentials<T>
where
    T: TokenProvider,
{
    token_provider: T,
    quota_project_id: Option<String>,
    universe_domain: String,
    principal: String,
    credential_source: Option<PathBuf>,
}

impl<T> CredentialsProvider for ServiceAccountCredentials<T>
where
    T: TokenProvider + 'static,
{
    async fn headers(&self) -> Result<HeaderMap> {
        let token = self.token_provider.token().await?;
        build_bearer_headers(&token, &self.quota_project_id)
    }

    async fn universe_domain(&self) -> Option<String> {
        Some(self.universe_domain.clone())
    }

    fn credential_info(&self) -> Option<Value> {
        let mut info = serde_json::Map::new();
        if let Some(path) = &self.credential_source {
            info.insert(
                "credential_source".to_string(),
                Value::String(path.to_string_lossy().into_owned()),
            );
        }
        info.insert(
            "credential_type".to_string(),
            Value::String("service account credentials".to_string()),
        );
        info.insert(
            "principal".to_string(),
            Value::String(self.principal.clone()),
        );
        Some(Value::Object(info))
    }
}
