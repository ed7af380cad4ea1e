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

use crate::build_errors::Error as BuilderError;
use crate::constants::{
    GOOGLE_APPLICATION_CREDENTIALS_VAR, GOOGLE_CLOUD_PROJECT_VAR, GOOGLE_CLOUD_QUOTA_PROJECT_VAR,
};
use crate::{BuildResult, Result};
use http::HeaderMap;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod api_key_credentials;
pub mod service_account;
pub mod user_account;

/// An implementation of [crate::credentials::CredentialsProvider].
///
/// Represents a [Credentials] used to obtain the auth request headers.
///
/// In general, [Credentials][credentials-link] are "digital object that provide
/// proof of identity", the archetype may be a username and password
/// combination, but a private RSA key may be a better example.
///
/// Modern authentication protocols do not send the credentials to
/// authenticate with a service. Even when sent over encrypted transports,
/// the credentials may be accidentally exposed via logging or may be
/// captured if there are errors in the transport encryption. Because the
/// credentials are often long-lived, that risk of exposure is also
/// long-lived.
///
/// Instead, modern authentication protocols exchange the credentials for a
/// time-limited [Token][token-link], a digital object that shows the caller
/// was in possession of the credentials. Because tokens are time limited,
/// risk of misuse is also time limited.
///
/// Credentials are cheap to clone, all the clones share the same token cache
/// and may be used from multiple tasks.
///
/// [credentials-link]: https://cloud.google.com/docs/authentication#credentials
/// [token-link]: https://cloud.google.com/docs/authentication#token
#[derive(Clone, Debug)]
pub struct Credentials {
    inner: Arc<dyn dynamic::CredentialsProvider>,
    source: Option<Source>,
}

impl<T> std::convert::From<T> for Credentials
where
    T: CredentialsProvider + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            source: None,
        }
    }
}

impl Credentials {
    /// Returns the headers used to authenticate a request.
    ///
    /// The headers always include one authentication header, and may include
    /// the quota project header.
    pub async fn headers(&self) -> Result<HeaderMap> {
        self.inner.headers().await
    }

    /// The universe domain these credentials are valid for, if known.
    pub async fn universe_domain(&self) -> Option<String> {
        self.inner.universe_domain().await
    }

    /// Diagnostic information about the credentials.
    ///
    /// The client libraries attach this information to authentication and
    /// authorization errors. It never contains secrets.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_auth::credentials::api_key_credentials;
    /// let credentials = api_key_credentials::Builder::new("my-api-key").build();
    /// let info = credentials.credential_info();
    /// assert_eq!(info.as_ref().and_then(|v| v["credential_type"].as_str()), Some("API key"));
    /// ```
    pub fn credential_info(&self) -> Option<Value> {
        self.inner.credential_info()
    }

    /// Returns credentials that bill usage to `project`.
    ///
    /// The returned credentials share the token cache with `self`.
    pub fn with_quota_project<V: Into<String>>(self, project: V) -> Credentials {
        let project = project.into();
        let source = self
            .source
            .map(|s| s.with_quota_project_id(project.clone()));
        Credentials {
            inner: Arc::new(QuotaProjectOverride {
                inner: self.inner,
                project,
            }),
            source,
        }
    }

    /// Returns credentials restricted to `scopes`.
    ///
    /// Only credentials created from a service account key or a user account
    /// can be rescoped. Other credentials are returned unchanged. The
    /// returned credentials have a new token cache.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_auth::credentials::from_api_key;
    /// let credentials = from_api_key("my-api-key")
    ///     .with_scopes(["https://www.googleapis.com/auth/cloud-platform"]);
    /// ```
    pub fn with_scopes<I, S>(self, scopes: I) -> Credentials
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes = scopes.into_iter().map(Into::into).collect::<Vec<String>>();
        self.rebuild(|source| match source {
            Source::ServiceAccount(b) => Some(Source::ServiceAccount(
                b.with_access_specifier(service_account::AccessSpecifier::from_scopes(scopes)),
            )),
            Source::UserAccount(b) => Some(Source::UserAccount(b.with_scopes(scopes))),
        })
    }

    /// Prefer self-signed JWTs over exchanging an assertion for an access
    /// token.
    ///
    /// Only service account credentials support self-signed JWTs, all other
    /// credentials are returned unchanged.
    pub fn with_jwt_access(self, v: bool) -> Credentials {
        self.rebuild(|source| match source {
            Source::ServiceAccount(b) => Some(Source::ServiceAccount(b.with_jwt_access(v))),
            Source::UserAccount(_) => None,
        })
    }

    pub(crate) fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    fn rebuild<F>(self, f: F) -> Credentials
    where
        F: FnOnce(Source) -> Option<Source>,
    {
        let Some(source) = self.source.clone().and_then(f) else {
            return self;
        };
        match source.build() {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("cannot rebuild credentials, using the originals: {e}");
                self
            }
        }
    }
}

/// The builder that created a [Credentials], kept so they can be rescoped.
#[derive(Clone)]
pub(crate) enum Source {
    ServiceAccount(service_account::Builder),
    UserAccount(user_account::Builder),
}

impl Source {
    fn with_quota_project_id(self, project: String) -> Self {
        match self {
            Self::ServiceAccount(b) => Self::ServiceAccount(b.with_quota_project_id(project)),
            Self::UserAccount(b) => Self::UserAccount(b.with_quota_project_id(project)),
        }
    }

    fn build(self) -> BuildResult<Credentials> {
        match self {
            Self::ServiceAccount(b) => b.build(),
            Self::UserAccount(b) => b.build(),
        }
    }
}

// The builders hold private keys and refresh tokens.
impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceAccount(_) => f.write_str("ServiceAccount"),
            Self::UserAccount(_) => f.write_str("UserAccount"),
        }
    }
}

/// Represents a [Credentials] used to obtain auth request headers.
///
/// In general, [Credentials][credentials-link] are "digital object that
/// provide proof of identity", the archetype may be a username and password
/// combination, but a private RSA key may be a better example.
///
/// Applications rarely need to implement this trait directly. Tests may mock
/// it to control the authentication headers.
///
/// [credentials-link]: https://cloud.google.com/docs/authentication#credentials
pub trait CredentialsProvider: std::fmt::Debug {
    /// Asynchronously constructs the auth headers.
    fn headers(&self) -> impl Future<Output = Result<HeaderMap>> + Send;

    /// Retrieves the universe domain associated with the credentials, if any.
    fn universe_domain(&self) -> impl Future<Output = Option<String>> + Send;

    /// Diagnostic information, attached to authentication errors.
    fn credential_info(&self) -> Option<Value> {
        None
    }
}

pub(crate) mod dynamic {
    use super::Result;
    use http::HeaderMap;
    use serde_json::Value;

    /// A dyn-compatible, crate-private version of `CredentialsProvider`.
    #[async_trait::async_trait]
    pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
        async fn headers(&self) -> Result<HeaderMap>;
        async fn universe_domain(&self) -> Option<String>;
        fn credential_info(&self) -> Option<Value>;
    }

    /// The public CredentialsProvider implements the dyn-compatible CredentialsProvider.
    #[async_trait::async_trait]
    impl<T> CredentialsProvider for T
    where
        T: super::CredentialsProvider + Send + Sync,
    {
        async fn headers(&self) -> Result<HeaderMap> {
            T::headers(self).await
        }
        async fn universe_domain(&self) -> Option<String> {
            T::universe_domain(self).await
        }
        fn credential_info(&self) -> Option<Value> {
            T::credential_info(self)
        }
    }
}

#[derive(Debug)]
struct QuotaProjectOverride {
    inner: Arc<dyn dynamic::CredentialsProvider>,
    project: String,
}

impl CredentialsProvider for QuotaProjectOverride {
    async fn headers(&self) -> Result<HeaderMap> {
        let mut headers = self.inner.headers().await?;
        crate::headers_util::set_quota_project(&mut headers, &self.project)?;
        Ok(headers)
    }

    async fn universe_domain(&self) -> Option<String> {
        self.inner.universe_domain().await
    }

    fn credential_info(&self) -> Option<Value> {
        self.inner.credential_info()
    }
}

/// Creates credentials from an in-memory JSON descriptor.
///
/// The descriptor must contain a `type` field, either `service_account` or
/// `authorized_user`.
///
/// # Example
/// ```
/// # use aiplatform_auth::credentials::from_info;
/// let err = from_info(serde_json::json!({"type": "unknown"})).unwrap_err();
/// assert!(err.is_unknown_type());
/// ```
pub fn from_info(json: Value) -> BuildResult<Credentials> {
    Builder::default().build_from_info(json)
}

/// Loads credentials from a JSON file.
pub fn from_file<P: AsRef<Path>>(path: P) -> BuildResult<Credentials> {
    Builder::default().build_from_file(path)
}

/// Creates credentials that authenticate using an API key.
pub fn from_api_key<V: Into<String>>(api_key: V) -> Credentials {
    api_key_credentials::Builder::new(api_key).build()
}

/// A builder for [Application Default Credentials].
///
/// The builder looks for credentials, in order:
/// 1. The file named by the `GOOGLE_APPLICATION_CREDENTIALS` environment
///    variable.
/// 2. The file created by `gcloud auth application-default login`.
///
/// The quota project is, in order of precedence, the value set in the
/// builder, the `GOOGLE_CLOUD_QUOTA_PROJECT` environment variable, or the
/// value in the credentials file.
///
/// # Example
/// ```no_run
/// # use aiplatform_auth::credentials::Builder;
/// let (credentials, project) = Builder::default()
///     .with_scopes(["https://www.googleapis.com/auth/cloud-platform"])
///     .build_with_project_id()?;
/// println!("project hint: {project:?}");
/// # Ok::<(), aiplatform_auth::build_errors::Error>(())
/// ```
///
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials
#[derive(Clone, Debug, Default)]
pub struct Builder {
    scopes: Option<Vec<String>>,
    quota_project_id: Option<String>,
    jwt_access: Option<bool>,
    audience: Option<String>,
}

impl Builder {
    /// Sets the OAuth scopes for the credentials.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(|s| s.into()).collect());
        self
    }

    /// Sets the [quota project] for the credentials.
    ///
    /// [quota project]: https://cloud.google.com/docs/quotas/quota-project
    pub fn with_quota_project_id<S: Into<String>>(mut self, quota_project_id: S) -> Self {
        self.quota_project_id = Some(quota_project_id.into());
        self
    }

    /// Prefer self-signed JWTs when the credentials support them.
    ///
    /// This is ignored by credentials types without JWT support.
    pub fn with_jwt_access(mut self, v: bool) -> Self {
        self.jwt_access = Some(v);
        self
    }

    /// Sets the audience for self-signed JWTs.
    ///
    /// This is ignored by credentials types without JWT support.
    pub fn with_audience<S: Into<String>>(mut self, v: S) -> Self {
        self.audience = Some(v.into());
        self
    }

    /// Discovers the Application Default Credentials.
    pub fn build(self) -> BuildResult<Credentials> {
        Ok(self.build_with_project_id()?.0)
    }

    /// Discovers the Application Default Credentials and a project hint.
    ///
    /// The project hint is the `GOOGLE_CLOUD_PROJECT` environment variable,
    /// or the project found in the credentials file.
    pub fn build_with_project_id(self) -> BuildResult<(Credentials, Option<String>)> {
        let path = adc_path().ok_or_else(|| {
            BuilderError::loading(
                "no application default credentials found, set GOOGLE_APPLICATION_CREDENTIALS or run `gcloud auth application-default login`",
            )
        })?;
        let json = load_json(&path)?;
        let project = std::env::var(GOOGLE_CLOUD_PROJECT_VAR)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| string_field(&json, "project_id"))
            .or_else(|| string_field(&json, "quota_project_id"));
        let credentials = self.build_from_json(json, Some(path))?;
        Ok((credentials, project))
    }

    /// Creates credentials from an in-memory JSON descriptor.
    pub fn build_from_info(self, json: Value) -> BuildResult<Credentials> {
        self.build_from_json(json, None)
    }

    /// Loads credentials from a JSON file.
    pub fn build_from_file<P: AsRef<Path>>(self, path: P) -> BuildResult<Credentials> {
        let path = path.as_ref().to_path_buf();
        let json = load_json(&path)?;
        self.build_from_json(json, Some(path))
    }

    fn build_from_json(self, json: Value, source: Option<PathBuf>) -> BuildResult<Credentials> {
        let quota_project_id = self.quota_project_id.or_else(|| {
            std::env::var(GOOGLE_CLOUD_QUOTA_PROJECT_VAR)
                .ok()
                .filter(|p| !p.is_empty())
        });
        let cred_type = json
            .get("type")
            .ok_or_else(|| BuilderError::parsing("missing `type` field in credentials"))?
            .as_str()
            .ok_or_else(|| BuilderError::parsing("`type` field is not a string"))?
            .to_string();
        match cred_type.as_str() {
            "service_account" => {
                let mut builder = service_account::Builder::new(json);
                if let Some(aud) = self.audience {
                    builder = builder
                        .with_access_specifier(service_account::AccessSpecifier::from_audience(aud));
                } else if let Some(scopes) = self.scopes {
                    builder = builder
                        .with_access_specifier(service_account::AccessSpecifier::from_scopes(scopes));
                }
                if let Some(v) = self.jwt_access {
                    builder = builder.with_jwt_access(v);
                }
                if let Some(p) = quota_project_id {
                    builder = builder.with_quota_project_id(p);
                }
                if let Some(s) = source {
                    builder = builder.with_credential_source(s);
                }
                builder.build()
            }
            "authorized_user" => {
                let mut builder = user_account::Builder::new(json);
                if let Some(scopes) = self.scopes {
                    builder = builder.with_scopes(scopes);
                }
                if let Some(p) = quota_project_id {
                    builder = builder.with_quota_project_id(p);
                }
                if let Some(s) = source {
                    builder = builder.with_credential_source(s);
                }
                builder.build()
            }
            _ => Err(BuilderError::unknown_type(cred_type)),
        }
    }
}

fn load_json(path: &Path) -> BuildResult<Value> {
    let contents = std::fs::read_to_string(path).map_err(BuilderError::loading)?;
    serde_json::from_str(&contents).map_err(BuilderError::parsing)
}

fn string_field(json: &Value, name: &str) -> Option<String> {
    json.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn adc_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(GOOGLE_APPLICATION_CREDENTIALS_VAR) {
        return Some(PathBuf::from(path));
    }
    let path = adc_well_known_path()?;
    path.exists().then_some(path)
}

fn adc_well_known_path() -> Option<PathBuf> {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").ok()?;
        Some(PathBuf::from(appdata).join("gcloud/application_default_credentials.json"))
    } else {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config/gcloud/application_default_credentials.json"))
    }
}
