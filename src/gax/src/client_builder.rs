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

//! The generic builder behind every `Client::builder()`.
//!
//! Vertex AI is served from regional endpoints, so most applications at
//! least set the endpoint. The builder also selects credentials, the
//! universe domain, the transport, and the default policies for every call
//! made through the client. Options set on a single request override the
//! client defaults.
//!
//! ```
//! # use aiplatform_gax::client_builder::examples;
//! # use aiplatform_gax::client_builder::Result;
//! # tokio_test::block_on(async {
//! use examples::Client; // stands in for a generated client
//! let client = Client::builder()
//!     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
//!     .with_quota_project("my-billing-project")
//!     .build()
//!     .await?;
//! # Result::<()>::Ok(()) });
//! ```

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg};
use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyArg};
use crate::retry_policy::{RetryPolicy, RetryPolicyArg};
use std::path::PathBuf;
use std::sync::Arc;

/// The result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Indicates a problem while constructing a client.
///
/// These errors are raised before any network I/O. None of them are retried.
///
/// # Examples
/// ```no_run
/// # use aiplatform_gax::client_builder::examples;
/// use aiplatform_gax::client_builder::Error as Error;
/// use examples::Client; // Placeholder for examples
/// # tokio_test::block_on(async {
/// let client = match Client::builder().build().await {
///     Ok(c) => c,
///     Err(e) if e.is_default_credentials() => {
///         println!("error loading the default credentials: {e}");
///         return Err(e);
///     }
///     Err(e) if e.is_config() => {
///         println!("invalid client configuration: {e}");
///         return Err(e);
///     }
///     Err(e) => {
///         println!("error during client initialization {e}");
///         return Err(e);
///     }
/// };
/// # Ok::<(), Error>(()) });
/// ```
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// If true, the client configuration is invalid.
    ///
    /// Examples include incompatible options, a bad value in one of the
    /// environment variables controlling endpoint selection, or an empty
    /// universe domain.
    pub fn is_config(&self) -> bool {
        matches!(&self.0, ErrorKind::Config(_))
    }

    /// If true, the client could not initialize the default credentials.
    pub fn is_default_credentials(&self) -> bool {
        matches!(&self.0, ErrorKind::DefaultCredentials(_))
    }

    /// If true, the client could not initialize the transport client.
    pub fn is_transport(&self) -> bool {
        matches!(&self.0, ErrorKind::Transport(_))
    }

    /// If true, the requested option is not supported by the transport.
    pub fn is_unsupported(&self) -> bool {
        matches!(&self.0, ErrorKind::Unsupported(_))
    }

    /// Not part of the public API, subject to change without notice.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn config<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Config(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn cred<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::DefaultCredentials(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn transport<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Transport(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn unsupported<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Unsupported(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("invalid client configuration: {0}")]
    Config(#[source] BoxError),
    #[error("could not create default credentials")]
    DefaultCredentials(#[source] BoxError),
    #[error("could not initialize transport client")]
    Transport(#[source] BoxError),
    #[error("unsupported client option: {0}")]
    Unsupported(#[source] BoxError),
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The wire protocol used by a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportKind {
    /// Length-prefixed protobuf frames over HTTP/2.
    #[default]
    Grpc,
    /// JSON over HTTPS.
    Rest,
}

/// A client certificate and its private key, both PEM encoded.
#[derive(Clone, PartialEq)]
pub struct ClientCertificate {
    /// The certificate chain, starting with the leaf certificate.
    pub cert_chain: Vec<u8>,
    /// The private key matching the leaf certificate.
    pub private_key: Vec<u8>,
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("cert_chain", &format!("[{} bytes]", self.cert_chain.len()))
            .field("private_key", &"[censored]")
            .finish()
    }
}

/// Produces the client certificate used in mutual TLS handshakes.
///
/// The source is consulted once, when the client is built.
pub trait ClientCertSource: Send + Sync + std::fmt::Debug {
    /// Returns the certificate chain and private key.
    fn client_certificate(&self) -> std::result::Result<ClientCertificate, BoxError>;
}

impl ClientCertSource for ClientCertificate {
    fn client_certificate(&self) -> std::result::Result<ClientCertificate, BoxError> {
        Ok(self.clone())
    }
}

/// A pre-built transport, such as a gRPC channel or an HTTP client.
///
/// A transport instance is self-contained: it already carries any credentials,
/// so it cannot be combined with credential options.
#[derive(Clone)]
pub struct TransportInstance(Arc<dyn std::any::Any + Send + Sync>);

impl TransportInstance {
    /// Wraps a transport-specific object.
    pub fn new<T: std::any::Any + Send + Sync>(v: T) -> Self {
        Self(Arc::new(v))
    }

    /// Returns the wrapped object, if it has the requested type.
    pub fn downcast_ref<T: std::any::Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for TransportInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportInstance").finish_non_exhaustive()
    }
}

/// A generic builder for clients.
///
/// Each client library defines one or more client types. All the clients are
/// initialized using a `ClientBuilder`.
///
/// Applications obtain a builder with the correct generic types using the
/// `builder()` method on each client:
/// ```
/// # use aiplatform_gax::client_builder::examples;
/// # use aiplatform_gax::client_builder::Result;
/// # tokio_test::block_on(async {
/// use examples::Client; // Placeholder for examples
/// let builder = Client::builder();
/// # Result::<()>::Ok(()) });
/// ```
///
/// The builder offers several methods to configure the client, and a
/// `.build()` method to construct the client:
/// ```
/// # use aiplatform_gax::client_builder::examples;
/// # use aiplatform_gax::client_builder::Result;
/// # tokio_test::block_on(async {
/// use examples::Client; // Placeholder for examples
/// let client = Client::builder()
///     .with_universe_domain("my-universe.example.com")
///     .with_quota_project("my-project")
///     .build().await?;
/// # Result::<()>::Ok(()) });
/// ```
#[derive(Clone, Debug)]
pub struct ClientBuilder<F, Cr> {
    config: internal::ClientConfig<Cr>,
    factory: F,
}

impl<F, Cr> ClientBuilder<F, Cr> {
    /// Creates a new client.
    ///
    /// The configuration is validated before any credentials are loaded or
    /// any connection is attempted.
    pub async fn build<C>(self) -> Result<C>
    where
        F: internal::ClientFactory<Client = C, Credentials = Cr>,
    {
        self.config.validate()?;
        self.factory.build(self.config).await
    }

    /// Sets the endpoint.
    ///
    /// The endpoint is used verbatim, it overrides both the universe domain
    /// and the mutual TLS endpoint selection.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.config.endpoint = Some(v.into());
        self
    }

    /// Sets the universe domain.
    ///
    /// The default endpoint is formed by substituting the universe domain in
    /// the service's endpoint template. Without this option the client uses
    /// `GOOGLE_CLOUD_UNIVERSE_DOMAIN`, and then `googleapis.com`.
    pub fn with_universe_domain<V: Into<String>>(mut self, v: V) -> Self {
        self.config.universe_domain = Some(v.into());
        self
    }

    /// Enables tracing.
    ///
    /// The client libraries can be dynamically instrumented with the Tokio
    /// [tracing] framework. Setting this flag enables this instrumentation.
    ///
    /// [tracing]: https://docs.rs/tracing/latest/tracing/
    pub fn with_tracing(mut self) -> Self {
        self.config.tracing = true;
        self
    }

    /// Configure the authentication credentials.
    ///
    /// Most services require some form of authentication. Without this option
    /// the client uses the [Application Default Credentials].
    ///
    /// [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials
    pub fn with_credentials<T: Into<Cr>>(mut self, v: T) -> Self {
        self.config.cred = Some(v.into());
        self
    }

    /// Load the credentials from a file.
    ///
    /// The file must contain a service account key or authorized user
    /// credentials, in JSON format.
    pub fn with_credentials_file<V: Into<PathBuf>>(mut self, v: V) -> Self {
        self.config.credentials_file = Some(v.into());
        self
    }

    /// Authenticate using an API key.
    ///
    /// Cannot be combined with [with_credentials][Self::with_credentials].
    pub fn with_api_key<V: Into<String>>(mut self, v: V) -> Self {
        self.config.api_key = Some(v.into());
        self
    }

    /// Sets the OAuth scopes requested when the client creates credentials.
    pub fn with_scopes<I, V>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.config.scopes = Some(iter.into_iter().map(|v| v.into()).collect());
        self
    }

    /// Sets the project billed for quota.
    pub fn with_quota_project<V: Into<String>>(mut self, v: V) -> Self {
        self.config.quota_project = Some(v.into());
        self
    }

    /// Sets the source of client certificates for mutual TLS.
    ///
    /// The certificate is only used when `GOOGLE_API_USE_CLIENT_CERTIFICATE`
    /// is `true`.
    pub fn with_client_cert_source<V: ClientCertSource + 'static>(mut self, v: V) -> Self {
        self.config.client_cert_source = Some(Arc::new(v));
        self
    }

    /// Sets the audience used in self-signed JWTs.
    pub fn with_api_audience<V: Into<String>>(mut self, v: V) -> Self {
        self.config.api_audience = Some(v.into());
        self
    }

    /// Selects the wire protocol.
    pub fn with_transport(mut self, v: TransportKind) -> Self {
        self.config.transport = v;
        self
    }

    /// Use a pre-built transport.
    ///
    /// The instance must be of the type expected by the selected transport
    /// kind. It cannot be combined with credentials, a credentials file,
    /// scopes, or an API key.
    pub fn with_transport_instance(mut self, v: TransportInstance) -> Self {
        self.config.transport_instance = Some(v);
        self
    }

    /// Prefer self-signed JWTs over token exchange, when the credentials
    /// support them.
    pub fn with_jwt_access(mut self, v: bool) -> Self {
        self.config.jwt_access = Some(v);
        self
    }

    /// Limits the size of messages sent and received over gRPC.
    ///
    /// By default the size is unlimited.
    pub fn with_max_message_size(mut self, v: usize) -> Self {
        self.config.max_message_size = Some(v);
        self
    }

    /// Configure the retry policy.
    ///
    /// The client libraries can automatically retry operations that fail. The
    /// retry policy controls what errors are considered retryable, sets limits
    /// on the number of attempts or the time trying to make attempts.
    ///
    /// ```
    /// # use aiplatform_gax::client_builder::examples;
    /// # use aiplatform_gax::client_builder::Result;
    /// # tokio_test::block_on(async {
    /// use aiplatform_gax::retry_policy::{RetryPolicyExt, RetryableCodes};
    /// use examples::Client; // Placeholder for examples
    /// let client = Client::builder()
    ///     .with_retry_policy(RetryableCodes::default().with_attempt_limit(3))
    ///     .build().await?;
    /// # Result::<()>::Ok(()) });
    /// ```
    pub fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.config.retry_policy = Some(v.into().into());
        self
    }

    /// Configure the retry backoff policy.
    pub fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.config.backoff_policy = Some(v.into().into());
        self
    }

    /// Configure the polling error policy.
    ///
    /// Applies to long-running operations: decides which errors observed while
    /// polling are transient and how long to keep polling.
    pub fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.config.polling_error_policy = Some(v.into().into());
        self
    }

    /// Configure the polling backoff policy.
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.config.polling_backoff_policy = Some(v.into().into());
        self
    }
}

#[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
pub mod internal {
    use super::*;

    /// Each client implements a factory type to create the client.
    pub trait ClientFactory {
        type Client;
        type Credentials;
        fn build(
            self,
            config: internal::ClientConfig<Self::Credentials>,
        ) -> impl Future<Output = Result<Self::Client>>;
    }

    /// Creates a builder with the default configuration.
    pub fn new_builder<F, Cr, C>(factory: F) -> super::ClientBuilder<F, Cr>
    where
        F: ClientFactory<Client = C, Credentials = Cr>,
    {
        super::ClientBuilder {
            factory,
            config: ClientConfig::default(),
        }
    }

    /// The configuration collected by a [ClientBuilder][super::ClientBuilder].
    #[derive(Clone, Debug)]
    pub struct ClientConfig<Cr> {
        pub endpoint: Option<String>,
        pub universe_domain: Option<String>,
        pub cred: Option<Cr>,
        pub credentials_file: Option<PathBuf>,
        pub api_key: Option<String>,
        pub scopes: Option<Vec<String>>,
        pub quota_project: Option<String>,
        pub client_cert_source: Option<Arc<dyn ClientCertSource>>,
        pub api_audience: Option<String>,
        pub transport: TransportKind,
        pub transport_instance: Option<TransportInstance>,
        pub jwt_access: Option<bool>,
        pub max_message_size: Option<usize>,
        pub tracing: bool,
        pub retry_policy: Option<Arc<dyn RetryPolicy>>,
        pub backoff_policy: Option<Arc<dyn BackoffPolicy>>,
        pub polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
        pub polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    }

    impl<Cr> ClientConfig<Cr> {
        /// Rejects incompatible option combinations.
        pub fn validate(&self) -> Result<()> {
            if self.api_key.is_some() && (self.cred.is_some() || self.credentials_file.is_some())
            {
                return Err(Error::config(
                    "an API key cannot be combined with explicit credentials",
                ));
            }
            if self.cred.is_some() && self.credentials_file.is_some() {
                return Err(Error::config(
                    "credentials and a credentials file are mutually exclusive",
                ));
            }
            if self.transport_instance.is_some() {
                let conflicts = [
                    ("credentials", self.cred.is_some()),
                    ("credentials file", self.credentials_file.is_some()),
                    ("scopes", self.scopes.is_some()),
                    ("API key", self.api_key.is_some()),
                ];
                if let Some((name, _)) = conflicts.iter().find(|(_, set)| *set) {
                    return Err(Error::config(format!(
                        "a transport instance cannot be combined with {name}"
                    )));
                }
            }
            if self.universe_domain.as_deref() == Some("") {
                return Err(Error::config("the universe domain cannot be empty"));
            }
            Ok(())
        }
    }

    impl<Cr> std::default::Default for ClientConfig<Cr> {
        fn default() -> Self {
            Self {
                endpoint: None,
                universe_domain: None,
                cred: None,
                credentials_file: None,
                api_key: None,
                scopes: None,
                quota_project: None,
                client_cert_source: None,
                api_audience: None,
                transport: TransportKind::default(),
                transport_instance: None,
                jwt_access: None,
                max_message_size: None,
                tracing: false,
                retry_policy: None,
                backoff_policy: None,
                polling_error_policy: None,
                polling_backoff_policy: None,
            }
        }
    }
}

#[doc(hidden)]
pub mod examples {
    //! A minimal client so the documentation examples compile.

    type Config = super::internal::ClientConfig<Credentials>;
    use super::Result;

    /// Keeps the configuration it was built with and nothing else.
    #[allow(dead_code)]
    pub struct Client(Config);
    impl Client {
        pub fn builder() -> client::Builder {
            super::internal::new_builder(client::Factory)
        }

        async fn new(config: super::internal::ClientConfig<Credentials>) -> Result<Self> {
            Ok(Self(config))
        }
    }
    mod client {
        pub type Builder = super::super::ClientBuilder<Factory, super::Credentials>;
        pub struct Factory;
        impl super::super::internal::ClientFactory for Factory {
            type Credentials = super::Credentials;
            type Client = super::Client;
            async fn build(
                self,
                config: crate::client_builder::internal::ClientConfig<Self::Credentials>,
            ) -> super::Result<Self::Client> {
                Self::Client::new(config).await
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Credentials {
        pub scopes: Vec<String>,
    }

    #[cfg(test)]
    mod tests {
        use super::super::*;
        use super::*;

        #[tokio::test]
        async fn build_default() -> anyhow::Result<()> {
            let client = Client::builder().build().await?;
            let config = client.0;
            assert_eq!(config.endpoint, None);
            assert_eq!(config.universe_domain, None);
            assert_eq!(config.cred, None);
            assert_eq!(config.transport, TransportKind::Grpc);
            assert!(!config.tracing);
            assert!(config.retry_policy.is_none(), "{config:?}");
            assert!(config.backoff_policy.is_none(), "{config:?}");
            assert!(config.polling_error_policy.is_none(), "{config:?}");
            assert!(config.polling_backoff_policy.is_none(), "{config:?}");
            Ok(())
        }

        #[tokio::test]
        async fn endpoint_options() -> anyhow::Result<()> {
            let client = Client::builder()
                .with_endpoint("http://example.com")
                .with_universe_domain("my-universe.com")
                .with_transport(TransportKind::Rest)
                .with_max_message_size(1024)
                .build()
                .await?;
            let config = client.0;
            assert_eq!(config.endpoint.as_deref(), Some("http://example.com"));
            assert_eq!(config.universe_domain.as_deref(), Some("my-universe.com"));
            assert_eq!(config.transport, TransportKind::Rest);
            assert_eq!(config.max_message_size, Some(1024));
            Ok(())
        }

        #[tokio::test]
        async fn credential_options() -> anyhow::Result<()> {
            let client = Client::builder()
                .with_credentials(Credentials {
                    scopes: vec!["test-scope".into()],
                })
                .with_quota_project("my-project")
                .with_api_audience("https://aud.example.com")
                .with_jwt_access(true)
                .build()
                .await?;
            let config = client.0;
            let cred = config.cred.clone().unwrap();
            assert_eq!(cred.scopes, vec!["test-scope".to_string()]);
            assert_eq!(config.quota_project.as_deref(), Some("my-project"));
            assert_eq!(
                config.api_audience.as_deref(),
                Some("https://aud.example.com")
            );
            assert_eq!(config.jwt_access, Some(true));
            Ok(())
        }

        #[tokio::test]
        async fn client_cert_source() -> anyhow::Result<()> {
            let cert = ClientCertificate {
                cert_chain: b"cert".to_vec(),
                private_key: b"key".to_vec(),
            };
            let client = Client::builder()
                .with_client_cert_source(cert.clone())
                .build()
                .await?;
            let source = client.0.client_cert_source.unwrap();
            let got = source.client_certificate().map_err(|e| anyhow::anyhow!(e))?;
            assert_eq!(got, cert);
            assert!(!format!("{got:?}").contains("key"), "{got:?}");
            Ok(())
        }

        #[tokio::test]
        async fn tracing() -> anyhow::Result<()> {
            let client = Client::builder().with_tracing().build().await?;
            assert!(client.0.tracing);
            Ok(())
        }

        #[tokio::test]
        async fn api_key_and_credentials() {
            let err = Client::builder()
                .with_api_key("my-api-key")
                .with_credentials(Credentials::default())
                .build()
                .await
                .err()
                .unwrap();
            assert!(err.is_config(), "{err:?}");
            assert!(err.to_string().contains("API key"), "{err}");
        }

        #[tokio::test]
        async fn credentials_and_file() {
            let err = Client::builder()
                .with_credentials_file("/dev/null")
                .with_credentials(Credentials::default())
                .build()
                .await
                .err()
                .unwrap();
            assert!(err.is_config(), "{err:?}");
        }

        #[test_case::test_case(Client::builder().with_credentials(Credentials::default()), "credentials")]
        #[test_case::test_case(Client::builder().with_credentials_file("/dev/null"), "credentials file")]
        #[test_case::test_case(Client::builder().with_scopes(["scope"]), "scopes")]
        #[test_case::test_case(Client::builder().with_api_key("key"), "API key")]
        #[tokio::test]
        async fn transport_instance_conflicts(builder: client::Builder, name: &str) {
            let err = builder
                .with_transport_instance(TransportInstance::new(42_i32))
                .build()
                .await
                .err()
                .unwrap();
            assert!(err.is_config(), "{err:?}");
            assert!(err.to_string().contains(name), "{err}");
        }

        #[tokio::test]
        async fn transport_instance() -> anyhow::Result<()> {
            let client = Client::builder()
                .with_transport_instance(TransportInstance::new(42_i32))
                .build()
                .await?;
            let instance = client.0.transport_instance.unwrap();
            assert_eq!(instance.downcast_ref::<i32>(), Some(&42));
            assert_eq!(instance.downcast_ref::<String>(), None);
            Ok(())
        }

        #[tokio::test]
        async fn empty_universe_domain() {
            let err = Client::builder()
                .with_universe_domain("")
                .build()
                .await
                .err()
                .unwrap();
            assert!(err.is_config(), "{err:?}");
        }

        #[tokio::test]
        async fn retry_policy() -> anyhow::Result<()> {
            use crate::retry_policy::RetryPolicyExt;
            let client = Client::builder()
                .with_retry_policy(crate::retry_policy::AlwaysRetry.with_attempt_limit(3))
                .build()
                .await?;
            let config = client.0;
            assert!(config.retry_policy.is_some(), "{config:?}");
            Ok(())
        }

        #[tokio::test]
        async fn backoff_policy() -> anyhow::Result<()> {
            let client = Client::builder()
                .with_backoff_policy(crate::exponential_backoff::ExponentialBackoff::default())
                .build()
                .await?;
            let config = client.0;
            assert!(config.backoff_policy.is_some(), "{config:?}");
            Ok(())
        }

        #[tokio::test]
        async fn polling_policies() -> anyhow::Result<()> {
            use crate::polling_error_policy::PollingErrorPolicyExt;
            let client = Client::builder()
                .with_polling_error_policy(
                    crate::polling_error_policy::AlwaysContinue.with_attempt_limit(3),
                )
                .with_polling_backoff_policy(
                    crate::exponential_backoff::ExponentialBackoff::default(),
                )
                .build()
                .await?;
            let config = client.0;
            assert!(config.polling_error_policy.is_some(), "{config:?}");
            assert!(config.polling_backoff_policy.is_some(), "{config:?}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, thiserror::Error)]
    #[error("test-only")]
    struct TestError;

    #[test]
    fn error_config() {
        let error = Error::config(TestError);
        assert!(error.is_config(), "{error:?}");
        assert!(!error.is_default_credentials(), "{error:?}");
        assert!(error.to_string().contains("test-only"), "{error}");
    }

    #[test]
    fn error_credentials() {
        let error = Error::cred(TestError);
        assert!(error.is_default_credentials(), "{error:?}");
        assert!(error.to_string().contains("default credentials"), "{error}");
        let got = error.source().and_then(|e| e.downcast_ref::<TestError>());
        assert!(got.is_some(), "{error:?}");
    }

    #[test]
    fn error_transport() {
        let error = Error::transport(TestError);
        assert!(error.is_transport(), "{error:?}");
        assert!(error.to_string().contains("transport client"), "{error}");
        let got = error.source().and_then(|e| e.downcast_ref::<TestError>());
        assert!(got.is_some(), "{error:?}");
    }

    #[test]
    fn error_unsupported() {
        let error = Error::unsupported("quota project");
        assert!(error.is_unsupported(), "{error:?}");
        assert!(error.to_string().contains("quota project"), "{error}");
    }
}
