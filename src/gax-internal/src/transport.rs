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

//! State shared by the gRPC and REST transports.

use crate::call::{Bindings, CallSpec, CallWrapper, RequestFields, Wrap};
use crate::endpoint::{EndpointSettings, ResolvedEndpoint};
use crate::options::{ClientConfig, ServiceInfo, tracing_enabled};
use auth::credentials::Credentials;
use gax::Result;
use gax::client_builder::Result as BuilderResult;
use gax::error::Error;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use http::HeaderMap;
use std::sync::{Arc, RwLock};

/// The error returned by calls on a closed transport.
#[derive(thiserror::Error, Debug)]
#[error("the client was closed")]
pub struct ClosedError;

/// The common state of a transport.
///
/// `T` is the session: a gRPC channel or an HTTP client. Sessions are cheap to
/// clone and safe to use concurrently.
#[derive(Debug)]
pub struct TransportBase<T> {
    endpoint: ResolvedEndpoint,
    credentials: Option<Credentials>,
    scopes: Vec<String>,
    user_agent: String,
    bindings: Bindings,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    session: RwLock<Option<T>>,
}

impl<T: Clone> TransportBase<T> {
    /// Resolves the endpoint, creates the credentials, and opens the session.
    pub async fn new<C>(config: &ClientConfig, service: &ServiceInfo, connect: C) -> BuilderResult<Self>
    where
        C: FnOnce(&ResolvedEndpoint, &ClientConfig) -> BuilderResult<T>,
    {
        let settings = EndpointSettings::from_env()?;
        Self::with_settings(config, service, &settings, connect).await
    }

    /// Like [new][Self::new] with explicit endpoint settings.
    pub async fn with_settings<C>(
        config: &ClientConfig,
        service: &ServiceInfo,
        settings: &EndpointSettings,
        connect: C,
    ) -> BuilderResult<Self>
    where
        C: FnOnce(&ResolvedEndpoint, &ClientConfig) -> BuilderResult<T>,
    {
        let endpoint = crate::endpoint::resolve(
            settings,
            config.endpoint.as_deref(),
            config.universe_domain.as_deref(),
            config.client_cert_source.clone(),
            service,
        )?;
        let credentials = crate::factory::make_credentials(config, service, &endpoint).await?;
        let session = connect(&endpoint, config)?;
        let scopes = config.scopes.clone().unwrap_or_else(|| {
            service.default_scopes.iter().map(|s| s.to_string()).collect()
        });
        let tracing = tracing_enabled(config);
        if tracing {
            tracing::info!(service = service.service_name, host = endpoint.host, "created transport");
        }
        Ok(Self {
            endpoint,
            scopes,
            user_agent: service.api_client.user_agent(),
            bindings: Bindings {
                retry_policy: config.retry_policy.clone(),
                backoff_policy: config.backoff_policy.clone(),
                credentials: credentials.clone(),
                tracing,
            },
            credentials,
            polling_error_policy: config.polling_error_policy.clone(),
            polling_backoff_policy: config.polling_backoff_policy.clone(),
            session: RwLock::new(Some(session)),
        })
    }

    /// Returns the session, or an error if the transport is closed.
    pub fn session(&self) -> Result<T> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        guard
            .clone()
            .ok_or_else(|| Error::transport(HeaderMap::new(), ClosedError))
    }

    /// Releases the session. Closing a closed transport has no effect.
    pub fn close(&self) {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            tracing::debug!(host = self.endpoint.host, "closed transport");
        }
    }

    pub fn is_closed(&self) -> bool {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        guard.is_none()
    }
}

impl<T> TransportBase<T> {
    pub fn endpoint(&self) -> &ResolvedEndpoint {
        &self.endpoint
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn tracing(&self) -> bool {
        self.bindings.tracing
    }

    pub fn polling_error_policy(&self) -> Option<Arc<dyn PollingErrorPolicy>> {
        self.polling_error_policy.clone()
    }

    pub fn polling_backoff_policy(&self) -> Option<Arc<dyn PollingBackoffPolicy>> {
        self.polling_backoff_policy.clone()
    }

    /// The authentication headers for one attempt.
    pub async fn auth_headers(&self) -> Result<HeaderMap> {
        match &self.credentials {
            None => Ok(HeaderMap::new()),
            Some(c) => c.headers().await.map_err(Error::authentication),
        }
    }

    /// The `user-agent` value for one attempt, including any per-call prefix.
    pub fn user_agent_for(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(p) if !p.is_empty() => format!("{p} {}", self.user_agent),
            _ => self.user_agent.clone(),
        }
    }
}

impl<T> Wrap for TransportBase<T> {
    fn wrap<R>(&self, spec: &'static CallSpec<R>) -> CallWrapper<R>
    where
        R: RequestFields + Clone + Send + Sync,
    {
        CallWrapper::new(spec, self.bindings.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::endpoint::MtlsMode;
    use crate::options::tests::TEST_SERVICE;
    use auth::credentials::CredentialsProvider;
    use gax::client_builder::Error as BuilderError;
    use http::header::AUTHORIZATION;

    #[derive(Debug)]
    pub(crate) struct TestCredentials;

    impl CredentialsProvider for TestCredentials {
        async fn headers(&self) -> std::result::Result<HeaderMap, gax::error::CredentialsError> {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, http::HeaderValue::from_static("Bearer test-token"));
            Ok(headers)
        }
        async fn universe_domain(&self) -> Option<String> {
            None
        }
    }

    pub(crate) fn test_config() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.cred = Some(Credentials::from(TestCredentials));
        config
    }

    fn settings() -> EndpointSettings {
        EndpointSettings {
            mtls_mode: MtlsMode::Auto,
            ..EndpointSettings::default()
        }
    }

    async fn base() -> anyhow::Result<TransportBase<String>> {
        let base = TransportBase::with_settings(&test_config(), &TEST_SERVICE, &settings(), |e, _| {
            Ok(format!("session for {}", e.host))
        })
        .await?;
        Ok(base)
    }

    #[tokio::test]
    async fn lifecycle() -> anyhow::Result<()> {
        let base = base().await?;
        assert_eq!(base.endpoint().host, "aiplatform.googleapis.com");
        assert_eq!(base.session()?, "session for aiplatform.googleapis.com");
        assert!(!base.is_closed());
        assert_eq!(base.scopes(), &["https://www.googleapis.com/auth/cloud-platform"]);
        assert!(base.user_agent().starts_with("aiplatform-test/0.0.1"), "{}", base.user_agent());

        base.close();
        assert!(base.is_closed());
        let err = base.session().unwrap_err();
        assert!(err.is_transport(), "{err:?}");
        // Closing twice is fine.
        base.close();
        assert!(base.is_closed());
        Ok(())
    }

    #[tokio::test]
    async fn auth_headers() -> anyhow::Result<()> {
        let base = base().await?;
        let headers = base.auth_headers().await?;
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer test-token")
        );
        Ok(())
    }

    #[tokio::test]
    async fn user_agent_prefix() -> anyhow::Result<()> {
        let base = base().await?;
        let got = base.user_agent_for(Some("my-app/1.0"));
        assert!(got.starts_with("my-app/1.0 aiplatform-test/0.0.1"), "{got}");
        assert_eq!(base.user_agent_for(None), base.user_agent());
        Ok(())
    }

    #[tokio::test]
    async fn connect_error() {
        let got = TransportBase::<String>::with_settings(&test_config(), &TEST_SERVICE, &settings(), |_, _| {
            Err(BuilderError::transport("cannot connect"))
        })
        .await;
        assert!(matches!(&got, Err(e) if e.is_transport()), "{got:?}");
    }

    #[tokio::test]
    async fn endpoint_override() -> anyhow::Result<()> {
        let mut config = test_config();
        config.endpoint = Some("http://localhost:8080".into());
        let base = TransportBase::with_settings(&config, &TEST_SERVICE, &settings(), |e, _| {
            Ok(e.rest_origin())
        })
        .await?;
        assert_eq!(base.session()?, "http://localhost:8080");
        Ok(())
    }
}
