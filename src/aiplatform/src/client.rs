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

//! Contains the clients for the Vertex AI prediction and endpoint services.

use crate::builder;
use crate::interceptor;
use crate::stub;
use crate::transport;
use gax::client_builder::Result as BuilderResult;
use gax::client_builder::TransportKind;
use gaxi::options::ClientConfig;
use std::sync::Arc;

/// Implements a client for the Vertex AI prediction service.
///
/// # Example
/// ```
/// # async fn sample() -> anyhow::Result<()> {
/// # use aiplatform::client::PredictionService;
/// let client = PredictionService::builder().build().await?;
/// let response = client
///     .predict()
///     .set_endpoint("projects/my-project/locations/us-central1/endpoints/my-endpoint")
///     .send()
///     .await?;
/// println!("response {response:?}");
/// # Ok(()) }
/// ```
///
/// # Service Description
///
/// A service for online predictions and explanations.
///
/// # Configuration
///
/// To configure `PredictionService` use the `with_*` methods in the type
/// returned by [builder()][PredictionService::builder]. The default
/// configuration should work for most applications. Common configuration
/// changes include
///
/// * [with_endpoint()]: by default this client uses the global default endpoint
///   (`https://aiplatform.googleapis.com`). Most applications use a regional
///   endpoint, such as `https://us-central1-aiplatform.googleapis.com`.
/// * [with_credentials()]: by default this client uses
///   [Application Default Credentials]. Applications using custom
///   authentication may need to override this default.
/// * [with_transport()]: by default this client uses gRPC.
///
/// [with_endpoint()]: builder::prediction_service::ClientBuilder::with_endpoint
/// [with_credentials()]: builder::prediction_service::ClientBuilder::with_credentials
/// [with_transport()]: builder::prediction_service::ClientBuilder::with_transport
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication#adc
///
/// # Pooling and Cloning
///
/// `PredictionService` holds a connection pool internally, it is advised to
/// create one and then reuse it. You do not need to wrap `PredictionService`
/// in an [Rc](std::rc::Rc) or [Arc] to reuse it, because it already uses an
/// `Arc` internally.
#[derive(Clone, Debug)]
pub struct PredictionService {
    inner: Arc<dyn stub::dynamic::PredictionService>,
}

impl PredictionService {
    /// Returns a builder for [PredictionService].
    pub fn builder() -> builder::prediction_service::ClientBuilder {
        gax::client_builder::internal::new_builder(
            builder::prediction_service::client::Factory::default(),
        )
    }

    /// Returns a builder for [PredictionService], with hooks for the
    /// HTTP/JSON transport.
    pub fn builder_with_interceptors(
        interceptors: interceptor::PredictionService,
    ) -> builder::prediction_service::ClientBuilder {
        gax::client_builder::internal::new_builder(builder::prediction_service::client::Factory {
            interceptors,
        })
    }

    /// Creates a new client from the provided stub.
    ///
    /// The most common case for calling this function is in tests mocking the
    /// client's behavior.
    pub fn from_stub<T>(stub: T) -> Self
    where
        T: stub::PredictionService + 'static,
    {
        Self {
            inner: Arc::new(stub),
        }
    }

    pub(crate) async fn new(
        config: ClientConfig,
        interceptors: interceptor::PredictionService,
    ) -> BuilderResult<Self> {
        let inner = Self::build_inner(config, interceptors).await?;
        Ok(Self { inner })
    }

    async fn build_inner(
        config: ClientConfig,
        interceptors: interceptor::PredictionService,
    ) -> BuilderResult<Arc<dyn stub::dynamic::PredictionService>> {
        tracing::debug!(transport = ?config.transport, "building PredictionService");
        match config.transport {
            TransportKind::Rest => Ok(Arc::new(
                transport::rest::PredictionService::new(config, &crate::info::SERVICE, interceptors)
                    .await?,
            )),
            _ => Ok(Arc::new(
                transport::grpc::PredictionService::new(config, &crate::info::SERVICE).await?,
            )),
        }
    }

    /// Releases the underlying channel or HTTP session.
    ///
    /// Calls made after closing the client fail. Closing is idempotent.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Perform an online prediction.
    pub fn predict(&self) -> builder::prediction_service::Predict {
        builder::prediction_service::Predict::new(self.inner.clone())
    }

    /// Perform an online prediction with an arbitrary HTTP payload.
    ///
    /// The response includes the following HTTP headers:
    ///
    /// * `X-Vertex-AI-Endpoint-Id`: ID of the endpoint that served this
    ///   prediction.
    /// * `X-Vertex-AI-Deployed-Model-Id`: ID of the endpoint's deployed model
    ///   that served this prediction.
    pub fn raw_predict(&self) -> builder::prediction_service::RawPredict {
        builder::prediction_service::RawPredict::new(self.inner.clone())
    }

    /// Perform a streaming online prediction with an arbitrary HTTP payload.
    pub fn stream_raw_predict(&self) -> builder::prediction_service::StreamRawPredict {
        builder::prediction_service::StreamRawPredict::new(self.inner.clone())
    }

    /// Generate content with multimodal inputs.
    pub fn generate_content(&self) -> builder::prediction_service::GenerateContent {
        builder::prediction_service::GenerateContent::new(self.inner.clone())
    }

    /// Generate content with multimodal inputs with streaming support.
    pub fn stream_generate_content(&self) -> builder::prediction_service::StreamGenerateContent {
        builder::prediction_service::StreamGenerateContent::new(self.inner.clone())
    }

    /// Perform a streaming online prediction request for Vertex first-party
    /// products and frameworks.
    ///
    /// This is a bidirectional streaming RPC, only the gRPC transport
    /// supports it.
    pub fn streaming_predict(&self) -> builder::prediction_service::StreamingPredict {
        builder::prediction_service::StreamingPredict::new(self.inner.clone())
    }
}

/// Implements a client for the Vertex AI endpoint service.
///
/// # Example
/// ```
/// # async fn sample() -> anyhow::Result<()> {
/// # use aiplatform::client::EndpointService;
/// let client = EndpointService::builder().build().await?;
/// let endpoint = client
///     .get_endpoint()
///     .set_name("projects/my-project/locations/us-central1/endpoints/my-endpoint")
///     .send()
///     .await?;
/// println!("endpoint {endpoint:?}");
/// # Ok(()) }
/// ```
///
/// # Service Description
///
/// A service for managing Vertex AI's Endpoints.
///
/// # Pooling and Cloning
///
/// `EndpointService` holds a connection pool internally, it is advised to
/// create one and then reuse it.
#[derive(Clone, Debug)]
pub struct EndpointService {
    inner: Arc<dyn stub::dynamic::EndpointService>,
}

impl EndpointService {
    /// Returns a builder for [EndpointService].
    pub fn builder() -> builder::endpoint_service::ClientBuilder {
        gax::client_builder::internal::new_builder(
            builder::endpoint_service::client::Factory::default(),
        )
    }

    /// Returns a builder for [EndpointService], with hooks for the HTTP/JSON
    /// transport.
    pub fn builder_with_interceptors(
        interceptors: interceptor::EndpointService,
    ) -> builder::endpoint_service::ClientBuilder {
        gax::client_builder::internal::new_builder(builder::endpoint_service::client::Factory {
            interceptors,
        })
    }

    /// Creates a new client from the provided stub.
    ///
    /// The most common case for calling this function is in tests mocking the
    /// client's behavior.
    pub fn from_stub<T>(stub: T) -> Self
    where
        T: stub::EndpointService + 'static,
    {
        Self {
            inner: Arc::new(stub),
        }
    }

    pub(crate) async fn new(
        config: ClientConfig,
        interceptors: interceptor::EndpointService,
    ) -> BuilderResult<Self> {
        let inner = Self::build_inner(config, interceptors).await?;
        Ok(Self { inner })
    }

    async fn build_inner(
        config: ClientConfig,
        interceptors: interceptor::EndpointService,
    ) -> BuilderResult<Arc<dyn stub::dynamic::EndpointService>> {
        tracing::debug!(transport = ?config.transport, "building EndpointService");
        match config.transport {
            TransportKind::Rest => Ok(Arc::new(
                transport::rest::EndpointService::new(config, &crate::info::SERVICE, interceptors)
                    .await?,
            )),
            _ => Ok(Arc::new(
                transport::grpc::EndpointService::new(config, &crate::info::SERVICE).await?,
            )),
        }
    }

    /// Releases the underlying channel or HTTP session.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Creates an Endpoint.
    ///
    /// # Long running operations
    ///
    /// This method is used to start, and/or poll a [long-running Operation].
    /// Use [poller()][builder::endpoint_service::CreateEndpoint::poller] or
    /// [until_done()][builder::endpoint_service::CreateEndpoint::until_done]
    /// to wait for the result.
    ///
    /// The request ID is set to a fresh UUID unless the application sets one.
    ///
    /// [long-running operation]: https://google.aip.dev/151
    pub fn create_endpoint(&self) -> builder::endpoint_service::CreateEndpoint {
        builder::endpoint_service::CreateEndpoint::new(self.inner.clone())
    }

    /// Gets an Endpoint.
    pub fn get_endpoint(&self) -> builder::endpoint_service::GetEndpoint {
        builder::endpoint_service::GetEndpoint::new(self.inner.clone())
    }

    /// Lists Endpoints in a Location.
    pub fn list_endpoints(&self) -> builder::endpoint_service::ListEndpoints {
        builder::endpoint_service::ListEndpoints::new(self.inner.clone())
    }

    /// Deploys a Model into this Endpoint, creating a DeployedModel within it.
    ///
    /// # Long running operations
    ///
    /// This method is used to start, and/or poll a [long-running Operation].
    ///
    /// [long-running operation]: https://google.aip.dev/151
    pub fn deploy_model(&self) -> builder::endpoint_service::DeployModel {
        builder::endpoint_service::DeployModel::new(self.inner.clone())
    }

    /// Provides the [Operations] service functionality in this service.
    ///
    /// [Operations]: https://github.com/googleapis/googleapis/blob/master/google/longrunning/operations.proto
    pub fn get_operation(&self) -> builder::endpoint_service::GetOperation {
        builder::endpoint_service::GetOperation::new(self.inner.clone())
    }

    /// Provides the [Operations] service functionality in this service.
    ///
    /// [Operations]: https://github.com/googleapis/googleapis/blob/master/google/longrunning/operations.proto
    pub fn cancel_operation(&self) -> builder::endpoint_service::CancelOperation {
        builder::endpoint_service::CancelOperation::new(self.inner.clone())
    }
}
