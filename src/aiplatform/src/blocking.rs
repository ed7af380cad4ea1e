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

//! Blocking versions of the clients.
//!
//! These clients always use the HTTP/JSON transport. Each client owns a
//! single-threaded runtime and blocks the calling thread until the call
//! completes. Do not use them from async code.
//!
//! # Example
//! ```no_run
//! # fn sample() -> anyhow::Result<()> {
//! use aiplatform::blocking::EndpointService;
//! use aiplatform::client;
//! use aiplatform::model::ListEndpointsRequest;
//! let client = EndpointService::new(client::EndpointService::builder())?;
//! let request = ListEndpointsRequest::new().set_parent("projects/my-project/locations/us-central1");
//! for endpoint in client.list_endpoints(request, Default::default()) {
//!     println!("{:?}", endpoint?);
//! }
//! # Ok(()) }
//! ```

use crate::Result;
use crate::builder;
use crate::client;
use crate::model;
use gax::client_builder::Result as BuilderResult;
use gax::client_builder::TransportKind;
use gax::error::Error;
use gax::options::RequestOptions;
use gax::paginator::{ItemIterator, PageIterator};
use gaxi::http::blocking::{BlockingStream, Runtime};

/// A blocking client for the prediction service.
#[derive(Clone, Debug)]
pub struct PredictionService {
    runtime: Runtime,
    inner: client::PredictionService,
}

impl PredictionService {
    /// Creates a client using the configuration in `builder`.
    ///
    /// The transport is always HTTP/JSON.
    pub fn new(builder: builder::prediction_service::ClientBuilder) -> BuilderResult<Self> {
        let runtime = Runtime::new()?;
        let inner = runtime.block_on(builder.with_transport(TransportKind::Rest).build())?;
        Ok(Self { runtime, inner })
    }

    /// Releases the underlying HTTP session.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Blocking version of [client::PredictionService::predict].
    pub fn predict(
        &self,
        req: model::PredictRequest,
        options: RequestOptions,
    ) -> Result<model::PredictResponse> {
        let call = self.inner.predict().with_request(req).with_options(options);
        self.runtime.block_on(call.send())
    }

    /// Blocking version of [client::PredictionService::raw_predict].
    pub fn raw_predict(
        &self,
        req: model::RawPredictRequest,
        options: RequestOptions,
    ) -> Result<model::HttpBody> {
        let call = self.inner.raw_predict().with_request(req).with_options(options);
        self.runtime.block_on(call.send())
    }

    /// Blocking version of [client::PredictionService::stream_raw_predict].
    ///
    /// Each call to `next()` on the iterator blocks until the next chunk
    /// arrives.
    pub fn stream_raw_predict(
        &self,
        req: model::StreamRawPredictRequest,
        options: RequestOptions,
    ) -> Result<BlockingStream<model::HttpBody>> {
        let call = self
            .inner
            .stream_raw_predict()
            .with_request(req)
            .with_options(options);
        let stream = self.runtime.block_on(call.send())?;
        Ok(self.runtime.iter(stream))
    }

    /// Blocking version of [client::PredictionService::generate_content].
    pub fn generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<model::GenerateContentResponse> {
        let call = self
            .inner
            .generate_content()
            .with_request(req)
            .with_options(options);
        self.runtime.block_on(call.send())
    }

    /// Blocking version of [client::PredictionService::stream_generate_content].
    pub fn stream_generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<BlockingStream<model::GenerateContentResponse>> {
        let call = self
            .inner
            .stream_generate_content()
            .with_request(req)
            .with_options(options);
        let stream = self.runtime.block_on(call.send())?;
        Ok(self.runtime.iter(stream))
    }
}

/// A blocking client for the endpoint service.
#[derive(Clone, Debug)]
pub struct EndpointService {
    runtime: Runtime,
    inner: client::EndpointService,
}

impl EndpointService {
    /// Creates a client using the configuration in `builder`.
    ///
    /// The transport is always HTTP/JSON.
    pub fn new(builder: builder::endpoint_service::ClientBuilder) -> BuilderResult<Self> {
        let runtime = Runtime::new()?;
        let inner = runtime.block_on(builder.with_transport(TransportKind::Rest).build())?;
        Ok(Self { runtime, inner })
    }

    /// Releases the underlying HTTP session.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Creates an endpoint, and waits until the operation completes.
    pub fn create_endpoint(
        &self,
        req: model::CreateEndpointRequest,
        options: RequestOptions,
    ) -> Result<model::Endpoint> {
        let call = self
            .inner
            .create_endpoint()
            .with_request(req)
            .with_options(options);
        self.runtime.block_on(call.until_done())
    }

    /// Blocking version of [client::EndpointService::get_endpoint].
    pub fn get_endpoint(
        &self,
        req: model::GetEndpointRequest,
        options: RequestOptions,
    ) -> Result<model::Endpoint> {
        let call = self.inner.get_endpoint().with_request(req).with_options(options);
        self.runtime.block_on(call.send())
    }

    /// Returns an iterator over all the endpoints, fetching pages as needed.
    pub fn list_endpoints(
        &self,
        req: model::ListEndpointsRequest,
        options: RequestOptions,
    ) -> ItemIterator<model::ListEndpointsResponse, Error> {
        let runtime = self.runtime.clone();
        let inner = self.inner.clone();
        let token = req.page_token.clone();
        let execute = move |token: String| {
            let call = inner
                .list_endpoints()
                .with_request(req.clone().set_page_token(token))
                .with_options(options.clone());
            runtime.block_on(call.send())
        };
        PageIterator::new(token, execute).items()
    }

    /// Deploys a model, and waits until the operation completes.
    pub fn deploy_model(
        &self,
        req: model::DeployModelRequest,
        options: RequestOptions,
    ) -> Result<model::DeployModelResponse> {
        let call = self.inner.deploy_model().with_request(req).with_options(options);
        self.runtime.block_on(call.until_done())
    }

    /// Blocking version of [client::EndpointService::get_operation].
    pub fn get_operation(
        &self,
        req: model::GetOperationRequest,
        options: RequestOptions,
    ) -> Result<lro::model::Operation> {
        let call = self.inner.get_operation().with_request(req).with_options(options);
        self.runtime.block_on(call.send())
    }

    /// Blocking version of [client::EndpointService::cancel_operation].
    pub fn cancel_operation(
        &self,
        req: model::CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<()> {
        let call = self
            .inner
            .cancel_operation()
            .with_request(req)
            .with_options(options);
        self.runtime.block_on(call.send())
    }
}
