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

//! Hooks to modify the requests and responses of the HTTP/JSON transport.
//!
//! Each service has a table of hooks, with one typed setter per method. The
//! gRPC transport ignores these hooks.
//!
//! # Example
//! ```
//! # use aiplatform::interceptor::{Hook, PredictionService};
//! # use aiplatform::model::{PredictRequest, PredictResponse};
//! let interceptors = PredictionService::new().predict(
//!     Hook::<PredictRequest, PredictResponse>::new()
//!         .on_pre(|request, headers| {
//!             headers.insert("x-example", http::HeaderValue::from_static("value"));
//!             request
//!         }),
//! );
//! # let _ = interceptors;
//! ```

use crate::method::{EndpointServiceMethod, PredictionServiceMethod};
use crate::model;
use gaxi::http::interceptor::Interceptors;

pub use gaxi::http::interceptor::Hook;

/// The hooks for [crate::client::PredictionService].
#[derive(Clone, Debug, Default)]
pub struct PredictionService {
    inner: Interceptors<PredictionServiceMethod>,
}

impl PredictionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook for [predict][crate::client::PredictionService::predict].
    pub fn predict(mut self, hook: Hook<model::PredictRequest, model::PredictResponse>) -> Self {
        self.inner.set(PredictionServiceMethod::Predict, hook);
        self
    }

    /// Sets the hook for [raw_predict][crate::client::PredictionService::raw_predict].
    pub fn raw_predict(mut self, hook: Hook<model::RawPredictRequest, model::HttpBody>) -> Self {
        self.inner.set(PredictionServiceMethod::RawPredict, hook);
        self
    }

    /// Sets the hook for [stream_raw_predict][crate::client::PredictionService::stream_raw_predict].
    ///
    /// The `post` hooks run once for each message in the stream.
    pub fn stream_raw_predict(
        mut self,
        hook: Hook<model::StreamRawPredictRequest, model::HttpBody>,
    ) -> Self {
        self.inner.set(PredictionServiceMethod::StreamRawPredict, hook);
        self
    }

    /// Sets the hook for [generate_content][crate::client::PredictionService::generate_content].
    pub fn generate_content(
        mut self,
        hook: Hook<model::GenerateContentRequest, model::GenerateContentResponse>,
    ) -> Self {
        self.inner.set(PredictionServiceMethod::GenerateContent, hook);
        self
    }

    /// Sets the hook for [stream_generate_content][crate::client::PredictionService::stream_generate_content].
    ///
    /// The `post` hooks run once for each message in the stream.
    pub fn stream_generate_content(
        mut self,
        hook: Hook<model::GenerateContentRequest, model::GenerateContentResponse>,
    ) -> Self {
        self.inner
            .set(PredictionServiceMethod::StreamGenerateContent, hook);
        self
    }

    pub(crate) fn get<Req: 'static, Resp: 'static>(
        &self,
        method: PredictionServiceMethod,
    ) -> Hook<Req, Resp> {
        self.inner.get(method)
    }
}

/// The hooks for [crate::client::EndpointService].
#[derive(Clone, Debug, Default)]
pub struct EndpointService {
    inner: Interceptors<EndpointServiceMethod>,
}

impl EndpointService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook for [create_endpoint][crate::client::EndpointService::create_endpoint].
    ///
    /// The `post` hooks receive the operation returned by the service.
    pub fn create_endpoint(
        mut self,
        hook: Hook<model::CreateEndpointRequest, lro::model::Operation>,
    ) -> Self {
        self.inner.set(EndpointServiceMethod::CreateEndpoint, hook);
        self
    }

    /// Sets the hook for [get_endpoint][crate::client::EndpointService::get_endpoint].
    pub fn get_endpoint(mut self, hook: Hook<model::GetEndpointRequest, model::Endpoint>) -> Self {
        self.inner.set(EndpointServiceMethod::GetEndpoint, hook);
        self
    }

    /// Sets the hook for [list_endpoints][crate::client::EndpointService::list_endpoints].
    ///
    /// The hooks run once per page.
    pub fn list_endpoints(
        mut self,
        hook: Hook<model::ListEndpointsRequest, model::ListEndpointsResponse>,
    ) -> Self {
        self.inner.set(EndpointServiceMethod::ListEndpoints, hook);
        self
    }

    /// Sets the hook for [deploy_model][crate::client::EndpointService::deploy_model].
    pub fn deploy_model(
        mut self,
        hook: Hook<model::DeployModelRequest, lro::model::Operation>,
    ) -> Self {
        self.inner.set(EndpointServiceMethod::DeployModel, hook);
        self
    }

    /// Sets the hook for [get_operation][crate::client::EndpointService::get_operation].
    ///
    /// The hooks also run when an operation future polls the service.
    pub fn get_operation(
        mut self,
        hook: Hook<model::GetOperationRequest, lro::model::Operation>,
    ) -> Self {
        self.inner.set(EndpointServiceMethod::GetOperation, hook);
        self
    }

    /// Sets the hook for [cancel_operation][crate::client::EndpointService::cancel_operation].
    pub fn cancel_operation(mut self, hook: Hook<model::CancelOperationRequest, ()>) -> Self {
        self.inner.set(EndpointServiceMethod::CancelOperation, hook);
        self
    }

    pub(crate) fn get<Req: 'static, Resp: 'static>(
        &self,
        method: EndpointServiceMethod,
    ) -> Hook<Req, Resp> {
        self.inner.get(method)
    }
}
