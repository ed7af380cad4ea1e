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

//! The gRPC implementation of the stubs.

use super::longrunning::OperationProto;
use super::{EndpointServiceMethods, PredictionServiceMethods};
use crate::Result;
use crate::model;
use gax::client_builder::Result as BuilderResult;
use gax::options::RequestOptions;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use gax::response::Response;
use gaxi::options::{ClientConfig, ServiceInfo};
use gaxi::streaming::ResponseStream;
use lro::model::Operation;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// Implements [PredictionService][crate::stub::PredictionService] over gRPC.
#[derive(Debug)]
pub(crate) struct PredictionService {
    inner: gaxi::grpc::Client,
    methods: PredictionServiceMethods,
}

impl PredictionService {
    pub async fn new(config: ClientConfig, service: &ServiceInfo) -> BuilderResult<Self> {
        let inner = gaxi::grpc::Client::new(&config, service).await?;
        let methods = PredictionServiceMethods::new(&inner);
        Ok(Self { inner, methods })
    }
}

impl crate::stub::PredictionService for PredictionService {
    async fn predict(
        &self,
        req: model::PredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::PredictResponse>> {
        let w = &self.methods.predict;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    async fn raw_predict(
        &self,
        req: model::RawPredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::HttpBody>> {
        let w = &self.methods.raw_predict;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    async fn stream_raw_predict(
        &self,
        req: model::StreamRawPredictRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::HttpBody>> {
        let w = &self.methods.stream_raw_predict;
        let id = &w.spec().id;
        let token = options.cancellation_token().clone();
        let stream = w
            .call(req, options, |req, attempt| {
                self.inner.server_streaming(id, req, attempt)
            })
            .await?;
        Ok(stream.with_cancellation(token))
    }

    async fn generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<Response<model::GenerateContentResponse>> {
        let w = &self.methods.generate_content;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    async fn stream_generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::GenerateContentResponse>> {
        let w = &self.methods.stream_generate_content;
        let id = &w.spec().id;
        let token = options.cancellation_token().clone();
        let stream = w
            .call(req, options, |req, attempt| {
                self.inner.server_streaming(id, req, attempt)
            })
            .await?;
        Ok(stream.with_cancellation(token))
    }

    async fn streaming_predict(
        &self,
        requests: Receiver<model::StreamingPredictRequest>,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::StreamingPredictResponse>> {
        let w = &self.methods.streaming_predict;
        let id = &w.spec().id;
        let token = options.cancellation_token().clone();
        let requests = futures::stream::unfold(requests, |mut rx| async move {
            rx.recv().await.map(|r| (r, rx))
        });
        let stream = w
            .call_once(options, |attempt| self.inner.bidi(id, requests, attempt))
            .await?;
        Ok(stream.with_cancellation(token))
    }

    fn close(&self) {
        self.inner.close()
    }
}

/// Implements [EndpointService][crate::stub::EndpointService] over gRPC.
#[derive(Debug)]
pub(crate) struct EndpointService {
    inner: gaxi::grpc::Client,
    methods: EndpointServiceMethods,
}

impl EndpointService {
    pub async fn new(config: ClientConfig, service: &ServiceInfo) -> BuilderResult<Self> {
        let inner = gaxi::grpc::Client::new(&config, service).await?;
        let methods = EndpointServiceMethods::new(&inner);
        Ok(Self { inner, methods })
    }

    async fn operation<R>(
        &self,
        w: &gaxi::call::CallWrapper<R>,
        req: R,
        options: RequestOptions,
    ) -> Result<Response<Operation>>
    where
        R: gaxi::call::RequestFields + prost::Message + Clone + Send + Sync + 'static,
    {
        let id = &w.spec().id;
        let response = w
            .call(req, options, |req, attempt| {
                self.inner.unary::<R, OperationProto>(id, req, attempt)
            })
            .await?;
        Ok(response.map(Operation::from))
    }
}

impl crate::stub::EndpointService for EndpointService {
    async fn create_endpoint(
        &self,
        req: model::CreateEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        self.operation(&self.methods.create_endpoint, req, options)
            .await
    }

    async fn get_endpoint(
        &self,
        req: model::GetEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<model::Endpoint>> {
        let w = &self.methods.get_endpoint;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    async fn list_endpoints(
        &self,
        req: model::ListEndpointsRequest,
        options: RequestOptions,
    ) -> Result<Response<model::ListEndpointsResponse>> {
        let w = &self.methods.list_endpoints;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    async fn deploy_model(
        &self,
        req: model::DeployModelRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        self.operation(&self.methods.deploy_model, req, options)
            .await
    }

    async fn get_operation(
        &self,
        req: model::GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        self.operation(&self.methods.get_operation, req, options)
            .await
    }

    async fn cancel_operation(
        &self,
        req: model::CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<()>> {
        let w = &self.methods.cancel_operation;
        let id = &w.spec().id;
        w.call(req, options, |req, attempt| self.inner.unary(id, req, attempt))
            .await
    }

    fn get_polling_error_policy(
        &self,
        _options: &RequestOptions,
    ) -> Option<Arc<dyn PollingErrorPolicy>> {
        self.inner.base().polling_error_policy()
    }

    fn get_polling_backoff_policy(
        &self,
        _options: &RequestOptions,
    ) -> Option<Arc<dyn PollingBackoffPolicy>> {
        self.inner.base().polling_backoff_policy()
    }

    fn close(&self) {
        self.inner.close()
    }
}
