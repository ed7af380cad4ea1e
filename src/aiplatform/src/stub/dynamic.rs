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
use crate::model;
use gax::options::RequestOptions;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use gax::response::Response;
use gaxi::streaming::ResponseStream;
use lro::model::Operation;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// A dyn-compatible, crate-private version of [super::PredictionService].
#[async_trait::async_trait]
pub trait PredictionService: std::fmt::Debug + Send + Sync {
    async fn predict(
        &self,
        req: model::PredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::PredictResponse>>;

    async fn raw_predict(
        &self,
        req: model::RawPredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::HttpBody>>;

    async fn stream_raw_predict(
        &self,
        req: model::StreamRawPredictRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::HttpBody>>;

    async fn generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<Response<model::GenerateContentResponse>>;

    async fn stream_generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::GenerateContentResponse>>;

    async fn streaming_predict(
        &self,
        requests: Receiver<model::StreamingPredictRequest>,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::StreamingPredictResponse>>;

    fn close(&self);
}

/// All implementations of [super::PredictionService] also implement [PredictionService].
#[async_trait::async_trait]
impl<T: super::PredictionService> PredictionService for T {
    async fn predict(
        &self,
        req: model::PredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::PredictResponse>> {
        T::predict(self, req, options).await
    }

    async fn raw_predict(
        &self,
        req: model::RawPredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::HttpBody>> {
        T::raw_predict(self, req, options).await
    }

    async fn stream_raw_predict(
        &self,
        req: model::StreamRawPredictRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::HttpBody>> {
        T::stream_raw_predict(self, req, options).await
    }

    async fn generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<Response<model::GenerateContentResponse>> {
        T::generate_content(self, req, options).await
    }

    async fn stream_generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::GenerateContentResponse>> {
        T::stream_generate_content(self, req, options).await
    }

    async fn streaming_predict(
        &self,
        requests: Receiver<model::StreamingPredictRequest>,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::StreamingPredictResponse>> {
        T::streaming_predict(self, requests, options).await
    }

    fn close(&self) {
        T::close(self)
    }
}

/// A dyn-compatible, crate-private version of [super::EndpointService].
#[async_trait::async_trait]
pub trait EndpointService: std::fmt::Debug + Send + Sync {
    async fn create_endpoint(
        &self,
        req: model::CreateEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>>;

    async fn get_endpoint(
        &self,
        req: model::GetEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<model::Endpoint>>;

    async fn list_endpoints(
        &self,
        req: model::ListEndpointsRequest,
        options: RequestOptions,
    ) -> Result<Response<model::ListEndpointsResponse>>;

    async fn deploy_model(
        &self,
        req: model::DeployModelRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>>;

    async fn get_operation(
        &self,
        req: model::GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>>;

    async fn cancel_operation(
        &self,
        req: model::CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<()>>;

    fn get_polling_error_policy(
        &self,
        options: &RequestOptions,
    ) -> Option<Arc<dyn PollingErrorPolicy>>;

    fn get_polling_backoff_policy(
        &self,
        options: &RequestOptions,
    ) -> Option<Arc<dyn PollingBackoffPolicy>>;

    fn close(&self);
}

/// All implementations of [super::EndpointService] also implement [EndpointService].
#[async_trait::async_trait]
impl<T: super::EndpointService> EndpointService for T {
    async fn create_endpoint(
        &self,
        req: model::CreateEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        T::create_endpoint(self, req, options).await
    }

    async fn get_endpoint(
        &self,
        req: model::GetEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<model::Endpoint>> {
        T::get_endpoint(self, req, options).await
    }

    async fn list_endpoints(
        &self,
        req: model::ListEndpointsRequest,
        options: RequestOptions,
    ) -> Result<Response<model::ListEndpointsResponse>> {
        T::list_endpoints(self, req, options).await
    }

    async fn deploy_model(
        &self,
        req: model::DeployModelRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        T::deploy_model(self, req, options).await
    }

    async fn get_operation(
        &self,
        req: model::GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        T::get_operation(self, req, options).await
    }

    async fn cancel_operation(
        &self,
        req: model::CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<()>> {
        T::cancel_operation(self, req, options).await
    }

    fn get_polling_error_policy(
        &self,
        options: &RequestOptions,
    ) -> Option<Arc<dyn PollingErrorPolicy>> {
        T::get_polling_error_policy(self, options)
    }

    fn get_polling_backoff_policy(
        &self,
        options: &RequestOptions,
    ) -> Option<Arc<dyn PollingBackoffPolicy>> {
        T::get_polling_backoff_policy(self, options)
    }

    fn close(&self) {
        T::close(self)
    }
}
