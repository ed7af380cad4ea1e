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

//! Traits to mock the clients in this crate.
//!
//! Application developers may need to implement these traits to mock the
//! clients. In other use-cases, application developers only use the clients
//! in [crate::client] and need not be concerned with these traits or their
//! implementations.
//!
//! Services gain new RPCs routinely. Consequently, these traits gain new
//! methods too. To avoid breaking applications the traits provide a default
//! implementation of each method. These implementations return an error.

use crate::Result;
use crate::model;
use gax::options::RequestOptions;
use gax::response::Response;
use gaxi::streaming::ResponseStream;
use gaxi::unimplemented::unimplemented_stub;
use lro::model::Operation;
use std::future::Future;
use tokio::sync::mpsc::Receiver;

pub(crate) mod dynamic;

/// Defines the trait used to implement [crate::client::PredictionService].
pub trait PredictionService: std::fmt::Debug + Send + Sync {
    /// Implements [crate::client::PredictionService::predict].
    fn predict(
        &self,
        _req: model::PredictRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<model::PredictResponse>>> + Send {
        unimplemented_stub("PredictionService::predict")
    }

    /// Implements [crate::client::PredictionService::raw_predict].
    fn raw_predict(
        &self,
        _req: model::RawPredictRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<model::HttpBody>>> + Send {
        unimplemented_stub("PredictionService::raw_predict")
    }

    /// Implements [crate::client::PredictionService::stream_raw_predict].
    fn stream_raw_predict(
        &self,
        _req: model::StreamRawPredictRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<ResponseStream<model::HttpBody>>> + Send {
        unimplemented_stub("PredictionService::stream_raw_predict")
    }

    /// Implements [crate::client::PredictionService::generate_content].
    fn generate_content(
        &self,
        _req: model::GenerateContentRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<model::GenerateContentResponse>>> + Send {
        unimplemented_stub("PredictionService::generate_content")
    }

    /// Implements [crate::client::PredictionService::stream_generate_content].
    fn stream_generate_content(
        &self,
        _req: model::GenerateContentRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<ResponseStream<model::GenerateContentResponse>>> + Send {
        unimplemented_stub("PredictionService::stream_generate_content")
    }

    /// Implements [crate::client::PredictionService::streaming_predict].
    fn streaming_predict(
        &self,
        _requests: Receiver<model::StreamingPredictRequest>,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<ResponseStream<model::StreamingPredictResponse>>> + Send {
        unimplemented_stub("PredictionService::streaming_predict")
    }

    /// Releases the underlying channel or HTTP session.
    fn close(&self) {}
}

/// Defines the trait used to implement [crate::client::EndpointService].
pub trait EndpointService: std::fmt::Debug + Send + Sync {
    /// Implements [crate::client::EndpointService::create_endpoint].
    fn create_endpoint(
        &self,
        _req: model::CreateEndpointRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<Operation>>> + Send {
        unimplemented_stub("EndpointService::create_endpoint")
    }

    /// Implements [crate::client::EndpointService::get_endpoint].
    fn get_endpoint(
        &self,
        _req: model::GetEndpointRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<model::Endpoint>>> + Send {
        unimplemented_stub("EndpointService::get_endpoint")
    }

    /// Implements [crate::client::EndpointService::list_endpoints].
    fn list_endpoints(
        &self,
        _req: model::ListEndpointsRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<model::ListEndpointsResponse>>> + Send {
        unimplemented_stub("EndpointService::list_endpoints")
    }

    /// Implements [crate::client::EndpointService::deploy_model].
    fn deploy_model(
        &self,
        _req: model::DeployModelRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<Operation>>> + Send {
        unimplemented_stub("EndpointService::deploy_model")
    }

    /// Implements [crate::client::EndpointService::get_operation].
    fn get_operation(
        &self,
        _req: model::GetOperationRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<Operation>>> + Send {
        unimplemented_stub("EndpointService::get_operation")
    }

    /// Implements [crate::client::EndpointService::cancel_operation].
    fn cancel_operation(
        &self,
        _req: model::CancelOperationRequest,
        _options: RequestOptions,
    ) -> impl Future<Output = Result<Response<()>>> + Send {
        unimplemented_stub("EndpointService::cancel_operation")
    }

    /// The client-level polling error policy, used by the LRO helpers.
    fn get_polling_error_policy(
        &self,
        _options: &RequestOptions,
    ) -> Option<std::sync::Arc<dyn gax::polling_error_policy::PollingErrorPolicy>> {
        None
    }

    /// The client-level polling backoff policy, used by the LRO helpers.
    fn get_polling_backoff_policy(
        &self,
        _options: &RequestOptions,
    ) -> Option<std::sync::Arc<dyn gax::polling_backoff_policy::PollingBackoffPolicy>> {
        None
    }

    /// Releases the underlying channel or HTTP session.
    fn close(&self) {}
}
