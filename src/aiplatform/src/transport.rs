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

//! The implementations of the stubs for each transport.
//!
//! Both transports bind every [CallSpec][gaxi::call::CallSpec] of a service
//! into a [CallWrapper] when they are created, and reuse the wrappers for all
//! calls.

use crate::method;
use crate::model;
use gaxi::call::{CallWrapper, Wrap};

pub(crate) mod grpc;
pub(crate) mod longrunning;
pub(crate) mod rest;

/// The wrapped methods of the prediction service.
#[derive(Debug)]
pub(crate) struct PredictionServiceMethods {
    pub predict: CallWrapper<model::PredictRequest>,
    pub raw_predict: CallWrapper<model::RawPredictRequest>,
    pub stream_raw_predict: CallWrapper<model::StreamRawPredictRequest>,
    pub generate_content: CallWrapper<model::GenerateContentRequest>,
    pub stream_generate_content: CallWrapper<model::GenerateContentRequest>,
    pub streaming_predict: CallWrapper<model::StreamingPredictRequest>,
}

impl PredictionServiceMethods {
    pub fn new<W: Wrap>(w: &W) -> Self {
        Self {
            predict: w.wrap(&method::PREDICT),
            raw_predict: w.wrap(&method::RAW_PREDICT),
            stream_raw_predict: w.wrap(&method::STREAM_RAW_PREDICT),
            generate_content: w.wrap(&method::GENERATE_CONTENT),
            stream_generate_content: w.wrap(&method::STREAM_GENERATE_CONTENT),
            streaming_predict: w.wrap(&method::STREAMING_PREDICT),
        }
    }
}

/// The wrapped methods of the endpoint service.
#[derive(Debug)]
pub(crate) struct EndpointServiceMethods {
    pub create_endpoint: CallWrapper<model::CreateEndpointRequest>,
    pub get_endpoint: CallWrapper<model::GetEndpointRequest>,
    pub list_endpoints: CallWrapper<model::ListEndpointsRequest>,
    pub deploy_model: CallWrapper<model::DeployModelRequest>,
    pub get_operation: CallWrapper<model::GetOperationRequest>,
    pub cancel_operation: CallWrapper<model::CancelOperationRequest>,
}

impl EndpointServiceMethods {
    pub fn new<W: Wrap>(w: &W) -> Self {
        Self {
            create_endpoint: w.wrap(&method::CREATE_ENDPOINT),
            get_endpoint: w.wrap(&method::GET_ENDPOINT),
            list_endpoints: w.wrap(&method::LIST_ENDPOINTS),
            deploy_model: w.wrap(&method::DEPLOY_MODEL),
            get_operation: w.wrap(&method::GET_OPERATION),
            cancel_operation: w.wrap(&method::CANCEL_OPERATION),
        }
    }
}
