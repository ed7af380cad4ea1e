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

//! The static configuration for each RPC.
//!
//! The transports bind these specs into [CallWrapper][gaxi::call::CallWrapper]s
//! once, when the client is built.

use crate::model;
use gax::error::rpc::Code;
use gaxi::call::{CallSpec, FieldSet, MethodId, RoutingParam, StreamingKind};
use std::time::Duration;

const PREDICTION_SERVICE: &str = "google.cloud.aiplatform.v1beta1.PredictionService";
const ENDPOINT_SERVICE: &str = "google.cloud.aiplatform.v1beta1.EndpointService";
const OPERATIONS: &str = "google.longrunning.Operations";

const DEFAULT_TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));
const RETRY_UNAVAILABLE: &[Code] = &[Code::Unavailable];

/// The methods of the prediction service.
///
/// Used to register interceptors, see [crate::interceptor::PredictionService].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PredictionServiceMethod {
    Predict,
    RawPredict,
    StreamRawPredict,
    GenerateContent,
    StreamGenerateContent,
}

/// The methods of the endpoint service, including the operations mixin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EndpointServiceMethod {
    CreateEndpoint,
    GetEndpoint,
    ListEndpoints,
    DeployModel,
    GetOperation,
    CancelOperation,
}

fn predict_endpoint(r: &model::PredictRequest) -> Option<&str> {
    Some(r.endpoint.as_str())
}

pub(crate) static PREDICT: CallSpec<model::PredictRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "Predict",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "endpoint",
        value: predict_endpoint,
    }],
    required: FieldSet::EMPTY.with(model::PredictRequest::ENDPOINT),
    uuid_fields: FieldSet::EMPTY,
};

fn raw_predict_endpoint(r: &model::RawPredictRequest) -> Option<&str> {
    Some(r.endpoint.as_str())
}

pub(crate) static RAW_PREDICT: CallSpec<model::RawPredictRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "RawPredict",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "endpoint",
        value: raw_predict_endpoint,
    }],
    required: FieldSet::EMPTY.with(model::RawPredictRequest::ENDPOINT),
    uuid_fields: FieldSet::EMPTY,
};

fn stream_raw_predict_endpoint(r: &model::StreamRawPredictRequest) -> Option<&str> {
    Some(r.endpoint.as_str())
}

pub(crate) static STREAM_RAW_PREDICT: CallSpec<model::StreamRawPredictRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "StreamRawPredict",
    },
    kind: StreamingKind::ServerStreaming,
    default_timeout: None,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "endpoint",
        value: stream_raw_predict_endpoint,
    }],
    required: FieldSet::EMPTY.with(model::StreamRawPredictRequest::ENDPOINT),
    uuid_fields: FieldSet::EMPTY,
};

fn generate_content_model(r: &model::GenerateContentRequest) -> Option<&str> {
    Some(r.model.as_str())
}

pub(crate) static GENERATE_CONTENT: CallSpec<model::GenerateContentRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "GenerateContent",
    },
    kind: StreamingKind::Unary,
    default_timeout: None,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "model",
        value: generate_content_model,
    }],
    required: FieldSet::EMPTY.with(model::GenerateContentRequest::MODEL),
    uuid_fields: FieldSet::EMPTY,
};

pub(crate) static STREAM_GENERATE_CONTENT: CallSpec<model::GenerateContentRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "StreamGenerateContent",
    },
    kind: StreamingKind::ServerStreaming,
    default_timeout: None,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "model",
        value: generate_content_model,
    }],
    required: FieldSet::EMPTY.with(model::GenerateContentRequest::MODEL),
    uuid_fields: FieldSet::EMPTY,
};

// The first request carries the endpoint, the routing header cannot be
// computed before the stream starts.
pub(crate) static STREAMING_PREDICT: CallSpec<model::StreamingPredictRequest> = CallSpec {
    id: MethodId {
        service: PREDICTION_SERVICE,
        method: "StreamingPredict",
    },
    kind: StreamingKind::Bidi,
    default_timeout: None,
    retry_codes: &[],
    idempotent: false,
    routing: &[],
    required: FieldSet::EMPTY,
    uuid_fields: FieldSet::EMPTY,
};

fn create_endpoint_parent(r: &model::CreateEndpointRequest) -> Option<&str> {
    Some(r.parent.as_str())
}

pub(crate) static CREATE_ENDPOINT: CallSpec<model::CreateEndpointRequest> = CallSpec {
    id: MethodId {
        service: ENDPOINT_SERVICE,
        method: "CreateEndpoint",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "parent",
        value: create_endpoint_parent,
    }],
    required: FieldSet::EMPTY
        .with(model::CreateEndpointRequest::PARENT)
        .with(model::CreateEndpointRequest::ENDPOINT),
    uuid_fields: FieldSet::EMPTY.with(model::CreateEndpointRequest::REQUEST_ID),
};

fn get_endpoint_name(r: &model::GetEndpointRequest) -> Option<&str> {
    Some(r.name.as_str())
}

pub(crate) static GET_ENDPOINT: CallSpec<model::GetEndpointRequest> = CallSpec {
    id: MethodId {
        service: ENDPOINT_SERVICE,
        method: "GetEndpoint",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: RETRY_UNAVAILABLE,
    idempotent: true,
    routing: &[RoutingParam {
        key: "name",
        value: get_endpoint_name,
    }],
    required: FieldSet::EMPTY.with(model::GetEndpointRequest::NAME),
    uuid_fields: FieldSet::EMPTY,
};

fn list_endpoints_parent(r: &model::ListEndpointsRequest) -> Option<&str> {
    Some(r.parent.as_str())
}

pub(crate) static LIST_ENDPOINTS: CallSpec<model::ListEndpointsRequest> = CallSpec {
    id: MethodId {
        service: ENDPOINT_SERVICE,
        method: "ListEndpoints",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: RETRY_UNAVAILABLE,
    idempotent: true,
    routing: &[RoutingParam {
        key: "parent",
        value: list_endpoints_parent,
    }],
    required: FieldSet::EMPTY.with(model::ListEndpointsRequest::PARENT),
    uuid_fields: FieldSet::EMPTY,
};

fn deploy_model_endpoint(r: &model::DeployModelRequest) -> Option<&str> {
    Some(r.endpoint.as_str())
}

pub(crate) static DEPLOY_MODEL: CallSpec<model::DeployModelRequest> = CallSpec {
    id: MethodId {
        service: ENDPOINT_SERVICE,
        method: "DeployModel",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: &[],
    idempotent: false,
    routing: &[RoutingParam {
        key: "endpoint",
        value: deploy_model_endpoint,
    }],
    required: FieldSet::EMPTY
        .with(model::DeployModelRequest::ENDPOINT)
        .with(model::DeployModelRequest::DEPLOYED_MODEL),
    uuid_fields: FieldSet::EMPTY,
};

fn get_operation_name(r: &model::GetOperationRequest) -> Option<&str> {
    Some(r.name.as_str())
}

pub(crate) static GET_OPERATION: CallSpec<model::GetOperationRequest> = CallSpec {
    id: MethodId {
        service: OPERATIONS,
        method: "GetOperation",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: RETRY_UNAVAILABLE,
    idempotent: true,
    routing: &[RoutingParam {
        key: "name",
        value: get_operation_name,
    }],
    required: FieldSet::EMPTY.with(model::GetOperationRequest::NAME),
    uuid_fields: FieldSet::EMPTY,
};

fn cancel_operation_name(r: &model::CancelOperationRequest) -> Option<&str> {
    Some(r.name.as_str())
}

pub(crate) static CANCEL_OPERATION: CallSpec<model::CancelOperationRequest> = CallSpec {
    id: MethodId {
        service: OPERATIONS,
        method: "CancelOperation",
    },
    kind: StreamingKind::Unary,
    default_timeout: DEFAULT_TIMEOUT,
    retry_codes: &[],
    idempotent: true,
    routing: &[RoutingParam {
        key: "name",
        value: cancel_operation_name,
    }],
    required: FieldSet::EMPTY.with(model::CancelOperationRequest::NAME),
    uuid_fields: FieldSet::EMPTY,
};

#[cfg(test)]
mod tests {
    use super::*;
    use gaxi::call::RequestFields;

    #[test]
    fn uuid_fields_are_not_required() {
        let specs = [
            (CREATE_ENDPOINT.required, CREATE_ENDPOINT.uuid_fields),
            (PREDICT.required, PREDICT.uuid_fields),
            (GET_OPERATION.required, GET_OPERATION.uuid_fields),
        ];
        for (required, uuid) in specs {
            assert!(uuid.difference(required) == uuid, "{required:?} {uuid:?}");
        }
    }

    #[test]
    fn grpc_paths() {
        assert_eq!(
            PREDICT.id.grpc_path(),
            "/google.cloud.aiplatform.v1beta1.PredictionService/Predict"
        );
        assert_eq!(
            GET_OPERATION.id.grpc_path(),
            "/google.longrunning.Operations/GetOperation"
        );
        assert_eq!(
            CREATE_ENDPOINT.id.to_string(),
            "google.cloud.aiplatform.v1beta1.EndpointService.CreateEndpoint"
        );
    }

    #[test]
    fn required_fields() {
        let request = model::CreateEndpointRequest::new().set_parent("projects/p/locations/l");
        let err = CREATE_ENDPOINT.check_required(&request).unwrap_err();
        assert!(err.is_binding(), "{err:?}");
        assert!(err.to_string().contains("endpoint"), "{err}");
        let request = request.set_endpoint(model::Endpoint::new());
        assert!(CREATE_ENDPOINT.check_required(&request).is_ok());
        assert!(request.presence().contains(model::CreateEndpointRequest::ENDPOINT));
    }

    #[test]
    fn routing() {
        let request = model::GenerateContentRequest::new().set_model("model_value");
        let values = GENERATE_CONTENT
            .routing
            .iter()
            .map(|p| (p.key, (p.value)(&request)))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![("model", Some("model_value"))]);
    }
}
