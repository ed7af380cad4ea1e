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

//! The wire representation of `google.longrunning.Operation`.
//!
//! Each transport decodes its own representation, and then converts it to the
//! transport-neutral [lro::model::Operation].

use gax::error::rpc::Status;
use gaxi::grpc::RpcStatus;
use lro::model::{Operation, Payload};

/// The protobuf message, received over gRPC.
#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct OperationProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<prost_types::Any>,
    #[prost(bool, tag = "3")]
    pub done: bool,
    #[prost(oneof = "OperationResult", tags = "4, 5")]
    pub result: Option<OperationResult>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub(crate) enum OperationResult {
    #[prost(message, tag = "4")]
    Error(RpcStatus),
    #[prost(message, tag = "5")]
    Response(prost_types::Any),
}

impl From<OperationProto> for Operation {
    fn from(value: OperationProto) -> Self {
        let operation = Operation::new()
            .set_name(value.name)
            .set_done(value.done)
            .set_metadata(value.metadata.map(Payload::Binary));
        match value.result {
            None => operation,
            Some(OperationResult::Error(e)) => operation.set_error(Status::from(e)),
            Some(OperationResult::Response(any)) => operation.set_response(Payload::Binary(any)),
        }
    }
}

/// The JSON object, received over HTTP.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct OperationJson {
    pub name: String,
    pub metadata: Option<serde_json::Value>,
    pub done: bool,
    pub error: Option<Status>,
    pub response: Option<serde_json::Value>,
}

impl From<OperationJson> for Operation {
    fn from(value: OperationJson) -> Self {
        let operation = Operation::new()
            .set_name(value.name)
            .set_done(value.done)
            .set_metadata(value.metadata.map(Payload::Json));
        match (value.error, value.response) {
            (Some(e), _) => operation.set_error(e),
            (None, Some(r)) => operation.set_response(Payload::Json(r)),
            (None, None) => operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeployModelResponse;
    use gax::error::rpc::Code;
    use lro::model::{FromPayload, OperationResult as Outcome};
    use pretty_assertions::assert_eq;
    use prost::Message;
    use serde_json::json;

    #[test]
    fn from_proto() -> anyhow::Result<()> {
        let response = DeployModelResponse::default();
        let proto = OperationProto {
            name: "projects/p/locations/l/operations/123".into(),
            metadata: None,
            done: true,
            result: Some(OperationResult::Response(prost_types::Any {
                type_url: "type.googleapis.com/google.cloud.aiplatform.v1beta1.DeployModelResponse".into(),
                value: response.encode_to_vec(),
            })),
        };
        let operation = Operation::from(proto);
        assert_eq!(operation.name, "projects/p/locations/l/operations/123");
        assert!(operation.done);
        let Some(Outcome::Response(payload)) = &operation.result else {
            panic!("expected a response in {operation:?}");
        };
        assert_eq!(DeployModelResponse::from_payload(payload)?, response);
        Ok(())
    }

    #[test]
    fn from_proto_error() {
        let proto = OperationProto {
            name: "op".into(),
            done: true,
            result: Some(OperationResult::Error(RpcStatus {
                code: 10,
                message: "uh-oh".into(),
                details: Vec::new(),
            })),
            ..Default::default()
        };
        let operation = Operation::from(proto);
        let Some(Outcome::Error(status)) = &operation.result else {
            panic!("expected an error in {operation:?}");
        };
        assert_eq!(status.code, Code::Aborted);
        assert_eq!(status.message, "uh-oh");
    }

    #[test]
    fn from_json() -> anyhow::Result<()> {
        let json = json!({
            "name": "op",
            "metadata": {"@type": "type.googleapis.com/google.cloud.aiplatform.v1beta1.DeployModelOperationMetadata"},
            "done": true,
            "error": {"code": 9, "message": "precondition"},
        });
        let operation = Operation::from(serde_json::from_value::<OperationJson>(json)?);
        assert!(operation.done);
        assert!(operation.metadata.is_some(), "{operation:?}");
        let Some(Outcome::Error(status)) = &operation.result else {
            panic!("expected an error in {operation:?}");
        };
        assert_eq!(status.code, Code::FailedPrecondition);

        let json = json!({"name": "op"});
        let operation = Operation::from(serde_json::from_value::<OperationJson>(json)?);
        assert_eq!(operation, Operation::new().set_name("op"));
        Ok(())
    }
}
