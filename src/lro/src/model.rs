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

//! A transport-neutral representation of long-running operations.
//!
//! Service crates receive operations either as protobuf messages (gRPC) or as
//! JSON objects (HTTP/JSON). They convert both into [Operation], keeping the
//! embedded payloads in their original encoding until the application asks for
//! a typed value.

use gax::Result;
use gax::error::Error;
use gax::error::rpc::Status;

/// An `Any`-like payload, either the response or the metadata of an operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A protobuf `Any`, received over gRPC.
    Binary(prost_types::Any),
    /// A JSON object with an `@type` field, received over HTTP/JSON.
    Json(serde_json::Value),
}

impl Payload {
    /// The type URL, e.g. `type.googleapis.com/google.cloud.aiplatform.v1beta1.DeployModelResponse`.
    pub fn type_url(&self) -> Option<&str> {
        match self {
            Self::Binary(any) => Some(any.type_url.as_str()),
            Self::Json(v) => v.get("@type").and_then(|t| t.as_str()),
        }
    }
}

/// Types that can be decoded from a [Payload].
pub trait FromPayload: Sized {
    fn from_payload(payload: &Payload) -> Result<Self>;
}

impl<T> FromPayload for T
where
    T: prost::Message + Default + serde::de::DeserializeOwned,
{
    fn from_payload(payload: &Payload) -> Result<Self> {
        match payload {
            Payload::Binary(any) => T::decode(any.value.as_slice()).map_err(Error::deser),
            Payload::Json(value) => {
                let mut value = value.clone();
                if let Some(object) = value.as_object_mut() {
                    object.remove("@type");
                }
                serde_json::from_value(value).map_err(Error::deser)
            }
        }
    }
}

/// The outcome of a completed operation.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationResult {
    Response(Payload),
    Error(Status),
}

/// The state of a long-running operation, as last reported by the service.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Operation {
    /// The name assigned by the service, used to poll the operation.
    pub name: String,
    /// Once `true` the operation is terminal, and never changes again.
    pub done: bool,
    pub metadata: Option<Payload>,
    pub result: Option<OperationResult>,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    pub fn set_done(mut self, v: bool) -> Self {
        self.done = v;
        self
    }

    pub fn set_metadata<T: Into<Option<Payload>>>(mut self, v: T) -> Self {
        self.metadata = v.into();
        self
    }

    pub fn set_response(mut self, v: Payload) -> Self {
        self.result = Some(OperationResult::Response(v));
        self
    }

    pub fn set_error(mut self, v: Status) -> Self {
        self.result = Some(OperationResult::Error(v));
        self
    }

    pub(crate) fn response(&self) -> Option<&Payload> {
        match &self.result {
            Some(OperationResult::Response(p)) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&Status> {
        match &self.result {
            Some(OperationResult::Error(s)) => Some(s),
            _ => None,
        }
    }
}
