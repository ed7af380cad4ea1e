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

//! The messages used by the Vertex AI Prediction and Endpoint services.
//!
//! Every message implements [prost::Message] for the gRPC transport and the
//! serde traits for the HTTP/JSON transport. Field presence for request
//! messages is exposed through [RequestFields], keyed by the field number.

use gaxi::call::{FieldSet, RequestFields};
use std::collections::HashMap;

pub(crate) mod wkt;

/// Arbitrary HTTP payload, sent and received without interpretation.
///
/// Used by methods such as `RawPredict`, where the format of the body is
/// defined by the deployed model.
#[serde_with::serde_as]
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpBody {
    /// The HTTP `Content-Type` of the body, e.g. `application/json`.
    #[prost(string, tag = "1")]
    pub content_type: String,

    /// The raw body.
    #[prost(bytes = "vec", tag = "2")]
    #[serde_as(as = "serde_with::base64::Base64")]
    pub data: Vec<u8>,

    /// Application specific metadata, for streaming APIs.
    #[prost(message, repeated, tag = "3")]
    #[serde(with = "wkt::any_list", skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<prost_types::Any>,
}

impl HttpBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [content_type][HttpBody::content_type].
    pub fn set_content_type<T: Into<String>>(mut self, v: T) -> Self {
        self.content_type = v.into();
        self
    }

    /// Sets the value of [data][HttpBody::data].
    pub fn set_data<T: Into<Vec<u8>>>(mut self, v: T) -> Self {
        self.data = v.into();
        self
    }
}

/// Request message for `PredictionService.Predict`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PredictRequest {
    /// The name of the endpoint requested to serve the prediction.
    ///
    /// Format: `projects/{project}/locations/{location}/endpoints/{endpoint}`
    #[prost(string, tag = "1")]
    pub endpoint: String,

    /// The instances that are the input to the prediction call.
    #[prost(message, repeated, tag = "2")]
    #[serde(with = "wkt::value_list")]
    pub instances: Vec<prost_types::Value>,

    /// The parameters that govern the prediction.
    #[prost(message, optional, tag = "3")]
    #[serde(with = "wkt::optional_value", skip_serializing_if = "Option::is_none")]
    pub parameters: Option<prost_types::Value>,
}

impl PredictRequest {
    pub(crate) const ENDPOINT: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [endpoint][PredictRequest::endpoint].
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = v.into();
        self
    }

    /// Sets the value of [instances][PredictRequest::instances].
    pub fn set_instances<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<prost_types::Value>,
    {
        self.instances = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the value of [parameters][PredictRequest::parameters].
    pub fn set_parameters<T: Into<prost_types::Value>>(mut self, v: T) -> Self {
        self.parameters = Some(v.into());
        self
    }
}

impl RequestFields for PredictRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.endpoint.is_empty() {
            set.insert(1);
        }
        if !self.instances.is_empty() {
            set.insert(2);
        }
        if self.parameters.is_some() {
            set.insert(3);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "endpoint",
            2 => "instances",
            3 => "parameters",
            _ => "unknown",
        }
    }
}

/// Response message for `PredictionService.Predict`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PredictResponse {
    /// The predictions that are the output of the predictions call.
    #[prost(message, repeated, tag = "1")]
    #[serde(with = "wkt::value_list")]
    pub predictions: Vec<prost_types::Value>,

    /// ID of the endpoint's deployed model that served this prediction.
    #[prost(string, tag = "2")]
    pub deployed_model_id: String,

    /// The resource name of the model which is deployed as the deployed model.
    #[prost(string, tag = "3")]
    pub model: String,

    /// The display name of the model.
    #[prost(string, tag = "4")]
    pub model_display_name: String,

    /// The version ID of the model.
    #[prost(string, tag = "5")]
    pub model_version_id: String,
}

/// Request message for `PredictionService.RawPredict`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPredictRequest {
    /// The name of the endpoint requested to serve the prediction.
    #[prost(string, tag = "1")]
    pub endpoint: String,

    /// The prediction input, passed through to the model unchanged.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_body: Option<HttpBody>,
}

impl RawPredictRequest {
    pub(crate) const ENDPOINT: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [endpoint][RawPredictRequest::endpoint].
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = v.into();
        self
    }

    /// Sets the value of [http_body][RawPredictRequest::http_body].
    pub fn set_http_body<T: Into<HttpBody>>(mut self, v: T) -> Self {
        self.http_body = Some(v.into());
        self
    }
}

impl RequestFields for RawPredictRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.endpoint.is_empty() {
            set.insert(1);
        }
        if self.http_body.is_some() {
            set.insert(2);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "endpoint",
            2 => "http_body",
            _ => "unknown",
        }
    }
}

/// Request message for `PredictionService.StreamRawPredict`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamRawPredictRequest {
    /// The name of the endpoint requested to serve the prediction.
    #[prost(string, tag = "1")]
    pub endpoint: String,

    /// The prediction input.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_body: Option<HttpBody>,
}

impl StreamRawPredictRequest {
    pub(crate) const ENDPOINT: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [endpoint][StreamRawPredictRequest::endpoint].
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = v.into();
        self
    }

    /// Sets the value of [http_body][StreamRawPredictRequest::http_body].
    pub fn set_http_body<T: Into<HttpBody>>(mut self, v: T) -> Self {
        self.http_body = Some(v.into());
        self
    }
}

impl RequestFields for StreamRawPredictRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.endpoint.is_empty() {
            set.insert(1);
        }
        if self.http_body.is_some() {
            set.insert(2);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "endpoint",
            2 => "http_body",
            _ => "unknown",
        }
    }
}

/// A datatype containing media that is part of a multi-part [Content] message.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Part {
    /// Text part.
    #[prost(string, tag = "1")]
    pub text: String,
}

impl Part {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [text][Part::text].
    pub fn set_text<T: Into<String>>(mut self, v: T) -> Self {
        self.text = v.into();
        self
    }
}

/// The base structured datatype containing multi-part content of a message.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Content {
    /// The producer of the content, either `user` or `model`.
    #[prost(string, tag = "1")]
    pub role: String,

    /// Ordered parts that constitute a single message.
    #[prost(message, repeated, tag = "2")]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [role][Content::role].
    pub fn set_role<T: Into<String>>(mut self, v: T) -> Self {
        self.role = v.into();
        self
    }

    /// Sets the value of [parts][Content::parts].
    pub fn set_parts<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Part>,
    {
        self.parts = v.into_iter().map(Into::into).collect();
        self
    }
}

/// Request message for `PredictionService.GenerateContent` and
/// `PredictionService.StreamGenerateContent`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The content of the current conversation with the model.
    #[prost(message, repeated, tag = "2")]
    pub contents: Vec<Content>,

    /// The name of the publisher model or tuned model endpoint to use.
    ///
    /// Format: `projects/{project}/locations/{location}/endpoints/{endpoint}`
    /// or `projects/{project}/locations/{location}/publishers/*/models/*`
    #[prost(string, tag = "5")]
    pub model: String,

    /// The user provided system instructions for the model.
    #[prost(message, optional, tag = "8")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    pub(crate) const MODEL: u32 = 5;
    pub(crate) const CONTENTS: u32 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [model][GenerateContentRequest::model].
    pub fn set_model<T: Into<String>>(mut self, v: T) -> Self {
        self.model = v.into();
        self
    }

    /// Sets the value of [contents][GenerateContentRequest::contents].
    pub fn set_contents<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Content>,
    {
        self.contents = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the value of [system_instruction][GenerateContentRequest::system_instruction].
    pub fn set_system_instruction<T: Into<Content>>(mut self, v: T) -> Self {
        self.system_instruction = Some(v.into());
        self
    }
}

impl RequestFields for GenerateContentRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.contents.is_empty() {
            set.insert(2);
        }
        if !self.model.is_empty() {
            set.insert(5);
        }
        if self.system_instruction.is_some() {
            set.insert(8);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            2 => "contents",
            5 => "model",
            8 => "system_instruction",
            _ => "unknown",
        }
    }
}

/// A response candidate generated from the model.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Candidate {
    /// The index of the candidate.
    #[prost(int32, tag = "1")]
    pub index: i32,

    /// Content parts of the candidate.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// The reason why the model stopped generating tokens.
    #[prost(int32, tag = "3")]
    pub finish_reason: i32,
}

/// Response message for `PredictionService.GenerateContent`.
///
/// `StreamGenerateContent` returns a sequence of these messages, each with a
/// fragment of the candidates.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates.
    #[prost(message, repeated, tag = "2")]
    pub candidates: Vec<Candidate>,

    /// The model version used to generate the response.
    #[prost(string, tag = "11")]
    pub model_version: String,
}

impl GenerateContentResponse {
    /// The text of the first part in the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// A tensor value, used by the streaming prediction methods.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tensor {
    /// The data type of the tensor.
    #[prost(int32, tag = "1")]
    pub dtype: i32,

    /// Shape of the tensor.
    #[prost(int64, repeated, tag = "2")]
    pub shape: Vec<i64>,

    #[prost(bool, repeated, tag = "3")]
    pub bool_val: Vec<bool>,

    #[prost(float, repeated, tag = "5")]
    pub float_val: Vec<f32>,

    #[prost(double, repeated, tag = "6")]
    pub double_val: Vec<f64>,

    #[prost(int64, repeated, tag = "8")]
    pub int64_val: Vec<i64>,

    #[prost(string, repeated, tag = "14")]
    pub string_val: Vec<String>,
}

/// Request message for `PredictionService.StreamingPredict`.
///
/// The first message must contain the `endpoint` field, the following
/// messages may omit it.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamingPredictRequest {
    /// The name of the endpoint requested to serve the prediction.
    #[prost(string, tag = "1")]
    pub endpoint: String,

    /// The prediction input.
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<Tensor>,

    /// The parameters that govern the prediction.
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Tensor>,
}

impl StreamingPredictRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [endpoint][StreamingPredictRequest::endpoint].
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = v.into();
        self
    }

    /// Sets the value of [inputs][StreamingPredictRequest::inputs].
    pub fn set_inputs<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Tensor>,
    {
        self.inputs = v.into_iter().map(Into::into).collect();
        self
    }
}

impl RequestFields for StreamingPredictRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.endpoint.is_empty() {
            set.insert(1);
        }
        if !self.inputs.is_empty() {
            set.insert(2);
        }
        if self.parameters.is_some() {
            set.insert(3);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "endpoint",
            2 => "inputs",
            3 => "parameters",
            _ => "unknown",
        }
    }
}

/// Response message for `PredictionService.StreamingPredict`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamingPredictResponse {
    /// The prediction output.
    #[prost(message, repeated, tag = "1")]
    pub outputs: Vec<Tensor>,

    /// The parameters that govern the prediction.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Tensor>,
}

/// A deployment of a model.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployedModel {
    /// The ID of the deployed model, unique within the endpoint.
    #[prost(string, tag = "1")]
    pub id: String,

    /// The resource name of the model this deployment is for.
    #[prost(string, tag = "2")]
    pub model: String,

    /// The display name of the deployed model.
    #[prost(string, tag = "3")]
    pub display_name: String,
}

impl DeployedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [id][DeployedModel::id].
    pub fn set_id<T: Into<String>>(mut self, v: T) -> Self {
        self.id = v.into();
        self
    }

    /// Sets the value of [model][DeployedModel::model].
    pub fn set_model<T: Into<String>>(mut self, v: T) -> Self {
        self.model = v.into();
        self
    }

    /// Sets the value of [display_name][DeployedModel::display_name].
    pub fn set_display_name<T: Into<String>>(mut self, v: T) -> Self {
        self.display_name = v.into();
        self
    }
}

/// Models are deployed into an endpoint, and afterwards the endpoint is
/// called to obtain predictions and explanations.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoint {
    /// The resource name of the endpoint.
    #[prost(string, tag = "1")]
    pub name: String,

    /// The display name of the endpoint.
    #[prost(string, tag = "2")]
    pub display_name: String,

    /// The description of the endpoint.
    #[prost(string, tag = "3")]
    pub description: String,

    /// The models deployed in this endpoint.
    #[prost(message, repeated, tag = "4")]
    pub deployed_models: Vec<DeployedModel>,

    /// A map from a deployed model ID to the percentage of traffic it receives.
    #[prost(map = "string, int32", tag = "5")]
    pub traffic_split: HashMap<String, i32>,

    /// Used to perform consistent read-modify-write updates.
    #[prost(string, tag = "6")]
    pub etag: String,

    /// The labels with user-defined metadata to organize your endpoints.
    #[prost(map = "string, string", tag = "7")]
    pub labels: HashMap<String, String>,
}

impl Endpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [name][Endpoint::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [display_name][Endpoint::display_name].
    pub fn set_display_name<T: Into<String>>(mut self, v: T) -> Self {
        self.display_name = v.into();
        self
    }

    /// Sets the value of [description][Endpoint::description].
    pub fn set_description<T: Into<String>>(mut self, v: T) -> Self {
        self.description = v.into();
        self
    }
}

/// Request message for `EndpointService.CreateEndpoint`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateEndpointRequest {
    /// The resource name of the location where the endpoint is created.
    ///
    /// Format: `projects/{project}/locations/{location}`
    #[prost(string, tag = "1")]
    pub parent: String,

    /// The endpoint to create.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,

    /// The ID to use for the endpoint, which becomes the final component of
    /// the endpoint resource name. The service assigns an ID if empty.
    #[prost(string, tag = "4")]
    pub endpoint_id: String,

    /// A unique identifier for this request, used to deduplicate retries.
    ///
    /// The client library sets this field to a new UUID4 when it is empty.
    #[prost(string, tag = "5")]
    pub request_id: String,
}

impl CreateEndpointRequest {
    pub(crate) const PARENT: u32 = 1;
    pub(crate) const ENDPOINT: u32 = 2;
    pub(crate) const REQUEST_ID: u32 = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [parent][CreateEndpointRequest::parent].
    pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
        self.parent = v.into();
        self
    }

    /// Sets the value of [endpoint][CreateEndpointRequest::endpoint].
    pub fn set_endpoint<T: Into<Endpoint>>(mut self, v: T) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Sets the value of [endpoint_id][CreateEndpointRequest::endpoint_id].
    pub fn set_endpoint_id<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint_id = v.into();
        self
    }

    /// Sets the value of [request_id][CreateEndpointRequest::request_id].
    pub fn set_request_id<T: Into<String>>(mut self, v: T) -> Self {
        self.request_id = v.into();
        self
    }
}

impl RequestFields for CreateEndpointRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.parent.is_empty() {
            set.insert(1);
        }
        if self.endpoint.is_some() {
            set.insert(2);
        }
        if !self.endpoint_id.is_empty() {
            set.insert(4);
        }
        if !self.request_id.is_empty() {
            set.insert(5);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "parent",
            2 => "endpoint",
            4 => "endpoint_id",
            5 => "request_id",
            _ => "unknown",
        }
    }

    fn set_uuid_field(&mut self, bit: u32, value: String) {
        if bit == Self::REQUEST_ID {
            self.request_id = value;
        }
    }
}

/// Runtime operation information for `EndpointService.CreateEndpoint`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateEndpointOperationMetadata {
    /// The deployment stage of the endpoint, if any.
    #[prost(int32, tag = "2")]
    pub deployment_stage: i32,
}

/// Request message for `EndpointService.GetEndpoint`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetEndpointRequest {
    /// The name of the endpoint resource.
    ///
    /// Format: `projects/{project}/locations/{location}/endpoints/{endpoint}`
    #[prost(string, tag = "1")]
    pub name: String,
}

impl GetEndpointRequest {
    pub(crate) const NAME: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [name][GetEndpointRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl RequestFields for GetEndpointRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.name.is_empty() {
            set.insert(1);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "name",
            _ => "unknown",
        }
    }
}

/// Request message for `EndpointService.ListEndpoints`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListEndpointsRequest {
    /// The resource name of the location from which to list the endpoints.
    ///
    /// Format: `projects/{project}/locations/{location}`
    #[prost(string, tag = "1")]
    pub parent: String,

    /// An expression for filtering the results of the request.
    #[prost(string, tag = "2")]
    pub filter: String,

    /// The standard list page size.
    #[prost(int32, tag = "3")]
    pub page_size: i32,

    /// The standard list page token.
    #[prost(string, tag = "4")]
    pub page_token: String,

    /// A comma-separated list of fields to order by.
    #[prost(string, tag = "6")]
    pub order_by: String,
}

impl ListEndpointsRequest {
    pub(crate) const PARENT: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [parent][ListEndpointsRequest::parent].
    pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
        self.parent = v.into();
        self
    }

    /// Sets the value of [filter][ListEndpointsRequest::filter].
    pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
        self.filter = v.into();
        self
    }

    /// Sets the value of [page_size][ListEndpointsRequest::page_size].
    pub fn set_page_size<T: Into<i32>>(mut self, v: T) -> Self {
        self.page_size = v.into();
        self
    }

    /// Sets the value of [page_token][ListEndpointsRequest::page_token].
    pub fn set_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.page_token = v.into();
        self
    }

    /// Sets the value of [order_by][ListEndpointsRequest::order_by].
    pub fn set_order_by<T: Into<String>>(mut self, v: T) -> Self {
        self.order_by = v.into();
        self
    }
}

impl RequestFields for ListEndpointsRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.parent.is_empty() {
            set.insert(1);
        }
        if !self.filter.is_empty() {
            set.insert(2);
        }
        if self.page_size != 0 {
            set.insert(3);
        }
        if !self.page_token.is_empty() {
            set.insert(4);
        }
        if !self.order_by.is_empty() {
            set.insert(6);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "parent",
            2 => "filter",
            3 => "page_size",
            4 => "page_token",
            6 => "order_by",
            _ => "unknown",
        }
    }
}

/// Response message for `EndpointService.ListEndpoints`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListEndpointsResponse {
    /// List of endpoints in the requested page.
    #[prost(message, repeated, tag = "1")]
    pub endpoints: Vec<Endpoint>,

    /// A token to retrieve the next page of results. Empty on the last page.
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

impl gax::paginator::PageableResponse for ListEndpointsResponse {
    type PageItem = Endpoint;

    fn items(self) -> Vec<Self::PageItem> {
        self.endpoints
    }

    fn next_page_token(&self) -> String {
        self.next_page_token.clone()
    }
}

/// Request message for `EndpointService.DeployModel`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployModelRequest {
    /// The name of the endpoint resource into which to deploy a model.
    #[prost(string, tag = "1")]
    pub endpoint: String,

    /// The model to be deployed into the endpoint.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_model: Option<DeployedModel>,

    /// A map from a deployed model ID to the percentage of this endpoint's
    /// traffic that should be forwarded to that deployed model.
    ///
    /// Use the key `0` to refer to the model being deployed.
    #[prost(map = "string, int32", tag = "3")]
    pub traffic_split: HashMap<String, i32>,
}

impl DeployModelRequest {
    pub(crate) const ENDPOINT: u32 = 1;
    pub(crate) const DEPLOYED_MODEL: u32 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [endpoint][DeployModelRequest::endpoint].
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = v.into();
        self
    }

    /// Sets the value of [deployed_model][DeployModelRequest::deployed_model].
    pub fn set_deployed_model<T: Into<DeployedModel>>(mut self, v: T) -> Self {
        self.deployed_model = Some(v.into());
        self
    }

    /// Sets the value of [traffic_split][DeployModelRequest::traffic_split].
    pub fn set_traffic_split<T, K, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<i32>,
    {
        self.traffic_split = v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }
}

impl RequestFields for DeployModelRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.endpoint.is_empty() {
            set.insert(1);
        }
        if self.deployed_model.is_some() {
            set.insert(2);
        }
        if !self.traffic_split.is_empty() {
            set.insert(3);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "endpoint",
            2 => "deployed_model",
            3 => "traffic_split",
            _ => "unknown",
        }
    }
}

/// Response message for `EndpointService.DeployModel`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployModelResponse {
    /// The deployed model.
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_model: Option<DeployedModel>,
}

/// Runtime operation information for `EndpointService.DeployModel`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployModelOperationMetadata {
    /// The deployment stage of the model.
    #[prost(int32, tag = "2")]
    pub deployment_stage: i32,
}

/// The request message for `Operations.GetOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetOperationRequest {
    /// The name of the operation resource.
    #[prost(string, tag = "1")]
    pub name: String,
}

impl GetOperationRequest {
    pub(crate) const NAME: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [name][GetOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl RequestFields for GetOperationRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.name.is_empty() {
            set.insert(1);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "name",
            _ => "unknown",
        }
    }
}

/// The request message for `Operations.CancelOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CancelOperationRequest {
    /// The name of the operation resource to be cancelled.
    #[prost(string, tag = "1")]
    pub name: String,
}

impl CancelOperationRequest {
    pub(crate) const NAME: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [name][CancelOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl RequestFields for CancelOperationRequest {
    fn presence(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        if !self.name.is_empty() {
            set.insert(1);
        }
        set
    }

    fn field_name(bit: u32) -> &'static str {
        match bit {
            1 => "name",
            _ => "unknown",
        }
    }
}
