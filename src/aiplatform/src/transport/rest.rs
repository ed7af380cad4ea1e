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

//! The HTTP/JSON implementation of the stubs.
//!
//! Each method transcodes the request into an HTTP method, a path, query
//! parameters and an optional body. Required path fields are validated before
//! any request is sent.

use super::longrunning::OperationJson;
use super::{EndpointServiceMethods, PredictionServiceMethods};
use crate::Result;
use crate::interceptor;
use crate::method::{EndpointServiceMethod, PredictionServiceMethod};
use crate::model;
use futures::StreamExt;
use gax::client_builder::Result as BuilderResult;
use gax::error::Error;
use gax::options::RequestOptions;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use gax::response::{Parts, Response};
use gaxi::call::{CallWrapper, RequestFields};
use gaxi::http::ReqwestClient;
use gaxi::http::interceptor::Hook;
use gaxi::options::{ClientConfig, ServiceInfo};
use gaxi::path_parameter::{mismatch, missing, required, try_match};
use gaxi::query_parameter::{QueryPairs, QueryParameter};
use gaxi::routing_parameter::Segment::{self, Literal, MultiWildcard, SingleWildcard};
use gaxi::streaming::ResponseStream;
use lro::model::Operation;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

const LOCATION: &[Segment] = &[
    Literal("projects/"),
    SingleWildcard,
    Literal("/locations/"),
    SingleWildcard,
];

const ENDPOINT: &[Segment] = &[
    Literal("projects/"),
    SingleWildcard,
    Literal("/locations/"),
    SingleWildcard,
    Literal("/endpoints/"),
    SingleWildcard,
];

const PUBLISHER_MODEL: &[Segment] = &[
    Literal("projects/"),
    SingleWildcard,
    Literal("/locations/"),
    SingleWildcard,
    Literal("/publishers/"),
    SingleWildcard,
    Literal("/models/"),
    SingleWildcard,
];

const OPERATION: &[Segment] = &[
    Literal("projects/"),
    SingleWildcard,
    Literal("/locations/"),
    SingleWildcard,
    Literal("/"),
    MultiWildcard,
];

/// A transcoded request.
#[derive(Debug)]
struct HttpRequest {
    method: Method,
    path: String,
    query: QueryPairs,
    body: Option<Value>,
}

impl HttpRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: QueryPairs::new(),
            body: None,
        }
    }

    fn with_body<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).map_err(Error::ser)?);
        Ok(self)
    }
}

type Transcode<R> = fn(&R) -> Result<HttpRequest>;

/// Makes a unary call, decoding the response as `W` and converting it to `O`.
async fn unary<R, W, O>(
    inner: &ReqwestClient,
    w: &CallWrapper<R>,
    hook: &Hook<R, O>,
    req: R,
    options: RequestOptions,
    transcode: Transcode<R>,
    convert: fn(W) -> O,
) -> Result<Response<O>>
where
    R: RequestFields + Clone + Send + Sync + 'static,
    W: serde::de::DeserializeOwned + Default + Send,
    O: Send,
{
    w.call(req, options, |req, mut attempt| async move {
        let req = hook.apply_pre(req, &mut attempt.metadata);
        w.spec().check_required(&req)?;
        let http = transcode(&req)?;
        let builder = inner.builder(http.method, http.path)?.query(&http.query);
        let response = inner
            .execute::<Value, W>(builder, http.body.as_ref(), attempt)
            .await?;
        Ok(hook.apply_post(response.map(convert)))
    })
    .await
}

/// Starts a server-streaming call. The `post` hooks run for each message.
async fn server_streaming<R, O>(
    inner: &ReqwestClient,
    w: &CallWrapper<R>,
    hook: &Hook<R, O>,
    req: R,
    options: RequestOptions,
    transcode: Transcode<R>,
) -> Result<ResponseStream<O>>
where
    R: RequestFields + Clone + Send + Sync + 'static,
    O: serde::de::DeserializeOwned + Send + 'static,
{
    let token = options.cancellation_token().clone();
    let stream = w
        .call(req, options, |req, mut attempt| async move {
            let req = hook.apply_pre(req, &mut attempt.metadata);
            w.spec().check_required(&req)?;
            let http = transcode(&req)?;
            let builder = inner.builder(http.method, http.path)?.query(&http.query);
            inner
                .server_streaming::<Value, O>(builder, http.body.as_ref(), attempt)
                .await
        })
        .await?;
    let headers = stream.headers().clone();
    let hook = hook.clone();
    let parts = Parts::new().set_headers(headers.clone());
    let stream = stream.map(move |item| {
        item.map(|v| {
            hook.apply_post(Response::from_parts(parts.clone(), v))
                .into_body()
        })
    });
    Ok(ResponseStream::new(headers, stream).with_cancellation(token))
}

fn model_path(req: &model::GenerateContentRequest) -> Result<&str> {
    if req.model.is_empty() {
        return Err(missing("model"));
    }
    try_match(&req.model, ENDPOINT)
        .or_else(|| try_match(&req.model, PUBLISHER_MODEL))
        .ok_or_else(|| mismatch("model", &req.model))
}

fn predict(req: &model::PredictRequest) -> Result<HttpRequest> {
    let endpoint = required(&req.endpoint, "endpoint", ENDPOINT)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{endpoint}:predict")).with_body(req)
}

fn raw_predict(req: &model::RawPredictRequest) -> Result<HttpRequest> {
    let endpoint = required(&req.endpoint, "endpoint", ENDPOINT)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{endpoint}:rawPredict")).with_body(req)
}

fn stream_raw_predict(req: &model::StreamRawPredictRequest) -> Result<HttpRequest> {
    let endpoint = required(&req.endpoint, "endpoint", ENDPOINT)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{endpoint}:streamRawPredict"))
        .with_body(req)
}

fn generate_content(req: &model::GenerateContentRequest) -> Result<HttpRequest> {
    let model = model_path(req)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{model}:generateContent")).with_body(req)
}

fn stream_generate_content(req: &model::GenerateContentRequest) -> Result<HttpRequest> {
    let model = model_path(req)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{model}:streamGenerateContent"))
        .with_body(req)
}

fn create_endpoint(req: &model::CreateEndpointRequest) -> Result<HttpRequest> {
    let parent = required(&req.parent, "parent", LOCATION)?;
    let mut http = HttpRequest::new(Method::POST, format!("/v1beta1/{parent}/endpoints"))
        .with_body(&req.endpoint)?;
    req.endpoint_id.as_str().add(&mut http.query, "endpointId");
    req.request_id.as_str().add(&mut http.query, "requestId");
    Ok(http)
}

fn get_endpoint(req: &model::GetEndpointRequest) -> Result<HttpRequest> {
    let name = required(&req.name, "name", ENDPOINT)?;
    Ok(HttpRequest::new(Method::GET, format!("/v1beta1/{name}")))
}

fn list_endpoints(req: &model::ListEndpointsRequest) -> Result<HttpRequest> {
    let parent = required(&req.parent, "parent", LOCATION)?;
    let mut http = HttpRequest::new(Method::GET, format!("/v1beta1/{parent}/endpoints"));
    req.filter.as_str().add(&mut http.query, "filter");
    req.page_size.add(&mut http.query, "pageSize");
    req.page_token.as_str().add(&mut http.query, "pageToken");
    req.order_by.as_str().add(&mut http.query, "orderBy");
    Ok(http)
}

fn deploy_model(req: &model::DeployModelRequest) -> Result<HttpRequest> {
    let endpoint = required(&req.endpoint, "endpoint", ENDPOINT)?;
    HttpRequest::new(Method::POST, format!("/v1beta1/{endpoint}:deployModel")).with_body(req)
}

fn get_operation(req: &model::GetOperationRequest) -> Result<HttpRequest> {
    let name = required(&req.name, "name", OPERATION)?;
    Ok(HttpRequest::new(Method::GET, format!("/v1beta1/{name}")))
}

fn cancel_operation(req: &model::CancelOperationRequest) -> Result<HttpRequest> {
    let name = required(&req.name, "name", OPERATION)?;
    Ok(HttpRequest::new(Method::POST, format!("/v1beta1/{name}:cancel")))
}

/// Implements [PredictionService][crate::stub::PredictionService] over HTTP/JSON.
#[derive(Debug)]
pub(crate) struct PredictionService {
    inner: ReqwestClient,
    methods: PredictionServiceMethods,
    interceptors: interceptor::PredictionService,
}

impl PredictionService {
    pub async fn new(
        config: ClientConfig,
        service: &ServiceInfo,
        interceptors: interceptor::PredictionService,
    ) -> BuilderResult<Self> {
        let inner = ReqwestClient::new(&config, service).await?;
        let methods = PredictionServiceMethods::new(&inner);
        Ok(Self {
            inner,
            methods,
            interceptors,
        })
    }
}

impl crate::stub::PredictionService for PredictionService {
    async fn predict(
        &self,
        req: model::PredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::PredictResponse>> {
        let hook = self.interceptors.get(PredictionServiceMethod::Predict);
        let w = &self.methods.predict;
        unary(&self.inner, w, &hook, req, options, predict, std::convert::identity).await
    }

    async fn raw_predict(
        &self,
        req: model::RawPredictRequest,
        options: RequestOptions,
    ) -> Result<Response<model::HttpBody>> {
        let hook = self.interceptors.get(PredictionServiceMethod::RawPredict);
        let w = &self.methods.raw_predict;
        unary(&self.inner, w, &hook, req, options, raw_predict, std::convert::identity).await
    }

    async fn stream_raw_predict(
        &self,
        req: model::StreamRawPredictRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::HttpBody>> {
        let hook = self.interceptors.get(PredictionServiceMethod::StreamRawPredict);
        let w = &self.methods.stream_raw_predict;
        server_streaming(&self.inner, w, &hook, req, options, stream_raw_predict).await
    }

    async fn generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<Response<model::GenerateContentResponse>> {
        let hook = self.interceptors.get(PredictionServiceMethod::GenerateContent);
        let w = &self.methods.generate_content;
        unary(&self.inner, w, &hook, req, options, generate_content, std::convert::identity).await
    }

    async fn stream_generate_content(
        &self,
        req: model::GenerateContentRequest,
        options: RequestOptions,
    ) -> Result<ResponseStream<model::GenerateContentResponse>> {
        let hook = self
            .interceptors
            .get(PredictionServiceMethod::StreamGenerateContent);
        let w = &self.methods.stream_generate_content;
        server_streaming(&self.inner, w, &hook, req, options, stream_generate_content).await
    }

    async fn streaming_predict(
        &self,
        _requests: Receiver<model::StreamingPredictRequest>,
        _options: RequestOptions,
    ) -> Result<ResponseStream<model::StreamingPredictResponse>> {
        ReqwestClient::unsupported(&self.methods.streaming_predict.spec().id)
    }

    fn close(&self) {
        self.inner.close()
    }
}

/// Implements [EndpointService][crate::stub::EndpointService] over HTTP/JSON.
#[derive(Debug)]
pub(crate) struct EndpointService {
    inner: ReqwestClient,
    methods: EndpointServiceMethods,
    interceptors: interceptor::EndpointService,
}

impl EndpointService {
    pub async fn new(
        config: ClientConfig,
        service: &ServiceInfo,
        interceptors: interceptor::EndpointService,
    ) -> BuilderResult<Self> {
        let inner = ReqwestClient::new(&config, service).await?;
        let methods = EndpointServiceMethods::new(&inner);
        Ok(Self {
            inner,
            methods,
            interceptors,
        })
    }
}

impl crate::stub::EndpointService for EndpointService {
    async fn create_endpoint(
        &self,
        req: model::CreateEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        let hook = self.interceptors.get(EndpointServiceMethod::CreateEndpoint);
        let w = &self.methods.create_endpoint;
        unary::<_, OperationJson, _>(&self.inner, w, &hook, req, options, create_endpoint, Operation::from)
            .await
    }

    async fn get_endpoint(
        &self,
        req: model::GetEndpointRequest,
        options: RequestOptions,
    ) -> Result<Response<model::Endpoint>> {
        let hook = self.interceptors.get(EndpointServiceMethod::GetEndpoint);
        let w = &self.methods.get_endpoint;
        unary(&self.inner, w, &hook, req, options, get_endpoint, std::convert::identity).await
    }

    async fn list_endpoints(
        &self,
        req: model::ListEndpointsRequest,
        options: RequestOptions,
    ) -> Result<Response<model::ListEndpointsResponse>> {
        let hook = self.interceptors.get(EndpointServiceMethod::ListEndpoints);
        let w = &self.methods.list_endpoints;
        unary(&self.inner, w, &hook, req, options, list_endpoints, std::convert::identity).await
    }

    async fn deploy_model(
        &self,
        req: model::DeployModelRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        let hook = self.interceptors.get(EndpointServiceMethod::DeployModel);
        let w = &self.methods.deploy_model;
        unary::<_, OperationJson, _>(&self.inner, w, &hook, req, options, deploy_model, Operation::from)
            .await
    }

    async fn get_operation(
        &self,
        req: model::GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<Operation>> {
        let hook = self.interceptors.get(EndpointServiceMethod::GetOperation);
        let w = &self.methods.get_operation;
        unary::<_, OperationJson, _>(&self.inner, w, &hook, req, options, get_operation, Operation::from)
            .await
    }

    async fn cancel_operation(
        &self,
        req: model::CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<Response<()>> {
        let hook = self.interceptors.get(EndpointServiceMethod::CancelOperation);
        let w = &self.methods.cancel_operation;
        unary::<_, Value, _>(&self.inner, w, &hook, req, options, cancel_operation, |_| ()).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn transcode_predict() -> anyhow::Result<()> {
        let req = model::PredictRequest::new().set_endpoint("projects/p/locations/l/endpoints/e");
        let http = predict(&req)?;
        assert_eq!(http.method, Method::POST);
        assert_eq!(http.path, "/v1beta1/projects/p/locations/l/endpoints/e:predict");
        assert!(http.query.is_empty(), "{http:?}");
        assert_eq!(
            http.body.as_ref().and_then(|b| b.get("endpoint")),
            Some(&Value::from("projects/p/locations/l/endpoints/e"))
        );
        Ok(())
    }

    #[test_case("projects/p/locations/l/endpoints/e")]
    #[test_case("projects/p/locations/l/publishers/google/models/gemini")]
    fn transcode_generate_content(model: &str) -> anyhow::Result<()> {
        let req = model::GenerateContentRequest::new().set_model(model);
        let http = stream_generate_content(&req)?;
        assert_eq!(http.path, format!("/v1beta1/{model}:streamGenerateContent"));
        Ok(())
    }

    #[test_case("")]
    #[test_case("models/gemini")]
    fn transcode_generate_content_bad_model(model: &str) {
        let req = model::GenerateContentRequest::new().set_model(model);
        let err = generate_content(&req).unwrap_err();
        assert!(err.is_binding(), "{err:?}");
    }

    #[test]
    fn transcode_create_endpoint() -> anyhow::Result<()> {
        let req = model::CreateEndpointRequest::new()
            .set_parent("projects/p/locations/l")
            .set_endpoint(model::Endpoint::new().set_display_name("display"))
            .set_request_id("abc");
        let http = create_endpoint(&req)?;
        assert_eq!(http.path, "/v1beta1/projects/p/locations/l/endpoints");
        assert_eq!(http.query, vec![("requestId".to_string(), "abc".to_string())]);
        assert_eq!(
            http.body.as_ref().and_then(|b| b.get("displayName")),
            Some(&Value::from("display"))
        );
        Ok(())
    }

    #[test]
    fn transcode_list_endpoints() -> anyhow::Result<()> {
        let req = model::ListEndpointsRequest::new()
            .set_parent("projects/p/locations/l")
            .set_page_size(10)
            .set_page_token("token");
        let http = list_endpoints(&req)?;
        assert_eq!(http.method, Method::GET);
        assert!(http.body.is_none(), "{http:?}");
        let query = http
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>();
        assert_eq!(query, vec!["pageSize=10", "pageToken=token"]);
        Ok(())
    }

    #[test_case("projects/p/locations/l/operations/123")]
    #[test_case("projects/p/locations/l/endpoints/e/operations/123")]
    fn transcode_operations(name: &str) -> anyhow::Result<()> {
        let http = get_operation(&model::GetOperationRequest::new().set_name(name))?;
        assert_eq!(http.path, format!("/v1beta1/{name}"));
        let http = cancel_operation(&model::CancelOperationRequest::new().set_name(name))?;
        assert_eq!(http.method, Method::POST);
        assert_eq!(http.path, format!("/v1beta1/{name}:cancel"));
        Ok(())
    }

    #[test]
    fn transcode_mismatch() {
        let req = model::GetEndpointRequest::new().set_name("projects/p/endpoints/e");
        let err = get_endpoint(&req).unwrap_err();
        assert!(err.is_binding(), "{err:?}");
    }
}
