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

//! The HTTP/JSON transport.
//!
//! Requests are transcoded by the service crates: they pick the HTTP method,
//! expand the path template and serialize the remaining fields as query
//! parameters. [ReqwestClient] adds the headers common to all methods, sends
//! a single attempt, and decodes the response.
//!
//! Client-streaming and bidirectional streaming methods cannot be expressed
//! over HTTP/JSON, see [ReqwestClient::unsupported].

pub mod blocking;
pub mod interceptor;
mod json_array;

use crate::call::{Attempt, CallSpec, CallWrapper, MethodId, RequestFields, Wrap};
use crate::endpoint::ResolvedEndpoint;
use crate::options::{ClientConfig, ServiceInfo};
use crate::streaming::ResponseStream;
use crate::transport::TransportBase;
use gax::Result;
use gax::client_builder::{Error as BuilderError, Result as BuilderResult};
use gax::error::Error;
use gax::response::{Parts, Response};
use http::HeaderValue;
use http::header::{HeaderName, USER_AGENT};
use json_array::JsonArrayDecoder;
use std::sync::Arc;

const X_GOOG_API_CLIENT: HeaderName = HeaderName::from_static("x-goog-api-client");

/// The system parameter added to every request.
pub const ALT_PARAMETER: (&str, &str) = ("$alt", "json;enum-encoding=int");

#[derive(Clone, Debug)]
pub struct ReqwestClient {
    base: Arc<TransportBase<reqwest::Client>>,
    api_client_header: String,
}

impl ReqwestClient {
    pub async fn new(config: &ClientConfig, service: &ServiceInfo) -> BuilderResult<Self> {
        let base = TransportBase::new(config, service, connect).await?;
        Ok(Self::from_base(base, service))
    }

    pub(crate) fn from_base(base: TransportBase<reqwest::Client>, service: &ServiceInfo) -> Self {
        Self {
            base: Arc::new(base),
            api_client_header: service.api_client.rest_header_value(),
        }
    }

    pub fn base(&self) -> &TransportBase<reqwest::Client> {
        &self.base
    }

    /// Releases the HTTP session. Any further calls fail.
    pub fn close(&self) {
        self.base.close()
    }

    /// Starts a request for `path`, relative to the endpoint.
    pub fn builder(&self, method: reqwest::Method, path: String) -> Result<reqwest::RequestBuilder> {
        let session = self.base.session()?;
        let origin = self.base.endpoint().rest_origin();
        Ok(session
            .request(method, format!("{origin}{path}"))
            .query(&[ALT_PARAMETER]))
    }

    /// Sends a request and decodes a single response message.
    pub async fn execute<I, O>(
        &self,
        builder: reqwest::RequestBuilder,
        body: Option<&I>,
        attempt: Attempt,
    ) -> Result<Response<O>>
    where
        I: serde::ser::Serialize + ?Sized,
        O: serde::de::DeserializeOwned + Default,
    {
        let response = self.send(builder, body, attempt).await?;
        to_http_response(response).await
    }

    /// Sends a request for a server-streaming method.
    ///
    /// The response body is a JSON array, each element is decoded as soon as
    /// it is complete.
    pub async fn server_streaming<I, O>(
        &self,
        builder: reqwest::RequestBuilder,
        body: Option<&I>,
        attempt: Attempt,
    ) -> Result<ResponseStream<O>>
    where
        I: serde::ser::Serialize + ?Sized,
        O: serde::de::DeserializeOwned + Send + 'static,
    {
        let response = self.send(builder, body, attempt).await?;
        let headers = response.headers().clone();
        let stream = futures::stream::unfold(
            Some((response, JsonArrayDecoder::default())),
            |state| async move {
                let (mut response, mut decoder) = state?;
                loop {
                    match decoder.next_element() {
                        Err(e) => return Some((Err(e), None)),
                        Ok(Some(element)) => {
                            let item = serde_json::from_slice::<O>(&element).map_err(Error::deser);
                            return Some((item, Some((response, decoder))));
                        }
                        Ok(None) if decoder.is_done() => return None,
                        Ok(None) => {}
                    }
                    match response.chunk().await {
                        Ok(Some(chunk)) => decoder.push(&chunk),
                        Ok(None) => {
                            return Some((Err(Error::stream(json_array::Truncated)), None));
                        }
                        Err(e) => return Some((Err(Error::stream(e)), None)),
                    }
                }
            },
        );
        Ok(ResponseStream::new(headers, stream))
    }

    /// The result for client-streaming and bidirectional streaming methods.
    pub fn unsupported<T>(method: &MethodId) -> Result<T> {
        Err(Error::unsupported(format!(
            "{method} is a streaming method that is not supported by the HTTP/JSON transport, use gRPC instead"
        )))
    }

    async fn send<I>(
        &self,
        builder: reqwest::RequestBuilder,
        body: Option<&I>,
        attempt: Attempt,
    ) -> Result<reqwest::Response>
    where
        I: serde::ser::Serialize + ?Sized,
    {
        let user_agent = self.base.user_agent_for(attempt.user_agent.as_deref());
        let mut builder = builder
            .headers(attempt.metadata)
            .header(
                X_GOOG_API_CLIENT,
                HeaderValue::from_str(&self.api_client_header).map_err(Error::ser)?,
            )
            .header(
                USER_AGENT,
                HeaderValue::from_str(&user_agent).map_err(Error::ser)?,
            )
            .headers(self.base.auth_headers().await?);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(timeout) = attempt.timeout {
            builder = builder.timeout(timeout);
        }
        if self.base.tracing() {
            tracing::debug!(
                host = self.base.endpoint().host,
                attempt_count = attempt.attempt_count,
                "sending HTTP request"
            );
        }
        let response = builder.send().await.map_err(map_send_error)?;
        if !response.status().is_success() {
            return to_http_error(response).await;
        }
        Ok(response)
    }
}

impl Wrap for ReqwestClient {
    fn wrap<R>(&self, spec: &'static CallSpec<R>) -> CallWrapper<R>
    where
        R: RequestFields + Clone + Send + Sync,
    {
        self.base.wrap(spec)
    }
}

fn map_send_error(err: reqwest::Error) -> Error {
    match err {
        e if e.is_timeout() => Error::timeout(e),
        e => Error::io(e),
    }
}

/// Creates the HTTP session.
///
/// A transport instance must be a [reqwest::Client]. The HTTP/JSON transport
/// does not support client certificates nor limits on the message size.
pub(crate) fn connect(
    endpoint: &ResolvedEndpoint,
    config: &ClientConfig,
) -> BuilderResult<reqwest::Client> {
    if let Some(instance) = &config.transport_instance {
        return instance
            .downcast_ref::<reqwest::Client>()
            .cloned()
            .ok_or_else(|| BuilderError::config("the transport instance is not a reqwest::Client"));
    }
    if endpoint.client_cert_source.is_some() {
        return Err(BuilderError::unsupported(
            "client certificates are not supported by the HTTP/JSON transport, use gRPC instead",
        ));
    }
    if config.max_message_size.is_some() {
        return Err(BuilderError::unsupported(
            "the maximum message size is not supported by the HTTP/JSON transport, use gRPC instead",
        ));
    }
    reqwest::Client::builder()
        .build()
        .map_err(BuilderError::transport)
}

/// Converts an unsuccessful response into an error.
///
/// Bodies with the standard JSON error format become service errors. Any
/// other body is preserved in a [Error::http] error.
pub async fn to_http_error<O>(response: reqwest::Response) -> Result<O> {
    let status_code = response.status().as_u16();
    let response = http::Response::from(response);
    let (parts, body) = response.into_parts();

    let body = http_body_util::BodyExt::collect(body)
        .await
        .map_err(Error::io)?
        .to_bytes();

    let error = match gax::error::rpc::Status::try_from(&body) {
        Ok(status) => {
            Error::service_with_http_metadata(status, Some(status_code), Some(parts.headers))
        }
        Err(_) => Error::http(status_code, parts.headers, body),
    };
    Err(error)
}

async fn to_http_response<O: serde::de::DeserializeOwned + Default>(
    response: reqwest::Response,
) -> Result<Response<O>> {
    // 204 No Content has no body and fails to parse as JSON.
    let no_content_status = response.status() == reqwest::StatusCode::NO_CONTENT;
    let response = http::Response::from(response);
    let (parts, body) = response.into_parts();

    let body = http_body_util::BodyExt::collect(body)
        .await
        .map_err(Error::io)?;

    let response = match body.to_bytes() {
        content if (content.is_empty() && no_content_status) => O::default(),
        content => serde_json::from_slice::<O>(&content).map_err(Error::deser)?,
    };

    Ok(Response::from_parts(
        Parts::new().set_headers(parts.headers),
        response,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointSettings, MtlsMode};
    use crate::options::tests::TEST_SERVICE;
    use crate::transport::tests::test_config;
    use futures::StreamExt;
    use gax::client_builder::TransportInstance;
    use gax::error::rpc::{Code, LocalizedMessage, Status, StatusDetails};
    use http::HeaderMap;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use std::time::Duration;
    use test_case::test_case;

    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    struct Echo {
        #[serde(default)]
        message: String,
    }

    const ECHO: MethodId = MethodId {
        service: "test.v1.Echo",
        method: "Chat",
    };

    fn settings() -> EndpointSettings {
        EndpointSettings {
            mtls_mode: MtlsMode::Auto,
            ..EndpointSettings::default()
        }
    }

    async fn client(server: &Server) -> anyhow::Result<ReqwestClient> {
        let mut config = test_config();
        config.endpoint = Some(format!("http://{}", server.addr()));
        let base = TransportBase::with_settings(&config, &TEST_SERVICE, &settings(), connect).await?;
        Ok(ReqwestClient::from_base(base, &TEST_SERVICE))
    }

    #[tokio::test]
    async fn execute() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/v1/echo"),
                request::query(url_decoded(contains(("$alt", "json;enum-encoding=int")))),
                request::headers(contains(("authorization", "Bearer test-token"))),
                request::headers(contains(("x-goog-request-params", "name=abc"))),
                request::headers(contains(key("x-goog-api-client"))),
                request::body(json_decoded(eq(serde_json::json!({"message": "hello"})))),
            ])
            .respond_with(json_encoded(serde_json::json!({"message": "hello"}))),
        );
        let client = client(&server).await?;
        let mut metadata = HeaderMap::new();
        metadata.insert("x-goog-request-params", HeaderValue::from_static("name=abc"));
        let attempt = Attempt {
            metadata,
            ..Attempt::default()
        };
        let builder = client.builder(reqwest::Method::POST, "/v1/echo".into())?;
        let body = Echo {
            message: "hello".into(),
        };
        let response = client
            .execute::<_, Echo>(builder, Some(&body), attempt)
            .await?;
        assert_eq!(response.body(), &body);
        Ok(())
    }

    #[tokio::test]
    async fn user_agent() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/v1/echo"),
                request::headers(contains((
                    "user-agent",
                    matches("^my-app/1.0 aiplatform-test/0.0.1 ")
                ))),
            ])
            .respond_with(json_encoded(serde_json::json!({}))),
        );
        let client = client(&server).await?;
        let attempt = Attempt {
            user_agent: Some("my-app/1.0".into()),
            ..Attempt::default()
        };
        let builder = client.builder(reqwest::Method::GET, "/v1/echo".into())?;
        let response = client
            .execute::<(), Echo>(builder, None, attempt)
            .await?;
        assert_eq!(response.body(), &Echo::default());
        Ok(())
    }

    #[tokio::test]
    async fn service_error() -> anyhow::Result<()> {
        let server = Server::run();
        let body = serde_json::json!({"error": {
            "code": 404,
            "message": "The thing is not there, oh noes!",
            "status": "NOT_FOUND",
            "details": [{
                "@type": "type.googleapis.com/google.rpc.LocalizedMessage",
                "locale": "en-US",
                "message": "we searched everywhere, honest",
            }]
        }});
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/missing"))
                .respond_with(status_code(404).body(body.to_string())),
        );
        let client = client(&server).await?;
        let builder = client.builder(reqwest::Method::GET, "/v1/missing".into())?;
        let err = client
            .execute::<(), Echo>(builder, None, Attempt::default())
            .await
            .unwrap_err();
        let want = Status::default()
            .set_code(Code::NotFound)
            .set_message("The thing is not there, oh noes!")
            .set_details([StatusDetails::LocalizedMessage(
                LocalizedMessage::default()
                    .set_locale("en-US")
                    .set_message("we searched everywhere, honest"),
            )]);
        assert_eq!(err.status(), Some(&want));
        assert_eq!(err.http_status_code(), Some(404));
        Ok(())
    }

    #[tokio::test]
    async fn http_error() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/broken"))
                .respond_with(status_code(400).body("bad request")),
        );
        let client = client(&server).await?;
        let builder = client.builder(reqwest::Method::GET, "/v1/broken".into())?;
        let err = client
            .execute::<(), Echo>(builder, None, Attempt::default())
            .await
            .unwrap_err();
        assert!(err.status().is_none(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(400));
        assert_eq!(
            err.http_payload(),
            Some(bytes::Bytes::from_static(b"bad request")).as_ref()
        );
        Ok(())
    }

    #[tokio::test]
    async fn attempt_timeout() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/slow")).respond_with(
                delay_and_then(
                    Duration::from_millis(500),
                    json_encoded(serde_json::json!({})),
                ),
            ),
        );
        let client = client(&server).await?;
        let builder = client.builder(reqwest::Method::GET, "/v1/slow".into())?;
        let attempt = Attempt {
            timeout: Some(Duration::from_millis(50)),
            ..Attempt::default()
        };
        let err = client
            .execute::<(), Echo>(builder, None, attempt)
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn server_streaming() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1/echo:stream")).respond_with(
                status_code(200).body(r#"[{"message": "a"}, {"message": "b,]"},{"message":"c"}]"#),
            ),
        );
        let client = client(&server).await?;
        let builder = client.builder(reqwest::Method::POST, "/v1/echo:stream".into())?;
        let stream = client
            .server_streaming::<_, Echo>(builder, Some(&Echo::default()), Attempt::default())
            .await?;
        let got = stream
            .map(|r| r.map(|e| e.message))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(got, vec!["a", "b,]", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn server_streaming_truncated() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1/echo:stream"))
                .respond_with(status_code(200).body(r#"[{"message": "a"}, {"mess"#)),
        );
        let client = client(&server).await?;
        let builder = client.builder(reqwest::Method::POST, "/v1/echo:stream".into())?;
        let mut stream = client
            .server_streaming::<(), Echo>(builder, None, Attempt::default())
            .await?;
        let first = stream.next_message().await.transpose()?;
        assert_eq!(first.map(|e| e.message).as_deref(), Some("a"));
        let err = stream.next_message().await.and_then(|r| r.err());
        assert!(matches!(&err, Some(e) if e.is_stream()), "{err:?}");
        assert!(stream.next_message().await.is_none());
        Ok(())
    }

    #[test]
    fn unsupported() {
        let err = ReqwestClient::unsupported::<()>(&ECHO).unwrap_err();
        assert!(err.is_unsupported(), "{err:?}");
        assert!(err.to_string().contains("test.v1.Echo.Chat"), "{err}");
    }

    #[tokio::test]
    async fn closed() -> anyhow::Result<()> {
        let server = Server::run();
        let client = client(&server).await?;
        client.close();
        let err = client
            .builder(reqwest::Method::GET, "/v1/echo".into())
            .unwrap_err();
        assert!(err.is_transport(), "{err:?}");
        Ok(())
    }

    #[test_case(true, false; "client certificate")]
    #[test_case(false, true; "max message size")]
    fn connect_unsupported(cert: bool, max_size: bool) {
        let mut config = ClientConfig::default();
        if max_size {
            config.max_message_size = Some(1024);
        }
        let endpoint = ResolvedEndpoint {
            host: "test.googleapis.com".into(),
            client_cert_source: cert.then(|| {
                Arc::new(gax::client_builder::ClientCertificate {
                    cert_chain: Vec::new(),
                    private_key: Vec::new(),
                }) as Arc<dyn gax::client_builder::ClientCertSource>
            }),
            universe_domain: "googleapis.com".into(),
        };
        let err = connect(&endpoint, &config).unwrap_err();
        assert!(err.is_unsupported(), "{err:?}");
    }

    #[test]
    fn connect_transport_instance() -> anyhow::Result<()> {
        let endpoint = ResolvedEndpoint {
            host: "test.googleapis.com".into(),
            client_cert_source: None,
            universe_domain: "googleapis.com".into(),
        };
        let mut config = ClientConfig::default();
        config.transport_instance = Some(TransportInstance::new(reqwest::Client::new()));
        let _ = connect(&endpoint, &config)?;

        config.transport_instance = Some(TransportInstance::new(42_i32));
        let err = connect(&endpoint, &config).unwrap_err();
        assert!(err.is_config(), "{err:?}");
        assert!(err.to_string().contains("reqwest::Client"), "{err}");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_transport_instance_fails_the_build() {
        let mut config = ClientConfig::default();
        config.transport_instance = Some(TransportInstance::new(42_i32));
        let got = TransportBase::with_settings(&config, &TEST_SERVICE, &settings(), connect).await;
        assert!(matches!(&got, Err(e) if e.is_config()), "{got:?}");
    }

    #[tokio::test]
    async fn empty_content() -> anyhow::Result<()> {
        let response: reqwest::Response = http::Response::builder()
            .status(204)
            .body(String::new())?
            .into();
        let response = to_http_response::<Echo>(response).await?;
        assert_eq!(response.body(), &Echo::default());
        Ok(())
    }
}
