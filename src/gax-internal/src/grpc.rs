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

//! The gRPC transport.
//!
//! [Client] owns a lazily connected [tonic] channel. The channel is created
//! when the client is built, but no connection is attempted until the first
//! request. Each method on [Client] makes a single attempt, the retry loop is
//! in [CallWrapper][crate::call::CallWrapper].

mod from_status;

pub use from_status::{RpcStatus, to_gax_error, to_stream_error};

use crate::call::{Attempt, CallSpec, CallWrapper, MethodId, RequestFields, Wrap};
use crate::endpoint::ResolvedEndpoint;
use crate::options::{ClientConfig, ServiceInfo};
use crate::streaming::ResponseStream;
use crate::transport::TransportBase;
use futures::{Stream, StreamExt};
use gax::Result;
use gax::client_builder::{Error as BuilderError, Result as BuilderResult};
use gax::error::Error;
use gax::response::{Parts, Response};
use http::HeaderValue;
use http::header::{HeaderName, USER_AGENT};
use std::sync::Arc;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Identity};

pub type Session = tonic::client::Grpc<Channel>;

const X_GOOG_API_CLIENT: HeaderName = HeaderName::from_static("x-goog-api-client");

#[derive(Clone, Debug)]
pub struct Client {
    base: Arc<TransportBase<Session>>,
    api_client_header: String,
}

impl Client {
    /// Creates a new client.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn new(config: &ClientConfig, service: &ServiceInfo) -> BuilderResult<Self> {
        let base = TransportBase::new(config, service, connect).await?;
        Ok(Self::from_base(base, service))
    }

    pub(crate) fn from_base(base: TransportBase<Session>, service: &ServiceInfo) -> Self {
        Self {
            base: Arc::new(base),
            api_client_header: service.api_client.grpc_header_value(),
        }
    }

    pub fn base(&self) -> &TransportBase<Session> {
        &self.base
    }

    /// Releases the channel. Any further calls fail.
    pub fn close(&self) {
        self.base.close()
    }

    pub async fn unary<Req, Resp>(
        &self,
        method: &MethodId,
        request: Req,
        attempt: Attempt,
    ) -> Result<Response<Resp>>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut inner = self.ready().await?;
        let request = self.make_request(method, request, attempt).await?;
        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let response = inner
            .unary(request, path(method)?, codec)
            .await
            .map_err(to_gax_error)?;
        let (metadata, body, _) = response.into_parts();
        Ok(Response::from_parts(
            Parts::new().set_headers(metadata.into_headers()),
            body,
        ))
    }

    pub async fn server_streaming<Req, Resp>(
        &self,
        method: &MethodId,
        request: Req,
        attempt: Attempt,
    ) -> Result<ResponseStream<Resp>>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut inner = self.ready().await?;
        let request = self.make_request(method, request, attempt).await?;
        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let response = inner
            .server_streaming(request, path(method)?, codec)
            .await
            .map_err(to_gax_error)?;
        Ok(into_stream(response))
    }

    pub async fn client_streaming<S, Req, Resp>(
        &self,
        method: &MethodId,
        requests: S,
        attempt: Attempt,
    ) -> Result<Response<Resp>>
    where
        S: Stream<Item = Req> + Send + 'static,
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut inner = self.ready().await?;
        let request = self.make_request(method, requests, attempt).await?;
        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let response = inner
            .client_streaming(request, path(method)?, codec)
            .await
            .map_err(to_gax_error)?;
        let (metadata, body, _) = response.into_parts();
        Ok(Response::from_parts(
            Parts::new().set_headers(metadata.into_headers()),
            body,
        ))
    }

    pub async fn bidi<S, Req, Resp>(
        &self,
        method: &MethodId,
        requests: S,
        attempt: Attempt,
    ) -> Result<ResponseStream<Resp>>
    where
        S: Stream<Item = Req> + Send + 'static,
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut inner = self.ready().await?;
        let request = self.make_request(method, requests, attempt).await?;
        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let response = inner
            .streaming(request, path(method)?, codec)
            .await
            .map_err(to_gax_error)?;
        Ok(into_stream(response))
    }

    async fn ready(&self) -> Result<Session> {
        let mut inner = self.base.session()?;
        inner.ready().await.map_err(Error::io)?;
        Ok(inner)
    }

    async fn make_request<M>(
        &self,
        method: &MethodId,
        message: M,
        attempt: Attempt,
    ) -> Result<tonic::Request<M>> {
        let mut headers = attempt.metadata;
        headers.insert(
            X_GOOG_API_CLIENT,
            HeaderValue::from_str(&self.api_client_header).map_err(Error::ser)?,
        );
        let user_agent = self.base.user_agent_for(attempt.user_agent.as_deref());
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(Error::ser)?,
        );
        headers.extend(self.base.auth_headers().await?);

        let mut extensions = tonic::Extensions::new();
        extensions.insert(tonic::GrpcMethod::new(method.service, method.method));
        let metadata = tonic::metadata::MetadataMap::from_headers(headers);
        let mut request = tonic::Request::from_parts(metadata, extensions, message);
        if let Some(timeout) = attempt.timeout {
            request.set_timeout(timeout);
        }
        Ok(request)
    }
}

impl Wrap for Client {
    fn wrap<R>(&self, spec: &'static CallSpec<R>) -> CallWrapper<R>
    where
        R: RequestFields + Clone + Send + Sync,
    {
        self.base.wrap(spec)
    }
}

fn path(method: &MethodId) -> Result<http::uri::PathAndQuery> {
    http::uri::PathAndQuery::try_from(method.grpc_path()).map_err(Error::ser)
}

fn into_stream<Resp>(response: tonic::Response<tonic::Streaming<Resp>>) -> ResponseStream<Resp>
where
    Resp: Send + 'static,
{
    let (metadata, stream, _) = response.into_parts();
    let stream = stream.map(|r| r.map_err(to_stream_error));
    ResponseStream::new(metadata.into_headers(), stream)
}

/// Creates the channel for `endpoint`.
///
/// The channel connects on first use. A transport instance must be a
/// [Channel], it is used as-is.
pub(crate) fn connect(endpoint: &ResolvedEndpoint, config: &ClientConfig) -> BuilderResult<Session> {
    let channel = match &config.transport_instance {
        Some(instance) => instance.downcast_ref::<Channel>().cloned().ok_or_else(|| {
            BuilderError::config("the transport instance is not a tonic::transport::Channel")
        })?,
        None => make_channel(endpoint)?,
    };
    let limit = config.max_message_size.unwrap_or(usize::MAX);
    Ok(tonic::client::Grpc::new(channel)
        .max_decoding_message_size(limit)
        .max_encoding_message_size(limit))
}

fn make_channel(endpoint: &ResolvedEndpoint) -> BuilderResult<Channel> {
    let uri = endpoint.grpc_uri();
    let mut builder = Endpoint::from_shared(uri.clone()).map_err(BuilderError::config)?;
    if uri.starts_with("https://") {
        builder = builder
            .tls_config(tls_config(endpoint)?)
            .map_err(BuilderError::transport)?;
    } else if endpoint.client_cert_source.is_some() {
        return Err(BuilderError::config(format!(
            "client certificates require a secure endpoint, got {uri}"
        )));
    }
    Ok(builder.connect_lazy())
}

fn tls_config(endpoint: &ResolvedEndpoint) -> BuilderResult<ClientTlsConfig> {
    let config = ClientTlsConfig::new().with_enabled_roots();
    let Some(source) = &endpoint.client_cert_source else {
        return Ok(config);
    };
    let cert = source
        .client_certificate()
        .map_err(BuilderError::transport)?;
    Ok(config.identity(Identity::from_pem(cert.cert_chain, cert.private_key)))
}
