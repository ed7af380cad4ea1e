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

//! Request builders for each client.
//!
//! Every method in [crate::client] returns one of these builders. Applications
//! set the request either as a whole, with `with_request()`, or one field at a
//! time, with the `set_*()` functions. Mixing both styles is rejected when the
//! request is sent.

pub mod prediction_service {
    use crate::Result;
    use crate::method;
    use crate::model;
    use gax::options::RequestOptions;
    use gax::response::Response;
    use gaxi::call::Arguments;
    use gaxi::streaming::ResponseStream;
    use std::sync::Arc;
    use tokio::sync::mpsc::Receiver;

    /// A builder for [PredictionService][crate::client::PredictionService].
    ///
    /// ```
    /// # async fn sample() -> gax::client_builder::Result<()> {
    /// # use aiplatform::*;
    /// # use builder::prediction_service::ClientBuilder;
    /// # use client::PredictionService;
    /// let builder: ClientBuilder = PredictionService::builder();
    /// let client = builder
    ///     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
    ///     .build()
    ///     .await?;
    /// # Ok(()) }
    /// ```
    pub type ClientBuilder =
        gax::client_builder::ClientBuilder<client::Factory, gaxi::options::Credentials>;

    pub(crate) mod client {
        use super::super::super::client::PredictionService;
        use crate::interceptor;

        #[derive(Debug, Default)]
        pub struct Factory {
            pub(crate) interceptors: interceptor::PredictionService,
        }

        impl gax::client_builder::internal::ClientFactory for Factory {
            type Client = PredictionService;
            type Credentials = gaxi::options::Credentials;
            async fn build(
                self,
                config: gaxi::options::ClientConfig,
            ) -> gax::client_builder::Result<Self::Client> {
                Self::Client::new(config, self.interceptors).await
            }
        }
    }

    /// Common implementation for [crate::client::PredictionService] request builders.
    #[derive(Clone, Debug)]
    pub(crate) struct RequestBuilder<R: Default> {
        stub: Arc<dyn crate::stub::dynamic::PredictionService>,
        args: Arguments<R>,
        options: RequestOptions,
    }

    impl<R: Default> RequestBuilder<R> {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self {
                stub,
                args: Arguments::new(),
                options: RequestOptions::default(),
            }
        }
    }

    /// The request builder for [PredictionService::predict][crate::client::PredictionService::predict] calls.
    ///
    /// # Example
    /// ```no_run
    /// # use aiplatform::builder;
    /// use builder::prediction_service::Predict;
    /// # async fn sample() -> aiplatform::Result<()> {
    ///
    /// let builder = prepare_request_builder();
    /// let response = builder.send().await?;
    /// # Ok(()) }
    ///
    /// fn prepare_request_builder() -> Predict {
    ///   # panic!();
    ///   // ... details omitted ...
    /// }
    /// ```
    #[derive(Clone, Debug)]
    pub struct Predict(RequestBuilder<model::PredictRequest>);

    impl Predict {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::PredictRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<model::PredictResponse> {
            let req = self.0.args.resolve(&method::PREDICT.id)?;
            (*self.0.stub)
                .predict(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [endpoint][model::PredictRequest::endpoint].
        ///
        /// This is a **required** field for requests.
        pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint").endpoint = v.into();
            self
        }

        /// Sets the value of [instances][model::PredictRequest::instances].
        pub fn set_instances<T, V>(mut self, v: T) -> Self
        where
            T: IntoIterator<Item = V>,
            V: Into<prost_types::Value>,
        {
            self.0.args.flattened("instances").instances = v.into_iter().map(Into::into).collect();
            self
        }

        /// Sets the value of [parameters][model::PredictRequest::parameters].
        pub fn set_parameters<T: Into<prost_types::Value>>(mut self, v: T) -> Self {
            self.0.args.flattened("parameters").parameters = Some(v.into());
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for Predict {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [PredictionService::raw_predict][crate::client::PredictionService::raw_predict] calls.
    #[derive(Clone, Debug)]
    pub struct RawPredict(RequestBuilder<model::RawPredictRequest>);

    impl RawPredict {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::RawPredictRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<model::HttpBody> {
            let req = self.0.args.resolve(&method::RAW_PREDICT.id)?;
            (*self.0.stub)
                .raw_predict(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [endpoint][model::RawPredictRequest::endpoint].
        ///
        /// This is a **required** field for requests.
        pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint").endpoint = v.into();
            self
        }

        /// Sets the value of [http_body][model::RawPredictRequest::http_body].
        pub fn set_http_body<T: Into<model::HttpBody>>(mut self, v: T) -> Self {
            self.0.args.flattened("http_body").http_body = Some(v.into());
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for RawPredict {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [PredictionService::stream_raw_predict][crate::client::PredictionService::stream_raw_predict] calls.
    #[derive(Clone, Debug)]
    pub struct StreamRawPredict(RequestBuilder<model::StreamRawPredictRequest>);

    impl StreamRawPredict {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::StreamRawPredictRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request, returning the stream of response chunks.
        pub async fn send(self) -> Result<ResponseStream<model::HttpBody>> {
            let req = self.0.args.resolve(&method::STREAM_RAW_PREDICT.id)?;
            (*self.0.stub)
                .stream_raw_predict(req, self.0.options)
                .await
        }

        /// Sets the value of [endpoint][model::StreamRawPredictRequest::endpoint].
        ///
        /// This is a **required** field for requests.
        pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint").endpoint = v.into();
            self
        }

        /// Sets the value of [http_body][model::StreamRawPredictRequest::http_body].
        pub fn set_http_body<T: Into<model::HttpBody>>(mut self, v: T) -> Self {
            self.0.args.flattened("http_body").http_body = Some(v.into());
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for StreamRawPredict {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [PredictionService::generate_content][crate::client::PredictionService::generate_content] calls.
    #[derive(Clone, Debug)]
    pub struct GenerateContent(RequestBuilder<model::GenerateContentRequest>);

    impl GenerateContent {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::GenerateContentRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<model::GenerateContentResponse> {
            let req = self.0.args.resolve(&method::GENERATE_CONTENT.id)?;
            (*self.0.stub)
                .generate_content(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [model][model::GenerateContentRequest::model].
        ///
        /// This is a **required** field for requests.
        pub fn set_model<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("model").model = v.into();
            self
        }

        /// Sets the value of [contents][model::GenerateContentRequest::contents].
        ///
        /// This is a **required** field for requests.
        pub fn set_contents<T, V>(mut self, v: T) -> Self
        where
            T: IntoIterator<Item = V>,
            V: Into<model::Content>,
        {
            self.0.args.flattened("contents").contents = v.into_iter().map(Into::into).collect();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for GenerateContent {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [PredictionService::stream_generate_content][crate::client::PredictionService::stream_generate_content] calls.
    #[derive(Clone, Debug)]
    pub struct StreamGenerateContent(RequestBuilder<model::GenerateContentRequest>);

    impl StreamGenerateContent {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::GenerateContentRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request, returning the stream of partial responses.
        pub async fn send(self) -> Result<ResponseStream<model::GenerateContentResponse>> {
            let req = self.0.args.resolve(&method::STREAM_GENERATE_CONTENT.id)?;
            (*self.0.stub)
                .stream_generate_content(req, self.0.options)
                .await
        }

        /// Sets the value of [model][model::GenerateContentRequest::model].
        ///
        /// This is a **required** field for requests.
        pub fn set_model<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("model").model = v.into();
            self
        }

        /// Sets the value of [contents][model::GenerateContentRequest::contents].
        ///
        /// This is a **required** field for requests.
        pub fn set_contents<T, V>(mut self, v: T) -> Self
        where
            T: IntoIterator<Item = V>,
            V: Into<model::Content>,
        {
            self.0.args.flattened("contents").contents = v.into_iter().map(Into::into).collect();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for StreamGenerateContent {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [PredictionService::streaming_predict][crate::client::PredictionService::streaming_predict] calls.
    ///
    /// The first request in the stream must set the endpoint. Only the gRPC
    /// transport supports this method.
    #[derive(Clone, Debug)]
    pub struct StreamingPredict {
        stub: Arc<dyn crate::stub::dynamic::PredictionService>,
        options: RequestOptions,
    }

    impl StreamingPredict {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::PredictionService>) -> Self {
            Self {
                stub,
                options: RequestOptions::default(),
            }
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.options = v.into();
            self
        }

        /// Opens the stream.
        ///
        /// The call sends each message received from `requests`, and
        /// half-closes the stream once all the senders are dropped.
        pub async fn send(
            self,
            requests: Receiver<model::StreamingPredictRequest>,
        ) -> Result<ResponseStream<model::StreamingPredictResponse>> {
            (*self.stub).streaming_predict(requests, self.options).await
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for StreamingPredict {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.options
        }
    }

}

pub mod endpoint_service {
    use crate::Result;
    use crate::method;
    use crate::model;
    use crate::operations::Operations;
    use gax::options::RequestOptions;
    use gax::paginator::{ItemPaginator, Paginator};
    use gax::response::Response;
    use gaxi::call::Arguments;
    use std::sync::Arc;

    /// A builder for [EndpointService][crate::client::EndpointService].
    ///
    /// ```
    /// # async fn sample() -> gax::client_builder::Result<()> {
    /// # use aiplatform::*;
    /// # use builder::endpoint_service::ClientBuilder;
    /// # use client::EndpointService;
    /// let builder: ClientBuilder = EndpointService::builder();
    /// let client = builder
    ///     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
    ///     .build()
    ///     .await?;
    /// # Ok(()) }
    /// ```
    pub type ClientBuilder =
        gax::client_builder::ClientBuilder<client::Factory, gaxi::options::Credentials>;

    pub(crate) mod client {
        use super::super::super::client::EndpointService;
        use crate::interceptor;

        #[derive(Debug, Default)]
        pub struct Factory {
            pub(crate) interceptors: interceptor::EndpointService,
        }

        impl gax::client_builder::internal::ClientFactory for Factory {
            type Client = EndpointService;
            type Credentials = gaxi::options::Credentials;
            async fn build(
                self,
                config: gaxi::options::ClientConfig,
            ) -> gax::client_builder::Result<Self::Client> {
                Self::Client::new(config, self.interceptors).await
            }
        }
    }

    /// The handle returned by the methods starting long-running operations.
    pub type Poller<R, M> = lro::OperationFuture<R, M, Operations>;

    /// Common implementation for [crate::client::EndpointService] request builders.
    #[derive(Clone, Debug)]
    pub(crate) struct RequestBuilder<R: Default> {
        stub: Arc<dyn crate::stub::dynamic::EndpointService>,
        args: Arguments<R>,
        options: RequestOptions,
    }

    impl<R: Default> RequestBuilder<R> {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self {
                stub,
                args: Arguments::new(),
                options: RequestOptions::default(),
            }
        }

        fn poller<T, M>(&self, operation: lro::model::Operation, options: RequestOptions) -> Poller<T, M>
        where
            T: lro::model::FromPayload,
            M: lro::model::FromPayload,
        {
            let error_policy = self.stub.get_polling_error_policy(&options);
            let backoff_policy = self.stub.get_polling_backoff_policy(&options);
            lro::OperationFuture::new(Operations::new(self.stub.clone()), operation, options)
                .with_client_policies(error_policy, backoff_policy)
        }
    }

    /// The request builder for [EndpointService::create_endpoint][crate::client::EndpointService::create_endpoint] calls.
    ///
    /// # Example
    /// ```no_run
    /// # use aiplatform::builder;
    /// use builder::endpoint_service::CreateEndpoint;
    /// # async fn sample() -> aiplatform::Result<()> {
    ///
    /// let builder = prepare_request_builder();
    /// let endpoint = builder.until_done().await?;
    /// # Ok(()) }
    ///
    /// fn prepare_request_builder() -> CreateEndpoint {
    ///   # panic!();
    ///   // ... details omitted ...
    /// }
    /// ```
    #[derive(Clone, Debug)]
    pub struct CreateEndpoint(RequestBuilder<model::CreateEndpointRequest>);

    impl CreateEndpoint {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::CreateEndpointRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        ///
        /// # Long running operations
        ///
        /// This starts, but does not poll, a long-running operation. More
        /// information on [create_endpoint][crate::client::EndpointService::create_endpoint].
        pub async fn send(self) -> Result<lro::model::Operation> {
            let req = self.0.args.resolve(&method::CREATE_ENDPOINT.id)?;
            (*self.0.stub)
                .create_endpoint(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Starts the operation and returns a handle to poll it.
        pub async fn poller(
            self,
        ) -> Result<Poller<model::Endpoint, model::CreateEndpointOperationMetadata>> {
            let builder = self.0.clone();
            let options = self.0.options.clone();
            let operation = self.send().await?;
            Ok(builder.poller(operation, options))
        }

        /// Starts the operation and waits until it completes.
        pub async fn until_done(self) -> Result<model::Endpoint> {
            self.poller().await?.until_done().await
        }

        /// Sets the value of [parent][model::CreateEndpointRequest::parent].
        ///
        /// This is a **required** field for requests.
        pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("parent").parent = v.into();
            self
        }

        /// Sets the value of [endpoint][model::CreateEndpointRequest::endpoint].
        ///
        /// This is a **required** field for requests.
        pub fn set_endpoint<T: Into<model::Endpoint>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint").endpoint = Some(v.into());
            self
        }

        /// Sets the value of [endpoint_id][model::CreateEndpointRequest::endpoint_id].
        pub fn set_endpoint_id<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint_id").endpoint_id = v.into();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for CreateEndpoint {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [EndpointService::get_endpoint][crate::client::EndpointService::get_endpoint] calls.
    #[derive(Clone, Debug)]
    pub struct GetEndpoint(RequestBuilder<model::GetEndpointRequest>);

    impl GetEndpoint {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::GetEndpointRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<model::Endpoint> {
            let req = self.0.args.resolve(&method::GET_ENDPOINT.id)?;
            (*self.0.stub)
                .get_endpoint(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [name][model::GetEndpointRequest::name].
        ///
        /// This is a **required** field for requests.
        pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("name").name = v.into();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for GetEndpoint {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [EndpointService::list_endpoints][crate::client::EndpointService::list_endpoints] calls.
    ///
    /// # Example
    /// ```no_run
    /// # use aiplatform::builder;
    /// use builder::endpoint_service::ListEndpoints;
    /// # async fn sample() -> aiplatform::Result<()> {
    ///
    /// let builder = prepare_request_builder();
    /// let mut items = builder.by_item();
    /// while let Some(result) = items.next().await {
    ///   let item = result?;
    /// }
    /// # Ok(()) }
    ///
    /// fn prepare_request_builder() -> ListEndpoints {
    ///   # panic!();
    ///   // ... details omitted ...
    /// }
    /// ```
    #[derive(Clone, Debug)]
    pub struct ListEndpoints(RequestBuilder<model::ListEndpointsRequest>);

    impl ListEndpoints {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::ListEndpointsRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request, returning a single page.
        pub async fn send(self) -> Result<model::ListEndpointsResponse> {
            let req = self.0.args.resolve(&method::LIST_ENDPOINTS.id)?;
            (*self.0.stub)
                .list_endpoints(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Streams each page in the collection.
        ///
        /// Argument errors are returned by the first page.
        pub fn by_page(self) -> Paginator<model::ListEndpointsResponse, gax::error::Error> {
            let RequestBuilder {
                stub,
                args,
                options,
            } = self.0;
            let (request, error) = match args.resolve(&method::LIST_ENDPOINTS.id) {
                Ok(r) => (r, None),
                Err(e) => (model::ListEndpointsRequest::default(), Some(e)),
            };
            // The paginator stops after the first error, report it only once.
            let error = Arc::new(std::sync::Mutex::new(error));
            let token = request.page_token.clone();
            let execute = move |token: String| {
                let stub = stub.clone();
                let options = options.clone();
                let request = request.clone().set_page_token(token);
                let error = error.lock().ok().and_then(|mut e| e.take());
                async move {
                    if let Some(e) = error {
                        return Err(e);
                    }
                    (*stub)
                        .list_endpoints(request, options)
                        .await
                        .map(Response::into_body)
                }
            };
            Paginator::new(token, execute)
        }

        /// Streams each item in the collection.
        pub fn by_item(self) -> ItemPaginator<model::ListEndpointsResponse, gax::error::Error> {
            self.by_page().items()
        }

        /// Sets the value of [parent][model::ListEndpointsRequest::parent].
        ///
        /// This is a **required** field for requests.
        pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("parent").parent = v.into();
            self
        }

        /// Sets the value of [filter][model::ListEndpointsRequest::filter].
        pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("filter").filter = v.into();
            self
        }

        /// Sets the value of [page_size][model::ListEndpointsRequest::page_size].
        pub fn set_page_size<T: Into<i32>>(mut self, v: T) -> Self {
            self.0.args.flattened("page_size").page_size = v.into();
            self
        }

        /// Sets the value of [page_token][model::ListEndpointsRequest::page_token].
        pub fn set_page_token<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("page_token").page_token = v.into();
            self
        }

        /// Sets the value of [order_by][model::ListEndpointsRequest::order_by].
        pub fn set_order_by<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("order_by").order_by = v.into();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for ListEndpoints {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [EndpointService::deploy_model][crate::client::EndpointService::deploy_model] calls.
    #[derive(Clone, Debug)]
    pub struct DeployModel(RequestBuilder<model::DeployModelRequest>);

    impl DeployModel {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::DeployModelRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        ///
        /// # Long running operations
        ///
        /// This starts, but does not poll, a long-running operation. More
        /// information on [deploy_model][crate::client::EndpointService::deploy_model].
        pub async fn send(self) -> Result<lro::model::Operation> {
            let req = self.0.args.resolve(&method::DEPLOY_MODEL.id)?;
            (*self.0.stub)
                .deploy_model(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Starts the operation and returns a handle to poll it.
        pub async fn poller(
            self,
        ) -> Result<Poller<model::DeployModelResponse, model::DeployModelOperationMetadata>> {
            let builder = self.0.clone();
            let options = self.0.options.clone();
            let operation = self.send().await?;
            Ok(builder.poller(operation, options))
        }

        /// Starts the operation and waits until it completes.
        pub async fn until_done(self) -> Result<model::DeployModelResponse> {
            self.poller().await?.until_done().await
        }

        /// Sets the value of [endpoint][model::DeployModelRequest::endpoint].
        ///
        /// This is a **required** field for requests.
        pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("endpoint").endpoint = v.into();
            self
        }

        /// Sets the value of [deployed_model][model::DeployModelRequest::deployed_model].
        ///
        /// This is a **required** field for requests.
        pub fn set_deployed_model<T: Into<model::DeployedModel>>(mut self, v: T) -> Self {
            self.0.args.flattened("deployed_model").deployed_model = Some(v.into());
            self
        }

        /// Sets the value of [traffic_split][model::DeployModelRequest::traffic_split].
        pub fn set_traffic_split<T, K, V>(mut self, v: T) -> Self
        where
            T: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<i32>,
        {
            self.0.args.flattened("traffic_split").traffic_split =
                v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for DeployModel {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [EndpointService::get_operation][crate::client::EndpointService::get_operation] calls.
    #[derive(Clone, Debug)]
    pub struct GetOperation(RequestBuilder<model::GetOperationRequest>);

    impl GetOperation {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::GetOperationRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<lro::model::Operation> {
            let req = self.0.args.resolve(&method::GET_OPERATION.id)?;
            (*self.0.stub)
                .get_operation(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [name][model::GetOperationRequest::name].
        pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("name").name = v.into();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for GetOperation {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    /// The request builder for [EndpointService::cancel_operation][crate::client::EndpointService::cancel_operation] calls.
    #[derive(Clone, Debug)]
    pub struct CancelOperation(RequestBuilder<model::CancelOperationRequest>);

    impl CancelOperation {
        pub(crate) fn new(stub: Arc<dyn crate::stub::dynamic::EndpointService>) -> Self {
            Self(RequestBuilder::new(stub))
        }

        /// Sets the full request, replacing any prior values.
        pub fn with_request<V: Into<model::CancelOperationRequest>>(mut self, v: V) -> Self {
            self.0.args.with_request(v.into());
            self
        }

        /// Sets all the options, replacing any prior values.
        pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
            self.0.options = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> Result<()> {
            let req = self.0.args.resolve(&method::CANCEL_OPERATION.id)?;
            (*self.0.stub)
                .cancel_operation(req, self.0.options)
                .await
                .map(Response::into_body)
        }

        /// Sets the value of [name][model::CancelOperationRequest::name].
        pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
            self.0.args.flattened("name").name = v.into();
            self
        }
    }

    #[doc(hidden)]
    impl gax::options::internal::RequestBuilder for CancelOperation {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0.options
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::stub::EndpointService;
        use futures::TryStreamExt;
        use std::sync::Mutex;

        #[derive(Debug, Default)]
        struct Pages {
            tokens: Mutex<Vec<String>>,
        }

        impl EndpointService for Pages {
            async fn list_endpoints(
                &self,
                req: model::ListEndpointsRequest,
                _options: RequestOptions,
            ) -> Result<Response<model::ListEndpointsResponse>> {
                assert_eq!(req.parent, "projects/p/locations/l");
                self.tokens.lock().unwrap().push(req.page_token.clone());
                let (names, next) = match req.page_token.as_str() {
                    "" => (vec!["e1", "e2"], "t1"),
                    "t1" => (vec!["e3"], ""),
                    t => panic!("unexpected token {t}"),
                };
                let endpoints = names
                    .into_iter()
                    .map(|n| model::Endpoint::new().set_name(n))
                    .collect();
                Ok(Response::from(model::ListEndpointsResponse {
                    endpoints,
                    next_page_token: next.to_string(),
                }))
            }
        }

        #[tokio::test]
        async fn by_item() -> anyhow::Result<()> {
            let stub = Arc::new(Pages::default());
            let items = ListEndpoints::new(stub.clone())
                .set_parent("projects/p/locations/l")
                .by_item()
                .try_collect::<Vec<_>>()
                .await?;
            let names = items.into_iter().map(|e| e.name).collect::<Vec<_>>();
            assert_eq!(names, vec!["e1", "e2", "e3"]);
            assert_eq!(*stub.tokens.lock().unwrap(), vec!["", "t1"]);
            Ok(())
        }

        #[tokio::test]
        async fn by_page_conflict() {
            let mut pages = ListEndpoints::new(Arc::new(Pages::default()))
                .with_request(model::ListEndpointsRequest::new().set_parent("projects/p/locations/l"))
                .set_page_size(10)
                .by_page();
            let first = pages.next().await;
            assert!(
                matches!(&first, Some(Err(e)) if e.is_binding()),
                "{first:?}"
            );
            assert!(pages.next().await.is_none());
        }
    }
}
