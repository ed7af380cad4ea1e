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

//! Per-method call configuration and the wrapper applying it.
//!
//! Each RPC is described by a static [CallSpec]. When a client is built, its
//! transport binds every spec into a [CallWrapper] through the [Wrap] hook.
//! The wrappers are created once per client and reused by every call.
//!
//! On each invocation the wrapper fills any auto-populated request IDs,
//! computes the deadline and the retry plan, adds the routing header, and
//! calls the transport once per attempt. Retry decisions happen only here,
//! the transports report the raw errors.

use crate::routing_parameter;
use auth::credentials::Credentials;
use gax::Result;
use gax::backoff_policy::BackoffPolicy;
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::exponential_backoff::ExponentialBackoff;
use gax::options::RequestOptions;
use gax::retry_loop_internal::{effective_timeout, retry_loop};
use gax::retry_policy::{DEFAULT_ATTEMPT_LIMIT, NeverRetry, RetryPolicy, RetryPolicyExt, RetryableCodes};
use http::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// Identifies an RPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodId {
    /// The fully qualified service name, e.g. `google.cloud.aiplatform.v1beta1.PredictionService`.
    pub service: &'static str,
    /// The method name, e.g. `Predict`.
    pub method: &'static str,
}

impl MethodId {
    /// The path used in gRPC requests.
    pub fn grpc_path(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.service, self.method)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamingKind {
    Unary,
    ServerStreaming,
    ClientStreaming,
    Bidi,
}

/// A set of request fields, identified by their position in the message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldSet(u64);

impl FieldSet {
    pub const EMPTY: FieldSet = FieldSet(0);

    /// Returns a set with the given field added.
    pub const fn with(self, bit: u32) -> Self {
        Self(self.0 | (1 << bit))
    }

    pub fn insert(&mut self, bit: u32) {
        self.0 |= 1 << bit;
    }

    pub fn contains(&self, bit: u32) -> bool {
        self.0 & (1 << bit) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The fields in `self` that are not in `other`.
    pub fn difference(self, other: FieldSet) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + use<> {
        let bits = self.0;
        (0..u64::BITS).filter(move |b| bits & (1 << b) != 0)
    }
}

/// Exposes field presence for requests.
///
/// Required field validation and the auto-population of request IDs read the
/// presence bitmap instead of inspecting the message.
pub trait RequestFields {
    /// The fields set to a non-default value.
    fn presence(&self) -> FieldSet;

    /// The name of the field at position `bit`, used in error messages.
    fn field_name(bit: u32) -> &'static str
    where
        Self: Sized;

    /// Sets a field that is automatically populated with a UUID4.
    fn set_uuid_field(&mut self, _bit: u32, _value: String) {}
}

/// Extracts one routing parameter from the request.
#[derive(Debug)]
pub struct RoutingParam<R: 'static> {
    pub key: &'static str,
    pub value: fn(&R) -> Option<&str>,
}

/// The static configuration for one RPC.
#[derive(Debug)]
pub struct CallSpec<R: 'static> {
    pub id: MethodId,
    pub kind: StreamingKind,
    /// Used when the application does not set a timeout.
    pub default_timeout: Option<Duration>,
    /// The codes retried by default. No retries if empty.
    pub retry_codes: &'static [Code],
    /// Whether the service configuration marks the method as safe to retry.
    pub idempotent: bool,
    pub routing: &'static [RoutingParam<R>],
    /// Fields that must be set for the REST transport to build the path.
    pub required: FieldSet,
    /// Fields filled with a new UUID4 when unset.
    pub uuid_fields: FieldSet,
}

impl<R: RequestFields> CallSpec<R> {
    /// Returns an error naming the first required field that is not set.
    pub fn check_required(&self, request: &R) -> Result<()> {
        check_required(request, self.required)
    }
}

pub fn check_required<R: RequestFields>(request: &R, required: FieldSet) -> Result<()> {
    match required.difference(request.presence()).iter().next() {
        None => Ok(()),
        Some(bit) => Err(crate::path_parameter::missing(R::field_name(bit))),
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum CallError {
    #[error("{method} received both a request and the flattened fields {fields:?}, set only one")]
    FlattenedConflict {
        method: String,
        fields: Vec<&'static str>,
    },
}

/// The request arguments collected by a request builder.
///
/// Applications set either a complete request, or some of the flattened
/// fields. Setting both is an error.
#[derive(Clone, Debug, Default)]
pub struct Arguments<R> {
    request: Option<R>,
    flattened: R,
    flattened_fields: Vec<&'static str>,
}

impl<R: Default> Arguments<R> {
    pub fn new() -> Self {
        Self {
            request: None,
            flattened: R::default(),
            flattened_fields: Vec::new(),
        }
    }

    pub fn with_request(&mut self, v: R) {
        self.request = Some(v);
    }

    /// Returns the request used for flattened fields, recording `name` as set.
    pub fn flattened(&mut self, name: &'static str) -> &mut R {
        if !self.flattened_fields.contains(&name) {
            self.flattened_fields.push(name);
        }
        &mut self.flattened
    }

    /// Returns the request to send.
    pub fn resolve(self, method: &MethodId) -> Result<R> {
        match self.request {
            Some(_) if !self.flattened_fields.is_empty() => {
                Err(Error::binding(CallError::FlattenedConflict {
                    method: method.to_string(),
                    fields: self.flattened_fields,
                }))
            }
            Some(r) => Ok(r),
            None => Ok(self.flattened),
        }
    }
}

/// Binds [CallSpec]s into [CallWrapper]s.
///
/// Transports implement this trait. Clients call it once per method, when the
/// client is built.
pub trait Wrap {
    fn wrap<R>(&self, spec: &'static CallSpec<R>) -> CallWrapper<R>
    where
        R: RequestFields + Clone + Send + Sync;
}

/// The per-attempt information passed to the transport.
#[derive(Clone, Debug, Default)]
pub struct Attempt {
    /// The routing header, if any.
    pub metadata: HeaderMap,
    /// The time remaining for this attempt.
    pub timeout: Option<Duration>,
    pub attempt_count: u32,
    /// The `user-agent` prefix set in the request options.
    pub user_agent: Option<String>,
}

/// The client-level configuration captured by a [CallWrapper].
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    pub retry_policy: Option<Arc<dyn RetryPolicy>>,
    pub backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    pub credentials: Option<Credentials>,
    pub tracing: bool,
}

/// A [CallSpec] bound to the client configuration.
#[derive(Debug)]
pub struct CallWrapper<R: 'static> {
    spec: &'static CallSpec<R>,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
    credentials: Option<Credentials>,
    tracing: bool,
}

impl<R> CallWrapper<R>
where
    R: RequestFields + Clone + Send + Sync,
{
    pub fn new(spec: &'static CallSpec<R>, bindings: Bindings) -> Self {
        let retry_policy = bindings
            .retry_policy
            .unwrap_or_else(|| default_retry_policy(spec.retry_codes));
        let backoff_policy = bindings
            .backoff_policy
            .unwrap_or_else(|| Arc::new(ExponentialBackoff::default()));
        Self {
            spec,
            retry_policy,
            backoff_policy,
            credentials: bindings.credentials,
            tracing: bindings.tracing,
        }
    }

    pub fn spec(&self) -> &'static CallSpec<R> {
        self.spec
    }

    /// Makes a call, retrying as needed.
    ///
    /// `attempt` is called once per attempt, with a copy of the request.
    pub async fn call<O, F, Fut>(
        &self,
        mut request: R,
        options: RequestOptions,
        mut attempt: F,
    ) -> Result<O>
    where
        F: FnMut(R, Attempt) -> Fut + Send,
        Fut: Future<Output = Result<O>> + Send,
        O: Send,
    {
        // Populate once, retries reuse the same request IDs.
        for bit in self.spec.uuid_fields.iter() {
            if !request.presence().contains(bit) {
                request.set_uuid_field(bit, uuid::Uuid::new_v4().to_string());
            }
        }
        let metadata = self.routing_metadata(&request);
        let idempotent = options.idempotent().unwrap_or(self.spec.idempotent);
        let retry_policy = options
            .retry_policy()
            .clone()
            .unwrap_or_else(|| self.retry_policy.clone());
        let backoff_policy = options
            .backoff_policy()
            .clone()
            .unwrap_or_else(|| self.backoff_policy.clone());
        let deadline = self.deadline(&options);
        let cancel = options.cancellation_token().clone();

        let mut attempt_count = 0_u32;
        let id = self.spec.id;
        // Each attempt gets its own copy of the request and metadata, the
        // returned future does not borrow from this closure.
        let inner = |remaining: Option<Duration>| {
            attempt_count += 1;
            let timeout = min_timeout(
                effective_timeout(&options, remaining),
                deadline.map(|d| d.saturating_duration_since(Instant::now())),
            );
            tracing::debug!(method = %id, attempt_count, ?timeout, "starting attempt");
            let info = Attempt {
                metadata: metadata.clone(),
                timeout,
                attempt_count,
                user_agent: options.user_agent().clone(),
            };
            attempt(request.clone(), info)
        };
        let sleep = tokio::time::sleep;
        let fut = retry_loop(inner, sleep, idempotent, retry_policy, backoff_policy);
        let result = self.run(fut, deadline, cancel).await;
        result.map_err(|e| self.with_credential_info(e))
    }

    /// Makes a call with a single attempt.
    ///
    /// Used for client-streaming and bidirectional streaming RPCs, where the
    /// request cannot be replayed.
    pub async fn call_once<O, Fut>(
        &self,
        options: RequestOptions,
        attempt: impl FnOnce(Attempt) -> Fut,
    ) -> Result<O>
    where
        Fut: Future<Output = Result<O>>,
    {
        let deadline = self.deadline(&options);
        let info = Attempt {
            metadata: HeaderMap::new(),
            timeout: min_timeout(*options.attempt_timeout(), self.remaining(deadline)),
            attempt_count: 1,
            user_agent: options.user_agent().clone(),
        };
        let cancel = options.cancellation_token().clone();
        let result = self.run(attempt(info), deadline, cancel).await;
        result.map_err(|e| self.with_credential_info(e))
    }

    fn deadline(&self, options: &RequestOptions) -> Option<Instant> {
        options
            .timeout()
            .or(self.spec.default_timeout)
            .map(|t| Instant::now() + t)
    }

    fn remaining(&self, deadline: Option<Instant>) -> Option<Duration> {
        deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    fn routing_metadata(&self, request: &R) -> HeaderMap {
        let pairs = self
            .spec
            .routing
            .iter()
            .filter_map(|p| (p.value)(request).map(|v| (p.key, v)));
        let mut metadata = HeaderMap::new();
        if let Some(v) = routing_parameter::header_value(pairs) {
            metadata.insert(routing_parameter::ROUTING_HEADER, v);
        }
        metadata
    }

    async fn run<O, Fut>(
        &self,
        fut: Fut,
        deadline: Option<Instant>,
        cancel: Option<tokio_util::sync::CancellationToken>,
    ) -> Result<O>
    where
        Fut: Future<Output = Result<O>>,
    {
        let fut = with_deadline(fut, deadline);
        let fut = with_cancellation(fut, cancel);
        if self.tracing {
            let span = tracing::info_span!("aiplatform_call", method = %self.spec.id);
            return fut.instrument(span).await;
        }
        fut.await
    }

    fn with_credential_info(&self, error: Error) -> Error {
        let Some(info) = self.credentials.as_ref().and_then(Credentials::credential_info) else {
            return error;
        };
        match error.code() {
            Some(Code::Unauthenticated | Code::PermissionDenied | Code::NotFound) => {
                error.with_credential_info(info.to_string())
            }
            _ => error,
        }
    }
}

fn default_retry_policy(codes: &[Code]) -> Arc<dyn RetryPolicy> {
    if codes.is_empty() {
        return Arc::new(NeverRetry);
    }
    Arc::new(RetryableCodes::new(codes.iter().copied()).with_attempt_limit(DEFAULT_ATTEMPT_LIMIT))
}

fn min_timeout(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (None, None) => None,
        (Some(t), None) | (None, Some(t)) => Some(t),
        (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
    }
}

async fn with_deadline<O, Fut>(fut: Fut, deadline: Option<Instant>) -> Result<O>
where
    Fut: Future<Output = Result<O>>,
{
    match deadline {
        None => fut.await,
        Some(d) => match tokio::time::timeout_at(d, fut).await {
            Ok(r) => r,
            Err(e) => Err(Error::timeout(e)),
        },
    }
}

async fn with_cancellation<O, Fut>(
    fut: Fut,
    cancel: Option<tokio_util::sync::CancellationToken>,
) -> Result<O>
where
    Fut: Future<Output = Result<O>>,
{
    let Some(token) = cancel else {
        return fut.await;
    };
    tokio::select! {
        _ = token.cancelled() => Err(cancelled()),
        r = fut => r,
    }
}

/// The error returned when the application cancels a call.
pub fn cancelled() -> Error {
    Error::service(
        Status::default()
            .set_code(Code::Cancelled)
            .set_message("the call was cancelled by the application"),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use auth::credentials::CredentialsProvider;
    use gax::error::rpc::StatusDetails;
    use gax::exponential_backoff::ExponentialBackoffBuilder;
    use gax::options::internal::set_default_idempotency;
    use gax::retry_policy::AlwaysRetry;
    use std::sync::Mutex;
    use test_case::test_case;

    #[derive(Clone, Debug, Default, PartialEq)]
    pub(crate) struct TestRequest {
        pub name: String,
        pub request_id: String,
        pub display_name: String,
    }

    impl RequestFields for TestRequest {
        fn presence(&self) -> FieldSet {
            let mut set = FieldSet::EMPTY;
            if !self.name.is_empty() {
                set.insert(0);
            }
            if !self.request_id.is_empty() {
                set.insert(1);
            }
            if !self.display_name.is_empty() {
                set.insert(2);
            }
            set
        }

        fn field_name(bit: u32) -> &'static str {
            match bit {
                0 => "name",
                1 => "request_id",
                2 => "display_name",
                _ => "unknown",
            }
        }

        fn set_uuid_field(&mut self, bit: u32, value: String) {
            if bit == 1 {
                self.request_id = value;
            }
        }
    }

    fn name(r: &TestRequest) -> Option<&str> {
        Some(r.name.as_str())
    }

    pub(crate) static TEST_SPEC: CallSpec<TestRequest> = CallSpec {
        id: MethodId {
            service: "test.v1.TestService",
            method: "Create",
        },
        kind: StreamingKind::Unary,
        default_timeout: Some(Duration::from_secs(60)),
        retry_codes: &[Code::Unavailable],
        idempotent: true,
        routing: &[RoutingParam {
            key: "name",
            value: name,
        }],
        required: FieldSet::EMPTY.with(0),
        uuid_fields: FieldSet::EMPTY.with(1),
    };

    fn unavailable() -> Error {
        Error::service(Status::default().set_code(Code::Unavailable).set_message("try-again"))
    }

    fn test_backoff() -> Arc<dyn BackoffPolicy> {
        Arc::new(
            ExponentialBackoffBuilder::new()
                .with_initial_delay(Duration::from_millis(1))
                .with_maximum_delay(Duration::from_millis(1))
                .clamp(),
        )
    }

    fn wrapper(bindings: Bindings) -> CallWrapper<TestRequest> {
        CallWrapper::new(
            &TEST_SPEC,
            Bindings {
                backoff_policy: Some(test_backoff()),
                ..bindings
            },
        )
    }

    #[test]
    fn method_id() {
        let id = TEST_SPEC.id;
        assert_eq!(id.grpc_path(), "/test.v1.TestService/Create");
        assert_eq!(id.to_string(), "test.v1.TestService.Create");
    }

    #[test]
    fn field_set() {
        let set = FieldSet::EMPTY.with(0).with(3);
        assert!(set.contains(0) && set.contains(3), "{set:?}");
        assert!(!set.contains(1), "{set:?}");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(set.difference(FieldSet::EMPTY.with(0)), FieldSet::EMPTY.with(3));
        assert!(FieldSet::EMPTY.is_empty());
    }

    #[test]
    fn required() {
        let request = TestRequest::default();
        let err = TEST_SPEC.check_required(&request).unwrap_err();
        assert!(err.is_binding(), "{err:?}");
        assert!(err.to_string().contains("name"), "{err}");

        let request = TestRequest {
            name: "projects/p".into(),
            ..TestRequest::default()
        };
        assert!(TEST_SPEC.check_required(&request).is_ok());
    }

    #[test]
    fn arguments() -> anyhow::Result<()> {
        let id = TEST_SPEC.id;
        let mut args = Arguments::<TestRequest>::new();
        args.flattened("name").name = "flat".into();
        assert_eq!(args.resolve(&id)?.name, "flat");

        let mut args = Arguments::<TestRequest>::new();
        args.with_request(TestRequest {
            name: "full".into(),
            ..TestRequest::default()
        });
        assert_eq!(args.resolve(&id)?.name, "full");

        let mut args = Arguments::<TestRequest>::new();
        args.with_request(TestRequest::default());
        args.flattened("name").name = "flat".into();
        args.flattened("display_name").display_name = "flat".into();
        let err = args.resolve(&id).unwrap_err();
        assert!(err.is_binding(), "{err:?}");
        let msg = err.to_string();
        assert!(msg.contains("name") && msg.contains("display_name"), "{msg}");
        Ok(())
    }

    #[tokio::test]
    async fn success_single_attempt() -> anyhow::Result<()> {
        let wrapper = wrapper(Bindings::default());
        let calls = Mutex::new(Vec::new());
        let request = TestRequest {
            name: "endpoint_value".into(),
            ..TestRequest::default()
        };
        let got = wrapper
            .call(request, RequestOptions::default(), |r, a| {
                calls.lock().unwrap().push((r, a));
                async { Ok("done") }
            })
            .await?;
        assert_eq!(got, "done");
        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 1);
        let (request, attempt) = &calls[0];
        assert_eq!(request.name, "endpoint_value");
        assert_eq!(attempt.attempt_count, 1);
        let routing = attempt
            .metadata
            .get(routing_parameter::ROUTING_HEADER)
            .and_then(|v| v.to_str().ok());
        assert_eq!(routing, Some("name=endpoint_value"));
        assert!(attempt.timeout.is_some_and(|t| t <= Duration::from_secs(60)), "{attempt:?}");
        Ok(())
    }

    #[tokio::test]
    async fn call_can_be_spawned() -> anyhow::Result<()> {
        let wrapper = Arc::new(wrapper(Bindings::default()));
        let count = Arc::new(Mutex::new(0));
        let handle = tokio::spawn({
            let count = count.clone();
            async move {
                wrapper
                    .call(TestRequest::default(), RequestOptions::default(), |_, _| {
                        let mut count = count.lock().unwrap();
                        *count += 1;
                        let result = if *count < 2 { Err(unavailable()) } else { Ok(7) };
                        async move { result }
                    })
                    .await
            }
        });
        assert_eq!(handle.await??, 7);
        assert_eq!(*count.lock().unwrap(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn retries_until_success() -> anyhow::Result<()> {
        let wrapper = wrapper(Bindings::default());
        let calls = Mutex::new(Vec::new());
        let got = wrapper
            .call(TestRequest::default(), RequestOptions::default(), |r, a| {
                let mut calls = calls.lock().unwrap();
                calls.push((r, a.attempt_count));
                let result = if calls.len() < 3 { Err(unavailable()) } else { Ok(42) };
                async move { result }
            })
            .await?;
        assert_eq!(got, 42);
        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.iter().map(|(_, n)| *n).collect::<Vec<_>>(), vec![1, 2, 3]);
        // The request ID is populated once, all the attempts share it.
        let id = &calls[0].0.request_id;
        assert!(uuid::Uuid::parse_str(id).is_ok(), "{id}");
        assert!(calls.iter().all(|(r, _)| &r.request_id == id), "{calls:?}");
        Ok(())
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let wrapper = wrapper(Bindings::default());
        let mut count = 0;
        let got = wrapper
            .call(TestRequest::default(), RequestOptions::default(), |_, _| {
                count += 1;
                async {
                    Err::<(), _>(Error::service(
                        Status::default().set_code(Code::InvalidArgument),
                    ))
                }
            })
            .await;
        assert_eq!(got.unwrap_err().code(), Some(Code::InvalidArgument));
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn attempt_limit() {
        let wrapper = wrapper(Bindings::default());
        let mut count = 0;
        let got = wrapper
            .call(TestRequest::default(), RequestOptions::default(), |_, _| {
                count += 1;
                async { Err::<(), _>(unavailable()) }
            })
            .await;
        assert!(got.is_err(), "{got:?}");
        assert_eq!(count, DEFAULT_ATTEMPT_LIMIT);
    }

    #[tokio::test]
    async fn request_options_override() {
        let wrapper = wrapper(Bindings::default());
        let mut options = RequestOptions::default();
        options.set_retry_policy(AlwaysRetry.with_attempt_limit(2));
        let options = set_default_idempotency(options, false);
        let mut count = 0;
        let got = wrapper
            .call(TestRequest::default(), options, |_, _| {
                count += 1;
                async { Err::<(), _>(unavailable()) }
            })
            .await;
        assert!(got.is_err(), "{got:?}");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn client_retry_policy() {
        let wrapper = wrapper(Bindings {
            retry_policy: Some(Arc::new(NeverRetry)),
            ..Bindings::default()
        });
        let mut count = 0;
        let got = wrapper
            .call(TestRequest::default(), RequestOptions::default(), |_, _| {
                count += 1;
                async { Err::<(), _>(unavailable()) }
            })
            .await;
        assert!(got.is_err(), "{got:?}");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn existing_request_id_is_kept() {
        let request = TestRequest {
            request_id: "my-id".into(),
            display_name: "untouched".into(),
            ..TestRequest::default()
        };
        let wrapper = wrapper(Bindings::default());
        let mut seen = None;
        let got = wrapper
            .call(request.clone(), RequestOptions::default(), |r, _| {
                seen = Some(r);
                async { Ok(()) }
            })
            .await;
        assert!(got.is_ok(), "{got:?}");
        assert_eq!(seen, Some(request));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline() {
        let wrapper = wrapper(Bindings::default());
        let mut options = RequestOptions::default();
        options.set_timeout(Duration::from_secs(5));
        let got = wrapper
            .call(TestRequest::default(), options, |_, a| {
                assert!(a.timeout.is_some_and(|t| t <= Duration::from_secs(5)), "{a:?}");
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(())
                }
            })
            .await;
        let err = got.unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
    }

    #[tokio::test]
    async fn cancellation() {
        let wrapper = wrapper(Bindings::default());
        let token = tokio_util::sync::CancellationToken::new();
        let mut options = RequestOptions::default();
        options.set_cancellation_token(token.clone());
        token.cancel();
        let got = wrapper
            .call(TestRequest::default(), options, |_, _| {
                std::future::pending::<Result<()>>()
            })
            .await;
        let err = got.unwrap_err();
        assert_eq!(err.code(), Some(Code::Cancelled), "{err:?}");
    }

    #[tokio::test]
    async fn call_once() -> anyhow::Result<()> {
        let wrapper = wrapper(Bindings::default());
        let mut count = 0;
        let got = wrapper
            .call_once(RequestOptions::default(), |a| {
                count += 1;
                assert_eq!(a.attempt_count, 1);
                async { Err::<(), _>(unavailable()) }
            })
            .await;
        assert!(got.is_err(), "{got:?}");
        assert_eq!(count, 1);
        Ok(())
    }

    #[derive(Debug)]
    pub(crate) struct DiagnosticCredentials(pub Option<serde_json::Value>);

    impl CredentialsProvider for DiagnosticCredentials {
        async fn headers(&self) -> std::result::Result<HeaderMap, gax::error::CredentialsError> {
            Ok(HeaderMap::new())
        }
        async fn universe_domain(&self) -> Option<String> {
            None
        }
        fn credential_info(&self) -> Option<serde_json::Value> {
            self.0.clone()
        }
    }

    async fn fail_with(credentials: Option<Credentials>, error: Error) -> Error {
        let wrapper = wrapper(Bindings {
            credentials,
            ..Bindings::default()
        });
        let mut error = Some(error);
        wrapper
            .call(TestRequest::default(), RequestOptions::default(), |_, _| {
                let e = error.take().unwrap();
                async { Err::<(), _>(e) }
            })
            .await
            .unwrap_err()
    }

    fn info() -> serde_json::Value {
        serde_json::json!({"principal": "x"})
    }

    #[test_case(401)]
    #[test_case(403)]
    #[test_case(404)]
    #[tokio::test]
    async fn credential_info_http(status: u16) {
        let credentials = Credentials::from(DiagnosticCredentials(Some(info())));
        let error = Error::http(status, HeaderMap::new(), bytes::Bytes::from_static(b"denied"));
        let got = fail_with(Some(credentials), error).await;
        let details = &got.status().unwrap().details;
        assert_eq!(details.len(), 1, "{got:?}");
        assert!(
            matches!(&details[0], StatusDetails::CredentialInfo(s) if s.contains("principal") && s.contains("\"x\"")),
            "{details:?}"
        );
    }

    #[test_case(Code::Unauthenticated)]
    #[test_case(Code::PermissionDenied)]
    #[test_case(Code::NotFound)]
    #[tokio::test]
    async fn credential_info_service(code: Code) {
        let credentials = Credentials::from(DiagnosticCredentials(Some(info())));
        let error = Error::service(Status::default().set_code(code));
        let got = fail_with(Some(credentials), error).await;
        assert_eq!(got.status().map(|s| s.details.len()), Some(1), "{got:?}");
    }

    #[tokio::test]
    async fn credential_info_unchanged() {
        let credentials = Credentials::from(DiagnosticCredentials(Some(info())));
        let error = Error::http(500, HeaderMap::new(), bytes::Bytes::from_static(b"oops"));
        let got = fail_with(Some(credentials), error).await;
        assert_eq!(got.http_status_code(), Some(500));
        assert!(got.status().is_none(), "{got:?}");

        let credentials = Credentials::from(DiagnosticCredentials(None));
        let error = Error::service(Status::default().set_code(Code::PermissionDenied));
        let got = fail_with(Some(credentials), error).await;
        assert_eq!(got.status().map(|s| s.details.len()), Some(0), "{got:?}");

        let error = Error::service(Status::default().set_code(Code::PermissionDenied));
        let got = fail_with(None, error).await;
        assert_eq!(got.status().map(|s| s.details.len()), Some(0), "{got:?}");
    }

    #[derive(Clone, Default)]
    struct SpanNames(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanNames {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.lock().unwrap().push(attrs.metadata().name().to_string());
        }
    }

    #[test_case(true, vec!["aiplatform_call"])]
    #[test_case(false, vec![])]
    #[tokio::test]
    async fn tracing_span(enabled: bool, want: Vec<&str>) -> anyhow::Result<()> {
        use tracing_subscriber::prelude::*;
        let names = SpanNames::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(names.clone()));

        let wrapper = wrapper(Bindings {
            tracing: enabled,
            ..Bindings::default()
        });
        wrapper
            .call(TestRequest::default(), RequestOptions::default(), |_, _| async {
                Ok(())
            })
            .await?;
        let got = names.0.lock().unwrap().clone();
        assert_eq!(got, want);
        Ok(())
    }
}
