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

//! Types and functions to make long-running operations (LRO) easier to use.
//!
//! Some service methods start an operation that continues in the service after
//! the method returns. The response carries only the operation name, and the
//! final result is obtained by polling a companion operations service.
//!
//! [OperationFuture] wraps the initial response, polls the operation when
//! asked to, and decodes the final result or error.
//!
//! # Example
//! ```
//! # use lro::{OperationFuture, OperationsClient, model::FromPayload};
//! # async fn sample<R, M, C>(op: OperationFuture<R, M, C>) -> gax::Result<()>
//! # where R: FromPayload + std::fmt::Debug, M: FromPayload, C: OperationsClient {
//! let response = op.until_done().await?;
//! println!("operation completed with {response:?}");
//! # Ok(()) }
//! ```

use gax::Result;
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoff;
use gax::options::RequestOptions;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::{Aip194Strict, PollingErrorPolicy};
use gax::retry_state::PollingState;
use model::{FromPayload, Operation};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

mod details;
pub mod model;

/// The result of polling a Long-Running Operation (LRO).
///
/// # Parameters
/// * `R` - the response type. This is the type returned when the LRO completes
///   successfully.
/// * `M` - the metadata type. While operations are in progress the LRO may
///   return values of this type.
#[derive(Debug)]
pub enum PollingResult<R, M> {
    /// The operation is still in progress.
    InProgress(Option<M>),
    /// The operation completed. This includes the result.
    Completed(Result<R>),
    /// An error trying to poll the LRO.
    ///
    /// Not all errors indicate that the operation failed. For example, this
    /// may fail because it was not possible to connect to the service. Such
    /// transient errors may disappear in the next polling attempt.
    PollingError(Error),
}

/// The operations service used to poll and cancel operations.
///
/// Service crates implement this trait for each transport. Polling requests
/// are always idempotent.
pub trait OperationsClient: Send + Sync + std::fmt::Debug {
    /// Fetches the latest state of the operation.
    fn get_operation(
        &self,
        name: String,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Operation>> + Send;

    /// Requests the cancellation of the operation.
    ///
    /// The service may complete the operation regardless.
    fn cancel_operation(
        &self,
        name: String,
        options: RequestOptions,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A handle on a running operation, with typed results.
///
/// # Parameters
/// * `R` - the response type.
/// * `M` - the metadata type.
/// * `C` - the operations client.
///
/// The handle is safe to share between tasks. Polls are serialized: at most one
/// poll request is in flight at a time.
#[derive(Debug)]
pub struct OperationFuture<R, M, C> {
    client: C,
    operation: Mutex<Operation>,
    options: RequestOptions,
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    _types: PhantomData<fn() -> (R, M)>,
}

impl<R, M, C> OperationFuture<R, M, C>
where
    R: FromPayload,
    M: FromPayload,
    C: OperationsClient,
{
    /// Creates a new handle from the response of the method that started the
    /// operation.
    ///
    /// The polling policies in `options`, if any, control the polling loop.
    pub fn new(client: C, operation: Operation, options: RequestOptions) -> Self {
        let error_policy = options
            .polling_error_policy()
            .clone()
            .unwrap_or_else(|| Arc::new(Aip194Strict));
        let backoff_policy = options
            .polling_backoff_policy()
            .clone()
            .unwrap_or_else(|| Arc::new(ExponentialBackoff::default()));
        Self {
            client,
            operation: Mutex::new(operation),
            options,
            error_policy,
            backoff_policy,
            _types: PhantomData,
        }
    }

    /// Sets the client-level polling policies.
    ///
    /// Policies set in the request options take precedence.
    pub fn with_client_policies(
        mut self,
        error_policy: Option<Arc<dyn PollingErrorPolicy>>,
        backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    ) -> Self {
        if let (None, Some(p)) = (self.options.polling_error_policy(), error_policy) {
            self.error_policy = p;
        }
        if let (None, Some(p)) = (self.options.polling_backoff_policy(), backoff_policy) {
            self.backoff_policy = p;
        }
        self
    }

    /// The operation name.
    pub async fn name(&self) -> String {
        self.operation.lock().await.name.clone()
    }

    /// Returns true once the operation reached a terminal state.
    ///
    /// This reports the last known state, it does not poll the service.
    pub async fn done(&self) -> bool {
        self.operation.lock().await.done
    }

    /// The metadata in the last known state, if any.
    pub async fn metadata(&self) -> Option<M> {
        details::as_metadata(&*self.operation.lock().await)
    }

    /// Refreshes the state of the operation.
    ///
    /// Completed operations are never polled again, this returns their result.
    pub async fn poll(&self) -> PollingResult<R, M> {
        self.poll_with_state(&PollingState::new()).await
    }

    /// Waits until the operation completes, or `timeout` elapses.
    ///
    /// On timeout this returns an error, the operation continues in the
    /// service.
    pub async fn result(&self, timeout: Option<Duration>) -> Result<R> {
        let Some(timeout) = timeout else {
            return self.wait().await;
        };
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(r) => r,
            Err(e) => Err(Error::timeout(e)),
        }
    }

    /// Waits until the operation completes.
    pub async fn until_done(self) -> Result<R> {
        self.wait().await
    }

    /// Requests the cancellation of the operation.
    ///
    /// This is a no-op for completed operations. The service may complete the
    /// operation even after a successful cancellation request.
    pub async fn cancel(&self) -> Result<()> {
        let name = {
            let guard = self.operation.lock().await;
            if guard.done {
                return Ok(());
            }
            guard.name.clone()
        };
        self.client
            .cancel_operation(name, self.options.clone())
            .await
    }

    /// Converts the handle into a stream of polling results.
    ///
    /// The stream ends after the operation completes, or the polling policy
    /// stops the loop.
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = PollingResult<R, M>> {
        use futures::stream::unfold;
        let state = (self, PollingState::new(), false);
        unfold(state, |(future, state, first)| async move {
            if future.done().await {
                return None;
            }
            if first {
                tokio::time::sleep(future.backoff_policy.wait_period(&state)).await;
            }
            let attempt_count = state.attempt_count + 1;
            let state = state.set_attempt_count(attempt_count);
            let result = future.poll_with_state(&state).await;
            Some((result, (future, state, true)))
        })
    }

    async fn wait(&self) -> Result<R> {
        let mut state = PollingState::new();
        loop {
            {
                let guard = self.operation.lock().await;
                if guard.done {
                    return details::as_result(&guard);
                }
            }
            if state.attempt_count > 0 {
                tokio::time::sleep(self.backoff_policy.wait_period(&state)).await;
            }
            let attempt_count = state.attempt_count + 1;
            state = state.set_attempt_count(attempt_count);
            match self.poll_with_state(&state).await {
                PollingResult::Completed(r) => return r,
                PollingResult::InProgress(_) => {
                    let name = self.operation.lock().await.name.clone();
                    if let Some(e) = self.error_policy.on_in_progress(&state, &name) {
                        return Err(e);
                    }
                }
                PollingResult::PollingError(e) => {
                    tracing::debug!("transient error polling the operation: {e}");
                }
            }
        }
    }

    async fn poll_with_state(&self, state: &PollingState) -> PollingResult<R, M> {
        let mut guard = self.operation.lock().await;
        if guard.done {
            return details::handle_common(&guard);
        }
        match self
            .client
            .get_operation(guard.name.clone(), self.options.clone())
            .await
        {
            Ok(op) => {
                *guard = op;
                details::handle_common(&guard)
            }
            Err(e) => details::handle_poll_error(self.error_policy.as_ref(), state, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::rpc::{Code, Status};
    use gax::exponential_backoff::ExponentialBackoffBuilder;
    use gax::polling_error_policy::{AlwaysContinue, PollingErrorPolicyExt};
    use model::Payload;
    use prost::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as SyncMutex;
    use std::collections::VecDeque;

    #[derive(Clone, PartialEq, Message, serde::Deserialize)]
    struct Resource {
        #[prost(string, tag = "1")]
        #[serde(default)]
        name: String,
    }

    #[derive(Clone, PartialEq, Message, serde::Deserialize)]
    struct Progress {
        #[prost(int32, tag = "1")]
        #[serde(default)]
        percent: i32,
    }

    #[derive(Debug, Default)]
    struct FakeOperations {
        responses: SyncMutex<VecDeque<Result<Operation>>>,
        polls: AtomicUsize,
        cancels: AtomicUsize,
    }

    impl FakeOperations {
        fn new(responses: Vec<Result<Operation>>) -> Arc<Self> {
            Arc::new(Self {
                responses: SyncMutex::new(responses.into()),
                ..Default::default()
            })
        }
    }

    impl OperationsClient for Arc<FakeOperations> {
        async fn get_operation(&self, name: String, _options: RequestOptions) -> Result<Operation> {
            assert_eq!(name, "op-001");
            self.polls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err(Error::deser("unexpected poll")))
        }

        async fn cancel_operation(&self, name: String, _options: RequestOptions) -> Result<()> {
            assert_eq!(name, "op-001");
            self.cancels.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn running(percent: i32) -> Operation {
        Operation::new()
            .set_name("op-001")
            .set_metadata(Payload::Binary(prost_types::Any {
                type_url: "type.googleapis.com/test.Progress".into(),
                value: Progress { percent }.encode_to_vec(),
            }))
    }

    fn completed() -> Operation {
        Operation::new()
            .set_name("op-001")
            .set_done(true)
            .set_response(Payload::Binary(prost_types::Any {
                type_url: "type.googleapis.com/test.Resource".into(),
                value: Resource {
                    name: "r-001".into(),
                }
                .encode_to_vec(),
            }))
    }

    fn unavailable() -> Error {
        Error::service(
            Status::default()
                .set_code(Code::Unavailable)
                .set_message("try-again"),
        )
    }

    type TestFuture = OperationFuture<Resource, Progress, Arc<FakeOperations>>;

    #[tokio::test(start_paused = true)]
    async fn result_after_three_polls() -> anyhow::Result<()> {
        let fake = FakeOperations::new(vec![Ok(running(25)), Ok(running(50)), Ok(completed())]);
        let future = TestFuture::new(fake.clone(), running(0), RequestOptions::default());
        assert!(!future.done().await);
        assert_eq!(future.metadata().await.map(|m| m.percent), Some(0));

        let got = future.result(None).await?;
        assert_eq!(got.name, "r-001");
        assert_eq!(fake.polls.load(Ordering::SeqCst), 3);
        assert!(future.done().await);

        // Completed operations are not polled again.
        let got = future.result(None).await?;
        assert_eq!(got.name, "r-001");
        assert!(matches!(future.poll().await, PollingResult::Completed(Ok(_))));
        assert_eq!(fake.polls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn poll() {
        let fake = FakeOperations::new(vec![Ok(running(50)), Err(unavailable()), Ok(completed())]);
        let future = TestFuture::new(fake.clone(), running(0), RequestOptions::default());
        let got = future.poll().await;
        assert!(
            matches!(&got, PollingResult::InProgress(Some(p)) if p.percent == 50),
            "{got:?}"
        );
        assert_eq!(future.metadata().await.map(|m| m.percent), Some(50));

        let got = future.poll().await;
        assert!(matches!(&got, PollingResult::PollingError(_)), "{got:?}");
        // A failed poll keeps the last known state.
        assert_eq!(future.metadata().await.map(|m| m.percent), Some(50));

        let got = future.poll().await;
        assert!(
            matches!(&got, PollingResult::Completed(Ok(r)) if r.name == "r-001"),
            "{got:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn operation_error() {
        let status = Status::default()
            .set_code(Code::FailedPrecondition)
            .set_message("cannot deploy");
        let fake = FakeOperations::new(vec![Ok(running(50).set_done(true).set_error(status.clone()))]);
        let future = TestFuture::new(fake, running(0), RequestOptions::default());
        let err = future.until_done().await.unwrap_err();
        assert!(err.is_operation(), "{err:?}");
        assert_eq!(err.status(), Some(&status));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_polling_errors() -> anyhow::Result<()> {
        let fake = FakeOperations::new(vec![Err(unavailable()), Err(unavailable()), Ok(completed())]);
        let future = TestFuture::new(fake.clone(), running(0), RequestOptions::default());
        let got = future.until_done().await?;
        assert_eq!(got.name, "r-001");
        assert_eq!(fake.polls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_polling_error() {
        let fake = FakeOperations::new(vec![Err(Error::service(
            Status::default()
                .set_code(Code::PermissionDenied)
                .set_message("uh-oh"),
        ))]);
        let future = TestFuture::new(fake, running(0), RequestOptions::default());
        let err = future.until_done().await.unwrap_err();
        assert_eq!(err.status().map(|s| s.code), Some(Code::PermissionDenied));
        assert!(!err.is_operation(), "{err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_limit() {
        let fake = FakeOperations::new(vec![Ok(running(10)), Ok(running(20)), Ok(running(30))]);
        let mut options = RequestOptions::default();
        options.set_polling_error_policy(AlwaysContinue.with_attempt_limit(2));
        let future = TestFuture::new(fake.clone(), running(0), options);
        let err = future.until_done().await.unwrap_err();
        assert!(err.is_exhausted(), "{err:?}");
        assert_eq!(fake.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_operation() {
        let responses = (0..100).map(|i| Ok(running(i))).collect();
        let fake = FakeOperations::new(responses);
        let mut options = RequestOptions::default();
        options.set_polling_backoff_policy(
            ExponentialBackoffBuilder::new()
                .with_initial_delay(Duration::from_secs(10))
                .with_maximum_delay(Duration::from_secs(10))
                .clamp(),
        );
        let future = TestFuture::new(fake.clone(), running(0), options);
        let err = future
            .result(Some(Duration::from_secs(25)))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        assert!(!future.done().await);
        assert_eq!(fake.cancels.load(Ordering::SeqCst), 0);
        assert_eq!(future.name().await, "op-001");
    }

    #[tokio::test]
    async fn cancel() -> anyhow::Result<()> {
        let fake = FakeOperations::new(vec![Ok(completed())]);
        let future = TestFuture::new(fake.clone(), running(0), RequestOptions::default());
        future.cancel().await?;
        assert_eq!(fake.cancels.load(Ordering::SeqCst), 1);

        assert!(matches!(future.poll().await, PollingResult::Completed(Ok(_))));
        // No cancel requests for completed operations.
        future.cancel().await?;
        assert_eq!(fake.cancels.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn client_policies() -> anyhow::Result<()> {
        let fake = FakeOperations::new(vec![Ok(running(10)), Ok(running(20))]);
        let future = TestFuture::new(fake.clone(), running(0), RequestOptions::default())
            .with_client_policies(
                Some(Arc::new(AlwaysContinue.with_attempt_limit(1))),
                None,
            );
        let err = future.until_done().await.unwrap_err();
        assert!(err.is_exhausted(), "{err:?}");
        assert_eq!(fake.polls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[cfg(feature = "unstable-stream")]
    #[tokio::test(start_paused = true)]
    async fn stream() {
        use futures::StreamExt;
        let fake = FakeOperations::new(vec![Ok(running(50)), Ok(completed())]);
        let future = TestFuture::new(fake, running(0), RequestOptions::default());
        let got = future.into_stream().collect::<Vec<_>>().await;
        assert_eq!(got.len(), 2, "{got:?}");
        assert!(matches!(&got[0], PollingResult::InProgress(Some(p)) if p.percent == 50));
        assert!(matches!(&got[1], PollingResult::Completed(Ok(r)) if r.name == "r-001"));
    }
}
