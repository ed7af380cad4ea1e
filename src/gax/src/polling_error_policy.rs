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

//! Decide what to do when polling a long-running operation fails.
//!
//! A failed poll says nothing about the operation itself: the service may
//! still be working on it. These policies classify polling errors and put
//! a bound on the polling loop.
//!
//! ```
//! # use aiplatform_gax::polling_error_policy::*;
//! use std::time::Duration;
//! // Stop after 30 minutes or 120 polls, whichever comes first.
//! let policy = Aip194Strict
//!     .with_time_limit(Duration::from_secs(30 * 60))
//!     .with_attempt_limit(120);
//! ```

use crate::error::Error;
use crate::error::rpc::Code;
use crate::retry_result::RetryResult;
use crate::retry_state::PollingState;
use std::sync::Arc;
use std::time::Duration;

/// Controls the polling loop of long-running operations.
pub trait PollingErrorPolicy: Send + Sync + std::fmt::Debug {
    /// Classifies `error`, returned by the poll described in `state`.
    fn on_error(&self, state: &PollingState, error: Error) -> RetryResult;

    /// Called after each successful poll that found the operation still
    /// running. Returning an error ends the loop with that error.
    fn on_in_progress(&self, _state: &PollingState, _operation_name: &str) -> Option<Error> {
        None
    }
}

/// Accepts any [PollingErrorPolicy] where options take one.
#[derive(Clone, Debug)]
pub struct PollingErrorPolicyArg(Arc<dyn PollingErrorPolicy>);

impl<P> From<P> for PollingErrorPolicyArg
where
    P: PollingErrorPolicy + 'static,
{
    fn from(policy: P) -> Self {
        Self(Arc::new(policy))
    }
}

impl From<Arc<dyn PollingErrorPolicy>> for PollingErrorPolicyArg {
    fn from(policy: Arc<dyn PollingErrorPolicy>) -> Self {
        Self(policy)
    }
}

impl From<PollingErrorPolicyArg> for Arc<dyn PollingErrorPolicy> {
    fn from(arg: PollingErrorPolicyArg) -> Self {
        arg.0
    }
}

/// Adds limits to any [PollingErrorPolicy].
pub trait PollingErrorPolicyExt: PollingErrorPolicy + Sized {
    /// Stops the loop once `maximum_duration` has passed since it started.
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Stops the loop after `maximum_attempts` polls.
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<P: PollingErrorPolicy> PollingErrorPolicyExt for P {}

/// Follows [AIP-194]: keep polling on `UNAVAILABLE` and I/O errors, stop on
/// anything else.
///
/// This policy never stops on its own while the operation runs. Combine it
/// with [PollingErrorPolicyExt] limits.
///
/// [AIP-194]: https://google.aip.dev/194
#[derive(Clone, Debug)]
pub struct Aip194Strict;

impl PollingErrorPolicy for Aip194Strict {
    fn on_error(&self, _state: &PollingState, error: Error) -> RetryResult {
        let transient = error.is_transient_and_before_rpc()
            || error.is_io()
            || error.code() == Some(Code::Unavailable);
        if transient {
            RetryResult::Continue(error)
        } else {
            RetryResult::Permanent(error)
        }
    }
}

/// Keeps polling on every error. Only useful with limits.
#[derive(Clone, Debug)]
pub struct AlwaysContinue;

impl PollingErrorPolicy for AlwaysContinue {
    fn on_error(&self, _state: &PollingState, error: Error) -> RetryResult {
        RetryResult::Continue(error)
    }
}

/// Bounds the wall-clock time of the polling loop.
#[derive(Debug)]
pub struct LimitedElapsedTime<P = Aip194Strict>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    pub fn new(maximum_duration: Duration) -> Self {
        Self::custom(Aip194Strict, maximum_duration)
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    // Uses the tokio clock so paused-time tests can advance it.
    fn elapsed(&self, state: &PollingState) -> Option<Duration> {
        let spent = tokio::time::Instant::now()
            .into_std()
            .saturating_duration_since(state.start);
        (spent >= self.maximum_duration).then_some(spent)
    }
}

impl<P> PollingErrorPolicy for LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, state: &PollingState, error: Error) -> RetryResult {
        match self.inner.on_error(state, error) {
            RetryResult::Continue(e) if self.elapsed(state).is_some() => RetryResult::Exhausted(e),
            other => other,
        }
    }

    fn on_in_progress(&self, state: &PollingState, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(state, operation_name)
            .or_else(|| {
                let spent = self.elapsed(state)?;
                let limit = Limit::Elapsed {
                    spent,
                    maximum: self.maximum_duration,
                };
                Some(Error::exhausted(Exhausted::from_limit(operation_name, limit)))
            })
    }
}

/// Bounds the number of polls.
#[derive(Debug)]
pub struct LimitedAttemptCount<P = Aip194Strict>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    pub fn new(maximum_attempts: u32) -> Self {
        Self::custom(Aip194Strict, maximum_attempts)
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }

    fn reached(&self, state: &PollingState) -> bool {
        state.attempt_count >= self.maximum_attempts
    }
}

impl<P> PollingErrorPolicy for LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, state: &PollingState, error: Error) -> RetryResult {
        match self.inner.on_error(state, error) {
            RetryResult::Continue(e) if self.reached(state) => RetryResult::Exhausted(e),
            other => other,
        }
    }

    fn on_in_progress(&self, state: &PollingState, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(state, operation_name)
            .or_else(|| {
                if !self.reached(state) {
                    return None;
                }
                let limit = Limit::Attempts {
                    made: state.attempt_count,
                    maximum: self.maximum_attempts,
                };
                Some(Error::exhausted(Exhausted::from_limit(operation_name, limit)))
            })
    }
}

#[derive(Debug)]
enum Limit {
    Attempts { made: u32, maximum: u32 },
    Elapsed { spent: Duration, maximum: Duration },
}

/// The polling loop gave up while the operation was still running.
///
/// The operation may still complete in the service. Use
/// [operation_name][Exhausted::operation_name] to query it later.
#[derive(Debug)]
pub struct Exhausted {
    operation_name: String,
    limit: Limit,
}

impl Exhausted {
    fn from_limit(operation_name: &str, limit: Limit) -> Self {
        Self {
            operation_name: operation_name.to_string(),
            limit,
        }
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stopped polling {} after ", self.operation_name)?;
        match &self.limit {
            Limit::Attempts { made, maximum } => {
                write!(f, "{made} polls, the limit is {maximum}")
            }
            Limit::Elapsed { spent, maximum } => {
                write!(f, "{spent:?}, the limit is {maximum:?}")
            }
        }
    }
}

impl std::error::Error for Exhausted {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredentialsError;
    use crate::error::rpc::Status;
    use std::error::Error as _;
    use std::time::Instant;
    use test_case::test_case;

    fn service(code: Code) -> Error {
        Error::service(Status::default().set_code(code))
    }

    #[test]
    fn arg_conversions() {
        let shared: Arc<dyn PollingErrorPolicy> = Arc::new(AlwaysContinue);
        let policy: Arc<dyn PollingErrorPolicy> =
            PollingErrorPolicyArg::from(shared.clone()).into();
        assert!(Arc::ptr_eq(&shared, &policy));
        let _ = PollingErrorPolicyArg::from(Aip194Strict.with_attempt_limit(2));
    }

    #[test_case(service(Code::Unavailable), true)]
    #[test_case(Error::io("connection reset"), true)]
    #[test_case(Error::authentication(CredentialsError::from_msg(true, "retry")), true)]
    #[test_case(Error::authentication(CredentialsError::from_msg(false, "bad key")), false)]
    #[test_case(service(Code::NotFound), false)]
    #[test_case(service(Code::ResourceExhausted), false)]
    #[test_case(Error::deser("truncated"), false)]
    fn aip194(error: Error, keep_polling: bool) {
        let got = Aip194Strict.on_error(&PollingState::new(), error);
        assert_eq!(got.is_continue(), keep_polling, "{got:?}");
        assert_eq!(got.is_permanent(), !keep_polling, "{got:?}");
        assert!(Aip194Strict.on_in_progress(&PollingState::new(), "op").is_none());
    }

    #[test_case(service(Code::Internal))]
    #[test_case(Error::deser("truncated"))]
    fn always_continue(error: Error) {
        assert!(AlwaysContinue.on_error(&PollingState::new(), error).is_continue());
    }

    #[test]
    fn attempt_limit() {
        let policy = AlwaysContinue.with_attempt_limit(3);
        let after = |n: u32| PollingState::new().set_attempt_count(n);

        assert!(policy.on_error(&after(2), service(Code::Internal)).is_continue());
        assert!(policy.on_error(&after(3), service(Code::Internal)).is_exhausted());
        assert!(policy.on_in_progress(&after(2), "op").is_none());

        let err = policy
            .on_in_progress(&after(3), "operations/deploy-123")
            .expect("limit reached");
        assert!(err.is_exhausted(), "{err:?}");
        let source = err.source().and_then(|e| e.downcast_ref::<Exhausted>());
        assert_eq!(source.map(Exhausted::operation_name), Some("operations/deploy-123"));
        assert!(err.to_string().contains("3 polls"), "{err}");
    }

    #[test]
    fn time_limit() {
        let policy = AlwaysContinue.with_time_limit(Duration::from_secs(10));
        let fresh = PollingState::new();
        assert!(policy.on_error(&fresh, service(Code::Unavailable)).is_continue());
        assert!(policy.on_in_progress(&fresh, "op").is_none());

        let stale = PollingState::new().set_start(Instant::now() - Duration::from_secs(20));
        assert!(policy.on_error(&stale, service(Code::Unavailable)).is_exhausted());
        let err = policy.on_in_progress(&stale, "operations/undeploy-7");
        let msg = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("operations/undeploy-7"), "{msg}");
    }

    #[test]
    fn limits_keep_permanent_errors() {
        let policy = Aip194Strict.with_attempt_limit(1);
        let state = PollingState::new().set_attempt_count(5_u32);
        let got = policy.on_error(&state, service(Code::PermissionDenied));
        assert!(got.is_permanent(), "{got:?}");
    }
}
