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

//! Defines traits for retry policies and some common implementations.
//!
//! The client libraries automatically retry RPCs when they fail due to
//! transient errors and the RPC is idempotent, that is, it is safe to perform
//! the RPC more than once. Errors that happen before the request leaves the
//! client, such as a transient failure refreshing an access token, are always
//! safe to retry.
//!
//! Applications may override the default behavior and maybe retry operations
//! that, while not safe in general, may be safe given how the application
//! manages resources.
//!
//! # Example
//! ```
//! # use aiplatform_gax::retry_policy::*;
//! use std::time::Duration;
//! let policy = RetryableCodes::default()
//!     .with_time_limit(Duration::from_secs(30))
//!     .with_attempt_limit(5);
//! ```

use crate::error::Error;
use crate::error::rpc::Code;
use crate::retry_result::RetryResult;
use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::Duration;

/// The default maximum number of attempts in a retry loop.
pub const DEFAULT_ATTEMPT_LIMIT: u32 = 10;

/// Determines how errors are handled in the retry loop.
///
/// Implementations of this trait determine if errors are retryable, and for
/// how long the retry loop may continue.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Query the retry policy after an error.
    ///
    /// # Parameters
    /// * `state` - the idempotency of the request, when the loop started, and
    ///   how many attempts have been made.
    /// * `error` - the last error when attempting the request.
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult;

    /// The remaining time in the retry policy.
    ///
    /// For policies based on time, this returns the remaining time in the
    /// policy. The retry loop can use this value to adjust the next RPC
    /// timeout. For policies that are not time based this returns `None`.
    fn remaining_time(&self, _state: &RetryState) -> Option<Duration> {
        None
    }
}

/// A helper type to use [RetryPolicy] in client and request options.
#[derive(Clone, Debug)]
pub struct RetryPolicyArg(Arc<dyn RetryPolicy>);

impl<T> std::convert::From<T> for RetryPolicyArg
where
    T: RetryPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn RetryPolicy>> for RetryPolicyArg {
    fn from(value: Arc<dyn RetryPolicy>) -> Self {
        Self(value)
    }
}

impl From<RetryPolicyArg> for Arc<dyn RetryPolicy> {
    fn from(value: RetryPolicyArg) -> Arc<dyn RetryPolicy> {
        value.0
    }
}

/// Extension trait for [`RetryPolicy`]
pub trait RetryPolicyExt: RetryPolicy + Sized {
    /// Decorate a [`RetryPolicy`] to limit the total elapsed time in the retry loop.
    ///
    /// While the time spent in the retry loop (including time in backoff) is
    /// less than the prescribed duration the `on_error()` method returns the
    /// results of the inner policy. After that time it returns
    /// [Exhausted][RetryResult::Exhausted] if the inner policy returns
    /// [Continue][RetryResult::Continue].
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::retry_policy::*;
    /// # use aiplatform_gax::retry_state::RetryState;
    /// use std::time::{Duration, Instant};
    /// let policy = AlwaysRetry.with_time_limit(Duration::from_secs(10));
    /// let state = RetryState::new(true).set_start(Instant::now() - Duration::from_secs(20));
    /// assert!(policy.on_error(&state, transient_error()).is_exhausted());
    ///
    /// use aiplatform_gax::error::{Error, rpc::{Code, Status}};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorate a [RetryPolicy] to limit the number of retry attempts.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::retry_policy::*;
    /// # use aiplatform_gax::retry_state::RetryState;
    /// let policy = AlwaysRetry.with_attempt_limit(3);
    /// assert!(policy.on_error(&RetryState::new(true).set_attempt_count(1_u32), transient_error()).is_continue());
    /// assert!(policy.on_error(&RetryState::new(true).set_attempt_count(3_u32), transient_error()).is_exhausted());
    ///
    /// use aiplatform_gax::error::{Error, rpc::{Code, Status}};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: RetryPolicy> RetryPolicyExt for T {}

/// A retry policy that strictly follows [AIP-194].
///
/// This policy must be decorated to limit the number of retry attempts or the
/// duration of the retry loop.
///
/// The policy interprets AIP-194 **strictly**, the retry decision for
/// server-side errors are based only on the status code, and the only retryable
/// status code is "UNAVAILABLE".
///
/// [AIP-194]: https://google.aip.dev/194
#[derive(Clone, Debug)]
pub struct Aip194Strict;

impl RetryPolicy for Aip194Strict {
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        if error.is_transient_and_before_rpc() {
            return RetryResult::Continue(error);
        }
        if !state.idempotent {
            return RetryResult::Permanent(error);
        }
        if error.is_io() {
            return RetryResult::Continue(error);
        }
        match error.code() {
            Some(Code::Unavailable) => RetryResult::Continue(error),
            _ => RetryResult::Permanent(error),
        }
    }
}

/// Retries errors whose status code belongs to a configured set.
///
/// The default set is `UNAVAILABLE`, `RESOURCE_EXHAUSTED` and `ABORTED`.
/// Methods that tolerate server-side deadlines add `DEADLINE_EXCEEDED`. Like
/// all the basic policies, it never retries non-idempotent requests unless the
/// error happened before the request was sent.
///
/// # Example
/// ```
/// # use aiplatform_gax::retry_policy::*;
/// # use aiplatform_gax::retry_state::RetryState;
/// use aiplatform_gax::error::{Error, rpc::{Code, Status}};
/// let policy = RetryableCodes::default().with_code(Code::DeadlineExceeded);
/// let error = Error::service(Status::default().set_code(Code::DeadlineExceeded));
/// assert!(policy.on_error(&RetryState::new(true), error).is_continue());
/// ```
#[derive(Clone, Debug)]
pub struct RetryableCodes {
    codes: Vec<Code>,
}

impl RetryableCodes {
    /// Creates a policy retrying exactly the given codes.
    pub fn new<I: IntoIterator<Item = Code>>(codes: I) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Adds a code to the retryable set.
    pub fn with_code(mut self, code: Code) -> Self {
        if !self.codes.contains(&code) {
            self.codes.push(code);
        }
        self
    }

    /// The codes considered retryable.
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }
}

impl std::default::Default for RetryableCodes {
    fn default() -> Self {
        Self::new([Code::Unavailable, Code::ResourceExhausted, Code::Aborted])
    }
}

impl RetryPolicy for RetryableCodes {
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        if error.is_transient_and_before_rpc() {
            return RetryResult::Continue(error);
        }
        if !state.idempotent {
            return RetryResult::Permanent(error);
        }
        if error.is_io() {
            return RetryResult::Continue(error);
        }
        match error.code() {
            Some(c) if self.codes.contains(&c) => RetryResult::Continue(error),
            _ => RetryResult::Permanent(error),
        }
    }
}

/// A retry policy that retries all errors.
///
/// This policy must be decorated to limit the number of retry attempts or the
/// duration of the retry loop. It is mostly useful in tests and for requests
/// that the application knows to be safe to repeat.
#[derive(Clone, Debug)]
pub struct AlwaysRetry;

impl RetryPolicy for AlwaysRetry {
    fn on_error(&self, _state: &RetryState, error: Error) -> RetryResult {
        RetryResult::Continue(error)
    }
}

/// A retry policy that never retries.
///
/// The first error is returned to the application.
#[derive(Clone, Debug)]
pub struct NeverRetry;

impl RetryPolicy for NeverRetry {
    fn on_error(&self, _state: &RetryState, error: Error) -> RetryResult {
        RetryResult::Exhausted(error)
    }
}

/// A retry policy decorator that limits the total time in the retry loop.
///
/// This policy decorates an inner policy and limits the duration of retry
/// loops. Once the loop exceeds its duration limit, this policy returns
/// [Exhausted][RetryResult::Exhausted] for errors the inner policy would
/// retry.
#[derive(Clone, Debug)]
pub struct LimitedElapsedTime<P = Aip194Strict>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_duration: Duration) -> Self {
        Self {
            inner: Aip194Strict,
            maximum_duration,
        }
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn error_if_exhausted(&self, state: &RetryState, error: Error) -> RetryResult {
        let deadline = state.start + self.maximum_duration;
        let now = tokio::time::Instant::now().into_std();
        if now < deadline {
            RetryResult::Continue(error)
        } else {
            RetryResult::Exhausted(Error::exhausted(Exhausted::new(
                error,
                "elapsed time",
                format!("{:?}", now.checked_duration_since(state.start).unwrap_or_default()),
                format!("{:?}", self.maximum_duration),
            )))
        }
    }
}

impl<P> RetryPolicy for LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        match self.inner.on_error(state, error) {
            RetryResult::Permanent(e) => RetryResult::Permanent(e),
            RetryResult::Exhausted(e) => RetryResult::Exhausted(e),
            RetryResult::Continue(e) => self.error_if_exhausted(state, e),
        }
    }

    fn remaining_time(&self, state: &RetryState) -> Option<Duration> {
        let deadline = state.start + self.maximum_duration;
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now().into_std());
        if let Some(inner) = self.inner.remaining_time(state) {
            return Some(std::cmp::min(remaining, inner));
        }
        Some(remaining)
    }
}

/// A retry policy decorator that limits the number of attempts.
///
/// This policy decorates an inner policy and limits the total number of
/// attempts. Once the maximum number of attempts is reached, the policy returns
/// [Exhausted][RetryResult::Exhausted] for errors the inner policy would
/// retry.
#[derive(Clone, Debug)]
pub struct LimitedAttemptCount<P = Aip194Strict>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: Aip194Strict,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> RetryPolicy for LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        match self.inner.on_error(state, error) {
            RetryResult::Permanent(e) => RetryResult::Permanent(e),
            RetryResult::Exhausted(e) => RetryResult::Exhausted(e),
            RetryResult::Continue(e) => {
                if state.attempt_count >= self.maximum_attempts {
                    RetryResult::Exhausted(Error::exhausted(Exhausted::new(
                        e,
                        "attempt count",
                        state.attempt_count.to_string(),
                        self.maximum_attempts.to_string(),
                    )))
                } else {
                    RetryResult::Continue(e)
                }
            }
        }
    }

    fn remaining_time(&self, state: &RetryState) -> Option<Duration> {
        self.inner.remaining_time(state)
    }
}

/// The source of [Error::exhausted] errors created by the retry decorators.
#[derive(Debug)]
pub struct Exhausted {
    inner: Error,
    limit_name: &'static str,
    value: String,
    limit: String,
}

impl Exhausted {
    pub fn new(inner: Error, limit_name: &'static str, value: String, limit: String) -> Self {
        Self {
            inner,
            limit_name,
            value,
            limit,
        }
    }
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry policy is exhausted after {} {} (limit was {}), last error: {}",
            self.limit_name, self.value, self.limit, self.inner
        )
    }
}

impl std::error::Error for Exhausted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}
