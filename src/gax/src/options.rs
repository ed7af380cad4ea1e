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

//! Options that apply to a single call.
//!
//! Client-level defaults come from the [ClientBuilder] and from the per-method
//! configuration of each service. Every request builder implements
//! [RequestOptionsBuilder], which overrides those defaults for one call:
//!
//! ```
//! # use aiplatform_gax::options::RequestOptions;
//! # use std::time::Duration;
//! let mut options = RequestOptions::default();
//! options.set_timeout(Duration::from_secs(30));
//! options.set_idempotency(true);
//! assert_eq!(options.idempotent(), Some(true));
//! ```
//!
//! [ClientBuilder]: crate::client_builder::ClientBuilder

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg};
use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyArg};
use crate::retry_policy::{RetryPolicy, RetryPolicyArg};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The options for one call.
///
/// Unset fields fall back to the client configuration, and then to the
/// method defaults. Mocks receive this type and may assert on it.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    idempotent: Option<bool>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    attempt_timeout: Option<Duration>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    cancellation: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn idempotent(&self) -> Option<bool> {
        self.idempotent
    }

    /// Overrides the idempotency of the method.
    ///
    /// Retry policies only retry idempotent calls. `GetEndpoint` and
    /// `ListEndpoints` are idempotent by default, `Predict` is not.
    pub fn set_idempotency(&mut self, value: bool) {
        self.idempotent = Some(value);
    }

    pub(crate) fn set_default_idempotency(&mut self, default: bool) {
        self.idempotent.get_or_insert(default);
    }

    /// A prefix for the `user-agent` header.
    pub fn set_user_agent<T: Into<String>>(&mut self, v: T) {
        self.user_agent = Some(v.into());
    }

    pub fn user_agent(&self) -> &Option<String> {
        &self.user_agent
    }

    /// Sets the overall deadline for the request, including all retry
    /// attempts and backoff delays.
    ///
    /// When the timeout expires the in-flight attempt is cancelled and the
    /// request fails with a [timeout][crate::error::Error::is_timeout] error.
    /// Without a timeout the client library uses the method default, if any.
    pub fn set_timeout<T: Into<Duration>>(&mut self, v: T) {
        self.timeout = Some(v.into());
    }

    pub fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Bounds each attempt, the overall timeout still applies.
    pub fn set_attempt_timeout<T: Into<Duration>>(&mut self, v: T) {
        self.attempt_timeout = Some(v.into());
    }

    pub fn attempt_timeout(&self) -> &Option<Duration> {
        &self.attempt_timeout
    }

    pub fn retry_policy(&self) -> &Option<Arc<dyn RetryPolicy>> {
        &self.retry_policy
    }

    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(&mut self, v: V) {
        self.retry_policy = Some(v.into().into());
    }

    pub fn backoff_policy(&self) -> &Option<Arc<dyn BackoffPolicy>> {
        &self.backoff_policy
    }

    /// The delay between retry attempts.
    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(&mut self, v: V) {
        self.backoff_policy = Some(v.into().into());
    }

    pub fn polling_error_policy(&self) -> &Option<Arc<dyn PollingErrorPolicy>> {
        &self.polling_error_policy
    }

    /// Decides when a long-running operation poll loop gives up.
    pub fn set_polling_error_policy<V: Into<PollingErrorPolicyArg>>(&mut self, v: V) {
        self.polling_error_policy = Some(v.into().into());
    }

    pub fn polling_backoff_policy(&self) -> &Option<Arc<dyn PollingBackoffPolicy>> {
        &self.polling_backoff_policy
    }

    /// The delay between long-running operation polls.
    pub fn set_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(&mut self, v: V) {
        self.polling_backoff_policy = Some(v.into().into());
    }

    /// Sets a token to cancel the request.
    ///
    /// Cancelling the token stops the request at its next suspension point. For
    /// streaming calls, it also terminates the stream. Items already returned
    /// to the application remain valid.
    pub fn set_cancellation_token(&mut self, v: CancellationToken) {
        self.cancellation = Some(v);
    }

    pub fn cancellation_token(&self) -> &Option<CancellationToken> {
        &self.cancellation
    }
}

/// Per-call option setters, implemented by every request builder.
pub trait RequestOptionsBuilder: internal::RequestBuilder {
    /// If `v` is `true`, treat the RPC underlying this method as idempotent.
    fn with_idempotency(self, v: bool) -> Self;

    /// Set the user agent header.
    fn with_user_agent<V: Into<String>>(self, v: V) -> Self;

    /// Sets the overall timeout, including retries.
    fn with_timeout<V: Into<Duration>>(self, v: V) -> Self;

    /// Sets the per-attempt timeout.
    fn with_attempt_timeout<V: Into<Duration>>(self, v: V) -> Self;

    /// Sets the retry policy configuration.
    fn with_retry_policy<V: Into<RetryPolicyArg>>(self, v: V) -> Self;

    /// Sets the backoff policy configuration.
    fn with_backoff_policy<V: Into<BackoffPolicyArg>>(self, v: V) -> Self;

    /// Sets the polling error policy configuration.
    fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(self, v: V) -> Self;

    /// Sets the polling backoff policy configuration.
    fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(self, v: V) -> Self;

    /// Sets a cancellation token for the request.
    fn with_cancellation_token(self, v: CancellationToken) -> Self;
}

#[doc(hidden)]
pub mod internal {
    //! Used by the service crates. Not part of the public API.
    use super::RequestOptions;

    /// Request builders implement this to get [super::RequestOptionsBuilder].
    pub trait RequestBuilder {
        fn request_options(&mut self) -> &mut RequestOptions;
    }

    pub fn set_default_idempotency(mut options: RequestOptions, default: bool) -> RequestOptions {
        options.set_default_idempotency(default);
        options
    }
}

impl<T> RequestOptionsBuilder for T
where
    T: internal::RequestBuilder,
{
    fn with_idempotency(mut self, v: bool) -> Self {
        self.request_options().set_idempotency(v);
        self
    }

    fn with_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.request_options().set_user_agent(v);
        self
    }

    fn with_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.request_options().set_timeout(v);
        self
    }

    fn with_attempt_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.request_options().set_attempt_timeout(v);
        self
    }

    fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_retry_policy(v);
        self
    }

    fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_backoff_policy(v);
        self
    }

    fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_polling_error_policy(v);
        self
    }

    fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_polling_backoff_policy(v);
        self
    }

    fn with_cancellation_token(mut self, v: CancellationToken) -> Self {
        self.request_options().set_cancellation_token(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::internal::*;
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;
    use crate::polling_error_policy::Aip194Strict;
    use crate::retry_policy::LimitedAttemptCount;
    use test_case::test_case;

    #[derive(Debug, Default)]
    struct PredictBuilder(RequestOptions);

    impl RequestBuilder for PredictBuilder {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.0
        }
    }

    #[test]
    fn defaults() {
        let options = RequestOptions::default();
        assert_eq!(options.idempotent(), None);
        assert_eq!(options.user_agent(), &None);
        assert_eq!(options.timeout(), &None);
        assert_eq!(options.attempt_timeout(), &None);
        assert!(options.retry_policy().is_none(), "{options:?}");
        assert!(options.backoff_policy().is_none(), "{options:?}");
        assert!(options.polling_error_policy().is_none(), "{options:?}");
        assert!(options.polling_backoff_policy().is_none(), "{options:?}");
        assert!(options.cancellation_token().is_none(), "{options:?}");
    }

    #[test_case(None, true, Some(true))]
    #[test_case(None, false, Some(false))]
    #[test_case(Some(false), true, Some(false))]
    #[test_case(Some(true), false, Some(true))]
    fn default_idempotency(explicit: Option<bool>, default: bool, want: Option<bool>) {
        let mut options = RequestOptions::default();
        if let Some(v) = explicit {
            options.set_idempotency(v);
        }
        let options = set_default_idempotency(options, default);
        assert_eq!(options.idempotent(), want);
    }

    #[test]
    fn builder_setters() -> anyhow::Result<()> {
        let timeout = Duration::from_secs(5);
        let token = CancellationToken::new();
        let mut builder = PredictBuilder::default()
            .with_idempotency(false)
            .with_user_agent("my-app/1.0")
            .with_timeout(timeout)
            .with_attempt_timeout(timeout / 2)
            .with_retry_policy(LimitedAttemptCount::new(2))
            .with_backoff_policy(ExponentialBackoffBuilder::new().build()?)
            .with_polling_error_policy(Aip194Strict)
            .with_polling_backoff_policy(ExponentialBackoffBuilder::new().clamp())
            .with_cancellation_token(token.clone());

        let options = builder.request_options();
        assert_eq!(options.idempotent(), Some(false));
        assert_eq!(options.user_agent().as_deref(), Some("my-app/1.0"));
        assert_eq!(options.timeout(), &Some(timeout));
        assert_eq!(options.attempt_timeout(), &Some(timeout / 2));
        assert!(options.retry_policy().is_some(), "{options:?}");
        assert!(options.backoff_policy().is_some(), "{options:?}");
        assert!(options.polling_error_policy().is_some(), "{options:?}");
        assert!(options.polling_backoff_policy().is_some(), "{options:?}");

        token.cancel();
        let cancelled = options
            .cancellation_token()
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled);
        assert!(cancelled, "{options:?}");
        Ok(())
    }
}
