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

use super::Result;
use super::backoff_policy::BackoffPolicy;
use super::error::Error;
use super::retry_policy::RetryPolicy;
use super::retry_result::RetryResult;
use super::retry_state::RetryState;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs the retry loop for a given function.
///
/// This functions calls an inner function as long as (1) the retry policy has
/// not expired, and (2) the inner function has not returned a successful
/// request.
///
/// In between calls the function waits the amount of time prescribed by the
/// backoff policy, using `sleep` to implement any sleep. The inner function
/// receives the time remaining in the retry policy, if any, and returns a new
/// future for each attempt. These futures must own their data, they cannot
/// borrow from `inner`.
pub async fn retry_loop<F, Fut, S, SleepFut, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: FnMut(Option<Duration>) -> Fut + Send,
    Fut: Future<Output = Result<Response>> + Send,
    S: Fn(Duration) -> SleepFut + Send,
    SleepFut: Future<Output = ()> + Send,
{
    let mut state =
        RetryState::new(idempotent).set_start(tokio::time::Instant::now().into_std());
    loop {
        let remaining_time = retry_policy.remaining_time(&state);
        state.attempt_count += 1;
        let error = match inner(remaining_time).await {
            Ok(r) => return Ok(r),
            Err(e) => e,
        };
        let error = match retry_policy.on_error(&state, error) {
            RetryResult::Permanent(e) | RetryResult::Exhausted(e) => return Err(e),
            RetryResult::Continue(e) => e,
        };
        let delay = backoff_policy.on_failure(&state);
        if retry_policy
            .remaining_time(&state)
            .is_some_and(|remaining| remaining < delay)
        {
            return Err(Error::exhausted(error));
        }
        tracing::warn!(
            attempt_count = state.attempt_count,
            ?delay,
            "retrying after error: {error}"
        );
        sleep(delay).await;
    }
}

/// A helper to compute the time remaining in a retry loop, given the attempt
/// timeout and the overall timeout.
pub fn effective_timeout(
    options: &crate::options::RequestOptions,
    remaining_time: Option<Duration>,
) -> Option<Duration> {
    match (options.attempt_timeout(), remaining_time) {
        (None, None) => None,
        (None, Some(t)) => Some(t),
        (Some(t), None) => Some(*t),
        (Some(a), Some(r)) => Some(*std::cmp::min(a, &r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff_policy::tests::MockBackoff;
    use crate::error::rpc::{Code, Status};
    use crate::retry_policy::tests::MockPolicy;
    use crate::retry_policy::{AlwaysRetry, RetryPolicyExt, RetryableCodes};
    use std::sync::Mutex;
    use test_case::test_case;

    #[test_case(None, None, None)]
    #[test_case(Some(Duration::from_secs(4)), Some(Duration::from_secs(4)), None)]
    #[test_case(Some(Duration::from_secs(4)), None, Some(Duration::from_secs(4)))]
    #[test_case(
        Some(Duration::from_secs(2)),
        Some(Duration::from_secs(2)),
        Some(Duration::from_secs(4))
    )]
    #[test_case(
        Some(Duration::from_secs(2)),
        Some(Duration::from_secs(4)),
        Some(Duration::from_secs(2))
    )]
    fn effective_timeouts(
        want: Option<Duration>,
        remaining: Option<Duration>,
        request: Option<Duration>,
    ) {
        let options = crate::options::RequestOptions::default();
        let options = request.into_iter().fold(options, |mut o, t| {
            o.set_attempt_timeout(t);
            o
        });
        let got = effective_timeout(&options, remaining);
        assert_eq!(want, got);
    }

    #[tokio::test]
    async fn immediate_success() -> anyhow::Result<()> {
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = calls.clone();
        let inner = move |_| {
            *counter.lock().unwrap() += 1;
            std::future::ready(Ok("success"))
        };
        let mut retry_policy = MockPolicy::new();
        retry_policy
            .expect_remaining_time()
            .once()
            .return_const(None);
        let backoff_policy = MockBackoff::new();
        let response = retry_loop(
            inner,
            no_sleep,
            true,
            Arc::new(retry_policy),
            Arc::new(backoff_policy),
        )
        .await?;
        assert_eq!(response, "success");
        assert_eq!(*calls.lock().unwrap(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn immediate_failure() -> anyhow::Result<()> {
        let inner = |_| std::future::ready(Err::<&str, Error>(permanent()));
        let mut retry_policy = MockPolicy::new();
        retry_policy
            .expect_remaining_time()
            .once()
            .return_const(None);
        retry_policy
            .expect_on_error()
            .once()
            .returning(|_, e| RetryResult::Permanent(e));
        let response = retry_loop(
            inner,
            no_sleep,
            true,
            Arc::new(retry_policy),
            Arc::new(MockBackoff::new()),
        )
        .await;
        let err = response.unwrap_err();
        assert_eq!(err.code(), Some(Code::PermissionDenied), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn retry_success() -> anyhow::Result<()> {
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = calls.clone();
        let inner = move |_| {
            let mut guard = counter.lock().unwrap();
            *guard += 1;
            std::future::ready(if *guard < 3 { Err(transient()) } else { Ok("success") })
        };
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorder = sleeps.clone();
        let sleep = move |d| {
            recorder.lock().unwrap().push(d);
            std::future::ready(())
        };

        let mut backoff_policy = MockBackoff::new();
        backoff_policy
            .expect_on_failure()
            .times(2)
            .returning(|s| Duration::from_secs(s.attempt_count as u64));

        let response = retry_loop(
            inner,
            sleep,
            true,
            Arc::new(RetryableCodes::default().with_attempt_limit(5)),
            Arc::new(backoff_policy),
        )
        .await?;
        assert_eq!(response, "success");
        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn retry_exhausted_attempts() -> anyhow::Result<()> {
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = calls.clone();
        let inner = move |_| {
            *counter.lock().unwrap() += 1;
            std::future::ready(Err::<(), Error>(transient()))
        };
        let mut backoff_policy = MockBackoff::new();
        backoff_policy
            .expect_on_failure()
            .returning(|_| Duration::ZERO);
        let response = retry_loop(
            inner,
            |_| std::future::ready(()),
            true,
            Arc::new(AlwaysRetry.with_attempt_limit(3)),
            Arc::new(backoff_policy),
        )
        .await;
        let err = response.unwrap_err();
        assert!(err.is_exhausted(), "{err:?}");
        assert_eq!(*calls.lock().unwrap(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn non_idempotent_not_retried() -> anyhow::Result<()> {
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = calls.clone();
        let inner = move |_| {
            *counter.lock().unwrap() += 1;
            std::future::ready(Err::<(), Error>(transient()))
        };
        let response = retry_loop(
            inner,
            no_sleep,
            false,
            Arc::new(RetryableCodes::default().with_attempt_limit(3)),
            Arc::new(MockBackoff::new()),
        )
        .await;
        let err = response.unwrap_err();
        assert_eq!(err.code(), Some(Code::Unavailable), "{err:?}");
        assert_eq!(*calls.lock().unwrap(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn backoff_exceeds_remaining_time() -> anyhow::Result<()> {
        let inner = |_| std::future::ready(Err::<(), Error>(transient()));
        let mut retry_policy = MockPolicy::new();
        retry_policy
            .expect_remaining_time()
            .returning(|_| Some(Duration::from_secs(1)));
        retry_policy
            .expect_on_error()
            .once()
            .returning(|_, e| RetryResult::Continue(e));
        let mut backoff_policy = MockBackoff::new();
        backoff_policy
            .expect_on_failure()
            .once()
            .return_const(Duration::from_secs(10));
        let response = retry_loop(
            inner,
            no_sleep,
            true,
            Arc::new(retry_policy),
            Arc::new(backoff_policy),
        )
        .await;
        let err = response.unwrap_err();
        assert!(err.is_exhausted(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn remaining_time_passed_to_attempt() -> anyhow::Result<()> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let inner = move |d: Option<Duration>| {
            recorder.lock().unwrap().push(d);
            std::future::ready(Ok(()))
        };
        let mut retry_policy = MockPolicy::new();
        retry_policy
            .expect_remaining_time()
            .once()
            .return_const(Some(Duration::from_secs(7)));
        retry_loop(
            inner,
            |_| std::future::ready(()),
            true,
            Arc::new(retry_policy),
            Arc::new(MockBackoff::new()),
        )
        .await?;
        assert_eq!(*seen.lock().unwrap(), vec![Some(Duration::from_secs(7))]);
        Ok(())
    }

    async fn no_sleep(_: Duration) {
        panic!("unexpected sleep")
    }

    fn transient() -> Error {
        Error::service(
            Status::default()
                .set_code(Code::Unavailable)
                .set_message("try-again"),
        )
    }

    fn permanent() -> Error {
        Error::service(
            Status::default()
                .set_code(Code::PermissionDenied)
                .set_message("uh-oh"),
        )
    }
}
