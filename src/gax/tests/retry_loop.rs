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

//! These tests drive the retry loop with the real policy implementations.
//!
//! The unit tests cover each policy in isolation, here we verify they compose
//! as expected: the attempt limit, the time limit, and the backoff delays.

use aiplatform_gax::error::Error;
use aiplatform_gax::error::rpc::{Code, Status};
use aiplatform_gax::exponential_backoff::ExponentialBackoffBuilder;
use aiplatform_gax::retry_loop_internal::retry_loop;
use aiplatform_gax::retry_policy::{Aip194Strict, RetryPolicyExt, RetryableCodes};
use std::future::ready;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn unavailable() -> Error {
    Error::service(
        Status::default()
            .set_code(Code::Unavailable)
            .set_message("try-again"),
    )
}

fn backoff() -> ExponentialBackoffBuilder {
    ExponentialBackoffBuilder::new()
        .with_initial_delay(Duration::from_millis(100))
        .with_maximum_delay(Duration::from_secs(1))
        .with_scaling(2.0)
}

#[tokio::test(start_paused = true)]
async fn attempt_limit() -> anyhow::Result<()> {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = calls.clone();
    let inner = move |_| {
        *counter.lock().unwrap() += 1;
        ready(Err::<(), Error>(unavailable()))
    };
    let result = retry_loop(
        inner,
        tokio::time::sleep,
        true,
        Arc::new(RetryableCodes::default().with_attempt_limit(4)),
        Arc::new(backoff().build()?),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.is_exhausted(), "{err:?}");
    assert_eq!(*calls.lock().unwrap(), 4);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn time_limit() -> anyhow::Result<()> {
    let inner = |_| ready(Err::<(), Error>(unavailable()));
    let start = tokio::time::Instant::now();
    let result = retry_loop(
        inner,
        tokio::time::sleep,
        true,
        Arc::new(Aip194Strict.with_time_limit(Duration::from_secs(5))),
        Arc::new(backoff().build()?),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.is_exhausted(), "{err:?}");
    assert!(start.elapsed() <= Duration::from_secs(5), "{:?}", start.elapsed());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn delays_are_bounded() -> anyhow::Result<()> {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = calls.clone();
    let inner = move |_| {
        let mut guard = counter.lock().unwrap();
        *guard += 1;
        ready(if *guard < 6 { Err(unavailable()) } else { Ok(*guard) })
    };
    let sleeps = Arc::new(Mutex::new(Vec::new()));
    let recorder = sleeps.clone();
    let sleep = move |d: Duration| {
        recorder.lock().unwrap().push(d);
        tokio::time::sleep(d)
    };
    let got = retry_loop(
        inner,
        sleep,
        true,
        Arc::new(Aip194Strict),
        Arc::new(backoff().build()?),
    )
    .await?;
    assert_eq!(got, 6);
    let sleeps = sleeps.lock().unwrap();
    assert_eq!(sleeps.len(), 5, "{sleeps:?}");
    assert!(
        sleeps.iter().all(|d| *d <= Duration::from_secs(1)),
        "{sleeps:?}"
    );
    Ok(())
}
