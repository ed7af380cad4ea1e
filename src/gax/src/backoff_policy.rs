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

//! How long to wait before retrying a failed request.
//!
//! Requests are retried only when it is safe: the error is transient and
//! the request is [idempotent], or the request never reached the service.
//! Immediate retries tend to pile onto a service that is already struggling,
//! so the retry loop sleeps between attempts. The sleep comes from a
//! [BackoffPolicy]. The default is [truncated exponential backoff] with
//! jitter.
//!
//! ```
//! # use aiplatform_gax::exponential_backoff::{Error, ExponentialBackoffBuilder};
//! # use aiplatform_gax::backoff_policy::BackoffPolicyArg;
//! use std::time::Duration;
//! let arg: BackoffPolicyArg = ExponentialBackoffBuilder::new()
//!     .with_initial_delay(Duration::from_millis(250))
//!     .with_maximum_delay(Duration::from_secs(30))
//!     .with_scaling(3.0)
//!     .build()?
//!     .into();
//! # Ok::<(), Error>(())
//! ```
//!
//! [truncated exponential backoff]: https://en.wikipedia.org/wiki/Exponential_backoff
//! [idempotent]: https://en.wikipedia.org/wiki/Idempotence

use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::Duration;

/// Computes the sleep between two attempts of the same request.
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// The delay after the attempt described by `state` failed.
    ///
    /// Only called after a failure, `state.attempt_count` is never zero.
    fn on_failure(&self, state: &RetryState) -> Duration;
}

/// Accepts any [BackoffPolicy] where client or request options take one.
#[derive(Clone, Debug)]
pub struct BackoffPolicyArg(Arc<dyn BackoffPolicy>);

impl<P> From<P> for BackoffPolicyArg
where
    P: BackoffPolicy + 'static,
{
    fn from(policy: P) -> Self {
        Self(Arc::new(policy))
    }
}

impl From<Arc<dyn BackoffPolicy>> for BackoffPolicyArg {
    fn from(policy: Arc<dyn BackoffPolicy>) -> Self {
        Self(policy)
    }
}

impl From<BackoffPolicyArg> for Arc<dyn BackoffPolicy> {
    fn from(arg: BackoffPolicyArg) -> Self {
        arg.0
    }
}
