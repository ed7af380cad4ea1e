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

//! Exponential backoff, capped at a maximum delay.
//!
//! The delay before attempt `n + 1` is `initial * scaling^(n - 1)`, never more
//! than the maximum. Retry loops draw the actual sleep uniformly from
//! `[0, delay]` (full jitter). Long-running operation polls sleep for the
//! full delay, so polls stay evenly spaced.

use crate::backoff_policy::BackoffPolicy;
use crate::polling_backoff_policy::PollingBackoffPolicy;
use crate::retry_state::{PollingState, RetryState};
use std::time::Duration;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAXIMUM_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_SCALING: f64 = 2.0;

/// Invalid [ExponentialBackoffBuilder] parameters.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("the scaling factor must be at least 1.0, got {0}")]
    InvalidScalingFactor(f64),
    #[error("the initial delay must be positive, got {0:?}")]
    InvalidInitialDelay(Duration),
    #[error("the maximum delay ({maximum:?}) is shorter than the initial delay ({initial:?})")]
    EmptyRange { maximum: Duration, initial: Duration },
}

/// Configures an [ExponentialBackoff].
///
/// Starts from a one second delay, doubling up to one minute.
///
/// ```
/// # use aiplatform_gax::exponential_backoff::{Error, ExponentialBackoffBuilder};
/// # use aiplatform_gax::polling_backoff_policy::PollingBackoffPolicy;
/// # use aiplatform_gax::retry_state::PollingState;
/// use std::time::Duration;
/// let polling = ExponentialBackoffBuilder::new()
///     .with_initial_delay(Duration::from_secs(5))
///     .with_maximum_delay(Duration::from_secs(45))
///     .with_scaling(1.5)
///     .build()?;
/// let third = PollingState::new().set_attempt_count(3_u32);
/// assert_eq!(polling.wait_period(&third), Duration::from_millis(11_250));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ExponentialBackoffBuilder {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl ExponentialBackoffBuilder {
    pub fn new() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            maximum_delay: DEFAULT_MAXIMUM_DELAY,
            scaling: DEFAULT_SCALING,
        }
    }

    /// The delay after the first failure.
    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.initial_delay = v.into();
        self
    }

    /// The upper bound for any delay.
    pub fn with_maximum_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.maximum_delay = v.into();
        self
    }

    /// The growth factor between consecutive delays.
    pub fn with_scaling<V: Into<f64>>(mut self, v: V) -> Self {
        self.scaling = v.into();
        self
    }

    /// Returns the policy, or an error if the parameters are inconsistent.
    pub fn build(self) -> Result<ExponentialBackoff, Error> {
        self.validate()?;
        Ok(ExponentialBackoff {
            initial_delay: self.initial_delay,
            maximum_delay: self.maximum_delay,
            scaling: self.scaling,
        })
    }

    /// Returns a policy, forcing the parameters into a usable range.
    ///
    /// The maximum delay is bounded to `[1s, 24h]`, then the initial delay to
    /// `[1ms, maximum]`, and the scaling factor to `[1.0, 32.0]`.
    pub fn clamp(self) -> ExponentialBackoff {
        let maximum_delay = self
            .maximum_delay
            .clamp(Duration::from_secs(1), Duration::from_secs(24 * 60 * 60));
        ExponentialBackoff {
            initial_delay: self
                .initial_delay
                .clamp(Duration::from_millis(1), maximum_delay),
            maximum_delay,
            scaling: self.scaling.clamp(1.0, 32.0),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.scaling.is_nan() || self.scaling < 1.0 {
            return Err(Error::InvalidScalingFactor(self.scaling));
        }
        if self.initial_delay.is_zero() {
            return Err(Error::InvalidInitialDelay(self.initial_delay));
        }
        if self.maximum_delay < self.initial_delay {
            return Err(Error::EmptyRange {
                maximum: self.maximum_delay,
                initial: self.initial_delay,
            });
        }
        Ok(())
    }
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential backoff, used both for retries and for operation polling.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl ExponentialBackoff {
    /// The delay after `attempt_count` attempts, without jitter.
    fn delay(&self, attempt_count: u32) -> Duration {
        let exponent = i32::try_from(attempt_count.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.scaling.powi(exponent);
        let ceiling = self.maximum_delay.div_duration_f64(self.initial_delay);
        // Comparing the factors first avoids overflowing `mul_f64()`.
        if factor >= ceiling {
            return self.maximum_delay;
        }
        self.initial_delay.mul_f64(factor)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoffBuilder::new().clamp()
    }
}

impl PollingBackoffPolicy for ExponentialBackoff {
    fn wait_period(&self, state: &PollingState) -> Duration {
        self.delay(state.attempt_count)
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn on_failure(&self, state: &RetryState) -> Duration {
        use rand::Rng;
        let delay = self.delay(state.attempt_count);
        rand::rng().random_range(Duration::ZERO..=delay)
    }
}
