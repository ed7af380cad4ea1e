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

//! The decision a [RetryPolicy][crate::retry_policy::RetryPolicy] returns
//! after a failed attempt.

use crate::error::Error;

/// What the retry loop does with a failed attempt.
///
/// Custom policies return one of these from `on_error()`. For example, a
/// policy that gives up on quota errors after three attempts:
///
/// ```
/// # use aiplatform_gax::error::{Error, rpc::Code};
/// # use aiplatform_gax::retry_policy::RetryPolicy;
/// # use aiplatform_gax::{retry_result::RetryResult, retry_state::RetryState};
/// #[derive(Debug)]
/// struct QuotaPolicy;
/// impl RetryPolicy for QuotaPolicy {
///     fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
///         match error.code() {
///             Some(Code::ResourceExhausted) if state.attempt_count < 3 => RetryResult::Continue(error),
///             Some(Code::ResourceExhausted) => RetryResult::Exhausted(error),
///             _ => RetryResult::Permanent(error),
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub enum RetryResult {
    /// Not retryable, the loop returns this error.
    Permanent(Error),

    /// Retryable, but the policy limits (attempts, elapsed time) are reached.
    Exhausted(Error),

    /// Retryable, the loop sleeps and tries again.
    Continue(Error),
}

impl RetryResult {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The error behind the decision.
    pub fn into_error(self) -> Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::rpc::{Code, Status};
    use test_case::test_case;

    fn error(code: Code) -> Error {
        Error::service(Status::default().set_code(code).set_message("test"))
    }

    #[test_case(RetryResult::Permanent(error(Code::InvalidArgument)), (true, false, false), Code::InvalidArgument)]
    #[test_case(RetryResult::Exhausted(error(Code::ResourceExhausted)), (false, true, false), Code::ResourceExhausted)]
    #[test_case(RetryResult::Continue(error(Code::Unavailable)), (false, false, true), Code::Unavailable)]
    fn decision(result: RetryResult, want: (bool, bool, bool), code: Code) {
        let got = (
            result.is_permanent(),
            result.is_exhausted(),
            result.is_continue(),
        );
        assert_eq!(got, want, "{result:?}");
        assert_eq!(result.into_error().code(), Some(code));
    }
}
