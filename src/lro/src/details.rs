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

//! Converts [Operation] snapshots into [PollingResult] values.

use crate::model::{FromPayload, Operation};
use crate::PollingResult;
use gax::Result;
use gax::error::Error;
use gax::polling_error_policy::PollingErrorPolicy;
use gax::retry_result::RetryResult;
use gax::retry_state::PollingState;

pub(crate) fn handle_common<R, M>(op: &Operation) -> PollingResult<R, M>
where
    R: FromPayload,
    M: FromPayload,
{
    if op.done {
        return PollingResult::Completed(as_result(op));
    }
    PollingResult::InProgress(as_metadata(op))
}

pub(crate) fn handle_poll_error<R, M>(
    policy: &dyn PollingErrorPolicy,
    state: &PollingState,
    error: Error,
) -> PollingResult<R, M> {
    match policy.on_error(state, error) {
        RetryResult::Continue(e) => PollingResult::PollingError(e),
        RetryResult::Exhausted(e) | RetryResult::Permanent(e) => PollingResult::Completed(Err(e)),
    }
}

pub(crate) fn as_result<R: FromPayload>(op: &Operation) -> Result<R> {
    // A done operation must set either the response or the error. Setting
    // neither does not satisfy the invariants of the receiving type.
    match (op.response(), op.error()) {
        (Some(payload), _) => R::from_payload(payload),
        (None, Some(status)) => Err(Error::operation(status.clone())),
        (None, None) => Err(Error::deser(format!(
            "neither result nor error set in completed operation {}",
            op.name
        ))),
    }
}

pub(crate) fn as_metadata<M: FromPayload>(op: &Operation) -> Option<M> {
    op.metadata.as_ref().and_then(|p| M::from_payload(p).ok())
}
