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

//! How long to wait between polls of a long-running operation.
//!
//! The interval grows with each poll up to a maximum, so quick operations
//! finish with little latency and slow ones do not flood the service.

use crate::retry_state::PollingState;
use std::sync::Arc;
use std::time::Duration;

pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// The delay before the next poll. Called after every incomplete poll,
    /// including the first one.
    fn wait_period(&self, state: &PollingState) -> Duration;
}

/// Accepts any [PollingBackoffPolicy] where options take one.
#[derive(Clone, Debug)]
pub struct PollingBackoffPolicyArg(Arc<dyn PollingBackoffPolicy>);

impl<P> From<P> for PollingBackoffPolicyArg
where
    P: PollingBackoffPolicy + 'static,
{
    fn from(policy: P) -> Self {
        Self(Arc::new(policy))
    }
}

impl From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(policy: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(policy)
    }
}

impl From<PollingBackoffPolicyArg> for Arc<dyn PollingBackoffPolicy> {
    fn from(arg: PollingBackoffPolicyArg) -> Self {
        arg.0
    }
}
