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

//! Shared runtime pieces for the Vertex AI clients.
//!
//! Applications rarely depend on this crate by name. The generated clients
//! re-export what callers need: [error::Error], the request [options], the
//! [retry_policy], [backoff_policy] and polling policies, and the
//! [paginator] used by list methods.
//!
//! <div class="warning">
//! Anything marked <code>doc(hidden)</code> supports the generated code and
//! has no stability guarantees.
//! </div>

/// The result of every client method.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

pub mod error;

/// Streams over the items or pages of list methods.
pub mod paginator;

pub mod backoff_policy;
pub mod client_builder;
pub mod exponential_backoff;
pub mod options;
pub mod polling_backoff_policy;
pub mod polling_error_policy;
pub mod response;
pub mod retry_policy;
pub mod retry_result;
pub mod retry_state;

#[doc(hidden)]
pub mod retry_loop_internal;
