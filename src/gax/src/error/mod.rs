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

//! The errors returned by the Vertex AI clients.
//!
//! Every call returns [Error]. Use its predicates to tell configuration
//! problems (`is_binding()`), service errors (`status()`), timeouts and
//! transport failures apart:
//!
//! ```
//! # use aiplatform_gax::error::{Error, rpc::Code};
//! fn should_report(e: &Error) -> bool {
//!     match e.code() {
//!         Some(Code::PermissionDenied | Code::Unauthenticated) => true,
//!         _ => e.is_binding(),
//!     }
//! }
//! ```

mod core_error;
mod credentials;
pub use core_error::*;
pub use credentials::CredentialsError;

/// The status returned by the service, and its structured details.
pub mod rpc;
