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

//! Implementation details for the AI Platform client libraries.
//!
//! All the types, traits, and functions defined in this crate are **not**
//! intended for general use. The service crates use them to implement their
//! transports, and both sides change together.
//!
//! The crate contains the machinery shared by every service: endpoint
//! resolution, credential acquisition, the per-method call wrapper, and the
//! gRPC and HTTP/JSON transports.

pub mod api_header;
pub mod call;
pub mod endpoint;
pub mod factory;
pub mod grpc;
pub mod http;
pub mod options;
pub mod path_parameter;
pub mod query_parameter;
pub mod routing_parameter;
pub mod streaming;
pub mod transport;
pub mod unimplemented;
