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

//! Authentication for the Vertex AI client libraries.
//!
//! Clients call [credentials::Credentials::headers] before each attempt and
//! attach the result to the request. This crate provides:
//!
//! - service account keys, exchanged for access tokens or used as
//!   self-signed JWTs,
//! - authorized user (refresh token) credentials, as created by
//!   `gcloud auth application-default login`,
//! - API keys,
//! - [Application Default Credentials] discovery through
//!   [credentials::Builder].
//!
//! [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials

pub mod build_errors;
pub mod credentials;
pub mod errors;
pub mod token;

pub(crate) mod constants;
pub(crate) mod headers_util;
pub(crate) mod token_cache;

pub(crate) type Result<T> = std::result::Result<T, crate::errors::CredentialsError>;

pub(crate) type BuildResult<T> = std::result::Result<T, crate::build_errors::Error>;
