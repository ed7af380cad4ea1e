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

pub use auth::credentials::Credentials;

use crate::api_header::XGoogApiClient;

/// Client configuration after the builder resolved defaults.
pub type ClientConfig = gax::client_builder::internal::ClientConfig<Credentials>;

/// Setting this variable to `true` enables request tracing in all clients.
pub(crate) const LOGGING_VAR: &str = "AIPLATFORM_RUST_LOGGING";

/// What a transport needs to know about the service it talks to.
#[derive(Copy, Clone, Debug)]
pub struct ServiceInfo {
    pub service_name: &'static str,
    /// Contains a `{UNIVERSE_DOMAIN}` placeholder.
    pub default_endpoint: &'static str,
    pub mtls_endpoint: &'static str,
    /// Used when the application does not configure scopes.
    pub default_scopes: &'static [&'static str],
    pub api_client: &'static XGoogApiClient,
}

pub fn tracing_enabled(config: &ClientConfig) -> bool {
    config.tracing || std::env::var(LOGGING_VAR).is_ok_and(|v| v == "true")
}
