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

//! Telemetry header helpers.
//!
//! Each service crate creates one static [XGoogApiClient] and formats it once
//! per transport. The process-wide [ClientInfo] adds application-provided
//! values to every client created after it is initialized.

use std::sync::OnceLock;

/// Identifies a client library in the `x-goog-api-client` header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XGoogApiClient {
    pub name: &'static str,
    pub library_type: &'static str,
    pub version: &'static str,
}

pub const GAPIC: &str = "gapic";
pub const GCCL: &str = "gccl";

mod build_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/build_env.rs"));

    pub(crate) const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
}

fn rustc_version() -> &'static str {
    build_info::RUSTC_VERSION
}

impl XGoogApiClient {
    /// Format the struct as needed for the `x-goog-api-client` header.
    pub fn rest_header_value(&self) -> String {
        self.header_value("rest", "reqwest")
    }

    /// Format the struct as needed for the `x-goog-api-client` header.
    pub fn grpc_header_value(&self) -> String {
        self.header_value("grpc", "tonic")
    }

    /// The value for the `user-agent` header.
    ///
    /// Includes the library name and version, and the application prefix
    /// from [ClientInfo], if any.
    pub fn user_agent(&self) -> String {
        let base = format!(
            "{}/{} gl-rust/{}",
            self.name,
            self.version,
            rustc_version()
        );
        match client_info().user_agent.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix} {base}"),
            _ => base,
        }
    }

    fn header_value(&self, transport: &str, implementation: &str) -> String {
        let rustc_version = rustc_version();
        // Capture the gax version too.
        let gax_version = build_info::PKG_VERSION;
        let mut value = format!(
            "gl-rust/{rustc_version} gax/{gax_version} {transport}/{gax_version}-{implementation} {}/{}",
            self.library_type, self.version
        );
        if let Some(v) = client_info().client_library_version.as_deref() {
            value.push_str(&format!(" gccl/{v}"));
        }
        value
    }
}

/// Process-wide values added to the telemetry headers.
///
/// Applications initialize it at most once, before creating any clients.
/// Clients created before the initialization use the defaults.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct ClientInfo {
    /// A prefix for the `user-agent` header.
    pub user_agent: Option<String>,
    /// The version of a library wrapping these clients, reported as `gccl`.
    pub client_library_version: Option<String>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.user_agent = Some(v.into());
        self
    }

    pub fn set_client_library_version<V: Into<String>>(mut self, v: V) -> Self {
        self.client_library_version = Some(v.into());
        self
    }
}

static CLIENT_INFO: OnceLock<ClientInfo> = OnceLock::new();

/// Initializes the process-wide [ClientInfo].
///
/// Returns the rejected value if the information was already initialized,
/// either by a previous call or because a client already used the defaults.
pub fn init_client_info(info: ClientInfo) -> std::result::Result<(), ClientInfo> {
    CLIENT_INFO.set(info)
}

/// Returns the process-wide [ClientInfo], initializing it with the defaults if
/// needed.
pub fn client_info() -> &'static ClientInfo {
    CLIENT_INFO.get_or_init(ClientInfo::default)
}
