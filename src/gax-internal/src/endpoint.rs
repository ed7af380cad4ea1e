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

//! Endpoint resolution.
//!
//! The host for a client depends on the endpoint override, the universe
//! domain, the mutual TLS mode, and whether a client certificate is
//! available. [resolve] is the only place where this policy is applied, all
//! transports consume the [ResolvedEndpoint].

use crate::options::ServiceInfo;
use gax::client_builder::{ClientCertSource, ClientCertificate, Error as BuilderError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const GOOGLE_API_USE_CLIENT_CERTIFICATE: &str = "GOOGLE_API_USE_CLIENT_CERTIFICATE";
pub const GOOGLE_API_USE_MTLS_ENDPOINT: &str = "GOOGLE_API_USE_MTLS_ENDPOINT";
pub const GOOGLE_CLOUD_UNIVERSE_DOMAIN: &str = "GOOGLE_CLOUD_UNIVERSE_DOMAIN";
pub const GOOGLE_API_CERTIFICATE_CONFIG: &str = "GOOGLE_API_CERTIFICATE_CONFIG";

pub const DEFAULT_UNIVERSE_DOMAIN: &str = "googleapis.com";

const UNIVERSE_DOMAIN_PLACEHOLDER: &str = "{UNIVERSE_DOMAIN}";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// When to use the mutual TLS endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MtlsMode {
    Never,
    #[default]
    Auto,
    Always,
}

impl FromStr for MtlsMode {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            _ => Err(BuilderError::config(format!(
                "{GOOGLE_API_USE_MTLS_ENDPOINT} must be one of `never`, `auto`, or `always`, got `{s}`"
            ))),
        }
    }
}

/// The endpoint configuration from the environment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EndpointSettings {
    pub use_client_cert: bool,
    pub mtls_mode: MtlsMode,
    pub universe_domain: Option<String>,
    pub cert_config: Option<PathBuf>,
}

impl EndpointSettings {
    /// Reads the settings from the environment.
    ///
    /// Invalid values are configuration errors.
    pub fn from_env() -> Result<Self> {
        let use_client_cert = match std::env::var(GOOGLE_API_USE_CLIENT_CERTIFICATE) {
            Err(_) => false,
            Ok(v) => parse_bool(&v)?,
        };
        let mtls_mode = match std::env::var(GOOGLE_API_USE_MTLS_ENDPOINT) {
            Err(_) => MtlsMode::default(),
            Ok(v) => v.parse()?,
        };
        let universe_domain = std::env::var(GOOGLE_CLOUD_UNIVERSE_DOMAIN).ok();
        let cert_config = std::env::var(GOOGLE_API_CERTIFICATE_CONFIG)
            .ok()
            .map(PathBuf::from)
            .or_else(cert_config_well_known_path);
        Ok(Self {
            use_client_cert,
            mtls_mode,
            universe_domain,
            cert_config,
        })
    }
}

fn parse_bool(v: &str) -> Result<bool> {
    match v {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(BuilderError::config(format!(
            "{GOOGLE_API_USE_CLIENT_CERTIFICATE} must be `true` or `false`, got `{v}`"
        ))),
    }
}

fn cert_config_well_known_path() -> Option<PathBuf> {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").ok()?;
        Some(PathBuf::from(appdata).join("gcloud/certificate_config.json"))
    } else {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config/gcloud/certificate_config.json"))
    }
}

/// The result of [resolve].
#[derive(Clone, Debug)]
pub struct ResolvedEndpoint {
    pub host: String,
    pub client_cert_source: Option<Arc<dyn ClientCertSource>>,
    pub universe_domain: String,
}

impl ResolvedEndpoint {
    /// The `host:port` target for gRPC.
    pub fn grpc_target(&self) -> String {
        let authority = strip_scheme(&self.host).trim_end_matches('/');
        if has_port(authority) {
            authority.to_string()
        } else {
            format!("{authority}:443")
        }
    }

    /// The URI used to create the gRPC channel.
    pub fn grpc_uri(&self) -> String {
        if has_scheme(&self.host) {
            return self.host.trim_end_matches('/').to_string();
        }
        format!("https://{}", self.grpc_target())
    }

    /// The origin for REST requests, without a trailing slash.
    pub fn rest_origin(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if has_scheme(host) {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }
}

fn has_scheme(host: &str) -> bool {
    host.contains("://")
}

fn strip_scheme(host: &str) -> &str {
    host.split_once("://").map(|(_, rest)| rest).unwrap_or(host)
}

fn has_port(authority: &str) -> bool {
    // IPv6 literals are enclosed in brackets, any colon after them is a port.
    let tail = authority.rsplit_once(']').map(|(_, t)| t).unwrap_or(authority);
    tail.rsplit_once(':')
        .is_some_and(|(_, p)| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Computes the host, the effective client certificate source, and the
/// effective universe domain.
pub fn resolve(
    settings: &EndpointSettings,
    endpoint: Option<&str>,
    universe_domain: Option<&str>,
    cert_source: Option<Arc<dyn ClientCertSource>>,
    service: &ServiceInfo,
) -> Result<ResolvedEndpoint> {
    let universe_domain = universe_domain
        .or(settings.universe_domain.as_deref())
        .unwrap_or(DEFAULT_UNIVERSE_DOMAIN);
    if universe_domain.is_empty() {
        return Err(BuilderError::config("the universe domain cannot be empty"));
    }

    let client_cert_source = match (settings.use_client_cert, cert_source) {
        (false, _) => None,
        (true, Some(s)) => Some(s),
        (true, None) => ambient_cert_source(settings)?,
    };

    let use_mtls = match settings.mtls_mode {
        MtlsMode::Always => true,
        MtlsMode::Never => false,
        MtlsMode::Auto => client_cert_source.is_some(),
    };
    let host = match endpoint {
        Some(e) => e.to_string(),
        None if use_mtls => {
            if universe_domain != DEFAULT_UNIVERSE_DOMAIN {
                return Err(BuilderError::config(format!(
                    "mutual TLS is not supported in the `{universe_domain}` universe domain"
                )));
            }
            service.mtls_endpoint.to_string()
        }
        None => service
            .default_endpoint
            .replace(UNIVERSE_DOMAIN_PLACEHOLDER, universe_domain),
    };
    tracing::debug!(host, universe_domain, "resolved endpoint");
    Ok(ResolvedEndpoint {
        host,
        client_cert_source,
        universe_domain: universe_domain.to_string(),
    })
}

#[derive(Deserialize)]
struct CertificateConfig {
    cert_configs: CertConfigs,
}

#[derive(Deserialize)]
struct CertConfigs {
    workload: Option<WorkloadCertificate>,
}

/// A client certificate loaded from the files named in the certificate
/// configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WorkloadCertificate {
    cert_path: PathBuf,
    key_path: PathBuf,
}

impl ClientCertSource for WorkloadCertificate {
    fn client_certificate(&self) -> std::result::Result<ClientCertificate, BoxError> {
        let cert_chain = std::fs::read(&self.cert_path)?;
        let private_key = std::fs::read(&self.key_path)?;
        Ok(ClientCertificate {
            cert_chain,
            private_key,
        })
    }
}

fn ambient_cert_source(settings: &EndpointSettings) -> Result<Option<Arc<dyn ClientCertSource>>> {
    let Some(path) = settings.cert_config.as_ref() else {
        return Ok(None);
    };
    let contents = match std::fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BuilderError::config(e)),
    };
    let config = serde_json::from_slice::<CertificateConfig>(&contents)
        .map_err(BuilderError::config)?;
    Ok(config
        .cert_configs
        .workload
        .map(|w| Arc::new(w) as Arc<dyn ClientCertSource>))
}
