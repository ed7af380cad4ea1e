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

//! Creates the credentials for a client.

use crate::endpoint::ResolvedEndpoint;
use crate::options::{ClientConfig, ServiceInfo};
use auth::credentials::{self, Credentials, api_key_credentials};
use gax::client_builder::{Error as BuilderError, Result};

/// Creates the credentials for a client configuration.
///
/// Returns `None` when the application provides a transport instance, as the
/// instance is self-contained. Otherwise the first of these applies:
/// - an API key,
/// - explicit credentials, rescoped to the configured scopes,
/// - a credentials file,
/// - the Application Default Credentials.
///
/// Credentials bound to a universe domain must match the resolved universe.
pub async fn make_credentials(
    config: &ClientConfig,
    service: &ServiceInfo,
    endpoint: &ResolvedEndpoint,
) -> Result<Option<Credentials>> {
    if config.transport_instance.is_some() {
        return Ok(None);
    }
    let credentials = if let Some(key) = &config.api_key {
        let builder = api_key_credentials::Builder::new(key.clone());
        match &config.quota_project {
            Some(q) => builder.with_quota_project_id(q.clone()).build(),
            None => builder.build(),
        }
    } else if let Some(c) = &config.cred {
        explicit_credentials(c.clone(), config)
    } else {
        let builder = adc_builder(config, service);
        let credentials = match &config.credentials_file {
            Some(path) => builder.build_from_file(path),
            None => builder.build(),
        };
        credentials.map_err(BuilderError::cred)?
    };
    if let Some(universe_domain) = credentials.universe_domain().await {
        if universe_domain != endpoint.universe_domain {
            return Err(BuilderError::config(format!(
                "the credentials universe domain `{universe_domain}` does not match the client universe domain `{}`",
                endpoint.universe_domain
            )));
        }
    }
    Ok(Some(credentials))
}

fn explicit_credentials(credentials: Credentials, config: &ClientConfig) -> Credentials {
    let credentials = match &config.scopes {
        Some(s) => credentials.with_scopes(s.iter().cloned()),
        None => credentials,
    };
    let credentials = match config.jwt_access {
        Some(v) => credentials.with_jwt_access(v),
        None => credentials,
    };
    match &config.quota_project {
        Some(q) => credentials.with_quota_project(q.clone()),
        None => credentials,
    }
}

fn adc_builder(config: &ClientConfig, service: &ServiceInfo) -> credentials::Builder {
    let builder = match &config.scopes {
        Some(s) => credentials::Builder::default().with_scopes(s.iter().cloned()),
        None => credentials::Builder::default().with_scopes(service.default_scopes.iter().copied()),
    };
    let builder = match &config.quota_project {
        Some(q) => builder.with_quota_project_id(q.clone()),
        None => builder,
    };
    let builder = match config.jwt_access {
        Some(v) => builder.with_jwt_access(v),
        None => builder,
    };
    match &config.api_audience {
        Some(a) => builder.with_audience(a.clone()),
        None => builder,
    }
}
