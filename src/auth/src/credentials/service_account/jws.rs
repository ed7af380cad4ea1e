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

//! Self-signed JWT assertions for service accounts.
//!
//! An assertion is `base64(header).base64(claims).base64(signature)`, using
//! the URL-safe alphabet without padding. The caller signs the first two
//! segments with the service account key.

use crate::Result;
use crate::errors;
use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;

/// Backdates `iat`, services reject assertions issued in the future.
pub const CLOCK_SKEW_FUDGE: Duration = Duration::from_secs(10);
/// The lifetime of self-signed tokens and of the exchanged access tokens.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(3600);

const ALGORITHM: &str = "RS256";

/// The claims in a service account assertion.
///
/// At least one of `scope` or `aud` must be set.
#[derive(Debug, Serialize)]
pub struct JwsClaims<'a> {
    pub iss: &'a str,
    pub sub: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<&'a str>,
    #[serde(with = "time::serde::timestamp")]
    pub iat: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub exp: OffsetDateTime,
}

impl<'a> JwsClaims<'a> {
    /// Claims for `email`, valid for [DEFAULT_TOKEN_TIMEOUT] starting
    /// [CLOCK_SKEW_FUDGE] before `now`.
    pub fn new(email: &'a str, now: OffsetDateTime) -> Self {
        let iat = now - CLOCK_SKEW_FUDGE;
        Self {
            iss: email,
            sub: email,
            scope: None,
            aud: None,
            iat,
            exp: iat + DEFAULT_TOKEN_TIMEOUT,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.exp < self.iat {
            return Err(errors::non_retryable_from_str(format!(
                "the assertion expires ({}) before it is issued ({})",
                self.exp, self.iat
            )));
        }
        if self.scope.is_none() && self.aud.is_none() {
            return Err(errors::non_retryable_from_str(
                "the assertion needs a scope or an audience",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JwsHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

/// Returns the `header.claims` prefix that the key signs.
pub fn signing_input(key_id: Option<&str>, claims: &JwsClaims<'_>) -> Result<String> {
    claims.validate()?;
    let header = JwsHeader {
        alg: ALGORITHM,
        typ: "JWT",
        kid: key_id,
    };
    Ok(format!("{}.{}", segment(&header)?, segment(claims)?))
}

/// Appends the signature to the signing input.
pub fn assemble(signing_input: String, signature: &[u8]) -> String {
    let mut assertion = signing_input;
    assertion.push('.');
    assertion.push_str(&BASE64_URL_SAFE_NO_PAD.encode(signature));
    assertion
}

fn segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(errors::non_retryable)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}
