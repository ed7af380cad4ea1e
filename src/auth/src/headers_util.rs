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

//! Turns tokens into request headers.

use crate::Result;
use crate::constants::{API_KEY_HEADER_KEY, QUOTA_PROJECT_KEY};
use crate::errors;
use crate::token::Token;
use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};

pub(crate) fn build_bearer_headers(
    token: &Token,
    quota_project_id: &Option<String>,
) -> Result<HeaderMap> {
    let value = secret(&format!("{} {}", token.token_type, token.token))?;
    headers_with(AUTHORIZATION, value, quota_project_id)
}

pub(crate) fn build_api_key_headers(
    token: &Token,
    quota_project_id: &Option<String>,
) -> Result<HeaderMap> {
    let value = secret(&token.token)?;
    headers_with(
        HeaderName::from_static(API_KEY_HEADER_KEY),
        value,
        quota_project_id,
    )
}

/// Replaces any existing quota project header.
pub(crate) fn set_quota_project(headers: &mut HeaderMap, project: &str) -> Result<()> {
    let value = HeaderValue::from_str(project).map_err(errors::non_retryable)?;
    headers.insert(HeaderName::from_static(QUOTA_PROJECT_KEY), value);
    Ok(())
}

// Credentials never show up in `Debug` output of the header map.
fn secret(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value).map_err(errors::non_retryable)?;
    value.set_sensitive(true);
    Ok(value)
}

fn headers_with(
    name: HeaderName,
    value: HeaderValue,
    quota_project_id: &Option<String>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(name, value);
    if let Some(project) = quota_project_id.as_deref() {
        set_quota_project(&mut headers, project)?;
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn token(value: &str) -> Token {
        Token {
            token: value.to_string(),
            token_type: "Bearer".to_string(),
            expires_at: None,
        }
    }

    #[test_case(None, 1)]
    #[test_case(Some("vertex-billing"), 2)]
    fn bearer(quota: Option<&str>, want_len: usize) -> anyhow::Result<()> {
        let quota = quota.map(str::to_string);
        let headers = build_bearer_headers(&token("ya29.abc"), &quota)?;
        assert_eq!(headers.len(), want_len, "{headers:?}");

        let auth = headers.get(AUTHORIZATION).unwrap();
        assert_eq!(auth, "Bearer ya29.abc");
        assert!(auth.is_sensitive());

        let project = headers.get(QUOTA_PROJECT_KEY);
        assert_eq!(project.and_then(|v| v.to_str().ok()), quota.as_deref());
        assert!(project.is_none_or(|v| !v.is_sensitive()), "{project:?}");
        Ok(())
    }

    #[test]
    fn api_key() -> anyhow::Result<()> {
        let headers = build_api_key_headers(&token("AIza-key"), &None)?;
        assert_eq!(headers.len(), 1, "{headers:?}");
        let key = headers.get(API_KEY_HEADER_KEY).unwrap();
        assert_eq!(key, "AIza-key");
        assert!(key.is_sensitive());
        Ok(())
    }

    #[test]
    fn invalid_characters() {
        let err = build_bearer_headers(&token("bad\ntoken"), &None).unwrap_err();
        assert!(!err.is_transient(), "{err:?}");
        let err = build_api_key_headers(&token("bad\rkey"), &None).unwrap_err();
        assert!(!err.is_transient(), "{err:?}");
    }

    #[test]
    fn quota_project_override() -> anyhow::Result<()> {
        let mut headers = build_bearer_headers(&token("t"), &Some("from-file".into()))?;
        set_quota_project(&mut headers, "from-env")?;
        let all = headers.get_all(QUOTA_PROJECT_KEY).iter().collect::<Vec<_>>();
        assert_eq!(all, vec!["from-env"]);
        Ok(())
    }
}
