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

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An error reported by a service, following [AIP-193].
///
/// Services report a [Code], a message for developers, and optional
/// structured [details][StatusDetails]. Failed long-running operations
/// carry the same type.
///
/// [AIP-193]: https://google.aip.dev/193
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Status {
    pub code: Code,

    /// English text meant for developers, not end users.
    pub message: String,

    pub details: Vec<StatusDetails>,
}

impl Status {
    pub fn set_code<T: Into<Code>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    pub fn set_details<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<StatusDetails>,
    {
        self.details = v.into_iter().map(Into::into).collect();
        self
    }
}

/// Canonical error codes.
///
/// The comment on each variant names the HTTP status used by REST
/// endpoints for the same condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Code {
    /// 200
    Ok = 0,
    /// 499, usually the caller gave up.
    Cancelled = 1,
    /// 500
    #[default]
    Unknown = 2,
    /// 400
    InvalidArgument = 3,
    /// 504
    DeadlineExceeded = 4,
    /// 404
    NotFound = 5,
    /// 409
    AlreadyExists = 6,
    /// 403
    PermissionDenied = 7,
    /// 429, often a quota.
    ResourceExhausted = 8,
    /// 400, the resource is not in the required state.
    FailedPrecondition = 9,
    /// 409, usually a concurrency conflict.
    Aborted = 10,
    /// 400
    OutOfRange = 11,
    /// 501
    Unimplemented = 12,
    /// 500
    Internal = 13,
    /// 503, transient. Safe to retry with backoff.
    Unavailable = 14,
    /// 500
    DataLoss = 15,
    /// 401
    Unauthenticated = 16,
}

// Indexed by the numeric value of each code.
const CODES: [(Code, &str); 17] = [
    (Code::Ok, "OK"),
    (Code::Cancelled, "CANCELLED"),
    (Code::Unknown, "UNKNOWN"),
    (Code::InvalidArgument, "INVALID_ARGUMENT"),
    (Code::DeadlineExceeded, "DEADLINE_EXCEEDED"),
    (Code::NotFound, "NOT_FOUND"),
    (Code::AlreadyExists, "ALREADY_EXISTS"),
    (Code::PermissionDenied, "PERMISSION_DENIED"),
    (Code::ResourceExhausted, "RESOURCE_EXHAUSTED"),
    (Code::FailedPrecondition, "FAILED_PRECONDITION"),
    (Code::Aborted, "ABORTED"),
    (Code::OutOfRange, "OUT_OF_RANGE"),
    (Code::Unimplemented, "UNIMPLEMENTED"),
    (Code::Internal, "INTERNAL"),
    (Code::Unavailable, "UNAVAILABLE"),
    (Code::DataLoss, "DATA_LOSS"),
    (Code::Unauthenticated, "UNAUTHENTICATED"),
];

impl Code {
    /// The `SCREAMING_SNAKE_CASE` name used in JSON error payloads.
    pub fn name(&self) -> &str {
        CODES[*self as usize].1
    }

    /// The closest code for an HTTP error without a [Status] payload.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => Code::Ok,
            400 => Code::InvalidArgument,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::NotFound,
            409 => Code::Aborted,
            416 => Code::OutOfRange,
            429 => Code::ResourceExhausted,
            499 => Code::Cancelled,
            501 => Code::Unimplemented,
            503 => Code::Unavailable,
            504 => Code::DeadlineExceeded,
            500..=599 => Code::Internal,
            _ => Code::Unknown,
        }
    }
}

impl From<i32> for Code {
    fn from(value: i32) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| CODES.get(i))
            .map(|(code, _)| *code)
            .unwrap_or_default()
    }
}

impl From<Code> for String {
    fn from(value: Code) -> String {
        value.name().to_string()
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for Code {
    type Error = String;
    fn try_from(value: &str) -> std::result::Result<Code, Self::Error> {
        CODES
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(code, _)| *code)
            .ok_or_else(|| format!("unknown status code name {value}"))
    }
}

// The JSON form of `google.rpc.Status` uses the numeric value.
impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Code::from)
    }
}

// REST error bodies wrap the status in `{"error": {...}}`, with the HTTP
// status in `code` and the canonical name in `status`.
#[derive(Deserialize)]
struct RestErrorBody {
    error: RestStatus,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RestStatus {
    code: i32,
    message: String,
    status: Option<String>,
    details: Vec<StatusDetails>,
}

impl TryFrom<&bytes::Bytes> for Status {
    type Error = Error;

    fn try_from(value: &bytes::Bytes) -> Result<Self, Self::Error> {
        let RestStatus {
            code,
            message,
            status,
            details,
        } = serde_json::from_slice::<RestErrorBody>(value)
            .map_err(Error::deser)?
            .error;
        let code = status
            .as_deref()
            .and_then(|name| Code::try_from(name).ok())
            .unwrap_or_else(|| {
                u16::try_from(code).map_or(Code::Unknown, Code::from_http_status)
            });
        Ok(Status {
            code,
            message,
            details,
        })
    }
}

/// Structured error details, tagged by their `@type` URL.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "@type")]
#[non_exhaustive]
pub enum StatusDetails {
    #[serde(rename = "type.googleapis.com/google.rpc.ErrorInfo")]
    ErrorInfo(ErrorInfo),
    #[serde(rename = "type.googleapis.com/google.rpc.LocalizedMessage")]
    LocalizedMessage(LocalizedMessage),
    #[serde(rename = "type.googleapis.com/google.rpc.RetryInfo")]
    RetryInfo(RetryInfo),
    #[serde(rename = "type.googleapis.com/google.rpc.Help")]
    Help(Help),
    /// Added by the client to auth failures: a JSON description of the
    /// credentials that made the request. Services never send it.
    #[serde(untagged)]
    CredentialInfo(String),
    /// Any detail type not listed above.
    #[serde(untagged)]
    Other(serde_json::Value),
}

/// A machine-readable reason, scoped to a domain such as
/// `aiplatform.googleapis.com`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ErrorInfo {
    pub reason: String,
    pub domain: String,
    pub metadata: HashMap<String, String>,
}

impl ErrorInfo {
    pub fn set_reason<T: Into<String>>(mut self, v: T) -> Self {
        self.reason = v.into();
        self
    }

    pub fn set_domain<T: Into<String>>(mut self, v: T) -> Self {
        self.domain = v.into();
        self
    }
}

/// A translated message that is safe to show to end users.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct LocalizedMessage {
    pub locale: String,
    pub message: String,
}

impl LocalizedMessage {
    pub fn set_locale<T: Into<String>>(mut self, v: T) -> Self {
        self.locale = v.into();
        self
    }

    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }
}

/// The minimum delay the service asks for before a retry, formatted as a
/// JSON `google.protobuf.Duration` such as `"1.5s"`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct RetryInfo {
    pub retry_delay: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Help {
    pub links: Vec<HelpLink>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct HelpLink {
    pub description: String,
    pub url: String,
}

impl From<ErrorInfo> for StatusDetails {
    fn from(value: ErrorInfo) -> Self {
        StatusDetails::ErrorInfo(value)
    }
}

impl From<LocalizedMessage> for StatusDetails {
    fn from(value: LocalizedMessage) -> Self {
        StatusDetails::LocalizedMessage(value)
    }
}

impl From<RetryInfo> for StatusDetails {
    fn from(value: RetryInfo) -> Self {
        StatusDetails::RetryInfo(value)
    }
}
