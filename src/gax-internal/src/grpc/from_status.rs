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

//! Converts tonic errors into [gax::error::Error].

use gax::error::Error;
use gax::error::rpc::{Code, ErrorInfo, LocalizedMessage, RetryInfo, Status, StatusDetails};
use prost::Message;
use std::collections::HashMap;
use std::error::Error as _;

// Local copies of the `google.rpc` messages carried in the
// `grpc-status-details-bin` trailer.

/// The `google.rpc.Status` message.
///
/// Services embed this message in other responses, e.g. in the error of a
/// long-running operation.
#[derive(Clone, PartialEq, Message)]
pub struct RpcStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<prost_types::Any>,
}

#[derive(Clone, PartialEq, Message)]
pub(crate) struct RpcErrorInfo {
    #[prost(string, tag = "1")]
    pub reason: String,
    #[prost(string, tag = "2")]
    pub domain: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, Message)]
pub(crate) struct RpcLocalizedMessage {
    #[prost(string, tag = "1")]
    pub locale: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, Message)]
pub(crate) struct RpcRetryInfo {
    #[prost(message, optional, tag = "1")]
    pub retry_delay: Option<prost_types::Duration>,
}

const TYPE_PREFIX: &str = "type.googleapis.com/";

fn to_details(any: prost_types::Any) -> StatusDetails {
    let name = any.type_url.strip_prefix(TYPE_PREFIX).unwrap_or(&any.type_url);
    let decoded = match name {
        "google.rpc.ErrorInfo" => RpcErrorInfo::decode(any.value.as_slice()).ok().map(|v| {
            let mut info = ErrorInfo::default().set_reason(v.reason).set_domain(v.domain);
            info.metadata = v.metadata;
            StatusDetails::ErrorInfo(info)
        }),
        "google.rpc.LocalizedMessage" => RpcLocalizedMessage::decode(any.value.as_slice())
            .ok()
            .map(|v| {
                StatusDetails::LocalizedMessage(
                    LocalizedMessage::default()
                        .set_locale(v.locale)
                        .set_message(v.message),
                )
            }),
        "google.rpc.RetryInfo" => RpcRetryInfo::decode(any.value.as_slice()).ok().map(|v| {
            let mut info = RetryInfo::default();
            info.retry_delay = v.retry_delay.map(format_duration);
            StatusDetails::RetryInfo(info)
        }),
        _ => None,
    };
    decoded.unwrap_or_else(|| StatusDetails::Other(serde_json::json!({ "@type": any.type_url })))
}

// Formats a duration using its JSON representation, e.g. `1.5s`.
fn format_duration(d: prost_types::Duration) -> String {
    if d.nanos == 0 {
        return format!("{}s", d.seconds);
    }
    let fraction = format!("{:09}", d.nanos.unsigned_abs());
    format!("{}.{}s", d.seconds, fraction.trim_end_matches('0'))
}

fn to_gax_status(status: &tonic::Status) -> Status {
    let details = RpcStatus::decode(status.details())
        .map(|s| s.details)
        .unwrap_or_default();
    Status::default()
        .set_code(Code::from(status.code() as i32))
        .set_message(status.message())
        .set_details(details.into_iter().map(to_details))
}

impl From<RpcStatus> for Status {
    fn from(value: RpcStatus) -> Self {
        Status::default()
            .set_code(Code::from(value.code))
            .set_message(value.message)
            .set_details(value.details.into_iter().map(to_details))
    }
}

fn as_inner<T>(status: &tonic::Status) -> Option<&T>
where
    T: std::error::Error + 'static,
{
    let mut e = status.source()?;
    // Prevent infinite loops due to cycles in the `source()` errors.
    for _ in 0..32 {
        if let Some(value) = e.downcast_ref::<T>() {
            return Some(value);
        }
        e = e.source()?;
    }
    None
}

pub fn to_gax_error(status: tonic::Status) -> Error {
    if as_inner::<tonic::TimeoutExpired>(&status).is_some() {
        return Error::timeout(status);
    }
    if as_inner::<tonic::ConnectError>(&status).is_some() {
        return Error::io(status);
    }
    let headers = status.metadata().clone().into_headers();
    if as_inner::<tonic::transport::Error>(&status).is_some() {
        return Error::transport(headers, status);
    }

    let content_type = headers.get("content-type").map(|v| v.as_bytes());
    if content_type.is_some_and(|v| !v.starts_with("application/grpc".as_bytes())) {
        return Error::transport(headers, GrpcError::BadContentType(status));
    }

    Error::service_with_http_metadata(to_gax_status(&status), None, Some(headers))
}

/// Converts errors received after the stream started.
pub fn to_stream_error(status: tonic::Status) -> Error {
    Error::stream(to_gax_error(status))
}

#[derive(Debug, thiserror::Error)]
enum GrpcError {
    #[error(
        "unexpected value in content-type header, should start with application/grpc. This is a common problem when using an invalid endpoint, or an endpoint that does not support the target gRPC service."
    )]
    BadContentType(#[source] tonic::Status),
}
