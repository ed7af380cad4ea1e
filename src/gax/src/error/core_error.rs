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

use super::CredentialsError;
use super::rpc::{Code, Status, StatusDetails};
use bytes::Bytes;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The error type for every client method.
///
/// A request can fail in many places. The arguments may not map to any URL,
/// credentials may be unavailable, the connection may drop, the service may
/// reject the request, a retry or polling policy may give up, or a
/// long-running operation may complete with an error. Each case has a
/// predicate (`is_*`) and the common details have accessors. Anything
/// beyond that is available through [source][StdError::source].
///
/// ```
/// use aiplatform_gax::error::Error;
/// use aiplatform_gax::error::rpc::Code;
/// fn report(e: &Error) -> &'static str {
///     match e.code() {
///         Some(Code::NotFound) => "no such endpoint",
///         Some(_) => "the service rejected the request",
///         None if e.is_timeout() => "deadline exceeded",
///         None => "local or transport problem",
///     }
/// }
/// # use aiplatform_gax::error::rpc::Status;
/// let e = Error::service(Status::default().set_code(Code::NotFound));
/// assert_eq!(report(&e), "no such endpoint");
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    fn new<T: Into<BoxError>>(kind: ErrorKind, source: T) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    fn without_source(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    fn transport_details(
        status_code: Option<u16>,
        headers: Option<HeaderMap>,
        payload: Option<Bytes>,
    ) -> ErrorKind {
        ErrorKind::Transport(Box::new(TransportDetails {
            status_code,
            headers,
            payload,
        }))
    }

    /// An error returned by the service.
    ///
    /// ```
    /// use aiplatform_gax::error::Error;
    /// use aiplatform_gax::error::rpc::{Code, Status};
    /// let status = Status::default().set_code(Code::Internal).set_message("oops");
    /// let error = Error::service(status.clone());
    /// assert_eq!(error.status(), Some(&status));
    /// ```
    pub fn service(status: Status) -> Self {
        Self::service_with_http_metadata(status, None, None)
    }

    /// An error returned by the service, with the HTTP response metadata.
    pub fn service_with_http_metadata(
        status: Status,
        status_code: Option<u16>,
        headers: Option<HeaderMap>,
    ) -> Self {
        Self::without_source(ErrorKind::Service(Box::new(ServiceDetails {
            status,
            status_code,
            headers,
        })))
    }

    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Timeout, source)
    }

    /// The attempt timeout expired before a response arrived.
    ///
    /// The request may still run to completion in the service. Retrying a
    /// request that is not idempotent can apply its effect twice.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Exhausted, source)
    }

    /// A retry or polling policy stopped the loop. The source is the last
    /// error observed, or a description of the limit.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::Exhausted)
    }

    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Deserialization, source)
    }

    /// The response body did not match the expected message.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Serialization, source)
    }

    /// The request could not be encoded. Never transient.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// The request fields do not match any URL template of the method.
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Binding, source)
    }

    /// The request was rejected locally, nothing was sent.
    ///
    /// # Troubleshooting
    ///
    /// A required path field is empty, a field does not match the expected
    /// format (for example `projects/*/locations/*/endpoints/*`), or the call
    /// mixes a full request with flattened arguments.
    pub fn is_binding(&self) -> bool {
        matches!(self.kind, ErrorKind::Binding)
    }

    pub fn authentication(source: CredentialsError) -> Self {
        Self::new(ErrorKind::Authentication, source)
    }

    /// The credentials could not produce request headers.
    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication)
    }

    /// An HTTP error response without a parseable status payload.
    pub fn http(status_code: u16, headers: HeaderMap, payload: Bytes) -> Self {
        Self::without_source(Self::transport_details(
            Some(status_code),
            Some(headers),
            Some(payload),
        ))
    }

    /// A transport failure with no HTTP response, such as a refused or
    /// reset connection.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self::new(Self::transport_details(None, None, None), source)
    }

    /// True for errors created by [Error::io].
    ///
    /// The request may or may not have reached the service. Only idempotent
    /// requests are retried on these errors by default.
    pub fn is_io(&self) -> bool {
        match &self.kind {
            ErrorKind::Transport(d) => {
                d.status_code.is_none() && d.headers.is_none() && d.payload.is_none()
            }
            _ => false,
        }
    }

    /// A transport failure after the response headers arrived.
    pub fn transport<T: Into<BoxError>>(headers: HeaderMap, source: T) -> Self {
        Self::new(Self::transport_details(None, Some(headers), None), source)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_))
    }

    /// A streaming response was interrupted.
    ///
    /// Items yielded before the error remain valid. The stream ends after
    /// this error.
    pub fn stream<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Stream, source)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.kind, ErrorKind::Stream)
    }

    /// A long-running operation finished with `status`.
    ///
    /// ```
    /// use aiplatform_gax::error::{Error, rpc::{Code, Status}};
    /// let error = Error::operation(Status::default().set_code(Code::FailedPrecondition));
    /// assert!(error.is_operation());
    /// assert_eq!(error.code(), Some(Code::FailedPrecondition));
    /// ```
    pub fn operation(status: Status) -> Self {
        Self::without_source(ErrorKind::Operation(Box::new(status)))
    }

    /// The operation itself failed. Failures to poll the operation are
    /// service or transport errors instead.
    pub fn is_operation(&self) -> bool {
        matches!(self.kind, ErrorKind::Operation(_))
    }

    /// The selected transport cannot make this call, for example
    /// bidirectional streaming over HTTP/JSON.
    pub fn unsupported<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Unsupported, source)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, ErrorKind::Unsupported)
    }

    /// The [Status] reported by the service or by a failed operation.
    ///
    /// See [AIP-193] for the error model.
    ///
    /// [AIP-193]: https://google.aip.dev/193
    pub fn status(&self) -> Option<&Status> {
        match &self.kind {
            ErrorKind::Service(d) => Some(&d.status),
            ErrorKind::Operation(s) => Some(s),
            _ => None,
        }
    }

    /// The canonical code of the error.
    ///
    /// HTTP errors without a status payload map their HTTP status to a code.
    pub fn code(&self) -> Option<Code> {
        match &self.kind {
            ErrorKind::Service(d) => Some(d.status.code),
            ErrorKind::Operation(s) => Some(s.code),
            ErrorKind::Transport(d) => d.status_code.map(Code::from_http_status),
            _ => None,
        }
    }

    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Service(d) => d.status_code,
            ErrorKind::Transport(d) => d.status_code,
            _ => None,
        }
    }

    /// Response headers, or gRPC metadata converted to headers.
    pub fn http_headers(&self) -> Option<&HeaderMap> {
        match &self.kind {
            ErrorKind::Service(d) => d.headers.as_ref(),
            ErrorKind::Transport(d) => d.headers.as_ref(),
            _ => None,
        }
    }

    /// The raw body of an HTTP error without a status payload.
    pub fn http_payload(&self) -> Option<&Bytes> {
        match &self.kind {
            ErrorKind::Transport(d) => d.payload.as_ref(),
            _ => None,
        }
    }

    /// Attaches a description of the credentials to the status details.
    ///
    /// HTTP errors with a body become service errors, using the mapped code
    /// and the body as the message. Errors without a status are returned
    /// unchanged.
    pub fn with_credential_info<T: Into<String>>(self, info: T) -> Self {
        let detail = StatusDetails::CredentialInfo(info.into());
        match self.kind {
            ErrorKind::Service(mut d) => {
                d.status.details.push(detail);
                Self {
                    kind: ErrorKind::Service(d),
                    source: self.source,
                }
            }
            ErrorKind::Transport(d) if d.status_code.is_some() && d.payload.is_some() => {
                let TransportDetails {
                    status_code,
                    headers,
                    payload,
                } = *d;
                let status = Status::default()
                    .set_code(status_code.map(Code::from_http_status).unwrap_or_default())
                    .set_message(
                        payload
                            .map(|p| String::from_utf8_lossy(&p).into_owned())
                            .unwrap_or_default(),
                    )
                    .set_details([detail]);
                Self::service_with_http_metadata(status, status_code, headers)
            }
            kind => Self {
                kind,
                source: self.source,
            },
        }
    }

    /// Authentication failed with a transient error, before anything was
    /// sent to the service.
    pub(crate) fn is_transient_and_before_rpc(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication)
            && self
                .source
                .as_ref()
                .and_then(|e| e.downcast_ref::<CredentialsError>())
                .is_some_and(CredentialsError::is_transient)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match &self.kind {
            ErrorKind::Service(d) => {
                return write!(
                    f,
                    "the service returned {} ({}): {}",
                    d.status.code.name(),
                    d.status.code as i32,
                    d.status.message
                );
            }
            ErrorKind::Operation(s) => {
                return write!(
                    f,
                    "the long-running operation failed with {}: {}",
                    s.code.name(),
                    s.message
                );
            }
            ErrorKind::Transport(d) => return d.display(self.source(), f),
            ErrorKind::Binding => "no URL template matches the request",
            ErrorKind::Serialization => "cannot encode the request",
            ErrorKind::Deserialization => "cannot decode the response",
            ErrorKind::Authentication => "cannot create the authentication headers",
            ErrorKind::Timeout => "the attempt timed out",
            ErrorKind::Exhausted => return self.display_source(f),
            ErrorKind::Stream => "the response stream was interrupted",
            ErrorKind::Unsupported => "the transport does not support this call",
        };
        match &self.source {
            Some(e) => write!(f, "{prefix}: {e}"),
            None => f.write_str(prefix),
        }
    }
}

impl Error {
    fn display_source(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(e) => write!(f, "{e}"),
            None => f.write_str("a policy stopped the request loop"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| -> &(dyn StdError + 'static) { e.as_ref() })
    }
}

#[derive(Debug)]
enum ErrorKind {
    Binding,
    Serialization,
    Deserialization,
    Authentication,
    Timeout,
    Exhausted,
    Stream,
    Unsupported,
    Transport(Box<TransportDetails>),
    Service(Box<ServiceDetails>),
    Operation(Box<Status>),
}

#[derive(Debug)]
struct TransportDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    payload: Option<Bytes>,
}

impl TransportDetails {
    fn display(
        &self,
        source: Option<&(dyn StdError + 'static)>,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if let (Some(code), Some(payload)) = (self.status_code, &self.payload) {
            return match std::str::from_utf8(payload) {
                Ok(body) => write!(f, "HTTP error {code}: {body}"),
                Err(_) => write!(f, "HTTP error {code}: {payload:?}"),
            };
        }
        match source {
            Some(e) => write!(f, "transport error: {e}"),
            None => f.write_str("unknown transport error"),
        }
    }
}

#[derive(Debug)]
struct ServiceDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    status: Status,
}
