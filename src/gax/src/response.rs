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

//! The body and metadata returned by a successful call.
//!
//! Unary calls return a [Response]: the decoded message plus the headers the
//! service sent with it. For HTTP/JSON those are the response headers, for
//! gRPC the initial metadata converted into an [http::HeaderMap].
//!
//! Mocks usually wrap a body with [Response::from]:
//! ```
//! # use aiplatform_gax::response::Response;
//! #[derive(Debug, PartialEq)]
//! struct Prediction(f64);
//!
//! let response = Response::from(Prediction(0.5));
//! assert!(response.headers().is_empty());
//! assert_eq!(response.into_body(), Prediction(0.5));
//! ```

/// A decoded message and the metadata received with it.
#[derive(Clone, Debug)]
pub struct Response<T> {
    parts: Parts,
    body: T,
}

impl<T> Response<T> {
    /// Wraps `body` with empty metadata.
    pub fn from(body: T) -> Self {
        Self::from_parts(Parts::default(), body)
    }

    /// Wraps `body` with the given metadata.
    ///
    /// ```
    /// # use aiplatform_gax::response::{Parts, Response};
    /// let mut headers = http::HeaderMap::new();
    /// headers.insert("x-goog-request-id", http::HeaderValue::from_static("abc"));
    /// let response = Response::from_parts(Parts::new().set_headers(headers), ());
    /// assert!(response.headers().contains_key("x-goog-request-id"));
    /// ```
    pub fn from_parts(parts: Parts, body: T) -> Self {
        Self { parts, body }
    }

    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    /// Splits the response, interceptors use this to rewrite either half.
    pub fn into_parts(self) -> (Parts, T) {
        (self.parts, self.body)
    }

    /// Discards the metadata.
    pub fn into_body(self) -> T {
        self.body
    }

    /// Converts the body, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response::from_parts(self.parts, f(self.body))
    }
}

/// The metadata half of a [Response].
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Parts {
    /// Response headers, or gRPC initial metadata.
    pub headers: http::HeaderMap,
}

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the headers.
    pub fn set_headers<V: Into<http::HeaderMap>>(mut self, v: V) -> Self {
        self.headers = v.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn metadata() -> http::HeaderMap {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-goog-request-id", HeaderValue::from_static("req-1"));
        headers
    }

    #[test]
    fn without_metadata() {
        let response = Response::from(vec![0.25_f64, 0.75]);
        assert!(response.headers().is_empty());
        assert_eq!(response.body().len(), 2);
        assert_eq!(response.into_body(), vec![0.25, 0.75]);
    }

    #[test]
    fn split_and_rebuild() {
        let response = Response::from_parts(Parts::new().set_headers(metadata()), "deployed");
        let (mut parts, body) = response.into_parts();
        assert_eq!(body, "deployed");
        parts
            .headers
            .insert("x-added", HeaderValue::from_static("yes"));
        let response = Response::from_parts(parts, body);
        assert_eq!(response.headers().len(), 2, "{response:?}");
    }

    #[test]
    fn map_keeps_metadata() {
        let response = Response::from_parts(Parts::new().set_headers(metadata()), "3");
        let response = response.map(|s| s.parse::<i32>().unwrap_or_default());
        assert_eq!(response.body(), &3);
        assert_eq!(response.headers(), &metadata());
    }
}
