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

//! Server-streaming responses shared by both transports.

use crate::call::cancelled;
use futures::{Stream, StreamExt};
use gax::Result;
use http::HeaderMap;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

type BoxStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// A stream of response messages.
///
/// The stream ends after the first error. If the stream is cancelled it yields
/// exactly one `Cancelled` error and then ends.
#[pin_project]
pub struct ResponseStream<T> {
    headers: HeaderMap,
    #[pin]
    inner: BoxStream<T>,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    done: bool,
}

impl<T> ResponseStream<T> {
    pub fn new<S>(headers: HeaderMap, inner: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            headers,
            inner: Box::pin(inner),
            cancelled: None,
            done: false,
        }
    }

    /// Ends the stream when `token` is cancelled.
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancelled = token.map(|t| Box::pin(t.cancelled_owned()));
        self
    }

    /// The response headers, or the initial gRPC metadata.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the next message, or `None` at the end of the stream.
    pub async fn next_message(&mut self) -> Option<Result<T>> {
        self.next().await
    }
}

impl<T> std::fmt::Debug for ResponseStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("headers", &self.headers)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T> Stream for ResponseStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        if let Some(signal) = this.cancelled.as_mut() {
            if signal.as_mut().poll(cx).is_ready() {
                *this.done = true;
                return Poll::Ready(Some(Err(cancelled())));
            }
        }
        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Err(e))) => {
                *this.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                *this.done = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}
