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

//! Support for the blocking clients.
//!
//! Blocking clients own a single-threaded tokio runtime and drive the
//! HTTP/JSON transport on the calling thread. They must not be used from
//! within an async context.

use crate::streaming::ResponseStream;
use futures::StreamExt;
use gax::Result;
use gax::client_builder::{Error as BuilderError, Result as BuilderResult};
use std::future::Future;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Runtime {
    inner: Arc<tokio::runtime::Runtime>,
}

impl Runtime {
    pub fn new() -> BuilderResult<Self> {
        let inner = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BuilderError::transport)?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Runs `future` to completion on the calling thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.inner.block_on(future)
    }

    /// Converts a response stream into an iterator.
    pub fn iter<T>(&self, stream: ResponseStream<T>) -> BlockingStream<T> {
        BlockingStream {
            runtime: self.clone(),
            stream,
        }
    }
}

/// A blocking iterator over a [ResponseStream].
#[derive(Debug)]
pub struct BlockingStream<T> {
    runtime: Runtime,
    stream: ResponseStream<T>,
}

impl<T> BlockingStream<T> {
    pub fn headers(&self) -> &http::HeaderMap {
        self.stream.headers()
    }
}

impl<T> Iterator for BlockingStream<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}
