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

//! Hooks around the HTTP/JSON methods.
//!
//! Applications may register, for any method, a hook to modify the request
//! and its headers before it is sent (`pre`), a hook to modify the response
//! (`post`), and a hook that receives both the response and its headers
//! (`post_with_metadata`). Methods without hooks are unchanged.
//!
//! When both `post` and `post_with_metadata` are registered, both run, in that
//! order. The second hook sees the output of the first.

use gax::response::{Parts, Response};
use http::HeaderMap;
use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

type PreFn<Req> = dyn Fn(Req, &mut HeaderMap) -> Req + Send + Sync;
type PostFn<Resp> = dyn Fn(Resp) -> Resp + Send + Sync;
type PostWithMetadataFn<Resp> = dyn Fn(Resp, HeaderMap) -> (Resp, HeaderMap) + Send + Sync;

/// The hooks for one method.
pub struct Hook<Req, Resp> {
    pre: Option<Arc<PreFn<Req>>>,
    post: Option<Arc<PostFn<Resp>>>,
    post_with_metadata: Option<Arc<PostWithMetadataFn<Resp>>>,
}

impl<Req, Resp> Hook<Req, Resp> {
    pub fn new() -> Self {
        Self {
            pre: None,
            post: None,
            post_with_metadata: None,
        }
    }

    pub fn on_pre<F>(mut self, f: F) -> Self
    where
        F: Fn(Req, &mut HeaderMap) -> Req + Send + Sync + 'static,
    {
        self.pre = Some(Arc::new(f));
        self
    }

    pub fn on_post<F>(mut self, f: F) -> Self
    where
        F: Fn(Resp) -> Resp + Send + Sync + 'static,
    {
        self.post = Some(Arc::new(f));
        self
    }

    pub fn on_post_with_metadata<F>(mut self, f: F) -> Self
    where
        F: Fn(Resp, HeaderMap) -> (Resp, HeaderMap) + Send + Sync + 'static,
    {
        self.post_with_metadata = Some(Arc::new(f));
        self
    }

    pub fn apply_pre(&self, request: Req, headers: &mut HeaderMap) -> Req {
        match &self.pre {
            Some(f) => f(request, headers),
            None => request,
        }
    }

    pub fn apply_post(&self, response: Response<Resp>) -> Response<Resp> {
        let (parts, body) = response.into_parts();
        let body = match &self.post {
            Some(f) => f(body),
            None => body,
        };
        match &self.post_with_metadata {
            Some(f) => {
                let (body, headers) = f(body, parts.headers);
                Response::from_parts(Parts::new().set_headers(headers), body)
            }
            None => Response::from_parts(parts, body),
        }
    }
}

impl<Req, Resp> Default for Hook<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> Clone for Hook<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            pre: self.pre.clone(),
            post: self.post.clone(),
            post_with_metadata: self.post_with_metadata.clone(),
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Hook<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .field("post_with_metadata", &self.post_with_metadata.is_some())
            .finish()
    }
}

/// The hooks for all the methods in a service, keyed by the method enum.
///
/// Service crates wrap this table with one typed setter per method, which
/// guarantees that the hook types match the method types.
#[derive(Clone)]
pub struct Interceptors<M> {
    hooks: HashMap<M, Arc<dyn Any + Send + Sync>>,
}

impl<M> Interceptors<M>
where
    M: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    pub fn set<Req, Resp>(&mut self, method: M, hook: Hook<Req, Resp>)
    where
        Req: 'static,
        Resp: 'static,
    {
        self.hooks.insert(method, Arc::new(hook));
    }

    /// Returns the hook for `method`, or the identity hook.
    pub fn get<Req, Resp>(&self, method: M) -> Hook<Req, Resp>
    where
        Req: 'static,
        Resp: 'static,
    {
        self.hooks
            .get(&method)
            .and_then(|h| h.downcast_ref::<Hook<Req, Resp>>())
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<M> Default for Interceptors<M>
where
    M: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Interceptors<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptors")
            .field("methods", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
