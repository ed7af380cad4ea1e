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

//! Lazy sequences over paged list RPCs.
//!
//! List RPCs, as defined by [AIP-4233], return one page of items and a token to
//! fetch the next page. The types in this module hide the token handling:
//! [Paginator] is an async stream of pages, [ItemPaginator] an async stream of
//! items. [PageIterator] and [ItemIterator] are their blocking counterparts.
//!
//! Pages are fetched serially, and only when the application asks for them.
//! The sequence ends once a page with an empty `next_page_token` is drained, or
//! after the first error. Restarting the iteration requires a new paginator.
//!
//! [AIP-4233]: https://google.aip.dev/client-libraries/4233

use futures::stream::unfold;
use futures::{Stream, StreamExt};
use pin_project::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

/// Describes a type that can be iterated over asyncly when used with [Paginator].
pub trait PageableResponse {
    type PageItem: Send;

    /// Consumes the response, returning the items in this page.
    fn items(self) -> Vec<Self::PageItem>;

    /// The token to fetch the next page. Empty on the last page.
    fn next_page_token(&self) -> String;
}

type ControlFlow = std::ops::ControlFlow<(), String>;

/// An adapter that converts list RPCs into a [futures::Stream] of pages.
#[pin_project]
pub struct Paginator<T, E> {
    #[pin]
    stream: Pin<Box<dyn Stream<Item = Result<T, E>> + Send>>,
}

impl<T, E> Paginator<T, E>
where
    T: PageableResponse + Send + 'static,
    E: Send + 'static,
{
    /// Creates a new [Paginator] given the initial page token and a function
    /// to fetch the next [PageableResponse].
    pub fn new<F, X>(seed_token: String, execute: X) -> Self
    where
        X: Fn(String) -> F + Clone + Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let stream = unfold(ControlFlow::Continue(seed_token), move |state| {
            let execute = execute.clone();
            async move {
                let token = match state {
                    ControlFlow::Continue(token) => token,
                    ControlFlow::Break(_) => return None,
                };
                match execute(token).await {
                    Ok(page) => {
                        let next = page.next_page_token();
                        let next_state = if next.is_empty() {
                            ControlFlow::Break(())
                        } else {
                            ControlFlow::Continue(next)
                        };
                        Some((Ok(page), next_state))
                    }
                    Err(e) => Some((Err(e), ControlFlow::Break(()))),
                }
            }
        });
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Returns the next page.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }

    /// Converts the page stream into a stream of items.
    pub fn items(self) -> ItemPaginator<T, E> {
        ItemPaginator::new(self)
    }
}

impl<T, E> Stream for Paginator<T, E> {
    type Item = Result<T, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}

/// An adapter that converts a [Paginator] into a stream of individual items.
#[pin_project]
pub struct ItemPaginator<T, E>
where
    T: PageableResponse,
{
    #[pin]
    stream: Pin<Box<dyn Stream<Item = Result<T::PageItem, E>> + Send>>,
}

impl<T, E> ItemPaginator<T, E>
where
    T: PageableResponse + Send + 'static,
    T::PageItem: 'static,
    E: Send + 'static,
{
    fn new(pages: Paginator<T, E>) -> Self {
        let stream = pages.flat_map(|page| {
            let items: Vec<Result<T::PageItem, E>> = match page {
                Ok(p) => p.items().into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(items)
        });
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Returns the next item.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }
}

impl<T, E> Stream for ItemPaginator<T, E>
where
    T: PageableResponse,
{
    type Item = Result<T::PageItem, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}

/// A blocking iterator over the pages of a list RPC.
pub struct PageIterator<T, E> {
    execute: Box<dyn FnMut(String) -> Result<T, E> + Send>,
    state: ControlFlow,
}

impl<T, E> PageIterator<T, E>
where
    T: PageableResponse,
{
    /// Creates a new iterator given the initial page token and a function to
    /// fetch each page.
    pub fn new<X>(seed_token: String, execute: X) -> Self
    where
        X: FnMut(String) -> Result<T, E> + Send + 'static,
    {
        Self {
            execute: Box::new(execute),
            state: ControlFlow::Continue(seed_token),
        }
    }

    /// Converts the page iterator into an iterator of items.
    pub fn items(self) -> ItemIterator<T, E> {
        ItemIterator {
            pages: self,
            current: VecDeque::new(),
        }
    }
}

impl<T, E> Iterator for PageIterator<T, E>
where
    T: PageableResponse,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = match std::mem::replace(&mut self.state, ControlFlow::Break(())) {
            ControlFlow::Continue(token) => token,
            ControlFlow::Break(_) => return None,
        };
        let page = (self.execute)(token);
        if let Ok(p) = &page {
            let next = p.next_page_token();
            if !next.is_empty() {
                self.state = ControlFlow::Continue(next);
            }
        }
        Some(page)
    }
}

/// A blocking iterator over the items of a list RPC.
pub struct ItemIterator<T, E>
where
    T: PageableResponse,
{
    pages: PageIterator<T, E>,
    current: VecDeque<T::PageItem>,
}

impl<T, E> Iterator for ItemIterator<T, E>
where
    T: PageableResponse,
{
    type Item = Result<T::PageItem, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.pop_front() {
                return Some(Ok(item));
            }
            match self.pages.next()? {
                Ok(page) => self.current = page.items().into(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug)]
    struct TestResponse {
        items: Vec<String>,
        next_page_token: String,
    }

    impl PageableResponse for TestResponse {
        type PageItem = String;
        fn items(self) -> Vec<String> {
            self.items
        }
        fn next_page_token(&self) -> String {
            self.next_page_token.clone()
        }
    }

    type TestError = Box<dyn std::error::Error + Send + Sync>;

    fn pages() -> VecDeque<TestResponse> {
        VecDeque::from(vec![
            TestResponse {
                items: vec!["item1".into(), "item2".into()],
                next_page_token: "token2".into(),
            },
            TestResponse {
                items: vec![],
                next_page_token: "token3".into(),
            },
            TestResponse {
                items: vec!["item3".into()],
                next_page_token: String::new(),
            },
        ])
    }

    #[tokio::test]
    async fn paginator_pages() -> anyhow::Result<()> {
        let responses = Arc::new(Mutex::new(pages()));
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let seen = tokens.clone();
        let execute = move |token: String| {
            seen.lock().unwrap().push(token);
            let page = responses.lock().unwrap().pop_front();
            async move { page.ok_or_else(|| TestError::from("too many pages")) }
        };
        let mut paginator = Paginator::new("token1".to_string(), execute);
        let mut got = Vec::new();
        while let Some(page) = paginator.next().await {
            got.push(page.map_err(|e| anyhow::anyhow!("{e}"))?);
        }
        assert_eq!(got.len(), 3);
        assert_eq!(*tokens.lock().unwrap(), vec!["token1", "token2", "token3"]);
        Ok(())
    }

    #[tokio::test]
    async fn paginator_items() -> anyhow::Result<()> {
        let responses = Arc::new(Mutex::new(pages()));
        let execute = move |_| {
            let page = responses.lock().unwrap().pop_front();
            async move { page.ok_or_else(|| TestError::from("too many pages")) }
        };
        let mut items = Paginator::new(String::new(), execute).items();
        let mut got = Vec::new();
        while let Some(item) = items.next().await {
            got.push(item.map_err(|e| anyhow::anyhow!("{e}"))?);
        }
        assert_eq!(got, vec!["item1", "item2", "item3"]);
        Ok(())
    }

    #[tokio::test]
    async fn paginator_error_terminates() {
        let execute = |_| async { Err::<TestResponse, TestError>("err".into()) };
        let mut paginator = Paginator::new(String::new(), execute);
        let mut count = 0;
        while let Some(resp) = paginator.next().await {
            let e = resp.expect_err("should not succeed");
            assert_eq!(e.to_string(), "err");
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn page_iterator() {
        let mut responses = pages();
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let seen = tokens.clone();
        let iter = PageIterator::new("token1".to_string(), move |token| {
            seen.lock().unwrap().push(token);
            responses.pop_front().ok_or("too many pages")
        });
        let got = iter.collect::<Result<Vec<_>, _>>();
        let got = got.expect("all pages succeed");
        assert_eq!(got.len(), 3);
        assert_eq!(got[2].items, vec!["item3"]);
        assert_eq!(*tokens.lock().unwrap(), vec!["token1", "token2", "token3"]);
    }

    #[test]
    fn item_iterator() {
        let mut responses = pages();
        let iter = PageIterator::new(String::new(), move |_| {
            responses.pop_front().ok_or("too many pages")
        });
        let got = iter.items().collect::<Result<Vec<_>, _>>();
        assert_eq!(got, Ok(vec!["item1".to_string(), "item2".into(), "item3".into()]));
    }

    #[test]
    fn item_iterator_error() {
        let mut calls = 0;
        let iter = PageIterator::new(String::new(), move |_| {
            calls += 1;
            if calls == 1 {
                Ok(TestResponse {
                    items: vec!["item1".into()],
                    next_page_token: "more".into(),
                })
            } else {
                Err("broken")
            }
        });
        let got = iter.items().collect::<Vec<_>>();
        assert_eq!(got, vec![Ok("item1".to_string()), Err("broken")]);
    }
}
