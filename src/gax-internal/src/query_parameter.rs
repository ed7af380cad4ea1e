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

//! Helpers to serialize query parameters.
//!
//! Request fields that are not bound to the path or to the body are sent as
//! query parameters. Message fields are flattened using `.`-separated names
//! and repeated fields are sent as repeated parameters.

/// A list of query parameters, in the order they are sent.
pub type QueryPairs = Vec<(String, String)>;

/// Types that can be used as a query parameter.
pub trait QueryParameter {
    fn add(self, query: &mut QueryPairs, name: &str);
}

impl QueryParameter for serde_json::Value {
    fn add(self, query: &mut QueryPairs, name: &str) {
        match self {
            Self::Object(object) => object
                .into_iter()
                .for_each(|(k, v)| v.add(query, format!("{name}.{k}").as_str())),
            Self::Array(array) => array.into_iter().for_each(|v| v.add(query, name)),
            Self::Null => {}
            Self::String(s) => query.push((name.to_string(), s)),
            Self::Number(n) => query.push((name.to_string(), format!("{n}"))),
            Self::Bool(b) => query.push((name.to_string(), format!("{b}"))),
        }
    }
}

impl QueryParameter for &str {
    fn add(self, query: &mut QueryPairs, name: &str) {
        // Default values are not sent.
        if !self.is_empty() {
            query.push((name.to_string(), self.to_string()));
        }
    }
}

impl QueryParameter for i32 {
    fn add(self, query: &mut QueryPairs, name: &str) {
        if self != 0 {
            query.push((name.to_string(), format!("{self}")));
        }
    }
}

impl<T: QueryParameter> QueryParameter for Option<T> {
    fn add(self, query: &mut QueryPairs, name: &str) {
        if let Some(v) = self {
            v.add(query, name);
        }
    }
}
