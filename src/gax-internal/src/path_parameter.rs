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

//! Validation of the fields that form the request path.
//!
//! A path field must be set and must match the resource pattern of the
//! method. Otherwise the request cannot be mapped to a URL and the call
//! fails locally with a [binding][gax::error::Error::is_binding] error.

use crate::routing_parameter::Segment;

/// Returns `value` if it matches `template` in full.
///
/// ```
/// # use aiplatform_gax_internal::path_parameter::try_match;
/// # use aiplatform_gax_internal::routing_parameter::Segment;
/// use Segment::{Literal, SingleWildcard};
/// let template = [Literal("projects/"), SingleWildcard, Literal("/locations/"), SingleWildcard];
/// assert_eq!(try_match("projects/p/locations/us-central1", &template), Some("projects/p/locations/us-central1"));
/// assert_eq!(try_match("projects/p", &template), None);
/// ```
pub fn try_match<'a>(value: &'a str, template: &[Segment]) -> Option<&'a str> {
    crate::routing_parameter::value(Some(value), &[], template, &[])
}

/// The value of a path field that must be set and match `template`.
pub fn required<'a>(value: &'a str, name: &str, template: &[Segment]) -> gax::Result<&'a str> {
    match value {
        "" => Err(missing(name)),
        v => try_match(v, template).ok_or_else(|| mismatch(name, v)),
    }
}

/// Why a path field was rejected.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("the path field `{field}` is required but empty")]
    Missing { field: String },
    #[error("the path field `{field}` has value `{value}`, which does not match the resource pattern")]
    Mismatch { field: String, value: String },
}

pub fn missing(name: &str) -> gax::error::Error {
    gax::error::Error::binding(Error::Missing {
        field: name.to_string(),
    })
}

pub fn mismatch(name: &str, value: &str) -> gax::error::Error {
    gax::error::Error::binding(Error::Mismatch {
        field: name.to_string(),
        value: value.to_string(),
    })
}
