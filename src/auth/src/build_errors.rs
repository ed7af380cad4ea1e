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

//! Errors returned while building [Credentials].
//!
//! [Credentials]: crate::credentials::Credentials

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure to construct credentials.
///
/// These errors are permanent: retrying the same build with the same inputs
/// fails in the same way.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: BoxError,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kind {
    Loading,
    Parsing,
    UnknownType,
}

impl Error {
    /// The credentials file could not be found or read.
    pub fn is_loading(&self) -> bool {
        self.kind == Kind::Loading
    }

    /// The credentials JSON is malformed, or lacks a field the credential
    /// type requires.
    pub fn is_parsing(&self) -> bool {
        self.kind == Kind::Parsing
    }

    /// The `type` field names a credential type this crate does not support.
    pub fn is_unknown_type(&self) -> bool {
        self.kind == Kind::UnknownType
    }

    pub(crate) fn loading<T: Into<BoxError>>(source: T) -> Self {
        Self::new(Kind::Loading, source)
    }

    pub(crate) fn parsing<T: Into<BoxError>>(source: T) -> Self {
        Self::new(Kind::Parsing, source)
    }

    pub(crate) fn unknown_type<T: Into<BoxError>>(source: T) -> Self {
        Self::new(Kind::UnknownType, source)
    }

    fn new<T: Into<BoxError>>(kind: Kind, source: T) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.kind {
            Kind::Loading => "cannot read the credentials file",
            Kind::Parsing => "invalid credentials JSON",
            Kind::UnknownType => "unsupported credentials type",
        };
        write!(f, "{prefix}: {}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
