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

pub(crate) const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub(crate) const DEFAULT_UNIVERSE_DOMAIN: &str = "googleapis.com";
pub(crate) const OAUTH2_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

pub(crate) const GOOGLE_APPLICATION_CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub(crate) const GOOGLE_CLOUD_PROJECT_VAR: &str = "GOOGLE_CLOUD_PROJECT";
pub(crate) const GOOGLE_CLOUD_QUOTA_PROJECT_VAR: &str = "GOOGLE_CLOUD_QUOTA_PROJECT";

/// The header used to bill requests to a project.
pub(crate) const QUOTA_PROJECT_KEY: &str = "x-goog-user-project";
/// The header carrying API keys.
pub(crate) const API_KEY_HEADER_KEY: &str = "x-goog-api-key";

/// JWT bearer grant, used to exchange a signed assertion for an access token.
pub(crate) const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
