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

/// The default implementation for stub trait methods.
///
/// Stub traits provide a default for each method so services can gain new
/// RPCs without breaking mocks. All the transports override all the methods,
/// this error only appears with incomplete mocks.
pub async fn unimplemented_stub<T: Send>(method: &str) -> gax::Result<T> {
    Err(gax::error::Error::unsupported(format!(
        "the stub does not implement `{method}`, verify that your mock implements every method used in the test"
    )))
}
