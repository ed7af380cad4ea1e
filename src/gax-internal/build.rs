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

// Captures the compiler version, reported in the `x-goog-api-client` header.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo::rerun-if-changed=build.rs");
    let version = rustc_version::version_meta()?;
    let path = std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("build_env.rs");
    std::fs::write(
        path,
        format!(
            "pub(crate) const RUSTC_VERSION: &str = \"{}\";\n",
            version.semver
        ),
    )?;
    Ok(())
}
