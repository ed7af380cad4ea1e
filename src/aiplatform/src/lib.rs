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

//! Google Cloud Client Libraries for Rust - Vertex AI API
//!
//! This crate contains the clients for two Vertex AI services:
//! - [PredictionService][client::PredictionService], online predictions and
//!   content generation, including server-streaming and bidirectional
//!   streaming methods.
//! - [EndpointService][client::EndpointService], endpoint management,
//!   including long-running operations and paginated list methods.
//!
//! Both clients support the gRPC and HTTP/JSON transports. The [blocking]
//! module contains synchronous versions of the clients, which always use
//! HTTP/JSON.
//!
//! # Example
//! ```
//! # async fn sample() -> anyhow::Result<()> {
//! use aiplatform::client::PredictionService;
//! use aiplatform::model::{Content, Part};
//! let client = PredictionService::builder()
//!     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
//!     .build()
//!     .await?;
//! let response = client
//!     .generate_content()
//!     .set_model("projects/my-project/locations/us-central1/publishers/google/models/gemini-2.0-flash")
//!     .set_contents([Content::new()
//!         .set_role("user")
//!         .set_parts([Part::new().set_text("Tell me a story")])])
//!     .send()
//!     .await?;
//! println!("{:?}", response.text());
//! # Ok(()) }
//! ```

pub use gax::Result;
pub use gax::error::Error;
pub use gaxi::streaming::ResponseStream;

pub mod blocking;
pub mod builder;
pub mod client;
pub mod interceptor;
pub mod method;
pub mod model;
pub(crate) mod operations;
pub mod stub;
pub(crate) mod transport;

pub(crate) mod info {
    use gaxi::api_header::{GAPIC, XGoogApiClient};
    use gaxi::options::ServiceInfo;

    const API_CLIENT: XGoogApiClient = XGoogApiClient {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        library_type: GAPIC,
    };

    pub(crate) static SERVICE: ServiceInfo = ServiceInfo {
        service_name: "aiplatform",
        default_endpoint: "aiplatform.{UNIVERSE_DOMAIN}",
        mtls_endpoint: "aiplatform.mtls.googleapis.com",
        default_scopes: &["https://www.googleapis.com/auth/cloud-platform"],
        api_client: &API_CLIENT,
    };
}
