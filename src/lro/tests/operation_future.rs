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

use gax::error::rpc::{Code, Status};
use gax::options::RequestOptions;
use gax::Result;
use lro::model::{Operation, Payload};
use lro::{OperationFuture, OperationsClient, PollingResult};
use mockall::Sequence;

mockall::mock! {
    #[derive(Debug)]
    Operations {}

    impl OperationsClient for Operations {
        async fn get_operation(&self, name: String, options: RequestOptions) -> Result<Operation>;
        async fn cancel_operation(&self, name: String, options: RequestOptions) -> Result<()>;
    }
}

#[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
struct DeployResponse {
    #[prost(string, tag = "1")]
    #[serde(default, rename = "deployedModelId")]
    deployed_model_id: String,
}

#[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
struct DeployMetadata {
    #[prost(string, tag = "1")]
    #[serde(default)]
    state: String,
}

fn running() -> Operation {
    Operation::new()
        .set_name("projects/p/locations/l/operations/op-001")
        .set_metadata(Payload::Json(serde_json::json!({
            "@type": "type.googleapis.com/test.DeployMetadata",
            "state": "RUNNING",
        })))
}

fn completed() -> Operation {
    Operation::new()
        .set_name("projects/p/locations/l/operations/op-001")
        .set_done(true)
        .set_response(Payload::Json(serde_json::json!({
            "@type": "type.googleapis.com/test.DeployResponse",
            "deployedModelId": "m-123",
        })))
}

type Future = OperationFuture<DeployResponse, DeployMetadata, MockOperations>;

#[tokio::test(start_paused = true)]
async fn result_on_third_poll() -> anyhow::Result<()> {
    let mut seq = Sequence::new();
    let mut mock = MockOperations::new();
    mock.expect_get_operation()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|name, _| {
            assert_eq!(name, "projects/p/locations/l/operations/op-001");
            Ok(running())
        });
    mock.expect_get_operation()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(completed()));
    mock.expect_cancel_operation().never();

    let future = Future::new(mock, running(), RequestOptions::default());
    assert_eq!(
        future.metadata().await.map(|m| m.state).as_deref(),
        Some("RUNNING")
    );
    let got = future.result(None).await?;
    assert_eq!(got.deployed_model_id, "m-123");
    assert!(future.done().await);
    Ok(())
}

#[tokio::test]
async fn cancel_before_done() -> anyhow::Result<()> {
    let mut mock = MockOperations::new();
    mock.expect_cancel_operation()
        .times(1)
        .withf(|name, _| name == "projects/p/locations/l/operations/op-001")
        .returning(|_, _| Ok(()));
    mock.expect_get_operation().never();

    let future = Future::new(mock, running(), RequestOptions::default());
    future.cancel().await?;
    assert!(!future.done().await);
    Ok(())
}

#[tokio::test]
async fn cancel_error() {
    let mut mock = MockOperations::new();
    mock.expect_cancel_operation().times(1).returning(|_, _| {
        Err(gax::error::Error::service(
            Status::default()
                .set_code(Code::NotFound)
                .set_message("no such operation"),
        ))
    });

    let future = Future::new(mock, running(), RequestOptions::default());
    let err = future.cancel().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.code), Some(Code::NotFound));
}

#[tokio::test(start_paused = true)]
async fn timeout_does_not_cancel() -> anyhow::Result<()> {
    let mut mock = MockOperations::new();
    mock.expect_get_operation().returning(|_, _| Ok(running()));
    mock.expect_cancel_operation().never();
    let future = Future::new(mock, running(), RequestOptions::default());
    let err = future
        .result(Some(std::time::Duration::from_secs(30)))
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err:?}");
    assert!(!future.done().await);
    assert_eq!(
        future.metadata().await.map(|m| m.state).as_deref(),
        Some("RUNNING")
    );
    Ok(())
}

#[cfg(feature = "unstable-stream")]
#[tokio::test(start_paused = true)]
async fn poll_stream() {
    use futures::StreamExt;
    let mut seq = Sequence::new();
    let mut mock = MockOperations::new();
    mock.expect_get_operation()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(running()));
    mock.expect_get_operation()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(completed()));

    let future = Future::new(mock, running(), RequestOptions::default());
    let got = future.into_stream().collect::<Vec<_>>().await;
    assert_eq!(got.len(), 2);
    assert!(matches!(&got[0], PollingResult::InProgress(Some(m)) if m.state == "RUNNING"));
    assert!(
        matches!(&got[1], PollingResult::Completed(Ok(r)) if r.deployed_model_id == "m-123")
    );
}
