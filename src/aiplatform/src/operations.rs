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

//! Polls and cancels the operations started by [EndpointService][crate::client::EndpointService].

use crate::Result;
use crate::model;
use crate::stub::dynamic::EndpointService;
use gax::options::RequestOptions;
use gax::response::Response;
use lro::model::Operation;
use std::sync::Arc;

/// The operations client used by the long-running operation helpers.
///
/// Reuses the stub, and therefore the transport and credentials, of the client
/// that started the operation.
#[derive(Clone, Debug)]
pub struct Operations {
    stub: Arc<dyn EndpointService>,
}

impl Operations {
    pub fn new(stub: Arc<dyn EndpointService>) -> Self {
        Self { stub }
    }
}

impl lro::OperationsClient for Operations {
    async fn get_operation(&self, name: String, options: RequestOptions) -> Result<Operation> {
        let options = gax::options::internal::set_default_idempotency(options, true);
        self.stub
            .get_operation(model::GetOperationRequest::new().set_name(name), options)
            .await
            .map(Response::into_body)
    }

    async fn cancel_operation(&self, name: String, options: RequestOptions) -> Result<()> {
        self.stub
            .cancel_operation(model::CancelOperationRequest::new().set_name(name), options)
            .await
            .map(Response::into_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lro::OperationsClient;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        names: Mutex<Vec<String>>,
    }

    impl crate::stub::EndpointService for Recorder {
        async fn get_operation(
            &self,
            req: model::GetOperationRequest,
            options: RequestOptions,
        ) -> Result<Response<Operation>> {
            assert_eq!(options.idempotent(), Some(true));
            self.names.lock().unwrap().push(req.name.clone());
            Ok(Response::from(
                Operation::new().set_name(req.name).set_done(true),
            ))
        }

        async fn cancel_operation(
            &self,
            req: model::CancelOperationRequest,
            _options: RequestOptions,
        ) -> Result<Response<()>> {
            self.names.lock().unwrap().push(req.name);
            Ok(Response::from(()))
        }
    }

    #[tokio::test]
    async fn delegates_to_stub() -> anyhow::Result<()> {
        let stub = Arc::new(Recorder::default());
        let client = Operations::new(stub.clone());
        let op = client
            .get_operation("operations/123".into(), RequestOptions::default())
            .await?;
        assert_eq!(op.name, "operations/123");
        assert!(op.done);
        client
            .cancel_operation("operations/456".into(), RequestOptions::default())
            .await?;
        assert_eq!(
            *stub.names.lock().unwrap(),
            vec!["operations/123".to_string(), "operations/456".to_string()]
        );
        Ok(())
    }
}
