//! Transport seam between the gateway and the GraphQL endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::OperationError;

/// One request over the wire: the standard GraphQL POST envelope plus the
/// bearer credential, which travels as a header rather than in the body.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: Value,
    #[serde(skip)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: GraphqlRequest) -> Result<GraphqlResponse, OperationError>;
}

/// HTTP transport against a single configured endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OperationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OperationError::network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: GraphqlRequest) -> Result<GraphqlResponse, OperationError> {
        let request_id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        tracing::debug!(
            operation = request.operation_name,
            request_id = %request_id,
            "sending GraphQL request"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("x-request-id", request_id.to_string())
            .json(&request);
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| OperationError::network(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| OperationError::network(err.to_string()))?;

        // GraphQL servers report field errors with non-2xx statuses too, so
        // the envelope is tried first; only a body that isn't one at all is
        // a transport-level failure.
        match serde_json::from_slice::<GraphqlResponse>(&body) {
            Ok(envelope) => {
                if envelope.data.is_none() && envelope.errors.is_empty() && !status.is_success() {
                    return Err(OperationError::network(format!(
                        "server returned {status} without a GraphQL body"
                    )));
                }
                Ok(envelope)
            }
            Err(_) if !status.is_success() => Err(OperationError::network(format!(
                "server returned {status} without a GraphQL body"
            ))),
            Err(err) => Err(OperationError::network(format!(
                "invalid GraphQL response: {err}"
            ))),
        }
    }
}
