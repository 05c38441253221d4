use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::AdapterError;

/// Synchronous, single-attempt invocation of a child operation.
pub trait OperationInvoker: Send + Sync {
    fn invoke(&self, operation: &str, payload: Value) -> Result<Value, AdapterError>;
}

/// Invokes child operations over HTTP. Success is decided by the response
/// status and failure detail is read from the structured error body,
/// never by pattern-matching human-readable text.
pub struct HttpOperationInvoker {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpOperationInvoker {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn operation_url(&self, operation: &str) -> String {
        format!("{}/ops/{operation}", self.endpoint.trim_end_matches('/'))
    }
}

impl OperationInvoker for HttpOperationInvoker {
    fn invoke(&self, operation: &str, payload: Value) -> Result<Value, AdapterError> {
        debug!("Invoking child operation '{operation}'");
        let response = self
            .client
            .post(self.operation_url(operation))
            .json(&payload)
            .send()
            .map_err(AdapterError::from_reqwest)?;

        let status = response.status();
        if status.is_success() {
            // Some operations answer with an empty body.
            Ok(response.json().unwrap_or(Value::Null))
        } else {
            let detail = response
                .json::<ErrorBody>()
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            Err(AdapterError::Remote(format!(
                "operation '{operation}' failed: {detail}"
            )))
        }
    }
}
