//! Remote records API client
//!
//! The remote wraps every response in `{success, data, message}`. Anything
//! other than `success: true` is surfaced to the caller; nothing is retried.

use async_trait::async_trait;
use foodbooks_config::RemoteConfig;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::types::ResourceKind;

/// Response envelope shared with the remote API (and reused by our own API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// `data` of a successful envelope; the remote's message otherwise
    pub fn into_result(self) -> CoreResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(CoreError::Remote {
                message: self
                    .message
                    .unwrap_or_else(|| "Remote API reported a failure".to_string()),
            })
        }
    }
}

/// CRUD operations against the remote records API
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Every record of a kind; the payload must be a JSON array
    async fn list(&self, kind: ResourceKind) -> CoreResult<Vec<Value>>;

    async fn get(&self, kind: ResourceKind, id: &str) -> CoreResult<Value>;

    /// Returns whatever the remote echoes back, often the created record
    async fn create(&self, kind: ResourceKind, body: Value) -> CoreResult<Option<Value>>;

    async fn update(&self, kind: ResourceKind, id: &str, body: Value) -> CoreResult<Option<Value>>;

    async fn delete(&self, kind: ResourceKind, id: &str) -> CoreResult<()>;
}

pub type RemoteRef = Arc<dyn RemoteApi>;

/// `RemoteApi` over HTTP with `reqwest`
pub struct HttpRemote {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Collection URL for a kind, honouring endpoint overrides
    pub fn collection_url(&self, kind: ResourceKind) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.endpoint(kind.as_str(), kind.default_endpoint())
        )
    }

    pub fn record_url(&self, kind: ResourceKind, id: &str) -> String {
        format!("{}/{}", self.collection_url(kind), urlencoding::encode(id))
    }

    async fn call(&self, method: Method, url: String, body: Option<Value>) -> CoreResult<Option<Value>> {
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| CoreError::RemoteUnavailable {
            message: e.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| CoreError::RemoteUnavailable {
            message: e.to_string(),
        })?;

        decode_envelope(status, &text)
    }
}

/// Interpret a raw remote response
pub fn decode_envelope(status: StatusCode, body: &str) -> CoreResult<Option<Value>> {
    match serde_json::from_str::<ApiEnvelope<Value>>(body) {
        Ok(envelope) => envelope.into_result(),
        Err(_) if !status.is_success() => Err(CoreError::Remote {
            message: format!("Remote API returned HTTP {}", status),
        }),
        Err(e) => Err(CoreError::InvalidFormat {
            message: format!("Unexpected response body: {}", e),
        }),
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn list(&self, kind: ResourceKind) -> CoreResult<Vec<Value>> {
        match self.call(Method::GET, self.collection_url(kind), None).await? {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(CoreError::InvalidFormat {
                message: format!("expected a list of {} records, got {}", kind.label(), json_type(&other)),
            }),
        }
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> CoreResult<Value> {
        match self.call(Method::GET, self.record_url(kind, id), None).await? {
            Some(Value::Null) | None => Err(CoreError::RecordNotFound {
                kind,
                id: id.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    async fn create(&self, kind: ResourceKind, body: Value) -> CoreResult<Option<Value>> {
        self.call(Method::POST, self.collection_url(kind), Some(body)).await
    }

    async fn update(&self, kind: ResourceKind, id: &str, body: Value) -> CoreResult<Option<Value>> {
        self.call(Method::PUT, self.record_url(kind, id), Some(body)).await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> CoreResult<()> {
        self.call(Method::DELETE, self.record_url(kind, id), None).await?;
        Ok(())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls_use_defaults_and_overrides() {
        let mut config = RemoteConfig {
            base_url: "https://erp.example.com/api/".to_string(),
            ..RemoteConfig::default()
        };
        config
            .endpoints
            .insert("usage-logs".to_string(), "/inventory/usage/".to_string());
        let remote = HttpRemote::new(config);

        assert_eq!(
            remote.collection_url(ResourceKind::CreditNotes),
            "https://erp.example.com/api/credit_notes"
        );
        assert_eq!(
            remote.collection_url(ResourceKind::UsageLogs),
            "https://erp.example.com/api/inventory/usage"
        );
        assert_eq!(
            remote.record_url(ResourceKind::Sales, "INV/7 A"),
            "https://erp.example.com/api/sales/INV%2F7%20A"
        );
    }

    #[test]
    fn test_decode_success() {
        let data = decode_envelope(StatusCode::OK, r#"{"success":true,"data":[{"id":1}]}"#).unwrap();
        assert_eq!(data, Some(json!([{ "id": 1 }])));

        let empty = decode_envelope(StatusCode::OK, r#"{"success":true}"#).unwrap();
        assert_eq!(empty, None);
    }

    #[test]
    fn test_decode_remote_failure_keeps_message() {
        let err = decode_envelope(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Receipt number already exists"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Receipt number already exists");
    }

    #[test]
    fn test_decode_non_json() {
        let err = decode_envelope(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, CoreError::Remote { .. }));
        assert!(err.to_string().contains("502"));

        let err = decode_envelope(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }

    #[test]
    fn test_envelope_serialization() {
        let ok = serde_json::to_value(ApiEnvelope::ok(3)).unwrap();
        assert_eq!(ok, json!({ "success": true, "data": 3 }));

        let err = serde_json::to_value(ApiEnvelope::<()>::error("nope")).unwrap();
        assert_eq!(err, json!({ "success": false, "message": "nope" }));
    }
}
