// HTTP implementation of the audit source
use crate::application::feeds::AuditSource;
use crate::domain::error::TransportError;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct HttpAuditSource {
    client: reqwest::Client,
}

impl HttpAuditSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AuditSource for HttpAuditSource {
    async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
