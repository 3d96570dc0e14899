//! Explorer registry publication
//!
//! Publishing is best-effort: callers await it, log a failure and move on.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::RegistryError;

#[async_trait]
pub trait RegistryPublisher: Send + Sync {
    async fn publish(&self, type_name: &str, address: &str) -> Result<(), RegistryError>;
}

/// Used when publication is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistry;

#[async_trait]
impl RegistryPublisher for NoopRegistry {
    async fn publish(&self, _type_name: &str, _address: &str) -> Result<(), RegistryError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    name: &'a str,
    address: &'a str,
}

/// POSTs `{name, address}` to a contract registry endpoint
pub struct HttpRegistry {
    client: reqwest::Client,
    endpoint_url: String,
    api_token: Option<String>,
}

impl HttpRegistry {
    pub fn new(endpoint_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint_url: endpoint_url.into(),
            api_token,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl RegistryPublisher for HttpRegistry {
    async fn publish(&self, type_name: &str, address: &str) -> Result<(), RegistryError> {
        let mut request = self
            .client
            .post(&self.endpoint_url)
            .timeout(Duration::from_secs(10))
            .json(&PublishRequest {
                name: type_name,
                address,
            });

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Rejected {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(type_name, address, "Published to registry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_registry_accepts_everything() {
        assert!(NoopRegistry.publish("NFTMinter", "0x01").await.is_ok());
    }

    #[test]
    fn test_publish_request_shape() {
        let body = serde_json::to_value(PublishRequest {
            name: "NFTMinter",
            address: "0x5fbdb2315678afecb367f032d93f642f64180aa3",
        })
        .unwrap();
        assert_eq!(body["name"], "NFTMinter");
        assert_eq!(body["address"], "0x5fbdb2315678afecb367f032d93f642f64180aa3");
    }

    #[tokio::test]
    async fn test_unreachable_registry_reports_error() {
        let registry = HttpRegistry::new("http://127.0.0.1:1/api/contracts", None);
        assert!(matches!(
            registry.publish("NFTMinter", "0x01").await,
            Err(RegistryError::Http(_))
        ));
    }
}
