// HTTP transport backed by reqwest

use std::time::Duration;

use async_trait::async_trait;

use super::Transport;
use crate::config::HttpConfig;
use crate::error::TransportError;
use crate::telemetry::truncate_text;

/// Longest error body kept in a TransportError::Status
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let request_error = |e: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Explorer returned non-success status");
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_text(&body, MAX_ERROR_BODY),
            });
        }

        Ok(body)
    }
}
