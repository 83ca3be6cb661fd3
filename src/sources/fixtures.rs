// Canned-response transport for adapter tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Transport;
use crate::error::TransportError;

#[derive(Default)]
pub struct FixtureTransport {
    responses: HashMap<String, Result<String, (u16, String)>>,
    requested: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, body: serde_json::Value) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Err((status, body.to_string())));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err((status, body))) => Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
                body: body.clone(),
            }),
            None => Err(TransportError::Request {
                url: url.to_string(),
                message: "no fixture registered".to_string(),
            }),
        }
    }
}
