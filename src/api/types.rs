// API Type Definitions

use serde::{Deserialize, Serialize};

// ========== Error Types ==========

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiError {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

// ========== Health ==========

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthStatus {
    pub status: String,
}
