use serde::{Deserialize, Serialize};
use crate::models::domain::{PartnerMatch, PartnerProfile};

/// Response for the find-partners endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindPartnersResponse {
    pub partners: Vec<PartnerMatch>,
}

/// Response for the profile update endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: PartnerProfile,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}
