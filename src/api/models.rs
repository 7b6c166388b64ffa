use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::pii::MaskedEntity;

/// Request to classify an email body
#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationRequest {
    /// Raw email body, possibly containing PII
    pub email: String,
}

/// One masked entity as reported to clients
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PiiDetection {
    /// `[start, end]` codepoint offsets into the original email
    pub position: [usize; 2],

    /// Entity type, e.g. `email`
    pub classification: String,

    /// The original text that was masked
    pub entity: String,
}

impl From<MaskedEntity> for PiiDetection {
    fn from(entity: MaskedEntity) -> Self {
        Self {
            position: [entity.original_start, entity.original_end],
            classification: entity.entity_type.to_string(),
            entity: entity.original_text,
        }
    }
}

/// Response for a classification request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassificationResponse {
    /// The email as received
    pub input_email_body: String,

    /// Masked entities ordered by start position
    pub list_of_masked_entities: Vec<PiiDetection>,

    /// The email with every entity replaced by `[type]`
    pub masked_email: String,

    /// Predicted category: Incident, Request, Problem or Change
    pub category_of_the_email: String,
}

/// Internal job structure for classification tasks
#[derive(Debug)]
pub struct ClassifyJob {
    /// Correlates log lines for one request
    pub request_id: Uuid,

    /// The classification request
    pub request: ClassificationRequest,

    /// Sender for the response channel
    pub response_tx: oneshot::Sender<Result<ClassificationResponse, String>>,
}

/// Health status response for the /health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `healthy` while the server answers
    pub status: String,

    /// Seconds since the server started
    pub uptime_secs: u64,

    /// Free slots in the job queue
    pub queue_available: usize,

    /// Total job queue capacity
    pub queue_capacity: usize,
}

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status indicator: error
    pub status: String,

    /// Error message details
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}
