use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::api::models::{ClassificationRequest, ClassificationResponse, PiiDetection};
use crate::classifier::EmailClassifier;
use crate::pii::PiiDetector;

/// Everything a worker needs to answer one request. Built once at startup;
/// all members are read-only.
#[derive(Clone)]
pub struct EmailPipeline {
    pub detector: Arc<PiiDetector>,
    pub classifier: Arc<dyn EmailClassifier>,
}

impl EmailPipeline {
    pub fn new(detector: PiiDetector, classifier: Arc<dyn EmailClassifier>) -> Self {
        Self {
            detector: Arc::new(detector),
            classifier,
        }
    }
}

/// Processes a classification request end to end
///
/// 1. Detects PII in the original email
/// 2. Masks every entity with a `[type]` placeholder
/// 3. Classifies the masked text
///
/// Entity text is never logged.
#[instrument(skip(request, pipeline), fields(request_id = %request_id, len = request.email.len()))]
pub async fn process_request(
    request_id: Uuid,
    request: ClassificationRequest,
    pipeline: &EmailPipeline,
) -> Result<ClassificationResponse> {
    info!("Processing classification request");

    let masked = match pipeline.detector.detect_and_mask(&request.email).await {
        Ok(masked) => masked,
        Err(e) => {
            error!("PII detection failed: {}", e);
            return Err(e.into());
        }
    };
    debug!(
        "Masked {} entit(ies): {:?}",
        masked.entities.len(),
        masked
            .entities
            .iter()
            .map(|e| e.entity_type.as_str())
            .collect::<Vec<_>>()
    );

    let classification = pipeline
        .classifier
        .classify(&masked.masked_text)
        .await
        .context("classification failed")?;
    info!(
        "Classified as {} (confidence {:.3})",
        classification.category, classification.confidence
    );

    Ok(ClassificationResponse {
        input_email_body: request.email,
        list_of_masked_entities: masked.entities.into_iter().map(PiiDetection::from).collect(),
        masked_email: masked.masked_text,
        category_of_the_email: classification.category.to_string(),
    })
}
