use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{Classification, ClassifierError, EmailClassifier};
use crate::utils::truncate_chars;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    logits: Vec<f32>,
}

/// Client for a model server hosting the fine-tuned sequence classifier.
///
/// Sends `{"text": ...}` and expects `{"logits": [f32; 4]}` in label order.
pub struct HttpEmailClassifier {
    client: Client,
    url: String,
    max_input_chars: usize,
}

impl HttpEmailClassifier {
    pub fn new(url: &str, timeout: Duration, max_input_chars: usize) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            max_input_chars,
        })
    }
}

#[async_trait]
impl EmailClassifier for HttpEmailClassifier {
    #[instrument(skip(self, text), fields(url = %self.url, len = text.len()))]
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let text = truncate_chars(text, self.max_input_chars);

        let response = self
            .client
            .post(&self.url)
            .json(&InferenceRequest { text })
            .send()
            .await
            .map_err(ClassifierError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Classifier service responded with {}", status);
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Decode(e.to_string()))?;

        let classification = Classification::from_logits(&body.logits)?;
        debug!(
            "Classified as {} with confidence {:.3}",
            classification.category, classification.confidence
        );
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_classifies_from_logits() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_body(Matcher::Json(serde_json::json!({"text": "My [email] login is broken"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"logits": [3.2, 0.1, 0.4, -1.2]}"#)
            .create_async()
            .await;

        let classifier =
            HttpEmailClassifier::new(&format!("{}/predict", server.url()), Duration::from_secs(5), 2048).unwrap();
        let result = classifier.classify("My [email] login is broken").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.category, Category::Incident);
        assert!(result.confidence > 0.5 && result.confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_input_is_truncated() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_body(Matcher::Json(serde_json::json!({"text": "abcde"})))
            .with_status(200)
            .with_body(r#"{"logits": [0.0, 0.0, 0.0, 1.0]}"#)
            .create_async()
            .await;

        let classifier =
            HttpEmailClassifier::new(&format!("{}/predict", server.url()), Duration::from_secs(5), 5).unwrap();
        let result = classifier.classify("abcdefghij").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.category, Category::Change);
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/predict").with_status(500).create_async().await;

        let classifier =
            HttpEmailClassifier::new(&format!("{}/predict", server.url()), Duration::from_secs(5), 2048).unwrap();
        let err = classifier.classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Status(500)));
    }

    #[tokio::test]
    async fn test_wrong_label_count_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(200)
            .with_body(r#"{"logits": [0.2, 0.8]}"#)
            .create_async()
            .await;

        let classifier =
            HttpEmailClassifier::new(&format!("{}/predict", server.url()), Duration::from_secs(5), 2048).unwrap();
        let err = classifier.classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::LogitCount { .. }));
    }
}
