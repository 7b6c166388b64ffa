use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{NerError, PersonNameRecognizer};

const PERSON_LABEL: &str = "PERSON";

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    #[serde(default)]
    ents: Vec<NerEntity>,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    text: String,
    label: String,
}

/// Client for a spaCy-style NER service.
///
/// Sends `{"text": ...}` and reads `{"ents": [{"text", "label"}, ...]}`,
/// keeping entities labelled `PERSON`.
pub struct HttpNameRecognizer {
    client: Client,
    url: String,
}

impl HttpNameRecognizer {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NerError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PersonNameRecognizer for HttpNameRecognizer {
    #[instrument(skip(self, text), fields(url = %self.url, len = text.len()))]
    async fn recognize_person_names(&self, text: &str) -> Result<HashSet<String>, NerError> {
        let response = self
            .client
            .post(&self.url)
            .json(&NerRequest { text })
            .send()
            .await
            .map_err(NerError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("NER service responded with {}", status);
            return Err(NerError::Status(status.as_u16()));
        }

        let body: NerResponse = response
            .json()
            .await
            .map_err(|e| NerError::Decode(e.to_string()))?;

        let names: HashSet<String> = body
            .ents
            .into_iter()
            .filter(|e| e.label == PERSON_LABEL)
            .map(|e| e.text)
            .collect();
        debug!("NER service recognized {} person name(s)", names.len());
        Ok(names)
    }

    fn name(&self) -> &str {
        "http"
    }
}
