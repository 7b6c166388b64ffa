//! Person-name recognition used to confirm `full_name` candidates.
//!
//! Recognizers are built once at startup and shared read-only across requests.

pub mod gazetteer;
pub mod http;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

pub use gazetteer::GazetteerRecognizer;
pub use http::HttpNameRecognizer;

#[derive(Debug, Error)]
pub enum NerError {
    #[error("NER service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("NER service returned status {0}")]
    Status(u16),

    #[error("could not decode NER response: {0}")]
    Decode(String),

    #[error("failed to set up recognizer: {0}")]
    Setup(String),
}

/// Statistical named-entity pass over the original text.
#[async_trait]
pub trait PersonNameRecognizer: Send + Sync {
    /// Literal strings tagged as person names in `text`.
    async fn recognize_person_names(&self, text: &str) -> Result<HashSet<String>, NerError>;

    fn name(&self) -> &str;
}
