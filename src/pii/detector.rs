use std::sync::Arc;
use tracing::{debug, instrument};

use super::masker::mask;
use super::patterns::{PatternSet, DEFAULT_PATTERNS};
use super::resolver::resolve_overlaps;
use super::scanner::scan;
use super::validator::validate_names;
use super::{MaskedEmail, PiiError, ResolvedEntity};
use crate::ner::PersonNameRecognizer;

/// Detects and masks PII in one email body at a time.
///
/// Holds only read-only state, so a single instance is shared across all
/// concurrently served requests.
#[derive(Clone)]
pub struct PiiDetector {
    patterns: Arc<PatternSet>,
    recognizer: Arc<dyn PersonNameRecognizer>,
}

impl PiiDetector {
    pub fn new(patterns: Arc<PatternSet>, recognizer: Arc<dyn PersonNameRecognizer>) -> Self {
        Self { patterns, recognizer }
    }

    /// Detector over the built-in pattern set.
    pub fn with_default_patterns(recognizer: Arc<dyn PersonNameRecognizer>) -> Self {
        Self::new(Arc::new(DEFAULT_PATTERNS.clone()), recognizer)
    }

    /// Non-overlapping entities sorted by start, as byte spans.
    ///
    /// Names are checked against the recognizer before overlaps are resolved,
    /// so an unconfirmed capitalized run cannot shadow a confirmed name that
    /// starts inside it.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn detect(&self, text: &str) -> Result<Vec<ResolvedEntity>, PiiError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = scan(text, &self.patterns);
        debug!("Scanner produced {} candidate(s)", candidates.len());

        let validated = validate_names(text, candidates, self.recognizer.as_ref()).await?;
        Ok(resolve_overlaps(validated))
    }

    pub async fn detect_and_mask(&self, text: &str) -> Result<MaskedEmail, PiiError> {
        let entities = self.detect(text).await?;
        Ok(mask(text, &entities))
    }
}
