use tracing::debug;

use super::{Candidate, EntityType};
use crate::ner::{NerError, PersonNameRecognizer};

/// Drops `full_name` candidates whose exact text the recognizer did not tag
/// as a person. Every other type passes through untouched.
///
/// The recognizer sees the original text and is only consulted when at least
/// one `full_name` candidate exists. Its failures are returned as-is.
pub async fn validate_names(
    text: &str,
    candidates: Vec<Candidate>,
    recognizer: &dyn PersonNameRecognizer,
) -> Result<Vec<Candidate>, NerError> {
    if !candidates.iter().any(|c| c.entity_type == EntityType::FULL_NAME) {
        return Ok(candidates);
    }

    let names = recognizer.recognize_person_names(text).await?;

    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.entity_type != EntityType::FULL_NAME || names.contains(&c.text))
        .collect();

    debug!(
        "Name validation via {} dropped {} candidate(s)",
        recognizer.name(),
        before - kept.len()
    );
    Ok(kept)
}
