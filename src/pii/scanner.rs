use regex::Regex;
use tracing::trace;

use super::patterns::{Detector, PatternSet, ScanMode};
use super::{Candidate, EntityType};

/// Applies every pattern of every detector to `text`.
///
/// Patterns are independent of each other, so the same range may come back
/// several times under different types. Output is in emission order:
/// detector order, then pattern order, then match position.
pub fn scan(text: &str, patterns: &PatternSet) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for detector in patterns.detectors() {
        for regex in &detector.patterns {
            let before = candidates.len();
            match detector.mode {
                ScanMode::Disjoint => scan_disjoint(text, regex, detector, &mut candidates),
                ScanMode::Overlapping => scan_overlapping(text, regex, detector, &mut candidates),
            }
            trace!(
                "Pattern for {} produced {} candidate(s)",
                detector.entity_type,
                candidates.len() - before
            );
        }
    }

    candidates
}

fn scan_disjoint(text: &str, regex: &Regex, detector: &Detector, out: &mut Vec<Candidate>) {
    for m in regex.find_iter(text) {
        if m.start() < m.end() && detector.accepts(m.as_str()) {
            out.push(candidate(&detector.entity_type, m));
        }
    }
}

fn scan_overlapping(text: &str, regex: &Regex, detector: &Detector, out: &mut Vec<Candidate>) {
    let mut from = 0;
    while from <= text.len() {
        let Some(m) = regex.find_at(text, from) else {
            break;
        };
        if m.start() < m.end() && detector.accepts(m.as_str()) {
            out.push(candidate(&detector.entity_type, m));
        }
        // Step past the first char of this match, staying on a char boundary.
        from = match text[m.start()..].chars().next() {
            Some(c) => m.start() + c.len_utf8(),
            None => break,
        };
    }
}

fn candidate(entity_type: &EntityType, m: regex::Match<'_>) -> Candidate {
    Candidate {
        start: m.start(),
        end: m.end(),
        entity_type: entity_type.clone(),
        text: m.as_str().to_string(),
    }
}
