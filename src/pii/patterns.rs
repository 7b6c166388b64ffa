use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

use super::{EntityType, PatternError};

/// How a detector walks the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Leftmost, non-overlapping matches.
    #[default]
    Disjoint,
    /// Restart one character after every match start, so nested runs
    /// beginning inside an earlier match are also reported.
    Overlapping,
}

/// Source form of one detector, as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternSpec {
    pub entity_type: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub mode: ScanMode,
    /// Matches holding fewer ASCII digits than this are discarded
    #[serde(default)]
    pub min_digits: Option<usize>,
}

impl PatternSpec {
    pub fn new(entity_type: &str, patterns: &[&str], mode: ScanMode) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            mode,
            min_digits: None,
        }
    }

    pub fn with_min_digits(mut self, min_digits: usize) -> Self {
        self.min_digits = Some(min_digits);
        self
    }
}

/// A compiled detector: one entity type and its patterns in scan order.
#[derive(Debug, Clone)]
pub struct Detector {
    pub entity_type: EntityType,
    pub patterns: Vec<Regex>,
    pub mode: ScanMode,
    pub min_digits: Option<usize>,
}

impl Detector {
    /// Whether a raw match of this detector is kept as a candidate.
    pub fn accepts(&self, matched: &str) -> bool {
        match self.min_digits {
            Some(min) => matched.bytes().filter(u8::is_ascii_digit).count() >= min,
            None => true,
        }
    }
}

/// Ordered detectors. Order decides scan order, which in turn decides which
/// candidate wins a tie on start position.
#[derive(Debug, Clone)]
pub struct PatternSet {
    detectors: Vec<Detector>,
}

impl PatternSet {
    pub fn compile(specs: &[PatternSpec]) -> Result<Self, PatternError> {
        let mut seen = HashSet::new();
        let mut detectors = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.entity_type.as_str()) {
                return Err(PatternError::Duplicate(spec.entity_type.clone()));
            }
            if spec.patterns.is_empty() {
                return Err(PatternError::Empty(spec.entity_type.clone()));
            }
            let patterns = spec
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|source| PatternError::InvalidRegex {
                        entity_type: spec.entity_type.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            detectors.push(Detector {
                entity_type: EntityType::new(spec.entity_type.clone()),
                patterns,
                mode: spec.mode,
                min_digits: spec.min_digits,
            });
        }

        Ok(Self { detectors })
    }

    /// Built-in detectors followed by `extra`.
    pub fn with_extra(extra: &[PatternSpec]) -> Result<Self, PatternError> {
        let mut specs = builtin_specs();
        specs.extend_from_slice(extra);
        Self::compile(&specs)
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.detectors.iter().map(|d| &d.entity_type)
    }
}

pub fn builtin_specs() -> Vec<PatternSpec> {
    vec![
        // Runs of 2-3 capitalized words
        PatternSpec::new(
            "full_name",
            &[r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){1,2}\b"],
            ScanMode::Overlapping,
        ),
        PatternSpec::new(
            "email",
            &[r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"],
            ScanMode::Disjoint,
        ),
        PatternSpec::new(
            "phone_number",
            &[r"\+?\d{1,3}[-.\s]?\(?\d{1,3}\)?[-.\s]?\d{1,4}[-.\s]?\d{1,4}[-.\s]?\d{1,4}"],
            ScanMode::Disjoint,
        )
        .with_min_digits(7),
        PatternSpec::new(
            "dob",
            &[
                r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
                r"[A-Z][a-z]+\s\d{1,2},\s\d{4}",
            ],
            ScanMode::Disjoint,
        ),
        PatternSpec::new(
            "credit_debit_no",
            &[r"\d{4}[-.\s]?\d{4}[-.\s]?\d{4}[-.\s]?\d{4}"],
            ScanMode::Disjoint,
        ),
        // Any standalone 3-digit number; deliberately broad
        PatternSpec::new("cvv_no", &[r"\b\d{3}\b"], ScanMode::Disjoint),
        PatternSpec::new("expiry_no", &[r"\d{2}/\d{2,4}"], ScanMode::Disjoint),
    ]
}

/// Built-in pattern set, compiled once per process.
pub static DEFAULT_PATTERNS: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::compile(&builtin_specs()).unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let types: Vec<&str> = DEFAULT_PATTERNS.entity_types().map(|t| t.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "full_name",
                "email",
                "phone_number",
                "dob",
                "credit_debit_no",
                "cvv_no",
                "expiry_no"
            ]
        );
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = PatternSet::compile(&[PatternSpec::new("broken", &[r"(\d{3}"], ScanMode::Disjoint)])
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { ref entity_type, .. } if entity_type == "broken"));
    }

    #[test]
    fn test_duplicate_and_empty_types_are_rejected() {
        let dup = PatternSet::with_extra(&[PatternSpec::new("email", &[r"x"], ScanMode::Disjoint)]);
        assert!(matches!(dup, Err(PatternError::Duplicate(_))));

        let empty = PatternSet::compile(&[PatternSpec {
            entity_type: "iban".to_string(),
            patterns: vec![],
            mode: ScanMode::Disjoint,
            min_digits: None,
        }]);
        assert!(matches!(empty, Err(PatternError::Empty(_))));
    }

    #[test]
    fn test_extra_types_scan_after_builtins() {
        let set = PatternSet::with_extra(&[PatternSpec::new(
            "ticket_id",
            &[r"TCK-\d{6}"],
            ScanMode::Disjoint,
        )])
        .unwrap();
        assert_eq!(set.detectors().last().unwrap().entity_type.as_str(), "ticket_id");
        assert_eq!(set.detectors().len(), 8);
    }

    #[test]
    fn test_phone_detector_requires_seven_digits() {
        let phone = DEFAULT_PATTERNS
            .detectors()
            .iter()
            .find(|d| d.entity_type == EntityType::PHONE_NUMBER)
            .unwrap();
        assert!(!phone.accepts("12345"));
        assert!(!phone.accepts("123-456"));
        assert!(phone.accepts("555-1234"));
        assert!(phone.accepts("+1 (415) 555-0132"));
    }
}
