//! PII detection and masking for free-text email bodies.
//!
//! The pipeline runs in four stages, each producing a fresh list:
//!
//! ```text
//! text → scanner → validator (full_name only) → resolver → masker
//! ```
//!
//! Internal spans are UTF-8 byte offsets on char boundaries. Positions handed
//! back to callers in [`MaskedEntity`] are codepoint offsets into the original,
//! unmasked text.

pub mod detector;
pub mod masker;
pub mod offsets;
pub mod patterns;
pub mod resolver;
pub mod scanner;
pub mod validator;


use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

use crate::ner::NerError;

pub use detector::PiiDetector;
pub use masker::mask;
pub use patterns::{PatternSet, PatternSpec, ScanMode, DEFAULT_PATTERNS};
pub use resolver::resolve_overlaps;
pub use scanner::scan;
pub use validator::validate_names;

/// Tag naming the kind of PII a span holds.
///
/// Backed by a string so that new types can be registered through a
/// [`PatternSpec`] without touching the scan logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(Cow<'static, str>);

impl EntityType {
    pub const FULL_NAME: EntityType = EntityType(Cow::Borrowed("full_name"));
    pub const EMAIL: EntityType = EntityType(Cow::Borrowed("email"));
    pub const PHONE_NUMBER: EntityType = EntityType(Cow::Borrowed("phone_number"));
    pub const DOB: EntityType = EntityType(Cow::Borrowed("dob"));
    pub const CREDIT_DEBIT_NO: EntityType = EntityType(Cow::Borrowed("credit_debit_no"));
    pub const CVV_NO: EntityType = EntityType(Cow::Borrowed("cvv_no"));
    pub const EXPIRY_NO: EntityType = EntityType(Cow::Borrowed("expiry_no"));

    pub fn new(name: impl Into<String>) -> Self {
        EntityType(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder token spliced into masked text, e.g. `[email]`.
    pub fn placeholder(&self) -> String {
        format!("[{}]", self.0)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw match produced by the scanner.
///
/// `start..end` is a half-open byte range into the scanned text and
/// `text == input[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub entity_type: EntityType,
    pub text: String,
}

impl Candidate {
    pub fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A candidate that survived overlap resolution. Lists of these are pairwise
/// non-overlapping and sorted by `start`.
pub type ResolvedEntity = Candidate;

/// An entity after masking, positioned in codepoints of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedEntity {
    pub original_start: usize,
    pub original_end: usize,
    pub entity_type: EntityType,
    pub original_text: String,
}

/// Result of masking one email body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedEmail {
    pub masked_text: String,
    /// Ordered by `original_start` ascending.
    pub entities: Vec<MaskedEntity>,
}

/// Raised while compiling a pattern set; fatal at startup.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern for entity type `{entity_type}`: {source}")]
    InvalidRegex {
        entity_type: String,
        #[source]
        source: regex::Error,
    },

    #[error("entity type `{0}` has no patterns")]
    Empty(String),

    #[error("entity type `{0}` is registered more than once")]
    Duplicate(String),
}

/// Per-request failure of the detection pipeline.
#[derive(Debug, Error)]
pub enum PiiError {
    #[error("name validation failed: {0}")]
    NameValidation(#[from] NerError),
}
