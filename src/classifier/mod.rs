//! Support-ticket categorization of masked email text.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use http::HttpEmailClassifier;

/// Closed set of ticket categories, in model label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Incident,
    Request,
    Problem,
    Change,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Incident,
        Category::Request,
        Category::Problem,
        Category::Change,
    ];

    pub fn from_label_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Incident => "Incident",
            Category::Request => "Request",
            Category::Problem => "Problem",
            Category::Change => "Change",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Softmax probability of `category`, in `[0, 1]`.
    pub confidence: f32,
}

impl Classification {
    /// Picks the highest-scoring label and reports its softmax probability.
    pub fn from_logits(logits: &[f32]) -> Result<Self, ClassifierError> {
        if logits.len() != Category::ALL.len() {
            return Err(ClassifierError::LogitCount {
                expected: Category::ALL.len(),
                actual: logits.len(),
            });
        }
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(ClassifierError::Decode("non-finite logit".to_string()));
        }

        let (best, best_logit) = logits
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, l)| if l > acc.1 { (i, l) } else { acc });

        // Shift by the max for a stable softmax
        let denom: f32 = logits.iter().map(|l| (l - best_logit).exp()).sum();
        let confidence = (1.0 / denom).clamp(0.0, 1.0);

        let category = Category::from_label_id(best).ok_or(ClassifierError::LogitCount {
            expected: Category::ALL.len(),
            actual: logits.len(),
        })?;
        Ok(Self { category, confidence })
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("classifier service returned status {0}")]
    Status(u16),

    #[error("could not decode classifier response: {0}")]
    Decode(String),

    #[error("expected {expected} logits, got {actual}")]
    LogitCount { expected: usize, actual: usize },

    #[error("failed to set up classifier: {0}")]
    Setup(String),
}

/// Sequence-classification model consuming masked email text.
#[async_trait]
pub trait EmailClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}
