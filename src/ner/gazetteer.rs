use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{NerError, PersonNameRecognizer};

/// Offline recognizer backed by a list of known person names.
///
/// Reports each listed name that occurs in the text on word boundaries.
/// Longer names are tried first so that "Ada Lovelace" beats "Ada".
pub struct GazetteerRecognizer {
    matcher: Option<Regex>,
    size: usize,
}

impl GazetteerRecognizer {
    pub fn new<I, S>(names: I) -> Result<Self, NerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let size = names.len();
        let matcher = if names.is_empty() {
            None
        } else {
            let alternation = names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
            let regex = Regex::new(&format!(r"\b(?:{})\b", alternation))
                .map_err(|e| NerError::Setup(e.to_string()))?;
            Some(regex)
        };

        Ok(Self { matcher, size })
    }

    /// Loads names from a newline-delimited file. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| NerError::Setup(format!("cannot read {}: {}", path.display(), e)))?;
        let recognizer = Self::new(contents.lines().filter(|l| !l.trim_start().starts_with('#')))?;
        info!("Loaded {} name(s) from {}", recognizer.size, path.display());
        Ok(recognizer)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[async_trait]
impl PersonNameRecognizer for GazetteerRecognizer {
    async fn recognize_person_names(&self, text: &str) -> Result<HashSet<String>, NerError> {
        let Some(matcher) = &self.matcher else {
            return Ok(HashSet::new());
        };
        let names: HashSet<String> = matcher.find_iter(text).map(|m| m.as_str().to_string()).collect();
        debug!("Gazetteer matched {} name(s)", names.len());
        Ok(names)
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}
