use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::pii::PatternSpec;

/// Default capacity for the job queue
pub const QUEUE_SIZE: usize = 100;

/// Default number of pipeline workers
pub const WORKER_COUNT: usize = 4;

/// Prefix for environment overrides, e.g. `EMAIL_API_PORT=9000` or
/// `EMAIL_API_NER__URL=http://ner:8000/ents`.
pub const ENV_PREFIX: &str = "EMAIL_API";

/// Configuration for the API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Number of workers draining the job queue
    pub workers: usize,

    /// Capacity of the job queue
    pub queue_size: usize,

    /// Timeout for a single classification request, in seconds
    pub request_timeout_secs: u64,

    /// Directory for log files
    pub log_dir: String,

    /// Person-name recognizer settings
    pub ner: NerConfig,

    /// Category classifier settings
    pub classifier: ClassifierConfig,

    /// Additional detectors, scanned after the built-in ones
    pub extra_patterns: Vec<PatternSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NerBackend {
    Http,
    Gazetteer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    pub backend: NerBackend,

    /// Endpoint of the NER service (http backend)
    pub url: String,

    /// Newline-delimited list of names (gazetteer backend)
    pub names_file: Option<String>,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Endpoint of the model server
    pub url: String,

    pub timeout_secs: u64,

    /// Masked text is cut to this many characters before classification
    pub max_input_chars: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: WORKER_COUNT,
            queue_size: QUEUE_SIZE,
            request_timeout_secs: 30,
            log_dir: "logs".to_string(),
            ner: NerConfig::default(),
            classifier: ClassifierConfig::default(),
            extra_patterns: Vec::new(),
        }
    }
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: NerBackend::Http,
            url: "http://127.0.0.1:8001/ents".to_string(),
            names_file: None,
            timeout_secs: 10,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8002/predict".to_string(),
            timeout_secs: 10,
            // 512 model tokens, roughly 4 characters each
            max_input_chars: 2048,
        }
    }
}

impl ApiConfig {
    /// Defaults, then the optional TOML file, then `EMAIL_API_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ApiConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.workers > 0, "workers must be at least 1");
        anyhow::ensure!(self.queue_size > 0, "queue_size must be at least 1");
        anyhow::ensure!(
            self.ner.backend != NerBackend::Gazetteer || self.ner.names_file.is_some(),
            "ner.names_file is required for the gazetteer backend"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
port = 9090
workers = 2

[ner]
backend = "gazetteer"
names_file = "names.txt"

[classifier]
max_input_chars = 100

[[extra_patterns]]
entity_type = "ticket_id"
patterns = ['TCK-\d{{6}}']
"#
        )
        .unwrap();

        let config = ApiConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_size, QUEUE_SIZE);
        assert_eq!(config.ner.backend, NerBackend::Gazetteer);
        assert_eq!(config.ner.names_file.as_deref(), Some("names.txt"));
        assert_eq!(config.classifier.max_input_chars, 100);
        assert_eq!(config.classifier.timeout_secs, 10);
        assert_eq!(config.extra_patterns.len(), 1);
        assert_eq!(config.extra_patterns[0].patterns[0], r"TCK-\d{6}");
    }

    #[test]
    fn test_gazetteer_requires_names_file() {
        let mut config = ApiConfig::default();
        config.ner.backend = NerBackend::Gazetteer;
        assert!(config.validate().is_err());
    }
}
