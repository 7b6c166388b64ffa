//! Email classification service with PII masking.
//!
//! Incoming email bodies are scanned for personal data, every detected span
//! is replaced by a `[type]` placeholder, and only the masked text is handed
//! to the category classifier.

pub mod api;
pub mod classifier;
pub mod ner;
pub mod pii;
pub mod utils;
