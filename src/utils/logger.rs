use anyhow::Result;
use std::path::Path;
use std::fs;
use chrono::Local;
use tracing::info;
use tracing_subscriber::{FmtSubscriber, EnvFilter};

/// Installs the global tracing subscriber, writing to a timestamped file
/// under `log_dir`. Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logger(log_dir: &str) -> Result<()> {
    if !Path::new(log_dir).exists() {
        fs::create_dir_all(log_dir)?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = format!("{}/email_pii_api_{}.log", log_dir, timestamp);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::fs::File::create(&log_file)?)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Logger initialized, writing to {}", log_file);

    Ok(())
}
