use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use email_pii_api::api::config::ApiConfig;
use email_pii_api::api::{build_pipeline, start_server};
use email_pii_api::utils::logger::init_logger;

/// Email classification API with PII masking
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host address to bind to, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ApiConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    init_logger(&config.log_dir)?;

    // Patterns and collaborators are built once and shared by every worker
    let pipeline = build_pipeline(&config)?;

    start_server(config, pipeline).await?;

    Ok(())
}
