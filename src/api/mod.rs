pub mod config;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod workers;


use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::classifier::HttpEmailClassifier;
use crate::ner::{GazetteerRecognizer, HttpNameRecognizer, PersonNameRecognizer};
use crate::pii::{PatternSet, PiiDetector};
use self::config::{ApiConfig, NerBackend};
use self::handlers::{classify_handler, health_check, StartedAt};
use self::models::{ClassifyJob, ErrorResponse};
use self::processor::EmailPipeline;
use self::workers::start_workers;

/// Builds the detection and classification services from configuration.
///
/// Patterns are compiled and collaborators are constructed here, once; any
/// failure is fatal.
pub fn build_pipeline(config: &ApiConfig) -> Result<EmailPipeline> {
    let patterns = PatternSet::with_extra(&config.extra_patterns).context("invalid PII patterns")?;

    let recognizer: Arc<dyn PersonNameRecognizer> = match config.ner.backend {
        NerBackend::Http => Arc::new(HttpNameRecognizer::new(
            &config.ner.url,
            Duration::from_secs(config.ner.timeout_secs),
        )?),
        NerBackend::Gazetteer => {
            let path = config
                .ner
                .names_file
                .as_deref()
                .context("ner.names_file is required for the gazetteer backend")?;
            Arc::new(GazetteerRecognizer::from_file(path)?)
        }
    };
    info!("Using {} name recognizer", recognizer.name());

    let classifier = HttpEmailClassifier::new(
        &config.classifier.url,
        Duration::from_secs(config.classifier.timeout_secs),
        config.classifier.max_input_chars,
    )?;

    Ok(EmailPipeline::new(
        PiiDetector::new(Arc::new(patterns), recognizer),
        Arc::new(classifier),
    ))
}

/// Rejects malformed JSON bodies with the standard error shape
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {}", err);
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse::new(message)),
    )
    .into()
}

/// Registers routes; shared by the server and tests
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(web::resource("/classify").route(web::post().to(classify_handler)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}

/// Starts the API server with the specified configuration
///
/// Creates the job queue, spawns the workers, and serves until shutdown.
#[instrument(skip_all, fields(host = %config.host, port = config.port))]
pub async fn start_server(config: ApiConfig, pipeline: EmailPipeline) -> Result<()> {
    info!("Starting email classification API on {}:{}", config.host, config.port);

    let (job_tx, job_rx) = mpsc::channel::<ClassifyJob>(config.queue_size);
    start_workers(job_rx, Arc::new(pipeline), config.workers);

    let job_tx_data = web::Data::new(job_tx);
    let config_data = web::Data::new(config.clone());
    let started_data = web::Data::new(StartedAt(Instant::now()));

    let server_result = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(job_tx_data.clone())
            .app_data(started_data.clone())
            .configure(configure_routes)
    })
    .bind((config.host.as_str(), config.port))
    .map_err(|e| {
        error!("Failed to bind to {}:{}: {}", config.host, config.port, e);
        e
    })?
    .run()
    .await;

    if let Err(e) = server_result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
