use actix_web::{web, HttpResponse, Responder};
use tracing::{info, warn, error, debug, instrument};
use std::time::{Duration, Instant};
use tokio::time::{timeout, sleep};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::api::models::{ClassifyJob, ClassificationRequest, ErrorResponse, HealthStatus};
use crate::api::config::ApiConfig;

/// Attempts to enqueue before answering 429
const MAX_ENQUEUE_ATTEMPTS: u32 = 3;
const ENQUEUE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Process start time, reported by the health endpoint
#[derive(Debug, Clone, Copy)]
pub struct StartedAt(pub Instant);

/// HTTP handler for classification requests
///
/// Submits the request to the worker queue and awaits the result with a
/// timeout. The response carries the masked email, every masked entity with
/// its position in the original email, and the predicted category.
///
/// # Arguments
/// * `request` - JSON request containing the email body
/// * `config` - API configuration
/// * `job_tx` - Job queue sender
///
/// # Returns
/// * HTTP response with the classification or error information
#[instrument(skip(request, config, job_tx), fields(request_id))]
pub async fn classify_handler(
    request: web::Json<ClassificationRequest>,
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<ClassifyJob>>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(request_id));
    info!("Received classification request ({} bytes)", request.email.len());

    let request = request.into_inner();
    let request_timeout = config.request_timeout();
    let mut attempts = 0;

    while attempts < MAX_ENQUEUE_ATTEMPTS {
        let (response_tx, response_rx) = oneshot::channel();

        let job = ClassifyJob {
            request_id,
            request: request.clone(),
            response_tx,
        };

        match job_tx.try_send(job) {
            Ok(_) => {
                debug!("Job enqueued after {} attempt(s)", attempts + 1);
                return match timeout(request_timeout, response_rx).await {
                    Ok(Ok(Ok(response))) => {
                        info!("Classification request completed successfully");
                        HttpResponse::Ok().json(response)
                    },
                    Ok(Ok(Err(e))) => {
                        error!("Classification request failed: {}", e);
                        HttpResponse::InternalServerError()
                            .json(ErrorResponse::new(format!("Error processing email: {}", e)))
                    },
                    Ok(Err(_)) => {
                        error!("Worker channel closed unexpectedly");
                        HttpResponse::InternalServerError()
                            .json(ErrorResponse::new("Error processing email: worker dropped"))
                    },
                    Err(_) => {
                        error!("Request timed out after {:?}", request_timeout);
                        HttpResponse::RequestTimeout().json(ErrorResponse::new("Request timed out."))
                    },
                };
            },
            Err(mpsc::error::TrySendError::Full(_)) => {
                attempts += 1;
                if attempts < MAX_ENQUEUE_ATTEMPTS {
                    warn!("Queue full, retrying (attempt {}/{})", attempts, MAX_ENQUEUE_ATTEMPTS);
                    sleep(ENQUEUE_RETRY_DELAY).await;
                }
            },
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Worker queue has been closed");
                return HttpResponse::ServiceUnavailable()
                    .json(ErrorResponse::new("Service is shutting down or unavailable."));
            }
        }
    }

    warn!("Queue full after {} attempts, rejecting request", MAX_ENQUEUE_ATTEMPTS);
    HttpResponse::TooManyRequests().json(ErrorResponse::new("Server is busy, try again later."))
}

/// Health check endpoint for monitoring service status
#[instrument(skip_all)]
pub async fn health_check(
    started_at: web::Data<StartedAt>,
    job_tx: web::Data<mpsc::Sender<ClassifyJob>>,
) -> impl Responder {
    let status = HealthStatus {
        status: "healthy".to_string(),
        uptime_secs: started_at.0.elapsed().as_secs(),
        queue_available: job_tx.capacity(),
        queue_capacity: job_tx.max_capacity(),
    };
    debug!("Health check: {:?}", status);
    HttpResponse::Ok().json(status)
}
