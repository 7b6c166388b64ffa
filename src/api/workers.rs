use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn, debug, trace};

use crate::api::models::ClassifyJob;
use crate::api::processor::{process_request, EmailPipeline};

/// Starts worker tasks to process jobs from the queue
///
/// Each worker pulls jobs from the shared queue, runs them through the
/// pipeline and answers on the job's oneshot channel. Workers exit once
/// every sender is dropped.
///
/// # Arguments
/// * `job_rx` - Job receiver channel, shared by all workers
/// * `pipeline` - Shared detection and classification services
/// * `worker_count` - Number of workers to spawn
pub fn start_workers(
    job_rx: mpsc::Receiver<ClassifyJob>,
    pipeline: Arc<EmailPipeline>,
    worker_count: usize,
) {
    // Wrap the job receiver in a mutex so multiple workers can access it
    let job_rx = Arc::new(Mutex::new(job_rx));

    info!("Spawning {} workers", worker_count);

    for worker_id in 0..worker_count {
        let pipeline = pipeline.clone();
        let job_rx = job_rx.clone();

        tokio::spawn(async move {
            debug!("Worker {} started", worker_id);
            loop {
                trace!("Worker {} waiting for job", worker_id);
                let job_opt = { job_rx.lock().await.recv().await };

                match job_opt {
                    Some(job) => {
                        debug!("Worker {} processing request {}", worker_id, job.request_id);
                        let result = process_request(job.request_id, job.request, &pipeline).await;

                        match &result {
                            Ok(_) => debug!("Worker {} completed job successfully", worker_id),
                            Err(e) => warn!("Worker {} job failed: {:#}", worker_id, e),
                        }

                        if job.response_tx.send(result.map_err(|e| format!("{:#}", e))).is_err() {
                            warn!("Worker {} failed to send response - receiver dropped", worker_id);
                        }
                    }
                    None => {
                        info!("Worker {} shutting down - channel closed", worker_id);
                        break;
                    }
                }
            }
        });
    }
}
