//! In-memory job queue implementation.
//!
//! Jobs are handed to local worker tasks over a channel. They are lost on
//! process restart, which is acceptable for the fire-and-forget work queued
//! here (attachment purges are idempotent and re-derivable).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use quill_core::ports::{Job, JobHandler, JobQueue, JobQueueError, JobResult, QueueStats};

/// In-memory job queue configuration.
#[derive(Debug, Clone)]
pub struct InMemoryJobQueueConfig {
    /// Maximum queue size.
    pub max_size: usize,
    /// Number of worker tasks.
    pub workers: usize,
}

impl Default for InMemoryJobQueueConfig {
    fn default() -> Self {
        Self {
            max_size: 1024,
            workers: 2,
        }
    }
}

/// In-memory job queue.
pub struct InMemoryJobQueue {
    stats: Arc<JobStats>,
    config: InMemoryJobQueueConfig,
    job_sender: mpsc::Sender<Job>,
    job_receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
}

#[derive(Default)]
struct JobStats {
    pending: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl InMemoryJobQueue {
    pub fn new(config: InMemoryJobQueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.max_size.max(16));

        Self {
            stats: Arc::new(JobStats::default()),
            config,
            job_sender: tx,
            job_receiver: Arc::new(Mutex::new(rx)),
        }
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new(InMemoryJobQueueConfig::default())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError> {
        if self.stats.pending.load(Ordering::Relaxed) >= self.config.max_size {
            return Err(JobQueueError::QueueFull);
        }

        self.stats.pending.fetch_add(1, Ordering::Relaxed);

        self.job_sender
            .send(job)
            .await
            .map_err(|e| JobQueueError::EnqueueError(e.to_string()))?;

        tracing::debug!(
            pending = self.stats.pending.load(Ordering::Relaxed),
            "Job enqueued"
        );

        Ok(())
    }

    async fn start_worker(&self, handler: JobHandler) -> Result<(), JobQueueError> {
        let handler: Arc<JobHandler> = Arc::new(handler);

        for worker_id in 0..self.config.workers {
            let handler = handler.clone();
            let receiver = self.job_receiver.clone();
            let stats = self.stats.clone();
            let sender = self.job_sender.clone();

            tokio::spawn(async move {
                tracing::info!(worker = worker_id, "Job worker started");

                loop {
                    let job = {
                        let mut rx = receiver.lock().await;
                        rx.recv().await
                    };

                    let Some(mut job) = job else {
                        tracing::info!(worker = worker_id, "Job worker shutting down");
                        break;
                    };

                    stats.pending.fetch_sub(1, Ordering::Relaxed);
                    stats.processing.fetch_add(1, Ordering::Relaxed);

                    tracing::debug!(
                        worker = worker_id,
                        job_id = %job.id,
                        job_type = %job.job_type,
                        "Processing job"
                    );

                    job.attempts += 1;
                    let result = (*handler)(job.clone()).await;

                    stats.processing.fetch_sub(1, Ordering::Relaxed);

                    match result {
                        JobResult::Success => {
                            stats.completed.fetch_add(1, Ordering::Relaxed);
                        }
                        JobResult::Retry(reason) => {
                            if job.attempts < job.max_attempts {
                                tracing::warn!(
                                    job_id = %job.id,
                                    attempt = job.attempts,
                                    max_attempts = job.max_attempts,
                                    reason = %reason,
                                    "Job failed, will retry"
                                );
                                stats.pending.fetch_add(1, Ordering::Relaxed);

                                // Back off before re-enqueueing so a failing
                                // job does not spin the worker.
                                let sender = sender.clone();
                                tokio::spawn(async move {
                                    tokio::time::sleep(Duration::from_millis(
                                        100 * job.attempts as u64,
                                    ))
                                    .await;
                                    if sender.send(job).await.is_err() {
                                        tracing::error!("Failed to re-enqueue job for retry");
                                    }
                                });
                            } else {
                                stats.failed.fetch_add(1, Ordering::Relaxed);
                                tracing::error!(
                                    job_id = %job.id,
                                    reason = %reason,
                                    "Job failed after max retries"
                                );
                            }
                        }
                        JobResult::Failed(reason) => {
                            stats.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::error!(job_id = %job.id, reason = %reason, "Job failed permanently");
                        }
                    }
                }
            });
        }

        Ok(())
    }

    async fn stats(&self) -> Result<QueueStats, JobQueueError> {
        Ok(QueueStats {
            pending: self.stats.pending.load(Ordering::Relaxed),
            processing: self.stats.processing.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn worker_processes_enqueued_jobs() {
        let queue = InMemoryJobQueue::default();
        let (tx, mut rx) = mpsc::channel::<String>(4);

        queue
            .start_worker(Box::new(move |job| {
                let tx = tx.clone();
                Box::pin(async move {
                    tx.send(job.job_type).await.ok();
                    JobResult::Success
                })
            }))
            .await
            .unwrap();

        queue
            .enqueue(Job::new("purge_attachment", serde_json::json!({"key": "k1"})))
            .await
            .unwrap();

        let processed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("worker did not pick up the job");
        assert_eq!(processed.as_deref(), Some("purge_attachment"));
    }

    #[tokio::test]
    async fn enqueue_rejects_when_full() {
        let queue = InMemoryJobQueue::new(InMemoryJobQueueConfig {
            max_size: 1,
            workers: 0,
        });

        queue
            .enqueue(Job::new("purge_attachment", serde_json::json!({})))
            .await
            .unwrap();

        let err = queue
            .enqueue(Job::new("purge_attachment", serde_json::json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, JobQueueError::QueueFull));
    }
}
