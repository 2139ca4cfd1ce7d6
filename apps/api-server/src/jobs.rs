//! Background jobs - deferred attachment purges.
//!
//! Detaching or replacing a cover image only removes the reference from the
//! post; the bytes are deleted later by the purge worker. Purges are
//! idempotent, so a retried job or an already-deleted key is harmless.

use std::sync::Arc;

use quill_core::ports::{AttachmentStore, Job, JobQueue, JobQueueError, JobResult};

/// Job type for deferred cover image purges.
pub const PURGE_ATTACHMENT: &str = "purge_attachment";

/// Build the purge job for a stored attachment key.
pub fn purge_job(key: &str) -> Job {
    Job::new(PURGE_ATTACHMENT, serde_json::json!({ "key": key }))
}

/// Start the background worker that deletes purged attachment bytes.
pub async fn start_purge_worker(
    jobs: Arc<dyn JobQueue>,
    attachments: Arc<dyn AttachmentStore>,
) -> Result<(), JobQueueError> {
    jobs.start_worker(Box::new(move |job| {
        let attachments = attachments.clone();
        Box::pin(async move {
            if job.job_type != PURGE_ATTACHMENT {
                return JobResult::Failed(format!("unknown job type: {}", job.job_type));
            }

            let Some(key) = job.payload.get("key").and_then(|k| k.as_str()) else {
                return JobResult::Failed("purge job missing attachment key".to_string());
            };

            match attachments.delete(key).await {
                Ok(()) => JobResult::Success,
                Err(e) => JobResult::Retry(e.to_string()),
            }
        })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_infra::{InMemoryAttachmentStore, InMemoryJobQueue};
    use std::time::Duration;

    #[tokio::test]
    async fn purge_worker_deletes_the_blob() {
        let jobs: Arc<dyn JobQueue> = Arc::new(InMemoryJobQueue::default());
        let attachments = Arc::new(InMemoryAttachmentStore::new());

        let key = attachments.put(vec![0xAB]).await.unwrap();

        start_purge_worker(jobs.clone(), attachments.clone())
            .await
            .unwrap();
        jobs.enqueue(purge_job(&key)).await.unwrap();

        // The purge is fire-and-forget; poll until the worker has run.
        for _ in 0..50 {
            if attachments.get(&key).await.unwrap().is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("attachment was not purged");
    }
}
