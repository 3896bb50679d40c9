use super::cancel::CancelFlag;
use super::progress::Progress;
use super::retry::{RetryPolicy, with_retry};
use crate::Result;
use crate::config::SubmitConfig;
use crate::traits::AttendeeApi;
use contracts::CreateAttendeeRequest;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// One payload to submit, remembering the sheet line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct JobItem {
    pub row_number: usize,
    pub payload: CreateAttendeeRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    pub row_number: usize,
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitSummary {
    pub job_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// Items never launched because the run was cancelled.
    pub not_started: usize,
    pub failures: Vec<FailedItem>,
}

impl SubmitSummary {
    pub fn any_success(&self) -> bool {
        self.succeeded > 0
    }

    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.failed == 0
    }
}

/// A confirmed submission run.
///
/// Items are sliced into fixed-size batches processed strictly one after
/// another. Within a batch at most `concurrency` create requests are in
/// flight; whenever one settles the next queued item is launched. Each item
/// is retried according to the [`RetryPolicy`] and a failure never stops the
/// run.
pub struct ImportBatchJob {
    id: Uuid,
    items: Vec<JobItem>,
    config: SubmitConfig,
    cancel: CancelFlag,
}

impl ImportBatchJob {
    pub fn new(items: Vec<JobItem>, config: SubmitConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            items,
            config,
            cancel: CancelFlag::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn batch_count(&self) -> usize {
        self.items.len().div_ceil(self.config.batch_size)
    }

    /// Handle for requesting cancellation from outside the run.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Submits every item and reports progress after each settled one. The
    /// job is consumed; its counters end up in the returned summary.
    pub async fn run<F>(self, api: &dyn AttendeeApi, mut on_progress: F) -> SubmitSummary
    where
        F: FnMut(&Progress),
    {
        let batches = self.batch_count();
        let mut progress = Progress::new(self.items.len(), batches);
        let mut failures = Vec::new();

        info!(
            "Job {}: submitting {} attendee(s) in {} batch(es) of up to {} ({} concurrent, {} attempt(s) each)",
            self.id,
            self.items.len(),
            batches,
            self.config.batch_size,
            self.config.concurrency,
            self.config.retry.max_attempts
        );

        for (idx, batch) in self.items.chunks(self.config.batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }

            progress.batch = idx + 1;
            info!("Job {}: batch {}/{}", self.id, idx + 1, batches);

            self.drain_batch(api, batch, &mut progress, &mut failures, &mut on_progress)
                .await;
        }

        let cancelled = self.cancel.is_cancelled() && progress.launched < progress.total;
        let summary = SubmitSummary {
            job_id: self.id,
            total: progress.total,
            succeeded: progress.ok,
            failed: progress.fail,
            cancelled,
            not_started: progress.total - progress.launched,
            failures,
        };

        if cancelled {
            info!(
                "Job {} cancelled: {} created, {} failed, {} not started",
                self.id, summary.succeeded, summary.failed, summary.not_started
            );
        } else {
            info!(
                "Job {} finished: {} created, {} failed",
                self.id, summary.succeeded, summary.failed
            );
        }

        summary
    }

    /// Sliding window over one batch. Returns once every launched item has
    /// settled, either because the batch is exhausted or because the run
    /// was cancelled.
    async fn drain_batch<F>(
        &self,
        api: &dyn AttendeeApi,
        batch: &[JobItem],
        progress: &mut Progress,
        failures: &mut Vec<FailedItem>,
        on_progress: &mut F,
    ) where
        F: FnMut(&Progress),
    {
        let mut queue = batch.iter();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.config.concurrency && !self.cancel.is_cancelled() {
                let Some(item) = queue.next() else {
                    break;
                };
                in_flight.push(submit_item(api, self.config.retry, item));
                progress.record_launch();
            }

            let Some((item, result)) = in_flight.next().await else {
                break;
            };

            match result {
                Ok(()) => progress.record_settled(true),
                Err(e) => {
                    warn!(
                        "Row {} ({}) failed after retries: {}",
                        item.row_number, item.payload.email, e
                    );
                    failures.push(FailedItem {
                        row_number: item.row_number,
                        email: item.payload.email.clone(),
                        error: e.to_string(),
                    });
                    progress.record_settled(false);
                }
            }

            on_progress(progress);
        }
    }
}

async fn submit_item<'a>(
    api: &'a dyn AttendeeApi,
    policy: RetryPolicy,
    item: &'a JobItem,
) -> (&'a JobItem, Result<()>) {
    let result = with_retry(&policy, &item.payload.email, || {
        api.create_attendee(&item.payload)
    })
    .await;

    (item, result)
}
