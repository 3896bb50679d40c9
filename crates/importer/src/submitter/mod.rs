mod cancel;
mod job;
mod progress;
mod retry;

pub use cancel::CancelFlag;
pub use job::{FailedItem, ImportBatchJob, JobItem, SubmitSummary};
pub use progress::Progress;
pub use retry::{RetryPolicy, with_retry};
