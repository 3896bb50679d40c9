pub mod api;
pub mod canonical;
pub mod config;
pub mod error;
pub mod index;
pub mod report;
pub mod spreadsheet;
pub mod submitter;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use api::EventsApiClient;
pub use canonical::{Health, ImportRow, ImportStats, RowIssue, RowValidator, ValidationOutcome};
pub use config::{ApiConfig, SubmitConfig};
pub use error::{ImporterError, Result};
pub use index::{ExistingRecordIndex, IndexSource};
pub use report::ImportReport;
pub use submitter::{CancelFlag, ImportBatchJob, JobItem, Progress, RetryPolicy, SubmitSummary};
pub use traits::AttendeeApi;
