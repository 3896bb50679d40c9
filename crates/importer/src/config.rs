use crate::submitter::RetryPolicy;
use crate::{ImporterError, Result};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_INDEX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the events backend lives and how long a single request may take.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ImporterError::ConfigError(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ImporterError::ConfigError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tuning of a submission run.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    pub batch_size: usize,
    /// Maximum create requests in flight at once within a batch.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

impl SubmitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImporterError::ConfigError(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ImporterError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ImporterError::ConfigError(
                "max attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
