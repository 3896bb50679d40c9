use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Failed to read CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("The sheet has no data rows")]
    EmptySheet,

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ImporterError {
    /// Whether another attempt of the same request could succeed. Local
    /// pre-flight failures are deterministic and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ImporterError::RequestError(_)
                | ImporterError::Rejected(_)
                | ImporterError::ParseError(_)
        )
    }
}

impl From<validator::ValidationErrors> for ImporterError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    )
                })
            })
            .collect();

        ImporterError::ValidationError(details.join("; "))
    }
}
