use crate::Result;
use crate::canonical::models::{Health, ImportStats};
use crate::canonical::validator::ValidationOutcome;
use crate::submitter::SubmitSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub email: String,
    pub errors: Vec<&'static str>,
}

/// Written to disk after `check` or `run` so the rejected rows can be fixed
/// and re-imported.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub job_id: Uuid,
    pub event_id: i64,
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub stats: ImportStats,
    pub health: Health,
    pub rejected: Vec<RejectedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmitSummary>,
}

impl ImportReport {
    pub fn new(job_id: Uuid, file_name: impl Into<String>, outcome: &ValidationOutcome) -> Self {
        let rejected = outcome
            .rejected()
            .map(|row| RejectedRow {
                row_number: row.row_number,
                email: row.email.to_string(),
                errors: row.error_messages(),
            })
            .collect();

        Self {
            job_id,
            event_id: outcome.event_id,
            file_name: file_name.into(),
            generated_at: Utc::now(),
            stats: outcome.stats.clone(),
            health: outcome.health,
            rejected,
            submission: None,
        }
    }

    pub fn with_submission(mut self, summary: SubmitSummary) -> Self {
        self.submission = Some(summary);
        self
    }

    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::validator::RowValidator;
    use crate::index::ExistingRecordIndex;
    use crate::spreadsheet::RawSheet;

    fn outcome() -> ValidationOutcome {
        let index = ExistingRecordIndex::empty(7);
        let sheet = RawSheet::new(
            vec!["Nombre".into(), "Correo".into(), "Empresa".into()],
            vec![
                vec!["Ana".into(), "ana@x.com".into(), "Acme".into()],
                vec!["Bea".into(), "bea@".into(), "".into()],
            ],
        );
        RowValidator::new(&index).validate_sheet(&sheet)
    }

    #[test]
    fn test_report_lists_rejected_rows() {
        let report = ImportReport::new(Uuid::new_v4(), "asistentes.xlsx", &outcome());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["event_id"], 7);
        assert_eq!(json["health"], "warn");
        assert_eq!(json["stats"]["fail"], 1);
        assert_eq!(json["rejected"][0]["row_number"], 3);
        assert_eq!(json["rejected"][0]["email"], "bea@");
        assert_eq!(
            json["rejected"][0]["errors"],
            serde_json::json!(["Falta Empresa", "Correo inválido"])
        );
        assert!(json.get("submission").is_none());
    }

    #[tokio::test]
    async fn test_write_to_disk() {
        let job_id = Uuid::new_v4();
        let summary = SubmitSummary {
            job_id,
            total: 1,
            succeeded: 1,
            failed: 0,
            cancelled: false,
            not_started: 0,
            failures: Vec::new(),
        };
        let report = ImportReport::new(job_id, "asistentes.csv", &outcome()).with_submission(summary);

        let path = std::env::temp_dir().join(format!("import-report-{job_id}.json"));
        report.write_to(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(written["submission"]["succeeded"], 1);
        assert_eq!(written["file_name"], "asistentes.csv");

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
