use super::headers::{ColumnField, HeaderMap};
use super::models::{Health, ImportRow, ImportStats, RowIssue};
use super::normalize::{
    clean_optional, clean_text, is_valid_email, normalize_email, normalize_identification,
    parse_attendance_mode,
};
use crate::index::ExistingRecordIndex;
use crate::spreadsheet::RawSheet;
use crate::submitter::JobItem;
use crate::{ImporterError, Result};
use contracts::{CreateAttendeeRequest, NormalizedEmail};
use std::collections::HashSet;
use tracing::warn;
use validator::Validate;

/// Turns raw sheet rows into [`ImportRow`]s, checking each one against the
/// rest of the file and against what is already registered for the event.
pub struct RowValidator<'a> {
    index: &'a ExistingRecordIndex,
}

impl<'a> RowValidator<'a> {
    pub fn new(index: &'a ExistingRecordIndex) -> Self {
        Self { index }
    }

    pub fn validate_sheet(&self, sheet: &RawSheet) -> ValidationOutcome {
        self.validate(&sheet.headers, &sheet.rows)
    }

    pub fn validate(&self, headers: &[String], rows: &[Vec<String>]) -> ValidationOutcome {
        let header_map = HeaderMap::resolve(headers);
        let missing = header_map.missing_required();

        let mut stats = ImportStats {
            missing_headers: missing.iter().map(|f| f.label().to_string()).collect(),
            ..ImportStats::default()
        };
        let mut seen_emails: HashSet<NormalizedEmail> = HashSet::new();
        let mut validated = Vec::with_capacity(rows.len());

        for (idx, raw) in rows.iter().enumerate() {
            if raw.iter().all(|cell| clean_text(cell).is_empty()) {
                continue;
            }

            let row = self.validate_row(&header_map, raw, idx + 2, &mut seen_emails, &mut stats);

            stats.total += 1;
            if row.is_ok() {
                stats.ok += 1;
            } else {
                stats.fail += 1;
            }
            validated.push(row);
        }

        let health = if !missing.is_empty() {
            Health::Err
        } else if stats.fail > 0 {
            Health::Warn
        } else {
            Health::Ok
        };

        ValidationOutcome {
            event_id: self.index.event_id(),
            rows: validated,
            stats,
            health,
        }
    }

    fn validate_row(
        &self,
        header_map: &HeaderMap,
        raw: &[String],
        row_number: usize,
        seen_emails: &mut HashSet<NormalizedEmail>,
        stats: &mut ImportStats,
    ) -> ImportRow {
        let name = clean_text(header_map.cell(raw, ColumnField::Name));
        let company_name = clean_text(header_map.cell(raw, ColumnField::CompanyName));
        let email = normalize_email(header_map.cell(raw, ColumnField::Email));
        let identification_number =
            normalize_identification(header_map.cell(raw, ColumnField::IdentificationNumber));

        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push(RowIssue::MissingName);
        }
        if company_name.is_empty() {
            errors.push(RowIssue::MissingCompany);
        }
        if email.is_empty() {
            errors.push(RowIssue::MissingEmail);
        } else {
            if !is_valid_email(&email) {
                errors.push(RowIssue::InvalidEmail);
            }
            if !seen_emails.insert(email.clone()) {
                errors.push(RowIssue::DuplicateInFile);
                stats.in_file_duplicates += 1;
            }
        }

        let mut already_registered = false;
        if !email.is_empty() && self.index.contains_email(&email) {
            errors.push(RowIssue::EmailAlreadyRegistered);
            already_registered = true;
        }
        if let Some(number) = &identification_number {
            if self.index.contains_identification(number) {
                errors.push(RowIssue::DocumentAlreadyRegistered);
                already_registered = true;
            }
        }
        if already_registered {
            stats.already_registered += 1;
        }

        let mut row = ImportRow {
            row_number,
            identification_type: clean_optional(
                header_map.cell(raw, ColumnField::IdentificationType),
            ),
            identification_number,
            name,
            phone: clean_optional(header_map.cell(raw, ColumnField::Phone)),
            email,
            company_name,
            attendance_mode: parse_attendance_mode(
                header_map.cell(raw, ColumnField::AttendanceMode),
            ),
            errors,
        };

        let extra = preflight_issues(&row, self.index.event_id());
        row.errors.extend(extra);
        row
    }
}

/// Payload field names checked by `CreateAttendeeRequest::validate`, in the
/// order their issues are reported.
const PAYLOAD_FIELDS: &[(&str, ColumnField)] = &[
    ("identification_type", ColumnField::IdentificationType),
    ("identification_number", ColumnField::IdentificationNumber),
    ("name", ColumnField::Name),
    ("phone", ColumnField::Phone),
    ("email", ColumnField::Email),
    ("company_name", ColumnField::CompanyName),
];

/// Runs the payload's own validation so that a row with no issues is also a
/// row the submitter will send. Problems already reported by the row rules
/// are not repeated.
fn preflight_issues(row: &ImportRow, event_id: i64) -> Vec<RowIssue> {
    let Err(report) = row.to_payload(event_id).validate() else {
        return Vec::new();
    };
    let failed = report.field_errors();

    PAYLOAD_FIELDS
        .iter()
        .filter(|(name, _)| failed.contains_key(*name))
        .filter_map(|(_, field)| match field {
            ColumnField::Email if row.email.is_empty() => None,
            ColumnField::Email => Some(RowIssue::InvalidEmail),
            ColumnField::Name if row.name.is_empty() => None,
            ColumnField::CompanyName if row.company_name.is_empty() => None,
            field => Some(RowIssue::TooLong(*field)),
        })
        .filter(|issue| !row.errors.contains(issue))
        .collect()
}

/// Validated rows plus the summary shown before submission.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub event_id: i64,
    pub rows: Vec<ImportRow>,
    pub stats: ImportStats,
    pub health: Health,
}

impl ValidationOutcome {
    pub fn submittable(&self) -> impl Iterator<Item = &ImportRow> {
        self.rows.iter().filter(|row| row.is_ok())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ImportRow> {
        self.rows.iter().filter(|row| !row.is_ok())
    }

    /// Payloads for every valid row, in sheet order. Refused outright while
    /// a mandatory column is missing.
    pub fn payloads(&self) -> Result<Vec<CreateAttendeeRequest>> {
        Ok(self
            .job_items()?
            .into_iter()
            .map(|item| item.payload)
            .collect())
    }

    /// Same as [`Self::payloads`], keeping each payload's sheet line.
    pub fn job_items(&self) -> Result<Vec<JobItem>> {
        if !self.stats.missing_headers.is_empty() {
            return Err(ImporterError::MissingHeaders(
                self.stats.missing_headers.clone(),
            ));
        }

        Ok(self
            .submittable()
            .map(|row| JobItem {
                row_number: row.row_number,
                payload: row.to_payload(self.event_id),
            })
            .collect())
    }

    pub fn log_issues(&self) {
        if !self.stats.missing_headers.is_empty() {
            warn!(
                "Missing required column(s): {}",
                self.stats.missing_headers.join(", ")
            );
        }
        for row in self.rejected() {
            warn!(
                "Row {} ({}): {}",
                row.row_number,
                if row.email.is_empty() { "-" } else { row.email.as_str() },
                row.error_messages().join(", ")
            );
        }
    }
}
