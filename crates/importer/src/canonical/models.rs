use super::headers::ColumnField;
use contracts::{AttendanceMode, CreateAttendeeRequest, NormalizedEmail};
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a row cannot be submitted. Rendered with the wording shown to the
/// person reviewing the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIssue {
    MissingName,
    MissingCompany,
    MissingEmail,
    InvalidEmail,
    DuplicateInFile,
    EmailAlreadyRegistered,
    DocumentAlreadyRegistered,
    /// Longer than the backend accepts for that field.
    TooLong(ColumnField),
}

impl RowIssue {
    pub fn message(&self) -> &'static str {
        match self {
            RowIssue::MissingName => "Falta Nombre",
            RowIssue::MissingCompany => "Falta Empresa",
            RowIssue::MissingEmail => "Falta Correo",
            RowIssue::InvalidEmail => "Correo inválido",
            RowIssue::DuplicateInFile => "Correo repetido en el archivo",
            RowIssue::EmailAlreadyRegistered => "Correo ya registrado en el evento",
            RowIssue::DocumentAlreadyRegistered => "Documento ya registrado en el evento",
            RowIssue::TooLong(field) => match field {
                ColumnField::IdentificationType => "Tipo de documento demasiado largo",
                ColumnField::IdentificationNumber => "Documento demasiado largo",
                ColumnField::Name => "Nombre demasiado largo",
                ColumnField::Phone => "Teléfono demasiado largo",
                ColumnField::Email => "Correo demasiado largo",
                ColumnField::CompanyName => "Empresa demasiado larga",
                ColumnField::AttendanceMode => "Asistencia demasiado larga",
            },
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for RowIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// One spreadsheet row after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRow {
    /// Line in the sheet, counting the header as line 1.
    pub row_number: usize,
    pub identification_type: Option<String>,
    pub identification_number: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: NormalizedEmail,
    pub company_name: String,
    pub attendance_mode: Option<AttendanceMode>,
    pub errors: Vec<RowIssue>,
}

impl ImportRow {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issue(&self, issue: RowIssue) -> bool {
        self.errors.contains(&issue)
    }

    pub fn error_messages(&self) -> Vec<&'static str> {
        self.errors.iter().map(RowIssue::message).collect()
    }

    /// Backend payload for this row. Absent optional text is sent as an
    /// empty string; absent attendance mode as null.
    pub fn to_payload(&self, event_id: i64) -> CreateAttendeeRequest {
        CreateAttendeeRequest {
            event: event_id,
            identification_type: self.identification_type.clone().unwrap_or_default(),
            identification_number: self.identification_number.clone().unwrap_or_default(),
            name: self.name.clone(),
            company_name: self.company_name.clone(),
            email: self.email.as_str().to_string(),
            phone: self.phone.clone().unwrap_or_default(),
            attendance: self.attendance_mode,
        }
    }
}

/// Overall state of a parsed file, for the review summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
    Warn,
    Err,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Ok => write!(f, "ok"),
            Health::Warn => write!(f, "warn"),
            Health::Err => write!(f, "err"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    /// Labels of mandatory columns that could not be resolved.
    pub missing_headers: Vec<String>,
    pub in_file_duplicates: usize,
    pub already_registered: usize,
}
