use super::normalize::header_key;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Canonical fields an attendee sheet can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    IdentificationType,
    IdentificationNumber,
    Name,
    Phone,
    Email,
    CompanyName,
    AttendanceMode,
}

/// Accepted header spellings per field, already in `header_key` form.
const HEADER_SYNONYMS: &[(ColumnField, &[&str])] = &[
    (
        ColumnField::IdentificationType,
        &[
            "tipo de documento",
            "tipo documento",
            "tipo doc",
            "tipo de identificacion",
            "tipo identificacion",
            "tipo id",
            "identification type",
            "document type",
        ],
    ),
    (
        ColumnField::IdentificationNumber,
        &[
            "numero de documento",
            "numero documento",
            "no documento",
            "nro documento",
            "num documento",
            "documento",
            "documento de identidad",
            "cedula",
            "numero de cedula",
            "identificacion",
            "numero de identificacion",
            "identification number",
            "document number",
        ],
    ),
    (
        ColumnField::Name,
        &[
            "nombre",
            "nombres",
            "nombre completo",
            "nombres y apellidos",
            "nombre y apellido",
            "asistente",
            "name",
            "full name",
        ],
    ),
    (
        ColumnField::Phone,
        &[
            "telefono",
            "celular",
            "movil",
            "telefono celular",
            "numero de telefono",
            "numero de celular",
            "whatsapp",
            "phone",
            "mobile",
        ],
    ),
    (
        ColumnField::Email,
        &[
            "correo",
            "correo electronico",
            "email",
            "e mail",
            "mail",
        ],
    ),
    (
        ColumnField::CompanyName,
        &[
            "empresa",
            "nombre de la empresa",
            "nombre empresa",
            "compania",
            "organizacion",
            "entidad",
            "institucion",
            "company",
            "company name",
            "organization",
        ],
    ),
    (
        ColumnField::AttendanceMode,
        &[
            "asistencia",
            "modalidad",
            "tipo de asistencia",
            "modalidad de asistencia",
            "attendance",
            "attendance mode",
        ],
    ),
];

impl ColumnField {
    pub fn synonyms(&self) -> &'static [&'static str] {
        HEADER_SYNONYMS
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, synonyms)| *synonyms)
            .unwrap_or(&[])
    }

    /// Only name, email and company must be present as columns.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            ColumnField::Name | ColumnField::Email | ColumnField::CompanyName
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnField::IdentificationType => "Tipo de documento",
            ColumnField::IdentificationNumber => "Documento",
            ColumnField::Name => "Nombre",
            ColumnField::Phone => "Teléfono",
            ColumnField::Email => "Correo",
            ColumnField::CompanyName => "Empresa",
            ColumnField::AttendanceMode => "Asistencia",
        }
    }
}

impl fmt::Display for ColumnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column index resolved for each canonical field.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<ColumnField, usize>,
}

impl HeaderMap {
    /// For every field, the first column whose header matches one of its
    /// synonyms wins. Unmatched fields stay unresolved.
    pub fn resolve(headers: &[String]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();

        let columns = HEADER_SYNONYMS
            .iter()
            .filter_map(|(field, synonyms)| {
                keys.iter()
                    .position(|key| synonyms.contains(&key.as_str()))
                    .map(|col| (*field, col))
            })
            .collect();

        Self { columns }
    }

    pub fn column(&self, field: ColumnField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Raw cell for `field`, or an empty string when the column is unresolved
    /// or the row is shorter than the header.
    pub fn cell<'a>(&self, row: &'a [String], field: ColumnField) -> &'a str {
        self.column(field)
            .and_then(|col| row.get(col))
            .map(|cell| cell.as_str())
            .unwrap_or("")
    }

    pub fn missing_required(&self) -> Vec<ColumnField> {
        HEADER_SYNONYMS
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| field.is_required() && self.column(*field).is_none())
            .collect()
    }
}
