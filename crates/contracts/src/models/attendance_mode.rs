use serde::{Deserialize, Serialize};
use std::fmt;

/// How an attendee takes part in an event. Sent to the backend as the
/// `asistencia` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceMode {
    Virtual,
    Presencial,
}

impl AttendanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceMode::Virtual => "VIRTUAL",
            AttendanceMode::Presencial => "PRESENCIAL",
        }
    }
}

impl fmt::Display for AttendanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_uppercase() {
        let json = serde_json::to_string(&AttendanceMode::Presencial).unwrap();
        assert_eq!(json, "\"PRESENCIAL\"");

        let mode: AttendanceMode = serde_json::from_str("\"VIRTUAL\"").unwrap();
        assert_eq!(mode, AttendanceMode::Virtual);
    }
}
