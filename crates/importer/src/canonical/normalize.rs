use contracts::{AttendanceMode, NormalizedEmail, models::is_invisible};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidateEmail;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const VIRTUAL_KEYWORDS: &[&str] = &[
    "virtual",
    "online",
    "on line",
    "en linea",
    "remot",
    "zoom",
    "teams",
    "streaming",
    "webinar",
];

const PRESENCIAL_KEYWORDS: &[&str] = &[
    "presencial",
    "en sitio",
    "in situ",
    "fisic",
    "in person",
    "onsite",
    "on site",
    "sede",
];

/// Lowercases, folds accented Latin letters to ASCII and collapses runs of
/// whitespace into a single space.
pub fn fold_text(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect();

    collapse_whitespace(&folded)
}

/// Key used to match a header cell against the synonym table. Underscores and
/// hyphens count as spaces and decoration such as `*`, `:` or `.` is dropped.
pub fn header_key(raw: &str) -> String {
    let cleaned: String = fold_text(raw)
        .chars()
        .filter_map(|c| match c {
            '_' | '-' => Some(' '),
            '*' | ':' | '.' | '(' | ')' => None,
            c => Some(c),
        })
        .collect();

    collapse_whitespace(&cleaned)
}

/// Trims a free-text cell and collapses inner whitespace, dropping
/// zero-width characters.
pub fn clean_text(raw: &str) -> String {
    let visible: String = raw
        .chars()
        .filter(|c| c.is_whitespace() || !is_invisible(*c))
        .collect();

    collapse_whitespace(&visible)
}

pub fn clean_optional(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

pub fn normalize_email(raw: &str) -> NormalizedEmail {
    NormalizedEmail::new(raw)
}

/// `local@domain.tld` with no whitespace and exactly one `@`, and accepted
/// by the same email rule the create payload is checked with.
pub fn is_valid_email(email: &NormalizedEmail) -> bool {
    EMAIL_PATTERN.is_match(email.as_str()) && email.as_str().validate_email()
}

/// Identification numbers are compared without separators and case, so
/// `1.020.304-050` and `1020304050` are the same document.
pub fn normalize_identification(raw: &str) -> Option<String> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect();

    if normalized.is_empty() { None } else { Some(normalized) }
}

/// Maps free text such as "Virtual (Zoom)" or "Presencial - sede norte" to an
/// attendance mode. Unrecognized values yield `None`.
pub fn parse_attendance_mode(raw: &str) -> Option<AttendanceMode> {
    let folded = fold_text(raw);
    if folded.is_empty() {
        return None;
    }

    if VIRTUAL_KEYWORDS.iter().any(|k| folded.contains(k)) {
        Some(AttendanceMode::Virtual)
    } else if PRESENCIAL_KEYWORDS.iter().any(|k| folded.contains(k)) {
        Some(AttendanceMode::Presencial)
    } else {
        None
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("  Correo   Electrónico "), "correo electronico");
        assert_eq!(fold_text("COMPAÑÍA"), "compania");
    }

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("Tipo_Documento"), "tipo documento");
        assert_eq!(header_key("Nombre*"), "nombre");
        assert_eq!(header_key("No. Documento:"), "no documento");
        assert_eq!(header_key("E-mail"), "e mail");
        assert_eq!(header_key("numero-documento"), "numero documento");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Ana\u{00A0} María\u{200B} "), "Ana María");
        assert_eq!(clean_optional("   "), None);
        assert_eq!(clean_optional(" 300 123 "), Some("300 123".to_string()));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email(&normalize_email("ana@x.com")));
        assert!(is_valid_email(&normalize_email(" <Ana.Gomez@Sub.Example.co> ")));
        assert!(!is_valid_email(&normalize_email("ana@x")));
        assert!(!is_valid_email(&normalize_email("ana.x.com")));
        assert!(!is_valid_email(&normalize_email("ana@@x.com")));
        assert!(!is_valid_email(&normalize_email("")));
    }

    #[test]
    fn test_email_rejects_what_the_backend_payload_rejects() {
        assert!(!is_valid_email(&normalize_email("ana,perez@x.com")));
        assert!(!is_valid_email(&normalize_email("ana(x)@x.com")));
        assert!(!is_valid_email(&normalize_email("ana@x..com")));
        assert!(is_valid_email(&normalize_email("ana+eventos@x.com")));
    }

    #[test]
    fn test_normalize_identification() {
        assert_eq!(
            normalize_identification(" 1.020.304-050 "),
            Some("1020304050".to_string())
        );
        assert_eq!(normalize_identification("ab 123"), Some("AB123".to_string()));
        assert_eq!(normalize_identification(" - "), None);
    }

    #[test]
    fn test_parse_attendance_mode() {
        assert_eq!(parse_attendance_mode("Virtual"), Some(AttendanceMode::Virtual));
        assert_eq!(parse_attendance_mode("En línea (Zoom)"), Some(AttendanceMode::Virtual));
        assert_eq!(parse_attendance_mode("PRESENCIAL"), Some(AttendanceMode::Presencial));
        assert_eq!(parse_attendance_mode("Físico"), Some(AttendanceMode::Presencial));
        assert_eq!(parse_attendance_mode("tal vez"), None);
        assert_eq!(parse_attendance_mode(""), None);
    }
}
