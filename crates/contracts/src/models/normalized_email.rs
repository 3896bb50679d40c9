use serde::Serialize;
use std::fmt;

/// A newtype holding an email address in the canonical form used as the
/// dedup key for attendees.
///
/// Spreadsheets exported from other tools routinely carry non-breaking spaces,
/// zero-width joiners or `<...>` wrappers around addresses. All of those are
/// removed and the result is lowercased, so `" <Ana@X.com>\u{200b}"` and
/// `"ana@x.com"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Cleans a raw cell value into its canonical form.
    ///
    /// # Examples
    ///
    /// ```
    /// use contracts::NormalizedEmail;
    ///
    /// let email = NormalizedEmail::new("  <Ana@Example.COM> ");
    /// assert_eq!(email.as_str(), "ana@example.com");
    ///
    /// // Normalizing twice changes nothing
    /// assert_eq!(NormalizedEmail::new(email.as_str()), email);
    /// ```
    pub fn new(raw: &str) -> Self {
        let visible: String = raw.chars().filter(|c| !is_invisible(*c)).collect();
        let unwrapped = visible.trim_start_matches('<').trim_end_matches('>');

        Self(unwrapped.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whitespace (including NBSP) and the zero-width/format characters that
/// survive copy-paste from office documents.
pub fn is_invisible(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{200E}' | '\u{200F}'
                | '\u{2060}' | '\u{FEFF}'
        )
}
