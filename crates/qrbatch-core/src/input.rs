//! Input file parsing: one identifier per non-blank line.

use std::fmt;
use std::path::Path;

use crate::error::InputError;

/// A validated, non-empty string of ASCII decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `raw` after stripping all whitespace. Returns None unless
    /// the remainder is one or more ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Identifier(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Total order by numeric value; leading zeros do not count, ties fall
    /// back to the raw string so "007" and "7" still have a fixed order.
    pub fn numeric_cmp(&self, other: &Self) -> std::cmp::Ordering {
        let a = self.0.trim_start_matches('0');
        let b = other.0.trim_start_matches('0');
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse file text into identifiers. All-or-nothing: the first invalid line
/// rejects the whole input. A leading UTF-8 byte-order mark is ignored.
pub fn parse_identifiers(text: &str) -> Result<Vec<Identifier>, InputError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut out = Vec::new();
    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match Identifier::parse(line) {
            Some(id) => out.push(id),
            None => {
                return Err(InputError::InvalidLine {
                    line_number: idx + 1,
                    line: line.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Read a UTF-8 file and parse it with [`parse_identifiers`].
pub fn read_identifiers(path: &Path) -> Result<Vec<Identifier>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let ids = parse_identifiers(&text)?;
    tracing::debug!(count = ids.len(), path = %path.display(), "identifiers loaded");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::io::Write;

    fn strs(ids: &[Identifier]) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn trims_and_skips_blank_lines() {
        let ids = parse_identifiers("1\n2\n 3 \n").unwrap();
        assert_eq!(strs(&ids), ["1", "2", "3"]);
    }

    #[test]
    fn strips_internal_whitespace_and_crlf() {
        let ids = parse_identifiers("12 34\r\n\r\n\t5\t6 7\r\n").unwrap();
        assert_eq!(strs(&ids), ["1234", "567"]);
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let ids = parse_identifiers("\u{FEFF}123\r\n456\n").unwrap();
        assert_eq!(strs(&ids), ["123", "456"]);
        let ids = parse_identifiers("\u{FEFF}\n7\n").unwrap();
        assert_eq!(strs(&ids), ["7"]);
    }

    #[test]
    fn keeps_input_order() {
        let ids = parse_identifiers("30\n4\n100\n4").unwrap();
        assert_eq!(strs(&ids), ["30", "4", "100", "4"]);
    }

    #[test]
    fn rejects_non_digit_line_with_quote() {
        let err = parse_identifiers("1\n12a3\n4\n").unwrap_err();
        match &err {
            InputError::InvalidLine { line_number, line } => {
                assert_eq!(*line_number, 2);
                assert_eq!(line, "12a3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("12a3"));
    }

    #[test]
    fn rejects_signs_and_non_ascii_digits() {
        assert!(parse_identifiers("-5").is_err());
        assert!(parse_identifiers("+5").is_err());
        assert!(parse_identifiers("1.5").is_err());
        assert!(parse_identifiers("\u{0661}\u{0662}").is_err());
    }

    #[test]
    fn blank_file_yields_nothing() {
        assert!(parse_identifiers("").unwrap().is_empty());
        assert!(parse_identifiers("\n   \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn numeric_order_not_lexicographic() {
        let a = Identifier::parse("9").unwrap();
        let b = Identifier::parse("10").unwrap();
        let c = Identifier::parse("009").unwrap();
        assert_eq!(a.numeric_cmp(&b), Ordering::Less);
        assert_eq!(b.numeric_cmp(&a), Ordering::Greater);
        assert_eq!(c.numeric_cmp(&b), Ordering::Less);
        assert_ne!(a.numeric_cmp(&c), Ordering::Equal);
        assert_eq!(a.numeric_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn read_identifiers_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"7\n 8\n\n9 \n").unwrap();
        f.flush().unwrap();
        let ids = read_identifiers(f.path()).unwrap();
        assert_eq!(strs(&ids), ["7", "8", "9"]);
    }

    #[test]
    fn read_identifiers_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_identifiers(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }
}
