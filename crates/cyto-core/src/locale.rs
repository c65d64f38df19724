//! Locale-aware numeric parsing and formatting.
//!
//! The instrument exports write numbers with a comma decimal separator.
//! Parsing is total: a malformed cell degrades to 0.0 rather than failing
//! the whole file.

/// Parses a comma-decimal cell into a number.
///
/// The value is trimmed first; an empty cell yields 0.0. Only the first
/// comma is treated as the decimal separator, so anything with a second
/// comma fails the parse and also yields 0.0.
pub fn parse_locale_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.replacen(',', ".", 1).parse().unwrap_or(0.0)
}

/// Formats a number at the given precision with a comma decimal separator.
pub fn format_locale_number(value: f64, precision: usize) -> String {
    format!("{value:.precision$}").replace('.', ",")
}
