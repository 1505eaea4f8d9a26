//! Helpers for the document numbers carried on a case.
//!
//! Taxpayer ids are written `000.000.000-00` and filing numbers
//! `00000.000000/0000-00`. Users type them with or without punctuation, so
//! comparisons work on the digits only. None of this is applied by
//! [`Case`](crate::Case) itself, which stores whatever it is given.

/// Number of digits in a taxpayer id.
pub const TAXPAYER_ID_DIGITS: usize = 11;

/// Number of digits in a filing number.
pub const FILING_NUMBER_DIGITS: usize = 17;

/// Strip everything but ASCII digits.
#[must_use]
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Format a taxpayer id as `000.000.000-00`.
///
/// Returns `None` unless the input contains exactly 11 digits.
#[must_use]
pub fn format_taxpayer_id(input: &str) -> Option<String> {
    let d = digits(input);
    (d.len() == TAXPAYER_ID_DIGITS)
        .then(|| format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]))
}

/// Format a filing number as `00000.000000/0000-00`.
///
/// Returns `None` unless the input contains exactly 17 digits.
#[must_use]
pub fn format_filing_number(input: &str) -> Option<String> {
    let d = digits(input);
    (d.len() == FILING_NUMBER_DIGITS)
        .then(|| format!("{}.{}/{}-{}", &d[..5], &d[5..11], &d[11..15], &d[15..]))
}

/// The masked taxpayer id if it is well formed, the input otherwise.
#[must_use]
pub fn display_taxpayer_id(input: &str) -> String {
    format_taxpayer_id(input).unwrap_or_else(|| input.to_string())
}

/// The masked filing number if it is well formed, the input otherwise.
#[must_use]
pub fn display_filing_number(input: &str) -> String {
    format_filing_number(input).unwrap_or_else(|| input.to_string())
}
