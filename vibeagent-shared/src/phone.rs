//! Phone number normalization
//!
//! Users are keyed by their phone number in a canonical E.164-like form
//! (`+` followed by digits). Every handler that accepts a phone number runs
//! it through [`normalize`] before touching the store, so that
//! `(123) 456-7890`, `123-456-7890`, `11234567890` and `+11234567890` all
//! address the same user.
//!
//! # Rules
//!
//! 1. Strip every non-digit character.
//! 2. 10 digits: assume North America, prefix `+1`.
//! 3. 11 digits starting with `1`: prefix `+`.
//! 4. Anything else: prefix `+` to the digits as given.
//!
//! Empty input, or input with no digits at all, is rejected.
//!
//! # Example
//!
//! ```
//! use vibeagent_shared::phone::normalize;
//!
//! assert_eq!(normalize("(123) 456-7890").unwrap(), "+11234567890");
//! assert_eq!(normalize("+44 20 7123 4567").unwrap(), "+442071234567");
//! assert!(normalize("").is_err());
//! ```

use thiserror::Error;

/// Phone normalization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    /// No input was supplied
    #[error("phone number is empty")]
    Empty,

    /// Input was supplied but contains no digits
    #[error("phone number contains no digits: {0:?}")]
    NoDigits(String),
}

/// Normalizes a raw phone number into its canonical key form.
///
/// The fallback branch is lenient: digit counts other than 10 or 11 are
/// accepted as-is with a leading `+`.
pub fn normalize(raw: &str) -> Result<String, PhoneError> {
    if raw.is_empty() {
        return Err(PhoneError::Empty);
    }

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(PhoneError::NoDigits(raw.to_string()));
    }

    let canonical = match digits.len() {
        10 => format!("+1{digits}"),
        11 if digits.starts_with('1') => format!("+{digits}"),
        _ => format!("+{digits}"),
    };

    Ok(canonical)
}

/// Normalizes an optional phone number, treating `None` as empty input.
pub fn normalize_opt(raw: Option<&str>) -> Result<String, PhoneError> {
    normalize(raw.unwrap_or_default())
}
