//! Parsing of user-supplied keys before they reach the engine.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key is empty")]
    Empty,
    #[error("Invalid key: {input:?}")]
    Invalid { input: String },
}

/// Parses one base-10 integer key, ignoring surrounding whitespace.
///
/// ```
/// use avl_trace::{parse_key, KeyError};
///
/// assert_eq!(parse_key(" 42 "), Ok(42));
/// assert_eq!(parse_key(""), Err(KeyError::Empty));
/// assert!(parse_key("4x").is_err());
/// ```
pub fn parse_key(input: &str) -> Result<i64, KeyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }
    trimmed.parse().map_err(|_| KeyError::Invalid {
        input: trimmed.to_string(),
    })
}

/// Splits bulk input on commas and whitespace, keeping only the tokens that
/// parse as integers.
///
/// ```
/// use avl_trace::parse_keys;
///
/// assert_eq!(parse_keys("10, 20 30,,x, -5"), vec![10, 20, 30, -5]);
/// ```
pub fn parse_keys(input: &str) -> Vec<i64> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|token| parse_key(token).ok())
        .collect()
}
