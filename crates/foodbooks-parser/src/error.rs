//! Error types for foodbooks-parser

use thiserror::Error;

/// Raised only by the strict parsers used on user input. The lenient
/// record parsers map bad input to `None` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
}
