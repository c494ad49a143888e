//! Error types for conversion operations

use std::fmt;

/// Errors that can occur during a conversion call
///
/// Malformed markdown and malformed HTML are deliberately absent: both
/// directions degrade gracefully instead of failing, so the only fatal
/// conditions are input-level (undecodable bytes, unusable requests).
#[derive(Debug)]
pub enum ConversionError {
    /// Input bytes could not be decoded as text. Aborts the whole batch.
    EncodingError(String),
    /// Invalid request data (empty batch, file the converter cannot handle)
    InvalidInput(String),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            ConversionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConversionError::EncodingError("invalid UTF-8 at byte 12".into());
        assert_eq!(err.to_string(), "Encoding error: invalid UTF-8 at byte 12");

        let err = ConversionError::InvalidInput("no input files".into());
        assert_eq!(err.to_string(), "Invalid input: no input files");
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> =
            Box::new(ConversionError::InvalidInput("x".into()));
        assert!(err.to_string().contains("Invalid input"));
    }
}
