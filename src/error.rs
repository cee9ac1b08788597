//! Error types for Ion/JSON transcoding.
//!
//! This module provides one error enum shared by the codec, the Ion readers and
//! writers, and the JSON view of tagged values.
//!
//! ## Error Categories
//!
//! - **Unrepresentable magnitude**: a numeric field does not fit its target representation
//! - **Malformed input**: corrupt binary framing, unknown type codes, bad tagged payloads
//! - **Encoding mismatch**: a tagged tree whose shape matches no known variant
//! - **Syntax errors**: invalid Ion text with line/column information
//! - **Depth limit**: nesting deeper than [`CodecOptions::max_depth`](crate::CodecOptions)
//!
//! Every error is fatal to the call that produced it; no partial output is returned.
//!
//! ## Examples
//!
//! ```rust
//! use ion_json::{decode_document, Error};
//!
//! let result = decode_document(b"{a: [1, 2");
//! assert!(result.is_err());
//!
//! if let Err(err) = result {
//!     eprintln!("Parse error: {}", err);
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while transcoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A numeric value cannot be constructed in its target representation
    #[error("Magnitude exceeds representable range: {0}")]
    UnrepresentableMagnitude(String),

    /// Corrupt or unsupported input, or misuse of a reader/writer
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A tagged value whose shape matches no recognized variant
    #[error("Encoding mismatch: {0}")]
    EncodingMismatch(String),

    /// Ion text syntax error with detailed context
    #[error("Syntax error at line {line}, column {col}:\n{context}\n{msg}{suggestion}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        context: String,
        suggestion: String,
    },

    /// Unexpected end of Ion text
    #[error(
        "Unexpected end of input at line {line}, column {col}\n{context}\nExpected: {expected}"
    )]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
        context: String,
    },

    /// Nesting deeper than the configured limit
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// JSON text could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: String::new(),
            suggestion: String::new(),
        }
    }

    /// Creates a syntax error with the offending line and an optional suggestion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::Error;
    ///
    /// let err = Error::syntax_with_context(
    ///     1,
    ///     4,
    ///     "expected ':' after field name",
    ///     "{a 1}",
    ///     Some("Did you mean '{a: 1}'?"),
    /// );
    /// assert!(err.to_string().contains("Help:"));
    /// ```
    pub fn syntax_with_context(
        line: usize,
        col: usize,
        msg: &str,
        context: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
            suggestion: suggestion
                .map(|s| format!("\nHelp: {}", s))
                .unwrap_or_default(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, expected: &str, context: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates an error for a number that does not fit its target representation.
    pub fn magnitude<T: fmt::Display>(msg: T) -> Self {
        Error::UnrepresentableMagnitude(msg.to_string())
    }

    /// Creates a malformed-input error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::Error;
    ///
    /// let err = Error::malformed("unknown type code 0xF");
    /// assert!(err.to_string().contains("0xF"));
    /// ```
    pub fn malformed<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedInput(msg.to_string())
    }

    /// Creates an encoding-mismatch error.
    pub fn mismatch<T: fmt::Display>(msg: T) -> Self {
        Error::EncodingMismatch(msg.to_string())
    }

    /// Creates a depth-limit error.
    pub fn depth_limit(limit: usize) -> Self {
        Error::DepthLimitExceeded { limit }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = Error::syntax_with_context(3, 7, "unterminated string", "a: \"abc", None);
        let text = err.to_string();
        assert!(text.contains("line 3, column 7"));
        assert!(text.contains("a: \"abc"));
        assert!(!text.contains("Help:"));
    }

    #[test]
    fn test_kind_constructors() {
        assert!(matches!(
            Error::magnitude("exponent"),
            Error::UnrepresentableMagnitude(_)
        ));
        assert!(matches!(Error::malformed("x"), Error::MalformedInput(_)));
        assert!(matches!(Error::mismatch("x"), Error::EncodingMismatch(_)));
        assert_eq!(Error::custom("bad utf-8"), Error::Custom("bad utf-8".to_string()));
        assert_eq!(
            Error::depth_limit(4).to_string(),
            "Nesting depth exceeds the limit of 4"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(json_err), Error::Json(_)));
    }
}
