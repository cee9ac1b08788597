//! Configuration options for the codec and the Ion writers.
//!
//! This module provides:
//!
//! - [`CodecOptions`]: main configuration struct (depth limit, duplicate-field policy, indentation)
//! - [`OutputFormat`]: which Ion encoding a document is written in
//! - [`DuplicateFields`]: how repeated struct field names are represented
//!
//! ## Examples
//!
//! ```rust
//! use ion_json::{encode_document_with_options, CodecOptions, OutputFormat, TaggedValue};
//!
//! let options = CodecOptions::pretty().with_indent(4);
//! let text = encode_document_with_options(
//!     &TaggedValue::from(true),
//!     OutputFormat::Pretty,
//!     &options,
//! )
//! .unwrap();
//! assert_eq!(text, b"true");
//! ```

/// Ion encoding used for document output.
///
/// # Examples
///
/// ```rust
/// use ion_json::OutputFormat;
///
/// assert_eq!(OutputFormat::Binary.as_str(), "binary");
/// assert!(OutputFormat::Pretty.is_text());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Ion 1.0 binary
    Binary,
    /// Single-line Ion text
    #[default]
    Text,
    /// Ion text with newlines and indentation
    Pretty,
}

impl OutputFormat {
    /// Returns the name of this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Binary => "binary",
            OutputFormat::Text => "text",
            OutputFormat::Pretty => "pretty",
        }
    }

    /// Returns `true` for the two text formats.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        !matches!(self, OutputFormat::Binary)
    }
}

/// Representation of struct fields whose name repeats.
///
/// With [`KeepFirstPlain`](DuplicateFields::KeepFirstPlain) the first occurrence
/// stays a plain key and later occurrences go into the `"__ion:<name>"` bucket.
/// With [`Bucket`](DuplicateFields::Bucket) the first occurrence is moved into the
/// bucket as soon as a duplicate appears, so the bucket holds every occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DuplicateFields {
    #[default]
    KeepFirstPlain,
    Bucket,
}

/// Configuration shared by the decoder, the encoder and the Ion parsers/writers.
///
/// # Examples
///
/// ```rust
/// use ion_json::{CodecOptions, DuplicateFields};
///
/// let options = CodecOptions::new()
///     .with_max_depth(64)
///     .with_duplicate_fields(DuplicateFields::Bucket);
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Clone, Debug)]
pub struct CodecOptions {
    pub max_depth: usize,
    pub duplicate_fields: DuplicateFields,
    pub indent: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: 256,
            duplicate_fields: DuplicateFields::default(),
            indent: 2,
        }
    }
}

impl CodecOptions {
    /// Creates default options (depth limit 256, first duplicate stays plain, 2-space indent).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::CodecOptions;
    ///
    /// let options = CodecOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert_eq!(options.max_depth, 256);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options tuned for pretty text output.
    #[must_use]
    pub fn pretty() -> Self {
        CodecOptions {
            indent: 2,
            ..Default::default()
        }
    }

    /// Sets the maximum container nesting accepted by readers, writers and the codec.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the duplicate-field policy used when decoding structs.
    #[must_use]
    pub fn with_duplicate_fields(mut self, policy: DuplicateFields) -> Self {
        self.duplicate_fields = policy;
        self
    }

    /// Sets the indentation size for pretty text output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::CodecOptions;
    ///
    /// let options = CodecOptions::pretty().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
