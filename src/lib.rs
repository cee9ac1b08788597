//! # ion_json
//!
//! A lossless bridge between Amazon Ion documents and a tagged JSON form.
//!
//! ## Why tag?
//!
//! Ion is a superset of JSON: it has arbitrary-precision integers, exact
//! decimals, timestamps with precision and offset, symbols, binary blobs,
//! s-expressions, annotations, typed nulls and structs whose field names may
//! repeat. A plain JSON rendering loses all of that. This crate keeps JSON's
//! own values as they are and writes every Ion-only value as an object carrying
//! a reserved `"__ion"` tag, so the original document can be rebuilt exactly.
//!
//! | Ion                       | Tagged JSON                                                  |
//! |---------------------------|--------------------------------------------------------------|
//! | `null.int`                | `{"__ion":"null","value":"int"}`                             |
//! | `12345678901234567890`    | `{"__ion":"int","value":"12345678901234567890"}`             |
//! | `-0e0`, `nan`, `+inf`     | `{"__ion":"float","value":"-0"}` (`"nan"`, `"+inf"`, `"-inf"`) |
//! | `1.50`                    | `{"__ion":"decimal","exp":"-2","coef":"150"}`                |
//! | `2007-02-23T12:14Z`       | `{"__ion":"timestamp","value":"2007-02-23T12:14Z"}`          |
//! | `abc`                     | `{"__ion":"symbol","value":"abc"}`                           |
//! | `{{aGk=}}`                | `{"__ion":"blob","value":"aGk="}`                            |
//! | `(a b)`                   | `{"__ion":"sexp","value":[...]}`                             |
//! | `x::1e0`                  | `{"__ion":"annotation","annotations":["x"],"value":1.0}`     |
//! | `{a:1,a:2}`               | `{"a":{...},"__ion:a":[{...}]}`                              |
//!
//! ## Quick Start
//!
//! ```rust
//! use ion_json::{decode_document, encode_document, to_json_string, OutputFormat};
//!
//! let value = decode_document(b"{name: \"Ion\", tags: [a, b], version: 1.0}").unwrap();
//! assert_eq!(
//!     to_json_string(&value).unwrap(),
//!     r#"{"name":"Ion","tags":[{"__ion":"symbol","value":"a"},{"__ion":"symbol","value":"b"}],"version":{"__ion":"decimal","exp":"-1","coef":"10"}}"#
//! );
//!
//! let text = encode_document(&value, OutputFormat::Text).unwrap();
//! assert_eq!(text, b"{name:\"Ion\",tags:[a,b],version:10d-1}");
//! ```
//!
//! ### Binary documents
//!
//! ```rust
//! use ion_json::{decode_document, encode_document, OutputFormat, TaggedValue};
//!
//! let value = TaggedValue::from_json(&serde_json::json!({"__ion": "int", "value": "2147483646"})).unwrap();
//! let bytes = encode_document(&value, OutputFormat::Binary).unwrap();
//! assert_eq!(bytes, [0xE0, 0x01, 0x00, 0xEA, 0x24, 0x7F, 0xFF, 0xFF, 0xFE]);
//! assert_eq!(decode_document(&bytes).unwrap(), value);
//! ```
//!
//! ### Building values with the `tagged!` macro
//!
//! ```rust
//! use ion_json::{tagged, to_text};
//!
//! let value = tagged!({"id": 7, "ok": true, "scores": [1.5, null]});
//! assert_eq!(to_text(&value).unwrap(), "{id:7,ok:true,scores:[1.5e0,null]}");
//! ```
//!
//! ## Layers
//!
//! - [`TaggedValue`] / [`TaggedMap`]: the JSON-compatible tree and its JSON view.
//! - [`Decoder`] / [`Encoder`]: the conversion, driven through the [`IonReader`]
//!   and [`IonWriter`] traits.
//! - [`Element`]: an owned Ion tree, produced by [`parse_text`] and
//!   [`parse_binary`] and consumed by [`DocumentWriter`].
//! - Document entry points below tie the layers together.
//!
//! ## Errors
//!
//! Every operation returns [`Result`]. The three codec failures are
//! [`Error::UnrepresentableMagnitude`], [`Error::MalformedInput`] and
//! [`Error::EncodingMismatch`]; Ion text errors carry line and column.
//!
//! ## Logging
//!
//! The crate emits `tracing` events at `debug` and `trace` level. It never
//! installs a subscriber.

mod binary;
pub mod binary_reader;
mod binary_writer;
pub mod decimal;
pub mod decode;
pub mod element;
pub mod encode;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod reader;
pub mod tags;
pub mod text_parser;
mod text_writer;
pub mod timestamp;
pub mod value;
pub mod writer;

pub use binary_reader::{is_binary, parse_binary};
pub use decimal::Decimal;
pub use decode::Decoder;
pub use element::{Element, IonType, IonValue};
pub use encode::Encoder;
pub use error::{Error, Result};
pub use map::TaggedMap;
pub use options::{CodecOptions, DuplicateFields, OutputFormat};
pub use reader::{ElementReader, IonReader};
pub use text_parser::parse_text;
pub use timestamp::{Precision, Timestamp};
pub use value::{SpecialFloat, TaggedValue};
pub use writer::{DocumentWriter, ElementWriter, IonWriter};

use std::io;

/// Parses an Ion document, detecting binary input by its version marker.
fn parse_elements(bytes: &[u8], options: &CodecOptions) -> Result<Vec<Element>> {
    if is_binary(bytes) {
        tracing::debug!(len = bytes.len(), "parsing binary ion document");
        parse_binary(bytes, options)
    } else {
        tracing::debug!(len = bytes.len(), "parsing text ion document");
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::malformed(format!("ion text is not valid UTF-8: {}", e)))?;
        parse_text(text, options)
    }
}

/// Decodes the first top-level value of an Ion document (text or binary).
///
/// # Examples
///
/// ```rust
/// use ion_json::decode_document;
///
/// let value = decode_document(b"{__ion: 'foo'}").unwrap();
/// assert_eq!(
///     value.to_json().to_string(),
///     r#"{"__ion:__ion":[{"__ion":"symbol","value":"foo"}]}"#
/// );
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for an empty document, and any parse or
/// decode error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_document(bytes: &[u8]) -> Result<TaggedValue> {
    decode_document_with_options(bytes, &CodecOptions::default())
}

/// Decodes the first top-level value of an Ion document with custom options.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for an empty document, and any parse or
/// decode error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_document_with_options(bytes: &[u8], options: &CodecOptions) -> Result<TaggedValue> {
    let elements = parse_elements(bytes, options)?;
    if elements.len() > 1 {
        tracing::debug!(
            ignored = elements.len() - 1,
            "document has more than one top-level value"
        );
    }
    let mut reader = ElementReader::new(&elements);
    if reader.next()?.is_none() {
        return Err(Error::malformed("ion document contains no values"));
    }
    Decoder::new(options.clone()).decode(&mut reader)
}

/// Decodes every top-level value of an Ion document.
///
/// # Examples
///
/// ```rust
/// use ion_json::{decode_all, CodecOptions, TaggedValue};
///
/// let values = decode_all(b"1 two \"three\"", &CodecOptions::default()).unwrap();
/// assert_eq!(values.len(), 3);
/// assert_eq!(values[2], TaggedValue::from("three"));
/// ```
///
/// # Errors
///
/// Returns any parse or decode error. An empty document yields an empty vector.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_all(bytes: &[u8], options: &CodecOptions) -> Result<Vec<TaggedValue>> {
    let elements = parse_elements(bytes, options)?;
    let mut reader = ElementReader::new(&elements);
    let mut decoder = Decoder::new(options.clone());
    let mut values = Vec::with_capacity(elements.len());
    while reader.next()?.is_some() {
        values.push(decoder.decode(&mut reader)?);
    }
    Ok(values)
}

/// Encodes one value as a complete Ion document.
///
/// # Examples
///
/// ```rust
/// use ion_json::{encode_document, OutputFormat, TaggedValue};
///
/// let bytes = encode_document(&TaggedValue::Symbol("hi".to_string()), OutputFormat::Text).unwrap();
/// assert_eq!(bytes, b"hi");
/// ```
///
/// # Errors
///
/// Returns [`Error::EncodingMismatch`] for values with no Ion counterpart, and
/// any writer error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_document(value: &TaggedValue, format: OutputFormat) -> Result<Vec<u8>> {
    encode_document_with_options(value, format, &CodecOptions::default())
}

/// Encodes one value as a complete Ion document with custom options.
///
/// # Errors
///
/// Returns [`Error::EncodingMismatch`] for values with no Ion counterpart, and
/// any writer error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_document_with_options(
    value: &TaggedValue,
    format: OutputFormat,
    options: &CodecOptions,
) -> Result<Vec<u8>> {
    tracing::debug!(format = format.as_str(), "encoding ion document");
    let mut writer = DocumentWriter::with_options(format, options.clone());
    Encoder::new(options.clone()).encode(value, &mut writer)?;
    writer.close()?;
    writer.into_bytes()
}

fn encode_text(value: &TaggedValue, format: OutputFormat) -> Result<String> {
    let bytes = encode_document(value, format)?;
    String::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))
}

/// Encodes a value as single-line Ion text.
///
/// # Errors
///
/// Same as [`encode_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_text(value: &TaggedValue) -> Result<String> {
    encode_text(value, OutputFormat::Text)
}

/// Encodes a value as indented Ion text.
///
/// # Examples
///
/// ```rust
/// use ion_json::{tagged, to_text_pretty};
///
/// let text = to_text_pretty(&tagged!({"a": [1]})).unwrap();
/// assert_eq!(text, "{\n  a: [\n    1\n  ]\n}");
/// ```
///
/// # Errors
///
/// Same as [`encode_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_text_pretty(value: &TaggedValue) -> Result<String> {
    encode_text(value, OutputFormat::Pretty)
}

/// Encodes a value as an Ion binary document.
///
/// # Errors
///
/// Same as [`encode_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_binary(value: &TaggedValue) -> Result<Vec<u8>> {
    encode_document(value, OutputFormat::Binary)
}

/// Parses tagged JSON text into a [`TaggedValue`].
///
/// # Examples
///
/// ```rust
/// use ion_json::{from_json_str, TaggedValue};
///
/// let value = from_json_str(r#"{"__ion":"float","value":"nan"}"#).unwrap();
/// assert!(matches!(value, TaggedValue::Float(_)));
/// ```
///
/// # Errors
///
/// Returns [`Error::Json`] for invalid JSON and the classification errors of
/// [`TaggedValue::from_json`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_json_str(s: &str) -> Result<TaggedValue> {
    let json: serde_json::Value = serde_json::from_str(s)?;
    TaggedValue::from_json(&json)
}

/// Writes a [`TaggedValue`] as compact JSON text.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string(value: &TaggedValue) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Writes a [`TaggedValue`] as indented JSON text.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string_pretty(value: &TaggedValue) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Decodes the first value of an Ion document read from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use ion_json::{from_reader, TaggedValue};
/// use std::io::Cursor;
///
/// let value = from_reader(Cursor::new(b"true")).unwrap();
/// assert_eq!(value, TaggedValue::Bool(true));
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, and the errors of [`decode_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<TaggedValue>
where
    R: io::Read,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    decode_document(&bytes)
}

/// Encodes a value and writes the document to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use ion_json::{to_writer, OutputFormat, TaggedValue};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &TaggedValue::Null, OutputFormat::Text).unwrap();
/// assert_eq!(buffer, b"null");
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails, and the errors of [`encode_document`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, value: &TaggedValue, format: OutputFormat) -> Result<()>
where
    W: io::Write,
{
    let bytes = encode_document(value, format)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io(&e.to_string()))
}
