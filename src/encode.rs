//! Tagged JSON to Ion.
//!
//! The [`Encoder`] walks a [`TaggedValue`] and issues the matching calls on an
//! [`IonWriter`]. Escaped buckets (`"__ion:<name>"`) expand back into one
//! struct field per element, so repeated field names survive the round trip.

use crate::element::check_depth;
use crate::tags::{unescape_field, TAG_KEY};
use crate::{CodecOptions, Error, IonType, IonWriter, Result, TaggedMap, TaggedValue};

/// Writes [`TaggedValue`]s to an [`IonWriter`].
///
/// # Examples
///
/// ```rust
/// use ion_json::{CodecOptions, DocumentWriter, Encoder, OutputFormat, TaggedValue};
///
/// let mut writer = DocumentWriter::new(OutputFormat::Text);
/// Encoder::new(CodecOptions::default())
///     .encode(&TaggedValue::Symbol("abc".to_string()), &mut writer)
///     .unwrap();
/// writer.close().unwrap();
/// assert_eq!(writer.bytes().unwrap(), b"abc");
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    options: CodecOptions,
    depth: usize,
}

impl Encoder {
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        Encoder { options, depth: 0 }
    }

    /// Writes exactly one Ion value, with its annotations.
    ///
    /// # Errors
    ///
    /// - [`Error::EncodingMismatch`] for a plain `"__ion"` struct key or a
    ///   bucket that is not an array.
    /// - [`Error::DepthLimitExceeded`] for values nested deeper than
    ///   [`CodecOptions::max_depth`]. Containers and annotation wrappers placed
    ///   directly inside another wrapper each count as one level.
    /// - Any error raised by the writer.
    pub fn encode<W>(&mut self, value: &TaggedValue, writer: &mut W) -> Result<()>
    where
        W: IonWriter + ?Sized,
    {
        match value {
            TaggedValue::Null => writer.write_null(IonType::Null),
            TaggedValue::Bool(b) => writer.write_bool(*b),
            TaggedValue::Number(n) => writer.write_f64(*n),
            TaggedValue::String(s) => writer.write_string(s),
            TaggedValue::Array(items) => self.encode_sequence(IonType::List, items, writer),
            TaggedValue::Object(map) => self.encode_struct(map, writer),
            TaggedValue::TypedNull(ion_type) => encode_typed_null(*ion_type, writer),
            TaggedValue::Int(i) => writer.write_int(i),
            TaggedValue::Float(special) => writer.write_f64(special.to_f64()),
            TaggedValue::Decimal(d) => writer.write_decimal(d),
            TaggedValue::Timestamp(ts) => writer.write_timestamp(ts),
            TaggedValue::Symbol(s) => writer.write_symbol(s),
            TaggedValue::Blob(bytes) => writer.write_blob(bytes),
            TaggedValue::Clob(bytes) => writer.write_clob(bytes),
            TaggedValue::Sexp(items) => self.encode_sequence(IonType::Sexp, items, writer),
            TaggedValue::Annotated { annotations, value } => {
                writer.set_annotations(annotations)?;
                if matches!(**value, TaggedValue::Annotated { .. }) {
                    self.nested(writer, |encoder, writer| encoder.encode(value, writer))
                } else {
                    self.encode(value, writer)
                }
            }
        }
    }

    /// Runs `body` one level deeper, keeping the depth counter balanced even
    /// when `body` fails.
    fn nested<W, F>(&mut self, writer: &mut W, body: F) -> Result<()>
    where
        W: IonWriter + ?Sized,
        F: FnOnce(&mut Self, &mut W) -> Result<()>,
    {
        check_depth(self.depth + 1, self.options.max_depth)?;
        self.depth += 1;
        let result = body(self, writer);
        self.depth -= 1;
        result
    }

    fn encode_sequence<W>(
        &mut self,
        container: IonType,
        items: &[TaggedValue],
        writer: &mut W,
    ) -> Result<()>
    where
        W: IonWriter + ?Sized,
    {
        self.nested(writer, |encoder, writer| {
            writer.step_in(container)?;
            for item in items {
                encoder.encode(item, writer)?;
            }
            writer.step_out()
        })
    }

    fn encode_struct<W>(&mut self, map: &TaggedMap, writer: &mut W) -> Result<()>
    where
        W: IonWriter + ?Sized,
    {
        self.nested(writer, |encoder, writer| {
            writer.step_in(IonType::Struct)?;
            for (key, value) in map {
                match unescape_field(key) {
                    Some(name) => {
                        let bucket = value.as_array().ok_or_else(|| {
                            Error::mismatch(format!("escaped field {:?} must hold an array", key))
                        })?;
                        for item in bucket {
                            writer.write_field_name(name)?;
                            encoder.encode(item, writer)?;
                        }
                    }
                    None if key == TAG_KEY => {
                        return Err(Error::mismatch(format!(
                            "struct key {:?} must be escaped as a bucket",
                            TAG_KEY
                        )))
                    }
                    None => {
                        writer.write_field_name(key)?;
                        encoder.encode(value, writer)?;
                    }
                }
            }
            writer.step_out()
        })
    }
}

/// Writes `null.<type>`, one arm per declared type.
fn encode_typed_null<W>(ion_type: IonType, writer: &mut W) -> Result<()>
where
    W: IonWriter + ?Sized,
{
    match ion_type {
        IonType::Null => writer.write_null(IonType::Null),
        IonType::Bool => writer.write_null(IonType::Bool),
        IonType::Int => writer.write_null(IonType::Int),
        IonType::Float => writer.write_null(IonType::Float),
        IonType::Decimal => writer.write_null(IonType::Decimal),
        IonType::Timestamp => writer.write_null(IonType::Timestamp),
        IonType::Symbol => writer.write_null(IonType::Symbol),
        IonType::String => writer.write_null(IonType::String),
        IonType::Clob => writer.write_null(IonType::Clob),
        IonType::Blob => writer.write_null(IonType::Blob),
        IonType::List => writer.write_null(IonType::List),
        IonType::Sexp => writer.write_null(IonType::Sexp),
        IonType::Struct => writer.write_null(IonType::Struct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementWriter, IonValue, SpecialFloat};

    fn encode_one(value: &TaggedValue, options: CodecOptions) -> Result<Vec<crate::Element>> {
        let mut writer = ElementWriter::new();
        Encoder::new(options).encode(value, &mut writer)?;
        writer.finish()
    }

    #[test]
    fn test_bucket_expands_to_repeated_fields() {
        let value = TaggedValue::from_json(&serde_json::json!({
            "a": 1.5,
            "__ion:a": [true, null],
            "__ion:__ion": ["x"]
        }))
        .unwrap();
        let elements = encode_one(&value, CodecOptions::default()).unwrap();
        let names: Vec<&str> = match elements[0].value() {
            IonValue::Struct(fields) => fields.iter().map(|(n, _)| n.as_str()).collect(),
            other => panic!("expected struct, got {:?}", other),
        };
        assert_eq!(names, ["a", "a", "a", "__ion"]);
    }

    #[test]
    fn test_plain_tag_key_is_rejected() {
        let mut map = TaggedMap::new();
        map.insert(TAG_KEY.to_string(), TaggedValue::from("x"));
        let err = encode_one(&TaggedValue::Object(map), CodecOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EncodingMismatch(_)));
    }

    #[test]
    fn test_non_array_bucket_is_rejected() {
        let mut map = TaggedMap::new();
        map.insert("__ion:a".to_string(), TaggedValue::from(1));
        let err = encode_one(&TaggedValue::Object(map), CodecOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EncodingMismatch(_)));
    }

    #[test]
    fn test_every_typed_null() {
        for ion_type in IonType::ALL {
            let elements =
                encode_one(&TaggedValue::TypedNull(ion_type), CodecOptions::default()).unwrap();
            assert_eq!(elements[0].value(), &IonValue::Null(ion_type));
        }
    }

    #[test]
    fn test_nested_annotations_concatenate() {
        let value = TaggedValue::annotated(
            vec!["outer".to_string()],
            TaggedValue::annotated(
                vec!["inner".to_string()],
                TaggedValue::Float(SpecialFloat::NegativeZero),
            ),
        );
        let elements = encode_one(&value, CodecOptions::default()).unwrap();
        assert_eq!(elements[0].annotations(), ["outer", "inner"]);
        match elements[0].value() {
            IonValue::Float(f) => assert!(*f == 0.0 && f.is_sign_negative()),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_limit() {
        let mut value = TaggedValue::Null;
        for _ in 0..10 {
            value = TaggedValue::Sexp(vec![value]);
        }
        let err = encode_one(&value, CodecOptions::new().with_max_depth(9)).unwrap_err();
        assert_eq!(err, Error::depth_limit(9));
    }

    #[test]
    fn test_nested_annotations_count_toward_depth() {
        let mut value = TaggedValue::from(1);
        for i in 0..300 {
            value = TaggedValue::annotated(vec![format!("a{}", i % 3)], value);
        }
        assert_eq!(
            encode_one(&value, CodecOptions::default()).unwrap_err(),
            Error::depth_limit(256)
        );

        let single = TaggedValue::annotated(vec!["a".to_string()], TaggedValue::from(1));
        let mut in_lists = single;
        for _ in 0..4 {
            in_lists = TaggedValue::Array(vec![in_lists]);
        }
        assert!(encode_one(&in_lists, CodecOptions::new().with_max_depth(4)).is_ok());
    }

    #[test]
    fn test_depth_is_restored_after_an_error() {
        let mut deep = TaggedValue::from(1);
        for _ in 0..3 {
            deep = TaggedValue::Sexp(vec![deep]);
        }
        let shallow = TaggedValue::Array(vec![TaggedValue::Array(vec![TaggedValue::from(2)])]);

        let mut encoder = Encoder::new(CodecOptions::new().with_max_depth(2));
        for _ in 0..3 {
            let mut writer = ElementWriter::new();
            assert_eq!(encoder.encode(&deep, &mut writer), Err(Error::depth_limit(2)));
        }
        let mut writer = ElementWriter::new();
        encoder.encode(&shallow, &mut writer).unwrap();
        assert_eq!(writer.finish().unwrap()[0].ion_type(), IonType::List);
    }
}
