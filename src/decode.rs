//! Ion to tagged JSON.
//!
//! The [`Decoder`] pulls one value from an [`IonReader`] and builds the
//! matching [`TaggedValue`], recursing into containers.

use crate::element::check_depth;
use crate::tags::{escape_field, is_reserved_field};
use crate::{CodecOptions, DuplicateFields, IonReader, IonType, Result, TaggedMap, TaggedValue};

/// Converts the current value of a reader into a [`TaggedValue`].
///
/// # Examples
///
/// ```rust
/// use ion_json::{CodecOptions, Decoder, Element, ElementReader, IonReader, IonValue};
///
/// let elements = vec![Element::new(IonValue::Symbol("abc".to_string()))];
/// let mut reader = ElementReader::new(&elements);
/// reader.next().unwrap();
///
/// let value = Decoder::new(CodecOptions::default()).decode(&mut reader).unwrap();
/// assert_eq!(value.to_json().to_string(), r#"{"__ion":"symbol","value":"abc"}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    options: CodecOptions,
    depth: usize,
}

impl Decoder {
    #[must_use]
    pub fn new(options: CodecOptions) -> Self {
        Decoder { options, depth: 0 }
    }

    /// Decodes the value the reader is positioned on, including its annotations.
    ///
    /// The reader must have been advanced with `next`. On return it is still
    /// positioned at the same depth, on the decoded value.
    ///
    /// # Errors
    ///
    /// Propagates reader errors and fails with
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded) for input
    /// nested deeper than [`CodecOptions::max_depth`].
    pub fn decode<R>(&mut self, reader: &mut R) -> Result<TaggedValue>
    where
        R: IonReader + ?Sized,
    {
        let annotations = reader.annotations().to_vec();
        let value = self.decode_unannotated(reader)?;
        Ok(TaggedValue::annotated(annotations, value))
    }

    fn decode_unannotated<R>(&mut self, reader: &mut R) -> Result<TaggedValue>
    where
        R: IonReader + ?Sized,
    {
        let ion_type = reader
            .ion_type()
            .ok_or_else(|| crate::Error::malformed("reader is not positioned on a value"))?;

        if reader.is_null() {
            return Ok(match ion_type {
                IonType::Null => TaggedValue::Null,
                other => TaggedValue::TypedNull(other),
            });
        }

        Ok(match ion_type {
            IonType::Null => TaggedValue::Null,
            IonType::Bool => TaggedValue::Bool(reader.read_bool()?),
            IonType::Int => TaggedValue::Int(reader.read_int()?),
            IonType::Float => TaggedValue::from_f64(reader.read_f64()?),
            IonType::Decimal => TaggedValue::Decimal(reader.read_decimal()?),
            IonType::Timestamp => TaggedValue::Timestamp(reader.read_timestamp()?),
            IonType::Symbol => TaggedValue::Symbol(reader.read_text()?.to_string()),
            IonType::String => TaggedValue::String(reader.read_text()?.to_string()),
            IonType::Blob => TaggedValue::Blob(reader.read_bytes()?.to_vec()),
            IonType::Clob => TaggedValue::Clob(reader.read_bytes()?.to_vec()),
            IonType::List => TaggedValue::Array(self.decode_sequence(reader)?),
            IonType::Sexp => TaggedValue::Sexp(self.decode_sequence(reader)?),
            IonType::Struct => TaggedValue::Object(self.decode_struct(reader)?),
        })
    }

    /// Runs `body` inside the current container, keeping the depth counter
    /// balanced even when `body` fails.
    fn nested<R, T, F>(&mut self, reader: &mut R, body: F) -> Result<T>
    where
        R: IonReader + ?Sized,
        F: FnOnce(&mut Self, &mut R) -> Result<T>,
    {
        check_depth(self.depth + 1, self.options.max_depth)?;
        reader.step_in()?;
        self.depth += 1;
        let result = body(self, reader);
        self.depth -= 1;
        let value = result?;
        reader.step_out()?;
        Ok(value)
    }

    fn decode_sequence<R>(&mut self, reader: &mut R) -> Result<Vec<TaggedValue>>
    where
        R: IonReader + ?Sized,
    {
        self.nested(reader, |decoder, reader| {
            let mut items = Vec::new();
            while reader.next()?.is_some() {
                items.push(decoder.decode(reader)?);
            }
            Ok(items)
        })
    }

    fn decode_struct<R>(&mut self, reader: &mut R) -> Result<TaggedMap>
    where
        R: IonReader + ?Sized,
    {
        let policy = self.options.duplicate_fields;
        self.nested(reader, |decoder, reader| {
            let mut map = TaggedMap::new();
            while reader.next()?.is_some() {
                let name = reader.field_name()?.to_string();
                let value = decoder.decode(reader)?;
                assign_field(&mut map, name, value, policy);
            }
            Ok(map)
        })
    }
}

/// Places a decoded field into the struct map.
///
/// Repeated names and names that collide with the tag vocabulary go to the
/// escaped bucket `"__ion:<name>"`. Under [`DuplicateFields::KeepFirstPlain`]
/// the first plain occurrence stays where it is; under
/// [`DuplicateFields::Bucket`] it is moved into the bucket.
pub(crate) fn assign_field(
    map: &mut TaggedMap,
    name: String,
    value: TaggedValue,
    policy: DuplicateFields,
) {
    let escaped = escape_field(&name);
    if let Some(TaggedValue::Array(bucket)) = map.get_mut(&escaped) {
        bucket.push(value);
        return;
    }

    if is_reserved_field(&name) || map.contains_key(&name) {
        let mut bucket = Vec::with_capacity(2);
        if policy == DuplicateFields::Bucket {
            if let Some(first) = map.shift_remove(&name) {
                bucket.push(first);
            }
        }
        bucket.push(value);
        map.insert(escaped, TaggedValue::Array(bucket));
    } else {
        map.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Element, ElementReader, Error, IonValue};
    use serde_json::json;

    fn field(name: &str, value: IonValue) -> (String, Element) {
        (name.to_string(), Element::new(value))
    }

    fn decode_one(element: Element, options: CodecOptions) -> Result<TaggedValue> {
        let elements = vec![element];
        let mut reader = ElementReader::new(&elements);
        reader.next()?;
        Decoder::new(options).decode(&mut reader)
    }

    fn duplicate_struct() -> Element {
        Element::new(IonValue::Struct(vec![
            field("a", IonValue::Bool(true)),
            field("b", IonValue::Bool(false)),
            field("a", IonValue::Symbol("x".to_string())),
            field("a", IonValue::Null(IonType::Null)),
        ]))
    }

    #[test]
    fn test_duplicates_keep_first_plain() {
        let value = decode_one(duplicate_struct(), CodecOptions::default()).unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "a": true,
                "b": false,
                "__ion:a": [{"__ion": "symbol", "value": "x"}, null]
            })
        );
    }

    #[test]
    fn test_duplicates_bucket_policy() {
        let options = CodecOptions::new().with_duplicate_fields(DuplicateFields::Bucket);
        let value = decode_one(duplicate_struct(), options).unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "b": false,
                "__ion:a": [true, {"__ion": "symbol", "value": "x"}, null]
            })
        );
    }

    #[test]
    fn test_reserved_names_are_escaped() {
        let element = Element::new(IonValue::Struct(vec![
            field("__ion", IonValue::Symbol("foo".to_string())),
            field("__ion:b", IonValue::Bool(true)),
        ]));
        let value = decode_one(element, CodecOptions::default()).unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "__ion:__ion": [{"__ion": "symbol", "value": "foo"}],
                "__ion:__ion:b": [true]
            })
        );
    }

    #[test]
    fn test_typed_nulls_and_annotations() {
        let element = Element::new(IonValue::Null(IonType::Decimal))
            .with_annotations(vec!["a".to_string(), "b".to_string()]);
        let value = decode_one(element, CodecOptions::default()).unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "__ion": "annotation",
                "annotations": ["a", "b"],
                "value": {"__ion": "null", "value": "decimal"}
            })
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut element = Element::new(IonValue::Int(1.into()));
        for _ in 0..5 {
            element = Element::new(IonValue::List(vec![element]));
        }
        let options = CodecOptions::new().with_max_depth(4);
        assert_eq!(
            decode_one(element.clone(), options),
            Err(Error::depth_limit(4))
        );
        assert!(decode_one(element, CodecOptions::new().with_max_depth(5)).is_ok());
    }

    #[test]
    fn test_depth_is_restored_after_an_error() {
        let mut deep = Element::new(IonValue::Int(1.into()));
        for _ in 0..3 {
            deep = Element::new(IonValue::Sexp(vec![deep]));
        }
        let mut shallow = Element::new(IonValue::Int(2.into()));
        for _ in 0..2 {
            shallow = Element::new(IonValue::List(vec![shallow]));
        }

        let mut decoder = Decoder::new(CodecOptions::new().with_max_depth(2));
        for _ in 0..3 {
            let elements = vec![deep.clone()];
            let mut reader = ElementReader::new(&elements);
            reader.next().unwrap();
            assert_eq!(decoder.decode(&mut reader), Err(Error::depth_limit(2)));
        }
        let elements = vec![shallow];
        let mut reader = ElementReader::new(&elements);
        reader.next().unwrap();
        let value = decoder.decode(&mut reader).unwrap();
        assert_eq!(
            value,
            TaggedValue::Array(vec![TaggedValue::Array(vec![TaggedValue::from(2)])])
        );
    }
}
