//! The tagged, JSON-compatible value tree.
//!
//! This module provides [`TaggedValue`], the output of the decoder and the input
//! of the encoder. Each variant corresponds to one JSON shape (see
//! [`tags`](crate::tags) for the vocabulary):
//!
//! - JSON-native values (`Null`, `Bool`, `Number`, `String`, `Array`, `Object`)
//!   are written as-is.
//! - Everything else is written as an object carrying the `"__ion"` tag.
//!
//! ## Converting to and from JSON
//!
//! ```rust
//! use ion_json::TaggedValue;
//! use num_bigint::BigInt;
//!
//! let value = TaggedValue::Int(BigInt::from(2147483647));
//! assert_eq!(value.to_json().to_string(), r#"{"__ion":"int","value":"2147483647"}"#);
//!
//! let back = TaggedValue::from_json(&value.to_json()).unwrap();
//! assert_eq!(back, value);
//! ```
//!
//! `TaggedValue` also implements `Serialize`/`Deserialize` with the same JSON
//! shape, so it can be embedded in any serde data structure.

use crate::tags::{
    unescape_field, ANNOTATIONS_KEY, COEFFICIENT_KEY, EXPONENT_KEY, TAG_ANNOTATION,
    TAG_BLOB, TAG_CLOB, TAG_DECIMAL, TAG_FLOAT, TAG_INT, TAG_KEY, TAG_NULL, TAG_SEXP, TAG_SYMBOL,
    TAG_TIMESTAMP, VALUE_KEY,
};
use crate::{Decimal, Error, IonType, Result, TaggedMap, Timestamp};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_bigint::BigInt;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Float values a JSON number literal cannot express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialFloat {
    Nan,
    PositiveInfinity,
    NegativeInfinity,
    NegativeZero,
}

impl SpecialFloat {
    /// Returns the tagged spelling: `nan`, `+inf`, `-inf` or `-0`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpecialFloat::Nan => "nan",
            SpecialFloat::PositiveInfinity => "+inf",
            SpecialFloat::NegativeInfinity => "-inf",
            SpecialFloat::NegativeZero => "-0",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<SpecialFloat> {
        match name {
            "nan" => Some(SpecialFloat::Nan),
            "+inf" => Some(SpecialFloat::PositiveInfinity),
            "-inf" => Some(SpecialFloat::NegativeInfinity),
            "-0" => Some(SpecialFloat::NegativeZero),
            _ => None,
        }
    }

    /// Classifies a float, returning `None` for ordinary finite values (including `+0`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::SpecialFloat;
    ///
    /// assert_eq!(SpecialFloat::classify(-0.0), Some(SpecialFloat::NegativeZero));
    /// assert_eq!(SpecialFloat::classify(f64::NAN), Some(SpecialFloat::Nan));
    /// assert_eq!(SpecialFloat::classify(0.0), None);
    /// assert_eq!(SpecialFloat::classify(1.5), None);
    /// ```
    #[must_use]
    pub fn classify(value: f64) -> Option<SpecialFloat> {
        if value.is_nan() {
            Some(SpecialFloat::Nan)
        } else if value == f64::INFINITY {
            Some(SpecialFloat::PositiveInfinity)
        } else if value == f64::NEG_INFINITY {
            Some(SpecialFloat::NegativeInfinity)
        } else if value == 0.0 && value.is_sign_negative() {
            Some(SpecialFloat::NegativeZero)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn to_f64(self) -> f64 {
        match self {
            SpecialFloat::Nan => f64::NAN,
            SpecialFloat::PositiveInfinity => f64::INFINITY,
            SpecialFloat::NegativeInfinity => f64::NEG_INFINITY,
            SpecialFloat::NegativeZero => -0.0,
        }
    }
}

/// A JSON-compatible value carrying explicit tags for Ion-only types.
///
/// # Examples
///
/// ```rust
/// use ion_json::{IonType, TaggedValue};
///
/// let typed_null = TaggedValue::TypedNull(IonType::Int);
/// assert_eq!(typed_null.to_json().to_string(), r#"{"__ion":"null","value":"int"}"#);
///
/// let text = TaggedValue::from("hello");
/// assert_eq!(text.to_json().to_string(), r#""hello""#);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TaggedValue {
    /// Untyped `null` (`null.null`)
    #[default]
    Null,
    Bool(bool),
    /// Finite float other than negative zero
    Number(f64),
    String(String),
    /// Ion list
    Array(Vec<TaggedValue>),
    /// Ion struct; escaped buckets are `Array` entries under `"__ion:<name>"`
    Object(TaggedMap),
    /// Null of a declared type, e.g. `null.int`
    TypedNull(IonType),
    Int(BigInt),
    Float(SpecialFloat),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Symbol(String),
    Blob(Vec<u8>),
    Clob(Vec<u8>),
    Sexp(Vec<TaggedValue>),
    Annotated {
        annotations: Vec<String>,
        value: Box<TaggedValue>,
    },
}

impl TaggedValue {
    /// Builds the float variant: special values are tagged, everything else is a plain number.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        match SpecialFloat::classify(value) {
            Some(special) => TaggedValue::Float(special),
            None => TaggedValue::Number(value),
        }
    }

    /// Wraps a value in an annotation tag; an empty annotation list returns the value unchanged.
    #[must_use]
    pub fn annotated(annotations: Vec<String>, value: TaggedValue) -> Self {
        if annotations.is_empty() {
            value
        } else {
            TaggedValue::Annotated {
                annotations,
                value: Box::new(value),
            }
        }
    }

    /// Returns the value of the `"__ion"` member in this value's JSON form, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<&'static str> {
        match self {
            TaggedValue::TypedNull(_) => Some(TAG_NULL),
            TaggedValue::Int(_) => Some(TAG_INT),
            TaggedValue::Float(_) => Some(TAG_FLOAT),
            TaggedValue::Decimal(_) => Some(TAG_DECIMAL),
            TaggedValue::Timestamp(_) => Some(TAG_TIMESTAMP),
            TaggedValue::Symbol(_) => Some(TAG_SYMBOL),
            TaggedValue::Blob(_) => Some(TAG_BLOB),
            TaggedValue::Clob(_) => Some(TAG_CLOB),
            TaggedValue::Sexp(_) => Some(TAG_SEXP),
            TaggedValue::Annotated { .. } => Some(TAG_ANNOTATION),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, TaggedValue::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, TaggedValue::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TaggedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a plain string, returns it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TaggedValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            TaggedValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the float value of a plain number or a special float.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TaggedValue::Number(n) => Some(*n),
            TaggedValue::Float(special) => Some(special.to_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            TaggedValue::Int(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<TaggedValue>> {
        match self {
            TaggedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&TaggedMap> {
        match self {
            TaggedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the payload of a blob or clob.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TaggedValue::Blob(bytes) | TaggedValue::Clob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the annotations of an annotation wrapper, or an empty slice.
    #[must_use]
    pub fn annotations(&self) -> &[String] {
        match self {
            TaggedValue::Annotated { annotations, .. } => annotations,
            _ => &[],
        }
    }

    /// Returns the value inside any annotation wrappers.
    #[must_use]
    pub fn unannotated(&self) -> &TaggedValue {
        let mut current = self;
        while let TaggedValue::Annotated { value, .. } = current {
            current = value;
        }
        current
    }

    /// Builds the JSON form of this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::{Decimal, TaggedValue};
    ///
    /// let value = TaggedValue::Decimal("1.50".parse::<Decimal>().unwrap());
    /// assert_eq!(
    ///     value.to_json().to_string(),
    ///     r#"{"__ion":"decimal","exp":"-2","coef":"150"}"#
    /// );
    /// ```
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            TaggedValue::Null => JsonValue::Null,
            TaggedValue::Bool(b) => JsonValue::Bool(*b),
            TaggedValue::Number(n) => match SpecialFloat::classify(*n) {
                Some(special) => tagged_json(TAG_FLOAT, special.as_str().into()),
                None => serde_json::Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            },
            TaggedValue::String(s) => JsonValue::String(s.clone()),
            TaggedValue::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            TaggedValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            TaggedValue::TypedNull(ion_type) => tagged_json(TAG_NULL, ion_type.name().into()),
            TaggedValue::Int(i) => tagged_json(TAG_INT, i.to_string().into()),
            TaggedValue::Float(special) => tagged_json(TAG_FLOAT, special.as_str().into()),
            TaggedValue::Decimal(d) => {
                let mut object = Map::new();
                object.insert(TAG_KEY.to_string(), TAG_DECIMAL.into());
                object.insert(EXPONENT_KEY.to_string(), d.exponent().to_string().into());
                object.insert(COEFFICIENT_KEY.to_string(), d.coefficient_string().into());
                JsonValue::Object(object)
            }
            TaggedValue::Timestamp(ts) => tagged_json(TAG_TIMESTAMP, ts.to_string().into()),
            TaggedValue::Symbol(s) => tagged_json(TAG_SYMBOL, s.clone().into()),
            TaggedValue::Blob(bytes) => tagged_json(TAG_BLOB, STANDARD.encode(bytes).into()),
            TaggedValue::Clob(bytes) => tagged_json(TAG_CLOB, STANDARD.encode(bytes).into()),
            TaggedValue::Sexp(items) => tagged_json(
                TAG_SEXP,
                JsonValue::Array(items.iter().map(Self::to_json).collect()),
            ),
            TaggedValue::Annotated { annotations, value } => {
                let mut object = Map::new();
                object.insert(TAG_KEY.to_string(), TAG_ANNOTATION.into());
                object.insert(
                    ANNOTATIONS_KEY.to_string(),
                    JsonValue::Array(annotations.iter().map(|a| a.clone().into()).collect()),
                );
                object.insert(VALUE_KEY.to_string(), value.to_json());
                JsonValue::Object(object)
            }
        }
    }

    /// Classifies a JSON tree into tagged values.
    ///
    /// # Errors
    ///
    /// - [`Error::EncodingMismatch`] for objects with an unknown tag, tagged objects
    ///   missing a member, or escaped buckets that are not arrays.
    /// - [`Error::MalformedInput`] for payloads that fail to parse (digits, base64,
    ///   timestamps, typed-null names, float specials).
    /// - [`Error::UnrepresentableMagnitude`] for decimal exponents beyond 64 bits.
    pub fn from_json(json: &JsonValue) -> Result<TaggedValue> {
        Ok(match json {
            JsonValue::Null => TaggedValue::Null,
            JsonValue::Bool(b) => TaggedValue::Bool(*b),
            JsonValue::Number(n) => {
                let value = n
                    .as_f64()
                    .ok_or_else(|| Error::mismatch(format!("number {} is not a float", n)))?;
                TaggedValue::from_f64(value)
            }
            JsonValue::String(s) => TaggedValue::String(s.clone()),
            JsonValue::Array(items) => TaggedValue::Array(from_json_items(items)?),
            JsonValue::Object(object) if object.contains_key(TAG_KEY) => from_tagged_object(object)?,
            JsonValue::Object(object) => TaggedValue::Object(from_plain_object(object)?),
        })
    }
}

fn tagged_json(tag: &str, value: JsonValue) -> JsonValue {
    let mut object = Map::new();
    object.insert(TAG_KEY.to_string(), tag.into());
    object.insert(VALUE_KEY.to_string(), value);
    JsonValue::Object(object)
}

fn from_json_items(items: &[JsonValue]) -> Result<Vec<TaggedValue>> {
    items.iter().map(TaggedValue::from_json).collect()
}

fn from_plain_object(object: &Map<String, JsonValue>) -> Result<TaggedMap> {
    let mut map = TaggedMap::with_capacity(object.len());
    for (key, value) in object {
        let value = match (unescape_field(key), value) {
            (Some(_), JsonValue::Array(items)) => TaggedValue::Array(from_json_items(items)?),
            (Some(name), _) => {
                return Err(Error::mismatch(format!(
                    "escaped field {:?} must hold an array of values for {:?}",
                    key, name
                )))
            }
            (None, value) => TaggedValue::from_json(value)?,
        };
        map.insert(key.clone(), value);
    }
    Ok(map)
}

fn member<'a>(object: &'a Map<String, JsonValue>, tag: &str, key: &str) -> Result<&'a JsonValue> {
    object
        .get(key)
        .ok_or_else(|| Error::mismatch(format!("{:?} value is missing {:?}", tag, key)))
}

fn text_member<'a>(object: &'a Map<String, JsonValue>, tag: &str, key: &str) -> Result<&'a str> {
    member(object, tag, key)?
        .as_str()
        .ok_or_else(|| Error::mismatch(format!("{:?} member {:?} must be a string", tag, key)))
}

fn from_tagged_object(object: &Map<String, JsonValue>) -> Result<TaggedValue> {
    let tag = object
        .get(TAG_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::mismatch(format!("{:?} must be a string tag", TAG_KEY)))?;

    Ok(match tag {
        TAG_NULL => {
            let name = object
                .get(VALUE_KEY)
                .and_then(JsonValue::as_str)
                .ok_or_else(|| Error::malformed("typed null is missing its type name"))?;
            match IonType::from_name(name) {
                Some(IonType::Null) => TaggedValue::Null,
                Some(ion_type) => TaggedValue::TypedNull(ion_type),
                None => return Err(Error::malformed(format!("unknown null type {:?}", name))),
            }
        }
        TAG_INT => {
            let digits = text_member(object, tag, VALUE_KEY)?;
            let int = parse_int(digits)
                .ok_or_else(|| Error::malformed(format!("invalid integer {:?}", digits)))?;
            TaggedValue::Int(int)
        }
        TAG_FLOAT => {
            let name = text_member(object, tag, VALUE_KEY)?;
            let special = SpecialFloat::from_name(name)
                .ok_or_else(|| Error::malformed(format!("unknown float value {:?}", name)))?;
            TaggedValue::Float(special)
        }
        TAG_DECIMAL => TaggedValue::Decimal(Decimal::from_strings(
            text_member(object, tag, COEFFICIENT_KEY)?,
            text_member(object, tag, EXPONENT_KEY)?,
        )?),
        TAG_TIMESTAMP => TaggedValue::Timestamp(text_member(object, tag, VALUE_KEY)?.parse()?),
        TAG_SYMBOL => TaggedValue::Symbol(text_member(object, tag, VALUE_KEY)?.to_string()),
        TAG_BLOB => TaggedValue::Blob(decode_base64(text_member(object, tag, VALUE_KEY)?)?),
        TAG_CLOB => TaggedValue::Clob(decode_base64(text_member(object, tag, VALUE_KEY)?)?),
        TAG_SEXP => match member(object, tag, VALUE_KEY)? {
            JsonValue::Array(items) => TaggedValue::Sexp(from_json_items(items)?),
            _ => return Err(Error::mismatch("sexp value must be an array")),
        },
        TAG_ANNOTATION => {
            let annotations = match member(object, tag, ANNOTATIONS_KEY)? {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| Error::mismatch("annotations must be strings"))
                    })
                    .collect::<Result<Vec<_>>>()?,
                _ => return Err(Error::mismatch("annotations must be an array")),
            };
            let value = TaggedValue::from_json(member(object, tag, VALUE_KEY)?)?;
            TaggedValue::Annotated {
                annotations,
                value: Box::new(value),
            }
        }
        other => return Err(Error::mismatch(format!("unrecognized tag {:?}", other))),
    })
}

/// Parses optionally signed decimal digits; rejects the forms `BigInt::from_str` tolerates
/// but the tagged form never produces (`+`, underscores).
fn parse_int(digits: &str) -> Option<BigInt> {
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::malformed(format!("invalid base64 payload: {}", e)))
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn serialize_tagged<S, V>(serializer: S, tag: &str, value: &V) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry(TAG_KEY, tag)?;
    map.serialize_entry(VALUE_KEY, value)?;
    map.end()
}

impl Serialize for TaggedValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TaggedValue::Null => serializer.serialize_unit(),
            TaggedValue::Bool(b) => serializer.serialize_bool(*b),
            TaggedValue::Number(n) => match SpecialFloat::classify(*n) {
                Some(special) => serialize_tagged(serializer, TAG_FLOAT, special.as_str()),
                None => serializer.serialize_f64(*n),
            },
            TaggedValue::String(s) => serializer.serialize_str(s),
            TaggedValue::Array(items) => items.serialize(serializer),
            TaggedValue::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (k, v) in object.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            TaggedValue::TypedNull(ion_type) => {
                serialize_tagged(serializer, TAG_NULL, ion_type.name())
            }
            TaggedValue::Int(i) => serialize_tagged(serializer, TAG_INT, &i.to_string()),
            TaggedValue::Float(special) => serialize_tagged(serializer, TAG_FLOAT, special.as_str()),
            TaggedValue::Decimal(d) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(TAG_KEY, TAG_DECIMAL)?;
                map.serialize_entry(EXPONENT_KEY, &d.exponent().to_string())?;
                map.serialize_entry(COEFFICIENT_KEY, &d.coefficient_string())?;
                map.end()
            }
            TaggedValue::Timestamp(ts) => {
                serialize_tagged(serializer, TAG_TIMESTAMP, &ts.to_string())
            }
            TaggedValue::Symbol(s) => serialize_tagged(serializer, TAG_SYMBOL, s),
            TaggedValue::Blob(bytes) => {
                serialize_tagged(serializer, TAG_BLOB, &STANDARD.encode(bytes))
            }
            TaggedValue::Clob(bytes) => {
                serialize_tagged(serializer, TAG_CLOB, &STANDARD.encode(bytes))
            }
            TaggedValue::Sexp(items) => serialize_tagged(serializer, TAG_SEXP, items),
            TaggedValue::Annotated { annotations, value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(TAG_KEY, TAG_ANNOTATION)?;
                map.serialize_entry(ANNOTATIONS_KEY, annotations)?;
                map.serialize_entry(VALUE_KEY, value)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for TaggedValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        TaggedValue::from_json(&json).map_err(serde::de::Error::custom)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        TaggedValue::Bool(value)
    }
}

impl From<i32> for TaggedValue {
    fn from(value: i32) -> Self {
        TaggedValue::Int(BigInt::from(value))
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        TaggedValue::Int(BigInt::from(value))
    }
}

impl From<u32> for TaggedValue {
    fn from(value: u32) -> Self {
        TaggedValue::Int(BigInt::from(value))
    }
}

impl From<u64> for TaggedValue {
    fn from(value: u64) -> Self {
        TaggedValue::Int(BigInt::from(value))
    }
}

impl From<BigInt> for TaggedValue {
    fn from(value: BigInt) -> Self {
        TaggedValue::Int(value)
    }
}

impl From<f32> for TaggedValue {
    fn from(value: f32) -> Self {
        TaggedValue::from_f64(f64::from(value))
    }
}

impl From<f64> for TaggedValue {
    fn from(value: f64) -> Self {
        TaggedValue::from_f64(value)
    }
}

impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        TaggedValue::String(value)
    }
}

impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        TaggedValue::String(value.to_string())
    }
}

impl From<Vec<TaggedValue>> for TaggedValue {
    fn from(value: Vec<TaggedValue>) -> Self {
        TaggedValue::Array(value)
    }
}

impl From<TaggedMap> for TaggedValue {
    fn from(value: TaggedMap) -> Self {
        TaggedValue::Object(value)
    }
}

impl From<Decimal> for TaggedValue {
    fn from(value: Decimal) -> Self {
        TaggedValue::Decimal(value)
    }
}

impl From<Timestamp> for TaggedValue {
    fn from(value: Timestamp) -> Self {
        TaggedValue::Timestamp(value)
    }
}
