//! Owned Ion value tree.
//!
//! [`Element`] is what the text and binary parsers produce and what the
//! document writer serializes. The codec itself never touches it directly; it
//! goes through [`IonReader`](crate::IonReader) and [`IonWriter`](crate::IonWriter).

use crate::{Decimal, Error, Result, Timestamp};
use num_bigint::BigInt;
use std::fmt;

/// The text of the Ion 1.0 version marker symbol.
pub(crate) const VERSION_MARKER: &str = "$ion_1_0";

/// The annotation that marks a local symbol table.
pub(crate) const SYMBOL_TABLE: &str = "$ion_symbol_table";

/// The thirteen Ion types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl IonType {
    pub const ALL: [IonType; 13] = [
        IonType::Null,
        IonType::Bool,
        IonType::Int,
        IonType::Float,
        IonType::Decimal,
        IonType::Timestamp,
        IonType::Symbol,
        IonType::String,
        IonType::Clob,
        IonType::Blob,
        IonType::List,
        IonType::Sexp,
        IonType::Struct,
    ];

    /// Returns the Ion type name, as written after `null.` in Ion text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::IonType;
    ///
    /// assert_eq!(IonType::Timestamp.name(), "timestamp");
    /// assert_eq!(IonType::from_name("sexp"), Some(IonType::Sexp));
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            IonType::Null => "null",
            IonType::Bool => "bool",
            IonType::Int => "int",
            IonType::Float => "float",
            IonType::Decimal => "decimal",
            IonType::Timestamp => "timestamp",
            IonType::Symbol => "symbol",
            IonType::String => "string",
            IonType::Clob => "clob",
            IonType::Blob => "blob",
            IonType::List => "list",
            IonType::Sexp => "sexp",
            IonType::Struct => "struct",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<IonType> {
        IonType::ALL.iter().copied().find(|t| t.name() == name)
    }

    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, IonType::List | IonType::Sexp | IonType::Struct)
    }
}

impl fmt::Display for IonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The content of an Ion value, without its annotations.
#[derive(Clone, Debug, PartialEq)]
pub enum IonValue {
    Null(IonType),
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Symbol(String),
    String(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    List(Vec<Element>),
    Sexp(Vec<Element>),
    /// Fields in encounter order; names may repeat.
    Struct(Vec<(String, Element)>),
}

impl IonValue {
    /// Returns the declared type, including for typed nulls.
    #[must_use]
    pub const fn ion_type(&self) -> IonType {
        match self {
            IonValue::Null(t) => *t,
            IonValue::Bool(_) => IonType::Bool,
            IonValue::Int(_) => IonType::Int,
            IonValue::Float(_) => IonType::Float,
            IonValue::Decimal(_) => IonType::Decimal,
            IonValue::Timestamp(_) => IonType::Timestamp,
            IonValue::Symbol(_) => IonType::Symbol,
            IonValue::String(_) => IonType::String,
            IonValue::Clob(_) => IonType::Clob,
            IonValue::Blob(_) => IonType::Blob,
            IonValue::List(_) => IonType::List,
            IonValue::Sexp(_) => IonType::Sexp,
            IonValue::Struct(_) => IonType::Struct,
        }
    }
}

/// An annotated Ion value.
///
/// # Examples
///
/// ```rust
/// use ion_json::{Element, IonType, IonValue};
///
/// let element = Element::new(IonValue::Bool(true)).with_annotations(vec!["flag".to_string()]);
/// assert_eq!(element.ion_type(), IonType::Bool);
/// assert_eq!(element.annotations(), ["flag"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    annotations: Vec<String>,
    value: IonValue,
}

impl Element {
    #[must_use]
    pub fn new(value: IonValue) -> Self {
        Element {
            annotations: Vec::new(),
            value,
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }

    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &IonValue {
        &self.value
    }

    #[inline]
    #[must_use]
    pub const fn ion_type(&self) -> IonType {
        self.value.ion_type()
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.value, IonValue::Null(_))
    }

    pub(crate) fn type_error(&self, expected: &str) -> Error {
        Error::malformed(format!(
            "expected {} value, found {}",
            expected,
            self.ion_type()
        ))
    }
}

impl From<IonValue> for Element {
    fn from(value: IonValue) -> Self {
        Element::new(value)
    }
}

/// Rejects a container opened beyond the configured nesting limit.
pub(crate) fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        Err(Error::depth_limit(max_depth))
    } else {
        Ok(())
    }
}

/// True for a struct whose first annotation is `$ion_symbol_table`.
pub(crate) fn is_symbol_table(element: &Element) -> bool {
    element.ion_type() == IonType::Struct
        && element.annotations().first().map(String::as_str) == Some(SYMBOL_TABLE)
}
