//! Cursor-style reading of Ion values.
//!
//! [`IonReader`] is the interface the [`Decoder`](crate::Decoder) consumes.
//! [`ElementReader`] implements it over parsed [`Element`]s, which is how both
//! the text and the binary input paths reach the decoder.

use crate::{Decimal, Element, Error, IonType, IonValue, Result, Timestamp};
use num_bigint::BigInt;

/// A pull reader positioned on one value at a time.
///
/// `next` advances to the following value at the current depth and returns its
/// type, or `None` at the end of the container (or stream). Containers are
/// entered with `step_in` and left with `step_out`, after which `next` resumes
/// behind the container.
pub trait IonReader {
    fn next(&mut self) -> Result<Option<IonType>>;

    /// Type of the current value, including the declared type of a typed null.
    fn ion_type(&self) -> Option<IonType>;

    fn is_null(&self) -> bool;

    /// Annotations of the current value, in order.
    fn annotations(&self) -> &[String];

    /// Field name of the current value; fails outside a struct.
    fn field_name(&self) -> Result<&str>;

    fn read_bool(&mut self) -> Result<bool>;

    fn read_int(&mut self) -> Result<BigInt>;

    fn read_f64(&mut self) -> Result<f64>;

    fn read_decimal(&mut self) -> Result<Decimal>;

    fn read_timestamp(&mut self) -> Result<Timestamp>;

    /// Text of the current string or symbol.
    fn read_text(&mut self) -> Result<&str>;

    /// Bytes of the current blob or clob.
    fn read_bytes(&mut self) -> Result<&[u8]>;

    fn step_in(&mut self) -> Result<()>;

    fn step_out(&mut self) -> Result<()>;

    /// Number of containers currently stepped into.
    fn depth(&self) -> usize;
}

#[derive(Clone, Copy)]
enum Children<'a> {
    Values(&'a [Element]),
    Fields(&'a [(String, Element)]),
}

impl<'a> Children<'a> {
    fn get(&self, index: usize) -> Option<(Option<&'a str>, &'a Element)> {
        match self {
            Children::Values(values) => values.get(index).map(|e| (None, e)),
            Children::Fields(fields) => fields.get(index).map(|(name, e)| (Some(name.as_str()), e)),
        }
    }
}

struct Level<'a> {
    children: Children<'a>,
    next: usize,
}

/// An [`IonReader`] over a slice of top-level elements.
///
/// # Examples
///
/// ```rust
/// use ion_json::{Element, ElementReader, IonReader, IonType, IonValue};
///
/// let elements = vec![Element::new(IonValue::Bool(true))];
/// let mut reader = ElementReader::new(&elements);
/// assert_eq!(reader.next().unwrap(), Some(IonType::Bool));
/// assert!(reader.read_bool().unwrap());
/// assert_eq!(reader.next().unwrap(), None);
/// ```
pub struct ElementReader<'a> {
    stack: Vec<Level<'a>>,
    current: Option<(Option<&'a str>, &'a Element)>,
}

impl<'a> ElementReader<'a> {
    #[must_use]
    pub fn new(elements: &'a [Element]) -> Self {
        ElementReader {
            stack: vec![Level {
                children: Children::Values(elements),
                next: 0,
            }],
            current: None,
        }
    }

    fn current(&self) -> Result<&'a Element> {
        self.current
            .map(|(_, element)| element)
            .ok_or_else(|| Error::malformed("reader is not positioned on a value"))
    }
}

impl<'a> IonReader for ElementReader<'a> {
    fn next(&mut self) -> Result<Option<IonType>> {
        let level = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::malformed("reader has no open level"))?;
        self.current = level.children.get(level.next);
        if self.current.is_some() {
            level.next += 1;
        }
        Ok(self.current.map(|(_, element)| element.ion_type()))
    }

    fn ion_type(&self) -> Option<IonType> {
        self.current.map(|(_, element)| element.ion_type())
    }

    fn is_null(&self) -> bool {
        self.current.map_or(false, |(_, element)| element.is_null())
    }

    fn annotations(&self) -> &[String] {
        self.current.map_or(&[], |(_, element)| element.annotations())
    }

    fn field_name(&self) -> Result<&str> {
        match self.current {
            Some((Some(name), _)) => Ok(name),
            Some((None, _)) => Err(Error::malformed("current value is not a struct field")),
            None => Err(Error::malformed("reader is not positioned on a value")),
        }
    }

    fn read_bool(&mut self) -> Result<bool> {
        let element = self.current()?;
        match element.value() {
            IonValue::Bool(b) => Ok(*b),
            _ => Err(element.type_error("bool")),
        }
    }

    fn read_int(&mut self) -> Result<BigInt> {
        let element = self.current()?;
        match element.value() {
            IonValue::Int(i) => Ok(i.clone()),
            _ => Err(element.type_error("int")),
        }
    }

    fn read_f64(&mut self) -> Result<f64> {
        let element = self.current()?;
        match element.value() {
            IonValue::Float(f) => Ok(*f),
            _ => Err(element.type_error("float")),
        }
    }

    fn read_decimal(&mut self) -> Result<Decimal> {
        let element = self.current()?;
        match element.value() {
            IonValue::Decimal(d) => Ok(d.clone()),
            _ => Err(element.type_error("decimal")),
        }
    }

    fn read_timestamp(&mut self) -> Result<Timestamp> {
        let element = self.current()?;
        match element.value() {
            IonValue::Timestamp(ts) => Ok(ts.clone()),
            _ => Err(element.type_error("timestamp")),
        }
    }

    fn read_text(&mut self) -> Result<&str> {
        let element = self.current()?;
        match element.value() {
            IonValue::String(s) | IonValue::Symbol(s) => Ok(s),
            _ => Err(element.type_error("string or symbol")),
        }
    }

    fn read_bytes(&mut self) -> Result<&[u8]> {
        let element = self.current()?;
        match element.value() {
            IonValue::Blob(b) | IonValue::Clob(b) => Ok(b),
            _ => Err(element.type_error("blob or clob")),
        }
    }

    fn step_in(&mut self) -> Result<()> {
        let element = self.current()?;
        let children = match element.value() {
            IonValue::List(values) | IonValue::Sexp(values) => Children::Values(values),
            IonValue::Struct(fields) => Children::Fields(fields),
            _ => return Err(element.type_error("container")),
        };
        self.stack.push(Level { children, next: 0 });
        self.current = None;
        Ok(())
    }

    fn step_out(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(Error::malformed("step_out called at the top level"));
        }
        self.stack.pop();
        self.current = None;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Element> {
        vec![
            Element::new(IonValue::Struct(vec![
                ("a".to_string(), Element::new(IonValue::Int(BigInt::from(1)))),
                (
                    "b".to_string(),
                    Element::new(IonValue::List(vec![Element::new(IonValue::String(
                        "x".to_string(),
                    ))])),
                ),
            ])),
            Element::new(IonValue::Null(IonType::Blob)),
        ]
    }

    #[test]
    fn test_walks_nested_values() {
        let elements = sample();
        let mut reader = ElementReader::new(&elements);

        assert_eq!(reader.next().unwrap(), Some(IonType::Struct));
        reader.step_in().unwrap();
        assert_eq!(reader.depth(), 1);

        assert_eq!(reader.next().unwrap(), Some(IonType::Int));
        assert_eq!(reader.field_name().unwrap(), "a");
        assert_eq!(reader.read_int().unwrap(), BigInt::from(1));

        assert_eq!(reader.next().unwrap(), Some(IonType::List));
        reader.step_in().unwrap();
        assert_eq!(reader.next().unwrap(), Some(IonType::String));
        assert!(reader.field_name().is_err());
        assert_eq!(reader.read_text().unwrap(), "x");
        assert_eq!(reader.next().unwrap(), None);
        reader.step_out().unwrap();

        assert_eq!(reader.next().unwrap(), None);
        reader.step_out().unwrap();
        assert_eq!(reader.depth(), 0);

        assert_eq!(reader.next().unwrap(), Some(IonType::Blob));
        assert!(reader.is_null());
        assert_eq!(reader.next().unwrap(), None);
    }

    #[test]
    fn test_step_out_resumes_after_skipped_container() {
        let elements = sample();
        let mut reader = ElementReader::new(&elements);
        reader.next().unwrap();
        reader.step_in().unwrap();
        reader.step_out().unwrap();
        assert_eq!(reader.next().unwrap(), Some(IonType::Blob));
    }

    #[test]
    fn test_misuse_errors() {
        let elements = sample();
        let mut reader = ElementReader::new(&elements);
        assert!(matches!(reader.read_bool(), Err(Error::MalformedInput(_))));
        assert!(matches!(reader.step_out(), Err(Error::MalformedInput(_))));
        reader.next().unwrap();
        assert!(matches!(reader.read_int(), Err(Error::MalformedInput(_))));
    }
}
