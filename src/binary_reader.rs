//! Ion binary parsing.
//!
//! Reads a complete binary document into [`Element`]s, resolving symbol IDs
//! through the system table and any local symbol tables the stream declares.
//! Timestamps are stored in UTC on the wire and converted back to their local
//! offset here.

use crate::binary::{
    read_int, Cursor, IVM, LENGTH_NULL, LENGTH_VAR, SYSTEM_SYMBOLS, TYPE_ANNOTATION, TYPE_BLOB,
    TYPE_BOOL, TYPE_CLOB, TYPE_DECIMAL, TYPE_FLOAT, TYPE_LIST, TYPE_NEG_INT, TYPE_NULL,
    TYPE_POS_INT, TYPE_SEXP, TYPE_STRING, TYPE_STRUCT, TYPE_SYMBOL, TYPE_TIMESTAMP,
};
use crate::element::{check_depth, is_symbol_table, SYMBOL_TABLE};
use crate::{
    CodecOptions, Decimal, Element, Error, IonType, IonValue, Precision, Result, Timestamp,
};
use chrono::NaiveDate;
use num_bigint::{BigInt, BigUint, Sign};

/// Returns true if the input starts with the Ion 1.0 binary version marker.
#[must_use]
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.starts_with(&IVM)
}

/// Parses every user value of an Ion binary document.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for a missing version marker, corrupt
/// framing, reserved type descriptors, unknown symbol IDs or shared symbol
/// table imports; [`Error::UnrepresentableMagnitude`] for fields too wide for
/// their target type; and [`Error::DepthLimitExceeded`] for over-deep nesting.
///
/// # Examples
///
/// ```rust
/// use ion_json::{parse_binary, CodecOptions, IonValue};
///
/// let elements = parse_binary(&[0xE0, 0x01, 0x00, 0xEA, 0x21, 0x07], &CodecOptions::default()).unwrap();
/// assert_eq!(elements[0].value(), &IonValue::Int(7.into()));
/// ```
pub fn parse_binary(bytes: &[u8], options: &CodecOptions) -> Result<Vec<Element>> {
    if !is_binary(bytes) {
        return Err(Error::malformed("missing Ion 1.0 binary version marker"));
    }
    BinaryParser::new(options.max_depth).parse_document(bytes)
}

struct BinaryParser {
    symbols: Vec<Option<String>>,
    max_depth: usize,
}

impl BinaryParser {
    fn new(max_depth: usize) -> Self {
        let mut parser = BinaryParser {
            symbols: Vec::new(),
            max_depth,
        };
        parser.reset_symbols();
        parser
    }

    fn reset_symbols(&mut self) {
        self.symbols.clear();
        self.symbols.push(None);
        self.symbols
            .extend(SYSTEM_SYMBOLS.iter().map(|s| Some(s.to_string())));
    }

    fn parse_document(&mut self, bytes: &[u8]) -> Result<Vec<Element>> {
        let mut cursor = Cursor::new(bytes);
        let mut elements = Vec::new();
        while !cursor.is_empty() {
            if cursor.starts_with(&IVM) {
                cursor.take(IVM.len())?;
                self.reset_symbols();
                continue;
            }
            if cursor.starts_with(&[0xE0]) {
                return Err(Error::malformed(format!(
                    "unsupported Ion version marker at offset {}",
                    cursor.position()
                )));
            }
            let Some(element) = self.parse_value(&mut cursor, 0)? else {
                continue;
            };
            if is_symbol_table(&element) {
                self.load_symbol_table(&element)?;
                continue;
            }
            elements.push(element);
        }
        Ok(elements)
    }

    fn load_symbol_table(&mut self, table: &Element) -> Result<()> {
        let IonValue::Struct(fields) = table.value() else {
            return Ok(());
        };
        let appends = fields.iter().any(|(name, value)| {
            name == "imports" && value.value() == &IonValue::Symbol(SYMBOL_TABLE.to_string())
        });
        if fields
            .iter()
            .any(|(name, value)| name == "imports" && matches!(value.value(), IonValue::List(_)))
        {
            return Err(Error::malformed(
                "shared symbol table imports are not supported",
            ));
        }
        if !appends {
            self.reset_symbols();
        }
        for (name, value) in fields {
            if name != "symbols" {
                continue;
            }
            if let IonValue::List(entries) = value.value() {
                for entry in entries {
                    self.symbols.push(match entry.value() {
                        IonValue::String(text) => Some(text.clone()),
                        _ => None,
                    });
                }
            }
        }
        tracing::trace!(symbols = self.symbols.len() - 1, "loaded local symbol table");
        Ok(())
    }

    fn resolve(&self, sid: u64) -> Result<String> {
        usize::try_from(sid)
            .ok()
            .filter(|sid| *sid > 0)
            .and_then(|sid| self.symbols.get(sid))
            .and_then(Option::as_ref)
            .cloned()
            .ok_or_else(|| Error::malformed(format!("symbol ID ${} has no known text", sid)))
    }

    fn length(cursor: &mut Cursor<'_>, nibble: u8) -> Result<usize> {
        if nibble == LENGTH_VAR {
            cursor.var_len()
        } else {
            Ok(usize::from(nibble))
        }
    }

    /// Parses one value; returns `None` for NOP padding.
    fn parse_value(&self, cursor: &mut Cursor<'_>, depth: usize) -> Result<Option<Element>> {
        let offset = cursor.position();
        let descriptor = cursor.byte()?;
        let (type_code, nibble) = (descriptor >> 4, descriptor & 0x0F);

        if type_code == TYPE_NULL && nibble != LENGTH_NULL {
            let len = Self::length(cursor, nibble)?;
            cursor.take(len)?;
            return Ok(None);
        }
        if type_code == TYPE_ANNOTATION {
            return self.parse_annotated(cursor, nibble, depth).map(Some);
        }
        if type_code > TYPE_ANNOTATION {
            return Err(Error::malformed(format!(
                "reserved type descriptor 0x{:02X} at offset {}",
                descriptor, offset
            )));
        }
        if nibble == LENGTH_NULL {
            return Ok(Some(Element::new(IonValue::Null(ion_type_of(type_code)))));
        }
        if type_code == TYPE_BOOL {
            return match nibble {
                0 | 1 => Ok(Some(Element::new(IonValue::Bool(nibble == 1)))),
                _ => Err(Error::malformed(format!(
                    "invalid bool descriptor 0x{:02X} at offset {}",
                    descriptor, offset
                ))),
            };
        }

        let len = if type_code == TYPE_STRUCT && nibble == 1 {
            cursor.var_len()?
        } else {
            Self::length(cursor, nibble)?
        };
        let body = cursor.take(len)?;

        let value = match type_code {
            TYPE_POS_INT | TYPE_NEG_INT => {
                let magnitude = BigUint::from_bytes_be(body);
                if type_code == TYPE_NEG_INT && magnitude.bits() == 0 {
                    return Err(Error::malformed(format!("negative zero int at offset {}", offset)));
                }
                let sign = if type_code == TYPE_NEG_INT {
                    Sign::Minus
                } else {
                    Sign::Plus
                };
                IonValue::Int(BigInt::from_biguint(sign, magnitude))
            }
            TYPE_FLOAT => IonValue::Float(match body.len() {
                0 => 0.0,
                4 => f64::from(f32::from_be_bytes([body[0], body[1], body[2], body[3]])),
                8 => {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(body);
                    f64::from_be_bytes(raw)
                }
                other => {
                    return Err(Error::malformed(format!(
                        "float of {} bytes at offset {}",
                        other, offset
                    )))
                }
            }),
            TYPE_DECIMAL => IonValue::Decimal(parse_decimal(body)?),
            TYPE_TIMESTAMP => IonValue::Timestamp(parse_timestamp(body)?),
            TYPE_SYMBOL => {
                let sid = body
                    .iter()
                    .try_fold(0u64, |acc, b| acc.checked_mul(256).map(|v| v | u64::from(*b)))
                    .ok_or_else(|| Error::magnitude("symbol ID wider than 64 bits"))?;
                IonValue::Symbol(self.resolve(sid)?)
            }
            TYPE_STRING => IonValue::String(
                String::from_utf8(body.to_vec())
                    .map_err(|e| Error::malformed(format!("invalid UTF-8 string: {}", e)))?,
            ),
            TYPE_CLOB => IonValue::Clob(body.to_vec()),
            TYPE_BLOB => IonValue::Blob(body.to_vec()),
            TYPE_LIST | TYPE_SEXP => {
                check_depth(depth + 1, self.max_depth)?;
                let mut inner = Cursor::new(body);
                let mut values = Vec::new();
                while !inner.is_empty() {
                    if let Some(value) = self.parse_value(&mut inner, depth + 1)? {
                        values.push(value);
                    }
                }
                if type_code == TYPE_LIST {
                    IonValue::List(values)
                } else {
                    IonValue::Sexp(values)
                }
            }
            _ => {
                check_depth(depth + 1, self.max_depth)?;
                let mut inner = Cursor::new(body);
                let mut fields = Vec::new();
                while !inner.is_empty() {
                    let sid = inner.var_uint()?;
                    let value = self.parse_value(&mut inner, depth + 1)?;
                    if let Some(value) = value {
                        fields.push((self.resolve(sid)?, value));
                    }
                }
                IonValue::Struct(fields)
            }
        };
        Ok(Some(Element::new(value)))
    }

    fn parse_annotated(&self, cursor: &mut Cursor<'_>, nibble: u8, depth: usize) -> Result<Element> {
        if nibble < 3 || nibble == LENGTH_NULL {
            return Err(Error::malformed(format!(
                "invalid annotation wrapper length nibble {}",
                nibble
            )));
        }
        let len = Self::length(cursor, nibble)?;
        let mut inner = Cursor::new(cursor.take(len)?);
        let annotations_len = inner.var_len()?;
        if annotations_len == 0 {
            return Err(Error::malformed("annotation wrapper without annotations"));
        }
        let mut sids = Cursor::new(inner.take(annotations_len)?);
        let mut annotations = Vec::new();
        while !sids.is_empty() {
            annotations.push(self.resolve(sids.var_uint()?)?);
        }

        if inner.peek().map(|descriptor| descriptor >> 4) == Some(TYPE_ANNOTATION) {
            return Err(Error::malformed(format!(
                "nested annotation wrapper at offset {}",
                cursor.position()
            )));
        }
        let value = self
            .parse_value(&mut inner, depth)?
            .ok_or_else(|| Error::malformed("annotation wrapper around padding"))?;
        if !inner.is_empty() {
            return Err(Error::malformed("annotation wrapper length does not match its value"));
        }
        Ok(value.with_annotations(annotations))
    }
}

fn ion_type_of(type_code: u8) -> IonType {
    match type_code {
        TYPE_NULL => IonType::Null,
        TYPE_BOOL => IonType::Bool,
        TYPE_POS_INT | TYPE_NEG_INT => IonType::Int,
        TYPE_FLOAT => IonType::Float,
        TYPE_DECIMAL => IonType::Decimal,
        TYPE_TIMESTAMP => IonType::Timestamp,
        TYPE_SYMBOL => IonType::Symbol,
        TYPE_STRING => IonType::String,
        TYPE_CLOB => IonType::Clob,
        TYPE_BLOB => IonType::Blob,
        TYPE_LIST => IonType::List,
        TYPE_SEXP => IonType::Sexp,
        _ => IonType::Struct,
    }
}

fn parse_decimal(body: &[u8]) -> Result<Decimal> {
    if body.is_empty() {
        return Ok(Decimal::new(0, 0));
    }
    let mut cursor = Cursor::new(body);
    let exponent = cursor.var_i64()?;
    let (negative, magnitude) = read_int(cursor.rest());
    Ok(Decimal::from_parts(negative, magnitude, exponent))
}

fn small_field(cursor: &mut Cursor<'_>, name: &str) -> Result<u32> {
    let value = cursor.var_uint()?;
    u32::try_from(value).map_err(|_| Error::magnitude(format!("timestamp {} {} out of range", name, value)))
}

fn parse_timestamp(body: &[u8]) -> Result<Timestamp> {
    let mut cursor = Cursor::new(body);
    let (offset_negative, offset_magnitude) = cursor.var_int()?;
    let offset = if offset_negative && offset_magnitude == 0 {
        None
    } else {
        let minutes = i16::try_from(offset_magnitude)
            .map_err(|_| Error::magnitude(format!("timestamp offset {} out of range", offset_magnitude)))?;
        Some(if offset_negative { -minutes } else { minutes })
    };

    let year = small_field(&mut cursor, "year")?;
    let mut precision = Precision::Year;
    let (mut month, mut day, mut hour, mut minute, mut second) = (1, 1, 0, 0, 0);
    let mut fraction = None;

    if !cursor.is_empty() {
        month = small_field(&mut cursor, "month")?;
        precision = Precision::Month;
    }
    if !cursor.is_empty() {
        day = small_field(&mut cursor, "day")?;
        precision = Precision::Day;
    }
    if !cursor.is_empty() {
        hour = small_field(&mut cursor, "hour")?;
        minute = small_field(&mut cursor, "minute")?;
        precision = Precision::Minute;
    }
    if !cursor.is_empty() {
        second = small_field(&mut cursor, "second")?;
        precision = Precision::Second;
    }
    if !cursor.is_empty() {
        let exponent = cursor.var_i64()?;
        let (negative, magnitude) = read_int(cursor.rest());
        fraction = Some(Decimal::from_parts(negative, magnitude, exponent));
    }

    let year = i32::try_from(year)
        .ok()
        .filter(|y| (1..=9999).contains(y))
        .ok_or_else(|| Error::magnitude(format!("year {} is outside 1..=9999", year)))?;
    let utc = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            Error::malformed(format!(
                "invalid timestamp fields {:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ))
        })?;
    Timestamp::from_utc(precision, utc, fraction, offset)
}
