//! Ion binary output.
//!
//! Symbols are interned in first-use order into a single local symbol table,
//! written after the version marker and before the values. Text that matches a
//! system symbol reuses the system ID.

use crate::binary::{
    write_header, write_int, write_var_i64, write_var_int, write_var_uint, IVM, LENGTH_NULL,
    SID_SYMBOLS, SID_SYMBOL_TABLE, SYSTEM_SYMBOLS, TYPE_ANNOTATION, TYPE_BLOB, TYPE_BOOL,
    TYPE_CLOB, TYPE_DECIMAL, TYPE_FLOAT, TYPE_LIST, TYPE_NEG_INT, TYPE_NULL, TYPE_POS_INT,
    TYPE_SEXP, TYPE_STRING, TYPE_STRUCT, TYPE_SYMBOL, TYPE_TIMESTAMP,
};
use crate::{Decimal, Element, IonType, IonValue, Precision, Result, Timestamp};
use chrono::{Datelike, Timelike};
use num_bigint::{BigInt, Sign};
use std::collections::HashMap;

/// Serializes elements as an Ion binary document.
#[derive(Default)]
pub(crate) struct BinaryWriter {
    local_symbols: Vec<String>,
    ids: HashMap<String, u64>,
}

impl BinaryWriter {
    pub(crate) fn new() -> Self {
        let ids = SYSTEM_SYMBOLS
            .iter()
            .zip(1u64..)
            .map(|(text, sid)| (text.to_string(), sid))
            .collect();
        BinaryWriter {
            local_symbols: Vec::new(),
            ids,
        }
    }

    pub(crate) fn write_document(mut self, elements: &[Element]) -> Result<Vec<u8>> {
        for element in elements {
            self.intern_element(element);
        }

        let mut body = Vec::new();
        for element in elements {
            self.write_element(&mut body, element)?;
        }

        let mut out = Vec::with_capacity(body.len() + 16);
        out.extend_from_slice(&IVM);
        if !self.local_symbols.is_empty() {
            self.write_symbol_table(&mut out);
        }
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn intern(&mut self, text: &str) {
        if !self.ids.contains_key(text) {
            let sid = (SYSTEM_SYMBOLS.len() + self.local_symbols.len() + 1) as u64;
            self.ids.insert(text.to_string(), sid);
            self.local_symbols.push(text.to_string());
        }
    }

    fn intern_element(&mut self, element: &Element) {
        for annotation in element.annotations() {
            self.intern(annotation);
        }
        match element.value() {
            IonValue::Symbol(text) => self.intern(text),
            IonValue::List(values) | IonValue::Sexp(values) => {
                for value in values {
                    self.intern_element(value);
                }
            }
            IonValue::Struct(fields) => {
                for (name, value) in fields {
                    self.intern(name);
                    self.intern_element(value);
                }
            }
            _ => {}
        }
    }

    fn sid(&self, text: &str) -> u64 {
        // Every symbol was interned before encoding started.
        self.ids.get(text).copied().unwrap_or(0)
    }

    /// Writes `$ion_symbol_table::{symbols: [...]}`.
    fn write_symbol_table(&self, out: &mut Vec<u8>) {
        let mut list = Vec::new();
        for text in &self.local_symbols {
            write_header(&mut list, TYPE_STRING, text.len());
            list.extend_from_slice(text.as_bytes());
        }
        let mut fields = Vec::new();
        write_var_uint(&mut fields, SID_SYMBOLS);
        write_header(&mut fields, TYPE_LIST, list.len());
        fields.extend_from_slice(&list);

        let mut table = Vec::new();
        write_header(&mut table, TYPE_STRUCT, fields.len());
        table.extend_from_slice(&fields);
        write_annotated(out, &[SID_SYMBOL_TABLE], &table);
    }

    fn write_element(&self, out: &mut Vec<u8>, element: &Element) -> Result<()> {
        if element.annotations().is_empty() {
            return self.write_value(out, element.value());
        }
        let sids: Vec<u64> = element.annotations().iter().map(|a| self.sid(a)).collect();
        let mut value = Vec::new();
        self.write_value(&mut value, element.value())?;
        write_annotated(out, &sids, &value);
        Ok(())
    }

    fn write_value(&self, out: &mut Vec<u8>, value: &IonValue) -> Result<()> {
        match value {
            IonValue::Null(ion_type) => out.push((null_type_code(*ion_type) << 4) | LENGTH_NULL),
            IonValue::Bool(b) => out.push((TYPE_BOOL << 4) | u8::from(*b)),
            IonValue::Int(i) => write_big_int(out, i),
            IonValue::Float(f) => {
                if *f == 0.0 && f.is_sign_positive() {
                    write_header(out, TYPE_FLOAT, 0);
                } else {
                    write_header(out, TYPE_FLOAT, 8);
                    out.extend_from_slice(&f.to_be_bytes());
                }
            }
            IonValue::Decimal(d) => {
                let body = decimal_body(d);
                write_header(out, TYPE_DECIMAL, body.len());
                out.extend_from_slice(&body);
            }
            IonValue::Timestamp(ts) => {
                let body = timestamp_body(ts)?;
                write_header(out, TYPE_TIMESTAMP, body.len());
                out.extend_from_slice(&body);
            }
            IonValue::Symbol(text) => {
                let bytes = self.sid(text).to_be_bytes();
                let skip = bytes.iter().take_while(|b| **b == 0).count();
                write_header(out, TYPE_SYMBOL, bytes.len() - skip);
                out.extend_from_slice(&bytes[skip..]);
            }
            IonValue::String(s) => write_bytes(out, TYPE_STRING, s.as_bytes()),
            IonValue::Clob(bytes) => write_bytes(out, TYPE_CLOB, bytes),
            IonValue::Blob(bytes) => write_bytes(out, TYPE_BLOB, bytes),
            IonValue::List(values) | IonValue::Sexp(values) => {
                let mut body = Vec::new();
                for value in values {
                    self.write_element(&mut body, value)?;
                }
                let code = if matches!(value, IonValue::List(_)) {
                    TYPE_LIST
                } else {
                    TYPE_SEXP
                };
                write_bytes(out, code, &body);
            }
            IonValue::Struct(fields) => {
                let mut body = Vec::new();
                for (name, value) in fields {
                    write_var_uint(&mut body, self.sid(name));
                    self.write_element(&mut body, value)?;
                }
                write_bytes(out, TYPE_STRUCT, &body);
            }
        }
        Ok(())
    }
}

fn write_bytes(out: &mut Vec<u8>, type_code: u8, body: &[u8]) {
    write_header(out, type_code, body.len());
    out.extend_from_slice(body);
}

fn write_annotated(out: &mut Vec<u8>, sids: &[u64], value: &[u8]) {
    let mut annotations = Vec::new();
    for sid in sids {
        write_var_uint(&mut annotations, *sid);
    }
    let mut body = Vec::new();
    write_var_uint(&mut body, annotations.len() as u64);
    body.extend_from_slice(&annotations);
    body.extend_from_slice(value);
    write_bytes(out, TYPE_ANNOTATION, &body);
}

fn null_type_code(ion_type: IonType) -> u8 {
    match ion_type {
        IonType::Null => TYPE_NULL,
        IonType::Bool => TYPE_BOOL,
        IonType::Int => TYPE_POS_INT,
        IonType::Float => TYPE_FLOAT,
        IonType::Decimal => TYPE_DECIMAL,
        IonType::Timestamp => TYPE_TIMESTAMP,
        IonType::Symbol => TYPE_SYMBOL,
        IonType::String => TYPE_STRING,
        IonType::Clob => TYPE_CLOB,
        IonType::Blob => TYPE_BLOB,
        IonType::List => TYPE_LIST,
        IonType::Sexp => TYPE_SEXP,
        IonType::Struct => TYPE_STRUCT,
    }
}

fn write_big_int(out: &mut Vec<u8>, value: &BigInt) {
    let (sign, magnitude) = value.to_bytes_be();
    if sign == Sign::NoSign {
        write_header(out, TYPE_POS_INT, 0);
        return;
    }
    let code = if sign == Sign::Minus {
        TYPE_NEG_INT
    } else {
        TYPE_POS_INT
    };
    write_bytes(out, code, &magnitude);
}

fn decimal_body(d: &Decimal) -> Vec<u8> {
    let mut body = Vec::new();
    if d.exponent() == 0 && d.is_zero() && !d.is_negative() {
        return body;
    }
    write_var_i64(&mut body, d.exponent());
    write_int(&mut body, d.is_negative(), d.magnitude());
    body
}

fn timestamp_body(ts: &Timestamp) -> Result<Vec<u8>> {
    let utc = ts.utc_fields()?;
    let mut body = Vec::new();
    match ts.offset_minutes() {
        Some(minutes) => write_var_int(&mut body, minutes < 0, u64::from(minutes.unsigned_abs())),
        None => write_var_int(&mut body, true, 0),
    }
    write_var_uint(&mut body, utc.year() as u64);
    if ts.precision() >= Precision::Month {
        write_var_uint(&mut body, u64::from(utc.month()));
    }
    if ts.precision() >= Precision::Day {
        write_var_uint(&mut body, u64::from(utc.day()));
    }
    if ts.precision() >= Precision::Minute {
        write_var_uint(&mut body, u64::from(utc.hour()));
        write_var_uint(&mut body, u64::from(utc.minute()));
    }
    if ts.precision() >= Precision::Second {
        write_var_uint(&mut body, u64::from(utc.second()));
        if let Some(fraction) = ts.fraction() {
            write_var_i64(&mut body, fraction.exponent());
            write_int(&mut body, false, fraction.magnitude());
        }
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: IonValue) -> Vec<u8> {
        BinaryWriter::new()
            .write_document(&[Element::new(value)])
            .unwrap()
    }

    #[test]
    fn test_int_layout() {
        assert_eq!(
            encode(IonValue::Int(BigInt::from(2147483646))),
            [0xE0, 0x01, 0x00, 0xEA, 0x24, 0x7F, 0xFF, 0xFF, 0xFE]
        );
        assert_eq!(encode(IonValue::Int(BigInt::from(-1)))[4..], [0x31, 0x01]);
        assert_eq!(encode(IonValue::Int(BigInt::from(0)))[4..], [0x20]);
    }

    #[test]
    fn test_scalar_layouts() {
        assert_eq!(encode(IonValue::Null(IonType::Null))[4..], [0x0F]);
        assert_eq!(encode(IonValue::Null(IonType::Int))[4..], [0x2F]);
        assert_eq!(encode(IonValue::Bool(true))[4..], [0x11]);
        assert_eq!(encode(IonValue::Float(0.0))[4..], [0x40]);
        assert_eq!(encode(IonValue::Float(-0.0))[4..6], [0x48, 0x80]);
        assert_eq!(encode(IonValue::Decimal(Decimal::new(0, 0)))[4..], [0x50]);
        assert_eq!(
            encode(IonValue::Decimal(Decimal::new(-15, -1)))[4..],
            [0x52, 0xC1, 0x8F]
        );
        assert_eq!(encode(IonValue::String("hi".to_string()))[4..], [0x82, b'h', b'i']);
    }

    #[test]
    fn test_timestamp_layout() {
        let ts: Timestamp = "2000-01-01T00:00Z".parse().unwrap();
        assert_eq!(
            encode(IonValue::Timestamp(ts))[4..],
            [0x67, 0x80, 0x0F, 0xD0, 0x81, 0x81, 0x80, 0x80]
        );
        let ts: Timestamp = "2000T".parse().unwrap();
        assert_eq!(encode(IonValue::Timestamp(ts))[4..], [0x63, 0xC0, 0x0F, 0xD0]);
    }

    #[test]
    fn test_symbol_table_is_emitted() {
        let bytes = encode(IonValue::Symbol("foo".to_string()));
        assert_eq!(
            bytes[4..],
            [
                0xE9, 0x81, 0x83, // $ion_symbol_table::
                0xD6, 0x87, // {symbols:
                0xB4, 0x83, b'f', b'o', b'o', // ["foo"]
                0x71, 0x0A, // $10
            ]
        );
    }

    #[test]
    fn test_system_symbols_are_reused() {
        let bytes = encode(IonValue::Symbol("name".to_string()));
        assert_eq!(bytes[4..], [0x71, 0x04]);
    }

    #[test]
    fn test_long_string_uses_var_length() {
        let bytes = encode(IonValue::String("x".repeat(20)));
        assert_eq!(bytes[4..6], [0x8E, 0x94]);
        assert_eq!(bytes.len(), 4 + 2 + 20);
    }
}
