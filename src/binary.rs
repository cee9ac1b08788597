//! Primitives shared by the Ion binary reader and writer.
//!
//! Covers the version marker, the system symbol table, type codes and the four
//! integer field encodings (VarUInt, VarInt, UInt and Int).

use crate::{Error, Result};
use num_bigint::BigUint;

/// Ion 1.0 binary version marker.
pub(crate) const IVM: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// Text of system symbols `$1` through `$9`.
pub(crate) const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

pub(crate) const SID_SYMBOL_TABLE: u64 = 3;
pub(crate) const SID_SYMBOLS: u64 = 7;

pub(crate) const TYPE_NULL: u8 = 0x0;
pub(crate) const TYPE_BOOL: u8 = 0x1;
pub(crate) const TYPE_POS_INT: u8 = 0x2;
pub(crate) const TYPE_NEG_INT: u8 = 0x3;
pub(crate) const TYPE_FLOAT: u8 = 0x4;
pub(crate) const TYPE_DECIMAL: u8 = 0x5;
pub(crate) const TYPE_TIMESTAMP: u8 = 0x6;
pub(crate) const TYPE_SYMBOL: u8 = 0x7;
pub(crate) const TYPE_STRING: u8 = 0x8;
pub(crate) const TYPE_CLOB: u8 = 0x9;
pub(crate) const TYPE_BLOB: u8 = 0xA;
pub(crate) const TYPE_LIST: u8 = 0xB;
pub(crate) const TYPE_SEXP: u8 = 0xC;
pub(crate) const TYPE_STRUCT: u8 = 0xD;
pub(crate) const TYPE_ANNOTATION: u8 = 0xE;

/// Length nibble announcing a VarUInt length field.
pub(crate) const LENGTH_VAR: u8 = 14;
/// Length nibble marking a typed null.
pub(crate) const LENGTH_NULL: u8 = 15;

pub(crate) fn write_var_uint(out: &mut Vec<u8>, value: u64) {
    let mut groups = 1;
    while groups < 10 && value >> (7 * groups) != 0 {
        groups += 1;
    }
    for i in (0..groups).rev() {
        let mut byte = ((value >> (7 * i)) & 0x7F) as u8;
        if i == 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

/// Writes a VarInt; `negative` with a zero magnitude encodes negative zero.
pub(crate) fn write_var_int(out: &mut Vec<u8>, negative: bool, magnitude: u64) {
    let mut extra = 0;
    while extra < 9 && magnitude >> (6 + 7 * extra) != 0 {
        extra += 1;
    }
    let mut first = ((magnitude >> (7 * extra)) & 0x3F) as u8;
    if negative {
        first |= 0x40;
    }
    if extra == 0 {
        first |= 0x80;
    }
    out.push(first);
    for i in (0..extra).rev() {
        let mut byte = ((magnitude >> (7 * i)) & 0x7F) as u8;
        if i == 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

pub(crate) fn write_var_i64(out: &mut Vec<u8>, value: i64) {
    write_var_int(out, value < 0, value.unsigned_abs());
}

/// Writes a signed-magnitude Int; a negative zero is kept as `0x80`.
pub(crate) fn write_int(out: &mut Vec<u8>, negative: bool, magnitude: &BigUint) {
    let start = out.len();
    if magnitude.bits() > 0 {
        let bytes = magnitude.to_bytes_be();
        if bytes[0] & 0x80 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&bytes);
    } else if negative {
        out.push(0);
    }
    if negative {
        out[start] |= 0x80;
    }
}

/// Writes a type descriptor for a value whose body is `len` bytes.
pub(crate) fn write_header(out: &mut Vec<u8>, type_code: u8, len: usize) {
    if len < usize::from(LENGTH_VAR) {
        out.push((type_code << 4) | len as u8);
    } else {
        out.push((type_code << 4) | LENGTH_VAR);
        write_var_uint(out, len as u64);
    }
}

/// A bounds-checked read position over a byte slice.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data[self.pos..].starts_with(prefix)
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub(crate) fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::malformed(format!("unexpected end of binary data at {}", self.pos)))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "length {} at offset {} runs past the end of the data",
                    len, self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    pub(crate) fn var_uint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        loop {
            let byte = self.byte()?;
            if value >> 57 != 0 {
                return Err(Error::magnitude("VarUInt wider than 64 bits"));
            }
            value = (value << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 != 0 {
                return Ok(value);
            }
        }
    }

    pub(crate) fn var_len(&mut self) -> Result<usize> {
        let len = self.var_uint()?;
        usize::try_from(len).map_err(|_| Error::magnitude(format!("length {} is too large", len)))
    }

    /// Reads a VarInt as sign and magnitude.
    pub(crate) fn var_int(&mut self) -> Result<(bool, u64)> {
        let first = self.byte()?;
        let negative = first & 0x40 != 0;
        let mut value = u64::from(first & 0x3F);
        let mut done = first & 0x80 != 0;
        while !done {
            let byte = self.byte()?;
            if value >> 57 != 0 {
                return Err(Error::magnitude("VarInt wider than 64 bits"));
            }
            value = (value << 7) | u64::from(byte & 0x7F);
            done = byte & 0x80 != 0;
        }
        Ok((negative, value))
    }

    pub(crate) fn var_i64(&mut self) -> Result<i64> {
        let (negative, magnitude) = self.var_int()?;
        let value = i64::try_from(magnitude)
            .map(|m| if negative { -m } else { m })
            .or_else(|_| {
                if negative && magnitude == i64::MIN.unsigned_abs() {
                    Ok(i64::MIN)
                } else {
                    Err(Error::magnitude(format!("VarInt magnitude {} exceeds 64 bits", magnitude)))
                }
            })?;
        Ok(value)
    }
}

/// Decodes a signed-magnitude Int field into sign and magnitude.
pub(crate) fn read_int(bytes: &[u8]) -> (bool, BigUint) {
    match bytes.split_first() {
        None => (false, BigUint::default()),
        Some((first, rest)) => {
            let mut magnitude = Vec::with_capacity(bytes.len());
            magnitude.push(first & 0x7F);
            magnitude.extend_from_slice(rest);
            (first & 0x80 != 0, BigUint::from_bytes_be(&magnitude))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_uint() {
        let mut out = Vec::new();
        write_var_uint(&mut out, 0);
        write_var_uint(&mut out, 127);
        write_var_uint(&mut out, 128);
        assert_eq!(out, [0x80, 0xFF, 0x01, 0x80]);

        let mut cursor = Cursor::new(&out);
        assert_eq!(cursor.var_uint().unwrap(), 0);
        assert_eq!(cursor.var_uint().unwrap(), 127);
        assert_eq!(cursor.var_uint().unwrap(), 128);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_var_int() {
        let mut out = Vec::new();
        write_var_i64(&mut out, -1);
        write_var_i64(&mut out, 63);
        write_var_i64(&mut out, 64);
        write_var_int(&mut out, true, 0);
        assert_eq!(out, [0xC1, 0xBF, 0x00, 0xC0, 0xC0]);

        let mut cursor = Cursor::new(&out);
        assert_eq!(cursor.var_i64().unwrap(), -1);
        assert_eq!(cursor.var_i64().unwrap(), 63);
        assert_eq!(cursor.var_i64().unwrap(), 64);
        assert_eq!(cursor.var_int().unwrap(), (true, 0));
    }

    #[test]
    fn test_var_int_extremes() {
        for value in [i64::MIN, i64::MAX, -8_000_000_000] {
            let mut out = Vec::new();
            write_var_i64(&mut out, value);
            assert_eq!(Cursor::new(&out).var_i64().unwrap(), value);
        }
    }

    #[test]
    fn test_signed_magnitude_int() {
        let cases: [(bool, u32, &[u8]); 4] = [
            (false, 0, &[]),
            (true, 0, &[0x80]),
            (true, 5, &[0x85]),
            (false, 0x80, &[0x00, 0x80]),
        ];
        for (negative, magnitude, expected) in cases {
            let mut out = Vec::new();
            write_int(&mut out, negative, &BigUint::from(magnitude));
            assert_eq!(out, expected);
            assert_eq!(read_int(&out), (negative, BigUint::from(magnitude)));
        }
    }

    #[test]
    fn test_take_past_end() {
        let mut cursor = Cursor::new(&[1, 2]);
        assert!(matches!(cursor.take(3), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_overlong_var_uint() {
        let data = [0x7F; 12];
        assert!(matches!(
            Cursor::new(&data).var_uint(),
            Err(Error::UnrepresentableMagnitude(_))
        ));
    }
}
