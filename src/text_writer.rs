//! Ion text output.
//!
//! Compact output puts the whole document on one line with no optional
//! whitespace. Pretty output breaks containers over lines, indenting each level.

use crate::{Element, IonValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const KEYWORDS: [&str; 4] = ["null", "true", "false", "nan"];

/// Serializes elements as Ion text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextWriter {
    pretty: bool,
    indent: usize,
}

impl TextWriter {
    pub(crate) fn compact() -> Self {
        TextWriter {
            pretty: false,
            indent: 0,
        }
    }

    pub(crate) fn pretty(indent: usize) -> Self {
        TextWriter {
            pretty: true,
            indent,
        }
    }

    /// Writes top-level values separated by a space (compact) or a newline (pretty).
    pub(crate) fn write_document(&self, elements: &[Element]) -> String {
        let mut out = String::new();
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                out.push(if self.pretty { '\n' } else { ' ' });
            }
            self.write_element(&mut out, element, 0);
        }
        out
    }

    fn write_element(&self, out: &mut String, element: &Element, level: usize) {
        for annotation in element.annotations() {
            write_symbol(out, annotation);
            out.push_str("::");
        }
        match element.value() {
            IonValue::Null(ion_type) => {
                out.push_str("null");
                if *ion_type != crate::IonType::Null {
                    out.push('.');
                    out.push_str(ion_type.name());
                }
            }
            IonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            IonValue::Int(i) => out.push_str(&i.to_string()),
            IonValue::Float(f) => write_float(out, *f),
            IonValue::Decimal(d) => {
                if d.exponent() == 0 {
                    out.push_str(&d.coefficient_string());
                    out.push('.');
                } else {
                    out.push_str(&d.to_string());
                }
            }
            IonValue::Timestamp(ts) => out.push_str(&ts.to_string()),
            IonValue::Symbol(s) => write_symbol(out, s),
            IonValue::String(s) => write_string(out, s),
            IonValue::Clob(bytes) => write_clob(out, bytes),
            IonValue::Blob(bytes) => {
                out.push_str("{{");
                out.push_str(&STANDARD.encode(bytes));
                out.push_str("}}");
            }
            IonValue::List(values) => self.write_sequence(out, ('[', ']'), ",", values, level),
            IonValue::Sexp(values) => self.write_sequence(out, ('(', ')'), " ", values, level),
            IonValue::Struct(fields) => self.write_struct(out, fields, level),
        }
    }

    fn newline(&self, out: &mut String, level: usize) {
        out.push('\n');
        out.push_str(&" ".repeat(self.indent * level));
    }

    fn write_sequence(
        &self,
        out: &mut String,
        (open, close): (char, char),
        separator: &str,
        values: &[Element],
        level: usize,
    ) {
        out.push(open);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(if self.pretty { separator.trim() } else { separator });
            }
            if self.pretty {
                self.newline(out, level + 1);
            }
            self.write_element(out, value, level + 1);
        }
        if self.pretty && !values.is_empty() {
            self.newline(out, level);
        }
        out.push(close);
    }

    fn write_struct(&self, out: &mut String, fields: &[(String, Element)], level: usize) {
        out.push('{');
        for (i, (name, value)) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if self.pretty {
                self.newline(out, level + 1);
            }
            write_symbol(out, name);
            out.push_str(if self.pretty { ": " } else { ":" });
            self.write_element(out, value, level + 1);
        }
        if self.pretty && !fields.is_empty() {
            self.newline(out, level);
        }
        out.push('}');
    }
}

fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "+inf" } else { "-inf" });
    } else {
        out.push_str(&format!("{:e}", f));
    }
}

/// Unquoted `$ion_` names are read as system symbols, so those are quoted too.
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !KEYWORDS.contains(&text)
        && !is_symbol_id(text)
        && !text.starts_with("$ion_")
}

/// `$` followed by digits reads back as a symbol ID, so it is always quoted.
fn is_symbol_id(text: &str) -> bool {
    text.strip_prefix('$')
        .map_or(false, |digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn write_symbol(out: &mut String, text: &str) {
    if is_identifier(text) {
        out.push_str(text);
    } else {
        out.push('\'');
        write_escaped(out, text, '\'');
        out.push('\'');
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    write_escaped(out, text, '"');
    out.push('"');
}

fn write_escaped(out: &mut String, text: &str, quote: char) {
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
}

fn write_clob(out: &mut String, bytes: &[u8]) {
    out.push_str("{{\"");
    for &byte in bytes {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    out.push_str("\"}}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decimal, IonType};
    use num_bigint::BigInt;

    fn el(value: IonValue) -> Element {
        Element::new(value)
    }

    fn sample() -> Element {
        el(IonValue::Struct(vec![
            ("a".to_string(), el(IonValue::Int(BigInt::from(1)))),
            (
                "b c".to_string(),
                el(IonValue::List(vec![
                    el(IonValue::Symbol("true".to_string())),
                    el(IonValue::Null(IonType::Int)),
                ])),
            ),
            ("d".to_string(), el(IonValue::Sexp(vec![]))),
        ]))
        .with_annotations(vec!["ann".to_string()])
    }

    #[test]
    fn test_compact() {
        let text = TextWriter::compact().write_document(&[sample(), el(IonValue::Bool(true))]);
        assert_eq!(text, "ann::{a:1,'b c':['true',null.int],d:()} true");
    }

    #[test]
    fn test_pretty() {
        let text = TextWriter::pretty(2).write_document(&[sample()]);
        assert_eq!(
            text,
            "ann::{\n  a: 1,\n  'b c': [\n    'true',\n    null.int\n  ],\n  d: ()\n}"
        );
    }

    #[test]
    fn test_pretty_sexp_has_no_separator() {
        let sexp = el(IonValue::Sexp(vec![
            el(IonValue::Symbol("+".to_string())),
            el(IonValue::Int(BigInt::from(1))),
        ]));
        assert_eq!(TextWriter::pretty(1).write_document(&[sexp]), "(\n '+'\n 1\n)");
    }

    #[test]
    fn test_scalars() {
        let values = vec![
            el(IonValue::Float(-0.0)),
            el(IonValue::Float(f64::NEG_INFINITY)),
            el(IonValue::Float(1250.0)),
            el(IonValue::Decimal(Decimal::new(7, 0))),
            el(IonValue::Decimal(Decimal::new(-15, -1))),
            el(IonValue::String("a\"b\n".to_string())),
            el(IonValue::Symbol("$12".to_string())),
            el(IonValue::Symbol("$ion_1_0".to_string())),
            el(IonValue::Blob(b"hi".to_vec())),
            el(IonValue::Clob(vec![b'x', 0xff])),
        ];
        assert_eq!(
            TextWriter::compact().write_document(&values),
            r#"-0e0 -inf 1.25e3 7. -15d-1 "a\"b\n" '$12' '$ion_1_0' {{aGk=}} {{"x\xff"}}"#
        );
    }
}
