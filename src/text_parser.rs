//! Ion text parsing.
//!
//! [`TextParser`] reads a complete Ion text document into [`Element`]s. It is a
//! single-pass recursive descent parser over `&str` that tracks line and column
//! for error reporting.
//!
//! System values are dropped from the result: the unquoted `$ion_1_0` version
//! marker and top-level structs annotated with `$ion_symbol_table`. A quoted
//! `'$ion_1_0'` is an ordinary symbol. Symbol identifiers of the form `$10` are
//! kept as plain text.
//!
//! ```rust
//! use ion_json::{parse_text, CodecOptions, IonType};
//!
//! let elements = parse_text("$ion_1_0 a::{x: 1} [null.int]", &CodecOptions::default()).unwrap();
//! assert_eq!(elements.len(), 2);
//! assert_eq!(elements[0].annotations(), ["a"]);
//! assert_eq!(elements[1].ion_type(), IonType::List);
//! ```

use crate::element::{check_depth, is_symbol_table, VERSION_MARKER};
use crate::{CodecOptions, Decimal, Element, Error, IonType, IonValue, Result, Timestamp};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_bigint::BigInt;

/// Parses every user value of an Ion text document.
///
/// # Errors
///
/// Returns [`Error::Syntax`] or [`Error::UnexpectedEof`] for invalid text,
/// [`Error::DepthLimitExceeded`] for over-deep nesting, and the numeric errors of
/// [`Decimal`] and [`Timestamp`] parsing.
pub fn parse_text(input: &str, options: &CodecOptions) -> Result<Vec<Element>> {
    TextParser::new(input, options.max_depth).parse_document()
}

fn is_version_marker(element: &Element) -> bool {
    element.annotations().is_empty()
        && matches!(element.value(), IonValue::Symbol(s) if s == VERSION_MARKER)
}

#[derive(Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    column: usize,
}

/// The Ion text parser.
pub struct TextParser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> TextParser<'a> {
    #[must_use]
    pub fn new(input: &'a str, max_depth: usize) -> Self {
        TextParser {
            input,
            position: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth,
        }
    }

    /// Parses all top-level values, skipping system values.
    pub fn parse_document(mut self) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.at_end() {
                break;
            }
            let unquoted_marker = self.starts_with(VERSION_MARKER);
            let element = self.parse_value(false)?;
            if is_symbol_table(&element) || (unquoted_marker && is_version_marker(&element)) {
                tracing::trace!(line = self.line, "skipped system value");
                continue;
            }
            elements.push(element);
        }
        Ok(elements)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.position..].chars().next()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.position..].starts_with(s)
    }

    /// Consumes `s` if the input continues with it.
    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in s.chars() {
                self.next_char();
            }
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<()> {
        if self.eat(s) {
            Ok(())
        } else if self.at_end() {
            Err(self.eof(s))
        } else {
            Err(self.syntax(&format!("expected '{}'", s)))
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.position = mark.position;
        self.line = mark.line;
        self.column = mark.column;
    }

    fn current_line(&self) -> &'a str {
        let input = self.input;
        let start = self.input[..self.position]
            .rfind('\n')
            .map_or(0, |idx| idx + 1);
        let end = self.input[self.position..]
            .find('\n')
            .map_or(input.len(), |idx| self.position + idx);
        &input[start..end]
    }

    fn syntax(&self, msg: &str) -> Error {
        Error::syntax_with_context(self.line, self.column, msg, self.current_line(), None)
    }

    fn syntax_at(&self, mark: Mark, msg: &str) -> Error {
        Error::syntax_with_context(mark.line, mark.column, msg, self.current_line(), None)
    }

    fn eof(&self, expected: &str) -> Error {
        Error::unexpected_eof(self.line, self.column, expected, self.current_line())
    }

    /// Skips whitespace plus line and block comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.next_char();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(ch) = self.next_char() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    self.eat("/*");
                    loop {
                        if self.eat("*/") {
                            break;
                        }
                        if self.next_char().is_none() {
                            return Err(self.eof("end of block comment"));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(ch) if ch.is_whitespace()) {
            self.next_char();
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        check_depth(self.depth, self.max_depth)
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self, in_sexp: bool) -> Result<Element> {
        let mut annotations = Vec::new();
        while let Some(annotation) = self.parse_annotation()? {
            annotations.push(annotation);
        }
        self.skip_trivia()?;
        let value = self.parse_unannotated(in_sexp)?;
        Ok(Element::new(value).with_annotations(annotations))
    }

    /// Reads `name::` if present; otherwise leaves the input untouched.
    fn parse_annotation(&mut self) -> Result<Option<String>> {
        self.skip_trivia()?;
        let mark = self.mark();
        let text = match self.peek_char() {
            Some('\'') if !self.starts_with("'''") => {
                self.next_char();
                self.read_text("'", false)?
            }
            Some(ch) if is_identifier_start(ch) => self.read_identifier().to_string(),
            _ => return Ok(None),
        };
        self.skip_trivia()?;
        if self.eat("::") {
            Ok(Some(text))
        } else {
            self.reset(mark);
            Ok(None)
        }
    }

    fn parse_unannotated(&mut self, in_sexp: bool) -> Result<IonValue> {
        let ch = self.peek_char().ok_or_else(|| self.eof("a value"))?;
        match ch {
            '[' => self.parse_list(),
            '(' => self.parse_sexp(),
            '{' if self.starts_with("{{") => self.parse_lob(),
            '{' => self.parse_struct(),
            '"' => {
                self.next_char();
                Ok(IonValue::String(self.read_text("\"", false)?))
            }
            '\'' if self.starts_with("'''") => Ok(IonValue::String(self.read_long_text()?)),
            '\'' => {
                self.next_char();
                Ok(IonValue::Symbol(self.read_text("'", false)?))
            }
            '+' | '-' if self.at_infinity() => {
                let negative = ch == '-';
                self.eat(if negative { "-inf" } else { "+inf" });
                Ok(IonValue::Float(if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }))
            }
            '-' if matches!(self.peek_second(), Some(d) if d.is_ascii_digit()) => self.parse_number(),
            d if d.is_ascii_digit() => self.parse_number(),
            c if is_identifier_start(c) => self.parse_keyword_or_symbol(),
            c if in_sexp && is_operator(c) => {
                let start = self.position;
                while matches!(self.peek_char(), Some(c) if is_operator(c)) {
                    self.next_char();
                }
                Ok(IonValue::Symbol(self.input[start..self.position].to_string()))
            }
            _ => Err(self.syntax(&format!("unexpected character '{}'", ch))),
        }
    }

    fn at_infinity(&self) -> bool {
        let rest = &self.input[self.position..];
        (rest.starts_with("+inf") || rest.starts_with("-inf"))
            && rest[4..].chars().next().map_or(true, is_value_end)
    }

    fn read_identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.position;
        while matches!(self.peek_char(), Some(c) if is_identifier_part(c)) {
            self.next_char();
        }
        &input[start..self.position]
    }

    fn parse_keyword_or_symbol(&mut self) -> Result<IonValue> {
        let word = self.read_identifier();
        Ok(match word {
            "null" if self.peek_char() == Some('.') => {
                self.next_char();
                let mark = self.mark();
                let name = self.read_identifier();
                match IonType::from_name(name) {
                    Some(ion_type) => IonValue::Null(ion_type),
                    None => {
                        return Err(self.syntax_at(mark, &format!("unknown null type '{}'", name)))
                    }
                }
            }
            "null" => IonValue::Null(IonType::Null),
            "true" => IonValue::Bool(true),
            "false" => IonValue::Bool(false),
            "nan" => IonValue::Float(f64::NAN),
            other => IonValue::Symbol(other.to_string()),
        })
    }

    fn parse_number(&mut self) -> Result<IonValue> {
        let mark = self.mark();
        let start = self.position;
        while matches!(self.peek_char(), Some(c) if is_numeric_part(c)) {
            self.next_char();
        }
        let token = &self.input[start..self.position];
        let invalid = || self.syntax_at(mark, &format!("invalid numeric value '{}'", token));

        let (negative, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let bytes = body.as_bytes();

        if !negative
            && bytes.len() >= 5
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && (bytes[4] == b'-' || bytes[4] == b'T')
        {
            return Ok(IonValue::Timestamp(token.parse::<Timestamp>()?));
        }

        let radix = match body.get(..2) {
            Some("0x") | Some("0X") => Some(16),
            Some("0b") | Some("0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = strip_underscores(&body[2..]).ok_or_else(invalid)?;
            let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
            return Ok(IonValue::Int(if negative { -magnitude } else { magnitude }));
        }

        let cleaned = strip_underscores(token).ok_or_else(invalid)?;
        if cleaned.contains(|c: char| c == 'e' || c == 'E') {
            let value: f64 = cleaned.parse().map_err(|_| invalid())?;
            return Ok(IonValue::Float(value));
        }
        if cleaned.contains(|c: char| c == 'd' || c == 'D' || c == '.') {
            return Ok(IonValue::Decimal(cleaned.parse::<Decimal>()?));
        }
        if !cleaned.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let int = BigInt::parse_bytes(cleaned.as_bytes(), 10).ok_or_else(invalid)?;
        Ok(IonValue::Int(int))
    }

    fn read_escape(&mut self) -> Result<Option<u32>> {
        let ch = self.next_char().ok_or_else(|| self.eof("escape sequence"))?;
        let code = match ch {
            'a' => 0x07,
            'b' => 0x08,
            't' => 0x09,
            'n' => 0x0A,
            'v' => 0x0B,
            'f' => 0x0C,
            'r' => 0x0D,
            '0' => 0x00,
            '?' | '\'' | '"' | '/' | '\\' => u32::from(ch),
            'x' => self.read_hex(2)?,
            'u' => self.read_hex(4)?,
            'U' => self.read_hex(8)?,
            '\n' => return Ok(None),
            '\r' => {
                self.eat("\n");
                return Ok(None);
            }
            other => return Err(self.syntax(&format!("invalid escape '\\{}'", other))),
        };
        Ok(Some(code))
    }

    fn read_hex(&mut self, count: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .next_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.syntax("invalid hex escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Reads quoted content up to `delimiter`, passing each code point to `push`.
    fn read_quoted<F>(&mut self, delimiter: &str, multiline: bool, mut push: F) -> Result<()>
    where
        F: FnMut(u32) -> std::result::Result<(), &'static str>,
    {
        loop {
            if self.eat(delimiter) {
                return Ok(());
            }
            let ch = self.next_char().ok_or_else(|| self.eof(delimiter))?;
            let code = match ch {
                '\\' => match self.read_escape()? {
                    Some(code) => code,
                    None => continue,
                },
                '\n' | '\r' if !multiline => return Err(self.syntax("newline in quoted text")),
                other => u32::from(other),
            };
            push(code).map_err(|msg| self.syntax(msg))?;
        }
    }

    /// Reads a short string or quoted symbol body; the opening quote is consumed.
    fn read_text(&mut self, delimiter: &str, multiline: bool) -> Result<String> {
        let mut text = String::new();
        let mut high = None;
        self.read_quoted(delimiter, multiline, |code| {
            push_code_point(&mut text, &mut high, code)
        })?;
        if high.is_some() {
            return Err(self.syntax("unpaired surrogate in escape"));
        }
        Ok(text)
    }

    /// Reads one or more adjacent `'''` segments as a single string.
    fn read_long_text(&mut self) -> Result<String> {
        let mut text = String::new();
        let mut high = None;
        while self.eat("'''") {
            self.read_quoted("'''", true, |code| {
                push_code_point(&mut text, &mut high, code)
            })?;
            let mark = self.mark();
            self.skip_trivia()?;
            if !self.starts_with("'''") {
                self.reset(mark);
            }
        }
        if high.is_some() {
            return Err(self.syntax("unpaired surrogate in escape"));
        }
        Ok(text)
    }

    fn read_clob_bytes(&mut self, delimiter: &str, multiline: bool, out: &mut Vec<u8>) -> Result<()> {
        self.read_quoted(delimiter, multiline, |code| {
            let byte = u8::try_from(code).map_err(|_| "clob text must be single-byte characters")?;
            out.push(byte);
            Ok(())
        })
    }

    fn parse_lob(&mut self) -> Result<IonValue> {
        self.eat("{{");
        self.skip_whitespace();
        let value = if self.eat("\"") {
            let mut bytes = Vec::new();
            self.read_clob_bytes("\"", false, &mut bytes)?;
            IonValue::Clob(bytes)
        } else if self.starts_with("'''") {
            let mut bytes = Vec::new();
            while self.eat("'''") {
                self.read_clob_bytes("'''", true, &mut bytes)?;
                self.skip_whitespace();
            }
            IonValue::Clob(bytes)
        } else {
            let mark = self.mark();
            let mut encoded = String::new();
            while let Some(ch) = self.peek_char() {
                if ch == '}' {
                    break;
                }
                self.next_char();
                if !ch.is_whitespace() {
                    encoded.push(ch);
                }
            }
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| self.syntax_at(mark, &format!("invalid base64 in blob: {}", e)))?;
            IonValue::Blob(bytes)
        };
        self.skip_whitespace();
        self.expect("}}")?;
        Ok(value)
    }

    fn parse_list(&mut self) -> Result<IonValue> {
        self.eat("[");
        self.enter()?;
        let mut values = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat("]") {
                break;
            }
            values.push(self.parse_value(false)?);
            self.skip_trivia()?;
            if self.eat(",") {
                continue;
            }
            self.expect("]")?;
            break;
        }
        self.leave();
        Ok(IonValue::List(values))
    }

    fn parse_sexp(&mut self) -> Result<IonValue> {
        self.eat("(");
        self.enter()?;
        let mut values = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(")") {
                break;
            }
            if self.at_end() {
                return Err(self.eof("')'"));
            }
            values.push(self.parse_value(true)?);
        }
        self.leave();
        Ok(IonValue::Sexp(values))
    }

    fn parse_field_name(&mut self) -> Result<String> {
        match self.peek_char() {
            Some('"') => {
                self.next_char();
                self.read_text("\"", false)
            }
            Some('\'') if self.starts_with("'''") => self.read_long_text(),
            Some('\'') => {
                self.next_char();
                self.read_text("'", false)
            }
            Some(ch) if is_identifier_start(ch) => Ok(self.read_identifier().to_string()),
            Some(_) => Err(self.syntax("expected a field name")),
            None => Err(self.eof("field name")),
        }
    }

    fn parse_struct(&mut self) -> Result<IonValue> {
        self.eat("{");
        self.enter()?;
        let mut fields = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat("}") {
                break;
            }
            let name = self.parse_field_name()?;
            self.skip_trivia()?;
            if !self.eat(":") {
                return Err(if self.at_end() {
                    self.eof("':' after field name")
                } else {
                    Error::syntax_with_context(
                        self.line,
                        self.column,
                        "expected ':' after field name",
                        self.current_line(),
                        Some(&format!("write the field as '{}: <value>'", name)),
                    )
                });
            }
            let value = self.parse_value(false)?;
            fields.push((name, value));
            self.skip_trivia()?;
            if self.eat(",") {
                continue;
            }
            self.expect("}")?;
            break;
        }
        self.leave();
        Ok(IonValue::Struct(fields))
    }
}

fn push_code_point(
    out: &mut String,
    high: &mut Option<u32>,
    code: u32,
) -> std::result::Result<(), &'static str> {
    let ch = match (high.take(), code) {
        (Some(h), 0xDC00..=0xDFFF) => char::from_u32(0x10000 + ((h - 0xD800) << 10) + (code - 0xDC00)),
        (Some(_), _) => return Err("unpaired surrogate in escape"),
        (None, 0xD800..=0xDBFF) => {
            *high = Some(code);
            return Ok(());
        }
        (None, 0xDC00..=0xDFFF) => return Err("unpaired surrogate in escape"),
        (None, code) => char::from_u32(code),
    };
    out.push(ch.ok_or("invalid unicode code point")?);
    Ok(())
}

fn strip_underscores(token: &str) -> Option<String> {
    if token.starts_with('_') || token.ends_with('_') || token.contains("__") {
        return None;
    }
    Some(token.replace('_', ""))
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_numeric_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-' | ':')
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '!' | '#' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | ';' | '<' | '=' | '>' | '?' | '@'
            | '^' | '`' | '|' | '~'
    )
}

fn is_value_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ']' | ')' | '}' | '/' | '"' | '\'' | '(' | '[' | '{')
}
