//! Push-style writing of Ion values.
//!
//! [`IonWriter`] is the interface the [`Encoder`](crate::Encoder) drives.
//! [`ElementWriter`] assembles the calls into [`Element`]s and
//! [`DocumentWriter`] serializes those elements once closed.

use crate::binary_writer::BinaryWriter;
use crate::text_writer::TextWriter;
use crate::{
    CodecOptions, Decimal, Element, Error, IonType, IonValue, OutputFormat, Result, Timestamp,
};
use num_bigint::BigInt;

/// A writer that receives one value per call, with containers opened by
/// `step_in` and closed by `step_out`.
///
/// Annotations and field names are set before the value they apply to.
pub trait IonWriter {
    /// Appends annotations for the next value.
    fn set_annotations(&mut self, annotations: &[String]) -> Result<()>;

    /// Sets the field name for the next value; only valid inside a struct.
    fn write_field_name(&mut self, name: &str) -> Result<()>;

    fn write_null(&mut self, ion_type: IonType) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()>;

    fn write_int(&mut self, value: &BigInt) -> Result<()>;

    fn write_f64(&mut self, value: f64) -> Result<()>;

    fn write_decimal(&mut self, value: &Decimal) -> Result<()>;

    fn write_timestamp(&mut self, value: &Timestamp) -> Result<()>;

    fn write_string(&mut self, value: &str) -> Result<()>;

    fn write_symbol(&mut self, value: &str) -> Result<()>;

    fn write_blob(&mut self, value: &[u8]) -> Result<()>;

    fn write_clob(&mut self, value: &[u8]) -> Result<()>;

    /// Opens a list, sexp or struct.
    fn step_in(&mut self, container: IonType) -> Result<()>;

    fn step_out(&mut self) -> Result<()>;

    fn depth(&self) -> usize;
}

struct OpenContainer {
    ion_type: IonType,
    annotations: Vec<String>,
    field_name: Option<String>,
    values: Vec<Element>,
    fields: Vec<(String, Element)>,
}

/// An [`IonWriter`] that builds owned [`Element`]s.
///
/// # Examples
///
/// ```rust
/// use ion_json::{ElementWriter, IonType, IonValue, IonWriter};
///
/// let mut writer = ElementWriter::new();
/// writer.step_in(IonType::Struct).unwrap();
/// writer.write_field_name("ok").unwrap();
/// writer.write_bool(true).unwrap();
/// writer.step_out().unwrap();
///
/// let elements = writer.finish().unwrap();
/// assert_eq!(elements.len(), 1);
/// assert_eq!(elements[0].ion_type(), IonType::Struct);
/// ```
#[derive(Default)]
pub struct ElementWriter {
    stack: Vec<OpenContainer>,
    finished: Vec<Element>,
    annotations: Vec<String>,
    field_name: Option<String>,
}

impl ElementWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completed top-level elements, leaving the writer empty.
    ///
    /// # Errors
    ///
    /// Fails if a container is still open or a field name or annotation is pending.
    pub fn take_finished(&mut self) -> Result<Vec<Element>> {
        if !self.stack.is_empty() {
            return Err(Error::malformed(format!(
                "{} container(s) left open",
                self.stack.len()
            )));
        }
        if self.field_name.is_some() || !self.annotations.is_empty() {
            return Err(Error::malformed("field name or annotations set without a value"));
        }
        Ok(std::mem::take(&mut self.finished))
    }

    /// Consumes the writer and returns its top-level elements.
    pub fn finish(mut self) -> Result<Vec<Element>> {
        self.take_finished()
    }

    fn in_struct(&self) -> bool {
        self.stack
            .last()
            .map_or(false, |open| open.ion_type == IonType::Struct)
    }

    /// Takes the pending field name, checking it matches the enclosing container.
    fn take_field_name(&mut self) -> Result<Option<String>> {
        match (self.in_struct(), self.field_name.take()) {
            (true, Some(name)) => Ok(Some(name)),
            (true, None) => Err(Error::malformed("struct field written without a field name")),
            (false, Some(name)) => Err(Error::malformed(format!(
                "field name {:?} set outside a struct",
                name
            ))),
            (false, None) => Ok(None),
        }
    }

    fn attach(&mut self, field_name: Option<String>, element: Element) {
        match (self.stack.last_mut(), field_name) {
            (Some(open), Some(name)) => open.fields.push((name, element)),
            (Some(open), None) => open.values.push(element),
            (None, _) => self.finished.push(element),
        }
    }

    fn push_value(&mut self, value: IonValue) -> Result<()> {
        let field_name = self.take_field_name()?;
        let annotations = std::mem::take(&mut self.annotations);
        self.attach(field_name, Element::new(value).with_annotations(annotations));
        Ok(())
    }
}

impl IonWriter for ElementWriter {
    fn set_annotations(&mut self, annotations: &[String]) -> Result<()> {
        self.annotations.extend(annotations.iter().cloned());
        Ok(())
    }

    fn write_field_name(&mut self, name: &str) -> Result<()> {
        if !self.in_struct() {
            return Err(Error::malformed(format!(
                "field name {:?} set outside a struct",
                name
            )));
        }
        self.field_name = Some(name.to_string());
        Ok(())
    }

    fn write_null(&mut self, ion_type: IonType) -> Result<()> {
        self.push_value(IonValue::Null(ion_type))
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.push_value(IonValue::Bool(value))
    }

    fn write_int(&mut self, value: &BigInt) -> Result<()> {
        self.push_value(IonValue::Int(value.clone()))
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.push_value(IonValue::Float(value))
    }

    fn write_decimal(&mut self, value: &Decimal) -> Result<()> {
        self.push_value(IonValue::Decimal(value.clone()))
    }

    fn write_timestamp(&mut self, value: &Timestamp) -> Result<()> {
        self.push_value(IonValue::Timestamp(value.clone()))
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.push_value(IonValue::String(value.to_string()))
    }

    fn write_symbol(&mut self, value: &str) -> Result<()> {
        self.push_value(IonValue::Symbol(value.to_string()))
    }

    fn write_blob(&mut self, value: &[u8]) -> Result<()> {
        self.push_value(IonValue::Blob(value.to_vec()))
    }

    fn write_clob(&mut self, value: &[u8]) -> Result<()> {
        self.push_value(IonValue::Clob(value.to_vec()))
    }

    fn step_in(&mut self, container: IonType) -> Result<()> {
        if !container.is_container() {
            return Err(Error::malformed(format!("cannot step into {}", container)));
        }
        let field_name = self.take_field_name()?;
        let annotations = std::mem::take(&mut self.annotations);
        self.stack.push(OpenContainer {
            ion_type: container,
            annotations,
            field_name,
            values: Vec::new(),
            fields: Vec::new(),
        });
        Ok(())
    }

    fn step_out(&mut self) -> Result<()> {
        if self.field_name.is_some() || !self.annotations.is_empty() {
            return Err(Error::malformed("field name or annotations set without a value"));
        }
        let open = self
            .stack
            .pop()
            .ok_or_else(|| Error::malformed("step_out called at the top level"))?;
        let value = match open.ion_type {
            IonType::List => IonValue::List(open.values),
            IonType::Sexp => IonValue::Sexp(open.values),
            _ => IonValue::Struct(open.fields),
        };
        self.attach(
            open.field_name,
            Element::new(value).with_annotations(open.annotations),
        );
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// An [`IonWriter`] producing a complete Ion document in one [`OutputFormat`].
///
/// Values are collected until [`close`](DocumentWriter::close); the serialized
/// document is then available from [`bytes`](DocumentWriter::bytes).
///
/// # Examples
///
/// ```rust
/// use ion_json::{DocumentWriter, IonWriter, OutputFormat};
///
/// let mut writer = DocumentWriter::new(OutputFormat::Text);
/// writer.write_symbol("hello").unwrap();
/// writer.close().unwrap();
/// assert_eq!(writer.bytes().unwrap(), b"hello");
/// ```
pub struct DocumentWriter {
    inner: ElementWriter,
    format: OutputFormat,
    options: CodecOptions,
    output: Option<Vec<u8>>,
}

impl DocumentWriter {
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self::with_options(format, CodecOptions::default())
    }

    #[must_use]
    pub fn with_options(format: OutputFormat, options: CodecOptions) -> Self {
        DocumentWriter {
            inner: ElementWriter::new(),
            format,
            options,
            output: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Serializes every value written so far. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if a container is still open, or if a value cannot be encoded
    /// in the output format.
    pub fn close(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }
        let elements = self.inner.take_finished()?;
        let output = match self.format {
            OutputFormat::Binary => BinaryWriter::new().write_document(&elements)?,
            OutputFormat::Text => TextWriter::compact().write_document(&elements).into_bytes(),
            OutputFormat::Pretty => TextWriter::pretty(self.options.indent)
                .write_document(&elements)
                .into_bytes(),
        };
        tracing::trace!(
            format = self.format.as_str(),
            values = elements.len(),
            bytes = output.len(),
            "closed ion document"
        );
        self.output = Some(output);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.output.is_some()
    }

    /// Returns the serialized document.
    ///
    /// # Errors
    ///
    /// Fails if the writer has not been closed.
    pub fn bytes(&self) -> Result<&[u8]> {
        self.output
            .as_deref()
            .ok_or_else(|| Error::malformed("document writer has not been closed"))
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.output
            .ok_or_else(|| Error::malformed("document writer has not been closed"))
    }

    fn open(&mut self) -> Result<&mut ElementWriter> {
        if self.output.is_some() {
            return Err(Error::malformed("document writer is already closed"));
        }
        Ok(&mut self.inner)
    }
}

impl IonWriter for DocumentWriter {
    fn set_annotations(&mut self, annotations: &[String]) -> Result<()> {
        self.open()?.set_annotations(annotations)
    }

    fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.open()?.write_field_name(name)
    }

    fn write_null(&mut self, ion_type: IonType) -> Result<()> {
        self.open()?.write_null(ion_type)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.open()?.write_bool(value)
    }

    fn write_int(&mut self, value: &BigInt) -> Result<()> {
        self.open()?.write_int(value)
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.open()?.write_f64(value)
    }

    fn write_decimal(&mut self, value: &Decimal) -> Result<()> {
        self.open()?.write_decimal(value)
    }

    fn write_timestamp(&mut self, value: &Timestamp) -> Result<()> {
        self.open()?.write_timestamp(value)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.open()?.write_string(value)
    }

    fn write_symbol(&mut self, value: &str) -> Result<()> {
        self.open()?.write_symbol(value)
    }

    fn write_blob(&mut self, value: &[u8]) -> Result<()> {
        self.open()?.write_blob(value)
    }

    fn write_clob(&mut self, value: &[u8]) -> Result<()> {
        self.open()?.write_clob(value)
    }

    fn step_in(&mut self, container: IonType) -> Result<()> {
        self.open()?.step_in(container)
    }

    fn step_out(&mut self) -> Result<()> {
        self.open()?.step_out()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }
}
