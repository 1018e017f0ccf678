//! Streaming XML writer with namespace prefixes and optional gzip output.

use std::io::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, ErrorKind, Result};
use crate::sobject::{FieldValue, SObject, TYPE_FIELD};

/// Element holding the names of fields to clear on update.
const FIELDS_TO_NULL: &str = "fieldsToNull";

enum Sink {
    Plain(Vec<u8>),
    Gzip(GzEncoder<Vec<u8>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::Plain(v) => v.write(buf),
            Sink::Gzip(gz) => gz.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::Plain(v) => v.flush(),
            Sink::Gzip(gz) => gz.flush(),
        }
    }
}

impl Sink {
    fn finish(self) -> std::io::Result<Vec<u8>> {
        match self {
            Sink::Plain(v) => Ok(v),
            Sink::Gzip(gz) => gz.finish(),
        }
    }
}

/// Writes one XML document incrementally.
///
/// Open elements are tracked on a stack so every close tag matches its open
/// tag. Prefixes declared with [`XmlWriter::start_prefix_mapping`] are emitted
/// as `xmlns:` attributes on the next opened element.
pub struct XmlWriter {
    inner: Writer<Sink>,
    /// Open elements as qualified names.
    stack: Vec<String>,
    /// Active `(prefix, uri)` bindings, innermost last.
    mappings: Vec<(String, String)>,
    /// Bindings not yet written to an element.
    pending: Vec<(String, String)>,
    started: bool,
}

impl std::fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter")
            .field("stack", &self.stack)
            .field("mappings", &self.mappings)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl XmlWriter {
    /// Create a writer, gzip-compressing the output when `compress` is set.
    pub fn new(compress: bool) -> Self {
        let sink = if compress {
            Sink::Gzip(GzEncoder::new(Vec::new(), Compression::default()))
        } else {
            Sink::Plain(Vec::new())
        };
        Self {
            inner: Writer::new(sink),
            stack: Vec::new(),
            mappings: Vec::new(),
            pending: Vec::new(),
            started: false,
        }
    }

    /// Emit the XML declaration. Allowed once, before any element.
    pub fn start_document(&mut self) -> Result<()> {
        if self.started || !self.stack.is_empty() {
            return Err(xml_error("document already started"));
        }
        self.inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.started = true;
        Ok(())
    }

    /// Bind `prefix` to `uri` for subsequently opened elements.
    pub fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        let binding = (prefix.to_string(), uri.to_string());
        self.mappings.push(binding.clone());
        self.pending.push(binding);
    }

    /// Retire the most recently declared prefix, which must be `prefix`.
    pub fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
        match self.mappings.last() {
            Some((p, _)) if p == prefix => {
                self.mappings.pop();
                if let Some(pos) = self.pending.iter().rposition(|(p, _)| p == prefix) {
                    self.pending.remove(pos);
                }
                Ok(())
            }
            Some((p, _)) => Err(xml_error(format!(
                "prefix `{prefix}` retired while `{p}` is still in scope"
            ))),
            None => Err(xml_error(format!("prefix `{prefix}` was never declared"))),
        }
    }

    /// Open an element with no attributes.
    pub fn start_element(&mut self, namespace: Option<&str>, name: &str) -> Result<()> {
        self.start_element_with(namespace, name, &[])
    }

    /// Open an element. Pending prefix declarations are written on it first.
    pub fn start_element_with(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<()> {
        let qname = self.qualify(namespace, name)?;
        let mut start = BytesStart::new(qname.as_str());

        for (prefix, uri) in self.pending.drain(..) {
            let key = format!("xmlns:{prefix}");
            start.push_attribute((key.as_str(), uri.as_str()));
        }
        for &attr in attributes {
            start.push_attribute(attr);
        }

        self.inner.write_event(Event::Start(start))?;
        self.stack.push(qname);
        Ok(())
    }

    /// Close the innermost open element.
    pub fn end_element(&mut self) -> Result<()> {
        let qname = self
            .stack
            .pop()
            .ok_or_else(|| xml_error("end_element with no open element"))?;
        self.inner
            .write_event(Event::End(BytesEnd::new(qname.as_str())))?;
        Ok(())
    }

    /// Write escaped text content.
    pub fn characters(&mut self, text: &str) -> Result<()> {
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Write `<name>text</name>`.
    pub fn write_text_element(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<()> {
        self.start_element(namespace, name)?;
        self.characters(text)?;
        self.end_element()
    }

    /// Write a value under `name` following its shape.
    ///
    /// Sequences become repeated siblings named `name`; records become one
    /// element whose `type` child comes first; scalars become a text element.
    pub fn write_element<V: XmlValue + ?Sized>(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        value: &V,
    ) -> Result<()> {
        value.write_xml(self, namespace, name)
    }

    /// Write the children of a record element: `type`, then `fieldsToNull`
    /// entries for cleared fields, then the remaining fields in order.
    ///
    /// The record is only read.
    pub fn write_record_fields(&mut self, namespace: Option<&str>, record: &SObject) -> Result<()> {
        self.write_text_element(namespace, TYPE_FIELD, record.object_type())?;

        for (name, _) in record.fields().filter(|(_, v)| v.is_null()) {
            self.write_text_element(namespace, FIELDS_TO_NULL, name)?;
        }
        for (name, value) in record.fields().filter(|(_, v)| !v.is_null()) {
            self.write_element(namespace, name, value)?;
        }
        Ok(())
    }

    /// Current element nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Finish the document and return its bytes, compressed if configured.
    ///
    /// Fails if any element is still open.
    pub fn end_document(self) -> Result<Vec<u8>> {
        if let Some(open) = self.stack.last() {
            return Err(xml_error(format!(
                "{} element(s) still open, innermost <{open}>",
                self.stack.len()
            )));
        }
        Ok(self.inner.into_inner().finish()?)
    }

    fn qualify(&self, namespace: Option<&str>, name: &str) -> Result<String> {
        let Some(ns) = namespace else {
            return Ok(name.to_string());
        };
        self.mappings
            .iter()
            .rev()
            .find(|(_, uri)| uri == ns)
            .map(|(prefix, _)| format!("{prefix}:{name}"))
            .ok_or_else(|| xml_error(format!("no prefix declared for namespace {ns}")))
    }
}

fn xml_error(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::Xml(msg.into()))
}

/// A value that knows how to render itself as XML.
pub trait XmlValue {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str)
        -> Result<()>;
}

impl<T: XmlValue + ?Sized> XmlValue for &T {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        (**self).write_xml(writer, namespace, name)
    }
}

impl<T: XmlValue> XmlValue for [T] {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        for item in self {
            item.write_xml(writer, namespace, name)?;
        }
        Ok(())
    }
}

impl<T: XmlValue> XmlValue for Vec<T> {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        self.as_slice().write_xml(writer, namespace, name)
    }
}

impl XmlValue for str {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        writer.write_text_element(namespace, name, self)
    }
}

impl XmlValue for String {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        writer.write_text_element(namespace, name, self)
    }
}

macro_rules! display_value {
    ($($t:ty),*) => {
        $(
            impl XmlValue for $t {
                fn write_xml(
                    &self,
                    writer: &mut XmlWriter,
                    namespace: Option<&str>,
                    name: &str,
                ) -> Result<()> {
                    writer.write_text_element(namespace, name, &self.to_string())
                }
            }
        )*
    };
}

display_value!(i32, i64, u32, u64, usize, f64, bool);

impl XmlValue for NaiveDate {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        writer.write_text_element(namespace, name, &self.format("%Y-%m-%d").to_string())
    }
}

impl XmlValue for DateTime<Utc> {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        writer.write_text_element(
            namespace,
            name,
            &self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )
    }
}

impl XmlValue for SObject {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        writer.start_element(namespace, name)?;
        writer.write_record_fields(namespace, self)?;
        writer.end_element()
    }
}

impl XmlValue for FieldValue {
    fn write_xml(&self, writer: &mut XmlWriter, namespace: Option<&str>, name: &str) -> Result<()> {
        match self {
            FieldValue::Record(record) => record.write_xml(writer, namespace, name),
            FieldValue::List(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    item.write_xml(writer, namespace, name)?;
                }
                Ok(())
            }
            // Cleared fields are carried by fieldsToNull on the owning record.
            FieldValue::Null => Ok(()),
            scalar => match scalar.as_text() {
                Some(text) => writer.write_text_element(namespace, name, &text),
                None => Ok(()),
            },
        }
    }
}
