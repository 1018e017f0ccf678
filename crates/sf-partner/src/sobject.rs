//! Records and field values.
//!
//! An [`SObject`] always carries its remote type separately from its fields,
//! so the `type` element can be written first without touching the field list.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::namespaces::{SOBJECT_NS, XSI_NS};
use crate::response::XmlNode;

/// Reserved field name holding the record type.
pub const TYPE_FIELD: &str = "type";

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Nested record, e.g. a relationship.
    Record(SObject),
    /// Written as repeated sibling elements with the same name.
    List(Vec<FieldValue>),
    /// Explicitly cleared field; written as a `fieldsToNull` entry.
    Null,
}

impl FieldValue {
    /// Text form of a scalar value. `None` for records, lists and null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => {
                Some(dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
            }
            FieldValue::Record(_) | FieldValue::List(_) | FieldValue::Null => None,
        }
    }

    /// Borrow the string if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested record.
    pub fn as_record(&self) -> Option<&SObject> {
        match self {
            FieldValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<SObject> for FieldValue {
    fn from(v: SObject) -> Self {
        FieldValue::Record(v)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A typed record: the remote type plus an insertion-ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct SObject {
    object_type: String,
    fields: Vec<(String, FieldValue)>,
}

impl SObject {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style [`SObject::set`].
    ///
    /// A `type` value that has no text form leaves the record type unchanged
    /// and is logged; call [`SObject::set`] to get the error instead.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        if let Err(err) = self.set(name, value) {
            warn!(error = %err, object_type = %self.object_type, "Ignoring field");
        }
        self
    }

    /// Set a field, replacing any previous value in place.
    ///
    /// Setting `type` changes the record type. Scalars are converted to their
    /// text form; a record, list or null is rejected.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Result<()> {
        let name = name.into();
        let value = value.into();

        if name == TYPE_FIELD {
            self.object_type = value.as_text().ok_or_else(|| {
                Error::new(ErrorKind::InvalidRecord(format!(
                    "`type` must be text, got {value:?}"
                )))
            })?;
            return Ok(());
        }

        self.insert_field(name, value);
        Ok(())
    }

    fn insert_field(&mut self, name: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Text value of a field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// The record Id, when present.
    pub fn id(&self) -> Option<&str> {
        self.get_str("Id")
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Fields in insertion order, `type` excluded.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<serde_json::Value> for SObject {
    type Error = Error;

    /// Convert a JSON object carrying a `type` key.
    fn try_from(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(Error::new(ErrorKind::InvalidRecord(
                "expected a JSON object".to_string(),
            )));
        };

        let object_type = match map.remove(TYPE_FIELD) {
            Some(serde_json::Value::String(t)) => t,
            Some(_) => {
                return Err(Error::new(ErrorKind::InvalidRecord(
                    "`type` must be a string".to_string(),
                )))
            }
            None => {
                return Err(Error::new(ErrorKind::InvalidRecord(
                    "missing `type`".to_string(),
                )))
            }
        };

        let mut record = SObject::new(object_type);
        for (name, value) in map {
            record.set(name, json_to_value(value)?)?;
        }
        Ok(record)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Date(_) | FieldValue::DateTime(_) => {
                serializer.serialize_str(&self.as_text().unwrap_or_default())
            }
            FieldValue::Record(record) => record.serialize(serializer),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

/// Serializes as a map with `type` first, matching the JSON accepted by
/// `TryFrom<serde_json::Value>`.
impl Serialize for SObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(TYPE_FIELD, &self.object_type)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn json_to_value(value: serde_json::Value) -> Result<FieldValue> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Int(i),
            None => FieldValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => FieldValue::Text(s),
        Value::Array(items) => FieldValue::List(
            items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        obj @ Value::Object(_) => FieldValue::Record(SObject::try_from(obj)?),
    })
}

impl TryFrom<&XmlNode> for SObject {
    type Error = Error;

    /// Decode a record element such as `<records xsi:type="sf:sObject">`.
    ///
    /// Field values come back as text since the response carries no schema.
    /// Nil fields decode to [`FieldValue::Null`], nested records and nested
    /// query results decode recursively.
    fn try_from(node: &XmlNode) -> Result<Self> {
        let object_type = node
            .child(Some(SOBJECT_NS), TYPE_FIELD)
            .map(|t| t.text().to_string())
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(format!(
                    "<{}> has no sObject type",
                    node.name()
                )))
            })?;

        let mut record = SObject::new(object_type);
        for child in node.children() {
            if child.name() == TYPE_FIELD {
                continue;
            }
            // The Partner API repeats Id when it is both selected and implied.
            if child.name() == "Id" && record.get("Id").is_some() {
                continue;
            }
            record.insert_field(child.name().to_string(), node_to_value(child)?);
        }
        Ok(record)
    }
}

fn node_to_value(node: &XmlNode) -> Result<FieldValue> {
    if node.is_nil() {
        return Ok(FieldValue::Null);
    }

    let xsi_type = node.attribute(Some(XSI_NS), "type").unwrap_or_default();
    if xsi_type.ends_with("QueryResult") {
        let records = node
            .children()
            .iter()
            .filter(|c| c.name() == "records")
            .map(|c| SObject::try_from(c).map(FieldValue::Record))
            .collect::<Result<Vec<_>>>()?;
        return Ok(FieldValue::List(records));
    }

    if node.child(Some(SOBJECT_NS), TYPE_FIELD).is_some() {
        return SObject::try_from(node).map(FieldValue::Record);
    }

    Ok(FieldValue::Text(node.text().to_string()))
}
