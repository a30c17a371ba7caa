//! Payload schemas and the loosely-typed value boundary.
//!
//! A queue is bound to exactly one named structured type. Descriptors form a
//! closed set registered administratively; records are validated against the
//! bound descriptor on both encode and decode.

use crate::core::lob::LobRef;

/// Field types supported by payload schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
    Timestamp,
    /// Large object, carried by reference and streamed out of band.
    Lob,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Timestamp => "timestamp",
            FieldType::Lob => "lob",
        }
    }
}

/// A single field of a structured payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    pub fn nullable(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
        }
    }
}

/// A named structured payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<FieldDef>,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A dynamically-typed field value as it crosses the queue boundary.
///
/// Recipient lists also arrive as `Value`s so that non-text elements can be
/// rejected with their position instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Lob(LobRef),
    Null,
}

impl Value {
    /// Human-readable kind tag used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Lob(_) => "lob",
            Value::Null => "null",
        }
    }

    /// Whether this value inhabits `ty`. `Null` never matches; nullability
    /// is checked separately against the field definition.
    pub fn matches(&self, ty: FieldType) -> bool {
        matches!(
            (self, ty),
            (Value::Text(_), FieldType::Text)
                | (Value::Number(_), FieldType::Number)
                | (Value::Timestamp(_), FieldType::Timestamp)
                | (Value::Lob(_), FieldType::Lob)
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

/// An ordered record conforming to one schema descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field. Order is significant and must match the descriptor.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}
