//! Payload codec.
//!
//! Maps an in-memory [`Record`] to and from the wire bytes handed to the
//! storage engine. The frame layout is engine-private: a schema tag followed
//! by length-delimited, type-tagged fields. Both directions validate against
//! the bound [`SchemaDescriptor`]; `decode(encode(r)) == r` for every valid
//! record.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::sync::Arc;

use crate::core::error::QueueError;
use crate::core::lob::LobRef;
use crate::core::schema::{FieldType, Record, SchemaDescriptor, Value};

const TAG_NULL: u8 = 0;
const TAG_TEXT: u8 = 1;
const TAG_NUMBER: u8 = 2;
const TAG_TIMESTAMP: u8 = 3;
const TAG_LOB: u8 = 4;

/// Codec bound to one schema descriptor at queue-bind time.
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    descriptor: Arc<SchemaDescriptor>,
}

impl PayloadCodec {
    pub fn new(descriptor: Arc<SchemaDescriptor>) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    /// Serializes `record`, failing with `SchemaViolation` when its schema
    /// tag, field set, field order, types or null usage do not match the
    /// bound descriptor.
    pub fn encode(&self, record: &Record) -> Result<Bytes, QueueError> {
        self.check_record(record)?;

        let mut buf = BytesMut::with_capacity(64);
        put_str(&mut buf, record.schema());
        buf.put_u16(record.fields().len() as u16);
        for (name, value) in record.fields() {
            put_str(&mut buf, name);
            match value {
                Value::Null => buf.put_u8(TAG_NULL),
                Value::Text(s) => {
                    buf.put_u8(TAG_TEXT);
                    buf.put_u32(s.len() as u32);
                    buf.put_slice(s.as_bytes());
                }
                Value::Number(n) => {
                    buf.put_u8(TAG_NUMBER);
                    buf.put_f64(*n);
                }
                Value::Timestamp(ts) => {
                    buf.put_u8(TAG_TIMESTAMP);
                    buf.put_i64(*ts);
                }
                Value::Lob(lob) => {
                    buf.put_u8(TAG_LOB);
                    buf.put_u64(lob.raw());
                }
            }
        }
        Ok(buf.freeze())
    }

    /// Deserializes a frame produced by [`encode`](Self::encode), applying
    /// the same descriptor validation.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record, QueueError> {
        let mut buf = bytes;
        let schema = get_str(&mut buf)?;
        let count = get_u16(&mut buf)? as usize;

        let mut record = Record::new(schema);
        for _ in 0..count {
            let name = get_str(&mut buf)?;
            let tag = get_u8(&mut buf)?;
            let value = match tag {
                TAG_NULL => Value::Null,
                TAG_TEXT => {
                    let len = get_u32(&mut buf)? as usize;
                    if buf.remaining() < len {
                        return Err(truncated());
                    }
                    let raw = buf.copy_to_bytes(len);
                    let text = String::from_utf8(raw.to_vec()).map_err(|_| {
                        QueueError::SchemaViolation("text field is not valid UTF-8".into())
                    })?;
                    Value::Text(text)
                }
                TAG_NUMBER => Value::Number(get_f64(&mut buf)?),
                TAG_TIMESTAMP => Value::Timestamp(get_i64(&mut buf)?),
                TAG_LOB => Value::Lob(LobRef::from_raw(get_u64(&mut buf)?)),
                other => {
                    return Err(QueueError::SchemaViolation(format!(
                        "unknown field tag {other}"
                    )))
                }
            };
            record = record.with(name, value);
        }

        self.check_record(&record)?;
        Ok(record)
    }

    fn check_record(&self, record: &Record) -> Result<(), QueueError> {
        if record.schema() != self.descriptor.name() {
            return Err(QueueError::SchemaViolation(format!(
                "record carries schema '{}', handle is bound to '{}'",
                record.schema(),
                self.descriptor.name()
            )));
        }
        if record.fields().len() != self.descriptor.fields().len() {
            return Err(QueueError::SchemaViolation(format!(
                "schema '{}' has {} fields, record has {}",
                self.descriptor.name(),
                self.descriptor.fields().len(),
                record.fields().len()
            )));
        }
        for (def, (name, value)) in self.descriptor.fields().iter().zip(record.fields()) {
            if *name != def.name {
                return Err(QueueError::SchemaViolation(format!(
                    "expected field '{}', record has '{}'",
                    def.name, name
                )));
            }
            match value {
                Value::Null if def.nullable => {}
                Value::Null => {
                    return Err(QueueError::SchemaViolation(format!(
                        "field '{}' is not nullable",
                        def.name
                    )))
                }
                other if other.matches(def.ty) => {}
                other => {
                    return Err(QueueError::SchemaViolation(format!(
                        "field '{}' expects {}, got {}",
                        def.name,
                        def.ty.name(),
                        other.kind()
                    )))
                }
            }
        }
        Ok(())
    }
}

fn put_str(buf: &mut BytesMut, s: &str) {
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

fn truncated() -> QueueError {
    QueueError::SchemaViolation("truncated payload frame".into())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8, QueueError> {
    if buf.remaining() < 1 {
        return Err(truncated());
    }
    Ok(buf.get_u8())
}

fn get_u16(buf: &mut &[u8]) -> Result<u16, QueueError> {
    if buf.remaining() < 2 {
        return Err(truncated());
    }
    Ok(buf.get_u16())
}

fn get_u32(buf: &mut &[u8]) -> Result<u32, QueueError> {
    if buf.remaining() < 4 {
        return Err(truncated());
    }
    Ok(buf.get_u32())
}

fn get_u64(buf: &mut &[u8]) -> Result<u64, QueueError> {
    if buf.remaining() < 8 {
        return Err(truncated());
    }
    Ok(buf.get_u64())
}

fn get_i64(buf: &mut &[u8]) -> Result<i64, QueueError> {
    if buf.remaining() < 8 {
        return Err(truncated());
    }
    Ok(buf.get_i64())
}

fn get_f64(buf: &mut &[u8]) -> Result<f64, QueueError> {
    if buf.remaining() < 8 {
        return Err(truncated());
    }
    Ok(buf.get_f64())
}

fn get_str(buf: &mut &[u8]) -> Result<String, QueueError> {
    let len = get_u16(buf)? as usize;
    if buf.remaining() < len {
        return Err(truncated());
    }
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| QueueError::SchemaViolation("name is not valid UTF-8".into()))
}
