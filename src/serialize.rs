//! Conversion of any [serde::Serialize] host value into a [Value].
//!
//! Structs become [Record]s so that their members keep their declaration
//! order and their zero-value semantics, maps become keyed mappings.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use serde::ser::{self, Serialize};
use crate::value::{Record, Value};


impl Value {
    /// Captures a serializable host value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, SerializeError> {
        value.serialize(ValueSerializer)
    }
}


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SerializeError(String);

impl ser::Error for SerializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerializeError(msg.to_string())
    }
}


struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = SerializeError;
    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeVariant<SerializeSeq>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeVariant<SerializeRecord>;

    fn serialize_bool(self, v: bool) -> Result<Value, SerializeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, SerializeError> {
        Ok(Value::I64(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, SerializeError> {
        Ok(Value::U64(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, SerializeError> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, SerializeError> {
        Ok(Value::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, SerializeError> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerializeError> {
        Ok(Value::seq(v.iter().copied()))
    }

    fn serialize_none(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, SerializeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, SerializeError> {
        Ok(Value::from(Record::new(name)))
    }

    fn serialize_unit_variant(
        self, _name: &'static str, _index: u32, variant: &'static str
    ) -> Result<Value, SerializeError> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self, _name: &'static str, value: &T
    ) -> Result<Value, SerializeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self, _name: &'static str, _index: u32, variant: &'static str, value: &T
    ) -> Result<Value, SerializeError> {
        Ok(Value::map([(variant, value.serialize(self)?)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq, SerializeError> {
        Ok(SerializeSeq(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self, _name: &'static str, len: usize
    ) -> Result<SerializeSeq, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self, _name: &'static str, _index: u32, variant: &'static str, len: usize
    ) -> Result<SerializeVariant<SerializeSeq>, SerializeError> {
        Ok(SerializeVariant {
            variant,
            inner: SerializeSeq(Vec::with_capacity(len))
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap, SerializeError> {
        Ok(SerializeMap {
            entries: BTreeMap::new(),
            key: None
        })
    }

    fn serialize_struct(
        self, name: &'static str, _len: usize
    ) -> Result<SerializeRecord, SerializeError> {
        Ok(SerializeRecord(Record::new(name)))
    }

    fn serialize_struct_variant(
        self, _name: &'static str, _index: u32, variant: &'static str, _len: usize
    ) -> Result<SerializeVariant<SerializeRecord>, SerializeError> {
        Ok(SerializeVariant {
            variant,
            inner: SerializeRecord(Record::new(variant))
        })
    }
}


struct SerializeSeq(Vec<Value>);

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.0.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::Seq(Arc::new(self.0)))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}


struct SerializeMap {
    entries: BTreeMap<String, Value>,
    key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), SerializeError> {
        let key = match key.serialize(ValueSerializer)? {
            Value::String(s) => s.to_string(),
            Value::Null => return Err(ser::Error::custom("map key cannot be null")),
            other @ (Value::Bool(_) | Value::I64(_) | Value::U64(_) | Value::F64(_)) => other.to_string(),
            _ => return Err(ser::Error::custom("map key must be a string or a scalar"))
        };
        self.key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        let key = self.key.take()
            .ok_or_else(|| <SerializeError as ser::Error>::custom("map value without a key"))?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::Map(Arc::new(self.entries)))
    }
}


struct SerializeRecord(Record);

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self, key: &'static str, value: &T
    ) -> Result<(), SerializeError> {
        self.0.push(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::from(self.0))
    }
}


/// Enum variant carrying data, captured as a single-key mapping.
struct SerializeVariant<T> {
    variant: &'static str,
    inner: T,
}

impl ser::SerializeTupleVariant for SerializeVariant<SerializeSeq> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        let inner = ser::SerializeSeq::end(self.inner)?;
        Ok(Value::map([(self.variant, inner)]))
    }
}

impl ser::SerializeStructVariant for SerializeVariant<SerializeRecord> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self, key: &'static str, value: &T
    ) -> Result<(), SerializeError> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        let inner = ser::SerializeStruct::end(self.inner)?;
        Ok(Value::map([(self.variant, inner)]))
    }
}
