//! A single byte, carried as the decimal string form of its value 0..255.

use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// One-byte integer codec. Ported from `types.Byte`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Byte;

impl Byte {
    pub fn new() -> Self {
        Byte
    }

    fn value_as_int(&self, value: &Value) -> Result<u8, SerializeError> {
        let s = value.as_text().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "text", got: value.type_name() },
            )
        })?;

        s.parse::<u32>()
            .ok()
            .filter(|v| *v <= u8::MAX as u32)
            .map(|v| v as u8)
            .ok_or_else(|| SerializeError::new(self.name(), SerializeReason::InvalidDigit('\0')))
    }
}

impl Serdes for Byte {
    fn name(&self) -> &'static str {
        "byte"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        Ok(vec![self.value_as_int(value)?])
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let b = buffer.read_byte().ok_or_else(|| {
            DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
        })?;
        Ok(Value::Text(b.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let b = Byte::new();
        let encoded = b.serialize(&Value::from("200")).unwrap();
        assert_eq!(encoded, vec![200]);

        let mut buf = Buffer::new(encoded);
        assert_eq!(b.deserialize(&mut buf).unwrap(), Value::from("200"));
    }

    #[test]
    fn serialize_rejects_out_of_range_and_non_numeric() {
        let b = Byte::new();
        assert!(b.serialize(&Value::from("256")).is_err());
        assert!(b.serialize(&Value::from("abc")).is_err());
        assert!(b.serialize(&Value::Bytes(vec![1])).is_err());
    }

    #[test]
    fn deserialize_empty_buffer_errors() {
        let b = Byte::new();
        let mut buf = Buffer::new(vec![]);
        assert!(b.deserialize(&mut buf).is_err());
    }
}
