//! A two-byte integer, carried as the decimal string form of a `u16`.

use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// Byte order for `Word`. A two-variant enum stands in for `std`'s lack of
/// a built-in endianness trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Two-byte integer codec. Ported from `types.Word`.
#[derive(Debug, Clone, Copy)]
pub struct Word {
    pub order: ByteOrder,
}

impl Default for Word {
    fn default() -> Self {
        Word { order: ByteOrder::BigEndian }
    }
}

impl Word {
    pub fn new(order: ByteOrder) -> Self {
        Word { order }
    }

    fn value_as_int(&self, value: &Value) -> Result<u16, SerializeError> {
        let s = value.as_text().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "text", got: value.type_name() },
            )
        })?;

        s.parse::<u16>()
            .map_err(|_| SerializeError::new(self.name(), SerializeReason::InvalidDigit('\0')))
    }
}

impl Serdes for Word {
    fn name(&self) -> &'static str {
        "word"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let v = self.value_as_int(value)?;
        Ok(match self.order {
            ByteOrder::BigEndian => v.to_be_bytes().to_vec(),
            ByteOrder::LittleEndian => v.to_le_bytes().to_vec(),
        })
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let raw = buffer.take(2).ok_or_else(|| {
            DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
        })?;

        let v = match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes([raw[0], raw[1]]),
            ByteOrder::LittleEndian => u16::from_le_bytes([raw[0], raw[1]]),
        };

        Ok(Value::Text(v.to_string()))
    }
}
