//! A length-prefixed wrapper around a data codec, with the BCD digit-count
//! convention centralized here: Visa-style length fields count digits, not
//! bytes, when the wrapped data is BCD.

use crate::bcd::Bcd;
use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// Length + data combinator. Ported from `types.VarLength`.
pub struct VarLength {
    pub length: Box<dyn Serdes>,
    pub data: Box<dyn Serdes>,
}

impl VarLength {
    pub fn new(length: impl Serdes + 'static, data: impl Serdes + 'static) -> Self {
        VarLength { length: Box::new(length), data: Box::new(data) }
    }

    fn data_is_bcd(&self) -> bool {
        // `dyn Serdes` carries no downcast without `Any`, so the BCD
        // convention is recognized by name instead — every `Bcd` value
        // reports `name() == "bcd"` and no other leaf does.
        self.data.name() == "bcd"
    }
}

impl Serdes for VarLength {
    fn name(&self) -> &'static str {
        "var_length"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let serialized_data = self
            .data
            .serialize(value)
            .map_err(|e| SerializeError::wrap(self.name(), None, e))?;

        let declared_length = if self.data_is_bcd() {
            // Visa specifies (p. 76) that BCD types must indicate real data
            // size, ignoring leading zeros: use the input string's digit
            // count when available, else assume no odd padding.
            match value.as_text() {
                Some(s) => s.len(),
                None => serialized_data.len() * 2,
            }
        } else {
            serialized_data.len()
        };

        let length_str = declared_length.to_string();
        let serialized_length = self
            .length
            .serialize(&Value::Text(length_str))
            .map_err(|e| SerializeError::wrap(self.name(), None, e))?;

        let mut out = serialized_length;
        out.extend_from_slice(&serialized_data);
        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let deserialized_length = self
            .length
            .deserialize(buffer)
            .map_err(|e| DeserializeError::wrap(self.name(), None, buffer.remaining(), e))?;

        let length_str = deserialized_length.as_text().ok_or_else(|| {
            DeserializeError::new(self.name(), DeserializeReason::MalformedValue, buffer.remaining())
        })?;

        let mut length_in: usize = length_str.parse().map_err(|_| {
            DeserializeError::new(self.name(), DeserializeReason::MalformedValue, buffer.remaining())
        })?;

        if self.data_is_bcd() {
            length_in = length_in.div_ceil(2);
        }

        if buffer.remaining() < length_in {
            return Err(DeserializeError::new(
                self.name(),
                DeserializeReason::NotEnoughBytes,
                buffer.remaining(),
            ));
        }

        if length_in == 0 {
            return self
                .data
                .deserialize(&mut Buffer::empty())
                .map_err(|e| DeserializeError::wrap(self.name(), None, 0, e));
        }

        let slice = buffer.take(length_in).expect("checked above");
        let mut sub_buffer = Buffer::new(slice);
        self.data
            .deserialize(&mut sub_buffer)
            .map_err(|e| DeserializeError::wrap(self.name(), None, buffer.remaining(), e))
    }
}
