//! EBCDIC text: right-padded with EBCDIC space, right-trimmed on decode.

use crate::ebcdic_tables::{ASCII_TO_EBCDIC, EBCDIC_TO_ASCII};
use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// EBCDIC text codec. Ported from `types.Ebcdic`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ebcdic {
    /// Fixed width. `0` means "however many characters the input/remainder has".
    pub num_digits: usize,
}

impl Ebcdic {
    pub fn new(num_digits: usize) -> Self {
        Ebcdic { num_digits }
    }
}

impl Serdes for Ebcdic {
    fn name(&self) -> &'static str {
        "ebcdic"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let s = value.as_text().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "text", got: value.type_name() },
            )
        })?;

        let value_len = s.chars().count();
        let num_digits = if self.num_digits == 0 { value_len } else { self.num_digits };

        if self.num_digits > 0 && value_len > num_digits {
            return Err(SerializeError::new(self.name(), SerializeReason::ValueTooLong));
        }

        let mut out = Vec::with_capacity(num_digits);
        for c in s.chars() {
            out.push(ASCII_TO_EBCDIC[c as usize & 0xFF]);
        }
        for _ in value_len..num_digits {
            out.push(ASCII_TO_EBCDIC[b' ' as usize]);
        }

        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let num_digits = if self.num_digits == 0 { buffer.remaining() } else { self.num_digits };

        let raw = buffer.take(num_digits).ok_or_else(|| {
            DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
        })?;

        let out: String = raw.iter().map(|&b| EBCDIC_TO_ASCII[b as usize] as char).collect();
        Ok(Value::Text(out.trim_end_matches(' ').to_string()))
    }
}
