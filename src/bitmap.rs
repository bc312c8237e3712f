//! Raw block-chained bitmap: the MSB of each non-terminal block's first byte
//! signals "more blocks follow".

use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// Block-chained bitmap codec. Ported from `types.Bitmap`.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap {
    pub block_size: usize,
    pub num_bits: usize,
}

impl Bitmap {
    pub fn new(block_size: usize, num_bits: usize) -> Self {
        Bitmap { block_size, num_bits }
    }
}

impl Serdes for Bitmap {
    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let block_size_bytes = self.block_size / 8;
        let mut raw_value = value
            .as_bytes()
            .ok_or_else(|| {
                SerializeError::new(
                    self.name(),
                    SerializeReason::InvalidValueType { expected: "bytes", got: value.type_name() },
                )
            })?
            .to_vec();

        let len_value = raw_value.len();
        let mut num_blocks = len_value / block_size_bytes;
        let padding = block_size_bytes - (len_value % block_size_bytes);
        if padding != block_size_bytes {
            num_blocks += 1;
            raw_value.extend(vec![0u8; padding]);
        }

        for block_index in 0..num_blocks {
            if block_index < num_blocks - 1 {
                let offset = block_index * block_size_bytes;
                raw_value[offset] |= 0x80;
            }
        }

        Ok(raw_value)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let max_num_blocks = self.num_bits / self.block_size;
        let block_size_bytes = self.block_size / 8;

        let mut value = Vec::new();
        let mut more_blocks = true;

        let mut block_index = 0;
        while block_index < max_num_blocks && more_blocks {
            if buffer.remaining() < block_size_bytes {
                return Err(DeserializeError::new(
                    self.name(),
                    DeserializeReason::NotEnoughBytes,
                    buffer.remaining(),
                ));
            }

            let mut block = buffer.take(block_size_bytes).expect("checked above");

            more_blocks = (block[0] & 0x80) > 0;
            if more_blocks && block_index < max_num_blocks - 1 {
                block[0] &= 0x7F;
            }

            value.extend_from_slice(&block);
            block_index += 1;
        }

        Ok(Value::Bytes(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_single_block() {
        let ser = Bitmap::new(64, 128);
        let value64 = vec![0x75, 0x65, 0x12, 0x76, 0xF5, 0x2A, 0x43, 0x46];
        assert_eq!(ser.serialize(&Value::Bytes(value64.clone())).unwrap(), value64);
    }

    #[test]
    fn serialize_sets_continuation_on_non_terminal_block() {
        let ser = Bitmap::new(64, 128);
        let value128 = vec![
            0x75, 0x65, 0x12, 0x76, 0xF5, 0x2A, 0x43, 0x46, 0x75, 0x25, 0x82, 0x76, 0x55, 0x2A, 0xA3, 0x4F,
        ];
        let expected = vec![
            0xF5, 0x65, 0x12, 0x76, 0xF5, 0x2A, 0x43, 0x46, 0x75, 0x25, 0x82, 0x76, 0x55, 0x2A, 0xA3, 0x4F,
        ];
        assert_eq!(ser.serialize(&Value::Bytes(value128)).unwrap(), expected);
    }

    #[test]
    fn serialize_rejects_non_bytes() {
        let ser = Bitmap::new(64, 128);
        assert!(ser.serialize(&Value::from("invalid")).is_err());
    }

    #[test]
    fn deserialize_single_block() {
        let des = Bitmap::new(64, 128);
        let value64 = vec![0x75, 0x65, 0x12, 0x76, 0xF5, 0x2A, 0x43, 0x46];
        let mut buf = Buffer::new(value64.clone());
        assert_eq!(des.deserialize(&mut buf).unwrap(), Value::Bytes(value64));
    }

    #[test]
    fn deserialize_not_enough_bytes() {
        let des = Bitmap::new(64, 128);
        let mut buf = Buffer::new(vec![0x75, 0x65, 0x12, 0x76, 0xF5, 0x2A]);
        assert!(des.deserialize(&mut buf).is_err());
    }
}
