//! Bitmap + per-bit sub-codec: the heart of ISO-8583's bitmapped data area.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::bitmap::Bitmap;
use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::Serdes;
use crate::value::{Buffer, Value};

/// Bitmap-gated set of sub-codecs, keyed by 1-based bit number. Ported from
/// `types.BitMapped`.
pub struct BitMapped {
    pub bitmap: Bitmap,
    pub mapping: BTreeMap<usize, Box<dyn Serdes>>,
}

impl BitMapped {
    pub fn new(bitmap: Bitmap, mapping: BTreeMap<usize, Box<dyn Serdes>>) -> Self {
        BitMapped { bitmap, mapping }
    }

    fn normalize_value<'a>(&self, value: &'a Value) -> Result<(&'a IndexMap<String, Value>, Vec<(usize, &'a str)>), SerializeError> {
        let map_value = value.as_map().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "map", got: value.type_name() },
            )
        })?;

        // Keep the original key string alongside its parsed bit number: a
        // key like "02" parses to bit 2 but must still be looked back up
        // under "02", not the reformatted "2".
        let mut bits: Vec<(usize, &str)> = map_value
            .keys()
            .filter_map(|k| k.parse::<usize>().ok().map(|n| (n, k.as_str())))
            .collect();
        bits.sort_unstable_by_key(|(n, _)| *n);

        Ok((map_value, bits))
    }

    fn check_bit(bitmap: &[u8], index: usize) -> bool {
        let cbyte = index / 8;
        let cbit = 7 - (index % 8);
        bitmap[cbyte] & (0x1 << cbit) != 0
    }
}

impl Serdes for BitMapped {
    fn name(&self) -> &'static str {
        "bitMapped"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let (map_value, sorted_bits) = self.normalize_value(value)?;

        if sorted_bits.is_empty() {
            return Ok(Vec::new());
        }

        let last_bit = sorted_bits.last().unwrap().0;
        let nbytes = last_bit.div_ceil(8);
        let mut raw_bitmap = vec![0u8; nbytes];
        for &(bit_number, _) in &sorted_bits {
            let bit_index = bit_number - 1;
            let cbit = 7 - (bit_index % 8);
            raw_bitmap[bit_index / 8] |= 0x1 << cbit;
        }

        let mut out = self
            .bitmap
            .serialize(&Value::Bytes(raw_bitmap))
            .map_err(|e| SerializeError::wrap(self.name(), None, e))?;

        for &(bit_number, key) in &sorted_bits {
            let serdes = self.mapping.get(&bit_number).ok_or_else(|| {
                SerializeError::new(self.name(), SerializeReason::UnknownBit(bit_number))
            })?;

            let field_value = &map_value[key];
            let bit_data = serdes.serialize(field_value).map_err(|e| {
                SerializeError::wrap(
                    self.name(),
                    Some(crate::error::FieldContext { name: bit_number.to_string(), serdes_name: serdes.name() }),
                    e,
                )
            })?;

            out.extend_from_slice(&bit_data);
        }

        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let mut values: IndexMap<String, Value> = IndexMap::new();

        let bitmap_value = self
            .bitmap
            .deserialize(buffer)
            .map_err(|e| DeserializeError::wrap(self.name(), None, buffer.remaining(), e))?;

        let bitmap = bitmap_value.as_bytes().ok_or_else(|| {
            DeserializeError::new(self.name(), DeserializeReason::MalformedValue, buffer.remaining())
        })?;

        let num_bits = bitmap.len() * 8;
        for bit_number in 1..=num_bits {
            let bit_index = bit_number - 1;
            if !BitMapped::check_bit(bitmap, bit_index) {
                continue;
            }

            let serdes = self.mapping.get(&bit_number).ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::UnknownBit(bit_number), buffer.remaining())
            })?;

            let value = serdes.deserialize(buffer).map_err(|e| {
                DeserializeError::wrap(
                    self.name(),
                    Some(crate::error::FieldContext { name: bit_number.to_string(), serdes_name: serdes.name() }),
                    buffer.remaining(),
                    e,
                )
            })?;

            values.insert(bit_number.to_string(), value);
        }

        Ok(Value::Map(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::Raw;

    fn map(pairs: &[(&str, &str)]) -> Value {
        let mut m = IndexMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), Value::from(*v));
        }
        Value::Map(m)
    }

    #[test]
    fn serialize_orders_fields_by_ascending_bit() {
        let mut mapping: BTreeMap<usize, Box<dyn Serdes>> = BTreeMap::new();
        mapping.insert(2, Box::new(Raw::new(1)));
        mapping.insert(66, Box::new(Raw::new(1)));
        mapping.insert(100, Box::new(Raw::new(1)));

        let bm = BitMapped::new(Bitmap::new(64, 128), mapping);
        let value = map(&[("2", "aa"), ("66", "bb"), ("100", "cc")]);

        let encoded = bm.serialize(&value).unwrap();
        let bitmap = [0xC0u8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00];
        assert_eq!(&encoded[..16], &bitmap);
        assert_eq!(&encoded[16..], &[0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn round_trip() {
        let mut mapping: BTreeMap<usize, Box<dyn Serdes>> = BTreeMap::new();
        mapping.insert(2, Box::new(Raw::new(1)));
        mapping.insert(66, Box::new(Raw::new(1)));
        mapping.insert(100, Box::new(Raw::new(1)));

        let bm = BitMapped::new(Bitmap::new(64, 128), mapping);
        let value = map(&[("2", "aa"), ("66", "bb"), ("100", "cc")]);

        let encoded = bm.serialize(&value).unwrap();
        let mut buf = Buffer::new(encoded);
        let decoded = bm.deserialize(&mut buf).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn serialize_rejects_unknown_bit() {
        let mut mapping: BTreeMap<usize, Box<dyn Serdes>> = BTreeMap::new();
        mapping.insert(2, Box::new(Raw::new(1)));

        let bm = BitMapped::new(Bitmap::new(64, 128), mapping);
        let value = map(&[("2", "aa"), ("70", "bb")]);
        assert!(bm.serialize(&value).is_err());
    }

    #[test]
    fn empty_map_serializes_to_empty_bytes() {
        let mapping: BTreeMap<usize, Box<dyn Serdes>> = BTreeMap::new();
        let bm = BitMapped::new(Bitmap::new(64, 128), mapping);
        assert_eq!(bm.serialize(&Value::Map(IndexMap::new())).unwrap(), Vec::<u8>::new());
    }
}
