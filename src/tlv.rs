//! Mastercard zoned-decimal TLV subelement encoding.

use indexmap::IndexMap;

use crate::ebcdic::Ebcdic;
use crate::ebcdic_numeric::EbcdicNumeric;
use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::{Field, Serdes};
use crate::value::{Buffer, Value};

const DEFAULT_SIZE_LEN: usize = 2;
const DEFAULT_SIZE_TAG: usize = 2;

/// Mastercard subelement TLV codec. Ported from `types.TLV`.
///
/// Keeps `SizeLen` and `SizeTag` independent everywhere rather than deriving
/// one from the other — a decoder that falls back from an unset length
/// width to the tag width only happens to work when both defaults are
/// equal, and silently breaks the moment a caller sets one non-default
/// value without the other.
pub struct TLV {
    pub size_len: usize,
    pub size_tag: usize,
    pub items: Vec<Field>,
}

impl TLV {
    pub fn new(items: Vec<Field>) -> Self {
        TLV { size_len: 0, size_tag: 0, items }
    }

    pub fn with_sizes(size_tag: usize, size_len: usize, items: Vec<Field>) -> Self {
        TLV { size_len, size_tag, items }
    }

    fn size_tag(&self) -> usize {
        if self.size_tag == 0 { DEFAULT_SIZE_TAG } else { self.size_tag }
    }

    fn size_len(&self) -> usize {
        if self.size_len == 0 { DEFAULT_SIZE_LEN } else { self.size_len }
    }

    fn find_field(&self, tag: &str) -> Option<&Field> {
        self.items.iter().find(|f| f.name == tag)
    }
}

impl Serdes for TLV {
    fn name(&self) -> &'static str {
        "tlv"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let map_value = value.as_map().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "map", got: value.type_name() },
            )
        })?;

        let size_tag = self.size_tag();
        let size_len = self.size_len();

        let mut out = Vec::new();
        for field in &self.items {
            if field.name.is_empty() {
                return Err(SerializeError::new(self.name(), SerializeReason::MissingFieldName));
            }

            let item_value = match map_value.get(&field.name) {
                Some(v) => v,
                None => continue,
            };

            let data = field
                .serdes
                .serialize(item_value)
                .map_err(|e| SerializeError::wrap(self.name(), Some(field.context()), e))?;

            if data.len() >= 10usize.pow(size_len as u32) {
                return Err(SerializeError::new(
                    self.name(),
                    SerializeReason::LengthOverflow { size_len, got: data.len() },
                ));
            }

            let tag = EbcdicNumeric::new(size_tag)
                .serialize(&Value::Text(field.name.clone()))
                .map_err(|e| SerializeError::wrap(self.name(), Some(field.context()), e))?;

            out.extend_from_slice(&tag);
            out.extend_from_slice(&zoned_length(data.len(), size_len));
            out.extend_from_slice(&data);
        }

        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let mut values: IndexMap<String, Value> = IndexMap::new();

        let size_tag = self.size_tag();
        let size_len = self.size_len();

        while buffer.remaining() > 0 {
            let tag_raw = buffer.take(size_tag).ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
            })?;

            let mut tag_buf = Buffer::new(tag_raw);
            let tag_value = EbcdicNumeric::new(size_tag)
                .deserialize(&mut tag_buf)
                .map_err(|e| DeserializeError::wrap(self.name(), None, buffer.remaining(), e))?;
            let tag = tag_value.as_text().ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::MalformedValue, buffer.remaining())
            })?;

            let len_raw = buffer.take(size_len).ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
            })?;
            let length = unzone_length(&len_raw);

            let value_raw = buffer.take(length).ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::NotEnoughBytes, buffer.remaining())
            })?;

            let field = self.find_field(tag);
            let (field_name, decoded) = match field {
                Some(f) => {
                    let mut sub = Buffer::new(value_raw);
                    let decoded = f.serdes.deserialize(&mut sub).map_err(|e| {
                        DeserializeError::wrap(self.name(), Some(f.context()), buffer.remaining(), e)
                    })?;
                    (f.name.clone(), decoded)
                }
                // Unknown tags fall back to a default Ebcdic codec so the
                // byte content is preserved as text instead of discarded.
                None => {
                    let mut sub = Buffer::new(value_raw);
                    let decoded = Ebcdic::default()
                        .deserialize(&mut sub)
                        .map_err(|e| DeserializeError::wrap(self.name(), None, buffer.remaining(), e))?;
                    (tag.to_string(), decoded)
                }
            };

            values.insert(field_name, decoded);
        }

        Ok(Value::Map(values))
    }
}

fn zoned_length(len: usize, size_len: usize) -> Vec<u8> {
    let mut l = len;
    let mut out = vec![0u8; size_len];
    for i in 0..size_len - 1 {
        let y = size_len - 1 - i;
        let exp = 10usize.pow(y as u32);
        out[i] = (l / exp) as u8;
        l %= exp;
    }
    out[size_len - 1] = l as u8;

    for b in out.iter_mut() {
        *b |= 0xF0;
    }
    out
}

fn unzone_length(bytes: &[u8]) -> usize {
    let size = bytes.len();
    let mut l = (bytes[size - 1] & 0x0F) as usize;
    for i in 0..size - 1 {
        let y = size - 1 - i;
        let exp = 10usize.pow(y as u32);
        l += (bytes[i] & 0x0F) as usize * exp;
    }
    l
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_zoned_decimal() {
        let tlv = TLV::with_sizes(2, 2, vec![Field::new("92", Ebcdic::new(3))]);
        let mut value = IndexMap::new();
        value.insert("92".to_string(), Value::from("123"));

        let encoded = tlv.serialize(&Value::Map(value)).unwrap();
        assert_eq!(encoded, vec![0xF9, 0xF2, 0xF0, 0xF3, 0xF1, 0xF2, 0xF3]);
    }

    #[test]
    fn round_trip() {
        let tlv = TLV::with_sizes(2, 2, vec![Field::new("92", Ebcdic::new(3))]);
        let mut value = IndexMap::new();
        value.insert("92".to_string(), Value::from("123"));
        let value = Value::Map(value);

        let encoded = tlv.serialize(&value).unwrap();
        let mut buf = Buffer::new(encoded);
        assert_eq!(tlv.deserialize(&mut buf).unwrap(), value);
    }

    #[test]
    fn unknown_tag_falls_back_to_ebcdic() {
        let tlv = TLV::with_sizes(2, 2, vec![]);
        let encoded = vec![0xF9, 0xF2, 0xF0, 0xF3, 0xF1, 0xF2, 0xF3];
        let mut buf = Buffer::new(encoded);
        let decoded = tlv.deserialize(&mut buf).unwrap();
        let map = decoded.as_map().unwrap();
        assert_eq!(map.get("92").unwrap(), &Value::from("123"));
    }

    #[test]
    fn length_overflow_is_rejected() {
        let tlv = TLV::with_sizes(2, 1, vec![Field::new("01", crate::raw::Raw::default())]);
        let mut value = IndexMap::new();
        // 10 bytes -> 20 hex chars, exceeds a single zoned-decimal digit (max 9)
        value.insert("01".to_string(), Value::from("0".repeat(20)));
        assert!(tlv.serialize(&Value::Map(value)).is_err());
    }

    #[test]
    fn missing_field_name_is_rejected() {
        let tlv = TLV::new(vec![Field::new("", Ebcdic::default())]);
        let mut value = IndexMap::new();
        value.insert("x".to_string(), Value::from("1"));
        assert!(tlv.serialize(&Value::Map(value)).is_err());
    }
}
