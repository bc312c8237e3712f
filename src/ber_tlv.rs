//! EMV BER-TLV (ITU-T X.690 subset): single/two-byte tags, definite length
//! only, long form up to four length octets.

use indexmap::IndexMap;

use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::raw::{hex_decode, hex_encode};
use crate::serdes::{Field, Serdes};
use crate::value::{Buffer, Value};

/// A single decoded BER-TLV record, as produced while walking a buffer.
/// Not part of the public serdes contract — used internally and returned
/// by `BerTLV::find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    pub tag: i32,
    pub value: Vec<u8>,
    pub size_len: usize,
}

impl TagValue {
    /// A tag is constructed (holds nested TLVs) iff bit 6 (mask 0x20) of its
    /// leading tag byte is set.
    pub fn is_constructed(&self) -> bool {
        if self.tag <= 0xff {
            self.tag & 0x20 != 0
        } else {
            (self.tag >> 8) & 0x20 != 0
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = encode_tag(self.tag);
        out.extend_from_slice(&encode_len(self.value.len(), self.size_len));
        out.extend_from_slice(&self.value);
        out
    }
}

/// BER-TLV combinator. Ported from `types.BerTLV`.
pub struct BerTLV {
    /// `0` selects standard BER length encoding (short/long form);
    /// non-zero fixes the length field to that many big-endian bytes.
    pub size_len: usize,
    pub items: Vec<Field>,
}

impl BerTLV {
    pub fn new(size_len: usize, items: Vec<Field>) -> Self {
        BerTLV { size_len, items }
    }

    fn find_field(&self, tag: &str) -> Option<&Field> {
        self.items.iter().find(|f| f.name == tag)
    }

    /// DFS search for `tag` inside BER-TLV-encoded `bytes`, descending into
    /// constructed tags. Ported from `types.Find`.
    pub fn find(size_len: usize, tag: i32, bytes: &[u8]) -> Result<TagValue, DeserializeError> {
        let tvs = decode_all(size_len, bytes)?;

        for tv in &tvs {
            if tv.tag == tag {
                return Ok(tv.clone());
            }
            if !tv.is_constructed() {
                continue;
            }
            if let Ok(found) = BerTLV::find(size_len, tag, &tv.value) {
                return Ok(found);
            }
        }

        Err(DeserializeError::new(
            "bertlv",
            DeserializeReason::TagNotFound,
            bytes.len(),
        ))
    }
}

impl Serdes for BerTLV {
    fn name(&self) -> &'static str {
        "bertlv"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let map_value = value.as_map().ok_or_else(|| {
            SerializeError::new(
                self.name(),
                SerializeReason::InvalidValueType { expected: "map", got: value.type_name() },
            )
        })?;

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

            let tag_raw = hex_decode(&field.name).ok_or_else(|| {
                SerializeError::new(self.name(), SerializeReason::InvalidHexString).with_field(field.context())
            })?;

            let (tag, _) = read_tag_bytes(&tag_raw).ok_or_else(|| {
                SerializeError::new(self.name(), SerializeReason::InvalidHexString).with_field(field.context())
            })?;

            let tv = TagValue { tag, value: data, size_len: self.size_len };
            out.extend_from_slice(&tv.to_bytes());
        }

        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let mut values: IndexMap<String, Value> = IndexMap::new();

        let remaining = buffer.remaining_slice().to_vec();
        let tvs = decode_all(self.size_len, &remaining)?;
        buffer.take(remaining.len());

        for tv in tvs {
            let tag_hex = hex_encode(&encode_tag(tv.tag));

            let field = match self.find_field(&tag_hex) {
                Some(f) => f,
                None => continue,
            };

            let mut sub = Buffer::new(tv.value.clone());
            let decoded = field
                .serdes
                .deserialize(&mut sub)
                .map_err(|e| DeserializeError::wrap(self.name(), Some(field.context()), 0, e))?;

            values.insert(tag_hex, decoded);
        }

        Ok(Value::Map(values))
    }
}

/// Encode a tag: one byte when bits 5-13 of a would-be two-byte form are
/// clear (`(tag >> 8) & 0x1F == 0`), else two bytes big-endian.
fn encode_tag(tag: i32) -> Vec<u8> {
    if (tag >> 8) & 0x1F == 0 {
        vec![tag as u8]
    } else {
        vec![(tag >> 8) as u8, (tag & 0xff) as u8]
    }
}

/// Mirror of `readTag`: reads one or two tag bytes from the front of `data`.
fn read_tag_bytes(data: &[u8]) -> Option<(i32, usize)> {
    let b0 = *data.first()?;
    let mut tag = b0 as i32;
    if b0 & 0x1F == 0x1F {
        let b1 = *data.get(1)?;
        tag = (tag << 8) | b1 as i32;
        return Some((tag, 2));
    }
    Some((tag, 1))
}

fn encode_len(len: usize, size_len: usize) -> Vec<u8> {
    if size_len > 0 {
        let be = encode_minimal_be(len as u32);
        let mut out = vec![0u8; size_len.saturating_sub(be.len())];
        out.extend_from_slice(&be);
        return out;
    }

    if len <= 0x7f {
        return vec![len as u8];
    }

    let be = encode_minimal_be(len as u32);
    let mut out = vec![0x80 | be.len() as u8];
    out.extend_from_slice(&be);
    out
}

/// Big-endian encoding of `v` with leading zero bytes stripped (at least
/// one byte is always returned).
fn encode_minimal_be(v: u32) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(3);
    bytes[first_nonzero..].to_vec()
}

/// Mirror of `readLen`: returns `(length, bytes consumed)`.
fn read_len_bytes(data: &[u8], size_len: usize) -> Result<(usize, usize), DeserializeError> {
    if size_len > 0 {
        if data.len() < size_len {
            return Err(DeserializeError::new("bertlv", DeserializeReason::NotEnoughBytes, data.len()));
        }
        let mut buf = [0u8; 4];
        let n = size_len.min(4);
        buf[4 - n..].copy_from_slice(&data[size_len - n..size_len]);
        return Ok((u32::from_be_bytes(buf) as usize, size_len));
    }

    let b0 = *data
        .first()
        .ok_or_else(|| DeserializeError::new("bertlv", DeserializeReason::NotEnoughBytes, data.len()))?;

    if b0 == 0x80 {
        return Err(DeserializeError::new("bertlv", DeserializeReason::IndefiniteLengthUnsupported, data.len()));
    }

    if b0 & 0x80 == 0 {
        return Ok((b0 as usize, 1));
    }

    let nb = (b0 & 0x7f) as usize;
    if nb > 4 {
        return Err(DeserializeError::new("bertlv", DeserializeReason::InvalidLength, data.len()));
    }

    if data.len() < 1 + nb {
        return Err(DeserializeError::new("bertlv", DeserializeReason::NotEnoughBytes, data.len()));
    }

    let mut buf = [0u8; 4];
    buf[4 - nb..].copy_from_slice(&data[1..1 + nb]);
    Ok((u32::from_be_bytes(buf) as usize, 1 + nb))
}

/// Decode the whole buffer into a flat sequence of TagValue records
/// (mirrors `decode`/`readFrom` looping to EOF).
fn decode_all(size_len: usize, data: &[u8]) -> Result<Vec<TagValue>, DeserializeError> {
    let mut result = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let (tag, tag_n) = read_tag_bytes(&data[pos..])
            .ok_or_else(|| DeserializeError::new("bertlv", DeserializeReason::NotEnoughBytes, data.len() - pos))?;
        pos += tag_n;

        let (len, len_n) = read_len_bytes(&data[pos..], size_len)?;
        pos += len_n;

        if data.len() < pos + len {
            return Err(DeserializeError::new("bertlv", DeserializeReason::NotEnoughBytes, data.len() - pos));
        }

        let value = data[pos..pos + len].to_vec();
        pos += len;

        result.push(TagValue { tag, value, size_len });
    }

    Ok(result)
}
