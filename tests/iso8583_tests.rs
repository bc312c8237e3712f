//! End-to-end round trips over composed codec trees shaped like real
//! ISO-8583 / EMV messages: an MTI field followed by a bitmapped data area.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use iso8583_serdes::{
    BerTLV, Bcd, Bitmap, BitMapped, Buffer, Ebcdic, Field, List, Raw, Serdes, TLV, Value,
    VarLength,
};

fn financial_message() -> List {
    let mut mapping: BTreeMap<usize, Box<dyn Serdes>> = BTreeMap::new();
    mapping.insert(2, Box::new(VarLength::new(Ebcdic::new(2), Bcd::default())));
    mapping.insert(3, Box::new(Ebcdic::new(6)));
    mapping.insert(4, Box::new(Bcd::new(12)));
    mapping.insert(11, Box::new(Bcd::new(6)));

    let bitmapped = BitMapped::new(Bitmap::new(64, 64), mapping);

    List::new(vec![Field::new("mti", Ebcdic::new(4)), Field::anonymous(bitmapped)])
}

fn financial_value() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("mti".to_string(), Value::from("0200"));
    fields.insert("2".to_string(), Value::from("4111111111111111"));
    fields.insert("3".to_string(), Value::from("000000"));
    fields.insert("4".to_string(), Value::from("000000012345"));
    fields.insert("11".to_string(), Value::from("123456"));
    Value::Map(fields)
}

#[test]
fn financial_message_round_trips() {
    let message = financial_message();
    let value = financial_value();

    let encoded = message.serialize(&value).unwrap();

    // mti (4 bytes EBCDIC) + bitmap (8 bytes, single 64-bit block) + fields.
    assert_eq!(encoded[0..4], [0xF0, 0xF2, 0xF0, 0xF0]);

    let mut buf = Buffer::new(encoded);
    let decoded = message.deserialize(&mut buf).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(buf.remaining(), 0);
}

#[test]
fn financial_message_omits_absent_optional_fields() {
    let message = financial_message();

    let mut fields = IndexMap::new();
    fields.insert("mti".to_string(), Value::from("0200"));
    fields.insert("3".to_string(), Value::from("000000"));
    fields.insert("4".to_string(), Value::from("000000012345"));
    let value = Value::Map(fields);

    let encoded = message.serialize(&value).unwrap();
    let mut buf = Buffer::new(encoded);
    let decoded = message.deserialize(&mut buf).unwrap();
    assert_eq!(decoded, value);
}

/// An EMV ICC data field (DE 55) as a BER-TLV blob nested inside a
/// Mastercard-style subelement block, composed under a VarLength wrapper —
/// the full depth a real authorization message reaches.
#[test]
fn nested_tlv_and_bertlv_round_trip() {
    let icc = BerTLV::new(0, vec![Field::new("9f26", Raw::default())]);

    let mut icc_value = IndexMap::new();
    icc_value.insert("9f26".to_string(), Value::from("5dfaeed4e8ed3f8f"));
    let icc_value = Value::Map(icc_value);

    let icc_bytes = icc.serialize(&icc_value).unwrap();

    let subelement = TLV::new(vec![Field::new("55", Raw::default())]);
    let mut outer = IndexMap::new();
    outer.insert("55".to_string(), Value::from(hex_string(&icc_bytes)));
    let outer_value = Value::Map(outer);

    let encoded = subelement.serialize(&outer_value).unwrap();
    let mut buf = Buffer::new(encoded);
    let decoded = subelement.deserialize(&mut buf).unwrap();
    assert_eq!(decoded, outer_value);

    let round_tripped_icc_bytes = decoded.as_map().unwrap()["55"].as_text().unwrap();
    let reparsed = icc.deserialize(&mut Buffer::new(hex_decode(round_tripped_icc_bytes))).unwrap();
    assert_eq!(reparsed, icc_value);
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}
