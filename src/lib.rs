//! # iso8583-serdes
//!
//! A composable serdes (serializer/deserializer) library for ISO-8583 and
//! EMV financial messages. Every wire format — a fixed-width BCD field, an
//! EBCDIC-encoded text field, a Mastercard subelement TLV block, an EMV
//! BER-TLV ICC data blob — is a small codec implementing the [`Serdes`]
//! trait. Codecs compose into trees: a [`List`] of fields, a [`BitMapped`]
//! data area gated by a [`Bitmap`], a [`VarLength`]-wrapped variable field.
//! The tree shape mirrors the message layout; building it is the only thing
//! a caller does before calling `serialize`/`deserialize` on the root.
//!
//! ## Quick start
//!
//! ```rust
//! use indexmap::IndexMap;
//! use iso8583_serdes::{Buffer, Ebcdic, Field, List, Serdes, Value};
//!
//! let mti = List::new(vec![Field::new("mti", Ebcdic::new(4))]);
//!
//! let mut fields = IndexMap::new();
//! fields.insert("mti".to_string(), Value::from("0200"));
//! let message = Value::Map(fields);
//!
//! let encoded = mti.serialize(&message).unwrap();
//! let mut buf = Buffer::new(encoded);
//! let decoded = mti.deserialize(&mut buf).unwrap();
//! assert_eq!(decoded, message);
//! ```
//!
//! ## Layout
//!
//! - [`Value`] / [`Buffer`]: the dynamic payload type and the byte cursor
//!   codecs read it from and write it into.
//! - [`Serdes`] / [`Field`]: the contract every codec implements, and the
//!   named child slot combinators hold.
//! - Leaves: [`Bcd`], [`Byte`], [`Word`], [`Raw`], [`Ebcdic`], [`EbcdicNumeric`].
//! - Combinators: [`List`], [`VarLength`], [`Bitmap`], [`BitMapped`],
//!   [`TLV`], [`BerTLV`].
//! - [`error`]: structured [`SerializeError`]/[`DeserializeError`] types with
//!   field context and cause chains.

pub mod bcd;
pub mod ber_tlv;
pub mod bitmap;
pub mod bitmapped;
pub mod byte;
pub mod ebcdic;
pub mod ebcdic_numeric;
pub mod ebcdic_tables;
pub mod error;
pub mod list;
pub mod raw;
pub mod serdes;
pub mod tlv;
pub mod value;
pub mod var_length;
pub mod word;

pub use bcd::Bcd;
pub use ber_tlv::{BerTLV, TagValue};
pub use bitmap::Bitmap;
pub use bitmapped::BitMapped;
pub use byte::Byte;
pub use ebcdic::Ebcdic;
pub use ebcdic_numeric::EbcdicNumeric;
pub use error::{
    CodecError, DeserializeError, DeserializeReason, DeserializeResult, FieldContext,
    SerializeError, SerializeReason, SerializeResult,
};
pub use list::List;
pub use raw::Raw;
pub use serdes::{Field, Serdes};
pub use tlv::TLV;
pub use value::{Buffer, Value};
pub use var_length::VarLength;
pub use word::{ByteOrder, Word};
