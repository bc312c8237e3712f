//! The core contract every leaf codec and combinator implements.

use crate::error::{DeserializeError, SerializeError};
use crate::value::{Buffer, Value};

/// A node in a codec tree: something that can turn a `Value` into bytes and
/// back. Combinators hold child `Serdes` and drive them over a shared
/// `Buffer`; leaves read/write the buffer directly.
///
/// Collapses what a three-interface split (`Named` + `Serializer` +
/// `Deserialize`) would otherwise require into one trait — Rust trait
/// objects don't need that split just to keep serialize-only or
/// deserialize-only mocks simple.
pub trait Serdes: Send + Sync {
    /// Human-readable tag used in error messages (`"bcd"`, `"list"`, …).
    fn name(&self) -> &'static str;

    /// Encode `value` to bytes.
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError>;

    /// Decode a value from the front of `buffer`, consuming the bytes it needs.
    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError>;
}

/// A named child slot inside a combinator (`List`, `TLV`, `BerTLV`).
///
/// `name == ""` marks an anonymous splice field: see `List`'s doc comment
/// for what that means on both directions.
pub struct Field {
    pub name: String,
    pub serdes: Box<dyn Serdes>,
}

impl Field {
    pub fn new(name: impl Into<String>, serdes: impl Serdes + 'static) -> Self {
        Field {
            name: name.into(),
            serdes: Box::new(serdes),
        }
    }

    /// An anonymous field whose child receives the whole parent map.
    pub fn anonymous(serdes: impl Serdes + 'static) -> Self {
        Field {
            name: String::new(),
            serdes: Box::new(serdes),
        }
    }

    pub(crate) fn context(&self) -> crate::error::FieldContext {
        crate::error::FieldContext {
            name: self.name.clone(),
            serdes_name: self.serdes.name(),
        }
    }
}
