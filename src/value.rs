//! The dynamic payload exchanged at every node of a serdes tree, and the
//! cursor codecs read it from / write it into.

use indexmap::IndexMap;
use std::fmt;

/// A decoded or to-be-encoded payload at some node of a codec tree.
///
/// A tagged sum rather than an untagged dynamic value so every codec's
/// `match` is exhaustive and mismatches are caught at compile time inside
/// the codec, not at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A decoded character string (BCD digits, EBCDIC text, hex strings, …).
    Text(String),
    /// An opaque byte sequence. Only `Bitmap` produces/consumes this variant.
    Bytes(Vec<u8>),
    /// A composite, keyed by field name / bit number / tag.
    Map(IndexMap<String, Value>),
    /// The absence of a value (an empty `List` result, for instance).
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Map(_) => "map",
            Value::Null => "null",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

/// A mutable cursor over a byte slice, consumed incrementally by codecs.
///
/// Splits a read-only source from an advancing position, and also supports
/// appends: combinators build their output by appending to a shared
/// `Buffer` rather than concatenating separate `Vec<u8>`s.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    pos: usize,
}

impl Buffer {
    pub fn new(data: Vec<u8>) -> Self {
        Buffer { data, pos: 0 }
    }

    pub fn empty() -> Self {
        Buffer { data: Vec::new(), pos: 0 }
    }

    /// Bytes left to consume.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// A view of the unconsumed tail.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Consume and return exactly `n` bytes, or `None` if fewer remain.
    pub fn take(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.remaining() < n {
            return None;
        }
        let slice = self.data[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Some(slice)
    }

    /// Consume and return a single byte, or `None` if the buffer is empty.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.remaining() == 0 {
            return None;
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Some(b)
    }

    /// Append bytes to the end of the buffer. Does not affect the read cursor.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("remaining", &self.remaining())
            .field("pos", &self.pos)
            .field("len", &self.data.len())
            .finish()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Buffer::new(data)
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        Buffer::new(data.to_vec())
    }
}
