//! Error types returned by the serdes contract.
//!
//! Each carries a serdes name, field context, and an optional cause chain,
//! but uses structured reason variants instead of a free-text message so
//! call sites can match on failure kind.

use std::fmt;

/// Which child field a combinator was working on when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub name: String,
    pub serdes_name: &'static str,
}

impl fmt::Display for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field name: {} - field serdes name: {}",
            self.name, self.serdes_name
        )
    }
}

/// Reasons a `serialize` call can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeReason {
    /// The `Value` variant did not match what the codec expects.
    InvalidValueType { expected: &'static str, got: &'static str },
    /// A fixed-width codec was given more data than it can hold.
    ValueTooLong,
    /// A BCD/Raw string contained a character outside the accepted alphabet.
    InvalidDigit(char),
    /// A Raw hex string had an odd number of characters, or non-hex chars.
    InvalidHexString,
    /// A Mastercard TLV value length does not fit in `SizeLen` zoned digits.
    LengthOverflow { size_len: usize, got: usize },
    /// A combinator field had an empty name where one is required (TLV/BER-TLV).
    MissingFieldName,
    /// A bitmapped sub-codec had no entry in `Mapping` for a present bit.
    UnknownBit(usize),
}

impl fmt::Display for SerializeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeReason::InvalidValueType { expected, got } => {
                write!(f, "invalid value type: expected {expected}, got {got}")
            }
            SerializeReason::ValueTooLong => write!(f, "value too long"),
            SerializeReason::InvalidDigit(c) => write!(f, "invalid digit: {c:?}"),
            SerializeReason::InvalidHexString => write!(f, "invalid hex string"),
            SerializeReason::LengthOverflow { size_len, got } => write!(
                f,
                "length {got} does not fit in {size_len} zoned-decimal digits"
            ),
            SerializeReason::MissingFieldName => write!(f, "field name not found"),
            SerializeReason::UnknownBit(bit) => write!(f, "bit {bit} not found in mapping"),
        }
    }
}

/// An error raised while serializing a `Value` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeError {
    pub reason: SerializeReason,
    pub serdes_name: &'static str,
    pub field: Option<FieldContext>,
    pub cause: Option<Box<SerializeError>>,
}

impl SerializeError {
    pub fn new(serdes_name: &'static str, reason: SerializeReason) -> Self {
        SerializeError {
            reason,
            serdes_name,
            field: None,
            cause: None,
        }
    }

    pub fn with_field(mut self, field: FieldContext) -> Self {
        self.field = Some(field);
        self
    }

    /// Wrap `cause` as having happened inside `serdes_name`, optionally while
    /// working on `field`. Used by combinators to add their own name and
    /// field context to a child's failure without discarding it.
    pub fn wrap(serdes_name: &'static str, field: Option<FieldContext>, cause: SerializeError) -> Self {
        SerializeError {
            reason: cause.reason.clone(),
            serdes_name,
            field,
            cause: Some(Box::new(cause)),
        }
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} serializer: {}", self.reason, self.serdes_name)?;
        if let Some(field) = &self.field {
            write!(f, " - {field}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " -> {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Reasons a `deserialize` call can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeserializeReason {
    /// Fewer bytes remained in the buffer than the codec needed.
    NotEnoughBytes,
    /// A decoded digit sequence contained something that isn't `0-9`/`D`.
    InvalidDigit,
    /// A bitmapped bit was set but has no entry in `Mapping`.
    UnknownBit(usize),
    /// A BER-TLV length used the indefinite form (`0x80`), which is rejected.
    IndefiniteLengthUnsupported,
    /// A BER-TLV long-form length used more than four length octets.
    InvalidLength,
    /// `BerTLV::find` did not locate the requested tag.
    TagNotFound,
    /// The decoded value for a field was not of the expected shape
    /// (e.g. a length field that didn't parse as an integer).
    MalformedValue,
}

impl fmt::Display for DeserializeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserializeReason::NotEnoughBytes => write!(f, "data does not have bytes enough"),
            DeserializeReason::InvalidDigit => write!(f, "invalid digit in decoded data"),
            DeserializeReason::UnknownBit(bit) => write!(f, "bit {bit} not found in mapping"),
            DeserializeReason::IndefiniteLengthUnsupported => {
                write!(f, "indefinite length is not supported")
            }
            DeserializeReason::InvalidLength => write!(f, "invalid length"),
            DeserializeReason::TagNotFound => write!(f, "tag not found"),
            DeserializeReason::MalformedValue => write!(f, "deserializer returned an invalid value"),
        }
    }
}

/// An error raised while deserializing a buffer into a `Value` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializeError {
    pub reason: DeserializeReason,
    pub serdes_name: &'static str,
    pub field: Option<FieldContext>,
    pub remaining: usize,
    pub cause: Option<Box<DeserializeError>>,
}

impl DeserializeError {
    pub fn new(serdes_name: &'static str, reason: DeserializeReason, remaining: usize) -> Self {
        DeserializeError {
            reason,
            serdes_name,
            field: None,
            remaining,
            cause: None,
        }
    }

    pub fn with_field(mut self, field: FieldContext) -> Self {
        self.field = Some(field);
        self
    }

    pub fn wrap(
        serdes_name: &'static str,
        field: Option<FieldContext>,
        remaining: usize,
        cause: DeserializeError,
    ) -> Self {
        DeserializeError {
            reason: cause.reason.clone(),
            serdes_name,
            field,
            remaining,
            cause: Some(Box::new(cause)),
        }
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deserializer: {} - remaining: {}",
            self.reason, self.serdes_name, self.remaining
        )?;
        if let Some(field) = &self.field {
            write!(f, " - {field}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " -> {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Joins both error kinds for call sites that invoke both directions
/// generically (e.g. a round-trip test helper).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Serialize(SerializeError),
    Deserialize(DeserializeError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Serialize(e) => write!(f, "{e}"),
            CodecError::Deserialize(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Serialize(e) => e.source(),
            CodecError::Deserialize(e) => e.source(),
        }
    }
}

impl From<SerializeError> for CodecError {
    fn from(e: SerializeError) -> Self {
        CodecError::Serialize(e)
    }
}

impl From<DeserializeError> for CodecError {
    fn from(e: DeserializeError) -> Self {
        CodecError::Deserialize(e)
    }
}

pub type SerializeResult<T> = std::result::Result<T, SerializeError>;
pub type DeserializeResult<T> = std::result::Result<T, DeserializeError>;
