//! An ordered, fixed layout of named (or anonymous) child codecs.

use indexmap::IndexMap;

use crate::error::{DeserializeError, DeserializeReason, SerializeError, SerializeReason};
use crate::serdes::{Field, Serdes};
use crate::value::{Buffer, Value};

/// Ordered fixed layout. Ported from `types.List`.
///
/// A field with an empty name is an "anonymous splice": on serialize it
/// receives the whole incoming map; on deserialize its result (which must
/// itself be a `Value::Map`) is flattened one level into the accumulated
/// map. Documented explicitly because it's the one place a reader would
/// otherwise assume a typo.
pub struct List {
    pub items: Vec<Field>,
}

impl List {
    pub fn new(items: Vec<Field>) -> Self {
        List { items }
    }
}

impl Serdes for List {
    fn name(&self) -> &'static str {
        "list"
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
            let item_value = if field.name.is_empty() {
                value
            } else {
                match map_value.get(&field.name) {
                    Some(v) => v,
                    None => continue,
                }
            };

            let data = field
                .serdes
                .serialize(item_value)
                .map_err(|e| SerializeError::wrap(self.name(), Some(field.context()), e))?;

            out.extend_from_slice(&data);
        }

        Ok(out)
    }

    fn deserialize(&self, buffer: &mut Buffer) -> Result<Value, DeserializeError> {
        let mut list_values: IndexMap<String, Value> = IndexMap::new();

        for field in &self.items {
            if buffer.remaining() == 0 {
                break;
            }

            let field_value = field.serdes.deserialize(buffer).map_err(|e| {
                DeserializeError::wrap(self.name(), Some(field.context()), buffer.remaining(), e)
            })?;

            if !field.name.is_empty() {
                list_values.insert(field.name.clone(), field_value);
                continue;
            }

            let nested = field_value.into_map().ok_or_else(|| {
                DeserializeError::new(self.name(), DeserializeReason::MalformedValue, buffer.remaining())
                    .with_field(field.context())
            })?;

            for (k, v) in nested {
                list_values.insert(k, v);
            }
        }

        Ok(Value::Map(list_values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcd::Bcd;
    use crate::byte::Byte;

    fn map(pairs: &[(&str, &str)]) -> Value {
        let mut m = IndexMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), Value::from(*v));
        }
        Value::Map(m)
    }

    #[test]
    fn serialize_skips_absent_fields() {
        let list = List::new(vec![
            Field::new("a", Byte::new()),
            Field::new("b", Bcd::new(4)),
        ]);

        let value = map(&[("a", "5")]);
        let out = list.serialize(&value).unwrap();
        assert_eq!(out, vec![5]);
    }

    #[test]
    fn round_trip() {
        let list = List::new(vec![
            Field::new("mti", Bcd::new(4)),
            Field::new("f2", Byte::new()),
        ]);

        let value = map(&[("mti", "0200"), ("f2", "9")]);
        let encoded = list.serialize(&value).unwrap();
        assert_eq!(encoded, vec![0x02, 0x00, 0x09]);

        let mut buf = Buffer::new(encoded);
        let decoded = list.deserialize(&mut buf).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn anonymous_field_flattens_child_map() {
        // outer list has one anonymous field whose child is itself a list
        let inner = List::new(vec![Field::new("a", Byte::new()), Field::new("b", Byte::new())]);
        let outer = List::new(vec![Field::anonymous(inner)]);

        let mut inner_map = IndexMap::new();
        inner_map.insert("a".to_string(), Value::from("1"));
        inner_map.insert("b".to_string(), Value::from("2"));
        let value = Value::Map(inner_map);

        let encoded = outer.serialize(&value).unwrap();
        assert_eq!(encoded, vec![1, 2]);

        let mut buf = Buffer::new(encoded);
        let decoded = outer.deserialize(&mut buf).unwrap();
        assert_eq!(decoded, value);
    }
}
