use crate::error::TplError;
use crate::value::Value;
use serde::Serialize;
use serde::ser::*;

use std::collections::HashMap;

/// Serializes any `Serialize` type into a template [`Value`].
///
/// Structs and maps become `Value::Map`, sequences and tuples `Value::List`.
/// Map keys must serialize to strings or integers. Unit variants become their name;
/// tuple and struct variants are rejected.
pub struct ValueSerializer;

/// `serialize_<num>` methods that widen into the 64-bit variants.
macro_rules! serialize_widening {
    ($($method:ident($ty:ty) => $variant:ident as $target:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok, Self::Error> {
                Ok(Value::$variant(v as $target))
            }
        )*
    };
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = TplError;
    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    // enum variants with fields have no element shape to bind to
    type SerializeTupleVariant = Impossible<Value, TplError>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = Impossible<Value, TplError>;

    serialize_widening! {
        serialize_i8(i8) => I64 as i64,
        serialize_i16(i16) => I64 as i64,
        serialize_i32(i32) => I64 as i64,
        serialize_i64(i64) => I64 as i64,
        serialize_u8(u8) => U64 as u64,
        serialize_u16(u16) => U64 as u64,
        serialize_u32(u32) => U64 as u64,
        serialize_u64(u64) => U64 as u64,
        serialize_f32(f32) => F64 as f64,
        serialize_f64(f64) => F64 as f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Bool(v))
    }
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(String::from_utf8_lossy(v).into_owned()))
    }
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(variant.to_string()))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(ListSerializer {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(unsupported_variant(name, variant))
    }
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapSerializer {
            map: HashMap::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }
    fn serialize_struct(
        self,
        _: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.serialize_map(Some(len))
    }
    fn serialize_struct_variant(
        self,
        name: &'static str,
        _: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(unsupported_variant(name, variant))
    }
}

fn unsupported_variant(name: &str, variant: &str) -> TplError {
    TplError::Serialization(format!(
        "Enum variant {}::{} with fields cannot be bound to a template element",
        name, variant
    ))
}

pub struct ListSerializer {
    vec: Vec<Value>,
}

macro_rules! impl_serialize_seq {
    ($trait:ident, $method:ident) => {
        impl $trait for ListSerializer {
            type Ok = Value;
            type Error = TplError;

            fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
                self.vec.push(value.serialize(ValueSerializer)?);
                Ok(())
            }

            fn end(self) -> Result<Self::Ok, Self::Error> {
                Ok(Value::List(self.vec))
            }
        }
    };
}

impl_serialize_seq!(SerializeSeq, serialize_element);
impl_serialize_seq!(SerializeTuple, serialize_element);
impl_serialize_seq!(SerializeTupleStruct, serialize_field);

pub struct MapSerializer {
    map: HashMap<String, Value>,
    key: Option<String>,
}

impl SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = TplError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key = match key.serialize(ValueSerializer)? {
            Value::Str(s) => s,
            // integer keys (e.g. row ids) are addressed by their decimal form
            Value::I64(n) => n.to_string(),
            Value::U64(n) => n.to_string(),
            other => {
                return Err(TplError::Serialization(format!(
                    "Map key must be a string or integer, got {:?}",
                    other
                )));
            }
        };
        self.key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let v = value.serialize(ValueSerializer)?;
        let key = self
            .key
            .take()
            .ok_or_else(|| TplError::Serialization("Missing key for value".to_string()))?;
        self.map.insert(key, v);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

impl SerializeStruct for MapSerializer {
    type Ok = Value;
    type Error = TplError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.map.insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

#[cfg(test)]
mod tests {
    use crate::value::serializer::ValueSerializer;
    use crate::error::TplError;
    use crate::value::Value;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Row {
        name: String,
        age: u8,
        tags: Vec<&'static str>,
    }

    #[test]
    fn test_struct_becomes_map() {
        let row = Row {
            name: "Alice".to_string(),
            age: 30,
            tags: vec!["a", "b"],
        };
        let value = row.serialize(ValueSerializer).unwrap();
        assert_eq!(value.get("name"), Some(&Value::Str("Alice".to_string())));
        assert_eq!(value.get("age"), Some(&Value::U64(30)));
        assert_eq!(
            value.get("tags"),
            Some(&Value::List(vec![
                Value::Str("a".to_string()),
                Value::Str("b".to_string())
            ]))
        );
    }

    #[test]
    fn test_unit_is_null() {
        assert_eq!(().serialize(ValueSerializer).unwrap(), Value::Null);
    }

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Line { len: u32 },
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(
            Shape::Dot.serialize(ValueSerializer).unwrap(),
            Value::Str("Dot".to_string())
        );
        let err = Shape::Line { len: 2 }.serialize(ValueSerializer).unwrap_err();
        assert!(matches!(err, TplError::Serialization(ref m) if m.contains("Shape::Line")));
    }

    #[test]
    fn test_integer_map_keys_are_stringified() {
        let mut m = HashMap::new();
        m.insert(7u32, "seven");
        let value = m.serialize(ValueSerializer).unwrap();
        assert_eq!(value.get("7"), Some(&Value::Str("seven".to_string())));
    }
}
