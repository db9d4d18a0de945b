pub mod serializer;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::Result;
use serializer::ValueSerializer;

/// A runtime value bound to a template element or block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    /// Date without time zone
    Date(NaiveDate),
    /// Date and time without time zone
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    /// Rows of a repeated block, or any ordered sequence
    List(Vec<Value>),
    /// A single row: element id -> value
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by `{IF}` blocks and by plain blocks bound to scalars.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::I64(n) => *n != 0,
            Value::U64(n) => *n != 0,
            Value::F64(n) => *n != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Date(_) | Value::DateTime(_) => true,
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// True when the value prints as nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Bool(false) | Value::Map(_) => Ok(()),
            Value::Bool(true) => f.write_str("1"),
            Value::Str(s) => f.write_str(s),
            Value::I64(n) => write!(f, "{}", n),
            Value::U64(n) => write!(f, "{}", n),
            Value::F64(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Converts any `Serialize` type into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Types with a direct, infallible conversion into [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value_primitive {
    ($rust_type:ty, $variant:ident) => {
        impl ToValue for $rust_type {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl From<$rust_type> for Value {
            fn from(v: $rust_type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

macro_rules! impl_to_value_widen {
    ($rust_type:ty, $variant:ident, $target:ty) => {
        impl ToValue for $rust_type {
            fn to_value(&self) -> Value {
                Value::$variant(*self as $target)
            }
        }

        impl From<$rust_type> for Value {
            fn from(v: $rust_type) -> Self {
                Value::$variant(v as $target)
            }
        }
    };
}

impl_to_value_primitive!(bool, Bool);
impl_to_value_primitive!(String, Str);
impl_to_value_primitive!(i64, I64);
impl_to_value_primitive!(u64, U64);
impl_to_value_primitive!(f64, F64);
impl_to_value_primitive!(NaiveDate, Date);
impl_to_value_primitive!(NaiveDateTime, DateTime);
impl_to_value_primitive!(Decimal, Decimal);

impl_to_value_widen!(i8, I64, i64);
impl_to_value_widen!(i16, I64, i64);
impl_to_value_widen!(i32, I64, i64);
impl_to_value_widen!(u8, U64, u64);
impl_to_value_widen!(u16, U64, u64);
impl_to_value_widen!(u32, U64, u64);
impl_to_value_widen!(usize, U64, u64);
impl_to_value_widen!(f32, F64, f64);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl<T> ToValue for &T
where
    T: ToValue + ?Sized,
{
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(|v| v.to_value()).collect())
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
