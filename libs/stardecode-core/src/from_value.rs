use std::collections::{BTreeMap, HashMap};

use crate::bind::Binder;
use crate::error::DecodeError;
use crate::record::Shape;
use crate::value::{Mapping, Value};

/// Coercion of a converted value into a typed field.
pub trait FromValue: Sized {
    fn shape() -> Shape;

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError>;

    /// Assign `value` onto an existing field. Records override this to bind
    /// in place; everything else is replaced.
    fn merge_value(&mut self, value: &Value, binder: &Binder) -> Result<(), DecodeError> {
        *self = Self::from_value(value, binder)?;
        Ok(())
    }
}

impl FromValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn from_value(value: &Value, _: &Binder) -> Result<Self, DecodeError> {
        value
            .as_bool()
            .ok_or_else(|| DecodeError::mismatch("bool", value.kind()))
    }
}

macro_rules! int_from_value {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn shape() -> Shape {
                Shape::Int
            }

            fn from_value(value: &Value, _: &Binder) -> Result<Self, DecodeError> {
                match value {
                    Value::Int(i) => <$ty>::try_from(*i)
                        .map_err(|_| DecodeError::mismatch(stringify!($ty), "out-of-range int")),
                    other => Err(DecodeError::mismatch(stringify!($ty), other.kind())),
                }
            }
        }
    )*};
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => {
                let f = *i as f64;
                if !binder.config().lossy_floats && f as i128 != i128::from(*i) {
                    return Err(DecodeError::mismatch("f64", "inexact int"));
                }
                Ok(f)
            }
            other => Err(DecodeError::mismatch("f64", other.kind())),
        }
    }
}

impl FromValue for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        let strict = !binder.config().lossy_floats;
        match value {
            Value::Float(f) => {
                let narrowed = *f as f32;
                if strict && !f.is_nan() && f64::from(narrowed) != *f {
                    return Err(DecodeError::mismatch("f32", "inexact float"));
                }
                Ok(narrowed)
            }
            Value::Int(i) => {
                let narrowed = *i as f32;
                if strict && f64::from(narrowed) as i128 != i128::from(*i) {
                    return Err(DecodeError::mismatch("f32", "inexact int"));
                }
                Ok(narrowed)
            }
            other => Err(DecodeError::mismatch("f32", other.kind())),
        }
    }
}

impl FromValue for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn from_value(value: &Value, _: &Binder) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch("string", value.kind()))
    }
}

impl FromValue for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn from_value(value: &Value, _: &Binder) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromValue for Mapping {
    fn shape() -> Shape {
        Shape::Any
    }

    fn from_value(value: &Value, _: &Binder) -> Result<Self, DecodeError> {
        value
            .as_map()
            .cloned()
            .ok_or_else(|| DecodeError::mismatch("mapping", value.kind()))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(T::shape)
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, binder).map(Some),
        }
    }

    fn merge_value(&mut self, value: &Value, binder: &Binder) -> Result<(), DecodeError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(existing) => existing.merge_value(value, binder),
            None => {
                *self = Some(T::from_value(value, binder)?);
                Ok(())
            }
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(T::shape)
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        let Value::Seq(items) = value else {
            return Err(DecodeError::mismatch("sequence", value.kind()));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_value(item, binder).map_err(|e| e.with_index(i)))
            .collect()
    }
}

fn string_keyed<T: FromValue>(
    value: &Value,
    binder: &Binder,
) -> Result<Vec<(String, T)>, DecodeError> {
    let Value::Map(map) = value else {
        return Err(DecodeError::mismatch("mapping", value.kind()));
    };
    map.iter()
        .map(|(k, v)| {
            let key = k
                .as_str()
                .ok_or_else(|| DecodeError::mismatch("string key", k.kind()))?;
            let item = T::from_value(v, binder).map_err(|e| e.with_field(key))?;
            Ok((key.to_string(), item))
        })
        .collect()
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::Map(T::shape)
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        Ok(string_keyed(value, binder)?.into_iter().collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn shape() -> Shape {
        Shape::Map(T::shape)
    }

    fn from_value(value: &Value, binder: &Binder) -> Result<Self, DecodeError> {
        Ok(string_keyed(value, binder)?.into_iter().collect())
    }
}
