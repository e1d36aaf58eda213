//! Interpreter value → host generic value.
//!
//! | Interpreter        | Host                 |
//! |--------------------|----------------------|
//! | `None`             | `Value::Null`        |
//! | `Bool`             | `Value::Bool`        |
//! | `Int`              | `Value::Int` (range checked against `IntWidth`) |
//! | `Float`            | `Value::Float`       |
//! | `String`           | `Value::String`      |
//! | `List`, `Tuple`    | `Value::Seq`         |
//! | `Dict`             | `Value::Map`         |
//!
//! Anything else is `DecodeError::UnsupportedType`.

use crate::config::{DecodeConfig, IntWidth};
use crate::error::DecodeError;
use crate::script::ScriptValue;
use crate::value::{Mapping, Value};

/// Convert with the default configuration.
pub fn convert(value: &ScriptValue) -> Result<Value, DecodeError> {
    Converter::default().convert(value)
}

/// Recursive converter. Holds only the integer width; no state is carried
/// between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    int_width: IntWidth,
}

impl Converter {
    pub fn new(config: &DecodeConfig) -> Self {
        Self {
            int_width: config.int_width,
        }
    }

    pub fn convert(&self, value: &ScriptValue) -> Result<Value, DecodeError> {
        match value {
            ScriptValue::None => Ok(Value::Null),
            ScriptValue::Bool(b) => Ok(Value::Bool(*b)),
            ScriptValue::Int(i) => self.convert_int(*i),
            ScriptValue::Float(f) => Ok(Value::Float(*f)),
            ScriptValue::String(s) => Ok(Value::String(s.clone())),
            ScriptValue::List(items) | ScriptValue::Tuple(items) => {
                let mut seq = Vec::with_capacity(items.len());
                for item in items {
                    seq.push(self.convert(item)?);
                }
                Ok(Value::Seq(seq))
            }
            ScriptValue::Dict(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = self.convert(k)?;
                    if !key.is_scalar() {
                        return Err(DecodeError::unsupported(format!(
                            "{} as mapping key",
                            k.type_name()
                        )));
                    }
                    map.insert(key, self.convert(v)?);
                }
                Ok(Value::Map(map))
            }
            ScriptValue::Function(_) | ScriptValue::Set(_) | ScriptValue::Opaque(_) => {
                Err(DecodeError::unsupported(value.type_name()))
            }
        }
    }

    fn convert_int(&self, value: i128) -> Result<Value, DecodeError> {
        let (min, max) = self.int_width.bounds();
        match i64::try_from(value) {
            Ok(v) if (min..=max).contains(&value) => Ok(Value::Int(v)),
            _ => Err(DecodeError::Range {
                value,
                width: self.int_width,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn primitives() {
        let cases = [
            (ScriptValue::None, Value::Null),
            (ScriptValue::Bool(true), Value::Bool(true)),
            (ScriptValue::Int(1), Value::Int(1)),
            (ScriptValue::Float(1.23), Value::Float(1.23)),
            (ScriptValue::from("hola"), Value::from("hola")),
        ];
        for (input, expected) in cases {
            assert_eq!(convert(&input).unwrap(), expected);
        }
    }

    #[test]
    fn mixed_list_keeps_order_and_nulls() {
        let input = ScriptValue::list([true.into(), ScriptValue::None, "c".into()]);
        assert_eq!(
            convert(&input).unwrap(),
            Value::Seq(vec![Value::Bool(true), Value::Null, Value::from("c")])
        );
    }

    #[test]
    fn tuple_with_nested_list() {
        let input = ScriptValue::tuple([
            ScriptValue::Int(234567890),
            ScriptValue::Float(1.2),
            ScriptValue::list(["nested list".into()]),
        ]);
        assert_eq!(
            convert(&input).unwrap(),
            Value::Seq(vec![
                Value::Int(234567890),
                Value::Float(1.2),
                Value::Seq(vec![Value::from("nested list")]),
            ])
        );
    }

    #[test]
    fn dict_converts_keys_and_values() {
        let input = ScriptValue::dict([
            ("mykey", ScriptValue::from("myvalue")),
            ("list", ScriptValue::tuple([ScriptValue::Int(99)])),
        ]);
        let expected: Mapping = [
            ("mykey", Value::from("myvalue")),
            ("list", Value::Seq(vec![Value::Int(99)])),
        ]
        .into_iter()
        .collect();
        assert_eq!(convert(&input).unwrap(), Value::Map(expected));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(convert(&ScriptValue::list([])).unwrap(), Value::Seq(vec![]));
        assert_eq!(convert(&ScriptValue::tuple([])).unwrap(), Value::Seq(vec![]));
        assert_eq!(
            convert(&ScriptValue::Dict(vec![])).unwrap(),
            Value::Map(Mapping::new())
        );
    }

    #[test]
    fn large_dict() {
        let input = ScriptValue::Dict(
            (0..50_000)
                .map(|i| (ScriptValue::from(format!("k{i}")), ScriptValue::Int(i)))
                .collect(),
        );
        let value = convert(&input).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.get_str("k49999"), Some(&Value::Int(49_999)));
    }

    #[test]
    fn dict_with_int_keys() {
        let input = ScriptValue::dict([(1, "one"), (2, "two")]);
        let map = convert(&input).unwrap();
        let map = map.as_map().unwrap();
        assert_eq!(map.get(&Value::Int(2)), Some(&Value::from("two")));
    }

    #[test]
    fn unsupported_kinds_fail() {
        for input in [
            ScriptValue::Function("myfn".into()),
            ScriptValue::Set(vec![ScriptValue::Int(1)]),
            ScriptValue::Opaque("struct".into()),
        ] {
            let err = convert(&input).unwrap_err();
            assert!(matches!(err, DecodeError::UnsupportedType { .. }), "{err}");
        }
    }

    #[test]
    fn nested_unsupported_value_aborts_whole_dict() {
        let input = ScriptValue::dict([
            ("name", ScriptValue::from("pablo")),
            ("myfn", ScriptValue::Function("myfn".into())),
        ]);
        assert_eq!(
            convert(&input).unwrap_err(),
            DecodeError::unsupported("function")
        );
    }

    #[test]
    fn compound_key_is_unsupported() {
        let input = ScriptValue::Dict(vec![(
            ScriptValue::tuple([ScriptValue::Int(1), ScriptValue::Int(2)]),
            ScriptValue::None,
        )]);
        assert_eq!(
            convert(&input).unwrap_err(),
            DecodeError::unsupported("tuple as mapping key")
        );
    }

    #[test]
    fn function_key_is_unsupported() {
        let input = ScriptValue::Dict(vec![(
            ScriptValue::Function("myfn".into()),
            ScriptValue::Int(1),
        )]);
        assert_eq!(
            convert(&input).unwrap_err(),
            DecodeError::unsupported("function")
        );
    }

    #[test]
    fn int_range_follows_configured_width() {
        let big = ScriptValue::Int(i128::from(i32::MAX) + 1);
        assert_eq!(convert(&big).unwrap(), Value::Int(i64::from(i32::MAX) + 1));

        let compat = Converter::new(&DecodeConfig::compat());
        assert_eq!(
            compat.convert(&big).unwrap_err(),
            DecodeError::Range {
                value: i128::from(i32::MAX) + 1,
                width: IntWidth::I32,
            }
        );
        assert_eq!(
            compat.convert(&ScriptValue::Int(i32::MIN.into())).unwrap(),
            Value::Int(i32::MIN.into())
        );

        let huge = ScriptValue::Int(i128::from(i64::MAX) + 1);
        assert!(matches!(
            convert(&huge).unwrap_err(),
            DecodeError::Range { width: IntWidth::I64, .. }
        ));
    }

    #[test]
    fn range_error_inside_list_propagates() {
        let input = ScriptValue::list([ScriptValue::Int(1), ScriptValue::Int(1 << 40)]);
        let compat = Converter::new(&DecodeConfig::compat());
        assert!(matches!(
            compat.convert(&input).unwrap_err(),
            DecodeError::Range { .. }
        ));
    }

    #[test]
    fn conversion_is_repeatable() {
        let input = ScriptValue::dict([(
            "contact",
            ScriptValue::dict([("hobbies", ScriptValue::list(["movies".into()]))]),
        )]);
        assert_eq!(convert(&input).unwrap(), convert(&input).unwrap());
    }
}
