use std::hash::{Hash, Hasher};
use std::mem;

use indexmap::IndexMap;

use crate::error::DecodeError;

/// Value handed over by the embedded interpreter.
///
/// Mirrors the interpreter's tagged union. Only the first eight kinds have a
/// host conversion; the rest exist so adapters can pass through everything the
/// interpreter produces and let the converter reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    None,
    Bool(bool),
    /// Interpreter integers are unbounded in principle; `i128` covers every
    /// value an adapter can hand over without loss.
    Int(i128),
    Float(f64),
    String(String),
    List(Vec<ScriptValue>),
    Tuple(Vec<ScriptValue>),
    /// Entries in the dictionary's iteration order.
    Dict(Vec<(ScriptValue, ScriptValue)>),

    /// Callable, identified by name.
    Function(String),
    Set(Vec<ScriptValue>),
    /// Interpreter-internal value, identified by its type name.
    Opaque(String),
}

impl ScriptValue {
    /// Interpreter type name, used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            ScriptValue::None => "NoneType",
            ScriptValue::Bool(_) => "bool",
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::String(_) => "string",
            ScriptValue::List(_) => "list",
            ScriptValue::Tuple(_) => "tuple",
            ScriptValue::Dict(_) => "dict",
            ScriptValue::Function(_) => "function",
            ScriptValue::Set(_) => "set",
            ScriptValue::Opaque(name) => name,
        }
    }

    pub fn list(items: impl IntoIterator<Item = ScriptValue>) -> Self {
        ScriptValue::List(items.into_iter().collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = ScriptValue>) -> Self {
        ScriptValue::Tuple(items.into_iter().collect())
    }

    /// Build a dictionary. A repeated key replaces the earlier entry in place,
    /// like assignment into an interpreter dict.
    pub fn dict<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<ScriptValue>,
        V: Into<ScriptValue>,
    {
        let out: IndexMap<DictKey, ScriptValue> = entries
            .into_iter()
            .map(|(k, v)| (DictKey(k.into()), v.into()))
            .collect();
        ScriptValue::Dict(out.into_iter().map(|(k, v)| (k.0, v)).collect())
    }
}

/// Dictionary key with total equality: floats compare by bit pattern.
struct DictKey(ScriptValue);

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        key_eq(&self.0, &other.0)
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(&self.0, state);
    }
}

fn key_eq(a: &ScriptValue, b: &ScriptValue) -> bool {
    fn all_eq(xs: &[ScriptValue], ys: &[ScriptValue]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| key_eq(x, y))
    }
    match (a, b) {
        (ScriptValue::Float(x), ScriptValue::Float(y)) => x.to_bits() == y.to_bits(),
        (ScriptValue::List(xs), ScriptValue::List(ys))
        | (ScriptValue::Tuple(xs), ScriptValue::Tuple(ys))
        | (ScriptValue::Set(xs), ScriptValue::Set(ys)) => all_eq(xs, ys),
        (ScriptValue::Dict(xs), ScriptValue::Dict(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((xk, xv), (yk, yv))| key_eq(xk, yk) && key_eq(xv, yv))
        }
        _ => a == b,
    }
}

fn hash_key<H: Hasher>(value: &ScriptValue, state: &mut H) {
    mem::discriminant(value).hash(state);
    match value {
        ScriptValue::None => {}
        ScriptValue::Bool(b) => b.hash(state),
        ScriptValue::Int(i) => i.hash(state),
        ScriptValue::Float(f) => f.to_bits().hash(state),
        ScriptValue::String(s) | ScriptValue::Function(s) | ScriptValue::Opaque(s) => {
            s.hash(state)
        }
        ScriptValue::List(items) | ScriptValue::Tuple(items) | ScriptValue::Set(items) => {
            items.len().hash(state);
            for item in items {
                hash_key(item, state);
            }
        }
        ScriptValue::Dict(entries) => entries.len().hash(state),
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Bool(v)
    }
}

impl From<i64> for ScriptValue {
    fn from(v: i64) -> Self {
        ScriptValue::Int(v.into())
    }
}

impl From<i32> for ScriptValue {
    fn from(v: i32) -> Self {
        ScriptValue::Int(v.into())
    }
}

impl From<i128> for ScriptValue {
    fn from(v: i128) -> Self {
        ScriptValue::Int(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Float(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::String(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        ScriptValue::String(v)
    }
}

impl<T: Into<ScriptValue>> From<Vec<T>> for ScriptValue {
    fn from(v: Vec<T>) -> Self {
        ScriptValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ScriptValue>> From<Option<T>> for ScriptValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ScriptValue::None, Into::into)
    }
}

/// One keyword argument of an interpreter-level call.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    pub name: String,
    pub value: ScriptValue,
}

impl NamedArgument {
    pub fn new(name: impl Into<String>, value: impl Into<ScriptValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Keyword arguments arrive from the interpreter as `(name, value)` tuples.
impl TryFrom<ScriptValue> for NamedArgument {
    type Error = DecodeError;

    fn try_from(pair: ScriptValue) -> Result<Self, Self::Error> {
        let ScriptValue::Tuple(items) = pair else {
            return Err(DecodeError::InvalidArgument(format!(
                "expected a (name, value) tuple, got {}",
                pair.type_name()
            )));
        };
        let [name, value]: [ScriptValue; 2] = items.try_into().map_err(|items: Vec<_>| {
            DecodeError::InvalidArgument(format!(
                "expected a (name, value) tuple, got {} elements",
                items.len()
            ))
        })?;
        match name {
            ScriptValue::String(name) => Ok(Self { name, value }),
            other => Err(DecodeError::InvalidArgument(format!(
                "argument name must be a string, got {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_keeps_first_position_of_repeated_key() {
        let d = ScriptValue::dict([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(
            d,
            ScriptValue::Dict(vec![
                ("a".into(), ScriptValue::Int(3)),
                ("b".into(), ScriptValue::Int(2)),
            ])
        );
    }

    #[test]
    fn dict_with_many_keys_dedupes() {
        let d = ScriptValue::dict(
            (0..50_000)
                .map(|i| (format!("k{i}"), ScriptValue::Int(i)))
                .chain([("k7".to_string(), ScriptValue::None)]),
        );
        let ScriptValue::Dict(entries) = d else {
            panic!("expected dict");
        };
        assert_eq!(entries.len(), 50_000);
        assert_eq!(entries[7], ("k7".into(), ScriptValue::None));
        assert_eq!(entries[49_999], ("k49999".into(), ScriptValue::Int(49_999)));
    }

    #[test]
    fn float_keys_compare_by_bits() {
        let d = ScriptValue::dict([(1.5, "a"), (f64::NAN, "b"), (1.5, "c"), (f64::NAN, "d")]);
        let ScriptValue::Dict(entries) = d else {
            panic!("expected dict");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, ScriptValue::from("c"));
        assert_eq!(entries[1].1, ScriptValue::from("d"));
    }

    #[test]
    fn named_argument_from_tuple() {
        let arg = NamedArgument::try_from(ScriptValue::tuple(["url".into(), "x".into()]));
        assert_eq!(arg, Ok(NamedArgument::new("url", "x")));
    }

    #[test]
    fn named_argument_rejects_non_string_name() {
        let err = NamedArgument::try_from(ScriptValue::tuple([ScriptValue::Int(1), true.into()]))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "invalid argument: argument name must be a string, got int");
    }

    #[test]
    fn named_argument_rejects_wrong_arity() {
        let err = NamedArgument::try_from(ScriptValue::tuple(["only".into()])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument(_)));

        let err = NamedArgument::try_from(ScriptValue::list(["a".into(), "b".into()])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument(_)));
    }
}
