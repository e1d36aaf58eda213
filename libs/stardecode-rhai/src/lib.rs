//! Rhai front end: lowers `rhai::Dynamic` values into [`ScriptValue`] so
//! scripts can feed the converter and the binder.
//!
//! Rhai has no tuples or sets; object maps become dictionaries (iterated in
//! key order), arrays become lists, `()` becomes `None`. Function pointers,
//! blobs and every other Rhai type pass through as unconvertible kinds.

use rhai::{Array, Dynamic, Engine, FnPtr, ImmutableString, Map};
use stardecode_core::{Bindable, Binder, DecodeError, NamedArgument, ScriptValue};

#[derive(Debug, thiserror::Error)]
pub enum RhaiError {
    #[error("script error: {0}")]
    Eval(String),

    #[error("keyword arguments must be an object map, got {0}")]
    NotAMap(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Lower one Rhai value.
pub fn script_value(value: &Dynamic) -> ScriptValue {
    if value.is_unit() {
        return ScriptValue::None;
    }
    if let Ok(b) = value.as_bool() {
        return ScriptValue::Bool(b);
    }
    if let Ok(i) = value.as_int() {
        return ScriptValue::Int(i.into());
    }
    if let Ok(f) = value.as_float() {
        return ScriptValue::Float(f.into());
    }
    if let Ok(c) = value.as_char() {
        return ScriptValue::String(c.to_string());
    }
    if let Some(s) = value.clone().try_cast::<ImmutableString>() {
        return ScriptValue::String(s.to_string());
    }
    if let Some(items) = value.clone().try_cast::<Array>() {
        return ScriptValue::List(items.iter().map(script_value).collect());
    }
    if let Some(map) = value.clone().try_cast::<Map>() {
        return dict(&map);
    }
    if let Some(fn_ptr) = value.clone().try_cast::<FnPtr>() {
        return ScriptValue::Function(fn_ptr.fn_name().to_string());
    }
    tracing::trace!(type_name = value.type_name(), "rhai value has no script counterpart");
    ScriptValue::Opaque(value.type_name().to_string())
}

fn dict(map: &Map) -> ScriptValue {
    ScriptValue::Dict(
        map.iter()
            .map(|(k, v)| (ScriptValue::String(k.to_string()), script_value(v)))
            .collect(),
    )
}

/// Object map entries as keyword arguments, one per key.
pub fn kwargs(map: &Map) -> Vec<NamedArgument> {
    map.iter()
        .map(|(k, v)| NamedArgument {
            name: k.to_string(),
            value: script_value(v),
        })
        .collect()
}

/// Evaluate `script` and read its result as keyword arguments.
///
/// The script must evaluate to an object map, e.g. `#{ url: "http://..." }`.
pub fn eval_kwargs(engine: &Engine, script: &str) -> Result<Vec<NamedArgument>, RhaiError> {
    let result: Dynamic = engine
        .eval(script)
        .map_err(|e| RhaiError::Eval(e.to_string()))?;
    let type_name = result.type_name();
    let map = result
        .try_cast::<Map>()
        .ok_or_else(|| RhaiError::NotAMap(type_name.to_string()))?;
    Ok(kwargs(&map))
}

/// Evaluate `script` and bind its object map onto `target`.
pub fn bind_script<T: Bindable>(
    engine: &Engine,
    binder: &Binder,
    script: &str,
    target: &mut T,
) -> Result<(), RhaiError> {
    let args = eval_kwargs(engine, script)?;
    binder.bind(&args, target)?;
    Ok(())
}
