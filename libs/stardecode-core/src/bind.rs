//! Keyword arguments → typed record.
//!
//! Each argument is converted, the results are collected into a name-keyed
//! [`Mapping`], and the mapping is bound field by field using the record's
//! descriptor table. A field is looked up by its override name when it has
//! one, by its own name otherwise. Absent arguments leave the field as is.

use crate::config::DecodeConfig;
use crate::convert::Converter;
use crate::error::{DecodeError, FieldPath};
use crate::record::{Bindable, FieldDescriptor};
use crate::script::NamedArgument;
use crate::value::{Mapping, Value};

/// Bind with the default configuration.
pub fn bind<T: Bindable>(args: &[NamedArgument], target: &mut T) -> Result<(), DecodeError> {
    Binder::default().bind(args, target)
}

#[derive(Debug, Clone, Default)]
pub struct Binder {
    config: DecodeConfig,
    converter: Converter,
}

impl Binder {
    pub fn new(config: DecodeConfig) -> Self {
        let converter = Converter::new(&config);
        Self { config, converter }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Convert `args` and bind them onto `target`.
    ///
    /// The field table of `T` (and of every record nested in it) is checked
    /// before any argument is converted.
    pub fn bind<T: Bindable>(
        &self,
        args: &[NamedArgument],
        target: &mut T,
    ) -> Result<(), DecodeError> {
        validate_target::<T>()?;
        let input = self.collect(args)?;
        tracing::debug!(args = args.len(), target = T::NAME, "binding keyword arguments");
        self.bind_record(&input, target)
    }

    /// Convert every argument into one name-keyed mapping.
    ///
    /// A repeated name keeps the last value.
    pub fn collect(&self, args: &[NamedArgument]) -> Result<Mapping, DecodeError> {
        let mut input = Mapping::with_capacity(args.len());
        for arg in args {
            let value = self.converter.convert(&arg.value)?;
            input.insert(arg.name.as_str(), value);
        }
        Ok(input)
    }

    /// Bind an already converted value onto `target`. It must be a mapping.
    pub fn bind_value<T: Bindable>(&self, value: &Value, target: &mut T) -> Result<(), DecodeError> {
        validate_target::<T>()?;
        self.bind_nested(value, target)
    }

    /// [`Binder::bind_value`] without the field table check. Used by derived
    /// records for their nested fields.
    #[doc(hidden)]
    pub fn bind_nested<T: Bindable>(&self, value: &Value, target: &mut T) -> Result<(), DecodeError> {
        match value {
            Value::Map(input) => self.bind_record(input, target),
            other => Err(DecodeError::mismatch("mapping", other.kind())),
        }
    }

    fn bind_record<T: Bindable>(&self, input: &Mapping, target: &mut T) -> Result<(), DecodeError> {
        let mut matched: Vec<&str> = Vec::with_capacity(T::fields().len());

        for (index, field) in T::fields().iter().enumerate() {
            let Some((key, value)) = self.lookup(input, field.key()) else {
                if field.required {
                    return Err(DecodeError::MissingArgument {
                        path: FieldPath::root().with_field(field.key()),
                    });
                }
                tracing::trace!(record = T::NAME, field = field.ident, "argument absent, keeping default");
                continue;
            };
            matched.push(key);

            if value.is_null() && !(field.shape)().is_optional() {
                if field.required {
                    return Err(DecodeError::MissingArgument {
                        path: FieldPath::root().with_field(field.key()),
                    });
                }
                tracing::trace!(record = T::NAME, field = field.ident, "argument is null, keeping default");
                continue;
            }

            target
                .bind_field(index, value, self)
                .map_err(|e| e.with_field(field.key()))?;
            tracing::trace!(record = T::NAME, field = field.ident, key, "bound field");
        }

        if self.config.error_unused {
            let names: Vec<String> = input
                .keys()
                .filter(|k| !k.as_str().is_some_and(|s| matched.contains(&s)))
                .map(key_label)
                .collect();
            if !names.is_empty() {
                return Err(DecodeError::UnusedArguments {
                    path: FieldPath::root(),
                    names,
                });
            }
        }
        Ok(())
    }

    /// Exact match first, then the case-insensitive fallback when enabled.
    fn lookup<'a>(&self, input: &'a Mapping, key: &'a str) -> Option<(&'a str, &'a Value)> {
        if let Some(value) = input.get_str(key) {
            return Some((key, value));
        }
        if self.config.case_insensitive {
            return input.get_str_ignore_case(key);
        }
        None
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("<{}>", other.kind()),
    }
}

/// Reject field tables no argument mapping could be bound onto: empty or
/// repeated lookup keys, in `T` or any record reachable from it.
fn validate_target<T: Bindable>() -> Result<(), DecodeError> {
    let mut seen: Vec<&'static str> = Vec::new();
    validate_fields(T::NAME, T::fields(), &mut seen)
}

fn validate_fields(
    name: &'static str,
    fields: &'static [FieldDescriptor],
    seen: &mut Vec<&'static str>,
) -> Result<(), DecodeError> {
    if seen.contains(&name) {
        return Ok(());
    }
    seen.push(name);

    for (i, field) in fields.iter().enumerate() {
        let key = field.key();
        if key.is_empty() {
            return Err(DecodeError::InvalidTarget {
                target: name,
                reason: format!("field '{}' has an empty argument name", field.ident),
            });
        }
        if fields[..i].iter().any(|other| other.key() == key) {
            return Err(DecodeError::InvalidTarget {
                target: name,
                reason: format!("argument name '{key}' is bound by more than one field"),
            });
        }
        if let Some((nested, nested_fields)) = (field.shape)().record() {
            validate_fields(nested, nested_fields, seen)?;
        }
    }
    Ok(())
}
