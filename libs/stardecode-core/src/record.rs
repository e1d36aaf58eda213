use crate::bind::Binder;
use crate::error::DecodeError;
use crate::value::Value;

/// Declared type of a bindable field, as far as binding cares.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Bool,
    Int,
    Float,
    String,
    /// `Value` or `Mapping`: takes the converted tree as is.
    Any,
    Optional(fn() -> Shape),
    Seq(fn() -> Shape),
    /// String-keyed map.
    Map(fn() -> Shape),
    Record {
        name: &'static str,
        fields: fn() -> &'static [FieldDescriptor],
    },
}

impl Shape {
    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// Field table of the record reachable through this shape, if any.
    pub fn record(&self) -> Option<(&'static str, &'static [FieldDescriptor])> {
        match self {
            Shape::Record { name, fields } => Some((*name, fields())),
            Shape::Optional(inner) | Shape::Seq(inner) | Shape::Map(inner) => inner().record(),
            _ => None,
        }
    }
}

/// One row of a record's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub ident: &'static str,
    /// `#[kwarg(name = "...")]`, takes precedence over `ident`.
    pub rename: Option<&'static str>,
    pub required: bool,
    pub shape: fn() -> Shape,
}

impl FieldDescriptor {
    /// Argument name this field is looked up by.
    pub fn key(&self) -> &'static str {
        self.rename.unwrap_or(self.ident)
    }
}

/// A record keyword arguments can be bound onto.
///
/// Usually derived: `#[derive(Bindable, Default)]`. The derive also
/// implements [`FromValue`](crate::FromValue) so records nest.
pub trait Bindable: Default {
    /// Fully qualified record name, for diagnostics.
    const NAME: &'static str;

    fn fields() -> &'static [FieldDescriptor];

    /// Coerce `value` into the field at `index` of [`Bindable::fields`].
    fn bind_field(
        &mut self,
        index: usize,
        value: &Value,
        binder: &Binder,
    ) -> Result<(), DecodeError>;
}
