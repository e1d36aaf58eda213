use std::fmt;

use crate::config::IntWidth;

/// One step from a binding target down to a nested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a field inside a binding target, e.g. `contact.hobbies[1]`.
///
/// Empty for errors raised at the root of the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Prepend a field name (errors gain their path while unwinding).
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.0.insert(0, PathSegment::Field(name.into()));
        self
    }

    /// Prepend a sequence index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.0.insert(0, PathSegment::Index(index));
        self
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Every failure of a conversion or a bind. The first error aborts the
/// operation; nothing is retried or swallowed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported script type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("integer {value} out of range for {width}")]
    Range { value: i128, width: IntWidth },

    #[error("type mismatch at '{path}': expected {expected}, got {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing required argument '{path}'")]
    MissingArgument { path: FieldPath },

    #[error("unused arguments at '{path}': {}", names.join(", "))]
    UnusedArguments { path: FieldPath, names: Vec<String> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid binding target '{target}': {reason}")]
    InvalidTarget { target: &'static str, reason: String },

    #[error("config error: {0}")]
    Config(String),
}

impl DecodeError {
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            path: FieldPath::root(),
            expected,
            found,
        }
    }

    /// Record that the error happened below field `name`.
    ///
    /// Only path-carrying variants change; the others pass through untouched.
    pub fn with_field(self, name: &str) -> Self {
        self.map_path(|p| p.with_field(name))
    }

    /// Record that the error happened below sequence element `index`.
    pub fn with_index(self, index: usize) -> Self {
        self.map_path(|p| p.with_index(index))
    }

    /// Path of the offending field, if the error carries one.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingArgument { path }
            | Self::UnusedArguments { path, .. } => Some(path),
            _ => None,
        }
    }

    fn map_path(self, f: impl FnOnce(FieldPath) -> FieldPath) -> Self {
        match self {
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => Self::TypeMismatch {
                path: f(path),
                expected,
                found,
            },
            Self::MissingArgument { path } => Self::MissingArgument { path: f(path) },
            Self::UnusedArguments { path, names } => Self::UnusedArguments {
                path: f(path),
                names,
            },
            other => other,
        }
    }
}
