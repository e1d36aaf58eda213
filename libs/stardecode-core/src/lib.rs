pub mod bind;
pub mod config;
pub mod convert;
pub mod error;
pub mod from_value;
pub mod record;
pub mod script;
pub mod value;

pub use bind::{Binder, bind};
pub use config::{DecodeConfig, IntWidth};
pub use convert::{Converter, convert};
pub use error::{DecodeError, FieldPath, PathSegment};
pub use from_value::FromValue;
pub use record::{Bindable, FieldDescriptor, Shape};
pub use script::{NamedArgument, ScriptValue};
pub use value::{Mapping, Value};

pub use stardecode_derive::Bindable;
