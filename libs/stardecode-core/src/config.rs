use std::fmt;

use serde::Deserialize;

use crate::error::DecodeError;

/// Width of the host integer produced for interpreter integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    /// 32-bit narrowing, for scripts written against 32-bit hosts.
    I32,
    #[default]
    I64,
}

impl IntWidth {
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntWidth::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntWidth::I64 => (i64::MIN.into(), i64::MAX.into()),
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntWidth::I32 => f.write_str("i32"),
            IntWidth::I64 => f.write_str("i64"),
        }
    }
}

/// Conversion and binding options.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Integer width checked by the converter.
    pub int_width: IntWidth,

    /// Integer-to-float and `f64`-to-`f32` coercions round silently.
    /// When off, an inexact coercion is a type mismatch.
    pub lossy_floats: bool,

    /// Fall back to an ASCII case-insensitive key match when the exact
    /// lookup misses.
    pub case_insensitive: bool,

    /// Report arguments that matched no field.
    pub error_unused: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            int_width: IntWidth::default(),
            lossy_floats: true,
            case_insensitive: true,
            error_unused: false,
        }
    }
}

impl DecodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, DecodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DecodeError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, DecodeError> {
        toml::from_str(toml_str).map_err(|e| DecodeError::Config(e.to_string()))
    }

    /// 32-bit integers, everything else default.
    pub fn compat() -> Self {
        Self {
            int_width: IntWidth::I32,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DecodeConfig::parse("").unwrap(), DecodeConfig::default());
    }

    #[test]
    fn parse_overrides() {
        let cfg = DecodeConfig::parse(
            r#"
            int_width = "i32"
            lossy_floats = false
            error_unused = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.int_width, IntWidth::I32);
        assert!(!cfg.lossy_floats);
        assert!(cfg.case_insensitive);
        assert!(cfg.error_unused);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = DecodeConfig::parse("tag_name = \"starlark\"").unwrap_err();
        assert!(matches!(err, DecodeError::Config(_)));
    }

    #[test]
    fn bad_value_is_a_config_error() {
        let err = DecodeConfig::parse("int_width = \"i16\"").unwrap_err();
        assert!(matches!(err, DecodeError::Config(_)));
        assert!(err.to_string().starts_with("config error:"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DecodeConfig::load("/nonexistent/stardecode.toml").unwrap_err();
        assert!(matches!(err, DecodeError::Config(_)));
        assert!(err.to_string().starts_with("config error: /nonexistent/stardecode.toml"));
    }
}
