//! Model configuration file parsing.

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::runtime::ds::identity;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The file is not a valid configuration. `line` is 1-based, when known.
    Parse { line: Option<usize>, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config error: {}", msg),
            ConfigError::Parse {
                line: Some(line),
                message,
            } => write!(f, "Config error on line {}: {}", line, message),
            ConfigError::Parse {
                line: None,
                message,
            } => write!(f, "Config error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the object model, the `[model]` table of `klass.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Whether instances display with their identity suffix.
    pub identity_display: bool,
    /// Log filter handed to the logger when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    model: ModelConfig,
}

impl ModelConfig {
    pub fn new() -> Self {
        ModelConfig {
            identity_display: false,
            log_level: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// Expected format:
    /// ```toml
    /// [model]
    /// identity_display = true
    /// log_level = "debug"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            line: e.span().map(|span| line_of(content, span.start)),
            message: e.message().to_string(),
        })?;
        let config = file.model;
        if let Some(level) = &config.log_level {
            if level.trim().is_empty() {
                return Err(ConfigError::Parse {
                    line: None,
                    message: "log_level must not be empty".to_string(),
                });
            }
        }
        Ok(config)
    }

    /// Apply the settings to the current thread.
    pub fn apply(&self) {
        debug!("identity display set to {}", self.identity_display);
        identity::set_identity_display(self.identity_display);
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ModelConfig::parse(
            r#"
# klass.toml
[model]
identity_display = true
log_level = "debug"  # verbose
"#,
        )
        .unwrap();
        assert!(config.identity_display);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(ModelConfig::parse("").unwrap(), ModelConfig::default());
        assert_eq!(ModelConfig::parse("[model]\n").unwrap(), ModelConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ModelConfig::parse("[model]\n\ncolour = true\n").unwrap_err();
        match err {
            ConfigError::Parse { message, .. } => assert!(message.contains("colour"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_boolean_names_line() {
        let err = ModelConfig::parse("[model]\nidentity_display = yes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: Some(2), .. }), "{:?}", err);
    }

    #[test]
    fn test_wrong_value_type() {
        let err = ModelConfig::parse("[model]\nidentity_display = \"true\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_key_outside_section() {
        let err = ModelConfig::parse("identity_display = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_section() {
        let err = ModelConfig::parse("[plugins]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_malformed_line_names_line() {
        let err = ModelConfig::parse("[model]\nidentity_display\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: Some(_), .. }), "{:?}", err);
    }

    #[test]
    fn test_empty_log_level() {
        let err = ModelConfig::parse("[model]\nlog_level = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: None, .. }));
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 2), 2);
        assert_eq!(line_of("a\nb\nc", 99), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelConfig::load(Path::new("/nonexistent/klass.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_apply_sets_identity_display() {
        let mut config = ModelConfig::new();
        config.identity_display = true;
        config.apply();
        assert!(identity::identity_display_enabled());
        ModelConfig::new().apply();
        assert!(!identity::identity_display_enabled());
    }
}
