use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a [`NoteProgram`](crate::NoteProgram).
///
/// Loaded from TOML; every key is optional and unknown keys are rejected.
///
/// ```toml
/// namespace = "quill-notes"
/// event_channel_capacity = 256
/// event_history = 1024
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramConfig {
    /// Namespace every address is derived under. Clients must use the same one.
    pub namespace: String,
    /// Capacity of each subscriber's event channel.
    pub event_channel_capacity: usize,
    /// Number of recent events kept for late readers.
    pub event_history: usize,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            namespace: "quill-notes".into(),
            event_channel_capacity: 256,
            event_history: 1024,
        }
    }
}

impl ProgramConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity must be positive".into(),
            ));
        }
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Errors from loading a [`ProgramConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = ProgramConfig::default();
        assert_eq!(c.namespace, "quill-notes");
        assert_eq!(c.event_channel_capacity, 256);
        assert_eq!(c.event_history, 1024);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ProgramConfig::from_toml_str("").unwrap(), ProgramConfig::default());
    }

    #[test]
    fn partial_document_overrides_named_keys() {
        let c = ProgramConfig::from_toml_str("namespace = \"staging\"\nevent_history = 8\n").unwrap();
        assert_eq!(c.namespace, "staging");
        assert_eq!(c.event_history, 8);
        assert_eq!(c.event_channel_capacity, 256);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ProgramConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn signature_checks_can_not_be_configured_away() {
        let err = ProgramConfig::from_toml_str("require_signatures = false").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_channel_capacity_is_invalid() {
        let err = ProgramConfig::from_toml_str("event_channel_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event_history = 16").unwrap();
        let c = ProgramConfig::load(file.path()).unwrap();
        assert_eq!(c.event_history, 16);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProgramConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
