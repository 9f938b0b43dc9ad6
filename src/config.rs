//! Executor configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```toml
//! entry_point = "main"
//! max_call_depth = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default worker stack size (256 MiB); deep recursion in the traced program
/// is deep recursion in the evaluator.
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for one [`Executor`](crate::executor::Executor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Function invoked after the driver statements, if the program defines it
    pub entry_point: String,
    /// Deepest allowed user call stack
    pub max_call_depth: usize,
    /// Largest timeline a run may record
    pub max_events: usize,
    /// Stack size of the worker thread the run executes on, in bytes
    pub stack_size: usize,
    /// Pause before execution starts
    pub presentation_delay_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            entry_point: "main".to_string(),
            max_call_depth: 10_000,
            max_events: 1_000_000,
            stack_size: DEFAULT_STACK_SIZE,
            presentation_delay_ms: 0,
        }
    }
}

impl ExecutorConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn presentation_delay(&self) -> Duration {
        Duration::from_millis(self.presentation_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_call_depth = 50\nentry_point = \"start\"").unwrap();

        let config = ExecutorConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            ExecutorConfig {
                entry_point: "start".to_string(),
                max_call_depth: 50,
                ..ExecutorConfig::default()
            }
        );
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_call_depth = \"deep\"").unwrap();

        let err = ExecutorConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExecutorConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
