//! Execution options
//!
//! Options can be built in code or loaded from TOML, either at top level:
//!
//! ```toml
//! max_steps = 200
//! deadline_ms = 5000
//! dry_run = true
//! ```
//!
//! or nested under an `[execution]` table inside a larger config file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_STEPS: u32 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid options: {0}")]
    Invalid(String),
}

/// Limits and mode for a single plan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Ceiling on statements plus loop iterations executed
    pub max_steps: u32,
    /// Wall-clock budget in milliseconds, measured from the start of the execution
    pub deadline_ms: Option<u64>,
    /// Record CALLs without invoking capabilities; results are null
    pub dry_run: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            deadline_ms: None,
            dry_run: false,
        }
    }
}

#[derive(Deserialize)]
struct OptionsFile {
    execution: Option<ExecutionOptions>,
    #[serde(flatten)]
    top_level: ExecutionOptions,
}

impl ExecutionOptions {
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_steps must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = toml::from_str(content)?;
        let options = file.execution.unwrap_or(file.top_level);
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExecutionOptions::default();
        assert_eq!(options.max_steps, 1000);
        assert_eq!(options.deadline_ms, None);
        assert!(!options.dry_run);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = ExecutionOptions::default()
            .with_max_steps(10)
            .with_deadline_ms(250)
            .with_dry_run(true);
        assert_eq!(options.max_steps, 10);
        assert_eq!(options.deadline(), Some(Duration::from_millis(250)));
        assert!(options.dry_run);
    }

    #[test]
    fn test_top_level_toml() {
        let options = ExecutionOptions::from_toml_str("max_steps = 5\ndry_run = true\n").unwrap();
        assert_eq!(
            options,
            ExecutionOptions {
                max_steps: 5,
                deadline_ms: None,
                dry_run: true
            }
        );
    }

    #[test]
    fn test_execution_table_toml() {
        let content = "[execution]\ndeadline_ms = 1500\n\n[other]\nkey = \"ignored\"\n";
        let options = ExecutionOptions::from_toml_str(content).unwrap();
        assert_eq!(options.deadline_ms, Some(1500));
        assert_eq!(options.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let err = ExecutionOptions::from_toml_str("max_steps = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        std::fs::write(&path, "max_steps = 42\n").unwrap();
        assert_eq!(ExecutionOptions::load(&path).unwrap().max_steps, 42);
        assert!(matches!(
            ExecutionOptions::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
