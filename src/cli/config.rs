//! Operator configuration
//!
//! ```json
//! {
//!   "store_dir": "./store",
//!   "soft_violations_block": false,
//!   "reject_unknown_fields": false,
//!   "max_containment_depth": 4096,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `store_dir` is required.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::observability::Severity;
use crate::validation::{ValidationPolicy, DEFAULT_MAX_CONTAINMENT_DEPTH};

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store directory (required)
    pub store_dir: String,

    /// Soft violations reject the document (default: false)
    #[serde(default)]
    pub soft_violations_block: bool,

    /// Undeclared fields reject the document (default: false)
    #[serde(default)]
    pub reject_unknown_fields: bool,

    #[serde(default = "default_max_containment_depth")]
    pub max_containment_depth: usize,

    /// One of trace, info, warn, error (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_containment_depth() -> usize {
    DEFAULT_MAX_CONTAINMENT_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.store_dir.trim().is_empty() {
            return Err(CliError::config_error("store_dir must not be empty"));
        }

        if self.max_containment_depth == 0 {
            return Err(CliError::config_error("max_containment_depth must be > 0"));
        }

        self.severity()?;

        Ok(())
    }

    pub fn store_path(&self) -> &Path {
        Path::new(&self.store_dir)
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }

    /// Validation policy described by this configuration
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            soft_violations_block: self.soft_violations_block,
            reject_unknown_fields: self.reject_unknown_fields,
            max_containment_depth: self.max_containment_depth,
        }
    }
}
