//! Store configuration
//!
//! Configuration is plain data with serde defaults, so it can be loaded
//! from a JSON document or built in code.

use serde::{Deserialize, Serialize};

use crate::observability::{Logger, Severity, DEFAULT_MIN_SEVERITY};

/// Configuration shared by a store and the queries run against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Field holding each document's identifier (default: "_id")
    #[serde(default = "default_id_prop")]
    pub id_prop: String,

    /// Lowest severity written by the logger (default: warn)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_id_prop() -> String {
    "_id".to_string()
}

fn default_log_level() -> Severity {
    DEFAULT_MIN_SEVERITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_prop: default_id_prop(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Parses configuration from a JSON string; missing keys take defaults
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Create a config with a custom identifier field
    pub fn with_id_prop(id_prop: impl Into<String>) -> Self {
        Self {
            id_prop: id_prop.into(),
            ..Default::default()
        }
    }

    pub fn log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Applies `log_level` to the process-wide logger
    pub fn init_logging(&self) {
        Logger::set_min_severity(self.log_level);
    }
}
