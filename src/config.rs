//! Registry configuration

use crate::error::{DispatchError, Result};
use crate::types::Priority;
use serde::{Deserialize, Serialize};

/// Configuration for an `EventRegistry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Registry label, attached to log records
    pub name: String,

    /// Priority used by `subscribe_default` and `on_default`
    pub default_priority: Priority,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            default_priority: Priority::Normal,
        }
    }
}

impl RegistryConfig {
    /// Create a config with the given registry name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the default subscription priority
    pub fn with_default_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.default_priority = priority.into();
        self
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DispatchError::Config(
                "Registry name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
