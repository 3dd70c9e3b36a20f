use crate::error::{Result, VigilError};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// EscalationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Webhook to notify for grace-expired episodes. When unset, alerts are
    /// logged but not delivered anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Per-dispatch timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Maximum escalation calls in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: default_timeout_seconds(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Default organization for schedules and manual check-ins.
    pub organization_id: String,
    #[serde(default)]
    pub escalation: EscalationConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            version: 1,
            organization_id: organization_id.into(),
            escalation: EscalationConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(VigilError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new("acme");
        config.escalation.webhook_url = Some("https://alerts.example/hook".to_string());
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(VigilError::NotInitialized)
        ));
    }

    #[test]
    fn escalation_defaults_apply() {
        let yaml = "organization_id: acme\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.escalation.webhook_url.is_none());
        assert_eq!(config.escalation.timeout_seconds, 10);
        assert_eq!(config.escalation.max_concurrent, 8);
    }
}
