//! Checkpoint configuration
//!
//! Loaded once at startup, typically from a JSON file. The credential
//! roster is fixed for the lifetime of the run.

use std::path::Path;
use std::time::Duration;

use checkpoint_core::{CheckpointError, CheckpointResult, CredentialId, DEFAULT_ID_PREFIX_LEN};
use checkpoint_state::{CredentialDirectory, DEFAULT_LOG_CAPACITY};
use serde::{Deserialize, Serialize};

/// One roster entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Hex identifier as printed on the card
    pub id: String,
    /// Display name
    pub name: String,
}

impl CredentialConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CredentialConfig {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Checkpoint configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Known credentials, in slot order
    pub credentials: Vec<CredentialConfig>,
    /// Identifier characters compared when resolving a card
    pub id_prefix_len: usize,
    /// Global spacing between accepted scans
    pub debounce_ms: u64,
    /// How long a result stays on screen before the ready screen returns
    pub presentation_window_ms: u64,
    /// Pause between polling the entry and the exit lane
    pub inter_poll_delay_ms: u64,
    /// Pause between loop iterations
    pub poll_interval_ms: u64,
    /// Event log capacity
    pub log_capacity: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig {
            credentials: Vec::new(),
            id_prefix_len: DEFAULT_ID_PREFIX_LEN,
            debounce_ms: 1500,
            presentation_window_ms: 3000,
            inter_poll_delay_ms: 50,
            poll_interval_ms: 20,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl CheckpointConfig {
    /// Small roster for demos and manual testing
    pub fn demo() -> Self {
        CheckpointConfig {
            credentials: vec![
                CredentialConfig::new("5ADA9C80", "Alice"),
                CredentialConfig::new("A3F2B71C", "Bob"),
                CredentialConfig::new("0C41E9D2", "Carol"),
                CredentialConfig::new("77B05A13", "Dave"),
            ],
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> CheckpointResult<Self> {
        let config: CheckpointConfig = serde_json::from_str(json)
            .map_err(|e| CheckpointError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> CheckpointResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CheckpointError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check timing and sizing parameters.
    /// Credential ids are checked when the directory is built.
    pub fn validate(&self) -> CheckpointResult<()> {
        if self.id_prefix_len == 0 {
            return Err(CheckpointError::InvalidConfig("id_prefix_len must be positive".into()));
        }
        if self.debounce_ms == 0 {
            return Err(CheckpointError::InvalidConfig("debounce_ms must be positive".into()));
        }
        if self.presentation_window_ms == 0 {
            return Err(CheckpointError::InvalidConfig(
                "presentation_window_ms must be positive".into(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(CheckpointError::InvalidConfig("log_capacity must be positive".into()));
        }
        Ok(())
    }

    /// Build the credential directory from the roster
    pub fn directory(&self) -> CheckpointResult<CredentialDirectory> {
        CredentialDirectory::new(
            self.credentials
                .iter()
                .map(|c| (CredentialId::new(c.id.as_str()), c.name.as_str())),
            self.id_prefix_len,
        )
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn presentation_window(&self) -> Duration {
        Duration::from_millis(self.presentation_window_ms)
    }

    pub fn inter_poll_delay(&self) -> Duration {
        Duration::from_millis(self.inter_poll_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
