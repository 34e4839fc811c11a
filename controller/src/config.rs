//! Controller configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use driveguard_types::GateParams;
use driveguard_utils::LogFormat;
use driveguard_verification::PipelineConfig;

use crate::ControllerError;

/// Configuration for one ignition controller.
///
/// Can be loaded from a TOML file via [`ControllerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Directory under which session workspaces are created.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Label passed to the document extractor.
    #[serde(default = "default_document_label")]
    pub document_label: String,

    /// Whether the gas sensor performs its stabilization delay.
    #[serde(default = "default_true")]
    pub sensor_warmup: bool,

    /// Upper bound on the license validation call, in seconds.
    #[serde(default = "default_validation_timeout_secs")]
    pub validation_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Thresholds handed to the collaborators.
    #[serde(default)]
    pub params: GateParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/sessions")
}

fn default_document_label() -> String {
    "DRIVING LICENSE".to_string()
}

fn default_true() -> bool {
    true
}

fn default_validation_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ControllerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ControllerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ControllerError> {
        toml::from_str(s).map_err(|e| ControllerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ControllerError> {
        toml::to_string_pretty(self).map_err(|e| ControllerError::Config(e.to_string()))
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            document_label: self.document_label.clone(),
            validation_timeout: self.validation_timeout(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            document_label: default_document_label(),
            sensor_warmup: true,
            validation_timeout_secs: default_validation_timeout_secs(),
            log_format: LogFormat::Human,
            log_level: default_log_level(),
            params: GateParams::default(),
        }
    }
}
