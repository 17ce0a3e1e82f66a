use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CoreError, Result};

/// Top-level configuration for the taskgate engine.
///
/// Loaded from `taskgate.toml` by default. Each section corresponds to one
/// engine concern; every section and field has a default so a partial file
/// (or none at all) still yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskgateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for TaskgateConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            risk: RiskConfig::default(),
            gate: GateConfig::default(),
            dispatch: DispatchConfig::default(),
            notify: NotifyConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl TaskgateConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TaskgateConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Risk assessment tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Classification confidence below this floor escalates the risk tier
    /// by one step. Must stay below the keyword-fallback constant (0.3) or
    /// every keyword-classified request escalates itself.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_floor: default_confidence_floor(),
        }
    }
}

fn default_confidence_floor() -> f32 {
    0.25
}

/// Approval gate timeouts and sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Deadline for MEDIUM-risk approvals, seconds from gate open.
    #[serde(default = "default_medium_timeout")]
    pub medium_timeout_secs: u64,
    /// Deadline for HIGH-risk approvals, seconds from gate open.
    #[serde(default = "default_high_timeout")]
    pub high_timeout_secs: u64,
    /// Interval between background expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            medium_timeout_secs: default_medium_timeout(),
            high_timeout_secs: default_high_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_medium_timeout() -> u64 {
    86_400 // 24h
}

fn default_high_timeout() -> u64 {
    14_400 // 4h
}

fn default_sweep_interval() -> u64 {
    60
}

/// Dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Hard ceiling on a single handler invocation.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_secs: u64,
    /// Quality score at or above which an output counts as passing.
    #[serde(default = "default_pass_score")]
    pub pass_score: f32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: default_handler_timeout(),
            pass_score: default_pass_score(),
        }
    }
}

fn default_handler_timeout() -> u64 {
    30
}

fn default_pass_score() -> f32 {
    0.7
}

/// Webhook notification targets. Both optional; when neither is set the
/// engine runs with notifications disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Slack incoming-webhook URL.
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
    /// Generic HTTP POST target receiving the raw JSON payload.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Audit log destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines file every decision record is appended to.
    #[serde(default = "default_audit_path")]
    pub log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: default_audit_path(),
        }
    }
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("./data/audit.log")
}
