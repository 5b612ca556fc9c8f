//! Node configuration.
//!
//! Every field has a compiled-in default; an optional TOML file may override
//! any subset of them.

use crate::property::PropertyValue;
use crate::telemetry::TelemetryGroup;
use sensor_node_shared::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "SENSOR_NODE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "sensor-node.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where the node connects to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub address: String,
    pub connect_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8883".into(),
            connect_timeout_secs: 5,
        }
    }
}

/// Sampling cadence and message budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Initial value of the telemetry interval property (seconds)
    pub interval_secs: i64,
    /// Byte budget of one telemetry message
    pub max_message_size: usize,
    /// Scheduler tick; also the shortest wait the scheduler will ever use
    pub tick_ms: u64,
    /// Telemetry groups in sampling order
    pub groups: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::TELEMETRY_INTERVAL_SECS,
            max_message_size: defaults::MAX_MESSAGE_SIZE,
            tick_ms: defaults::SCHEDULER_TICK_MS,
            groups: TelemetryGroup::BUILTIN.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_chars: defaults::DISPLAY_LINE_CHARS,
        }
    }
}

/// Static facts reported under the device information component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
    pub os_name: String,
    pub processor_architecture: String,
    pub processor_manufacturer: String,
    /// KiB
    pub total_storage: i64,
    /// KiB
    pub total_memory: i64,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            manufacturer: "MXCHIP".into(),
            model: "AZ3166".into(),
            sw_version: env!("CARGO_PKG_VERSION").into(),
            os_name: "Linux".into(),
            processor_architecture: "Arm Cortex M4".into(),
            processor_manufacturer: "STMicroelectronics".into(),
            total_storage: 1024,
            total_memory: 128,
        }
    }
}

impl DeviceInfo {
    /// Reported property names and values, in publishing order
    pub fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("manufacturer", PropertyValue::Text(self.manufacturer.clone())),
            ("model", PropertyValue::Text(self.model.clone())),
            ("swVersion", PropertyValue::Text(self.sw_version.clone())),
            ("osName", PropertyValue::Text(self.os_name.clone())),
            (
                "processorArchitecture",
                PropertyValue::Text(self.processor_architecture.clone()),
            ),
            (
                "processorManufacturer",
                PropertyValue::Text(self.processor_manufacturer.clone()),
            ),
            ("totalStorage", PropertyValue::Int(self.total_storage)),
            ("totalMemory", PropertyValue::Int(self.total_memory)),
        ]
    }
}

/// Root configuration of the node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub device_id: String,
    pub endpoint: EndpointConfig,
    pub telemetry: TelemetryConfig,
    pub display: DisplayConfig,
    pub device_info: DeviceInfo,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: "node-001".into(),
            endpoint: EndpointConfig::default(),
            telemetry: TelemetryConfig::default(),
            display: DisplayConfig::default(),
            device_info: DeviceInfo::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config file location: `$SENSOR_NODE_CONFIG` or `./sensor-node.toml`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.device_id.trim().is_empty() {
            errors.push("device_id must not be empty".into());
        }
        if self.endpoint.address.trim().is_empty() {
            errors.push("endpoint.address must not be empty".into());
        }
        if self.telemetry.max_message_size == 0 {
            errors.push("telemetry.max_message_size must be positive".into());
        }
        if self.telemetry.tick_ms == 0 {
            errors.push("telemetry.tick_ms must be positive".into());
        }
        if self.telemetry.groups.is_empty() {
            errors.push("telemetry.groups must name at least one group".into());
        }

        let mut seen = HashSet::new();
        for name in &self.telemetry.groups {
            if TelemetryGroup::builtin(name).is_none() {
                errors.push(format!(
                    "unknown telemetry group {:?} (known: {})",
                    name,
                    TelemetryGroup::BUILTIN.join(", ")
                ));
            }
            if !seen.insert(name.as_str()) {
                errors.push(format!("telemetry group {:?} listed twice", name));
            }
        }

        errors
    }
}
