//! Configuration management
//!
//! Options are read once at startup from a flat JSON file (the add-on
//! `options.json`) or, for `.toml` paths, a TOML file with the same keys.
//! `Config::validate` turns the raw options into typed `Settings`; any
//! failure there is fatal.

use crate::cli::Cli;
use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_IDLE_CH_RAW, DEFAULT_MAX_CH_RAW, DEFAULT_MQTT_HOST,
    DEFAULT_MQTT_PORT, DEFAULT_MQTT_TIMEOUT_SECS, DEFAULT_MQTT_TOPIC, DEFAULT_RAMP_INTERVAL_SECS,
    DEFAULT_RAMP_STEP_RAW, DEFAULT_SERIAL_DEVICE, RAW_MAX, RAW_MIN,
};
use crate::error::{BridgeError, Result};
use crate::filter::DeviceId;
use crate::mqtt::MqttSettings;
use crate::ramp::RampPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Raw options
// =============================================================================

/// Options as found in the options file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Controller (evohome) address, `NN:NNNNNN`
    pub controller_id: String,
    /// OpenTherm bridge address, `NN:NNNNNN`
    pub otb_id: String,

    /// Raw setpoint at or below which demand is idle
    pub idle_ch_raw: u8,
    /// Static ceiling (raw)
    pub max_ch_raw: u8,

    pub serial_device: String,
    pub baud_rate: u32,

    pub mqtt_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic: String,
    /// Seconds an override stays in effect without refresh
    pub mqtt_timeout_sec: u64,

    pub ramp_enabled: bool,
    pub ramp_step_raw: u8,
    pub ramp_interval_sec: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller_id: String::new(),
            otb_id: String::new(),
            idle_ch_raw: DEFAULT_IDLE_CH_RAW,
            max_ch_raw: DEFAULT_MAX_CH_RAW,
            serial_device: DEFAULT_SERIAL_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            mqtt_enabled: true,
            mqtt_host: DEFAULT_MQTT_HOST.to_string(),
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_username: None,
            mqtt_password: None,
            mqtt_topic: DEFAULT_MQTT_TOPIC.to_string(),
            mqtt_timeout_sec: DEFAULT_MQTT_TIMEOUT_SECS,
            ramp_enabled: true,
            ramp_step_raw: DEFAULT_RAMP_STEP_RAW,
            ramp_interval_sec: DEFAULT_RAMP_INTERVAL_SECS,
        }
    }
}

// =============================================================================
// Validated settings
// =============================================================================

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub device: String,
    pub baud_rate: u32,
}

/// Typed, validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub controller_id: DeviceId,
    pub otb_id: DeviceId,
    pub max_ch_raw: u8,
    pub override_timeout: Duration,
    pub ramp: RampPolicy,
    pub serial: SerialSettings,
    /// `None` when the override listener is disabled
    pub mqtt: Option<MqttSettings>,
}

impl Config {
    /// Apply command-line overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = &cli.port {
            self.serial_device = port.clone();
        }
        if cli.no_mqtt {
            self.mqtt_enabled = false;
        }
    }

    /// Check every value and build `Settings`
    pub fn validate(&self) -> Result<Settings> {
        let controller_id: DeviceId = self.controller_id.parse()?;
        let otb_id: DeviceId = self.otb_id.parse()?;

        if !(RAW_MIN..=RAW_MAX).contains(&self.max_ch_raw) {
            return Err(BridgeError::ConfigValidation {
                field: "max_ch_raw",
                reason: format!(
                    "{} is outside {}..={}",
                    self.max_ch_raw, RAW_MIN, RAW_MAX
                ),
            });
        }
        if self.ramp_step_raw == 0 {
            return Err(BridgeError::ConfigValidation {
                field: "ramp_step_raw",
                reason: "must be greater than 0".into(),
            });
        }
        if self.ramp_interval_sec == 0 {
            return Err(BridgeError::ConfigValidation {
                field: "ramp_interval_sec",
                reason: "must be greater than 0".into(),
            });
        }
        if self.serial_device.trim().is_empty() {
            return Err(BridgeError::ConfigValidation {
                field: "serial_device",
                reason: "must not be empty".into(),
            });
        }

        let mqtt = if self.mqtt_enabled {
            if self.mqtt_topic.trim().is_empty() {
                return Err(BridgeError::ConfigValidation {
                    field: "mqtt_topic",
                    reason: "must not be empty".into(),
                });
            }
            if self.mqtt_host.trim().is_empty() {
                return Err(BridgeError::ConfigValidation {
                    field: "mqtt_host",
                    reason: "must not be empty".into(),
                });
            }
            Some(MqttSettings {
                host: self.mqtt_host.clone(),
                port: self.mqtt_port,
                topic: self.mqtt_topic.clone(),
                username: self.mqtt_username.clone().filter(|u| !u.is_empty()),
                password: self.mqtt_password.clone(),
            })
        } else {
            None
        };

        Ok(Settings {
            controller_id,
            otb_id,
            max_ch_raw: self.max_ch_raw,
            override_timeout: Duration::from_secs(self.mqtt_timeout_sec),
            ramp: RampPolicy {
                idle_threshold: self.idle_ch_raw,
                step: self.ramp_step_raw,
                interval: Duration::from_secs(self.ramp_interval_sec),
                enabled: self.ramp_enabled,
            },
            serial: SerialSettings {
                device: self.serial_device.clone(),
                baud_rate: self.baud_rate,
            },
            mqtt,
        })
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse options text; `toml` selects the TOML parser, otherwise JSON
pub fn parse(content: &str, toml: bool, path: &Path) -> Result<Config> {
    let parsed = if toml {
        toml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| BridgeError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Load options from file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| BridgeError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_toml = path.extension().map(|x| x == "toml").unwrap_or(false);
    parse(&content, is_toml, path)
}

// ============================================================================
// Tests
// ============================================================================
