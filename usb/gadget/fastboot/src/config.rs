use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const EMBEDDED: &str = include_str!("../fastboot.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse fastboot config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Identity and timing of the gadget. Missing keys take the built-in defaults.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct FastbootConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_release: u16,
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
    pub configuration: String,
    pub interface: String,
    /// Ceiling for the whole run loop, not per transfer.
    pub run_timeout_us: u64,
    pub error_stall_ms: u64,
}

impl Default for FastbootConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x8087,
            product_id: 0x0A65,
            device_release: 0x0100,
            manufacturer: "Intel(R)Corporation".to_owned(),
            product: "Intel Fastboot Interface".to_owned(),
            serial: "INT123456".to_owned(),
            configuration: "USB-Update".to_owned(),
            interface: "Fastboot".to_owned(),
            run_timeout_us: 6_000_000,
            error_stall_ms: 2000,
        }
    }
}

impl FastbootConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// The config compiled into the binary, or the defaults if it does not parse.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED).unwrap_or_else(|err| {
            log::warn!("fastboot: {}, using defaults", err);
            Self::default()
        })
    }

    pub fn error_stall(&self) -> Duration {
        Duration::from_millis(self.error_stall_ms)
    }
}
