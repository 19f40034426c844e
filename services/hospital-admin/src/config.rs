//! Configuration types for the hospital administration console

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collection::SyncStrategy;
use crate::facility::Facility;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_facilities")]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub beds: BedsConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub patients: PatientsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facilities: default_facilities(),
            beds: BedsConfig::default(),
            inventory: InventoryConfig::default(),
            patients: PatientsConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Reject configurations no screen can work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.facilities.is_empty() {
            return Err(crate::HospitalError::Config(
                "At least one facility must be configured".to_string(),
            ));
        }
        for (i, facility) in self.facilities.iter().enumerate() {
            if facility.name.trim().is_empty() {
                return Err(crate::HospitalError::Config(format!(
                    "Facility {} has no name",
                    i
                )));
            }
            if facility.url.trim().is_empty() {
                return Err(crate::HospitalError::Config(format!(
                    "Facility '{}' has no url",
                    facility.name
                )));
            }
        }
        Ok(())
    }
}

/// Bed screen settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BedsConfig {
    #[serde(default)]
    pub after_write: SyncStrategy,
}

/// Inventory screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Stock level at or below which a sale raises a low-stock notice
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub after_write: SyncStrategy,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            after_write: SyncStrategy::default(),
        }
    }
}

/// Patient screen settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientsConfig {
    #[serde(default)]
    pub roster_policy: RosterPolicy,
}

/// How the multi-facility patient roster treats a failing facility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Any failing facility fails the whole roster
    #[default]
    AllOrNothing,
    /// Each facility reports its own success or failure
    PerFacility,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// No timeout is applied when unset
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

fn default_facilities() -> Vec<Facility> {
    vec![
        Facility::new("Bhardwaj Hospital", "http://localhost:5000"),
        Facility::new("Balaji Soni Hospital", "http://vedicvarma.com:5000"),
        Facility::new("Agrawal Hospital", "http://192.168.205.1:5000"),
    ]
}

fn default_low_stock_threshold() -> u32 {
    crate::inventory::THRESHOLD
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::HospitalError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
