//! Router Configuration
//!
//! Loaded from environment variables (with `.env` support) or from a TOML
//! file. Defaults give a router that samples 100 whole units per probe and
//! refuses routes with a missing venue.

use alloy_primitives::{address, Address};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

// ============================================
// ABSENT VENUE POLICY
// ============================================

/// What the executor does with a hop whose venue is the absent sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentVenuePolicy {
    /// Fail the whole execution before any transfer
    #[default]
    Reject,

    /// Stop at that hop and pay out the running amount of the last asset
    /// reached (still subject to the minimum-output check)
    Truncate,
}

impl std::fmt::Display for AbsentVenuePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbsentVenuePolicy::Reject => write!(f, "REJECT"),
            AbsentVenuePolicy::Truncate => write!(f, "TRUNCATE"),
        }
    }
}

impl FromStr for AbsentVenuePolicy {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "fail" => Ok(AbsentVenuePolicy::Reject),
            "truncate" => Ok(AbsentVenuePolicy::Truncate),
            other => Err(eyre::eyre!("Unknown absent venue policy '{}'", other)),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

/// Default executor account (holds funds only during an execution)
pub const DEFAULT_EXECUTOR: Address = address!("00000000000000000000000000000000000e7ec0");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    // ========== Rate Sampling ==========
    /// Whole units of the input asset used as the probe amount
    pub probe_units: u64,

    /// Largest registry a graph build accepts (a solve is O(N³))
    pub max_assets: usize,

    // ========== Execution ==========
    /// Handling of a hop without a venue
    pub absent_venue_policy: AbsentVenuePolicy,

    /// Account that pulls the input and holds funds between hops
    pub executor_address: Address,

    // ========== Swap Log ==========
    /// Append every completed swap to `swap_log_path` as a JSON line
    pub swap_log: bool,

    pub swap_log_path: String,

    // ========== CLI ==========
    /// Scenario file the CLI loads its assets, venues and balances from
    pub scenario_path: String,
}

impl RouterConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            probe_units: env::var("PROBE_UNITS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.probe_units),
            max_assets: env::var("MAX_ASSETS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_assets),
            absent_venue_policy: match env::var("ABSENT_VENUE_POLICY") {
                Ok(s) => s.parse()?,
                Err(_) => defaults.absent_venue_policy,
            },
            executor_address: match env::var("EXECUTOR_ADDRESS") {
                Ok(s) => Address::from_str(s.trim())?,
                Err(_) => defaults.executor_address,
            },
            swap_log: env::var("SWAP_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.swap_log),
            swap_log_path: env::var("SWAP_LOG_PATH").unwrap_or(defaults.swap_log_path),
            scenario_path: env::var("SCENARIO_PATH").unwrap_or(defaults.scenario_path),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.probe_units == 0 {
            return Err(eyre::eyre!("PROBE_UNITS must be at least 1"));
        }
        if self.max_assets < 2 {
            return Err(eyre::eyre!(
                "MAX_ASSETS must allow at least 2 assets (currently {})",
                self.max_assets
            ));
        }
        if self.executor_address == Address::ZERO {
            return Err(eyre::eyre!("EXECUTOR_ADDRESS cannot be the zero address"));
        }
        if self.swap_log && self.swap_log_path.trim().is_empty() {
            return Err(eyre::eyre!("SWAP_LOG is on but SWAP_LOG_PATH is empty"));
        }
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              SWAP ROUTER - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RATE SAMPLING                                              ║");
        println!("║ • Probe Units:     {:^40} ║", self.probe_units);
        println!("║ • Max Assets:      {:^40} ║", self.max_assets);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ EXECUTION                                                  ║");
        println!("║ • Absent Venue:    {:^40} ║", self.absent_venue_policy);
        println!("║ • Executor:        {:^40} ║", format!("{:?}", self.executor_address)[..18].to_string() + "...");
        println!("║ • Swap Log:        {:^40} ║",
            if self.swap_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            probe_units: 100,
            max_assets: 64,
            absent_venue_policy: AbsentVenuePolicy::Reject,
            executor_address: DEFAULT_EXECUTOR,
            swap_log: false,
            swap_log_path: "./logs/swaps.log".to_string(),
            scenario_path: "./scenarios/triangle.toml".to_string(),
        }
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.probe_units, 100);
        assert_eq!(config.absent_venue_policy, AbsentVenuePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_probe = RouterConfig {
            probe_units: 0,
            ..RouterConfig::default()
        };
        assert!(zero_probe.validate().is_err());

        let tiny_registry = RouterConfig {
            max_assets: 1,
            ..RouterConfig::default()
        };
        assert!(tiny_registry.validate().is_err());

        let no_executor = RouterConfig {
            executor_address: Address::ZERO,
            ..RouterConfig::default()
        };
        assert!(no_executor.validate().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("truncate".parse::<AbsentVenuePolicy>().unwrap(), AbsentVenuePolicy::Truncate);
        assert_eq!(" Reject ".parse::<AbsentVenuePolicy>().unwrap(), AbsentVenuePolicy::Reject);
        assert!("skip".parse::<AbsentVenuePolicy>().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RouterConfig {
            probe_units: 10,
            absent_venue_policy: AbsentVenuePolicy::Truncate,
            ..RouterConfig::default()
        };

        let path = std::env::temp_dir().join(format!("swap-router-config-{}.toml", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = RouterConfig::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RouterConfig = toml::from_str("probe_units = 5\nabsent_venue_policy = \"truncate\"").unwrap();
        assert_eq!(config.probe_units, 5);
        assert_eq!(config.absent_venue_policy, AbsentVenuePolicy::Truncate);
        assert_eq!(config.max_assets, 64);
    }
}
