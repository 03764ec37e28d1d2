//! Scenario files
//!
//! A scenario describes an in-memory world in TOML: assets (with decimals and
//! an optional transfer fee), fixed-rate venues with their pairs and
//! reserves, and starting balances. The CLI routes against it.

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::ledger::InMemoryLedger;
use crate::registry::{whole_units, Registry};
use crate::venues::FixedRateVenue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
    #[serde(default)]
    pub transfer_fee_bps: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSpec {
    /// Input asset symbol
    pub from: String,
    /// Output asset symbol
    pub to: String,
    pub numerator: u64,
    pub denominator: u64,
    /// Also serve `to -> from` at the inverse rate
    #[serde(default)]
    pub both_ways: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSpec {
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub pairs: Vec<PairSpec>,
    /// Whole units of every asset minted to the venue
    #[serde(default)]
    pub reserve_units: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSpec {
    pub owner: Address,
    /// Asset symbol
    pub asset: String,
    pub units: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Account the CLI trades from
    #[serde(default)]
    pub trader: Address,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    #[serde(default)]
    pub venues: Vec<VenueSpec>,
    #[serde(default)]
    pub balances: Vec<BalanceSpec>,
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Cannot read scenario {}: {}", path.display(), e))?;
        let scenario: Self = toml::from_str(&content)?;
        Ok(scenario)
    }

    /// Materialise the registry and a funded ledger.
    pub fn build(&self) -> Result<(Registry, InMemoryLedger)> {
        let mut registry = Registry::new();
        let mut ledger = InMemoryLedger::new();

        for asset in &self.assets {
            if !registry.add_asset(asset.symbol.clone(), asset.address) {
                return Err(eyre!("Duplicate asset {} ({})", asset.symbol, asset.address));
            }
            ledger.register_asset(asset.address, asset.decimals);
            if asset.transfer_fee_bps > 0 {
                ledger.set_transfer_fee_bps(asset.address, asset.transfer_fee_bps)?;
            }
        }

        for spec in &self.venues {
            let mut venue = FixedRateVenue::new(spec.name.clone(), spec.address);

            for pair in &spec.pairs {
                let from = self.resolve(&pair.from)?;
                let to = self.resolve(&pair.to)?;
                venue = if pair.both_ways {
                    venue.with_pair(from.address, to.address, pair.numerator, pair.denominator)
                } else {
                    venue.with_rate(from.address, to.address, pair.numerator, pair.denominator)
                };
            }

            if spec.reserve_units > 0 {
                for asset in &self.assets {
                    let reserve = whole_units(spec.reserve_units, asset.decimals)
                        .ok_or_else(|| eyre!("Reserve of {} overflows at {} decimals", asset.symbol, asset.decimals))?;
                    ledger.mint(asset.address, spec.address, reserve)?;
                }
            }

            if !registry.add_venue(Arc::new(venue)) {
                return Err(eyre!("Duplicate venue {} ({})", spec.name, spec.address));
            }
        }

        for balance in &self.balances {
            let asset = self.resolve(&balance.asset)?;
            let amount = whole_units(balance.units, asset.decimals)
                .ok_or_else(|| eyre!("Balance of {} overflows at {} decimals", asset.symbol, asset.decimals))?;
            ledger.mint(asset.address, balance.owner, amount)?;
        }

        info!(
            "Scenario loaded: {} assets, {} venues, {} balances",
            registry.asset_count(),
            registry.venues().len(),
            self.balances.len()
        );

        Ok((registry, ledger))
    }

    pub fn asset(&self, symbol: &str) -> Option<&AssetSpec> {
        self.assets
            .iter()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
    }

    fn resolve(&self, symbol: &str) -> Result<&AssetSpec> {
        self.asset(symbol)
            .ok_or_else(|| eyre!("Scenario references unknown asset '{}'", symbol))
    }
}
