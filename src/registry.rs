//! Asset and venue registry
//!
//! Assets are kept in insertion order without duplicates; an asset's position
//! is its vertex index in the rate graph. Every mutation bumps `version`, so a
//! graph (or a route solved on it) can tell when the registry moved under it.

use alloy_primitives::{Address, U256};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::venues::Venue;

/// Represents an asset we can route through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub symbol: String,
    pub address: Address,
}

#[derive(Clone, Default)]
pub struct Registry {
    assets: Vec<Asset>,
    venues: Vec<Arc<dyn Venue>>,
    version: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset. Returns false if the address is already registered.
    pub fn add_asset(&mut self, symbol: impl Into<String>, address: Address) -> bool {
        if self.index_of(address).is_some() {
            return false;
        }

        let symbol = symbol.into();
        debug!("Registered asset {} at index {}", symbol, self.assets.len());
        self.assets.push(Asset { symbol, address });
        self.version += 1;
        true
    }

    /// Append a venue. Returns false if a venue with that address exists.
    pub fn add_venue(&mut self, venue: Arc<dyn Venue>) -> bool {
        if self.venue(venue.address()).is_some() {
            return false;
        }

        debug!("Registered venue {} ({})", venue.name(), venue.address());
        self.venues.push(venue);
        self.version += 1;
        true
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn asset_addresses(&self) -> Vec<Address> {
        self.assets.iter().map(|a| a.address).collect()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn index_of(&self, address: Address) -> Option<usize> {
        self.assets.iter().position(|a| a.address == address)
    }

    pub fn contains_asset(&self, address: Address) -> bool {
        self.index_of(address).is_some()
    }

    pub fn asset_by_symbol(&self, symbol: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn venues(&self) -> &[Arc<dyn Venue>] {
        &self.venues
    }

    pub fn venue(&self, address: Address) -> Option<&Arc<dyn Venue>> {
        self.venues.iter().find(|v| v.address() == address)
    }

    /// Asset symbol or venue name, falling back to a short address
    pub fn label(&self, address: Address) -> String {
        if let Some(asset) = self.assets.iter().find(|a| a.address == address) {
            return asset.symbol.clone();
        }
        if let Some(venue) = self.venue(address) {
            return venue.name().to_string();
        }
        short_address(&address)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("assets", &self.assets)
            .field(
                "venues",
                &self.venues.iter().map(|v| v.address()).collect::<Vec<_>>(),
            )
            .field("version", &self.version)
            .finish()
    }
}

pub fn short_address(address: &Address) -> String {
    format!("0x{}...", &format!("{:?}", address)[2..8])
}

/// `units` whole tokens in raw units for an asset with `decimals`.
/// `None` if the amount does not fit in 256 bits.
pub fn whole_units(units: u64, decimals: u8) -> Option<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))?
        .checked_mul(U256::from(units))
}

/// Render a raw amount as a decimal string with `decimals` places
pub fn format_units(amount: U256, decimals: u8) -> String {
    let Some(unit) = U256::from(10u64).checked_pow(U256::from(decimals)) else {
        return amount.to_string();
    };
    let whole = amount / unit;
    let frac = amount % unit;

    if frac.is_zero() || decimals == 0 {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
