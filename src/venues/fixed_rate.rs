//! Fixed-rate venue
//!
//! Serves a configured set of directed pairs at `numerator / denominator`
//! (raw units out per raw unit in). Liquidity is whatever the venue's own
//! account holds of the output asset; a quote it cannot cover is zero.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::debug;

use super::Venue;
use crate::errors::VenueError;
use crate::ledger::AssetLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rate {
    numerator: U256,
    denominator: U256,
}

#[derive(Debug, Clone)]
pub struct FixedRateVenue {
    name: String,
    address: Address,
    pairs: HashMap<(Address, Address), Rate>,
}

impl FixedRateVenue {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            pairs: HashMap::new(),
        }
    }

    /// Serve `asset_in -> asset_out` at `numerator / denominator`.
    /// A zero denominator leaves the pair unserved.
    pub fn with_rate(mut self, asset_in: Address, asset_out: Address, numerator: u64, denominator: u64) -> Self {
        if denominator != 0 && asset_in != asset_out {
            self.pairs.insert(
                (asset_in, asset_out),
                Rate {
                    numerator: U256::from(numerator),
                    denominator: U256::from(denominator),
                },
            );
        }
        self
    }

    /// Serve both directions: `a -> b` at `numerator / denominator` and the
    /// inverse for `b -> a`.
    pub fn with_pair(self, a: Address, b: Address, numerator: u64, denominator: u64) -> Self {
        self.with_rate(a, b, numerator, denominator)
            .with_rate(b, a, denominator, numerator)
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    fn raw_quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> Option<U256> {
        let rate = self.pairs.get(&(asset_in, asset_out))?;
        let scaled = amount_in.checked_mul(rate.numerator)?;
        Some(scaled / rate.denominator)
    }
}

impl Venue for FixedRateVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn quote(
        &self,
        ledger: &dyn AssetLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> U256 {
        let Some(amount_out) = self.raw_quote(asset_in, asset_out, amount_in) else {
            return U256::ZERO;
        };

        if ledger.balance_of(asset_out, self.address) < amount_out {
            return U256::ZERO;
        }

        amount_out
    }

    fn swap(
        &self,
        ledger: &mut dyn AssetLedger,
        trader: Address,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> Result<U256, VenueError> {
        let amount_out = self.quote(&*ledger, asset_in, asset_out, amount_in);

        if amount_out.is_zero() {
            return Err(VenueError::UnsupportedPair { asset_in, asset_out });
        }
        if amount_out < min_amount_out {
            return Err(VenueError::BelowMinimum {
                quoted: amount_out,
                minimum: min_amount_out,
            });
        }

        ledger.transfer_from(asset_in, self.address, trader, self.address, amount_in)?;
        ledger.transfer(asset_out, self.address, trader, amount_out)?;

        debug!(
            "{}: swapped {} {} -> {} {}",
            self.name, amount_in, asset_in, amount_out, asset_out
        );

        Ok(amount_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    const A: Address = Address::repeat_byte(0xA0);
    const B: Address = Address::repeat_byte(0xB0);
    const VENUE: Address = Address::repeat_byte(0x10);
    const TRADER: Address = Address::repeat_byte(0x01);

    fn setup() -> (InMemoryLedger, FixedRateVenue) {
        let mut ledger = InMemoryLedger::new();
        ledger.register_asset(A, 18);
        ledger.register_asset(B, 18);
        ledger.mint(A, VENUE, U256::from(1_000u64)).unwrap();
        ledger.mint(B, VENUE, U256::from(1_000u64)).unwrap();
        ledger.mint(A, TRADER, U256::from(100u64)).unwrap();

        let venue = FixedRateVenue::new("X", VENUE).with_pair(A, B, 2, 1);
        (ledger, venue)
    }

    #[test]
    fn test_quote_both_directions() {
        let (ledger, venue) = setup();
        assert_eq!(venue.pair_count(), 2);
        assert_eq!(venue.quote(&ledger, A, B, U256::from(10u64)), U256::from(20u64));
        assert_eq!(venue.quote(&ledger, B, A, U256::from(10u64)), U256::from(5u64));
    }

    #[test]
    fn test_quote_zero_for_unsupported_or_illiquid() {
        let (ledger, venue) = setup();
        let c = Address::repeat_byte(0xC0);
        assert_eq!(venue.quote(&ledger, A, c, U256::from(10u64)), U256::ZERO);
        // 600 A would need 1200 B, the venue holds 1000
        assert_eq!(venue.quote(&ledger, A, B, U256::from(600u64)), U256::ZERO);
    }

    #[test]
    fn test_swap_moves_funds() {
        let (mut ledger, venue) = setup();
        ledger.approve(A, TRADER, VENUE, U256::from(10u64)).unwrap();

        let out = venue
            .swap(&mut ledger, TRADER, A, B, U256::from(10u64), U256::from(20u64))
            .unwrap();

        assert_eq!(out, U256::from(20u64));
        assert_eq!(ledger.balance_of(A, TRADER), U256::from(90u64));
        assert_eq!(ledger.balance_of(B, TRADER), U256::from(20u64));
        assert_eq!(ledger.balance_of(B, VENUE), U256::from(980u64));
    }

    #[test]
    fn test_swap_enforces_minimum() {
        let (mut ledger, venue) = setup();
        ledger.approve(A, TRADER, VENUE, U256::from(10u64)).unwrap();

        let err = venue
            .swap(&mut ledger, TRADER, A, B, U256::from(10u64), U256::from(21u64))
            .unwrap_err();

        assert!(matches!(err, VenueError::BelowMinimum { .. }));
        assert_eq!(ledger.balance_of(A, TRADER), U256::from(100u64));
    }
}
