//! Shared test world: three 18-decimal assets and two fixed-rate venues.
//!
//! A -> B at 2:1 on X, B -> C at 3:1 on Y. There is no direct A/C venue, so
//! 10 A routes to 60 C through B.

use alloy_primitives::{Address, U256};
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::ledger::{AssetLedger, InMemoryLedger};
use crate::registry::{whole_units, Registry};
use crate::venues::FixedRateVenue;

pub const A: Address = Address::repeat_byte(0xA0);
pub const B: Address = Address::repeat_byte(0xB0);
pub const C: Address = Address::repeat_byte(0xC0);
pub const D: Address = Address::repeat_byte(0xD0);
pub const X: Address = Address::repeat_byte(0x10);
pub const Y: Address = Address::repeat_byte(0x11);
pub const ALICE: Address = Address::repeat_byte(0x01);
pub const BOB: Address = Address::repeat_byte(0x02);

pub const RESERVE_UNITS: u64 = 1_000_000;
pub const ALICE_UNITS: u64 = 1_000;

pub fn units(n: u64) -> U256 {
    whole_units(n, 18).unwrap()
}

pub fn venue_x() -> FixedRateVenue {
    FixedRateVenue::new("X", X).with_pair(A, B, 2, 1)
}

pub fn venue_y() -> FixedRateVenue {
    FixedRateVenue::new("Y", Y).with_pair(B, C, 3, 1)
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.add_asset("A", A);
    registry.add_asset("B", B);
    registry.add_asset("C", C);
    registry.add_venue(Arc::new(venue_x()));
    registry.add_venue(Arc::new(venue_y()));
    registry
}

/// Venues funded with every asset, Alice holding A and having approved the
/// default executor for all of it.
pub fn ledger() -> InMemoryLedger {
    let executor = RouterConfig::default().executor_address;
    let mut ledger = InMemoryLedger::new();

    for asset in [A, B, C] {
        ledger.register_asset(asset, 18);
        for venue in [X, Y] {
            ledger.mint(asset, venue, units(RESERVE_UNITS)).unwrap();
        }
    }

    ledger.mint(A, ALICE, units(ALICE_UNITS)).unwrap();
    ledger.approve(A, ALICE, executor, U256::MAX).unwrap();
    ledger
}
