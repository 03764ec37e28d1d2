//! Venue capability
//!
//! A venue prices and executes swaps between two assets. Pricing curves live
//! entirely behind this trait; the router only sees quotes and balance deltas.

mod fixed_rate;

pub use fixed_rate::FixedRateVenue;

use alloy_primitives::{Address, U256};

use crate::errors::VenueError;
use crate::ledger::AssetLedger;

pub trait Venue: Send + Sync {
    /// Identity of the venue; also the account that holds its reserves.
    fn address(&self) -> Address;

    /// Human-readable label for logs.
    fn name(&self) -> &str;

    /// Output for `amount_in`, or zero when the pair cannot be served.
    /// Must never fail.
    fn quote(
        &self,
        ledger: &dyn AssetLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> U256;

    /// Pull `amount_in` of `asset_in` from `trader` (which must have approved
    /// the venue) and pay the output to `trader`. Fails if the venue cannot
    /// deliver its own quote or `min_amount_out`.
    fn swap(
        &self,
        ledger: &mut dyn AssetLedger,
        trader: Address,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> Result<U256, VenueError>;
}
