//! Rate Oracle
//!
//! Asks every registered venue for a quote and keeps the best one.
//! Venues that cannot serve a pair answer zero and simply drop out.

use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::trace;

use crate::ledger::AssetLedger;
use crate::venues::Venue;

/// Best output found for a pair, and the venue that offered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub amount_out: U256,
    pub venue: Option<Address>,
}

impl Quote {
    pub const NONE: Quote = Quote {
        amount_out: U256::ZERO,
        venue: None,
    };

    pub fn is_viable(&self) -> bool {
        !self.amount_out.is_zero() && self.venue.is_some()
    }
}

impl Default for Quote {
    fn default() -> Self {
        Self::NONE
    }
}

pub struct RateOracle<'a> {
    venues: &'a [Arc<dyn Venue>],
    ledger: &'a dyn AssetLedger,
}

impl<'a> RateOracle<'a> {
    pub fn new(venues: &'a [Arc<dyn Venue>], ledger: &'a dyn AssetLedger) -> Self {
        Self { venues, ledger }
    }

    /// Strictly greatest quote wins; ties keep the venue registered first.
    pub fn best_quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> Quote {
        let mut best = Quote::NONE;

        for venue in self.venues {
            let amount_out = venue.quote(self.ledger, asset_in, asset_out, amount_in);

            trace!(
                "{} quotes {} {} -> {} {}",
                venue.name(),
                amount_in,
                asset_in,
                amount_out,
                asset_out
            );

            if amount_out > best.amount_out {
                best = Quote {
                    amount_out,
                    venue: Some(venue.address()),
                };
            }
        }

        best
    }
}
