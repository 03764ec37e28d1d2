//! Phase 3: The Executor
//!
//! Carries a resolved path out against the asset ledger:
//! - pull the input from the caller into the executor account
//! - per hop: approve the venue, swap, and measure what actually arrived
//! - pay the recipient
//! - check what the recipient received against the caller's minimum
//!
//! Every step runs on a working copy of the ledger that is committed only when
//! the whole execution succeeds. A failure anywhere leaves the caller's ledger
//! exactly as it was.

mod events;

pub use events::SwapCompleted;

use alloy_primitives::{Address, U256};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::brain::Path;
use crate::config::{AbsentVenuePolicy, RouterConfig};
use crate::errors::{RouterError, RouterResult};
use crate::ledger::AssetLedger;
use crate::registry::Registry;
use crate::venues::Venue;

/// Outcome of a committed execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Amount of `asset_out` the recipient actually received
    pub amount_out: U256,
    /// Asset actually paid out (an intermediate asset if truncated)
    pub asset_out: Address,
    pub hops_executed: usize,
    /// Execution stopped early at an absent venue
    pub truncated: bool,
    pub event: SwapCompleted,
}

pub struct PathExecutor<'a> {
    registry: &'a Registry,
    executor: Address,
    policy: AbsentVenuePolicy,
}

impl<'a> PathExecutor<'a> {
    pub fn new(registry: &'a Registry, config: &RouterConfig) -> Self {
        Self {
            registry,
            executor: config.executor_address,
            policy: config.absent_venue_policy,
        }
    }

    /// Account that holds funds between hops
    pub fn executor(&self) -> Address {
        self.executor
    }

    /// Execute `path` for `amount_in`, paying at least `min_amount_out` of
    /// the final asset to `recipient`.
    ///
    /// `caller` must have approved the executor account for `amount_in` of
    /// the first asset. On error `ledger` is untouched.
    pub fn execute<L>(
        &self,
        ledger: &mut L,
        path: &Path,
        amount_in: U256,
        min_amount_out: U256,
        caller: Address,
        recipient: Address,
    ) -> RouterResult<ExecutionReport>
    where
        L: AssetLedger + Clone,
    {
        if amount_in.is_zero() {
            return Err(RouterError::ZeroAmount);
        }

        // Resolve every venue before anything moves
        let venues = self.resolve_venues(path)?;
        let truncated = venues.len() < path.hop_count();

        let mut working = ledger.clone();
        let asset_in = path.asset_in();

        // 1. Pull the input; the delta is what the executor really holds
        let before = working.balance_of(asset_in, self.executor);
        working
            .transfer_from(asset_in, self.executor, caller, self.executor, amount_in)
            .map_err(|source| RouterError::TransferFailed { asset: asset_in, source })?;
        let mut running = working
            .balance_of(asset_in, self.executor)
            .saturating_sub(before);

        debug!("Pulled {} of {} from {}", running, asset_in, caller);

        // 2. Walk the hops
        for (hop, venue) in path.hops().zip(venues.iter()) {
            running = self.execute_hop(&mut working, hop.index, venue.as_ref(), hop.asset_in, hop.asset_out, running)?;
        }

        let asset_out = path.token_path()[venues.len()];

        // 3. Pay out; the recipient's delta is what counts (fee-on-transfer)
        let delivered = if recipient == self.executor {
            running
        } else {
            let before = working.balance_of(asset_out, recipient);
            working
                .transfer(asset_out, self.executor, recipient, running)
                .map_err(|source| RouterError::TransferFailed { asset: asset_out, source })?;
            working.balance_of(asset_out, recipient).saturating_sub(before)
        };

        // 4. Slippage guard
        if delivered < min_amount_out {
            warn!(
                "Slippage exceeded: {} {} delivered, {} required",
                delivered, asset_out, min_amount_out
            );
            return Err(RouterError::SlippageExceeded {
                minimum: min_amount_out,
                actual: delivered,
            });
        }

        *ledger = working;

        let event = SwapCompleted {
            timestamp: Utc::now(),
            asset_in,
            asset_out,
            amount_in,
            amount_out: delivered,
            recipient,
            hops: venues.len(),
        };

        info!(
            "✅ Swap complete: {} {} -> {} {} over {} hop(s){}",
            amount_in,
            self.registry.label(asset_in),
            delivered,
            self.registry.label(asset_out),
            venues.len(),
            if truncated { " (truncated)" } else { "" }
        );

        Ok(ExecutionReport {
            amount_out: delivered,
            asset_out,
            hops_executed: venues.len(),
            truncated,
            event,
        })
    }

    /// Look up the venue of every hop that will run. Under `Truncate` the
    /// list ends at the first absent venue.
    fn resolve_venues(&self, path: &Path) -> RouterResult<Vec<Arc<dyn Venue>>> {
        let mut resolved = Vec::with_capacity(path.hop_count());

        for hop in path.hops() {
            let Some(address) = hop.venue else {
                match self.policy {
                    AbsentVenuePolicy::Reject => {
                        return Err(RouterError::AbsentVenue { hop: hop.index });
                    }
                    AbsentVenuePolicy::Truncate => {
                        warn!("Hop {} has no venue, truncating route", hop.index);
                        break;
                    }
                }
            };

            let venue = self
                .registry
                .venue(address)
                .ok_or(RouterError::UnknownVenue(address))?;
            resolved.push(Arc::clone(venue));
        }

        Ok(resolved)
    }

    fn execute_hop<L: AssetLedger>(
        &self,
        ledger: &mut L,
        index: usize,
        venue: &dyn Venue,
        asset_in: Address,
        asset_out: Address,
        amount: U256,
    ) -> RouterResult<U256> {
        let before = ledger.balance_of(asset_out, self.executor);

        ledger
            .approve(asset_in, self.executor, venue.address(), amount)
            .map_err(|source| RouterError::ApprovalFailed {
                asset: asset_in,
                spender: venue.address(),
                source,
            })?;

        // The final minimum is enforced once at the end, not per hop
        venue
            .swap(ledger, self.executor, asset_in, asset_out, amount, U256::ZERO)
            .map_err(|source| RouterError::VenueFailed {
                venue: venue.address(),
                hop: index,
                source,
            })?;

        let received = ledger.balance_of(asset_out, self.executor).saturating_sub(before);

        debug!(
            "Hop {}: {} {} -> {} {} on {}",
            index,
            amount,
            asset_in,
            received,
            asset_out,
            venue.name()
        );

        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LedgerError, VenueError};
    use crate::fixtures::*;
    use crate::ledger::InMemoryLedger;

    fn run(
        registry: &Registry,
        config: &RouterConfig,
        ledger: &mut InMemoryLedger,
        path: &Path,
        amount_in: U256,
        min_out: U256,
    ) -> RouterResult<ExecutionReport> {
        PathExecutor::new(registry, config).execute(ledger, path, amount_in, min_out, ALICE, BOB)
    }

    fn triangle_path() -> Path {
        Path::new(vec![A, B, C], vec![Some(X), Some(Y)]).unwrap()
    }

    #[test]
    fn test_two_hop_execution() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();

        let report = run(&registry, &config, &mut ledger, &triangle_path(), units(10), units(60)).unwrap();

        assert_eq!(report.amount_out, units(60));
        assert_eq!(report.asset_out, C);
        assert_eq!(report.hops_executed, 2);
        assert!(!report.truncated);
        assert_eq!(report.event.hops, 2);

        assert_eq!(ledger.balance_of(A, ALICE), units(ALICE_UNITS - 10));
        assert_eq!(ledger.balance_of(C, BOB), units(60));

        // Executor keeps nothing
        let executor = config.executor_address;
        for asset in [A, B, C] {
            assert_eq!(ledger.balance_of(asset, executor), U256::ZERO);
        }
    }

    #[test]
    fn test_slippage_rolls_back_everything() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        let before = ledger.clone();

        let err = run(&registry, &config, &mut ledger, &triangle_path(), units(10), units(61)).unwrap_err();

        assert_eq!(
            err,
            RouterError::SlippageExceeded {
                minimum: units(61),
                actual: units(60),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_venue_failure_mid_route_rolls_back() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();

        // Drain Y's C reserve so hop 1 cannot be served
        let reserve = ledger.balance_of(C, Y);
        ledger.transfer(C, Y, Address::repeat_byte(0xEE), reserve).unwrap();
        let before = ledger.clone();

        let err = run(&registry, &config, &mut ledger, &triangle_path(), units(10), U256::ZERO).unwrap_err();

        assert!(matches!(
            err,
            RouterError::VenueFailed {
                venue: Y,
                hop: 1,
                source: VenueError::UnsupportedPair { .. }
            }
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_missing_approval_fails_the_pull() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        ledger.approve(A, ALICE, config.executor_address, U256::ZERO).unwrap();
        let before = ledger.clone();

        let err = run(&registry, &config, &mut ledger, &triangle_path(), units(10), U256::ZERO).unwrap_err();

        assert!(matches!(
            err,
            RouterError::TransferFailed {
                asset: A,
                source: LedgerError::InsufficientAllowance { .. }
            }
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_fee_on_transfer_uses_received_amount() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        ledger.set_transfer_fee_bps(B, 100).unwrap(); // 1%

        let report = run(&registry, &config, &mut ledger, &triangle_path(), units(10), U256::ZERO).unwrap();

        // X pays 20 B, executor receives 19.8 B, Y turns that into 59.4 C
        let expected = units(594) / U256::from(10u64);
        assert_eq!(report.amount_out, expected);
        assert_eq!(ledger.balance_of(C, BOB), expected);
    }

    #[test]
    fn test_fee_on_output_is_checked_at_the_recipient() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        ledger.set_transfer_fee_bps(C, 100).unwrap(); // 1%
        let before = ledger.clone();

        // Y pays 60 C, executor keeps 59.4, recipient gets 58.806
        let received = units(58_806) / U256::from(1_000u64);
        let err = run(&registry, &config, &mut ledger, &triangle_path(), units(10), units(594) / U256::from(10u64))
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::SlippageExceeded {
                minimum: units(594) / U256::from(10u64),
                actual: received,
            }
        );
        assert_eq!(ledger, before);

        let report = run(&registry, &config, &mut ledger, &triangle_path(), units(10), received).unwrap();
        assert_eq!(report.amount_out, received);
        assert_eq!(report.event.amount_out, received);
        assert_eq!(ledger.balance_of(C, BOB), received);
    }

    /// Quotes twice what it delivers
    struct ShortVenue;

    impl Venue for ShortVenue {
        fn address(&self) -> Address {
            X
        }

        fn name(&self) -> &str {
            "short"
        }

        fn quote(&self, _: &dyn AssetLedger, _: Address, _: Address, amount_in: U256) -> U256 {
            amount_in * U256::from(2u64)
        }

        fn swap(
            &self,
            ledger: &mut dyn AssetLedger,
            trader: Address,
            asset_in: Address,
            asset_out: Address,
            amount_in: U256,
            _min_amount_out: U256,
        ) -> Result<U256, VenueError> {
            ledger.transfer_from(asset_in, X, trader, X, amount_in)?;
            ledger.transfer(asset_out, X, trader, amount_in)?;
            Ok(amount_in * U256::from(2u64))
        }
    }

    #[test]
    fn test_under_delivering_venue_is_measured_not_trusted() {
        let mut registry = Registry::new();
        registry.add_asset("A", A);
        registry.add_asset("B", B);
        registry.add_venue(Arc::new(ShortVenue));

        let config = RouterConfig::default();
        let mut ledger = ledger();
        let path = Path::new(vec![A, B], vec![Some(X)]).unwrap();

        let report = run(&registry, &config, &mut ledger, &path, units(10), U256::ZERO).unwrap();
        assert_eq!(report.amount_out, units(10));

        let mut ledger = self::ledger();
        let before = ledger.clone();
        let err = run(&registry, &config, &mut ledger, &path, units(10), units(20)).unwrap_err();
        assert!(matches!(err, RouterError::SlippageExceeded { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_absent_venue_rejected_by_default() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        let before = ledger.clone();
        let path = Path::new(vec![A, B, C], vec![Some(X), None]).unwrap();

        let err = run(&registry, &config, &mut ledger, &path, units(10), U256::ZERO).unwrap_err();

        assert_eq!(err, RouterError::AbsentVenue { hop: 1 });
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_absent_venue_truncates_when_configured() {
        let registry = registry();
        let config = RouterConfig {
            absent_venue_policy: AbsentVenuePolicy::Truncate,
            ..RouterConfig::default()
        };
        let mut ledger = ledger();
        let path = Path::new(vec![A, B, C], vec![Some(X), None]).unwrap();

        let report = run(&registry, &config, &mut ledger, &path, units(10), units(20)).unwrap();

        assert!(report.truncated);
        assert_eq!(report.hops_executed, 1);
        assert_eq!(report.asset_out, B);
        assert_eq!(ledger.balance_of(B, BOB), units(20));
        assert_eq!(ledger.balance_of(C, BOB), U256::ZERO);
    }

    #[test]
    fn test_unknown_venue_and_zero_amount() {
        let registry = registry();
        let config = RouterConfig::default();
        let mut ledger = ledger();
        let stranger = Address::repeat_byte(0x99);
        let path = Path::new(vec![A, B], vec![Some(stranger)]).unwrap();

        assert_eq!(
            run(&registry, &config, &mut ledger, &path, units(1), U256::ZERO),
            Err(RouterError::UnknownVenue(stranger))
        );
        assert_eq!(
            run(&registry, &config, &mut ledger, &triangle_path(), U256::ZERO, U256::ZERO),
            Err(RouterError::ZeroAmount)
        );
    }
}
