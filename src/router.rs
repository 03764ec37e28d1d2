//! Router
//!
//! Composition root over the registry: quotes, route search and execution.
//! Each entry point rebuilds the rate graph from live venue quotes; callers
//! that want one snapshot for quoting and executing use `build_graph`,
//! `quote_on_graph` and `execute_route` directly.

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::brain::{Path, PathSolver};
use crate::cartographer::{Cost, Quote, RateGraph, RateOracle};
use crate::config::RouterConfig;
use crate::errors::{RouterError, RouterResult};
use crate::executor::{ExecutionReport, PathExecutor};
use crate::ledger::AssetLedger;
use crate::registry::Registry;

/// A solved route with its expected output at the requested amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: Path,
    pub amount_in: U256,
    /// Live quotes replayed hop by hop for `amount_in`
    pub amount_out: U256,
    /// Sum of the path's edge costs at probe size
    pub cost: Cost,
    /// The solve saw quoted arbitrage; the route is still the best found
    pub has_negative_cycle: bool,
    pub registry_version: u64,
}

impl Route {
    pub fn token_path(&self) -> &[Address] {
        self.path.token_path()
    }

    pub fn exchange_path(&self) -> Vec<Address> {
        self.path.exchange_path()
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    registry: Registry,
}

impl Router {
    pub fn new(config: RouterConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutating the registry invalidates routes built before the change.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn build_graph(&self, ledger: &dyn AssetLedger) -> RouterResult<RateGraph> {
        RateGraph::build(&self.registry, ledger, &self.config)
    }

    /// Best single-venue output for `amount_in` and the venue offering it.
    /// `amount_out` is zero and `venue` is `None` when nobody prices the pair.
    pub fn get_best_exchange(
        &self,
        ledger: &dyn AssetLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> RouterResult<Quote> {
        self.check_pair(asset_in, asset_out, amount_in)?;

        let quote = RateOracle::new(self.registry.venues(), ledger).best_quote(asset_in, asset_out, amount_in);

        debug!(
            "Best exchange {} -> {}: {} via {:?}",
            self.registry.label(asset_in),
            self.registry.label(asset_out),
            quote.amount_out,
            quote.venue.map(|v| self.registry.label(v))
        );

        Ok(quote)
    }

    /// Build a fresh graph and find the best route for `amount_in`.
    pub fn get_expected_out(
        &self,
        ledger: &dyn AssetLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> RouterResult<Route> {
        self.check_pair(asset_in, asset_out, amount_in)?;
        let graph = self.build_graph(ledger)?;
        self.quote_on_graph(ledger, &graph, asset_in, asset_out, amount_in)
    }

    /// Find the best route on an existing graph.
    pub fn quote_on_graph(
        &self,
        ledger: &dyn AssetLedger,
        graph: &RateGraph,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> RouterResult<Route> {
        self.check_pair(asset_in, asset_out, amount_in)?;

        let source = graph.index_of(asset_in).ok_or(RouterError::UnknownAsset(asset_in))?;
        let dest = graph.index_of(asset_out).ok_or(RouterError::UnknownAsset(asset_out))?;

        let solver = PathSolver::new(graph);
        let (path, relaxation) = solver.best_path(source, dest)?;
        let amount_out = self.replay_quotes(ledger, &path, amount_in);
        let cost = solver.path_cost(&path);

        info!(
            "Route {} | {} in -> {} out",
            path.describe(&self.registry),
            amount_in,
            amount_out
        );

        Ok(Route {
            path,
            amount_in,
            amount_out,
            cost,
            has_negative_cycle: relaxation.has_negative_cycle(),
            registry_version: graph.registry_version(),
        })
    }

    /// Route and execute in one call.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_on_chain<L>(
        &self,
        ledger: &mut L,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        caller: Address,
        recipient: Address,
    ) -> RouterResult<ExecutionReport>
    where
        L: AssetLedger + Clone,
    {
        let route = self.get_expected_out(&*ledger, asset_in, asset_out, amount_in)?;
        self.execute_route(ledger, &route, min_amount_out, caller, recipient)
    }

    /// Execute a caller-pinned route. `Address::ZERO` in `exchange_path`
    /// marks a hop without a venue.
    #[allow(clippy::too_many_arguments)]
    pub fn swap<L>(
        &self,
        ledger: &mut L,
        token_path: &[Address],
        exchange_path: &[Address],
        amount_in: U256,
        min_amount_out: U256,
        caller: Address,
        recipient: Address,
    ) -> RouterResult<ExecutionReport>
    where
        L: AssetLedger + Clone,
    {
        let path = Path::from_exchange_path(token_path, exchange_path)?;

        if let Some(&unknown) = path.token_path().iter().find(|&&a| !self.registry.contains_asset(a)) {
            return Err(RouterError::UnknownAsset(unknown));
        }

        self.execute_path(ledger, &path, amount_in, min_amount_out, caller, recipient)
    }

    /// Execute a route from `get_expected_out` or `quote_on_graph`. Fails with
    /// `StaleRoute` if the registry changed since its graph was built.
    pub fn execute_route<L>(
        &self,
        ledger: &mut L,
        route: &Route,
        min_amount_out: U256,
        caller: Address,
        recipient: Address,
    ) -> RouterResult<ExecutionReport>
    where
        L: AssetLedger + Clone,
    {
        if route.registry_version != self.registry.version() {
            return Err(RouterError::StaleRoute {
                route_version: route.registry_version,
                registry_version: self.registry.version(),
            });
        }

        self.execute_path(ledger, &route.path, route.amount_in, min_amount_out, caller, recipient)
    }

    fn execute_path<L>(
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
        let report = PathExecutor::new(&self.registry, &self.config).execute(
            ledger,
            path,
            amount_in,
            min_amount_out,
            caller,
            recipient,
        )?;

        if self.config.swap_log {
            // The swap is committed; a log failure must not turn it into an error
            if let Err(e) = report.event.append_to_file(&self.config.swap_log_path) {
                warn!("Failed to append swap log {}: {}", self.config.swap_log_path, e);
            }
        }

        Ok(report)
    }

    fn check_pair(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> RouterResult<()> {
        for asset in [asset_in, asset_out] {
            if !self.registry.contains_asset(asset) {
                return Err(RouterError::UnknownAsset(asset));
            }
        }
        if asset_in == asset_out {
            return Err(RouterError::SameAsset(asset_in));
        }
        if amount_in.is_zero() {
            return Err(RouterError::ZeroAmount);
        }
        Ok(())
    }

    /// Expected output of `path` for `amount_in`, using live quotes
    fn replay_quotes(&self, ledger: &dyn AssetLedger, path: &Path, amount_in: U256) -> U256 {
        let mut amount = amount_in;

        for hop in path.hops() {
            let Some(venue) = hop.venue.and_then(|v| self.registry.venue(v)) else {
                return U256::ZERO;
            };
            amount = venue.quote(ledger, hop.asset_in, hop.asset_out, amount);
            if amount.is_zero() {
                break;
            }
        }

        amount
    }
}
