//! Rate Graph Construction
//!
//! Samples every ordered pair of registered assets through the RateOracle
//! with a probe of `probe_units` whole units of the input asset, and turns
//! each best rate into a log-domain cost. Nothing is cached: every build
//! re-queries every venue, N·(N-1) oracle calls in total.

use alloy_primitives::{Address, U256};
use petgraph::graph::{DiGraph, NodeIndex};
use std::ops::Index;
use tracing::{debug, info};

use super::fixed_point::{rate_of, to_cost, Cost};
use super::oracle::{Quote, RateOracle};
use crate::config::RouterConfig;
use crate::errors::{RouterError, RouterResult};
use crate::ledger::AssetLedger;
use crate::registry::{whole_units, Registry};

/// Dense square matrix indexed by (row, column) asset indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.size && col < self.size, "matrix index out of bounds");
        self.cells[row * self.size + col] = value;
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cells[row * self.size + col]
    }
}

pub type RateMatrix = Matrix<Quote>;
pub type CostMatrix = Matrix<Cost>;

/// Edge data in the rate graph: one finite-cost (i, j) cell
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    pub venue: Address,
    pub rate: U256,
    pub cost: Cost,
}

/// Best rates and costs across all registered assets.
///
/// Node `i` of `graph` is asset `i` of the registry snapshot the graph was
/// built from; only finite-cost cells become edges.
#[derive(Debug, Clone)]
pub struct RateGraph {
    assets: Vec<Address>,
    probes: Vec<U256>,
    rates: RateMatrix,
    costs: CostMatrix,
    pub graph: DiGraph<Address, EdgeData>,
    registry_version: u64,
}

impl RateGraph {
    /// Query every venue for every ordered pair of distinct assets.
    pub fn build(
        registry: &Registry,
        ledger: &dyn AssetLedger,
        config: &RouterConfig,
    ) -> RouterResult<Self> {
        let assets = registry.asset_addresses();

        if assets.len() > config.max_assets {
            return Err(RouterError::RegistryTooLarge {
                assets: assets.len(),
                max: config.max_assets,
            });
        }

        let probes = assets
            .iter()
            .map(|&asset| {
                let decimals = ledger
                    .decimals(asset)
                    .ok_or(RouterError::UnknownAsset(asset))?;
                whole_units(config.probe_units, decimals)
                    .ok_or(RouterError::UnsupportedDecimals { asset, decimals })
            })
            .collect::<RouterResult<Vec<_>>>()?;

        let oracle = RateOracle::new(registry.venues(), ledger);
        let mut rates = RateMatrix::filled(assets.len(), Quote::NONE);

        for (i, &asset_in) in assets.iter().enumerate() {
            for (j, &asset_out) in assets.iter().enumerate() {
                if i == j {
                    continue;
                }
                rates.set(i, j, oracle.best_quote(asset_in, asset_out, probes[i]));
            }
        }

        Ok(Self::from_rates(assets, probes, rates, registry.version()))
    }

    /// Derive costs and edges from an already sampled rate matrix.
    pub fn from_rates(
        assets: Vec<Address>,
        probes: Vec<U256>,
        rates: RateMatrix,
        registry_version: u64,
    ) -> Self {
        let n = assets.len();
        assert_eq!(rates.size(), n, "rate matrix does not match asset count");
        assert_eq!(probes.len(), n, "probe list does not match asset count");

        let mut costs = CostMatrix::filled(n, Cost::INFINITE);
        let mut graph = DiGraph::with_capacity(n, n * n.saturating_sub(1));

        for &asset in &assets {
            graph.add_node(asset);
        }

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let quote = rates[(i, j)];
                let Some(venue) = quote.venue else {
                    continue;
                };

                let rate = rate_of(probes[i], quote.amount_out);
                let cost = to_cost(rate);
                if !cost.is_finite() {
                    continue;
                }

                costs.set(i, j, cost);
                graph.add_edge(
                    NodeIndex::new(i),
                    NodeIndex::new(j),
                    EdgeData { venue, rate, cost },
                );
            }
        }

        info!(
            "Graph built: {} Nodes, {} Edges (registry v{})",
            graph.node_count(),
            graph.edge_count(),
            registry_version
        );

        let negative = graph
            .edge_weights()
            .filter(|e| e.cost.is_negative())
            .count();
        debug!("  {} edges with a better-than-par rate", negative);

        Self {
            assets,
            probes,
            rates,
            costs,
            graph,
            registry_version,
        }
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn assets(&self) -> &[Address] {
        &self.assets
    }

    pub fn asset(&self, index: usize) -> Option<Address> {
        self.assets.get(index).copied()
    }

    pub fn index_of(&self, asset: Address) -> Option<usize> {
        self.assets.iter().position(|&a| a == asset)
    }

    pub fn probe(&self, index: usize) -> Option<U256> {
        self.probes.get(index).copied()
    }

    pub fn rates(&self) -> &RateMatrix {
        &self.rates
    }

    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Best probe quote for (i, j); `Quote::NONE` for the diagonal
    pub fn rate(&self, i: usize, j: usize) -> Quote {
        if i == j {
            return Quote::NONE;
        }
        self.rates.get(i, j).copied().unwrap_or(Quote::NONE)
    }

    /// Cost of (i, j); infinite for the diagonal and for missing edges
    pub fn cost(&self, i: usize, j: usize) -> Cost {
        if i == j {
            return Cost::INFINITE;
        }
        self.costs.get(i, j).copied().unwrap_or(Cost::INFINITE)
    }

    /// Venue on the (i, j) edge, if the edge exists
    pub fn venue(&self, i: usize, j: usize) -> Option<Address> {
        if !self.cost(i, j).is_finite() {
            return None;
        }
        self.rate(i, j).venue
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn registry_version(&self) -> u64 {
        self.registry_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::fixed_point::SCALE;
    use crate::ledger::InMemoryLedger;
    use crate::venues::{FixedRateVenue, Venue};
    use std::sync::Arc;

    const A: Address = Address::repeat_byte(0xA0);
    const B: Address = Address::repeat_byte(0xB0);
    const C: Address = Address::repeat_byte(0xC0);
    const X: Address = Address::repeat_byte(0x10);

    fn world(decimals_b: u8) -> (Registry, InMemoryLedger) {
        let mut registry = Registry::new();
        let mut ledger = InMemoryLedger::new();

        for (symbol, asset, decimals) in [("A", A, 18), ("B", B, decimals_b), ("C", C, 18)] {
            registry.add_asset(symbol, asset);
            ledger.register_asset(asset, decimals);
            ledger.mint(asset, X, whole_units(1_000_000, decimals).unwrap()).unwrap();
        }

        let venue: Arc<dyn Venue> = Arc::new(FixedRateVenue::new("X", X).with_pair(A, B, 2, 1));
        registry.add_venue(venue);
        (registry, ledger)
    }

    #[test]
    fn test_build_samples_every_ordered_pair() {
        let (registry, ledger) = world(18);
        let graph = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap();

        assert_eq!(graph.asset_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.probe(0), whole_units(100, 18));
        assert_eq!(Some(graph.rate(0, 1).amount_out), whole_units(200, 18));
        assert_eq!(graph.rate(0, 1).venue, Some(X));
        assert_eq!(graph.registry_version(), registry.version());
    }

    #[test]
    fn test_missing_pair_is_infinite() {
        let (registry, ledger) = world(18);
        let graph = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap();

        assert_eq!(graph.rate(0, 2), Quote::NONE);
        assert_eq!(graph.cost(0, 2), Cost::INFINITE);
        assert_eq!(graph.venue(0, 2), None);
        assert_eq!(graph.cost(1, 1), Cost::INFINITE);
    }

    #[test]
    fn test_costs_follow_rates() {
        let (registry, ledger) = world(18);
        let graph = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap();

        assert_eq!(graph.cost(0, 1), to_cost(SCALE * U256::from(2u64)));
        assert!(graph.cost(0, 1).is_negative());
        assert!(!graph.cost(1, 0).is_negative());
    }

    #[test]
    fn test_probe_scales_with_decimals() {
        let (registry, ledger) = world(6);
        let graph = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap();

        assert_eq!(graph.probe(1), whole_units(100, 6));
    }

    #[test]
    fn test_unknown_decimals_fail_fast() {
        let (mut registry, ledger) = world(18);
        let d = Address::repeat_byte(0xD0);
        registry.add_asset("D", d);

        let err = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap_err();
        assert_eq!(err, RouterError::UnknownAsset(d));
    }

    #[test]
    fn test_oversized_decimals_fail_fast() {
        let (mut registry, mut ledger) = world(18);
        let d = Address::repeat_byte(0xD0);
        registry.add_asset("D", d);
        ledger.register_asset(d, 78);

        let err = RateGraph::build(&registry, &ledger, &RouterConfig::default()).unwrap_err();
        assert_eq!(err, RouterError::UnsupportedDecimals { asset: d, decimals: 78 });
    }

    #[test]
    fn test_asset_cap() {
        let (registry, ledger) = world(18);
        let config = RouterConfig {
            max_assets: 2,
            ..RouterConfig::default()
        };

        let err = RateGraph::build(&registry, &ledger, &config).unwrap_err();
        assert_eq!(err, RouterError::RegistryTooLarge { assets: 3, max: 2 });
    }
}
