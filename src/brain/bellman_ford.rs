//! Bellman-Ford Path Solver
//!
//! Step 2.1: The Pathfinder
//!
//! Costs are `-log2(rate)`, so better-than-par rates give negative edges and
//! Dijkstra is unsound here. Label-correcting relaxation handles them:
//! - up to N passes over every finite edge (N = asset count)
//! - stop early on the first pass without an update
//! - an update on the Nth pass means a negative cycle (quoted arbitrage);
//!   reported, never exploited, and the route is then rebuilt from
//!   hop-bounded layers so the looping parents are never walked
//!
//! A solve is O(N · E) ⊆ O(N³); the asset cap in `RouterConfig` bounds it.

use alloy_primitives::Address;
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use super::path::Path;
use crate::cartographer::{Cost, RateGraph};
use crate::errors::{RouterError, RouterResult};

/// Working state of one solve: best cost from the source and the predecessor
/// on that best path, per asset index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relaxation {
    pub source: usize,
    pub distances: Vec<Cost>,
    pub parents: Vec<Option<usize>>,
    pub improved_on_last_pass: bool,
    pub passes: usize,
}

impl Relaxation {
    pub fn distance(&self, index: usize) -> Cost {
        self.distances.get(index).copied().unwrap_or(Cost::INFINITE)
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        self.distance(index).is_finite()
    }

    /// Quoted arbitrage: some cycle multiplies to more than 1
    pub fn has_negative_cycle(&self) -> bool {
        self.improved_on_last_pass
    }
}

pub struct PathSolver<'a> {
    graph: &'a RateGraph,
}

impl<'a> PathSolver<'a> {
    pub fn new(graph: &'a RateGraph) -> Self {
        Self { graph }
    }

    /// Relax from `source` until convergence or N passes.
    ///
    /// # Panics
    ///
    /// Panics if `source` is not an asset index of the graph.
    pub fn solve(&self, source: usize) -> Relaxation {
        let n = self.graph.asset_count();
        assert!(source < n, "source index {} out of range for {} assets", source, n);

        let mut distances = vec![Cost::INFINITE; n];
        let mut parents = vec![None; n];
        distances[source] = Cost::ZERO;

        let mut improved = false;
        let mut passes = 0;

        for _ in 0..n {
            passes += 1;
            improved = self.relax_pass(&mut distances, &mut parents);
            debug!("Pass {}: {}", passes, if improved { "updated" } else { "converged" });
            if !improved {
                break;
            }
        }

        let improved_on_last_pass = improved && passes == n;
        if improved_on_last_pass {
            warn!(
                "Negative cycle reachable from {:?}: quoted rates admit arbitrage",
                self.graph.asset(source)
            );
        }

        Relaxation {
            source,
            distances,
            parents,
            improved_on_last_pass,
            passes,
        }
    }

    /// One pass over every edge. Returns true if any distance improved.
    pub fn relax_pass(&self, distances: &mut [Cost], parents: &mut [Option<usize>]) -> bool {
        let mut updated = false;

        for edge in self.graph.graph.edge_references() {
            let i = edge.source().index();
            let j = edge.target().index();

            if !distances[i].is_finite() {
                continue;
            }

            let candidate = distances[i].saturating_add(edge.weight().cost);
            if candidate < distances[j] {
                distances[j] = candidate;
                parents[j] = Some(i);
                updated = true;
            }
        }

        updated
    }

    /// Walk parent pointers from `dest` back to the source.
    pub fn reconstruct(&self, relaxation: &Relaxation, dest: usize) -> RouterResult<Path> {
        let n = self.graph.asset_count();
        let source = relaxation.source;
        let from = self.asset(source);
        let to = self.asset(dest);

        if dest == source {
            return Err(RouterError::SameAsset(to));
        }

        let no_path = || RouterError::NoPathExists { from, to };

        if dest >= n || !relaxation.is_reachable(dest) {
            return Err(no_path());
        }

        // Parents may loop through the cycle; rebuild from hop-bounded layers
        if relaxation.has_negative_cycle() {
            return self.reconstruct_bounded(source, dest).ok_or_else(no_path);
        }

        let mut tokens = vec![to];
        let mut venues = Vec::new();
        let mut current = dest;

        while current != source {
            // A longer walk means the parent vector loops
            if venues.len() >= n {
                debug!("Parent walk from {} exceeded {} steps", dest, n);
                return Err(no_path());
            }

            let prev = relaxation.parents.get(current).copied().flatten().ok_or_else(no_path)?;
            let venue = self.graph.venue(prev, current).ok_or_else(no_path)?;

            venues.push(Some(venue));
            tokens.push(self.asset(prev));
            current = prev;
        }

        tokens.reverse();
        venues.reverse();

        Path::new(tokens, venues)
    }

    /// Solve from `source` and reconstruct the path to `dest`.
    pub fn best_path(&self, source: usize, dest: usize) -> RouterResult<(Path, Relaxation)> {
        let relaxation = self.solve(source);
        let path = self.reconstruct(&relaxation, dest)?;
        Ok((path, relaxation))
    }

    /// Sum of edge costs along `path`; infinite if a hop has no edge.
    pub fn path_cost(&self, path: &Path) -> Cost {
        path.hops().fold(Cost::ZERO, |total, hop| {
            match (self.graph.index_of(hop.asset_in), self.graph.index_of(hop.asset_out)) {
                (Some(i), Some(j)) => total.saturating_add(self.graph.cost(i, j)),
                _ => Cost::INFINITE,
            }
        })
    }

    /// Cheapest loop-free path to `dest` over layers of at most k edges,
    /// k < N. Layer k only reads layer k-1, so a cycle can lengthen a walk
    /// by at most one edge per layer and every walk stays finite.
    fn reconstruct_bounded(&self, source: usize, dest: usize) -> Option<Path> {
        let n = self.graph.asset_count();

        let mut layer = vec![Cost::INFINITE; n];
        layer[source] = Cost::ZERO;
        let mut steps: Vec<Vec<Step>> = Vec::with_capacity(n);
        let mut best: Option<(Cost, Vec<usize>)> = None;

        for k in 1..n {
            let mut next = layer.clone();
            let mut step = vec![Step::Kept; n];

            for edge in self.graph.graph.edge_references() {
                let i = edge.source().index();
                let j = edge.target().index();

                if !layer[i].is_finite() {
                    continue;
                }

                let candidate = layer[i].saturating_add(edge.weight().cost);
                if candidate < next[j] {
                    next[j] = candidate;
                    step[j] = Step::From(i);
                }
            }

            steps.push(step);
            layer = next;

            let Some(nodes) = walk_layers(&steps, source, dest) else {
                continue;
            };
            if !is_simple(&nodes, n) {
                debug!("Layer {} walk to {} repeats an asset, skipped", k, dest);
                continue;
            }

            // Strict: equal cost keeps the path with fewer hops
            let cost = layer[dest];
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, nodes));
            }
        }

        let (_, nodes) = best?;
        let tokens = nodes.iter().map(|&i| self.asset(i)).collect();
        let venues = nodes
            .windows(2)
            .map(|w| self.graph.venue(w[0], w[1]).map(Some))
            .collect::<Option<Vec<_>>>()?;

        Path::new(tokens, venues).ok()
    }

    fn asset(&self, index: usize) -> Address {
        self.graph.asset(index).unwrap_or(Address::ZERO)
    }
}

/// How a layer reached an asset: unchanged from the previous layer, or over
/// the edge from the given asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Kept,
    From(usize),
}

/// Asset indices from `source` to `dest` following the layer steps back
/// from the last layer, or `None` if `dest` is not reached.
fn walk_layers(steps: &[Vec<Step>], source: usize, dest: usize) -> Option<Vec<usize>> {
    let mut nodes = vec![dest];
    let mut current = dest;

    for step in steps.iter().rev() {
        if let Step::From(prev) = step[current] {
            current = prev;
            nodes.push(prev);
        }
    }

    if current != source {
        return None;
    }

    nodes.reverse();
    Some(nodes)
}

fn is_simple(nodes: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    nodes.iter().all(|&i| !std::mem::replace(&mut seen[i], true))
}
