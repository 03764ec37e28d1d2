//! Multi-venue swap router
//!
//! Finds the best conversion route between two assets across every
//! registered venue and executes it atomically with a slippage guard.
//!
//! - `cartographer`: best-quote oracle and the log-domain rate graph
//! - `brain`: Bellman-Ford path search and path reconstruction
//! - `executor`: balance-delta execution with all-or-nothing commit
//! - `router`: the public entry points

pub mod brain;
pub mod cartographer;
pub mod config;
pub mod errors;
pub mod executor;
pub mod ledger;
pub mod registry;
pub mod router;
pub mod scenario;
pub mod venues;

#[cfg(test)]
mod fixtures;

pub use brain::{Path, PathSolver};
pub use cartographer::{Cost, Quote, RateGraph, RateOracle};
pub use config::{AbsentVenuePolicy, RouterConfig};
pub use errors::{LedgerError, RouterError, RouterResult, VenueError};
pub use executor::{ExecutionReport, PathExecutor, SwapCompleted};
pub use ledger::{AssetLedger, InMemoryLedger};
pub use registry::Registry;
pub use router::{Route, Router};
pub use venues::{FixedRateVenue, Venue};
