//! Phase 1: The Cartographer (Rate Sampling)
//!
//! Responsible for:
//! - Asking every venue for a quote and keeping the best (RateOracle)
//! - Building the N×N rate / cost matrices over all registered assets
//! - The fixed-point `-log2` transform that turns rate products into cost sums

pub mod fixed_point;
mod graph;
mod oracle;

pub use fixed_point::{log2, rate_of, to_cost, Cost, SCALE};
pub use graph::{CostMatrix, EdgeData, Matrix, RateGraph, RateMatrix};
pub use oracle::{Quote, RateOracle};
