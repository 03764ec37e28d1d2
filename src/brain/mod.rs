//! Phase 2: The Brain
//!
//! Responsible for:
//! - Finding the cheapest (= best aggregate rate) path with Bellman-Ford
//! - Flagging negative cycles in the quoted rates
//! - Turning parent pointers into a resolved, validated Path

mod bellman_ford;
mod path;

pub use bellman_ford::{PathSolver, Relaxation};
pub use path::{Hop, Path};
