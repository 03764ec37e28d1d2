//! Resolved swap paths
//!
//! A Path holds asset and venue *values*, never registry indices, so it stays
//! meaningful even if the registry changes between solving and executing.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::errors::{RouterError, RouterResult};
use crate::registry::Registry;

/// One swap on one venue between two adjacent assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub index: usize,
    pub asset_in: Address,
    pub asset_out: Address,
    /// `None` when the hop has no venue (absent-venue sentinel)
    pub venue: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    tokens: Vec<Address>,
    venues: Vec<Option<Address>>,
}

/// Unchecked wire form; deserialising goes through `Path::new`
#[derive(Deserialize)]
struct RawPath {
    tokens: Vec<Address>,
    venues: Vec<Option<Address>>,
}

impl TryFrom<RawPath> for Path {
    type Error = RouterError;

    fn try_from(raw: RawPath) -> RouterResult<Self> {
        Path::new(raw.tokens, raw.venues)
    }
}

impl Path {
    /// Validate and build a path.
    ///
    /// Requires at least two tokens, exactly one venue slot per hop, and no
    /// hop from an asset to itself.
    pub fn new(tokens: Vec<Address>, venues: Vec<Option<Address>>) -> RouterResult<Self> {
        if tokens.len() < 2 {
            return Err(RouterError::MalformedPath(format!(
                "need at least 2 tokens, got {}",
                tokens.len()
            )));
        }

        if venues.len() != tokens.len() - 1 {
            return Err(RouterError::MalformedPath(format!(
                "{} tokens need {} exchanges, got {}",
                tokens.len(),
                tokens.len() - 1,
                venues.len()
            )));
        }

        if let Some(i) = tokens.windows(2).position(|w| w[0] == w[1]) {
            return Err(RouterError::MalformedPath(format!(
                "hop {} swaps {} into itself",
                i, tokens[i]
            )));
        }

        Ok(Self { tokens, venues })
    }

    /// Build from caller-facing slices where `Address::ZERO` marks a missing
    /// venue.
    pub fn from_exchange_path(tokens: &[Address], exchanges: &[Address]) -> RouterResult<Self> {
        let venues = exchanges
            .iter()
            .map(|&v| if v == Address::ZERO { None } else { Some(v) })
            .collect();
        Self::new(tokens.to_vec(), venues)
    }

    pub fn token_path(&self) -> &[Address] {
        &self.tokens
    }

    /// Venues per hop, with `Address::ZERO` for a missing venue
    pub fn exchange_path(&self) -> Vec<Address> {
        self.venues
            .iter()
            .map(|v| v.unwrap_or(Address::ZERO))
            .collect()
    }

    pub fn venues(&self) -> &[Option<Address>] {
        &self.venues
    }

    pub fn hop_count(&self) -> usize {
        self.venues.len()
    }

    pub fn hops(&self) -> impl Iterator<Item = Hop> + '_ {
        self.venues.iter().enumerate().map(move |(index, &venue)| Hop {
            index,
            asset_in: self.tokens[index],
            asset_out: self.tokens[index + 1],
            venue,
        })
    }

    pub fn asset_in(&self) -> Address {
        self.tokens[0]
    }

    pub fn asset_out(&self) -> Address {
        self.tokens[self.tokens.len() - 1]
    }

    /// True if every hop names a venue
    pub fn is_complete(&self) -> bool {
        self.venues.iter().all(Option::is_some)
    }

    /// "A -[X]-> B -[Y]-> C" using registry labels
    pub fn describe(&self, registry: &Registry) -> String {
        let mut parts = vec![registry.label(self.tokens[0])];

        for hop in self.hops() {
            let venue = hop
                .venue
                .map(|v| registry.label(v))
                .unwrap_or_else(|| "∅".to_string());
            parts.push(format!("-[{}]-> {}", venue, registry.label(hop.asset_out)));
        }

        parts.join(" ")
    }
}
