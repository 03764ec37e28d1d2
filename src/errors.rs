//! Error types for the router and the capabilities it consumes.
//!
//! Every failure is fail-fast: read calls produce no effect and an execution
//! that fails is rolled back as a whole.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Failure of an asset capability call (transfer / approve).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("asset {0} is not known to the ledger")]
    UnknownAsset(Address),
    #[error("insufficient balance of {asset} for {owner}: have {available}, need {required}")]
    InsufficientBalance {
        asset: Address,
        owner: Address,
        available: U256,
        required: U256,
    },
    #[error("insufficient allowance of {asset} from {owner} to {spender}: have {available}, need {required}")]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        available: U256,
        required: U256,
    },
}

/// Failure of a venue swap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("venue does not serve {asset_in} -> {asset_out}")]
    UnsupportedPair { asset_in: Address, asset_out: Address },
    #[error("venue would deliver {quoted}, below the requested minimum {minimum}")]
    BelowMinimum { quoted: U256, minimum: U256 },
    #[error("ledger rejected venue transfer: {0}")]
    Ledger(#[from] LedgerError),
}

/// Router error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("unknown asset {0}")]
    UnknownAsset(Address),

    #[error("unknown venue {0}")]
    UnknownVenue(Address),

    #[error("input and output asset are both {0}")]
    SameAsset(Address),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("no path exists from {from} to {to}")]
    NoPathExists { from: Address, to: Address },

    #[error("malformed path: {0}")]
    MalformedPath(String),

    #[error("transfer of {asset} failed: {source}")]
    TransferFailed {
        asset: Address,
        #[source]
        source: LedgerError,
    },

    #[error("approval of {asset} for {spender} failed: {source}")]
    ApprovalFailed {
        asset: Address,
        spender: Address,
        #[source]
        source: LedgerError,
    },

    #[error("venue {venue} failed on hop {hop}: {source}")]
    VenueFailed {
        venue: Address,
        hop: usize,
        #[source]
        source: VenueError,
    },

    #[error("hop {hop} has no venue")]
    AbsentVenue { hop: usize },

    #[error("slippage exceeded: got {actual}, minimum was {minimum}")]
    SlippageExceeded { minimum: U256, actual: U256 },

    #[error("route was built against registry version {route_version}, registry is at {registry_version}")]
    StaleRoute {
        route_version: u64,
        registry_version: u64,
    },

    #[error("{decimals} decimals for {asset}: a whole unit does not fit in 256 bits")]
    UnsupportedDecimals { asset: Address, decimals: u8 },

    #[error("registry holds {assets} assets, graph builds are capped at {max}")]
    RegistryTooLarge { assets: usize, max: usize },
}

pub type RouterResult<T> = Result<T, RouterError>;
