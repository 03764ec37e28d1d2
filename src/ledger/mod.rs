//! Asset capability
//!
//! The router never moves funds itself; it goes through this interface:
//! - fungible transfers (`transfer`, `transfer_from`)
//! - allowances (`approve`, `allowance`)
//! - `decimals` to size probe amounts

mod memory;

pub use memory::InMemoryLedger;

use alloy_primitives::{Address, U256};

use crate::errors::LedgerError;

/// Standard fungible-asset semantics over every registered asset.
pub trait AssetLedger {
    /// Decimal precision of `asset`, `None` if the ledger does not know it.
    fn decimals(&self, asset: Address) -> Option<u8>;

    fn balance_of(&self, asset: Address, owner: Address) -> U256;

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256;

    /// Move `amount` from `from` to `to` on behalf of `from`.
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Set `spender`'s allowance over `owner`'s balance to `amount`.
    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}
