//! In-memory asset ledger
//!
//! Backs the tests and the CLI scenarios. It is `Clone`, which is what the
//! executor relies on for all-or-nothing execution.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::debug;

use super::AssetLedger;
use crate::errors::LedgerError;

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AssetState {
    decimals: u8,
    /// Basis points burned on every transfer (fee-on-transfer assets)
    transfer_fee_bps: u16,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    assets: HashMap<Address, AssetState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset. Re-registering keeps balances and updates decimals.
    pub fn register_asset(&mut self, asset: Address, decimals: u8) {
        self.assets.entry(asset).or_default().decimals = decimals;
    }

    pub fn set_transfer_fee_bps(&mut self, asset: Address, bps: u16) -> Result<(), LedgerError> {
        let state = self.state_mut(asset)?;
        state.transfer_fee_bps = bps.min(BPS_DENOMINATOR as u16);
        Ok(())
    }

    pub fn mint(&mut self, asset: Address, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let state = self.state_mut(asset)?;
        let balance = state.balances.entry(owner).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    fn state(&self, asset: Address) -> Result<&AssetState, LedgerError> {
        self.assets.get(&asset).ok_or(LedgerError::UnknownAsset(asset))
    }

    fn state_mut(&mut self, asset: Address) -> Result<&mut AssetState, LedgerError> {
        self.assets
            .get_mut(&asset)
            .ok_or(LedgerError::UnknownAsset(asset))
    }

    fn move_balance(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let state = self.state_mut(asset)?;

        let available = state.balances.get(&from).copied().unwrap_or(U256::ZERO);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                owner: from,
                available,
                required: amount,
            });
        }

        let fee = amount * U256::from(state.transfer_fee_bps) / U256::from(BPS_DENOMINATOR);
        let received = amount - fee;

        state.balances.insert(from, available - amount);
        let balance = state.balances.entry(to).or_insert(U256::ZERO);
        *balance = balance.saturating_add(received);

        if !fee.is_zero() {
            debug!("Burned {} of {} as transfer fee", fee, asset);
        }

        Ok(())
    }
}

impl AssetLedger for InMemoryLedger {
    fn decimals(&self, asset: Address) -> Option<u8> {
        self.assets.get(&asset).map(|s| s.decimals)
    }

    fn balance_of(&self, asset: Address, owner: Address) -> U256 {
        self.assets
            .get(&asset)
            .and_then(|s| s.balances.get(&owner).copied())
            .unwrap_or(U256::ZERO)
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.assets
            .get(&asset)
            .and_then(|s| s.allowances.get(&(owner, spender)).copied())
            .unwrap_or(U256::ZERO)
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.move_balance(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.state(asset)?
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or(U256::ZERO);

        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                available,
                required: amount,
            });
        }

        self.move_balance(asset, from, to, amount)?;

        // Infinite approvals are never consumed
        if available != U256::MAX {
            self.state_mut(asset)?
                .allowances
                .insert((from, spender), available - amount);
        }

        Ok(())
    }

    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.state_mut(asset)?
            .allowances
            .insert((owner, spender), amount);
        Ok(())
    }
}
