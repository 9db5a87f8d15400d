use soroban_sdk::{contracttype, Address, Env};

use crate::error::MarketError;

/// Storage keys for the contract.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Market owner
    Owner,
    /// Admin flag: Admin(address)
    Admin(Address),
    /// Shortest allowed option duration, in seconds
    MinimumDuration,
    /// Option ledger contract address
    Ledger,
    /// Commission token contract address
    CommissionToken,
    /// Collateral token contract address (e.g., a SAC)
    CollateralToken,
    /// Outcome oracle contract address
    Oracle,
    /// Withdrawal marker: Withdrawn(option_id, user)
    Withdrawn(u64, Address),
}

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub(crate) const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

/// Read a required address from instance storage.
pub fn address(env: &Env, key: &DataKey) -> Result<Address, MarketError> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(MarketError::StorageCorrupted)
}
