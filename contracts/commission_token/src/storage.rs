use soroban_sdk::{contracttype, Address};

/// Storage keys for the contract.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Owner address (mints, sets cap, rate and market)
    Owner,
    /// Market contract address (sole commission source)
    Market,
    /// Token the commission is paid in (e.g. XLM SAC)
    CollateralToken,
    Name,
    Symbol,
    /// Maximum total supply
    Cap,
    TotalSupply,
    /// Collateral units charged per whole token by `buy`
    ExchangeRate,
    /// Ledger timestamp at deployment; period 0 starts here
    Genesis,
    /// Length of one commission period in seconds
    PeriodDuration,
    /// Addresses with a non-zero balance
    Holders,
    /// Ascending list of periods that own an epoch
    EpochPeriods,
    Balance(Address),
    /// Balance history of a holder
    Checkpoints(Address),
    /// Commission epoch by period index
    Epoch(u64),
    ClaimCursor(Address),
}

/// Commission sent to one period.
///
/// `total_supply` is the token supply when the first distribution of the
/// period landed; later distributions in the same period reuse it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommissionEpoch {
    pub total_supply: i128,
    pub accrued: i128,
}

/// Balance of a holder effective from `period` onward.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub period: u64,
    pub balance: i128,
}

/// How far a holder has been paid.
///
/// Every epoch before `period` is settled; `paid` has already been taken
/// from the epoch at `period` itself.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClaimCursor {
    pub period: u64,
    pub paid: i128,
}

/// Token precision, matching Stellar asset decimals.
pub const DECIMALS: u32 = 7;

/// One whole token in base units (10^7).
pub const SCALE_FACTOR: i128 = 10_000_000;

pub const DAY_IN_LEDGERS: u32 = 17280;
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
