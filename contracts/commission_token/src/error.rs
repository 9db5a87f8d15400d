use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CommissionError {
    /// Only owner can perform this action
    OnlyOwner = 1,
    /// Only the market contract can distribute commission
    OnlyMarket = 2,
    /// Amount must be positive
    InvalidAmount = 3,
    /// Mint would push total supply above the cap
    CapExceeded = 4,
    /// Cap must be positive and not below the circulating supply
    InvalidCap = 5,
    /// Exchange rate must be positive
    InvalidExchangeRate = 6,
    /// Period duration must be positive
    InvalidPeriod = 7,
    /// Sender balance is lower than the transfer amount
    InsufficientBalance = 8,
    /// No commission accrued since the last claim
    NothingToClaim = 9,
    /// Arithmetic overflow
    Overflow = 10,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 11,
}
