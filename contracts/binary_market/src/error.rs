use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MarketError {
    /// Caller is not the market owner
    OnlyOwner = 1,
    /// Caller is neither the owner nor an admin
    OnlyOwnerOrAdmin = 2,
    /// Option duration is below the configured minimum
    DurationTooShort = 3,
    /// Commission rate must be below 10000 bps
    InvalidCommissionRate = 4,
    /// Stake must be positive
    InvalidAmount = 5,
    /// Option window has not opened yet
    OptionNotStarted = 6,
    /// Option window has closed
    OptionExpired = 7,
    /// Option cannot be concluded before its window closes
    DurationNotPassed = 8,
    /// Option already concluded
    AlreadyConcluded = 9,
    /// Option not concluded yet
    NotConcluded = 10,
    /// User has no winning stake in this option
    NothingToWithdraw = 11,
    /// User already withdrew from this option
    AlreadyWithdrawn = 12,
    /// No option with this id
    OptionNotFound = 13,
    /// Arithmetic overflow
    Overflow = 14,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 15,
}
