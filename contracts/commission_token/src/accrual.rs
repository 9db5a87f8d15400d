//! Commission accrual arithmetic.
//!
//! Time is cut into fixed periods counted from the token's genesis. A holder's
//! share of an epoch is `accrued * balance / total_supply`, floored. Dust
//! from the floor stays in the contract.

use crate::error::CommissionError;

/// Period index of `now`.
pub fn period_of(now: u64, genesis: u64, period_duration: u64) -> Result<u64, CommissionError> {
    now.saturating_sub(genesis)
        .checked_div(period_duration)
        .ok_or(CommissionError::InvalidPeriod)
}

/// Holder's share of one epoch.
pub fn share_of(accrued: i128, balance: i128, total_supply: i128) -> Result<i128, CommissionError> {
    if accrued <= 0 || balance <= 0 || total_supply <= 0 {
        return Ok(0);
    }

    accrued
        .checked_mul(balance)
        .ok_or(CommissionError::Overflow)?
        .checked_div(total_supply)
        .ok_or(CommissionError::Overflow)
}

/// Tokens minted for `payment` collateral at `exchange_rate` collateral per whole token.
pub fn tokens_for_payment(
    payment: i128,
    exchange_rate: i128,
    scale: i128,
) -> Result<i128, CommissionError> {
    if exchange_rate <= 0 {
        return Err(CommissionError::InvalidExchangeRate);
    }

    payment
        .checked_mul(scale)
        .ok_or(CommissionError::Overflow)?
        .checked_div(exchange_rate)
        .ok_or(CommissionError::Overflow)
}
