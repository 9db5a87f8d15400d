//! Stake and payout arithmetic.
//!
//! Commission is skimmed from every stake at the option's rate. At settlement
//! the whole net pool goes to the winning side, split in proportion to each
//! winner's net stake. All divisions floor; the remainder stays in the market.

use crate::error::MarketError;
use crate::interfaces::{BinaryOption, Outcome, Position};
use crate::storage::BPS_DENOMINATOR;

/// Split a stake into `(commission, net)` at `rate_bps`.
pub fn split_stake(value: i128, rate_bps: u32) -> Result<(i128, i128), MarketError> {
    if value <= 0 {
        return Err(MarketError::InvalidAmount);
    }

    let commission = value
        .checked_mul(rate_bps as i128)
        .ok_or(MarketError::Overflow)?
        .checked_div(BPS_DENOMINATOR)
        .ok_or(MarketError::Overflow)?;
    let net = value
        .checked_sub(commission)
        .ok_or(MarketError::Overflow)?;

    Ok((commission, net))
}

/// Timestamp at which the option window closes.
pub fn expiry(option: &BinaryOption) -> Result<u64, MarketError> {
    option
        .start
        .checked_add(option.duration)
        .ok_or(MarketError::Overflow)
}

/// Winner's share of `pool`: `pool * stake / winning_total`.
pub fn payout(pool: i128, stake: i128, winning_total: i128) -> Result<i128, MarketError> {
    if pool <= 0 || stake <= 0 || winning_total <= 0 {
        return Ok(0);
    }

    pool.checked_mul(stake)
        .ok_or(MarketError::Overflow)?
        .checked_div(winning_total)
        .ok_or(MarketError::Overflow)
}

/// What `position` is owed from a concluded `option`. Zero for losers and
/// for options still running.
pub fn entitlement(option: &BinaryOption, position: &Position) -> Result<i128, MarketError> {
    let (stake, winning_total) = match option.outcome {
        Outcome::Long => (position.long, option.total_long),
        Outcome::Short => (position.short, option.total_short),
        Outcome::Undetermined => return Ok(0),
    };
    let pool = option
        .total_long
        .checked_add(option.total_short)
        .ok_or(MarketError::Overflow)?;

    payout(pool, stake, winning_total)
}
