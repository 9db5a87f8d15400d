//! Per-holder balance history.
//!
//! A history is an ordered list of `(period, balance)` entries with
//! non-decreasing periods. Each entry holds from its period until the next
//! entry's period, so the balance at any period is the latest entry at or
//! before it. Writing twice in the same period overwrites the last entry.

use soroban_sdk::Vec;

use crate::storage::Checkpoint;

/// Record `balance` as effective from `period` onward.
pub fn record(history: &mut Vec<Checkpoint>, period: u64, balance: i128) {
    let len = history.len();
    if len > 0 {
        let last = history.get_unchecked(len - 1);
        if last.period == period {
            history.set(len - 1, Checkpoint { period, balance });
            return;
        }
    }
    history.push_back(Checkpoint { period, balance });
}

/// Balance effective at `period`, or zero before the first entry.
pub fn balance_at(history: &Vec<Checkpoint>, period: u64) -> i128 {
    // First index whose period is strictly after the query
    let mut low = 0u32;
    let mut high = history.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if history.get_unchecked(mid).period <= period {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    if low == 0 {
        0
    } else {
        history.get_unchecked(low - 1).balance
    }
}

/// Index of the first period in `periods` that is `>= from`.
pub fn first_at_or_after(periods: &Vec<u64>, from: u64) -> u32 {
    let mut low = 0u32;
    let mut high = periods.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if periods.get_unchecked(mid) < from {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}
