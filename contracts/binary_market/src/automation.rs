//! Keeper-facing settlement.
//!
//! `scan` lists every active option whose window has closed; `execute`
//! concludes a batch of them. Anyone may call either. A batch is all or
//! nothing: one failing id reverts the whole call.

use soroban_sdk::{log, symbol_short, token, Env, Vec};

use crate::error::MarketError;
use crate::interfaces::{CommissionPoolClient, LedgerClient, OutcomeOracleClient};
use crate::settlement;
use crate::storage::{self, DataKey};

/// Active options whose window has closed, in ledger order.
pub fn scan(env: &Env) -> Result<(bool, Vec<u64>), MarketError> {
    let ledger = LedgerClient::new(env, &storage::address(env, &DataKey::Ledger)?);
    let this = env.current_contract_address();
    let now = env.ledger().timestamp();

    let mut due = Vec::new(env);
    for id in ledger.read_active_options(&this).iter() {
        let option = ledger.read_option(&this, &id);
        if settlement::expiry(&option)? <= now {
            due.push_back(id);
        }
    }

    Ok((!due.is_empty(), due))
}

/// Conclude every option in `ids`, in order.
pub fn execute(env: &Env, ids: &Vec<u64>) -> Result<(), MarketError> {
    for id in ids.iter() {
        conclude(env, id)?;
    }
    Ok(())
}

/// Settle one option: fetch the outcome, freeze the option, then forward
/// its commission to the commission token.
fn conclude(env: &Env, id: u64) -> Result<(), MarketError> {
    let ledger = LedgerClient::new(env, &storage::address(env, &DataKey::Ledger)?);
    let this = env.current_contract_address();

    let option = crate::BinaryMarket::load_option(env, &ledger, id)?;
    if env.ledger().timestamp() < settlement::expiry(&option)? {
        return Err(MarketError::DurationNotPassed);
    }
    if option.concluded {
        return Err(MarketError::AlreadyConcluded);
    }

    let oracle = storage::address(env, &DataKey::Oracle)?;
    let outcome_is_long = OutcomeOracleClient::new(env, &oracle).outcome(&id);

    // Freeze before any value leaves the market
    ledger.end_option(&this, &id, &outcome_is_long);

    let commission = option.commission_collected;
    if commission > 0 {
        let commission_token = storage::address(env, &DataKey::CommissionToken)?;
        let collateral = storage::address(env, &DataKey::CollateralToken)?;
        token::Client::new(env, &collateral).transfer(&this, &commission_token, &commission);
        CommissionPoolClient::new(env, &commission_token).distribute_commission(&this, &commission);
    }

    let pool = option
        .total_long
        .checked_add(option.total_short)
        .ok_or(MarketError::Overflow)?;

    log!(env, "option concluded", id, outcome_is_long, pool, commission);
    env.events().publish(
        (symbol_short!("concluded"), id),
        (outcome_is_long, pool, commission),
    );

    Ok(())
}
