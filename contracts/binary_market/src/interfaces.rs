//! Clients for the contracts the market talks to.
//!
//! The record types mirror the ones stored by the option ledger field for
//! field, so they decode from its return values.

use soroban_sdk::{contractclient, contracttype, Address, Env, String, Vec};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Outcome {
    Undetermined = 0,
    Long = 1,
    Short = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryOption {
    pub id: u64,
    pub title: String,
    pub start: u64,
    pub duration: u64,
    pub commission_rate_bps: u32,
    pub commission_collected: i128,
    pub outcome: Outcome,
    pub total_long: i128,
    pub long_stakers: Vec<Address>,
    pub total_short: i128,
    pub short_stakers: Vec<Address>,
    pub concluded: bool,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub long: i128,
    pub short: i128,
}

/// Store of options and positions. Accepts writes from the market only.
#[contractclient(name = "LedgerClient")]
pub trait OptionLedgerInterface {
    fn create_option(
        env: Env,
        caller: Address,
        title: String,
        start: u64,
        duration: u64,
        commission_rate_bps: u32,
    ) -> u64;

    fn create_position(
        env: Env,
        caller: Address,
        id: u64,
        staker: Address,
        net_amount: i128,
        is_long: bool,
    );

    fn collect_commission(env: Env, caller: Address, id: u64, amount: i128);

    fn end_option(env: Env, caller: Address, id: u64, outcome_is_long: bool);

    fn read_option(env: Env, caller: Address, id: u64) -> BinaryOption;

    fn read_position(env: Env, caller: Address, id: u64, staker: Address) -> Position;

    fn read_user_options(env: Env, caller: Address, user: Address) -> Vec<u64>;

    fn read_active_options(env: Env, caller: Address) -> Vec<u64>;

    fn read_concluded_options(env: Env, caller: Address) -> Vec<u64>;
}

/// Commission sink shared by token holders.
#[contractclient(name = "CommissionPoolClient")]
pub trait CommissionPoolInterface {
    fn distribute_commission(env: Env, caller: Address, amount: i128);
}

/// External source of truth for option outcomes. `true` means Long won.
#[contractclient(name = "OutcomeOracleClient")]
pub trait OutcomeOracleInterface {
    fn outcome(env: Env, option_id: u64) -> bool;
}
