#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, Address, Env, String, Vec,
};

const DAY_IN_LEDGERS: u32 = 17280;
const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LedgerError {
    /// Only owner can perform this action
    OnlyOwner = 1,
    /// Only the market contract can write to the ledger
    OnlyMarket = 2,
    /// Only the market contract and the owner can read from the ledger
    OnlyMarketOrOwner = 3,
    /// No binary option with this id
    OptionNotFound = 4,
    /// Amount must be positive
    InvalidAmount = 5,
    /// Arithmetic overflow
    Overflow = 6,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 7,
}

/// Resolution of a binary option. Stays `Undetermined` until the option is concluded.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Outcome {
    Undetermined = 0,
    Long = 1,
    Short = 2,
}

/// A time-boxed proposition that participants stake on.
///
/// Stakes are stored net of commission. Once `concluded` is set the record
/// is never written again.
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

/// A participant's stake on both sides of one option.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub long: i128,
    pub short: i128,
}

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Owner address (read access, sets the market)
    Owner,
    /// Market contract address (read and write access)
    Market,
    /// Number of options created so far; also the next id
    OptionCount,
    /// Option record by id
    Option(u64),
    /// Position(option_id, staker)
    Position(u64, Address),
    /// Ids of the options an address has staked in, in staking order
    UserOptions(Address),
}

/// Option Ledger Contract
///
/// Durable store for binary options and positions. The market contract is
/// the only writer; the owner may inspect state but never mutate it.
#[contract]
pub struct OptionLedger;

#[contractimpl]
impl OptionLedger {
    pub fn __constructor(env: Env, owner: Address) {
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::OptionCount, &0u64);
    }

    /// Set the market contract allowed to write (owner only).
    pub fn set_market(env: Env, caller: Address, market: Address) -> Result<(), LedgerError> {
        Self::require_owner(&env, &caller)?;

        caller.require_auth();

        env.storage().instance().set(&DataKey::Market, &market);
        env.storage().instance().extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);

        Ok(())
    }

    pub fn get_owner(env: Env) -> Result<Address, LedgerError> {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(LedgerError::StorageCorrupted)
    }

    pub fn get_market(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Market)
    }

    // --- Writes (market only) ---

    /// Store a new option and return its id.
    pub fn create_option(
        env: Env,
        caller: Address,
        title: String,
        start: u64,
        duration: u64,
        commission_rate_bps: u32,
    ) -> Result<u64, LedgerError> {
        Self::require_market(&env, &caller)?;

        caller.require_auth();

        let id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::OptionCount)
            .ok_or(LedgerError::StorageCorrupted)?;

        let option = BinaryOption {
            id,
            title,
            start,
            duration,
            commission_rate_bps,
            commission_collected: 0,
            outcome: Outcome::Undetermined,
            total_long: 0,
            long_stakers: Vec::new(&env),
            total_short: 0,
            short_stakers: Vec::new(&env),
            concluded: false,
        };
        Self::save_option(&env, &option);

        let next = id.checked_add(1).ok_or(LedgerError::Overflow)?;
        env.storage().instance().set(&DataKey::OptionCount, &next);
        env.storage().instance().extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);

        Ok(id)
    }

    /// Add `net_amount` to the staker's position on one side of an option.
    pub fn create_position(
        env: Env,
        caller: Address,
        id: u64,
        staker: Address,
        net_amount: i128,
        is_long: bool,
    ) -> Result<(), LedgerError> {
        Self::require_market(&env, &caller)?;

        caller.require_auth();

        if net_amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let mut option = Self::load_option(&env, id)?;

        let position_key = DataKey::Position(id, staker.clone());
        let mut position: Position = env
            .storage()
            .persistent()
            .get(&position_key)
            .unwrap_or_default();

        // First stake in this option, on either side
        if position.long == 0 && position.short == 0 {
            let user_key = DataKey::UserOptions(staker.clone());
            let mut ids: Vec<u64> = env
                .storage()
                .persistent()
                .get(&user_key)
                .unwrap_or_else(|| Vec::new(&env));
            ids.push_back(id);
            env.storage().persistent().set(&user_key, &ids);
            env.storage()
                .persistent()
                .extend_ttl(&user_key, BUMP_THRESHOLD, BUMP_AMOUNT);
        }

        if is_long {
            if position.long == 0 {
                option.long_stakers.push_back(staker);
            }
            position.long = position
                .long
                .checked_add(net_amount)
                .ok_or(LedgerError::Overflow)?;
            option.total_long = option
                .total_long
                .checked_add(net_amount)
                .ok_or(LedgerError::Overflow)?;
        } else {
            if position.short == 0 {
                option.short_stakers.push_back(staker);
            }
            position.short = position
                .short
                .checked_add(net_amount)
                .ok_or(LedgerError::Overflow)?;
            option.total_short = option
                .total_short
                .checked_add(net_amount)
                .ok_or(LedgerError::Overflow)?;
        }

        env.storage().persistent().set(&position_key, &position);
        env.storage()
            .persistent()
            .extend_ttl(&position_key, BUMP_THRESHOLD, BUMP_AMOUNT);
        Self::save_option(&env, &option);

        Ok(())
    }

    /// Accumulate commission skimmed from a stake against its option.
    pub fn collect_commission(
        env: Env,
        caller: Address,
        id: u64,
        amount: i128,
    ) -> Result<(), LedgerError> {
        Self::require_market(&env, &caller)?;

        caller.require_auth();

        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let mut option = Self::load_option(&env, id)?;
        option.commission_collected = option
            .commission_collected
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Self::save_option(&env, &option);

        Ok(())
    }

    /// Record the outcome and mark the option concluded.
    ///
    /// Does not reject an already concluded option; the market checks that
    /// before calling.
    pub fn end_option(
        env: Env,
        caller: Address,
        id: u64,
        outcome_is_long: bool,
    ) -> Result<(), LedgerError> {
        Self::require_market(&env, &caller)?;

        caller.require_auth();

        let mut option = Self::load_option(&env, id)?;
        option.outcome = if outcome_is_long {
            Outcome::Long
        } else {
            Outcome::Short
        };
        option.concluded = true;
        Self::save_option(&env, &option);

        Ok(())
    }

    // --- Reads (market and owner) ---

    pub fn read_option(env: Env, caller: Address, id: u64) -> Result<BinaryOption, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        Self::load_option(&env, id)
    }

    pub fn read_position(
        env: Env,
        caller: Address,
        id: u64,
        staker: Address,
    ) -> Result<Position, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        Ok(env
            .storage()
            .persistent()
            .get(&DataKey::Position(id, staker))
            .unwrap_or_default())
    }

    pub fn read_user_options(
        env: Env,
        caller: Address,
        user: Address,
    ) -> Result<Vec<u64>, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        Ok(env
            .storage()
            .persistent()
            .get(&DataKey::UserOptions(user))
            .unwrap_or_else(|| Vec::new(&env)))
    }

    /// Ids of all options not yet concluded, in id order.
    pub fn read_active_options(env: Env, caller: Address) -> Result<Vec<u64>, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        Self::filter_options(&env, false)
    }

    /// Ids of all concluded options, in id order.
    pub fn read_concluded_options(env: Env, caller: Address) -> Result<Vec<u64>, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        Self::filter_options(&env, true)
    }

    pub fn read_option_count(env: Env, caller: Address) -> Result<u64, LedgerError> {
        Self::require_reader(&env, &caller)?;

        caller.require_auth();

        env.storage()
            .instance()
            .get(&DataKey::OptionCount)
            .ok_or(LedgerError::StorageCorrupted)
    }

    // --- Internal helpers ---

    fn require_owner(env: &Env, caller: &Address) -> Result<(), LedgerError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(LedgerError::StorageCorrupted)?;
        if *caller != owner {
            return Err(LedgerError::OnlyOwner);
        }
        Ok(())
    }

    fn require_market(env: &Env, caller: &Address) -> Result<(), LedgerError> {
        let market: Option<Address> = env.storage().instance().get(&DataKey::Market);
        match market {
            Some(market) if market == *caller => Ok(()),
            _ => Err(LedgerError::OnlyMarket),
        }
    }

    fn require_reader(env: &Env, caller: &Address) -> Result<(), LedgerError> {
        if Self::require_market(env, caller).is_ok() || Self::require_owner(env, caller).is_ok() {
            return Ok(());
        }
        Err(LedgerError::OnlyMarketOrOwner)
    }

    fn load_option(env: &Env, id: u64) -> Result<BinaryOption, LedgerError> {
        env.storage()
            .persistent()
            .get(&DataKey::Option(id))
            .ok_or(LedgerError::OptionNotFound)
    }

    fn save_option(env: &Env, option: &BinaryOption) {
        let key = DataKey::Option(option.id);
        env.storage().persistent().set(&key, option);
        env.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_AMOUNT);
    }

    fn filter_options(env: &Env, concluded: bool) -> Result<Vec<u64>, LedgerError> {
        let count: u64 = env
            .storage()
            .instance()
            .get(&DataKey::OptionCount)
            .ok_or(LedgerError::StorageCorrupted)?;

        let mut ids = Vec::new(env);
        for id in 0..count {
            let option = Self::load_option(env, id).map_err(|_| LedgerError::StorageCorrupted)?;
            if option.concluded == concluded {
                ids.push_back(id);
            }
        }
        Ok(ids)
    }
}
