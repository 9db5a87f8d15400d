#![no_std]

mod automation;
mod error;
mod interfaces;
mod settlement;
mod storage;

use error::MarketError;
pub use interfaces::{BinaryOption, Outcome, Position};
use interfaces::LedgerClient;
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, String, Vec};
use storage::{DataKey, BPS_DENOMINATOR, BUMP_AMOUNT, BUMP_THRESHOLD};

/// Binary Options Market Contract
///
/// Users stake collateral on Long or Short for a time-boxed option. A fixed
/// commission is skimmed from every stake and forwarded to the commission
/// token when the option concludes. Winners then pull their pro-rata share
/// of the net pool.
///
/// Options and positions live in the option ledger; this contract holds the
/// collateral and is the only writer the ledger accepts.
#[contract]
pub struct BinaryMarket;

#[contractimpl]
impl BinaryMarket {
    /// Constructor: wires the market to its ledger, commission token,
    /// collateral token and outcome oracle.
    ///
    /// The ledger and commission token must then be pointed at this market
    /// by their owners (`set_market`).
    pub fn __constructor(
        env: Env,
        owner: Address,
        ledger: Address,
        commission_token: Address,
        collateral_token: Address,
        oracle: Address,
        minimum_duration: u64,
    ) {
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Ledger, &ledger);
        env.storage()
            .instance()
            .set(&DataKey::CommissionToken, &commission_token);
        env.storage()
            .instance()
            .set(&DataKey::CollateralToken, &collateral_token);
        env.storage().instance().set(&DataKey::Oracle, &oracle);
        env.storage()
            .instance()
            .set(&DataKey::MinimumDuration, &minimum_duration);
    }

    // ---- Administration ----

    /// Grant or revoke admin rights (owner only).
    pub fn update_admin(
        env: Env,
        caller: Address,
        admin: Address,
        is_admin: bool,
    ) -> Result<(), MarketError> {
        Self::require_owner(&env, &caller)?;

        let key = DataKey::Admin(admin.clone());
        if is_admin {
            env.storage().persistent().set(&key, &true);
            env.storage()
                .persistent()
                .extend_ttl(&key, BUMP_THRESHOLD, BUMP_AMOUNT);
        } else {
            env.storage().persistent().remove(&key);
        }

        env.events()
            .publish((symbol_short!("admin"), admin), is_admin);
        Ok(())
    }

    pub fn is_admin(env: Env, address: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Admin(address))
            .unwrap_or(false)
    }

    /// Hand the market to a new owner (owner only).
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), MarketError> {
        Self::require_owner(&env, &caller)?;

        env.storage().instance().set(&DataKey::Owner, &new_owner);
        env.events()
            .publish((symbol_short!("owner"), caller), new_owner);
        Ok(())
    }

    pub fn get_owner(env: Env) -> Result<Address, MarketError> {
        storage::address(&env, &DataKey::Owner)
    }

    /// Set the shortest allowed option duration in seconds (owner only).
    pub fn set_minimum_duration(
        env: Env,
        caller: Address,
        minimum_duration: u64,
    ) -> Result<(), MarketError> {
        Self::require_owner(&env, &caller)?;

        env.storage()
            .instance()
            .set(&DataKey::MinimumDuration, &minimum_duration);
        Ok(())
    }

    pub fn get_minimum_duration(env: Env) -> Result<u64, MarketError> {
        env.storage()
            .instance()
            .get(&DataKey::MinimumDuration)
            .ok_or(MarketError::StorageCorrupted)
    }

    pub fn get_ledger(env: Env) -> Result<Address, MarketError> {
        storage::address(&env, &DataKey::Ledger)
    }

    pub fn get_commission_token(env: Env) -> Result<Address, MarketError> {
        storage::address(&env, &DataKey::CommissionToken)
    }

    pub fn get_collateral_token(env: Env) -> Result<Address, MarketError> {
        storage::address(&env, &DataKey::CollateralToken)
    }

    pub fn get_oracle(env: Env) -> Result<Address, MarketError> {
        storage::address(&env, &DataKey::Oracle)
    }

    // ---- Options and positions ----

    /// Create a new option (owner or admin).
    ///
    /// # Arguments
    /// * `title` - Human-readable description of the event
    /// * `start` - Timestamp at which staking opens
    /// * `duration` - Seconds the option stays open, at least the minimum
    /// * `commission_rate_bps` - Commission on every stake, below 10000
    ///
    /// # Returns
    /// Id of the new option
    pub fn add_binary_option(
        env: Env,
        caller: Address,
        title: String,
        start: u64,
        duration: u64,
        commission_rate_bps: u32,
    ) -> Result<u64, MarketError> {
        Self::require_owner_or_admin(&env, &caller)?;

        if duration < Self::get_minimum_duration(env.clone())? {
            return Err(MarketError::DurationTooShort);
        }
        if commission_rate_bps as i128 >= BPS_DENOMINATOR {
            return Err(MarketError::InvalidCommissionRate);
        }
        start
            .checked_add(duration)
            .ok_or(MarketError::Overflow)?;

        let ledger = Self::ledger(&env)?;
        let id = ledger.create_option(
            &env.current_contract_address(),
            &title,
            &start,
            &duration,
            &commission_rate_bps,
        );

        log!(&env, "option added", id, start, duration, commission_rate_bps);
        env.events().publish(
            (symbol_short!("option"), id),
            (title, start, duration, commission_rate_bps),
        );

        Ok(id)
    }

    /// Stake `value` collateral on one side of an open option.
    ///
    /// # Arguments
    /// * `staker` - User staking (must authorize)
    /// * `id` - Option id
    /// * `go_long` - true for Long, false for Short
    /// * `value` - Gross collateral; commission is taken from it
    ///
    /// # Returns
    /// Net stake recorded on the position
    pub fn add_position(
        env: Env,
        staker: Address,
        id: u64,
        go_long: bool,
        value: i128,
    ) -> Result<i128, MarketError> {
        if value <= 0 {
            return Err(MarketError::InvalidAmount);
        }
        staker.require_auth();

        let ledger = Self::ledger(&env)?;
        let this = env.current_contract_address();
        let option = Self::load_option(&env, &ledger, id)?;

        let now = env.ledger().timestamp();
        if now < option.start {
            return Err(MarketError::OptionNotStarted);
        }
        if now >= settlement::expiry(&option)? {
            return Err(MarketError::OptionExpired);
        }
        if option.concluded {
            return Err(MarketError::AlreadyConcluded);
        }

        let (commission, net) = settlement::split_stake(value, option.commission_rate_bps)?;

        // Panics if the staker cannot cover `value`
        let token_client = token::Client::new(&env, &Self::collateral_token(&env)?);
        token_client.transfer(&staker, &this, &value);

        if commission > 0 {
            ledger.collect_commission(&this, &id, &commission);
        }
        ledger.create_position(&this, &id, &staker, &net, &go_long);

        env.events().publish(
            (symbol_short!("position"), id, staker),
            (go_long, net, commission),
        );

        Ok(net)
    }

    /// Amount `user` could withdraw from option `id` right now.
    pub fn claimable(env: Env, id: u64, user: Address) -> Result<i128, MarketError> {
        let ledger = Self::ledger(&env)?;
        let option = Self::load_option(&env, &ledger, id)?;
        if !option.concluded
            || env
                .storage()
                .persistent()
                .has(&DataKey::Withdrawn(id, user.clone()))
        {
            return Ok(0);
        }

        let position = ledger.read_position(&env.current_contract_address(), &id, &user);
        settlement::entitlement(&option, &position)
    }

    /// Pull the caller's winnings from a concluded option.
    ///
    /// # Returns
    /// Amount of collateral paid out
    pub fn withdraw(env: Env, user: Address, id: u64) -> Result<i128, MarketError> {
        user.require_auth();

        let ledger = Self::ledger(&env)?;
        let this = env.current_contract_address();
        let option = Self::load_option(&env, &ledger, id)?;
        if !option.concluded {
            return Err(MarketError::NotConcluded);
        }

        let key = DataKey::Withdrawn(id, user.clone());
        if env.storage().persistent().has(&key) {
            return Err(MarketError::AlreadyWithdrawn);
        }

        let position = ledger.read_position(&this, &id, &user);
        let amount = settlement::entitlement(&option, &position)?;
        if amount <= 0 {
            return Err(MarketError::NothingToWithdraw);
        }

        // Mark before paying out
        env.storage().persistent().set(&key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_AMOUNT);

        let token_client = token::Client::new(&env, &Self::collateral_token(&env)?);
        token_client.transfer(&this, &user, &amount);

        log!(&env, "withdrawn", id, user, amount);
        env.events()
            .publish((symbol_short!("withdrawn"), id, user), amount);

        Ok(amount)
    }

    // ---- Automation ----

    /// Whether any option is due for settlement, and which.
    pub fn scan(env: Env) -> Result<(bool, Vec<u64>), MarketError> {
        automation::scan(&env)
    }

    /// Conclude every option in `ids`. Reverts entirely if any one fails.
    pub fn execute(env: Env, ids: Vec<u64>) -> Result<(), MarketError> {
        automation::execute(&env, &ids)
    }

    // ---- Queries ----

    pub fn get_binary_option(env: Env, id: u64) -> Result<BinaryOption, MarketError> {
        let ledger = Self::ledger(&env)?;
        Self::load_option(&env, &ledger, id)
    }

    pub fn get_user_participated_options(
        env: Env,
        user: Address,
    ) -> Result<Vec<u64>, MarketError> {
        Ok(Self::ledger(&env)?.read_user_options(&env.current_contract_address(), &user))
    }

    pub fn get_active_binary_options(env: Env) -> Result<Vec<u64>, MarketError> {
        Ok(Self::ledger(&env)?.read_active_options(&env.current_contract_address()))
    }

    pub fn get_concluded_binary_options(env: Env) -> Result<Vec<u64>, MarketError> {
        Ok(Self::ledger(&env)?.read_concluded_options(&env.current_contract_address()))
    }

    pub fn get_user_long_position(env: Env, id: u64, user: Address) -> Result<i128, MarketError> {
        Ok(Self::position(&env, id, &user)?.long)
    }

    pub fn get_user_short_position(env: Env, id: u64, user: Address) -> Result<i128, MarketError> {
        Ok(Self::position(&env, id, &user)?.short)
    }

    // ---- Internal helpers ----

    fn require_owner(env: &Env, caller: &Address) -> Result<(), MarketError> {
        let owner = storage::address(env, &DataKey::Owner)?;
        if *caller != owner {
            return Err(MarketError::OnlyOwner);
        }
        caller.require_auth();
        Ok(())
    }

    fn require_owner_or_admin(env: &Env, caller: &Address) -> Result<(), MarketError> {
        let owner = storage::address(env, &DataKey::Owner)?;
        if *caller != owner && !Self::is_admin(env.clone(), caller.clone()) {
            return Err(MarketError::OnlyOwnerOrAdmin);
        }
        caller.require_auth();
        Ok(())
    }

    fn ledger<'a>(env: &Env) -> Result<LedgerClient<'a>, MarketError> {
        Ok(LedgerClient::new(env, &storage::address(env, &DataKey::Ledger)?))
    }

    fn collateral_token(env: &Env) -> Result<Address, MarketError> {
        storage::address(env, &DataKey::CollateralToken)
    }

    /// Fetch an option from the ledger, mapping a missing id to
    /// `OptionNotFound` instead of aborting.
    fn load_option(env: &Env, ledger: &LedgerClient, id: u64) -> Result<BinaryOption, MarketError> {
        match ledger.try_read_option(&env.current_contract_address(), &id) {
            Ok(Ok(option)) => Ok(option),
            _ => Err(MarketError::OptionNotFound),
        }
    }

    fn position(env: &Env, id: u64, user: &Address) -> Result<Position, MarketError> {
        let ledger = Self::ledger(env)?;
        Self::load_option(env, &ledger, id)?;
        Ok(ledger.read_position(&env.current_contract_address(), &id, user))
    }
}
