#![no_std]

mod accrual;
mod checkpoints;
mod error;
mod storage;

pub use error::CommissionError;
pub use storage::{Checkpoint, ClaimCursor, CommissionEpoch};

use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, symbol_short, token, Address, Env, String, Vec,
};
use storage::{DataKey, BUMP_AMOUNT, BUMP_THRESHOLD, DECIMALS, SCALE_FACTOR};

/// Commission Token Contract
///
/// A capped, transferable token whose holders share the trading commission
/// collected by the market.
///
/// Key features:
/// - Commission is bucketed into fixed-length periods (epochs)
/// - Each epoch snapshots the total supply at its first distribution
/// - Every balance change is checkpointed so past balances can be recovered
/// - Holders claim their pro-rata share of every epoch since their last claim
#[contract]
pub struct CommissionToken;

#[contractimpl]
impl CommissionToken {
    /// Constructor: mints `initial_supply` to the owner.
    ///
    /// # Arguments
    /// * `owner` - Address that mints, sets the cap, rate and market
    /// * `collateral_token` - Token commission is paid in
    /// * `cap` - Maximum total supply
    /// * `initial_supply` - Tokens minted to the owner at deployment
    /// * `period_duration` - Length of one commission period in seconds
    /// * `exchange_rate` - Collateral units per whole token for `buy`
    #[allow(clippy::too_many_arguments)]
    pub fn __constructor(
        env: Env,
        owner: Address,
        collateral_token: Address,
        name: String,
        symbol: String,
        cap: i128,
        initial_supply: i128,
        period_duration: u64,
        exchange_rate: i128,
    ) {
        if cap <= 0 {
            panic_with_error!(&env, CommissionError::InvalidCap);
        }
        if period_duration == 0 {
            panic_with_error!(&env, CommissionError::InvalidPeriod);
        }
        if exchange_rate <= 0 {
            panic_with_error!(&env, CommissionError::InvalidExchangeRate);
        }
        if initial_supply < 0 {
            panic_with_error!(&env, CommissionError::InvalidAmount);
        }

        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage()
            .instance()
            .set(&DataKey::CollateralToken, &collateral_token);
        env.storage().instance().set(&DataKey::Name, &name);
        env.storage().instance().set(&DataKey::Symbol, &symbol);
        env.storage().instance().set(&DataKey::Cap, &cap);
        env.storage().instance().set(&DataKey::TotalSupply, &0i128);
        env.storage()
            .instance()
            .set(&DataKey::ExchangeRate, &exchange_rate);
        env.storage()
            .instance()
            .set(&DataKey::Genesis, &env.ledger().timestamp());
        env.storage()
            .instance()
            .set(&DataKey::PeriodDuration, &period_duration);

        if initial_supply > 0 {
            if let Err(err) = Self::mint_to(&env, &owner, initial_supply) {
                panic_with_error!(&env, err);
            }
        }
    }

    // --- Administration (owner only) ---

    /// Set the market contract allowed to distribute commission.
    pub fn set_market(env: Env, caller: Address, market: Address) -> Result<(), CommissionError> {
        Self::require_owner(&env, &caller)?;

        caller.require_auth();

        env.storage().instance().set(&DataKey::Market, &market);
        env.storage().instance().extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);

        Ok(())
    }

    pub fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), CommissionError> {
        Self::require_owner(&env, &caller)?;

        caller.require_auth();

        Self::mint_to(&env, &to, amount)?;
        env.events().publish((symbol_short!("mint"), to), amount);

        Ok(())
    }

    /// Change the supply cap. Must stay positive and cover the circulating supply.
    pub fn update_cap(env: Env, caller: Address, cap: i128) -> Result<(), CommissionError> {
        Self::require_owner(&env, &caller)?;

        caller.require_auth();

        if cap <= 0 || cap < Self::read_total_supply(&env)? {
            return Err(CommissionError::InvalidCap);
        }

        env.storage().instance().set(&DataKey::Cap, &cap);

        Ok(())
    }

    pub fn update_exchange_rate(
        env: Env,
        caller: Address,
        exchange_rate: i128,
    ) -> Result<(), CommissionError> {
        Self::require_owner(&env, &caller)?;

        caller.require_auth();

        if exchange_rate <= 0 {
            return Err(CommissionError::InvalidExchangeRate);
        }

        env.storage()
            .instance()
            .set(&DataKey::ExchangeRate, &exchange_rate);

        Ok(())
    }

    // --- Token ---

    /// Buy freshly minted tokens with collateral. The payment goes to the owner.
    ///
    /// # Returns
    /// Number of tokens minted
    pub fn buy(env: Env, buyer: Address, payment: i128) -> Result<i128, CommissionError> {
        buyer.require_auth();

        if payment <= 0 {
            return Err(CommissionError::InvalidAmount);
        }

        let exchange_rate: i128 = env
            .storage()
            .instance()
            .get(&DataKey::ExchangeRate)
            .ok_or(CommissionError::StorageCorrupted)?;
        let tokens = accrual::tokens_for_payment(payment, exchange_rate, SCALE_FACTOR)?;

        Self::mint_to(&env, &buyer, tokens)?;

        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(CommissionError::StorageCorrupted)?;
        let token_client = token::Client::new(&env, &Self::collateral_token(&env)?);
        token_client.transfer(&buyer, &owner, &payment);

        env.events()
            .publish((symbol_short!("buy"), buyer), (payment, tokens));

        Ok(tokens)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), CommissionError> {
        from.require_auth();

        if amount <= 0 {
            return Err(CommissionError::InvalidAmount);
        }

        let from_balance = Self::read_balance(&env, &from);
        if from_balance < amount {
            return Err(CommissionError::InsufficientBalance);
        }
        Self::write_balance(&env, &from, from_balance - amount)?;

        let to_balance = Self::read_balance(&env, &to);
        let to_balance = to_balance
            .checked_add(amount)
            .ok_or(CommissionError::Overflow)?;
        Self::write_balance(&env, &to, to_balance)?;

        env.events()
            .publish((symbol_short!("transfer"), from, to), amount);

        Ok(())
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        Self::read_balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> Result<i128, CommissionError> {
        Self::read_total_supply(&env)
    }

    pub fn cap(env: Env) -> Result<i128, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::Cap)
            .ok_or(CommissionError::StorageCorrupted)
    }

    pub fn exchange_rate(env: Env) -> Result<i128, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::ExchangeRate)
            .ok_or(CommissionError::StorageCorrupted)
    }

    pub fn name(env: Env) -> Result<String, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::Name)
            .ok_or(CommissionError::StorageCorrupted)
    }

    pub fn symbol(env: Env) -> Result<String, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::Symbol)
            .ok_or(CommissionError::StorageCorrupted)
    }

    pub fn decimals(_env: Env) -> u32 {
        DECIMALS
    }

    /// Current holders with a non-zero balance.
    pub fn holders(env: Env) -> Vec<Address> {
        Self::read_holders(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(CommissionError::StorageCorrupted)
    }

    pub fn get_market(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Market)
    }

    // --- Commission ---

    /// Register commission that the market has already transferred to this contract.
    ///
    /// The first distribution of a period opens its epoch and snapshots the
    /// total supply; later ones in the same period only add to `accrued`.
    pub fn distribute_commission(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), CommissionError> {
        Self::require_market(&env, &caller)?;

        caller.require_auth();

        if amount <= 0 {
            return Err(CommissionError::InvalidAmount);
        }

        let period = Self::period_now(&env)?;
        let key = DataKey::Epoch(period);
        let existing: Option<CommissionEpoch> = env.storage().persistent().get(&key);
        let mut epoch = match existing {
            Some(epoch) => epoch,
            None => {
                let mut periods = Self::read_epoch_periods(&env);
                periods.push_back(period);
                env.storage()
                    .persistent()
                    .set(&DataKey::EpochPeriods, &periods);
                env.storage().persistent().extend_ttl(
                    &DataKey::EpochPeriods,
                    BUMP_THRESHOLD,
                    BUMP_AMOUNT,
                );

                CommissionEpoch {
                    total_supply: Self::read_total_supply(&env)?,
                    accrued: 0,
                }
            }
        };

        epoch.accrued = epoch
            .accrued
            .checked_add(amount)
            .ok_or(CommissionError::Overflow)?;
        env.storage().persistent().set(&key, &epoch);
        env.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_AMOUNT);

        log!(&env, "commission distributed", period, amount, epoch.total_supply);
        env.events()
            .publish((symbol_short!("distrib"), period), amount);

        Ok(())
    }

    /// Claim every epoch share accrued since the holder's last claim.
    ///
    /// # Returns
    /// Amount of collateral paid out
    pub fn claim_commission(env: Env, holder: Address) -> Result<i128, CommissionError> {
        holder.require_auth();

        let (amount, cursor) = Self::accrue(&env, &holder)?;
        if amount <= 0 {
            return Err(CommissionError::NothingToClaim);
        }

        let cursor_key = DataKey::ClaimCursor(holder.clone());
        env.storage().persistent().set(&cursor_key, &cursor);
        env.storage()
            .persistent()
            .extend_ttl(&cursor_key, BUMP_THRESHOLD, BUMP_AMOUNT);

        let token_client = token::Client::new(&env, &Self::collateral_token(&env)?);
        token_client.transfer(&env.current_contract_address(), &holder, &amount);

        log!(&env, "commission claimed", holder, amount);
        env.events()
            .publish((symbol_short!("claimed"), holder), amount);

        Ok(amount)
    }

    /// Amount `claim_commission` would pay right now.
    pub fn pending_commission(env: Env, holder: Address) -> Result<i128, CommissionError> {
        let (amount, _) = Self::accrue(&env, &holder)?;
        Ok(amount)
    }

    pub fn current_period(env: Env) -> Result<u64, CommissionError> {
        Self::period_now(&env)
    }

    pub fn epoch(env: Env, period: u64) -> Option<CommissionEpoch> {
        env.storage().persistent().get(&DataKey::Epoch(period))
    }

    /// Periods that received a distribution, ascending.
    pub fn epoch_periods(env: Env) -> Vec<u64> {
        Self::read_epoch_periods(&env)
    }

    /// Balance the holder is credited with for `period`'s epoch.
    pub fn balance_at(env: Env, holder: Address, period: u64) -> i128 {
        checkpoints::balance_at(&Self::read_history(&env, &holder), period)
    }

    pub fn claim_cursor(env: Env, holder: Address) -> ClaimCursor {
        env.storage()
            .persistent()
            .get(&DataKey::ClaimCursor(holder))
            .unwrap_or_default()
    }

    // --- Internal helpers ---

    fn require_owner(env: &Env, caller: &Address) -> Result<(), CommissionError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(CommissionError::StorageCorrupted)?;
        if *caller != owner {
            return Err(CommissionError::OnlyOwner);
        }
        Ok(())
    }

    fn require_market(env: &Env, caller: &Address) -> Result<(), CommissionError> {
        let market: Option<Address> = env.storage().instance().get(&DataKey::Market);
        match market {
            Some(market) if market == *caller => Ok(()),
            _ => Err(CommissionError::OnlyMarket),
        }
    }

    fn collateral_token(env: &Env) -> Result<Address, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::CollateralToken)
            .ok_or(CommissionError::StorageCorrupted)
    }

    fn period_now(env: &Env) -> Result<u64, CommissionError> {
        let genesis: u64 = env
            .storage()
            .instance()
            .get(&DataKey::Genesis)
            .ok_or(CommissionError::StorageCorrupted)?;
        let period_duration: u64 = env
            .storage()
            .instance()
            .get(&DataKey::PeriodDuration)
            .ok_or(CommissionError::StorageCorrupted)?;
        accrual::period_of(env.ledger().timestamp(), genesis, period_duration)
    }

    fn read_total_supply(env: &Env) -> Result<i128, CommissionError> {
        env.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .ok_or(CommissionError::StorageCorrupted)
    }

    fn read_balance(env: &Env, holder: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(holder.clone()))
            .unwrap_or(0)
    }

    fn read_holders(env: &Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Holders)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn read_history(env: &Env, holder: &Address) -> Vec<Checkpoint> {
        env.storage()
            .persistent()
            .get(&DataKey::Checkpoints(holder.clone()))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn read_epoch_periods(env: &Env) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::EpochPeriods)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn mint_to(env: &Env, to: &Address, amount: i128) -> Result<(), CommissionError> {
        if amount <= 0 {
            return Err(CommissionError::InvalidAmount);
        }

        let cap: i128 = env
            .storage()
            .instance()
            .get(&DataKey::Cap)
            .ok_or(CommissionError::StorageCorrupted)?;
        let supply = Self::read_total_supply(env)?
            .checked_add(amount)
            .ok_or(CommissionError::Overflow)?;
        if supply > cap {
            return Err(CommissionError::CapExceeded);
        }
        env.storage().instance().set(&DataKey::TotalSupply, &supply);
        env.storage().instance().extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);

        let balance = Self::read_balance(env, to)
            .checked_add(amount)
            .ok_or(CommissionError::Overflow)?;
        Self::write_balance(env, to, balance)
    }

    /// Store a new balance, keeping the holder set and checkpoints in step.
    fn write_balance(env: &Env, holder: &Address, balance: i128) -> Result<(), CommissionError> {
        let previous = Self::read_balance(env, holder);

        let balance_key = DataKey::Balance(holder.clone());
        env.storage().persistent().set(&balance_key, &balance);
        env.storage()
            .persistent()
            .extend_ttl(&balance_key, BUMP_THRESHOLD, BUMP_AMOUNT);

        if previous == 0 && balance > 0 {
            let mut holders = Self::read_holders(env);
            holders.push_back(holder.clone());
            Self::save_holders(env, &holders);
        } else if previous > 0 && balance == 0 {
            let mut holders = Self::read_holders(env);
            if let Some(index) = holders.first_index_of(holder) {
                holders.remove(index);
            }
            Self::save_holders(env, &holders);
        }

        // An epoch that already took its snapshot this period must keep
        // seeing the old balance, so the change takes effect next period.
        let period = Self::period_now(env)?;
        let effective = if env.storage().persistent().has(&DataKey::Epoch(period)) {
            period.checked_add(1).ok_or(CommissionError::Overflow)?
        } else {
            period
        };

        let history_key = DataKey::Checkpoints(holder.clone());
        let mut history = Self::read_history(env, holder);
        checkpoints::record(&mut history, effective, balance);
        env.storage().persistent().set(&history_key, &history);
        env.storage()
            .persistent()
            .extend_ttl(&history_key, BUMP_THRESHOLD, BUMP_AMOUNT);

        Ok(())
    }

    fn save_holders(env: &Env, holders: &Vec<Address>) {
        env.storage().persistent().set(&DataKey::Holders, holders);
        env.storage()
            .persistent()
            .extend_ttl(&DataKey::Holders, BUMP_THRESHOLD, BUMP_AMOUNT);
    }

    /// Sum owed across epochs since the cursor, and the cursor after paying it.
    fn accrue(env: &Env, holder: &Address) -> Result<(i128, ClaimCursor), CommissionError> {
        let current = Self::period_now(env)?;
        let cursor: ClaimCursor = env
            .storage()
            .persistent()
            .get(&DataKey::ClaimCursor(holder.clone()))
            .unwrap_or_default();
        let periods = Self::read_epoch_periods(env);
        let history = Self::read_history(env, holder);

        let mut total: i128 = 0;
        let mut paid_current: i128 = 0;
        let mut index = checkpoints::first_at_or_after(&periods, cursor.period);
        while index < periods.len() {
            let period = periods.get_unchecked(index);
            if period > current {
                break;
            }

            let epoch: CommissionEpoch = env
                .storage()
                .persistent()
                .get(&DataKey::Epoch(period))
                .ok_or(CommissionError::StorageCorrupted)?;
            let balance = checkpoints::balance_at(&history, period);
            let share = accrual::share_of(epoch.accrued, balance, epoch.total_supply)?;

            let owed = if period == cursor.period {
                share
                    .checked_sub(cursor.paid)
                    .ok_or(CommissionError::Overflow)?
            } else {
                share
            };
            total = total.checked_add(owed).ok_or(CommissionError::Overflow)?;

            if period == current {
                paid_current = share;
            }
            index += 1;
        }

        Ok((
            total,
            ClaimCursor {
                period: current,
                paid: paid_current,
            },
        ))
    }
}

#[cfg(test)]
mod test;
