use super::*;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::StellarAssetClient,
    Env,
};

const CAP: i128 = 100 * SCALE_FACTOR;
const PERIOD_DURATION: u64 = 10;
/// 1 collateral unit buys 1000 tokens
const EXCHANGE_RATE: i128 = SCALE_FACTOR / 1000;
const COMMISSIONS: i128 = 100_000_000_000;

struct Setup {
    env: Env,
    client: CommissionTokenClient<'static>,
    owner: Address,
    market: Address,
    collateral: Address,
}

/// Register the token with the whole cap minted to the owner.
fn setup_test() -> Setup {
    setup_test_with_supply(CAP, CAP)
}

fn setup_test_with_supply(cap: i128, initial_supply: i128) -> Setup {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let market = Address::generate(&env);

    let token_admin = Address::generate(&env);
    let collateral = env
        .register_stellar_asset_contract_v2(token_admin)
        .address();

    let contract_id = env.register(
        CommissionToken,
        (
            owner.clone(),
            collateral.clone(),
            String::from_str(&env, "CommissionToken"),
            String::from_str(&env, "CT"),
            cap,
            initial_supply,
            PERIOD_DURATION,
            EXCHANGE_RATE,
        ),
    );
    let client = CommissionTokenClient::new(&env, &contract_id);
    client.set_market(&owner, &market);

    Setup {
        env,
        client,
        owner,
        market,
        collateral,
    }
}

/// Send collateral to the token the way the market does, then register it.
fn distribute(s: &Setup, amount: i128) {
    StellarAssetClient::new(&s.env, &s.collateral).mint(&s.client.address, &amount);
    s.client.distribute_commission(&s.market, &amount);
}

fn collateral_balance(s: &Setup, id: &Address) -> i128 {
    token::Client::new(&s.env, &s.collateral).balance(id)
}

#[test]
fn test_initialize() {
    let s = setup_test();

    assert_eq!(s.client.name(), String::from_str(&s.env, "CommissionToken"));
    assert_eq!(s.client.symbol(), String::from_str(&s.env, "CT"));
    assert_eq!(s.client.decimals(), 7);
    assert_eq!(s.client.cap(), CAP);
    assert_eq!(s.client.exchange_rate(), EXCHANGE_RATE);
    assert_eq!(s.client.total_supply(), CAP);
    assert_eq!(s.client.balance(&s.owner), CAP);
    assert_eq!(s.client.get_owner(), s.owner);
    assert_eq!(s.client.get_market(), Some(s.market.clone()));
    assert_eq!(s.client.current_period(), 0);

    let holders = s.client.holders();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders.get(0), Some(s.owner.clone()));
}

// --- Commission distribution ---

#[test]
fn test_distribute_among_existing_holders() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);

    s.client.transfer(&s.owner, &user1, &(50 * SCALE_FACTOR));
    distribute(&s, COMMISSIONS);

    s.env.ledger().set_timestamp(60);

    assert_eq!(s.client.claim_commission(&s.owner), COMMISSIONS / 2);
    assert_eq!(s.client.claim_commission(&user1), COMMISSIONS / 2);

    assert_eq!(collateral_balance(&s, &s.owner), COMMISSIONS / 2);
    assert_eq!(collateral_balance(&s, &user1), COMMISSIONS / 2);
    assert_eq!(collateral_balance(&s, &s.client.address), 0);
}

#[test]
fn test_distribute_among_new_holders() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);
    let user2 = Address::generate(&s.env);

    s.client.transfer(&s.owner, &user1, &(50 * SCALE_FACTOR));
    distribute(&s, COMMISSIONS);

    s.env.ledger().set_timestamp(60);
    s.client.transfer(&s.owner, &user2, &(20 * SCALE_FACTOR));

    // user2 held nothing when the only epoch so far was snapshotted
    s.env.ledger().set_timestamp(120);
    assert_eq!(
        s.client.try_claim_commission(&user2),
        Err(Ok(CommissionError::NothingToClaim))
    );

    s.env.ledger().set_timestamp(180);
    distribute(&s, COMMISSIONS);

    s.env.ledger().set_timestamp(240);
    assert_eq!(s.client.claim_commission(&user2), 20_000_000_000);

    // Owner: half of the first epoch plus 30% of the second
    assert_eq!(s.client.claim_commission(&s.owner), 80_000_000_000);
    // user1: half of both
    assert_eq!(s.client.claim_commission(&user1), 100_000_000_000);
}

#[test]
#[should_panic(expected = "Error(Contract, #9)")] // NothingToClaim = 9
fn test_second_claim_without_distribution_fails() {
    let s = setup_test();
    distribute(&s, COMMISSIONS);

    s.env.ledger().set_timestamp(30);
    assert_eq!(s.client.claim_commission(&s.owner), COMMISSIONS);

    s.env.ledger().set_timestamp(60);
    s.client.claim_commission(&s.owner);
}

#[test]
fn test_claim_without_balance_fails() {
    let s = setup_test();
    distribute(&s, COMMISSIONS);

    let stranger = Address::generate(&s.env);
    assert_eq!(
        s.client.try_claim_commission(&stranger),
        Err(Ok(CommissionError::NothingToClaim))
    );
}

#[test]
fn test_later_distribution_in_same_period_is_claimable() {
    let s = setup_test();

    s.env.ledger().set_timestamp(1);
    distribute(&s, 1_000);

    s.env.ledger().set_timestamp(3);
    assert_eq!(s.client.claim_commission(&s.owner), 1_000);
    assert_eq!(
        s.client.claim_cursor(&s.owner),
        ClaimCursor {
            period: 0,
            paid: 1_000
        }
    );

    // Same period: only the new amount is owed
    s.env.ledger().set_timestamp(5);
    distribute(&s, 500);
    assert_eq!(s.client.pending_commission(&s.owner), 500);
    assert_eq!(s.client.claim_commission(&s.owner), 500);

    let epoch = s.client.epoch(&0).unwrap();
    assert_eq!(epoch.accrued, 1_500);
    assert_eq!(epoch.total_supply, CAP);
    assert_eq!(s.client.epoch_periods().len(), 1);
}

#[test]
fn test_transfer_after_snapshot_takes_effect_next_period() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);

    s.env.ledger().set_timestamp(1);
    distribute(&s, 1_000);

    // Still period 0, after its snapshot
    s.env.ledger().set_timestamp(2);
    s.client.transfer(&s.owner, &user1, &(40 * SCALE_FACTOR));
    distribute(&s, 1_000);

    assert_eq!(s.client.balance_at(&s.owner, &0), CAP);
    assert_eq!(s.client.balance_at(&user1, &0), 0);
    assert_eq!(s.client.balance_at(&s.owner, &1), 60 * SCALE_FACTOR);
    assert_eq!(s.client.balance_at(&user1, &1), 40 * SCALE_FACTOR);

    // Period 1 epoch sees the new split
    s.env.ledger().set_timestamp(12);
    distribute(&s, 1_000);

    s.env.ledger().set_timestamp(25);
    assert_eq!(s.client.claim_commission(&s.owner), 2_000 + 600);
    assert_eq!(s.client.claim_commission(&user1), 400);
    assert_eq!(collateral_balance(&s, &s.client.address), 0);
}

#[test]
fn test_epoch_snapshot_taken_at_first_distribution() {
    let s = setup_test_with_supply(CAP, 50 * SCALE_FACTOR);
    let user1 = Address::generate(&s.env);

    s.env.ledger().set_timestamp(1);
    distribute(&s, 1_000);
    // Minted after the snapshot: counts from period 1
    s.client.mint(&s.owner, &user1, &(50 * SCALE_FACTOR));
    distribute(&s, 1_000);

    let epoch = s.client.epoch(&0).unwrap();
    assert_eq!(epoch.total_supply, 50 * SCALE_FACTOR);
    assert_eq!(epoch.accrued, 2_000);

    s.env.ledger().set_timestamp(15);
    assert_eq!(s.client.claim_commission(&s.owner), 2_000);
    assert_eq!(
        s.client.try_claim_commission(&user1),
        Err(Ok(CommissionError::NothingToClaim))
    );
}

#[test]
fn test_claims_never_exceed_distributed() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);
    let user2 = Address::generate(&s.env);

    s.client.transfer(&s.owner, &user1, &(33 * SCALE_FACTOR));
    s.client.transfer(&s.owner, &user2, &(33 * SCALE_FACTOR));
    distribute(&s, 1_000);

    s.env.ledger().set_timestamp(10);
    let total = s.client.claim_commission(&s.owner)
        + s.client.claim_commission(&user1)
        + s.client.claim_commission(&user2);

    // 340 + 330 + 330
    assert_eq!(total, 1_000);
    assert_eq!(collateral_balance(&s, &s.client.address), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #2)")] // OnlyMarket = 2
fn test_only_market_can_distribute() {
    let s = setup_test();
    s.client.distribute_commission(&s.owner, &COMMISSIONS);
}

#[test]
fn test_distribute_zero_fails() {
    let s = setup_test();
    assert_eq!(
        s.client.try_distribute_commission(&s.market, &0),
        Err(Ok(CommissionError::InvalidAmount))
    );
}

#[test]
fn test_set_market_by_non_owner_fails() {
    let s = setup_test();
    let user = Address::generate(&s.env);
    assert_eq!(
        s.client.try_set_market(&user, &user),
        Err(Ok(CommissionError::OnlyOwner))
    );
}

// --- Holders and transfers ---

#[test]
fn test_holders_track_non_zero_balances() {
    let s = setup_test_with_supply(CAP, 0);
    let user1 = Address::generate(&s.env);
    let user2 = Address::generate(&s.env);

    assert!(s.client.holders().is_empty());

    s.client.mint(&s.owner, &s.owner, &(10 * SCALE_FACTOR));
    s.client.mint(&s.owner, &user1, &(10 * SCALE_FACTOR));
    assert_eq!(s.client.holders().len(), 2);

    s.client.transfer(&user1, &user2, &(10 * SCALE_FACTOR));

    let holders = s.client.holders();
    assert_eq!(holders.len(), 2);
    assert!(holders.contains(&s.owner));
    assert!(holders.contains(&user2));
    assert!(!holders.contains(&user1));
    assert_eq!(s.client.balance(&user1), 0);
    assert_eq!(s.client.balance(&user2), 10 * SCALE_FACTOR);
}

#[test]
#[should_panic(expected = "Error(Contract, #8)")] // InsufficientBalance = 8
fn test_transfer_insufficient_balance() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);
    s.client.transfer(&user1, &s.owner, &1);
}

#[test]
fn test_transfer_zero_fails() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);
    assert_eq!(
        s.client.try_transfer(&s.owner, &user1, &0),
        Err(Ok(CommissionError::InvalidAmount))
    );
}

// --- Supply management ---

#[test]
fn test_mint_respects_cap() {
    let s = setup_test_with_supply(CAP, 90 * SCALE_FACTOR);
    let user1 = Address::generate(&s.env);

    s.client.mint(&s.owner, &user1, &(10 * SCALE_FACTOR));
    assert_eq!(s.client.total_supply(), CAP);

    assert_eq!(
        s.client.try_mint(&s.owner, &user1, &1),
        Err(Ok(CommissionError::CapExceeded))
    );
}

#[test]
fn test_mint_guards() {
    let s = setup_test_with_supply(CAP, 0);
    let user1 = Address::generate(&s.env);

    assert_eq!(
        s.client.try_mint(&user1, &user1, &SCALE_FACTOR),
        Err(Ok(CommissionError::OnlyOwner))
    );
    assert_eq!(
        s.client.try_mint(&s.owner, &user1, &0),
        Err(Ok(CommissionError::InvalidAmount))
    );
}

#[test]
fn test_update_cap() {
    let s = setup_test_with_supply(CAP, SCALE_FACTOR);
    let user1 = Address::generate(&s.env);

    assert_eq!(
        s.client.try_update_cap(&user1, &CAP),
        Err(Ok(CommissionError::OnlyOwner))
    );
    assert_eq!(
        s.client.try_update_cap(&s.owner, &0),
        Err(Ok(CommissionError::InvalidCap))
    );
    // Below the circulating supply
    assert_eq!(
        s.client.try_update_cap(&s.owner, &1),
        Err(Ok(CommissionError::InvalidCap))
    );

    s.client.update_cap(&s.owner, &(10 * SCALE_FACTOR));
    assert_eq!(s.client.cap(), 10 * SCALE_FACTOR);
}

#[test]
fn test_update_exchange_rate() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);

    assert_eq!(
        s.client.try_update_exchange_rate(&user1, &1),
        Err(Ok(CommissionError::OnlyOwner))
    );
    assert_eq!(
        s.client.try_update_exchange_rate(&s.owner, &0),
        Err(Ok(CommissionError::InvalidExchangeRate))
    );

    s.client.update_exchange_rate(&s.owner, &SCALE_FACTOR);
    assert_eq!(s.client.exchange_rate(), SCALE_FACTOR);
}

#[test]
fn test_buy_mints_at_exchange_rate() {
    let s = setup_test_with_supply(10_000 * SCALE_FACTOR, 0);
    let buyer = Address::generate(&s.env);
    StellarAssetClient::new(&s.env, &s.collateral).mint(&buyer, &(5 * SCALE_FACTOR));

    let minted = s.client.buy(&buyer, &SCALE_FACTOR);

    assert_eq!(minted, 1000 * SCALE_FACTOR);
    assert_eq!(s.client.balance(&buyer), 1000 * SCALE_FACTOR);
    assert_eq!(collateral_balance(&s, &buyer), 4 * SCALE_FACTOR);
    assert_eq!(collateral_balance(&s, &s.owner), SCALE_FACTOR);
    // Purchase proceeds never enter the commission pool
    assert_eq!(collateral_balance(&s, &s.client.address), 0);
}

#[test]
fn test_buy_guards() {
    let s = setup_test_with_supply(100 * SCALE_FACTOR, 0);
    let buyer = Address::generate(&s.env);
    StellarAssetClient::new(&s.env, &s.collateral).mint(&buyer, &(5 * SCALE_FACTOR));

    assert_eq!(
        s.client.try_buy(&buyer, &0),
        Err(Ok(CommissionError::InvalidAmount))
    );
    // 1 collateral unit buys 1000 tokens, cap is 100
    assert_eq!(
        s.client.try_buy(&buyer, &SCALE_FACTOR),
        Err(Ok(CommissionError::CapExceeded))
    );
}

#[test]
fn test_floor_dust_stays_in_contract() {
    let s = setup_test();
    let user1 = Address::generate(&s.env);
    let user2 = Address::generate(&s.env);

    s.client.transfer(&s.owner, &user1, &(30 * SCALE_FACTOR));
    s.client.transfer(&s.owner, &user2, &(30 * SCALE_FACTOR));
    distribute(&s, 1_001);

    s.env.ledger().set_timestamp(10);
    assert_eq!(s.client.claim_commission(&s.owner), 400);
    assert_eq!(s.client.claim_commission(&user1), 300);
    assert_eq!(s.client.claim_commission(&user2), 300);
    assert_eq!(collateral_balance(&s, &s.client.address), 1);
}
