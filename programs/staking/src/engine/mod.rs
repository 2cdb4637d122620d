//! Accounting engine: the state transitions behind every pool instruction.
//!
//! Every operation works on copies of the records it touches, runs all
//! fallible arithmetic first, then performs the single ledger transfer, and
//! only writes the copies back once that transfer succeeded. A failed
//! operation therefore leaves records and ledger exactly as they were.

pub mod authority;
pub mod invariants;

pub use invariants::verify_pool;

use crate::{
    check,
    constants::{STAKING_PAUSED, WITHDRAWALS_PAUSED},
    math_error,
    prelude::*,
    state::pool::{PoolBumps, RewardCredit},
};
use anchor_lang::prelude::*;

/// Invoking identity plus the token holding the operation debits or credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub key: Pubkey,
    pub holding: Pubkey,
}

impl Caller {
    pub fn new(key: Pubkey, holding: Pubkey) -> Self {
        Self { key, holding }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeReceipt {
    pub amount: u64,
    /// The stake record was created by this operation
    pub created: bool,
    pub user_amount: u64,
    pub effective_balance: u64,
    pub total_staked: u64,
    pub custody_balance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionReceipt {
    pub amount: u64,
    pub credit: RewardCredit,
    pub reward_per_share: u128,
    pub total_staked: u64,
    pub custody_balance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub amount: u64,
    pub from_rewards: u64,
    pub from_principal: u64,
    pub user_amount: u64,
    pub effective_balance: u64,
    pub total_staked: u64,
    pub custody_balance: u64,
}

/// Create the pool record. `custody` is the holding that will escrow every
/// staked and rewarded unit; no tokens move here.
pub fn initialize(
    pool: &mut Pool,
    owner: Pubkey,
    mint: Pubkey,
    custody: Pubkey,
    bumps: PoolBumps,
) -> StakingResult {
    check!(!pool.is_initialized(), StakingError::AlreadyInitialized);
    check!(
        owner != Pubkey::default() && custody != Pubkey::default(),
        StakingError::InvalidPoolConfig
    );

    let mut next_pool = pool.clone();
    next_pool.set_initial_configuration(owner, mint, custody, bumps);
    next_pool.increment_revision()?;

    *pool = next_pool;

    Ok(())
}

/// Move `amount` from the caller's holding into custody and credit it to the
/// caller's stake record, creating the record on first use.
///
/// `user_stake` is the record at the caller's derived address; a zeroed
/// record means none exists yet and it is initialized with `user_stake_bump`.
pub fn stake<L: TokenLedger>(
    ledger: &mut L,
    pool_pk: Pubkey,
    pool: &mut Pool,
    user_stake: &mut UserStake,
    user_stake_bump: u8,
    caller: Caller,
    amount: u64,
) -> StakingResult<StakeReceipt> {
    check!(amount > 0, StakingError::InvalidAmount);
    check!(pool.is_initialized(), StakingError::NotFound, "Pool is not initialized");
    pool.assert_not_paused(STAKING_PAUSED)?;
    authority::require_external_holding(pool, &caller.holding)?;

    let mut next_pool = pool.clone();
    let mut next_stake = user_stake.clone();

    let created = !next_stake.is_initialized();
    if created {
        next_stake.initialize(caller.key, pool_pk, &next_pool, user_stake_bump);
    } else {
        authority::require_stake_owner(&next_stake, &pool_pk, &caller.key)?;
    }

    next_stake.settle(&next_pool)?;
    next_stake.deposit(amount)?;
    next_pool.increase_total_staked(amount)?;
    next_pool.increment_revision()?;
    next_stake.increment_revision()?;

    ledger.transfer(&caller.holding, &pool.token_holding, amount)?;
    let custody_balance = ledger.balance(&pool.token_holding)?;

    let receipt = StakeReceipt {
        amount,
        created,
        user_amount: next_stake.amount,
        effective_balance: next_stake.effective_balance(&next_pool)?,
        total_staked: next_pool.total_staked,
        custody_balance,
    };

    *pool = next_pool;
    *user_stake = next_stake;

    msg!(
        "Staked {} for {}, total staked {}",
        amount,
        caller.key,
        receipt.total_staked
    );

    Ok(receipt)
}

/// Owner-funded reward injection, shared pro rata by current stakers through
/// the reward-per-share accumulator. Succeeds with no stakers; the funds then
/// wait in custody for the next distribution.
pub fn distribute_rewards<L: TokenLedger>(
    ledger: &mut L,
    pool: &mut Pool,
    caller: Caller,
    amount: u64,
) -> StakingResult<DistributionReceipt> {
    authority::require_pool_owner(pool, &caller.key)?;
    check!(amount > 0, StakingError::InvalidAmount);
    authority::require_external_holding(pool, &caller.holding)?;

    let mut next_pool = pool.clone();
    let credit = next_pool.credit_rewards(amount)?;
    next_pool.increment_revision()?;

    ledger.transfer(&caller.holding, &pool.token_holding, amount)?;
    let custody_balance = ledger.balance(&pool.token_holding)?;

    *pool = next_pool;

    msg!(
        "Distributed {} reward units ({} released, {} deferred), reward per share {}",
        amount,
        credit.released,
        credit.deferred,
        pool.reward_per_share
    );

    Ok(DistributionReceipt {
        amount,
        credit,
        reward_per_share: pool.reward_per_share,
        total_staked: pool.total_staked,
        custody_balance,
    })
}

/// Pay `amount` out of custody to the caller, drawing on settled rewards
/// first and principal second.
///
/// Custody below `total_staked` means earlier state was corrupted and is
/// reported as `CustodyInvariantViolated`, never as a user error.
pub fn withdraw<L: TokenLedger>(
    ledger: &mut L,
    pool_pk: Pubkey,
    pool: &mut Pool,
    user_stake: Option<&mut UserStake>,
    caller: Caller,
    amount: u64,
) -> StakingResult<WithdrawReceipt> {
    check!(amount > 0, StakingError::InvalidAmount);
    check!(pool.is_initialized(), StakingError::NotFound, "Pool is not initialized");
    pool.assert_not_paused(WITHDRAWALS_PAUSED)?;

    let user_stake = user_stake
        .filter(|user_stake| user_stake.is_initialized())
        .ok_or_else(|| {
            msg!("No stake record for {}", caller.key);
            StakingError::NotFound
        })?;
    authority::require_stake_owner(user_stake, &pool_pk, &caller.key)?;
    authority::require_external_holding(pool, &caller.holding)?;

    let mut next_pool = pool.clone();
    let mut next_stake = user_stake.clone();

    next_stake.settle(&next_pool)?;
    let split = next_stake.withdraw(amount)?;
    next_pool.decrease_total_staked(split.from_principal)?;
    next_pool.increment_revision()?;
    next_stake.increment_revision()?;

    let custody_balance = ledger.balance(&pool.token_holding)?;
    invariants::check_custody_covers(custody_balance, pool.total_staked)?;
    let custody_after = custody_balance
        .checked_sub(amount)
        .ok_or_else(math_error!(CustodyInvariantViolated))?;
    invariants::check_custody_covers(custody_after, next_pool.total_staked)?;

    ledger.transfer(&pool.token_holding, &caller.holding, amount)?;

    let receipt = WithdrawReceipt {
        amount,
        from_rewards: split.from_rewards,
        from_principal: split.from_principal,
        user_amount: next_stake.amount,
        effective_balance: next_stake.effective_balance(&next_pool)?,
        total_staked: next_pool.total_staked,
        custody_balance: ledger.balance(&pool.token_holding)?,
    };

    *pool = next_pool;
    *user_stake = next_stake;

    msg!(
        "Withdrew {} for {} ({} rewards, {} principal)",
        amount,
        caller.key,
        split.from_rewards,
        split.from_principal
    );

    Ok(receipt)
}

/// Owner-only update of pool settings.
pub fn configure(pool: &mut Pool, signer: &Pubkey, config: &PoolConfigOpt) -> StakingResult {
    authority::require_pool_owner(pool, signer)?;

    let mut next_pool = pool.clone();
    next_pool.configure(config)?;
    next_pool.increment_revision()?;

    *pool = next_pool;

    Ok(())
}

/// Withdrawable balance of a stake, principal and rewards included.
pub fn effective_balance(pool: &Pool, user_stake: &UserStake) -> StakingResult<u64> {
    user_stake.effective_balance(pool)
}

/// Rewards a stake has earned and not withdrawn yet.
pub fn pending_rewards(pool: &Pool, user_stake: &UserStake) -> StakingResult<u64> {
    user_stake.pending_rewards(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MapLedger {
        balances: BTreeMap<Pubkey, u64>,
    }

    impl TokenLedger for MapLedger {
        fn balance(&self, holding: &Pubkey) -> StakingResult<u64> {
            Ok(self.balances.get(holding).copied().unwrap_or_default())
        }

        fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> StakingResult {
            let from_balance = self.balance(from)?;
            check!(from_balance >= amount, StakingError::InsufficientFunds);
            self.balances.insert(*from, from_balance - amount);
            *self.balances.entry(*to).or_default() += amount;
            Ok(())
        }
    }

    struct Setup {
        ledger: MapLedger,
        pool_pk: Pubkey,
        pool: Pool,
        owner: Caller,
        custody: Pubkey,
    }

    fn setup() -> Setup {
        let owner = Caller::new(Pubkey::new_unique(), Pubkey::new_unique());
        let custody = Pubkey::new_unique();
        let mut pool = Pool::default();
        initialize(
            &mut pool,
            owner.key,
            Pubkey::new_unique(),
            custody,
            PoolBumps::default(),
        )
        .unwrap();

        let mut ledger = MapLedger::default();
        ledger.balances.insert(owner.holding, 1_000);

        Setup {
            ledger,
            pool_pk: Pubkey::new_unique(),
            pool,
            owner,
            custody,
        }
    }

    fn participant(ledger: &mut MapLedger, balance: u64) -> Caller {
        let caller = Caller::new(Pubkey::new_unique(), Pubkey::new_unique());
        ledger.balances.insert(caller.holding, balance);
        caller
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let Setup { mut pool, .. } = setup();
        let before = pool.clone();

        let res = initialize(
            &mut pool,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            PoolBumps::default(),
        );

        assert!(res.is_err());
        assert_eq!(pool, before);
    }

    #[test]
    fn stake_without_funds_changes_nothing() {
        let Setup {
            mut ledger,
            pool_pk,
            mut pool,
            custody,
            ..
        } = setup();
        let user = participant(&mut ledger, 10);
        let mut user_stake = UserStake::default();
        let pool_before = pool.clone();

        let res = stake(&mut ledger, pool_pk, &mut pool, &mut user_stake, 255, user, 11);

        assert!(res.is_err());
        assert_eq!(pool, pool_before);
        assert_eq!(user_stake, UserStake::default());
        assert_eq!(ledger.balance(&user.holding).unwrap(), 10);
        assert_eq!(ledger.balance(&custody).unwrap(), 0);
    }

    #[test]
    fn stake_reward_withdraw_round() {
        let Setup {
            mut ledger,
            pool_pk,
            mut pool,
            owner,
            custody,
        } = setup();
        let user = participant(&mut ledger, 1_000);
        let mut user_stake = UserStake::default();

        let receipt = stake(
            &mut ledger,
            pool_pk,
            &mut pool,
            &mut user_stake,
            255,
            user,
            100,
        )
        .unwrap();
        assert!(receipt.created);
        assert_eq!(receipt.custody_balance, 100);
        assert_eq!(user_stake.bump, 255);

        distribute_rewards(&mut ledger, &mut pool, owner, 50).unwrap();
        assert_eq!(effective_balance(&pool, &user_stake).unwrap(), 150);
        assert_eq!(pending_rewards(&pool, &user_stake).unwrap(), 50);

        let receipt =
            withdraw(&mut ledger, pool_pk, &mut pool, Some(&mut user_stake), user, 150).unwrap();
        assert_eq!(receipt.from_rewards, 50);
        assert_eq!(receipt.from_principal, 100);
        assert_eq!(receipt.total_staked, 0);
        assert_eq!(user_stake.amount, 0);
        assert_eq!(ledger.balance(&user.holding).unwrap(), 1_050);
        assert_eq!(ledger.balance(&custody).unwrap(), 0);
    }

    #[test]
    fn withdraw_reports_custody_shortfall_as_fault() {
        let Setup {
            mut ledger,
            pool_pk,
            mut pool,
            custody,
            ..
        } = setup();
        let user = participant(&mut ledger, 100);
        let mut user_stake = UserStake::default();
        stake(&mut ledger, pool_pk, &mut pool, &mut user_stake, 255, user, 100).unwrap();

        // Custody drained behind the engine's back
        ledger.balances.insert(custody, 40);
        let pool_before = pool.clone();

        let res = withdraw(&mut ledger, pool_pk, &mut pool, Some(&mut user_stake), user, 10);

        assert_eq!(
            res.unwrap_err(),
            StakingError::CustodyInvariantViolated.into()
        );
        assert_eq!(pool, pool_before);
        assert_eq!(user_stake.amount, 100);
    }

    #[test]
    fn withdraw_without_record_is_not_found() {
        let Setup {
            mut ledger,
            pool_pk,
            mut pool,
            ..
        } = setup();
        let user = participant(&mut ledger, 0);

        let res = withdraw(&mut ledger, pool_pk, &mut pool, None, user, 1);
        assert_eq!(res.unwrap_err(), StakingError::NotFound.into());

        let mut empty = UserStake::default();
        let res = withdraw(&mut ledger, pool_pk, &mut pool, Some(&mut empty), user, 1);
        assert_eq!(res.unwrap_err(), StakingError::NotFound.into());
    }

    #[test]
    fn configure_is_owner_only() {
        let Setup {
            mut pool, owner, ..
        } = setup();
        let config = PoolConfigOpt {
            owner: None,
            flags: Some(STAKING_PAUSED),
        };

        assert!(configure(&mut pool, &Pubkey::new_unique(), &config).is_err());
        assert_eq!(pool.flags, 0);

        configure(&mut pool, &owner.key, &config).unwrap();
        assert!(pool.get_flag(STAKING_PAUSED));
    }
}
