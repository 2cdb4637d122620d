use crate::{
    assert_struct_size, check, math_error,
    prelude::{StakingError, StakingResult},
};
use anchor_lang::prelude::*;

use super::pool::Pool;

assert_struct_size!(UserStake, 145);

/// Per-participant stake record. A PDA derived from `USER_STAKE_SEED` and the
/// participant key, created on the participant's first stake and never closed.
#[account]
#[derive(Debug, Default, PartialEq, Eq, InitSpace)]
pub struct UserStake {
    pub owner: Pubkey,
    /// Pool this record belongs to (lookup only)
    pub pool: Pubkey,
    /// Staked principal. Counted in `Pool::total_staked`.
    pub amount: u64,
    /// `Pool::reward_per_share` at the last settlement
    pub reward_checkpoint: u128,
    /// Settled rewards not yet withdrawn
    pub accrued_rewards: u64,
    /// Lifetime reward units withdrawn
    pub total_rewards_claimed: u64,
    /// Incremented on every committed mutation
    pub revision: u64,
    pub bump: u8,
    pub _padding: [u64; 4],
}

/// How a withdrawal was funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawSplit {
    pub from_rewards: u64,
    pub from_principal: u64,
}

impl UserStake {
    pub const LEN: usize = 8 + UserStake::INIT_SPACE;

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    /// A fresh record starts at the pool's current accumulator so it earns
    /// nothing from distributions that happened before it existed.
    pub fn initialize(&mut self, owner: Pubkey, pool_pk: Pubkey, pool: &Pool, bump: u8) {
        *self = UserStake {
            owner,
            pool: pool_pk,
            reward_checkpoint: pool.reward_per_share,
            bump,
            ..Default::default()
        };
    }

    /// Rewards earned since the checkpoint that have not been settled yet.
    pub fn unsettled_rewards(&self, pool: &Pool) -> StakingResult<u64> {
        pool.pending_rewards_since(self.amount, self.reward_checkpoint)
    }

    /// Settled plus unsettled rewards.
    pub fn pending_rewards(&self, pool: &Pool) -> StakingResult<u64> {
        let pending = self
            .accrued_rewards
            .checked_add(self.unsettled_rewards(pool)?)
            .ok_or_else(math_error!())?;
        Ok(pending)
    }

    /// Principal plus every reward unit this stake can withdraw right now.
    pub fn effective_balance(&self, pool: &Pool) -> StakingResult<u64> {
        let balance = self
            .amount
            .checked_add(self.pending_rewards(pool)?)
            .ok_or_else(math_error!())?;
        Ok(balance)
    }

    /// Fold unsettled rewards into `accrued_rewards` and move the checkpoint
    /// up to the pool accumulator. Must run before `amount` changes.
    pub fn settle(&mut self, pool: &Pool) -> StakingResult<u64> {
        let unsettled = self.unsettled_rewards(pool)?;

        self.accrued_rewards = self
            .accrued_rewards
            .checked_add(unsettled)
            .ok_or_else(math_error!())?;
        self.reward_checkpoint = pool.reward_per_share;

        Ok(unsettled)
    }

    pub fn deposit(&mut self, amount: u64) -> StakingResult {
        self.amount = self.amount.checked_add(amount).ok_or_else(math_error!())?;
        Ok(())
    }

    /// Withdraw from a settled record: accrued rewards are paid out first and
    /// only the rest is taken from principal.
    pub fn withdraw(&mut self, amount: u64) -> StakingResult<WithdrawSplit> {
        let from_rewards = amount.min(self.accrued_rewards);
        let from_principal = amount - from_rewards;

        check!(
            from_principal <= self.amount,
            StakingError::InsufficientStake,
            "Requested {}, available {}",
            amount,
            self.amount.saturating_add(self.accrued_rewards)
        );

        self.accrued_rewards = self
            .accrued_rewards
            .checked_sub(from_rewards)
            .ok_or_else(math_error!(ArithmeticUnderflow))?;
        self.amount = self
            .amount
            .checked_sub(from_principal)
            .ok_or_else(math_error!(ArithmeticUnderflow))?;
        self.total_rewards_claimed = self.total_rewards_claimed.saturating_add(from_rewards);

        Ok(WithdrawSplit {
            from_rewards,
            from_principal,
        })
    }

    pub fn increment_revision(&mut self) -> StakingResult {
        self.revision = self.revision.checked_add(1).ok_or_else(math_error!())?;
        Ok(())
    }
}
