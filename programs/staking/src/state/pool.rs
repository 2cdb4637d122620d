use crate::{
    assert_struct_size, check,
    constants::{POOL_FLAGS_MASK, REWARD_PER_SHARE_SCALE},
    math_error, set_if_some,
    prelude::{StakingError, StakingResult},
};
use anchor_lang::prelude::*;

assert_struct_size!(Pool, 235);

/// Singleton pool record. A PDA derived from `POOL_SEED`.
///
/// Rewards are tracked with a lazy reward-per-share accumulator: a
/// distribution only moves `reward_per_share`, and each [`UserStake`] settles
/// its share against its own checkpoint the next time it is touched.
///
/// [`UserStake`]: super::user_stake::UserStake
#[account]
#[derive(Debug, Default, PartialEq, Eq, InitSpace)]
pub struct Pool {
    /// Identity allowed to fund rewards and configure the pool
    pub owner: Pubkey,
    /// Mint of the token staked and paid out as rewards
    pub mint: Pubkey,
    /// Custody token account escrowing staked principal and reward funds
    pub token_holding: Pubkey,
    /// Sum of the principal `amount` of every stake record of this pool
    pub total_staked: u64,
    /// Cumulative reward units per staked unit, scaled by `REWARD_PER_SHARE_SCALE`
    pub reward_per_share: u128,
    /// Scaled remainder of the last accumulator division, folded into the next one
    pub reward_remainder: u128,
    /// Rewards funded while nothing was staked, released by the next distribution
    pub undistributed_rewards: u64,
    /// Lifetime reward units transferred into custody
    pub total_rewards_distributed: u64,
    /// Bitmask of pool settings.
    /// * 0: `STAKING_PAUSED`
    /// * 1: `WITHDRAWALS_PAUSED`
    /// * Bits 2-63: Reserved for future use.
    pub flags: u64,
    /// Incremented on every committed mutation
    pub revision: u64,
    pub bump: u8,
    pub custody_bump: u8,
    pub custody_authority_bump: u8,
    pub _padding: [u64; 8],
}

/// Outcome of crediting a reward amount to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardCredit {
    /// Units released to current stakers through the accumulator
    pub released: u64,
    /// Units held back because nothing is staked
    pub deferred: u64,
}

impl Pool {
    pub const LEN: usize = 8 + Pool::INIT_SPACE;

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    /// Set the pool parameters when initializing a pool.
    /// This should be called only when the pool is first initialized.
    pub fn set_initial_configuration(
        &mut self,
        owner: Pubkey,
        mint: Pubkey,
        token_holding: Pubkey,
        bumps: PoolBumps,
    ) {
        *self = Pool {
            owner,
            mint,
            token_holding,
            bump: bumps.pool,
            custody_bump: bumps.custody,
            custody_authority_bump: bumps.custody_authority,
            ..Default::default()
        };
    }

    /// Configure the pool parameters.
    /// This function validates config values so the pool remains in a valid state.
    /// Any modification of pool config should happen through this function.
    pub fn configure(&mut self, config: &PoolConfigOpt) -> StakingResult {
        if let Some(owner) = config.owner {
            check!(
                owner != Pubkey::default(),
                StakingError::InvalidPoolConfig,
                "Pool owner cannot be the default key"
            );
        }

        if let Some(flags) = config.flags {
            check!(
                Self::verify_pool_flags(flags),
                StakingError::InvalidPoolConfig,
                "Unknown pool flags {:#b}",
                flags
            );
        }

        set_if_some!(self.owner, config.owner);
        set_if_some!(self.flags, config.flags);

        Ok(())
    }

    pub fn get_flag(&self, flag: u64) -> bool {
        (self.flags & flag) == flag
    }

    const fn verify_pool_flags(flags: u64) -> bool {
        flags & !POOL_FLAGS_MASK == 0
    }

    pub fn assert_not_paused(&self, flag: u64) -> StakingResult {
        check!(!self.get_flag(flag), StakingError::PoolPaused);
        Ok(())
    }

    pub fn increase_total_staked(&mut self, amount: u64) -> StakingResult {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or_else(math_error!())?;
        Ok(())
    }

    pub fn decrease_total_staked(&mut self, amount: u64) -> StakingResult {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or_else(math_error!(ArithmeticUnderflow))?;
        Ok(())
    }

    /// Feed `amount` reward units into the accumulator, pro rata to `total_staked`.
    ///
    /// With nothing staked the units are parked in `undistributed_rewards` and
    /// released together with the next distribution that has stakers. The
    /// truncated part of `amount * SCALE / total_staked` is kept in
    /// `reward_remainder` and carried into the next division, so no unit is
    /// ever lost or paid twice.
    pub fn credit_rewards(&mut self, amount: u64) -> StakingResult<RewardCredit> {
        // Lifetime statistic only, never used for accounting
        let total_rewards_distributed = self.total_rewards_distributed.saturating_add(amount);
        let reward_units = self
            .undistributed_rewards
            .checked_add(amount)
            .ok_or_else(math_error!())?;

        if self.total_staked == 0 {
            self.undistributed_rewards = reward_units;
            self.total_rewards_distributed = total_rewards_distributed;
            return Ok(RewardCredit {
                released: 0,
                deferred: reward_units,
            });
        }

        let total_staked = u128::from(self.total_staked);
        let numerator = u128::from(reward_units)
            .checked_mul(REWARD_PER_SHARE_SCALE)
            .and_then(|scaled| scaled.checked_add(self.reward_remainder))
            .ok_or_else(math_error!())?;

        let increment = numerator / total_staked;
        let remainder = numerator % total_staked;

        self.reward_per_share = self
            .reward_per_share
            .checked_add(increment)
            .ok_or_else(math_error!())?;
        self.reward_remainder = remainder;
        self.undistributed_rewards = 0;
        self.total_rewards_distributed = total_rewards_distributed;

        Ok(RewardCredit {
            released: reward_units,
            deferred: 0,
        })
    }

    /// Reward units earned by `stake_amount` since `checkpoint`, rounded down.
    pub fn pending_rewards_since(&self, stake_amount: u64, checkpoint: u128) -> StakingResult<u64> {
        let delta = self
            .reward_per_share
            .checked_sub(checkpoint)
            .ok_or_else(math_error!(ArithmeticUnderflow))?;

        let pending = u128::from(stake_amount)
            .checked_mul(delta)
            .ok_or_else(math_error!())?
            / REWARD_PER_SHARE_SCALE;

        let pending = u64::try_from(pending).ok().ok_or_else(math_error!())?;

        Ok(pending)
    }

    pub fn increment_revision(&mut self) -> StakingResult {
        self.revision = self.revision.checked_add(1).ok_or_else(math_error!())?;
        Ok(())
    }
}

/// Derivation bumps recorded on the pool at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolBumps {
    pub pool: u8,
    pub custody: u8,
    pub custody_authority: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolConfigOpt {
    pub owner: Option<Pubkey>,
    pub flags: Option<u64>,
}
