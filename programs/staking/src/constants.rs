use anchor_lang::prelude::*;

#[constant]
pub const POOL_SEED: &str = "pool";
#[constant]
pub const USER_STAKE_SEED: &str = "user-stake";

pub const POOL_CUSTODY_SEED: &str = "pool-custody";
pub const POOL_CUSTODY_AUTHORITY_SEED: &str = "pool-custody-auth";

/// Fixed-point scale of `Pool::reward_per_share`. One staked unit earns
/// `reward_per_share / REWARD_PER_SHARE_SCALE` reward units.
pub const REWARD_PER_SHARE_SCALE: u128 = 1_000_000_000_000;

/// New stakes are rejected while set.
pub const STAKING_PAUSED: u64 = 1 << 0;
/// Withdrawals are rejected while set.
pub const WITHDRAWALS_PAUSED: u64 = 1 << 1;

pub const POOL_FLAGS_MASK: u64 = STAKING_PAUSED | WITHDRAWALS_PAUSED;
