//! Caller checks run before the accounting engine touches any record.

use crate::{check, prelude::*};
use anchor_lang::prelude::*;

/// Reward funding and pool configuration are owner-only.
pub fn require_pool_owner(pool: &Pool, signer: &Pubkey) -> StakingResult {
    check!(
        pool.is_initialized() && pool.owner.eq(signer),
        StakingError::Unauthorized,
        "Signer {} is not the pool owner",
        signer
    );
    Ok(())
}

/// A stake record may only be changed by its owner, and only through the pool it belongs to.
pub fn require_stake_owner(
    user_stake: &UserStake,
    pool_pk: &Pubkey,
    signer: &Pubkey,
) -> StakingResult {
    check!(
        user_stake.owner.eq(signer),
        StakingError::Unauthorized,
        "Signer {} does not own stake of {}",
        signer,
        user_stake.owner
    );
    check!(
        user_stake.pool.eq(pool_pk),
        StakingError::Unauthorized,
        "Stake belongs to pool {}",
        user_stake.pool
    );
    Ok(())
}

/// Callers move funds between their own holding and custody, never custody to itself.
pub fn require_external_holding(pool: &Pool, holding: &Pubkey) -> StakingResult {
    check!(
        !pool.token_holding.eq(holding),
        StakingError::InvalidTokenHolding,
        "Custody holding cannot be the caller holding"
    );
    Ok(())
}
