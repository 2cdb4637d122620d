//! Pool-wide accounting invariants.

use crate::{check, prelude::*};
use anchor_lang::prelude::*;

/// Custody must always hold at least every unit of staked principal.
pub fn check_custody_covers(custody_balance: u64, total_staked: u64) -> StakingResult {
    check!(
        custody_balance >= total_staked,
        StakingError::CustodyInvariantViolated,
        "Custody {} below total staked {}",
        custody_balance,
        total_staked
    );
    Ok(())
}

/// Verify a pool against the complete set of its stake records and the
/// current custody balance.
///
/// * `total_staked` equals the sum of every record's principal
/// * custody covers staked principal plus every reward unit owed to stakers
pub fn verify_pool<'a>(
    pool: &Pool,
    stakes: impl IntoIterator<Item = &'a UserStake>,
    custody_balance: u64,
) -> StakingResult {
    let mut principal: u128 = 0;
    let mut owed_rewards: u128 = 0;

    for user_stake in stakes {
        principal += u128::from(user_stake.amount);
        owed_rewards += u128::from(user_stake.pending_rewards(pool)?);
    }

    check!(
        principal == u128::from(pool.total_staked),
        StakingError::TotalStakedMismatch,
        "Records hold {}, pool reports {}",
        principal,
        pool.total_staked
    );

    check_custody_covers(custody_balance, pool.total_staked)?;

    let owed = principal + owed_rewards + u128::from(pool.undistributed_rewards);
    check!(
        u128::from(custody_balance) >= owed,
        StakingError::CustodyInvariantViolated,
        "Custody {} below owed {}",
        custody_balance,
        owed
    );

    Ok(())
}
