pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod macros;
pub mod prelude;
pub mod state;
pub mod utils;

use anchor_lang::prelude::*;
use instructions::*;
use prelude::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "mainnet-beta")] {
        declare_id!("StakePoo1cZR584Y6E1aExDLXDPUvVWCA3oXvkps5qK");
    } else if #[cfg(feature = "devnet")] {
        declare_id!("StakeDevQdaAm7WcgCQ2mUZw4mfDx66KzKg6nEyqwHg");
    } else {
        declare_id!("Stk1111111111111111111111111111111111111111");
    }
}

#[program]
pub mod staking {
    use super::*;

    pub fn initialize(ctx: Context<PoolInitialize>) -> StakingResult {
        instructions::pool_initialize(ctx)
    }

    pub fn stake(ctx: Context<UserStakeDeposit>, amount: u64) -> StakingResult {
        instructions::user_stake_deposit(ctx, amount)
    }

    /// Owner only
    pub fn distribute_rewards(ctx: Context<PoolDistributeRewards>, amount: u64) -> StakingResult {
        instructions::pool_distribute_rewards(ctx, amount)
    }

    pub fn withdraw(ctx: Context<UserStakeWithdraw>, amount: u64) -> StakingResult {
        instructions::user_stake_withdraw(ctx, amount)
    }

    /// Owner only
    pub fn configure_pool(ctx: Context<PoolConfigure>, config: PoolConfigOpt) -> StakingResult {
        instructions::pool_configure(ctx, config)
    }
}
