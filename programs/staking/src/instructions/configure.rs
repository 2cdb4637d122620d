use crate::{
    constants::POOL_SEED,
    engine,
    events::{PoolConfigureEvent, PoolEventHeader},
    prelude::*,
};
use anchor_lang::prelude::*;

/// Configure the pool owner and pause flags
///
/// Owner only
pub fn pool_configure(ctx: Context<PoolConfigure>, config: PoolConfigOpt) -> StakingResult {
    let PoolConfigure { owner, pool } = ctx.accounts;

    engine::configure(pool, owner.key, &config)?;

    emit!(PoolConfigureEvent {
        header: PoolEventHeader {
            signer: Some(owner.key()),
            pool: pool.key(),
        },
        config,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PoolConfigure<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,
}
