use crate::{
    constants::POOL_SEED,
    engine::{self, Caller},
    events::{DistributeRewardsEvent, PoolEventHeader},
    prelude::*,
    state::ledger::SplTokenLedger,
};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Fund `amount` reward units from the owner's holding into custody, shared
/// pro rata by everyone staked at this moment.
///
/// Owner only. Not affected by the pause flags.
pub fn pool_distribute_rewards(ctx: Context<PoolDistributeRewards>, amount: u64) -> StakingResult {
    let PoolDistributeRewards {
        owner,
        pool,
        mint,
        funding,
        custody,
        token_program,
    } = ctx.accounts;

    let pool_pk = pool.key();

    let mut ledger = SplTokenLedger::new(
        token_program.to_account_info(),
        mint.to_account_info(),
        mint.decimals,
        owner.to_account_info(),
        vec![funding.to_account_info(), custody.to_account_info()],
    );

    let receipt = engine::distribute_rewards(
        &mut ledger,
        pool,
        Caller::new(owner.key(), funding.key()),
        amount,
    )?;

    emit!(DistributeRewardsEvent {
        header: PoolEventHeader {
            signer: Some(owner.key()),
            pool: pool_pk,
        },
        amount,
        released: receipt.credit.released,
        deferred: receipt.credit.deferred,
        reward_per_share: receipt.reward_per_share,
        total_staked: receipt.total_staked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PoolDistributeRewards<'info> {
    /// Checked against `pool.owner` by the engine
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(address = pool.mint)]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = mint, token::authority = owner)]
    pub funding: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = pool.token_holding @ StakingError::InvalidTokenHolding,
    )]
    pub custody: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}
