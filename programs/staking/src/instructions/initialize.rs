use crate::{
    check,
    constants::{POOL_CUSTODY_AUTHORITY_SEED, POOL_CUSTODY_SEED, POOL_SEED},
    engine,
    events::{PoolCreateEvent, PoolEventHeader},
    prelude::*,
    state::pool::PoolBumps,
    utils::mint_has_transfer_fee,
};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Create the singleton pool and its custody holding. The signer becomes the
/// pool owner.
///
/// Mints that can charge transfer fees are rejected with `InvalidPoolConfig`:
/// custody would receive less than the staked amount recorded.
///
/// A second call reaches the engine with the existing pool and fails with
/// `AlreadyInitialized`.
pub fn pool_initialize(ctx: Context<PoolInitialize>) -> StakingResult {
    let PoolInitialize {
        owner,
        pool,
        mint,
        custody,
        ..
    } = ctx.accounts;

    check!(
        !mint_has_transfer_fee(&mint.to_account_info())?,
        StakingError::InvalidPoolConfig,
        "Mint {} charges transfer fees",
        mint.key()
    );

    engine::initialize(
        pool,
        owner.key(),
        mint.key(),
        custody.key(),
        PoolBumps {
            pool: ctx.bumps.pool,
            custody: ctx.bumps.custody,
            custody_authority: ctx.bumps.custody_authority,
        },
    )?;

    emit!(PoolCreateEvent {
        header: PoolEventHeader {
            signer: Some(owner.key()),
            pool: pool.key(),
        },
        mint: mint.key(),
        custody: custody.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PoolInitialize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = Pool::LEN,
        seeds = [POOL_SEED.as_bytes()],
        bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// CHECK: PDA signing for custody, holds no data
    #[account(
        seeds = [
            POOL_CUSTODY_AUTHORITY_SEED.as_bytes(),
            pool.key().as_ref(),
        ],
        bump,
    )]
    pub custody_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        token::mint = mint,
        token::authority = custody_authority,
        token::token_program = token_program,
        seeds = [
            POOL_CUSTODY_SEED.as_bytes(),
            pool.key().as_ref(),
        ],
        bump,
    )]
    pub custody: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}
