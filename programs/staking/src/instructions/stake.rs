use crate::{
    constants::{POOL_SEED, USER_STAKE_SEED},
    engine::{self, Caller},
    events::{PoolEventHeader, StakeEvent},
    prelude::*,
    state::ledger::SplTokenLedger,
};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// 1. Create the participant's stake record on first use
/// 2. Settle pending rewards and record the new principal
/// 3. Transfer `amount` from the participant's holding into custody
pub fn user_stake_deposit(ctx: Context<UserStakeDeposit>, amount: u64) -> StakingResult {
    let UserStakeDeposit {
        participant,
        pool,
        user_stake,
        mint,
        source,
        custody,
        token_program,
        ..
    } = ctx.accounts;

    let pool_pk = pool.key();
    let user_stake_pk = user_stake.key();

    let mut ledger = SplTokenLedger::new(
        token_program.to_account_info(),
        mint.to_account_info(),
        mint.decimals,
        participant.to_account_info(),
        vec![source.to_account_info(), custody.to_account_info()],
    );

    let receipt = engine::stake(
        &mut ledger,
        pool_pk,
        pool,
        user_stake,
        ctx.bumps.user_stake,
        Caller::new(participant.key(), source.key()),
        amount,
    )?;

    emit!(StakeEvent {
        header: PoolEventHeader {
            signer: Some(participant.key()),
            pool: pool_pk,
        },
        user_stake: user_stake_pk,
        amount,
        created: receipt.created,
        user_amount: receipt.user_amount,
        total_staked: receipt.total_staked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct UserStakeDeposit<'info> {
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        init_if_needed,
        payer = participant,
        space = UserStake::LEN,
        seeds = [
            USER_STAKE_SEED.as_bytes(),
            participant.key().as_ref(),
        ],
        bump,
    )]
    pub user_stake: Box<Account<'info, UserStake>>,

    #[account(address = pool.mint)]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// Participant-owned holding debited by the stake
    #[account(mut, token::mint = mint, token::authority = participant)]
    pub source: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = pool.token_holding @ StakingError::InvalidTokenHolding,
    )]
    pub custody: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}
