use crate::{
    constants::{POOL_CUSTODY_AUTHORITY_SEED, POOL_SEED, USER_STAKE_SEED},
    custody_authority_signer,
    engine::{self, Caller},
    events::{PoolEventHeader, WithdrawEvent},
    prelude::*,
    state::ledger::SplTokenLedger,
};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// 1. Load the participant's stake record, `NotFound` if it was never created
/// 2. Settle pending rewards and split the withdrawal into rewards and principal
/// 3. Transfer `amount` from custody to the participant, signed by the custody authority
pub fn user_stake_withdraw(ctx: Context<UserStakeWithdraw>, amount: u64) -> StakingResult {
    let UserStakeWithdraw {
        participant,
        pool,
        user_stake: user_stake_info,
        mint,
        destination,
        custody,
        custody_authority,
        token_program,
    } = ctx.accounts;

    let pool_pk = pool.key();
    let mut user_stake = load_user_stake(user_stake_info)?;

    let signer: &[&[&[u8]]] = custody_authority_signer!(pool_pk, pool.custody_authority_bump);

    let mut ledger = SplTokenLedger::new(
        token_program.to_account_info(),
        mint.to_account_info(),
        mint.decimals,
        custody_authority.to_account_info(),
        vec![custody.to_account_info(), destination.to_account_info()],
    )
    .with_signer(signer);

    let receipt = engine::withdraw(
        &mut ledger,
        pool_pk,
        pool,
        user_stake.as_mut(),
        Caller::new(participant.key(), destination.key()),
        amount,
    )?;

    if let Some(user_stake) = user_stake {
        store_user_stake(user_stake_info, &user_stake)?;
    }

    emit!(WithdrawEvent {
        header: PoolEventHeader {
            signer: Some(participant.key()),
            pool: pool_pk,
        },
        user_stake: user_stake_info.key(),
        amount,
        from_rewards: receipt.from_rewards,
        from_principal: receipt.from_principal,
        user_amount: receipt.user_amount,
        total_staked: receipt.total_staked,
    });

    Ok(())
}

/// `None` when the record at the participant's address was never created.
fn load_user_stake(info: &AccountInfo) -> StakingResult<Option<UserStake>> {
    if info.data_is_empty() || info.owner != &crate::ID {
        return Ok(None);
    }

    let data = info.try_borrow_data()?;
    let user_stake = UserStake::try_deserialize(&mut &data[..])?;

    Ok(Some(user_stake))
}

fn store_user_stake(info: &AccountInfo, user_stake: &UserStake) -> StakingResult {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    user_stake.try_serialize(&mut writer)?;

    Ok(())
}

#[derive(Accounts)]
pub struct UserStakeWithdraw<'info> {
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// CHECK: Address is derived from the participant. May be uninitialized,
    /// in which case the engine reports `NotFound`.
    #[account(
        mut,
        seeds = [
            USER_STAKE_SEED.as_bytes(),
            participant.key().as_ref(),
        ],
        bump,
    )]
    pub user_stake: UncheckedAccount<'info>,

    #[account(address = pool.mint)]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// Holding credited by the withdrawal
    #[account(mut, token::mint = mint)]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = pool.token_holding @ StakingError::InvalidTokenHolding,
    )]
    pub custody: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Signs custody transfers, validated by seeds
    #[account(
        seeds = [
            POOL_CUSTODY_AUTHORITY_SEED.as_bytes(),
            pool.key().as_ref(),
        ],
        bump = pool.custody_authority_bump,
    )]
    pub custody_authority: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}
