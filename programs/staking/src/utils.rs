use crate::{
    constants::{POOL_SEED, USER_STAKE_SEED},
    custody_authority_seed, custody_seed,
    prelude::StakingResult,
};
use anchor_lang::prelude::*;
use anchor_spl::{
    token::Token,
    token_2022::spl_token_2022::{
        self,
        extension::{transfer_fee::TransferFeeConfig, BaseStateWithExtensions, StateWithExtensions},
    },
};

pub fn find_pool_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED.as_bytes()], &crate::id())
}

/// One stake record per participant.
pub fn find_user_stake_pda(participant: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_STAKE_SEED.as_bytes(), participant.as_ref()],
        &crate::id(),
    )
}

pub fn find_custody_pda(pool_pk: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(custody_seed!(pool_pk), &crate::id())
}

pub fn find_custody_authority_pda(pool_pk: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(custody_authority_seed!(pool_pk), &crate::id())
}

/// Whether transfers of this mint can be charged a fee. Any Token-2022 mint
/// carrying `TransferFeeConfig` counts, even at zero basis points: the fee
/// authority can raise it later.
pub fn mint_has_transfer_fee(mint_ai: &AccountInfo) -> StakingResult<bool> {
    if mint_ai.owner.eq(&Token::id()) {
        return Ok(false);
    }

    let mint_data = mint_ai.try_borrow_data()?;
    mint_data_has_transfer_fee(&mint_data)
}

fn mint_data_has_transfer_fee(mint_data: &[u8]) -> StakingResult<bool> {
    let mint = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(mint_data)?;

    Ok(mint.get_extension::<TransferFeeConfig>().is_ok())
}
