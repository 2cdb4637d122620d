use crate::{check, debug, prelude::*};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, TokenAccount, TransferChecked};

/// Fungible-token ledger the accounting engine moves funds through.
///
/// Implementations must leave every balance untouched when `transfer` fails.
pub trait TokenLedger {
    fn balance(&self, holding: &Pubkey) -> StakingResult<u64>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> StakingResult;
}

/// [`TokenLedger`] backed by the SPL token program (legacy or token-2022)
/// through `transfer_checked` CPI.
///
/// All holdings touched by an instruction are passed in up front; `authority`
/// signs every transfer, with `signer_seeds` when it is a program PDA.
pub struct SplTokenLedger<'a, 'info> {
    token_program: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    decimals: u8,
    authority: AccountInfo<'info>,
    holdings: Vec<AccountInfo<'info>>,
    signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> SplTokenLedger<'a, 'info> {
    pub fn new(
        token_program: AccountInfo<'info>,
        mint: AccountInfo<'info>,
        decimals: u8,
        authority: AccountInfo<'info>,
        holdings: Vec<AccountInfo<'info>>,
    ) -> Self {
        Self {
            token_program,
            mint,
            decimals,
            authority,
            holdings,
            signer_seeds: &[],
        }
    }

    pub fn with_signer(mut self, signer_seeds: &'a [&'a [&'a [u8]]]) -> Self {
        self.signer_seeds = signer_seeds;
        self
    }

    fn holding(&self, key: &Pubkey) -> StakingResult<&AccountInfo<'info>> {
        Ok(self
            .holdings
            .iter()
            .find(|ai| ai.key.eq(key))
            .ok_or_else(|| {
                msg!("Holding {} was not provided", key);
                StakingError::InvalidTokenHolding
            })?)
    }
}

impl<'a, 'info> TokenLedger for SplTokenLedger<'a, 'info> {
    fn balance(&self, holding: &Pubkey) -> StakingResult<u64> {
        let ai = self.holding(holding)?;
        let data = ai.try_borrow_data()?;
        let token_account = TokenAccount::try_deserialize(&mut &data[..])?;

        check!(
            token_account.mint.eq(self.mint.key),
            StakingError::InvalidTokenHolding,
            "Holding {} has mint {}",
            holding,
            token_account.mint
        );

        Ok(token_account.amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> StakingResult {
        check!(
            self.balance(from)? >= amount,
            StakingError::InsufficientFunds
        );
        // Validates the destination mint before any funds move
        self.balance(to)?;

        debug!(
            "spl transfer: amount: {} from {} to {}, auth {}",
            amount, from, to, self.authority.key
        );

        let from = self.holding(from)?.clone();
        let to = self.holding(to)?.clone();

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                TransferChecked {
                    from,
                    mint: self.mint.clone(),
                    to,
                    authority: self.authority.clone(),
                },
                self.signer_seeds,
            ),
            amount,
            self.decimals,
        )
    }
}
