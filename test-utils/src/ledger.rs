use anchor_lang::prelude::*;
use staking::prelude::*;
use std::collections::BTreeMap;

/// Single-mint token ledger held in memory.
///
/// Holdings are plain balances keyed by address; a failed transfer leaves
/// every balance untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenLedger {
    pub mint: Pubkey,
    balances: BTreeMap<Pubkey, u64>,
}

impl InMemoryTokenLedger {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            balances: BTreeMap::new(),
        }
    }

    /// Open a fresh holding funded with `amount`.
    pub fn open_holding(&mut self, amount: u64) -> Pubkey {
        let holding = Pubkey::new_unique();
        self.balances.insert(holding, amount);
        holding
    }

    pub fn open_holding_at(&mut self, holding: Pubkey) {
        self.balances.entry(holding).or_default();
    }

    pub fn mint_to(&mut self, holding: &Pubkey, amount: u64) {
        let balance = self.balances.entry(*holding).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Sum of every balance. Transfers never change it.
    pub fn supply(&self) -> u128 {
        self.balances.values().map(|b| u128::from(*b)).sum()
    }

    fn get(&self, holding: &Pubkey) -> StakingResult<u64> {
        Ok(*self.balances.get(holding).ok_or_else(|| {
            msg!("Unknown holding {}", holding);
            StakingError::InvalidTokenHolding
        })?)
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance(&self, holding: &Pubkey) -> StakingResult<u64> {
        self.get(holding)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> StakingResult {
        let from_balance = self.get(from)?;
        let to_balance = self.get(to)?;
        if from_balance < amount {
            return err!(StakingError::InsufficientFunds);
        }

        if from == to {
            return Ok(());
        }

        let to_balance = to_balance
            .checked_add(amount)
            .ok_or(StakingError::ArithmeticOverflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);

        log::trace!("ledger: {} -> {} amount {}", from, to, amount);

        Ok(())
    }
}

/// A transfer recorded by [`StagedLedger`] and applied at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedTransfer {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

/// Ledger view over a snapshot. Transfers are validated against the
/// snapshot and staged; nothing reaches the real ledger until
/// [`StagedLedger::apply`] runs at commit time.
#[derive(Debug, Clone)]
pub struct StagedLedger {
    view: InMemoryTokenLedger,
    staged: Vec<StagedTransfer>,
}

impl StagedLedger {
    pub fn new(snapshot: InMemoryTokenLedger) -> Self {
        Self {
            view: snapshot,
            staged: vec![],
        }
    }

    pub fn staged(&self) -> &[StagedTransfer] {
        &self.staged
    }

    /// Replay the staged transfers onto `ledger`, all or nothing.
    pub fn apply(staged: &[StagedTransfer], ledger: &mut InMemoryTokenLedger) -> StakingResult {
        let mut next = ledger.clone();
        for transfer in staged {
            next.transfer(&transfer.from, &transfer.to, transfer.amount)?;
        }
        *ledger = next;
        Ok(())
    }
}

impl TokenLedger for StagedLedger {
    fn balance(&self, holding: &Pubkey) -> StakingResult<u64> {
        self.view.balance(holding)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> StakingResult {
        self.view.transfer(from, to, amount)?;
        self.staged.push(StagedTransfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}
