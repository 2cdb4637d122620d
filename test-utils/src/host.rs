use crate::{
    ledger::{InMemoryTokenLedger, StagedLedger, StagedTransfer},
    store::RecordStore,
};
use anchor_lang::prelude::*;
use log::{debug, info, warn};
use staking::{
    engine::{self, Caller, DistributionReceipt, StakeReceipt, WithdrawReceipt},
    prelude::*,
    state::pool::PoolBumps,
    utils::{find_custody_authority_pda, find_custody_pda},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Initialize { owner: Pubkey },
    Stake { caller: Caller, amount: u64 },
    DistributeRewards { caller: Caller, amount: u64 },
    Withdraw { caller: Caller, amount: u64 },
    Configure { signer: Pubkey, config: PoolConfigOpt },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Initialized,
    Staked(StakeReceipt),
    Distributed(DistributionReceipt),
    Withdrew(WithdrawReceipt),
    Configured,
}

/// Engine result computed against a snapshot, waiting to be committed.
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    base_pool_revision: u64,
    pool: Pool,
    /// Stake record address, its revision in the snapshot and the new record
    user_stake: Option<(Pubkey, u64, UserStake)>,
    transfers: Vec<StagedTransfer>,
    pub receipt: Receipt,
}

#[derive(Debug, Default)]
pub struct HostState {
    pub ledger: InMemoryTokenLedger,
    pub store: RecordStore,
}

/// Execution host driving the accounting engine off chain.
///
/// Operations run against a snapshot of the records they touch with a staged
/// ledger, then commit under the host lock. The commit compares record
/// revisions with the snapshot and rejects the whole operation with
/// `StaleRecord` when another commit got there first.
#[derive(Debug, Clone)]
pub struct TestHost {
    state: Arc<Mutex<HostState>>,
}

impl TestHost {
    pub fn new(mint: Pubkey) -> Self {
        let mut state = HostState {
            ledger: InMemoryTokenLedger::new(mint),
            store: RecordStore::default(),
        };
        let (custody, _) = find_custody_pda(&state.store.pool_address());
        state.ledger.open_holding_at(custody);

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open_holding(&self, amount: u64) -> Pubkey {
        self.lock().ledger.open_holding(amount)
    }

    pub fn mint_to(&self, holding: &Pubkey, amount: u64) {
        self.lock().ledger.mint_to(holding, amount)
    }

    pub fn balance(&self, holding: &Pubkey) -> StakingResult<u64> {
        self.lock().ledger.balance(holding)
    }

    pub fn supply(&self) -> u128 {
        self.lock().ledger.supply()
    }

    pub fn pool_address(&self) -> Pubkey {
        self.lock().store.pool_address()
    }

    pub fn custody_address(&self) -> Pubkey {
        find_custody_pda(&self.pool_address()).0
    }

    pub fn pool(&self) -> Pool {
        self.lock().store.pool().clone()
    }

    pub fn user_stake(&self, participant: &Pubkey) -> Option<UserStake> {
        let state = self.lock();
        let (address, _) = state.store.user_stake_address(participant);
        state.store.user_stake(&address).cloned()
    }

    pub fn effective_balance(&self, participant: &Pubkey) -> StakingResult<u64> {
        let state = self.lock();
        let (address, _) = state.store.user_stake_address(participant);
        let user_stake = state.store.user_stake_or_default(&address);
        engine::effective_balance(state.store.pool(), &user_stake)
    }

    /// Check pool totals and custody against every stored record.
    pub fn verify(&self) -> StakingResult {
        let state = self.lock();
        let pool = state.store.pool();
        let custody_balance = state.ledger.balance(&pool.token_holding)?;
        engine::verify_pool(pool, state.store.user_stakes(), custody_balance)
    }

    /// Run the engine for `operation` against a snapshot of current state.
    /// Nothing is written; see [`TestHost::commit`].
    pub fn prepare(&self, operation: &Operation) -> StakingResult<PreparedOperation> {
        let (mut pool, pool_pk, ledger, store) = {
            let state = self.lock();
            (
                state.store.pool().clone(),
                state.store.pool_address(),
                state.ledger.clone(),
                state.store.clone(),
            )
        };
        let base_pool_revision = pool.revision;
        let mut staged = StagedLedger::new(ledger.clone());

        let (user_stake, receipt) = match operation {
            Operation::Initialize { owner } => {
                let (custody, custody_bump) = find_custody_pda(&pool_pk);
                let (_, custody_authority_bump) = find_custody_authority_pda(&pool_pk);
                let (_, pool_bump) = staking::utils::find_pool_pda();

                engine::initialize(
                    &mut pool,
                    *owner,
                    ledger.mint,
                    custody,
                    PoolBumps {
                        pool: pool_bump,
                        custody: custody_bump,
                        custody_authority: custody_authority_bump,
                    },
                )?;
                (None, Receipt::Initialized)
            }
            Operation::Stake { caller, amount } => {
                let (address, bump) = store.user_stake_address(&caller.key);
                let mut user_stake = store.user_stake_or_default(&address);
                let base_revision = user_stake.revision;

                let receipt = engine::stake(
                    &mut staged,
                    pool_pk,
                    &mut pool,
                    &mut user_stake,
                    bump,
                    *caller,
                    *amount,
                )?;
                (
                    Some((address, base_revision, user_stake)),
                    Receipt::Staked(receipt),
                )
            }
            Operation::DistributeRewards { caller, amount } => {
                let receipt = engine::distribute_rewards(&mut staged, &mut pool, *caller, *amount)?;
                (None, Receipt::Distributed(receipt))
            }
            Operation::Withdraw { caller, amount } => {
                let (address, _) = store.user_stake_address(&caller.key);
                let mut user_stake = store.user_stake(&address).cloned();
                let base_revision = user_stake.as_ref().map_or(0, |s| s.revision);

                let receipt = engine::withdraw(
                    &mut staged,
                    pool_pk,
                    &mut pool,
                    user_stake.as_mut(),
                    *caller,
                    *amount,
                )?;
                (
                    user_stake.map(|s| (address, base_revision, s)),
                    Receipt::Withdrew(receipt),
                )
            }
            Operation::Configure { signer, config } => {
                engine::configure(&mut pool, signer, config)?;
                (None, Receipt::Configured)
            }
        };

        debug!("prepared {:?} at pool revision {}", operation, base_pool_revision);

        Ok(PreparedOperation {
            base_pool_revision,
            pool,
            user_stake,
            transfers: staged.staged().to_vec(),
            receipt,
        })
    }

    /// Compare-and-commit a prepared operation. All of it lands or none of it.
    pub fn commit(&self, prepared: PreparedOperation) -> StakingResult<Receipt> {
        let mut state = self.lock();

        if state.store.pool().revision != prepared.base_pool_revision {
            warn!(
                "stale pool: prepared at revision {}, now {}",
                prepared.base_pool_revision,
                state.store.pool().revision
            );
            return err!(StakingError::StaleRecord);
        }

        if let Some((address, base_revision, _)) = &prepared.user_stake {
            let current = state.store.user_stake(address).map_or(0, |s| s.revision);
            if current != *base_revision {
                warn!(
                    "stale stake record {}: prepared at revision {}, now {}",
                    address, base_revision, current
                );
                return err!(StakingError::StaleRecord);
            }
        }

        StagedLedger::apply(&prepared.transfers, &mut state.ledger)?;

        state.store.put_pool(prepared.pool);
        if let Some((address, _, user_stake)) = prepared.user_stake {
            state.store.put_user_stake(address, user_stake);
        }

        Ok(prepared.receipt)
    }

    pub fn execute(&self, operation: Operation) -> StakingResult<Receipt> {
        let receipt = self.commit(self.prepare(&operation)?)?;
        info!("executed {:?}", operation);
        Ok(receipt)
    }

    /// [`TestHost::execute`], re-running from a fresh snapshot while the
    /// commit reports `StaleRecord`, at most `attempts` times.
    pub fn execute_with_retry(
        &self,
        operation: Operation,
        attempts: usize,
    ) -> StakingResult<Receipt> {
        let mut attempt = 1;
        loop {
            match self.execute(operation.clone()) {
                Err(e) if e == StakingError::StaleRecord.into() && attempt < attempts => {
                    debug!("retrying {:?}, attempt {}", operation, attempt);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
