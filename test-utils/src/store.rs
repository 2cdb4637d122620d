use anchor_lang::prelude::*;
use staking::{
    prelude::*,
    utils::{find_pool_pda, find_user_stake_pda},
};
use std::collections::BTreeMap;

/// Record store keyed by derived address.
///
/// An address that was never written reads back as the zeroed record, the
/// same way an unallocated account deserializes to nothing on chain.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pool: Pool,
    user_stakes: BTreeMap<Pubkey, UserStake>,
}

impl RecordStore {
    pub fn pool_address(&self) -> Pubkey {
        find_pool_pda().0
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn put_pool(&mut self, pool: Pool) {
        self.pool = pool;
    }

    /// Address and bump of the participant's stake record.
    pub fn user_stake_address(&self, participant: &Pubkey) -> (Pubkey, u8) {
        find_user_stake_pda(participant)
    }

    pub fn user_stake(&self, address: &Pubkey) -> Option<&UserStake> {
        self.user_stakes.get(address)
    }

    pub fn user_stake_or_default(&self, address: &Pubkey) -> UserStake {
        self.user_stakes.get(address).cloned().unwrap_or_default()
    }

    pub fn put_user_stake(&mut self, address: Pubkey, user_stake: UserStake) {
        self.user_stakes.insert(address, user_stake);
    }

    pub fn user_stakes(&self) -> impl Iterator<Item = &UserStake> {
        self.user_stakes.values()
    }
}
