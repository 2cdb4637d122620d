use crate::state::pool::PoolConfigOpt;
use anchor_lang::prelude::*;

// Pool events

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct PoolEventHeader {
    pub signer: Option<Pubkey>,
    pub pool: Pubkey,
}

#[event]
pub struct PoolCreateEvent {
    pub header: PoolEventHeader,
    pub mint: Pubkey,
    pub custody: Pubkey,
}

#[event]
pub struct PoolConfigureEvent {
    pub header: PoolEventHeader,
    pub config: PoolConfigOpt,
}

#[event]
pub struct DistributeRewardsEvent {
    pub header: PoolEventHeader,
    pub amount: u64,
    pub released: u64,
    pub deferred: u64,
    pub reward_per_share: u128,
    pub total_staked: u64,
}

// Stake events

#[event]
pub struct StakeEvent {
    pub header: PoolEventHeader,
    pub user_stake: Pubkey,
    pub amount: u64,
    pub created: bool,
    pub user_amount: u64,
    pub total_staked: u64,
}

#[event]
pub struct WithdrawEvent {
    pub header: PoolEventHeader,
    pub user_stake: Pubkey,
    pub amount: u64,
    pub from_rewards: u64,
    pub from_principal: u64,
    pub user_amount: u64,
    pub total_staked: u64,
}
