use anchor_lang::prelude::*;

pub type StakingResult<G = ()> = Result<G>;

pub use crate::{
    errors::StakingError,
    macros::*,
    state::{
        ledger::TokenLedger,
        pool::{Pool, PoolConfigOpt},
        user_stake::UserStake,
    },
};
