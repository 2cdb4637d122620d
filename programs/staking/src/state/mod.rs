pub mod ledger;
pub mod pool;
pub mod user_stake;
