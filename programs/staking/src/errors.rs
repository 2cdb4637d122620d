use anchor_lang::prelude::*;

#[error_code]
pub enum StakingError {
    #[msg("Pool is already initialized")] // 6000
    AlreadyInitialized,
    #[msg("Signer is not authorized for this record")] // 6001
    Unauthorized,
    #[msg("Amount must be greater than zero")] // 6002
    InvalidAmount,
    #[msg("Token holding cannot cover the transfer")] // 6003
    InsufficientFunds,
    #[msg("Withdrawal exceeds the effective staked balance")] // 6004
    InsufficientStake,
    #[msg("Arithmetic overflow")] // 6005
    ArithmeticOverflow,
    #[msg("Arithmetic underflow")] // 6006
    ArithmeticUnderflow,
    #[msg("User stake record not found")] // 6007
    NotFound,
    #[msg("Pool operation is paused")] // 6008
    PoolPaused,
    #[msg("Invalid pool config")] // 6009
    InvalidPoolConfig,
    #[msg("Token holding is not part of this operation")] // 6010
    InvalidTokenHolding,
    #[msg("Record changed since it was read, retry with fresh state")] // 6011
    StaleRecord,
    #[msg("Pool custody is below total staked")] // 6012
    CustodyInvariantViolated,
    #[msg("Total staked does not match the stake records")] // 6013
    TotalStakedMismatch,
}
