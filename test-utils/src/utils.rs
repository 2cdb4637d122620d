pub const RUST_LOG_DEFAULT: &str = "test_utilities=debug,staking=info";

/// Assert that `$error` (an `anchor_lang::error::Error`) carries the given
/// `StakingError` code.
#[macro_export]
macro_rules! assert_staking_error {
    ($error:expr, $matcher:expr) => {
        match $error {
            anchor_lang::error::Error::AnchorError(e) => {
                assert_eq!(
                    e.error_code_number,
                    anchor_lang::error::ERROR_CODE_OFFSET + $matcher as u32,
                    "expected {:?}, got {}",
                    $matcher,
                    e.error_name
                )
            }
            e => panic!("expected {:?}, got {:?}", $matcher, e),
        }
    };
}

/// Assert that a failed transaction (a `BanksClientError`) was rejected by the
/// program with the given `StakingError` code.
#[macro_export]
macro_rules! assert_custom_error {
    ($error:expr, $matcher:expr) => {
        match $error {
            solana_program_test::BanksClientError::TransactionError(
                solana_sdk::transaction::TransactionError::InstructionError(
                    _,
                    solana_sdk::instruction::InstructionError::Custom(n),
                ),
            ) => {
                assert_eq!(n, anchor_lang::error::ERROR_CODE_OFFSET + $matcher as u32)
            }
            e => panic!("expected {:?}, got {:?}", $matcher, e),
        }
    };
}
