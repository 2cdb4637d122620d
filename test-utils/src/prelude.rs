pub use crate::{
    assert_custom_error, assert_staking_error, host::*, ledger::*, program::*, store::*, test::*,
    utils::*,
};
