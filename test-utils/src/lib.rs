pub mod host;
pub mod ledger;
pub mod prelude;
pub mod program;
pub mod store;
pub mod utils;
