pub mod configure;
pub mod distribute_rewards;
pub mod initialize;
pub mod stake;
pub mod withdraw;

pub use configure::*;
pub use distribute_rewards::*;
pub use initialize::*;
pub use stake::*;
pub use withdraw::*;
