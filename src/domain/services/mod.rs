pub mod perbill;
pub mod rewards_calculator;

pub use perbill::Perbill;
pub use rewards_calculator::RewardsCalculator;
