use thiserror::Error;

/// Error raised by the rewards calculator
#[derive(Debug, Error)]
pub enum RewardsError {
    #[error("total era reward payout '{0}' is not a valid quantity")]
    InvalidQuantity(String),
}
