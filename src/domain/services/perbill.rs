//! Parts-per-billion fixed point fraction.
//!
//! Mirrors the runtime's `Perbill` so that payouts computed off-chain match the
//! chain's own integer arithmetic. No floating point is involved anywhere.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::cmp;
use std::fmt;

/// Denominator of every `Perbill`
pub const ACCURACY: u32 = 1_000_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Perbill(u32);

impl Perbill {
    pub fn zero() -> Self {
        Perbill(0)
    }

    pub fn one() -> Self {
        Perbill(ACCURACY)
    }

    /// Builds a fraction from raw parts, clamped to `[0, ACCURACY]`
    pub fn from_parts(parts: i64) -> Self {
        Perbill(parts.clamp(0, i64::from(ACCURACY)) as u32)
    }

    /// Approximates `p / q`, truncating towards zero.
    ///
    /// `q` is floored at one and `p` capped at `q`. Both are first divided by
    /// `max(q / ACCURACY, 1)` so the scaled numerator stays within the
    /// runtime's native width, exactly like the runtime does.
    pub fn from_rational_approximation(p: &BigUint, q: &BigUint) -> Self {
        let accuracy = BigUint::from(ACCURACY);
        let q = if q.is_zero() { BigUint::one() } else { q.clone() };
        let p = cmp::min(p, &q);

        let factor = cmp::max(&q / &accuracy, BigUint::one());
        let q_reduce = &q / &factor;
        let p_reduce = p / &factor;

        let part = p_reduce * &accuracy / q_reduce;
        Perbill(part.to_u32().unwrap_or(ACCURACY).min(ACCURACY))
    }

    pub fn deconstruct(&self) -> u32 {
        self.0
    }

    /// `self × n`, truncated
    pub fn mul_floor(&self, n: &BigUint) -> BigUint {
        n * BigUint::from(self.0) / BigUint::from(ACCURACY)
    }
}

impl fmt::Display for Perbill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, ACCURACY)
    }
}
