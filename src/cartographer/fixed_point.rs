//! Fixed-point log2 and the rate -> cost transform
//!
//! Rates are 1e18-scaled ratios (`amount_out * SCALE / amount_in`). Costs are
//! `-log2(rate / SCALE)` in signed Q128.128, so a path's summed cost is the
//! negated log of the product of its rates.
//!
//! `log2` takes the integer part from the most significant bit and produces
//! the fraction one bit per round by squaring a 128-bit mantissa. Each round
//! truncates the mantissa by at most one unit in 2^127, which keeps the
//! absolute error of the result below 2^-120. For inputs below 2^128 the
//! mantissa is exact before the first round and the result is strictly
//! increasing in the input; above that the low input bits are dropped.

use alloy_primitives::{I256, U256};
use lazy_static::lazy_static;
use std::fmt;

/// Fixed-point scale of a rate (1.0 == 1e18)
pub const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Fractional bits of the Q128.128 format
pub const FRACTIONAL_BITS: usize = 128;

/// Mantissa is normalised to [2^127, 2^128)
const MANTISSA_BITS: usize = 127;

lazy_static! {
    static ref LOG2_SCALE: U256 = log2(SCALE);
}

/// log2(x) in unsigned Q128.128.
///
/// # Panics
///
/// Panics if `x` is zero; callers map a zero rate to [`Cost::INFINITE`]
/// before reaching this routine.
pub fn log2(x: U256) -> U256 {
    assert!(!x.is_zero(), "log2 is undefined for zero");

    let msb = 255 - x.leading_zeros();

    let mut mantissa = if msb >= MANTISSA_BITS {
        x >> (msb - MANTISSA_BITS)
    } else {
        x << (MANTISSA_BITS - msb)
    };

    let two = U256::from(1u64) << (MANTISSA_BITS + 1);
    let mut fraction = U256::ZERO;

    for bit in (0..FRACTIONAL_BITS).rev() {
        // mantissa < 2^128, so the square fits in 256 bits
        mantissa = (mantissa * mantissa) >> MANTISSA_BITS;
        if mantissa >= two {
            mantissa >>= 1usize;
            fraction |= U256::from(1u64) << bit;
        }
    }

    (U256::from(msb) << FRACTIONAL_BITS) | fraction
}

/// `amount_out` per `amount_in`, scaled by [`SCALE`]. Saturates on overflow.
pub fn rate_of(amount_in: U256, amount_out: U256) -> U256 {
    if amount_in.is_zero() {
        return U256::ZERO;
    }
    match amount_out.checked_mul(SCALE) {
        Some(scaled) => scaled / amount_in,
        None => U256::MAX,
    }
}

/// Edge cost of a rate: `+INF` for zero, otherwise `-log2(rate / SCALE)`.
pub fn to_cost(rate: U256) -> Cost {
    if rate.is_zero() {
        return Cost::INFINITE;
    }
    Cost(I256::from_raw(*LOG2_SCALE) - I256::from_raw(log2(rate)))
}

/// Signed Q128.128 log-domain cost with a `+INF` sentinel
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(I256);

impl Cost {
    pub const ZERO: Cost = Cost(I256::ZERO);
    pub const INFINITE: Cost = Cost(I256::MAX);

    pub fn from_raw(raw: I256) -> Self {
        Cost(raw)
    }

    pub fn raw(&self) -> I256 {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        *self != Self::INFINITE
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Sum of two costs; anything plus infinity is infinity
    pub fn saturating_add(self, other: Cost) -> Cost {
        if !self.is_finite() || !other.is_finite() {
            return Self::INFINITE;
        }
        Cost(self.0.saturating_add(other.0))
    }

    /// Approximate value in bits, for logs and display only
    pub fn to_f64(&self) -> f64 {
        if !self.is_finite() {
            return f64::INFINITY;
        }
        let magnitude = q128_to_f64(self.0.unsigned_abs());
        if self.0.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Aggregate rate a cost stands for (`2^-cost`), for display only
    pub fn implied_rate(&self) -> f64 {
        (-self.to_f64()).exp2()
    }
}

impl fmt::Debug for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finite() {
            write!(f, "Cost({:.6})", self.to_f64())
        } else {
            write!(f, "Cost(+INF)")
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finite() {
            write!(f, "{:.6}", self.to_f64())
        } else {
            write!(f, "+INF")
        }
    }
}

/// Unsigned Q128.128 to f64
pub fn q128_to_f64(value: U256) -> f64 {
    // Keep 64 fractional bits; anything at or above 2^192 is out of range here
    if value >= (U256::from(1u64) << 192usize) {
        return f64::INFINITY;
    }
    let scaled = (value >> 64usize).to::<u128>();
    scaled as f64 / 2f64.powi(64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_log2_of_powers_of_two_is_exact() {
        for k in [0usize, 1, 7, 64, 127, 128, 200, 255] {
            let x = U256::from(1u64) << k;
            assert_eq!(log2(x), U256::from(k) << FRACTIONAL_BITS, "log2(2^{})", k);
        }
    }

    #[test]
    fn test_log2_of_three() {
        let value = q128_to_f64(log2(U256::from(3u64)));
        assert!((value - 3f64.log2()).abs() < 1e-12, "got {}", value);
    }

    #[test]
    #[should_panic(expected = "log2 is undefined for zero")]
    fn test_log2_of_zero_panics() {
        log2(U256::ZERO);
    }

    #[test]
    fn test_unit_rate_costs_nothing() {
        assert_eq!(to_cost(SCALE), Cost::ZERO);
        assert_ne!(to_cost(SCALE + U256::from(1u64)), Cost::ZERO);
        assert_ne!(to_cost(SCALE - U256::from(1u64)), Cost::ZERO);
    }

    #[test]
    fn test_zero_rate_is_infinite() {
        assert_eq!(to_cost(U256::ZERO), Cost::INFINITE);
        assert!(!to_cost(U256::ZERO).is_finite());
    }

    #[test]
    fn test_doubling_rate_subtracts_one_bit() {
        let one_bit = I256::from_raw(U256::from(1u64) << FRACTIONAL_BITS);
        assert_eq!(to_cost(SCALE * U256::from(2u64)).raw(), -one_bit);
        assert_eq!(to_cost(SCALE / U256::from(2u64)).raw(), one_bit);
    }

    #[test]
    fn test_better_than_par_is_negative() {
        assert!(to_cost(SCALE * U256::from(3u64)).is_negative());
        assert!(!to_cost(SCALE / U256::from(3u64)).is_negative());
    }

    #[test]
    fn test_rate_of() {
        assert_eq!(rate_of(U256::from(10u64), U256::from(20u64)), SCALE * U256::from(2u64));
        assert_eq!(rate_of(U256::ZERO, U256::from(20u64)), U256::ZERO);
        assert_eq!(rate_of(U256::from(1u64), U256::MAX), U256::MAX);
    }

    #[test]
    fn test_infinity_absorbs_addition() {
        let c = to_cost(SCALE * U256::from(5u64));
        assert_eq!(c.saturating_add(Cost::INFINITE), Cost::INFINITE);
        assert_eq!(Cost::INFINITE.saturating_add(c), Cost::INFINITE);
        assert_eq!(c.saturating_add(Cost::ZERO), c);
    }

    #[test]
    fn test_implied_rate_inverts_cost() {
        assert!((to_cost(SCALE * U256::from(2u64)).implied_rate() - 2.0).abs() < 1e-12);
        assert!((to_cost(SCALE / U256::from(4u64)).implied_rate() - 0.25).abs() < 1e-12);
        assert_eq!(Cost::ZERO.implied_rate(), 1.0);
        assert_eq!(Cost::INFINITE.implied_rate(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_log2_matches_f64_reference(x in 1u64..u64::MAX) {
            let approx = q128_to_f64(log2(U256::from(x)));
            let reference = (x as f64).log2();
            prop_assert!((approx - reference).abs() < 1e-9, "x={} approx={} ref={}", x, approx, reference);
        }

        #[test]
        fn prop_log2_strictly_increasing(x in 1u128..(u128::MAX - 1), step in 1u128..1_000_000u128) {
            let y = x.saturating_add(step);
            prop_assume!(y > x);
            prop_assert!(log2(U256::from(x)) < log2(U256::from(y)));
        }

        #[test]
        fn prop_cost_strictly_decreasing(a in 1u128..u128::MAX, b in 1u128..u128::MAX) {
            prop_assume!(a != b);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(to_cost(U256::from(lo)) > to_cost(U256::from(hi)));
        }
    }
}
