//! Pricing Curve
//!
//! Dutch-auction ticket price: starts at `price_initial` and decays toward
//! `price_initial - price_scale_constant`, never below the floor.
//!
//! ```text
//! price(t) = max(floor, initial - scale * (1 - exp(-k * t)))
//! ```

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::precision::WAD;
use crate::math::decay_factor;
use crate::types::PoolConfig;

/// Ticket pricing parameters, immutable for the life of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PricingCurve {
    /// Price at zero elapsed time
    pub price_initial: u64,
    /// Maximum total drop from the initial price
    pub price_scale_constant: u64,
    /// Decay rate per second (WAD)
    pub price_decay_constant: u128,
    /// Saturation floor
    pub price_floor: u64,
}

impl PricingCurve {
    /// Create a new pricing curve
    pub fn new(price_initial: u64, price_scale_constant: u64, price_decay_constant: u128, price_floor: u64) -> Self {
        Self {
            price_initial,
            price_scale_constant,
            price_decay_constant,
            price_floor,
        }
    }

    /// Extract the curve from a pool configuration
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(
            config.price_initial,
            config.price_scale_constant,
            config.price_decay_constant,
            config.price_floor,
        )
    }

    /// Price of one ticket `elapsed` seconds after the entry period started
    pub fn price_at(&self, elapsed: u64) -> u64 {
        let decayed = WAD - decay_factor(self.price_decay_constant, elapsed);

        // scale < 2^64 and decayed <= 1e18 < 2^60, the product fits in u128
        let drop = (self.price_scale_constant as u128) * decayed / WAD;
        let drop = drop.min(u64::MAX as u128) as u64;

        self.price_initial.saturating_sub(drop).max(self.price_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::precision::LN2_WAD;

    const ONE_TOKEN: u64 = 1_000_000;

    fn curve() -> PricingCurve {
        // 10 tokens decaying by up to 8 tokens, half-life ~1h
        PricingCurve::new(10 * ONE_TOKEN, 8 * ONE_TOKEN, WAD / 5_194, ONE_TOKEN)
    }

    #[test]
    fn test_price_starts_at_initial() {
        assert_eq!(curve().price_at(0), 10 * ONE_TOKEN);
    }

    #[test]
    fn test_price_monotone_non_increasing() {
        let curve = curve();
        let mut previous = curve.price_at(0);
        for elapsed in (0..200_000u64).step_by(37) {
            let price = curve.price_at(elapsed);
            assert!(price <= previous, "price rose at {}s", elapsed);
            previous = price;
        }
    }

    #[test]
    fn test_price_approaches_terminal() {
        let curve = curve();
        assert_eq!(curve.price_at(1_000_000), 2 * ONE_TOKEN);
        assert_eq!(curve.price_at(u64::MAX), 2 * ONE_TOKEN);
    }

    #[test]
    fn test_price_saturates_at_floor() {
        // drop larger than the initial price
        let curve = PricingCurve::new(5 * ONE_TOKEN, 50 * ONE_TOKEN, WAD, ONE_TOKEN);
        assert_eq!(curve.price_at(u64::MAX), ONE_TOKEN);

        let no_floor = PricingCurve::new(5 * ONE_TOKEN, 50 * ONE_TOKEN, WAD, 0);
        assert_eq!(no_floor.price_at(3_600), 0);
    }

    #[test]
    fn test_price_never_rises_at_full_scale() {
        // 1 wei-per-second decay, so elapsed seconds map 1:1 onto exp(-x)
        let curve = PricingCurve::new(u64::MAX, u64::MAX, 1, 0);
        for n in 1..=4u64 {
            let boundary = n * LN2_WAD as u64;
            let mut previous = curve.price_at(boundary - 1_000);
            for elapsed in (boundary - 999)..=(boundary + 1_000) {
                let price = curve.price_at(elapsed);
                assert!(price <= previous, "price rose at {}s", elapsed);
                previous = price;
            }
        }
    }

    #[test]
    fn test_zero_decay_is_flat() {
        let curve = PricingCurve::new(7 * ONE_TOKEN, 5 * ONE_TOKEN, 0, 0);
        assert_eq!(curve.price_at(0), 7 * ONE_TOKEN);
        assert_eq!(curve.price_at(86_400), 7 * ONE_TOKEN);
    }

    #[test]
    fn test_half_life() {
        // after one half-life the drop is half the scale
        let curve = curve();
        let price = curve.price_at(3_600);
        let expected = 10 * ONE_TOKEN - 4 * ONE_TOKEN;
        assert!(price.abs_diff(expected) < ONE_TOKEN / 100, "got {}", price);
    }
}
