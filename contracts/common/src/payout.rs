//! Payout Schedule
//!
//! Splits the prize basis frozen at close into per-slot prizes. Shares are
//! basis points; an empty schedule is one winner-takes-all prize. The sum
//! of shares never exceeds 100%, so prizes never exceed the basis.

use crate::constants::{limits::MAX_PRIZE_SLOTS, shares};
use crate::errors::{JackpotError, JackpotResult};
use crate::math::apply_bps;
use crate::types::PoolConfig;
use crate::Vec;

/// Validated per-slot shares of the prize basis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutSchedule {
    shares: Vec<u16>,
}

impl PayoutSchedule {
    /// Validate a list of basis-point shares
    ///
    /// # Errors
    /// `InvalidConfiguration` if the list is longer than the slot cap,
    /// contains a zero share or sums to more than 10 000 bps
    pub fn new(shares: Vec<u16>) -> JackpotResult<Self> {
        if shares.is_empty() {
            return Ok(Self::winner_takes_all());
        }
        if shares.len() > MAX_PRIZE_SLOTS {
            return Err(JackpotError::InvalidConfiguration {
                reason: "too many prize slots",
            });
        }
        if shares.iter().any(|s| *s == 0) {
            return Err(JackpotError::InvalidConfiguration {
                reason: "prize shares must be positive",
            });
        }
        let total: u64 = shares.iter().map(|s| *s as u64).sum();
        if total > shares::BPS_DENOMINATOR {
            return Err(JackpotError::InvalidConfiguration {
                reason: "prize shares exceed the prize basis",
            });
        }
        Ok(Self { shares })
    }

    /// Single slot receiving the whole basis
    pub fn winner_takes_all() -> Self {
        Self {
            shares: Vec::from([shares::WINNER_TAKES_ALL_BPS]),
        }
    }

    /// Validate the schedule carried by a pool configuration
    pub fn from_config(config: &PoolConfig) -> JackpotResult<Self> {
        Self::new(config.payout_schedule.clone())
    }

    /// Number of prize slots
    pub fn slots(&self) -> usize {
        self.shares.len()
    }

    /// Share of a slot in basis points
    pub fn share_bps(&self, slot: usize) -> Option<u16> {
        self.shares.get(slot).copied()
    }

    /// Prize paid for `slot` out of `basis`
    pub fn payout_for(&self, slot: usize, basis: u64) -> JackpotResult<u64> {
        let bps = self.share_bps(slot).ok_or(JackpotError::InvalidInput {
            param: "slot",
            reason: "no such prize slot",
        })?;
        apply_bps(basis, bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_winner_takes_all() {
        let schedule = PayoutSchedule::new(vec![]).unwrap();
        assert_eq!(schedule.slots(), 1);
        assert_eq!(schedule.payout_for(0, 20_000).unwrap(), 20_000);
    }

    #[test]
    fn test_split_payouts() {
        let schedule = PayoutSchedule::new(vec![5_000, 3_000, 1_500]).unwrap();
        assert_eq!(schedule.payout_for(0, 10_001).unwrap(), 5_000);
        assert_eq!(schedule.payout_for(1, 10_001).unwrap(), 3_000);
        assert_eq!(schedule.payout_for(2, 10_001).unwrap(), 1_500);
        assert!(schedule.payout_for(3, 10_001).is_err());
    }

    #[test]
    fn test_total_never_exceeds_basis() {
        let schedule = PayoutSchedule::new(vec![3_334, 3_333, 3_333]).unwrap();
        let basis = 1_000_003;
        let paid: u64 = (0..3).map(|s| schedule.payout_for(s, basis).unwrap()).sum();
        assert!(paid <= basis);
    }

    #[test]
    fn test_rejects_invalid_schedules() {
        assert!(matches!(
            PayoutSchedule::new(vec![6_000, 5_000]),
            Err(JackpotError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            PayoutSchedule::new(vec![5_000, 0]),
            Err(JackpotError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            PayoutSchedule::new(vec![1; MAX_PRIZE_SLOTS + 1]),
            Err(JackpotError::InvalidConfiguration { .. })
        ));
    }
}
