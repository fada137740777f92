//! Fingerprint Ledger
//!
//! Per-pool Sybil throttle. Every participant carries a weight that decays
//! exponentially between their purchases:
//!
//! ```text
//! weight_after = weight_before * exp(-k * (now - last_entry_at)) + tickets * WAD
//! ```
//!
//! Weights, not raw ticket counts, are the probability mass used when
//! winners are drawn. Repeated entries are dampened because older weight
//! keeps decaying while new weight is only ever added linearly.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::precision::WAD;
use crate::errors::{JackpotError, JackpotResult};
use crate::math::{decay_factor, wad_mul};
use crate::types::Address;
use crate::{BTreeMap, Vec};

/// Accumulated weight of one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FingerprintRecord {
    /// Current weight (WAD), as of `last_entry_at`
    pub weight: u128,
    /// Unix time of the participant's latest purchase
    pub last_entry_at: u64,
    /// Number of purchases recorded
    pub entry_count: u32,
    /// Raw tickets bought across all purchases
    pub tickets: u64,
}

impl FingerprintRecord {
    /// Weight this record will carry after one more purchase
    fn next(&self, ticket_count: u64, now: u64, decay_constant: u128) -> JackpotResult<Self> {
        let elapsed = now.saturating_sub(self.last_entry_at);
        let retained = wad_mul(self.weight, decay_factor(decay_constant, elapsed))?;
        let weight = retained
            .checked_add(contribution(ticket_count)?)
            .ok_or(JackpotError::Overflow)?;

        Ok(Self {
            weight,
            last_entry_at: now.max(self.last_entry_at),
            entry_count: self.entry_count.checked_add(1).ok_or(JackpotError::Overflow)?,
            tickets: self.tickets.checked_add(ticket_count).ok_or(JackpotError::Overflow)?,
        })
    }
}

/// Weight contributed by a fresh purchase
fn contribution(ticket_count: u64) -> JackpotResult<u128> {
    (ticket_count as u128)
        .checked_mul(WAD)
        .ok_or(JackpotError::Overflow)
}

/// Participant weights for one pool
///
/// Participants are kept in first-entry order so the cumulative weight
/// layout used by winner selection is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FingerprintLedger {
    decay_constant: u128,
    records: BTreeMap<Address, FingerprintRecord>,
    order: Vec<Address>,
    total_weight: u128,
}

impl FingerprintLedger {
    /// Create an empty ledger with the given decay rate (WAD per second)
    pub fn new(decay_constant: u128) -> Self {
        Self {
            decay_constant,
            records: BTreeMap::new(),
            order: Vec::new(),
            total_weight: 0,
        }
    }

    /// Compute the record a purchase would produce, without committing it
    pub fn preview_entry(&self, participant: &Address, ticket_count: u64, now: u64) -> JackpotResult<FingerprintRecord> {
        match self.records.get(participant) {
            Some(record) => record.next(ticket_count, now, self.decay_constant),
            None => Ok(FingerprintRecord {
                weight: contribution(ticket_count)?,
                last_entry_at: now,
                entry_count: 1,
                tickets: ticket_count,
            }),
        }
    }

    /// Record a purchase and return the participant's new effective weight
    pub fn record_entry(&mut self, participant: Address, ticket_count: u64, now: u64) -> JackpotResult<u128> {
        let record = self.preview_entry(&participant, ticket_count, now)?;
        self.commit(participant, record)?;
        Ok(record.weight)
    }

    /// Store a previewed record
    ///
    /// The record must come from [`preview_entry`](Self::preview_entry) on
    /// the current ledger state.
    pub fn commit(&mut self, participant: Address, record: FingerprintRecord) -> JackpotResult<()> {
        let previous = self.records.get(&participant).map(|r| r.weight).unwrap_or(0);
        let total = self
            .total_weight
            .checked_sub(previous)
            .ok_or(JackpotError::Underflow)?
            .checked_add(record.weight)
            .ok_or(JackpotError::Overflow)?;

        if self.records.insert(participant, record).is_none() {
            self.order.push(participant);
        }
        self.total_weight = total;
        Ok(())
    }

    /// Current weight of a participant (0 if unknown)
    pub fn weight_of(&self, participant: &Address) -> u128 {
        self.records.get(participant).map(|r| r.weight).unwrap_or(0)
    }

    /// Full record of a participant
    pub fn record(&self, participant: &Address) -> Option<&FingerprintRecord> {
        self.records.get(participant)
    }

    /// Sum of all participant weights
    pub fn total_weight(&self) -> u128 {
        self.total_weight
    }

    /// Number of distinct participants
    pub fn participant_count(&self) -> usize {
        self.order.len()
    }

    /// Decay rate per second (WAD)
    pub fn decay_constant(&self) -> u128 {
        self.decay_constant
    }

    /// Participants and weights in first-entry order
    pub fn weights(&self) -> Vec<(Address, u128)> {
        self.order
            .iter()
            .filter_map(|p| self.records.get(p).map(|r| (*p, r.weight)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];

    #[test]
    fn test_first_entry_weight_equals_tickets() {
        let mut ledger = FingerprintLedger::new(WAD / 3_600);
        let weight = ledger.record_entry(ALICE, 3, 1_000).unwrap();
        assert_eq!(weight, 3 * WAD);
        assert_eq!(ledger.total_weight(), 3 * WAD);
        assert_eq!(ledger.participant_count(), 1);
    }

    #[test]
    fn test_repeat_entry_is_dampened() {
        let mut ledger = FingerprintLedger::new(WAD / 3_600);
        let single = ledger.record_entry(ALICE, 1, 1_000).unwrap();
        let double = ledger.record_entry(ALICE, 1, 1_060).unwrap();

        assert!(double < 2 * single, "decay must dampen repeat entries");
        assert!(double > single);
    }

    #[test]
    fn test_dampening_holds_for_smallest_gap() {
        let mut ledger = FingerprintLedger::new(1);
        let single = ledger.record_entry(ALICE, 1, 0).unwrap();
        let double = ledger.record_entry(ALICE, 1, 1).unwrap();
        assert!(double < 2 * single);
    }

    #[test]
    fn test_no_decay_constant_adds_linearly() {
        let mut ledger = FingerprintLedger::new(0);
        ledger.record_entry(ALICE, 2, 0).unwrap();
        let weight = ledger.record_entry(ALICE, 3, 10_000).unwrap();
        assert_eq!(weight, 5 * WAD);
    }

    #[test]
    fn test_same_second_entries_do_not_decay() {
        let mut ledger = FingerprintLedger::new(WAD);
        ledger.record_entry(ALICE, 1, 50).unwrap();
        let weight = ledger.record_entry(ALICE, 1, 50).unwrap();
        assert_eq!(weight, 2 * WAD);
    }

    #[test]
    fn test_old_weight_fully_decays() {
        let mut ledger = FingerprintLedger::new(WAD);
        ledger.record_entry(ALICE, 10, 0).unwrap();
        let weight = ledger.record_entry(ALICE, 1, 3_600).unwrap();
        assert_eq!(weight, WAD);
    }

    #[test]
    fn test_total_tracks_participants() {
        let mut ledger = FingerprintLedger::new(WAD / 600);
        ledger.record_entry(ALICE, 2, 0).unwrap();
        ledger.record_entry(BOB, 5, 10).unwrap();
        ledger.record_entry(ALICE, 1, 600).unwrap();

        let sum: u128 = ledger.weights().iter().map(|(_, w)| *w).sum();
        assert_eq!(ledger.total_weight(), sum);
        assert_eq!(ledger.weights()[0].0, ALICE);
        assert_eq!(ledger.weights()[1].0, BOB);
        assert_eq!(ledger.record(&ALICE).unwrap().entry_count, 2);
        assert_eq!(ledger.record(&ALICE).unwrap().tickets, 3);
    }

    #[test]
    fn test_heavy_buyer_can_buy_again_without_decay() {
        let mut ledger = FingerprintLedger::new(0);
        ledger.record_entry(ALICE, 341, 0).unwrap();
        assert_eq!(ledger.record_entry(ALICE, 1, 10).unwrap(), 342 * WAD);

        ledger.record_entry(BOB, 1_000_000, 0).unwrap();
        let weight = ledger.record_entry(BOB, 1_000_000, 3_600).unwrap();
        assert_eq!(weight, 2_000_000 * WAD);
        assert_eq!(ledger.total_weight(), 342 * WAD + 2_000_000 * WAD);
    }

    #[test]
    fn test_heavy_buyer_can_buy_again_with_decay() {
        let mut ledger = FingerprintLedger::new(WAD / 3_600);
        ledger.record_entry(ALICE, 1_000, 0).unwrap();
        let weight = ledger.record_entry(ALICE, 1_000, 60).unwrap();
        assert!(weight > 1_000 * WAD);
        assert!(weight < 2_000 * WAD);

        let decayed = wad_mul(1_000 * WAD, decay_factor(WAD / 3_600, 60)).unwrap();
        assert_eq!(weight, decayed + 1_000 * WAD);
    }

    #[test]
    fn test_preview_does_not_commit() {
        let ledger = FingerprintLedger::new(WAD / 600);
        let record = ledger.preview_entry(&ALICE, 4, 0).unwrap();
        assert_eq!(record.weight, 4 * WAD);
        assert_eq!(ledger.weight_of(&ALICE), 0);
        assert_eq!(ledger.total_weight(), 0);
    }
}
