//! Core Types for Jackpot Protocol
//!
//! This module defines the fundamental data structures shared by the
//! prize pools, the randomness coordinator and the comptroller.

use crate::constants::{domains, shares};
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for pool identifiers
pub type PoolId = [u8; 32];

/// Type alias for randomness request identifiers
pub type RequestId = [u8; 32];

/// One verifiable random word delivered by the oracle
pub type RandomWord = [u8; 32];

// ============ Pool Types ============

/// Lifecycle status of a prize pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolStatus {
    /// Instantiated, configuration not yet validated
    #[default]
    Created,
    /// Entry period running
    Open,
    /// Cancelled before the draw; all funds refundable
    Cancelled,
    /// Entry period closed with enough qualifiers; waiting for a draw
    AwaitingDraw,
    /// Randomness requested, waiting for fulfillment
    Drawing,
    /// Winners and payouts fixed
    Settled,
    /// Cancelled pool fully refunded
    Refunded,
}

impl PoolStatus {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, PoolStatus::Settled | PoolStatus::Refunded)
    }

    /// Returns true if the pool accepts entries in this status
    pub fn accepts_entries(&self) -> bool {
        *self == PoolStatus::Open
    }
}

/// Immutable configuration of a prize pool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Ticket price at `start_time` (base units)
    pub price_initial: u64,
    /// Total price drop reached as elapsed time tends to infinity (base units)
    pub price_scale_constant: u64,
    /// Price decay rate per second (WAD, 1e18 = 1.0/s)
    pub price_decay_constant: u128,
    /// Lowest price the curve may reach (base units)
    pub price_floor: u64,
    /// Fingerprint weight decay rate per second (WAD)
    pub fingerprint_decay_constant: u128,
    /// Unix time entries open
    pub start_time: u64,
    /// Unix time after which the creator can no longer cancel
    pub cancel_time: u64,
    /// Unix time entries close
    pub end_time: u64,
    /// Distinct participants needed for the pool to proceed to a draw
    pub required_qualifiers: u32,
    /// Ticket cap across all entries (0 = unbounded)
    pub max_entries: u64,
    /// Share of the prize basis per prize slot in basis points
    /// (empty = one winner-takes-all prize)
    pub payout_schedule: Vec<u16>,
}

impl PoolConfig {
    /// Creates a config with a flat price and a single winner-takes-all prize
    pub fn flat(price: u64, start_time: u64, cancel_time: u64, end_time: u64) -> Self {
        Self {
            price_initial: price,
            start_time,
            cancel_time,
            end_time,
            ..Self::default()
        }
    }

    /// Number of prize slots (an empty schedule counts as one)
    pub fn prize_slots(&self) -> usize {
        self.payout_schedule.len().max(1)
    }

    /// Share of the given prize slot in basis points
    pub fn share_bps(&self, slot: usize) -> Option<u16> {
        if self.payout_schedule.is_empty() {
            return (slot == 0).then_some(shares::WINNER_TAKES_ALL_BPS);
        }
        self.payout_schedule.get(slot).copied()
    }

    /// Length of the entry window in seconds
    pub fn entry_window(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// A purchase of one or more tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Entry {
    /// Purchasing participant
    pub participant: Address,
    /// Tickets bought in this purchase
    pub ticket_count: u64,
    /// Total paid (ticket_count * price at purchase)
    pub price_paid_total: u64,
    /// Unix time of purchase
    pub purchased_at: u64,
    /// Participant's fingerprint weight right after this purchase (WAD)
    pub effective_weight: u128,
}

/// A selected winner and the prize attached to its slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Winner {
    /// Winning participant
    pub participant: Address,
    /// Prize slot this winner fills
    pub draw_index: u32,
    /// Prize paid for the slot
    pub payout_amount: u64,
}

// ============ Value Transfer Types ============

/// Why a payment leaves the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PaymentKind {
    /// Prize for a winning slot
    Prize,
    /// Entry price returned after cancellation
    EntryRefund,
    /// Seed collateral returned after cancellation
    CollateralRefund,
    /// Collateral left after all prizes were paid
    Residual,
}

/// A transfer the host must execute on behalf of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Payment {
    /// Receiving address
    pub recipient: Address,
    /// Amount in base units
    pub amount: u64,
    /// Reason for the transfer
    pub kind: PaymentKind,
}

impl Payment {
    /// Creates a new payment
    pub fn new(recipient: Address, amount: u64, kind: PaymentKind) -> Self {
        Self { recipient, amount, kind }
    }
}

// ============ Randomness Types ============

/// Request handed to the external randomness oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct OracleRequest {
    /// Identifier the oracle must echo back in its fulfillment
    pub request_id: RequestId,
    /// Seed mixed into the verifiable randomness
    pub seed: [u8; 32],
    /// Number of random words requested
    pub num_words: u32,
}

// ============ Actions ============

/// Actions accepted by the comptroller dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Create and open a new pool
    OpenPool { config: PoolConfig, collateral: u64 },
    /// Buy tickets in an open pool
    BuyEntry { ticket_count: u64, payment: u64 },
    /// Creator cancels an open pool
    Cancel,
    /// Registered pool requests a draw of `quantity` prize slots
    DrawJackpot { quantity: u32 },
    /// Oracle delivers randomness for a request
    FulfillRandomness {
        request_id: RequestId,
        words: Vec<RandomWord>,
    },
    /// Refund a cancelled pool
    Refund,
    /// Creator withdraws collateral left after settlement
    WithdrawResidual,
}

// ============ Identifier Derivation ============

/// Derive a deterministic pool ID
pub fn derive_pool_id(creator: &Address, created_at: u64, nonce: u64) -> PoolId {
    let mut hasher = Sha256::new();
    hasher.update(domains::POOL_ID);
    hasher.update(creator);
    hasher.update(created_at.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

/// Derive a deterministic randomness request ID
pub fn derive_request_id(pool_id: &PoolId, requested_at: u64, nonce: u64) -> RequestId {
    let mut hasher = Sha256::new();
    hasher.update(domains::REQUEST_ID);
    hasher.update(pool_id);
    hasher.update(requested_at.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

/// Derive the seed submitted with a randomness request
pub fn derive_request_seed(request_id: &RequestId, num_words: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domains::REQUEST_SEED);
    hasher.update(request_id);
    hasher.update(num_words.to_le_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schedule_is_winner_takes_all() {
        let config = PoolConfig::flat(10, 0, 100, 200);
        assert_eq!(config.prize_slots(), 1);
        assert_eq!(config.share_bps(0), Some(10_000));
        assert_eq!(config.share_bps(1), None);
    }

    #[test]
    fn test_schedule_shares() {
        let config = PoolConfig {
            payout_schedule: vec![5_000, 3_000, 2_000],
            ..PoolConfig::flat(10, 0, 100, 200)
        };
        assert_eq!(config.prize_slots(), 3);
        assert_eq!(config.share_bps(2), Some(2_000));
        assert_eq!(config.share_bps(3), None);
    }

    #[test]
    fn test_ids_are_deterministic_and_distinct() {
        let creator = [7u8; 32];
        let a = derive_pool_id(&creator, 1_000, 0);
        let b = derive_pool_id(&creator, 1_000, 0);
        let c = derive_pool_id(&creator, 1_000, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let r1 = derive_request_id(&a, 2_000, 0);
        let r2 = derive_request_id(&c, 2_000, 0);
        assert_ne!(r1, r2);
        assert_ne!(derive_request_seed(&r1, 1), derive_request_seed(&r1, 2));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(PoolStatus::Settled.is_terminal());
        assert!(PoolStatus::Refunded.is_terminal());
        assert!(!PoolStatus::Cancelled.is_terminal());
        assert!(PoolStatus::Open.accepts_entries());
        assert!(!PoolStatus::Drawing.accepts_entries());
    }
}
