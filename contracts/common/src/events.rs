//! Protocol Events for Jackpot
//!
//! Events are emitted by every committed transition and can be indexed
//! off-chain for analytics, notifications and auditing. A rejected
//! operation emits nothing.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, PaymentKind, PoolId, RequestId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Pool Lifecycle Events (0x01 - 0x1F)
    PoolOpened = 0x01,
    PoolCancelled = 0x02,
    EntriesClosed = 0x03,
    PoolSettled = 0x04,
    PoolRefunded = 0x05,

    // Entry Events (0x20 - 0x3F)
    EntryPurchased = 0x20,

    // Randomness Events (0x40 - 0x5F)
    RandomnessRequested = 0x40,
    RandomnessFulfilled = 0x41,

    // Settlement Events (0x60 - 0x7F)
    WinnerSelected = 0x60,
    PaymentIssued = 0x61,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum JackpotEvent {
    // ============ Pool Lifecycle Events ============

    /// Emitted when the comptroller opens a new pool
    PoolOpened {
        pool_id: PoolId,
        creator: Address,
        collateral: u64,
        start_time: u64,
        end_time: u64,
        timestamp: u64,
    },

    /// Emitted when a pool is cancelled, explicitly or at close
    PoolCancelled {
        pool_id: PoolId,
        by_creator: bool,
        timestamp: u64,
    },

    /// Emitted when the entry period closes with enough qualifiers
    EntriesClosed {
        pool_id: PoolId,
        qualifiers: u32,
        prize_basis: u64,
        timestamp: u64,
    },

    /// Emitted when every prize slot is resolved
    PoolSettled {
        pool_id: PoolId,
        winners: u32,
        total_paid: u64,
        timestamp: u64,
    },

    /// Emitted when a cancelled pool has returned all funds
    PoolRefunded {
        pool_id: PoolId,
        total_refunded: u64,
        timestamp: u64,
    },

    // ============ Entry Events ============

    /// Emitted when tickets are bought
    EntryPurchased {
        pool_id: PoolId,
        participant: Address,
        ticket_count: u64,
        price_paid_total: u64,
        effective_weight: u128,
        timestamp: u64,
    },

    // ============ Randomness Events ============

    /// Emitted when a draw asks the oracle for randomness
    RandomnessRequested {
        pool_id: PoolId,
        request_id: RequestId,
        num_words: u32,
        timestamp: u64,
    },

    /// Emitted when an oracle fulfillment is delivered to its pool
    RandomnessFulfilled {
        pool_id: PoolId,
        request_id: RequestId,
        timestamp: u64,
    },

    // ============ Settlement Events ============

    /// Emitted for every filled prize slot
    WinnerSelected {
        pool_id: PoolId,
        participant: Address,
        draw_index: u32,
        payout_amount: u64,
        timestamp: u64,
    },

    /// Emitted for every transfer a pool asks the host to execute
    PaymentIssued {
        pool_id: PoolId,
        recipient: Address,
        amount: u64,
        kind: PaymentKind,
        timestamp: u64,
    },
}

impl JackpotEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PoolOpened { .. } => EventType::PoolOpened,
            Self::PoolCancelled { .. } => EventType::PoolCancelled,
            Self::EntriesClosed { .. } => EventType::EntriesClosed,
            Self::PoolSettled { .. } => EventType::PoolSettled,
            Self::PoolRefunded { .. } => EventType::PoolRefunded,
            Self::EntryPurchased { .. } => EventType::EntryPurchased,
            Self::RandomnessRequested { .. } => EventType::RandomnessRequested,
            Self::RandomnessFulfilled { .. } => EventType::RandomnessFulfilled,
            Self::WinnerSelected { .. } => EventType::WinnerSelected,
            Self::PaymentIssued { .. } => EventType::PaymentIssued,
        }
    }

    /// Get the pool the event belongs to
    pub fn pool_id(&self) -> &PoolId {
        match self {
            Self::PoolOpened { pool_id, .. }
            | Self::PoolCancelled { pool_id, .. }
            | Self::EntriesClosed { pool_id, .. }
            | Self::PoolSettled { pool_id, .. }
            | Self::PoolRefunded { pool_id, .. }
            | Self::EntryPurchased { pool_id, .. }
            | Self::RandomnessRequested { pool_id, .. }
            | Self::RandomnessFulfilled { pool_id, .. }
            | Self::WinnerSelected { pool_id, .. }
            | Self::PaymentIssued { pool_id, .. } => pool_id,
        }
    }

    /// Get the unix time when the event occurred
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::PoolOpened { timestamp, .. }
            | Self::PoolCancelled { timestamp, .. }
            | Self::EntriesClosed { timestamp, .. }
            | Self::PoolSettled { timestamp, .. }
            | Self::PoolRefunded { timestamp, .. }
            | Self::EntryPurchased { timestamp, .. }
            | Self::RandomnessRequested { timestamp, .. }
            | Self::RandomnessFulfilled { timestamp, .. }
            | Self::WinnerSelected { timestamp, .. }
            | Self::PaymentIssued { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<JackpotEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: JackpotEvent) {
        self.events.push(event);
    }

    /// Append every event of another log, preserving order
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[JackpotEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<JackpotEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&JackpotEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Filter events by pool
    pub fn for_pool(&self, pool_id: &PoolId) -> Vec<&JackpotEvent> {
        self.events.iter().filter(|e| e.pool_id() == pool_id).collect()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
