//! Error Types for Jackpot Protocol
//!
//! Typed errors for every rejected operation. A failing operation never
//! leaves partial state behind, so the error is the whole story: the
//! `Display` rendering names the precondition that was violated.

use core::fmt;

use crate::types::{Address, PoolId, PoolStatus, RequestId};

/// Result type alias for Jackpot operations
pub type JackpotResult<T> = Result<T, JackpotError>;

/// Main error enum for all Jackpot protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JackpotError {
    // ============ Configuration Errors ============
    /// Pool configuration or seed collateral rejected at creation
    InvalidConfiguration { reason: &'static str },

    // ============ State Errors ============
    /// Operation attempted outside the state that allows it
    InvalidState {
        status: PoolStatus,
        action: &'static str,
    },

    /// Entry purchase attempted before the pool's start time
    EntryWindowNotStarted { start_time: u64, now: u64 },

    /// Pool not found with given ID
    PoolNotFound { pool_id: PoolId },

    // ============ Entry Errors ============
    /// Entry payment does not match ticket count times current price
    InvalidPayment { expected: u64, provided: u64 },

    /// Purchase would exceed the pool's ticket cap
    EntryCapExceeded { cap: u64, sold: u64, requested: u64 },

    // ============ Authorization Errors ============
    /// Caller is not a pool registered with the comptroller
    Unauthorized { caller: Address },

    /// Only the pool creator can perform this action
    NotCreator { creator: Address, caller: Address },

    // ============ Randomness Errors ============
    /// Pool already has an outstanding randomness request
    DuplicateRequest {
        pool_id: PoolId,
        outstanding: RequestId,
    },

    /// Request id is unknown or already consumed
    UnknownRequest { request_id: RequestId },

    /// Fulfillment does not carry one word per requested slot
    MalformedFulfillment { expected: u32, provided: u32 },

    // ============ Input Validation Errors ============
    /// Invalid input parameter
    InvalidInput {
        param: &'static str,
        reason: &'static str,
    },

    /// Amount exceeds maximum allowed
    ExceedsMaximum { amount: u64, maximum: u64 },

    /// Collateral conservation violated (paid out != held)
    ConservationViolated { held: u64, paid: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,
}

impl JackpotError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "E001_INVALID_CONFIG",
            Self::InvalidState { .. } => "E010_INVALID_STATE",
            Self::EntryWindowNotStarted { .. } => "E011_NOT_STARTED",
            Self::PoolNotFound { .. } => "E012_POOL_NOT_FOUND",
            Self::InvalidPayment { .. } => "E020_INVALID_PAYMENT",
            Self::EntryCapExceeded { .. } => "E021_ENTRY_CAP",
            Self::Unauthorized { .. } => "E030_UNAUTHORIZED",
            Self::NotCreator { .. } => "E031_NOT_CREATOR",
            Self::DuplicateRequest { .. } => "E040_DUPLICATE_REQUEST",
            Self::UnknownRequest { .. } => "E041_UNKNOWN_REQUEST",
            Self::MalformedFulfillment { .. } => "E042_MALFORMED_FULFILLMENT",
            Self::InvalidInput { .. } => "E050_INVALID_INPUT",
            Self::ExceedsMaximum { .. } => "E051_EXCEEDS_MAXIMUM",
            Self::ConservationViolated { .. } => "E060_CONSERVATION",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }
}

impl fmt::Display for JackpotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { reason } => write!(f, "invalid configuration: {}", reason),
            Self::InvalidState { status, action } => {
                write!(f, "cannot {} while pool is {:?}", action, status)
            }
            Self::EntryWindowNotStarted { start_time, now } => {
                write!(f, "entry period starts at {} (now {})", start_time, now)
            }
            Self::PoolNotFound { .. } => write!(f, "pool is not registered"),
            Self::InvalidPayment { expected, provided } => {
                write!(f, "payment must equal {} (got {})", expected, provided)
            }
            Self::EntryCapExceeded { cap, sold, requested } => write!(
                f,
                "entry cap of {} tickets exceeded ({} sold, {} requested)",
                cap, sold, requested
            ),
            Self::Unauthorized { .. } => write!(f, "sender is not a prize pool"),
            Self::NotCreator { .. } => write!(f, "sender is not the pool creator"),
            Self::DuplicateRequest { .. } => {
                write!(f, "pool already has an outstanding randomness request")
            }
            Self::UnknownRequest { .. } => write!(f, "randomness request is unknown or consumed"),
            Self::MalformedFulfillment { expected, provided } => write!(
                f,
                "fulfillment must carry {} random words (got {})",
                expected, provided
            ),
            Self::InvalidInput { param, reason } => write!(f, "{}: {}", param, reason),
            Self::ExceedsMaximum { amount, maximum } => {
                write!(f, "{} exceeds maximum of {}", amount, maximum)
            }
            Self::ConservationViolated { held, paid } => {
                write!(f, "collateral of {} cannot cover {}", held, paid)
            }
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::Underflow => write!(f, "arithmetic underflow"),
            Self::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for JackpotError {}
