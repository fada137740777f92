//! Jackpot Common Library
//!
//! Shared types, constants, and accounting primitives for every Jackpot
//! component. The prize-pool state machine, the randomness coordinator and
//! the comptroller all build on the pieces defined here.
//!
//! ## Building Blocks
//!
//! - **Pricing Curve**: Dutch-auction ticket price decaying from an initial price
//! - **Fingerprint Ledger**: Per-participant decayed weight, the Sybil throttle
//! - **Payout Schedule**: Per-slot prize shares in basis points
//! - **Winner Selection**: Pure cumulative-weight draw over ledger weights
//! - **Events**: Typed protocol events collected in an [`EventLog`]
//! - **Fixed-Point Math**: WAD-scaled exponential decay and checked arithmetic
//!
//! This crate is `no_std` compatible (with `alloc`) when built without the
//! default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

#[cfg(not(feature = "std"))]
pub use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
pub use std::collections::{BTreeMap, BTreeSet};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod validation;
pub mod pricing;
pub mod fingerprint;
pub mod payout;
pub mod selection;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use events::{EventLog, EventType, JackpotEvent};
pub use pricing::PricingCurve;
pub use fingerprint::{FingerprintLedger, FingerprintRecord};
pub use payout::PayoutSchedule;
pub use selection::WeightedDraw;
