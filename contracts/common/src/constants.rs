//! Protocol Constants
//!
//! All magic numbers and configuration values for the Jackpot protocol.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (oracle word caps, stricter pool ceilings)
//! - Default (no feature) - Testnet values (smaller ceilings for testing)
//!
//! ```toml
//! # For mainnet deployment:
//! jackpot-common = { path = "...", features = ["mainnet"] }
//! ```

/// Fixed-point precision
pub mod precision {
    /// One unit in WAD fixed point (1e18)
    pub const WAD: u128 = 1_000_000_000_000_000_000;

    /// ln(2) in WAD fixed point
    pub const LN2_WAD: u128 = 693_147_180_559_945_309;

    /// Exponent above which `exp(-x)` rounds to zero at WAD precision
    /// (e^-42 ~ 5.7e-19 < 1e-18)
    pub const EXP_ZERO_THRESHOLD_WAD: u128 = 42 * WAD;

    /// Taylor terms evaluated for `exp(-r)` with `r` in [0, ln 2)
    pub const EXP_TAYLOR_TERMS: u128 = 32;
}

/// Payout shares (in basis points, 100 = 1%)
pub mod shares {
    /// Basis points denominator
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Share of a single winner-takes-all prize
    pub const WINNER_TAKES_ALL_BPS: u16 = 10_000;
}

/// Pool and request limits
///
/// Values differ between mainnet and testnet to allow easier testing.
pub mod limits {
    /// Maximum prize slots per pool
    pub const MAX_PRIZE_SLOTS: usize = 100;

    /// Maximum tickets a single purchase may carry
    pub const MAX_TICKETS_PER_ENTRY: u64 = 1_000_000;

    /// Maximum random words per oracle request
    /// - Mainnet: 500 (VRF coordinator hard cap)
    /// - Testnet: 100
    #[cfg(feature = "mainnet")]
    pub const MAX_WORDS_PER_REQUEST: u32 = 500;
    #[cfg(not(feature = "mainnet"))]
    pub const MAX_WORDS_PER_REQUEST: u32 = 100;

    /// Maximum entry records a single pool accepts
    /// - Mainnet: 1,000,000
    /// - Testnet: 100,000
    #[cfg(feature = "mainnet")]
    pub const MAX_ENTRIES_PER_POOL: usize = 1_000_000;
    #[cfg(not(feature = "mainnet"))]
    pub const MAX_ENTRIES_PER_POOL: usize = 100_000;

    /// Helper to check if running in mainnet mode
    #[cfg(feature = "mainnet")]
    pub const IS_MAINNET: bool = true;
    #[cfg(not(feature = "mainnet"))]
    pub const IS_MAINNET: bool = false;
}

/// Domain separators for SHA-256 identifier derivation
pub mod domains {
    /// Pool identifier derivation
    pub const POOL_ID: &[u8] = b"jackpot/pool-id/v1";

    /// Randomness request identifier derivation
    pub const REQUEST_ID: &[u8] = b"jackpot/request-id/v1";

    /// Randomness request seed derivation
    pub const REQUEST_SEED: &[u8] = b"jackpot/request-seed/v1";
}
