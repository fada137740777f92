//! Mathematical Utilities for Jackpot Protocol
//!
//! Fixed-point exponential decay and safe arithmetic used by the pricing
//! curve, the fingerprint ledger and winner selection.

use crate::constants::precision::{EXP_TAYLOR_TERMS, EXP_ZERO_THRESHOLD_WAD, LN2_WAD, WAD};
use crate::constants::shares::BPS_DENOMINATOR;
use crate::errors::{JackpotError, JackpotResult};
use crate::types::RandomWord;

/// Compute `exp(-x)` for a WAD-scaled `x >= 0`
///
/// Splits `x = n * ln2 + r` with `r` in [0, ln2), evaluates `exp(r)` with an
/// all-positive Taylor series, inverts it and shifts right by `n`. Every
/// step rounds down and is monotone in its input, so the result never
/// increases as `x` grows, including across the `n * ln2` boundaries.
///
/// # Returns
/// WAD-scaled result in [0, WAD]; exactly WAD for `x == 0` and strictly
/// below WAD for any `x > 0`
pub fn exp_neg_wad(x: u128) -> u128 {
    if x == 0 {
        return WAD;
    }
    if x >= EXP_ZERO_THRESHOLD_WAD {
        return 0;
    }

    let n = x / LN2_WAD;
    let r = x % LN2_WAD;

    // exp(r) = sum r^i / i!, in [WAD, 2 * WAD)
    let mut exp_r = WAD;
    let mut term = WAD;
    for i in 1..=EXP_TAYLOR_TERMS {
        // term <= WAD and r < 1 WAD, so term * r stays far below u128::MAX
        term = term * r / WAD / i;
        if term == 0 {
            break;
        }
        exp_r += term;
    }

    // WAD^2 = 1e36 fits in u128 and exp_r >= WAD
    let exp_neg_r = WAD * WAD / exp_r;
    // n < 42 / ln2 < 61, shift is in range
    exp_neg_r >> n
}

/// Decay factor `exp(-rate * elapsed)` in WAD
///
/// # Arguments
/// * `rate_wad` - Decay rate per second (WAD)
/// * `elapsed` - Seconds elapsed
pub fn decay_factor(rate_wad: u128, elapsed: u64) -> u128 {
    exp_neg_wad(rate_wad.saturating_mul(elapsed as u128))
}

/// Multiply a WAD-scaled value by a WAD fraction (rounds down)
///
/// Splits `value` into whole and fractional WAD parts so the intermediate
/// product stays within u128 for any weight a ledger can hold.
pub fn wad_mul(value: u128, fraction_wad: u128) -> JackpotResult<u128> {
    let whole = (value / WAD)
        .checked_mul(fraction_wad)
        .ok_or(JackpotError::Overflow)?;
    let fractional = (value % WAD)
        .checked_mul(fraction_wad)
        .ok_or(JackpotError::Overflow)?
        / WAD;
    whole.checked_add(fractional).ok_or(JackpotError::Overflow)
}

/// Apply a basis-point share to an amount (rounds down)
pub fn apply_bps(amount: u64, bps: u16) -> JackpotResult<u64> {
    let value = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(JackpotError::Overflow)?
        / BPS_DENOMINATOR as u128;
    u64::try_from(value).map_err(|_| JackpotError::Overflow)
}

/// Reduce a 256-bit big-endian random word modulo `modulus`
///
/// Uses bitwise double-and-add so the reduction is exact for any
/// non-zero `u128` modulus.
pub fn reduce_word(word: &RandomWord, modulus: u128) -> JackpotResult<u128> {
    if modulus == 0 {
        return Err(JackpotError::DivisionByZero);
    }

    let mut acc = 0u128;
    for &byte in word.iter() {
        for bit in (0..8).rev() {
            acc = add_mod(acc, acc, modulus);
            if (byte >> bit) & 1 == 1 {
                acc = add_mod(acc, 1, modulus);
            }
        }
    }
    Ok(acc)
}

/// `(a + b) mod m` for `a, b < m` without overflow
fn add_mod(a: u128, b: u128, m: u128) -> u128 {
    let b = b % m;
    if a >= m - b {
        a - (m - b)
    } else {
        a + b
    }
}

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> JackpotResult<u64> {
    a.checked_add(b).ok_or(JackpotError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> JackpotResult<u64> {
    a.checked_sub(b).ok_or(JackpotError::Underflow)
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: u64, b: u64) -> JackpotResult<u64> {
    a.checked_mul(b).ok_or(JackpotError::Overflow)
}
