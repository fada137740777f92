//! Validation Helpers for Jackpot Protocol
//!
//! Guard-clause macro and collateral conservation checks shared by the
//! pool state machine and the comptroller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jackpot_common::validation::{check, collateral_covers};
//!
//! check!(ticket_count > 0, JackpotError::InvalidInput {
//!     param: "ticket_count",
//!     reason: "must be positive",
//! });
//!
//! collateral_covers(pool.collateral, &payments)?;
//! ```

use crate::{
    errors::{JackpotError, JackpotResult},
    types::Payment,
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// # Examples
///
/// ```rust,ignore
/// check!(quantity >= 1, JackpotError::InvalidInput {
///     param: "quantity",
///     reason: "must draw at least one slot",
/// });
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

// ============ Collateral Conservation ============

/// Sum payment amounts with overflow check
pub fn sum_payments(payments: &[Payment]) -> JackpotResult<u64> {
    payments
        .iter()
        .try_fold(0u64, |acc, p| acc.checked_add(p.amount))
        .ok_or(JackpotError::Overflow)
}

/// Validates that the payments fit inside the collateral held.
///
/// Payouts plus refunds can never exceed the pool balance.
pub fn collateral_covers(held: u64, payments: &[Payment]) -> JackpotResult<u64> {
    let paid = sum_payments(payments)?;
    if paid > held {
        return Err(JackpotError::ConservationViolated { held, paid });
    }
    Ok(held - paid)
}

/// Validates that the payments drain the collateral exactly.
///
/// Used when a pool is wound down: the balance must reach zero.
pub fn collateral_drained(held: u64, payments: &[Payment]) -> JackpotResult<()> {
    let paid = sum_payments(payments)?;
    if paid != held {
        return Err(JackpotError::ConservationViolated { held, paid });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentKind;

    fn payment(amount: u64) -> Payment {
        Payment::new([1u8; 32], amount, PaymentKind::Prize)
    }

    fn guarded(value: u64) -> JackpotResult<u64> {
        check!(value > 0, JackpotError::InvalidInput {
            param: "value",
            reason: "must be positive",
        });
        Ok(value)
    }

    #[test]
    fn test_check_macro() {
        assert_eq!(guarded(5), Ok(5));
        assert!(matches!(guarded(0), Err(JackpotError::InvalidInput { param: "value", .. })));
    }

    #[test]
    fn test_collateral_covers() {
        let payments = [payment(40), payment(50)];
        assert_eq!(collateral_covers(100, &payments), Ok(10));
        assert_eq!(
            collateral_covers(80, &payments),
            Err(JackpotError::ConservationViolated { held: 80, paid: 90 })
        );
    }

    #[test]
    fn test_collateral_drained() {
        let payments = [payment(40), payment(60)];
        assert!(collateral_drained(100, &payments).is_ok());
        assert!(collateral_drained(101, &payments).is_err());
    }

    #[test]
    fn test_sum_payments_overflow() {
        let payments = [payment(u64::MAX), payment(1)];
        assert_eq!(sum_payments(&payments), Err(JackpotError::Overflow));
    }
}
