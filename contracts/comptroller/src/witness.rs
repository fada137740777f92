//! Witness Decoding for Jackpot Actions
//!
//! Hosts submit actions as CBOR-encoded [`JackpotWitness`] values: an
//! operation code plus the fields that operation needs. Decoding maps the
//! witness onto a [`PoolAction`] for [`Comptroller::execute`](crate::Comptroller::execute).
//!
//! ```text
//! 0x10 OPEN_POOL          config, collateral
//! 0x11 BUY_ENTRY          ticket_count, payment
//! 0x12 CANCEL             -
//! 0x13 REFUND             -
//! 0x14 WITHDRAW_RESIDUAL  -
//! 0x20 DRAW_JACKPOT       quantity
//! 0x21 FULFILL_RANDOMNESS request_id, words
//! ```

use serde::{Deserialize, Serialize};

use jackpot_common::{
    errors::{JackpotError, JackpotResult},
    types::{PoolAction, PoolConfig, RandomWord, RequestId},
};

// ============ Operation Codes ============

/// Operation codes for pool actions (encoded in witness)
pub mod op {
    // Pool Operations (0x10 - 0x1F)
    pub const OPEN_POOL: u8 = 0x10;
    pub const BUY_ENTRY: u8 = 0x11;
    pub const CANCEL: u8 = 0x12;
    pub const REFUND: u8 = 0x13;
    pub const WITHDRAW_RESIDUAL: u8 = 0x14;

    // Draw Operations (0x20 - 0x2F)
    pub const DRAW_JACKPOT: u8 = 0x20;
    pub const FULFILL_RANDOMNESS: u8 = 0x21;
}

// ============ Witness Structure ============

/// Witness data for pool actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Configuration of a new pool
    pub config: Option<PoolConfig>,
    /// Seed collateral of a new pool
    pub collateral: Option<u64>,
    pub ticket_count: Option<u64>,
    /// Entry payment in base units
    pub payment: Option<u64>,
    /// Prize slots to draw
    pub quantity: Option<u32>,
    pub request_id: Option<RequestId>,
    /// Oracle random words
    pub words: Option<Vec<RandomWord>>,
}

impl JackpotWitness {
    /// Create a witness with all optional fields as None
    fn with_op(op: u8) -> Self {
        Self {
            op,
            config: None,
            collateral: None,
            ticket_count: None,
            payment: None,
            quantity: None,
            request_id: None,
            words: None,
        }
    }

    pub fn open_pool(config: PoolConfig, collateral: u64) -> Self {
        let mut w = Self::with_op(op::OPEN_POOL);
        w.config = Some(config);
        w.collateral = Some(collateral);
        w
    }

    pub fn buy_entry(ticket_count: u64, payment: u64) -> Self {
        let mut w = Self::with_op(op::BUY_ENTRY);
        w.ticket_count = Some(ticket_count);
        w.payment = Some(payment);
        w
    }

    pub fn cancel() -> Self {
        Self::with_op(op::CANCEL)
    }

    pub fn refund() -> Self {
        Self::with_op(op::REFUND)
    }

    pub fn withdraw_residual() -> Self {
        Self::with_op(op::WITHDRAW_RESIDUAL)
    }

    pub fn draw_jackpot(quantity: u32) -> Self {
        let mut w = Self::with_op(op::DRAW_JACKPOT);
        w.quantity = Some(quantity);
        w
    }

    pub fn fulfill_randomness(request_id: RequestId, words: Vec<RandomWord>) -> Self {
        let mut w = Self::with_op(op::FULFILL_RANDOMNESS);
        w.request_id = Some(request_id);
        w.words = Some(words);
        w
    }
}

// ============ Parsing Functions ============

/// Parse CBOR bytes into a witness
pub fn parse_witness(bytes: &[u8]) -> JackpotResult<JackpotWitness> {
    ciborium::from_reader(bytes).map_err(|_| JackpotError::InvalidInput {
        param: "witness",
        reason: "not a valid CBOR witness",
    })
}

/// Convert witness to internal action type
pub fn witness_to_action(w: &JackpotWitness) -> Option<PoolAction> {
    match w.op {
        op::OPEN_POOL => Some(PoolAction::OpenPool {
            config: w.config.clone()?,
            collateral: w.collateral?,
        }),
        op::BUY_ENTRY => Some(PoolAction::BuyEntry {
            ticket_count: w.ticket_count?,
            payment: w.payment?,
        }),
        op::CANCEL => Some(PoolAction::Cancel),
        op::REFUND => Some(PoolAction::Refund),
        op::WITHDRAW_RESIDUAL => Some(PoolAction::WithdrawResidual),
        op::DRAW_JACKPOT => Some(PoolAction::DrawJackpot {
            quantity: w.quantity?,
        }),
        op::FULFILL_RANDOMNESS => Some(PoolAction::FulfillRandomness {
            request_id: w.request_id?,
            words: w.words.clone()?,
        }),
        _ => None,
    }
}

/// Parse and convert in one step
pub fn decode_action(bytes: &[u8]) -> JackpotResult<PoolAction> {
    let witness = parse_witness(bytes)?;
    witness_to_action(&witness).ok_or(JackpotError::InvalidInput {
        param: "witness",
        reason: "unknown operation or missing field",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(witness: &JackpotWitness) -> Vec<u8> {
        let mut bytes = Vec::new();
        ciborium::into_writer(witness, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_decode_open_pool() {
        let config = PoolConfig {
            price_decay_constant: 192_540_000_000_000,
            payout_schedule: vec![7_000, 3_000],
            ..PoolConfig::flat(100, 10, 3_600, 7_200)
        };
        let bytes = encode(&JackpotWitness::open_pool(config.clone(), 20_000));

        assert_eq!(
            decode_action(&bytes).unwrap(),
            PoolAction::OpenPool {
                config,
                collateral: 20_000
            }
        );
    }

    #[test]
    fn test_decode_fulfillment() {
        let words = vec![[1u8; 32], [2u8; 32]];
        let bytes = encode(&JackpotWitness::fulfill_randomness([7u8; 32], words.clone()));

        assert_eq!(
            decode_action(&bytes).unwrap(),
            PoolAction::FulfillRandomness {
                request_id: [7u8; 32],
                words
            }
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut witness = JackpotWitness::buy_entry(2, 200);
        witness.payment = None;
        assert!(witness_to_action(&witness).is_none());
        assert!(matches!(
            decode_action(&encode(&witness)),
            Err(JackpotError::InvalidInput { param: "witness", .. })
        ));
    }

    #[test]
    fn test_unknown_op_rejected() {
        let witness = JackpotWitness::with_op(0xFF);
        assert!(witness_to_action(&witness).is_none());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(parse_witness(&[0xFF, 0x00, 0x13]).is_err());
    }
}
