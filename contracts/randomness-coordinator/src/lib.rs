//! Randomness Coordinator
//!
//! Correlates oracle fulfillments with the pools that asked for them.
//!
//! ```text
//! request_randomness(pool) --> OracleRequest --> [external oracle]
//!                                                       |
//! fulfill(request_id, words) <--------------------------+
//!     |-- unknown / consumed id  -> UnknownRequest
//!     |-- wrong word count       -> MalformedFulfillment
//!     +-- deliver(pool, words)   -> consumed on success
//! ```
//!
//! The coordinator is the single authority on whether a request id has
//! been consumed. A request moves to the consumed set only after delivery to
//! its pool commits, so a rejected delivery leaves it outstanding and a
//! duplicate callback after success is always rejected.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use jackpot_common::{
    check,
    constants::limits::MAX_WORDS_PER_REQUEST,
    errors::{JackpotError, JackpotResult},
    events::{EventLog, JackpotEvent},
    types::{derive_request_id, derive_request_seed, OracleRequest, PoolId, RandomWord, RequestId},
    BTreeMap, BTreeSet,
};

/// Outstanding randomness request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PendingRequest {
    pub request_id: RequestId,
    /// Pool the fulfillment is delivered to
    pub pool_id: PoolId,
    /// Words the fulfillment must carry
    pub num_words: u32,
    pub seed: [u8; 32],
    pub requested_at: u64,
}

impl PendingRequest {
    /// The request as handed to the oracle
    pub fn oracle_request(&self) -> OracleRequest {
        OracleRequest {
            request_id: self.request_id,
            seed: self.seed,
            num_words: self.num_words,
        }
    }
}

/// Request table keyed by request id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RandomnessCoordinator {
    pending: BTreeMap<RequestId, PendingRequest>,
    /// At most one outstanding request per pool
    outstanding: BTreeMap<PoolId, RequestId>,
    consumed: BTreeSet<RequestId>,
    nonce: u64,
}

impl RandomnessCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request of `quantity` words on behalf of `pool_id`
    ///
    /// # Errors
    /// - `DuplicateRequest` if the pool already waits on a request
    /// - `InvalidInput` / `ExceedsMaximum` if `quantity` is outside
    ///   `1..=MAX_WORDS_PER_REQUEST`
    pub fn request_randomness(
        &mut self,
        pool_id: PoolId,
        quantity: u32,
        now: u64,
        events: &mut EventLog,
    ) -> JackpotResult<OracleRequest> {
        if let Some(outstanding) = self.outstanding.get(&pool_id) {
            return Err(JackpotError::DuplicateRequest {
                pool_id,
                outstanding: *outstanding,
            });
        }
        check!(quantity >= 1, JackpotError::InvalidInput {
            param: "quantity",
            reason: "must request at least one word",
        });
        check!(quantity <= MAX_WORDS_PER_REQUEST, JackpotError::ExceedsMaximum {
            amount: quantity as u64,
            maximum: MAX_WORDS_PER_REQUEST as u64,
        });

        let request_id = derive_request_id(&pool_id, now, self.nonce);
        let nonce = self.nonce.checked_add(1).ok_or(JackpotError::Overflow)?;
        check!(
            !self.pending.contains_key(&request_id) && !self.consumed.contains(&request_id),
            JackpotError::DuplicateRequest {
                pool_id,
                outstanding: request_id,
            }
        );

        let request = PendingRequest {
            request_id,
            pool_id,
            num_words: quantity,
            seed: derive_request_seed(&request_id, quantity),
            requested_at: now,
        };
        let oracle_request = request.oracle_request();

        self.nonce = nonce;
        self.pending.insert(request_id, request);
        self.outstanding.insert(pool_id, request_id);

        events.emit(JackpotEvent::RandomnessRequested {
            pool_id,
            request_id,
            num_words: quantity,
            timestamp: now,
        });
        Ok(oracle_request)
    }

    /// Deliver an oracle fulfillment to the originating pool, at most once
    ///
    /// `deliver` runs the pool-side settlement. The request is consumed only
    /// if it returns `Ok`; otherwise the error is passed through and the
    /// request stays outstanding.
    pub fn fulfill<R, F>(
        &mut self,
        request_id: &RequestId,
        words: &[RandomWord],
        now: u64,
        events: &mut EventLog,
        deliver: F,
    ) -> JackpotResult<R>
    where
        F: FnOnce(&PendingRequest, &[RandomWord]) -> JackpotResult<R>,
    {
        let request = self
            .pending
            .get(request_id)
            .ok_or(JackpotError::UnknownRequest {
                request_id: *request_id,
            })?;
        check!(words.len() == request.num_words as usize, JackpotError::MalformedFulfillment {
            expected: request.num_words,
            provided: words.len() as u32,
        });

        let result = deliver(request, words)?;

        // Consume
        let pool_id = request.pool_id;
        self.pending.remove(request_id);
        self.outstanding.remove(&pool_id);
        self.consumed.insert(*request_id);

        events.emit(JackpotEvent::RandomnessFulfilled {
            pool_id,
            request_id: *request_id,
            timestamp: now,
        });
        Ok(result)
    }

    /// Drop a request that never reached the oracle
    ///
    /// The id is not marked consumed.
    pub fn discard(&mut self, request_id: &RequestId) -> Option<PendingRequest> {
        let request = self.pending.remove(request_id)?;
        self.outstanding.remove(&request.pool_id);
        Some(request)
    }

    // ============ Queries ============

    pub fn pending(&self, request_id: &RequestId) -> Option<&PendingRequest> {
        self.pending.get(request_id)
    }

    /// Request the pool is currently waiting on
    pub fn outstanding_for(&self, pool_id: &PoolId) -> Option<&RequestId> {
        self.outstanding.get(pool_id)
    }

    pub fn is_consumed(&self, request_id: &RequestId) -> bool {
        self.consumed.contains(request_id)
    }

    pub fn outstanding_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackpot_common::events::EventType;

    const POOL_A: PoolId = [1u8; 32];
    const POOL_B: PoolId = [2u8; 32];

    fn words(n: usize) -> Vec<RandomWord> {
        (0..n).map(|i| [i as u8; 32]).collect()
    }

    #[test]
    fn test_request_records_pool() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let request = coordinator.request_randomness(POOL_A, 3, 100, &mut events).unwrap();

        assert_eq!(request.num_words, 3);
        assert_eq!(coordinator.outstanding_for(&POOL_A), Some(&request.request_id));
        assert_eq!(coordinator.pending(&request.request_id).unwrap().pool_id, POOL_A);
        assert_eq!(events.filter_by_type(EventType::RandomnessRequested).len(), 1);
    }

    #[test]
    fn test_duplicate_request_rejected() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let first = coordinator.request_randomness(POOL_A, 1, 100, &mut events).unwrap();

        assert_eq!(
            coordinator.request_randomness(POOL_A, 1, 101, &mut events),
            Err(JackpotError::DuplicateRequest {
                pool_id: POOL_A,
                outstanding: first.request_id
            })
        );
        // other pools are independent
        assert!(coordinator.request_randomness(POOL_B, 1, 101, &mut events).is_ok());
        assert_eq!(coordinator.outstanding_count(), 2);
    }

    #[test]
    fn test_quantity_bounds() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        assert!(matches!(
            coordinator.request_randomness(POOL_A, 0, 100, &mut events),
            Err(JackpotError::InvalidInput { .. })
        ));
        assert!(matches!(
            coordinator.request_randomness(POOL_A, MAX_WORDS_PER_REQUEST + 1, 100, &mut events),
            Err(JackpotError::ExceedsMaximum { .. })
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn test_fulfill_at_most_once() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let request = coordinator.request_randomness(POOL_A, 2, 100, &mut events).unwrap();

        let delivered = coordinator
            .fulfill(&request.request_id, &words(2), 200, &mut events, |pending, words| {
                Ok((pending.pool_id, words.len()))
            })
            .unwrap();
        assert_eq!(delivered, (POOL_A, 2));
        assert!(coordinator.is_consumed(&request.request_id));
        assert_eq!(coordinator.outstanding_for(&POOL_A), None);

        let mut calls = 0;
        let replay = coordinator.fulfill(&request.request_id, &words(2), 201, &mut events, |_, _| {
            calls += 1;
            Ok(())
        });
        assert_eq!(
            replay,
            Err(JackpotError::UnknownRequest {
                request_id: request.request_id
            })
        );
        assert_eq!(calls, 0);
        assert_eq!(events.filter_by_type(EventType::RandomnessFulfilled).len(), 1);
    }

    #[test]
    fn test_fulfill_unknown_request() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let result = coordinator.fulfill(&[9u8; 32], &words(1), 100, &mut events, |_, _| Ok(()));
        assert!(matches!(result, Err(JackpotError::UnknownRequest { .. })));
    }

    #[test]
    fn test_fulfill_word_count_mismatch() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let request = coordinator.request_randomness(POOL_A, 3, 100, &mut events).unwrap();

        assert_eq!(
            coordinator.fulfill(&request.request_id, &words(2), 200, &mut events, |_, _| Ok(())),
            Err(JackpotError::MalformedFulfillment { expected: 3, provided: 2 })
        );
        // still outstanding, a well-formed callback goes through
        assert!(!coordinator.is_consumed(&request.request_id));
        assert!(coordinator
            .fulfill(&request.request_id, &words(3), 200, &mut events, |_, _| Ok(()))
            .is_ok());
    }

    #[test]
    fn test_failed_delivery_keeps_request() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let request = coordinator.request_randomness(POOL_A, 1, 100, &mut events).unwrap();

        let result: JackpotResult<()> = coordinator.fulfill(&request.request_id, &words(1), 200, &mut events, |_, _| {
            Err(JackpotError::Overflow)
        });
        assert_eq!(result, Err(JackpotError::Overflow));
        assert!(coordinator.pending(&request.request_id).is_some());
        assert!(!coordinator.is_consumed(&request.request_id));
    }

    #[test]
    fn test_discard_frees_pool() {
        let mut coordinator = RandomnessCoordinator::new();
        let mut events = EventLog::new();
        let request = coordinator.request_randomness(POOL_A, 1, 100, &mut events).unwrap();

        assert!(coordinator.discard(&request.request_id).is_some());
        assert_eq!(coordinator.outstanding_count(), 0);
        assert!(!coordinator.is_consumed(&request.request_id));

        let next = coordinator.request_randomness(POOL_A, 1, 100, &mut events).unwrap();
        assert_ne!(next.request_id, request.request_id);
    }
}
