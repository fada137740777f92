//! Comptroller - Pool Registry and Dispatch for Jackpot
//!
//! The comptroller is the only component that creates prize pools and the
//! caller of record every draw is authorized against. It owns:
//!
//! - an append-only registry of pool identities
//! - the arena of [`PoolState`] instances, indexed by pool id
//! - the [`RandomnessCoordinator`] correlating oracle callbacks with pools
//! - the protocol [`EventLog`]
//!
//! The registry never holds pool internals; entries, weights, winners and
//! collateral live in each pool and are only reached through its own
//! transition methods.
//!
//! ## Draw Flow
//!
//! ```text
//! draw_jackpot(pool, n)
//!   1. pool registered?            else Unauthorized
//!   2. pool.prepare_draw(n)        (no mutation, except persisting an
//!                                   automatic cancel at end_time)
//!   3. coordinator.request(pool)   -> OracleRequest for the host
//!   4. pool.begin_draw(request)    (request discarded if this fails)
//!
//! fulfill_randomness(request, words)
//!   coordinator.fulfill -> pool.settle_draw -> request consumed
//! ```

use jackpot_common::{
    check,
    errors::{JackpotError, JackpotResult},
    events::{EventLog, JackpotEvent},
    types::{
        derive_pool_id, Address, Entry, OracleRequest, Payment, PoolAction, PoolConfig, PoolId,
        PoolStatus, RandomWord, RequestId, Winner,
    },
    BTreeMap, BTreeSet,
};
use jackpot_prize_pool::{DrawSettlement, PoolState};
use jackpot_randomness::RandomnessCoordinator;

pub mod witness;


/// Result of a dispatched [`PoolAction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A new pool was created and opened
    PoolOpened(PoolId),
    /// Tickets were bought
    EntryPurchased(Entry),
    /// The creator cancelled the pool
    PoolCancelled,
    /// Randomness must be requested from the oracle
    DrawRequested(OracleRequest),
    /// A fulfillment settled a draw
    DrawSettled(DrawSettlement),
    /// Transfers for the host to execute
    Payments(Vec<Payment>),
}

/// Registry, pool arena and randomness coordinator
#[derive(Debug, Clone, Default)]
pub struct Comptroller {
    /// Pool ids in creation order
    registry: Vec<PoolId>,
    registered: BTreeSet<PoolId>,
    pools: BTreeMap<PoolId, PoolState>,
    coordinator: RandomnessCoordinator,
    events: EventLog,
    nonce: u64,
}

fn pool_mut<'a>(pools: &'a mut BTreeMap<PoolId, PoolState>, pool_id: &PoolId) -> JackpotResult<&'a mut PoolState> {
    pools
        .get_mut(pool_id)
        .ok_or(JackpotError::PoolNotFound { pool_id: *pool_id })
}

impl Comptroller {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Pool Creation ============

    /// Create, open and register a pool
    ///
    /// Fails closed: on any configuration error nothing is registered.
    pub fn create_pool(
        &mut self,
        creator: Address,
        config: PoolConfig,
        initial_collateral: u64,
        now: u64,
    ) -> JackpotResult<PoolId> {
        let pool_id = derive_pool_id(&creator, now, self.nonce);
        let nonce = self.nonce.checked_add(1).ok_or(JackpotError::Overflow)?;
        check!(!self.registered.contains(&pool_id), JackpotError::InvalidConfiguration {
            reason: "pool id already registered",
        });

        let mut log = EventLog::new();
        let mut pool = PoolState::new(pool_id, creator, config, now);
        pool.open(initial_collateral, now, &mut log)?;

        self.nonce = nonce;
        self.registry.push(pool_id);
        self.registered.insert(pool_id);
        self.pools.insert(pool_id, pool);
        self.events.extend(log);
        Ok(pool_id)
    }

    /// Alias of [`create_pool`](Self::create_pool)
    pub fn open_pool(
        &mut self,
        creator: Address,
        config: PoolConfig,
        initial_collateral: u64,
        now: u64,
    ) -> JackpotResult<PoolId> {
        self.create_pool(creator, config, initial_collateral, now)
    }

    /// Whether `address` identifies a pool created by this comptroller
    pub fn is_registered_pool(&self, address: &Address) -> bool {
        self.registered.contains(address)
    }

    // ============ Pool Operations ============

    pub fn buy_entry(
        &mut self,
        pool_id: &PoolId,
        participant: Address,
        ticket_count: u64,
        payment: u64,
        now: u64,
    ) -> JackpotResult<Entry> {
        let pool = pool_mut(&mut self.pools, pool_id)?;
        pool.buy_entry(participant, ticket_count, payment, now, &mut self.events)
    }

    pub fn cancel_pool(&mut self, pool_id: &PoolId, caller: Address, now: u64) -> JackpotResult<()> {
        let pool = pool_mut(&mut self.pools, pool_id)?;
        pool.cancel(caller, now, &mut self.events)
    }

    /// Request a draw of `quantity` prize slots for the calling pool
    pub fn draw_jackpot(&mut self, caller: Address, quantity: u32, now: u64) -> JackpotResult<OracleRequest> {
        check!(self.is_registered_pool(&caller), JackpotError::Unauthorized { caller });

        let pool = pool_mut(&mut self.pools, &caller)?;
        if let Err(err) = pool.prepare_draw(quantity, now) {
            // a pool that missed its qualifier threshold still closes
            if pool.effective_status(now) == PoolStatus::Cancelled {
                pool.advance(now, &mut self.events);
            }
            return Err(err);
        }

        let mut request_log = EventLog::new();
        let request = self
            .coordinator
            .request_randomness(caller, quantity, now, &mut request_log)?;

        let mut pool_log = EventLog::new();
        if let Err(err) = pool.begin_draw(request.request_id, quantity, now, &mut pool_log) {
            self.coordinator.discard(&request.request_id);
            return Err(err);
        }

        self.events.extend(pool_log);
        self.events.extend(request_log);
        Ok(request)
    }

    /// Oracle callback: deliver `words` to the pool that requested them
    pub fn fulfill_randomness(
        &mut self,
        request_id: &RequestId,
        words: &[RandomWord],
        now: u64,
    ) -> JackpotResult<DrawSettlement> {
        let pools = &mut self.pools;
        let mut pool_log = EventLog::new();
        let mut request_log = EventLog::new();

        let settlement = self
            .coordinator
            .fulfill(request_id, words, now, &mut request_log, |request, words| {
                let pool = pool_mut(pools, &request.pool_id)?;
                pool.settle_draw(request.request_id, words, now, &mut pool_log)
            })?;

        self.events.extend(request_log);
        self.events.extend(pool_log);
        Ok(settlement)
    }

    pub fn refund(&mut self, pool_id: &PoolId, now: u64) -> JackpotResult<Vec<Payment>> {
        let pool = pool_mut(&mut self.pools, pool_id)?;
        pool.refund(now, &mut self.events)
    }

    pub fn withdraw_residual(&mut self, pool_id: &PoolId, caller: Address, now: u64) -> JackpotResult<Payment> {
        let pool = pool_mut(&mut self.pools, pool_id)?;
        pool.withdraw_residual(caller, now, &mut self.events)
    }

    // ============ Dispatch ============

    /// Dispatch a decoded action
    ///
    /// `signer` is the caller of record: the creator for `OpenPool`, `Cancel`
    /// and `WithdrawResidual`, the participant for `BuyEntry`, the pool
    /// itself for `DrawJackpot`. `target` names the pool for per-pool
    /// actions and is ignored otherwise.
    pub fn execute(
        &mut self,
        signer: Address,
        target: PoolId,
        action: PoolAction,
        now: u64,
    ) -> JackpotResult<ActionOutcome> {
        match action {
            PoolAction::OpenPool { config, collateral } => self
                .create_pool(signer, config, collateral, now)
                .map(ActionOutcome::PoolOpened),
            PoolAction::BuyEntry { ticket_count, payment } => self
                .buy_entry(&target, signer, ticket_count, payment, now)
                .map(ActionOutcome::EntryPurchased),
            PoolAction::Cancel => self
                .cancel_pool(&target, signer, now)
                .map(|_| ActionOutcome::PoolCancelled),
            PoolAction::DrawJackpot { quantity } => self
                .draw_jackpot(signer, quantity, now)
                .map(ActionOutcome::DrawRequested),
            PoolAction::FulfillRandomness { request_id, words } => self
                .fulfill_randomness(&request_id, &words, now)
                .map(ActionOutcome::DrawSettled),
            PoolAction::Refund => self.refund(&target, now).map(ActionOutcome::Payments),
            PoolAction::WithdrawResidual => self
                .withdraw_residual(&target, signer, now)
                .map(|payment| ActionOutcome::Payments(vec![payment])),
        }
    }

    /// Decode a CBOR witness and dispatch it
    pub fn execute_witness(
        &mut self,
        signer: Address,
        target: PoolId,
        witness: &[u8],
        now: u64,
    ) -> JackpotResult<ActionOutcome> {
        let action = witness::decode_action(witness)?;
        self.execute(signer, target, action, now)
    }

    // ============ Queries ============

    pub fn pool(&self, pool_id: &PoolId) -> JackpotResult<&PoolState> {
        self.pools
            .get(pool_id)
            .ok_or(JackpotError::PoolNotFound { pool_id: *pool_id })
    }

    /// Status as of `now`
    pub fn pool_status(&self, pool_id: &PoolId, now: u64) -> JackpotResult<PoolStatus> {
        Ok(self.pool(pool_id)?.effective_status(now))
    }

    pub fn current_price(&self, pool_id: &PoolId, now: u64) -> JackpotResult<u64> {
        Ok(self.pool(pool_id)?.current_price(now))
    }

    pub fn collateral(&self, pool_id: &PoolId) -> JackpotResult<u64> {
        Ok(self.pool(pool_id)?.collateral())
    }

    pub fn entries_count(&self, pool_id: &PoolId) -> JackpotResult<usize> {
        Ok(self.pool(pool_id)?.entries_count())
    }

    pub fn winners(&self, pool_id: &PoolId) -> JackpotResult<&[Winner]> {
        Ok(self.pool(pool_id)?.winners())
    }

    /// Pool ids in creation order
    pub fn pool_ids(&self) -> &[PoolId] {
        &self.registry
    }

    pub fn pool_count(&self) -> usize {
        self.registry.len()
    }

    pub fn coordinator(&self) -> &RandomnessCoordinator {
        &self.coordinator
    }

    pub fn events(&self) -> &[JackpotEvent] {
        self.events.events()
    }

    /// Drain the event log for off-chain indexing
    pub fn take_events(&mut self) -> Vec<JackpotEvent> {
        core::mem::take(&mut self.events).into_events()
    }
}
