//! Prize Pool - Per-Instance Lottery State Machine
//!
//! One `PoolState` per prize pool. It owns the pool's configuration, entry
//! records, fingerprint ledger, winners and collateral balance, and exposes
//! every lifecycle transition as a method that either commits completely or
//! returns an error with the pool untouched.
//!
//! ## Lifecycle
//!
//! ```text
//! Created --open--> Open --cancel / too few qualifiers--> Cancelled --refund--> Refunded
//!                    |
//!                    +--end_time reached--> AwaitingDraw --draw--> Drawing
//!                                               ^                    |
//!                                               +--slots remain------+--all drawn--> Settled
//! ```
//!
//! The close at `end_time` is time-derived: [`PoolState::effective_status`]
//! reports it as soon as the clock passes `end_time`, and the next committed
//! operation persists it.
//!
//! ## Value Transfers
//!
//! Inbound value arrives as the `collateral` / `payment` arguments. Outbound
//! value is returned as [`Payment`] lists that the host executes; the pool
//! debits its collateral by exactly the amount it asks the host to pay.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use jackpot_common::{
    check,
    constants::limits,
    errors::{JackpotError, JackpotResult},
    events::{EventLog, JackpotEvent},
    fingerprint::FingerprintLedger,
    math::{safe_add, safe_mul},
    payout::PayoutSchedule,
    pricing::PricingCurve,
    selection::WeightedDraw,
    types::{Address, Entry, Payment, PaymentKind, PoolConfig, PoolId, PoolStatus, RandomWord, RequestId, Winner},
    validation::{collateral_covers, collateral_drained},
    BTreeSet,
};

// ============ Draw Bookkeeping ============

/// Draw awaiting its randomness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PendingDraw {
    /// Request the oracle must answer
    pub request_id: RequestId,
    /// Prize slots this draw fills
    pub quantity: u32,
}

/// Outcome of a fulfilled draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DrawSettlement {
    /// Pool that was drawn
    pub pool_id: PoolId,
    /// Request that carried the randomness
    pub request_id: RequestId,
    /// Winners selected by this draw
    pub winners: Vec<Winner>,
    /// Prize transfers for the host to execute
    pub payments: Vec<Payment>,
    /// Status after the draw (`Settled` or back to `AwaitingDraw`)
    pub status: PoolStatus,
}

// ============ Pool State ============

/// Complete state of one prize pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    id: PoolId,
    creator: Address,
    config: PoolConfig,
    created_at: u64,
    status: PoolStatus,
    /// Current balance backing prizes and refunds
    collateral: u64,
    /// Balance supplied by the creator at open
    seed_collateral: u64,
    /// Collateral frozen when entries closed; prizes are shares of it
    prize_basis: u64,
    tickets_sold: u64,
    entries: Vec<Entry>,
    ledger: FingerprintLedger,
    winners: Vec<Winner>,
    pending_draw: Option<PendingDraw>,
}

/// Check a configuration and seed collateral for opening at `now`
///
/// The three creation preconditions are checked first and in this order;
/// their reasons are part of the public contract.
pub fn validate_config(config: &PoolConfig, collateral: u64, now: u64) -> JackpotResult<()> {
    check!(config.cancel_time > now, JackpotError::InvalidConfiguration {
        reason: "cancel time must be in the future",
    });
    check!(config.end_time > now, JackpotError::InvalidConfiguration {
        reason: "end time must be in the future",
    });
    check!(collateral > 0, JackpotError::InvalidConfiguration {
        reason: "collateral must be provided",
    });

    check!(config.cancel_time < config.end_time, JackpotError::InvalidConfiguration {
        reason: "cancel time must precede end time",
    });
    check!(config.start_time < config.end_time, JackpotError::InvalidConfiguration {
        reason: "start time must precede end time",
    });
    check!(config.price_floor <= config.price_initial, JackpotError::InvalidConfiguration {
        reason: "price floor exceeds initial price",
    });
    PayoutSchedule::from_config(config)?;
    Ok(())
}

impl PoolState {
    /// Instantiate a pool in `Created` status
    pub fn new(id: PoolId, creator: Address, config: PoolConfig, created_at: u64) -> Self {
        let ledger = FingerprintLedger::new(config.fingerprint_decay_constant);
        Self {
            id,
            creator,
            config,
            created_at,
            status: PoolStatus::Created,
            collateral: 0,
            seed_collateral: 0,
            prize_basis: 0,
            tickets_sold: 0,
            entries: Vec::new(),
            ledger,
            winners: Vec::new(),
            pending_draw: None,
        }
    }

    /// `Created -> Open`: validate configuration and take the seed collateral
    pub fn open(&mut self, collateral: u64, now: u64, events: &mut EventLog) -> JackpotResult<()> {
        check!(self.status == PoolStatus::Created, JackpotError::InvalidState {
            status: self.status,
            action: "open",
        });
        validate_config(&self.config, collateral, now)?;

        self.status = PoolStatus::Open;
        self.collateral = collateral;
        self.seed_collateral = collateral;

        events.emit(JackpotEvent::PoolOpened {
            pool_id: self.id,
            creator: self.creator,
            collateral,
            start_time: self.config.start_time,
            end_time: self.config.end_time,
            timestamp: now,
        });
        Ok(())
    }

    // ============ Time-Derived Status ============

    /// Status as of `now`, including the automatic close at `end_time`
    pub fn effective_status(&self, now: u64) -> PoolStatus {
        if self.status == PoolStatus::Open && now >= self.config.end_time {
            if self.qualifiers() >= self.config.required_qualifiers {
                PoolStatus::AwaitingDraw
            } else {
                PoolStatus::Cancelled
            }
        } else {
            self.status
        }
    }

    /// Persist the time-derived status
    ///
    /// Entering `AwaitingDraw` freezes the prize basis.
    pub fn advance(&mut self, now: u64, events: &mut EventLog) -> PoolStatus {
        let next = self.effective_status(now);
        if next == self.status {
            return next;
        }

        match next {
            PoolStatus::AwaitingDraw => {
                self.prize_basis = self.collateral;
                events.emit(JackpotEvent::EntriesClosed {
                    pool_id: self.id,
                    qualifiers: self.qualifiers(),
                    prize_basis: self.prize_basis,
                    timestamp: now,
                });
            }
            PoolStatus::Cancelled => {
                events.emit(JackpotEvent::PoolCancelled {
                    pool_id: self.id,
                    by_creator: false,
                    timestamp: now,
                });
            }
            _ => {}
        }
        self.status = next;
        next
    }

    // ============ Entries ============

    /// Buy `ticket_count` tickets at the current price
    ///
    /// `payment` must equal `ticket_count * current_price(now)` exactly.
    pub fn buy_entry(
        &mut self,
        participant: Address,
        ticket_count: u64,
        payment: u64,
        now: u64,
        events: &mut EventLog,
    ) -> JackpotResult<Entry> {
        let status = self.effective_status(now);
        check!(status.accepts_entries(), JackpotError::InvalidState {
            status,
            action: "buy entry",
        });
        check!(now >= self.config.start_time, JackpotError::EntryWindowNotStarted {
            start_time: self.config.start_time,
            now,
        });
        check!(ticket_count > 0, JackpotError::InvalidInput {
            param: "ticket_count",
            reason: "must buy at least one ticket",
        });
        check!(ticket_count <= limits::MAX_TICKETS_PER_ENTRY, JackpotError::ExceedsMaximum {
            amount: ticket_count,
            maximum: limits::MAX_TICKETS_PER_ENTRY,
        });
        check!(self.entries.len() < limits::MAX_ENTRIES_PER_POOL, JackpotError::ExceedsMaximum {
            amount: self.entries.len() as u64 + 1,
            maximum: limits::MAX_ENTRIES_PER_POOL as u64,
        });

        let tickets_sold = safe_add(self.tickets_sold, ticket_count)?;
        if self.config.max_entries > 0 && tickets_sold > self.config.max_entries {
            return Err(JackpotError::EntryCapExceeded {
                cap: self.config.max_entries,
                sold: self.tickets_sold,
                requested: ticket_count,
            });
        }

        let expected = safe_mul(ticket_count, self.current_price(now))?;
        check!(payment == expected, JackpotError::InvalidPayment {
            expected,
            provided: payment,
        });

        let collateral = safe_add(self.collateral, payment)?;
        let record = self.ledger.preview_entry(&participant, ticket_count, now)?;

        // Commit
        self.ledger.commit(participant, record)?;
        self.collateral = collateral;
        self.tickets_sold = tickets_sold;

        let entry = Entry {
            participant,
            ticket_count,
            price_paid_total: payment,
            purchased_at: now,
            effective_weight: record.weight,
        };
        self.entries.push(entry.clone());

        events.emit(JackpotEvent::EntryPurchased {
            pool_id: self.id,
            participant,
            ticket_count,
            price_paid_total: payment,
            effective_weight: record.weight,
            timestamp: now,
        });

        Ok(entry)
    }

    // ============ Cancellation ============

    /// `Open -> Cancelled` by the creator, before `cancel_time`
    pub fn cancel(&mut self, caller: Address, now: u64, events: &mut EventLog) -> JackpotResult<()> {
        let status = self.effective_status(now);
        check!(status == PoolStatus::Open, JackpotError::InvalidState {
            status,
            action: "cancel",
        });
        check!(caller == self.creator, JackpotError::NotCreator {
            creator: self.creator,
            caller,
        });
        check!(now < self.config.cancel_time, JackpotError::InvalidState {
            status,
            action: "cancel after cancel time",
        });

        self.status = PoolStatus::Cancelled;
        events.emit(JackpotEvent::PoolCancelled {
            pool_id: self.id,
            by_creator: true,
            timestamp: now,
        });
        Ok(())
    }

    // ============ Draw ============

    /// Check that a draw of `quantity` slots may start at `now`
    ///
    /// Does not mutate; the comptroller calls this before asking the
    /// coordinator for randomness.
    pub fn prepare_draw(&self, quantity: u32, now: u64) -> JackpotResult<()> {
        let status = self.effective_status(now);
        check!(status == PoolStatus::AwaitingDraw, JackpotError::InvalidState {
            status,
            action: "draw",
        });
        check!(quantity >= 1, JackpotError::InvalidInput {
            param: "quantity",
            reason: "must draw at least one slot",
        });

        let remaining = self.remaining_slots();
        check!((quantity as usize) <= remaining, JackpotError::ExceedsMaximum {
            amount: quantity as u64,
            maximum: remaining as u64,
        });
        Ok(())
    }

    /// `AwaitingDraw -> Drawing`: bind the pool to an outstanding request
    pub fn begin_draw(
        &mut self,
        request_id: RequestId,
        quantity: u32,
        now: u64,
        events: &mut EventLog,
    ) -> JackpotResult<()> {
        self.prepare_draw(quantity, now)?;

        self.advance(now, events);
        self.status = PoolStatus::Drawing;
        self.pending_draw = Some(PendingDraw { request_id, quantity });
        Ok(())
    }

    /// `Drawing -> Settled | AwaitingDraw`: select winners and pay prizes
    pub fn settle_draw(
        &mut self,
        request_id: RequestId,
        words: &[RandomWord],
        now: u64,
        events: &mut EventLog,
    ) -> JackpotResult<DrawSettlement> {
        check!(self.status == PoolStatus::Drawing, JackpotError::InvalidState {
            status: self.status,
            action: "settle draw",
        });
        let pending = match self.pending_draw {
            Some(pending) if pending.request_id == request_id => pending,
            _ => return Err(JackpotError::UnknownRequest { request_id }),
        };
        check!(words.len() == pending.quantity as usize, JackpotError::MalformedFulfillment {
            expected: pending.quantity,
            provided: words.len() as u32,
        });

        let drawn: BTreeSet<Address> = self.winners.iter().map(|w| w.participant).collect();
        let candidates: Vec<(Address, u128)> = self
            .ledger
            .weights()
            .into_iter()
            .filter(|(participant, weight)| *weight > 0 && !drawn.contains(participant))
            .collect();
        let mut draw = WeightedDraw::new(candidates)?;
        let selected = draw.draw_many(words)?;

        let schedule = PayoutSchedule::from_config(&self.config)?;
        let first_slot = self.winners.len();
        let mut winners = Vec::with_capacity(selected.len());
        let mut payments = Vec::with_capacity(selected.len());
        for (offset, participant) in selected.iter().enumerate() {
            let slot = first_slot + offset;
            let payout_amount = schedule.payout_for(slot, self.prize_basis)?;
            winners.push(Winner {
                participant: *participant,
                draw_index: slot as u32,
                payout_amount,
            });
            payments.push(Payment::new(*participant, payout_amount, PaymentKind::Prize));
        }

        let collateral = collateral_covers(self.collateral, &payments)?;
        let slots_filled = first_slot + winners.len();
        let status = if slots_filled >= schedule.slots() || draw.remaining() == 0 {
            PoolStatus::Settled
        } else {
            PoolStatus::AwaitingDraw
        };

        // Commit
        self.collateral = collateral;
        self.winners.extend(winners.iter().cloned());
        self.pending_draw = None;
        self.status = status;

        for (winner, payment) in winners.iter().zip(payments.iter()) {
            events.emit(JackpotEvent::WinnerSelected {
                pool_id: self.id,
                participant: winner.participant,
                draw_index: winner.draw_index,
                payout_amount: winner.payout_amount,
                timestamp: now,
            });
            self.emit_payment(payment, now, events);
        }
        if status == PoolStatus::Settled {
            events.emit(JackpotEvent::PoolSettled {
                pool_id: self.id,
                winners: self.winners.len() as u32,
                total_paid: self.total_paid_out(),
                timestamp: now,
            });
        }

        Ok(DrawSettlement {
            pool_id: self.id,
            request_id,
            winners,
            payments,
            status,
        })
    }

    // ============ Wind-Down ============

    /// `Cancelled -> Refunded`: return every entry price and the seed collateral
    pub fn refund(&mut self, now: u64, events: &mut EventLog) -> JackpotResult<Vec<Payment>> {
        let status = self.effective_status(now);
        check!(status == PoolStatus::Cancelled, JackpotError::InvalidState {
            status,
            action: "refund",
        });

        let mut payments: Vec<Payment> = self
            .entries
            .iter()
            .filter(|e| e.price_paid_total > 0)
            .map(|e| Payment::new(e.participant, e.price_paid_total, PaymentKind::EntryRefund))
            .collect();
        payments.push(Payment::new(self.creator, self.seed_collateral, PaymentKind::CollateralRefund));
        collateral_drained(self.collateral, &payments)?;

        // Commit
        self.advance(now, events);
        let total_refunded = self.collateral;
        self.collateral = 0;
        self.status = PoolStatus::Refunded;

        for payment in &payments {
            self.emit_payment(payment, now, events);
        }
        events.emit(JackpotEvent::PoolRefunded {
            pool_id: self.id,
            total_refunded,
            timestamp: now,
        });
        Ok(payments)
    }

    /// Creator takes the collateral left after a settled pool paid its prizes
    pub fn withdraw_residual(&mut self, caller: Address, now: u64, events: &mut EventLog) -> JackpotResult<Payment> {
        check!(self.status == PoolStatus::Settled, JackpotError::InvalidState {
            status: self.status,
            action: "withdraw residual",
        });
        check!(caller == self.creator, JackpotError::NotCreator {
            creator: self.creator,
            caller,
        });
        check!(self.collateral > 0, JackpotError::InvalidInput {
            param: "collateral",
            reason: "nothing left to withdraw",
        });

        let payment = Payment::new(self.creator, self.collateral, PaymentKind::Residual);
        self.collateral = 0;
        self.emit_payment(&payment, now, events);
        Ok(payment)
    }

    fn emit_payment(&self, payment: &Payment, now: u64, events: &mut EventLog) {
        events.emit(JackpotEvent::PaymentIssued {
            pool_id: self.id,
            recipient: payment.recipient,
            amount: payment.amount,
            kind: payment.kind,
            timestamp: now,
        });
    }

    // ============ Queries ============

    pub fn id(&self) -> &PoolId {
        &self.id
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Last committed status (see [`effective_status`](Self::effective_status))
    pub fn status(&self) -> PoolStatus {
        self.status
    }

    pub fn collateral(&self) -> u64 {
        self.collateral
    }

    pub fn seed_collateral(&self) -> u64 {
        self.seed_collateral
    }

    /// Collateral frozen at close (0 until entries close)
    pub fn prize_basis(&self) -> u64 {
        self.prize_basis
    }

    pub fn tickets_sold(&self) -> u64 {
        self.tickets_sold
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_count(&self) -> usize {
        self.entries.len()
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub fn ledger(&self) -> &FingerprintLedger {
        &self.ledger
    }

    /// Distinct participants holding an entry
    pub fn qualifiers(&self) -> u32 {
        self.ledger.participant_count() as u32
    }

    /// Prize slots not yet drawn
    pub fn remaining_slots(&self) -> usize {
        self.config.prize_slots().saturating_sub(self.winners.len())
    }

    /// Draw waiting for randomness, if any
    pub fn pending_draw(&self) -> Option<&PendingDraw> {
        self.pending_draw.as_ref()
    }

    pub fn pricing_curve(&self) -> PricingCurve {
        PricingCurve::from_config(&self.config)
    }

    /// Ticket price at `now`
    pub fn current_price(&self, now: u64) -> u64 {
        self.pricing_curve()
            .price_at(now.saturating_sub(self.config.start_time))
    }

    /// Sum of all prizes paid so far
    pub fn total_paid_out(&self) -> u64 {
        self.winners
            .iter()
            .fold(0u64, |acc, w| acc.saturating_add(w.payout_amount))
    }
}
