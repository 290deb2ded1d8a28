//! Core replay engine for a single credit account.
//!
//! Events are sorted by timestamp and applied one at a time. Each opening
//! event (authorization, payment initiation) creates a pending transaction
//! keyed by id; each resolving event consumes the pending entry with the same
//! id and class, either dropping it or moving it to the settled history.

use crate::account::CreditAccount;
use crate::amount::Amount;
use crate::error::{Result, SummaryError};
use crate::transaction::{
    Event, EventKind, PendingTransaction, SettledTransaction, TransactionClass, TxnId,
};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// The replay state machine for one credit account.
///
/// # Id Reservation
///
/// Ids used by opening events are reserved for the lifetime of the ledger.
/// A second authorization or payment initiation with the same id is rejected
/// even after the first one has settled, cleared or been canceled.
///
/// # Failure
///
/// The first failing event aborts the replay. No rollback is attempted; the
/// ledger is left in whatever state the preceding events produced and should
/// be discarded.
#[derive(Debug)]
pub struct CreditLedger {
    account: CreditAccount,

    /// Pending transactions in insertion order, keyed by insertion sequence.
    pending: BTreeMap<u64, PendingTransaction>,

    /// Transaction id to insertion sequence in `pending`.
    pending_index: HashMap<TxnId, u64>,

    next_seq: u64,

    /// Settled purchases and posted payments, in processing order.
    settled: Vec<SettledTransaction>,

    /// Every id ever used by an opening event.
    seen_ids: HashSet<TxnId>,

    /// Events not yet applied, in timestamp order.
    unprocessed: VecDeque<Event>,
}

impl CreditLedger {
    /// Creates a ledger for an account with the given limit.
    ///
    /// Events are sorted by timestamp; the sort is stable so events sharing a
    /// timestamp keep their input order.
    pub fn new(credit_limit: i64, mut events: Vec<Event>) -> Result<Self> {
        let account = CreditAccount::new(credit_limit)?;
        events.sort_by_key(|event| event.time);
        debug!(
            "Ledger created with limit {} and {} events",
            credit_limit,
            events.len()
        );

        Ok(CreditLedger {
            account,
            pending: BTreeMap::new(),
            pending_index: HashMap::new(),
            next_seq: 0,
            settled: Vec::new(),
            seen_ids: HashSet::new(),
            unprocessed: events.into(),
        })
    }

    /// Applies every queued event in timestamp order.
    pub fn process(mut self) -> Result<Self> {
        debug!("Replaying {} events", self.unprocessed.len());
        while let Some(event) = self.unprocessed.pop_front() {
            let (kind, id, time) = (event.kind, event.id.clone(), event.time);
            if let Err(e) = self.apply(event) {
                warn!("Replay aborted at {} {} @ time {}: {}", kind, id, time, e);
                return Err(e);
            }
        }

        debug!(
            "Replay finished: {} pending, {} settled",
            self.pending.len(),
            self.settled.len()
        );
        Ok(self)
    }

    /// Applies a single event.
    ///
    /// Callers driving the ledger by hand are responsible for timestamp order.
    pub fn apply(&mut self, event: Event) -> Result<()> {
        match event.kind {
            EventKind::Authorized => self.process_authorization(event)?,
            EventKind::Settled => self.process_settlement(event)?,
            EventKind::AuthCleared => self.process_clearance(event)?,
            EventKind::PaymentInitiated => self.process_payment_initiation(event)?,
            EventKind::PaymentPosted => self.process_payment_posting(event)?,
            EventKind::PaymentCanceled => self.process_payment_cancellation(event)?,
        }

        debug!(
            "Available credit {}, payable balance {}",
            self.account.available_credit, self.account.payable_balance
        );
        Ok(())
    }

    /// Processes an authorization.
    fn process_authorization(&mut self, event: Event) -> Result<()> {
        let amount = opening_amount(&event)?;
        self.reserve_id(&event.id)?;
        self.account.authorize(&event.id, amount)?;

        debug!("Authorized {} for {} @ time {}", event.id, amount, event.time);
        self.open(event.id, TransactionClass::Credit, amount, event.time);
        Ok(())
    }

    /// Processes a settlement.
    ///
    /// The settled amount is always the authorized amount; any amount on the
    /// settlement event itself is ignored.
    fn process_settlement(&mut self, event: Event) -> Result<()> {
        let pending = self.take_pending(&event)?;
        if event.amount.is_some_and(|own| own != pending.amount) {
            debug!(
                "Settlement {} carries {:?}, keeping authorized {}",
                event.id, event.amount, pending.amount
            );
        }

        self.account.settle(&event.id, pending.amount, pending.amount)?;
        debug!("Settled {} for {} @ time {}", event.id, pending.amount, event.time);
        self.settled
            .push(SettledTransaction::finalize(pending, event.time));
        Ok(())
    }

    /// Processes an authorization clearance.
    fn process_clearance(&mut self, event: Event) -> Result<()> {
        let pending = self.take_pending(&event)?;
        self.account.release(&event.id, pending.amount)?;
        debug!("Cleared {} releasing {}", event.id, pending.amount);
        Ok(())
    }

    /// Processes a payment initiation.
    fn process_payment_initiation(&mut self, event: Event) -> Result<()> {
        let amount = opening_amount(&event)?;
        self.reserve_id(&event.id)?;
        self.account.initiate_payment(&event.id, amount)?;

        debug!("Initiated payment {} for {} @ time {}", event.id, amount, event.time);
        self.open(event.id, TransactionClass::Payment, amount, event.time);
        Ok(())
    }

    /// Processes a payment posting.
    ///
    /// Like settlements, the posted amount is the initiated amount.
    fn process_payment_posting(&mut self, event: Event) -> Result<()> {
        let pending = self.take_pending(&event)?;
        self.account.post_payment(&event.id, pending.amount)?;
        debug!("Posted payment {} for {} @ time {}", event.id, pending.amount, event.time);
        self.settled
            .push(SettledTransaction::finalize(pending, event.time));
        Ok(())
    }

    /// Processes a payment cancellation.
    fn process_payment_cancellation(&mut self, event: Event) -> Result<()> {
        let pending = self.take_pending(&event)?;
        self.account.cancel_payment(&event.id, pending.amount)?;
        debug!("Canceled payment {} reverting {}", event.id, pending.amount);
        Ok(())
    }

    /// Marks an opening id as used, failing if it was used before.
    fn reserve_id(&mut self, id: &TxnId) -> Result<()> {
        if !self.seen_ids.insert(id.clone()) {
            return Err(SummaryError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn open(&mut self, id: TxnId, class: TransactionClass, amount: Amount, time: i64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_index.insert(id.clone(), seq);
        self.pending.insert(
            seq,
            PendingTransaction {
                id,
                class,
                amount,
                time,
            },
        );
    }

    /// Removes and returns the pending counterpart of a resolving event.
    ///
    /// A class mismatch leaves the pending entry in place.
    fn take_pending(&mut self, event: &Event) -> Result<PendingTransaction> {
        let seq = *self
            .pending_index
            .get(&event.id)
            .ok_or_else(|| SummaryError::NoPendingMatch(event.id.to_string()))?;

        let class = self
            .pending
            .get(&seq)
            .map(|pending| pending.class)
            .ok_or_else(|| SummaryError::NoPendingMatch(event.id.to_string()))?;
        if class != event.kind.class() {
            return Err(SummaryError::ClassMismatch(event.id.to_string()));
        }

        self.pending_index.remove(&event.id);
        self.pending
            .remove(&seq)
            .ok_or_else(|| SummaryError::NoPendingMatch(event.id.to_string()))
    }

    pub fn available_credit(&self) -> Amount {
        self.account.available_credit
    }

    pub fn payable_balance(&self) -> Amount {
        self.account.payable_balance
    }

    /// Pending transactions in the order they were opened.
    pub fn pending(&self) -> impl Iterator<Item = &PendingTransaction> + '_ {
        self.pending.values()
    }

    /// Settled transactions in the order they were finalized.
    pub fn settled(&self) -> &[SettledTransaction] {
        &self.settled
    }
}

/// Own amount of an opening event.
fn opening_amount(event: &Event) -> Result<Amount> {
    event
        .amount
        .ok_or(SummaryError::MissingField { field: "amount" })
}
