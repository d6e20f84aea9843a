//! # The Vehicle Ledger
//!
//! A single global store of vehicle records plus the control state the
//! circuit breaker and fee accounting need, behind one
//! `parking_lot::RwLock`.
//!
//! Each mutating operation takes the write lock once, validates every
//! precondition, and only then mutates. Events are published before the
//! lock is released, so subscribers observe commit order. Reads take the
//! shared lock and return clones.
//!
//! The lock is never held across an `.await`; every operation here is
//! synchronous.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{counter, gauge};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use mart_core::{AccountId, Amount, FeeRate, Timestamp, Vin};
use mart_state::{VehicleRecord, VehicleSpec, VehicleTuple};

use crate::config::{ConfigError, LedgerConfig, PaymentPolicy};
use crate::error::LedgerError;
use crate::events::{EventBus, EventEnvelope, Journal, LedgerEvent};

// ─── Result Types ────────────────────────────────────────────────────

/// The money movements of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// The purchased vehicle.
    pub vin: Vin,
    /// Owner before the sale, credited with `proceeds`.
    pub seller: AccountId,
    /// New owner.
    pub buyer: AccountId,
    /// Asking price paid.
    pub price: Amount,
    /// Operator fee captured.
    pub fee: Amount,
    /// `price - fee`.
    pub proceeds: Amount,
    /// Overpayment credited back to the buyer. Zero under
    /// [`PaymentPolicy::Exact`].
    pub refund: Amount,
}

/// A consistent view of the ledger's control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Operator identity.
    pub operator: AccountId,
    /// Circuit breaker state.
    pub paused: bool,
    /// Fees captured and not yet withdrawn.
    pub accrued_fees: Amount,
    /// Registered vehicles.
    pub vehicle_count: usize,
    /// Fee rate applied to sales.
    pub fee_rate: FeeRate,
    /// Sequence number of the most recent event; zero if none.
    pub last_sequence: u64,
    /// Events currently retained for polling.
    pub retained_events: usize,
    /// Sequence of the oldest retained event; `None` before the first
    /// event.
    pub oldest_retained: Option<u64>,
}

/// Retained events after a cursor, read under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    /// Events with `sequence > after`, oldest first.
    pub events: Vec<EventEnvelope>,
    /// Latest committed sequence; every event up to it is in `events`
    /// unless trimmed.
    pub last_sequence: u64,
    /// Oldest retained sequence.
    pub oldest_retained: Option<u64>,
}

// ─── Internal State ──────────────────────────────────────────────────

#[derive(Debug)]
struct LedgerState {
    vehicles: HashMap<Vin, VehicleRecord>,
    /// Registration order.
    vins: Vec<Vin>,
    paused: bool,
    accrued_fees: Amount,
    balances: HashMap<AccountId, Amount>,
    journal: Journal,
    last_sequence: u64,
}

impl LedgerState {
    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Sequence, journal, and broadcast one event. Caller holds the write lock.
    fn emit(&mut self, bus: &EventBus, event: LedgerEvent) {
        self.last_sequence += 1;
        let envelope = EventEnvelope {
            sequence: self.last_sequence,
            timestamp: Timestamp::now(),
            event,
        };
        self.journal.push(envelope.clone());
        bus.publish(envelope);
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────

/// Handle to the shared vehicle ledger. Cloning is cheap; clones share
/// state.
#[derive(Debug, Clone)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
    events: EventBus,
    config: Arc<LedgerConfig>,
}

impl Ledger {
    /// Create an empty, unpaused ledger.
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            operator = %config.operator,
            fee_rate = %config.fee_rate,
            payment = ?config.payment,
            "vehicle ledger initialised"
        );
        gauge!("mart_ledger_paused").set(0.0);
        gauge!("mart_ledger_vehicles").set(0.0);
        Ok(Self {
            state: Arc::new(RwLock::new(LedgerState {
                vehicles: HashMap::new(),
                vins: Vec::new(),
                paused: false,
                accrued_fees: Amount::ZERO,
                balances: HashMap::new(),
                journal: Journal::new(config.journal_capacity),
                last_sequence: 0,
            })),
            events: EventBus::new(config.event_capacity),
            config: Arc::new(config),
        })
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Register a new vehicle owned by `caller`.
    pub fn register(
        &self,
        spec: VehicleSpec,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        let mut state = self.state.write();
        let result = self.register_locked(&mut state, spec, caller);
        observe("register", result)
    }

    fn register_locked(
        &self,
        state: &mut LedgerState,
        spec: VehicleSpec,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        if state.paused && !self.config.register_while_paused {
            return Err(LedgerError::OperationDisallowed);
        }
        if state.vehicles.contains_key(&spec.vin) {
            return Err(LedgerError::DuplicateVin(spec.vin));
        }
        let record = VehicleRecord::register(spec, caller.clone())?;
        let vin = record.vin;

        state.vehicles.insert(vin, record.clone());
        state.vins.push(vin);
        state.emit(&self.events, LedgerEvent::NewBike { vin });

        info!(%vin, owner = %caller, make = %record.make, model = %record.model, "vehicle registered");
        gauge!("mart_ledger_vehicles").set(state.vins.len() as f64);
        Ok(record)
    }

    /// List `vin` for sale at `price`. Re-listing changes the price.
    ///
    /// Returns the record as committed.
    pub fn list_for_sale(
        &self,
        vin: Vin,
        price: Amount,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        let mut state = self.state.write();
        let result = self.list_locked(&mut state, vin, price, caller);
        observe("list_for_sale", result)
    }

    fn list_locked(
        &self,
        state: &mut LedgerState,
        vin: Vin,
        price: Amount,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        if state.paused {
            return Err(LedgerError::OperationDisallowed);
        }
        let vehicle = state
            .vehicles
            .get_mut(&vin)
            .ok_or(LedgerError::NotFound(vin))?;
        if !vehicle.is_owned_by(caller) {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "list this vehicle",
            });
        }
        vehicle.list_for_sale(price, caller)?;
        let record = vehicle.clone();
        state.emit(&self.events, LedgerEvent::ForSale { vin });

        info!(%vin, %price, seller = %caller, "vehicle listed for sale");
        Ok(record)
    }

    /// Buy `vin` for `payment`, splitting the price between the seller
    /// and the operator fee pool.
    pub fn purchase(
        &self,
        vin: Vin,
        caller: &AccountId,
        payment: Amount,
    ) -> Result<PurchaseReceipt, LedgerError> {
        let mut state = self.state.write();
        let result = self.purchase_locked(&mut state, vin, caller, payment);
        observe("purchase", result)
    }

    fn purchase_locked(
        &self,
        state: &mut LedgerState,
        vin: Vin,
        caller: &AccountId,
        payment: Amount,
    ) -> Result<PurchaseReceipt, LedgerError> {
        if state.paused {
            return Err(LedgerError::OperationDisallowed);
        }
        let vehicle = state.vehicles.get(&vin).ok_or(LedgerError::NotFound(vin))?;
        let price = vehicle.check_purchasable()?;
        if vehicle.is_owned_by(caller) {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "buy a vehicle they already own",
            });
        }
        let seller = vehicle.owner.clone();

        let refund = match self.config.payment {
            PaymentPolicy::Exact if payment != price => None,
            PaymentPolicy::Exact => Some(Amount::ZERO),
            PaymentPolicy::RefundExcess => payment.checked_sub(price),
        }
        .ok_or(LedgerError::WrongPayment {
            expected: price,
            provided: payment,
        })?;

        let split = self
            .config
            .fee_rate
            .split(price)
            .ok_or(LedgerError::Overflow("fee split"))?;
        let accrued_fees = state
            .accrued_fees
            .checked_add(split.fee)
            .ok_or(LedgerError::Overflow("accrued fees"))?;
        let seller_balance = state
            .balance(&seller)
            .checked_add(split.proceeds)
            .ok_or(LedgerError::Overflow("seller balance"))?;
        let buyer_balance = state
            .balance(caller)
            .checked_add(refund)
            .ok_or(LedgerError::Overflow("buyer balance"))?;

        // Every check has passed; nothing below can fail.
        let sale = state
            .vehicles
            .get_mut(&vin)
            .ok_or(LedgerError::NotFound(vin))?
            .complete_sale(caller)?;
        state.accrued_fees = accrued_fees;
        state.balances.insert(sale.seller.clone(), seller_balance);
        if !refund.is_zero() {
            state.balances.insert(caller.clone(), buyer_balance);
        }
        state.emit(&self.events, LedgerEvent::Sold { vin });
        state.emit(&self.events, LedgerEvent::Fee { fee: split.fee });

        info!(
            %vin,
            buyer = %caller,
            seller = %sale.seller,
            price = %sale.price,
            fee = %split.fee,
            proceeds = %split.proceeds,
            "vehicle sold"
        );
        counter!("mart_ledger_sales_total").increment(1);
        gauge!("mart_ledger_accrued_fees").set(accrued_fees.get() as f64);

        Ok(PurchaseReceipt {
            vin,
            seller: sale.seller,
            buyer: caller.clone(),
            price: sale.price,
            fee: split.fee,
            proceeds: split.proceeds,
            refund,
        })
    }

    /// Hand `vin` to `new_owner`, clearing any open listing.
    ///
    /// Returns the record as committed.
    pub fn transfer(
        &self,
        vin: Vin,
        new_owner: &AccountId,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        let mut state = self.state.write();
        let result = self.transfer_locked(&mut state, vin, new_owner, caller);
        observe("transfer", result)
    }

    fn transfer_locked(
        &self,
        state: &mut LedgerState,
        vin: Vin,
        new_owner: &AccountId,
        caller: &AccountId,
    ) -> Result<VehicleRecord, LedgerError> {
        if state.paused {
            return Err(LedgerError::OperationDisallowed);
        }
        let vehicle = state
            .vehicles
            .get_mut(&vin)
            .ok_or(LedgerError::NotFound(vin))?;
        if !vehicle.is_owned_by(caller) {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "transfer this vehicle",
            });
        }
        vehicle.reassign(new_owner.clone(), caller);
        let record = vehicle.clone();
        state.emit(&self.events, LedgerEvent::TransferVehicle { vin });

        info!(%vin, from = %caller, to = %new_owner, "vehicle transferred");
        Ok(record)
    }

    /// Trip the circuit breaker. Returns whether the state changed.
    pub fn pause(&self, caller: &AccountId) -> Result<bool, LedgerError> {
        let mut state = self.state.write();
        let result = self.set_paused_locked(&mut state, caller, true);
        observe("pause", result)
    }

    /// Reset the circuit breaker. Returns whether the state changed.
    pub fn resume(&self, caller: &AccountId) -> Result<bool, LedgerError> {
        let mut state = self.state.write();
        let result = self.set_paused_locked(&mut state, caller, false);
        observe("resume", result)
    }

    fn set_paused_locked(
        &self,
        state: &mut LedgerState,
        caller: &AccountId,
        paused: bool,
    ) -> Result<bool, LedgerError> {
        self.require_operator(
            caller,
            if paused { "pause the ledger" } else { "resume the ledger" },
        )?;
        if state.paused == paused {
            return Ok(false);
        }
        state.paused = paused;
        if paused {
            state.emit(&self.events, LedgerEvent::Stopped);
            warn!(operator = %caller, "circuit breaker tripped; sales and transfers halted");
        } else {
            state.emit(&self.events, LedgerEvent::Resumed);
            warn!(operator = %caller, "circuit breaker reset; sales and transfers resumed");
        }
        gauge!("mart_ledger_paused").set(if paused { 1.0 } else { 0.0 });
        Ok(true)
    }

    /// Pay all accrued fees out to the operator's balance.
    ///
    /// Returns the amount withdrawn. Withdrawing nothing succeeds and
    /// emits no event.
    pub fn withdraw(&self, caller: &AccountId) -> Result<Amount, LedgerError> {
        let mut state = self.state.write();
        let result = self.withdraw_locked(&mut state, caller);
        observe("withdraw", result)
    }

    fn withdraw_locked(
        &self,
        state: &mut LedgerState,
        caller: &AccountId,
    ) -> Result<Amount, LedgerError> {
        self.require_operator(caller, "withdraw fees")?;
        if self.config.withdraw_requires_pause && !state.paused {
            return Err(LedgerError::PausedRequired);
        }
        let amount = state.accrued_fees;
        if amount.is_zero() {
            return Ok(Amount::ZERO);
        }
        let operator_balance = state
            .balance(caller)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("operator balance"))?;

        state.accrued_fees = Amount::ZERO;
        state.balances.insert(caller.clone(), operator_balance);
        state.emit(&self.events, LedgerEvent::Withdrawn { amount });

        info!(operator = %caller, %amount, "accrued fees withdrawn");
        gauge!("mart_ledger_accrued_fees").set(0.0);
        Ok(amount)
    }

    fn require_operator(&self, caller: &AccountId, action: &'static str) -> Result<(), LedgerError> {
        if *caller == self.config.operator {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action,
            })
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// A copy of the record for `vin`. Never blocked by the breaker.
    pub fn fetch(&self, vin: Vin) -> Result<VehicleRecord, LedgerError> {
        self.state
            .read()
            .vehicles
            .get(&vin)
            .cloned()
            .ok_or(LedgerError::NotFound(vin))
    }

    /// The fixed-order compatibility tuple for `vin`.
    pub fn details(&self, vin: Vin) -> Result<VehicleTuple, LedgerError> {
        self.state
            .read()
            .vehicles
            .get(&vin)
            .map(VehicleRecord::to_tuple)
            .ok_or(LedgerError::NotFound(vin))
    }

    /// All registered VINs in registration order.
    pub fn vins(&self) -> Vec<Vin> {
        self.state.read().vins.clone()
    }

    /// Number of registered vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.state.read().vins.len()
    }

    /// Whether the circuit breaker is tripped.
    pub fn is_paused(&self) -> bool {
        self.state.read().paused
    }

    /// Fees captured and not yet withdrawn.
    pub fn accrued_fees(&self) -> Amount {
        self.state.read().accrued_fees
    }

    /// Funds credited to `account` by sales, refunds, and withdrawals.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.state.read().balance(account)
    }

    /// The operator identity.
    pub fn operator(&self) -> &AccountId {
        &self.config.operator
    }

    /// The fee rate applied to sales.
    pub fn fee_rate(&self) -> FeeRate {
        self.config.fee_rate
    }

    /// The configuration this ledger was built with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Control state read under a single lock acquisition.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            operator: self.config.operator.clone(),
            paused: state.paused,
            accrued_fees: state.accrued_fees,
            vehicle_count: state.vins.len(),
            fee_rate: self.config.fee_rate,
            last_sequence: state.last_sequence,
            retained_events: state.journal.len(),
            oldest_retained: state.journal.first_sequence(),
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Receive every event committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    /// Retained events with `sequence > after`, oldest first.
    pub fn journal_since(&self, after: u64) -> Vec<EventEnvelope> {
        self.state.read().journal.since(after)
    }

    /// Retained events after `after` together with the cursor to resume
    /// from.
    pub fn poll_events(&self, after: u64) -> EventPage {
        let state = self.state.read();
        EventPage {
            events: state.journal.since(after),
            last_sequence: state.last_sequence,
            oldest_retained: state.journal.first_sequence(),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

/// Count and log the outcome of a ledger operation.
fn observe<T>(operation: &'static str, result: Result<T, LedgerError>) -> Result<T, LedgerError> {
    match &result {
        Ok(_) => {
            counter!("mart_ledger_operations_total", "operation" => operation).increment(1);
        }
        Err(err) => {
            debug!(operation, error = %err, "ledger operation rejected");
            counter!(
                "mart_ledger_rejections_total",
                "operation" => operation,
                "kind" => err.kind()
            )
            .increment(1);
        }
    }
    result
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mart_state::VehicleStatus;

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::new(account("0xoperator"))).unwrap()
    }

    fn spec(vin: u64) -> VehicleSpec {
        VehicleSpec {
            vin: Vin::new(vin),
            year: 2018,
            model: "Ninja".into(),
            make: "Kawasaki".into(),
            capacity: 1200,
        }
    }

    fn listed(ledger: &Ledger, vin: u64, price: u64) {
        ledger.register(spec(vin), &account("0xseller")).unwrap();
        ledger
            .list_for_sale(Vin::new(vin), Amount::from(price), &account("0xseller"))
            .unwrap();
    }

    #[test]
    fn new_rejects_zero_capacity() {
        let mut cfg = LedgerConfig::new(account("0xoperator"));
        cfg.journal_capacity = 0;
        assert!(Ledger::new(cfg).is_err());
    }

    #[test]
    fn duplicate_vin_leaves_original() {
        let ledger = ledger();
        ledger.register(spec(1), &account("0xalice")).unwrap();
        let err = ledger
            .register(
                VehicleSpec {
                    model: "Other".into(),
                    ..spec(1)
                },
                &account("0xbob"),
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateVin(Vin::new(1)));
        let v = ledger.fetch(Vin::new(1)).unwrap();
        assert_eq!(v.owner, account("0xalice"));
        assert_eq!(v.model, "Ninja");
        assert_eq!(ledger.vehicle_count(), 1);
    }

    #[test]
    fn vins_in_registration_order() {
        let ledger = ledger();
        for vin in [30, 10, 20] {
            ledger.register(spec(vin), &account("0xalice")).unwrap();
        }
        assert_eq!(
            ledger.vins(),
            vec![Vin::new(30), Vin::new(10), Vin::new(20)]
        );
    }

    #[test]
    fn list_checks_existence_before_ownership() {
        let ledger = ledger();
        let err = ledger
            .list_for_sale(Vin::new(5), Amount::from(1), &account("0xalice"))
            .unwrap_err();
        assert_eq!(err, LedgerError::NotFound(Vin::new(5)));
    }

    #[test]
    fn zero_price_rejected() {
        let ledger = ledger();
        ledger.register(spec(1), &account("0xalice")).unwrap();
        let err = ledger
            .list_for_sale(Vin::new(1), Amount::ZERO, &account("0xalice"))
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidPrice);
        assert_eq!(
            ledger.fetch(Vin::new(1)).unwrap().status,
            VehicleStatus::RoadWorthy
        );
    }

    #[test]
    fn self_purchase_rejected() {
        let ledger = ledger();
        listed(&ledger, 1, 100);
        let err = ledger
            .purchase(Vin::new(1), &account("0xseller"), Amount::from(100))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
        assert!(ledger.fetch(Vin::new(1)).unwrap().is_for_sale());
    }

    #[test]
    fn exact_policy_rejects_overpayment() {
        let ledger = ledger();
        listed(&ledger, 1, 100);
        let err = ledger
            .purchase(Vin::new(1), &account("0xbuyer"), Amount::from(101))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::WrongPayment {
                expected: Amount::from(100),
                provided: Amount::from(101),
            }
        );
        assert!(ledger.accrued_fees().is_zero());
    }

    #[test]
    fn refund_policy_credits_excess() {
        let mut cfg = LedgerConfig::new(account("0xoperator"));
        cfg.payment = PaymentPolicy::RefundExcess;
        let ledger = Ledger::new(cfg).unwrap();
        listed(&ledger, 1, 100);

        let err = ledger
            .purchase(Vin::new(1), &account("0xbuyer"), Amount::from(99))
            .unwrap_err();
        assert!(matches!(err, LedgerError::WrongPayment { .. }));

        let receipt = ledger
            .purchase(Vin::new(1), &account("0xbuyer"), Amount::from(130))
            .unwrap();
        assert_eq!(receipt.refund, Amount::from(30));
        assert_eq!(receipt.fee, Amount::from(5));
        assert_eq!(ledger.balance_of(&account("0xbuyer")), Amount::from(30));
        assert_eq!(ledger.balance_of(&account("0xseller")), Amount::from(95));
    }

    #[test]
    fn purchase_overflow_changes_nothing() {
        let ledger = ledger();
        let price = Amount::new(u128::MAX);
        ledger.register(spec(1), &account("0xseller")).unwrap();
        ledger
            .list_for_sale(Vin::new(1), price, &account("0xseller"))
            .unwrap();
        let before = ledger.snapshot();
        let err = ledger
            .purchase(Vin::new(1), &account("0xbuyer"), price)
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow("fee split"));
        assert_eq!(ledger.snapshot(), before);
        assert!(ledger.fetch(Vin::new(1)).unwrap().is_for_sale());
        assert!(ledger.balance_of(&account("0xseller")).is_zero());
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let ledger = ledger();
        let op = account("0xoperator");
        assert!(ledger.pause(&op).unwrap());
        assert!(!ledger.pause(&op).unwrap());
        assert!(ledger.resume(&op).unwrap());
        assert!(!ledger.resume(&op).unwrap());
        let names: Vec<&str> = ledger
            .journal_since(0)
            .iter()
            .map(|e| e.event.name())
            .collect();
        assert_eq!(names, vec!["Stopped", "Resumed"]);
    }

    #[test]
    fn registration_blocked_while_paused_by_default() {
        let ledger = ledger();
        ledger.pause(&account("0xoperator")).unwrap();
        assert_eq!(
            ledger.register(spec(1), &account("0xalice")).unwrap_err(),
            LedgerError::OperationDisallowed
        );
    }

    #[test]
    fn registration_allowed_while_paused_when_configured() {
        let mut cfg = LedgerConfig::new(account("0xoperator"));
        cfg.register_while_paused = true;
        let ledger = Ledger::new(cfg).unwrap();
        ledger.pause(&account("0xoperator")).unwrap();
        assert!(ledger.register(spec(1), &account("0xalice")).is_ok());
    }

    #[test]
    fn withdraw_can_require_pause() {
        let mut cfg = LedgerConfig::new(account("0xoperator"));
        cfg.withdraw_requires_pause = true;
        let ledger = Ledger::new(cfg).unwrap();
        let op = account("0xoperator");
        assert_eq!(ledger.withdraw(&op).unwrap_err(), LedgerError::PausedRequired);
        ledger.pause(&op).unwrap();
        assert_eq!(ledger.withdraw(&op).unwrap(), Amount::ZERO);
    }

    #[test]
    fn withdraw_zero_emits_nothing() {
        let ledger = ledger();
        assert_eq!(ledger.withdraw(&account("0xoperator")).unwrap(), Amount::ZERO);
        assert!(ledger.journal_since(0).is_empty());
        assert_eq!(ledger.snapshot().last_sequence, 0);
    }

    #[test]
    fn details_tuple_renders_absent_buyer_as_zero_address() {
        let ledger = ledger();
        ledger.register(spec(777), &account("0xalice")).unwrap();
        let tuple = ledger.details(Vin::new(777)).unwrap();
        assert_eq!(tuple.7, AccountId::ZERO_ADDRESS);
        assert_eq!(tuple.6, "0xalice");
        assert!(ledger.details(Vin::new(1)).is_err());
    }

    #[test]
    fn clones_share_state() {
        let a = ledger();
        let b = a.clone();
        a.register(spec(1), &account("0xalice")).unwrap();
        assert_eq!(b.vehicle_count(), 1);
    }

    #[test]
    fn oversized_capacity_is_a_config_error() {
        let mut cfg = LedgerConfig::new(account("0xoperator"));
        cfg.event_capacity = usize::MAX;
        assert!(matches!(
            Ledger::new(cfg),
            Err(ConfigError::CapacityTooLarge {
                field: "event_capacity",
                ..
            })
        ));
    }

    #[test]
    fn mutations_return_committed_record() {
        let ledger = ledger();
        let alice = account("0xalice");
        ledger.register(spec(1), &alice).unwrap();

        let listed = ledger.list_for_sale(Vin::new(1), Amount::from(500), &alice).unwrap();
        assert_eq!(listed.status, VehicleStatus::ForSale);
        assert_eq!(listed.sale_price, Amount::from(500));
        assert_eq!(listed, ledger.fetch(Vin::new(1)).unwrap());

        let moved = ledger.transfer(Vin::new(1), &account("0xbob"), &alice).unwrap();
        assert_eq!(moved.owner, "0xbob");
        assert_eq!(moved.status, VehicleStatus::RoadWorthy);
        assert!(moved.sale_price.is_zero());
        assert_eq!(moved.transitions.len(), 2);
    }

    #[test]
    fn receipt_names_previous_owner() {
        let ledger = ledger();
        listed(&ledger, 1, 1000);
        let receipt = ledger
            .purchase(Vin::new(1), &account("0xbuyer"), Amount::from(1000))
            .unwrap();
        assert_eq!(receipt.seller, "0xseller");
        assert_eq!(receipt.price, Amount::from(1000));
        assert_eq!(ledger.balance_of(&account("0xseller")), receipt.proceeds);
    }

    #[test]
    fn snapshot_reports_retained_window() {
        let ledger = ledger();
        let empty = ledger.snapshot();
        assert_eq!(empty.retained_events, 0);
        assert_eq!(empty.oldest_retained, None);

        listed(&ledger, 1, 10);
        let snap = ledger.snapshot();
        assert_eq!(snap.retained_events, 2);
        assert_eq!(snap.oldest_retained, Some(1));
        assert_eq!(snap.last_sequence, 2);
    }

    #[test]
    fn poll_events_pairs_events_with_cursor() {
        let ledger = ledger();
        listed(&ledger, 1, 10);
        let page = ledger.poll_events(1);
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].sequence, 2);
        assert_eq!(page.last_sequence, 2);
        assert_eq!(page.oldest_retained, Some(1));
        assert!(ledger.poll_events(2).events.is_empty());
    }
}
