//! # Vehicle Ledger Lifecycle Tests
//!
//! End-to-end behaviour of the ledger through its public API: the VIN 777
//! scenario, the circuit breaker, fee withdrawal, and the money
//! invariants of a sale.

use mart_core::{AccountId, Amount, Vin};
use mart_ledger::{Ledger, LedgerConfig, LedgerError, LedgerEvent};
use mart_state::{VehicleSpec, VehicleStatus};
use proptest::prelude::*;

const ETHER: u128 = 1_000_000_000_000_000_000;

fn account(name: &str) -> AccountId {
    AccountId::new(name).unwrap()
}

fn operator() -> AccountId {
    account("0x5aeda56215b167893e80b4fe645ba6d5bab767de")
}

fn alice() -> AccountId {
    account("0x6330a553fc93768f612722bb8c2ec78ac90b3bbc")
}

fn bob() -> AccountId {
    account("0x5ae8f2b8a7e0f9a4c1d3e6b0a9c8d7e6f5a4b3c2")
}

fn ledger() -> Ledger {
    Ledger::new(LedgerConfig::new(operator())).unwrap()
}

fn ninja(vin: u64) -> VehicleSpec {
    VehicleSpec {
        vin: Vin::new(vin),
        year: 2018,
        model: "Ninja".into(),
        make: "Kawasaki".into(),
        capacity: 1200,
    }
}

fn event_names(ledger: &Ledger) -> Vec<String> {
    ledger
        .journal_since(0)
        .into_iter()
        .map(|e| e.event.to_string())
        .collect()
}

// -- End-to-end scenario ------------------------------------------------------

#[test]
fn test_vin_777_scenario() {
    let ledger = ledger();
    let vin = Vin::new(777);
    let price = Amount::new(2 * ETHER);

    // Register as A.
    ledger.register(ninja(777), &alice()).unwrap();
    let v = ledger.fetch(vin).unwrap();
    assert_eq!(v.status, VehicleStatus::RoadWorthy);
    assert_eq!(v.owner, alice());
    assert!(v.buyer.is_none());

    // List at P.
    ledger.list_for_sale(vin, price, &alice()).unwrap();
    let v = ledger.fetch(vin).unwrap();
    assert_eq!(v.status, VehicleStatus::ForSale);
    assert_eq!(v.sale_price, price);

    // B buys with exact payment.
    let receipt = ledger.purchase(vin, &bob(), price).unwrap();
    let v = ledger.fetch(vin).unwrap();
    assert_eq!(v.status, VehicleStatus::RoadWorthy);
    assert!(v.sale_price.is_zero());
    assert_eq!(v.owner, bob());
    assert_eq!(v.buyer, Some(bob()));
    assert_eq!(receipt.seller, alice());
    assert_eq!(receipt.fee, Amount::new(ETHER / 10));
    assert_eq!(ledger.balance_of(&alice()), Amount::new(19 * ETHER / 10));
    assert_eq!(ledger.accrued_fees(), Amount::new(ETHER / 10));

    // B transfers back to A.
    ledger.transfer(vin, &alice(), &bob()).unwrap();
    let v = ledger.fetch(vin).unwrap();
    assert_eq!(v.owner, alice());
    assert_eq!(v.status, VehicleStatus::RoadWorthy);
    assert_eq!(v.buyer, Some(bob()), "transfer does not rewrite the buyer");

    // Operator pauses; transfers are refused.
    ledger.pause(&operator()).unwrap();
    assert_eq!(
        ledger.transfer(vin, &bob(), &alice()).unwrap_err(),
        LedgerError::OperationDisallowed
    );
    assert_eq!(ledger.fetch(vin).unwrap().owner, alice());

    // Operator withdraws the fee pool.
    let withdrawn = ledger.withdraw(&operator()).unwrap();
    assert_eq!(withdrawn, Amount::new(ETHER / 10));
    assert_eq!(ledger.balance_of(&operator()), Amount::new(ETHER / 10));
    assert!(ledger.accrued_fees().is_zero());

    assert_eq!(
        event_names(&ledger),
        vec![
            "NewBike(777)",
            "ForSale(777)",
            "Sold(777)",
            "Fee(100000000000000000)",
            "TransferVehicle(777)",
            "Stopped()",
            "Withdrawn(100000000000000000)",
        ]
    );
}

#[test]
fn test_details_tuple_after_sale() {
    let ledger = ledger();
    ledger.register(ninja(777), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(777), Amount::from(2000), &alice())
        .unwrap();
    ledger
        .purchase(Vin::new(777), &bob(), Amount::from(2000))
        .unwrap();

    let json = serde_json::to_value(ledger.details(Vin::new(777)).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            "Ninja",
            "Kawasaki",
            777,
            2018,
            0,
            "0",
            bob().as_str(),
            bob().as_str(),
            1200
        ])
    );
}

// -- Authorization ------------------------------------------------------------

#[test]
fn test_non_owner_cannot_list() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    let err = ledger
        .list_for_sale(Vin::new(1), Amount::from(10), &bob())
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
    let v = ledger.fetch(Vin::new(1)).unwrap();
    assert_eq!(v.status, VehicleStatus::RoadWorthy);
    assert!(v.sale_price.is_zero());
}

#[test]
fn test_non_owner_cannot_transfer() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    let err = ledger.transfer(Vin::new(1), &bob(), &bob()).unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
    assert_eq!(ledger.fetch(Vin::new(1)).unwrap().owner, alice());
}

#[test]
fn test_only_operator_controls_breaker_and_fees() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger
        .purchase(Vin::new(1), &bob(), Amount::from(1000))
        .unwrap();

    for result in [ledger.pause(&alice()), ledger.resume(&alice())] {
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }
    assert!(!ledger.is_paused());

    let err = ledger.withdraw(&alice()).unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
    assert_eq!(ledger.accrued_fees(), Amount::from(50));
}

// -- Purchase rules -----------------------------------------------------------

#[test]
fn test_purchase_of_unlisted_vehicle() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    let err = ledger
        .purchase(Vin::new(1), &bob(), Amount::ZERO)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::NotForSale {
            vin: Vin::new(1),
            status: VehicleStatus::RoadWorthy,
        }
    );
}

#[test]
fn test_underpayment_moves_nothing() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    let before = ledger.snapshot();
    let err = ledger
        .purchase(Vin::new(1), &bob(), Amount::from(999))
        .unwrap_err();
    assert!(matches!(err, LedgerError::WrongPayment { .. }));
    assert_eq!(ledger.snapshot(), before);
    assert!(ledger.balance_of(&alice()).is_zero());
    assert_eq!(ledger.fetch(Vin::new(1)).unwrap().owner, alice());
}

#[test]
fn test_transfer_clears_listing() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger.transfer(Vin::new(1), &bob(), &alice()).unwrap();

    let v = ledger.fetch(Vin::new(1)).unwrap();
    assert_eq!(v.status, VehicleStatus::RoadWorthy);
    assert!(v.sale_price.is_zero());
    let err = ledger
        .purchase(Vin::new(1), &alice(), Amount::from(1000))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotForSale { .. }));
}

#[test]
fn test_resale_by_new_owner() {
    let ledger = ledger();
    let carol = account("0xcarol");
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger
        .purchase(Vin::new(1), &bob(), Amount::from(1000))
        .unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(2000), &bob())
        .unwrap();
    ledger
        .purchase(Vin::new(1), &carol, Amount::from(2000))
        .unwrap();

    assert_eq!(ledger.balance_of(&alice()), Amount::from(950));
    assert_eq!(ledger.balance_of(&bob()), Amount::from(1900));
    assert_eq!(ledger.accrued_fees(), Amount::from(150));
    assert_eq!(ledger.fetch(Vin::new(1)).unwrap().buyer, Some(carol));
}

// -- Circuit breaker ----------------------------------------------------------

#[test]
fn test_paused_ledger_rejects_mutations_and_allows_reads() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger.pause(&operator()).unwrap();
    let before = ledger.fetch(Vin::new(1)).unwrap();

    assert_eq!(
        ledger
            .list_for_sale(Vin::new(1), Amount::from(5), &alice())
            .unwrap_err(),
        LedgerError::OperationDisallowed
    );
    assert_eq!(
        ledger
            .purchase(Vin::new(1), &bob(), Amount::from(1000))
            .unwrap_err(),
        LedgerError::OperationDisallowed
    );
    assert_eq!(
        ledger.transfer(Vin::new(1), &bob(), &alice()).unwrap_err(),
        LedgerError::OperationDisallowed
    );
    // The breaker is checked before existence.
    assert_eq!(
        ledger.transfer(Vin::new(99), &bob(), &alice()).unwrap_err(),
        LedgerError::OperationDisallowed
    );

    assert_eq!(ledger.fetch(Vin::new(1)).unwrap(), before);
    assert!(ledger.accrued_fees().is_zero());
    assert!(ledger.balance_of(&alice()).is_zero());

    ledger.resume(&operator()).unwrap();
    ledger
        .purchase(Vin::new(1), &bob(), Amount::from(1000))
        .unwrap();
}

#[test]
fn test_withdraw_allowed_without_pause_by_default() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger
        .purchase(Vin::new(1), &bob(), Amount::from(1000))
        .unwrap();
    assert_eq!(ledger.withdraw(&operator()).unwrap(), Amount::from(50));
    assert_eq!(ledger.withdraw(&operator()).unwrap(), Amount::ZERO);
    assert_eq!(ledger.balance_of(&operator()), Amount::from(50));
}

#[test]
fn test_financed_status_is_never_entered() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger
        .list_for_sale(Vin::new(1), Amount::from(1000), &alice())
        .unwrap();
    ledger
        .purchase(Vin::new(1), &bob(), Amount::from(1000))
        .unwrap();
    ledger.transfer(Vin::new(1), &alice(), &bob()).unwrap();
    let v = ledger.fetch(Vin::new(1)).unwrap();
    assert!(v
        .transitions
        .iter()
        .all(|t| t.to_status != VehicleStatus::Financed));
}

#[test]
fn test_journal_matches_snapshot_sequence() {
    let ledger = ledger();
    ledger.register(ninja(1), &alice()).unwrap();
    ledger.register(ninja(2), &alice()).unwrap();
    let journal = ledger.journal_since(0);
    assert_eq!(ledger.snapshot().last_sequence, 2);
    assert_eq!(journal[1].event, LedgerEvent::NewBike { vin: Vin::new(2) });
    assert_eq!(ledger.journal_since(1).len(), 1);
}

// -- Properties ---------------------------------------------------------------

proptest! {
    #[test]
    fn prop_sale_conserves_value(price in 1u64..=u64::MAX) {
        let ledger = ledger();
        let price = Amount::from(price);
        ledger.register(ninja(1), &alice()).unwrap();
        ledger.list_for_sale(Vin::new(1), price, &alice()).unwrap();
        let receipt = ledger.purchase(Vin::new(1), &bob(), price).unwrap();

        prop_assert_eq!(
            receipt.fee.get() + receipt.proceeds.get(),
            price.get()
        );
        prop_assert_eq!(ledger.balance_of(&alice()), receipt.proceeds);
        prop_assert_eq!(ledger.accrued_fees(), receipt.fee);
        prop_assert_eq!(receipt.fee.get(), (price.get() + 10) / 20);
    }

    #[test]
    fn prop_duplicate_vin_always_rejected(vin in any::<u64>(), year in 1900u32..2100) {
        let ledger = ledger();
        ledger.register(ninja(vin), &alice()).unwrap();
        let err = ledger
            .register(VehicleSpec { year, ..ninja(vin) }, &bob())
            .unwrap_err();
        prop_assert_eq!(err, LedgerError::DuplicateVin(Vin::new(vin)));
        prop_assert_eq!(ledger.fetch(Vin::new(vin)).unwrap().owner, alice());
        prop_assert_eq!(ledger.vehicle_count(), 1);
    }
}
