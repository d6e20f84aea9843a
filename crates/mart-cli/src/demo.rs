//! # `mart demo`
//!
//! Plays the marketplace round trip against an in-process ledger and
//! prints each step, the resulting balances, and the event journal:
//!
//! 1. the seller registers VIN 777 (2018 Kawasaki Ninja, 1200cc);
//! 2. lists it at `--price`;
//! 3. the buyer pays exactly that;
//! 4. the buyer transfers it back to the seller;
//! 5. the operator pauses, and a further transfer is refused;
//! 6. the operator withdraws the fee and resumes.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;

use mart_core::{AccountId, Amount, Vin};
use mart_ledger::{EventEnvelope, Ledger, LedgerError};
use mart_state::VehicleSpec;

use crate::config::MartConfig;

/// Seller identity used by the demo.
pub const SELLER: &str = "0x6330a553fc93768f612722bb8c2ec78ac90b3bbc";
/// Buyer identity used by the demo.
pub const BUYER: &str = "0x5ae8f2b8a7e0f9a4c1d3e6b0a9c8d7e6f5a4b3c2";

/// Arguments for the `demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Asking price in the smallest currency unit (default: 2 ether).
    #[arg(long, default_value = "2000000000000000000")]
    pub price: Amount,

    /// VIN to register.
    #[arg(long, default_value_t = 777)]
    pub vin: u64,
}

/// What the demo left behind.
#[derive(Debug)]
pub struct DemoReport {
    pub fee: Amount,
    pub final_owner: AccountId,
    pub seller_balance: Amount,
    pub operator_balance: Amount,
    pub events: Vec<EventEnvelope>,
}

/// Run the scenario, writing a transcript to `out`.
pub fn play(args: &DemoArgs, config: &MartConfig, out: &mut impl Write) -> Result<DemoReport> {
    let ledger = Ledger::new(config.ledger.clone())?;
    let operator = ledger.operator().clone();
    let seller = AccountId::new(SELLER)?;
    let buyer = AccountId::new(BUYER)?;
    let vin = Vin::new(args.vin);

    ledger.register(
        VehicleSpec {
            vin,
            year: 2018,
            model: "Ninja".into(),
            make: "Kawasaki".into(),
            capacity: 1200,
        },
        &seller,
    )?;
    writeln!(out, "registered  VIN {vin} to {seller}")?;

    ledger.list_for_sale(vin, args.price, &seller)?;
    writeln!(out, "listed      VIN {vin} at {}", args.price)?;

    let receipt = ledger.purchase(vin, &buyer, args.price)?;
    writeln!(
        out,
        "sold        VIN {vin} to {buyer}: fee {} proceeds {}",
        receipt.fee, receipt.proceeds
    )?;

    let record = ledger.transfer(vin, &seller, &buyer)?;
    writeln!(out, "transferred VIN {vin} back to {}", record.owner)?;

    ledger.pause(&operator)?;
    writeln!(out, "paused      by operator {operator}")?;
    match ledger.transfer(vin, &buyer, &seller) {
        Err(LedgerError::OperationDisallowed) => {
            writeln!(out, "refused     transfer of VIN {vin} while paused")?;
        }
        Err(e) => bail!("transfer while paused failed unexpectedly: {e}"),
        Ok(_) => bail!("transfer while paused was accepted"),
    }

    let withdrawn = ledger.withdraw(&operator)?;
    writeln!(out, "withdrawn   {withdrawn} to operator {operator}")?;
    ledger.resume(&operator)?;

    let record = ledger.fetch(vin)?;
    writeln!(out, "vehicle     status {} owner {}", record.status, record.owner)?;

    let events = ledger.journal_since(0);
    writeln!(out, "events:")?;
    for envelope in &events {
        writeln!(out, "  #{:<3} {}", envelope.sequence, envelope.event)?;
    }

    Ok(DemoReport {
        fee: receipt.fee,
        final_owner: record.owner,
        seller_balance: ledger.balance_of(&seller),
        operator_balance: ledger.balance_of(&operator),
        events,
    })
}

/// Execute the `demo` subcommand.
pub fn run_demo(args: &DemoArgs, config: &MartConfig) -> Result<u8> {
    let stdout = std::io::stdout();
    play(args, config, &mut stdout.lock())?;
    Ok(0)
}
