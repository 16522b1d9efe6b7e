#![doc = include_str!("../README.md")]

mod bill;
mod cli;
mod fmt;
mod prelude;
mod quantity;
mod tables;
mod tariff;

use std::io::{self, BufRead};

use clap::{Parser, crate_version};

use crate::{
    bill::compute,
    cli::{Args, CalculateArgs, Command, parse_usage},
    prelude::*,
    quantity::energy::KilowattHours,
    tables::{build_bill_table, build_tariff_table},
    tariff::{Regime, TariffTable},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(io::stderr).init();
    debug!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let tariff = args.load_tariff()?;
    debug!(
        rate_change_date = %tariff.rate_change_date(),
        n_brackets = tariff.brackets().len(),
        "using the tariff",
    );

    match args.command {
        Command::Calculate(args) => calculate(&args, &tariff)?,
        Command::Tariff(args) if args.toml => print!("{}", tariff.to_toml()?),
        Command::Tariff(_) => println!("{}", build_tariff_table(&tariff)),
    }

    Ok(())
}

/// Every line of the standard input is a separate submission when the usage is not given.
fn calculate(args: &CalculateArgs, tariff: &TariffTable) -> Result {
    if let Some(usage) = args.usage {
        return print_bill(args, tariff, usage);
    }
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read the standard input")?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_usage(&line) {
            Ok(usage) => print_bill(args, tariff, usage)?,
            Err(error) => warn!(%line, "skipping the invalid usage: {error:#}"),
        }
    }
    Ok(())
}

fn print_bill(args: &CalculateArgs, tariff: &TariffTable, usage: KilowattHours) -> Result {
    let bill = compute(usage, tariff)?;
    info!(
        %usage,
        total_before = %bill.total_before,
        total_after = %bill.total_after,
        n_line_items = bill.line_items.len(),
        "calculated",
    );

    if args.json {
        println!("{}", serde_json::to_string(&bill)?);
        return Ok(());
    }
    if args.echo {
        println!("Entered: {usage}");
    }
    println!("{}", build_bill_table(&bill, tariff));
    for regime in Regime::ALL {
        println!("Total ({}): {}", tariff.regime_label(regime), bill.total(regime));
    }
    Ok(())
}
