use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{prelude::*, quantity::energy::KilowattHours, tariff::TariffTable};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// TOML file with a custom tariff table. The built-in reference tariff is used otherwise.
    #[clap(long = "tariff-file", env = "TARIFF_FILE", global = true)]
    pub tariff_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn load_tariff(&self) -> Result<TariffTable> {
        match &self.tariff_file {
            Some(path) => TariffTable::read(path),
            None => Ok(TariffTable::reference()),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Calculate the bill for the monthly usage under both tariffs.
    #[clap(name = "calculate", alias = "calc")]
    Calculate(CalculateArgs),

    /// Show the reference tariff table.
    #[clap(name = "tariff")]
    Tariff(TariffArgs),
}

#[derive(Parser)]
pub struct CalculateArgs {
    /// Monthly usage in kilowatt-hours. Read line by line from the standard input when omitted.
    #[clap(value_parser = parse_usage, allow_negative_numbers = true)]
    pub usage: Option<KilowattHours>,

    /// Print the bill as JSON.
    #[clap(long)]
    pub json: bool,

    /// Print the entered usage before the bill.
    #[clap(long)]
    pub echo: bool,
}

#[derive(Parser)]
pub struct TariffArgs {
    /// Print the table in the tariff file format, to be used as a template for `--tariff-file`.
    #[clap(long)]
    pub toml: bool,
}

/// Parse the usage as entered by the user: a finite non-negative number of kilowatt-hours.
pub fn parse_usage(text: &str) -> Result<KilowattHours> {
    let text = text.trim();
    let usage: f64 = text.parse().with_context(|| format!("`{text}` is not a number"))?;
    ensure!(usage.is_finite(), "`{text}` is not a finite number");
    ensure!(usage >= 0.0, "usage must not be negative, got `{text}`");
    Ok(KilowattHours(usage))
}
