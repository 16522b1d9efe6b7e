use std::{fs, path::Path};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    prelude::*,
    quantity::{energy::KilowattHours, price::KilowattHourPrice},
};

/// Date the reference tariff switched its prices.
pub const REFERENCE_RATE_CHANGE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 10, 11) {
    Some(date) => date,
    None => panic!("invalid rate change date"),
};

/// One of the two pricing schedules around the rate change date.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Before,
    After,
}

impl Regime {
    pub const ALL: [Self; 2] = [Self::Before, Self::After];
}

/// How many kilowatt-hours a bracket covers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<KilowattHours>", into = "Option<KilowattHours>")]
pub enum Capacity {
    Bounded(KilowattHours),

    /// Everything above the other brackets.
    #[default]
    Unbounded,
}

impl Capacity {
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<KilowattHours>> for Capacity {
    fn from(capacity: Option<KilowattHours>) -> Self {
        capacity.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<Capacity> for Option<KilowattHours> {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Bounded(capacity) => Some(capacity),
            Capacity::Unbounded => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TariffBracket {
    /// 1-based position in the table.
    pub order: u32,

    /// Human-readable usage range, for example `101 - 200 kWh`.
    pub label: String,

    #[serde(default, skip_serializing_if = "Capacity::is_unbounded")]
    pub capacity: Capacity,

    pub price_before: KilowattHourPrice,
    pub price_after: KilowattHourPrice,
}

impl TariffBracket {
    pub const fn price(&self, regime: Regime) -> KilowattHourPrice {
        match regime {
            Regime::Before => self.price_before,
            Regime::After => self.price_after,
        }
    }
}

/// Ordered brackets, the last one being the only unbounded one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct TariffTable {
    rate_change_date: NaiveDate,
    brackets: Vec<TariffBracket>,
}

impl TariffTable {
    pub fn try_new(rate_change_date: NaiveDate, mut brackets: Vec<TariffBracket>) -> Result<Self> {
        brackets.sort_by_key(|bracket| bracket.order);
        if let Some((bracket, _)) =
            brackets.iter().tuple_windows().find(|(left, right)| left.order == right.order)
        {
            bail!("duplicate bracket order {}", bracket.order);
        }

        let Some((last, bounded)) = brackets.split_last() else {
            bail!("the tariff table has no brackets");
        };
        ensure!(last.capacity.is_unbounded(), "the last bracket `{}` must be unbounded", last.label);
        for bracket in bounded {
            match bracket.capacity {
                Capacity::Bounded(capacity) => ensure!(
                    capacity.is_finite() && capacity > KilowattHours::ZERO,
                    "bracket `{}` has non-positive capacity {capacity:?}",
                    bracket.label,
                ),
                Capacity::Unbounded => {
                    bail!("only the last bracket may be unbounded, but `{}` is", bracket.label)
                }
            }
        }
        for bracket in &brackets {
            for regime in Regime::ALL {
                let price = bracket.price(regime);
                ensure!(
                    price.is_positive(),
                    "bracket `{}` has non-positive {regime:?} price {price:?}",
                    bracket.label,
                );
            }
        }

        Ok(Self { rate_change_date, brackets })
    }

    /// Household tariff in effect around the rate change of 11/10/2024.
    pub fn reference() -> Self {
        let bracket = |order, label: &str, capacity: Option<f64>, before, after| TariffBracket {
            order,
            label: label.to_owned(),
            capacity: capacity.map(KilowattHours).into(),
            price_before: KilowattHourPrice(before),
            price_after: KilowattHourPrice(after),
        };
        Self {
            rate_change_date: REFERENCE_RATE_CHANGE_DATE,
            brackets: vec![
                bracket(1, "0 - 50 kWh", Some(50.0), 1806.0, 1893.0),
                bracket(2, "50 - 100 kWh", Some(50.0), 1866.0, 1956.0),
                bracket(3, "101 - 200 kWh", Some(100.0), 2167.0, 2271.0),
                bracket(4, "201 - 300 kWh", Some(100.0), 2729.0, 2860.0),
                bracket(5, "301 - 400 kWh", Some(100.0), 3050.0, 3197.0),
                bracket(6, "> 401 kWh", None, 3151.0, 3302.0),
            ],
        }
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read the tariff file `{}`", path.display()))?;
        let table = Self::from_toml(&contents)
            .with_context(|| format!("invalid tariff file `{}`", path.display()))?;
        info!(n_brackets = table.brackets.len(), "loaded the tariff");
        Ok(table)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: TariffFile = toml::from_str(contents)?;
        Self::try_new(file.rate_change_date, file.brackets)
    }

    pub fn to_toml(&self) -> Result<String> {
        let file = TariffFile {
            rate_change_date: self.rate_change_date,
            brackets: self.brackets.clone(),
        };
        Ok(toml::to_string(&file)?)
    }

    pub fn brackets(&self) -> &[TariffBracket] {
        &self.brackets
    }

    pub const fn rate_change_date(&self) -> NaiveDate {
        self.rate_change_date
    }

    /// Column title for the regime, for example `From 11/10/2024`.
    pub fn regime_label(&self, regime: Regime) -> String {
        let date = self.rate_change_date.format("%d/%m/%Y");
        match regime {
            Regime::Before => format!("Before {date}"),
            Regime::After => format!("From {date}"),
        }
    }
}

impl Default for TariffTable {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Serialize, Deserialize)]
struct TariffFile {
    #[serde(default = "reference_rate_change_date")]
    rate_change_date: NaiveDate,

    brackets: Vec<TariffBracket>,
}

const fn reference_rate_change_date() -> NaiveDate {
    REFERENCE_RATE_CHANGE_DATE
}
