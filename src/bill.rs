use bon::Builder;
use serde::Serialize;

use crate::{
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
    tariff::{Capacity, Regime, TariffTable},
};

/// Usage allocated to a single bracket and what it costs in both regimes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Builder)]
pub struct BillLineItem {
    #[builder(into)]
    pub bracket_label: String,

    pub allocated: KilowattHours,
    pub amount_before: Cost,
    pub amount_after: Cost,
}

impl BillLineItem {
    pub const fn amount(&self, regime: Regime) -> Cost {
        match regime {
            Regime::Before => self.amount_before,
            Regime::After => self.amount_after,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillResult {
    pub usage: KilowattHours,
    pub total_before: Cost,
    pub total_after: Cost,

    /// Brackets that received any usage, in the table order.
    pub line_items: Vec<BillLineItem>,
}

impl BillResult {
    pub const fn total(&self, regime: Regime) -> Cost {
        match regime {
            Regime::Before => self.total_before,
            Regime::After => self.total_after,
        }
    }
}

/// Fill the brackets in order, each one up to its capacity, and price the allocated usage
/// in both regimes.
///
/// Usage exactly equal to a bracket capacity stays in that bracket.
#[instrument(level = "debug", skip(table), ret(level = "trace"))]
pub fn compute(usage: KilowattHours, table: &TariffTable) -> Result<BillResult> {
    ensure!(usage.is_finite(), "usage must be a finite number, got {usage:?}");
    ensure!(usage >= KilowattHours::ZERO, "usage must not be negative, got {usage:?}");

    let mut remaining = usage;
    let mut line_items = Vec::new();
    for bracket in table.brackets() {
        let allocated = match bracket.capacity {
            Capacity::Bounded(capacity) if remaining > capacity => capacity,
            Capacity::Bounded(_) | Capacity::Unbounded => remaining,
        };
        remaining -= allocated;

        let amount_before = allocated * bracket.price_before;
        let amount_after = allocated * bracket.price_after;
        if amount_before != Cost::ZERO || amount_after != Cost::ZERO {
            line_items.push(
                BillLineItem::builder()
                    .bracket_label(&bracket.label)
                    .allocated(allocated)
                    .amount_before(amount_before)
                    .amount_after(amount_after)
                    .build(),
            );
        }
    }

    Ok(BillResult {
        usage,
        total_before: line_items.iter().map(|item| item.amount_before).sum(),
        total_after: line_items.iter().map(|item| item.amount_after).sum(),
        line_items,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        quantity::price::KilowattHourPrice,
        tariff::{REFERENCE_RATE_CHANGE_DATE, TariffBracket},
    };

    /// Two 50 kWh brackets followed by the unbounded one.
    fn fifty_fifty() -> TariffTable {
        let bracket = |order, capacity: Option<f64>| TariffBracket {
            order,
            label: format!("#{order}"),
            capacity: capacity.map(KilowattHours).into(),
            price_before: KilowattHourPrice(10.0),
            price_after: KilowattHourPrice(20.0),
        };
        TariffTable::try_new(
            REFERENCE_RATE_CHANGE_DATE,
            vec![bracket(1, Some(50.0)), bracket(2, Some(50.0)), bracket(3, None)],
        )
        .unwrap()
    }

    fn allocations(bill: &BillResult) -> Vec<(&str, f64)> {
        bill.line_items.iter().map(|item| (item.bracket_label.as_str(), item.allocated.0)).collect()
    }

    #[test]
    fn test_exact_boundary_stays_in_bracket() {
        let bill = compute(KilowattHours(50.0), &fifty_fifty()).unwrap();
        assert_eq!(allocations(&bill), [("#1", 50.0)]);
        assert_eq!(bill.total_before, Cost(500.0));
        assert_eq!(bill.total_after, Cost(1000.0));
    }

    #[test]
    fn test_overflow_into_next_bracket() {
        let bill = compute(KilowattHours(75.0), &fifty_fifty()).unwrap();
        assert_eq!(allocations(&bill), [("#1", 50.0), ("#2", 25.0)]);
    }

    #[test]
    fn test_overflow_into_unbounded_bracket() {
        let bill = compute(KilowattHours(130.0), &fifty_fifty()).unwrap();
        assert_eq!(allocations(&bill), [("#1", 50.0), ("#2", 50.0), ("#3", 30.0)]);
    }

    #[test]
    fn test_reference_scenario() {
        let bill = compute(KilowattHours(120.0), &TariffTable::reference()).unwrap();
        assert_eq!(
            bill.line_items,
            [
                BillLineItem::builder()
                    .bracket_label("0 - 50 kWh")
                    .allocated(KilowattHours(50.0))
                    .amount_before(Cost(90300.0))
                    .amount_after(Cost(94650.0))
                    .build(),
                BillLineItem::builder()
                    .bracket_label("50 - 100 kWh")
                    .allocated(KilowattHours(50.0))
                    .amount_before(Cost(93300.0))
                    .amount_after(Cost(97800.0))
                    .build(),
                BillLineItem::builder()
                    .bracket_label("101 - 200 kWh")
                    .allocated(KilowattHours(20.0))
                    .amount_before(Cost(43340.0))
                    .amount_after(Cost(45420.0))
                    .build(),
            ]
        );
        assert_eq!(bill.total_before, Cost(226_940.0));
        assert_eq!(bill.total_after, Cost(237_870.0));
        assert_eq!(bill.total(Regime::After), bill.total_after);
    }

    #[test]
    fn test_unbounded_bracket_billed_once() {
        let bill = compute(KilowattHours(450.0), &TariffTable::reference()).unwrap();
        let n_top = bill.line_items.iter().filter(|item| item.bracket_label == "> 401 kWh").count();
        assert_eq!(n_top, 1);
        assert_eq!(bill.line_items.len(), 6);
        assert_eq!(bill.line_items[5].allocated, KilowattHours(50.0));
        assert_eq!(bill.line_items[5].amount(Regime::Before), Cost(157_550.0));
    }

    #[test]
    fn test_zero_usage() {
        let bill = compute(KilowattHours::ZERO, &TariffTable::reference()).unwrap();
        assert!(bill.line_items.is_empty());
        assert_eq!(bill.total_before, Cost::ZERO);
        assert_eq!(bill.total_after, Cost::ZERO);
    }

    #[test]
    fn test_fractional_usage() {
        let bill = compute(KilowattHours(0.5), &TariffTable::reference()).unwrap();
        assert_eq!(allocations(&bill), [("0 - 50 kWh", 0.5)]);
        assert_abs_diff_eq!(bill.total_before.0, 903.0);
    }

    #[test]
    fn test_rejects_invalid_usage() {
        let table = TariffTable::reference();
        assert!(compute(KilowattHours(-1.0), &table).is_err());
        assert!(compute(KilowattHours(f64::NAN), &table).is_err());
        assert!(compute(KilowattHours(f64::INFINITY), &table).is_err());
    }

    #[test]
    fn test_conservation() {
        let table = TariffTable::reference();
        for usage in [0.0, 0.1, 49.9, 50.0, 50.1, 120.0, 333.3, 400.0, 400.5, 1234.56] {
            let bill = compute(KilowattHours(usage), &table).unwrap();
            let allocated: KilowattHours = bill.line_items.iter().map(|item| item.allocated).sum();
            assert_abs_diff_eq!(allocated.0, usage, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_monotonic_and_regime_ordering() {
        let table = TariffTable::reference();
        let mut previous = compute(KilowattHours::ZERO, &table).unwrap();
        for step in 1..=1200 {
            let bill = compute(KilowattHours(f64::from(step) * 0.5), &table).unwrap();
            assert!(bill.total_before >= previous.total_before, "{bill:?}");
            assert!(bill.total_after >= previous.total_after, "{bill:?}");
            assert!(bill.total_after >= bill.total_before, "{bill:?}");
            previous = bill;
        }
    }

    #[test]
    fn test_idempotent() {
        let table = TariffTable::reference();
        let usage = KilowattHours(287.25);
        assert_eq!(compute(usage, &table).unwrap(), compute(usage, &table).unwrap());
    }
}
