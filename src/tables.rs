use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    bill::BillResult,
    fmt::FormattedNumber,
    tariff::{Capacity, Regime, TariffTable},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_bill_table(bill: &BillResult, tariff: &TariffTable) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Bracket".to_owned(),
        "Usage".to_owned(),
        tariff.regime_label(Regime::Before),
        tariff.regime_label(Regime::After),
    ]);
    for item in &bill.line_items {
        let mut row = vec![
            Cell::new(&item.bracket_label),
            Cell::new(item.allocated).set_alignment(CellAlignment::Right),
        ];
        for regime in Regime::ALL {
            let amount = item.amount(regime);
            row.push(Cell::new(amount).set_alignment(CellAlignment::Right).fg(
                if amount > item.amount_before { Color::Red } else { Color::Reset },
            ));
        }
        table.add_row(row);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(bill.usage).set_alignment(CellAlignment::Right),
        Cell::new(bill.total_before)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(bill.total_after)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// Static reference table of all the brackets.
pub fn build_tariff_table(tariff: &TariffTable) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "#".to_owned(),
        "Usage range".to_owned(),
        "Max kWh".to_owned(),
        tariff.regime_label(Regime::Before),
        tariff.regime_label(Regime::After),
    ]);
    for bracket in tariff.brackets() {
        let capacity = match bracket.capacity {
            Capacity::Bounded(capacity) => {
                Cell::new(FormattedNumber(capacity.0)).set_alignment(CellAlignment::Right)
            }
            Capacity::Unbounded => Cell::new("∞")
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        };
        table.add_row(vec![
            Cell::new(bracket.order).add_attribute(Attribute::Dim),
            Cell::new(&bracket.label),
            capacity,
            Cell::new(FormattedNumber(bracket.price_before.0)).set_alignment(CellAlignment::Right),
            Cell::new(FormattedNumber(bracket.price_after.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
