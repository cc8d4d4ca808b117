use super::ui;
use crate::core::expression::{self, is_operator};
use crate::core::{Converter, CurrencyCode};
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Renders every visible currency with its converted amount.
pub fn display_conversion(converter: &Converter) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Amount")]);

    let has_rates = converter.rates().is_some();
    for &currency in converter.visible_currencies() {
        let active = currency == converter.active_currency();
        let label = if active {
            ui::style_text(currency.as_str(), ui::StyleType::Active)
        } else {
            currency.to_string()
        };

        let amount = if active {
            ui::amount_cell(&active_text(converter), true)
        } else if has_rates && converter.rates().and_then(|r| r.rate(currency)).is_some() {
            let text = converter
                .number_format()
                .format(converter.get_amount(currency));
            ui::amount_cell(&text, false)
        } else {
            ui::na_cell(!has_rates)
        };

        table.add_row(vec![Cell::new(label), amount]);
    }

    table.to_string()
}

// An expression is shown alongside its result.
fn active_text(converter: &Converter) -> String {
    let raw = converter.raw_input();
    if raw.contains(is_operator) {
        let result = converter.number_format().format(expression::evaluate(raw));
        format!("{raw} = {result}")
    } else {
        raw.to_string()
    }
}

pub async fn run(
    converter: &mut Converter,
    expression: &str,
    from: Option<CurrencyCode>,
    save: bool,
) -> Result<()> {
    if let Some(from) = from {
        if !converter.visible_currencies().contains(&from) {
            bail!(
                "Currency {} is not in the visible slots: {}",
                from,
                slot_list(converter.visible_currencies())
            );
        }
        converter.select_currency(from);
    }

    converter.update_input(expression);

    if converter.rates().is_none() {
        println!(
            "{}",
            ui::style_text(
                "No exchange rates available, amounts are shown as N/A",
                ui::StyleType::Error
            )
        );
    }
    println!("{}", display_conversion(converter));

    if save {
        if converter.save_to_history().await {
            println!("{}", ui::style_text("Saved to history", ui::StyleType::Subtle));
        } else {
            println!(
                "{}",
                ui::style_text("Nothing to save for a zero amount", ui::StyleType::Subtle)
            );
        }
    }
    Ok(())
}

pub(crate) fn slot_list(currencies: &[CurrencyCode]) -> String {
    currencies
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
