use super::ui;
use crate::core::{Converter, RateSnapshot, cache};
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;

fn display_rates(converter: &Converter, snapshot: &RateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", snapshot.base)),
        ui::header_cell(&format!("{} per unit", snapshot.base)),
    ]);

    let format = converter.number_format();
    for &currency in converter.visible_currencies() {
        let row = match snapshot.rate(currency) {
            Some(rate) => vec![
                Cell::new(currency.as_str()),
                ui::amount_cell(&format!("{rate:.6}"), false),
                ui::amount_cell(&format.format(1.0 / rate), false),
            ],
            None => vec![Cell::new(currency.as_str()), ui::na_cell(true), ui::na_cell(true)],
        };
        table.add_row(row);
    }
    table.to_string()
}

pub async fn run(converter: &mut Converter, refresh: bool) -> Result<()> {
    let replaced = if refresh {
        converter.refresh_rates().await
    } else {
        converter.refresh_if_stale().await
    };
    if replaced {
        println!("{}", ui::style_text("Fetched new exchange rates", ui::StyleType::Subtle));
    }

    let Some(snapshot) = converter.rates() else {
        println!(
            "{}",
            ui::style_text(
                &format!("No exchange rates available for {}", converter.pivot()),
                ui::StyleType::Error
            )
        );
        return Ok(());
    };

    let freshness = if cache::is_fresh(snapshot, Utc::now().date_naive()) {
        "fresh"
    } else {
        "stale"
    };
    println!(
        "{}",
        ui::style_text(&format!("Exchange rates for {}", snapshot.base), ui::StyleType::Title)
    );
    println!(
        "Fetched on {}, provider updated on {} ({freshness})",
        snapshot.fetched_on, snapshot.provider_updated_on
    );
    println!("{}", display_rates(converter, snapshot));
    Ok(())
}
