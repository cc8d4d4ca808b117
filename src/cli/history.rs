use super::{convert, ui};
use crate::core::{Converter, HistoryEntry};
use anyhow::{Result, bail};
use comfy_table::Cell;

fn display_entries(converter: &Converter, numbered: &[(usize, HistoryEntry)]) -> String {
    let format = converter.number_format();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Time (UTC)"),
        ui::header_cell("From"),
        ui::header_cell("Converted"),
    ]);

    for (index, entry) in numbered {
        let converted = entry
            .currencies
            .iter()
            .filter(|currency| **currency != entry.source_currency)
            .map(|currency| match entry.amounts.get(currency) {
                Some(amount) => format!("{} {}", format.format(*amount), currency),
                None => format!("N/A {currency}"),
            })
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(entry.created_at.format("%H:%M:%S")),
            Cell::new(format!(
                "{} {}",
                format.format(entry.source_amount),
                entry.source_currency
            )),
            Cell::new(converted),
        ]);
    }
    table.to_string()
}

/// Lists saved conversions by day, or brings entry `restore` (1-based) back.
pub async fn run(converter: &mut Converter, restore: Option<usize>) -> Result<()> {
    if let Some(position) = restore {
        let Some(entry) = position
            .checked_sub(1)
            .and_then(|index| converter.history().get(index))
            .cloned()
        else {
            bail!(
                "No history entry #{}, {} saved",
                position,
                converter.history().len()
            );
        };
        converter.restore_from_history(&entry).await;
        println!("{}", convert::display_conversion(converter));
        return Ok(());
    }

    if converter.history().is_empty() {
        println!("{}", ui::style_text("No saved conversions", ui::StyleType::Subtle));
        return Ok(());
    }

    // Numbering follows the flat most-recent-first order used by --restore.
    let mut position = 0;
    for (day, entries) in converter.history_by_day() {
        println!(
            "{}",
            ui::style_text(&day.format("%Y-%m-%d").to_string(), ui::StyleType::Title)
        );
        let numbered: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let item = (position, entry);
                position += 1;
                item
            })
            .collect();
        println!("{}", display_entries(converter, &numbered));
    }
    Ok(())
}
