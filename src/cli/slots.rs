use super::ui;
use crate::core::{Converter, CurrencyCode};
use anyhow::{Result, bail};
use comfy_table::Cell;

fn display_slots(converter: &Converter) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Slot"),
        ui::header_cell("Currency"),
        ui::header_cell("Visible"),
    ]);

    let visible = converter.visible_count();
    for (index, currency) in converter.selected_currencies().iter().enumerate() {
        let name = if *currency == converter.active_currency() {
            ui::style_text(currency.as_str(), ui::StyleType::Active)
        } else {
            currency.to_string()
        };
        let shown = if index < visible { "yes" } else { "no" };
        table.add_row(vec![Cell::new(index + 1), Cell::new(name), Cell::new(shown)]);
    }
    table.to_string()
}

/// Replaces slot `replace.0` (1-based) and/or changes how many slots are shown.
pub async fn run(
    converter: &mut Converter,
    replace: Option<(usize, CurrencyCode)>,
    visible: Option<usize>,
) -> Result<()> {
    if let Some((slot, currency)) = replace {
        let slots = converter.selected_currencies().len();
        if slot == 0 || slot > slots {
            bail!("Slot must be between 1 and {}, got {}", slots, slot);
        }
        converter.replace_currency(slot - 1, currency).await;
    }

    if let Some(count) = visible {
        converter.update_visible_count(count).await;
        if converter.visible_count() != count {
            println!(
                "{}",
                ui::style_text(
                    &format!("Visible slots clamped to {}", converter.visible_count()),
                    ui::StyleType::Subtle
                )
            );
        }
    }

    println!("{}", display_slots(converter));
    Ok(())
}
