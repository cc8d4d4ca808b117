//! Bounded log of past conversions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::currency::CurrencyCode;
use super::format::NumberFormat;

pub const MAX_HISTORY_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub source_currency: CurrencyCode,
    pub source_amount: f64,
    pub currencies: Vec<CurrencyCode>,
    pub amounts: HashMap<CurrencyCode, f64>,
}

/// State needed to bring a past conversion back on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredConversion {
    pub selected_currencies: Vec<CurrencyCode>,
    pub active_currency: CurrencyCode,
    pub formatted_amount: String,
}

/// Most-recent-first list of conversions, never longer than
/// [`MAX_HISTORY_ENTRIES`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { entries }
    }

    /// Prepends `entry`, evicting the oldest entries past the cap.
    /// Callers must not commit zero amounts.
    pub fn commit(&mut self, entry: HistoryEntry) {
        debug_assert!(entry.source_amount != 0.0);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

pub fn restore(entry: &HistoryEntry, format: &NumberFormat) -> RestoredConversion {
    RestoredConversion {
        selected_currencies: entry.currencies.clone(),
        active_currency: entry.source_currency,
        formatted_amount: format.format(entry.source_amount),
    }
}

/// Groups entries by UTC day, newest day first, keeping the order of
/// entries within a day.
pub fn group_by_day(entries: &[HistoryEntry]) -> Vec<(NaiveDate, Vec<HistoryEntry>)> {
    let mut groups: Vec<(NaiveDate, Vec<HistoryEntry>)> = Vec::new();

    for entry in entries {
        let day = entry.created_at.date_naive();
        match groups.iter_mut().find(|(d, _)| *d == day) {
            Some((_, group)) => group.push(entry.clone()),
            None => groups.push((day, vec![entry.clone()])),
        }
    }

    // Stable sort keeps first-seen order for equal days.
    groups.sort_by(|(a, _), (b, _)| b.cmp(a));
    groups
}
