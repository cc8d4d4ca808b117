//! The conversion coordinator.
//!
//! [`Converter`] owns the keypad input, the active currency, the amount in the
//! pivot currency, the rate snapshot and the history log. Every change to the
//! input, the active currency or the rates recomputes the pivot amount before
//! anything can read it, except switching currencies, which only re-renders
//! the input text for the new currency.
//!
//! Collaborator failures never escape: they are logged and the converter
//! keeps working with whatever data it already holds.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cache;
use super::clipboard::ClipboardSink;
use super::currency::{CurrencyCode, RateSnapshot, RateSource};
use super::expression::{self, Operator, is_decimal_separator, is_operator};
use super::format::NumberFormat;
use super::history::{self, HistoryEntry, HistoryLog};
use super::storage::PersistenceStore;

#[derive(Debug, Clone)]
pub struct ConverterSettings {
    pub pivot: CurrencyCode,
    pub currencies: Vec<CurrencyCode>,
    pub visible_count: usize,
    pub format: NumberFormat,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            pivot: CurrencyCode::Eur,
            currencies: CurrencyCode::DEFAULT_SELECTION.to_vec(),
            visible_count: CurrencyCode::DEFAULT_SELECTION.len(),
            format: NumberFormat::default(),
        }
    }
}

/// Marks a rate fetch as in flight for as long as it lives.
struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl RefreshGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn absent_on_error<T>(result: Result<Option<T>>, what: &str) -> Option<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load {what}, treating as absent");
        None
    })
}

fn log_store_error(result: Result<()>, what: &str) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to persist {what}");
    }
}

pub struct Converter {
    rate_source: Arc<dyn RateSource>,
    store: Arc<dyn PersistenceStore>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    pivot: CurrencyCode,
    format: NumberFormat,
    rates: Option<RateSnapshot>,
    selected_currencies: Vec<CurrencyCode>,
    visible_count: usize,
    active_currency: CurrencyCode,
    raw_input: String,
    pivot_amount: f64,
    loading: bool,
    refreshing: Arc<AtomicBool>,
    history: HistoryLog,
}

impl Converter {
    pub fn new(
        rate_source: Arc<dyn RateSource>,
        store: Arc<dyn PersistenceStore>,
        settings: ConverterSettings,
    ) -> Self {
        let selected_currencies = if settings.currencies.is_empty() {
            CurrencyCode::DEFAULT_SELECTION.to_vec()
        } else {
            settings.currencies
        };
        let visible_count = settings.visible_count.clamp(1, selected_currencies.len());
        let active_currency = selected_currencies[0];

        Self {
            rate_source,
            store,
            clipboard: None,
            pivot: settings.pivot,
            format: settings.format,
            rates: None,
            selected_currencies,
            visible_count,
            active_currency,
            raw_input: String::new(),
            pivot_amount: 0.0,
            loading: true,
            refreshing: Arc::new(AtomicBool::new(false)),
            history: HistoryLog::new(),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn pivot(&self) -> CurrencyCode {
        self.pivot
    }

    pub fn number_format(&self) -> &NumberFormat {
        &self.format
    }

    pub fn rates(&self) -> Option<&RateSnapshot> {
        self.rates.as_ref()
    }

    pub fn active_currency(&self) -> CurrencyCode {
        self.active_currency
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn pivot_amount(&self) -> f64 {
        self.pivot_amount
    }

    pub fn selected_currencies(&self) -> &[CurrencyCode] {
        &self.selected_currencies
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn visible_currencies(&self) -> &[CurrencyCode] {
        let end = self.visible_count.min(self.selected_currencies.len());
        &self.selected_currencies[..end]
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn history_by_day(&self) -> Vec<(NaiveDate, Vec<HistoryEntry>)> {
        history::group_by_day(self.history.entries())
    }

    /// Loads persisted state and makes sure some rates are on hand.
    ///
    /// A persisted snapshot is adopted right away, even when stale. The rate
    /// source is only hit when there is no snapshot or it is not fresh.
    pub async fn initialize(&mut self) {
        self.loading = true;

        let (cached, saved_currencies, saved_visible, saved_history) = futures::join!(
            self.store.load_rates(),
            self.store.load_selected_currencies(),
            self.store.load_visible_count(),
            self.store.load_history(),
        );

        match saved_history {
            Ok(entries) => self.history = HistoryLog::from_entries(entries),
            Err(e) => warn!(error = %e, "Failed to load history, starting empty"),
        }

        if let Some(currencies) = absent_on_error(saved_currencies, "selected currencies") {
            if let Some(&first) = currencies.first() {
                self.selected_currencies = currencies;
                self.active_currency = first;
            }
        }

        if let Some(count) = absent_on_error(saved_visible, "visible count") {
            self.visible_count = count;
        }
        self.visible_count = self.visible_count.clamp(1, self.selected_currencies.len());

        if let Some(snapshot) = absent_on_error(cached, "rates") {
            if snapshot.base != self.pivot {
                warn!(base = %snapshot.base, pivot = %self.pivot, "Ignoring cached rates for another pivot");
            } else {
                let fresh = cache::is_fresh(&snapshot, today());
                self.adopt_rates(snapshot);
                if fresh {
                    info!("Using cached exchange rates");
                    self.loading = false;
                    return;
                }
            }
        }

        self.refresh_rates().await;
        self.loading = false;
    }

    /// Refetches only when no fetch is running and the held rates are stale.
    pub async fn refresh_if_stale(&mut self) -> bool {
        if self.is_refreshing() {
            return false;
        }
        if self
            .rates
            .as_ref()
            .is_some_and(|snapshot| cache::is_fresh(snapshot, today()))
        {
            debug!("Exchange rates are fresh, skipping refresh");
            return false;
        }
        self.refresh_rates().await
    }

    /// Fetches new rates unless a fetch is already in flight. Returns whether
    /// the held snapshot was replaced.
    pub async fn refresh_rates(&mut self) -> bool {
        let Some(_guard) = RefreshGuard::acquire(&self.refreshing) else {
            debug!("Rate refresh already in flight");
            return false;
        };

        let snapshot = match self.rate_source.fetch_rates(self.pivot).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates");
                return false;
            }
        };
        if snapshot.base != self.pivot {
            warn!(base = %snapshot.base, pivot = %self.pivot, "Rate source returned another base");
            return false;
        }

        info!(
            provider_updated_on = %snapshot.provider_updated_on,
            currencies = snapshot.rates.len(),
            "Fetched exchange rates"
        );
        self.adopt_rates(snapshot);
        if let Some(snapshot) = &self.rates {
            log_store_error(self.store.save_rates(snapshot).await, "rates");
        }
        true
    }

    fn adopt_rates(&mut self, snapshot: RateSnapshot) {
        self.rates = Some(snapshot);
        self.recalculate();
    }

    fn to_pivot(&self, amount: f64, from: CurrencyCode) -> f64 {
        self.rates
            .as_ref()
            .and_then(|snapshot| snapshot.rate(from))
            .map_or(0.0, |rate| amount / rate)
    }

    fn from_pivot(&self, pivot_amount: f64, to: CurrencyCode) -> f64 {
        self.rates
            .as_ref()
            .and_then(|snapshot| snapshot.rate(to))
            .map_or(0.0, |rate| pivot_amount * rate)
    }

    /// The current input expressed in `currency`, `0` without a rate.
    pub fn get_amount(&self, currency: CurrencyCode) -> f64 {
        self.from_pivot(self.pivot_amount, currency)
    }

    /// Display text for `currency`: the raw input for the active currency,
    /// empty when nothing was typed, a formatted amount otherwise.
    pub fn format_amount(&self, currency: CurrencyCode) -> String {
        if currency == self.active_currency {
            return self.raw_input.clone();
        }
        let amount = self.get_amount(currency);
        if amount == 0.0 && self.raw_input.is_empty() {
            return String::new();
        }
        self.format.format(amount)
    }

    /// Copies the amount shown for `currency` without grouping. Returns
    /// whether anything reached the clipboard.
    pub async fn copy_amount(&self, currency: CurrencyCode) -> bool {
        let Some(clipboard) = &self.clipboard else {
            return false;
        };
        let text: String = self
            .format_amount(currency)
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != self.format.group_separator)
            .collect();
        if text.is_empty() {
            return false;
        }
        match clipboard.copy(&text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to copy amount");
                false
            }
        }
    }

    pub fn select_currency(&mut self, currency: CurrencyCode) {
        if currency == self.active_currency {
            return;
        }
        if !self.visible_currencies().contains(&currency) {
            debug!(%currency, "Ignoring selection of a hidden currency");
            return;
        }

        let amount = self.get_amount(currency);
        self.active_currency = currency;
        self.raw_input = if amount != 0.0 {
            self.format.format(amount)
        } else {
            String::new()
        };
    }

    fn recalculate(&mut self) {
        let amount = expression::evaluate(&self.raw_input);
        self.pivot_amount = self.to_pivot(amount, self.active_currency);
    }

    fn last_char(&self) -> Option<char> {
        self.raw_input.chars().last()
    }

    /// Replaces the input, keeping only digits, operators and the first
    /// decimal separator of each operand.
    pub fn update_input(&mut self, value: &str) {
        let mut has_separator = false;
        self.raw_input = value
            .chars()
            .filter(|ch| {
                if is_operator(*ch) {
                    has_separator = false;
                    true
                } else if is_decimal_separator(*ch) {
                    !std::mem::replace(&mut has_separator, true)
                } else {
                    ch.is_ascii_digit()
                }
            })
            .collect();
        self.recalculate();
    }

    pub fn append_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        self.raw_input.push(digit);
        self.recalculate();
    }

    pub fn append_operator(&mut self, operator: Operator) {
        match self.last_char() {
            None => return,
            Some(last) if is_decimal_separator(last) => return,
            Some(last) if is_operator(last) => {
                self.raw_input.pop();
                self.raw_input.push(operator.as_char());
            }
            Some(_) => self.raw_input.push(operator.as_char()),
        }
        self.recalculate();
    }

    pub fn append_decimal(&mut self) {
        let segment_start = self.raw_input.rfind(is_operator).map_or(0, |i| i + 1);
        if self.raw_input[segment_start..].contains(is_decimal_separator) {
            return;
        }

        if self.last_char().is_none_or(is_operator) {
            self.raw_input.push('0');
        }
        self.raw_input.push(self.format.decimal_separator);
        self.recalculate();
    }

    pub fn backspace(&mut self) {
        if self.raw_input.pop().is_none() {
            return;
        }
        self.recalculate();
    }

    pub fn clear_input(&mut self) {
        self.raw_input.clear();
        self.recalculate();
    }

    /// Collapses the input expression into its formatted result.
    pub fn evaluate(&mut self) {
        let result = expression::evaluate(&self.raw_input);
        if result == 0.0 && self.raw_input.is_empty() {
            return;
        }
        self.raw_input = if result == 0.0 {
            String::new()
        } else {
            self.format.format(result)
        };
        self.recalculate();
    }

    pub async fn replace_currency(&mut self, index: usize, currency: CurrencyCode) {
        let Some(slot) = self.selected_currencies.get_mut(index) else {
            warn!(index, "No currency slot at index");
            return;
        };
        let previous = std::mem::replace(slot, currency);

        if previous == self.active_currency {
            self.active_currency = currency;
            self.recalculate();
        }

        log_store_error(
            self.store
                .save_selected_currencies(&self.selected_currencies)
                .await,
            "selected currencies",
        );
    }

    pub async fn update_visible_count(&mut self, count: usize) {
        self.visible_count = count.clamp(1, self.selected_currencies.len());

        if !self.visible_currencies().contains(&self.active_currency) {
            self.active_currency = self.selected_currencies[0];
            self.recalculate();
        }

        log_store_error(
            self.store.save_visible_count(self.visible_count).await,
            "visible count",
        );
    }

    /// Records the current conversion. Zero amounts are never saved.
    pub async fn save_to_history(&mut self) -> bool {
        let source_amount = expression::evaluate(&self.raw_input);
        if source_amount == 0.0 {
            return false;
        }

        let currencies = self.visible_currencies().to_vec();
        let amounts = currencies
            .iter()
            .map(|currency| (*currency, self.get_amount(*currency)))
            .collect();
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            source_currency: self.active_currency,
            source_amount,
            currencies,
            amounts,
        };

        debug!(id = %entry.id, "Saving conversion to history");
        self.history.commit(entry);
        log_store_error(
            self.store.save_history(self.history.entries()).await,
            "history",
        );
        true
    }

    pub async fn restore_from_history(&mut self, entry: &HistoryEntry) {
        let restored = history::restore(entry, &self.format);
        let mut currencies = restored.selected_currencies;
        if !currencies.contains(&restored.active_currency) {
            currencies.insert(0, restored.active_currency);
        }

        self.visible_count = currencies.len();
        self.selected_currencies = currencies;
        self.active_currency = restored.active_currency;
        self.raw_input = restored.formatted_amount;
        self.pivot_amount = self.to_pivot(entry.source_amount, entry.source_currency);

        let (selection, visible) = futures::join!(
            self.store
                .save_selected_currencies(&self.selected_currencies),
            self.store.save_visible_count(self.visible_count),
        );
        log_store_error(selection, "selected currencies");
        log_store_error(visible, "visible count");
    }
}
