//! Persistence abstraction for rates, preferences and history.

use anyhow::Result;
use async_trait::async_trait;

use super::currency::{CurrencyCode, RateSnapshot};
use super::history::HistoryEntry;

/// Durable storage used by the converter. Implementations report corrupt or
/// unreadable data as absent rather than as an error.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn save_rates(&self, snapshot: &RateSnapshot) -> Result<()>;
    async fn load_rates(&self) -> Result<Option<RateSnapshot>>;

    async fn save_selected_currencies(&self, currencies: &[CurrencyCode]) -> Result<()>;
    async fn load_selected_currencies(&self) -> Result<Option<Vec<CurrencyCode>>>;

    async fn save_visible_count(&self, count: usize) -> Result<()>;
    async fn load_visible_count(&self) -> Result<Option<usize>>;

    async fn save_history(&self, entries: &[HistoryEntry]) -> Result<()>;
    /// Empty when nothing was saved yet.
    async fn load_history(&self) -> Result<Vec<HistoryEntry>>;
}
