//! Core business logic abstractions

pub mod cache;
pub mod clipboard;
pub mod config;
pub mod converter;
pub mod currency;
pub mod expression;
pub mod format;
pub mod history;
pub mod log;
pub mod storage;

// Re-export main types for cleaner imports
pub use clipboard::ClipboardSink;
pub use converter::Converter;
pub use currency::{CurrencyCode, RateSnapshot, RateSource};
pub use format::NumberFormat;
pub use history::{HistoryEntry, HistoryLog};
pub use storage::PersistenceStore;
