pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::core::{Converter, CurrencyCode, PersistenceStore};
use crate::providers::CurrencyApiProvider;
use crate::store::{DiskStore, MemoryStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// A command the binary can run against a loaded converter.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Convert {
        expression: String,
        from: Option<CurrencyCode>,
        save: bool,
    },
    Rates {
        refresh: bool,
    },
    History {
        restore: Option<usize>,
    },
    Slots {
        replace: Option<(usize, CurrencyCode)>,
        visible: Option<usize>,
    },
}

/// Loads configuration and persisted state, then runs `command`.
///
/// With `ephemeral`, state lives in memory and nothing is written to disk.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    ephemeral: bool,
) -> Result<()> {
    info!("fxpad starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load_or_default()?,
    };
    debug!("Loaded config: {config:#?}");

    let store: Arc<dyn PersistenceStore> = if ephemeral {
        debug!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let data_path = config.default_data_path()?;
        Arc::new(
            DiskStore::open(&data_path)
                .with_context(|| format!("Failed to open data store at {}", data_path.display()))?,
        )
    };
    let rate_source = Arc::new(CurrencyApiProvider::new(config.currency_api_url()));

    let mut converter = Converter::new(rate_source, store, config.converter_settings());

    let spinner = cli::ui::new_spinner("Loading exchange rates...");
    converter.initialize().await;
    spinner.finish_and_clear();

    match command {
        AppCommand::Convert {
            expression,
            from,
            save,
        } => cli::convert::run(&mut converter, &expression, from, save).await,
        AppCommand::Rates { refresh } => cli::rates::run(&mut converter, refresh).await,
        AppCommand::History { restore } => cli::history::run(&mut converter, restore).await,
        AppCommand::Slots { replace, visible } => {
            cli::slots::run(&mut converter, replace, visible).await
        }
    }
}
