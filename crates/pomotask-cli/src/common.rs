//! Shared plumbing for CLI commands.

use std::sync::Arc;

use pomotask_core::{Config, Controller, Database, MemoryStore, SharedStore};
use serde::Serialize;
use tracing::warn;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the on-disk store, or fall back to a volatile one so the command
/// still runs when the database is unavailable.
pub fn open_store() -> SharedStore {
    match Database::open() {
        Ok(db) => Arc::new(db),
        Err(e) => {
            warn!(error = %e, "database unavailable, changes will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Load configuration and state into a controller.
pub fn open_controller() -> CliResult<Controller> {
    let config = Config::load()?;
    Ok(Controller::open(open_store(), config)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
