//! Statistics module for Pomotask
//!
//! Summaries over the task list and the session counter: the productivity
//! overview shown to the user and the JSON export document.

mod export;
mod summary;

pub use export::{ExportReport, ExportSummary, ExportedTask};
pub use summary::{RecentTask, StatsReport};
