//! # Pomotask Core Library
//!
//! This library provides the core business logic for the Pomotask Pomodoro
//! timer. Front ends (the `pomotask` CLI) are thin adapters that map input
//! onto the operations exposed here and render the state and events they
//! return.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven focus/break state machine that requires
//!   the caller to invoke `tick()` once per second
//! - **Task Registry**: Ordered task list with completion and a single
//!   active task
//! - **Session Notifier**: Credits completed focus sessions to tasks and
//!   fans them out to observers
//! - **Storage**: Key-value persistence (SQLite) and TOML configuration
//!
//! ## Key Components
//!
//! - [`Controller`]: Owns all of the above over one shared store
//! - [`TimerEngine`]: Core timer state machine
//! - [`TaskRegistry`]: Task persistence and selection
//! - [`Store`]: Trait every persistence backend implements

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod notifier;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use controller::Controller;
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use notifier::{Association, LoggingObserver, SessionNotifier, SessionObserver};
pub use stats::{ExportReport, StatsReport};
pub use storage::{Config, Database, MemoryStore, Preferences, SharedStore, Store};
pub use task::{Task, TaskRegistry, TaskStats};
pub use timer::{Session, TimerConfig, TimerEngine, TimerMode, TimerState};
