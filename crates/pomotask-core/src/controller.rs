//! The object a front end drives.
//!
//! Owns the timer engine, the task registry and the session notifier over a
//! single shared store, and routes every `SessionCompleted` event through
//! the notifier before handing events back to the caller.

use tracing::debug;

use crate::clock::now_ms;
use crate::error::Result;
use crate::events::Event;
use crate::notifier::{SessionNotifier, SessionObserver};
use crate::stats::{ExportReport, StatsReport};
use crate::storage::{Config, Preferences, SharedStore};
use crate::task::TaskRegistry;
use crate::timer::{TimerConfig, TimerEngine, TimerMode, TimerState};

pub struct Controller {
    store: SharedStore,
    config: Config,
    engine: TimerEngine,
    tasks: TaskRegistry,
    notifier: SessionNotifier,
}

impl Controller {
    /// Load timer and task state from `store`.
    ///
    /// # Errors
    /// Returns an error if `config` carries unusable timer defaults.
    pub fn open(store: SharedStore, config: Config) -> Result<Self> {
        config.validate()?;
        let defaults =
            TimerConfig::from_minutes(config.timer.default_focus_min, config.timer.default_break_min)?;
        let engine = TimerEngine::load(store.clone(), defaults)
            .with_auto_switch_delay_ms(config.timer.auto_switch_delay_ms);
        let tasks = TaskRegistry::load(store.clone());
        debug!(tasks = tasks.len(), "controller opened");
        Ok(Self {
            store,
            config,
            engine,
            tasks,
            notifier: SessionNotifier::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> TimerState {
        self.engine.snapshot()
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskRegistry {
        &mut self.tasks
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.notifier.subscribe(observer);
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::load(self.store.as_ref())
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Result<Event> {
        self.engine.switch_mode(mode)
    }

    pub fn configure(&mut self, focus_min: u64, break_min: u64) -> Result<Event> {
        self.engine.configure(focus_min, break_min)
    }

    /// One second elapsed. Also lands a due automatic mode switch.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = self.engine.tick();
        events.extend(self.engine.poll_deferred(now_ms()));
        for session in events.iter().filter_map(Event::session) {
            self.notifier.session_completed(&mut self.tasks, &session);
        }
        events
    }

    // ── Reports ──────────────────────────────────────────────────────

    pub fn stats_report(&self) -> StatsReport {
        StatsReport::build(
            &self.tasks,
            self.engine.completed_sessions(),
            &self.engine.config(),
            self.config.stats.recent_limit,
        )
    }

    pub fn export_report(&self) -> ExportReport {
        ExportReport::build(&self.tasks, self.engine.completed_sessions())
    }
}
