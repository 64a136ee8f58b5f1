//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per second while the countdown runs, and `poll_deferred()` to let the
//! automatic mode switch land after a countdown finishes.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(mode) --start--> Running(mode) --pause--> Idle(mode)
//! Running(mode) --tick at 0--> Idle(mode) ~~deferred~~> Idle(mode.next())
//! any --reset--> Idle(mode), countdown restored
//! Idle(mode) --switch_mode--> Idle(other)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::load(store, TimerConfig::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* render, notify */ }
//! engine.poll_deferred(now_ms());
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use super::mode::{Session, TimerConfig, TimerMode, TimerState};
use crate::clock::{next_id, now_ms};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::{keys, read_parsed, SharedStore};

const DEFAULT_AUTO_SWITCH_DELAY_MS: u64 = 500;

/// Mode switch scheduled by a finished countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeferredSwitch {
    mode: TimerMode,
    due_epoch_ms: u64,
}

/// Core timer engine.
///
/// Owns the countdown and the timer configuration. The configuration and
/// the cumulative session counter are written through to the store as soon
/// as they change; the countdown itself is transient.
pub struct TimerEngine {
    store: SharedStore,
    config: TimerConfig,
    mode: TimerMode,
    remaining_secs: u64,
    total_secs: u64,
    running: bool,
    completed_sessions: u64,
    auto_switch_delay_ms: u64,
    deferred: Option<DeferredSwitch>,
    last_session_id: i64,
}

impl TimerEngine {
    /// Create an idle focus-mode engine with the given configuration.
    pub fn new(store: SharedStore, config: TimerConfig) -> Self {
        Self {
            store,
            config,
            mode: TimerMode::Focus,
            remaining_secs: config.focus_duration_secs,
            total_secs: config.focus_duration_secs,
            running: false,
            completed_sessions: 0,
            auto_switch_delay_ms: DEFAULT_AUTO_SWITCH_DELAY_MS,
            deferred: None,
            last_session_id: 0,
        }
    }

    /// Restore the configuration and session counter from the store.
    ///
    /// Missing values take `defaults`; unreadable ones are logged and also
    /// fall back, so a damaged store never prevents the timer from running.
    pub fn load(store: SharedStore, defaults: TimerConfig) -> Self {
        let config = TimerConfig {
            focus_duration_secs: stored_duration(
                &store,
                keys::FOCUS_TIME,
                defaults.focus_duration_secs,
            ),
            break_duration_secs: stored_duration(
                &store,
                keys::BREAK_TIME,
                defaults.break_duration_secs,
            ),
        };
        let completed_sessions = stored_or(&store, keys::COMPLETED_SESSIONS, 0);

        let mut engine = Self::new(store, config);
        engine.completed_sessions = completed_sessions;
        debug!(?config, completed_sessions, "timer engine loaded");
        engine
    }

    /// Set the pause between a finished countdown and the automatic mode
    /// switch. Zero switches immediately.
    pub fn with_auto_switch_delay_ms(mut self, delay_ms: u64) -> Self {
        self.auto_switch_delay_ms = delay_ms;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed_sessions
    }

    pub fn has_pending_switch(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            running: self.running,
            completed_sessions: self.completed_sessions,
            config: self.config,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change both durations. Rejected while the countdown runs.
    pub fn configure(&mut self, focus_min: u64, break_min: u64) -> Result<Event> {
        if self.running {
            return Err(CoreError::IllegalState(
                "cannot change durations while the timer is running".into(),
            ));
        }
        let config = TimerConfig::from_minutes(focus_min, break_min)?;

        let previous = self.config.duration_secs(self.mode);
        self.config = config;
        self.persist(keys::FOCUS_TIME, config.focus_duration_secs);
        self.persist(keys::BREAK_TIME, config.break_duration_secs);

        let current = config.duration_secs(self.mode);
        if current != previous {
            self.remaining_secs = current;
            self.total_secs = current;
        }
        debug!(?config, "timer reconfigured");

        Ok(Event::ConfigChanged {
            focus_duration_secs: config.focus_duration_secs,
            break_duration_secs: config.break_duration_secs,
            at: Utc::now(),
        })
    }

    /// Select a mode and load its full duration. Rejected while running.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Result<Event> {
        if self.running {
            return Err(CoreError::IllegalState(
                "cannot switch mode while the timer is running".into(),
            ));
        }
        // A manual choice supersedes the automatic one.
        self.deferred = None;
        Ok(self.apply_mode(mode))
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        // Never restart a finished countdown at zero.
        if let Some(deferred) = self.deferred.take() {
            self.apply_mode(deferred.mode);
        }
        self.running = true;
        debug!(mode = %self.mode, remaining = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        debug!(mode = %self.mode, remaining = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.total_secs = self.config.duration_secs(self.mode);
        self.remaining_secs = self.total_secs;
        debug!(mode = %self.mode, "timer reset");
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Call once per second. Idle ticks do nothing.
    ///
    /// Returns the progress event, or the completion events when the
    /// countdown had already reached zero.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            return vec![Event::TimerTick {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                total_secs: self.total_secs,
            }];
        }
        self.complete()
    }

    /// Apply the automatic mode switch once it is due.
    ///
    /// The switch is dropped if the timer was started again in the meantime.
    pub fn poll_deferred(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let deferred = self.deferred?;
        if deferred.due_epoch_ms > now_epoch_ms {
            return None;
        }
        self.deferred = None;
        if self.running {
            debug!(mode = %deferred.mode, "dropping automatic switch, timer is running");
            return None;
        }
        Some(self.apply_mode(deferred.mode))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Vec<Event> {
        self.running = false;
        let finished = self.mode;
        let now = Utc::now();
        let mut events = vec![Event::TimerCompleted { mode: finished, at: now }];

        if finished == TimerMode::Focus {
            self.completed_sessions += 1;
            self.persist(keys::COMPLETED_SESSIONS, self.completed_sessions);

            let session = Session {
                id: next_id(&mut self.last_session_id),
                timestamp: now,
                duration_secs: self.config.focus_duration_secs,
            };
            info!(
                session_id = session.id,
                completed_sessions = self.completed_sessions,
                "focus session completed"
            );
            events.push(Event::from(&session));
        } else {
            info!("break finished");
        }

        let next = finished.next();
        if self.auto_switch_delay_ms == 0 {
            events.push(self.apply_mode(next));
        } else {
            self.deferred = Some(DeferredSwitch {
                mode: next,
                due_epoch_ms: now_ms().saturating_add(self.auto_switch_delay_ms),
            });
        }
        events
    }

    fn apply_mode(&mut self, mode: TimerMode) -> Event {
        self.mode = mode;
        self.total_secs = self.config.duration_secs(mode);
        self.remaining_secs = self.total_secs;
        debug!(%mode, total = self.total_secs, "mode switched");
        Event::ModeSwitched {
            mode,
            total_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    fn persist(&self, key: &str, value: u64) {
        if let Err(e) = self.store.set(key, &value.to_string()) {
            warn!(key, error = %e, "failed to persist timer state");
        }
    }
}

fn stored_or(store: &SharedStore, key: &str, default: u64) -> u64 {
    match read_parsed::<u64>(store.as_ref(), key) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            warn!(key, error = %e, "ignoring stored timer value");
            default
        }
    }
}

/// Each duration falls back on its own; a zero length counts as unset.
fn stored_duration(store: &SharedStore, key: &str, default: u64) -> u64 {
    match stored_or(store, key, default) {
        0 => {
            warn!(key, "stored duration is zero, using default");
            default
        }
        secs => secs,
    }
}
