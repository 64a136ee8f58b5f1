//! Routing of completed focus sessions.
//!
//! The notifier credits each completed session to a task and then tells
//! every registered observer about it. It holds no persistent state.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::task::TaskRegistry;
use crate::timer::Session;

/// Where a completed session ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "task_id", rename_all = "snake_case")]
pub enum Association {
    /// Credited to the task the user marked active.
    ActiveTask(i64),
    /// No active task; credited to the first open task.
    FirstIncomplete(i64),
    /// No open task existed. The session still counts.
    Unassociated,
}

impl Association {
    pub fn task_id(&self) -> Option<i64> {
        match *self {
            Association::ActiveTask(id) | Association::FirstIncomplete(id) => Some(id),
            Association::Unassociated => None,
        }
    }
}

/// External party interested in completed sessions (UI, stats, bell).
pub trait SessionObserver {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Called after the session has been credited.
    fn on_session_complete(
        &mut self,
        _session: &Session,
        _association: Association,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }
}

#[derive(Default)]
pub struct SessionNotifier {
    observers: Vec<Box<dyn SessionObserver>>,
}

impl SessionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Credit `session` to the active task, else the first open task, then
    /// fan out to observers. Observer failures are logged and swallowed.
    pub fn session_completed(
        &mut self,
        registry: &mut TaskRegistry,
        session: &Session,
    ) -> Association {
        let association = associate(registry, session);
        match association.task_id() {
            Some(task_id) => info!(session_id = session.id, task_id, "session credited"),
            None => info!(session_id = session.id, "no open task, session left unassociated"),
        }

        for observer in &mut self.observers {
            if let Err(e) = observer.on_session_complete(session, association) {
                warn!(observer = observer.name(), error = %e, "session observer failed");
            }
        }
        association
    }
}

fn associate(registry: &mut TaskRegistry, session: &Session) -> Association {
    if let Some(active) = registry.active_task_id() {
        match registry.associate_session(active, session.id) {
            Ok(()) => return Association::ActiveTask(active),
            Err(e) => warn!(error = %e, "active task vanished, falling back"),
        }
    }

    let Some(first) = registry.first_incomplete().map(|t| t.id) else {
        return Association::Unassociated;
    };
    match registry.associate_session(first, session.id) {
        Ok(()) => Association::FirstIncomplete(first),
        Err(e) => {
            warn!(error = %e, "could not credit session");
            Association::Unassociated
        }
    }
}

/// Observer that records every completion through `tracing`.
pub struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn name(&self) -> &str {
        "log"
    }

    fn on_session_complete(
        &mut self,
        session: &Session,
        association: Association,
    ) -> Result<(), Box<dyn std::error::Error>> {
        info!(
            session_id = session.id,
            duration_secs = session.duration_secs,
            task_id = ?association.task_id(),
            "pomodoro completed"
        );
        Ok(())
    }
}
