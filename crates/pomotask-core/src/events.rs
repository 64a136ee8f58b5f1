use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Session, TimerMode};

/// Every state change of the timer produces an Event.
/// Front ends render from them; the session notifier consumes
/// `SessionCompleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed on a running countdown.
    TimerTick {
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
    },
    /// Countdown ran out (either mode).
    TimerCompleted {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// A focus countdown finished and minted a session.
    SessionCompleted {
        session_id: i64,
        timestamp: DateTime<Utc>,
        duration_secs: u64,
    },
    ModeSwitched {
        mode: TimerMode,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    ConfigChanged {
        focus_duration_secs: u64,
        break_duration_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The session carried by a `SessionCompleted` event.
    pub fn session(&self) -> Option<Session> {
        match *self {
            Event::SessionCompleted {
                session_id,
                timestamp,
                duration_secs,
            } => Some(Session {
                id: session_id,
                timestamp,
                duration_secs,
            }),
            _ => None,
        }
    }
}

impl From<&Session> for Event {
    fn from(session: &Session) -> Self {
        Event::SessionCompleted {
            session_id: session.id,
            timestamp: session.timestamp,
            duration_secs: session.duration_secs,
        }
    }
}
