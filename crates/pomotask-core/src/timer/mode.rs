use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Break,
}

impl TimerMode {
    /// The mode a finished countdown hands over to.
    pub fn next(self) -> Self {
        match self {
            TimerMode::Focus => TimerMode::Break,
            TimerMode::Break => TimerMode::Focus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::Break => "Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(TimerMode::Focus),
            "break" => Ok(TimerMode::Break),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected 'focus' or 'break', got '{other}'"),
            }),
        }
    }
}

/// Configured countdown lengths, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub focus_duration_secs: u64,
    pub break_duration_secs: u64,
}

impl TimerConfig {
    /// Build a config from minutes, rejecting zero durations.
    pub fn from_minutes(focus_min: u64, break_min: u64) -> Result<Self, ValidationError> {
        Self::from_secs(focus_min.saturating_mul(60), break_min.saturating_mul(60))
    }

    pub fn from_secs(focus_secs: u64, break_secs: u64) -> Result<Self, ValidationError> {
        if focus_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "focus".into(),
                message: "duration must be greater than zero".into(),
            });
        }
        if break_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "break".into(),
                message: "duration must be greater than zero".into(),
            });
        }
        Ok(Self {
            focus_duration_secs: focus_secs,
            break_duration_secs: break_secs,
        })
    }

    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_duration_secs,
            TimerMode::Break => self.break_duration_secs,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration_secs: 25 * 60,
            break_duration_secs: 5 * 60,
        }
    }
}

/// A completed focus countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: u64,
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub running: bool,
    pub completed_sessions: u64,
    pub config: TimerConfig,
}

impl TimerState {
    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }

    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
