//! Task list with completion tracking and a single "active" task.

mod registry;

pub use registry::{TaskRegistry, TaskStats};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work that focus sessions can be credited to.
///
/// Serialized with the same field names the stored task list has always
/// used, so lists written by older front ends load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Ids of the focus sessions credited to this task, oldest first.
    #[serde(default)]
    pub sessions: Vec<i64>,
}

impl Task {
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// "completed" or "active", as shown in reports.
    pub fn status(&self) -> &'static str {
        if self.completed {
            "completed"
        } else {
            "active"
        }
    }
}
