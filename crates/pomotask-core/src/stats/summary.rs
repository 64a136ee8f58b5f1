use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskRegistry, TaskStats};
use crate::timer::TimerConfig;

/// Short entry in the recent-tasks list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTask {
    pub id: i64,
    pub text: String,
    pub sessions: usize,
    pub status: String,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            sessions: task.session_count(),
            status: task.status().to_string(),
        }
    }
}

/// Productivity overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_pomodoros: u64,
    pub completed_tasks: usize,
    /// Pomodoros times the configured focus length.
    pub focus_minutes: u64,
    pub tasks: TaskStats,
    pub recent_tasks: Vec<RecentTask>,
}

impl StatsReport {
    pub fn build(
        registry: &TaskRegistry,
        total_pomodoros: u64,
        config: &TimerConfig,
        recent_limit: usize,
    ) -> Self {
        let tasks = registry.stats();
        Self {
            total_pomodoros,
            completed_tasks: tasks.completed_tasks,
            focus_minutes: total_pomodoros.saturating_mul(config.focus_duration_secs) / 60,
            tasks,
            recent_tasks: registry
                .recent(recent_limit)
                .into_iter()
                .map(RecentTask::from)
                .collect(),
        }
    }

    /// Focus time as `Xh Ym`.
    pub fn focus_time_display(&self) -> String {
        format!("{}h {}m", self.focus_minutes / 60, self.focus_minutes % 60)
    }
}
