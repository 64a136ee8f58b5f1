//! Downloadable statistics document.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskRegistry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub active_tasks: usize,
    /// One decimal place, e.g. `"1.5"`.
    pub average_sessions_per_task: String,
    pub total_pomodoros: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTask {
    pub text: String,
    pub status: String,
    pub sessions: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Task> for ExportedTask {
    fn from(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            status: task.status().to_string(),
            sessions: task.session_count(),
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub date: DateTime<Utc>,
    pub summary: ExportSummary,
    pub tasks: Vec<ExportedTask>,
}

impl ExportReport {
    pub fn build(registry: &TaskRegistry, total_pomodoros: u64) -> Self {
        let stats = registry.stats();
        Self {
            date: Utc::now(),
            summary: ExportSummary {
                total_tasks: stats.total_tasks,
                completed_tasks: stats.completed_tasks,
                active_tasks: stats.active_tasks,
                average_sessions_per_task: format!("{:.1}", stats.average_sessions_per_task),
                total_pomodoros,
            },
            tasks: registry.tasks().iter().map(ExportedTask::from).collect(),
        }
    }

    /// `pomodoro-stats-YYYY-MM-DD.json`, local date of the export.
    pub fn file_name(&self) -> String {
        format!(
            "pomodoro-stats-{}.json",
            self.date.with_timezone(&Local).format("%Y-%m-%d")
        )
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn export_document_shape() {
        let mut reg = TaskRegistry::new(Arc::new(MemoryStore::new()));
        let a = reg.add("A").unwrap().id;
        reg.add("B").unwrap();
        reg.associate_session(a, 1).unwrap();
        reg.toggle_completion(a).unwrap();

        let report = ExportReport::build(&reg, 4);
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["summary"]["totalTasks"], 2);
        assert_eq!(json["summary"]["averageSessionsPerTask"], "0.5");
        assert_eq!(json["summary"]["totalPomodoros"], 4);
        assert_eq!(json["tasks"][0]["status"], "completed");
        assert_eq!(json["tasks"][0]["sessions"], 1);
        assert!(json["tasks"][0]["completedAt"].is_string());
        assert_eq!(json["tasks"][1]["status"], "active");
        assert!(json["tasks"][1]["completedAt"].is_null());
    }

    #[test]
    fn file_name_carries_date() {
        let reg = TaskRegistry::new(Arc::new(MemoryStore::new()));
        let name = ExportReport::build(&reg, 0).file_name();
        assert!(name.starts_with("pomodoro-stats-"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "pomodoro-stats-2024-01-01.json".len());
    }
}
