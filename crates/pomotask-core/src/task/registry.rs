//! Ordered task collection persisted under `pomodoroTasks`.
//!
//! The registry is the only writer of the task list, including the session
//! ids credited to each task. Every mutation is written through to the
//! store; a failing store is logged and the in-memory list stays
//! authoritative.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Task;
use crate::clock::next_id;
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{keys, read_json, read_parsed, write_json, SharedStore};

/// Aggregate counts over the task list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Tasks not yet completed.
    pub active_tasks: usize,
    pub average_sessions_per_task: f64,
}

pub struct TaskRegistry {
    store: SharedStore,
    tasks: Vec<Task>,
    active_task_id: Option<i64>,
    last_id: i64,
}

impl TaskRegistry {
    /// Empty registry writing to `store`.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            active_task_id: None,
            last_id: 0,
        }
    }

    /// Load the task list and active task from the store.
    ///
    /// The first task flagged active wins; other flags, and flags on
    /// completed tasks, are dropped. Without a flagged task a stored
    /// `activeTaskId` naming an open task is honored. A corrupt list is
    /// logged and replaced by an empty one.
    pub fn load(store: SharedStore) -> Self {
        let tasks: Vec<Task> = match read_json(store.as_ref(), keys::TASKS) {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "stored task list is unreadable, starting empty");
                Vec::new()
            }
        };
        let stored_active = match read_parsed::<i64>(store.as_ref(), keys::ACTIVE_TASK_ID) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "ignoring stored active task id");
                None
            }
        };

        let mut registry = Self::new(store);
        registry.last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        registry.tasks = tasks;
        registry.reconcile_active(stored_active);
        debug!(
            tasks = registry.tasks.len(),
            active = ?registry.active_task_id,
            "task registry loaded"
        );
        registry
    }

    fn reconcile_active(&mut self, stored_active: Option<i64>) {
        let mut winner = None;
        for task in &mut self.tasks {
            if task.active && (task.completed || winner.is_some()) {
                task.active = false;
            } else if task.active {
                winner = Some(task.id);
            }
        }

        if winner.is_none() {
            if let Some(id) = stored_active {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id && !t.completed) {
                    task.active = true;
                    winner = Some(id);
                }
            }
        }
        self.active_task_id = winner;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn active_task_id(&self) -> Option<i64> {
        self.active_task_id
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active_task_id.and_then(|id| self.get(id))
    }

    /// First task in insertion order that is not completed.
    pub fn first_incomplete(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| !t.completed)
    }

    pub fn stats(&self) -> TaskStats {
        let total_tasks = self.tasks.len();
        let completed_tasks = self.tasks.iter().filter(|t| t.completed).count();
        let total_sessions: usize = self.tasks.iter().map(Task::session_count).sum();
        TaskStats {
            total_tasks,
            completed_tasks,
            active_tasks: total_tasks - completed_tasks,
            average_sessions_per_task: total_sessions as f64 / total_tasks.max(1) as f64,
        }
    }

    /// Tasks created today, local time.
    pub fn list_today(&self) -> Vec<&Task> {
        self.list_created_on(Local::now().date_naive())
    }

    /// Tasks whose creation falls on `day` in local time.
    pub fn list_created_on(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.created_at.with_timezone(&Local).date_naive() == day)
            .collect()
    }

    /// Up to `limit` tasks, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.truncate(limit);
        sorted
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new open task.
    pub fn add(&mut self, text: &str) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText.into());
        }
        let task = Task {
            id: next_id(&mut self.last_id),
            text: text.to_string(),
            completed: false,
            active: false,
            created_at: Utc::now(),
            completed_at: None,
            sessions: Vec::new(),
        };
        debug!(id = task.id, "task added");
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Flip completion. Returns the new `completed` value.
    ///
    /// Completing the active task also clears the active selection.
    pub fn toggle_completion(&mut self, id: i64) -> Result<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::task_not_found(id))?;

        task.completed = !task.completed;
        task.completed_at = task.completed.then(Utc::now);
        let completed = task.completed;
        if completed && task.active {
            task.active = false;
            self.active_task_id = None;
        }
        debug!(id, completed, "task completion toggled");
        self.persist();
        Ok(completed)
    }

    /// Remove a task, returning it.
    pub fn delete(&mut self, id: i64) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::task_not_found(id))?;
        let task = self.tasks.remove(index);
        if self.active_task_id == Some(id) {
            self.active_task_id = None;
        }
        debug!(id, "task deleted");
        self.persist();
        Ok(task)
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        debug!(removed, "completed tasks cleared");
        self.persist();
        removed
    }

    /// Make `id` the only active task.
    ///
    /// Unknown or completed targets leave no task active. Returns whether a
    /// task became active.
    pub fn set_active(&mut self, id: i64) -> bool {
        for task in &mut self.tasks {
            task.active = false;
        }
        self.active_task_id = match self.tasks.iter_mut().find(|t| t.id == id && !t.completed) {
            Some(task) => {
                task.active = true;
                Some(id)
            }
            None => None,
        };
        self.persist();

        match self.active_task() {
            Some(task) => {
                info!(id, text = %task.text, "now focusing on task");
                true
            }
            None => false,
        }
    }

    /// Clear the active selection.
    pub fn clear_active(&mut self) {
        for task in &mut self.tasks {
            task.active = false;
        }
        self.active_task_id = None;
        self.persist();
    }

    /// Credit a focus session to a task.
    pub fn associate_session(&mut self, task_id: i64, session_id: i64) -> Result<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CoreError::task_not_found(task_id))?;
        task.sessions.push(session_id);
        debug!(task_id, session_id, "session credited to task");
        self.persist();
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self) {
        let store = self.store.as_ref();
        if let Err(e) = write_json(store, keys::TASKS, &self.tasks) {
            warn!(error = %e, "failed to persist task list");
        }
        let result = match self.active_task_id {
            Some(id) => store.set(keys::ACTIVE_TASK_ID, &id.to_string()),
            None => store.remove(keys::ACTIVE_TASK_ID),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist active task");
        }
    }
}
