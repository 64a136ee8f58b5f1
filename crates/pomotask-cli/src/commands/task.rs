//! Task management commands for CLI.

use clap::Subcommand;
use pomotask_core::Task;

use crate::common::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the end of the list
    Add {
        /// Task text
        text: String,
    },
    /// List tasks
    List {
        /// Only tasks created today
        #[arg(long)]
        today: bool,
    },
    /// Mark a task completed, or open again
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
    /// Remove all completed tasks
    ClearCompleted,
    /// Credit the next focus sessions to this task
    Focus {
        /// Task ID
        id: i64,
    },
    /// Clear the active task
    Unfocus,
}

fn print_task_line(task: &Task) {
    let check = if task.completed { "x" } else { " " };
    let marker = if task.active { " *" } else { "" };
    println!(
        "[{check}] {id}  {text} ({sessions} sessions){marker}",
        id = task.id,
        text = task.text,
        sessions = task.session_count(),
    );
}

pub fn run(action: TaskAction, json: bool) -> CliResult {
    let mut controller = open_controller()?;
    let tasks = controller.tasks_mut();

    match action {
        TaskAction::Add { text } => {
            let task = tasks.add(&text)?;
            if json {
                print_json(&task)?;
            } else {
                println!("Task added: {}", task.id);
            }
        }
        TaskAction::List { today } => {
            let listed: Vec<&Task> = if today {
                tasks.list_today()
            } else {
                tasks.tasks().iter().collect()
            };
            if json {
                print_json(&listed)?;
            } else if listed.is_empty() {
                println!("No tasks.");
            } else {
                for task in &listed {
                    print_task_line(task);
                }
                println!("{} open", tasks.stats().active_tasks);
            }
        }
        TaskAction::Toggle { id } => {
            let completed = tasks.toggle_completion(id)?;
            if json {
                print_json(&tasks.get(id))?;
            } else if completed {
                println!("Task completed: {id}");
            } else {
                println!("Task reopened: {id}");
            }
        }
        TaskAction::Delete { id } => {
            let task = tasks.delete(id)?;
            if json {
                print_json(&task)?;
            } else {
                println!("Task deleted: {id}");
            }
        }
        TaskAction::ClearCompleted => {
            let removed = tasks.clear_completed();
            if json {
                print_json(&serde_json::json!({ "removed": removed }))?;
            } else {
                println!("Removed {removed} completed tasks");
            }
        }
        TaskAction::Focus { id } => {
            if !tasks.set_active(id) {
                return Err(format!("task {id} does not exist or is completed").into());
            }
            if json {
                print_json(&tasks.active_task())?;
            } else if let Some(task) = tasks.active_task() {
                println!("Now focusing on: {}", task.text);
            }
        }
        TaskAction::Unfocus => {
            tasks.clear_active();
            if !json {
                println!("No active task");
            }
        }
    }
    Ok(())
}
