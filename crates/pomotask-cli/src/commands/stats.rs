use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Productivity overview
    Show,
    /// Write the statistics document as JSON
    Export {
        /// Output file, `-` for stdout (default: pomodoro-stats-<date>.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: StatsAction, json: bool) -> CliResult {
    let controller = open_controller()?;

    match action {
        StatsAction::Show => {
            let report = controller.stats_report();
            if json {
                print_json(&report)?;
                return Ok(());
            }
            println!("Total pomodoros: {}", report.total_pomodoros);
            println!("Tasks completed: {}", report.completed_tasks);
            println!("Focus time:      {}", report.focus_time_display());
            println!(
                "Sessions/task:   {:.1}",
                report.tasks.average_sessions_per_task
            );
            println!();
            println!("Recent tasks");
            if report.recent_tasks.is_empty() {
                println!("  No tasks yet.");
            }
            for task in &report.recent_tasks {
                println!("  {} - {} sessions, {}", task.text, task.sessions, task.status);
            }
        }
        StatsAction::Export { output } => {
            let report = controller.export_report();
            let body = report.to_json_pretty()?;
            let path = output.unwrap_or_else(|| PathBuf::from(report.file_name()));
            if path.as_os_str() == "-" {
                println!("{body}");
            } else {
                std::fs::write(&path, body)?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}
