//! Timer commands, including the live countdown.
//!
//! `timer run` is the interactive front end: a one-second interval drives
//! the controller while single-letter commands on stdin map onto the timer
//! operations (Enter toggles start/pause, s start, p pause, r reset, f focus,
//! b break, q quit). A terminal bell rings when any countdown finishes.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use pomotask_core::{Controller, Event, LoggingObserver, TimerMode};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::common::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a live countdown in the foreground
    Run {
        /// Mode to start in (focus or break)
        #[arg(long)]
        mode: Option<TimerMode>,
        /// Number of countdowns to run back to back
        #[arg(long, default_value = "1")]
        cycles: u32,
        /// Wait for an `s` command instead of starting right away
        #[arg(long)]
        paused: bool,
    },
    /// Print the timer configuration and session counter
    Status,
    /// Change the focus and break durations
    Configure {
        /// Focus duration in minutes
        #[arg(long)]
        focus: u64,
        /// Break duration in minutes
        #[arg(long = "break")]
        break_min: u64,
    },
}

pub fn run(action: TimerAction, json: bool) -> CliResult {
    let mut controller = open_controller()?;

    match action {
        TimerAction::Run {
            mode,
            cycles,
            paused,
        } => {
            if let Some(mode) = mode {
                controller.switch_mode(mode)?;
            }
            controller.subscribe(Box::new(LoggingObserver));
            let bell = controller
                .config()
                .notifications
                .enabled
                .then(|| Bell::new(std::io::stderr()));
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_live(controller, bell, cycles.max(1), !paused, json))?;
        }
        TimerAction::Status => {
            let state = controller.snapshot();
            let active = controller.tasks().active_task();
            if json {
                print_json(&json!({
                    "state": state,
                    "active_task": active,
                }))?;
            } else {
                println!("Mode:      {}", state.mode);
                println!("Remaining: {}", state.clock());
                println!(
                    "Focus:     {} min / Break: {} min",
                    state.config.focus_duration_secs / 60,
                    state.config.break_duration_secs / 60
                );
                println!("Sessions:  {}", state.completed_sessions);
                match active {
                    Some(task) => println!("Focusing:  {}", task.text),
                    None => println!("Focusing:  (no active task)"),
                }
            }
        }
        TimerAction::Configure { focus, break_min } => {
            let event = controller.configure(focus, break_min)?;
            if json {
                print_json(&event)?;
            } else {
                println!("focus {focus} min, break {break_min} min");
            }
        }
    }
    Ok(())
}

/// Terminal bell rung whenever a countdown finishes, focus or break.
struct Bell<W: Write> {
    out: W,
}

impl<W: Write> Bell<W> {
    fn new(out: W) -> Self {
        Self { out }
    }

    /// Ring once per completion in `events`; returns how many rang.
    fn ring_for(&mut self, events: &[Event]) -> std::io::Result<usize> {
        let completions = events
            .iter()
            .filter(|e| matches!(e, Event::TimerCompleted { .. }))
            .count();
        for _ in 0..completions {
            self.out.write_all(b"\x07")?;
        }
        if completions > 0 {
            self.out.flush()?;
        }
        Ok(completions)
    }
}

enum Command {
    Toggle,
    Start,
    Pause,
    Reset,
    Switch(TimerMode),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(Command::Toggle),
        "s" | "start" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "reset" => Some(Command::Reset),
        "f" | "focus" => Some(Command::Switch(TimerMode::Focus)),
        "b" | "break" => Some(Command::Switch(TimerMode::Break)),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

async fn run_live<W: Write>(
    mut controller: Controller,
    mut bell: Option<Bell<W>>,
    cycles: u32,
    autostart: bool,
    json: bool,
) -> CliResult {
    let mut renderer = Renderer { json };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut finished = 0u32;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    interval.tick().await;

    if autostart {
        let started = controller.start();
        renderer.events(&controller, started.as_slice())?;
    } else {
        renderer.status(&controller)?;
    }

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = controller.tick();
                renderer.events(&controller, &events)?;
                if let Some(bell) = bell.as_mut() {
                    bell.ring_for(&events)?;
                }
                for event in &events {
                    match event {
                        Event::TimerCompleted { .. } => finished += 1,
                        Event::ModeSwitched { .. } if finished < cycles => {
                            let started = controller.start();
                            renderer.events(&controller, started.as_slice())?;
                        }
                        _ => {}
                    }
                }
                if finished >= cycles {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        let Some(command) = parse_command(&line) else {
                            renderer.notice("commands: enter start/pause, s start, p pause, r reset, f focus, b break, q quit")?;
                            continue;
                        };
                        let outcome = match command {
                            Command::Toggle if controller.timer().is_running() => {
                                Ok(controller.pause())
                            }
                            Command::Toggle | Command::Start => Ok(controller.start()),
                            Command::Pause => Ok(controller.pause()),
                            Command::Reset => Ok(Some(controller.reset())),
                            Command::Switch(mode) => controller.switch_mode(mode).map(Some),
                            Command::Quit => break,
                        };
                        match outcome {
                            Ok(event) => renderer.events(&controller, event.as_slice())?,
                            Err(e) => renderer.notice(&e.to_string())?,
                        }
                    }
                    Ok(None) => {
                        debug!("stdin closed, running without commands");
                        stdin_open = false;
                    }
                    Err(e) => {
                        debug!(error = %e, "stdin unreadable");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let paused = controller.pause();
                renderer.events(&controller, paused.as_slice())?;
                break;
            }
        }
    }

    renderer.finish()?;
    Ok(())
}

struct Renderer {
    json: bool,
}

impl Renderer {
    fn events(&mut self, controller: &Controller, events: &[Event]) -> CliResult {
        for event in events {
            if self.json {
                println!("{}", serde_json::to_string(event)?);
                continue;
            }
            match event {
                Event::TimerTick { .. } => self.status(controller)?,
                Event::TimerStarted { mode, .. } => {
                    self.line(&format!("{mode} started"))?;
                    self.status(controller)?;
                }
                Event::TimerPaused { .. } => self.line("paused")?,
                Event::TimerReset { .. } => {
                    self.line("reset")?;
                    self.status(controller)?;
                }
                Event::TimerCompleted { mode, .. } => self.line(match mode {
                    TimerMode::Focus => "Focus session completed! Time for a break.",
                    TimerMode::Break => "Break time over! Ready to focus again?",
                })?,
                Event::SessionCompleted { session_id, .. } => {
                    let credited = controller
                        .tasks()
                        .tasks()
                        .iter()
                        .find(|t| t.sessions.contains(session_id));
                    match credited {
                        Some(task) => self.line(&format!("session credited to: {}", task.text))?,
                        None => self.line("session recorded (no open task)")?,
                    }
                }
                Event::ModeSwitched { mode, .. } => {
                    self.line(&format!("switched to {mode}"))?;
                    self.status(controller)?;
                }
                Event::ConfigChanged { .. } => {}
            }
        }
        Ok(())
    }

    fn status(&mut self, controller: &Controller) -> CliResult {
        if self.json {
            return Ok(());
        }
        let state = controller.snapshot();
        let mut stdout = std::io::stdout();
        write!(
            stdout,
            "\r{} - {}{}",
            state.clock(),
            state.mode,
            if state.running { "" } else { " (paused)" }
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn line(&mut self, text: &str) -> CliResult {
        println!("\r{text}");
        Ok(())
    }

    fn notice(&mut self, text: &str) -> CliResult {
        if self.json {
            println!("{}", json!({ "type": "Notice", "message": text }));
            return Ok(());
        }
        self.line(text)
    }

    fn finish(&mut self) -> CliResult {
        if !self.json {
            println!();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letter_commands() {
        assert!(matches!(parse_command("s"), Some(Command::Start)));
        assert!(matches!(parse_command(" P "), Some(Command::Pause)));
        assert!(matches!(parse_command("reset"), Some(Command::Reset)));
        assert!(matches!(parse_command("b"), Some(Command::Switch(TimerMode::Break))));
        assert!(matches!(parse_command("q"), Some(Command::Quit)));
        assert!(parse_command("x").is_none());
    }

    #[test]
    fn empty_line_toggles() {
        assert!(matches!(parse_command(""), Some(Command::Toggle)));
        assert!(matches!(parse_command("  "), Some(Command::Toggle)));
    }

    #[test]
    fn bell_rings_for_break_and_focus_completion() {
        let at = chrono::Utc::now();
        let mut bell = Bell::new(Vec::new());
        let rang = bell
            .ring_for(&[
                Event::TimerCompleted { mode: TimerMode::Break, at },
                Event::ModeSwitched { mode: TimerMode::Focus, total_secs: 60, at },
            ])
            .unwrap();
        assert_eq!(rang, 1);
        assert_eq!(bell.out, b"\x07");

        let rang = bell
            .ring_for(&[Event::TimerCompleted { mode: TimerMode::Focus, at }])
            .unwrap();
        assert_eq!(rang, 1);
        assert_eq!(bell.out, b"\x07\x07");
    }

    #[test]
    fn bell_stays_quiet_on_ticks() {
        let mut bell = Bell::new(Vec::new());
        let rang = bell
            .ring_for(&[Event::TimerTick {
                mode: TimerMode::Break,
                remaining_secs: 3,
                total_secs: 60,
            }])
            .unwrap();
        assert_eq!(rang, 0);
        assert!(bell.out.is_empty());
    }
}
