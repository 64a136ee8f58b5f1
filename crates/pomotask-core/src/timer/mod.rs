mod engine;
mod mode;

pub use engine::TimerEngine;
pub use mode::{Session, TimerConfig, TimerMode, TimerState};
