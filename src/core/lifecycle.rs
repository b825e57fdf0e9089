//! Worker lifecycle state machine
//!
//! Pure transition logic, independent of threads, so it can be exercised
//! directly. [`Worker`](super::Worker) drives it from `start`, `stop` and
//! the end of its loop.

use super::error::{LoggerError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// Constructed, not started
    #[default]
    Idle,
    /// Loop active
    Running,
    /// Stop flag set, loop finishing its current cycle and final flush
    StopRequested,
    /// Terminal
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerEvent {
    Start,
    Stop,
    /// The loop returned after its final flush
    LoopExited,
}

impl WorkerState {
    /// Next state after `event`.
    ///
    /// Stopping is idempotent. A worker never leaves `Stopped`, and an idle
    /// worker that is stopped goes straight to `Stopped` without running.
    pub fn on(self, event: WorkerEvent) -> Result<WorkerState> {
        use WorkerEvent::*;
        use WorkerState::*;

        match (self, event) {
            (Idle, Start) => Ok(Running),
            (Idle, Stop) => Ok(Stopped),
            (Running, Stop) | (StopRequested, Stop) => Ok(StopRequested),
            (Running, LoopExited) | (StopRequested, LoopExited) => Ok(Stopped),
            (Stopped, Stop) => Ok(Stopped),
            (state, event) => Err(LoggerError::InvalidState { state, event }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Stopped)
    }

    /// True while the loop may still dispatch items
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerState::Running | WorkerState::StopRequested)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Running => "running",
            WorkerState::StopRequested => "stopping",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

impl fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerEvent::Start => "start",
            WorkerEvent::Stop => "stop",
            WorkerEvent::LoopExited => "loop exit",
        };
        f.write_str(s)
    }
}
