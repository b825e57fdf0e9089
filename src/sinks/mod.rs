//! Sink implementations

pub mod console;
pub mod file;
pub mod memory;
pub mod rotating_file;

#[cfg(unix)]
pub mod syslog;

pub use console::{StderrSink, StdoutSink};
pub use file::FileSink;
pub use memory::MemorySink;
pub use rotating_file::{RotatingFileSink, RotationPolicy};

#[cfg(unix)]
pub use syslog::{Facility, SyslogSink};

pub use crate::core::Sink;
