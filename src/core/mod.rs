//! Core pipeline types and traits

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod lifecycle;
pub mod message;
pub mod metrics;
pub mod queue;
pub mod severity;
pub mod sink;
pub mod worker;

pub use client::Client;
pub use config::{LoggingConfig, SinkConfig};
pub use dispatcher::{Dispatcher, DispatcherBuilder, RoutingMode};
pub use error::{LoggerError, Result};
pub use formatter::LineFormat;
pub use lifecycle::{WorkerEvent, WorkerState};
pub use message::{Lines, Message};
pub use metrics::DispatchMetrics;
pub use queue::{LogQueue, QueueItem};
pub use severity::{IntoSeverity, Severity};
pub use sink::Sink;
pub use worker::{Worker, WorkerBuilder, DEFAULT_POLL_INTERVAL, DEFAULT_SHUTDOWN_TIMEOUT};
