//! # Log Dispatch
//!
//! A severity-routed logging pipeline: producers enqueue text through a
//! [`Client`], a background [`Worker`] periodically drains the queue, and a
//! [`Dispatcher`] fans each item out to the sinks registered for its level.
//!
//! ## Features
//!
//! - **Eight syslog severities** with strict, case-sensitive parsing
//! - **Routing table** with replace-in-place registration per sink type
//! - **Deterministic shutdown**: everything enqueued before stop is delivered
//! - **Sinks**: console, file, rotating file with gzip, syslog, in-memory
//!
//! ## Example
//!
//! ```
//! use log_dispatch::prelude::*;
//! use std::sync::Arc;
//!
//! let captured = MemorySink::new();
//! let dispatcher = Arc::new(Dispatcher::new());
//! dispatcher.add_sink("INFO", captured.clone()).unwrap();
//!
//! let client = Arc::new(Client::new(Some("db")));
//! let mut worker = Worker::builder()
//!     .dispatcher(Arc::clone(&dispatcher))
//!     .client(Arc::clone(&client))
//!     .build();
//!
//! worker.start().unwrap();
//! client.info("ready").unwrap();
//! worker.stop();
//! worker.join().unwrap();
//!
//! assert_eq!(captured.lines(), vec!["[db] ready"]);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Client, DispatchMetrics, Dispatcher, DispatcherBuilder, IntoSeverity, LineFormat, Lines,
        LogQueue, LoggerError, LoggingConfig, Message, QueueItem, Result, RoutingMode, Severity,
        Sink, SinkConfig, Worker, WorkerBuilder, WorkerEvent, WorkerState, DEFAULT_POLL_INTERVAL,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{
        FileSink, MemorySink, RotatingFileSink, RotationPolicy, StderrSink, StdoutSink,
    };

    #[cfg(unix)]
    pub use crate::sinks::{Facility, SyslogSink};
}

pub use crate::core::{
    Client, DispatchMetrics, Dispatcher, DispatcherBuilder, IntoSeverity, LineFormat, Lines,
    LogQueue, LoggerError, LoggingConfig, Message, QueueItem, Result, RoutingMode, Severity, Sink,
    SinkConfig, Worker, WorkerBuilder, WorkerEvent, WorkerState, DEFAULT_POLL_INTERVAL,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::sinks::{FileSink, MemorySink, RotatingFileSink, StderrSink, StdoutSink};
