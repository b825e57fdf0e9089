//! Formatting macros over [`Client`](crate::Client).
//!
//! Each macro formats its arguments like `format!` and enqueues the result
//! as a single line, returning the client's `Result<()>`.
//!
//! # Examples
//!
//! ```
//! use log_dispatch::prelude::*;
//! use log_dispatch::info;
//!
//! let dispatcher = Dispatcher::new();
//! let client = Client::with_queue(Some("api"), dispatcher.queue());
//!
//! let port = 8080;
//! info!(client, "listening on port {}", port).unwrap();
//! assert_eq!(dispatcher.queue().pop().unwrap().text, "[api] listening on port 8080");
//! ```

/// Enqueue a formatted message at an explicit level.
///
/// The level accepts anything [`IntoSeverity`](crate::IntoSeverity) does,
/// so both `Severity::Error` and `"ERROR"` work.
///
/// ```
/// # use log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new();
/// # let client = Client::with_queue(None::<&str>, dispatcher.queue());
/// use log_dispatch::log;
/// log!(client, Severity::Error, "code {}", 500).unwrap();
/// assert!(log!(client, "error", "lowercase is rejected").is_err());
/// ```
#[macro_export]
macro_rules! log {
    ($client:expr, $level:expr, $($arg:tt)+) => {
        $client.message(format!($($arg)+), $level)
    };
}

#[macro_export]
macro_rules! emergency {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Emergency, $($arg)+)
    };
}

#[macro_export]
macro_rules! alert {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Alert, $($arg)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Critical, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Notice, $($arg)+)
    };
}

/// Enqueue a formatted message at INFO.
///
/// ```
/// # use log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new();
/// # let client = Client::with_queue(Some("app"), dispatcher.queue());
/// use log_dispatch::info;
/// info!(client, "processing {} items", 100).unwrap();
/// ```
#[macro_export]
macro_rules! info {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($client:expr, $($arg:tt)+) => {
        $crate::log!($client, $crate::Severity::Debug, $($arg)+)
    };
}
