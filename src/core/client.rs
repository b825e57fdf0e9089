//! Producer façade used by application code

use super::{
    error::{LoggerError, Result},
    message::{Lines, Message},
    queue::LogQueue,
    severity::{IntoSeverity, Severity},
};
use parking_lot::RwLock;
use std::sync::Arc;

/// A named, lightweight handle that formats and enqueues leveled messages.
///
/// A client never owns its queue; many clients may share one. The queue can
/// be attached at construction or later with [`Client::bind`].
///
/// # Example
///
/// ```
/// use log_dispatch::prelude::*;
///
/// let dispatcher = Dispatcher::new();
/// let client = Client::with_queue(Some("db"), dispatcher.queue());
///
/// client.info("ready").unwrap();
/// let item = dispatcher.queue().pop().unwrap();
/// assert_eq!(item.text, "[db] ready");
/// ```
#[derive(Debug, Default)]
pub struct Client {
    name: Option<String>,
    queue: RwLock<Option<Arc<LogQueue>>>,
}

impl Client {
    /// Unbound client; every message call fails with `NotBound` until a
    /// queue is attached.
    pub fn new(name: Option<impl Into<String>>) -> Self {
        Self {
            name: name.map(Into::into),
            queue: RwLock::new(None),
        }
    }

    pub fn with_queue(name: Option<impl Into<String>>, queue: Arc<LogQueue>) -> Self {
        Self {
            name: name.map(Into::into),
            queue: RwLock::new(Some(queue)),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attach (or replace) the queue this client writes to
    pub fn bind(&self, queue: Arc<LogQueue>) {
        *self.queue.write() = Some(queue);
    }

    pub fn is_bound(&self) -> bool {
        self.queue.read().is_some()
    }

    fn bound_queue(&self) -> Result<Arc<LogQueue>> {
        self.queue
            .read()
            .clone()
            .ok_or_else(|| LoggerError::not_bound(self.name.as_deref().unwrap_or("<unnamed>")))
    }

    fn decorate(&self, text: &str) -> String {
        match &self.name {
            Some(name) => format!("[{}] {}", name, text),
            None => text.to_string(),
        }
    }

    /// Enqueue one line at `level`, prefixed with `[name] ` when named.
    pub fn message(&self, text: impl AsRef<str>, level: impl IntoSeverity) -> Result<()> {
        let level = level.into_severity()?;
        let queue = self.bound_queue()?;
        queue.push(level, self.decorate(text.as_ref()))
    }

    /// Enqueue every element of `lines` at `level`, in order
    pub fn log(&self, level: impl IntoSeverity, lines: impl Into<Lines>) -> Result<()> {
        let level = level.into_severity()?;
        let queue = self.bound_queue()?;
        for line in lines.into() {
            queue.push(level, self.decorate(&line))?;
        }
        Ok(())
    }

    /// Enqueue every line of an existing message
    pub fn send_message(&self, message: &Message) -> Result<()> {
        self.log(message.severity(), message.lines())
    }

    #[inline]
    pub fn alert(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Alert, lines)
    }

    #[inline]
    pub fn critical(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Critical, lines)
    }

    #[inline]
    pub fn debug(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Debug, lines)
    }

    #[inline]
    pub fn emergency(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Emergency, lines)
    }

    #[inline]
    pub fn error(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Error, lines)
    }

    #[inline]
    pub fn info(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Info, lines)
    }

    #[inline]
    pub fn notice(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Notice, lines)
    }

    #[inline]
    pub fn warning(&self, lines: impl Into<Lines>) -> Result<()> {
        self.log(Severity::Warning, lines)
    }
}
