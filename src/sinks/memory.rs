//! In-memory capture sink

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects every line it receives.
///
/// Clones share the same buffer, so a clone kept by the caller observes
/// what the dispatcher sent to the registered copy.
///
/// # Example
///
/// ```
/// use log_dispatch::prelude::*;
///
/// let captured = MemorySink::new();
/// let mut sink = captured.clone();
/// sink.send("hello").unwrap();
/// assert_eq!(captured.lines(), vec!["hello"]);
/// ```
#[derive(Debug, Clone)]
pub struct MemorySink {
    name: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Memory sink reporting `name` from [`Sink::name`]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn send(&mut self, text: &str) -> Result<()> {
        self.lines.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
