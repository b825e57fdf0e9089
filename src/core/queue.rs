//! Thread-safe FIFO carrying level-tagged text from producers to the dispatcher

use super::error::{LoggerError, Result};
use super::severity::{IntoSeverity, Severity};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// The unit carried by the queue: one severity and one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub severity: Severity,
    pub text: String,
}

impl QueueItem {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn into_parts(self) -> (Severity, String) {
        (self.severity, self.text)
    }
}

/// Multi-producer FIFO backed by an unbounded crossbeam channel.
///
/// Both channel ends live in the queue, so `push` can never observe a
/// disconnected receiver and `pop` never blocks. Items pushed by a single
/// producer are popped in push order.
#[derive(Debug)]
pub struct LogQueue {
    sender: Sender<QueueItem>,
    receiver: Receiver<QueueItem>,
}

impl LogQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Append an item at the tail.
    ///
    /// The level is validated before anything is enqueued, so a rejected
    /// push leaves the queue untouched.
    pub fn push(&self, level: impl IntoSeverity, text: impl Into<String>) -> Result<()> {
        let severity = level.into_severity()?;
        self.push_item(QueueItem::new(severity, text))
    }

    pub fn push_item(&self, item: QueueItem) -> Result<()> {
        self.sender
            .send(item)
            .map_err(|_| LoggerError::ChannelSendError)
    }

    /// Remove and return the head item, or `None` when empty.
    pub fn pop(&self) -> Option<QueueItem> {
        match self.receiver.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for LogQueue {
    fn default() -> Self {
        Self::new()
    }
}
