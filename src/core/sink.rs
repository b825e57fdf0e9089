//! Sink trait for log output destinations

use super::error::Result;

/// A destination accepting one line of text per call.
///
/// Errors returned from `send` are propagated by the dispatcher unchanged;
/// a sink that wants to tolerate its own I/O failures must do so itself.
pub trait Sink: Send + Sync {
    fn send(&mut self, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
