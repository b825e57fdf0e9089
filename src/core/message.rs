//! Level-tagged batches of text lines

use super::error::Result;
use super::severity::{IntoSeverity, Severity};

/// An ordered sequence of text lines.
///
/// Accepts a single text value, an optional value, or a sequence of anything
/// with a textual representation. `None` and empty sequences become an empty
/// batch rather than an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines(Vec<String>);

impl Lines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single line from any displayable value
    pub fn from_display(value: impl ToString) -> Self {
        Lines(vec![value.to_string()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Lines {
    fn from(value: &str) -> Self {
        Lines(vec![value.to_string()])
    }
}

impl From<String> for Lines {
    fn from(value: String) -> Self {
        Lines(vec![value])
    }
}

impl From<&String> for Lines {
    fn from(value: &String) -> Self {
        Lines(vec![value.clone()])
    }
}

impl<T: ToString> From<Vec<T>> for Lines {
    fn from(values: Vec<T>) -> Self {
        Lines(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for Lines {
    fn from(values: &[T]) -> Self {
        Lines(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for Lines {
    fn from(values: [T; N]) -> Self {
        Lines(values.iter().map(ToString::to_string).collect())
    }
}

impl<L: Into<Lines>> From<Option<L>> for Lines {
    fn from(value: Option<L>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl IntoIterator for Lines {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Lines {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Immutable batch: one severity and its lines, in original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    severity: Severity,
    lines: Vec<String>,
}

impl Message {
    /// Build a message, validating the level at construction.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidSeverity`](super::LoggerError::InvalidSeverity)
    /// when `level` is not one of the eight known keys.
    pub fn new(level: impl IntoSeverity, lines: impl Into<Lines>) -> Result<Self> {
        Ok(Self {
            severity: level.into_severity()?,
            lines: lines.into().into_vec(),
        })
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
