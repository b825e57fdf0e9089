//! Line decoration applied by sinks before writing
//!
//! A sink only ever receives bare text. Formats add an optional time prefix
//! and an optional application name in front of it.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const FALLBACK_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// How a sink decorates each line.
///
/// # Examples
///
/// ```
/// use log_dispatch::LineFormat;
///
/// assert_eq!(LineFormat::Plain.format(None, "ready"), "ready");
/// assert_eq!(LineFormat::Plain.format(Some("app"), "ready"), "[app]: ready");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// The message alone
    #[default]
    Plain,

    /// `2025-01-08 10:30:45 message`
    DateTime,

    /// `10:30:45 message`
    Time,

    /// Unix seconds: `1736332245 message`
    Timestamp,

    /// Any strftime-compatible prefix
    Custom(String),
}

impl LineFormat {
    /// Custom strftime prefix, rejecting patterns chrono cannot render
    ///
    /// ```
    /// use log_dispatch::LineFormat;
    ///
    /// assert!(LineFormat::custom("%d/%b/%Y").is_ok());
    /// assert!(LineFormat::custom("%Q").is_err());
    /// ```
    pub fn custom(pattern: impl Into<String>) -> Result<Self> {
        let format = LineFormat::Custom(pattern.into());
        format.validate()?;
        Ok(format)
    }

    /// Check that a `Custom` pattern only holds valid strftime items
    pub fn validate(&self) -> Result<()> {
        if let LineFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "LineFormat",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }

    /// Decorate `message` using the current local time
    #[must_use]
    pub fn format(&self, name: Option<&str>, message: &str) -> String {
        self.format_at(&Local::now(), name, message)
    }

    /// Decorate `message` as if it were logged at `at`
    #[must_use]
    pub fn format_at(&self, at: &DateTime<Local>, name: Option<&str>, message: &str) -> String {
        let body = match name {
            Some(name) => format!("[{}]: {}", name, message),
            None => message.to_string(),
        };
        match self.prefix(at) {
            Some(prefix) => format!("{} {}", prefix, body),
            None => body,
        }
    }

    fn prefix(&self, at: &DateTime<Local>) -> Option<String> {
        match self {
            LineFormat::Plain => None,
            LineFormat::DateTime => Some(at.format("%Y-%m-%d %H:%M:%S").to_string()),
            LineFormat::Time => Some(at.format("%H:%M:%S").to_string()),
            LineFormat::Timestamp => Some(at.timestamp().to_string()),
            LineFormat::Custom(pattern) => {
                let mut prefix = String::new();
                if write!(prefix, "{}", at.format(pattern)).is_err() {
                    prefix.clear();
                    let _ = write!(prefix, "{}", at.format(FALLBACK_PATTERN));
                }
                Some(prefix)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn test_plain() {
        let at = fixed_datetime();
        assert_eq!(LineFormat::Plain.format_at(&at, None, "up"), "up");
        assert_eq!(LineFormat::Plain.format_at(&at, Some("db"), "up"), "[db]: up");
    }

    #[test]
    fn test_datetime_and_time() {
        let at = fixed_datetime();
        assert_eq!(
            LineFormat::DateTime.format_at(&at, None, "up"),
            "2025-01-08 10:30:45 up"
        );
        assert_eq!(
            LineFormat::Time.format_at(&at, Some("db"), "up"),
            "10:30:45 [db]: up"
        );
    }

    #[test]
    fn test_timestamp_is_numeric() {
        let at = fixed_datetime();
        let line = LineFormat::Timestamp.format_at(&at, None, "up");
        let (prefix, rest) = line.split_once(' ').unwrap();
        assert_eq!(prefix.parse::<i64>().unwrap(), at.timestamp());
        assert_eq!(rest, "up");
    }

    #[test]
    fn test_custom() {
        let at = fixed_datetime();
        let format = LineFormat::Custom("%d/%b/%Y".to_string());
        assert_eq!(format.format_at(&at, None, "up"), "08/Jan/2025 up");
    }

    #[test]
    fn test_invalid_custom_pattern() {
        assert!(matches!(
            LineFormat::custom("%Q"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(LineFormat::Custom("[%H:%M]".to_string()).validate().is_ok());
        assert!(LineFormat::Plain.validate().is_ok());
    }

    #[test]
    fn test_invalid_custom_pattern_does_not_panic() {
        let at = fixed_datetime();
        let format = LineFormat::Custom("%Q".to_string());
        assert_eq!(format.format_at(&at, None, "up"), "2025-01-08 10:30:45 up");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LineFormat::DateTime).unwrap();
        assert_eq!(json, "\"date_time\"");

        let format: LineFormat = serde_json::from_str(r#"{"custom":"%H"}"#).unwrap();
        assert_eq!(format, LineFormat::Custom("%H".to_string()));
    }
}
