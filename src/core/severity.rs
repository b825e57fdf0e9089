//! Severity level definitions

use super::error::{LoggerError, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the eight named log levels.
///
/// The canonical key of every level is its uppercase name. Parsing is exact
/// and case-sensitive: `"INFO"` is a severity, `"info"` is not.
///
/// Ordering follows severity: `Debug` is the lowest and `Emergency` the
/// highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Alert,
    Critical,
    Debug,
    Emergency,
    Error,
    Info,
    Notice,
    Warning,
}

impl Severity {
    /// All severities in canonical key order
    pub const ALL: [Severity; 8] = [
        Severity::Alert,
        Severity::Critical,
        Severity::Debug,
        Severity::Emergency,
        Severity::Error,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Debug => "DEBUG",
            Severity::Emergency => "EMERGENCY",
            Severity::Error => "ERROR",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
        }
    }

    /// Canonical level keys, same order as [`Severity::ALL`]
    pub fn keys() -> [&'static str; 8] {
        Self::ALL.map(|s| s.to_str())
    }

    /// Syslog severity code (RFC 5424 table 2), 0 is the most severe
    pub fn syslog_code(&self) -> u8 {
        match self {
            Severity::Emergency => 0,
            Severity::Alert => 1,
            Severity::Critical => 2,
            Severity::Error => 3,
            Severity::Warning => 4,
            Severity::Notice => 5,
            Severity::Info => 6,
            Severity::Debug => 7,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ALERT" => Ok(Severity::Alert),
            "CRITICAL" => Ok(Severity::Critical),
            "DEBUG" => Ok(Severity::Debug),
            "EMERGENCY" => Ok(Severity::Emergency),
            "ERROR" => Ok(Severity::Error),
            "INFO" => Ok(Severity::Info),
            "NOTICE" => Ok(Severity::Notice),
            "WARNING" => Ok(Severity::Warning),
            _ => Err(LoggerError::invalid_severity(s)),
        }
    }
}

impl TryFrom<&str> for Severity {
    type Error = LoggerError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

/// Conversion used at every boundary that accepts a level.
///
/// Typed [`Severity`] values always convert; string tokens are validated and
/// rejected with [`LoggerError::InvalidSeverity`].
pub trait IntoSeverity {
    fn into_severity(self) -> Result<Severity>;
}

impl IntoSeverity for Severity {
    fn into_severity(self) -> Result<Severity> {
        Ok(self)
    }
}

impl IntoSeverity for &Severity {
    fn into_severity(self) -> Result<Severity> {
        Ok(*self)
    }
}

impl IntoSeverity for &str {
    fn into_severity(self) -> Result<Severity> {
        self.parse()
    }
}

impl IntoSeverity for String {
    fn into_severity(self) -> Result<Severity> {
        self.parse()
    }
}

impl IntoSeverity for &String {
    fn into_severity(self) -> Result<Severity> {
        self.parse()
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

struct SeverityVisitor;

impl Visitor<'_> for SeverityVisitor {
    type Value = Severity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one of ALERT, CRITICAL, DEBUG, EMERGENCY, ERROR, INFO, NOTICE, WARNING")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Severity, E> {
        v.parse().map_err(|e: LoggerError| E::custom(e))
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(SeverityVisitor)
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.syslog_code().cmp(&self.syslog_code())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_severity() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Notice);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Alert < Severity::Emergency);

        let mut levels = Severity::ALL.to_vec();
        levels.sort();
        assert_eq!(levels.first(), Some(&Severity::Debug));
        assert_eq!(levels.last(), Some(&Severity::Emergency));
    }

    #[test]
    fn test_parse_every_key() {
        for key in Severity::keys() {
            let level: Severity = key.parse().unwrap();
            assert_eq!(level.to_str(), key);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(matches!(
            "info".parse::<Severity>(),
            Err(LoggerError::InvalidSeverity { .. })
        ));
        assert!("Warning".parse::<Severity>().is_err());
        assert!("WARN".parse::<Severity>().is_err());
        assert!(" INFO".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn test_syslog_codes_are_bijective() {
        let mut codes: Vec<u8> = Severity::ALL.iter().map(Severity::syslog_code).collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(Severity::Emergency.syslog_code(), 0);
        assert_eq!(Severity::Debug.syslog_code(), 7);
    }

    #[test]
    fn test_into_severity() {
        assert_eq!("ERROR".into_severity().unwrap(), Severity::Error);
        assert_eq!(String::from("NOTICE").into_severity().unwrap(), Severity::Notice);
        assert_eq!(Severity::Alert.into_severity().unwrap(), Severity::Alert);
        assert!("FATAL".into_severity().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_keys() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");

        let level: Severity = serde_json::from_str("\"EMERGENCY\"").unwrap();
        assert_eq!(level, Severity::Emergency);

        assert!(serde_json::from_str::<Severity>("\"emergency\"").is_err());
    }
}
