//! Sink writing to the local syslog daemon over its unix datagram socket.
//!
//! Each sink is fixed to one facility and one severity, since the dispatcher
//! hands sinks bare text. Register one `SyslogSink` per level that should
//! reach syslog.

use crate::core::{LoggerError, Result, Severity, Sink};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_SYSLOG_SOCKET: &str = "/dev/log";

/// Syslog facilities accepted by [`SyslogSink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Facility {
    #[default]
    User,
    Mail,
    Daemon,
    Syslog,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    pub fn code(&self) -> u8 {
        match self {
            Facility::User => 1,
            Facility::Mail => 2,
            Facility::Daemon => 3,
            Facility::Syslog => 5,
            Facility::Local0 => 16,
            Facility::Local1 => 17,
            Facility::Local2 => 18,
            Facility::Local3 => 19,
            Facility::Local4 => 20,
            Facility::Local5 => 21,
            Facility::Local6 => 22,
            Facility::Local7 => 23,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Facility::User => "USER",
            Facility::Mail => "MAIL",
            Facility::Daemon => "DAEMON",
            Facility::Syslog => "SYSLOG",
            Facility::Local0 => "LOCAL0",
            Facility::Local1 => "LOCAL1",
            Facility::Local2 => "LOCAL2",
            Facility::Local3 => "LOCAL3",
            Facility::Local4 => "LOCAL4",
            Facility::Local5 => "LOCAL5",
            Facility::Local6 => "LOCAL6",
            Facility::Local7 => "LOCAL7",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Facility {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "USER" => Ok(Facility::User),
            "MAIL" => Ok(Facility::Mail),
            "DAEMON" => Ok(Facility::Daemon),
            "SYSLOG" => Ok(Facility::Syslog),
            "LOCAL0" => Ok(Facility::Local0),
            "LOCAL1" => Ok(Facility::Local1),
            "LOCAL2" => Ok(Facility::Local2),
            "LOCAL3" => Ok(Facility::Local3),
            "LOCAL4" => Ok(Facility::Local4),
            "LOCAL5" => Ok(Facility::Local5),
            "LOCAL6" => Ok(Facility::Local6),
            "LOCAL7" => Ok(Facility::Local7),
            _ => Err(LoggerError::config("Facility", format!("unknown facility '{}'", s))),
        }
    }
}

/// Sends `<PRI>Mmm dd HH:MM:SS ident[pid]: text` datagrams.
///
/// The socket is opened on first use and reopened once if a send fails.
pub struct SyslogSink {
    ident: String,
    facility: Facility,
    severity: Severity,
    socket_path: PathBuf,
    socket: Option<UnixDatagram>,
}

impl SyslogSink {
    pub fn new(ident: impl Into<String>, facility: Facility, severity: Severity) -> Self {
        Self {
            ident: ident.into(),
            facility,
            severity,
            socket_path: PathBuf::from(DEFAULT_SYSLOG_SOCKET),
            socket: None,
        }
    }

    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self.socket = None;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// `facility * 8 + severity`
    pub fn priority(&self) -> u16 {
        u16::from(self.facility.code()) * 8 + u16::from(self.severity.syslog_code())
    }

    fn frame_at(&self, at: &DateTime<Local>, text: &str) -> String {
        format!(
            "<{}>{} {}[{}]: {}",
            self.priority(),
            at.format("%b %e %H:%M:%S"),
            self.ident,
            std::process::id(),
            text
        )
    }

    fn connect(&self) -> io::Result<UnixDatagram> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(&self.socket_path)?;
        Ok(socket)
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => self.connect()?,
        };
        let socket = match socket.send(frame) {
            Ok(_) => socket,
            Err(_) => {
                let fresh = self.connect()?;
                fresh.send(frame)?;
                fresh
            }
        };
        self.socket = Some(socket);
        Ok(())
    }
}

impl Sink for SyslogSink {
    fn send(&mut self, text: &str) -> Result<()> {
        let frame = self.frame_at(&Local::now(), text);
        self.write_frame(frame.as_bytes()).map_err(|e| {
            LoggerError::io_operation(
                "sending to syslog",
                format!("socket '{}'", self.socket_path.display()),
                e,
            )
        })
    }

    fn name(&self) -> &str {
        "syslog"
    }
}
