//! Declarative pipeline configuration loaded from JSON
//!
//! ```json
//! {
//!   "poll_interval_ms": 100,
//!   "routing_mode": "merge",
//!   "worker_name": "app-logger",
//!   "routes": {
//!     "ERROR": [{ "type": "file", "path": "/var/log/app/errors.log" }],
//!     "DEBUG": [{ "type": "rotating_file", "path": "/var/log/app/debug.log", "compress": true }]
//!   }
//! }
//! ```

use super::{
    dispatcher::{Dispatcher, RoutingMode},
    error::{LoggerError, Result},
    formatter::LineFormat,
    severity::Severity,
    worker::{Worker, WorkerBuilder},
};
use crate::sinks::{FileSink, RotatingFileSink, RotationPolicy, StderrSink, StdoutSink};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[cfg(unix)]
use crate::sinks::{Facility, SyslogSink};

const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
const DEFAULT_MAX_BYTES: u64 = 100_000;
const DEFAULT_MAX_BACKUPS: usize = 5;

fn default_max_bytes() -> Option<u64> {
    Some(DEFAULT_MAX_BYTES)
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

/// One destination in a route list, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Stdout {
        #[serde(default)]
        format: LineFormat,
        #[serde(default)]
        app_name: Option<String>,
    },
    Stderr {
        #[serde(default)]
        format: LineFormat,
        #[serde(default)]
        app_name: Option<String>,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        format: LineFormat,
        #[serde(default)]
        app_name: Option<String>,
    },
    RotatingFile {
        path: PathBuf,
        /// `null` disables size-based rotation
        #[serde(default = "default_max_bytes")]
        max_bytes: Option<u64>,
        #[serde(default)]
        max_age_secs: Option<u64>,
        #[serde(default = "default_max_backups")]
        max_backups: usize,
        #[serde(default)]
        compress: bool,
        #[serde(default)]
        format: LineFormat,
        #[serde(default)]
        app_name: Option<String>,
    },
    /// The route's level becomes the syslog severity of every frame.
    #[cfg(unix)]
    Syslog {
        ident: String,
        #[serde(default)]
        facility: Facility,
        #[serde(default)]
        socket_path: Option<PathBuf>,
    },
}

impl SinkConfig {
    /// Line format of the sink, when the sink kind takes one
    pub fn format(&self) -> Option<&LineFormat> {
        match self {
            SinkConfig::Stdout { format, .. }
            | SinkConfig::Stderr { format, .. }
            | SinkConfig::File { format, .. }
            | SinkConfig::RotatingFile { format, .. } => Some(format),
            #[cfg(unix)]
            SinkConfig::Syslog { .. } => None,
        }
    }

    /// Instantiate the sink and register it on `dispatcher` for `level`
    pub fn register(&self, dispatcher: &Dispatcher, level: Severity) -> Result<()> {
        match self {
            SinkConfig::Stdout { format, app_name } => {
                let mut sink = StdoutSink::new().with_format(format.clone());
                if let Some(name) = app_name {
                    sink = sink.with_app_name(name.clone());
                }
                dispatcher.add_sink(level, sink)
            }
            SinkConfig::Stderr { format, app_name } => {
                let mut sink = StderrSink::new().with_format(format.clone());
                if let Some(name) = app_name {
                    sink = sink.with_app_name(name.clone());
                }
                dispatcher.add_sink(level, sink)
            }
            SinkConfig::File {
                path,
                format,
                app_name,
            } => {
                let mut sink = FileSink::new(path)?.with_format(format.clone());
                if let Some(name) = app_name {
                    sink = sink.with_app_name(name.clone());
                }
                dispatcher.add_sink(level, sink)
            }
            SinkConfig::RotatingFile {
                path,
                max_bytes,
                max_age_secs,
                max_backups,
                compress,
                format,
                app_name,
            } => {
                let policy = RotationPolicy::new()
                    .with_max_bytes(*max_bytes)
                    .with_max_age(max_age_secs.map(Duration::from_secs))
                    .with_max_backups(*max_backups)
                    .with_compression(*compress);
                let mut sink =
                    RotatingFileSink::with_policy(path, policy)?.with_format(format.clone());
                if let Some(name) = app_name {
                    sink = sink.with_app_name(name.clone());
                }
                dispatcher.add_sink(level, sink)
            }
            #[cfg(unix)]
            SinkConfig::Syslog {
                ident,
                facility,
                socket_path,
            } => {
                let mut sink = SyslogSink::new(ident.clone(), *facility, level);
                if let Some(path) = socket_path {
                    sink = sink.with_socket_path(path.clone());
                }
                dispatcher.add_sink(level, sink)
            }
        }
    }
}

/// Complete pipeline setup: worker timing plus the custom routing table.
///
/// Registering two sinks of the same kind under one level keeps only the
/// last, the same as calling [`Dispatcher::add_sink`] twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub poll_interval_ms: u64,
    pub routing_mode: RoutingMode,
    pub debug: bool,
    pub worker_name: Option<String>,
    pub routes: BTreeMap<Severity, Vec<SinkConfig>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            routing_mode: RoutingMode::default(),
            debug: false,
            worker_name: None,
            routes: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logging config",
                format!("path '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(LoggerError::config(
                "LoggingConfig",
                "poll_interval_ms must be greater than zero",
            ));
        }
        if let Some(name) = &self.worker_name {
            if name.trim().is_empty() {
                return Err(LoggerError::config(
                    "LoggingConfig",
                    "worker_name must not be blank",
                ));
            }
        }
        for format in self.routes.values().flatten().filter_map(SinkConfig::format) {
            format.validate()?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Build a dispatcher with the default table plus every configured route
    pub fn build_dispatcher(&self) -> Result<Dispatcher> {
        self.validate()?;
        let dispatcher = Dispatcher::builder()
            .routing_mode(self.routing_mode)
            .build();
        for (level, sinks) in &self.routes {
            for sink in sinks {
                sink.register(&dispatcher, *level)?;
            }
        }
        Ok(dispatcher)
    }

    /// Worker builder pre-filled with this config's timing, name and debug flag
    pub fn worker_builder(&self, dispatcher: Arc<Dispatcher>) -> WorkerBuilder {
        let mut builder = Worker::builder()
            .dispatcher(dispatcher)
            .poll_interval(self.poll_interval())
            .debug(self.debug);
        if let Some(name) = &self.worker_name {
            builder = builder.name(name.clone());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.routing_mode, RoutingMode::Exclusive);
    }

    #[test]
    fn test_parse_routes() {
        let json = r#"{
            "poll_interval_ms": 50,
            "routing_mode": "merge",
            "debug": true,
            "worker_name": "app-logger",
            "routes": {
                "ERROR": [
                    { "type": "file", "path": "/tmp/errors.log", "format": "date_time" },
                    { "type": "stderr", "app_name": "svc" }
                ],
                "DEBUG": [
                    { "type": "rotating_file", "path": "/tmp/debug.log", "max_bytes": null, "compress": true }
                ]
            }
        }"#;
        let config = LoggingConfig::from_json_str(json).unwrap();

        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.routing_mode, RoutingMode::Merge);
        assert!(config.debug);
        assert_eq!(config.routes[&Severity::Error].len(), 2);
        assert_eq!(
            config.routes[&Severity::Debug][0],
            SinkConfig::RotatingFile {
                path: PathBuf::from("/tmp/debug.log"),
                max_bytes: None,
                max_age_secs: None,
                max_backups: 5,
                compress: true,
                format: LineFormat::Plain,
                app_name: None,
            }
        );
    }

    #[test]
    fn test_severity_keys_are_strict() {
        let json = r#"{ "routes": { "error": [{ "type": "stdout" }] } }"#;
        assert!(LoggingConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_unknown_sink_type() {
        let json = r#"{ "routes": { "INFO": [{ "type": "carrier_pigeon" }] } }"#;
        assert!(matches!(
            LoggingConfig::from_json_str(json),
            Err(LoggerError::JsonError(_))
        ));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = LoggingConfig::from_json_str(r#"{ "poll_interval_ms": 0 }"#);
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_invalid_custom_format_rejected() {
        let json = r#"{ "routes": { "INFO": [{ "type": "stdout", "format": { "custom": "%Q" } }] } }"#;
        assert!(matches!(
            LoggingConfig::from_json_str(json),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let json = r#"{ "routes": { "INFO": [{ "type": "stdout", "format": { "custom": "%H:%M" } }] } }"#;
        assert!(LoggingConfig::from_json_str(json).is_ok());
    }

    #[test]
    fn test_build_dispatcher_registers_routes() {
        let dir = tempdir().unwrap();
        let mut config = LoggingConfig::default();
        config.routes.insert(
            Severity::Error,
            vec![SinkConfig::File {
                path: dir.path().join("errors.log"),
                format: LineFormat::Plain,
                app_name: None,
            }],
        );

        let dispatcher = config.build_dispatcher().unwrap();
        assert!(dispatcher.has_custom_routes());
        assert_eq!(dispatcher.resolved_sink_names(Severity::Error), vec!["file"]);
        // exclusive: levels without a custom entry reach nothing
        assert!(dispatcher.resolved_sink_names(Severity::Info).is_empty());
    }

    #[test]
    fn test_build_dispatcher_merge_mode() {
        let dir = tempdir().unwrap();
        let mut config = LoggingConfig {
            routing_mode: RoutingMode::Merge,
            ..LoggingConfig::default()
        };
        config.routes.insert(
            Severity::Debug,
            vec![SinkConfig::File {
                path: dir.path().join("debug.log"),
                format: LineFormat::Plain,
                app_name: None,
            }],
        );

        let dispatcher = config.build_dispatcher().unwrap();
        assert_eq!(dispatcher.resolved_sink_names(Severity::Debug), vec!["file"]);
        assert_eq!(dispatcher.resolved_sink_names(Severity::Info), vec!["stdout"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logging.json");
        fs::write(&path, r#"{ "worker_name": "from-file" }"#).unwrap();

        let config = LoggingConfig::from_file(&path).unwrap();
        assert_eq!(config.worker_name.as_deref(), Some("from-file"));

        let worker = config
            .worker_builder(Arc::new(Dispatcher::new()))
            .build();
        assert_eq!(worker.name(), "from-file");
        assert_eq!(worker.poll_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = LoggingConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
    }
}
