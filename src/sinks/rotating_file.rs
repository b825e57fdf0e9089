//! File sink with size/age based rotation
//!
//! The active file keeps its configured name. On rotation it becomes
//! `<name>.1`, older backups shift up by one, and the backup past
//! `max_backups` is deleted. Backups can be gzip-compressed to
//! `<name>.N.gz`.

use crate::core::{LineFormat, LoggerError, Result, Sink};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// When to rotate and how many backups to keep
///
/// # Examples
///
/// ```
/// use log_dispatch::sinks::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_bytes(Some(1024 * 1024))
///     .with_max_age(Some(Duration::from_secs(24 * 3600)))
///     .with_max_backups(7)
///     .with_compression(true);
/// assert_eq!(policy.max_backups, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write once the file has reached this size
    pub max_bytes: Option<u64>,
    /// Rotate before a write once this much time has passed since the last rotation
    pub max_age: Option<Duration>,
    pub max_backups: usize,
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: Some(100_000),
            max_age: None,
            max_backups: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    format: LineFormat,
    app_name: Option<String>,
}

impl RotatingFileSink {
    /// Rotating sink with the default policy (100 000 bytes, 5 backups)
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path` with a custom policy, creating parent directories
    pub fn with_policy(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = open_active(&base_path)?;
        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            last_rotation,
            format: LineFormat::default(),
            app_name: None,
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Path of backup number `index` (1 is the most recent)
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let file_name = self
            .base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        self.base_path.with_file_name(format!("{}.{}", file_name, index))
    }

    fn compressed_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    }

    fn should_rotate(&self) -> bool {
        let size_exceeded = self
            .policy
            .max_bytes
            .is_some_and(|max| self.current_size > 0 && self.current_size >= max);
        let age_exceeded = self.policy.max_age.is_some_and(|max| {
            SystemTime::now()
                .duration_since(self.last_rotation)
                .unwrap_or(Duration::ZERO)
                >= max
        });
        size_exceeded || age_exceeded
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.policy.max_backups == 0 {
            remove_if_exists(&self.base_path)?;
        } else {
            let oldest = self.backup_path(self.policy.max_backups);
            remove_if_exists(&oldest)?;
            remove_if_exists(&Self::compressed_path(&oldest))?;

            for index in (1..self.policy.max_backups).rev() {
                let from = self.backup_path(index);
                let to = self.backup_path(index + 1);
                rename_if_exists(&from, &to)?;
                rename_if_exists(&Self::compressed_path(&from), &Self::compressed_path(&to))?;
            }

            let newest = self.backup_path(1);
            rename_if_exists(&self.base_path, &newest)?;
            if self.policy.compress && newest.exists() {
                compress_file(&newest)?;
            }
        }

        let (file, size, _) = open_active(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        self.last_rotation = SystemTime::now();
        Ok(())
    }

    /// Reopen the active file after a failed rotation left no writer
    fn recover(&mut self) -> Result<()> {
        if self.writer.is_none() {
            let (file, size, _) = open_active(&self.base_path)?;
            self.writer = Some(BufWriter::new(file));
            self.current_size = size;
        }
        self.last_rotation = SystemTime::now();
        Ok(())
    }
}

fn open_active(path: &Path) -> Result<(File, u64, SystemTime)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
        })?;
    let metadata = file.metadata().map_err(|e| {
        LoggerError::file_sink(
            path.display().to_string(),
            format!("Cannot access file metadata: {}", e),
        )
    })?;
    let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    Ok((file, metadata.len(), modified))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LoggerError::file_rotation(
            path.display().to_string(),
            format!("Failed to remove old backup: {}", e),
        )),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to rename to '{}': {}", to.display(), e),
        )),
    }
}

/// Gzip `path` into `path.gz`, removing the original only once the
/// compressed file is complete.
fn compress_file(path: &Path) -> Result<()> {
    let gz_path = RotatingFileSink::compressed_path(path);
    let mut tmp_name = gz_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| -> io::Result<()> {
        let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
        let output = BufWriter::with_capacity(64 * 1024, File::create(&tmp_path)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&tmp_path, &gz_path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but could not remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl Sink for RotatingFileSink {
    fn send(&mut self, text: &str) -> Result<()> {
        if self.should_rotate() {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                self.recover()?;
            }
        }

        let mut line = self.format.format(self.app_name.as_deref(), text);
        line.push('\n');

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_sink(
                self.base_path.display().to_string(),
                format!("Failed to write log line: {}", e),
            )
        })?;
        self.current_size += line.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
