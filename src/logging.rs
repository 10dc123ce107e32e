//! Session log
//!
//! Every log record goes to stderr through `env_logger` and is also kept in
//! memory. The buffered entries are written to a file when the [`LogGuard`]
//! returned by [`init`] is dropped, unless logging to disk was disabled.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{Level, Log, Metadata, Record};

/// Default session log file
pub const DEFAULT_LOG_PATH: &str = "fitch.log";

static LOGGER: OnceLock<SessionLogger> = OnceLock::new();

/// One buffered log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Wall-clock time of the record
    pub timestamp: SystemTime,
    /// Time since the logger was created
    pub elapsed: Duration,
    /// Severity
    pub level: Level,
    /// Module or target that logged
    pub target: String,
    /// Formatted message
    pub message: String,
}

/// Format `time` as a UTC `YYYY-MM-DD HH:MM:SS.mmm` stamp
fn format_utc(time: SystemTime) -> String {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let of_day = secs % 86_400;

    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}.{:03}",
        of_day / 3600,
        of_day / 60 % 60,
        of_day % 60,
        since_epoch.subsec_millis()
    )
}

/// Proleptic Gregorian date of a day count since 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [+{:.3}s] {:<5} {}: {}",
            format_utc(self.timestamp),
            self.elapsed.as_secs_f64(),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Logger that echoes to stderr and buffers every record
pub struct SessionLogger {
    inner: env_logger::Logger,
    started: Instant,
    entries: Mutex<Vec<LogEntry>>,
}

impl SessionLogger {
    /// Wrap an `env_logger` logger; its filter decides what is kept
    pub fn new(inner: env_logger::Logger) -> Self {
        Self {
            inner,
            started: Instant::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Maximum level the wrapped filter lets through
    pub fn filter(&self) -> log::LevelFilter {
        self.inner.filter()
    }

    /// Snapshot of the buffered entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Write every buffered entry to `path`, one per line
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<usize> {
        let entries = self.entries();
        let mut out = BufWriter::new(File::create(path)?);
        for entry in &entries {
            writeln!(out, "{entry}")?;
        }
        out.flush()?;
        Ok(entries.len())
    }
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.inner.matches(record) {
            return;
        }
        self.inner.log(record);

        let entry = LogEntry {
            timestamp: SystemTime::now(),
            elapsed: self.started.elapsed(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Scoped ownership of the session log.
///
/// Dropping the guard writes the buffered log to its path, if it has one.
pub struct LogGuard {
    logger: &'static SessionLogger,
    path: Option<PathBuf>,
}

impl LogGuard {
    /// Change where the log is written; ignored when writing is disabled
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        if self.path.is_some() {
            self.path = Some(path.into());
        }
    }

    /// Destination file, or `None` if the log stays in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The process-wide logger
    pub fn logger(&self) -> &'static SessionLogger {
        self.logger
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.logger.flush();
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.logger.write_to(path) {
            eprintln!("Failed to write log to {}: {e}", path.display());
        }
    }
}

/// Install the session logger for this process.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. The log is written to
/// `path` on drop of the guard when `write_log` is set.
pub fn init(write_log: bool, path: impl Into<PathBuf>) -> LogGuard {
    let logger = LOGGER.get_or_init(|| {
        SessionLogger::new(
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .build(),
        )
    });

    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.filter());
    }

    LogGuard {
        logger,
        path: write_log.then(|| path.into()),
    }
}

/// Log the platform and build this session runs on
pub fn log_system_info() {
    log::info!("System information:");
    log::info!("  os: {}", std::env::consts::OS);
    log::info!("  family: {}", std::env::consts::FAMILY);
    log::info!("  arch: {}", std::env::consts::ARCH);
    log::info!("  version: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_logger(level: log::LevelFilter) -> SessionLogger {
        SessionLogger::new(
            env_logger::Builder::new()
                .filter_level(level)
                .is_test(true)
                .build(),
        )
    }

    #[test]
    fn test_buffers_enabled_records() {
        let logger = test_logger(log::LevelFilter::Info);

        logger.log(
            &Record::builder()
                .args(format_args!("texture missing"))
                .level(Level::Warn)
                .target("fitch::renderer")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("noise"))
                .level(Level::Trace)
                .target("fitch::renderer")
                .build(),
        );

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Warn);
        assert_eq!(entries[0].target, "fitch::renderer");
        assert_eq!(entries[0].message, "texture missing");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitch.log");
        let logger = test_logger(log::LevelFilter::Debug);

        for message in ["one", "two"] {
            logger.log(
                &Record::builder()
                    .args(format_args!("{message}"))
                    .level(Level::Info)
                    .target("fitch")
                    .build(),
            );
        }

        assert_eq!(logger.write_to(&path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("fitch: one"));
        assert!(lines[1].ends_with("fitch: two"));
    }

    #[test]
    fn test_timestamp_is_wall_clock() {
        assert_eq!(format_utc(UNIX_EPOCH), "1970-01-01 00:00:00.000");
        assert_eq!(
            format_utc(UNIX_EPOCH + Duration::from_millis(3_723_456)),
            "1970-01-01 01:02:03.456"
        );
        // 2024-02-29 23:59:59.999 UTC
        assert_eq!(
            format_utc(UNIX_EPOCH + Duration::from_millis(1_709_251_199_999)),
            "2024-02-29 23:59:59.999"
        );

        let entry = LogEntry {
            timestamp: UNIX_EPOCH + Duration::from_secs(86_400),
            elapsed: Duration::from_millis(1500),
            level: Level::Warn,
            target: "fitch".to_string(),
            message: "late".to_string(),
        };
        assert_eq!(
            entry.to_string(),
            "[1970-01-02 00:00:00.000] [+1.500s] WARN  fitch: late"
        );
    }

    #[test]
    fn test_guard_without_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut guard = init(false, DEFAULT_LOG_PATH);
        guard.set_path(dir.path().join("fitch.log"));

        assert!(guard.path().is_none());
        drop(guard);
        assert!(!dir.path().join("fitch.log").exists());
    }
}
