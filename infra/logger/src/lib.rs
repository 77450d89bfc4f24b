//! # Logger
//!
//! A centralized logging utility for the project.
//! It provides a unified way to configure console and file logging with
//! rotation, non-blocking I/O, and environment-based filtering.
//!
//! * Use [`LoggerBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"myapp=debug,hyper=info"`), in addition to `RUST_LOG`.
//! * [`LoggerBuilder::scoped`] splits file output into one rolling file per
//!   root scope of the event target, so `payments::api` events land in
//!   `payments.<date>.log`.
//! * [`LoggerBuilder::async_buffer`] moves file writes behind a bounded
//!   channel drained by a background thread; full buffers degrade to
//!   synchronous writes instead of dropping records.
//! * [`LoggerBuilder::sampling`] keeps one event in `n` below `WARN`.
//! * [`Logger::counters`] exposes per-level event counts.
//!
//! ## Example
//!
//! ```rust
//! # use toolx_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod buffer;
mod count;
mod error;
mod sample;
mod scoped;

pub use crate::buffer::AsyncWriter;
pub use crate::count::{CountLayer, LevelCounters, LevelSnapshot};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::sample::SampleFilter;
pub use crate::scoped::ScopedFileWriter;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
    scoped: bool,
    async_buffer: Option<usize>,
    sampling: u64,
    error_file: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
            scoped: false,
            async_buffer: None,
            sampling: 0,
            error_file: false,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Configures maximum number of log files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Configures the log file rotation strategy.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Enables JSON logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    /// Routes each event to a rolling file named after the root scope of its
    /// target instead of a single shared file.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn scoped(mut self) -> Self {
        self.config.scoped = true;
        self
    }

    /// Buffers file writes in a bounded channel of `capacity` records drained
    /// by a background thread. A full buffer falls back to synchronous writes.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn async_buffer(mut self, capacity: usize) -> Self {
        self.config.async_buffer = Some(capacity);
        self
    }

    /// Adds an extra rolling file (`<name>.error`) that receives only `ERROR`
    /// events, alongside the regular file output.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn error_file(mut self) -> Self {
        self.config.error_file = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `myapp=debug,hyper=info`).
    ///
    /// Environment variables still override via `RUST_LOG`; this is a programmatic default.
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Keeps one event in `every` below `WARN`; `WARN` and `ERROR` always
    /// pass. `0` and `1` disable sampling.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn sampling(mut self, every: u64) -> Self {
        self.config.sampling = every;
        self
    }

    /// Sets the path to log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. **Note:** This handle owns the background writer
    /// state and must be kept alive for the duration of the program to ensure
    /// that buffered logs are flushed correctly.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;
        let config = self.config;
        let name = self.name.0;
        let counters = Arc::new(LevelCounters::default());

        let mut layers = Vec::new();

        if config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let mut guard = None;
        let mut buffered = None;
        let mut scoped = None;

        if let Some(path) = config.path {
            fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create path: {}", path.display()).into()),
            })?;

            if config.scoped {
                let writer = ScopedFileWriter::new(
                    &path,
                    &name,
                    config.rotation.clone(),
                    config.max_files,
                    config.async_buffer,
                )?;
                let file_layer = layer().with_writer(writer.clone()).with_ansi(false);
                layers
                    .push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
                scoped = Some(writer);
            } else {
                let file_appender = RollingFileAppender::builder()
                    .rotation(config.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(&path)?;

                if let Some(capacity) = config.async_buffer {
                    let writer = AsyncWriter::new(file_appender, capacity)?;
                    let file_layer = layer().with_writer(writer.clone()).with_ansi(false);
                    layers.push(if config.json {
                        file_layer.json().boxed()
                    } else {
                        file_layer.boxed()
                    });
                    buffered = Some(writer);
                } else {
                    let (non_blocking, g) = tracing_appender::non_blocking(file_appender);
                    let file_layer = layer().with_writer(non_blocking).with_ansi(false);
                    layers.push(if config.json {
                        file_layer.json().boxed()
                    } else {
                        file_layer.boxed()
                    });
                    guard = Some(g);
                }
            }

            if config.error_file {
                let error_appender = RollingFileAppender::builder()
                    .rotation(config.rotation.clone())
                    .filename_prefix(&format!("{name}.error"))
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(&path)?;

                let error_layer = layer().with_writer(error_appender).with_ansi(false);
                layers.push(if config.json {
                    error_layer.json().with_filter(LevelFilter::ERROR).boxed()
                } else {
                    error_layer.with_filter(LevelFilter::ERROR).boxed()
                });
            }
        }

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        layers.push(CountLayer::new(Arc::clone(&counters)).boxed());

        // The sample filter sits beneath the env filter so that events the
        // filter rejects never advance the sampling counter.
        let sample = (config.sampling > 1).then(|| SampleFilter::new(config.sampling));
        tracing_subscriber::registry().with(sample).with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard, buffered, scoped, counters })
    }
}

/// A handle to the initialized logging system.
///
/// This struct holds the background writer state. Drop this struct only
/// when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
pub struct Logger {
    guard: Option<WorkerGuard>,
    buffered: Option<AsyncWriter>,
    scoped: Option<ScopedFileWriter>,
    counters: Arc<LevelCounters>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing subscriber.
    ///
    /// The `name` serves as the primary identifier for your logs and is used
    /// as a prefix for rolling log files (e.g., `my-app.2023-10-27.log`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use toolx_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-app")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// Manually triggers a flush of all pending logs in the background writers.
    ///
    /// While flushing happens automatically when this handle is dropped, this
    /// method acts as a best-effort synchronization point before shutdown.
    pub fn flush(&self) {
        tracing::debug!("Logger flushed");
        if let Some(buffered) = &self.buffered {
            buffered.flush();
        }
        if let Some(scoped) = &self.scoped {
            scoped.flush();
        }
    }

    /// Returns a snapshot of the per-level event counters.
    #[must_use]
    pub fn counters(&self) -> LevelSnapshot {
        self.counters.snapshot()
    }

    /// Zeroes the per-level event counters.
    pub fn reset_counters(&self) {
        self.counters.reset();
    }

    /// Returns a reference to the underlying worker guard, if present.
    ///
    /// The guard only exists for plain (non-scoped, non-buffered) file output.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("guard", &self.guard.is_some())
            .field("buffered", &self.buffered.is_some())
            .field("scoped", &self.scoped.is_some())
            .field("counters", &self.counters.snapshot())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() || self.buffered.is_some() || self.scoped.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
        if let Some(buffered) = self.buffered.take() {
            buffered.flush();
            buffered.close();
        }
        if let Some(scoped) = self.scoped.take() {
            scoped.close();
        }
    }
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    if config.async_buffer == Some(0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "async_buffer capacity must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_logger_builder_initial_state() {
        let logger_builder = Logger::builder().name("test-app").env_filter("toolx=debug");
        assert!(logger_builder.config.console);
        assert_eq!(logger_builder.config.level, LevelFilter::INFO);
        assert_eq!(logger_builder.config.env_filter.as_deref(), Some("toolx=debug"));
        assert!(logger_builder.config.path.is_none());
        assert!(!logger_builder.config.scoped);
        assert!(logger_builder.config.async_buffer.is_none());
        assert_eq!(logger_builder.config.sampling, 0);
        assert!(!logger_builder.config.error_file);
    }

    #[test]
    #[serial]
    fn test_logger_builder_configuration() -> Result<(), LoggerError> {
        let tmp_dir = tempdir().map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to create temp dir".into()),
        })?;
        let log_dir = tmp_dir.path().join("logs");
        let logger_builder = Logger::builder()
            .name("test-app")
            .console(true)
            .env_filter("toolx=info")
            .sampling(10)
            .path(log_dir.clone())
            .max_files(5)
            .async_buffer(256)
            .error_file()
            .level(LevelFilter::DEBUG);

        assert!(logger_builder.config.console);
        assert_eq!(logger_builder.config.level, LevelFilter::DEBUG);
        assert_eq!(logger_builder.config.max_files, 5);
        assert_eq!(logger_builder.config.env_filter.as_deref(), Some("toolx=info"));
        assert_eq!(logger_builder.config.path.as_deref(), Some(log_dir.as_path()));
        assert_eq!(logger_builder.config.sampling, 10);
        assert_eq!(logger_builder.config.async_buffer, Some(256));
        assert!(logger_builder.config.error_file);

        Ok(())
    }

    #[test]
    #[serial]
    fn test_zero_max_files_is_rejected() {
        let result = Logger::builder().name("test-app").path("logs").max_files(0).init();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn test_zero_buffer_capacity_is_rejected() {
        let result = Logger::builder().name("test-app").path("logs").async_buffer(0).init();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn test_file_logging_setup() -> Result<(), LoggerError> {
        let tmp_dir = tempdir().map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to create temp dir".into()),
        })?;
        let log_dir = tmp_dir.path().join("logs");

        let logger =
            Logger::builder().name("test-app").path(&log_dir).level(LevelFilter::INFO).init()?;

        tracing::info!("hello world");
        // Give the background worker a moment, then flush explicitly.
        std::thread::sleep(Duration::from_millis(20));
        logger.flush();

        assert!(log_dir.exists(), "log directory should be created by logger init");

        let entries = fs::read_dir(&log_dir).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to read log directory {}", log_dir.display()).into()),
        })?;

        let has_log = entries
            .flatten()
            .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));

        assert!(has_log, "at least one log file should be created");
        Ok(())
    }
}
