// Logger registry: one configured dispatcher per logger name

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::dispatcher::{self, Dispatch, SetGlobalDefaultError};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use super::format::{ConsoleLineFormat, FileLineFormat};
use super::rotating::SizeRotatingFile;

pub const LOG_FILE_NAME: &str = "backend.log";
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
pub const LOG_BACKUPS: usize = 3;

/// Where a logger writes and at which minimum level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSpec {
    RotatingFile {
        path: PathBuf,
        max_bytes: u64,
        backups: usize,
        level: Level,
    },
    /// Standard error; stdout belongs to the bridge protocol
    Console { level: Level },
}

/// A named logger with its own dispatcher
pub struct Logger {
    name: String,
    dispatch: Dispatch,
    sinks: Vec<SinkSpec>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &[SinkSpec] {
        &self.sinks
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the thread's default dispatcher
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process-wide default (once per process)
    pub fn install_global(&self) -> Result<(), SetGlobalDefaultError> {
        dispatcher::set_global_default(self.dispatch.clone())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("sinks", &self.sinks)
            .finish()
    }
}

#[derive(Default)]
struct RegistryState {
    loggers: HashMap<String, Arc<Logger>>,
    file_writer: Option<NonBlocking>,
    guard: Option<WorkerGuard>,
}

/// Builds loggers on first request and hands out the same one afterwards
///
/// All loggers share one background writer for `<log_dir>/backend.log`.
/// The writer is flushed when the registry is dropped, so keep it alive for
/// as long as anything logs.
pub struct LoggerRegistry {
    log_dir: PathBuf,
    state: Mutex<RegistryState>,
}

impl LoggerRegistry {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    /// Get the logger called `name`, configuring its sinks on first use
    ///
    /// # Errors
    /// - the log directory or file cannot be created
    pub fn get_logger(&self, name: &str) -> io::Result<Arc<Logger>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "logger registry poisoned"))?;

        if let Some(logger) = state.loggers.get(name) {
            return Ok(Arc::clone(logger));
        }

        let file_writer = match &state.file_writer {
            Some(writer) => writer.clone(),
            None => {
                let file = SizeRotatingFile::open(self.log_file(), MAX_LOG_BYTES, LOG_BACKUPS)?;
                let (writer, guard) = tracing_appender::non_blocking(file);
                state.file_writer = Some(writer.clone());
                state.guard = Some(guard);
                writer
            }
        };

        let sinks = vec![
            SinkSpec::RotatingFile {
                path: self.log_file(),
                max_bytes: MAX_LOG_BYTES,
                backups: LOG_BACKUPS,
                level: Level::DEBUG,
            },
            SinkSpec::Console { level: Level::INFO },
        ];

        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(FileLineFormat::new(name))
            .with_ansi(false)
            .with_writer(file_writer)
            .with_filter(LevelFilter::DEBUG);

        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(ConsoleLineFormat)
            .with_ansi(false)
            .with_writer(io::stderr)
            .with_filter(LevelFilter::INFO);

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        let logger = Arc::new(Logger {
            name: name.to_string(),
            dispatch: Dispatch::new(subscriber),
            sinks,
        });
        state.loggers.insert(name.to_string(), Arc::clone(&logger));

        Ok(logger)
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("log_dir", &self.log_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_same_name_returns_same_logger() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = LoggerRegistry::new(tmp.path().join("logs"));

        let first = registry.get_logger("backend").unwrap();
        let second = registry.get_logger("backend").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.sinks().len(), 2);
    }

    #[test]
    fn test_sinks_describe_file_and_console() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = LoggerRegistry::new(tmp.path().join("logs"));
        let logger = registry.get_logger("backend").unwrap();

        assert_eq!(
            logger.sinks()[0],
            SinkSpec::RotatingFile {
                path: tmp.path().join("logs").join("backend.log"),
                max_bytes: 5 * 1024 * 1024,
                backups: 3,
                level: Level::DEBUG,
            }
        );
        assert_eq!(logger.sinks()[1], SinkSpec::Console { level: Level::INFO });
    }

    #[test]
    fn test_different_names_are_distinct_loggers() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = LoggerRegistry::new(tmp.path());

        let backend = registry.get_logger("backend").unwrap();
        let builder = registry.get_logger("builder").unwrap();

        assert!(!Arc::ptr_eq(&backend, &builder));
        assert_eq!(builder.name(), "builder");
    }

    #[test]
    fn test_file_sink_receives_debug_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let log_file;
        {
            let registry = LoggerRegistry::new(tmp.path().join("logs"));
            log_file = registry.log_file();
            let logger = registry.get_logger("backend").unwrap();

            logger.in_scope(|| {
                tracing::debug!("loading methods");
                tracing::info!("serving stdio");
            });
            // dropping the registry flushes the background writer
        }

        let contents = fs::read_to_string(log_file).unwrap();
        assert!(contents.contains("[DEBUG] backend - loading methods"));
        assert!(contents.contains("[INFO] backend - serving stdio"));
    }

    #[test]
    fn test_unwritable_log_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let registry = LoggerRegistry::new(blocker.join("logs"));
        assert!(registry.get_logger("backend").is_err());
    }
}
