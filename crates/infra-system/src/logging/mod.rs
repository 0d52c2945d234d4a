// Logging sinks: size-rotating file plus console, per-name registry

pub mod format;
pub mod registry;
pub mod rotating;

pub use format::{ConsoleLineFormat, FileLineFormat};
pub use registry::{Logger, LoggerRegistry, SinkSpec, LOG_BACKUPS, LOG_FILE_NAME, MAX_LOG_BYTES};
pub use rotating::SizeRotatingFile;
