//! Logging facility for the simulator
//!
//! Thread-safe logging through the `log` crate, written to stderr so
//! the demo's report output on stdout stays clean.

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Global logger instance installed by [`init`]
pub static LOGGER: Logger = Logger::new();

/// Thread-safe logger implementation
pub struct Logger {
    inner: Mutex<()>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Creates a new logger instance
    pub const fn new() -> Logger {
        Logger {
            inner: Mutex::new(()),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Formats messages as "[LEVEL] message"
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _guard = self.inner.lock();
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Initializes the logging system
///
/// Debug builds log at `Debug`, release builds at `Info`.
pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| {
            log::set_max_level(
                #[cfg(debug_assertions)]
                LevelFilter::Debug,
                #[cfg(not(debug_assertions))]
                LevelFilter::Info,
            )
        })
        .expect("Logger initialization failed");
}
