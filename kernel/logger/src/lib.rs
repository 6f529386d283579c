//! A basic logger implementation for system-wide logging.
//!
//! This enables crates to use the `log` crate's macros anywhere.
//! Log statements are written to a text sink, typically a serial port,
//! registered with [`init()`].

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record};
use spin::Once;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "aarch64", target_os = "none"))] {
        use irq_safety::MutexIrqSafe as SinkLock;
    } else {
        // Host builds run in user mode, where interrupts can't be masked.
        use spin::Mutex as SinkLock;
    }
}


/// Where log output goes.
pub type LogSink = Box<dyn Write + Send>;

/// Writes each record as `"LEVEL - message\r\n"` to its sink.
pub struct Logger {
    sink: SinkLock<Option<LogSink>>,
    level: SinkLock<LevelFilter>,
}

impl Logger {
    pub const fn new(level: LevelFilter) -> Self {
        Logger {
            sink: SinkLock::new(None),
            level: SinkLock::new(level),
        }
    }

    /// Replaces the sink, returning the previous one.
    pub fn set_sink(&self, sink: LogSink) -> Option<LogSink> {
        self.sink.lock().replace(sink)
    }

    pub fn set_level(&self, level: LevelFilter) {
        *self.level.lock() = level;
    }

    pub fn level(&self) -> LevelFilter {
        *self.level.lock()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.lock().as_mut() {
            // There is nowhere else to report a failed write.
            let _ = write!(sink, "{} - {}\r\n", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger::new(LevelFilter::Info);
static INSTALLED: Once = Once::new();

/// Sets the system-wide logger to write to `sink`, showing messages up to `level`.
///
/// Calling it again only swaps the sink and level.
pub fn init(sink: LogSink, level: LevelFilter) -> Result<(), &'static str> {
    LOGGER.set_sink(sink);
    LOGGER.set_level(level);
    log::set_max_level(level);
    if !INSTALLED.is_completed() {
        log::set_logger(&LOGGER).map_err(|_| "logger: another logger was already set")?;
        INSTALLED.call_once(|| ());
    }
    Ok(())
}
