// src/logging.rs

//! `log` facade backend writing to the serial port
//!
//! Lines are emitted as `[LEVEL] target: message`. The default level is
//! `Info`; building with the `video_trace` feature raises it to `Trace`
//! (per-page mapping and per-frame refresh records).

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Serial-backed logger
#[derive(Debug)]
pub struct SerialLogger {
    level: LevelFilter,
}

impl SerialLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            crate::serial::_print(format_args!(
                "[{:<5}] {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

#[cfg(feature = "video_trace")]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Trace;

#[cfg(not(feature = "video_trace"))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

static LOGGER: SerialLogger = SerialLogger::new(DEFAULT_LEVEL);

/// Install the serial logger as the global `log` backend.
///
/// # Errors
///
/// Fails if another logger was installed first.
pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(DEFAULT_LEVEL);
    Ok(())
}
