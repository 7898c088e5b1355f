/*
 * Kernel Logging Backend
 *
 * The timer logs through the `log` facade. This module provides a small
 * `log::Log` implementation a kernel can install when it has nothing
 * better: records are formatted as "[LEVEL] message" and handed to a sink
 * function the kernel supplies (the serial port, usually).
 */

use core::fmt;

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

/// Where formatted log lines go
pub type LogSink = fn(fmt::Arguments<'_>);

/// Logger forwarding every enabled record to the installed sink
struct TimerLogger;

static SINK: Once<LogSink> = Once::new();

impl log::Log for TimerLogger {
    /// Checks if the given log level is enabled.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Logs the record by handing it to the sink.
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = SINK.get() {
            sink(format_args!("[{}] {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: TimerLogger = TimerLogger;

/// Install the logger with `sink` as output, filtering at `level`
///
/// Fails if another logger was installed first.
pub fn init(sink: LogSink, level: LevelFilter) -> Result<(), SetLoggerError> {
    SINK.call_once(|| sink);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
