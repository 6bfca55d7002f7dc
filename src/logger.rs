//! Console backend for the `log` facade with coloured level tags.

use std::io::Write;

use ansi_term::Colour::{Blue, Green, Purple, Red, Yellow};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = match record.level() {
            Level::Error => Red.bold().paint("ERROR"),
            Level::Warn => Yellow.bold().paint("WARN"),
            Level::Info => Green.bold().paint("INFO"),
            Level::Debug => Blue.bold().paint("DEBUG"),
            Level::Trace => Purple.bold().paint("TRACE"),
        };

        // Write failures are dropped.
        if record.level() <= Level::Warn {
            let _ = writeln!(std::io::stderr(), "{} {}: {}", tag, record.target(), record.args());
        } else {
            let _ = writeln!(std::io::stdout(), "{} {}: {}", tag, record.target(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Install the console logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
