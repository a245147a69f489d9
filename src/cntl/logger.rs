//! Default console logger and its swappable output sink.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::Level;

use crate::telemetry::{LogRecord, Logger};

use super::error::CntlError;

/// Shared writer the console logger prints to.
#[derive(Clone)]
pub struct LogSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LogSink {
    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Open (and truncate) `path` for writing.
    pub fn create(path: &Path) -> Result<Self, CntlError> {
        let file = File::create(path).map_err(|err| CntlError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(Self::from_writer(file))
    }

    pub fn same_as(&self, other: &LogSink) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }

    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // A failing log write has nowhere else to be reported.
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}

/// Map a console verbosity (0 = errors only) onto a minimum level.
pub fn level_from_console(verbosity: u32) -> Level {
    const SCALE: [Level; 5] = [
        Level::TRACE,
        Level::DEBUG,
        Level::INFO,
        Level::WARN,
        Level::ERROR,
    ];
    let index = (SCALE.len() as u32 - 1).saturating_sub(verbosity);
    SCALE[index as usize]
}

/// Logger printing one line per record to a [`LogSink`].
pub struct ConsoleLogger {
    min_level: Mutex<Level>,
    sink: Mutex<LogSink>,
    started: Instant,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            min_level: Mutex::new(Level::ERROR),
            sink: Mutex::new(LogSink::stderr()),
            started: Instant::now(),
        }
    }

    pub fn min_level(&self) -> Level {
        *self.min_level.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_min_level(&self, level: Level) {
        *self.min_level.lock().unwrap_or_else(PoisonError::into_inner) = level;
    }

    pub fn sink(&self) -> LogSink {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_sink(&self, sink: LogSink) {
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = sink;
    }

    fn format(&self, record: &LogRecord) -> String {
        let mut line = format!(
            "{}ms [{}] ({})",
            self.started.elapsed().as_millis(),
            record.level,
            record.target
        );
        if let Some(message) = &record.message {
            line.push(' ');
            line.push_str(message);
        }
        for (key, value) in &record.fields {
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, record: LogRecord) {
        // tracing orders verbose levels above quiet ones.
        if record.level > self.min_level() {
            return;
        }
        self.sink().write_line(&self.format(&record));
    }
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("min_level", &self.min_level())
            .finish_non_exhaustive()
    }
}
