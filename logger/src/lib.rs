//! Diagnostic logging for the emulator core.
//!
//! Logging is compiled out entirely unless the `logger` feature is enabled,
//! so the emulation loop never pays for formatting in normal use.

#[cfg(feature = "logger")]
use chrono::Utc;
#[cfg(feature = "logger")]
use once_cell::sync::OnceCell;
#[cfg(feature = "logger")]
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    sync::Mutex,
    time::Instant,
};

#[cfg(feature = "logger")]
static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Where log lines end up.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// Log to the console, the default choice.
    STDOUT,

    /// Log to a file in the temp dir, named `dotmatrix-<timestamp>.log`.
    FILE,
}

#[cfg(feature = "logger")]
struct Logger {
    sink: Mutex<Box<dyn Write + Send>>,
    start_instant: Instant,
}

#[cfg(feature = "logger")]
impl Logger {
    fn new(kind: LogKind) -> Self {
        let sink: Box<dyn Write + Send> = match kind {
            LogKind::STDOUT => Box::new(io::stdout()),
            LogKind::FILE => {
                let filename = format!("dotmatrix-{}.log", Utc::now().timestamp());
                let path = std::env::temp_dir().join(filename);
                println!("Logging to file: {path:?}");
                // BufWriter batches writes, a syscall per log line is too slow
                Box::new(BufWriter::new(File::create(path).unwrap()))
            }
        };

        Self {
            sink: Mutex::new(sink),
            start_instant: Instant::now(),
        }
    }

    fn log<T>(&self, data: T)
    where
        T: std::fmt::Display,
    {
        let elapsed = self.start_instant.elapsed();
        let seconds = elapsed.as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;
        let seconds = seconds % 60;
        let milliseconds = elapsed.subsec_millis();

        if let Ok(ref mut sink) = self.sink.lock() {
            writeln!(
                sink,
                "[{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}] {data}"
            )
            .unwrap();
        }
    }

    fn flush(&self) {
        if let Ok(ref mut sink) = self.sink.lock() {
            sink.flush().ok();
        }
    }
}

/// Installs the global logger. Further calls are ignored.
#[cfg(feature = "logger")]
pub fn init_logger(kind: LogKind) {
    LOGGER.set(Logger::new(kind)).ok();
}

/// Logs one line through the global logger, if one is installed.
pub fn log<T>(data: T)
where
    T: std::fmt::Display,
{
    let _ = data;
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.log(data);
    }
}

/// Flushes buffered log output. Useful at checkpoints and before aborting,
/// since file logging goes through a `BufWriter`.
pub fn flush() {
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}
