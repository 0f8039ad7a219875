//! Logger for library and CLI operations
//!
//! Works with the standard log crate. With a log file configured, a
//! custom logger mirrors every record to the file and the console; with
//! no file, env_logger takes over so RUST_LOG filtering behaves as
//! usual.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// File-backed logger that also echoes to the console
pub struct Logger {
    file: Mutex<File>,
}

impl Logger {
    /// Create a logger writing to the given file
    pub fn with_file(log_file: &str) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(file),
        })
    }

    /// Write one line to the log file
    fn write_line(&self, message: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", message)?;
        file.flush()
    }

    /// Install the global logger
    ///
    /// With a file path, the file-backed logger is installed; without
    /// one, env_logger handles console output on its own.
    pub fn init(log_file: Option<&str>) -> io::Result<()> {
        match log_file {
            Some(path) => {
                let logger = Logger::with_file(path)?;
                if log::set_boxed_logger(Box::new(logger)).is_err() {
                    // Only happens when initialized twice
                    eprintln!("Warning: global logger was already initialized");
                }
                log::set_max_level(LevelFilter::Debug);
            }
            None => {
                env_logger::Builder::from_default_env()
                    .filter_level(LevelFilter::Info)
                    .init();
            }
        }
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.write_line(&message);
            println!("{}", message);
        }
    }

    fn flush(&self) {
        // write_line already flushes
    }
}
