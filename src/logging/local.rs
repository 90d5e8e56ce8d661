//! Local fallback output.
//!
//! Lines look like `ERROR 2026/10/16 09:30:01 handlers.rs:42: message`.
//! Each line is assembled in a local buffer and written with one
//! `write_all` while holding the target lock, so concurrent callers never
//! see each other's severity prefix.

use chrono::{Local, Utc};
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::sync::Mutex;

use crate::config::LocalConfig;
use crate::logging::entry::CallSite;
use crate::severity::Severity;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Line-oriented writer used when no hosted backend is active.
pub struct LineLogger {
    target: Mutex<Box<dyn Write + Send>>,
    config: LocalConfig,
}

impl LineLogger {
    /// Logger writing to the process's standard error.
    pub fn stderr(config: LocalConfig) -> Self {
        Self::new(io::stderr(), config)
    }

    pub fn new<W: Write + Send + 'static>(target: W, config: LocalConfig) -> Self {
        Self {
            target: Mutex::new(Box::new(target)),
            config,
        }
    }

    /// Render one line, terminated by a newline.
    pub fn format_line(&self, severity: Severity, site: &CallSite, args: fmt::Arguments<'_>) -> String {
        let mut line = String::with_capacity(128);
        let _ = write!(line, "{} ", severity);
        if self.config.timestamps {
            let _ = if self.config.utc {
                write!(line, "{} ", Utc::now().format(TIMESTAMP_FORMAT))
            } else {
                write!(line, "{} ", Local::now().format(TIMESTAMP_FORMAT))
            };
        }
        let _ = write!(line, "{}:{}: {}", site.short_file(), site.line, args);
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }

    /// Write one line. Write errors are not reported.
    pub fn output(&self, severity: Severity, site: &CallSite, args: fmt::Arguments<'_>) {
        let line = self.format_line(severity, site, args);
        let mut target = match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = target.write_all(line.as_bytes());
        let _ = target.flush();
    }
}

impl fmt::Debug for LineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineLogger")
            .field("timestamps", &self.config.timestamps)
            .field("utc", &self.config.utc)
            .finish()
    }
}
