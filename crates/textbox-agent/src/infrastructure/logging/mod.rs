//! Logging sinks for the agent.
//!
//! Every event goes to two places:
//!
//! - the console (`fmt` layer, ANSI colours), for the operator watching the
//!   agent run;
//! - `<YYYY-MM-DD>.log` in the working directory, appended to and reopened
//!   whenever the local date changes, so each day gets its own file.
//!
//! Verbosity comes from `RUST_LOG` and defaults to `info`.  Prompts and
//! responses carry `stage = "user"` / `stage = "gpt"`, lifecycle messages
//! `stage = "system"`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// File name for the log of `date`.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}.log", date.format("%Y-%m-%d"))
}

struct OpenLog {
    date: NaiveDate,
    file: File,
}

/// A [`MakeWriter`] that appends to one file per local calendar day.
#[derive(Clone)]
pub struct DailyLogFile {
    dir: PathBuf,
    current: Arc<Mutex<Option<OpenLog>>>,
}

impl DailyLogFile {
    /// Creates a writer rooted at `dir`.  No file is opened until the first
    /// event is written.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Path of the file that events dated `date` are written to.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(log_file_name(date))
    }

    fn write_dated(&self, date: NaiveDate, buf: &[u8]) -> io::Result<usize> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let reopen = current.as_ref().map_or(true, |open| open.date != date);
        if reopen {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(date))?;
            *current = Some(OpenLog { date, file });
        }
        match current.as_mut() {
            Some(open) => open.file.write(buf),
            None => Ok(0),
        }
    }
}

/// Writer handed out per event by [`DailyLogFile`].
pub struct DailyLogWriter {
    log: DailyLogFile,
}

impl Write for DailyLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.write_dated(Local::now().date_naive(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut current = self.log.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_mut() {
            Some(open) => open.file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for DailyLogFile {
    type Writer = DailyLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DailyLogWriter { log: self.clone() }
    }
}

/// Installs the global subscriber: console plus daily file in `dir`.
///
/// # Errors
///
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init(dir: &Path) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer().with_target(false);
    let file = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(DailyLogFile::new(dir));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
