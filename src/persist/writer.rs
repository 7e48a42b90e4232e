use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

use super::record::{header, LogRecord};

/// Rows that may queue up ahead of the writer thread before receivers block
const LOG_QUEUE_DEPTH: usize = 1024;

/// CSV log file. The header is written on creation, then rows are only appended.
pub struct PersistenceLog {
    writer: csv::Writer<Box<dyn Write + Send>>,
    path: PathBuf,
    subcarriers: usize,
    rows: u64,
}

impl PersistenceLog {
    /// Create (truncating) the log at `path` and write the header row
    pub fn create(path: impl AsRef<Path>, subcarriers: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).context(format!("Failed to create log file {:?}", path))?;
        Self::from_writer(file, path, subcarriers)
    }

    /// Log into an already opened sink; `path` only names it in messages
    pub fn from_writer(sink: impl Write + Send + 'static, path: PathBuf, subcarriers: usize) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(Box::new(sink) as Box<dyn Write + Send>);
        writer
            .write_record(header(subcarriers))
            .context("Failed to write log header")?;
        writer.flush().context("Failed to write log header")?;

        info!("Logging samples to {:?}", path);
        Ok(Self {
            writer,
            path,
            subcarriers,
            rows: 0,
        })
    }

    /// Append one row. Each row is handed to the OS on its own; there is no fsync.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.writer
            .write_record(record.to_row(self.subcarriers))
            .context(format!("Failed to append to {:?}", self.path))?;
        self.writer
            .flush()
            .context(format!("Failed to append to {:?}", self.path))?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }
}

/// `monitoring_log_<YYYYmmdd_HHMMSS>.csv` inside `dir`
pub fn timestamped_log_path(dir: impl AsRef<Path>) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.as_ref().join(format!("monitoring_log_{}.csv", stamp))
}

/// The writer thread is gone; no more rows can be logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("persistence log writer has stopped")]
pub struct LogClosed;

/// Cloneable producer side of the log, one per receiver
#[derive(Clone)]
pub struct LogSink {
    tx: Sender<LogRecord>,
}

impl LogSink {
    pub fn append(&self, record: LogRecord) -> Result<(), LogClosed> {
        self.tx.send(record).map_err(|_| LogClosed)
    }
}

/// Owns the writer thread. It exits once every [`LogSink`] is dropped, or on
/// the first write failure.
pub struct LogWriterHandle {
    handle: JoinHandle<()>,
    done: oneshot::Receiver<Result<u64>>,
}

impl LogWriterHandle {
    /// Block until the writer exits, returning the number of rows written
    pub fn join(mut self) -> Result<u64> {
        self.handle
            .join()
            .map_err(|_| anyhow!("Log writer thread panicked"))?;
        self.done
            .try_recv()
            .map_err(|_| anyhow!("Log writer exited without a result"))?
    }

    /// Wait for the writer to exit without tying up a runtime thread.
    ///
    /// Cancel safe: dropping the future leaves the handle waitable. Must not
    /// be called again once it has returned.
    pub async fn wait(&mut self) -> Result<u64> {
        (&mut self.done)
            .await
            .map_err(|_| anyhow!("Log writer thread panicked"))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Move `log` onto a dedicated thread fed by every receiver
pub fn spawn_log_writer(mut log: PersistenceLog) -> Result<(LogSink, LogWriterHandle)> {
    let (tx, rx) = bounded::<LogRecord>(LOG_QUEUE_DEPTH);
    let (done_tx, done) = oneshot::channel();

    let handle = thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || {
            let result = drain(&mut log, rx);
            let _ = done_tx.send(result);
        })
        .context("Failed to spawn log writer thread")?;

    Ok((LogSink { tx }, LogWriterHandle { handle, done }))
}

fn drain(log: &mut PersistenceLog, rx: Receiver<LogRecord>) -> Result<u64> {
    for record in rx {
        if let Err(e) = log.append(&record) {
            error!("Persistence log failed: {:#}", e);
            return Err(e);
        }
    }
    info!("Log writer finished after {} rows", log.rows_written());
    Ok(log.rows_written())
}
