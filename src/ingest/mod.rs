//! Ingestion receivers, one blocking thread per feed.
//!
//! A receiver decodes and extracts features outside the store lock,
//! publishes under it, then hands a row to the persistence log. Malformed
//! samples are dropped and counted. End of stream or a transport error
//! ends only that receiver; nothing reconnects.

pub mod csi;
pub mod queue;
pub mod transport;

pub use csi::{CsiReceiver, CsiSample};
pub use queue::QueueReceiver;
pub use transport::{accept_one, DatagramLines, LineSource, StreamLines};

use log::{info, warn};
use std::io;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::persist::LogClosed;

/// Why a receiver loop stopped
#[derive(Debug, Error)]
pub enum ReceiverExit {
    #[error("end of stream")]
    EndOfStream,

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error(transparent)]
    LogClosed(#[from] LogClosed),
}

/// Per-line handling shared by both receivers
pub(crate) trait Ingest: Send + 'static {
    const FEED: &'static str;

    fn ingest_line(&mut self, line: &str) -> Result<(), LogClosed>;
}

pub(crate) fn run_loop<R: Ingest, S: LineSource>(receiver: &mut R, source: &mut S) -> ReceiverExit {
    info!("[{}] Receiver started", R::FEED);
    loop {
        match source.next_line() {
            Ok(Some(line)) => {
                if let Err(closed) = receiver.ingest_line(&line) {
                    warn!("[{}] Stopping: {}", R::FEED, closed);
                    return closed.into();
                }
            }
            Ok(None) => {
                info!("[{}] End of stream", R::FEED);
                return ReceiverExit::EndOfStream;
            }
            Err(e) => {
                warn!("[{}] Transport error: {}", R::FEED, e);
                return e.into();
            }
        }
    }
}

/// Run `receiver` on a named OS thread. `open` runs on that thread, so a
/// blocking accept does not hold up the caller.
pub(crate) fn spawn_receiver<R, S, F>(mut receiver: R, open: F) -> io::Result<JoinHandle<ReceiverExit>>
where
    R: Ingest,
    S: LineSource + 'static,
    F: FnOnce() -> io::Result<S> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{}-receiver", R::FEED))
        .spawn(move || match open() {
            Ok(mut source) => run_loop(&mut receiver, &mut source),
            Err(e) => {
                warn!("[{}] Failed to open transport: {}", R::FEED, e);
                ReceiverExit::Transport(e)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Counting {
        lines: usize,
        fail_after: Option<usize>,
    }

    impl Ingest for Counting {
        const FEED: &'static str = "test";

        fn ingest_line(&mut self, _line: &str) -> Result<(), LogClosed> {
            self.lines += 1;
            match self.fail_after {
                Some(limit) if self.lines > limit => Err(LogClosed),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_loop_runs_to_end_of_stream() {
        let mut receiver = Counting { lines: 0, fail_after: None };
        let mut source = StreamLines::new(Cursor::new(b"a\nb\nc\n".to_vec()));

        let exit = run_loop(&mut receiver, &mut source);
        assert!(matches!(exit, ReceiverExit::EndOfStream));
        assert_eq!(receiver.lines, 3);
    }

    #[test]
    fn test_loop_stops_when_log_closes() {
        let mut receiver = Counting { lines: 0, fail_after: Some(1) };
        let mut source = StreamLines::new(Cursor::new(b"a\nb\nc\n".to_vec()));

        let exit = run_loop(&mut receiver, &mut source);
        assert!(matches!(exit, ReceiverExit::LogClosed(LogClosed)));
        assert_eq!(receiver.lines, 2);
    }

    #[test]
    fn test_failed_open_reports_transport_error() {
        let receiver = Counting { lines: 0, fail_after: None };
        let handle = spawn_receiver(receiver, || -> io::Result<StreamLines<Cursor<Vec<u8>>>> {
            Err(io::Error::new(io::ErrorKind::AddrInUse, "busy"))
        })
        .unwrap();

        match handle.join().unwrap() {
            ReceiverExit::Transport(e) => assert_eq!(e.kind(), io::ErrorKind::AddrInUse),
            other => panic!("unexpected exit: {:?}", other),
        }
    }
}
