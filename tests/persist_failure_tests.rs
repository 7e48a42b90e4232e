use csimon::decode::CsiDecoder;
use csimon::ingest::{CsiReceiver, ReceiverExit, StreamLines};
use csimon::persist::{spawn_log_writer, PersistenceLog};
use csimon::store::{CoreMetric, SeriesKey, SharedStore};
use csimon::MonitorConfig;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Accepts writes until `full` is set
struct FillingDisk {
    full: Arc<AtomicBool>,
}

impl Write for FillingDisk {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.full.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn reference_line(seq: u64) -> String {
    format!("{},0,0,{}", seq, vec!["1.0,0.0"; 64].join(","))
}

#[cfg(target_os = "linux")]
#[test]
fn test_create_on_full_device_fails() {
    let err = PersistenceLog::create("/dev/full", 64).err().unwrap();
    assert!(format!("{:#}", err).contains("Failed to write log header"));
}

#[test]
fn test_create_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = PersistenceLog::create(dir.path().join("missing/log.csv"), 64).err().unwrap();
    assert!(err.to_string().contains("Failed to create log file"));
}

#[test]
fn test_append_failure_stops_writer_and_receiver() {
    let config = MonitorConfig::default();
    let store = SharedStore::new(&config);
    let full = Arc::new(AtomicBool::new(false));
    let log = PersistenceLog::from_writer(
        FillingDisk { full: full.clone() },
        PathBuf::from("filling.csv"),
        64,
    )
    .unwrap();
    let (sink, writer) = spawn_log_writer(log).unwrap();
    let mut receiver = CsiReceiver::new(CsiDecoder::from_config(&config), store.clone(), sink);

    full.store(true, Ordering::SeqCst);
    // Accepted into the queue; the write itself fails on the writer thread
    assert!(receiver.ingest(&reference_line(1), SystemTime::now()).unwrap().is_some());

    let err = writer.join().unwrap_err();
    assert!(format!("{:#}", err).contains("no space left"));

    let input = format!("{}\n{}\n", reference_line(2), reference_line(3));
    let exit = receiver.run(StreamLines::new(Cursor::new(input.into_bytes())));
    assert!(matches!(exit, ReceiverExit::LogClosed(_)));
    // The sample that found the log closed was still published
    assert_eq!(store.series_len(&SeriesKey::core(0, CoreMetric::MeanAmplitude)), 2);
}
