use anyhow::{anyhow, bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{SocketAddr, TcpListener, UdpSocket};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::reader::SnapshotReader;
use crate::config::{CsiTransport, MonitorConfig};
use crate::decode::CsiDecoder;
use crate::ingest::{accept_one, CsiReceiver, DatagramLines, QueueReceiver, ReceiverExit};
use crate::observability::{ReceiverStats, StatsSnapshot};
use crate::persist::{spawn_log_writer, timestamped_log_path, LogWriterHandle, PersistenceLog};
use crate::store::{SharedStore, Snapshot};

/// Monitor status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
    Stopped,
    Running,
    Failed,
}

/// Wires the receivers, the shared store, the persistence log and the
/// snapshot reader together.
///
/// Receivers are blocking threads with no cancellation; `shutdown` stops
/// the snapshot reader and leaves them to end with the process.
pub struct Monitor {
    config: MonitorConfig,
    store: SharedStore,
    status: MonitorStatus,

    /// Shutdown signal for the snapshot reader
    shutdown_tx: Option<broadcast::Sender<()>>,
    reader_handle: Option<JoinHandle<()>>,

    receiver_handles: Vec<thread::JoinHandle<ReceiverExit>>,
    log_writer: Option<LogWriterHandle>,
    log_path: Option<PathBuf>,
    stats: Vec<Arc<ReceiverStats>>,

    csi_addr: Option<SocketAddr>,
    queue_addr: Option<SocketAddr>,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        let store = SharedStore::new(&config);

        Ok(Self {
            config,
            store,
            status: MonitorStatus::Stopped,
            shutdown_tx: None,
            reader_handle: None,
            receiver_handles: Vec::new(),
            log_writer: None,
            log_path: None,
            stats: Vec::new(),
            csi_addr: None,
            queue_addr: None,
        })
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Handle on the shared store, for on-demand snapshots
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Bound CSI address, once started
    pub fn csi_addr(&self) -> Option<SocketAddr> {
        self.csi_addr
    }

    /// Bound queue-status address, once started
    pub fn queue_addr(&self) -> Option<SocketAddr> {
        self.queue_addr
    }

    pub fn stats(&self) -> Vec<StatsSnapshot> {
        self.stats.iter().map(|s| s.snapshot()).collect()
    }

    /// Receivers whose loop has ended
    pub fn finished_receivers(&self) -> usize {
        self.receiver_handles
            .iter()
            .filter(|handle| handle.is_finished())
            .count()
    }

    /// Open the log, bind both feeds, spawn the receivers and start
    /// delivering snapshots to `sink`
    pub async fn start<F>(&mut self, sink: F) -> Result<()>
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        if self.status == MonitorStatus::Running {
            bail!("Monitor is already running");
        }

        let bind = self.config.bind_address.clone();
        let csi_port = self.config.csi_port;
        let queue_port = self.config.queue_port;

        // Bind everything before spawning so a failure leaves nothing running
        let csi_socket = match self.config.csi_transport {
            CsiTransport::Udp => CsiSocket::Udp(
                UdpSocket::bind((bind.as_str(), csi_port))
                    .context(format!("Failed to bind CSI UDP port {}", csi_port))?,
            ),
            CsiTransport::Tcp => CsiSocket::Tcp(
                TcpListener::bind((bind.as_str(), csi_port))
                    .context(format!("Failed to bind CSI TCP port {}", csi_port))?,
            ),
        };
        let queue_listener = TcpListener::bind((bind.as_str(), queue_port))
            .context(format!("Failed to bind queue TCP port {}", queue_port))?;

        fs::create_dir_all(&self.config.log_dir)
            .context(format!("Failed to create log directory {:?}", self.config.log_dir))?;
        let path = timestamped_log_path(&self.config.log_dir);
        let log = PersistenceLog::create(&path, self.config.subcarrier_count)?;
        let (log_sink, log_writer) = spawn_log_writer(log)?;

        let csi = CsiReceiver::new(
            CsiDecoder::from_config(&self.config),
            self.store.clone(),
            log_sink.clone(),
        );
        self.stats.push(csi.stats());
        let csi_handle = match csi_socket {
            CsiSocket::Udp(socket) => {
                let addr = socket.local_addr()?;
                info!("[csi] Waiting for UDP packets on {}", addr);
                self.csi_addr = Some(addr);
                csi.spawn(move || Ok(DatagramLines::new(socket)))?
            }
            CsiSocket::Tcp(listener) => {
                self.csi_addr = Some(listener.local_addr()?);
                csi.spawn(move || accept_one(&listener, "csi"))?
            }
        };

        let queue = QueueReceiver::new(self.store.clone(), log_sink);
        self.stats.push(queue.stats());
        self.queue_addr = Some(queue_listener.local_addr()?);
        let queue_handle = queue.spawn(move || accept_one(&queue_listener, "queue"))?;

        let (shutdown_tx, _) = broadcast::channel(4);
        let reader = SnapshotReader::new(self.store.clone(), self.config.snapshot_interval())
            .with_window(self.config.plot_window());
        self.reader_handle = Some(reader.spawn(sink, shutdown_tx.subscribe()));

        self.shutdown_tx = Some(shutdown_tx);
        self.receiver_handles = vec![csi_handle, queue_handle];
        self.log_writer = Some(log_writer);
        self.log_path = Some(path);
        self.status = MonitorStatus::Running;
        Ok(())
    }

    /// Wait for the persistence writer to exit.
    ///
    /// It exits cleanly once both receivers have stopped, or with an error
    /// when a write fails; the error is meant to take the process down.
    /// Cancel safe, so it can race a shutdown signal and be dropped.
    pub async fn wait_log_writer(&mut self) -> Result<u64> {
        let writer = self
            .log_writer
            .as_mut()
            .ok_or_else(|| anyhow!("Monitor has no running log writer"))?;

        let result = writer.wait().await;
        self.log_writer = None;
        if result.is_err() {
            self.status = MonitorStatus::Failed;
        }
        result
    }

    /// Stop the snapshot reader
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.reader_handle.take() {
            handle.await.context("Snapshot reader task failed")?;
        }

        if self.status == MonitorStatus::Running {
            self.status = MonitorStatus::Stopped;
        }
        Ok(())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(());
        }
    }
}

enum CsiSocket {
    Udp(UdpSocket),
    Tcp(TcpListener),
}
