use csimon::engine::Monitor;
use csimon::MonitorConfig;
use log::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    info!(
        "CSI port {} ({:?}), queue port {}, {} cores x {} subcarriers",
        config.csi_port,
        config.csi_transport,
        config.queue_port,
        config.core_count,
        config.subcarrier_count
    );

    let mut monitor = Monitor::new(config)?;
    monitor
        .start(|snapshot| debug!("{}", snapshot.summary()))
        .await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
        }
        written = monitor.wait_log_writer() => {
            // Ok only once both receivers are gone; an error is a failed write
            let rows = written?;
            info!("All receivers stopped after {} logged rows", rows);
        }
    }

    for stats in monitor.stats() {
        info!("[{}] accepted {}, dropped {}", stats.feed, stats.accepted, stats.dropped);
    }
    monitor.shutdown().await?;
    Ok(())
}
