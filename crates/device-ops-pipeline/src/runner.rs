// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use device_ops_collector::{
    config::CollectorConfig,
    persistence::PersistenceCoordinator,
    server::CollectorServer,
    service::Collector,
    store::{DocumentStore, MemoryStore, SqliteStore},
};
use device_ops_producer::{
    client::RemoteCallClient,
    config::ProducerConfig,
    file_source::FsFileSource,
    ingestion,
    transport::{build_client, HttpTransport},
};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::mode::Mode;

/// Opens the store named by the configuration. A failure here is fatal to the process.
pub fn open_store(
    config: &CollectorConfig,
) -> anyhow::Result<Arc<dyn DocumentStore + Send + Sync>> {
    match &config.store_path {
        Some(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("failed to open store at {}", path.display()))?;
            info!("Using SQLite store at {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub struct RunningCollector {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<io::Result<()>>,
}

impl RunningCollector {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL a client on this host reaches the collector at.
    pub fn local_url(&self) -> String {
        let ip = if self.addr.ip().is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.addr.ip()
        };
        format!("http://{}", SocketAddr::new(ip, self.addr.port()))
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        flatten(self.handle.await)
    }

    /// Serves until Ctrl-C, or until the server stops on its own.
    pub async fn run_until_interrupted(mut self) -> anyhow::Result<()> {
        enum Stop {
            Signal(io::Result<()>),
            Exited(Result<io::Result<()>, JoinError>),
        }

        let stop = tokio::select! {
            res = tokio::signal::ctrl_c() => Stop::Signal(res),
            res = &mut self.handle => Stop::Exited(res),
        };
        match stop {
            Stop::Signal(res) => {
                res.context("failed to listen for the shutdown signal")?;
                info!("Shutdown signal received");
                self.shutdown().await
            }
            Stop::Exited(res) => flatten(res),
        }
    }
}

fn flatten(res: Result<io::Result<()>, JoinError>) -> anyhow::Result<()> {
    res.context("collector task failed")?
        .context("collector stopped with an error")
}

/// Binds the collector and serves it in the background.
pub async fn start_collector(
    config: CollectorConfig,
    store: Arc<dyn DocumentStore + Send + Sync>,
) -> anyhow::Result<RunningCollector> {
    let persistence = PersistenceCoordinator::new(store, config.stats_collection.clone());
    let service = Arc::new(Collector::new(persistence));
    let addr = config.socket_addr();

    let bound = CollectorServer::new(Arc::new(config), service)
        .bind()
        .await
        .with_context(|| format!("failed to bind collector on {addr}"))?;
    let addr = bound.local_addr();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(bound.serve(cancel.clone()));
    Ok(RunningCollector {
        addr,
        cancel,
        handle,
    })
}

/// Loads every device log of the data directory and ships it in one call.
/// Returns the number of device records sent.
pub async fn run_producer(config: &ProducerConfig) -> anyhow::Result<usize> {
    let now = Instant::now();
    let records = ingestion::load_dir(&FsFileSource, &config.data_dir)
        .context("failed to load device data")?;
    info!(
        "Loaded {} device records from {}",
        records.len(),
        config.data_dir.display()
    );

    let client = build_client(config.request_timeout).context("failed to build HTTP client")?;
    let transport = HttpTransport::new(client, config.collector_url.clone());
    RemoteCallClient::new(Arc::new(transport), config.request_timeout)
        .send(&records)
        .await
        .context("failed to send device data to the collector")?;

    debug!(
        "Time taken to ship device data: {} ms",
        now.elapsed().as_millis()
    );
    Ok(records.len())
}

/// Runs the halves of the pipeline selected by `mode`.
///
/// Store and bind failures abort with an error. A producer failure is logged and the run still
/// completes, leaving the data files untouched.
pub async fn run(
    mode: Mode,
    collector_config: CollectorConfig,
    mut producer_config: ProducerConfig,
) -> anyhow::Result<()> {
    info!("Starting device operations pipeline in {mode} mode");
    match mode {
        Mode::All => {
            let store = open_store(&collector_config)?;
            let collector = start_collector(collector_config, store).await?;
            producer_config.collector_url = collector.local_url();
            report_producer(run_producer(&producer_config).await);
            collector.shutdown().await
        }
        Mode::Collector => {
            let store = open_store(&collector_config)?;
            start_collector(collector_config, store)
                .await?
                .run_until_interrupted()
                .await
        }
        Mode::Producer => {
            report_producer(run_producer(&producer_config).await);
            Ok(())
        }
    }
}

fn report_producer(result: anyhow::Result<usize>) {
    match result {
        Ok(count) => info!("Sent {count} device records to the collector"),
        Err(e) => error!("Error sending data to the collector: {e:#}"),
    }
}
