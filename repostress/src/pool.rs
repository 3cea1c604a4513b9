//! Spawning, supervising and draining the worker pool.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::distributor::Distributor;
use crate::endpoint::Endpoint;
use crate::worker;

/// A running set of upload and download workers sharing one distributor.
#[derive(Debug)]
pub struct Pool {
    shutdown: CancellationToken,
    uploaders: TaskTracker,
    downloaders: TaskTracker,
    distributor: Arc<Distributor>,
}

impl Pool {
    /// Spawns the configured worker counts against the given endpoint.
    ///
    /// Worker ordinals start at 1 and only serve path construction and log
    /// attribution.
    pub fn launch(endpoint: Arc<dyn Endpoint>, config: &Config) -> Self {
        let shutdown = CancellationToken::new();
        let distributor = Arc::new(Distributor::new(Distributor::DEFAULT_CAPACITY));

        let uploaders = TaskTracker::new();
        for worker_id in 1..=config.upload_workers {
            uploaders.spawn(worker::upload(
                worker_id,
                Arc::clone(&endpoint),
                config.clone(),
                Arc::clone(&distributor),
                shutdown.clone(),
            ));
        }
        uploaders.close();

        let downloaders = TaskTracker::new();
        for worker_id in 1..=config.download_workers {
            downloaders.spawn(worker::download(
                worker_id,
                Arc::clone(&endpoint),
                Arc::clone(&distributor),
            ));
        }
        downloaders.close();

        Self {
            shutdown,
            uploaders,
            downloaders,
            distributor,
        }
    }

    /// Drains the pool in two phases: the producers stop first, then the
    /// queue is closed and the download side finishes the remaining work.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.uploaders.wait().await;

        // No producer is running anymore, so closing cannot race a push.
        self.distributor.close();
        self.downloaders.wait().await;

        tracing::info!("worker pool drained");
    }
}

/// Runs a full stress session until the process receives an interrupt.
pub async fn run(endpoint: Arc<dyn Endpoint>, config: Config) -> Result<()> {
    config.validate()?;

    tracing::info!(
        upload_workers = config.upload_workers,
        download_workers = config.download_workers,
        file_size = %config.file_size,
        repo = %config.repo,
        "starting stress workers"
    );
    let pool = Pool::launch(endpoint, &config);

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, draining workers");

    pool.shutdown().await;
    Ok(())
}
