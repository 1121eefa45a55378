//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! TaskStore / 通知チャネル / Orchestrator を 1 つにまとめ、
//! 足りない協力者があれば build() 時に BuildError で止める（Fail-fast）。

use std::sync::Arc;
use std::time::Duration;

use super::orchestrator::Orchestrator;
use super::worker_group::WorkerGroup;
use super::worker_loop::{WorkerDeps, WorkerLoop};
use crate::config::SwatchConfig;
use crate::impls::RendezvousChannel;
use crate::ports::{BlobStore, ImageTransform};
use crate::store::{InMemoryTaskStore, LeasePolicy};

/// Default worker poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .blob_store(Arc::new(InMemoryBlobStore::new()))
///     .transform(Arc::new(ChannelSwap))
///     .build()?;
/// let workers = app.spawn_workers(4);
/// ```
pub struct AppBuilder {
    lease: LeasePolicy,
    poll_interval: Duration,
    blobs: Option<Arc<dyn BlobStore>>,
    transform: Option<Arc<dyn ImageTransform>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no blob store configured; call AppBuilder::blob_store before build")]
    MissingBlobStore,

    #[error("no image transform configured; call AppBuilder::transform before build")]
    MissingTransform,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            lease: LeasePolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            blobs: None,
            transform: None,
        }
    }

    /// Timings from config. Collaborators still have to be set.
    pub fn from_config(config: &SwatchConfig) -> Self {
        Self::new()
            .lease(LeasePolicy::new(config.lease()))
            .poll_interval(config.poll_interval())
    }

    pub fn lease(mut self, lease: LeasePolicy) -> Self {
        self.lease = lease;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn transform(mut self, transform: Arc<dyn ImageTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let blobs = self.blobs.ok_or(BuildError::MissingBlobStore)?;
        let transform = self.transform.ok_or(BuildError::MissingTransform)?;

        let store = Arc::new(InMemoryTaskStore::new(self.lease));
        let channel = Arc::new(RendezvousChannel::new());
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            blobs.clone(),
            channel.clone(),
        ));

        tracing::debug!(
            lease_secs = self.lease.duration().as_secs(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "app wired"
        );

        Ok(App {
            orchestrator,
            store,
            channel,
            blobs,
            transform,
            poll_interval: self.poll_interval,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One process worth of pipeline: the store, the channel, and the
/// collaborators the workers need.
pub struct App {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<InMemoryTaskStore>,
    pub channel: Arc<RendezvousChannel>,
    blobs: Arc<dyn BlobStore>,
    transform: Arc<dyn ImageTransform>,
    poll_interval: Duration,
}

impl App {
    pub fn deps(&self) -> WorkerDeps {
        WorkerDeps {
            orchestrator: self.orchestrator.clone(),
            blobs: self.blobs.clone(),
            transform: self.transform.clone(),
            channel: self.channel.clone(),
            poll_interval: self.poll_interval,
        }
    }

    /// A single loop, for callers that drive `run_cycle` themselves.
    pub fn worker(&self, worker_id: usize) -> WorkerLoop {
        WorkerLoop::new(worker_id, self.deps())
    }

    pub fn spawn_workers(&self, n: usize) -> WorkerGroup {
        tracing::info!(workers = n, "spawning worker loops");
        WorkerGroup::spawn(n, self.deps())
    }
}
