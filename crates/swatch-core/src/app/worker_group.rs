use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::worker_loop::{WorkerDeps, WorkerLoop};

/// Worker group handle.
/// - `request_shutdown` で全ワーカーが新しいサイクルを始めなくなる
/// - `shutdown_and_join()` で全ループの終了を待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` worker loops sharing `deps`.
    pub fn spawn(n: usize, deps: WorkerDeps) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let worker = Arc::new(WorkerLoop::new(worker_id, deps.clone()));
            let rx = shutdown_rx.clone();
            joins.push(tokio::spawn(worker.run(rx)));
        }

        Self { shutdown_tx, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Stop taking triggers. In-flight cycles keep running.
    pub fn request_shutdown(&self) {
        // ignore send error: every loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all loops.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                tracing::error!(error = %err, "worker loop panicked");
            }
        }
    }
}
