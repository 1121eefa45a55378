//! WorkerLoop - タスク実行ループ
//!
//! # フロー
//! 1. 通知チャネルの pop（poll 間隔でタイムアウト）を待つ
//! 2. どちらで起きても 1 サイクルを別タスクとして spawn
//! 3. サイクル: request → 入力取得 → 変換 → 出力保存 → 完了報告
//!
//! どこで失敗してもサイクルを捨てるだけ。再実行は lease 切れ + 次の poll に任せる。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::Orchestrator;
use crate::domain::{BlobPhase, TaskId};
use crate::impls::RendezvousChannel;
use crate::ports::{BlobStore, ImageTransform};

/// Where a work cycle gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Request,
    FetchInput,
    Transform,
    StoreOutput,
    Report,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::Request => "request",
            CycleStage::FetchInput => "fetch_input",
            CycleStage::Transform => "transform",
            CycleStage::StoreOutput => "store_output",
            CycleStage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Result of one work cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was pending.
    Idle,

    /// Output stored and reported.
    Completed(TaskId),

    /// The cycle stopped at `stage`. An assigned task stays Assigned until
    /// its lease expires.
    Abandoned {
        stage: CycleStage,
        task_id: Option<TaskId>,
    },
}

/// What every worker loop in a process shares.
#[derive(Clone)]
pub struct WorkerDeps {
    pub orchestrator: Arc<Orchestrator>,
    pub blobs: Arc<dyn BlobStore>,
    pub transform: Arc<dyn ImageTransform>,
    pub channel: Arc<RendezvousChannel>,
    pub poll_interval: Duration,
}

pub struct WorkerLoop {
    worker_id: usize,
    deps: WorkerDeps,
}

impl WorkerLoop {
    pub fn new(worker_id: usize, deps: WorkerDeps) -> Self {
        Self { worker_id, deps }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Wait for a trigger, spawn a cycle, repeat until shutdown.
    ///
    /// In-flight cycles are not cancelled on shutdown; the loop just stops
    /// starting new ones.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        let worker_id = self.worker_id;
        tracing::info!(worker_id, "launching worker main loop");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let trigger = tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        // sender gone: nobody can ask us to keep running
                        break;
                    }
                    continue;
                }
                popped = self.deps.channel.pop(self.deps.poll_interval) => popped,
            };

            match trigger {
                Ok(Some(id)) => tracing::info!(worker_id, task_id = %id, "task to be done"),
                Ok(None) => tracing::trace!(worker_id, "poll tick"),
                Err(err) => {
                    tracing::warn!(worker_id, error = %err, "notification channel unusable, polling only");
                    tokio::time::sleep(self.deps.poll_interval).await;
                }
            }

            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.run_cycle().await;
            });
        }

        tracing::info!(worker_id, "worker loop stopped");
    }

    /// One acquire-execute-report cycle. Never retries.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let worker_id = self.worker_id;
        let deps = &self.deps;

        let task = match deps.orchestrator.request_task().await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::debug!(worker_id, "no task to take");
                return CycleOutcome::Idle;
            }
            Err(err) => {
                tracing::error!(worker_id, error = %err, "requesting a task failed");
                return abandon(CycleStage::Request, None);
            }
        };
        let id = task.id;

        let input = match deps.blobs.get(id, BlobPhase::Working).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(worker_id, task_id = %id, error = %err, "fetching input failed");
                return abandon(CycleStage::FetchInput, Some(id));
            }
        };

        // decode/encode is CPU bound; keep it off the scheduler threads
        let transform = Arc::clone(&deps.transform);
        let output = match tokio::task::spawn_blocking(move || transform.apply(&input)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => {
                tracing::error!(worker_id, task_id = %id, error = %err, "transform failed");
                return abandon(CycleStage::Transform, Some(id));
            }
            Err(err) => {
                tracing::error!(worker_id, task_id = %id, error = %err, "transform task died");
                return abandon(CycleStage::Transform, Some(id));
            }
        };

        if let Err(err) = deps.blobs.put(id, BlobPhase::Finished, output).await {
            tracing::error!(worker_id, task_id = %id, error = %err, "storing output failed");
            return abandon(CycleStage::StoreOutput, Some(id));
        }

        if let Err(err) = deps.orchestrator.report_finished(id).await {
            // output is already written; a later reassignment redoes the work
            tracing::error!(worker_id, task_id = %id, error = %err, "reporting finish failed");
            return abandon(CycleStage::Report, Some(id));
        }

        tracing::info!(worker_id, task_id = %id, "task completed");
        CycleOutcome::Completed(id)
    }
}

fn abandon(stage: CycleStage, task_id: Option<TaskId>) -> CycleOutcome {
    CycleOutcome::Abandoned { stage, task_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskState;
    use crate::error::SwatchError;
    use crate::impls::InMemoryBlobStore;
    use crate::ports::TaskStore;
    use crate::store::InMemoryTaskStore;

    struct Reverse;

    impl ImageTransform for Reverse {
        fn apply(&self, input: &[u8]) -> Result<Vec<u8>, SwatchError> {
            if input.is_empty() {
                return Err(SwatchError::MalformedInput("empty image".to_string()));
            }
            Ok(input.iter().rev().copied().collect())
        }
    }

    struct Fixture {
        store: Arc<InMemoryTaskStore>,
        blobs: Arc<InMemoryBlobStore>,
        deps: WorkerDeps,
    }

    fn fixture(poll_interval: Duration) -> Fixture {
        let store = Arc::new(InMemoryTaskStore::default());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let channel = Arc::new(RendezvousChannel::new());
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            blobs.clone(),
            channel.clone(),
        ));
        let deps = WorkerDeps {
            orchestrator,
            blobs: blobs.clone(),
            transform: Arc::new(Reverse),
            channel,
            poll_interval,
        };
        Fixture { store, blobs, deps }
    }

    async fn wait_until_ready(orch: &Orchestrator, id: TaskId) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !orch.query_ready(id).await.unwrap() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("task never finished");
    }

    #[tokio::test]
    async fn idle_when_nothing_pending() {
        let fx = fixture(Duration::from_secs(1));
        let worker = WorkerLoop::new(0, fx.deps);
        assert_eq!(worker.run_cycle().await, CycleOutcome::Idle);
    }

    #[tokio::test]
    async fn cycle_transforms_and_reports() {
        let fx = fixture(Duration::from_secs(1));
        let id = fx.deps.orchestrator.submit_new_task(vec![1, 2, 3]).await.unwrap();

        let worker = WorkerLoop::new(0, fx.deps.clone());
        assert_eq!(worker.run_cycle().await, CycleOutcome::Completed(id));

        assert_eq!(
            fx.blobs.get(id, BlobPhase::Finished).await.unwrap(),
            vec![3, 2, 1]
        );
        assert!(fx.deps.orchestrator.query_ready(id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_input_abandons_and_keeps_assignment() {
        let fx = fixture(Duration::from_secs(1));
        let id = fx.store.create_task().await;

        let worker = WorkerLoop::new(0, fx.deps.clone());
        assert_eq!(
            worker.run_cycle().await,
            CycleOutcome::Abandoned {
                stage: CycleStage::FetchInput,
                task_id: Some(id)
            }
        );
        assert_eq!(fx.store.get_task(id).await.unwrap().state, TaskState::Assigned);
    }

    #[tokio::test]
    async fn transform_failure_writes_nothing() {
        let fx = fixture(Duration::from_secs(1));
        let id = fx.deps.orchestrator.submit_new_task(Vec::new()).await.unwrap();

        let worker = WorkerLoop::new(0, fx.deps.clone());
        assert!(matches!(
            worker.run_cycle().await,
            CycleOutcome::Abandoned {
                stage: CycleStage::Transform,
                ..
            }
        ));
        assert!(!fx.blobs.contains(id, BlobPhase::Finished).await);
    }

    struct Panicking;

    impl ImageTransform for Panicking {
        fn apply(&self, _: &[u8]) -> Result<Vec<u8>, SwatchError> {
            panic!("decoder blew up");
        }
    }

    #[tokio::test]
    async fn transform_panic_abandons_the_cycle() {
        let mut fx = fixture(Duration::from_secs(1));
        fx.deps.transform = Arc::new(Panicking);
        let id = fx.deps.orchestrator.submit_new_task(vec![1]).await.unwrap();

        let worker = WorkerLoop::new(0, fx.deps.clone());
        assert_eq!(
            worker.run_cycle().await,
            CycleOutcome::Abandoned {
                stage: CycleStage::Transform,
                task_id: Some(id)
            }
        );
        assert_eq!(fx.store.get_task(id).await.unwrap().state, TaskState::Assigned);
    }

    /// Sleeps on the calling thread and records when each call started.
    struct Slow {
        started: std::sync::Mutex<Vec<std::time::Instant>>,
    }

    impl ImageTransform for Slow {
        fn apply(&self, input: &[u8]) -> Result<Vec<u8>, SwatchError> {
            if let Ok(mut started) = self.started.lock() {
                started.push(std::time::Instant::now());
            }
            std::thread::sleep(Duration::from_millis(300));
            Ok(input.to_vec())
        }
    }

    #[tokio::test]
    async fn slow_transforms_do_not_serialize_cycles() {
        let mut fx = fixture(Duration::from_millis(10));
        let slow = Arc::new(Slow {
            started: std::sync::Mutex::new(Vec::new()),
        });
        fx.deps.transform = slow.clone();
        let a = fx.deps.orchestrator.submit_new_task(vec![1]).await.unwrap();
        let b = fx.deps.orchestrator.submit_new_task(vec![2]).await.unwrap();

        // single-threaded runtime: the second cycle only starts if the first
        // one's transform is not holding the scheduler thread
        let worker = WorkerLoop::new(0, fx.deps.clone());
        let (first, second) = tokio::join!(worker.run_cycle(), worker.run_cycle());
        assert!(matches!(first, CycleOutcome::Completed(id) if id == a || id == b));
        assert!(matches!(second, CycleOutcome::Completed(id) if id == a || id == b));
        assert_ne!(first, second);

        let started = slow.started.lock().unwrap().clone();
        assert_eq!(started.len(), 2);
        let gap = started[1].duration_since(started[0]);
        assert!(gap < Duration::from_millis(100), "transforms ran back to back: {gap:?}");
    }

    #[tokio::test]
    async fn loop_keeps_ticking_while_a_transform_runs() {
        let mut fx = fixture(Duration::from_millis(10));
        let slow = Arc::new(Slow {
            started: std::sync::Mutex::new(Vec::new()),
        });
        fx.deps.transform = slow.clone();
        let a = fx.deps.orchestrator.submit_new_task(vec![1]).await.unwrap();
        let b = fx.deps.orchestrator.submit_new_task(vec![2]).await.unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Arc::new(WorkerLoop::new(0, fx.deps.clone()));
        let join = tokio::spawn(worker.run(shutdown_rx));

        wait_until_ready(&fx.deps.orchestrator, a).await;
        wait_until_ready(&fx.deps.orchestrator, b).await;
        shutdown_tx.send(true).unwrap();
        join.await.unwrap();

        let started = slow.started.lock().unwrap().clone();
        let gap = started[1].duration_since(started[0]);
        assert!(gap < Duration::from_millis(100), "transforms ran back to back: {gap:?}");
    }

    /// Finishes the task behind the worker's back as soon as output lands.
    struct FinishingBlobStore {
        inner: InMemoryBlobStore,
        store: Arc<InMemoryTaskStore>,
    }

    #[async_trait::async_trait]
    impl BlobStore for FinishingBlobStore {
        async fn put(&self, id: TaskId, phase: BlobPhase, bytes: Vec<u8>) -> Result<(), SwatchError> {
            self.inner.put(id, phase, bytes).await?;
            if phase == BlobPhase::Finished {
                self.store.force_set(id, TaskState::Finished).await?;
            }
            Ok(())
        }

        async fn get(&self, id: TaskId, phase: BlobPhase) -> Result<Vec<u8>, SwatchError> {
            self.inner.get(id, phase).await
        }
    }

    #[tokio::test]
    async fn report_failure_is_abandoned_after_output_written() {
        let store = Arc::new(InMemoryTaskStore::default());
        let blobs = Arc::new(FinishingBlobStore {
            inner: InMemoryBlobStore::new(),
            store: store.clone(),
        });
        let channel = Arc::new(RendezvousChannel::new());
        let orchestrator = Arc::new(Orchestrator::new(store.clone(), blobs.clone(), channel.clone()));
        let worker = WorkerLoop::new(
            0,
            WorkerDeps {
                orchestrator: orchestrator.clone(),
                blobs: blobs.clone(),
                transform: Arc::new(Reverse),
                channel,
                poll_interval: Duration::from_secs(1),
            },
        );

        let id = orchestrator.submit_new_task(vec![5, 6]).await.unwrap();
        assert_eq!(
            worker.run_cycle().await,
            CycleOutcome::Abandoned {
                stage: CycleStage::Report,
                task_id: Some(id)
            }
        );
        assert_eq!(blobs.get(id, BlobPhase::Finished).await.unwrap(), vec![6, 5]);
    }

    #[tokio::test]
    async fn loop_wakes_on_notification() {
        // poll interval far beyond the test timeout: only the push path can work
        let fx = fixture(Duration::from_secs(3600));
        let worker = Arc::new(WorkerLoop::new(0, fx.deps.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(worker.run(shutdown_rx));

        let id = fx.deps.orchestrator.submit_new_task(vec![4, 2]).await.unwrap();
        wait_until_ready(&fx.deps.orchestrator, id).await;

        shutdown_tx.send(true).unwrap();
        join.await.unwrap();
    }

    #[tokio::test]
    async fn loop_polls_without_notification() {
        let fx = fixture(Duration::from_millis(20));
        // a task that never produced a notification
        let id = fx.store.create_task().await;
        fx.blobs.put(id, BlobPhase::Working, vec![8, 9]).await.unwrap();

        let worker = Arc::new(WorkerLoop::new(1, fx.deps.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(worker.run(shutdown_rx));

        wait_until_ready(&fx.deps.orchestrator, id).await;
        assert_eq!(fx.blobs.get(id, BlobPhase::Finished).await.unwrap(), vec![9, 8]);

        drop(shutdown_tx);
        join.await.unwrap();
    }
}
