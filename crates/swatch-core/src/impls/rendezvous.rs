//! RendezvousChannel - バッファなしの通知チャネル
//!
//! # 学習ポイント
//! - tokio には容量 0 の mpsc が無いので、oneshot の ack で「読まれるまで待つ」を作る
//! - `mpsc::Receiver::recv` は cancel safe なので timeout と組み合わせても取りこぼさない
//! - 複数ワーカーで 1 つの Receiver を共有する（Mutex）

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::domain::TaskId;
use crate::error::SwatchError;
use crate::ports::Notifier;

type Signal = (TaskId, oneshot::Sender<()>);

/// Single-slot hand-off from the orchestrator to worker loops.
///
/// - `notify` returns only after some worker has taken the id out of `pop`.
/// - A second `notify` waits until another `pop` happens; nothing queues up
///   beyond the one slot in transit.
/// - `pop` waits at most `timeout` and returns `None` if nobody wrote.
pub struct RendezvousChannel {
    tx: mpsc::Sender<Signal>,
    rx: Mutex<mpsc::Receiver<Signal>>,
}

impl RendezvousChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Wait for a signal or for `timeout`, whichever comes first.
    pub async fn pop(&self, timeout: Duration) -> Result<Option<TaskId>, SwatchError> {
        let received = tokio::time::timeout(timeout, async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        })
        .await;

        match received {
            Err(_elapsed) => Ok(None),
            Ok(None) => Err(SwatchError::UpstreamUnavailable(
                "notification channel closed".to_string(),
            )),
            Ok(Some((id, ack))) => {
                // the writer may have given up; the id is still ours
                let _ = ack.send(());
                Ok(Some(id))
            }
        }
    }
}

impl Default for RendezvousChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RendezvousChannel {
    async fn notify(&self, id: TaskId) -> Result<(), SwatchError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send((id, ack_tx))
            .await
            .map_err(|e| SwatchError::upstream("notification send", e))?;
        ack_rx
            .await
            .map_err(|e| SwatchError::upstream("notification ack", e))
    }
}
