//! Notifier port - 「仕事がある」通知
//!
//! 通知は task_id だけを運びます。届かなくても正しさは壊れません
//! （ワーカーは polling で必ず拾う）。

use async_trait::async_trait;

use crate::domain::TaskId;
use crate::error::SwatchError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand `id` to an idle worker. May wait until one is listening.
    async fn notify(&self, id: TaskId) -> Result<(), SwatchError>;
}
