//! swatch-core
//!
//! Task coordination core for a small image pipeline: producers submit
//! images, workers pick them up, recolor them and report back.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, TaskState, Task, BlobPhase）
//! - **ports**: 抽象化レイヤー（TaskStore, BlobStore, Notifier, Registry, ImageTransform）
//! - **store**: InMemoryTaskStore（watermark スキャン + lease 期限切れ）
//! - **impls**: 実装（RendezvousChannel, LocalBlobStore, ChannelSwap など）
//! - **app**: アプリケーションロジック（builder, orchestrator, worker_loop, status）
//! - **config**: 設定（TOML + `SWATCH_*` 環境変数）
//! - **error**: エラー型

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod store;

pub use app::{App, AppBuilder, Orchestrator, WorkerGroup, WorkerLoop};
pub use config::SwatchConfig;
pub use domain::{BlobPhase, Task, TaskId, TaskState};
pub use error::{ErrorKind, SwatchError};
