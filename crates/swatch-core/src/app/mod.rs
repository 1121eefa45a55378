//! App - アプリケーション層
//!
//! ports を組み合わせてパイプラインの振る舞いを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: ストア・通知チャネル・協力者のワイヤリング
//! - **Orchestrator**: submit / request / report / query の窓口
//! - **WorkerLoop**: 通知 or poll で起きて 1 サイクル実行
//! - **WorkerGroup**: 複数の WorkerLoop の起動と停止
//! - **requests**: 外部入力（id, phase, force-set body）のパース
//! - **StatusReport**: 状態ごとの件数とタスク一覧

pub mod builder;
pub mod orchestrator;
pub mod requests;
pub mod status;
pub mod worker_group;
pub mod worker_loop;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::orchestrator::Orchestrator;
pub use self::requests::{ForceSetRequest, parse_phase, parse_task_id};
pub use self::status::StatusReport;
pub use self::worker_group::WorkerGroup;
pub use self::worker_loop::{CycleOutcome, CycleStage, WorkerDeps, WorkerLoop};
