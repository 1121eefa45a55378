//! Ports - 抽象化レイヤー
//!
//! コアが外部と話すための trait をここにまとめます。
//! 実装は `store`（TaskStore）と `impls`（それ以外）にあります。
//!
//! # 設計原則
//! - TaskStore が状態の正本（source of truth）
//! - Notifier は「仕事がある」というヒントを運ぶだけ（正しさは polling が保証）
//! - BlobStore / Registry / ImageTransform は外部協力者

pub mod blob_store;
pub mod notifier;
pub mod registry;
pub mod task_store;
pub mod transform;

// 主要な trait を再エクスポート
pub use self::blob_store::BlobStore;
pub use self::notifier::Notifier;
pub use self::registry::{Registry, keys};
pub use self::task_store::{StateCounts, TaskStore};
pub use self::transform::ImageTransform;
