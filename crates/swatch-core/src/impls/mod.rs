//! Impls - ports の実装
//!
//! 1 プロセスでパイプライン全体を動かすための実装を置きます。
//!
//! # 含まれる実装
//! - **RendezvousChannel**: バッファなしの通知チャネル（Notifier）
//! - **InMemoryBlobStore / LocalBlobStore**: BlobStore
//! - **InMemoryRegistry**: Registry
//! - **ChannelSwap**: 赤と緑を入れ替える ImageTransform

pub mod channel_swap;
pub mod fs_blob;
pub mod inmem_blob;
pub mod inmem_registry;
pub mod rendezvous;

// 主要な型を再エクスポート
pub use self::channel_swap::ChannelSwap;
pub use self::fs_blob::LocalBlobStore;
pub use self::inmem_blob::InMemoryBlobStore;
pub use self::inmem_registry::InMemoryRegistry;
pub use self::rendezvous::RendezvousChannel;
