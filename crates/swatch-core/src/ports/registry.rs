//! Registry port - サービスディスカバリ用の key-value
//!
//! コンポーネント同士が互いのアドレスを見つけるためだけに使います。

use async_trait::async_trait;

use crate::error::SwatchError;

/// Well-known discovery keys.
pub mod keys {
    pub const MASTER_ADDRESS: &str = "masterAddress";
    pub const STORAGE_ADDRESS: &str = "storageAddress";
}

#[async_trait]
pub trait Registry: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SwatchError>;

    /// Empty keys and empty values are rejected with `MalformedInput`.
    async fn set(&self, key: &str, value: &str) -> Result<(), SwatchError>;

    async fn remove(&self, key: &str) -> Result<(), SwatchError>;

    /// All entries, sorted by key.
    async fn list(&self) -> Result<Vec<(String, String)>, SwatchError>;

    /// Look up a key another component must have published.
    ///
    /// A missing or empty value means that component is not reachable yet.
    async fn require(&self, key: &str) -> Result<String, SwatchError> {
        match self.get(key).await? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(SwatchError::UpstreamUnavailable(format!(
                "registry has no value for {key:?}"
            ))),
        }
    }
}
