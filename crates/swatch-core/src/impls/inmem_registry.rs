use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SwatchError;
use crate::ports::Registry;

/// Process-wide discovery map.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn get(&self, key: &str) -> Result<Option<String>, SwatchError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SwatchError> {
        if key.is_empty() {
            return Err(SwatchError::MalformedInput("registry key is empty".to_string()));
        }
        if value.is_empty() {
            return Err(SwatchError::MalformedInput(format!(
                "registry value for {key:?} is empty"
            )));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        tracing::info!(key, value, "registry entry saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SwatchError> {
        if key.is_empty() {
            return Err(SwatchError::MalformedInput("registry key is empty".to_string()));
        }
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, String)>, SwatchError> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        Ok(entries)
    }
}
