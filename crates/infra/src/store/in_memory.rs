use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::r#trait::{Store, StoreError};

/// In-memory store for tests/dev. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, JsonValue>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_all(&self, entries: Vec<(&'static str, JsonValue)>) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        Ok(())
    }
}
