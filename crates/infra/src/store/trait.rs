use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failure on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not (de)serialize {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }
}

/// Persistent key-value store holding JSON documents.
///
/// `set_all` replaces a batch of keys; a backend either writes every entry or
/// reports an error before any reader can observe a partially written batch.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    fn set_all(&self, entries: Vec<(&'static str, JsonValue)>) -> Result<(), StoreError>;

    fn set(&self, key: &'static str, value: JsonValue) -> Result<(), StoreError> {
        self.set_all(vec![(key, value)])
    }
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(key)
    }

    fn set_all(&self, entries: Vec<(&'static str, JsonValue)>) -> Result<(), StoreError> {
        (**self).set_all(entries)
    }
}
