use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map as JsonMap, Value as JsonValue};

use super::r#trait::{Store, StoreError};

/// Name of the single document holding every key.
pub const DOCUMENT_FILE: &str = "hemolink.json";

/// All keys live as fields of one pretty-printed `hemolink.json` document.
///
/// A batch is committed by writing the whole document to `hemolink.json.tmp`,
/// syncing it, and renaming it over the live file. The rename is the commit
/// point: a crash or error before it leaves the previous document intact,
/// and the temp file is removed on error.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Last committed document. Guarded by the same lock that serializes commits.
    committed: Mutex<JsonMap<String, JsonValue>>,
}

impl JsonFileStore {
    /// Open (and create if needed) the data directory and read the current document.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;

        let live = dir.join(DOCUMENT_FILE);
        let committed = match fs::read(&live) {
            Ok(raw) => match serde_json::from_slice::<JsonValue>(&raw)
                .map_err(|e| StoreError::serialization(DOCUMENT_FILE, e))?
            {
                JsonValue::Object(map) => map,
                _ => {
                    return Err(StoreError::io(
                        DOCUMENT_FILE,
                        std::io::Error::new(ErrorKind::InvalidData, "document is not a JSON object"),
                    ));
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => JsonMap::new(),
            Err(e) => return Err(StoreError::io(DOCUMENT_FILE, e)),
        };

        tracing::debug!(dir = %dir.display(), keys = committed.len(), "opened json file store");
        Ok(Self {
            dir,
            committed: Mutex::new(committed),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_document(&self, document: &JsonMap<String, JsonValue>) -> Result<(), StoreError> {
        let live = self.dir.join(DOCUMENT_FILE);
        let temp = live.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::serialization(DOCUMENT_FILE, e))?;

        let staged = fs::File::create(&temp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &live));
        if let Err(e) = staged {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::io(DOCUMENT_FILE, e));
        }

        // Make the rename itself durable.
        if let Ok(dir) = fs::File::open(&self.dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let committed = self.committed.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(committed.get(key).cloned())
    }

    fn set_all(&self, entries: Vec<(&'static str, JsonValue)>) -> Result<(), StoreError> {
        let mut committed = self.committed.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut next = committed.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value);
        }
        self.write_document(&next)?;

        *committed = next;
        Ok(())
    }
}
