use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
}

/// Somewhere a single state snapshot can be kept between sessions.
pub trait SnapshotStore<T> {
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<T>, Error>;

    fn save(&mut self, value: &T) -> Result<(), Error>;

    fn clear(&mut self) -> Result<(), Error>;
}

/// Keeps the snapshot as serialized JSON in memory, so a load always goes
/// through the same serde path a real store would.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshotStore {
    json: Option<String>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl<T: Serialize + DeserializeOwned> SnapshotStore<T> for MemorySnapshotStore {
    fn load(&self) -> Result<Option<T>, Error> {
        self.json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(Error::from)
    }

    fn save(&mut self, value: &T) -> Result<(), Error> {
        self.json = Some(serde_json::to_string(value)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.json = None;
        Ok(())
    }
}

/// Stores the snapshot as a JSON file. Writes go to a temporary file in the
/// same directory which is then renamed over the target.
#[derive(Clone, Debug)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl<T: Serialize + DeserializeOwned> SnapshotStore<T> for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<T>, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                log::error!("Error reading snapshot {:?}: {e:?}", self.path);
                return Err(e.into());
            }
        };

        let value = serde_json::from_slice(&bytes).inspect_err(|e| {
            log::error!("Error deserializing snapshot {:?}: {e:?}", self.path);
        })?;
        Ok(Some(value))
    }

    fn save(&mut self, value: &T) -> Result<(), Error> {
        let json = serde_json::to_vec(value)?;

        let directory = self.directory();
        std::fs::create_dir_all(directory)?;

        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(&json)?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|e| e.error)
            .inspect_err(|e| {
                log::error!("Error saving snapshot to {:?}: {e:?}", self.path);
            })?;

        log::debug!("Saved {} byte snapshot to {:?}", json.len(), self.path);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                log::warn!("Error removing snapshot {:?}: {e:?}", self.path);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemorySnapshotStore::new();
        let loaded: Option<BTreeMap<String, u32>> = store.load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let mut store = MemorySnapshotStore::new();
        let mut value = BTreeMap::new();
        value.insert("学".to_string(), 3u32);

        store.save(&value).unwrap();
        assert_eq!(store.raw(), Some(r#"{"学":3}"#));

        let loaded: Option<BTreeMap<String, u32>> = store.load().unwrap();
        assert_eq!(loaded, Some(value));

        SnapshotStore::<BTreeMap<String, u32>>::clear(&mut store).unwrap();
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_memory_store_wrong_shape_is_an_error() {
        let mut store = MemorySnapshotStore::new();
        store.save(&[1, 2, 3]).unwrap();
        let loaded: Result<Option<BTreeMap<String, u32>>, Error> = store.load();
        assert!(matches!(loaded, Err(Error::Json(_))));
    }
}
