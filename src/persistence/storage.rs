//! Storage backends for snapshot payloads

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::core::error::PersistenceError;

/// Where snapshot payloads live. Implementations hold exactly one save slot.
pub trait SnapshotStorage {
    /// Read the stored payload, `None` when nothing has been saved
    fn read(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored payload
    fn write(&mut self, payload: &str) -> Result<(), PersistenceError>;
}

/// Save slot backed by a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::ReadFailure(e)),
        }
    }

    fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(PersistenceError::PersistenceWriteFailure)?;
        }

        // Write then rename so a crash mid-write never leaves a torn save
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(PersistenceError::PersistenceWriteFailure)?;
        std::fs::rename(&tmp, &self.path).map_err(PersistenceError::PersistenceWriteFailure)
    }
}

/// In-memory save slot. Clones share the slot, so a caller can keep a handle
/// to inspect what the simulation wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(payload.into()))),
        }
    }

    /// Current payload, if any
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        *self.slot.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("save.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("saves").join("slot.json"));

        storage.write(r#"{"coins":1}"#).unwrap();
        storage.write(r#"{"coins":2}"#).unwrap();

        assert_eq!(storage.read().unwrap().as_deref(), Some(r#"{"coins":2}"#));
        assert!(!dir.path().join("saves").join("slot.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_write_failure() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes the rename fail
        let target = dir.path().join("occupied");
        std::fs::create_dir_all(target.join("inner")).unwrap();
        let mut storage = FileStorage::new(&target);

        let err = storage.write("{}").unwrap_err();
        assert!(matches!(err, PersistenceError::PersistenceWriteFailure(_)));
    }

    #[test]
    fn test_memory_storage_clones_share_slot() {
        let handle = MemoryStorage::new();
        let mut writer = handle.clone();
        writer.write("{}").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("{}"));
    }
}
