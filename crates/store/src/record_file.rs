//! JSON-file-backed record list
//!
//! Every store in this crate is a list of records persisted as one JSON
//! file, loaded on open and rewritten on each append. Concurrency is a
//! read-write lock around the in-memory list; the file write happens under
//! the write lock so the file always reflects a consistent snapshot.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::StoreError;

pub(crate) struct RecordFile<T> {
    path: PathBuf,
    records: RwLock<Vec<T>>,
}

impl<T: Serialize + DeserializeOwned + Clone> RecordFile<T> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        Ok(Self { path, records: RwLock::new(records) })
    }

    pub fn append(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write();
        records.push(record);
        self.persist(&records)
    }

    pub fn all(&self) -> Vec<T> {
        self.records.read().clone()
    }

    pub fn find<F: Fn(&T) -> bool>(&self, predicate: F) -> Option<T> {
        self.records.read().iter().find(|r| predicate(r)).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    fn persist(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(records)?)?;
        Ok(())
    }
}
