//! JSON-lines file store.
//!
//! One serialized record per line, appended on `save` and parsed in file
//! order on `read_all`. A missing file reads as an empty store, so a fresh
//! path can be used without initialization.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::record::Record;
use crate::store::{BlockingStore, StoreError};

/// Append-only JSON-lines store.
///
/// Every operation performs real blocking file I/O, which makes this store
/// a natural collaborator for the bridge adapters: reads and saves must
/// stay off async runtime worker threads.
pub struct JsonlStore<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R> JsonlStore<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Creates a store backed by the given file path.
    ///
    /// The file is created lazily on the first save; parent directories
    /// are created along with it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R> BlockingStore for JsonlStore<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    type Record = R;

    fn read_all(&self) -> Result<Vec<R>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(line)?);
        }
        debug!(path = %self.path.display(), count = records.len(), "read store file");
        Ok(records)
    }

    fn save(&self, record: &R) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        trace!(record = %record.id(), "appended record");
        Ok(())
    }
}
