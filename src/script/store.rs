use super::snapshot::ScriptSnapshot;
use crate::error::{SnapshotError, StoreError};
use ahash::AHashMap;
use std::fs;
use std::path::PathBuf;

/// Where snapshots live between runs.
///
/// The resolver never reads from a store directly; a run is started from a
/// snapshot the caller loaded.
pub trait ScriptStore {
    fn load(&self, id: &str) -> Result<ScriptSnapshot, StoreError>;
    fn save(&mut self, id: &str, snapshot: &ScriptSnapshot) -> Result<(), StoreError>;
}

/// Keeps snapshots in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scripts: AHashMap<String, ScriptSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl ScriptStore for MemoryStore {
    fn load(&self, id: &str) -> Result<ScriptSnapshot, StoreError> {
        self.scripts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&mut self, id: &str, snapshot: &ScriptSnapshot) -> Result<(), StoreError> {
        check_id(id, snapshot)?;
        self.scripts.insert(id.to_string(), snapshot.clone());
        Ok(())
    }
}

/// Stores each snapshot as `<dir>/<hex of id>.script` in the bincode format.
///
/// The file name is the hex encoding of the id's bytes, so every id maps to
/// its own file whatever characters it contains.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates the store, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SnapshotError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    /// The file a script id is stored in.
    pub fn path_for(&self, id: &str) -> PathBuf {
        let file_name: String = id.bytes().map(|b| format!("{:02x}", b)).collect();
        self.dir.join(format!("{}.script", file_name))
    }
}

impl ScriptStore for FileStore {
    fn load(&self, id: &str) -> Result<ScriptSnapshot, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let snapshot = ScriptSnapshot::from_file(path)?;
        check_id(id, &snapshot)?;
        Ok(snapshot)
    }

    fn save(&mut self, id: &str, snapshot: &ScriptSnapshot) -> Result<(), StoreError> {
        check_id(id, snapshot)?;
        Ok(snapshot.save(self.path_for(id))?)
    }
}

/// A snapshot is always stored under its own id.
fn check_id(requested: &str, snapshot: &ScriptSnapshot) -> Result<(), StoreError> {
    if snapshot.id() != requested {
        return Err(StoreError::IdMismatch {
            requested: requested.to_string(),
            found: snapshot.id().to_string(),
        });
    }
    Ok(())
}
