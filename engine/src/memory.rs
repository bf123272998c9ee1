use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::engine::MapEngine;
use crate::error::{EngineError, EngineResult};
use crate::map::MapObj;

/// In-memory engine for tests and embedded documents.
///
/// Mapfiles live in a shared table keyed by path. Clones share the table,
/// so a test can keep a handle to inspect what a document saved.
///
/// # Example
///
/// ```ignore
/// let engine = MemoryEngine::new();
/// engine.insert("/maps/world.map", world);
///
/// let mut doc = Document::new(engine.clone());
/// doc.load(Path::new("/maps/world.map"))?;
/// ```
#[derive(Clone, Default)]
pub struct MemoryEngine {
    files: Arc<RwLock<HashMap<PathBuf, MapObj>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `map` at `path`, replacing whatever was there.
    pub fn insert(&self, path: impl Into<PathBuf>, map: MapObj) {
        self.files.write().insert(path.into(), map);
    }

    /// Copy of the map stored at `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<MapObj> {
        self.files.read().get(path.as_ref()).cloned()
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<MapObj> {
        self.files.write().remove(path.as_ref())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.read().contains_key(path.as_ref())
    }

    /// Makes every subsequent [`serialize`](MapEngine::serialize) fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl MapEngine for MemoryEngine {
    fn parse(&self, path: &Path) -> EngineResult<MapObj> {
        let mut map = self
            .get(path)
            .ok_or_else(|| EngineError::NotFound(path.display().to_string()))?;
        map.finish_load();
        map.mappath = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Ok(map)
    }

    fn serialize(&self, map: &MapObj, path: &Path) -> EngineResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(EngineError::Serialize(format!(
                "writes to {} are disabled",
                path.display()
            )));
        }
        self.insert(path, map.clone());
        Ok(())
    }
}
