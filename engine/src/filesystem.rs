use std::path::Path;

use crate::engine::MapEngine;
use crate::error::{EngineError, EngineResult};
use crate::map::MapObj;

/// Engine that keeps mapfiles on the native filesystem.
///
/// Documents are stored as TOML. Parent directories are created on save.
///
/// # Example
///
/// ```ignore
/// let mut doc = Document::new(FileEngine::new());
/// doc.load(Path::new("./maps/world.map"))?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEngine;

impl FileEngine {
    pub fn new() -> Self {
        Self
    }
}

impl MapEngine for FileEngine {
    fn parse(&self, path: &Path) -> EngineResult<MapObj> {
        let content = std::fs::read_to_string(path)?;
        let mut map: MapObj = toml::from_str(&content).map_err(|e| EngineError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        map.finish_load();
        map.mappath = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        log::debug!(
            "parsed {} ({} layers, {} output formats)",
            path.display(),
            map.num_layers(),
            map.num_output_formats()
        );
        Ok(map)
    }

    fn serialize(&self, map: &MapObj, path: &Path) -> EngineResult<()> {
        let content =
            toml::to_string_pretty(map).map_err(|e| EngineError::Serialize(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
