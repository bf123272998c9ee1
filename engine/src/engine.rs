use std::path::Path;

use crate::error::EngineResult;
use crate::map::MapObj;
use crate::raster;

/// A rendered map, as raw RGBA8 pixels.
///
/// Owned by whoever called [`MapEngine::render`]; dropping it releases the
/// pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// The external mapping engine: persistence and rendering of [`MapObj`]s.
///
/// Implementations decide where documents live ([`MemoryEngine`] keeps them
/// in a shared table, [`FileEngine`] on disk). Rendering and encoding have
/// default implementations backed by the built-in software rasterizer.
///
/// Callers treat every `Err` as an opaque failure.
///
/// [`MemoryEngine`]: crate::MemoryEngine
/// [`FileEngine`]: crate::FileEngine
pub trait MapEngine: Send + Sync + 'static {
    /// Parses the mapfile at `path` into a fresh map.
    fn parse(&self, path: &Path) -> EngineResult<MapObj>;

    /// Writes `map` to `path` in the engine's mapfile format.
    fn serialize(&self, map: &MapObj, path: &Path) -> EngineResult<()>;

    /// A blank map with the engine's defaults.
    fn init_blank(&self) -> MapObj {
        MapObj::new()
    }

    /// Draws `map`.
    ///
    /// With `use_query_size` the image takes the size stored in
    /// [`MapObj::querymap`] instead of the map's own width and height.
    /// Drawing may adjust `map.extent` to the image's aspect ratio.
    fn render(&self, map: &mut MapObj, use_query_size: bool) -> EngineResult<RenderedImage> {
        raster::draw_map(map, use_query_size)
    }

    /// Encodes `image` with the named format (`"png"`, `"image/png"`, ...).
    fn encode(&self, image: &RenderedImage, format: &str) -> EngineResult<Vec<u8>> {
        raster::encode(image, format)
    }
}
