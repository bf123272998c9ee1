//! Mapfile engine for the mapedit editor.
//!
//! This crate is the editor's view of the external mapping engine: the
//! in-memory object graph a mapfile is parsed into ([`MapObj`] and its
//! layer, output format and attribute tables), the structural primitives that
//! are the only sanctioned way to grow or shrink those tables, and the
//! [`MapEngine`] trait for persistence and preview rendering.
//!
//! # Engines
//!
//! - [`MemoryEngine`]: shared in-memory document table, for tests and
//!   embedded documents
//! - [`FileEngine`]: native filesystem, TOML-backed (requires the
//!   `filesystem` feature, enabled by default)
//!
//! Both render through the built-in software rasterizer and encode PNG.
//!
//! # Identity
//!
//! Layers are addressed by index inside the engine, and those indices move:
//! [`MapObj::remove_layer_at`] shifts every later layer down by one. Code
//! outside the engine should hold on to layer names and resolve them with
//! [`MapObj::find_layer_index`] at the point of use.

mod engine;
mod error;
#[cfg(feature = "filesystem")]
mod filesystem;
mod hashtable;
mod map;
mod memory;
pub mod raster;
mod types;

pub use engine::{MapEngine, RenderedImage};
pub use error::{EngineError, EngineResult};
#[cfg(feature = "filesystem")]
pub use filesystem::FileEngine;
pub use hashtable::HashTable;
pub use map::{
    DEFAULT_MAXSIZE, DEFAULT_RESOLUTION, DRIVERS, LayerObj, MAX_LAYERS, MapObj, OutputFormatObj,
    QueryMap, WebObj, supports_driver,
};
pub use memory::MemoryEngine;
pub use types::{Color, ImageMode, LayerStatus, LayerType, Rect, Units};
