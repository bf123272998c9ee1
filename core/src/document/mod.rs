//! The editable mapfile document.
//!
//! A [`Document`] owns the engine's [`MapObj`] for one editing session and
//! is the only thing that mutates it. Alongside the map it keeps the
//! editor-side views the UI works with:
//!
//! - [`Layer`] views, one per engine layer, in the same order
//! - [`OutputFormat`] values, one per engine output format
//! - config options and web metadata as ordered [`KeyValues`]
//!
//! Every structural operation updates the map and the matching view
//! collection in the same call, so the two never disagree between calls.
//!
//! # States
//!
//! A document is either *unloaded* (no map; getters return sentinels and
//! setters do nothing) or *loaded*. [`load`](Document::load) with an empty
//! path creates a blank map with no backing file; such a document
//! [`is_new`](Document::is_new) until it is saved under a name.
//!
//! # Setters
//!
//! Scalar setters return `true` only when the stored value actually
//! changed. Setting the current value again touches nothing, which keeps
//! spurious entries out of the undo history.

mod layers;
mod output_formats;

use std::fmt;
use std::path::{Path, PathBuf};

use mapedit_engine::{Color, HashTable, MapEngine, MapObj, QueryMap, Rect, Units};

use crate::config::EditorConfig;
use crate::error::{DocError, DocResult};
use crate::keyvalue::{self, KeyValues};
use crate::layer::Layer;
use crate::output_format::OutputFormat;
use crate::undo::{Editable, UndoStack};

pub struct Document {
    engine: Box<dyn MapEngine>,
    config: EditorConfig,
    map: Option<MapObj>,
    /// Backing file. Empty for a document that has never been saved.
    path: PathBuf,
    layers: Vec<Layer>,
    output_formats: Vec<OutputFormat>,
    config_options: KeyValues,
    metadata: KeyValues,
    /// Encoded bytes of the last successful render.
    image: Option<Vec<u8>>,
    mutations: u64,
}

impl Editable for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("loaded", &self.map.is_some())
            .field("layers", &self.layers.len())
            .field("output_formats", &self.output_formats.len())
            .field("mutations", &self.mutations)
            .finish()
    }
}

/// Reads a table for the editor, with lower-cased keys.
fn normalized(table: &HashTable) -> KeyValues {
    keyvalue::populate(table)
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect()
}

impl Document {
    /// Creates an unloaded document with the default editor settings.
    pub fn new(engine: impl MapEngine) -> Self {
        Self::with_config(engine, EditorConfig::default())
    }

    pub fn with_config(engine: impl MapEngine, config: EditorConfig) -> Self {
        Self {
            engine: Box::new(engine),
            config,
            map: None,
            path: PathBuf::new(),
            layers: Vec::new(),
            output_formats: Vec::new(),
            config_options: KeyValues::new(),
            metadata: KeyValues::new(),
            image: None,
            mutations: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// An empty undo history sized by the editor settings.
    pub fn new_undo_stack(&self) -> UndoStack<Document> {
        UndoStack::new(self.config.history.max_undo)
    }

    // --- Lifecycle ---

    /// Replaces the current map.
    ///
    /// An empty `path` creates a blank map. Otherwise the file is parsed by
    /// the engine. The previous map is released first, so a failed load
    /// leaves the document unloaded.
    pub fn load(&mut self, path: &Path) -> DocResult {
        self.close();

        if path.as_os_str().is_empty() {
            let map = self.engine.init_blank();
            self.install(map, PathBuf::new());
            log::info!("Created blank document");
            return Ok(());
        }

        match self.engine.parse(path) {
            Ok(map) => {
                self.install(map, path.to_path_buf());
                log::info!(
                    "Loaded {} ({} layers, {} output formats)",
                    path.display(),
                    self.layers.len(),
                    self.output_formats.len()
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load {}: {e}", path.display());
                Err(DocError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn install(&mut self, map: MapObj, path: PathBuf) {
        self.layers = map.layers().iter().map(Layer::from_obj).collect();
        self.output_formats = map
            .output_formats()
            .iter()
            .map(OutputFormat::from_obj)
            .collect();
        self.config_options = normalized(&map.configoptions);
        self.metadata = normalized(&map.web.metadata);
        self.map = Some(map);
        self.path = path;
    }

    /// Releases the map and every view of it. The document becomes unloaded.
    pub fn close(&mut self) {
        self.image = None;
        self.map = None;
        self.layers.clear();
        self.output_formats.clear();
        self.config_options.clear();
        self.metadata.clear();
        self.path = PathBuf::new();
    }

    /// Writes the map through the engine.
    ///
    /// An empty `path` means the backing file; a new document has none and
    /// fails with [`DocError::NoTargetPath`]. In-memory state is never
    /// changed, not even the backing path (see [`save_as`](Self::save_as)).
    pub fn save(&self, path: &Path) -> DocResult {
        let map = self.map.as_ref().ok_or(DocError::NotLoaded)?;
        let target = if path.as_os_str().is_empty() {
            if self.path.as_os_str().is_empty() {
                return Err(DocError::NoTargetPath);
            }
            self.path.as_path()
        } else {
            path
        };

        self.engine.serialize(map, target).map_err(|e| {
            log::warn!("Failed to save {}: {e}", target.display());
            DocError::WriteFailed {
                path: target.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        log::info!("Saved {}", target.display());
        Ok(())
    }

    /// Saves to `path` and makes it the backing file.
    pub fn save_as(&mut self, path: &Path) -> DocResult {
        if path.as_os_str().is_empty() {
            return Err(DocError::NoTargetPath);
        }
        self.save(path)?;
        self.path = path.to_path_buf();
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.map.is_some()
    }

    /// `true` for a loaded document without a backing file.
    pub fn is_new(&self) -> bool {
        self.map.is_some() && self.path.as_os_str().is_empty()
    }

    /// Backing file; empty for a new or unloaded document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of effective mutations applied through this document.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// The engine's map, for read-only inspection.
    pub fn map(&self) -> Option<&MapObj> {
        self.map.as_ref()
    }

    // --- Scalars ---

    fn set_field<V: PartialEq>(
        &mut self,
        attr: &str,
        value: V,
        field: impl FnOnce(&mut MapObj) -> &mut V,
    ) -> bool {
        let Some(map) = self.map.as_mut() else {
            log::debug!("Ignoring {attr} change: no document loaded");
            return false;
        };
        let slot = field(map);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.mutations += 1;
        true
    }

    pub fn name(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.name)
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        self.set_field("name", name.to_owned(), |m| &mut m.name)
    }

    pub fn status(&self) -> bool {
        self.map.as_ref().is_some_and(|m| m.status)
    }

    pub fn set_status(&mut self, status: bool) -> bool {
        self.set_field("status", status, |m| &mut m.status)
    }

    pub fn width(&self) -> i32 {
        self.map.as_ref().map_or(-1, |m| m.width)
    }

    pub fn set_width(&mut self, width: i32) -> bool {
        self.set_field("width", width, |m| &mut m.width)
    }

    pub fn height(&self) -> i32 {
        self.map.as_ref().map_or(-1, |m| m.height)
    }

    pub fn set_height(&mut self, height: i32) -> bool {
        self.set_field("height", height, |m| &mut m.height)
    }

    /// Largest image dimension the engine will render.
    pub fn maxsize(&self) -> i32 {
        self.map.as_ref().map_or(-1, |m| m.maxsize)
    }

    pub fn set_maxsize(&mut self, maxsize: i32) -> bool {
        self.set_field("maxsize", maxsize, |m| &mut m.maxsize)
    }

    pub fn units(&self) -> Option<Units> {
        self.map.as_ref().map(|m| m.units)
    }

    pub fn set_units(&mut self, units: Units) -> bool {
        self.set_field("units", units, |m| &mut m.units)
    }

    /// Name of the default output format.
    pub fn imagetype(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.imagetype)
    }

    pub fn set_imagetype(&mut self, imagetype: &str) -> bool {
        self.set_field("imagetype", imagetype.to_owned(), |m| &mut m.imagetype)
    }

    pub fn projection(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.projection)
    }

    pub fn set_projection(&mut self, projection: &str) -> bool {
        self.set_field("projection", projection.to_owned(), |m| {
            &mut m.projection
        })
    }

    pub fn extent(&self) -> Rect {
        self.map.as_ref().map_or(Rect::UNSET, |m| m.extent)
    }

    pub fn set_extent(&mut self, extent: Rect) -> bool {
        self.set_field("extent", extent, |m| &mut m.extent)
    }

    pub fn resolution(&self) -> f64 {
        self.map.as_ref().map_or(-1.0, |m| m.resolution)
    }

    pub fn set_resolution(&mut self, resolution: f64) -> bool {
        self.set_field("resolution", resolution, |m| &mut m.resolution)
    }

    pub fn defresolution(&self) -> f64 {
        self.map.as_ref().map_or(-1.0, |m| m.defresolution)
    }

    pub fn set_defresolution(&mut self, defresolution: f64) -> bool {
        self.set_field("defresolution", defresolution, |m| {
            &mut m.defresolution
        })
    }

    pub fn rotation_angle(&self) -> f64 {
        self.map.as_ref().map_or(0.0, |m| m.rotation_angle)
    }

    pub fn set_rotation_angle(&mut self, angle: f64) -> bool {
        self.set_field("rotation angle", angle, |m| &mut m.rotation_angle)
    }

    /// Background color, or `None` when the map leaves it unset.
    pub fn image_color(&self) -> Option<Color> {
        self.map
            .as_ref()
            .map(|m| m.imagecolor)
            .filter(|c| *c != Color::UNSET)
    }

    /// Sets the background color. `None` clears it.
    pub fn set_image_color(&mut self, color: Option<Color>) -> bool {
        self.set_field("image color", color.unwrap_or(Color::UNSET), |m| {
            &mut m.imagecolor
        })
    }

    pub fn shapepath(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.shapepath)
    }

    pub fn set_shapepath(&mut self, shapepath: &str) -> bool {
        self.set_field("shapepath", shapepath.to_owned(), |m| &mut m.shapepath)
    }

    pub fn symbolset(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.symbolset)
    }

    pub fn set_symbolset(&mut self, symbolset: &str) -> bool {
        self.set_field("symbolset", symbolset.to_owned(), |m| &mut m.symbolset)
    }

    pub fn fontset(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.fontset)
    }

    pub fn set_fontset(&mut self, fontset: &str) -> bool {
        self.set_field("fontset", fontset.to_owned(), |m| &mut m.fontset)
    }

    pub fn template_pattern(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.templatepattern)
    }

    pub fn set_template_pattern(&mut self, pattern: &str) -> bool {
        self.set_field("template pattern", pattern.to_owned(), |m| {
            &mut m.templatepattern
        })
    }

    pub fn data_pattern(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.datapattern)
    }

    pub fn set_data_pattern(&mut self, pattern: &str) -> bool {
        self.set_field("data pattern", pattern.to_owned(), |m| {
            &mut m.datapattern
        })
    }

    pub fn debug(&self) -> i32 {
        self.map.as_ref().map_or(0, |m| m.debug)
    }

    pub fn set_debug(&mut self, debug: i32) -> bool {
        self.set_field("debug", debug, |m| &mut m.debug)
    }

    /// Directory the map was parsed from, as reported by the engine.
    pub fn mappath(&self) -> &str {
        self.map.as_ref().map_or("", |m| &m.mappath)
    }

    // --- Config options and metadata ---

    pub fn config_options(&self) -> &KeyValues {
        &self.config_options
    }

    pub fn config_option(&self, key: &str) -> Option<&str> {
        self.config_options
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set_config_option(&mut self, key: &str, value: &str) -> bool {
        let key = key.to_ascii_lowercase();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !keyvalue::set(&mut map.configoptions, &key, value) {
            return false;
        }
        self.config_options.insert(key, value.to_owned());
        self.mutations += 1;
        true
    }

    pub fn remove_config_option(&mut self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !keyvalue::remove(&mut map.configoptions, &key) {
            return false;
        }
        self.config_options.shift_remove(&key);
        self.mutations += 1;
        true
    }

    /// Web metadata (`wms_title`, `ows_onlineresource`, ...).
    pub fn metadata(&self) -> &KeyValues {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set_metadata(&mut self, key: &str, value: &str) -> bool {
        let key = key.to_ascii_lowercase();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !keyvalue::set(&mut map.web.metadata, &key, value) {
            return false;
        }
        self.metadata.insert(key, value.to_owned());
        self.mutations += 1;
        true
    }

    pub fn remove_metadata(&mut self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !keyvalue::remove(&mut map.web.metadata, &key) {
            return false;
        }
        self.metadata.shift_remove(&key);
        self.mutations += 1;
        true
    }

    // --- Rendering ---

    /// Renders a preview of the current map and returns the encoded image.
    ///
    /// With `width` and `height` both positive the preview takes that size
    /// instead of the map's own. The map's extent is restored afterwards
    /// whatever the engine did to it. The returned bytes stay valid until
    /// the next render or until the document is closed.
    pub fn render_image(&mut self, width: i32, height: i32) -> Option<&[u8]> {
        self.image = None;
        let format = self.render_format();
        let map = self.map.as_mut()?;

        let use_query_size = width > 0 && height > 0;
        let saved_extent = map.extent;
        let saved_querymap = map.querymap;
        if use_query_size {
            map.querymap = QueryMap { width, height };
        }
        let rendered = self.engine.render(map, use_query_size);
        map.extent = saved_extent;
        map.querymap = saved_querymap;

        let image = match rendered {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Render failed: {e}");
                return None;
            }
        };
        match self.engine.encode(&image, &format) {
            Ok(bytes) => {
                log::info!(
                    "Rendered {}x{} preview ({} bytes, {format})",
                    image.width,
                    image.height,
                    bytes.len()
                );
                self.image = Some(bytes);
            }
            Err(e) => {
                log::warn!("Failed to encode preview as {format}: {e}");
                return None;
            }
        }
        self.image.as_deref()
    }

    /// Encoder for previews: the mime type of the map's image type if it
    /// names an output format, the image type itself otherwise, and the
    /// configured default when the map has none.
    fn render_format(&self) -> String {
        let Some(map) = self.map.as_ref() else {
            return self.config.render.format.clone();
        };
        if map.imagetype.is_empty() {
            return self.config.render.format.clone();
        }
        map.find_output_format_index_by_name(&map.imagetype)
            .and_then(|i| map.output_format(i))
            .map_or_else(|| map.imagetype.clone(), |of| of.mimetype.clone())
    }

    /// Bytes of the last successful render.
    pub fn rendered_image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn rendered_image_size(&self) -> usize {
        self.image.as_ref().map_or(0, Vec::len)
    }
}
