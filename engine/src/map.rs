//! The engine's in-memory mapfile object graph.
//!
//! [`MapObj`] is what the engine parses a mapfile into and what it renders
//! and serializes. Scalar fields are public, as they are in the engine's own
//! structures. The layer and output format tables are not: they may only be
//! grown, shrunk and searched through the structural primitives defined here,
//! because removing an entry renumbers every entry after it.

use serde::{Deserialize, Serialize};

use crate::hashtable::HashTable;
use crate::types::{Color, ImageMode, LayerStatus, LayerType, Rect, Units};

/// Upper bound on the layer table; [`MapObj::grow_layer_slot`] fails past it.
pub const MAX_LAYERS: usize = 10_000;

/// Default for [`MapObj::maxsize`].
pub const DEFAULT_MAXSIZE: i32 = 4096;

/// Default for [`MapObj::resolution`] and [`MapObj::defresolution`].
pub const DEFAULT_RESOLUTION: f64 = 72.0;

/// Drivers the engine can create output formats for. `GDAL` and `OGR`
/// must be qualified with a sub-driver (`GDAL/GTiff`).
pub const DRIVERS: [&str; 7] = [
    "AGG/PNG", "AGG/JPEG", "GD/GIF", "GD/PNG", "TEMPLATE", "GDAL", "OGR",
];

/// Web interface settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebObj {
    pub metadata: HashTable,
}

/// Size override used when rendering a preview.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryMap {
    pub width: i32,
    pub height: i32,
}

/// One layer of a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerObj {
    pub name: String,
    /// Position in the owning map's layer table. Rewritten by the map on
    /// every structural change.
    #[serde(skip)]
    pub index: usize,
    pub status: LayerStatus,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub data: String,
    pub opacity: i32,
    pub mask: String,
    pub group: String,
    pub requires: String,
    pub projection: String,
    pub filter: String,
    pub minscaledenom: f64,
    pub maxscaledenom: f64,
    pub geomtransform: String,
    pub tolerance: f64,
    pub toleranceunits: Units,
    pub maxfeatures: i32,
    pub template: String,
    pub header: String,
    pub footer: String,
    pub labelitem: String,
    pub labelminscaledenom: f64,
    pub labelmaxscaledenom: f64,
    pub labelangleitem: String,
    pub labelsizeitem: String,
    pub labelcache: bool,
    pub postlabelcache: bool,
    pub labelrequires: String,
    pub debug: i32,
    pub extent: Rect,
    pub metadata: HashTable,
}

impl Default for LayerObj {
    fn default() -> Self {
        Self {
            name: String::new(),
            index: 0,
            status: LayerStatus::On,
            layer_type: LayerType::Point,
            data: String::new(),
            opacity: 100,
            mask: String::new(),
            group: String::new(),
            requires: String::new(),
            projection: String::new(),
            extent: Rect::UNSET,
            filter: String::new(),
            minscaledenom: -1.0,
            maxscaledenom: -1.0,
            geomtransform: String::new(),
            tolerance: 3.0,
            toleranceunits: Units::Pixels,
            maxfeatures: -1,
            template: String::new(),
            header: String::new(),
            footer: String::new(),
            labelitem: String::new(),
            labelminscaledenom: -1.0,
            labelmaxscaledenom: -1.0,
            labelangleitem: String::new(),
            labelsizeitem: String::new(),
            labelcache: true,
            postlabelcache: false,
            labelrequires: String::new(),
            debug: 0,
            metadata: HashTable::new(),
        }
    }
}

/// One output format declared by (or created for) a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFormatObj {
    pub name: String,
    pub mimetype: String,
    /// Fully qualified driver, e.g. `AGG/PNG` or `GDAL/GTiff`.
    pub driver: String,
    pub extension: String,
    pub imagemode: ImageMode,
    pub transparent: bool,
    /// Whether the format is written back when the map is saved.
    pub inmapfile: bool,
    formatoptions: Vec<String>,
}

impl Default for OutputFormatObj {
    fn default() -> Self {
        Self {
            name: String::new(),
            mimetype: String::new(),
            driver: String::new(),
            extension: String::new(),
            imagemode: ImageMode::Default,
            transparent: false,
            inmapfile: true,
            formatoptions: Vec::new(),
        }
    }
}

impl OutputFormatObj {
    /// Raw `KEY=VALUE` option strings.
    pub fn options(&self) -> &[String] {
        &self.formatoptions
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.formatoptions.iter().find_map(|opt| {
            let (k, v) = opt.split_once('=')?;
            k.eq_ignore_ascii_case(key).then_some(v)
        })
    }

    /// Sets `key` to `value`, replacing an existing option with that key.
    pub fn set_option(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        let existing = self.formatoptions.iter_mut().find(|opt| {
            opt.split_once('=')
                .is_some_and(|(k, _)| k.eq_ignore_ascii_case(key))
        });
        match existing {
            Some(opt) => *opt = entry,
            None => self.formatoptions.push(entry),
        }
    }

    /// Keeps only the raw option strings for which `keep` returns `true`.
    pub fn retain_options(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.formatoptions.retain(|opt| keep(opt));
    }
}

/// Default mime type and extension for a driver, or `None` if the engine
/// cannot create formats for it.
fn driver_defaults(driver: &str) -> Option<(&'static str, &'static str, ImageMode)> {
    let upper = driver.to_ascii_uppercase();
    let defaults = match upper.as_str() {
        "AGG/PNG" => ("image/png", "png", ImageMode::Rgb),
        "AGG/JPEG" => ("image/jpeg", "jpg", ImageMode::Rgb),
        "GD/GIF" => ("image/gif", "gif", ImageMode::Pc256),
        "GD/PNG" => ("image/png", "png", ImageMode::Pc256),
        "TEMPLATE" => ("text/html", "html", ImageMode::Feature),
        _ if upper.starts_with("GDAL/") => ("application/octet-stream", "", ImageMode::Rgb),
        _ if upper.starts_with("OGR/") => ("application/octet-stream", "", ImageMode::Feature),
        _ => return None,
    };
    Some(defaults)
}

/// `true` if the engine can create output formats for `driver`.
pub fn supports_driver(driver: &str) -> bool {
    driver_defaults(driver).is_some()
}

/// A whole map: the root of the object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapObj {
    pub name: String,
    pub status: bool,
    pub width: i32,
    pub height: i32,
    pub maxsize: i32,
    pub units: Units,
    pub imagetype: String,
    pub projection: String,
    pub resolution: f64,
    pub defresolution: f64,
    pub rotation_angle: f64,
    pub shapepath: String,
    pub symbolset: String,
    pub fontset: String,
    pub templatepattern: String,
    pub datapattern: String,
    pub debug: i32,
    /// Directory of the file the map was parsed from. Set by the engine.
    #[serde(skip)]
    pub mappath: String,
    #[serde(skip)]
    pub querymap: QueryMap,
    layerorder: Vec<usize>,
    pub extent: Rect,
    pub imagecolor: Color,
    pub configoptions: HashTable,
    pub web: WebObj,
    layers: Vec<LayerObj>,
    outputformats: Vec<OutputFormatObj>,
}

impl Default for MapObj {
    fn default() -> Self {
        Self::new()
    }
}

impl MapObj {
    /// A blank map carrying the engine's defaults.
    pub fn new() -> Self {
        Self {
            name: "MS".into(),
            status: true,
            width: -1,
            height: -1,
            maxsize: DEFAULT_MAXSIZE,
            units: Units::Meters,
            imagetype: String::new(),
            projection: String::new(),
            extent: Rect::UNSET,
            resolution: DEFAULT_RESOLUTION,
            defresolution: DEFAULT_RESOLUTION,
            rotation_angle: 0.0,
            imagecolor: Color::UNSET,
            shapepath: String::new(),
            symbolset: String::new(),
            fontset: String::new(),
            templatepattern: String::new(),
            datapattern: String::new(),
            debug: 0,
            mappath: String::new(),
            configoptions: HashTable::new(),
            web: WebObj::default(),
            querymap: QueryMap::default(),
            layers: Vec::new(),
            layerorder: Vec::new(),
            outputformats: Vec::new(),
        }
    }

    /// Restores the derived bookkeeping (layer indices, draw order) after
    /// the map has been deserialized.
    pub(crate) fn finish_load(&mut self) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.index = i;
        }
        let n = self.layers.len();
        let order_is_valid = self.layerorder.len() == n && {
            let mut seen = vec![false; n];
            self.layerorder
                .iter()
                .all(|&i| i < n && !std::mem::replace(&mut seen[i], true))
        };
        if !order_is_valid {
            self.layerorder = (0..n).collect();
        }
    }

    // --- Layers ---

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[LayerObj] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerObj> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut LayerObj> {
        self.layers.get_mut(index)
    }

    /// Draw order as indices into the layer table.
    pub fn layer_order(&self) -> &[usize] {
        &self.layerorder
    }

    /// Index of the first layer named `name`.
    pub fn find_layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Appends an uninitialized slot to the layer table and returns its index.
    ///
    /// The slot is not part of the draw order until
    /// [`append_draw_order`](Self::append_draw_order) is called for it.
    pub fn grow_layer_slot(&mut self) -> Option<usize> {
        if self.layers.len() >= MAX_LAYERS {
            log::error!("layer table is full ({MAX_LAYERS} layers)");
            return None;
        }
        let index = self.layers.len();
        self.layers.push(LayerObj {
            index,
            ..LayerObj::default()
        });
        Some(index)
    }

    /// Resets the slot at `index` to the engine's layer defaults.
    ///
    /// The new layer inherits the map's debug level.
    pub fn init_layer_defaults(&mut self, index: usize) {
        let debug = self.debug;
        if let Some(layer) = self.layers.get_mut(index) {
            *layer = LayerObj {
                index,
                debug,
                ..LayerObj::default()
            };
        }
    }

    pub fn append_draw_order(&mut self, index: usize) {
        if index < self.layers.len() && !self.layerorder.contains(&index) {
            self.layerorder.push(index);
        }
    }

    /// Removes the layer at `index`, shifting every later layer down by one.
    pub fn remove_layer_at(&mut self, index: usize) -> Option<LayerObj> {
        if index >= self.layers.len() {
            return None;
        }
        let removed = self.layers.remove(index);
        for (i, layer) in self.layers.iter_mut().enumerate().skip(index) {
            layer.index = i;
        }
        self.layerorder.retain(|&i| i != index);
        for i in &mut self.layerorder {
            if *i > index {
                *i -= 1;
            }
        }
        Some(removed)
    }

    // --- Output formats ---

    pub fn num_output_formats(&self) -> usize {
        self.outputformats.len()
    }

    pub fn output_formats(&self) -> &[OutputFormatObj] {
        &self.outputformats
    }

    pub fn output_format(&self, index: usize) -> Option<&OutputFormatObj> {
        self.outputformats.get(index)
    }

    pub fn output_format_mut(&mut self, index: usize) -> Option<&mut OutputFormatObj> {
        self.outputformats.get_mut(index)
    }

    /// Index of the output format named `name` (case-insensitive).
    pub fn find_output_format_index_by_name(&self, name: &str) -> Option<usize> {
        self.outputformats
            .iter()
            .position(|of| of.name.eq_ignore_ascii_case(name))
    }

    /// Creates an output format with the driver's defaults and appends it.
    ///
    /// Returns `None` for drivers the engine does not know. Formats created
    /// this way start outside the mapfile (`inmapfile == false`).
    pub fn grow_output_format_slot(&mut self, driver: &str, name: &str) -> Option<usize> {
        let (mimetype, extension, imagemode) = driver_defaults(driver)?;
        self.outputformats.push(OutputFormatObj {
            name: name.to_owned(),
            mimetype: mimetype.to_owned(),
            driver: driver.to_owned(),
            extension: extension.to_owned(),
            imagemode,
            transparent: false,
            inmapfile: false,
            formatoptions: Vec::new(),
        });
        Some(self.outputformats.len() - 1)
    }

    /// Removes the output format named `name`. Returns `false` if absent.
    pub fn remove_output_format_by_name(&mut self, name: &str) -> bool {
        self.take_output_format_by_name(name).is_some()
    }

    /// Removes the output format named `name` and hands it back with the
    /// position it held.
    pub fn take_output_format_by_name(&mut self, name: &str) -> Option<(usize, OutputFormatObj)> {
        let index = self.find_output_format_index_by_name(name)?;
        Some((index, self.outputformats.remove(index)))
    }

    /// Puts a detached output format back at `index` (clamped to the end),
    /// exactly as it is. Returns the index it landed at.
    pub fn insert_output_format(&mut self, index: usize, format: OutputFormatObj) -> usize {
        let index = index.min(self.outputformats.len());
        self.outputformats.insert(index, format);
        index
    }
}
