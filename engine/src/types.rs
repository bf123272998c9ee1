//! Small value types shared by the map, layer and output format objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Map and tolerance units, in the engine's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Inches,
    Feet,
    Miles,
    #[default]
    Meters,
    Kilometers,
    Dd,
    Pixels,
    Percentages,
    NauticalMiles,
}

impl Units {
    pub const ALL: [Units; 9] = [
        Units::Inches,
        Units::Feet,
        Units::Miles,
        Units::Meters,
        Units::Kilometers,
        Units::Dd,
        Units::Pixels,
        Units::Percentages,
        Units::NauticalMiles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Inches => "inches",
            Units::Feet => "feet",
            Units::Miles => "miles",
            Units::Meters => "meters",
            Units::Kilometers => "kilometers",
            Units::Dd => "dd",
            Units::Pixels => "pixels",
            Units::Percentages => "percentages",
            Units::NauticalMiles => "nauticalmiles",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown units: {s}"))
    }
}

/// Axis-aligned rectangle in map coordinates.
///
/// The engine uses `-1` on every side to mean "not set".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Rect {
    pub const UNSET: Rect = Rect {
        minx: -1.0,
        miny: -1.0,
        maxx: -1.0,
        maxy: -1.0,
    };

    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// A rectangle is usable for drawing when it has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNSET
    }
}

/// RGBA color as stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    /// What the engine stores when a mapfile does not set a color.
    pub const UNSET: Color = Color::rgba(0xff, 0xff, 0xff, 0xff);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 0xff)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Layer visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerStatus {
    #[default]
    On,
    Off,
    /// Always drawn, regardless of the request.
    Default,
}

/// Layer type. Also used as the geometry type of imported layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[default]
    Point,
    Line,
    Polygon,
    Raster,
    Annotation,
    Query,
    Circle,
    TileIndex,
    Chart,
}

impl LayerType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerType::Point => "POINT",
            LayerType::Line => "LINE",
            LayerType::Polygon => "POLYGON",
            LayerType::Raster => "RASTER",
            LayerType::Annotation => "ANNOTATION",
            LayerType::Query => "QUERY",
            LayerType::Circle => "CIRCLE",
            LayerType::TileIndex => "TILEINDEX",
            LayerType::Chart => "CHART",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel model of an output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageMode {
    /// Not set; the driver picks its own.
    #[default]
    Default,
    Pc256,
    Rgb,
    Rgba,
    Byte,
    Int16,
    Float32,
    Feature,
}

impl ImageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMode::Default => "",
            ImageMode::Pc256 => "PC256",
            ImageMode::Rgb => "RGB",
            ImageMode::Rgba => "RGBA",
            ImageMode::Byte => "BYTE",
            ImageMode::Int16 => "INT16",
            ImageMode::Float32 => "FLOAT32",
            ImageMode::Feature => "FEATURE",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
