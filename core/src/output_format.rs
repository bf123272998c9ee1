//! Editor-side output format values.

use mapedit_engine::{ImageMode, OutputFormatObj};

use crate::error::{DocError, DocResult};
use crate::keyvalue::KeyValues;

/// Where an [`OutputFormat`] stands relative to the document it was read
/// from. Drives [`Document::apply_output_format_changes`](crate::Document::apply_output_format_changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatState {
    #[default]
    Unchanged,
    Added,
    Modified,
    Deleted,
}

pub use mapedit_engine::DRIVERS;

/// `true` for drivers that must be qualified with a sub-driver.
pub fn needs_sub_driver(driver: &str) -> bool {
    driver.eq_ignore_ascii_case("GDAL") || driver.eq_ignore_ascii_case("OGR")
}

/// Image modes a driver accepts.
pub fn image_modes(driver: &str) -> &'static [ImageMode] {
    use ImageMode::*;
    match driver.to_ascii_uppercase().as_str() {
        "AGG/PNG" | "AGG/JPEG" => &[Rgb, Rgba],
        "GD/GIF" | "GD/PNG" => &[Pc256, Rgb, Rgba],
        "TEMPLATE" | "OGR" => &[Pc256, Rgb, Rgba, Feature],
        "GDAL" => &[Pc256, Rgb, Rgba, Byte, Int16, Float32],
        _ => &[],
    }
}

/// A value copy of one output format.
///
/// Unlike layers, output formats are handed out as independent copies:
/// editing one changes nothing until it is passed back to the document.
/// The document finds its own entry through [`original_name`](Self::original_name),
/// so a renamed copy still updates the right format.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFormat {
    pub name: String,
    original_name: String,
    pub mime_type: String,
    /// Logical driver: one of [`DRIVERS`], or an engine driver string kept
    /// as read.
    pub driver: String,
    /// Sub-driver for `GDAL` and `OGR`, e.g. `GTiff`.
    pub gdal_driver: String,
    pub extension: String,
    pub image_mode: ImageMode,
    pub transparent: bool,
    pub format_options: KeyValues,
    pub state: FormatState,
}

impl OutputFormat {
    /// A format that does not exist in any document yet.
    pub fn new(name: impl Into<String>, driver: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            mime_type: String::new(),
            driver: driver.into(),
            gdal_driver: String::new(),
            extension: String::new(),
            image_mode: ImageMode::Default,
            transparent: false,
            format_options: KeyValues::new(),
            state: FormatState::Added,
        }
    }

    pub(crate) fn from_obj(obj: &OutputFormatObj) -> Self {
        let (driver, gdal_driver) = match obj.driver.split_once('/') {
            Some((d, sub)) if needs_sub_driver(d) => (d.to_ascii_uppercase(), sub.to_owned()),
            _ => (obj.driver.clone(), String::new()),
        };
        let format_options = parse_options(obj.options());
        Self {
            name: obj.name.clone(),
            original_name: obj.name.clone(),
            mime_type: obj.mimetype.clone(),
            driver,
            gdal_driver,
            extension: obj.extension.clone(),
            image_mode: obj.imagemode,
            transparent: obj.transparent,
            format_options,
            state: FormatState::Unchanged,
        }
    }

    /// Name of the document entry this value was read from.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// The engine's driver string, `DRIVER/SUBDRIVER` for `GDAL` and `OGR`.
    pub fn qualified_driver(&self) -> DocResult<String> {
        if !needs_sub_driver(&self.driver) {
            return Ok(self.driver.clone());
        }
        if self.gdal_driver.is_empty() {
            return Err(DocError::MissingSubDriver(self.name.clone()));
        }
        Ok(format!(
            "{}/{}",
            self.driver.to_ascii_uppercase(),
            self.gdal_driver
        ))
    }

    /// Flags an unchanged format as modified. Added and deleted formats keep
    /// their state.
    pub fn mark_modified(&mut self) {
        if self.state == FormatState::Unchanged {
            self.state = FormatState::Modified;
        }
    }

    pub fn mark_deleted(&mut self) {
        self.state = FormatState::Deleted;
    }

    /// The same value, addressed to the entry currently named `original_name`.
    pub(crate) fn rebased(&self, original_name: &str) -> Self {
        Self {
            original_name: original_name.to_owned(),
            ..self.clone()
        }
    }

    /// The value as it reads back once written: addressed to its own name
    /// and unchanged.
    pub(crate) fn committed(&self) -> Self {
        Self {
            state: FormatState::Unchanged,
            ..self.rebased(&self.name)
        }
    }

    /// Writes every field except the driver into `obj`. When the options
    /// differ from the ones `obj` holds, its `KEY=VALUE` entries are
    /// replaced; entries without `=` are kept either way.
    pub(crate) fn write_to(&self, obj: &mut OutputFormatObj) {
        obj.name.clone_from(&self.name);
        if !self.mime_type.is_empty() {
            obj.mimetype.clone_from(&self.mime_type);
        }
        if !self.extension.is_empty() {
            obj.extension.clone_from(&self.extension);
        }
        obj.imagemode = self.image_mode;
        obj.transparent = self.transparent;
        if parse_options(obj.options()) == self.format_options {
            return;
        }
        obj.retain_options(|opt| !opt.contains('='));
        for (key, value) in &self.format_options {
            obj.set_option(key, value);
        }
    }
}

/// `KEY=VALUE` entries split on the first `=`. Entries without `=` have no
/// key and are skipped.
fn parse_options(options: &[String]) -> KeyValues {
    options
        .iter()
        .filter_map(|opt| {
            let (k, v) = opt.split_once('=')?;
            Some((k.to_owned(), v.to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(name: &str, driver: &str) -> OutputFormatObj {
        let mut o = OutputFormatObj::default();
        o.name = name.into();
        o.driver = driver.into();
        o
    }

    #[test]
    fn gdal_driver_is_split_on_read() {
        let of = OutputFormat::from_obj(&obj("tiff", "GDAL/GTiff"));
        assert_eq!(of.driver, "GDAL");
        assert_eq!(of.gdal_driver, "GTiff");
        assert_eq!(of.qualified_driver().unwrap(), "GDAL/GTiff");

        let csv = OutputFormat::from_obj(&obj("csv", "ogr/CSV"));
        assert_eq!(csv.driver, "OGR");
        assert_eq!(csv.gdal_driver, "CSV");
    }

    #[test]
    fn other_drivers_are_kept_whole() {
        let of = OutputFormat::from_obj(&obj("png", "AGG/PNG"));
        assert_eq!(of.driver, "AGG/PNG");
        assert!(of.gdal_driver.is_empty());
        assert_eq!(of.qualified_driver().unwrap(), "AGG/PNG");
    }

    #[test]
    fn options_split_on_first_equals() {
        let mut o = obj("jpeg", "AGG/JPEG");
        o.set_option("QUALITY", "75");
        o.set_option("FILTER", "a=b");
        let of = OutputFormat::from_obj(&o);
        assert_eq!(of.format_options["QUALITY"], "75");
        assert_eq!(of.format_options["FILTER"], "a=b");
    }

    #[test]
    fn missing_sub_driver_is_rejected() {
        let of = OutputFormat::new("tiff", "GDAL");
        assert_eq!(
            of.qualified_driver(),
            Err(DocError::MissingSubDriver("tiff".into()))
        );
    }

    #[test]
    fn state_transitions() {
        let mut of = OutputFormat::from_obj(&obj("png", "AGG/PNG"));
        of.mark_modified();
        assert_eq!(of.state, FormatState::Modified);

        let mut added = OutputFormat::new("new", "AGG/PNG");
        added.mark_modified();
        assert_eq!(added.state, FormatState::Added);
        added.mark_deleted();
        assert_eq!(added.state, FormatState::Deleted);
    }

    #[test]
    fn write_to_replaces_options() {
        let mut target = obj("png", "AGG/PNG");
        target.set_option("INTERLACE", "ON");
        let mut of = OutputFormat::from_obj(&target);
        of.format_options.clear();
        of.format_options.insert("QUANTIZE_FORCE".into(), "ON".into());
        of.write_to(&mut target);
        assert_eq!(target.options(), &["QUANTIZE_FORCE=ON"]);
    }

    #[test]
    fn write_to_keeps_options_without_value() {
        let mut raw: OutputFormatObj = toml::from_str(
            r#"
            name = "tiff"
            driver = "GDAL/GTiff"
            formatoptions = ["FLAG", "A=1"]
            "#,
        )
        .unwrap();
        let mut of = OutputFormat::from_obj(&raw);
        assert_eq!(of.format_options.len(), 1);

        of.transparent = true;
        of.write_to(&mut raw);
        assert_eq!(raw.options(), &["FLAG", "A=1"]);

        of.format_options.insert("B".into(), "2".into());
        of.write_to(&mut raw);
        assert_eq!(raw.options(), &["FLAG", "A=1", "B=2"]);

        of.format_options.shift_remove("A");
        of.write_to(&mut raw);
        assert_eq!(raw.options(), &["FLAG", "B=2"]);
    }

    #[test]
    fn image_modes_per_driver() {
        assert_eq!(image_modes("agg/png"), &[ImageMode::Rgb, ImageMode::Rgba]);
        assert!(image_modes("GDAL").contains(&ImageMode::Float32));
        assert!(image_modes("OGR").contains(&ImageMode::Feature));
        assert!(image_modes("CAIRO/PDF").is_empty());
    }
}
