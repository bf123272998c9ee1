use mapedit_engine::{OutputFormatObj, supports_driver};

use super::Document;
use crate::error::{DocError, DocResult};
use crate::output_format::{FormatState, OutputFormat};

impl Document {
    pub fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    pub fn output_format_exists(&self, name: &str) -> bool {
        self.map
            .as_ref()
            .is_some_and(|m| m.find_output_format_index_by_name(name).is_some())
    }

    /// A fresh copy of the engine's output format named `name`
    /// (case-insensitive), options included.
    pub fn get_output_format(&self, name: &str) -> Option<OutputFormat> {
        let map = self.map.as_ref()?;
        let index = map.find_output_format_index_by_name(name)?;
        map.output_format(index).map(OutputFormat::from_obj)
    }

    /// Creates a new output format from `of` and writes it into the
    /// mapfile.
    pub fn add_output_format(&mut self, of: &OutputFormat) -> DocResult {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        let driver = of.qualified_driver()?;
        if map.find_output_format_index_by_name(&of.name).is_some() {
            return Err(DocError::DuplicateName(of.name.clone()));
        }
        let rejected = || DocError::Rejected(format!("unknown driver {driver}"));
        let index = map
            .grow_output_format_slot(&driver, &of.name)
            .ok_or_else(rejected)?;
        let obj = map.output_format_mut(index).ok_or_else(rejected)?;
        of.write_to(obj);
        obj.inmapfile = true;
        self.output_formats.push(OutputFormat::from_obj(obj));
        self.mutations += 1;
        log::debug!("Added output format \"{}\" ({driver})", of.name);
        Ok(())
    }

    /// Writes `of` over the output format it was read from, found by its
    /// [original name](OutputFormat::original_name).
    ///
    /// Returns `Ok(false)` if that format no longer exists or nothing
    /// changed. The engine's driver string is kept as read unless `of`
    /// names a different driver, which must be one the engine can create.
    pub fn update_output_format(&mut self, of: &OutputFormat) -> DocResult<bool> {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        let Some(index) = map.find_output_format_index_by_name(of.original_name()) else {
            log::debug!(
                "Ignoring update of unknown output format \"{}\"",
                of.original_name()
            );
            return Ok(false);
        };
        let driver = of.qualified_driver()?;
        if !of.name.eq_ignore_ascii_case(of.original_name())
            && map.find_output_format_index_by_name(&of.name).is_some()
        {
            return Err(DocError::DuplicateName(of.name.clone()));
        }
        let Some(obj) = map.output_format_mut(index) else {
            return Ok(false);
        };

        if !driver.eq_ignore_ascii_case(&obj.driver) && !supports_driver(&driver) {
            return Err(DocError::Rejected(format!("unknown driver {driver}")));
        }

        let before = obj.clone();
        if !driver.eq_ignore_ascii_case(&obj.driver) {
            obj.driver = driver;
        }
        of.write_to(obj);
        if *obj == before {
            return Ok(false);
        }
        let fresh = OutputFormat::from_obj(obj);
        if let Some(view) = self
            .output_formats
            .iter_mut()
            .find(|v| v.name.eq_ignore_ascii_case(of.original_name()))
        {
            *view = fresh;
        }
        self.mutations += 1;
        Ok(true)
    }

    /// Removes the output format named `name`. Returns `false` if absent.
    pub fn remove_output_format(&mut self, name: &str) -> bool {
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !map.remove_output_format_by_name(name) {
            log::debug!("Ignoring removal of unknown output format \"{name}\"");
            return false;
        }
        self.output_formats
            .retain(|v| !v.name.eq_ignore_ascii_case(name));
        self.mutations += 1;
        true
    }

    /// Detaches the output format named `name` from the mapfile, returning
    /// its position and the engine object as it was.
    pub fn take_output_format(&mut self, name: &str) -> Option<(usize, OutputFormatObj)> {
        let taken = self.map.as_mut()?.take_output_format_by_name(name)?;
        self.output_formats
            .retain(|v| !v.name.eq_ignore_ascii_case(name));
        self.mutations += 1;
        Some(taken)
    }

    /// Puts a detached output format back at `index`, unchanged. Unlike
    /// [`add_output_format`](Self::add_output_format) no driver defaults are
    /// applied, so drivers the engine cannot create are accepted here.
    pub fn restore_output_format(&mut self, index: usize, obj: OutputFormatObj) -> DocResult {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        if map.find_output_format_index_by_name(&obj.name).is_some() {
            return Err(DocError::DuplicateName(obj.name));
        }
        let view = OutputFormat::from_obj(&obj);
        let index = map.insert_output_format(index, obj);
        let at = index.min(self.output_formats.len());
        self.output_formats.insert(at, view);
        self.mutations += 1;
        log::debug!("Restored output format at {index}");
        Ok(())
    }

    /// Applies an edited list of output formats, entry by entry, according
    /// to each entry's [`FormatState`]. Stops at the first error.
    pub fn apply_output_format_changes(&mut self, formats: &[OutputFormat]) -> DocResult {
        for of in formats {
            match of.state {
                FormatState::Unchanged => {}
                FormatState::Added => self.add_output_format(of)?,
                FormatState::Modified => {
                    self.update_output_format(of)?;
                }
                FormatState::Deleted => {
                    self.remove_output_format(of.original_name());
                }
            }
        }
        Ok(())
    }

    /// First name produced by the configured template that no output format
    /// uses yet.
    pub fn next_output_format_name(&self) -> String {
        let template = &self.config.output_formats;
        let mut n = 1;
        loop {
            let name = template.format_name(n);
            if !self.output_format_exists(&name)
                && !self
                    .output_formats
                    .iter()
                    .any(|v| v.name.eq_ignore_ascii_case(&name))
            {
                return name;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use mapedit_engine::{ImageMode, MemoryEngine};

    use super::*;
    use crate::config::EditorConfig;

    fn blank() -> Document {
        let mut doc = Document::new(MemoryEngine::new());
        doc.load(Path::new("")).unwrap();
        doc
    }

    fn png(name: &str) -> OutputFormat {
        let mut of = OutputFormat::new(name, "AGG/PNG");
        of.image_mode = ImageMode::Rgba;
        of.transparent = true;
        of.format_options
            .insert("QUANTIZE_FORCE".into(), "ON".into());
        of
    }

    #[test]
    fn add_then_get_returns_independent_copy() {
        let mut doc = blank();
        doc.add_output_format(&png("outfmt1")).unwrap();

        let mut copy = doc.get_output_format("outfmt1").unwrap();
        assert_eq!(copy, doc.output_formats()[0]);
        assert_eq!(copy.format_options["QUANTIZE_FORCE"], "ON");
        assert_eq!(copy.mime_type, "image/png");
        assert!(doc.map().unwrap().output_format(0).unwrap().inmapfile);

        copy.transparent = false;
        copy.format_options.clear();
        let again = doc.get_output_format("outfmt1").unwrap();
        assert!(again.transparent);
        assert_eq!(again.format_options.len(), 1);
    }

    #[test]
    fn add_duplicate_and_unknown_driver() {
        let mut doc = blank();
        doc.add_output_format(&png("png")).unwrap();
        assert_eq!(
            doc.add_output_format(&png("PNG")),
            Err(DocError::DuplicateName("PNG".into()))
        );
        let pdf = OutputFormat::new("pdf", "CAIRO/PDF");
        assert!(matches!(
            doc.add_output_format(&pdf),
            Err(DocError::Rejected(_))
        ));
        assert_eq!(doc.output_formats().len(), 1);
    }

    #[test]
    fn gdal_without_sub_driver_is_rejected() {
        let mut doc = blank();
        let before = doc.mutation_count();
        let tiff = OutputFormat::new("tiff", "GDAL");
        assert_eq!(
            doc.add_output_format(&tiff),
            Err(DocError::MissingSubDriver("tiff".into()))
        );
        assert_eq!(doc.mutation_count(), before);
        assert!(!doc.output_format_exists("tiff"));
    }

    #[test]
    fn gdal_driver_is_qualified() {
        let mut doc = blank();
        let mut tiff = OutputFormat::new("tiff", "GDAL");
        tiff.gdal_driver = "GTiff".into();
        doc.add_output_format(&tiff).unwrap();
        assert_eq!(
            doc.map().unwrap().output_format(0).unwrap().driver,
            "GDAL/GTiff"
        );
        let read = doc.get_output_format("tiff").unwrap();
        assert_eq!(read.driver, "GDAL");
        assert_eq!(read.gdal_driver, "GTiff");
    }

    #[test]
    fn rename_updates_entry_by_original_name() {
        let mut doc = blank();
        doc.add_output_format(&png("png24")).unwrap();
        doc.add_output_format(&png("jpeg")).unwrap();

        let mut of = doc.get_output_format("png24").unwrap();
        of.name = "png24b".into();
        of.mark_modified();
        assert_eq!(doc.update_output_format(&of), Ok(true));

        assert!(!doc.output_format_exists("png24"));
        assert!(doc.output_format_exists("png24b"));
        assert_eq!(doc.output_formats()[0].name, "png24b");
        assert_eq!(doc.output_formats()[0].original_name(), "png24b");
        assert_eq!(doc.output_formats().len(), 2);
    }

    #[test]
    fn rename_onto_existing_name_is_rejected() {
        let mut doc = blank();
        doc.add_output_format(&png("a")).unwrap();
        doc.add_output_format(&png("b")).unwrap();
        let mut of = doc.get_output_format("a").unwrap();
        of.name = "B".into();
        assert_eq!(
            doc.update_output_format(&of),
            Err(DocError::DuplicateName("B".into()))
        );
    }

    #[test]
    fn update_replaces_options() {
        let mut doc = blank();
        doc.add_output_format(&png("png")).unwrap();
        let mut of = doc.get_output_format("png").unwrap();
        assert_eq!(doc.update_output_format(&of), Ok(false));

        of.format_options.clear();
        of.format_options.insert("INTERLACE".into(), "OFF".into());
        assert_eq!(doc.update_output_format(&of), Ok(true));
        assert_eq!(
            doc.map().unwrap().output_format(0).unwrap().options(),
            &["INTERLACE=OFF"]
        );
    }

    /// A blank document whose mapfile already holds `formats`, loaded the
    /// way a mapfile read from disk would be.
    fn loaded_with(formats: &str) -> Document {
        #[derive(serde::Deserialize)]
        struct Formats {
            outputformat: Vec<OutputFormatObj>,
        }
        let formats: Formats = toml::from_str(formats).unwrap();
        let engine = MemoryEngine::new();
        let mut map = mapedit_engine::MapObj::new();
        for (i, obj) in formats.outputformat.into_iter().enumerate() {
            map.insert_output_format(i, obj);
        }
        engine.insert("loaded.map", map);
        let mut doc = Document::new(engine);
        doc.load(Path::new("loaded.map")).unwrap();
        doc
    }

    #[test]
    fn update_to_unknown_driver_is_rejected() {
        let mut doc = blank();
        doc.add_output_format(&png("png")).unwrap();
        let before = doc.mutation_count();

        let mut of = doc.get_output_format("png").unwrap();
        of.driver = "CAIRO/PDF".into();
        of.transparent = false;
        assert!(matches!(
            doc.update_output_format(&of),
            Err(DocError::Rejected(_))
        ));
        assert_eq!(doc.mutation_count(), before);
        let obj = doc.map().unwrap().output_format(0).unwrap();
        assert_eq!(obj.driver, "AGG/PNG");
        assert!(obj.transparent);

        of.driver = "GD/PNG".into();
        assert_eq!(doc.update_output_format(&of), Ok(true));
        assert_eq!(doc.map().unwrap().output_format(0).unwrap().driver, "GD/PNG");
    }

    #[test]
    fn update_keeps_driver_spelling_and_raw_options() {
        let mut doc = loaded_with(
            r#"
            [[outputformat]]
            name = "tiff"
            driver = "gdal/GTiff"
            formatoptions = ["FLAG", "COMPRESS=LZW"]

            [[outputformat]]
            name = "pdf"
            driver = "CAIRO/PDF"
            "#,
        );

        let mut tiff = doc.get_output_format("tiff").unwrap();
        assert_eq!(tiff.driver, "GDAL");
        tiff.transparent = true;
        assert_eq!(doc.update_output_format(&tiff), Ok(true));
        let obj = doc.map().unwrap().output_format(0).unwrap();
        assert_eq!(obj.driver, "gdal/GTiff");
        assert_eq!(obj.options(), &["FLAG", "COMPRESS=LZW"]);

        let mut pdf = doc.get_output_format("pdf").unwrap();
        pdf.extension = "pdf".into();
        assert_eq!(doc.update_output_format(&pdf), Ok(true));
        assert_eq!(doc.map().unwrap().output_format(1).unwrap().driver, "CAIRO/PDF");
    }

    #[test]
    fn taken_format_is_restored_in_place() {
        let mut doc = loaded_with(
            r#"
            [[outputformat]]
            name = "png"
            driver = "AGG/PNG"

            [[outputformat]]
            name = "pdf"
            driver = "CAIRO/PDF"
            inmapfile = false

            [[outputformat]]
            name = "jpeg"
            driver = "AGG/JPEG"
            "#,
        );
        let original = doc.map().unwrap().output_format(1).unwrap().clone();

        let (index, obj) = doc.take_output_format("PDF").unwrap();
        assert_eq!(index, 1);
        assert!(!doc.output_format_exists("pdf"));
        assert_eq!(doc.output_formats().len(), 2);
        assert!(doc.take_output_format("pdf").is_none());

        doc.restore_output_format(index, obj.clone()).unwrap();
        assert_eq!(doc.map().unwrap().output_format(1), Some(&original));
        assert_eq!(doc.output_formats()[1].driver, "CAIRO/PDF");
        assert_eq!(
            doc.restore_output_format(index, obj),
            Err(DocError::DuplicateName("pdf".into()))
        );
    }

    #[test]
    fn update_unknown_is_silent() {
        let mut doc = blank();
        assert_eq!(doc.update_output_format(&png("ghost")), Ok(false));
    }

    #[test]
    fn remove_output_format() {
        let mut doc = blank();
        doc.add_output_format(&png("png")).unwrap();
        assert!(doc.remove_output_format("PNG"));
        assert!(!doc.remove_output_format("png"));
        assert!(doc.output_formats().is_empty());
    }

    #[test]
    fn apply_changes_dispatches_by_state() {
        let mut doc = blank();
        doc.add_output_format(&png("keep")).unwrap();
        doc.add_output_format(&png("edit")).unwrap();
        doc.add_output_format(&png("drop")).unwrap();

        let mut list: Vec<OutputFormat> = doc.output_formats().to_vec();
        list[1].transparent = false;
        list[1].mark_modified();
        list[2].mark_deleted();
        list.push(png("fresh"));

        doc.apply_output_format_changes(&list).unwrap();
        let names: Vec<&str> = doc.output_formats().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["keep", "edit", "fresh"]);
        assert!(!doc.get_output_format("edit").unwrap().transparent);
    }

    #[test]
    fn next_name_skips_used_ones() {
        let mut doc = blank();
        assert_eq!(doc.next_output_format_name(), "outfmt1");
        doc.add_output_format(&png("outfmt1")).unwrap();
        assert_eq!(doc.next_output_format_name(), "outfmt2");
    }

    #[test]
    fn next_name_follows_template() {
        let mut config = EditorConfig::default();
        config.output_formats.name_template = "fmt-{}".into();
        let mut doc = Document::with_config(MemoryEngine::new(), config);
        doc.load(Path::new("")).unwrap();
        assert_eq!(doc.next_output_format_name(), "fmt-1");
    }
}
