//! Scalar map settings.
//!
//! One generic command, [`SetMapValue`], covers every scalar attribute. The
//! functions in this module build it for a specific attribute, capturing
//! the current value from the document.

use std::fmt;

use mapedit_engine::{Color, Rect, Units};

use super::ensure_loaded;
use crate::document::Document;
use crate::undo::{Command, CommandResult};

/// Writes one value into the document.
pub type Apply<V> = fn(&mut Document, &V) -> bool;

/// Sets one scalar attribute of the map.
///
/// Consecutive edits of the same attribute merge into one history entry.
pub struct SetMapValue<V> {
    text: &'static str,
    old: V,
    new: V,
    apply: Apply<V>,
}

impl<V> SetMapValue<V> {
    /// `text` names the attribute in history menus and identifies it for
    /// merging.
    pub fn new(text: &'static str, old: V, new: V, apply: Apply<V>) -> Self {
        Self {
            text,
            old,
            new,
            apply,
        }
    }

    pub fn old_value(&self) -> &V {
        &self.old
    }

    pub fn new_value(&self) -> &V {
        &self.new
    }
}

impl<V: fmt::Debug> fmt::Debug for SetMapValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetMapValue")
            .field("text", &self.text)
            .field("old", &self.old)
            .field("new", &self.new)
            .finish_non_exhaustive()
    }
}

impl<V> Command<Document> for SetMapValue<V>
where
    V: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        (self.apply)(doc, &self.new);
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        (self.apply)(doc, &self.old);
        Ok(())
    }

    fn text(&self) -> &str {
        self.text
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }

    fn merge(
        &mut self,
        other: Box<dyn Command<Document>>,
    ) -> Option<Box<dyn Command<Document>>> {
        if let Some(other) = (*other).as_any().downcast_ref::<Self>()
            && other.text == self.text
        {
            self.new = other.new.clone();
            return None;
        }
        Some(other)
    }
}

pub fn set_name(doc: &Document, name: &str) -> SetMapValue<String> {
    SetMapValue::new("Set map name", doc.name().to_owned(), name.to_owned(), |d, v| {
        d.set_name(v)
    })
}

pub fn set_status(doc: &Document, status: bool) -> SetMapValue<bool> {
    SetMapValue::new("Set map status", doc.status(), status, |d, v| {
        d.set_status(*v)
    })
}

pub fn set_width(doc: &Document, width: i32) -> SetMapValue<i32> {
    SetMapValue::new("Set map width", doc.width(), width, |d, v| d.set_width(*v))
}

pub fn set_height(doc: &Document, height: i32) -> SetMapValue<i32> {
    SetMapValue::new("Set map height", doc.height(), height, |d, v| {
        d.set_height(*v)
    })
}

pub fn set_maxsize(doc: &Document, maxsize: i32) -> SetMapValue<i32> {
    SetMapValue::new("Set max size", doc.maxsize(), maxsize, |d, v| {
        d.set_maxsize(*v)
    })
}

pub fn set_units(doc: &Document, units: Units) -> SetMapValue<Units> {
    SetMapValue::new(
        "Set map units",
        doc.units().unwrap_or_default(),
        units,
        |d, v| d.set_units(*v),
    )
}

pub fn set_imagetype(doc: &Document, imagetype: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set image type",
        doc.imagetype().to_owned(),
        imagetype.to_owned(),
        |d, v| d.set_imagetype(v),
    )
}

pub fn set_projection(doc: &Document, projection: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set map projection",
        doc.projection().to_owned(),
        projection.to_owned(),
        |d, v| d.set_projection(v),
    )
}

pub fn set_extent(doc: &Document, extent: Rect) -> SetMapValue<Rect> {
    SetMapValue::new("Set map extent", doc.extent(), extent, |d, v| {
        d.set_extent(*v)
    })
}

pub fn set_resolution(doc: &Document, resolution: f64) -> SetMapValue<f64> {
    SetMapValue::new("Set resolution", doc.resolution(), resolution, |d, v| {
        d.set_resolution(*v)
    })
}

pub fn set_defresolution(doc: &Document, defresolution: f64) -> SetMapValue<f64> {
    SetMapValue::new(
        "Set default resolution",
        doc.defresolution(),
        defresolution,
        |d, v| d.set_defresolution(*v),
    )
}

pub fn set_rotation_angle(doc: &Document, angle: f64) -> SetMapValue<f64> {
    SetMapValue::new("Set rotation angle", doc.rotation_angle(), angle, |d, v| {
        d.set_rotation_angle(*v)
    })
}

pub fn set_image_color(doc: &Document, color: Option<Color>) -> SetMapValue<Option<Color>> {
    SetMapValue::new("Set image color", doc.image_color(), color, |d, v| {
        d.set_image_color(*v)
    })
}

pub fn set_shapepath(doc: &Document, shapepath: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set shapepath",
        doc.shapepath().to_owned(),
        shapepath.to_owned(),
        |d, v| d.set_shapepath(v),
    )
}

pub fn set_symbolset(doc: &Document, symbolset: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set symbolset",
        doc.symbolset().to_owned(),
        symbolset.to_owned(),
        |d, v| d.set_symbolset(v),
    )
}

pub fn set_fontset(doc: &Document, fontset: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set fontset",
        doc.fontset().to_owned(),
        fontset.to_owned(),
        |d, v| d.set_fontset(v),
    )
}

pub fn set_template_pattern(doc: &Document, pattern: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set template pattern",
        doc.template_pattern().to_owned(),
        pattern.to_owned(),
        |d, v| d.set_template_pattern(v),
    )
}

pub fn set_data_pattern(doc: &Document, pattern: &str) -> SetMapValue<String> {
    SetMapValue::new(
        "Set data pattern",
        doc.data_pattern().to_owned(),
        pattern.to_owned(),
        |d, v| d.set_data_pattern(v),
    )
}

pub fn set_debug(doc: &Document, debug: i32) -> SetMapValue<i32> {
    SetMapValue::new("Set debug level", doc.debug(), debug, |d, v| {
        d.set_debug(*v)
    })
}
