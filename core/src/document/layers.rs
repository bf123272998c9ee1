//! Layer operations. The view list and the engine's layer table are
//! changed together and keep the same order.

use mapedit_engine::{LayerObj, LayerType, MapObj};

use super::Document;
use crate::error::{DocError, DocResult};
use crate::layer::{Layer, LayerImport};

/// Appends a default-initialized, named layer to the engine's table and
/// its draw order.
fn append_layer<'m>(map: &'m mut MapObj, name: &str) -> DocResult<&'m mut LayerObj> {
    let index = map
        .grow_layer_slot()
        .ok_or_else(|| DocError::Rejected(format!("layer table is full, cannot add {name}")))?;
    map.init_layer_defaults(index);
    map.append_draw_order(index);
    let obj = map
        .layer_mut(index)
        .ok_or_else(|| DocError::Rejected(format!("no layer slot for {name}")))?;
    obj.name = name.to_owned();
    Ok(obj)
}

impl Document {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(Layer::name)
    }

    pub fn layer_exists(&self, name: &str) -> bool {
        self.layer(name).is_some()
    }

    /// Current position of `name` in the engine's layer table.
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.map.as_ref()?.find_layer_index(name)
    }

    /// Adds a new layer with the engine's defaults, as a raster layer or a
    /// point layer.
    pub fn add_layer(&mut self, name: &str, is_raster: bool) -> DocResult<Layer> {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        if map.find_layer_index(name).is_some() {
            return Err(DocError::DuplicateName(name.to_owned()));
        }
        let obj = append_layer(map, name)?;
        obj.layer_type = if is_raster {
            LayerType::Raster
        } else {
            LayerType::Point
        };
        let layer = Layer::from_obj(obj);
        self.layers.push(layer.clone());
        self.mutations += 1;
        log::debug!("Added layer \"{name}\"");
        Ok(layer)
    }

    /// Adds a layer described by an external catalog.
    ///
    /// Does nothing (and returns `false`) if the name is taken.
    pub fn import_layer(&mut self, import: &LayerImport) -> bool {
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if map.find_layer_index(&import.name).is_some() {
            log::debug!("Skipping import of existing layer \"{}\"", import.name);
            return false;
        }
        let obj = match append_layer(map, &import.name) {
            Ok(obj) => obj,
            Err(e) => {
                log::warn!("Failed to import layer \"{}\": {e}", import.name);
                return false;
            }
        };
        obj.layer_type = import.geometry;
        obj.data.clone_from(&import.data);
        obj.projection.clone_from(&import.projection);
        self.layers.push(Layer::from_obj(obj));
        self.mutations += 1;
        true
    }

    /// Appends a detached layer, e.g. one returned by
    /// [`remove_layer`](Self::remove_layer), with all of its attributes.
    pub fn restore_layer(&mut self, layer: &Layer) -> DocResult {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        if map.find_layer_index(layer.name()).is_some() {
            return Err(DocError::DuplicateName(layer.name().to_owned()));
        }
        let obj = append_layer(map, layer.name())?;
        layer.write_to(obj);
        self.layers.push(Layer::from_obj(obj));
        self.mutations += 1;
        Ok(())
    }

    /// Removes the layer named `name` and returns a detached copy of it.
    ///
    /// Returns `None` if there is no such layer.
    pub fn remove_layer(&mut self, name: &str) -> Option<Layer> {
        let map = self.map.as_mut()?;
        let Some(index) = map.find_layer_index(name) else {
            log::debug!("Ignoring removal of unknown layer \"{name}\"");
            return None;
        };
        let removed = map.remove_layer_at(index)?;
        if let Some(pos) = self.layers.iter().position(|l| l.name() == name) {
            self.layers.remove(pos);
        }
        self.mutations += 1;
        log::debug!("Removed layer \"{name}\" at {index}");
        Some(Layer::from_obj(&removed))
    }

    /// Writes the attributes of `layer` to the engine layer of the same name.
    ///
    /// Returns `Ok(false)` if nothing changed.
    pub fn update_layer(&mut self, layer: &Layer) -> DocResult<bool> {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        let not_found = || DocError::NotFound(layer.name().to_owned());
        let index = map.find_layer_index(layer.name()).ok_or_else(not_found)?;
        let obj = map.layer_mut(index).ok_or_else(not_found)?;
        if !layer.write_to(obj) {
            return Ok(false);
        }
        let fresh = Layer::from_obj(obj);
        if let Some(view) = self.layers.iter_mut().find(|l| l.name() == layer.name()) {
            *view = fresh;
        }
        self.mutations += 1;
        Ok(true)
    }

    pub fn rename_layer(&mut self, old: &str, new: &str) -> DocResult {
        let map = self.map.as_mut().ok_or(DocError::NotLoaded)?;
        let index = map
            .find_layer_index(old)
            .ok_or_else(|| DocError::NotFound(old.to_owned()))?;
        if old == new {
            return Ok(());
        }
        if map.find_layer_index(new).is_some() {
            return Err(DocError::DuplicateName(new.to_owned()));
        }
        if let Some(obj) = map.layer_mut(index) {
            obj.name = new.to_owned();
        }
        if let Some(view) = self.layers.iter_mut().find(|l| l.name() == old) {
            view.set_name(new);
        }
        self.mutations += 1;
        Ok(())
    }
}
