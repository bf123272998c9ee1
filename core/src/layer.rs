//! Editor-side layer views.

use mapedit_engine::{HashTable, LayerObj, LayerStatus, LayerType, MapObj, Rect, Units};

use crate::keyvalue::{self, KeyValues};

/// Snapshot of one engine layer, identified by name.
///
/// The view mirrors the editable attributes of its [`LayerObj`] but never
/// its position in the layer table: that position shifts whenever an
/// earlier layer is removed. [`index_in`](Self::index_in) resolves it on
/// demand.
///
/// The name can only be changed through
/// [`Document::rename_layer`](crate::Document::rename_layer). Every other
/// field may be edited freely and written back with
/// [`Document::update_layer`](crate::Document::update_layer).
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    pub status: LayerStatus,
    pub layer_type: LayerType,
    pub data: String,
    pub opacity: i32,
    pub mask: String,
    pub group: String,
    pub requires: String,
    pub projection: String,
    pub extent: Rect,
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
    pub metadata: KeyValues,
}

impl Layer {
    /// A detached layer carrying the engine's layer defaults.
    pub fn new(name: impl Into<String>) -> Self {
        let obj = LayerObj {
            name: name.into(),
            ..LayerObj::default()
        };
        Self::from_obj(&obj)
    }

    /// Snapshot of an engine layer.
    pub fn from_obj(obj: &LayerObj) -> Self {
        Self {
            name: obj.name.clone(),
            status: obj.status,
            layer_type: obj.layer_type,
            data: obj.data.clone(),
            opacity: obj.opacity,
            mask: obj.mask.clone(),
            group: obj.group.clone(),
            requires: obj.requires.clone(),
            projection: obj.projection.clone(),
            extent: obj.extent,
            filter: obj.filter.clone(),
            minscaledenom: obj.minscaledenom,
            maxscaledenom: obj.maxscaledenom,
            geomtransform: obj.geomtransform.clone(),
            tolerance: obj.tolerance,
            toleranceunits: obj.toleranceunits,
            maxfeatures: obj.maxfeatures,
            template: obj.template.clone(),
            header: obj.header.clone(),
            footer: obj.footer.clone(),
            labelitem: obj.labelitem.clone(),
            labelminscaledenom: obj.labelminscaledenom,
            labelmaxscaledenom: obj.labelmaxscaledenom,
            labelangleitem: obj.labelangleitem.clone(),
            labelsizeitem: obj.labelsizeitem.clone(),
            labelcache: obj.labelcache,
            postlabelcache: obj.postlabelcache,
            labelrequires: obj.labelrequires.clone(),
            debug: obj.debug,
            metadata: keyvalue::populate(&obj.metadata),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Current position of this layer in `map`'s layer table.
    pub fn index_in(&self, map: &MapObj) -> Option<usize> {
        map.find_layer_index(&self.name)
    }

    /// Copies every mirrored attribute except the name into `obj`.
    ///
    /// Returns `true` if anything changed. Metadata is synced key by key.
    pub(crate) fn write_to(&self, obj: &mut LayerObj) -> bool {
        let before = obj.clone();
        obj.status = self.status;
        obj.layer_type = self.layer_type;
        obj.data.clone_from(&self.data);
        obj.opacity = self.opacity;
        obj.mask.clone_from(&self.mask);
        obj.group.clone_from(&self.group);
        obj.requires.clone_from(&self.requires);
        obj.projection.clone_from(&self.projection);
        obj.extent = self.extent;
        obj.filter.clone_from(&self.filter);
        obj.minscaledenom = self.minscaledenom;
        obj.maxscaledenom = self.maxscaledenom;
        obj.geomtransform.clone_from(&self.geomtransform);
        obj.tolerance = self.tolerance;
        obj.toleranceunits = self.toleranceunits;
        obj.maxfeatures = self.maxfeatures;
        obj.template.clone_from(&self.template);
        obj.header.clone_from(&self.header);
        obj.footer.clone_from(&self.footer);
        obj.labelitem.clone_from(&self.labelitem);
        obj.labelminscaledenom = self.labelminscaledenom;
        obj.labelmaxscaledenom = self.labelmaxscaledenom;
        obj.labelangleitem.clone_from(&self.labelangleitem);
        obj.labelsizeitem.clone_from(&self.labelsizeitem);
        obj.labelcache = self.labelcache;
        obj.postlabelcache = self.postlabelcache;
        obj.labelrequires.clone_from(&self.labelrequires);
        obj.debug = self.debug;
        sync_table(&mut obj.metadata, &self.metadata);
        *obj != before
    }
}

/// Makes `table` hold exactly `values`, touching only keys that differ.
fn sync_table(table: &mut HashTable, values: &KeyValues) {
    let stale: Vec<String> = keyvalue::populate(table)
        .into_keys()
        .filter(|k| !values.keys().any(|v| v.eq_ignore_ascii_case(k)))
        .collect();
    for key in &stale {
        keyvalue::remove(table, key);
    }
    for (key, value) in values {
        keyvalue::set(table, key, value);
    }
}

/// A layer described by an external catalog, for
/// [`Document::import_layer`](crate::Document::import_layer).
#[derive(Debug, Clone, PartialEq)]
pub struct LayerImport {
    pub name: String,
    /// Data source, e.g. a shapefile path or a SQL statement.
    pub data: String,
    pub projection: String,
    pub geometry: LayerType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_layer_has_engine_defaults() {
        let layer = Layer::new("roads");
        assert_eq!(layer.name(), "roads");
        assert_eq!(layer.status, LayerStatus::On);
        assert_eq!(layer.opacity, 100);
        assert_eq!(layer.minscaledenom, -1.0);
        assert!(layer.labelcache);
        assert!(!layer.postlabelcache);
        assert_eq!(layer.tolerance, 3.0);
        assert_eq!(layer.maxfeatures, -1);
    }

    #[test]
    fn write_to_reports_changes() {
        let mut obj = LayerObj {
            name: "roads".into(),
            ..LayerObj::default()
        };
        let mut layer = Layer::from_obj(&obj);
        assert!(!layer.write_to(&mut obj));

        layer.opacity = 40;
        layer.metadata.insert("wms_title".into(), "Roads".into());
        assert!(layer.write_to(&mut obj));
        assert_eq!(obj.opacity, 40);
        assert_eq!(obj.metadata.lookup("wms_title"), Some("Roads"));
        assert_eq!(Layer::from_obj(&obj), layer);
    }

    #[test]
    fn write_to_drops_removed_metadata() {
        let mut obj = LayerObj::default();
        obj.metadata.insert("a", "1");
        obj.metadata.insert("b", "2");
        let mut layer = Layer::from_obj(&obj);
        layer.metadata.shift_remove("a");
        assert!(layer.write_to(&mut obj));
        assert_eq!(obj.metadata.lookup("a"), None);
        assert_eq!(obj.metadata.lookup("b"), Some("2"));
    }

    #[test]
    fn write_to_keeps_name() {
        let mut obj = LayerObj {
            name: "roads".into(),
            ..LayerObj::default()
        };
        let layer = Layer::new("rivers");
        layer.write_to(&mut obj);
        assert_eq!(obj.name, "roads");
    }

    #[test]
    fn index_follows_the_map() {
        let mut map = MapObj::new();
        for name in ["a", "b", "c"] {
            let index = map.grow_layer_slot().unwrap();
            map.init_layer_defaults(index);
            map.layer_mut(index).unwrap().name = name.into();
            map.append_draw_order(index);
        }
        let c = Layer::from_obj(map.layer(2).unwrap());
        assert_eq!(c.index_in(&map), Some(2));
        map.remove_layer_at(0);
        assert_eq!(c.index_in(&map), Some(1));
    }
}
