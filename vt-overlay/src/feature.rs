//! The [`Feature`] record and the [`FeatureRegistry`] that gives every feature a stable identity
//! across the tiles it happens to appear in.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;

use mvt::{MvtFeature, MvtGeometry, MvtValue};

use crate::geometry_cache::{GeometryCache, GeometryTransform};
use crate::projection::Point;
use crate::tile_key::TileKey;

/// A feature's identity, stable across every tile fragment that contributes to it.
///
/// The decoded tile format allows either a numeric `id` or a string drawn from feature
/// properties (§4.7's ID-extractor fallback chain), so both forms are carried through rather
/// than normalized to one.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum FeatureId {
    /// A numeric feature id, including synthetic negative ids minted for features with none.
    Number(i64),
    /// A string feature id, usually drawn from a property value.
    String(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::String(s) => write!(f, "{s}"),
        }
    }
}

impl FeatureId {
    /// Converts a decoded property value into a feature id, used by the ID-extractor fallback
    /// chain when a feature is identified by a property rather than its protobuf `id`.
    pub(crate) fn from_value(value: &MvtValue) -> Self {
        match value {
            MvtValue::Int64(n) => FeatureId::Number(*n),
            MvtValue::Uint64(n) => FeatureId::Number(*n as i64),
            MvtValue::Float(f) => FeatureId::Number(*f as i64),
            MvtValue::Double(f) => FeatureId::Number(*f as i64),
            other => FeatureId::String(other.to_string()),
        }
    }
}

/// The geometry kind of a feature, mirroring the MVT geometry type tag (1/2/3).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GeometryKind {
    /// A point or multipoint feature.
    Point,
    /// A line or multiline feature.
    LineString,
    /// A polygon or multipolygon feature.
    Polygon,
}

impl From<&MvtGeometry> for GeometryKind {
    fn from(geometry: &MvtGeometry) -> Self {
        match geometry {
            MvtGeometry::Point(_) => GeometryKind::Point,
            MvtGeometry::LineString(_) => GeometryKind::LineString,
            MvtGeometry::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

/// One tile's contribution to a [`Feature`]: the decoded geometry as it appeared in that tile,
/// and the divisor needed to bring its integer coordinates into canvas pixels.
#[derive(Debug, Clone)]
pub struct TileFragment {
    /// The feature as decoded from this particular tile.
    pub vector_tile_feature: MvtFeature,
    /// `extent / tileSize`, fixed once computed for a given tile (§3 invariant).
    pub divisor: f64,
}

impl TileFragment {
    /// Creates a new fragment.
    pub fn new(vector_tile_feature: MvtFeature, divisor: f64) -> Self {
        Self {
            vector_tile_feature,
            divisor,
        }
    }

    /// The fragment's geometry, a shorthand for `vector_tile_feature.geometry`.
    pub fn geometry(&self) -> &MvtGeometry {
        &self.vector_tile_feature.geometry
    }
}

/// A feature tracked across however many tiles it appears in, with its global interaction state.
pub struct Feature {
    id: FeatureId,
    kind: GeometryKind,
    properties: HashMap<String, MvtValue>,
    tiles: HashMap<TileKey, TileFragment>,
    selected: bool,
    hovered: bool,
    geometry_cache: RefCell<GeometryCache>,
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("tiles", &self.tiles.keys().collect::<Vec<_>>())
            .field("selected", &self.selected)
            .field("hovered", &self.hovered)
            .finish()
    }
}

impl Feature {
    /// Creates a new, not-yet-registered feature with no tile fragments.
    pub fn new(id: FeatureId, kind: GeometryKind, properties: HashMap<String, MvtValue>) -> Self {
        Self {
            id,
            kind,
            properties,
            tiles: HashMap::new(),
            selected: false,
            hovered: false,
            geometry_cache: RefCell::new(GeometryCache::new()),
        }
    }

    /// The feature's stable identity.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// The feature's geometry kind.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Current decoded properties (the most recently ingested tile fragment's).
    pub fn properties(&self) -> &HashMap<String, MvtValue> {
        &self.properties
    }

    /// Replaces the properties, called when a later tile fragment updates this feature.
    pub fn set_properties(&mut self, properties: HashMap<String, MvtValue>) {
        self.properties = properties;
    }

    /// Every tile this feature currently has a fragment in.
    pub fn tiles(&self) -> &HashMap<TileKey, TileFragment> {
        &self.tiles
    }

    /// Adds or replaces the fragment for `key`.
    pub fn insert_fragment(&mut self, key: TileKey, fragment: TileFragment) {
        self.tiles.insert(key, fragment);
    }

    /// Drops the fragment for `key`, e.g. when the tile is evicted from `drawnTiles`.
    pub fn remove_fragment(&mut self, key: &TileKey) {
        self.tiles.remove(key);
    }

    /// Whether this feature is currently selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this feature is currently hovered.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// The canvas-space sub-paths for `key`, built or served from this feature's geometry cache.
    /// Returns an empty vec if the feature has no fragment for `key`.
    pub fn canvas_geometry(&self, key: TileKey, transform: &GeometryTransform) -> Vec<Vec<Point>> {
        let Some(fragment) = self.tiles.get(&key) else {
            return Vec::new();
        };
        self.geometry_cache
            .borrow_mut()
            .get_or_build(key, fragment.geometry(), transform)
    }
}

/// Maps `featureId → Feature` and tracks the selected/hovered identity sets, per §4.3.
///
/// Features are held in a dense arena (`Vec<Option<Feature>>`) with a free list, per the
/// arena/index design note: this keeps lookup O(1) while allowing bulk iteration without
/// disturbing indices on removal.
#[derive(Default)]
pub struct FeatureRegistry {
    features: Vec<Option<Feature>>,
    free_list: Vec<usize>,
    index: HashMap<FeatureId, usize>,
    selected_ids: HashSet<FeatureId>,
    hovered_ids: HashSet<FeatureId>,
}

impl FeatureRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `feature` under its id. A no-op (the existing feature is kept) if the id is
    /// already registered.
    pub fn register(&mut self, feature: Feature) {
        if self.index.contains_key(&feature.id) {
            return;
        }
        let id = feature.id.clone();
        let slot = match self.free_list.pop() {
            Some(slot) => {
                self.features[slot] = Some(feature);
                slot
            }
            None => {
                self.features.push(Some(feature));
                self.features.len() - 1
            }
        };
        self.index.insert(id, slot);
    }

    /// Removes `id` from the map and from both the selected and hovered sets.
    pub fn unregister(&mut self, id: &FeatureId) {
        if let Some(slot) = self.index.remove(id) {
            self.features[slot] = None;
            self.free_list.push(slot);
        }
        self.selected_ids.remove(id);
        self.hovered_ids.remove(id);
    }

    /// Looks up a feature by id.
    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        let slot = *self.index.get(id)?;
        self.features[slot].as_ref()
    }

    /// Looks up a feature by id, mutably.
    pub fn get_mut(&mut self, id: &FeatureId) -> Option<&mut Feature> {
        let slot = *self.index.get(id)?;
        self.features[slot].as_mut()
    }

    /// True if `id` is in the selected set.
    pub fn is_selected(&self, id: &FeatureId) -> bool {
        self.selected_ids.contains(id)
    }

    /// True if `id` is in the hovered set.
    pub fn is_hovered(&self, id: &FeatureId) -> bool {
        self.hovered_ids.contains(id)
    }

    /// The full selected-id set.
    pub fn selected_ids(&self) -> &HashSet<FeatureId> {
        &self.selected_ids
    }

    /// The full hovered-id set (at most one entry, see [`Self::mark_hovered`]).
    pub fn hovered_ids(&self) -> &HashSet<FeatureId> {
        &self.hovered_ids
    }

    /// Mutates the selected set and, if the feature is materialized, flips its flag.
    pub fn mark_selected(&mut self, id: &FeatureId, selected: bool) {
        if selected {
            self.selected_ids.insert(id.clone());
        } else {
            self.selected_ids.remove(id);
        }
        if let Some(feature) = self.get_mut(id) {
            feature.selected = selected;
        }
    }

    /// Mutates the hovered set and, if the feature is materialized, flips its flag.
    ///
    /// At most one feature may be hovered at a time (§3 invariant 3): setting `hovered = true`
    /// clears any other id currently in the hovered set first.
    pub fn mark_hovered(&mut self, id: &FeatureId, hovered: bool) {
        if hovered {
            for other in self.hovered_ids.drain().collect::<Vec<_>>() {
                if other != *id {
                    if let Some(feature) = self.get_mut(&other) {
                        feature.hovered = false;
                    }
                }
            }
            self.hovered_ids.insert(id.clone());
        } else {
            self.hovered_ids.remove(id);
        }
        if let Some(feature) = self.get_mut(id) {
            feature.hovered = hovered;
        }
    }

    /// Replaces the selected set wholesale, e.g. for `setSelectedFeatures`.
    pub fn set_selected_ids(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        let new_ids: HashSet<FeatureId> = ids.into_iter().collect();
        let old_ids = std::mem::take(&mut self.selected_ids);
        for id in old_ids.difference(&new_ids) {
            if let Some(feature) = self.get_mut(id) {
                feature.selected = false;
            }
        }
        for id in &new_ids {
            if let Some(feature) = self.get_mut(id) {
                feature.selected = true;
            }
        }
        self.selected_ids = new_ids;
    }

    /// Iterates every materialized feature.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter_map(|slot| slot.as_ref())
    }

    /// Drops every feature and both identity sets, used by `dispose()` and zoom-triggered resets.
    pub fn clear(&mut self) {
        self.features.clear();
        self.free_list.clear();
        self.index.clear();
        self.selected_ids.clear();
        self.hovered_ids.clear();
    }

    /// Number of materialized features.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the registry holds no features.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(id: i64) -> Feature {
        Feature::new(FeatureId::Number(id), GeometryKind::Point, HashMap::new())
    }

    #[test]
    fn register_is_a_no_op_when_id_already_present() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature(1));
        registry.register(feature(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_from_both_sets() {
        let mut registry = FeatureRegistry::new();
        let id = FeatureId::Number(1);
        registry.register(feature(1));
        registry.mark_selected(&id, true);
        registry.mark_hovered(&id, true);

        registry.unregister(&id);

        assert!(registry.get(&id).is_none());
        assert!(!registry.is_selected(&id));
        assert!(!registry.is_hovered(&id));
    }

    #[test]
    fn at_most_one_feature_is_hovered_at_a_time() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature(1));
        registry.register(feature(2));
        let (a, b) = (FeatureId::Number(1), FeatureId::Number(2));

        registry.mark_hovered(&a, true);
        registry.mark_hovered(&b, true);

        assert!(!registry.is_hovered(&a));
        assert!(registry.is_hovered(&b));
        assert_eq!(registry.hovered_ids().len(), 1);
        assert!(!registry.get(&a).unwrap().is_hovered());
        assert!(registry.get(&b).unwrap().is_hovered());
    }

    #[test]
    fn set_selected_ids_reconciles_materialized_flags() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature(1));
        registry.register(feature(2));
        registry.mark_selected(&FeatureId::Number(1), true);

        registry.set_selected_ids([FeatureId::Number(2)]);

        assert!(!registry.get(&FeatureId::Number(1)).unwrap().is_selected());
        assert!(registry.get(&FeatureId::Number(2)).unwrap().is_selected());
        assert_eq!(registry.selected_ids().len(), 1);
    }

    #[test]
    fn reused_slots_do_not_resurrect_the_old_id() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature(1));
        registry.unregister(&FeatureId::Number(1));
        registry.register(feature(2));

        assert!(registry.get(&FeatureId::Number(1)).is_none());
        assert!(registry.get(&FeatureId::Number(2)).is_some());
        assert_eq!(registry.len(), 1);
    }
}
