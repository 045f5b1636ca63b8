//! Parses decoded tile layers into registered features, draws them in z-ordered passes, and runs
//! the per-layer hit test (§4.7).

use std::collections::HashMap;
use std::sync::Arc;

use mvt::MvtFeature;

use crate::feature::{Feature, FeatureId, FeatureRegistry, GeometryKind, TileFragment};
use crate::geometry_cache::GeometryTransform;
use crate::host::HostCanvas;
use crate::projection::{self, Point};
use crate::style::{Style, StyleResolver};
use crate::tile_key::TileKey;

/// Hit-test tolerance added to half the line width for LineString features (§4.7).
pub const HIT_TEST_LINE_TOLERANCE: f64 = 2.0;

/// A function that extracts a feature id from a decoded feature, or declines to (falling through
/// to the next step of the fallback chain).
pub type IdExtractor = Arc<dyn Fn(&MvtFeature) -> Option<FeatureId> + Send + Sync>;

/// A per-feature filter; `false` drops the feature before it is ever registered.
pub type FeatureFilter = Arc<dyn Fn(&MvtFeature) -> bool + Send + Sync>;

/// One named vector-tile layer: its style, optional filter/id-extractor, and the draw order of
/// its features within each tile that mentions it.
pub struct Layer {
    name: String,
    id_extractor: Option<IdExtractor>,
    default_id_property: Option<String>,
    filter: Option<FeatureFilter>,
    style: Style,
    tiles: HashMap<TileKey, Vec<FeatureId>>,
    synthetic_id_counter: u64,
}

enum DrawPass {
    Regular,
    Hovered,
    Selected,
}

impl Layer {
    /// Creates a layer with no filter or custom id extractor.
    pub fn new(name: impl Into<String>, style: Style) -> Self {
        Self {
            name: name.into(),
            id_extractor: None,
            default_id_property: None,
            filter: None,
            style,
            tiles: HashMap::new(),
            synthetic_id_counter: 0,
        }
    }

    /// The layer's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs a custom id extractor, tried before the built-in fallback chain.
    pub fn set_id_extractor(&mut self, extractor: IdExtractor) {
        self.id_extractor = Some(extractor);
    }

    /// Sets the configured default id property, tried after `feature.id`.
    pub fn set_default_id_property(&mut self, property: impl Into<String>) {
        self.default_id_property = Some(property.into());
    }

    /// Installs or replaces the per-feature filter.
    pub fn set_filter(&mut self, filter: Option<FeatureFilter>) {
        self.filter = filter;
    }

    /// Replaces the base style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn extract_id(&mut self, feature: &MvtFeature) -> FeatureId {
        if let Some(extractor) = &self.id_extractor {
            if let Some(id) = extractor(feature) {
                return id;
            }
        }
        if let Some(id) = feature.id {
            return FeatureId::Number(id as i64);
        }
        if let Some(property) = &self.default_id_property {
            if let Some(value) = feature.properties.get(property) {
                return FeatureId::from_value(value);
            }
        }
        for key in ["id", "Id", "ID"] {
            if let Some(value) = feature.properties.get(key) {
                return FeatureId::from_value(value);
            }
        }
        self.synthetic_id_counter += 1;
        // Negative ids never collide with a real, protobuf-sourced non-negative numeric id.
        FeatureId::Number(-(self.synthetic_id_counter as i64))
    }

    /// Parses one tile's decoded layer data into the registry (§4.7 steps 1-3).
    pub fn ingest(
        &mut self,
        tile_key: TileKey,
        mvt_layer: &mvt::MvtLayer,
        divisor: f64,
        registry: &mut FeatureRegistry,
    ) {
        let mut order = Vec::with_capacity(mvt_layer.features.len());

        for mvt_feature in &mvt_layer.features {
            if let Some(filter) = &self.filter {
                if !filter(mvt_feature) {
                    continue;
                }
            }

            let id = self.extract_id(mvt_feature);
            let kind = GeometryKind::from(&mvt_feature.geometry);
            let fragment = TileFragment::new(mvt_feature.clone(), divisor);

            match registry.get_mut(&id) {
                Some(existing) => {
                    existing.set_properties(mvt_feature.properties.clone());
                    existing.insert_fragment(tile_key, fragment);
                }
                None => {
                    let mut feature = Feature::new(id.clone(), kind, mvt_feature.properties.clone());
                    feature.insert_fragment(tile_key, fragment);
                    registry.register(feature);
                    // Newly materialized features inherit whatever the registry already thinks
                    // about their id, e.g. selection that survived a zoom change (§3, §4.6).
                    let selected = registry.is_selected(&id);
                    let hovered = registry.is_hovered(&id);
                    registry.mark_selected(&id, selected);
                    registry.mark_hovered(&id, hovered);
                }
            }

            order.push(id);
        }

        self.tiles.insert(tile_key, order);
    }

    /// Draws this layer's contribution to `tile_key` in three z-ordered passes: regular features
    /// first, then hovered, then selected (§4.7 step 4).
    pub fn draw(
        &self,
        tile_key: TileKey,
        canvas: &mut dyn HostCanvas,
        registry: &FeatureRegistry,
        transform: &GeometryTransform,
    ) {
        let Some(order) = self.tiles.get(&tile_key) else {
            return;
        };

        for pass in [DrawPass::Regular, DrawPass::Hovered, DrawPass::Selected] {
            for id in order {
                let Some(feature) = registry.get(id) else {
                    continue;
                };
                let in_pass = match pass {
                    DrawPass::Regular => !feature.is_selected() && !feature.is_hovered(),
                    DrawPass::Hovered => feature.is_hovered() && !feature.is_selected(),
                    DrawPass::Selected => feature.is_selected(),
                };
                if in_pass {
                    self.draw_feature(tile_key, feature, canvas, transform);
                }
            }
        }
    }

    fn draw_feature(
        &self,
        tile_key: TileKey,
        feature: &Feature,
        canvas: &mut dyn HostCanvas,
        transform: &GeometryTransform,
    ) {
        let Some(fragment) = feature.tiles().get(&tile_key) else {
            return;
        };
        let sub_paths = feature.canvas_geometry(tile_key, transform);
        if sub_paths.is_empty() {
            return;
        }
        let draw_style = StyleResolver::resolve(
            &self.style,
            &fragment.vector_tile_feature,
            feature.kind(),
            feature.is_selected(),
            feature.is_hovered(),
        );
        canvas.draw_paths(&sub_paths, feature.kind(), &draw_style);
    }

    /// Runs the hit test for `point` (already in this tile's canvas pixel space) against every
    /// feature this layer drew into `tile_key`, per §4.7 step 5. Selected features are checked
    /// first, regardless of draw order, then every feature in reverse draw order.
    pub fn hit_test(
        &self,
        tile_key: TileKey,
        point: Point,
        registry: &FeatureRegistry,
        transform: &GeometryTransform,
    ) -> Option<FeatureId> {
        let order = self.tiles.get(&tile_key)?;

        let selected_first = order.iter().filter(|id| registry.is_selected(id));
        let rest_reversed = order.iter().rev();

        let mut best_distance = f64::INFINITY;
        let mut best: Option<FeatureId> = None;

        for id in selected_first.chain(rest_reversed) {
            let Some(feature) = registry.get(id) else {
                continue;
            };
            let Some(fragment) = feature.tiles().get(&tile_key) else {
                continue;
            };
            let sub_paths = feature.canvas_geometry(tile_key, transform);
            if sub_paths.is_empty() {
                continue;
            }
            let draw_style = StyleResolver::resolve(
                &self.style,
                &fragment.vector_tile_feature,
                feature.kind(),
                feature.is_selected(),
                feature.is_hovered(),
            );

            let mut line_distance = None;
            let hit = match feature.kind() {
                GeometryKind::Polygon => sub_paths
                    .iter()
                    .any(|ring| projection::is_point_in_polygon(point, ring)),
                GeometryKind::Point => sub_paths.iter().flatten().any(|p| {
                    projection::in_circle(p.x, p.y, draw_style.radius_or_default(), point.x, point.y)
                }),
                GeometryKind::LineString => {
                    let distance = sub_paths
                        .iter()
                        .map(|line| projection::distance_from_polyline(point, line))
                        .fold(f64::INFINITY, f64::min);
                    let threshold = draw_style.line_width.unwrap_or(1.0) / 2.0 + HIT_TEST_LINE_TOLERANCE;
                    let within = distance < threshold && distance < best_distance;
                    if within {
                        line_distance = Some(distance);
                    }
                    within
                }
            };

            if !hit {
                continue;
            }

            if matches!(feature.kind(), GeometryKind::Polygon) {
                return Some(id.clone());
            }

            if let Some(distance) = line_distance {
                best_distance = distance;
            }
            best = Some(id.clone());
            if matches!(feature.kind(), GeometryKind::Point) {
                return best;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::DrawStyle;
    use mvt_types::impls::{ClosedContour, Polygon};
    use std::collections::HashMap as StdHashMap;

    fn mvt_point_feature(id: u64, x: f32, y: f32) -> MvtFeature {
        MvtFeature {
            id: Some(id),
            properties: StdHashMap::new(),
            geometry: mvt::MvtGeometry::Point(vec![mvt::Point::new(x, y)]),
        }
    }

    fn mvt_polygon_feature(id: u64, ring: Vec<(f32, f32)>) -> MvtFeature {
        let points: Vec<mvt::Point> = ring.into_iter().map(|(x, y)| mvt::Point::new(x, y)).collect();
        MvtFeature {
            id: Some(id),
            properties: StdHashMap::new(),
            geometry: mvt::MvtGeometry::Polygon(vec![Polygon::new(ClosedContour::new(points), vec![])]),
        }
    }

    fn mvt_layer(features: Vec<MvtFeature>) -> mvt::MvtLayer {
        mvt::MvtLayer {
            name: "test".into(),
            features,
            properties: vec![],
            size: 16,
        }
    }

    #[test]
    fn ingest_registers_new_features_and_reconciles_selection() {
        let mut registry = FeatureRegistry::new();
        registry.mark_selected(&FeatureId::Number(1), true);

        let mut layer = Layer::new("roads", Style::static_base(DrawStyle::default()));
        let tile = TileKey::new(1, 0, 0);
        layer.ingest(tile, &mvt_layer(vec![mvt_point_feature(1, 1.0, 1.0)]), 16.0, &mut registry);

        let feature = registry.get(&FeatureId::Number(1)).unwrap();
        assert!(feature.is_selected());
    }

    #[test]
    fn selected_polygon_wins_over_an_obscuring_point() {
        let mut registry = FeatureRegistry::new();
        let mut layer = Layer::new("mixed", Style::static_base(DrawStyle::default()));
        let tile = TileKey::new(1, 0, 0);

        let polygon = mvt_polygon_feature(
            1,
            vec![(0.0, 0.0), (160.0, 0.0), (160.0, 160.0), (0.0, 160.0)],
        );
        let point = mvt_point_feature(2, 80.0, 80.0);
        layer.ingest(tile, &mvt_layer(vec![polygon, point]), 16.0, &mut registry);
        registry.mark_selected(&FeatureId::Number(1), true);

        let transform = GeometryTransform::identity(16.0, 256.0);
        let hit = layer.hit_test(tile, Point::new(5.0, 5.0), &registry, &transform);

        assert_eq!(hit, Some(FeatureId::Number(1)));
    }

    #[test]
    fn line_hit_test_respects_the_width_plus_tolerance_threshold() {
        let mut registry = FeatureRegistry::new();
        let mut layer = Layer::new("lines", Style::static_base(DrawStyle {
            line_width: Some(2.0),
            ..Default::default()
        }));
        let tile = TileKey::new(1, 0, 0);
        let line = MvtFeature {
            id: Some(1),
            properties: StdHashMap::new(),
            geometry: mvt::MvtGeometry::LineString(vec![mvt_types::impls::Contour::open(vec![
                mvt::Point::new(0.0, 0.0),
                mvt::Point::new(160.0, 0.0),
            ])]),
        };
        layer.ingest(tile, &mvt_layer(vec![line]), 16.0, &mut registry);
        let transform = GeometryTransform::identity(16.0, 256.0);

        // threshold = line_width/2 + tolerance = 1 + 2 = 3
        let miss = layer.hit_test(tile, Point::new(0.0, 3.0), &registry, &transform);
        let hit = layer.hit_test(tile, Point::new(0.0, 2.9), &registry, &transform);

        assert_eq!(miss, None);
        assert_eq!(hit, Some(FeatureId::Number(1)));
    }
}
