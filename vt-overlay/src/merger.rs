//! Reassembles a feature's polygon ring fragments, spread across however many tiles it appears
//! in, into a single logical polygon or multipolygon (§4.11).
//!
//! Used when a selected feature is promoted to a high-detail overlay and no
//! `getReplacementFeature` geometry was supplied (or that lookup returned `None`).

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use geo::{BooleanOps, Coord, Intersects, LineString, MultiPolygon, Polygon as GeoPolygon};

use crate::feature::Feature;
use crate::log::{Log, LogLevel};
use crate::tile_key::TileKey;

/// Quantization used for the exact-match adjacency check; matches MVT's typical ~cm-scale
/// precision loss at tile extent 4096 without making unrelated rings collide.
const COORD_PRECISION: f64 = 1e7;

/// The merger's output: either a single logical polygon or several disjoint ones.
#[derive(Debug, Clone)]
pub enum MergedGeometry {
    /// One polygon, possibly with holes.
    Polygon(GeoPolygon<f64>),
    /// Several disjoint polygons.
    MultiPolygon(MultiPolygon<f64>),
}

/// Merges all polygon fragments of `feature` across its tiles into one geometry.
///
/// Returns `None` if the feature has no polygon fragments at all (including a LineString/Point
/// feature, or a polygon feature whose geometry loader returned nothing).
pub fn merge(feature: &Feature, tile_size: f64, log: &dyn Log) -> Option<MergedGeometry> {
    let rings = collect_geographic_rings(feature, tile_size);
    if rings.is_empty() {
        return None;
    }
    Some(merge_geographic_rings(rings, log))
}

fn collect_geographic_rings(feature: &Feature, tile_size: f64) -> Vec<Vec<(f64, f64)>> {
    let mut rings = Vec::new();
    for (tile_key, fragment) in feature.tiles() {
        let mvt::MvtGeometry::Polygon(polygons) = fragment.geometry() else {
            continue;
        };
        for polygon in polygons {
            rings.push(ring_to_geographic(&polygon.outer_contour.points, *tile_key, fragment.divisor, tile_size));
            for inner in &polygon.inner_contours {
                rings.push(ring_to_geographic(&inner.points, *tile_key, fragment.divisor, tile_size));
            }
        }
    }
    rings
}

fn ring_to_geographic(
    ring: &[mvt::Point],
    tile: TileKey,
    divisor: f64,
    tile_size: f64,
) -> Vec<(f64, f64)> {
    let scale = (1i64 << tile.z) as f64;
    let mut points: Vec<(f64, f64)> = ring
        .iter()
        .map(|p| {
            let pixel_x = p.x as f64 / divisor;
            let pixel_y = p.y as f64 / divisor;
            let global_x = tile.x as f64 + pixel_x / tile_size;
            let global_y = tile.y as f64 + pixel_y / tile_size;
            let lng = (global_x / scale) * 360.0 - 180.0;
            let lat = (std::f64::consts::PI * (1.0 - 2.0 * global_y / scale))
                .sinh()
                .atan()
                .to_degrees();
            (lng, lat)
        })
        .collect();

    // Ensure the ring is closed (§4.11 step 2).
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            points.push(first);
        }
    }
    points
}

fn quantize(p: (f64, f64)) -> (i64, i64) {
    ((p.0 * COORD_PRECISION).round() as i64, (p.1 * COORD_PRECISION).round() as i64)
}

fn to_geo_ring(ring: &[(f64, f64)]) -> LineString<f64> {
    LineString::from(ring.iter().map(|&(x, y)| Coord { x, y }).collect::<Vec<_>>())
}

fn ring_polygon(ring: &[(f64, f64)]) -> GeoPolygon<f64> {
    GeoPolygon::new(to_geo_ring(ring), vec![])
}

fn rings_adjacent(a: &[(f64, f64)], b: &[(f64, f64)]) -> bool {
    let vertices: std::collections::HashSet<(i64, i64)> = a.iter().copied().map(quantize).collect();
    if b.iter().any(|&p| vertices.contains(&quantize(p))) {
        return true;
    }
    to_geo_ring(a).intersects(&to_geo_ring(b))
}

/// Simple union-find with path compression, used to group adjacent rings (§4.11 step 3).
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Groups and unions `rings` (already in geographic coordinates) into a [`MergedGeometry`].
///
/// A panic from the underlying boolean-ops crate during the whole-pipeline pass is treated as a
/// total failure and falls back to [`fallback_by_area`]; a panic unioning one particular pair
/// within a group is treated as a local failure: that ring is kept separate and a warning is
/// logged, without aborting the rest of the merge (§7).
pub fn merge_geographic_rings(rings: Vec<Vec<(f64, f64)>>, log: &dyn Log) -> MergedGeometry {
    match panic::catch_unwind(AssertUnwindSafe(|| group_and_union(&rings, log))) {
        Ok(result) => result,
        Err(_) => {
            log.log(LogLevel::Warn, "polygon merge failed entirely; falling back to area-sorted rings");
            fallback_by_area(rings)
        }
    }
}

fn group_and_union(rings: &[Vec<(f64, f64)>], log: &dyn Log) -> MergedGeometry {
    let n = rings.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rings_adjacent(&rings[i], &rings[j]) {
                uf.union(i, j);
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = uf.find(i);
        groups.entry(root).or_default().push(i);
    }

    let mut polygons: Vec<GeoPolygon<f64>> = Vec::new();
    for indices in groups.into_values() {
        if indices.len() == 1 {
            polygons.push(ring_polygon(&rings[indices[0]]));
            continue;
        }

        let mut merged = MultiPolygon::new(vec![ring_polygon(&rings[indices[0]])]);
        for &idx in &indices[1..] {
            let candidate = MultiPolygon::new(vec![ring_polygon(&rings[idx])]);
            match panic::catch_unwind(AssertUnwindSafe(|| merged.union(&candidate))) {
                Ok(result) => merged = result,
                Err(_) => {
                    log.log(LogLevel::Warn, "ring union failed for one pair; keeping it separate");
                    polygons.push(ring_polygon(&rings[idx]));
                }
            }
        }
        polygons.extend(merged.0);
    }

    if polygons.len() == 1 {
        MergedGeometry::Polygon(polygons.into_iter().next().expect("checked len == 1"))
    } else {
        MergedGeometry::MultiPolygon(MultiPolygon::new(polygons))
    }
}

fn signed_area(ring: &[(f64, f64)]) -> f64 {
    ring.windows(2).map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1).sum::<f64>() / 2.0
}

/// Total-failure fallback (§4.11): every ring, sorted by descending absolute area, emitted as a
/// single `Polygon`. Deliberately does not infer hole relationships (§9).
fn fallback_by_area(mut rings: Vec<Vec<(f64, f64)>>) -> MergedGeometry {
    rings.sort_by(|a, b| signed_area(b).abs().partial_cmp(&signed_area(a).abs()).unwrap());
    let mut iter = rings.into_iter();
    let outer = to_geo_ring(&iter.next().expect("non-empty"));
    let interiors: Vec<LineString<f64>> = iter.map(|r| to_geo_ring(&r)).collect();
    MergedGeometry::Polygon(GeoPolygon::new(outer, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::test_support::RecordingLog;

    fn square(x0: f64, y0: f64, side: f64) -> Vec<(f64, f64)> {
        vec![
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
            (x0, y0),
        ]
    }

    #[test]
    fn two_sharing_a_vertex_merge_while_a_disjoint_third_stays_separate() {
        // S3: two rings share (3.0, 45.0) exactly, a third is far away.
        let a = vec![(1.0, 43.0), (3.0, 43.0), (3.0, 45.0), (1.0, 45.0), (1.0, 43.0)];
        let b = vec![(3.0, 45.0), (5.0, 45.0), (5.0, 47.0), (3.0, 47.0), (3.0, 45.0)];
        let c = square(50.0, 50.0, 2.0);

        let log = RecordingLog::default();
        let result = merge_geographic_rings(vec![a, b, c], &log);

        match result {
            MergedGeometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            MergedGeometry::Polygon(_) => panic!("expected a MultiPolygon with two groups"),
        }
    }

    #[test]
    fn a_single_ring_is_returned_as_a_plain_polygon() {
        let log = RecordingLog::default();
        let result = merge_geographic_rings(vec![square(0.0, 0.0, 1.0)], &log);
        assert!(matches!(result, MergedGeometry::Polygon(_)));
    }

    #[test]
    fn fallback_sorts_by_descending_absolute_area_and_infers_no_holes() {
        let small = square(0.0, 0.0, 1.0);
        let big = square(10.0, 10.0, 5.0);
        let result = fallback_by_area(vec![small.clone(), big.clone()]);

        let MergedGeometry::Polygon(polygon) = result else {
            panic!("fallback always emits a single Polygon");
        };
        assert_eq!(polygon.exterior().points().count(), big.len());
        assert_eq!(polygon.interiors().len(), 1);
    }
}
