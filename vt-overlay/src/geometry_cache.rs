//! Per-tile, per-feature cache of canvas-space geometry (§4.5).
//!
//! A feature's raw integer geometry is transformed into canvas pixels on every draw unless it is
//! large enough to be worth caching; small features are cheaper to rebuild than to look up.

use std::hash::{Hash, Hasher};

use mvt::{MvtGeometry, Point as MvtPoint};
use quick_cache::unsync::Cache;

use crate::projection::Point;
use crate::tile_key::TileKey;

/// Below this vertex count, caching costs more than it saves (§4.5).
pub const MIN_POINTS_TO_CACHE: usize = 50;

/// Target bound on the number of cached tile entries per feature.
pub const CACHE_CAPACITY: usize = 50;

/// The coordinate transform applied to one tile's raw geometry to produce canvas pixels.
///
/// `overzoom_delta` is nonzero when this tile's content was actually decoded from an ancestor
/// tile at `parentKey`; in that case the point is scaled by `2^delta` and offset by the child
/// tile's position within the ancestor, in tile units.
#[derive(Debug, Copy, Clone)]
pub struct GeometryTransform {
    /// `extent / tileSize` for the tile this geometry came from.
    pub divisor: f64,
    /// Pixel size of one tile side.
    pub tile_size: f64,
    /// Zoom levels between the requested tile and the ancestor actually fetched.
    pub overzoom_delta: u32,
    /// The child tile's `(x, y)` position within its ancestor, in tile units.
    pub overzoom_offset: (i64, i64),
}

impl GeometryTransform {
    /// A transform for a tile that was fetched directly (no overzoom).
    pub fn identity(divisor: f64, tile_size: f64) -> Self {
        Self {
            divisor,
            tile_size,
            overzoom_delta: 0,
            overzoom_offset: (0, 0),
        }
    }

    fn apply(&self, x: f32, y: f32) -> Point {
        let mut px = x as f64 / self.divisor;
        let mut py = y as f64 / self.divisor;
        if self.overzoom_delta > 0 {
            let scale = (1u64 << self.overzoom_delta) as f64;
            px = px * scale - self.overzoom_offset.0 as f64 * self.tile_size;
            py = py * scale - self.overzoom_offset.1 as f64 * self.tile_size;
        }
        Point::new(px, py)
    }
}

/// Builds the canvas-space sub-paths for `geometry` under `transform`.
///
/// Each sub-path is one ring or line part. Points that transform to `NaN` are skipped, and a
/// ring left with no valid vertices is dropped entirely rather than emitted empty.
pub fn build_sub_paths(geometry: &MvtGeometry, transform: &GeometryTransform) -> Vec<Vec<Point>> {
    match geometry {
        MvtGeometry::Point(points) => match ring_points(points.iter(), transform) {
            Some(path) => vec![path],
            None => Vec::new(),
        },
        MvtGeometry::LineString(contours) => contours
            .iter()
            .filter_map(|contour| ring_points(contour.iter(), transform))
            .collect(),
        MvtGeometry::Polygon(polygons) => {
            let mut out = Vec::new();
            for polygon in polygons {
                if let Some(ring) = ring_points(polygon.outer_contour.points.iter(), transform) {
                    out.push(ring);
                }
                for inner in &polygon.inner_contours {
                    if let Some(ring) = ring_points(inner.points.iter(), transform) {
                        out.push(ring);
                    }
                }
            }
            out
        }
    }
}

fn ring_points<'a>(
    points: impl Iterator<Item = &'a MvtPoint>,
    transform: &GeometryTransform,
) -> Option<Vec<Point>> {
    let ring: Vec<Point> = points
        .map(|p| transform.apply(p.x, p.y))
        .filter(|p| !p.x.is_nan() && !p.y.is_nan())
        .collect();
    if ring.is_empty() {
        None
    } else {
        Some(ring)
    }
}

fn total_vertex_count(geometry: &MvtGeometry) -> usize {
    match geometry {
        MvtGeometry::Point(points) => points.len(),
        MvtGeometry::LineString(contours) => contours.iter().map(|c| c.len()).sum(),
        MvtGeometry::Polygon(polygons) => polygons
            .iter()
            .map(|p| {
                p.outer_contour.points.len()
                    + p.inner_contours.iter().map(|c| c.points.len()).sum::<usize>()
            })
            .sum(),
    }
}

/// A cheap fingerprint of `geometry`'s shape, built from the ring count plus the first and last
/// point of up to three rings (§4.5). Used to detect that a feature's geometry reference changed
/// underneath a cached entry without hashing every point.
fn geometry_hash(geometry: &MvtGeometry) -> u64 {
    let (ring_count, samples) = ring_samples(geometry);
    let mut hasher = ahash::AHasher::default();
    ring_count.hash(&mut hasher);
    for (first, last) in samples {
        first.x.to_bits().hash(&mut hasher);
        first.y.to_bits().hash(&mut hasher);
        last.x.to_bits().hash(&mut hasher);
        last.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

fn ring_samples(geometry: &MvtGeometry) -> (usize, Vec<(MvtPoint, MvtPoint)>) {
    fn first_last(points: &[MvtPoint]) -> Option<(MvtPoint, MvtPoint)> {
        Some((*points.first()?, *points.last()?))
    }

    match geometry {
        MvtGeometry::Point(points) => match first_last(points) {
            Some(sample) => (1, vec![sample]),
            None => (0, vec![]),
        },
        MvtGeometry::LineString(contours) => {
            let samples = contours.iter().take(3).filter_map(|c| first_last(c)).collect();
            (contours.len(), samples)
        }
        MvtGeometry::Polygon(polygons) => {
            let rings: Vec<&[MvtPoint]> = polygons
                .iter()
                .flat_map(|p| {
                    std::iter::once(p.outer_contour.points.as_slice())
                        .chain(p.inner_contours.iter().map(|c| c.points.as_slice()))
                })
                .collect();
            let samples = rings.iter().take(3).filter_map(|r| first_last(r)).collect();
            (rings.len(), samples)
        }
    }
}

/// A feature's bounded, per-tile cache of canvas-space sub-paths.
pub struct GeometryCache {
    entries: Cache<TileKey, (u64, Vec<Vec<Point>>)>,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryCache {
    /// Creates an empty cache bounded at [`CACHE_CAPACITY`] tile entries.
    pub fn new() -> Self {
        Self {
            entries: Cache::new(CACHE_CAPACITY),
        }
    }

    /// Returns the canvas-space sub-paths for `geometry` in tile `key`, transformed by
    /// `transform`, serving a cached copy when the geometry hash still matches.
    pub fn get_or_build(
        &mut self,
        key: TileKey,
        geometry: &MvtGeometry,
        transform: &GeometryTransform,
    ) -> Vec<Vec<Point>> {
        if total_vertex_count(geometry) < MIN_POINTS_TO_CACHE {
            return build_sub_paths(geometry, transform);
        }

        let hash = geometry_hash(geometry);
        if let Some((cached_hash, paths)) = self.entries.get(&key) {
            if *cached_hash == hash {
                return paths.clone();
            }
        }

        let built = build_sub_paths(geometry, transform);
        self.entries.insert(key, (hash, built.clone()));
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvt_types::impls::{ClosedContour, Polygon};

    fn point_geometry(n: usize) -> MvtGeometry {
        MvtGeometry::Point((0..n).map(|i| MvtPoint::new(i as f32, i as f32)).collect())
    }

    fn polygon_geometry(ring: Vec<MvtPoint>) -> MvtGeometry {
        MvtGeometry::Polygon(vec![Polygon::new(ClosedContour::new(ring), vec![])])
    }

    #[test]
    fn small_geometry_is_never_cached() {
        let mut cache = GeometryCache::new();
        let transform = GeometryTransform::identity(16.0, 256.0);
        let geometry = point_geometry(3);
        let key = TileKey::new(1, 0, 0);

        let first = cache.get_or_build(key, &geometry, &transform);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].len(), 3);
    }

    #[test]
    fn large_geometry_is_served_from_cache_until_it_changes() {
        let mut cache = GeometryCache::new();
        let transform = GeometryTransform::identity(16.0, 256.0);
        let key = TileKey::new(1, 0, 0);
        let geometry_a = point_geometry(64);

        let built = cache.get_or_build(key, &geometry_a, &transform);
        let served = cache.get_or_build(key, &geometry_a, &transform);
        assert_eq!(built, served);

        let geometry_b = point_geometry(65);
        let rebuilt = cache.get_or_build(key, &geometry_b, &transform);
        assert_ne!(rebuilt.len(), 0);
        assert_eq!(rebuilt[0].len(), 65);
    }

    #[test]
    fn nan_points_are_skipped_and_empty_rings_are_dropped() {
        let mut cache = GeometryCache::new();
        let transform = GeometryTransform::identity(1.0, 256.0);
        let ring = vec![
            MvtPoint::new(f32::NAN, 0.0),
            MvtPoint::new(f32::NAN, f32::NAN),
        ];
        let geometry = polygon_geometry(ring);
        let result = cache.get_or_build(TileKey::new(0, 0, 0), &geometry, &transform);
        assert!(result.is_empty());
    }

    #[test]
    fn overzoom_transform_matches_scenario_math() {
        // S1: parent divisor=16, childZ-parentZ=2, child at (5,3) within its z10 ancestor (1,0),
        // so offset = (5 mod 4, 3 mod 4) = (1, 3).
        let transform = GeometryTransform {
            divisor: 16.0,
            tile_size: 256.0,
            overzoom_delta: 2,
            overzoom_offset: (1, 3),
        };
        let geometry = MvtGeometry::Point(vec![MvtPoint::new(64.0, 128.0)]);
        let paths = build_sub_paths(&geometry, &transform);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0][0], Point::new(-240.0, -736.0));
    }
}
