//! Pure, side-effect-free transforms between geographic coordinates, Web-Mercator world points,
//! and tile coordinates, plus the distance/containment primitives the hit-test engine needs.
//!
//! Every function here is total: malformed input yields `+∞` distance, `false` containment, or
//! `(0.0, 0.0)` rather than panicking or returning an `Option`/`Result`. This matches the "core
//! never raises" propagation policy — these are leaf functions with no further error handling
//! to fall back on.

use crate::tile_key::TileKey;

/// Size, in pixels, of the whole world at zoom level 0 in the spherical Mercator projection used
/// throughout this crate.
pub const WORLD_SIZE: f64 = 256.0;

/// A point in a Cartesian plane (world pixels, tile pixels, or screen pixels depending on context).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A geographic coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new coordinate.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geographic bounds of a tile, as returned by [`tile_bounds`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileBounds {
    /// North-east corner.
    pub ne: LatLng,
    /// South-west corner.
    pub sw: LatLng,
}

impl TileBounds {
    /// Returns true if `p` falls within these bounds (inclusive).
    pub fn contains(&self, p: LatLng) -> bool {
        let (lat_min, lat_max) = (self.sw.lat.min(self.ne.lat), self.sw.lat.max(self.ne.lat));
        let (lng_min, lng_max) = (self.sw.lng.min(self.ne.lng), self.sw.lng.max(self.ne.lng));
        p.lat >= lat_min && p.lat <= lat_max && p.lng >= lng_min && p.lng <= lng_max
    }
}

/// Converts a geographic coordinate into a world-pixel point at zoom 0 (a 256x256 pixel world).
///
/// `sin(lat * pi / 180)` is clamped to `[-0.9999, 0.9999]` so poles and near-pole latitudes do
/// not produce an infinite `y`.
pub fn lat_lng_to_world(lat: f64, lng: f64) -> Point {
    let sin_lat = (lat * std::f64::consts::PI / 180.0).sin().clamp(-0.9999, 0.9999);
    let x = WORLD_SIZE * (0.5 + lng / 360.0);
    let y = WORLD_SIZE * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI));
    Point::new(x, y)
}

/// The exact inverse of [`lat_lng_to_world`].
pub fn world_to_lat_lng(p: Point) -> LatLng {
    let lng = (p.x / WORLD_SIZE - 0.5) * 360.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * p.y / WORLD_SIZE);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Returns the tile that contains `(lat, lng)` at zoom level `z`.
pub fn tile_at_lat_lng(lat: f64, lng: f64, z: u32) -> TileKey {
    let world = lat_lng_to_world(lat, lng);
    let tile_size = WORLD_SIZE / 2f64.powi(z as i32);
    TileKey::new(z, (world.x / tile_size).floor() as i64, (world.y / tile_size).floor() as i64)
}

/// Returns the geographic corners of `key`.
pub fn tile_bounds(key: TileKey) -> TileBounds {
    let tile_size = WORLD_SIZE / 2f64.powi(key.z as i32);
    let nw = world_to_lat_lng(Point::new(key.x as f64 * tile_size, key.y as f64 * tile_size));
    let se = world_to_lat_lng(Point::new(
        (key.x + 1) as f64 * tile_size,
        (key.y + 1) as f64 * tile_size,
    ));
    TileBounds {
        ne: LatLng::new(nw.lat, se.lng),
        sw: LatLng::new(se.lat, nw.lng),
    }
}

/// Wraps `x`/`y` into `[0, 2^z)`, as required to display tiles past the antimeridian.
pub fn normalize_tile(x: i64, y: i64, z: u32) -> (i64, i64) {
    let size = 1i64 << z;
    (x.rem_euclid(size), y.rem_euclid(size))
}

/// Standard even-odd ray-cast point-in-polygon test. An empty or degenerate ring yields `false`.
pub fn is_point_in_polygon(p: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        let intersects = ((yi > p.y) != (yj > p.y))
            && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns true if `(x, y)` lies within radius `r` of `(cx, cy)`, using a squared-distance
/// comparison to avoid a square root.
pub fn in_circle(cx: f64, cy: f64, r: f64, x: f64, y: f64) -> bool {
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

/// Euclidean distance from `p` to the closest point on segment `[a, b]`, clamping the projection
/// parameter to `[0, 1]` so the result is always a distance to a point on the segment itself.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let proj = Point::new(a.x + t * dx, a.y + t * dy);
    ((p.x - proj.x).powi(2) + (p.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from `p` to any segment of the polyline `pts`. Returns `+∞` for a polyline
/// with fewer than two points.
pub fn distance_from_polyline(p: Point, pts: &[Point]) -> f64 {
    if pts.len() < 2 {
        return f64::INFINITY;
    }

    pts.windows(2)
        .map(|w| point_to_segment_distance(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn world_round_trip() {
        for (lat, lng) in [(0.0, 0.0), (45.0, 90.0), (-33.3, -120.2), (84.9, 179.9)] {
            let world = lat_lng_to_world(lat, lng);
            let back = world_to_lat_lng(world);
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-6);
            assert_abs_diff_eq!(back.lng, lng, epsilon = 1e-6);
        }
    }

    #[test]
    fn tile_bounds_contain_source_point() {
        for (lat, lng, z) in [(51.5, -0.12, 10), (0.0, 0.0, 3), (-40.0, 170.0, 6)] {
            let key = tile_at_lat_lng(lat, lng, z);
            let bounds = tile_bounds(key);
            assert!(bounds.contains(LatLng::new(lat, lng)), "z={z} lat={lat} lng={lng}");
        }
    }

    #[test]
    fn normalize_wraps_negative_and_overflowing_indices() {
        assert_eq!(normalize_tile(-1, 0, 2), (3, 0));
        assert_eq!(normalize_tile(4, 5, 2), (0, 1));
    }

    #[test]
    fn point_in_polygon_edge_is_inside() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(is_point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!is_point_in_polygon(Point::new(15.0, 5.0), &square));
    }

    #[test]
    fn malformed_polygon_is_never_inside() {
        assert!(!is_point_in_polygon(Point::new(0.0, 0.0), &[]));
        assert!(!is_point_in_polygon(Point::new(0.0, 0.0), &[Point::new(1.0, 1.0)]));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_abs_diff_eq!(point_to_segment_distance(Point::new(-5.0, 0.0), a, b), 5.0);
        assert_abs_diff_eq!(point_to_segment_distance(Point::new(15.0, 0.0), a, b), 5.0);
        assert_abs_diff_eq!(point_to_segment_distance(Point::new(5.0, 3.0), a, b), 3.0);
    }

    #[test]
    fn polyline_distance_is_minimum_over_segments_and_infinite_when_degenerate() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert_abs_diff_eq!(distance_from_polyline(Point::new(10.0, 5.0), &pts), 0.0);
        assert_eq!(distance_from_polyline(Point::new(0.0, 0.0), &[Point::new(1.0, 1.0)]), f64::INFINITY);
    }

    #[test]
    fn in_circle_boundary_is_inclusive() {
        assert!(in_circle(0.0, 0.0, 3.0, 3.0, 0.0));
        assert!(!in_circle(0.0, 0.0, 3.0, 3.01, 0.0));
    }
}
