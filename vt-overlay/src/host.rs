//! Traits for the external collaborators named in §1: the host map runtime, the byte transport,
//! and the drawing surface. None of these are implemented with real windowing, network, or GPU
//! code in this crate — a concrete integration fills them in; what lives here is only the seam.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::feature::{FeatureId, GeometryKind};
use crate::projection::{LatLng, Point};
use crate::style::DrawStyle;
use crate::tile_key::TileKey;

/// A transport failure: non-200 response, network error, or anything else that should make a
/// tile debug-only rather than propagate as a crate error (§7).
#[derive(Debug, Clone)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// An opaque byte fetch keyed by tile coordinates (§6 "Tile transport"). The core does not care
/// whether this is backed by HTTP, a local MBTiles file, or a test double.
#[async_trait]
pub trait TileTransport: Send + Sync {
    /// Fetches the raw (still-encoded) tile bytes for `key`.
    async fn fetch(&self, key: TileKey) -> Result<Bytes, TransportError>;
}

/// A replacement feature's geometry, expressed in geographic coordinates.
///
/// Stands in for "GeoJSON geometry" (§4.9, §6) without pulling in a JSON value type: the core
/// only ever constructs, stores, and forwards this shape, it never parses arbitrary GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementGeometry {
    /// A single point.
    Point(LatLng),
    /// A single line.
    LineString(Vec<LatLng>),
    /// A polygon as exterior-then-hole rings.
    Polygon(Vec<Vec<LatLng>>),
    /// Several disjoint polygons.
    MultiPolygon(Vec<Vec<Vec<LatLng>>>),
}

/// Host-supplied high-detail geometry lookup for a selected feature (`getReplacementFeature`,
/// §4.9). Resolving to `None` falls back to the [`crate::merger::merge`] reconstruction.
#[async_trait]
pub trait ReplacementFeatureLookup: Send + Sync {
    /// Looks up the replacement geometry for `id`, if the host has one.
    async fn lookup(&self, id: FeatureId) -> Option<ReplacementGeometry>;
}

/// The secondary overlay surface used to draw a [`ReplacementGeometry`] once a selected feature's
/// high-detail geometry is available (§4.9), distinct from the tile canvases.
pub trait ReplacementOverlaySink: Send + Sync {
    /// Draws `geometry` under `id` with `style`, replacing any previous entry for that id.
    fn set_feature(&self, id: &FeatureId, geometry: ReplacementGeometry, style: DrawStyle);

    /// Removes the overlay entry for `id`, if any.
    fn clear_feature(&self, id: &FeatureId);
}

/// The per-tile 2D drawing surface (§3 `TileContext.canvas`, §6 "Host map contract").
///
/// Sub-paths are already in canvas pixel space (the output of
/// [`crate::geometry_cache::build_sub_paths`]); the host only needs to stroke/fill them, it does
/// no further coordinate transformation.
pub trait HostCanvas {
    /// Clears the canvas before a redraw.
    fn clear(&mut self);

    /// Draws one feature's sub-paths with the given resolved style.
    fn draw_paths(&mut self, sub_paths: &[Vec<Point>], kind: GeometryKind, style: &DrawStyle);

    /// Draws the debug annotation (coordinate label, border, corner markers) for a tile,
    /// called only on a tile's first render (§4.8).
    fn draw_debug_label(&mut self, key: TileKey);
}

/// Viewport/projection services the core calls out to, and the sink for replacement features.
pub trait HostMapRuntime: Send + Sync {
    /// The map's current zoom level.
    fn current_zoom(&self) -> u32;

    /// Projects a geographic coordinate to a pixel position in the current viewport, or `None`
    /// if the host has no active projection (§7 "host-runtime absence").
    fn pixel_for_lat_lng(&self, coord: LatLng) -> Option<Point>;

    /// The grid of tiles the viewport currently wants to display at `zoom`.
    fn visible_tiles(&self, zoom: u32) -> Vec<TileKey>;

    /// The secondary overlay surface for replacement features.
    fn replacement_overlay(&self) -> &dyn ReplacementOverlaySink;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// An in-memory transport that serves pre-registered byte buffers, or fails for unknown keys.
    #[derive(Default)]
    pub struct FakeTransport {
        pub tiles: Mutex<HashMap<TileKey, Bytes>>,
    }

    #[async_trait]
    impl TileTransport for FakeTransport {
        async fn fetch(&self, key: TileKey) -> Result<Bytes, TransportError> {
            self.tiles
                .lock()
                .get(&key)
                .cloned()
                .ok_or_else(|| TransportError(format!("no fixture registered for {key}")))
        }
    }

    /// Records every draw call instead of rendering anything, so tests can assert on z-order.
    #[derive(Default)]
    pub struct RecordingCanvas {
        pub cleared: usize,
        pub draws: Vec<(GeometryKind, DrawStyle)>,
        pub debug_labels: Vec<TileKey>,
    }

    impl HostCanvas for RecordingCanvas {
        fn clear(&mut self) {
            self.cleared += 1;
        }

        fn draw_paths(&mut self, _sub_paths: &[Vec<Point>], kind: GeometryKind, style: &DrawStyle) {
            self.draws.push((kind, style.clone()));
        }

        fn draw_debug_label(&mut self, key: TileKey) {
            self.debug_labels.push(key);
        }
    }

    /// Resolves instantly to a pre-registered geometry, or `None` if nothing was registered for
    /// that id.
    #[derive(Default)]
    pub struct FakeReplacementLookup {
        pub geometries: Mutex<HashMap<FeatureId, ReplacementGeometry>>,
    }

    #[async_trait]
    impl ReplacementFeatureLookup for FakeReplacementLookup {
        async fn lookup(&self, id: FeatureId) -> Option<ReplacementGeometry> {
            self.geometries.lock().get(&id).cloned()
        }
    }

    /// Records replacement-overlay calls instead of drawing anything.
    #[derive(Default)]
    pub struct RecordingOverlaySink {
        pub set: Mutex<Vec<(FeatureId, ReplacementGeometry, DrawStyle)>>,
        pub cleared: Mutex<Vec<FeatureId>>,
    }

    impl ReplacementOverlaySink for RecordingOverlaySink {
        fn set_feature(&self, id: &FeatureId, geometry: ReplacementGeometry, style: DrawStyle) {
            self.set.lock().push((id.clone(), geometry, style));
        }

        fn clear_feature(&self, id: &FeatureId) {
            self.cleared.lock().push(id.clone());
        }
    }
}
