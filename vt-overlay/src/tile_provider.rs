//! Owns the set of visible and drawn tiles, dispatches fetches through [`HostCanvas`]-agnostic
//! state transitions, and derives overzoom parent keys (§4.6).

use std::sync::Arc;

use mvt::MvtTile;

use crate::fifo_cache::FifoCache;
use crate::geometry_cache::GeometryTransform;
use crate::tile_key::TileKey;

/// Default target cap on simultaneously visible tiles.
pub const DEFAULT_VISIBLE_CAP: usize = 50;
/// Default target cap on tiles retained after having been drawn.
pub const DEFAULT_DRAWN_CAP: usize = 100;

/// Where a tile's context currently sits in the lifecycle described in §4.6.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TileState {
    /// `getTile` was called; a fetch has been enqueued but not yet started.
    Requested,
    /// The byte fetch is in flight.
    Fetching,
    /// Bytes decoded into an [`MvtTile`], not yet parsed into layers.
    Decoded,
    /// Parsed into layers and drawn at least once.
    Rendered,
    /// Rendered, currently visible, and not the most recently inserted in `drawnTiles`.
    Cached,
    /// The availability oracle rejected this tile, or its fetch failed; drawn with debug
    /// annotation only, never decoded.
    DebugOnly,
}

/// Per-tile state tracked while a tile is visible.
pub struct TileContext {
    /// The tile's own coordinates, as requested by the host.
    pub key: TileKey,
    /// Zoom level at the time this context was created, used to drop stale responses.
    pub zoom_at_creation: u32,
    /// The key actually fetched from the transport — an ancestor of `key` when overzoomed.
    pub fetch_key: TileKey,
    /// `key.z - fetch_key.z`; zero unless overzoomed.
    pub overzoom_delta: u32,
    /// Current lifecycle state.
    pub state: TileState,
    /// The decoded tile, once available.
    pub tile: Option<Arc<MvtTile>>,
    /// Whether this tile has been drawn at least once (controls the debug-annotation-once rule).
    pub drawn: bool,
}

impl TileContext {
    /// The transform to apply to this tile's raw geometry, given the configured tile size.
    pub fn geometry_transform(&self, divisor: f64, tile_size: f64) -> GeometryTransform {
        if self.overzoom_delta == 0 {
            GeometryTransform::identity(divisor, tile_size)
        } else {
            let offset = (
                self.key.x.rem_euclid(1i64 << self.overzoom_delta),
                self.key.y.rem_euclid(1i64 << self.overzoom_delta),
            );
            GeometryTransform {
                divisor,
                tile_size,
                overzoom_delta: self.overzoom_delta,
                overzoom_offset: offset,
            }
        }
    }
}

/// The tile lifecycle manager (§4.6): FIFO-capped visible/drawn tile caches, overzoom derivation,
/// and zoom-change bookkeeping.
pub struct TileLifecycle {
    visible_tiles: FifoCache<TileKey, TileContext>,
    drawn_tiles: FifoCache<TileKey, ()>,
    source_max_zoom: Option<u32>,
}

impl TileLifecycle {
    /// Creates a manager with the given caps and optional `sourceMaxZoom`.
    pub fn new(visible_cap: usize, drawn_cap: usize, source_max_zoom: Option<u32>) -> Self {
        Self {
            visible_tiles: FifoCache::new(visible_cap),
            drawn_tiles: FifoCache::new(drawn_cap),
            source_max_zoom,
        }
    }

    /// Registers `key` as requested, deriving an overzoom `fetch_key` if `key.z` exceeds
    /// `sourceMaxZoom`. Returns the key that should actually be fetched from the transport.
    pub fn request(&mut self, key: TileKey) -> TileKey {
        let fetch_key = match self.source_max_zoom {
            Some(max) if key.z > max => key.ancestor(key.z - max),
            _ => key,
        };
        let overzoom_delta = key.z.saturating_sub(fetch_key.z);

        self.visible_tiles.insert(
            key,
            TileContext {
                key,
                zoom_at_creation: key.z,
                fetch_key,
                overzoom_delta,
                state: TileState::Requested,
                tile: None,
                drawn: false,
            },
        );
        fetch_key
    }

    /// Marks `key` as having its fetch in flight.
    pub fn mark_fetching(&mut self, key: TileKey) {
        if let Some(ctx) = self.visible_tiles.get_mut(&key) {
            ctx.state = TileState::Fetching;
        }
    }

    /// Marks `key` as debug-only: the availability oracle rejected it, or its fetch failed.
    pub fn mark_debug_only(&mut self, key: TileKey) {
        if let Some(ctx) = self.visible_tiles.get_mut(&key) {
            ctx.state = TileState::DebugOnly;
        }
    }

    /// Applies a decoded response for `key`. Returns `false` (response dropped) if `current_zoom`
    /// no longer matches the zoom this tile was requested at.
    pub fn on_decoded(&mut self, key: TileKey, current_zoom: u32, tile: MvtTile) -> bool {
        let Some(ctx) = self.visible_tiles.get_mut(&key) else {
            return false;
        };
        if ctx.zoom_at_creation != current_zoom {
            return false;
        }
        ctx.tile = Some(Arc::new(tile));
        ctx.state = TileState::Decoded;
        true
    }

    /// Marks `key` rendered and records it in `drawnTiles`.
    pub fn mark_rendered(&mut self, key: TileKey) {
        if let Some(ctx) = self.visible_tiles.get_mut(&key) {
            ctx.state = TileState::Rendered;
            ctx.drawn = true;
        }
        self.drawn_tiles.insert(key, ());
    }

    /// The context for `key`, if it is currently visible.
    pub fn get(&self, key: &TileKey) -> Option<&TileContext> {
        self.visible_tiles.get(key)
    }

    /// True if `key` is currently visible.
    pub fn is_visible(&self, key: &TileKey) -> bool {
        self.visible_tiles.contains(key)
    }

    /// Every currently visible tile key, in insertion order.
    pub fn visible_keys(&self) -> impl Iterator<Item = &TileKey> {
        self.visible_tiles.keys()
    }

    /// Clears `visibleTiles` on a zoom change. The caller decides separately, based on the
    /// `cache` option, whether to also reset the layer map and feature registry.
    pub fn handle_zoom_change(&mut self) {
        self.visible_tiles.clear();
    }

    /// Invalidates `key`'s drawn-marker ahead of a redraw.
    ///
    /// Some configurations no-op this when caching across zooms is disabled, yet the scheduler
    /// calls it unconditionally before every redraw; both paths are accepted as correct (§9).
    pub fn delete_tile_drawn(&mut self, key: &TileKey) {
        self.drawn_tiles.remove(key);
        if let Some(ctx) = self.visible_tiles.get_mut(key) {
            ctx.drawn = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvt::MvtTile;

    fn empty_tile() -> MvtTile {
        MvtTile { layers: vec![] }
    }

    #[test]
    fn overzoom_derives_the_ancestor_at_source_max_zoom() {
        let mut lifecycle = TileLifecycle::new(50, 100, Some(10));
        let fetch_key = lifecycle.request(TileKey::new(12, 5, 3));
        assert_eq!(fetch_key, TileKey::new(10, 1, 0));

        let ctx = lifecycle.get(&TileKey::new(12, 5, 3)).unwrap();
        assert_eq!(ctx.overzoom_delta, 2);
    }

    #[test]
    fn below_source_max_zoom_passes_through_unchanged() {
        let mut lifecycle = TileLifecycle::new(50, 100, Some(10));
        let fetch_key = lifecycle.request(TileKey::new(8, 1, 1));
        assert_eq!(fetch_key, TileKey::new(8, 1, 1));
    }

    #[test]
    fn decoded_response_after_a_zoom_change_is_dropped() {
        let mut lifecycle = TileLifecycle::new(50, 100, None);
        let key = TileKey::new(5, 1, 1);
        lifecycle.request(key);

        let applied = lifecycle.on_decoded(key, 6, empty_tile());
        assert!(!applied);
        assert!(lifecycle.get(&key).unwrap().tile.is_none());
    }

    #[test]
    fn decoded_response_at_matching_zoom_is_applied() {
        let mut lifecycle = TileLifecycle::new(50, 100, None);
        let key = TileKey::new(5, 1, 1);
        lifecycle.request(key);

        let applied = lifecycle.on_decoded(key, 5, empty_tile());
        assert!(applied);
        assert!(lifecycle.get(&key).unwrap().tile.is_some());
    }

    #[test]
    fn visible_tiles_never_exceed_their_cap() {
        let mut lifecycle = TileLifecycle::new(2, 100, None);
        lifecycle.request(TileKey::new(1, 0, 0));
        lifecycle.request(TileKey::new(1, 1, 0));
        lifecycle.request(TileKey::new(1, 2, 0));

        assert!(!lifecycle.is_visible(&TileKey::new(1, 0, 0)));
        assert!(lifecycle.is_visible(&TileKey::new(1, 1, 0)));
        assert!(lifecycle.is_visible(&TileKey::new(1, 2, 0)));
    }

    #[test]
    fn zoom_change_clears_visible_tiles_only() {
        let mut lifecycle = TileLifecycle::new(50, 100, None);
        let key = TileKey::new(5, 1, 1);
        lifecycle.request(key);
        lifecycle.on_decoded(key, 5, empty_tile());
        lifecycle.mark_rendered(key);

        lifecycle.handle_zoom_change();

        assert!(!lifecycle.is_visible(&key));
    }
}
