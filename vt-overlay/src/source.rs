//! The public facade (§4.12): owns every other component, exposes the mutation surface listed
//! in §6, and drives the tile/interaction/replacement pipelines the host's event loop calls into.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use mvt::MvtTile;
use web_time::Instant;

use crate::availability::{ManifestProvider, TileAvailabilityManifest, TileAvailabilityOracle};
use crate::error::CoreError;
use crate::feature::{Feature, FeatureId, FeatureRegistry};
use crate::host::{HostCanvas, HostMapRuntime, ReplacementFeatureLookup, ReplacementGeometry, TileTransport};
use crate::interaction::{self, ClickOutcome, InteractionRouter, SelectionPolicy};
use crate::layer::{FeatureFilter, IdExtractor, Layer};
use crate::log::{DefaultLog, Log, LogLevel};
use crate::merger::{self, MergedGeometry};
use crate::projection::{self, LatLng, Point};
use crate::scheduler::RedrawScheduler;
use crate::style::{DrawStyle, Style, StyleResolver};
use crate::tile_key::TileKey;
use crate::tile_provider::{TileLifecycle, TileState, DEFAULT_DRAWN_CAP, DEFAULT_VISIBLE_CAP};

/// Which layers participate in hit testing (`setClickableLayers`, §6).
#[derive(Debug, Clone)]
pub enum ClickableLayers {
    /// Every layer is clickable (the default).
    All,
    /// Only the named layers are clickable.
    Only(Vec<String>),
    /// No layer is clickable; clicks never hit anything.
    Disabled,
}

/// Configuration surface for a [`Source`] (§6), built with a consuming builder.
pub struct SourceOptions {
    url: String,
    source_max_zoom: Option<u32>,
    debug: bool,
    tile_size: f64,
    visible_layers: Option<HashSet<String>>,
    xhr_headers: HashMap<String, String>,
    clickable_layers: ClickableLayers,
    filter: Option<FeatureFilter>,
    cache_across_zoom: bool,
    style: Style,
    selected_features: Vec<FeatureId>,
    id_extractor: Option<IdExtractor>,
    default_feature_id_property: Option<String>,
    selection_policy: SelectionPolicy,
    hover_delay: Duration,
    visible_cap: usize,
    drawn_cap: usize,
    replacement_lookup: Option<Arc<dyn ReplacementFeatureLookup>>,
    manifest_provider: Option<Arc<dyn ManifestProvider>>,
    feature_selection_callback: Option<Arc<dyn Fn(&ClickOutcome) + Send + Sync>>,
    on_click: Option<Arc<dyn Fn(&ClickOutcome) + Send + Sync>>,
    on_hover: Option<Arc<dyn Fn(Option<&FeatureId>) + Send + Sync>>,
    tile_availability_manifest: Option<TileAvailabilityManifest>,
    log: Arc<dyn Log>,
}

impl SourceOptions {
    /// Creates options for a tile URL template containing `{z}`, `{x}`, and `{y}` placeholders.
    ///
    /// `xhrHeaders` and similar transport-level options are carried here purely so a host's own
    /// transport construction can read them back; this crate never issues an HTTP request itself.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_max_zoom: None,
            debug: false,
            tile_size: 256.0,
            visible_layers: None,
            xhr_headers: HashMap::new(),
            clickable_layers: ClickableLayers::All,
            filter: None,
            cache_across_zoom: true,
            style: Style::static_base(DrawStyle::default()),
            selected_features: Vec::new(),
            id_extractor: None,
            default_feature_id_property: None,
            selection_policy: SelectionPolicy::default(),
            hover_delay: Duration::from_millis(100),
            visible_cap: DEFAULT_VISIBLE_CAP,
            drawn_cap: DEFAULT_DRAWN_CAP,
            replacement_lookup: None,
            manifest_provider: None,
            feature_selection_callback: None,
            on_click: None,
            on_hover: None,
            tile_availability_manifest: None,
            log: Arc::new(DefaultLog),
        }
    }

    /// Caps overzooming at this source zoom level; higher host zooms reuse an ancestor tile.
    pub fn with_source_max_zoom(mut self, zoom: u32) -> Self {
        self.source_max_zoom = Some(zoom);
        self
    }

    /// Draws a coordinate label and border on every tile's first render.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Pixel size of one rendered tile side. Defaults to 256.
    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Restricts which decoded layers are ingested and drawn at all.
    pub fn with_visible_layers(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.visible_layers = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Records one header for the host's own transport construction.
    pub fn with_xhr_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.xhr_headers.insert(key.into(), value.into());
        self
    }

    /// Restricts which layers participate in hit testing.
    pub fn with_clickable_layers(mut self, clickable: ClickableLayers) -> Self {
        self.clickable_layers = clickable;
        self
    }

    /// Installs a per-feature filter, applied before a feature is ever registered.
    pub fn with_filter(mut self, filter: FeatureFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether the feature registry and layer map survive a zoom change. Defaults to `true`.
    pub fn with_cache_across_zoom(mut self, cache: bool) -> Self {
        self.cache_across_zoom = cache;
        self
    }

    /// The base style applied to every layer materialized from this source.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Pre-selects features by id before any tile has ingested them.
    pub fn with_selected_features(mut self, ids: impl IntoIterator<Item = FeatureId>) -> Self {
        self.selected_features = ids.into_iter().collect();
        self
    }

    /// Installs a custom id extractor (`getIDForLayerFeature`).
    pub fn with_id_extractor(mut self, extractor: IdExtractor) -> Self {
        self.id_extractor = Some(extractor);
        self
    }

    /// Sets the configured default id property, tried after `feature.id`.
    pub fn with_default_feature_id_property(mut self, property: impl Into<String>) -> Self {
        self.default_feature_id_property = Some(property.into());
        self
    }

    /// Installs the selection-behavior flags (§4.9).
    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }

    /// The minimum time between processed hover moves.
    pub fn with_hover_delay(mut self, delay: Duration) -> Self {
        self.hover_delay = delay;
        self
    }

    /// Overrides the default FIFO cache caps for visible and drawn tiles.
    pub fn with_cache_capacities(mut self, visible: usize, drawn: usize) -> Self {
        self.visible_cap = visible;
        self.drawn_cap = drawn;
        self
    }

    /// Installs a `getReplacementFeature` lookup (§4.9).
    pub fn with_replacement_lookup(mut self, lookup: Arc<dyn ReplacementFeatureLookup>) -> Self {
        self.replacement_lookup = Some(lookup);
        self
    }

    /// Installs an async provider for `refreshManifest`.
    pub fn with_manifest_provider(mut self, provider: Arc<dyn ManifestProvider>) -> Self {
        self.manifest_provider = Some(provider);
        self
    }

    /// Installs the callback fired whenever the selection set changes.
    pub fn with_feature_selection_callback(mut self, callback: Arc<dyn Fn(&ClickOutcome) + Send + Sync>) -> Self {
        self.feature_selection_callback = Some(callback);
        self
    }

    /// Installs the callback fired on every click, regardless of whether it hit anything.
    pub fn with_on_click(mut self, callback: Arc<dyn Fn(&ClickOutcome) + Send + Sync>) -> Self {
        self.on_click = Some(callback);
        self
    }

    /// Installs the callback fired whenever the hovered feature changes.
    pub fn with_on_hover(mut self, callback: Arc<dyn Fn(Option<&FeatureId>) + Send + Sync>) -> Self {
        self.on_hover = Some(callback);
        self
    }

    /// Installs an initial tile availability manifest.
    pub fn with_tile_availability_manifest(mut self, manifest: TileAvailabilityManifest) -> Self {
        self.tile_availability_manifest = Some(manifest);
        self
    }

    /// Installs a diagnostic sink. Defaults to [`DefaultLog`].
    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }
}

fn tile_divisor(tile: &MvtTile, tile_size: f64) -> f64 {
    let extent = tile.layers.first().map(|layer| layer.size).unwrap_or(4096);
    extent as f64 / tile_size
}

/// The pixel position of `coord` within tile `key`'s own canvas space, consistent with the
/// divisor/tile-size convention [`crate::geometry_cache::GeometryTransform`] uses.
fn tile_local_point(coord: LatLng, key: TileKey, tile_size: f64) -> Point {
    let world0 = projection::lat_lng_to_world(coord.lat, coord.lng);
    let scale = (1u64 << key.z) as f64;
    let px_world = world0.x * scale - key.x as f64 * projection::WORLD_SIZE;
    let py_world = world0.y * scale - key.y as f64 * projection::WORLD_SIZE;
    let ratio = tile_size / projection::WORLD_SIZE;
    Point::new(px_world * ratio, py_world * ratio)
}

fn ring_to_latlng(ring: &geo::LineString<f64>) -> Vec<LatLng> {
    ring.points().map(|p| LatLng::new(p.y(), p.x())).collect()
}

fn polygon_rings(polygon: &geo::Polygon<f64>) -> Vec<Vec<LatLng>> {
    let mut rings = vec![ring_to_latlng(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_to_latlng));
    rings
}

fn replacement_geometry_from_merged(merged: MergedGeometry) -> ReplacementGeometry {
    match merged {
        MergedGeometry::Polygon(polygon) => ReplacementGeometry::Polygon(polygon_rings(&polygon)),
        MergedGeometry::MultiPolygon(multi) => {
            ReplacementGeometry::MultiPolygon(multi.0.iter().map(polygon_rings).collect())
        }
    }
}

/// The interactive overlay source (§1, §4.12). Owns every other component and is the only type a
/// host integration talks to directly.
pub struct Source {
    tile_size: f64,
    source_max_zoom: Option<u32>,
    debug: bool,
    visible_layers: Option<HashSet<String>>,
    clickable_layers: ClickableLayers,
    default_feature_id_property: Option<String>,
    id_extractor: Option<IdExtractor>,
    filter: Option<FeatureFilter>,
    style: Style,
    cache_across_zoom: bool,
    #[allow(dead_code)]
    xhr_headers: HashMap<String, String>,
    visible_cap: usize,
    drawn_cap: usize,

    #[allow(dead_code)]
    url: String,
    transport: Arc<dyn TileTransport>,
    replacement_lookup: Option<Arc<dyn ReplacementFeatureLookup>>,
    manifest_provider: Option<Arc<dyn ManifestProvider>>,
    log: Arc<dyn Log>,

    registry: FeatureRegistry,
    lifecycle: TileLifecycle,
    layers: HashMap<String, Layer>,
    layer_order: Vec<String>,
    availability: TileAvailabilityOracle,
    scheduler: RedrawScheduler,
    interaction: InteractionRouter,
    replaced_ids: HashSet<FeatureId>,

    feature_selection_callback: Option<Arc<dyn Fn(&ClickOutcome) + Send + Sync>>,
    on_click: Option<Arc<dyn Fn(&ClickOutcome) + Send + Sync>>,
    on_hover: Option<Arc<dyn Fn(Option<&FeatureId>) + Send + Sync>>,

    disposed: bool,
}

impl Source {
    /// Constructs a source from `options` and an already-configured transport.
    ///
    /// Fails with [`CoreError::InvalidConfiguration`] if `options`' url template is missing one
    /// of the `{z}`/`{x}`/`{y}` placeholders, since no tile could ever be fetched with it.
    pub fn new(options: SourceOptions, transport: Arc<dyn TileTransport>) -> Result<Self, CoreError> {
        if !(options.url.contains("{z}") && options.url.contains("{x}") && options.url.contains("{y}")) {
            return Err(CoreError::InvalidConfiguration(format!(
                "url must contain {{z}}, {{x}}, and {{y}} placeholders: {}",
                options.url
            )));
        }

        let mut registry = FeatureRegistry::new();
        registry.set_selected_ids(options.selected_features.iter().cloned());

        let interaction = InteractionRouter::new(options.selection_policy, options.hover_delay);

        let mut availability = TileAvailabilityOracle::new();
        availability.set_manifest(options.tile_availability_manifest.clone());

        Ok(Self {
            tile_size: options.tile_size,
            source_max_zoom: options.source_max_zoom,
            debug: options.debug,
            visible_layers: options.visible_layers,
            clickable_layers: options.clickable_layers,
            default_feature_id_property: options.default_feature_id_property,
            id_extractor: options.id_extractor,
            filter: options.filter,
            style: options.style,
            cache_across_zoom: options.cache_across_zoom,
            xhr_headers: options.xhr_headers,
            visible_cap: options.visible_cap,
            drawn_cap: options.drawn_cap,
            url: options.url,
            transport,
            replacement_lookup: options.replacement_lookup,
            manifest_provider: options.manifest_provider,
            log: options.log,
            registry,
            lifecycle: TileLifecycle::new(options.visible_cap, options.drawn_cap, options.source_max_zoom),
            layers: HashMap::new(),
            layer_order: Vec::new(),
            availability,
            scheduler: RedrawScheduler::new(),
            interaction,
            replaced_ids: HashSet::new(),
            feature_selection_callback: options.feature_selection_callback,
            on_click: options.on_click,
            on_hover: options.on_hover,
            disposed: false,
        })
    }

    fn ensure_not_disposed(&self) -> Result<(), CoreError> {
        if self.disposed {
            Err(CoreError::Disposed)
        } else {
            Ok(())
        }
    }

    fn clickable_names(&self) -> Option<Vec<String>> {
        match &self.clickable_layers {
            ClickableLayers::All => None,
            ClickableLayers::Only(names) => Some(names.clone()),
            ClickableLayers::Disabled => Some(Vec::new()),
        }
    }

    fn schedule_redraw_all(&mut self) {
        let keys: Vec<TileKey> = self.lifecycle.visible_keys().copied().collect();
        for key in &keys {
            self.lifecycle.delete_tile_drawn(key);
        }
        self.scheduler.enqueue_all(keys);
    }

    fn ingest_visible_tile(&mut self, key: TileKey) {
        let Some(ctx) = self.lifecycle.get(&key) else {
            return;
        };
        let Some(tile) = ctx.tile.clone() else {
            return;
        };
        let divisor = tile_divisor(&tile, self.tile_size);

        for mvt_layer in &tile.layers {
            if let Some(only) = &self.visible_layers {
                if !only.contains(&mvt_layer.name) {
                    continue;
                }
            }

            if !self.layers.contains_key(&mvt_layer.name) {
                let mut new_layer = Layer::new(mvt_layer.name.clone(), self.style.clone());
                if let Some(extractor) = &self.id_extractor {
                    new_layer.set_id_extractor(extractor.clone());
                }
                if let Some(property) = &self.default_feature_id_property {
                    new_layer.set_default_id_property(property.clone());
                }
                new_layer.set_filter(self.filter.clone());
                self.layers.insert(mvt_layer.name.clone(), new_layer);
                self.layer_order.push(mvt_layer.name.clone());
            }

            let layer = self.layers.get_mut(&mvt_layer.name).expect("just inserted");
            layer.ingest(key, mvt_layer, divisor, &mut self.registry);
        }
    }

    fn find_hit(&self, key: TileKey, tile_point: Point) -> Option<FeatureId> {
        let ctx = self.lifecycle.get(&key)?;
        let tile = ctx.tile.as_deref()?;
        let divisor = tile_divisor(tile, self.tile_size);
        let transform = ctx.geometry_transform(divisor, self.tile_size);

        let ordered: Vec<&Layer> = self.layer_order.iter().filter_map(|n| self.layers.get(n)).collect();
        let clickable = self.clickable_names();

        interaction::hit_test_layers(
            &ordered,
            clickable.as_deref(),
            key,
            tile_point,
            &self.registry,
            &transform,
            self.interaction.policy().limit_to_first_visible_layer,
        )
        .map(|(_, id)| id)
    }

    // -- tile pipeline -----------------------------------------------------------------------

    /// `getTile` (§4.6 step 1): registers `key` as visible and returns the key that should
    /// actually be fetched (an ancestor of `key` when overzoomed past `sourceMaxZoom`).
    pub fn request_tile(&mut self, key: TileKey) -> Result<TileKey, CoreError> {
        self.ensure_not_disposed()?;
        let fetch_key = self.lifecycle.request(key);
        if !self.availability.is_available(fetch_key) {
            self.lifecycle.mark_debug_only(key);
        }
        Ok(fetch_key)
    }

    /// Fetches, decodes, and ingests `key`'s tile. A no-op if `key` is no longer visible or the
    /// response arrives after a zoom change invalidated it (§4.6).
    pub async fn load_tile(&mut self, key: TileKey, current_zoom: u32) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        if !self.lifecycle.is_visible(&key) {
            return Ok(());
        }

        let fetch_key = self.lifecycle.get(&key).map(|ctx| ctx.fetch_key).unwrap_or(key);
        self.lifecycle.mark_fetching(key);

        match self.transport.fetch(fetch_key).await {
            Ok(bytes) => match MvtTile::decode(bytes, true) {
                Ok(tile) => {
                    if self.lifecycle.on_decoded(key, current_zoom, tile) {
                        self.ingest_visible_tile(key);
                        self.scheduler.enqueue(key);
                    }
                }
                Err(err) => {
                    self.log
                        .log(LogLevel::Warn, &format!("tile decode failed for {fetch_key}: {err}"));
                    self.lifecycle.mark_debug_only(key);
                }
            },
            Err(err) => {
                self.log
                    .log(LogLevel::Warn, &format!("tile fetch failed for {fetch_key}: {err}"));
                self.lifecycle.mark_debug_only(key);
            }
        }
        Ok(())
    }

    /// Draws `key` into `canvas`, in z-order across every visible layer (§4.7, §4.8).
    pub fn draw_tile(&mut self, key: TileKey, canvas: &mut dyn HostCanvas) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        let Some(ctx) = self.lifecycle.get(&key) else {
            return Ok(());
        };
        let first_draw = !ctx.drawn;
        let state = ctx.state;
        let tile = ctx.tile.clone();
        let divisor = tile.as_deref().map(|t| tile_divisor(t, self.tile_size)).unwrap_or(1.0);
        let transform = ctx.geometry_transform(divisor, self.tile_size);

        canvas.clear();

        if matches!(state, TileState::DebugOnly) {
            if first_draw {
                canvas.draw_debug_label(key);
            }
            self.lifecycle.mark_rendered(key);
            return Ok(());
        }

        if first_draw && self.debug {
            canvas.draw_debug_label(key);
        }

        if tile.is_some() {
            for name in &self.layer_order {
                if let Some(only) = &self.visible_layers {
                    if !only.contains(name) {
                        continue;
                    }
                }
                if let Some(layer) = self.layers.get(name) {
                    layer.draw(key, canvas, &self.registry, &transform);
                }
            }
        }

        self.lifecycle.mark_rendered(key);
        Ok(())
    }

    /// Clears `visibleTiles` for a viewport zoom change, additionally dropping the feature
    /// registry and layer map when `cache` is disabled (§9).
    pub fn handle_zoom_change(&mut self) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.lifecycle.handle_zoom_change();
        if !self.cache_across_zoom {
            self.registry.clear();
            self.layers.clear();
            self.layer_order.clear();
        }
        Ok(())
    }

    // -- interaction ---------------------------------------------------------------------------

    /// Routes a host click event: hit-tests the clicked tile, applies the selection policy, and
    /// fires `onClick`/`featureSelectionCallback` as appropriate (§4.9).
    pub fn handle_click(&mut self, host: &dyn HostMapRuntime, coord: LatLng) -> Result<ClickOutcome, CoreError> {
        self.ensure_not_disposed()?;

        let zoom = host.current_zoom();
        let pixel = host.pixel_for_lat_lng(coord).unwrap_or(Point::new(0.0, 0.0));
        let tile_key = projection::tile_at_lat_lng(coord.lat, coord.lng, zoom);
        let tile = self.lifecycle.is_visible(&tile_key).then_some(tile_key);
        let tile_point = tile.map(|key| tile_local_point(coord, key, self.tile_size));

        let hit = match (tile, tile_point) {
            (Some(key), Some(point)) => self.find_hit(key, point),
            _ => None,
        };

        let outcome = self
            .interaction
            .handle_click(hit, &mut self.registry, coord, pixel, tile, tile_point);

        if let Some(callback) = &self.on_click {
            callback(&outcome);
        }

        if outcome.selection_changed {
            if let Some(id) = &outcome.feature {
                self.replaced_ids.remove(id);
            }
            if let Some(callback) = &self.feature_selection_callback {
                callback(&outcome);
            }
            if let Some(key) = tile {
                self.scheduler.enqueue(key);
            }
        }

        Ok(outcome)
    }

    /// Routes a host pointer-move event, honoring the hover debounce (§4.9).
    pub fn handle_hover(
        &mut self,
        host: &dyn HostMapRuntime,
        coord: LatLng,
        now: Instant,
    ) -> Result<Option<FeatureId>, CoreError> {
        self.ensure_not_disposed()?;

        if !self.interaction.should_process_hover(now) {
            return Ok(self.registry.hovered_ids().iter().next().cloned());
        }

        let zoom = host.current_zoom();
        let tile_key = projection::tile_at_lat_lng(coord.lat, coord.lng, zoom);
        let hit = if self.lifecycle.is_visible(&tile_key) {
            let tile_point = tile_local_point(coord, tile_key, self.tile_size);
            self.find_hit(tile_key, tile_point)
        } else {
            None
        };

        let changed = self.interaction.set_hover(&mut self.registry, hit.clone());
        if changed {
            if let Some(callback) = &self.on_hover {
                callback(hit.as_ref());
            }
            self.scheduler.enqueue(tile_key);
        }

        Ok(hit)
    }

    fn begin_replacement(&mut self, id: &FeatureId) -> u64 {
        self.interaction.replacement_tracker().begin(id)
    }

    fn resolve_replacement_style(&self, id: &FeatureId) -> DrawStyle {
        let Some(feature) = self.registry.get(id) else {
            return DrawStyle::default();
        };
        let Some(fragment) = feature.tiles().values().next() else {
            return DrawStyle::default();
        };
        StyleResolver::resolve(&self.style, &fragment.vector_tile_feature, feature.kind(), true, false)
    }

    fn finish_replacement(
        &mut self,
        id: &FeatureId,
        generation: u64,
        resolved: Option<ReplacementGeometry>,
        host: &dyn HostMapRuntime,
    ) {
        if !self.interaction.replacement_tracker().is_current(id, generation) {
            return;
        }
        if !self.registry.is_selected(id) {
            return;
        }

        let geometry = match resolved {
            Some(geometry) => Some(geometry),
            None => self
                .registry
                .get(id)
                .and_then(|feature| merger::merge(feature, self.tile_size, self.log.as_ref()))
                .map(replacement_geometry_from_merged),
        };

        if let Some(geometry) = geometry {
            let style = self.resolve_replacement_style(id);
            host.replacement_overlay().set_feature(id, geometry, style);
            self.replaced_ids.insert(id.clone());
        }
    }

    /// Resolves the high-detail replacement geometry for a newly selected `id` (§4.9): asks the
    /// host's `getReplacementFeature` lookup first, falling back to [`merger::merge`] when it
    /// returns `None`. Discards the result if `id` was deselected (or the source disposed) while
    /// the lookup was in flight.
    pub async fn resolve_replacement(&mut self, id: FeatureId, host: &dyn HostMapRuntime) {
        let Some(lookup) = self.replacement_lookup.clone() else {
            return;
        };
        let generation = self.begin_replacement(&id);
        let resolved = lookup.lookup(id.clone()).await;
        self.finish_replacement(&id, generation, resolved, host);
    }

    // -- selection / hover -----------------------------------------------------------------------

    /// Replaces the selection set wholesale. Passing more than one id switches the router into
    /// multiple-selection mode (§6).
    pub fn set_selected_features(
        &mut self,
        ids: impl IntoIterator<Item = FeatureId>,
        host: &dyn HostMapRuntime,
    ) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        let ids: Vec<FeatureId> = ids.into_iter().collect();
        if ids.len() > 1 {
            let mut policy = self.interaction.policy();
            policy.multiple_selection = true;
            self.interaction.set_policy(policy);
        }

        let previous: HashSet<FeatureId> = self.registry.selected_ids().clone();
        self.registry.set_selected_ids(ids.iter().cloned());
        let current: HashSet<FeatureId> = self.registry.selected_ids().clone();

        for id in previous.difference(&current) {
            self.interaction.replacement_tracker().cancel(id);
            host.replacement_overlay().clear_feature(id);
            self.replaced_ids.remove(id);
        }

        self.schedule_redraw_all();
        Ok(())
    }

    /// The currently selected features.
    pub fn selected_features(&self) -> Vec<&Feature> {
        self.registry
            .selected_ids()
            .iter()
            .filter_map(|id| self.registry.get(id))
            .collect()
    }

    /// The currently selected feature ids.
    pub fn selected_feature_ids(&self) -> Vec<FeatureId> {
        self.registry.selected_ids().iter().cloned().collect()
    }

    /// Selected feature ids that have a fragment in `key`.
    pub fn selected_features_in_tile(&self, key: TileKey) -> Vec<FeatureId> {
        self.registry
            .selected_ids()
            .iter()
            .filter(|id| {
                self.registry
                    .get(id)
                    .map(|feature| feature.tiles().contains_key(&key))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Clears the selection set and every replacement overlay it was backing.
    pub fn deselect_all_features(&mut self, host: &dyn HostMapRuntime) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        let ids: Vec<FeatureId> = self.registry.selected_ids().iter().cloned().collect();
        self.registry.set_selected_ids(std::iter::empty());
        for id in &ids {
            self.interaction.replacement_tracker().cancel(id);
            host.replacement_overlay().clear_feature(id);
        }
        self.replaced_ids.clear();
        self.schedule_redraw_all();
        Ok(())
    }

    /// Clears the (at most one) hovered feature.
    pub fn clear_all_hovered_features(&mut self) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        let ids: Vec<FeatureId> = self.registry.hovered_ids().iter().cloned().collect();
        for id in &ids {
            self.registry.mark_hovered(id, false);
        }
        Ok(())
    }

    /// True if `id` is currently selected.
    pub fn is_feature_selected(&self, id: &FeatureId) -> bool {
        self.registry.is_selected(id)
    }

    /// True if `id` is currently hovered.
    pub fn is_feature_hovered(&self, id: &FeatureId) -> bool {
        self.registry.is_hovered(id)
    }

    /// True if `id` currently has a replacement overlay installed.
    pub fn is_feature_replaced(&self, id: &FeatureId) -> bool {
        self.replaced_ids.contains(id)
    }

    // -- configuration mutators ------------------------------------------------------------------

    /// Replaces the base style applied to every materialized layer.
    pub fn set_style(&mut self, style: Style, redraw: bool) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.style = style.clone();
        for layer in self.layers.values_mut() {
            layer.set_style(style.clone());
        }
        if redraw {
            self.schedule_redraw_all();
        }
        Ok(())
    }

    /// Replaces the per-feature filter applied to every materialized layer.
    pub fn set_filter(&mut self, filter: Option<FeatureFilter>, redraw: bool) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.filter = filter.clone();
        for layer in self.layers.values_mut() {
            layer.set_filter(filter.clone());
        }
        if redraw {
            self.schedule_redraw_all();
        }
        Ok(())
    }

    /// Restricts which decoded layers are ingested and drawn; `None` means all of them.
    pub fn set_visible_layers(&mut self, names: Option<Vec<String>>, redraw: bool) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.visible_layers = names.map(|v| v.into_iter().collect());
        if redraw {
            self.schedule_redraw_all();
        }
        Ok(())
    }

    /// Replaces the tile URL template, dropping every materialized tile/layer/feature.
    pub fn set_url(&mut self, url: impl Into<String>, redraw: bool) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.url = url.into();
        self.layers.clear();
        self.layer_order.clear();
        self.lifecycle = TileLifecycle::new(self.visible_cap, self.drawn_cap, self.source_max_zoom);
        self.registry.clear();
        if redraw {
            self.schedule_redraw_all();
        }
        Ok(())
    }

    /// Restricts which layers participate in hit testing.
    pub fn set_clickable_layers(&mut self, layers: ClickableLayers) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.clickable_layers = layers;
        Ok(())
    }

    /// Installs or clears the tile availability manifest.
    pub fn set_tile_availability_manifest(&mut self, manifest: Option<TileAvailabilityManifest>) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.availability.set_manifest(manifest);
        Ok(())
    }

    /// Refetches the manifest from the configured [`ManifestProvider`], if any.
    pub async fn refresh_manifest(&mut self) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        if let Some(provider) = self.manifest_provider.clone() {
            let manifest = provider.fetch().await;
            self.availability.set_manifest(Some(manifest));
        }
        Ok(())
    }

    /// Forces a redraw of one tile on the next debounce tick.
    pub fn redraw_tile(&mut self, key: TileKey) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.lifecycle.delete_tile_drawn(&key);
        self.scheduler.enqueue(key);
        Ok(())
    }

    /// Forces a redraw of every currently visible tile.
    pub fn redraw_all_tiles(&mut self) -> Result<(), CoreError> {
        self.ensure_not_disposed()?;
        self.schedule_redraw_all();
        Ok(())
    }

    /// True once every currently visible tile has finished loading (rendered, cached, or
    /// debug-only).
    pub fn tiles_loaded(&self) -> bool {
        self.lifecycle.visible_keys().all(|key| {
            matches!(
                self.lifecycle.get(key).map(|ctx| ctx.state),
                Some(TileState::Rendered) | Some(TileState::Cached) | Some(TileState::DebugOnly)
            )
        })
    }

    /// Tiles due for a coalesced redraw right now (§4.8); the caller drains and replays each one
    /// through [`Self::draw_tile`].
    pub fn due_tiles(&mut self) -> Vec<TileKey> {
        if self.scheduler.is_due() {
            self.scheduler.drain()
        } else {
            Vec::new()
        }
    }

    /// Tears the source down: cancels in-flight replacement lookups, clears every replacement
    /// overlay, and drops every cache (§4.12, §9). Idempotent.
    pub fn dispose(&mut self, host: &dyn HostMapRuntime) {
        if self.disposed {
            return;
        }
        self.interaction.replacement_tracker().cancel_all();
        for id in self.registry.selected_ids().iter().cloned().collect::<Vec<_>>() {
            host.replacement_overlay().clear_feature(&id);
        }
        self.registry.clear();
        self.layers.clear();
        self.layer_order.clear();
        self.lifecycle = TileLifecycle::new(self.visible_cap, self.drawn_cap, self.source_max_zoom);
        self.scheduler = RedrawScheduler::new();
        self.replaced_ids.clear();
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::{FakeTransport, RecordingOverlaySink};
    use crate::host::ReplacementOverlaySink;
    use mvt::MvtFeature;
    use std::collections::HashMap as StdHashMap;

    fn test_source() -> Source {
        let transport: Arc<dyn TileTransport> = Arc::new(FakeTransport::default());
        Source::new(SourceOptions::new("https://example.com/{z}/{x}/{y}.pbf"), transport)
            .expect("valid configuration")
    }

    struct TestHost<'a> {
        overlay: &'a RecordingOverlaySink,
    }

    impl<'a> HostMapRuntime for TestHost<'a> {
        fn current_zoom(&self) -> u32 {
            0
        }

        fn pixel_for_lat_lng(&self, _coord: LatLng) -> Option<Point> {
            None
        }

        fn visible_tiles(&self, _zoom: u32) -> Vec<TileKey> {
            Vec::new()
        }

        fn replacement_overlay(&self) -> &dyn ReplacementOverlaySink {
            self.overlay
        }
    }

    #[test]
    fn construction_rejects_a_url_missing_placeholders() {
        let transport: Arc<dyn TileTransport> = Arc::new(FakeTransport::default());
        let result = Source::new(SourceOptions::new("https://example.com/tiles.pbf"), transport);
        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }

    #[test]
    fn every_public_mutator_rejects_a_disposed_source() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };
        source.dispose(&host);

        assert!(matches!(source.redraw_all_tiles(), Err(CoreError::Disposed)));
        assert!(matches!(
            source.set_style(Style::static_base(DrawStyle::default()), false),
            Err(CoreError::Disposed)
        ));
    }

    #[test]
    fn dispose_clears_selection_overlays_and_is_idempotent() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };
        let id = FeatureId::Number(1);
        source.registry.mark_selected(&id, true);

        source.dispose(&host);
        source.dispose(&host); // second call is a no-op, not a double-clear

        assert_eq!(overlay.cleared.lock().len(), 1);
        assert!(source.selected_feature_ids().is_empty());
    }

    #[test]
    fn s4_a_replacement_resolved_after_deselection_is_discarded() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };
        let id = FeatureId::Number(7);

        source.registry.mark_selected(&id, true);
        let generation = source.begin_replacement(&id);

        // The deselect (and its cancellation) lands before the lookup resolves.
        source.registry.mark_selected(&id, false);
        source.interaction.replacement_tracker().cancel(&id);

        source.finish_replacement(
            &id,
            generation,
            Some(ReplacementGeometry::Point(LatLng::new(1.0, 1.0))),
            &host,
        );

        assert!(overlay.set.lock().is_empty());
        assert!(!source.is_feature_replaced(&id));
    }

    #[test]
    fn a_replacement_resolved_while_still_selected_is_installed() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };
        let id = FeatureId::Number(8);

        source.registry.mark_selected(&id, true);
        let generation = source.begin_replacement(&id);
        source.finish_replacement(
            &id,
            generation,
            Some(ReplacementGeometry::Point(LatLng::new(1.0, 1.0))),
            &host,
        );

        assert_eq!(overlay.set.lock().len(), 1);
        assert!(source.is_feature_replaced(&id));
    }

    #[test]
    fn s2_selection_survives_a_zoom_change_when_the_feature_reappears() {
        let mut source = test_source();
        let id = FeatureId::Number(3);
        source.registry.mark_selected(&id, true);

        source.handle_zoom_change().unwrap();

        let mvt_feature = MvtFeature {
            id: Some(3),
            properties: StdHashMap::new(),
            geometry: mvt::MvtGeometry::Point(vec![mvt::Point::new(1.0, 1.0)]),
        };
        let mvt_layer = mvt::MvtLayer {
            name: "poi".into(),
            features: vec![mvt_feature],
            properties: vec![],
            size: 256,
        };
        let key = TileKey::new(5, 1, 1);

        if !source.layers.contains_key("poi") {
            let layer = Layer::new("poi", source.style.clone());
            source.layers.insert("poi".to_string(), layer);
            source.layer_order.push("poi".to_string());
        }
        let layer = source.layers.get_mut("poi").unwrap();
        layer.ingest(key, &mvt_layer, 1.0, &mut source.registry);

        assert!(source.registry.get(&id).unwrap().is_selected());
    }

    #[test]
    fn disabling_cache_across_zoom_drops_the_registry_on_zoom_change() {
        let transport: Arc<dyn TileTransport> = Arc::new(FakeTransport::default());
        let mut source = Source::new(
            SourceOptions::new("https://example.com/{z}/{x}/{y}.pbf").with_cache_across_zoom(false),
            transport,
        )
        .unwrap();
        source.registry.register(Feature::new(
            FeatureId::Number(1),
            crate::feature::GeometryKind::Point,
            StdHashMap::new(),
        ));

        source.handle_zoom_change().unwrap();

        assert!(source.registry.is_empty());
    }

    #[test]
    fn set_selected_features_with_more_than_one_id_enables_multiple_selection() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };

        source
            .set_selected_features([FeatureId::Number(1), FeatureId::Number(2)], &host)
            .unwrap();

        assert!(source.interaction.policy().multiple_selection);
        assert_eq!(source.selected_feature_ids().len(), 2);
    }

    #[test]
    fn deselect_all_clears_replacement_overlays() {
        let mut source = test_source();
        let overlay = RecordingOverlaySink::default();
        let host = TestHost { overlay: &overlay };
        let id = FeatureId::Number(4);
        source.registry.mark_selected(&id, true);
        source.replaced_ids.insert(id.clone());

        source.deselect_all_features(&host).unwrap();

        assert!(!source.is_feature_selected(&id));
        assert!(!source.is_feature_replaced(&id));
        assert_eq!(overlay.cleared.lock().len(), 1);
    }
}
