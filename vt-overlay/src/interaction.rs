//! Turns host pointer events into hit-test queries and selection/hover updates (§4.9).
//!
//! This module is deliberately host-agnostic: it does not subscribe to anything itself. A host
//! integration calls [`InteractionRouter::handle_click`] / `handle_hover` from its own click and
//! pointer-move listeners.

use std::collections::HashMap;
use std::time::Duration;

use web_time::Instant;

use crate::feature::{FeatureId, FeatureRegistry};
use crate::geometry_cache::GeometryTransform;
use crate::layer::Layer;
use crate::projection::{LatLng, Point};
use crate::tile_key::TileKey;

/// Selection behavior flags from the configuration surface (§6).
#[derive(Debug, Clone, Copy)]
pub struct SelectionPolicy {
    /// When `false`, selecting a feature first deselects every other feature.
    pub multiple_selection: bool,
    /// When `true`, clicking an already-selected feature deselects it.
    pub toggle_selection: bool,
    /// When `false`, clicks never mutate the selection set, only emit the callback.
    pub set_selected_on_click: bool,
    /// When `true`, stop scanning clickable layers once the first hit is found.
    pub limit_to_first_visible_layer: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            multiple_selection: false,
            toggle_selection: false,
            set_selected_on_click: true,
            limit_to_first_visible_layer: false,
        }
    }
}

/// The result of a single click, matching the application callback payload in §4.9 step 4.
#[derive(Debug, Clone)]
pub struct ClickOutcome {
    /// The hit feature, if any.
    pub feature: Option<FeatureId>,
    /// Geographic location of the click.
    pub lat_lng: LatLng,
    /// Pixel location within the viewport.
    pub pixel: Point,
    /// The tile the click fell in, if that tile is visible.
    pub tile: Option<TileKey>,
    /// The click location in that tile's canvas pixel space.
    pub tile_point: Option<Point>,
    /// Whether this click changed the selection set.
    pub selection_changed: bool,
    /// Whether `feature` is selected after this click settles.
    pub is_selected: bool,
}

/// Finds the topmost hit across `layers`, honoring a clickable-layer whitelist.
///
/// Layers are scanned back to front (`layers` is in z-order, bottom first), so the first hit
/// encountered is already the topmost one and is always what gets returned. `limit_to_first_visible_layer`
/// only controls whether the remaining layers are still scanned once that hit is found: set, it
/// stops immediately; unset, it keeps scanning lower-priority layers purely to mirror the
/// unconditional full pass the click handler otherwise makes, even though nothing it finds there
/// can change the result.
pub fn hit_test_layers(
    layers: &[&Layer],
    clickable: Option<&[String]>,
    tile: TileKey,
    point: Point,
    registry: &FeatureRegistry,
    transform: &GeometryTransform,
    limit_to_first_visible_layer: bool,
) -> Option<(String, FeatureId)> {
    let mut found = None;
    for layer in layers.iter().rev() {
        if let Some(names) = clickable {
            if !names.iter().any(|n| n == layer.name()) {
                continue;
            }
        }

        if found.is_some() {
            if limit_to_first_visible_layer {
                break;
            }
            continue;
        }

        if let Some(id) = layer.hit_test(tile, point, registry, transform) {
            found = Some((layer.name().to_string(), id));
            if limit_to_first_visible_layer {
                break;
            }
        }
    }
    found
}

/// Tracks in-flight `getReplacementFeature` lookups by feature id, so a result that arrives after
/// the feature was deselected (or the source disposed) can be discarded (§4.9, §9).
#[derive(Default)]
pub struct ReplacementTracker {
    generations: HashMap<FeatureId, u64>,
}

impl ReplacementTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a new lookup for `id`, returning the generation the caller must present
    /// back to [`Self::is_current`] when the lookup resolves.
    pub fn begin(&mut self, id: &FeatureId) -> u64 {
        let entry = self.generations.entry(id.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// True if `generation` is still the most recent one started for `id` — i.e. the lookup was
    /// not superseded or cancelled before it resolved.
    pub fn is_current(&self, id: &FeatureId, generation: u64) -> bool {
        self.generations.get(id).copied() == Some(generation)
    }

    /// Invalidates any in-flight lookup for `id` (on deselection).
    pub fn cancel(&mut self, id: &FeatureId) {
        if let Some(generation) = self.generations.get_mut(id) {
            *generation += 1;
        }
    }

    /// Invalidates every in-flight lookup (on disposal).
    pub fn cancel_all(&mut self) {
        for generation in self.generations.values_mut() {
            *generation += 1;
        }
    }
}

/// Debounces hover moves and applies the click selection policy (§4.9).
pub struct InteractionRouter {
    policy: SelectionPolicy,
    hover_delay: Duration,
    last_hover_at: Option<Instant>,
    replacement: ReplacementTracker,
}

impl InteractionRouter {
    /// Creates a router with the given policy and hover debounce delay.
    pub fn new(policy: SelectionPolicy, hover_delay: Duration) -> Self {
        Self {
            policy,
            hover_delay,
            last_hover_at: None,
            replacement: ReplacementTracker::new(),
        }
    }

    /// The configured selection policy.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Replaces the selection policy.
    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// The replacement-feature cancellation tracker.
    pub fn replacement_tracker(&mut self) -> &mut ReplacementTracker {
        &mut self.replacement
    }

    /// Applies the selection policy for a click that hit `feature` (or missed entirely), mutating
    /// `registry` unless `set_selected_on_click` is disabled.
    pub fn handle_click(
        &mut self,
        feature: Option<FeatureId>,
        registry: &mut FeatureRegistry,
        lat_lng: LatLng,
        pixel: Point,
        tile: Option<TileKey>,
        tile_point: Option<Point>,
    ) -> ClickOutcome {
        let Some(id) = feature.clone() else {
            return ClickOutcome {
                feature: None,
                lat_lng,
                pixel,
                tile,
                tile_point,
                selection_changed: false,
                is_selected: false,
            };
        };

        if !self.policy.set_selected_on_click {
            return ClickOutcome {
                feature: Some(id.clone()),
                lat_lng,
                pixel,
                tile,
                tile_point,
                selection_changed: false,
                is_selected: registry.is_selected(&id),
            };
        }

        let was_selected = registry.is_selected(&id);
        let before: std::collections::HashSet<FeatureId> = registry.selected_ids().clone();

        if !self.policy.multiple_selection {
            let others: Vec<FeatureId> = registry
                .selected_ids()
                .iter()
                .filter(|other| **other != id)
                .cloned()
                .collect();
            for other in &others {
                registry.mark_selected(other, false);
                self.replacement.cancel(other);
            }
        }

        let now_selected = if self.policy.toggle_selection && was_selected {
            registry.mark_selected(&id, false);
            self.replacement.cancel(&id);
            false
        } else {
            registry.mark_selected(&id, true);
            true
        };

        let selection_changed = *registry.selected_ids() != before;

        ClickOutcome {
            feature: Some(id),
            lat_lng,
            pixel,
            tile,
            tile_point,
            selection_changed,
            is_selected: now_selected,
        }
    }

    /// True if enough time has passed since the last processed hover move to act on a new one.
    pub fn should_process_hover(&mut self, now: Instant) -> bool {
        match self.last_hover_at {
            Some(last) if now.saturating_duration_since(last) < self.hover_delay => false,
            _ => {
                self.last_hover_at = Some(now);
                true
            }
        }
    }

    /// Updates the hovered feature, clearing the previous one if any (§3 invariant: at most one
    /// hovered feature). Returns `true` if the hovered id actually changed.
    pub fn set_hover(&mut self, registry: &mut FeatureRegistry, new_hover: Option<FeatureId>) -> bool {
        let previous: Vec<FeatureId> = registry.hovered_ids().iter().cloned().collect();
        let changed = previous.first() != new_hover.as_ref();

        for id in &previous {
            if Some(id) != new_hover.as_ref() {
                registry.mark_hovered(id, false);
            }
        }
        if let Some(id) = &new_hover {
            registry.mark_hovered(id, true);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(policy: SelectionPolicy) -> InteractionRouter {
        InteractionRouter::new(policy, Duration::ZERO)
    }

    fn origin() -> (LatLng, Point) {
        (LatLng::new(0.0, 0.0), Point::new(0.0, 0.0))
    }

    #[test]
    fn single_selection_mode_deselects_the_previous_feature() {
        let mut registry = FeatureRegistry::new();
        let mut router = router(SelectionPolicy::default());
        let (lat_lng, pixel) = origin();
        let a = FeatureId::Number(1);
        let b = FeatureId::Number(2);

        registry.mark_selected(&a, true);
        router.handle_click(Some(b.clone()), &mut registry, lat_lng, pixel, None, None);

        assert!(!registry.is_selected(&a));
        assert!(registry.is_selected(&b));
    }

    #[test]
    fn toggle_selection_deselects_an_already_selected_feature() {
        let mut registry = FeatureRegistry::new();
        let mut policy = SelectionPolicy::default();
        policy.toggle_selection = true;
        let mut router = router(policy);
        let (lat_lng, pixel) = origin();
        let a = FeatureId::Number(1);

        registry.mark_selected(&a, true);
        let outcome = router.handle_click(Some(a.clone()), &mut registry, lat_lng, pixel, None, None);

        assert!(!registry.is_selected(&a));
        assert!(!outcome.is_selected);
        assert!(outcome.selection_changed);
    }

    #[test]
    fn set_selected_on_click_false_still_emits_a_callback_without_mutating_selection() {
        let mut registry = FeatureRegistry::new();
        let mut policy = SelectionPolicy::default();
        policy.set_selected_on_click = false;
        let mut router = router(policy);
        let (lat_lng, pixel) = origin();
        let a = FeatureId::Number(1);

        let outcome = router.handle_click(Some(a.clone()), &mut registry, lat_lng, pixel, None, None);

        assert!(!registry.is_selected(&a));
        assert!(!outcome.selection_changed);
        assert_eq!(outcome.feature, Some(a));
    }

    #[test]
    fn a_miss_still_delivers_a_callback_with_no_feature() {
        let mut registry = FeatureRegistry::new();
        let mut router = router(SelectionPolicy::default());
        let (lat_lng, pixel) = origin();

        let outcome = router.handle_click(None, &mut registry, lat_lng, pixel, None, None);

        assert!(outcome.feature.is_none());
        assert!(!outcome.selection_changed);
    }

    #[test]
    fn hover_is_always_a_singleton() {
        let mut registry = FeatureRegistry::new();
        let mut router = router(SelectionPolicy::default());
        let a = FeatureId::Number(1);
        let b = FeatureId::Number(2);

        router.set_hover(&mut registry, Some(a.clone()));
        assert!(registry.is_hovered(&a));

        router.set_hover(&mut registry, Some(b.clone()));
        assert!(!registry.is_hovered(&a));
        assert!(registry.is_hovered(&b));
    }

    #[test]
    fn replacement_tracker_discards_a_stale_generation() {
        let mut tracker = ReplacementTracker::new();
        let id = FeatureId::Number(1);

        let generation = tracker.begin(&id);
        tracker.cancel(&id);

        assert!(!tracker.is_current(&id, generation));
    }

    #[test]
    fn replacement_tracker_accepts_the_current_generation() {
        let mut tracker = ReplacementTracker::new();
        let id = FeatureId::Number(1);
        let generation = tracker.begin(&id);
        assert!(tracker.is_current(&id, generation));
    }
}
