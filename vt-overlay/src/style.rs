//! Composes a feature's base style with its selection/hover state into a concrete draw style
//! (§4.4).

use std::fmt;
use std::sync::Arc;

use mvt::MvtFeature;
use serde::{Deserialize, Serialize};

use crate::feature::GeometryKind;

const ACCENT_COLOR: &str = "#1a73e8";
const DEFAULT_RADIUS: f64 = 3.0;
const SELECTED_RADIUS: f64 = 5.0;
const DEFAULT_LINE_WIDTH: f64 = 1.0;
const SELECTED_LINE_WIDTH_LINE: f64 = 2.0;
const SELECTED_LINE_WIDTH_POLYGON: f64 = 3.0;
const SELECTED_FILL_OPACITY_POLYGON: f64 = 0.35;
const HOVER_OPACITY_INCREMENT: f64 = 0.15;

/// A concrete, fully-resolved draw style with no nested override blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    /// Fill color string, already normalized by [`crate::color::ColorParser`] if desired.
    pub fill_style: Option<String>,
    /// Stroke color string.
    pub stroke_style: Option<String>,
    /// Stroke width in pixels.
    pub line_width: Option<f64>,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: Option<f64>,
    /// Point radius in pixels, defaulting to [`DEFAULT_RADIUS`] where the hit test needs a value.
    pub radius: Option<f64>,
}

impl DrawStyle {
    /// `radius` or the geometry-independent default used by the hit test (§4.7).
    pub fn radius_or_default(&self) -> f64 {
        self.radius.unwrap_or(DEFAULT_RADIUS)
    }

    fn merge_over(&mut self, over: DrawStyle) {
        if over.fill_style.is_some() {
            self.fill_style = over.fill_style;
        }
        if over.stroke_style.is_some() {
            self.stroke_style = over.stroke_style;
        }
        if over.line_width.is_some() {
            self.line_width = over.line_width;
        }
        if over.fill_opacity.is_some() {
            self.fill_opacity = over.fill_opacity;
        }
        if over.radius.is_some() {
            self.radius = over.radius;
        }
    }
}

/// A style, either a fixed set of values or a function of the underlying vector-tile feature.
///
/// Mirrors the `Style = Static(values) | Dynamic(fn)` tagged variant from the design notes; the
/// resolver in [`StyleResolver::resolve`] drives the same merge logic down either branch.
#[derive(Clone)]
pub enum Style {
    /// A fixed style shared by every feature the layer draws.
    Static(StyleTemplate),
    /// A style computed per feature from its decoded vector-tile representation.
    Dynamic(Arc<dyn Fn(&MvtFeature) -> StyleTemplate + Send + Sync>),
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Static(t) => f.debug_tuple("Static").field(t).finish(),
            Style::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl Style {
    /// A static style with no selected/hover overrides.
    pub fn static_base(base: DrawStyle) -> Self {
        Style::Static(StyleTemplate {
            base,
            selected: None,
            hover: None,
        })
    }
}

/// The un-resolved style a layer is configured with: a base plus optional per-state overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleTemplate {
    /// Style applied to a feature that is neither selected nor hovered.
    #[serde(flatten)]
    pub base: DrawStyle,
    /// Override merged over `base` when the feature is selected.
    pub selected: Option<DrawStyle>,
    /// Override merged over `base` when the feature is hovered (and not selected).
    pub hover: Option<DrawStyle>,
}

/// Resolves a [`Style`] plus interaction state into a [`DrawStyle`], per §4.4's resolution order.
pub struct StyleResolver;

impl StyleResolver {
    /// Resolves the effective style for one feature fragment.
    pub fn resolve(
        style: &Style,
        vector_tile_feature: &MvtFeature,
        kind: GeometryKind,
        selected: bool,
        hovered: bool,
    ) -> DrawStyle {
        let template = match style {
            Style::Static(t) => t.clone(),
            Style::Dynamic(f) => f(vector_tile_feature),
        };

        let mut resolved = template.base;

        if selected {
            match template.selected {
                Some(over) => resolved.merge_over(over),
                None => apply_default_selected(&mut resolved, kind),
            }
        } else if hovered {
            match template.hover {
                Some(over) => resolved.merge_over(over),
                None => {
                    let bumped = (resolved.fill_opacity.unwrap_or(1.0) + HOVER_OPACITY_INCREMENT).min(1.0);
                    resolved.fill_opacity = Some(bumped);
                }
            }
        }

        resolved
    }
}

fn apply_default_selected(style: &mut DrawStyle, kind: GeometryKind) {
    match kind {
        GeometryKind::Point => {
            style.fill_style.get_or_insert_with(|| ACCENT_COLOR.to_string());
            style.fill_opacity.get_or_insert(1.0);
            style.radius.get_or_insert(SELECTED_RADIUS);
        }
        GeometryKind::LineString => {
            style.stroke_style.get_or_insert_with(|| ACCENT_COLOR.to_string());
            style.line_width.get_or_insert(SELECTED_LINE_WIDTH_LINE);
        }
        GeometryKind::Polygon => {
            style.fill_style.get_or_insert_with(|| ACCENT_COLOR.to_string());
            style.fill_opacity.get_or_insert(SELECTED_FILL_OPACITY_POLYGON);
            style.stroke_style.get_or_insert_with(|| ACCENT_COLOR.to_string());
            style.line_width.get_or_insert(SELECTED_LINE_WIDTH_POLYGON);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fixture_feature() -> MvtFeature {
        MvtFeature {
            id: Some(1),
            properties: HashMap::new(),
            geometry: mvt::MvtGeometry::Point(vec![]),
        }
    }

    #[test]
    fn unselected_unhovered_yields_the_base_style_untouched() {
        let style = Style::static_base(DrawStyle {
            fill_style: Some("#000".into()),
            ..Default::default()
        });
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Polygon, false, false);
        assert_eq!(resolved.fill_style.as_deref(), Some("#000"));
        assert_eq!(resolved.fill_opacity, None);
    }

    #[test]
    fn selected_polygon_gets_default_overrides_only_where_base_is_unset() {
        let style = Style::static_base(DrawStyle {
            fill_style: Some("#000".into()),
            ..Default::default()
        });
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Polygon, true, false);

        // base fill_style is kept, everything else falls back to the selected default.
        assert_eq!(resolved.fill_style.as_deref(), Some("#000"));
        assert_eq!(resolved.line_width, Some(SELECTED_LINE_WIDTH_POLYGON));
        assert_eq!(resolved.fill_opacity, Some(SELECTED_FILL_OPACITY_POLYGON));
    }

    #[test]
    fn selected_override_block_replaces_the_default_entirely() {
        let style = Style::Static(StyleTemplate {
            base: DrawStyle::default(),
            selected: Some(DrawStyle {
                fill_style: Some("#f00".into()),
                ..Default::default()
            }),
            hover: None,
        });
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Point, true, false);
        assert_eq!(resolved.fill_style.as_deref(), Some("#f00"));
        assert_eq!(resolved.radius, None);
    }

    #[test]
    fn hover_without_override_nudges_opacity_up() {
        let style = Style::static_base(DrawStyle {
            fill_opacity: Some(0.5),
            ..Default::default()
        });
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Polygon, false, true);
        assert_eq!(resolved.fill_opacity, Some(0.65));
    }

    #[test]
    fn selected_takes_priority_over_hovered() {
        let style = Style::static_base(DrawStyle::default());
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Point, true, true);
        assert_eq!(resolved.radius, Some(SELECTED_RADIUS));
    }

    #[test]
    fn dynamic_style_invokes_the_function_with_the_feature() {
        let style = Style::Dynamic(Arc::new(|f: &MvtFeature| StyleTemplate {
            base: DrawStyle {
                fill_style: Some(format!("feature-{}", f.id.unwrap_or(0))),
                ..Default::default()
            },
            selected: None,
            hover: None,
        }));
        let resolved = StyleResolver::resolve(&style, &fixture_feature(), GeometryKind::Point, false, false);
        assert_eq!(resolved.fill_style.as_deref(), Some("feature-1"));
    }
}
