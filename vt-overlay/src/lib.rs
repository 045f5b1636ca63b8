//! `vt-overlay` turns decoded Mapbox Vector Tile data into an interactive overlay that can be
//! drawn on top of a host slippy map that otherwise only knows how to show raster tiles.
//!
//! The crate does not talk to a network, does not decode protobuf, and does not own a rendering
//! surface — those are the host's job. Instead it owns the parts that are hard to get right no
//! matter which host you're embedded in:
//!
//! * a [`FeatureRegistry`](feature::FeatureRegistry) that gives every feature a stable identity
//!   across tile boundaries and zoom changes,
//! * a [`TileLifecycle`](tile_provider::TileLifecycle) manager with bounded, FIFO-capped caches,
//! * a [`RedrawScheduler`](scheduler::RedrawScheduler) that coalesces many small changes into one
//!   repaint per frame,
//! * an [`InteractionRouter`](interaction::InteractionRouter) that turns pointer events into hit
//!   tests and selection/hover updates,
//! * a [`StyleResolver`](style::StyleResolver) that composes base style with selection/hover state,
//! * and [`merger::merge`], which stitches a feature's ring fragments from several tiles back
//!   into one [`merger::MergedGeometry`] when it is promoted to a high-detail overlay.
//!
//! Everything else — the host map's viewport and projection, the byte transport, and the PBF
//! decoder — is represented only as traits in [`host`]; see that module for the seams a concrete
//! integration has to fill in.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vt_overlay::{CoreError, Source, SourceOptions};
//!
//! fn build(transport: impl vt_overlay::host::TileTransport + 'static) -> Result<Source, CoreError> {
//!     Source::new(
//!         SourceOptions::new("https://example.com/tiles/{z}/{x}/{y}.pbf"),
//!         Arc::new(transport),
//!     )
//! }
//! ```

pub mod availability;
pub mod color;
pub mod error;
pub mod feature;
pub mod geometry_cache;
pub mod host;
pub mod interaction;
pub mod layer;
pub mod log;
pub mod merger;
pub mod projection;
pub mod scheduler;
pub mod source;
pub mod style;
pub mod tile_key;
pub mod tile_provider;

mod fifo_cache;

pub use color::ColorParser;
pub use error::CoreError;
pub use feature::{Feature, FeatureId, FeatureRegistry};
pub use log::{DefaultLog, Log, LogLevel};
pub use source::{ClickableLayers, Source, SourceOptions};
pub use style::{DrawStyle, Style};
pub use tile_key::TileKey;
