//! WFS-map loads vector layers from a GeoServer WFS endpoint and prepares them for a host map
//! engine: every configured layer is fetched as GeoJSON, given a render rule and a popup
//! formatter, and handed to the engine.
//!
//! # Quick start
//!
//! ```no_run
//! use wfs_map::{AppConfig, HeadlessEngine, MapApp};
//!
//! # tokio_test::block_on(async {
//! let config = AppConfig::from_path("wfs-map.json")?;
//! let mut app = MapApp::native(config)?;
//! let mut engine = HeadlessEngine::new();
//!
//! app.start(&mut engine).await?;
//! println!("{}", app.status().loading_message(&app.config().ui.loading));
//! # Ok::<(), wfs_map::error::WfsMapError>(())
//! # });
//! ```
//!
//! # Main components
//!
//! * [`AppConfig`] describes the GeoServer endpoint, the layers, the initial view and the user
//!   visible copy. It is created once and passed to everything that needs it.
//! * [`LayerLoader`](layer::LayerLoader) builds the `GetFeature` URL of a layer, fetches its
//!   features through a [`PlatformService`] and produces a [`LoadedLayer`](layer::LoadedLayer).
//!   A failed fetch degrades the layer to a URL source instead of failing the start up.
//! * [`resolve_render_rule`](style::resolve_render_rule) maps the category of a layer to a
//!   [`RenderRule`](style::RenderRule).
//! * [`PopupFormatter`](popup::PopupFormatter) turns feature attributes into popup markup.
//! * [`MapApp`] runs the start sequence against a [`DisplayEngine`], and
//!   [`TableController`](table::TableController) keeps the attribute table in sync with the
//!   selected layer.
//!
//! Rendering, basemaps and widgets are provided by the engine. [`HeadlessEngine`] records what it
//! is asked to do and is enough for tools that only need the loaded data.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod app;
mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod layer;
pub mod platform;
pub mod popup;
pub mod style;
pub mod table;
pub mod wfs;

#[cfg(test)]
pub(crate) mod tests;

pub use app::{AppStatus, MapApp, EXTENT_PADDING};
pub use color::Color;
pub use config::AppConfig;
pub use engine::{DisplayEngine, HeadlessEngine};
pub use platform::PlatformService;

// Reexport wfs_map_types
pub use wfs_map_types;
