//! Loaded WFS layers and the registry they are kept in.

mod loader;
mod schema;

use std::sync::Arc;

use geojson::FeatureCollection;
use parking_lot::RwLock;
use wfs_map_types::Rect;

pub use loader::{LayerLoad, LayerLoader};
pub use schema::infer_schema;

use crate::config::{LayerConfig, PopupCopy};
use crate::error::WfsMapError;
use crate::popup::{FieldInfo, PopupFormatter};
use crate::style::RenderRule;

/// Opacity layers are added with.
pub const DEFAULT_OPACITY: f32 = 0.7;

/// Where the display engine takes the layer features from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Features fetched by the loader.
    InMemory(FeatureCollection),
    /// The fetch failed; the engine loads the request URL itself.
    Url(String),
}

/// A layer ready to be handed to the display engine.
#[derive(Debug)]
pub struct LoadedLayer {
    config: LayerConfig,
    request_url: String,
    source: DataSource,
    render_rule: RenderRule,
    schema: Vec<FieldInfo>,
    popup: Option<PopupFormatter>,
    extent: Option<Rect>,
    attribution: String,
    opacity: RwLock<f32>,
}

impl LoadedLayer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: LayerConfig,
        request_url: String,
        source: DataSource,
        render_rule: RenderRule,
        schema: Vec<FieldInfo>,
        popup: Option<PopupFormatter>,
        extent: Option<Rect>,
        attribution: String,
    ) -> Self {
        Self {
            config,
            request_url,
            source,
            render_rule,
            schema,
            popup,
            extent,
            attribution,
            opacity: RwLock::new(DEFAULT_OPACITY),
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Configuration the layer was loaded from.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// `GetFeature` URL the layer was requested from.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// Data source.
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetched features, if the fetch succeeded.
    pub fn features(&self) -> Option<&FeatureCollection> {
        match &self.source {
            DataSource::InMemory(collection) => Some(collection),
            DataSource::Url(_) => None,
        }
    }

    /// Returns true if the layer fell back to a URL source.
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, DataSource::Url(_))
    }

    /// Render rule.
    pub fn render_rule(&self) -> &RenderRule {
        &self.render_rule
    }

    /// Field schema. Empty for URL sources until the engine loads them.
    pub fn schema(&self) -> &[FieldInfo] {
        &self.schema
    }

    /// Display fields in popup order.
    pub fn display_fields(&self) -> &[String] {
        self.popup
            .as_ref()
            .map(|popup| popup.display_fields())
            .unwrap_or_default()
    }

    /// Popup formatter, installed once the fields are known.
    ///
    /// Layers loaded from their URL have none: the host builds one with
    /// [`LoadedLayer::popup_for_schema`] when its engine reports the fields.
    pub fn popup(&self) -> Option<&PopupFormatter> {
        self.popup.as_ref()
    }

    /// Popup formatter for this layer given a field schema known to the host.
    pub fn popup_for_schema(&self, schema: &[FieldInfo], copy: PopupCopy) -> PopupFormatter {
        PopupFormatter::new(self.title(), schema, copy)
    }

    /// Bounding extent of the fetched features.
    pub fn extent(&self) -> Option<Rect> {
        self.extent
    }

    /// Attribution text.
    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    /// Initial visibility.
    pub fn visible(&self) -> bool {
        self.config.visible
    }

    /// Minimum display scale, `0` for no limit.
    pub fn min_scale(&self) -> f64 {
        self.config.min_scale
    }

    /// Maximum display scale, `0` for no limit.
    pub fn max_scale(&self) -> f64 {
        self.config.max_scale
    }

    /// Returns true if the layer is framed after loading.
    pub fn use_for_initial_extent(&self) -> bool {
        self.config.use_for_initial_extent
    }

    /// Current opacity.
    pub fn opacity(&self) -> f32 {
        *self.opacity.read()
    }

    /// Sets opacity, clamped to `0..=1`.
    pub fn set_opacity(&self, opacity: f32) {
        *self.opacity.write() = opacity.clamp(0.0, 1.0);
    }
}

/// Loaded layers by title, in the order they were registered. Layers are only ever added.
#[derive(Debug, Default, Clone)]
pub struct LayerRegistry {
    layers: Vec<Arc<LoadedLayer>>,
}

impl LayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer. A second layer with the same title is rejected.
    pub fn insert(&mut self, layer: LoadedLayer) -> Result<Arc<LoadedLayer>, WfsMapError> {
        if self.contains(layer.title()) {
            return Err(WfsMapError::DuplicateLayer(layer.title().to_string()));
        }

        let layer = Arc::new(layer);
        self.layers.push(Arc::clone(&layer));
        Ok(layer)
    }

    /// Layer with the given title.
    pub fn get(&self, title: &str) -> Option<&Arc<LoadedLayer>> {
        self.layers.iter().find(|layer| layer.title() == title)
    }

    /// Returns true if a layer with the given title is registered.
    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    /// Titles in registration order.
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.layers.iter().map(|layer| layer.title())
    }

    /// Layers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<LoadedLayer>> + '_ {
        self.layers.iter()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if no layers are registered.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
