//! Interface of the display engine the layers are handed to.
//!
//! Rendering, basemaps and widgets belong to the engine. The application only tells it what to
//! show through [`DisplayEngine`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wfs_map_types::Rect;

use crate::config::MapConfig;
use crate::error::WfsMapError;
use crate::layer::LoadedLayer;

/// Screen corner a widget is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
}

/// Widgets provided by the display engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    /// Zoom buttons.
    Zoom,
    /// Return to the initial view.
    Home,
    /// North arrow.
    Compass,
    /// 2D/3D navigation toggle.
    NavigationToggle,
    /// Current location.
    Locate,
    /// Address search.
    Search,
    /// Basemap picker.
    BasemapGallery,
    /// Layer list with "zoom to layer" and "transparency" actions.
    LayerList,
    /// Legend of the render rules.
    Legend,
}

/// Display engine consumed by [`MapApp`](crate::MapApp).
pub trait DisplayEngine {
    /// Creates the map view with the configured basemap, center, zoom and constraints.
    fn init_view(&mut self, map: &MapConfig) -> Result<(), WfsMapError>;

    /// Adds a loaded layer to the map. The engine reads the data source, render rule, popup,
    /// visibility and scale range from the layer.
    fn add_layer(&mut self, layer: &LoadedLayer) -> Result<(), WfsMapError>;

    /// Moves the view so that the given extent (in WGS84 degrees) is visible.
    fn go_to(&mut self, extent: Rect) -> Result<(), WfsMapError>;

    /// Attaches a widget to a screen corner.
    fn add_widget(&mut self, widget: WidgetKind, anchor: Anchor) -> Result<(), WfsMapError>;

    /// Changes opacity of a layer added earlier.
    fn set_layer_opacity(&mut self, title: &str, opacity: f32) -> Result<(), WfsMapError>;
}

/// Initial view created by a [`HeadlessEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Center as `[lon, lat]`.
    pub center: [f64; 2],
    /// Zoom level.
    pub zoom: f64,
    /// Basemap identifier.
    pub basemap: String,
}

/// Layer as registered with a [`HeadlessEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessLayer {
    /// Layer title.
    pub title: String,
    /// Number of features, `None` for URL sources.
    pub feature_count: Option<usize>,
    /// Current opacity.
    pub opacity: f32,
}

/// Display engine without a screen. It records every request, which is enough for tools that
/// only need the loaded layers and for testing.
#[derive(Debug, Default, Clone)]
pub struct HeadlessEngine {
    view: Option<ViewState>,
    layers: Vec<HeadlessLayer>,
    extents: Vec<Rect>,
    widgets: Vec<(WidgetKind, Anchor)>,
    layer_index: HashMap<String, usize>,
}

impl HeadlessEngine {
    /// Creates an engine with no view.
    pub fn new() -> Self {
        Self::default()
    }

    /// View created by [`DisplayEngine::init_view`].
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    /// Layers in the order they were added.
    pub fn layers(&self) -> &[HeadlessLayer] {
        &self.layers
    }

    /// Every extent passed to [`DisplayEngine::go_to`].
    pub fn extents(&self) -> &[Rect] {
        &self.extents
    }

    /// Attached widgets.
    pub fn widgets(&self) -> &[(WidgetKind, Anchor)] {
        &self.widgets
    }

    fn require_view(&self) -> Result<(), WfsMapError> {
        match self.view {
            Some(_) => Ok(()),
            None => Err(WfsMapError::Engine("view is not initialized".to_string())),
        }
    }
}

impl DisplayEngine for HeadlessEngine {
    fn init_view(&mut self, map: &MapConfig) -> Result<(), WfsMapError> {
        self.view = Some(ViewState {
            center: map.default_center,
            zoom: map.default_zoom,
            basemap: map.default_basemap.clone(),
        });
        Ok(())
    }

    fn add_layer(&mut self, layer: &LoadedLayer) -> Result<(), WfsMapError> {
        self.require_view()?;
        self.layer_index
            .insert(layer.title().to_string(), self.layers.len());
        self.layers.push(HeadlessLayer {
            title: layer.title().to_string(),
            feature_count: layer.features().map(|fc| fc.features.len()),
            opacity: layer.opacity(),
        });
        Ok(())
    }

    fn go_to(&mut self, extent: Rect) -> Result<(), WfsMapError> {
        self.require_view()?;
        self.extents.push(extent);
        Ok(())
    }

    fn add_widget(&mut self, widget: WidgetKind, anchor: Anchor) -> Result<(), WfsMapError> {
        self.require_view()?;
        self.widgets.push((widget, anchor));
        Ok(())
    }

    fn set_layer_opacity(&mut self, title: &str, opacity: f32) -> Result<(), WfsMapError> {
        let index = self
            .layer_index
            .get(title)
            .ok_or_else(|| WfsMapError::NotFound(title.to_string()))?;
        self.layers[*index].opacity = opacity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::config::AppConfig;
    use crate::tests::url_layer;

    #[test]
    fn requests_need_a_view() {
        let mut engine = HeadlessEngine::new();
        assert_matches!(
            engine.add_layer(&url_layer("Vías")),
            Err(WfsMapError::Engine(_))
        );
        assert_matches!(
            engine.go_to(Rect::new(0.0, 0.0, 1.0, 1.0)),
            Err(WfsMapError::Engine(_))
        );

        engine.init_view(&AppConfig::default().map).unwrap();
        let view = engine.view().unwrap();
        assert_eq!(view.center, [-72.6, -38.7]);
        assert_eq!(view.basemap, "topo-vector");

        engine.add_layer(&url_layer("Vías")).unwrap();
        assert_eq!(
            engine.layers(),
            [HeadlessLayer {
                title: "Vías".into(),
                feature_count: None,
                opacity: 0.7,
            }]
        );
    }

    #[test]
    fn opacity_of_unknown_layer() {
        let mut engine = HeadlessEngine::new();
        engine.init_view(&AppConfig::default().map).unwrap();
        engine.add_layer(&url_layer("Soleras")).unwrap();

        engine.set_layer_opacity("Soleras", 1.0).unwrap();
        assert_eq!(engine.layers()[0].opacity, 1.0);
        assert_matches!(
            engine.set_layer_opacity("Predios", 1.0),
            Err(WfsMapError::NotFound(title)) if title == "Predios"
        );
    }
}
