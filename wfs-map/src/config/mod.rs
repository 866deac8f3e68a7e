//! Application configuration.
//!
//! [`AppConfig`] is constructed once at start up, either from JSON with [`AppConfig::from_json_str`]
//! or from the built-in [`Default`] deployment, and is then passed by reference to every component
//! that needs it.

mod layer;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use layer::{LayerCategory, LayerConfig, ZONING_FIELD};

use crate::engine::{Anchor, WidgetKind};
use crate::Color;

/// Environment variable selecting the [`BuildMode`].
pub const BUILD_MODE_ENV: &str = "WFS_MAP_BUILD_MODE";

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration is not valid JSON or has wrong structure.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// No layers are configured.
    #[error("no layers configured")]
    NoLayers,
    /// Two layers share the same title.
    #[error("layer title '{0}' is used more than once")]
    DuplicateTitle(String),
    /// More than one layer is marked as the initial extent source.
    #[error("only one layer can be used for initial extent, got: {}", .0.join(", "))]
    MultipleInitialExtentLayers(Vec<String>),
    /// Scale thresholds must be non-negative.
    #[error("layer '{0}' has a negative scale threshold")]
    NegativeScale(String),
    /// Default zoom is outside of the zoom constraints.
    #[error("default zoom {default} is outside of [{min}, {max}]")]
    InvalidZoom {
        /// Default zoom level.
        default: f64,
        /// Minimum zoom level.
        min: f64,
        /// Maximum zoom level.
        max: f64,
    },
}

/// Selects which GeoServer base URL is used.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildMode {
    /// Requests go through the development proxy path.
    #[default]
    Development,
    /// Requests go directly to the server.
    Production,
}

impl BuildMode {
    /// Parses the mode name. Anything other than `production` is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Reads the mode from the [`BUILD_MODE_ENV`] environment variable.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(BUILD_MODE_ENV).ok().as_deref())
    }
}

/// GeoServer endpoint, either fixed or different per [`BuildMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseUrl {
    /// Same URL in every mode.
    Fixed(String),
    /// URL per build mode.
    PerMode {
        /// Proxied path used in development.
        development: String,
        /// Direct URL used in production.
        production: String,
    },
}

impl BaseUrl {
    /// URL for the given mode.
    pub fn resolve(&self, mode: BuildMode) -> &str {
        match (self, mode) {
            (Self::Fixed(url), _) => url,
            (Self::PerMode { development, .. }, BuildMode::Development) => development,
            (Self::PerMode { production, .. }, BuildMode::Production) => production,
        }
    }
}

/// WFS protocol parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WfsConfig {
    /// Protocol version.
    pub version: String,
    /// Requested output format.
    pub output_format: String,
    /// Spatial reference of the returned coordinates.
    pub srs_name: String,
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            output_format: "application/json".to_string(),
            srs_name: "EPSG:4326".to_string(),
        }
    }
}

/// GeoServer connection and layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoServerConfig {
    /// OWS endpoint.
    pub base_url: BaseUrl,
    /// Workspace the feature types belong to.
    pub workspace: String,
    /// WFS request parameters.
    #[serde(default)]
    pub wfs: WfsConfig,
    /// Ordered layer list.
    pub layers: Vec<LayerConfig>,
    /// Attribution text shown for every layer.
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_attribution() -> String {
    "GeoServer Assets10".to_string()
}

/// Zoom limits of the map view.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConstraints {
    /// Minimum zoom level.
    pub min_zoom: f64,
    /// Maximum zoom level.
    pub max_zoom: f64,
}

/// Screen position of a widget.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetPlacement {
    /// Screen anchor.
    pub position: Anchor,
}

/// Map view defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    /// Initial center as `[lon, lat]`.
    pub default_center: [f64; 2],
    /// Initial zoom level.
    pub default_zoom: f64,
    /// Zoom limits.
    pub constraints: MapConstraints,
    /// Basemap identifier understood by the display engine.
    pub default_basemap: String,
    /// Widget positions overriding [`MapConfig::default_widgets`].
    #[serde(default)]
    pub widgets: BTreeMap<WidgetKind, WidgetPlacement>,
}

impl MapConfig {
    /// Widgets attached to every map and their default positions.
    pub fn default_widgets() -> BTreeMap<WidgetKind, WidgetPlacement> {
        [
            (WidgetKind::Home, Anchor::TopLeft),
            (WidgetKind::Compass, Anchor::TopLeft),
            (WidgetKind::Locate, Anchor::TopLeft),
            (WidgetKind::Search, Anchor::TopRight),
            (WidgetKind::BasemapGallery, Anchor::TopRight),
            (WidgetKind::LayerList, Anchor::TopRight),
            (WidgetKind::Legend, Anchor::TopRight),
        ]
        .into_iter()
        .map(|(kind, position)| (kind, WidgetPlacement { position }))
        .collect()
    }

    /// Widgets to attach: the defaults with configured positions applied.
    pub fn effective_widgets(&self) -> BTreeMap<WidgetKind, WidgetPlacement> {
        let mut widgets = Self::default_widgets();
        widgets.extend(self.widgets.iter().map(|(k, v)| (*k, *v)));
        widgets
    }
}

/// Loading overlay copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingCopy {
    /// Overlay title.
    pub title: String,
    /// Prefix of the "N of M layers" progress line.
    pub description: String,
}

impl Default for LoadingCopy {
    fn default() -> Self {
        Self {
            title: "Cargando Mapa...".to_string(),
            description: "Cargando capas:".to_string(),
        }
    }
}

/// Error banner copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorCopy {
    /// Shown when the map view cannot be created.
    pub map_initialization: String,
    /// Prefix of the per-layer failure line.
    pub layer_loading: String,
}

impl Default for ErrorCopy {
    fn default() -> Self {
        Self {
            map_initialization: "Error al inicializar el mapa. Por favor, recarga la página."
                .to_string(),
            layer_loading: "Error cargando".to_string(),
        }
    }
}

/// Popup placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopupCopy {
    /// Placeholder for `null` values.
    pub no_value: String,
    /// Placeholder for empty or whitespace-only strings.
    pub empty: String,
    /// Shown instead of the table when a feature has no attributes.
    pub no_attributes: String,
}

impl Default for PopupCopy {
    fn default() -> Self {
        Self {
            no_value: "sin valor".to_string(),
            empty: "vacío".to_string(),
            no_attributes: "No hay atributos disponibles".to_string(),
        }
    }
}

/// User-visible copy.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Loading overlay.
    pub loading: LoadingCopy,
    /// Error banner.
    pub errors: ErrorCopy,
    /// Popup placeholders.
    pub popup: PopupCopy,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// WFS server and layers.
    pub geoserver: GeoServerConfig,
    /// Map view defaults.
    pub map: MapConfig,
    /// User-visible copy.
    #[serde(default)]
    pub ui: UiConfig,
    /// Build mode selecting the base URL. Not part of the file: read from [`BUILD_MODE_ENV`] when
    /// the configuration is loaded or defaulted, and overridden with [`AppConfig::with_build_mode`].
    #[serde(skip)]
    pub build_mode: BuildMode,
}

impl AppConfig {
    /// Parses and validates a JSON configuration. Layers without an explicit category get one
    /// assigned here, and the build mode is taken from the environment.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.prepare()
    }

    /// Reads a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns the configuration with the given build mode.
    pub fn with_build_mode(self, build_mode: BuildMode) -> Self {
        Self { build_mode, ..self }
    }

    /// GeoServer endpoint for the current build mode.
    pub fn base_url(&self) -> &str {
        self.geoserver.base_url.resolve(self.build_mode)
    }

    /// The layer whose extent is framed after loading, if any.
    pub fn initial_extent_layer(&self) -> Option<&LayerConfig> {
        self.geoserver
            .layers
            .iter()
            .find(|layer| layer.use_for_initial_extent)
    }

    fn prepare(mut self) -> Result<Self, ConfigError> {
        self.build_mode = BuildMode::from_env();
        for layer in &mut self.geoserver.layers {
            if layer.category.is_none() {
                layer.category = Some(LayerCategory::infer(&layer.title));
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layers = &self.geoserver.layers;
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }

        let mut titles = HashSet::new();
        for layer in layers {
            if !titles.insert(layer.title.as_str()) {
                return Err(ConfigError::DuplicateTitle(layer.title.clone()));
            }
            if layer.min_scale < 0.0 || layer.max_scale < 0.0 {
                return Err(ConfigError::NegativeScale(layer.title.clone()));
            }
        }

        let extent_layers: Vec<String> = layers
            .iter()
            .filter(|layer| layer.use_for_initial_extent)
            .map(|layer| layer.title.clone())
            .collect();
        if extent_layers.len() > 1 {
            return Err(ConfigError::MultipleInitialExtentLayers(extent_layers));
        }

        let MapConstraints { min_zoom, max_zoom } = self.map.constraints;
        let default = self.map.default_zoom;
        if !(min_zoom <= default && default <= max_zoom) {
            return Err(ConfigError::InvalidZoom {
                default,
                min: min_zoom,
                max: max_zoom,
            });
        }

        Ok(())
    }
}

impl Default for AppConfig {
    /// Temuco deployment of the `assets10` workspace.
    fn default() -> Self {
        let layer = |name: &str, title: &str, color: [u8; 3], fill_alpha: f64| {
            let [r, g, b] = color;
            LayerConfig::new(
                name,
                title,
                Color::rgba_alpha(r, g, b, fill_alpha),
                Color::rgba(r, g, b, 255),
            )
            .with_category(LayerCategory::infer(title))
        };

        let layers = vec![
            layer("Zonas_PRC", "Zonas PRC", [255, 0, 0], 0.6),
            layer("Areas_Loteos", "Áreas Por Loteos", [255, 127, 0], 0.6).with_scales(50_000.0, 0.0),
            layer("Direcciones", "Direcciones", [0, 112, 255], 0.6)
                .with_scales(10_000.0, 0.0)
                .with_initial_extent(),
            layer("Predios", "Predios", [115, 178, 115], 0.0).with_scales(10_000.0, 0.0),
            layer("Vías", "Vías", [178, 102, 255], 0.6).with_scales(10_000.0, 0.0),
            layer("Soleras", "Soleras", [255, 170, 0], 0.6).with_scales(50_000.0, 0.0),
        ];

        Self {
            geoserver: GeoServerConfig {
                base_url: BaseUrl::PerMode {
                    development: "/geoserver/assets10/ows".to_string(),
                    production: "https://geoserver.hanoit.com/geoserver/assets10/ows".to_string(),
                },
                workspace: "assets10".to_string(),
                wfs: WfsConfig::default(),
                layers,
                attribution: default_attribution(),
            },
            map: MapConfig {
                default_center: [-72.6, -38.7],
                default_zoom: 13.0,
                constraints: MapConstraints {
                    min_zoom: 10.0,
                    max_zoom: 20.0,
                },
                default_basemap: "topo-vector".to_string(),
                widgets: BTreeMap::new(),
            },
            ui: UiConfig::default(),
            build_mode: BuildMode::from_env(),
        }
    }
}
