use serde::{Deserialize, Serialize};

use crate::Color;

/// Attribute the built-in zoning layer is categorized by.
pub const ZONING_FIELD: &str = "Tipo_Zona";

/// Kind of symbology a layer is drawn with. Attached to every [`LayerConfig`] when the
/// configuration is loaded, so that style resolution never looks at display titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerCategory {
    /// Point features drawn with a fixed red marker.
    Point,
    /// Line features drawn with the configured outline color.
    Line,
    /// Zoning polygons colored by the category code stored in `field`.
    Zoning {
        /// Attribute holding the zone code.
        field: String,
    },
    /// Filled polygons with the configured fill and outline colors.
    Polygon,
}

impl LayerCategory {
    /// Category of the layers of the original deployment, by exact title.
    ///
    /// Used only for configuration entries that do not specify a category explicitly. Titles are
    /// compared exactly, with no case folding; an unknown title is a polygon layer.
    pub fn infer(title: &str) -> Self {
        match title {
            "Direcciones" => Self::Point,
            "Vías" | "Soleras" => Self::Line,
            "Zonas PRC" => Self::Zoning {
                field: ZONING_FIELD.to_string(),
            },
            _ => Self::Polygon,
        }
    }
}

/// Static description of one WFS layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Feature type name on the server, without the workspace prefix.
    pub name: String,
    /// Display title. Also the key of the layer in the layer registry.
    pub title: String,
    /// Default fill color. Transparent when omitted.
    #[serde(default = "default_color")]
    pub color: Color,
    /// Default outline color. Black when omitted.
    #[serde(default = "default_outline_color")]
    pub outline_color: Color,
    /// Initial visibility.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// The layer is hidden when the map is zoomed out beyond this scale. `0` means no limit.
    #[serde(default)]
    pub min_scale: f64,
    /// The layer is hidden when the map is zoomed in beyond this scale. `0` means no limit.
    #[serde(default)]
    pub max_scale: f64,
    /// The map frames this layer's extent once it is loaded.
    #[serde(default)]
    pub use_for_initial_extent: bool,
    /// Symbology category. Filled in by [`AppConfig`](super::AppConfig) loading when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<LayerCategory>,
}

fn default_visible() -> bool {
    true
}

fn default_color() -> Color {
    Color::TRANSPARENT
}

fn default_outline_color() -> Color {
    Color::BLACK
}

impl LayerConfig {
    /// Creates a visible polygon layer without scale limits.
    pub fn new(name: impl Into<String>, title: impl Into<String>, color: Color, outline: Color) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            color,
            outline_color: outline,
            visible: true,
            min_scale: 0.0,
            max_scale: 0.0,
            use_for_initial_extent: false,
            category: None,
        }
    }

    /// Sets the symbology category.
    pub fn with_category(self, category: LayerCategory) -> Self {
        Self {
            category: Some(category),
            ..self
        }
    }

    /// Sets the scale range.
    pub fn with_scales(self, min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..self
        }
    }

    /// Marks the layer as the initial extent source.
    pub fn with_initial_extent(self) -> Self {
        Self {
            use_for_initial_extent: true,
            ..self
        }
    }

    /// Symbology category of the layer.
    ///
    /// Configurations loaded through [`AppConfig`](super::AppConfig) always carry an explicit
    /// category; layers built by hand without one fall back to [`LayerCategory::infer`].
    pub fn category(&self) -> LayerCategory {
        self.category
            .clone()
            .unwrap_or_else(|| LayerCategory::infer(&self.title))
    }
}
