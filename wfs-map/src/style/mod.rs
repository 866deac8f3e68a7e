//! Render rules of WFS layers. See [`resolve_render_rule`].

mod symbol;

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use symbol::{FillSymbol, LineStyle, LineSymbol, MarkerSymbol, Outline, Symbol};

use crate::config::LayerCategory;
use crate::Color;

/// Size of the point marker in pixels.
pub const MARKER_SIZE: f64 = 8.0;
/// Width of the white halo around point markers.
pub const MARKER_OUTLINE_WIDTH: f64 = 0.5;
/// Width of line symbols.
pub const LINE_WIDTH: f64 = 2.5;
/// Width of polygon outlines.
pub const POLYGON_OUTLINE_WIDTH: f64 = 1.5;

/// Zone codes of the zoning layer and their fill colors as `(r, g, b, opacity)`.
pub const ZONING_PALETTE: [(&str, [u8; 3], f64); 3] = [
    ("ZH", [84, 13, 110], 0.7),
    ("ZHR", [255, 210, 63], 0.7),
    ("ZM", [14, 173, 105], 0.7),
];

/// Rule that selects the symbol for each feature of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RenderRule {
    /// Every feature is drawn with the same symbol.
    Simple {
        /// The symbol.
        symbol: Symbol,
    },
    /// The symbol depends on the value of one attribute.
    #[serde(rename = "unique-value")]
    Categorized(CategorizedRule),
}

/// Symbol chosen by the value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedRule {
    /// Attribute the rule is keyed by.
    pub field: String,
    /// Known values. Traversed in order, the first matching entry wins.
    pub categories: Vec<CategoryInfo>,
    /// Symbol for features whose value is missing or unknown.
    pub default_symbol: Symbol,
}

/// One category of a [`CategorizedRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Attribute value, compared with the string form of the feature attribute.
    pub value: String,
    /// Legend label.
    pub label: String,
    /// Symbol of the category.
    pub symbol: Symbol,
}

impl RenderRule {
    /// Single-symbol rule.
    pub fn simple(symbol: Symbol) -> Self {
        Self::Simple { symbol }
    }

    /// Returns the symbol a feature with the given attributes is drawn with.
    ///
    /// Categorized rules never fail: a missing attribute, a `null` or a value that is not in the
    /// category list all give the default symbol.
    pub fn symbol_for(&self, properties: Option<&JsonObject>) -> &Symbol {
        match self {
            Self::Simple { symbol } => symbol,
            Self::Categorized(rule) => rule.symbol_for(properties),
        }
    }

    /// Attribute the rule is keyed by, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Simple { .. } => None,
            Self::Categorized(rule) => Some(&rule.field),
        }
    }
}

impl CategorizedRule {
    fn symbol_for(&self, properties: Option<&JsonObject>) -> &Symbol {
        let Some(value) = properties
            .and_then(|p| p.get(&self.field))
            .and_then(category_key)
        else {
            return &self.default_symbol;
        };

        self.categories
            .iter()
            .find(|category| category.value == value)
            .map(|category| &category.symbol)
            .unwrap_or(&self.default_symbol)
    }
}

/// String form of an attribute value used for category matching. `null`, arrays and objects
/// have none.
pub fn category_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Builds the render rule of a layer from its category and configured colors.
///
/// * [`LayerCategory::Point`] layers get a fixed red marker with a white halo. Configured colors
///   are ignored.
/// * [`LayerCategory::Line`] layers are drawn with the outline color as a solid line.
/// * [`LayerCategory::Zoning`] layers are colored by zone code from [`ZONING_PALETTE`], with a
///   gray default for unknown codes.
/// * Everything else is a polygon filled with `fill` and outlined with `outline`.
pub fn resolve_render_rule(category: &LayerCategory, fill: Color, outline: Color) -> RenderRule {
    match category {
        LayerCategory::Point => RenderRule::simple(Symbol::Marker(MarkerSymbol {
            color: Color::RED,
            size: MARKER_SIZE,
            outline: Outline::new(Color::WHITE, MARKER_OUTLINE_WIDTH),
        })),
        LayerCategory::Line => RenderRule::simple(Symbol::Line(LineSymbol {
            color: outline,
            width: LINE_WIDTH,
            style: LineStyle::Solid,
        })),
        LayerCategory::Zoning { field } => RenderRule::Categorized(zoning_rule(field)),
        LayerCategory::Polygon => RenderRule::simple(Symbol::Fill(FillSymbol::new(
            fill,
            Outline::new(outline, POLYGON_OUTLINE_WIDTH),
        ))),
    }
}

fn zoning_rule(field: &str) -> CategorizedRule {
    let zone_outline = Outline::new(Color::rgba_alpha(80, 80, 80, 0.8), POLYGON_OUTLINE_WIDTH);
    let categories = ZONING_PALETTE
        .iter()
        .map(|&(code, [r, g, b], alpha)| CategoryInfo {
            value: code.to_string(),
            label: code.to_string(),
            symbol: Symbol::Fill(FillSymbol::new(
                Color::rgba_alpha(r, g, b, alpha),
                zone_outline,
            )),
        })
        .collect();

    CategorizedRule {
        field: field.to_string(),
        categories,
        default_symbol: Symbol::Fill(FillSymbol::new(
            Color::rgba_alpha(180, 180, 180, 0.6),
            Outline::new(Color::rgba(100, 100, 100, 255), 1.0),
        )),
    }
}
