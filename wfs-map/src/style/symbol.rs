use serde::{Deserialize, Serialize};

use crate::Color;

/// Outline of a marker or a filled polygon.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Color of the outline.
    pub color: Color,
    /// Width of the outline in pixels.
    pub width: f64,
}

impl Outline {
    /// Creates a new instance.
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

/// Renders a point as a circle of fixed pixel size.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSymbol {
    /// Fill color of the circle.
    pub color: Color,
    /// Diameter in pixels.
    pub size: f64,
    /// Halo around the circle.
    pub outline: Outline,
}

/// Dash pattern of a line.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashes.
    Dash,
    /// Dots.
    Dot,
    /// Alternating dashes and dots.
    DashDot,
}

/// Renders a contour as a line of fixed width.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSymbol {
    /// Color of the line.
    pub color: Color,
    /// Width of the line in pixels.
    pub width: f64,
    /// Dash pattern.
    pub style: LineStyle,
}

/// Renders a polygon as a filled area with an outline.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSymbol {
    /// Color of the inner area of the polygon.
    pub color: Color,
    /// Outline of the polygon.
    pub outline: Outline,
}

impl FillSymbol {
    /// Creates a new instance.
    pub fn new(color: Color, outline: Outline) -> Self {
        Self { color, outline }
    }
}

/// Symbol a feature is drawn with.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Symbol {
    /// Point marker.
    #[serde(rename = "simple-marker")]
    Marker(MarkerSymbol),
    /// Line.
    #[serde(rename = "simple-line")]
    Line(LineSymbol),
    /// Filled polygon.
    #[serde(rename = "simple-fill")]
    Fill(FillSymbol),
}
