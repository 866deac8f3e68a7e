//! Geometry support types for the WFS map layer pipeline: a generic bounding [`Rect`] and
//! helpers computing the extent of GeoJSON geometries.

pub mod error;
pub mod geojson;
mod rect;

pub use rect::Rect;
