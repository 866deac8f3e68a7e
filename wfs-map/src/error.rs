//! Error types used by the crate.

use thiserror::Error;
use wfs_map_types::error::WfsMapTypesError;

use crate::config::ConfigError;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum WfsMapError {
    /// Network error while loading data.
    #[error("failed to load data: {0}")]
    Io(String),
    /// The server answered with a non-success status code.
    #[error("server responded with status {0}")]
    HttpStatus(u16),
    /// Response body is not a valid GeoJSON feature collection.
    #[error("failed to decode data: {0}")]
    Decoding(String),
    /// Invalid geometry in an otherwise valid response.
    #[error(transparent)]
    Geometry(#[from] WfsMapTypesError),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A layer with the same title was already registered.
    #[error("layer '{0}' is already registered")]
    DuplicateLayer(String),
    /// Item not found.
    #[error("item not found: {0}")]
    NotFound(String),
    /// The display engine rejected a request.
    #[error("display engine error: {0}")]
    Engine(String),
}

impl From<reqwest::Error> for WfsMapError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::HttpStatus(status.as_u16()),
            None => Self::Io(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for WfsMapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

impl From<geojson::Error> for WfsMapError {
    fn from(value: geojson::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}
