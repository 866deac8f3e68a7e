//! WFS `GetFeature` request URLs.

use url::form_urlencoded;

use crate::config::{AppConfig, WfsConfig};

/// Builds `GetFeature` URLs for the layers of one GeoServer workspace.
///
/// Requests never carry a feature count limit: every layer is loaded completely.
#[derive(Debug, Clone, PartialEq)]
pub struct GetFeatureUrl<'a> {
    base_url: &'a str,
    workspace: &'a str,
    wfs: &'a WfsConfig,
}

impl<'a> GetFeatureUrl<'a> {
    /// Creates a builder for the endpoint of the current build mode.
    pub fn from_config(config: &'a AppConfig) -> Self {
        Self::new(config.base_url(), &config.geoserver.workspace, &config.geoserver.wfs)
    }

    /// Creates a builder for the given endpoint.
    pub fn new(base_url: &'a str, workspace: &'a str, wfs: &'a WfsConfig) -> Self {
        Self {
            base_url,
            workspace,
            wfs,
        }
    }

    /// Qualified type name of a layer: `workspace:layer`.
    pub fn type_name(&self, layer_name: &str) -> String {
        format!("{}:{layer_name}", self.workspace)
    }

    /// Request URL for the layer. The base URL may be relative (proxied) or absolute, and may
    /// already contain a query string.
    pub fn for_layer(&self, layer_name: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("service", "WFS")
            .append_pair("version", &self.wfs.version)
            .append_pair("request", "GetFeature")
            .append_pair("typeName", &self.type_name(layer_name))
            .append_pair("outputFormat", &self.wfs.output_format)
            .append_pair("srsName", &self.wfs.srs_name)
            .finish();

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;

    #[test]
    fn builds_get_feature_url() {
        let wfs = WfsConfig::default();
        let url = GetFeatureUrl::new("/geoserver/assets10/ows", "assets10", &wfs);

        assert_eq!(
            url.for_layer("Direcciones"),
            "/geoserver/assets10/ows?service=WFS&version=1.0.0&request=GetFeature\
             &typeName=assets10%3ADirecciones&outputFormat=application%2Fjson&srsName=EPSG%3A4326"
        );
    }

    #[test]
    fn encodes_non_ascii_and_spaces() {
        let wfs = WfsConfig::default();
        let url = GetFeatureUrl::new("https://example.com/ows?token=1", "assets10", &wfs);
        let built = url.for_layer("Vías Público");

        assert!(built.starts_with("https://example.com/ows?token=1&service=WFS&"));
        assert!(built.contains("typeName=assets10%3AV%C3%ADas+P%C3%BAblico"));
    }

    #[test]
    fn never_limits_feature_count() {
        let config = AppConfig::default().with_build_mode(BuildMode::Production);
        let url = GetFeatureUrl::from_config(&config);

        for layer in &config.geoserver.layers {
            let built = url.for_layer(&layer.name);
            assert!(built.starts_with("https://geoserver.hanoit.com/geoserver/assets10/ows?"));
            assert!(!built.to_lowercase().contains("maxfeatures"));
            assert!(!built.to_lowercase().contains("count="));
        }
    }
}
