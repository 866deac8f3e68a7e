use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream};
use geojson::{FeatureCollection, GeoJson};
use log::{debug, error, info, warn};
use wfs_map_types::geojson::feature_collection_extent;

use crate::config::{AppConfig, LayerConfig};
use crate::error::WfsMapError;
use crate::layer::schema::infer_schema;
use crate::layer::{DataSource, LoadedLayer};
use crate::platform::PlatformService;
use crate::popup::PopupFormatter;
use crate::style::{category_key, resolve_render_rule, RenderRule};
use crate::wfs::GetFeatureUrl;

/// Result of loading one layer.
///
/// A failed fetch does not prevent the layer from being created: it falls back to a
/// [`DataSource::Url`] source and the failure is kept in `error` so it can be reported.
#[derive(Debug)]
pub struct LayerLoad {
    /// The loaded, possibly degraded, layer.
    pub layer: LoadedLayer,
    /// Fetch or decoding failure.
    pub error: Option<WfsMapError>,
}

/// Fetches WFS layers and prepares them for the display engine.
pub struct LayerLoader<P> {
    platform: P,
    config: Arc<AppConfig>,
}

impl<P: PlatformService> LayerLoader<P> {
    /// Creates a loader for the GeoServer described by `config`.
    pub fn new(platform: P, config: Arc<AppConfig>) -> Self {
        Self { platform, config }
    }

    /// Configuration the loader was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetches and decodes a feature collection.
    pub async fn fetch(&self, url: &str) -> Result<FeatureCollection, WfsMapError> {
        let bytes = self.platform.load_bytes_from_url(url).await?;
        match serde_json::from_slice::<GeoJson>(&bytes)? {
            GeoJson::FeatureCollection(collection) => Ok(collection),
            other => Err(WfsMapError::Decoding(format!(
                "expected a FeatureCollection, got {}",
                geojson_type_name(&other)
            ))),
        }
    }

    /// Loads one layer. Never fails: see [`LayerLoad`].
    pub async fn load(&self, layer: &LayerConfig) -> LayerLoad {
        let url = GetFeatureUrl::from_config(&self.config).for_layer(&layer.name);
        info!("Loading layer: {} from {url}", layer.title);

        let render_rule = resolve_render_rule(&layer.category(), layer.color, layer.outline_color);
        let attribution = self.config.geoserver.attribution.clone();

        match self.fetch(&url).await {
            Ok(collection) => {
                let loaded = self.prepare(layer, url, collection, render_rule, attribution);
                LayerLoad {
                    layer: loaded,
                    error: None,
                }
            }
            Err(err) => {
                error!("Error fetching GeoJSON for {}: {err}", layer.title);
                LayerLoad {
                    layer: LoadedLayer::new(
                        layer.clone(),
                        url.clone(),
                        DataSource::Url(url),
                        render_rule,
                        Vec::new(),
                        None,
                        None,
                        attribution,
                    ),
                    error: Some(err),
                }
            }
        }
    }

    fn prepare(
        &self,
        layer: &LayerConfig,
        url: String,
        collection: FeatureCollection,
        render_rule: RenderRule,
        attribution: String,
    ) -> LoadedLayer {
        let title = &layer.title;
        info!(
            "{title} - Total features fetched: {}",
            collection.features.len()
        );
        if let Some(properties) = collection
            .features
            .first()
            .and_then(|f| f.properties.as_ref())
        {
            debug!("{title} - Sample feature properties: {properties:?}");
        }

        if let Some(field) = render_rule.field() {
            let values: BTreeSet<String> = collection
                .features
                .iter()
                .filter_map(|f| f.property(field))
                .filter_map(category_key)
                .collect();
            debug!(
                "{title} - {} distinct values of {field}: {values:?}",
                values.len()
            );
        }

        let schema = infer_schema(&collection);
        let popup = PopupFormatter::new(title.clone(), &schema, self.config.ui.popup.clone());
        debug!("{title} - Display fields: {:?}", popup.display_fields());

        let extent = feature_collection_extent(&collection).unwrap_or_else(|err| {
            warn!("{title} - Cannot compute extent: {err}");
            None
        });

        LoadedLayer::new(
            layer.clone(),
            url,
            DataSource::InMemory(collection),
            render_rule,
            schema,
            Some(popup),
            extent,
            attribution,
        )
    }

    /// Starts loading all the given layers at once. Loads run concurrently on the current task
    /// and are yielded in the order they complete.
    pub fn load_all<'a>(
        &'a self,
        layers: &'a [LayerConfig],
    ) -> impl Stream<Item = LayerLoad> + 'a {
        layers
            .iter()
            .map(|layer| self.load(layer))
            .collect::<FuturesUnordered<_>>()
    }
}

fn geojson_type_name(geojson: &GeoJson) -> &'static str {
    match geojson {
        GeoJson::Geometry(_) => "Geometry",
        GeoJson::Feature(_) => "Feature",
        GeoJson::FeatureCollection(_) => "FeatureCollection",
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use futures::StreamExt;

    use super::*;
    use crate::config::{BaseUrl, LayerCategory};
    use crate::style::Symbol;
    use crate::tests::{points_collection, TestPlatformService};
    use crate::Color;

    fn config_with(layers: Vec<LayerConfig>) -> Arc<AppConfig> {
        let mut config = AppConfig::default();
        config.geoserver.layers = layers;
        Arc::new(config)
    }

    fn direcciones() -> LayerConfig {
        LayerConfig::new(
            "Direcciones",
            "Direcciones",
            Color::rgba(0, 112, 255, 153),
            Color::rgba(0, 112, 255, 255),
        )
        .with_category(LayerCategory::Point)
        .with_initial_extent()
    }

    #[test]
    fn loads_layer_into_memory() {
        let config = config_with(vec![direcciones()]);
        let platform = TestPlatformService::new(&config).with_layer(
            "Direcciones",
            points_collection(&[(-72.6, -38.7), (-72.5, -38.8), (-72.7, -38.75)]),
        );
        let loader = LayerLoader::new(platform, Arc::clone(&config));

        let load = tokio_test::block_on(loader.load(&config.geoserver.layers[0]));

        assert!(load.error.is_none());
        let layer = load.layer;
        assert!(!layer.is_degraded());
        assert_eq!(layer.features().unwrap().features.len(), 3);
        assert_matches!(layer.render_rule().symbol_for(None), Symbol::Marker(m) if m.color == Color::RED);
        assert_eq!(layer.display_fields(), ["Nombre", "Numero"]);
        assert_eq!(layer.opacity(), 0.7);
        assert_eq!(layer.attribution(), "GeoServer Assets10");

        let extent = layer.extent().unwrap();
        assert_eq!(extent.x_min(), -72.7);
        assert_eq!(extent.x_max(), -72.5);
        assert_eq!(extent.y_min(), -38.8);
        assert_eq!(extent.y_max(), -38.7);
    }

    #[test]
    fn fetches_each_layer_once() {
        let predios = LayerConfig::new(
            "Predios",
            "Predios",
            Color::rgba(115, 178, 115, 0),
            Color::rgba(115, 178, 115, 255),
        );
        let mut config = AppConfig::default();
        config.geoserver.base_url = BaseUrl::Fixed("/geoserver/assets10/ows".to_string());
        config.geoserver.layers = vec![direcciones(), predios];
        let config = Arc::new(config);
        let platform = Arc::new(
            TestPlatformService::new(&config)
                .with_layer("Direcciones", points_collection(&[(0.0, 0.0)]))
                .with_status("Predios", 404),
        );
        let loader = LayerLoader::new(Arc::clone(&platform), Arc::clone(&config));

        let loads: Vec<LayerLoad> =
            tokio_test::block_on(loader.load_all(&config.geoserver.layers).collect());
        assert_eq!(loads.len(), 2);

        let mut requests = platform.requests();
        requests.sort();
        assert_eq!(
            requests,
            [
                "/geoserver/assets10/ows?service=WFS&version=1.0.0&request=GetFeature\
                 &typeName=assets10%3ADirecciones&outputFormat=application%2Fjson&srsName=EPSG%3A4326",
                "/geoserver/assets10/ows?service=WFS&version=1.0.0&request=GetFeature\
                 &typeName=assets10%3APredios&outputFormat=application%2Fjson&srsName=EPSG%3A4326",
            ]
        );
        for load in &loads {
            assert!(requests.iter().any(|url| url == load.layer.request_url()));
        }
    }

    #[test]
    fn fetch_failure_falls_back_to_url() {
        let config = config_with(vec![direcciones()]);
        let platform = TestPlatformService::new(&config).with_status("Direcciones", 500);
        let loader = LayerLoader::new(platform, Arc::clone(&config));

        let load = tokio_test::block_on(loader.load(&config.geoserver.layers[0]));

        assert_matches!(load.error, Some(WfsMapError::HttpStatus(500)));
        let layer = load.layer;
        assert!(layer.is_degraded());
        assert_eq!(
            layer.source(),
            &DataSource::Url(layer.request_url().to_string())
        );
        assert!(layer.popup().is_none());
        assert!(layer.display_fields().is_empty());
        assert!(layer.extent().is_none());
    }

    #[test]
    fn parse_failure_falls_back_to_url() {
        let config = config_with(vec![direcciones()]);
        let platform = TestPlatformService::new(&config)
            .with_layer("Direcciones", "<ows:ExceptionReport/>".to_string());
        let loader = LayerLoader::new(platform, Arc::clone(&config));

        let load = tokio_test::block_on(loader.load(&config.geoserver.layers[0]));
        assert_matches!(load.error, Some(WfsMapError::Decoding(_)));
        assert!(load.layer.is_degraded());

        let platform = TestPlatformService::new(&config).with_layer(
            "Direcciones",
            r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#.to_string(),
        );
        let loader = LayerLoader::new(platform, Arc::clone(&config));
        let load = tokio_test::block_on(loader.load(&config.geoserver.layers[0]));
        assert_matches!(load.error, Some(WfsMapError::Decoding(msg)) if msg.contains("Geometry"));
    }

    #[test]
    fn one_failing_layer_does_not_affect_others() {
        let predios = LayerConfig::new(
            "Predios",
            "Predios",
            Color::rgba(115, 178, 115, 0),
            Color::rgba(115, 178, 115, 255),
        );
        let config = config_with(vec![direcciones(), predios]);
        let platform = TestPlatformService::new(&config)
            .with_layer("Predios", points_collection(&[(1.0, 1.0)]));
        let loader = LayerLoader::new(platform, Arc::clone(&config));

        let mut loads: Vec<LayerLoad> =
            tokio_test::block_on(loader.load_all(&config.geoserver.layers).collect());
        loads.sort_by(|a, b| a.layer.title().cmp(b.layer.title()));

        assert_eq!(loads.len(), 2);
        assert!(loads[0].error.is_some());
        assert!(loads[0].layer.is_degraded());
        assert!(loads[1].error.is_none());
        assert_eq!(loads[1].layer.features().unwrap().features.len(), 1);
    }

    #[test]
    fn loads_complete_out_of_order() {
        let vias = LayerConfig::new(
            "Vías",
            "Vías",
            Color::rgba(178, 102, 255, 153),
            Color::rgba(178, 102, 255, 255),
        )
        .with_category(LayerCategory::Line);
        let config = config_with(vec![vias, direcciones()]);
        let platform = TestPlatformService::new(&config)
            .with_layer("Vías", points_collection(&[(0.0, 0.0)]))
            .with_delay("Vías", 5)
            .with_layer("Direcciones", points_collection(&[(1.0, 1.0)]));
        let loader = LayerLoader::new(platform, Arc::clone(&config));

        let titles: Vec<String> = tokio_test::block_on(
            loader
                .load_all(&config.geoserver.layers)
                .map(|load| load.layer.title().to_string())
                .collect(),
        );

        assert_eq!(titles, ["Direcciones", "Vías"]);
    }
}
