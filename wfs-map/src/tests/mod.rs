use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::json;

use crate::config::{AppConfig, LayerConfig};
use crate::error::WfsMapError;
use crate::layer::{DataSource, LoadedLayer};
use crate::platform::PlatformService;
use crate::style::resolve_render_rule;
use crate::wfs::GetFeatureUrl;
use crate::Color;

enum TestResponse {
    Body(String),
    Status(u16),
}

/// Serves canned `GetFeature` responses by layer name. Unknown URLs fail like a refused
/// connection.
pub struct TestPlatformService {
    config: AppConfig,
    responses: HashMap<String, TestResponse>,
    delays: HashMap<String, usize>,
    requests: Mutex<Vec<String>>,
}

impl TestPlatformService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
            responses: HashMap::new(),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn url(&self, layer_name: &str) -> String {
        GetFeatureUrl::from_config(&self.config).for_layer(layer_name)
    }

    pub fn with_layer(mut self, layer_name: &str, body: String) -> Self {
        let url = self.url(layer_name);
        self.responses.insert(url, TestResponse::Body(body));
        self
    }

    pub fn with_status(mut self, layer_name: &str, status: u16) -> Self {
        let url = self.url(layer_name);
        self.responses.insert(url, TestResponse::Status(status));
        self
    }

    /// Makes the response for the layer wait for the given number of polls.
    pub fn with_delay(mut self, layer_name: &str, polls: usize) -> Self {
        let url = self.url(layer_name);
        self.delays.insert(url, polls);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl PlatformService for TestPlatformService {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WfsMapError> {
        self.requests.lock().push(url.to_string());
        YieldNow::new(self.delays.get(url).copied().unwrap_or_default()).await;

        match self.responses.get(url) {
            Some(TestResponse::Body(body)) => Ok(Bytes::from(body.clone())),
            Some(TestResponse::Status(status)) => Err(WfsMapError::HttpStatus(*status)),
            None => Err(WfsMapError::Io("connection refused".to_string())),
        }
    }
}

/// Future that returns `Pending` the given number of times before completing.
pub struct YieldNow {
    remaining: usize,
}

impl YieldNow {
    pub fn new(polls: usize) -> Self {
        Self { remaining: polls }
    }
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.remaining == 0 {
            return Poll::Ready(());
        }

        self.remaining -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Address points with `OBJECTID`, `Nombre` and `Numero` properties.
pub fn points_collection(points: &[(f64, f64)]) -> String {
    let features: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| {
            json!({
                "type": "Feature",
                "id": format!("Direcciones.{}", i + 1),
                "geometry": {"type": "Point", "coordinates": [x, y]},
                "properties": {
                    "OBJECTID": i + 1,
                    "Nombre": format!("Calle {}", i + 1),
                    "Numero": 100 + i
                }
            })
        })
        .collect();

    json!({"type": "FeatureCollection", "features": features}).to_string()
}

/// Zoning polygons, one unit square per zone code.
pub fn zoning_collection(codes: &[&str]) -> String {
    let features: Vec<_> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let x = i as f64;
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0], [x, 0.0]]]
                },
                "properties": {"FID": i, "Tipo_Zona": code, "Shape": null}
            })
        })
        .collect();

    json!({"type": "FeatureCollection", "features": features}).to_string()
}

/// Degraded layer with the given title, enough for tests that only look layers up by title.
pub fn url_layer(title: &str) -> LoadedLayer {
    let config = LayerConfig::new(
        title,
        title,
        Color::rgba(0, 0, 0, 128),
        Color::rgba(0, 0, 0, 255),
    );
    let url = format!("/ows?typeName={title}");
    LoadedLayer::new(
        config.clone(),
        url.clone(),
        DataSource::Url(url),
        resolve_render_rule(&config.category(), config.color, config.outline_color),
        Vec::new(),
        None,
        None,
        "GeoServer Assets10".to_string(),
    )
}
