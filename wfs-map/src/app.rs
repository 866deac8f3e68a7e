//! Application start sequence: creates the view, loads the layers and attaches the widgets.

use std::sync::Arc;

use futures::StreamExt;
use log::{error, info, warn};

use crate::config::{AppConfig, LoadingCopy};
use crate::engine::DisplayEngine;
use crate::error::WfsMapError;
use crate::layer::{LayerLoad, LayerLoader, LayerRegistry, DEFAULT_OPACITY};
use crate::platform::{NativePlatformService, PlatformService};

/// Padding factor applied to layer extents before framing them.
pub const EXTENT_PADDING: f64 = 1.2;

/// What the user interface shows while and after the map starts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppStatus {
    /// The loading overlay is shown.
    pub loading: bool,
    /// Layers registered so far.
    pub layers_loaded: usize,
    /// Configured layers.
    pub total_layers: usize,
    /// Error banner. Layer failures are aggregated one per line.
    pub error: Option<String>,
}

impl AppStatus {
    /// Progress line of the loading overlay, e.g. `Cargando capas: 2 de 6`.
    pub fn loading_message(&self, copy: &LoadingCopy) -> String {
        format!(
            "{} {} de {}",
            copy.description, self.layers_loaded, self.total_layers
        )
    }

    /// Appends a line to the error banner.
    pub fn push_error(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.error = Some(match self.error.take() {
            Some(previous) => format!("{previous}\n{line}"),
            None => line,
        });
    }

    /// Closes the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

/// The map application.
///
/// ```no_run
/// use wfs_map::{AppConfig, HeadlessEngine, MapApp};
///
/// # tokio_test::block_on(async {
/// let mut app = MapApp::native(AppConfig::default())?;
/// let mut engine = HeadlessEngine::new();
/// app.start(&mut engine).await?;
///
/// for layer in app.registry().iter() {
///     println!("{}: {:?}", layer.title(), layer.extent());
/// }
/// # Ok::<(), wfs_map::error::WfsMapError>(())
/// # });
/// ```
pub struct MapApp<P> {
    config: Arc<AppConfig>,
    loader: LayerLoader<P>,
    registry: LayerRegistry,
    status: AppStatus,
}

impl MapApp<NativePlatformService> {
    /// Creates an application fetching layers over HTTP.
    pub fn native(config: AppConfig) -> Result<Self, WfsMapError> {
        Self::new(NativePlatformService::new()?, config)
    }
}

impl<P: PlatformService> MapApp<P> {
    /// Creates an application loading layers through `platform`.
    ///
    /// Fails if the configuration does not pass [`AppConfig::validate`].
    pub fn new(platform: P, config: AppConfig) -> Result<Self, WfsMapError> {
        config.validate()?;
        let config = Arc::new(config);
        let status = AppStatus {
            total_layers: config.geoserver.layers.len(),
            ..Default::default()
        };

        Ok(Self {
            loader: LayerLoader::new(platform, Arc::clone(&config)),
            config,
            registry: LayerRegistry::new(),
            status,
        })
    }

    /// Application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Layers registered so far.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Current status.
    pub fn status(&self) -> &AppStatus {
        &self.status
    }

    /// Closes the error banner.
    pub fn dismiss_error(&mut self) {
        self.status.dismiss_error();
    }

    /// Creates the view and loads all the configured layers into `engine`.
    ///
    /// Layers are registered in the order their loads complete. The initial extent layer is
    /// framed as soon as it is registered. A layer that fails to load adds a line to the error
    /// banner and does not stop the others.
    ///
    /// Only a failure to create the view is returned as an error. The banner is set in this
    /// case too.
    pub async fn start(&mut self, engine: &mut impl DisplayEngine) -> Result<(), WfsMapError> {
        let config = Arc::clone(&self.config);
        let Self {
            loader,
            registry,
            status,
            ..
        } = self;

        status.loading = true;
        status.error = None;
        status.layers_loaded = 0;

        if let Err(err) = engine.init_view(&config.map) {
            error!("Error initializing map: {err}");
            status.error = Some(config.ui.errors.map_initialization.clone());
            status.loading = false;
            return Err(err);
        }

        let mut loads = loader.load_all(&config.geoserver.layers);
        while let Some(load) = loads.next().await {
            register_layer(&config, engine, registry, status, load);
        }

        for (widget, placement) in config.map.effective_widgets() {
            if let Err(err) = engine.add_widget(widget, placement.position) {
                warn!("Failed to add widget {widget:?}: {err}");
            }
        }

        status.loading = false;
        info!(
            "Map started with {} of {} layers",
            status.layers_loaded, status.total_layers
        );

        Ok(())
    }

    /// Frames the extent of a loaded layer, padded like the initial extent.
    pub fn zoom_to_layer(
        &self,
        engine: &mut impl DisplayEngine,
        title: &str,
    ) -> Result<(), WfsMapError> {
        let layer = self
            .registry
            .get(title)
            .ok_or_else(|| WfsMapError::NotFound(title.to_string()))?;
        let extent = layer
            .extent()
            .ok_or_else(|| WfsMapError::NotFound(format!("extent of layer '{title}'")))?;

        engine.go_to(extent.magnify(EXTENT_PADDING))
    }

    /// Switches a layer between opaque and the default opacity. Returns the new opacity.
    pub fn toggle_transparency(
        &self,
        engine: &mut impl DisplayEngine,
        title: &str,
    ) -> Result<f32, WfsMapError> {
        let layer = self
            .registry
            .get(title)
            .ok_or_else(|| WfsMapError::NotFound(title.to_string()))?;
        let opacity = if layer.opacity() == 1.0 {
            DEFAULT_OPACITY
        } else {
            1.0
        };

        engine.set_layer_opacity(title, opacity)?;
        layer.set_opacity(opacity);

        Ok(opacity)
    }
}

fn register_layer(
    config: &AppConfig,
    engine: &mut impl DisplayEngine,
    registry: &mut LayerRegistry,
    status: &mut AppStatus,
    load: LayerLoad,
) {
    let LayerLoad { layer, error } = load;
    let title = layer.title().to_string();
    let error_line = format!("{} {title}", config.ui.errors.layer_loading);
    let reported = error.is_some();

    if let Some(err) = error {
        warn!("Layer {title} is loaded from its URL after a failed fetch: {err}");
        status.push_error(error_line.clone());
    }

    if registry.contains(&title) {
        error!("Layer {title} is already registered");
        if !reported {
            status.push_error(error_line);
        }
        return;
    }

    if let Err(err) = engine.add_layer(&layer) {
        error!("Error loading layer {title}: {err}");
        if !reported {
            status.push_error(error_line);
        }
        return;
    }

    let layer = match registry.insert(layer) {
        Ok(layer) => layer,
        Err(err) => {
            warn!("{err}");
            return;
        }
    };
    status.layers_loaded += 1;
    info!("Successfully loaded layer: {title}");

    let frames_view = config
        .initial_extent_layer()
        .is_some_and(|initial| initial.title == title);
    if !frames_view {
        return;
    }

    match layer.extent() {
        Some(extent) => match engine.go_to(extent.magnify(EXTENT_PADDING)) {
            Ok(()) => info!("Zoomed to {title} extent"),
            Err(err) => error!("Error zooming to initial extent: {err}"),
        },
        None => warn!("Layer {title} has no extent to zoom to"),
    }
}
