//! Lifecycle of the attribute table.
//!
//! The table widget itself belongs to the display engine and is reached through [`TableHost`].
//! [`TableController`] makes sure there is at most one live table, bound to the latest selected
//! layer, and that the previous table and its popup watch are released before the next one is
//! created.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use geojson::JsonObject;
use log::{debug, error, info};
use serde_json::Value;

use crate::error::WfsMapError;
use crate::layer::{LayerRegistry, LoadedLayer};

/// Attributes checked for the id of a feature selected in a popup, in order.
pub const HIGHLIGHT_ID_FIELDS: [&str; 3] = ["OBJECTID", "__OBJECTID", "FID"];

/// Extracts the table row id from the attributes of a popup-selected feature.
pub type HighlightIdFn = for<'a> fn(&'a JsonObject) -> Option<&'a Value>;

/// Subscription that can be cancelled.
pub trait WatchHandle: Send {
    /// Cancels the subscription.
    fn remove(self);
}

/// Attribute table support of the display engine.
#[async_trait]
pub trait TableHost: Send + Sync {
    /// Table widget instance.
    type Table: Send;
    /// Popup selection subscription.
    type Watch: WatchHandle;

    /// Creates a table for the layer and waits until it is ready.
    async fn create_table(&self, layer: Arc<LoadedLayer>) -> Result<Self::Table, WfsMapError>;

    /// Highlights the row of the feature selected in the popup whenever the selection changes.
    /// `highlight_id` gives the row id for the selected feature's attributes.
    fn watch_popup_selection(&self, table: &Self::Table, highlight_id: HighlightIdFn)
        -> Self::Watch;

    /// Destroys the table and clears its container.
    fn destroy_table(&self, table: Self::Table);
}

/// Returns the first of `OBJECTID`, `__OBJECTID` and `FID` with a usable value. `null`, `0`,
/// `false` and empty strings are skipped.
pub fn highlight_id(attributes: &JsonObject) -> Option<&Value> {
    HIGHLIGHT_ID_FIELDS
        .iter()
        .filter_map(|field| attributes.get(*field))
        .find(|value| is_usable_id(value))
}

fn is_usable_id(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// State of the table lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableState {
    /// No table.
    #[default]
    Idle,
    /// A table for the layer is being created.
    Constructing {
        /// Layer title.
        layer: String,
        /// Selection generation the table is created for.
        generation: u64,
    },
    /// The table is live.
    Ready {
        /// Layer title.
        layer: String,
        /// Selection generation the table was created for.
        generation: u64,
    },
    /// The table for the layer is being released.
    Destroying {
        /// Layer title.
        layer: String,
    },
}

/// Result of [`TableController::show`].
#[derive(Debug)]
pub enum TableOutcome {
    /// A table for the selected layer is live.
    Ready,
    /// The table is hidden or nothing is selected. Any live table was released.
    Hidden,
    /// The selected layer is not loaded yet. Any live table was released.
    LayerNotLoaded,
    /// A newer selection arrived. Whatever this request created was released.
    Superseded,
    /// The host failed to create the table. The failure is only logged.
    Failed(WfsMapError),
}

struct LiveTable<H: TableHost> {
    layer: String,
    table: H::Table,
    watch: H::Watch,
}

/// Keeps at most one attribute table alive, bound to the latest selection.
///
/// Requests are serialized: a new table is created only after the previous one and its watch
/// were released. A table finished after a newer selection was requested is destroyed right away
/// (last selection wins).
pub struct TableController<H: TableHost> {
    host: H,
    generation: AtomicU64,
    live: tokio::sync::Mutex<Option<LiveTable<H>>>,
    state: parking_lot::Mutex<TableState>,
    loading: AtomicBool,
}

impl<H: TableHost> TableController<H> {
    /// Creates a controller without a table.
    pub fn new(host: H) -> Self {
        Self {
            host,
            generation: AtomicU64::new(0),
            live: tokio::sync::Mutex::new(None),
            state: parking_lot::Mutex::new(TableState::Idle),
            loading: AtomicBool::new(false),
        }
    }

    /// Table host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TableState {
        self.state.lock().clone()
    }

    /// Returns true while a table for the latest selection is being created.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Title of the layer shown in the live table.
    pub fn live_layer(&self) -> Option<String> {
        match &*self.state.lock() {
            TableState::Ready { layer, .. } => Some(layer.clone()),
            _ => None,
        }
    }

    /// Shows the table for `selection`, replacing the current one.
    ///
    /// Nothing is created if the table is hidden, nothing is selected or the selected layer is
    /// not in `registry` yet. In these cases the live table is released.
    pub async fn show(
        &self,
        selection: Option<&str>,
        visible: bool,
        registry: &LayerRegistry,
    ) -> TableOutcome {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let selected = match selection {
            Some(title) if visible => registry.get(title).cloned().ok_or(TableOutcome::LayerNotLoaded),
            _ => Err(TableOutcome::Hidden),
        };
        let layer = match selected {
            Ok(layer) => layer,
            Err(outcome) => {
                debug!("Attribute table not shown for {selection:?}: {outcome:?}");
                let mut live = self.live.lock().await;
                if !self.is_superseded(generation) {
                    self.release(live.take());
                    self.loading.store(false, Ordering::Release);
                }
                return outcome;
            }
        };

        self.loading.store(true, Ordering::Release);
        let mut live = self.live.lock().await;
        if self.is_superseded(generation) {
            return TableOutcome::Superseded;
        }

        self.release(live.take());

        let title = layer.title().to_string();
        *self.state.lock() = TableState::Constructing {
            layer: title.clone(),
            generation,
        };
        info!("Creating attribute table for {title}");

        let table = match self.host.create_table(layer).await {
            Ok(table) => table,
            Err(err) => {
                error!("Error creating attribute table for {title}: {err}");
                *self.state.lock() = TableState::Idle;
                if !self.is_superseded(generation) {
                    self.loading.store(false, Ordering::Release);
                }
                return TableOutcome::Failed(err);
            }
        };

        if self.is_superseded(generation) {
            info!("Attribute table for {title} superseded by a newer selection");
            *self.state.lock() = TableState::Destroying {
                layer: title.clone(),
            };
            self.host.destroy_table(table);
            *self.state.lock() = TableState::Idle;
            return TableOutcome::Superseded;
        }

        let watch = self.host.watch_popup_selection(&table, highlight_id);
        *live = Some(LiveTable {
            layer: title.clone(),
            table,
            watch,
        });
        *self.state.lock() = TableState::Ready {
            layer: title.clone(),
            generation,
        };
        self.loading.store(false, Ordering::Release);
        info!("Attribute table ready for {title}");

        TableOutcome::Ready
    }

    /// Releases the live table. Constructions still in flight are discarded when they finish.
    pub async fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut live = self.live.lock().await;
        self.release(live.take());
        self.loading.store(false, Ordering::Release);
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) != generation
    }

    fn release(&self, live: Option<LiveTable<H>>) {
        let Some(live) = live else {
            return;
        };

        *self.state.lock() = TableState::Destroying {
            layer: live.layer.clone(),
        };
        Self::destroy(&self.host, live);
        *self.state.lock() = TableState::Idle;
    }

    fn destroy(host: &H, live: LiveTable<H>) {
        debug!("Destroying attribute table for {}", live.layer);
        live.watch.remove();
        host.destroy_table(live.table);
    }
}

impl<H: TableHost> Drop for TableController<H> {
    fn drop(&mut self) {
        if let Some(live) = self.live.get_mut().take() {
            Self::destroy(&self.host, live);
        }
    }
}
