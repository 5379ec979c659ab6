//! API route handlers
//!
//! - sensors: device write path, latest reading, assessment, history
//! - ai: risk narrative
//! - settings / control: the device control plane
//! - status: health

mod ai;
mod control;
mod sensors;
mod settings;
mod status;

pub use ai::*;
pub use control::*;
pub use sensors::*;
pub use settings::*;
pub use status::*;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::NarrativeGenerator;
use crate::pipeline::{AppState, IngestionGateway};
use crate::storage::{InMemoryStore, ReadingStore};
use crate::types::{ChannelBands, Reading};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Control state, history and counters
    pub app_state: Arc<RwLock<AppState>>,
    /// Write path, owns the reading store
    pub gateway: IngestionGateway,
    /// Risk narrative generation
    pub narrator: Arc<NarrativeGenerator>,
    /// Clinical bands for classification
    pub bands: ChannelBands,
}

impl DashboardState {
    pub fn new(
        app_state: Arc<RwLock<AppState>>,
        store: Arc<dyn ReadingStore>,
        narrator: Arc<NarrativeGenerator>,
        bands: ChannelBands,
    ) -> Self {
        Self {
            app_state,
            gateway: IngestionGateway::new(store),
            narrator,
            bands,
        }
    }

    /// Default state with an in-memory store and rule-based narratives.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(RwLock::new(AppState::default())),
            Arc::new(InMemoryStore::new()),
            Arc::new(NarrativeGenerator::fallback_only()),
            ChannelBands::default(),
        )
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        self.gateway.store()
    }

    /// Latest stored reading. Storage errors degrade to `None`.
    pub fn latest_reading(&self) -> Option<Reading> {
        match self.store().latest() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read latest reading");
                None
            }
        }
    }
}

/// Extract a field from a loosely-typed JSON body.
fn body_field<'a>(body: &'a serde_json::Value, keys: &[&str]) -> Option<&'a serde_json::Value> {
    keys.iter()
        .find_map(|k| body.get(*k))
        .filter(|v| !v.is_null())
}
