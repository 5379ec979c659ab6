//! DPN Monitor: biosignal telemetry for diabetic peripheral neuropathy
//!
//! ## Architecture
//!
//! - **Ingestion Gateway**: validates device readings and honours the remote power switch
//! - **Threshold Classifier / Status Aggregator**: clinical bands to per-channel and overall status
//! - **History Window**: bounded trend buffer for temperature and vibration
//! - **Narrative Generator**: short risk narrative from an external model, with rule-based fallback
//! - **Dashboard Poller**: consumer-side loop that maps connectivity loss to OFFLINE

pub mod api;
pub mod config;
pub mod llm;
pub mod monitor;
pub mod pipeline;
pub mod processing;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    Channel, ChannelBand, ChannelBands, ChannelStatus, ChannelValue, Reading, ReadingSnapshot,
    SignalStatus,
};

// Re-export the core pipeline
pub use pipeline::{assess, AppState, Assessment, DeviceControl, HistoryWindow, IngestionGateway};

// Re-export storage
pub use storage::{ReadingStore, StorageError};

// Re-export narrative components
pub use llm::NarrativeGenerator;
