//! Monitoring Pipeline
//!
//! ```text
//! device ──POST──▶ IngestionGateway ──(power gate)──▶ ReadingStore
//!                          │
//!                          └──▶ HistoryWindow (temperature, vibration)
//!
//! GET ──▶ latest Reading ──▶ classify ×4 ──▶ aggregate ──▶ Assessment
//!                                               └──▶ NarrativeGenerator
//! ```
//!
//! Control state (power, vibration duration) gates ingestion and is owned by
//! [`AppState`].

mod assessment;
mod control;
mod history;
mod ingest;
mod state;

pub use assessment::{
    assess, assess_snapshot, Assessment, ChannelAssessment, ChannelAssessments, TrendAnalytics,
};
pub use control::{parse_duration, ControlError, DeviceControl, PowerStatus};
pub use history::{HistoryPoint, HistoryWindow};
pub use ingest::{IngestError, IngestOutcome, IngestStats, IngestionGateway, SensorPayload};
pub use state::AppState;
