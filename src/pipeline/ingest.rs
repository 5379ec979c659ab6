//! Ingestion Gateway
//!
//! Write path for device readings. Order of checks:
//! 1. payload validation (missing / non-numeric fields are rejected),
//! 2. power gate (device OFF: acknowledged and discarded),
//! 3. persistence, then history append.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AppState;
use crate::storage::{ReadingStore, StorageError};
use crate::types::{Channel, Reading};

/// Raw body of `POST /api/sensors/data`. Fields are loosely typed so a
/// numeric string from older firmware is still accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<serde_json::Value>,
}

impl SensorPayload {
    /// Convenience constructor for numeric payloads.
    pub fn numeric(temperature: f64, pressure: f64, moisture: f64, vibration: f64) -> Self {
        Self {
            temperature: Some(temperature.into()),
            pressure: Some(pressure.into()),
            moisture: Some(moisture.into()),
            vibration: Some(vibration.into()),
        }
    }

    const fn field(&self, channel: Channel) -> Option<&serde_json::Value> {
        match channel {
            Channel::Temperature => self.temperature.as_ref(),
            Channel::Pressure => self.pressure.as_ref(),
            Channel::Moisture => self.moisture.as_ref(),
            Channel::Vibration => self.vibration.as_ref(),
        }
    }

    /// Validate every field and return the four values in channel order.
    fn parse(&self) -> Result<[f64; 4], String> {
        let missing: Vec<&str> = Channel::ALL
            .iter()
            .filter(|c| matches!(self.field(**c), None | Some(serde_json::Value::Null)))
            .map(|c| c.name())
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Missing required sensor data fields: {}",
                missing.join(", ")
            ));
        }

        let mut values = [0.0; 4];
        for channel in Channel::ALL {
            let raw = self.field(channel).cloned().unwrap_or_default();
            values[channel.index()] = parse_number(&raw)
                .ok_or_else(|| format!("Field '{channel}' is not a number: {raw}"))?;
        }
        Ok(values)
    }
}

fn parse_number(value: &serde_json::Value) -> Option<f64> {
    let v = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Result of one ingestion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Persisted and recorded.
    Accepted(Reading),
    /// Valid, but the device is remotely OFF; nothing was stored.
    Ignored,
    /// Malformed payload; nothing was touched.
    Rejected(String),
}

/// Failures that are not the client's fault.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to persist reading: {0}")]
    Storage(#[from] StorageError),
}

/// Counters exposed by the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    pub accepted: u64,
    pub ignored: u64,
    pub rejected: u64,
}

/// Applies the control gate and writes accepted readings through the store.
#[derive(Clone)]
pub struct IngestionGateway {
    store: Arc<dyn ReadingStore>,
}

impl IngestionGateway {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        &self.store
    }

    /// Ingest one payload against the current state.
    ///
    /// Runs entirely under the caller's write guard so the power check, the
    /// store write and the history append are observed together.
    pub fn ingest(
        &self,
        state: &mut AppState,
        payload: &SensorPayload,
    ) -> Result<IngestOutcome, IngestError> {
        let [temperature, pressure, moisture, vibration] = match payload.parse() {
            Ok(values) => values,
            Err(reason) => {
                warn!(reason = %reason, "Rejected sensor payload");
                state.ingest_stats.rejected += 1;
                return Ok(IngestOutcome::Rejected(reason));
            }
        };

        if !state.control.is_on() {
            debug!("Device is remotely OFF, discarding reading");
            state.ingest_stats.ignored += 1;
            return Ok(IngestOutcome::Ignored);
        }

        let reading = Reading::now(temperature, pressure, moisture, vibration);
        self.store.append(&reading)?;
        state.history.record_reading(&reading);
        state.ingest_stats.accepted += 1;
        debug!(
            temperature,
            pressure,
            moisture,
            vibration,
            "Reading accepted"
        );
        Ok(IngestOutcome::Accepted(reading))
    }
}
