//! Narrative Generator
//!
//! ```text
//! OFFLINE / NO_DATA ──▶ awaiting message (no call)
//! otherwise ──▶ backend (bounded by timeout)
//!                 ├─ Success(text)     ──▶ text
//!                 ├─ TransportFailure  ──▶ rule-based fallback (no retry)
//!                 └─ SemanticFailure   ──▶ rule-based fallback
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{GeminiBackend, NarrativeBackend, NarrativeOutcome};
use crate::config::NarrativeConfig;
use crate::types::{ChannelValue, Reading, ReadingSnapshot, SignalStatus};

/// Returned without calling the backend when there is nothing to assess.
pub const AWAITING_DATA_MESSAGE: &str = "Awaiting sufficient sensor data for AI risk assessment.";

/// Shown by the dashboard when the risk-analysis endpoint itself cannot be
/// reached. An unreachable backend still yields the rule-based narrative.
pub const AI_SERVICE_ERROR_MESSAGE: &str = "AI Service Error (Check Backend Console)";

const FALLBACK_CRITICAL_TEMPERATURE: &str = "Fallback: Critical temperature elevation detected. \
Immediate offloading and medical attention are required.";
const FALLBACK_CRITICAL_VIBRATION: &str = "Fallback: Extreme vibration detected. Risk of tissue \
damage is high. Advise cessation of activity.";
const FALLBACK_WARNING: &str =
    "Fallback: Signal irregularity detected. Increase monitoring frequency and check device placement.";
const FALLBACK_STABLE: &str = "Fallback: Biosignals stable. Risk low. Monitoring remains essential.";

/// Inputs for one narrative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub temperature: ChannelValue,
    pub vibration: ChannelValue,
    pub overall_status: SignalStatus,
}

impl NarrativeRequest {
    pub fn new(snapshot: &ReadingSnapshot, overall_status: SignalStatus) -> Self {
        Self {
            temperature: snapshot.temperature,
            vibration: snapshot.vibration,
            overall_status,
        }
    }

    pub fn from_reading(reading: Option<&Reading>, overall_status: SignalStatus) -> Self {
        Self::new(&ReadingSnapshot::from(reading), overall_status)
    }

    /// Lenient parse of a request body. Missing or malformed values become
    /// unavailable; an unknown status becomes NO_DATA.
    pub fn from_json(body: &serde_json::Value) -> Self {
        let value = |key: &str| {
            body.get(key)
                .and_then(|v| serde_json::from_value::<ChannelValue>(v.clone()).ok())
                .unwrap_or(ChannelValue::NO_DATA)
        };
        let overall_status = body
            .get("overallStatus")
            .and_then(|v| serde_json::from_value::<SignalStatus>(v.clone()).ok())
            .unwrap_or(SignalStatus::NoData);
        Self {
            temperature: value("temperature"),
            vibration: value("vibration"),
            overall_status,
        }
    }

    fn prompt(&self) -> String {
        format!(
            "Assess the neuropathic risk. Current Temperature: {}°C. Vibration Perception: {}g. Overall Status: {}.",
            self.temperature, self.vibration, self.overall_status
        )
    }
}

/// Deterministic narrative used when the service gives nothing usable.
/// Never empty.
pub fn fallback_narrative(
    temperature: ChannelValue,
    vibration: ChannelValue,
    status: SignalStatus,
) -> &'static str {
    let above = |v: ChannelValue, limit: f64| v.measured().is_some_and(|v| v > limit);
    match status {
        SignalStatus::Critical if above(temperature, 30.0) => FALLBACK_CRITICAL_TEMPERATURE,
        SignalStatus::Critical if above(vibration, 1.0) => FALLBACK_CRITICAL_VIBRATION,
        SignalStatus::Warning => FALLBACK_WARNING,
        _ => FALLBACK_STABLE,
    }
}

/// Generation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NarrativeStats {
    /// Requests that reached the generation step
    pub requests: u64,
    pub ai_successes: u64,
    pub fallbacks: u64,
    pub transport_errors: u64,
    /// OFFLINE / NO_DATA requests answered with the awaiting message
    pub skipped: u64,
}

impl std::fmt::Display for NarrativeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Narratives: {} requests - {} ai, {} fallback, {} transport errors, {} skipped",
            self.requests, self.ai_successes, self.fallbacks, self.transport_errors, self.skipped
        )
    }
}

pub struct NarrativeGenerator {
    backend: Option<Arc<dyn NarrativeBackend>>,
    timeout: Duration,
    stats: Mutex<NarrativeStats>,
}

impl NarrativeGenerator {
    pub fn new(backend: Option<Arc<dyn NarrativeBackend>>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            stats: Mutex::new(NarrativeStats::default()),
        }
    }

    /// Every request gets the rule-based narrative.
    pub fn fallback_only() -> Self {
        Self::new(None, Duration::from_secs(crate::config::defaults::NARRATIVE_TIMEOUT_SECS))
    }

    /// Gemini backend when an API key is present, fallback-only otherwise.
    pub fn from_config(cfg: &NarrativeConfig) -> Self {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let Some(api_key) = cfg.api_key() else {
            info!(
                env = %cfg.api_key_env,
                "No narrative API key set, using rule-based narratives only"
            );
            return Self::new(None, timeout);
        };
        match GeminiBackend::new(cfg, api_key) {
            Ok(backend) => {
                info!(model = %cfg.model, timeout_secs = cfg.timeout_secs, "Narrative backend ready");
                Self::new(Some(Arc::new(backend)), timeout)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build narrative client, using rule-based narratives only");
                Self::new(None, timeout)
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("fallback", |b| b.backend_name())
    }

    /// Produce the narrative for one request. Never fails.
    pub async fn narrate(&self, req: &NarrativeRequest) -> String {
        if req.overall_status.is_unavailable() {
            self.stats.lock().await.skipped += 1;
            return AWAITING_DATA_MESSAGE.to_string();
        }

        self.stats.lock().await.requests += 1;

        let outcome = match &self.backend {
            Some(backend) => {
                match tokio::time::timeout(self.timeout, backend.generate(&req.prompt())).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(timeout_secs = self.timeout.as_secs(), "Narrative request timed out");
                        NarrativeOutcome::TransportFailure
                    }
                }
            }
            None => NarrativeOutcome::SemanticFailure,
        };

        let outcome = match outcome {
            NarrativeOutcome::Success(text) if text.trim().is_empty() => {
                NarrativeOutcome::SemanticFailure
            }
            other => other,
        };

        let mut stats = self.stats.lock().await;
        match outcome {
            NarrativeOutcome::Success(text) => {
                stats.ai_successes += 1;
                text.trim().to_string()
            }
            NarrativeOutcome::TransportFailure => {
                stats.transport_errors += 1;
                fallback_narrative(req.temperature, req.vibration, req.overall_status).to_string()
            }
            NarrativeOutcome::SemanticFailure => {
                stats.fallbacks += 1;
                fallback_narrative(req.temperature, req.vibration, req.overall_status).to_string()
            }
        }
    }

    pub async fn stats(&self) -> NarrativeStats {
        *self.stats.lock().await
    }
}
