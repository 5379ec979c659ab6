//! Dashboard Poller
//!
//! Consumer-side loop that watches the service the way the dashboard does:
//! fetch the latest reading once per interval, keep a private history
//! window, assess, and ask for a fresh narrative whenever the picture
//! changes. A failed fetch is treated as connectivity loss, which is the
//! only path to an OFFLINE verdict.

use serde::Deserialize;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::defaults::{POLL_INTERVAL_MS, POLL_TIMEOUT_MS};
use crate::llm::{NarrativeRequest, AI_SERVICE_ERROR_MESSAGE, AWAITING_DATA_MESSAGE};
use crate::pipeline::{assess_snapshot, Assessment, HistoryWindow, PowerStatus};
use crate::processing::format_metric;
use crate::types::{Channel, ChannelBands, ReadingSnapshot, SignalStatus};

/// Body of `GET /api/sensors/latest` as the poller reads it.
#[derive(Debug, Deserialize)]
struct LatestPayload {
    #[serde(flatten)]
    reading: ReadingSnapshot,
    #[serde(rename = "devicePowerStatus")]
    power: Option<PowerStatus>,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    analysis: String,
}

/// Result of one poll.
#[derive(Debug, Clone)]
pub struct PollTick {
    pub connected: bool,
    pub power: Option<PowerStatus>,
    pub assessment: Assessment,
    /// Set only when the narrative was refreshed on this tick
    pub narrative: Option<String>,
}

pub struct DashboardPoller {
    client: reqwest::Client,
    base_url: String,
    interval: Duration,
    bands: ChannelBands,
    history: HistoryWindow,
    /// Overall status and raw values of the last narrated snapshot
    last_seen: Option<(SignalStatus, ReadingSnapshot)>,
    narrative: String,
}

impl DashboardPoller {
    pub fn new(
        base_url: impl Into<String>,
        bands: ChannelBands,
        history_capacity: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(POLL_TIMEOUT_MS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            bands,
            history: HistoryWindow::new(history_capacity),
            last_seen: None,
            narrative: AWAITING_DATA_MESSAGE.to_string(),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// Most recent narrative text.
    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    async fn fetch_latest(&self) -> Result<LatestPayload, reqwest::Error> {
        self.client
            .get(format!("{}/api/sensors/latest", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<LatestPayload>()
            .await
    }

    async fn request_narrative(&self, snapshot: &ReadingSnapshot, status: SignalStatus) -> String {
        if status.is_unavailable() {
            return AWAITING_DATA_MESSAGE.to_string();
        }
        let request = NarrativeRequest::new(snapshot, status);
        let result = async {
            self.client
                .post(format!("{}/api/ai/risk-analysis", self.base_url))
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<AnalysisPayload>()
                .await
        }
        .await;

        match result {
            Ok(payload) => payload.analysis,
            Err(e) => {
                warn!(error = %e, "Risk analysis request failed");
                AI_SERVICE_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Run one poll cycle.
    pub async fn tick(&mut self) -> PollTick {
        let (snapshot, power, connected) = match self.fetch_latest().await {
            Ok(payload) => (payload.reading, payload.power, true),
            Err(e) => {
                debug!(error = %e, "Latest reading fetch failed");
                (ReadingSnapshot::connection_error(), None, false)
            }
        };

        if connected && snapshot.temperature.is_measured() {
            for channel in Channel::TRENDED {
                self.history
                    .record(channel, &snapshot.timestamp, snapshot.get(channel));
            }
        }

        let assessment = assess_snapshot(&snapshot, &self.bands, &self.history, connected);

        let key = (assessment.overall_status, snapshot.clone());
        let narrative = if self.last_seen.as_ref() != Some(&key) {
            let text = self
                .request_narrative(&snapshot, assessment.overall_status)
                .await;
            self.narrative = text.clone();
            self.last_seen = Some(key);
            Some(text)
        } else {
            None
        };

        PollTick {
            connected,
            power,
            assessment,
            narrative,
        }
    }

    /// Poll until cancelled. Returns the number of completed ticks.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        info!(url = %self.base_url, interval_ms = self.interval.as_millis() as u64, "Dashboard poller starting");
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(ticks, "Dashboard poller stopping");
                    return ticks;
                }
                _ = interval.tick() => {
                    let tick = self.tick().await;
                    ticks += 1;
                    log_tick(&tick);
                }
            }
        }
    }
}

fn log_tick(tick: &PollTick) {
    let a = &tick.assessment;
    info!(
        status = a.overall_status.as_str(),
        power = tick.power.map(PowerStatus::as_str).unwrap_or("?"),
        temperature = %a.channels.temperature.value,
        pressure = %a.channels.pressure.value,
        moisture = %a.channels.moisture.value,
        vibration = %a.channels.vibration.value,
        temp_avg = %format_metric(a.analytics.temperature.avg),
        vib_max = %format_metric(a.analytics.vibration.max),
        "{}",
        a.timestamp
    );
    if let Some(text) = &tick.narrative {
        info!(analysis = %text, "Risk narrative updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{create_app, DashboardState};
    use crate::pipeline::SensorPayload;

    async fn spawn_router(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn spawn_app(state: DashboardState) -> String {
        spawn_router(create_app(state)).await
    }

    /// Fails the risk-analysis endpoint and passes everything else through.
    async fn reject_analysis(
        req: axum::extract::Request,
        next: axum::middleware::Next,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;
        if req.uri().path() == "/api/ai/risk-analysis" {
            return axum::http::StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
        next.run(req).await
    }

    async fn seed(state: &DashboardState, payload: SensorPayload) {
        let mut app_state = state.app_state.write().await;
        state.gateway.ingest(&mut app_state, &payload).unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_offline() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut poller =
            DashboardPoller::new(format!("http://{addr}"), ChannelBands::default(), 15).unwrap();
        let tick = poller.tick().await;

        assert!(!tick.connected);
        assert_eq!(tick.assessment.overall_status, SignalStatus::Offline);
        assert_eq!(tick.narrative.as_deref(), Some(AWAITING_DATA_MESSAGE));
        assert!(poller.history().is_empty(Channel::Temperature));
    }

    #[tokio::test]
    async fn test_empty_server_is_no_data() {
        let url = spawn_app(DashboardState::in_memory()).await;
        let mut poller = DashboardPoller::new(url, ChannelBands::default(), 15).unwrap();
        let tick = poller.tick().await;

        assert!(tick.connected);
        assert_eq!(tick.power, Some(PowerStatus::On));
        assert_eq!(tick.assessment.overall_status, SignalStatus::NoData);
        assert!(poller.history().is_empty(Channel::Temperature));
    }

    #[tokio::test]
    async fn test_reading_is_assessed_and_narrated_once() {
        let state = DashboardState::in_memory();
        seed(&state, SensorPayload::numeric(35.0, 1005.0, 40.0, 0.3)).await;
        let url = spawn_app(state).await;

        let mut poller = DashboardPoller::new(url, ChannelBands::default(), 15).unwrap();
        let first = poller.tick().await;
        assert_eq!(first.assessment.overall_status, SignalStatus::Critical);
        let text = first.narrative.unwrap();
        assert!(text.starts_with("Fallback: Critical temperature"));
        assert_eq!(poller.narrative(), text);

        // Same reading again: no new narrative, but history still grows
        let second = poller.tick().await;
        assert!(second.narrative.is_none());
        assert_eq!(poller.history().len(Channel::Temperature), 2);
        assert_eq!(poller.history().len(Channel::Pressure), 0);
    }

    #[tokio::test]
    async fn test_unreachable_analysis_endpoint_shows_service_error() {
        let state = DashboardState::in_memory();
        seed(&state, SensorPayload::numeric(35.0, 1005.0, 40.0, 0.3)).await;
        let app = create_app(state).layer(axum::middleware::from_fn(reject_analysis));
        let url = spawn_router(app).await;

        let mut poller = DashboardPoller::new(url, ChannelBands::default(), 15).unwrap();
        let tick = poller.tick().await;
        assert!(tick.connected);
        assert_eq!(tick.assessment.overall_status, SignalStatus::Critical);
        assert_eq!(tick.narrative.as_deref(), Some(AI_SERVICE_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let poller = DashboardPoller::new(format!("http://{addr}"), ChannelBands::default(), 15)
            .unwrap()
            .with_interval(Duration::from_millis(10));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        let ticks = handle.await.unwrap();
        assert!(ticks >= 1);
    }
}
