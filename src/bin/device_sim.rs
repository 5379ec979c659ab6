//! Sensing Device Simulator
//!
//! Emulates the wearable DPN sensing device against a running monitor:
//! polls the remote power switch and vibration setting, and while the
//! device is ON posts synthetic readings drawn around a scenario baseline.
//!
//! # Usage
//! ```bash
//! ./device-sim --url http://localhost:4000 --scenario critical-temperature --seed 7
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use dpn_monitor::pipeline::{PowerStatus, SensorPayload};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "device-sim")]
#[command(about = "Synthetic DPN sensing device for testing the monitor")]
#[command(version)]
struct Args {
    /// Base URL of the monitor
    #[arg(long, default_value = "http://localhost:4000")]
    url: String,

    /// Seconds between cycles
    #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u64).range(1..=3600))]
    interval: u64,

    /// Physiological scenario to simulate
    #[arg(long, value_enum, default_value_t = Scenario::Normal)]
    scenario: Scenario,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many cycles (default: run until Ctrl+C)
    #[arg(long)]
    count: Option<u64>,
}

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Scenario {
    /// Every channel inside its normal region
    Normal,
    /// Cool skin and weak vibration perception
    Warning,
    /// Skin temperature above the clinical maximum
    CriticalTemperature,
    /// Vibration above the clinical maximum
    CriticalVibration,
}

/// Mean and standard deviation per channel.
#[derive(Debug, Clone, Copy)]
struct Baseline {
    temperature: (f64, f64),
    pressure: (f64, f64),
    moisture: (f64, f64),
    vibration: (f64, f64),
}

impl Scenario {
    fn baseline(self) -> Baseline {
        let normal = Baseline {
            temperature: (25.5, 0.3),
            pressure: (1007.0, 2.0),
            moisture: (42.0, 3.0),
            vibration: (0.35, 0.04),
        };
        match self {
            Scenario::Normal => normal,
            Scenario::Warning => Baseline {
                temperature: (22.5, 0.3),
                vibration: (0.12, 0.02),
                ..normal
            },
            Scenario::CriticalTemperature => Baseline {
                temperature: (32.5, 0.5),
                ..normal
            },
            Scenario::CriticalVibration => Baseline {
                vibration: (1.4, 0.1),
                ..normal
            },
        }
    }
}

struct ReadingGenerator {
    rng: StdRng,
    temperature: Normal<f64>,
    pressure: Normal<f64>,
    moisture: Normal<f64>,
    vibration: Normal<f64>,
}

impl ReadingGenerator {
    fn new(scenario: Scenario, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let b = scenario.baseline();
        let dist = |(mean, sd): (f64, f64)| {
            Normal::new(mean, sd).with_context(|| format!("invalid distribution N({mean}, {sd})"))
        };
        Ok(Self {
            rng,
            temperature: dist(b.temperature)?,
            pressure: dist(b.pressure)?,
            moisture: dist(b.moisture)?,
            vibration: dist(b.vibration)?,
        })
    }

    fn next_payload(&mut self) -> SensorPayload {
        let round = |v: f64, places: i32| {
            let f = 10f64.powi(places);
            (v * f).round() / f
        };
        SensorPayload::numeric(
            round(self.temperature.sample(&mut self.rng), 2),
            round(self.pressure.sample(&mut self.rng), 1),
            round(self.moisture.sample(&mut self.rng), 1),
            round(self.vibration.sample(&mut self.rng).max(0.0), 3),
        )
    }
}

// ============================================================================
// Device Loop
// ============================================================================

#[derive(Debug, Deserialize)]
struct PowerResponse {
    command: PowerStatus,
}

#[derive(Debug, Deserialize)]
struct VibrationResponse {
    duration_ms: u32,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

async fn poll_power(client: &reqwest::Client, base: &str) -> Result<PowerStatus> {
    let resp: PowerResponse = client
        .get(format!("{base}/api/control/power"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp.command)
}

async fn poll_vibration(client: &reqwest::Client, base: &str) -> Result<u32> {
    let resp: VibrationResponse = client
        .get(format!("{base}/api/settings/vibration"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp.duration_ms)
}

async fn post_reading(client: &reqwest::Client, base: &str, payload: &SensorPayload) -> Result<String> {
    let resp = client
        .post(format!("{base}/api/sensors/data"))
        .json(payload)
        .send()
        .await?;
    let code = resp.status();
    let body: StatusResponse = resp.json().await.unwrap_or(StatusResponse {
        status: String::new(),
    });
    Ok(format!("{} {}", code.as_u16(), body.status))
}

async fn cycle(client: &reqwest::Client, base: &str, generator: &mut ReadingGenerator) -> Result<()> {
    let power = poll_power(client, base).await.context("power poll failed")?;
    let duration_ms = poll_vibration(client, base)
        .await
        .context("vibration poll failed")?;
    info!(power = %power, duration_ms, "Device settings");

    if power == PowerStatus::Off {
        info!("Device is OFF, skipping reading");
        return Ok(());
    }

    let payload = generator.next_payload();
    let result = post_reading(client, base, &payload).await?;
    info!(?payload, result = %result, "Reading posted");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let base = args.url.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")?;
    let mut generator = ReadingGenerator::new(args.scenario, args.seed)?;

    info!(url = %base, scenario = ?args.scenario, seed = ?args.seed, "Device simulator starting");

    let mut interval = tokio::time::interval(Duration::from_secs(args.interval));
    let mut cycles = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(cycles, "Received Ctrl+C, stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = cycle(&client, &base, &mut generator).await {
                    warn!(error = %e, "Cycle failed");
                }
                cycles += 1;
                if args.count.is_some_and(|n| cycles >= n) {
                    info!(cycles, "Cycle count reached");
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpn_monitor::processing::classify;
    use dpn_monitor::types::{Channel, ChannelBand, ChannelValue, SignalStatus};

    fn temperature(payload: &SensorPayload) -> f64 {
        payload
            .temperature
            .as_ref()
            .and_then(|v| v.as_f64())
            .unwrap()
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let mut a = ReadingGenerator::new(Scenario::Normal, Some(7)).unwrap();
        let mut b = ReadingGenerator::new(Scenario::Normal, Some(7)).unwrap();
        for _ in 0..5 {
            assert_eq!(temperature(&a.next_payload()), temperature(&b.next_payload()));
        }
    }

    #[test]
    fn test_critical_temperature_scenario_exceeds_band() {
        let mut gen = ReadingGenerator::new(Scenario::CriticalTemperature, Some(1)).unwrap();
        for _ in 0..20 {
            let t = temperature(&gen.next_payload());
            let status = classify(ChannelValue::Measured(t), &ChannelBand::TEMPERATURE);
            assert_eq!(status.status, SignalStatus::Critical, "t={t}");
        }
    }

    #[test]
    fn test_payload_has_every_channel() {
        let mut gen = ReadingGenerator::new(Scenario::Warning, Some(3)).unwrap();
        let json = serde_json::to_value(gen.next_payload()).unwrap();
        for channel in Channel::ALL {
            assert!(json[channel.name()].is_number(), "{channel} missing");
        }
    }
}
