//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address when neither config, env nor CLI sets one.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:4000";

/// Maximum accepted request body (bytes). Payloads are a handful of fields.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Environment variable overriding `server.addr`.
pub const SERVER_ADDR_ENV: &str = "DPN_SERVER_ADDR";

/// Environment variable pointing at the TOML config file.
pub const CONFIG_PATH_ENV: &str = "DPN_CONFIG";

/// Comma-separated CORS origins; permissive when unset.
pub const CORS_ORIGINS_ENV: &str = "SENSOR_CORS_ORIGINS";

// ============================================================================
// Pipeline
// ============================================================================

/// Readings kept per trended channel.
pub const HISTORY_WINDOW_SIZE: usize = 15;

/// Lower bound for the vibration stimulus duration (ms).
pub const MIN_VIBRATION_DURATION_MS: u32 = 10_000;

/// Upper bound for the vibration stimulus duration (ms). 300 000 = 5 minutes.
pub const MAX_VIBRATION_DURATION_MS: u32 = 300_000;

// ============================================================================
// Narrative
// ============================================================================

/// Upper bound on one narrative request (seconds).
pub const NARRATIVE_TIMEOUT_SECS: u64 = 10;

pub const NARRATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const NARRATIVE_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Environment variable holding the API key.
pub const NARRATIVE_API_KEY_ENV: &str = "GEMINI_API_KEY";

// ============================================================================
// Dashboard Poller
// ============================================================================

/// Fixed polling cadence (ms).
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// HTTP timeout for one poll (ms). Kept below the cadence.
pub const POLL_TIMEOUT_MS: u64 = 900;

// ============================================================================
// Storage
// ============================================================================

pub const DEFAULT_STORE_PATH: &str = "./data/readings.db";
