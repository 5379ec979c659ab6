//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks on clinical bands.
//!
//! Two-pass parse: the raw TOML is first walked as a `toml::Value` and every
//! key compared against the known set, emitting "did you mean?" warnings.
//! Normal serde deserialization follows. Warnings never break a config.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path for `MonitorConfig`.
///
/// Maintained by hand to match monitor_config.rs; a new field needs an
/// entry here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        // [bands]
        "bands",
        "bands.temperature",
        "bands.temperature.min",
        "bands.temperature.max",
        "bands.temperature.safe",
        "bands.pressure",
        "bands.pressure.min",
        "bands.pressure.max",
        "bands.pressure.safe",
        "bands.moisture",
        "bands.moisture.min",
        "bands.moisture.max",
        "bands.moisture.safe",
        "bands.vibration",
        "bands.vibration.min",
        "bands.vibration.max",
        "bands.vibration.safe",
        // [history]
        "history",
        "history.capacity",
        // [control]
        "control",
        "control.default_power",
        "control.default_vibration_duration_ms",
        // [narrative]
        "narrative",
        "narrative.endpoint",
        "narrative.model",
        "narrative.api_key_env",
        "narrative.timeout_secs",
        // [storage]
        "storage",
        "storage.backend",
        "storage.path",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walker
// ============================================================================

/// Collect every dotted key path in a TOML value tree.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Warnings for any unknown keys in a raw TOML string. Never fails; parse
/// errors are left to serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility
// ============================================================================

/// Bands that parse and validate but look clinically odd, e.g. a skin
/// temperature band reaching above 45°C. Warnings only.
pub fn validate_band_plausibility(config: &super::MonitorConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let b = &config.bands;

    if b.temperature.min < 0.0 || b.temperature.max > 45.0 {
        warnings.push(ValidationWarning {
            field: "bands.temperature".to_string(),
            message: format!(
                "bands.temperature [{}, {}] is outside the typical skin range (0-45 °C)",
                b.temperature.min, b.temperature.max
            ),
            suggestion: None,
        });
    }
    if b.moisture.min < 0.0 || b.moisture.max > 100.0 {
        warnings.push(ValidationWarning {
            field: "bands.moisture".to_string(),
            message: format!(
                "bands.moisture [{}, {}] is outside 0-100 %",
                b.moisture.min, b.moisture.max
            ),
            suggestion: None,
        });
    }
    if b.vibration.min < 0.0 {
        warnings.push(ValidationWarning {
            field: "bands.vibration.min".to_string(),
            message: format!("bands.vibration.min = {} is negative", b.vibration.min),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("capacty", "capacity"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [bands.vibration]
            max = 1.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"bands".to_string()));
        assert!(keys.contains(&"bands.vibration".to_string()));
        assert!(keys.contains(&"bands.vibration.max".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
            [history]
            capacty = 20
            "#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("history.capacity"));
        assert!(warnings[0].to_string().contains("did you mean"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let warnings = validate_unknown_keys(
            r#"
            [server]
            addr = "127.0.0.1:4000"
            [bands.temperature]
            min = 20.0
            max = 30.0
            safe = 24.0
            [control]
            default_power = "ON"
            default_vibration_duration_ms = 10000
            [narrative]
            timeout_secs = 5
            [storage]
            backend = "memory"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert_eq!(suggest_correction("zzzzzzzzzzzzzzzzzzzz", &known), None);
    }

    #[test]
    fn test_band_plausibility() {
        let mut cfg = super::super::MonitorConfig::default();
        assert!(validate_band_plausibility(&cfg).is_empty());
        cfg.bands.temperature.max = 60.0;
        let warnings = validate_band_plausibility(&cfg);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "bands.temperature");
    }
}
