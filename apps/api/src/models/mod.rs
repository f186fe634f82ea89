pub mod calendar;
pub mod client;
pub mod deal;
pub mod insight;
pub mod notification;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Three-level scale shared by deal priority, insight impact and event priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

/// Parses a wire-format enum value (e.g. `"negotiation"`) into its Rust variant.
/// Returns `None` for unknown values so callers can produce their own 400 message.
pub fn parse_variant<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

/// Clamps a client-supplied percentage into 0..=100.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant_known_and_unknown() {
        assert_eq!(parse_variant::<Level>("high"), Some(Level::High));
        assert_eq!(parse_variant::<Level>("urgent"), None);
    }

    #[test]
    fn test_clamp_percent_bounds() {
        assert_eq!(clamp_percent(150.0), 100);
        assert_eq!(clamp_percent(-5.0), 0);
        assert_eq!(clamp_percent(42.4), 42);
        assert_eq!(clamp_percent(f64::NAN), 0);
    }
}
