use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::{BarConfig, Lift, Plate, WeightUnit};
use crate::timer::DEFAULT_TIMER_SECONDS;

/// Competition-day settings read by the engine. Treated as read-only for the
/// duration of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MeetConfig {
    #[serde(default = "Plate::ipf_defaults")]
    #[validate(nested, custom(function = "distinct_plates"))]
    pub plates: Vec<Plate>,

    #[serde(default)]
    #[validate(nested)]
    pub bar: BarConfig,

    #[serde(default)]
    pub units: WeightUnit,

    #[serde(default = "default_attempts_per_lift")]
    #[validate(range(min = 3, max = 4, message = "attempts per lift must be 3 or 4"))]
    pub attempts_per_lift: u8,

    #[serde(default = "default_timer_seconds")]
    #[validate(range(min = 1, message = "attempt timer must be at least one second"))]
    pub timer_seconds: u32,
}

fn default_attempts_per_lift() -> u8 {
    3
}

fn default_timer_seconds() -> u32 {
    DEFAULT_TIMER_SECONDS
}

fn distinct_plates(plates: &Vec<Plate>) -> std::result::Result<(), ValidationError> {
    for (i, plate) in plates.iter().enumerate() {
        if plates[..i].iter().any(|p| p.weight_kg == plate.weight_kg) {
            return Err(ValidationError::new("duplicate_plate_weight"));
        }
    }
    Ok(())
}

impl Default for MeetConfig {
    fn default() -> Self {
        Self {
            plates: Plate::ipf_defaults(),
            bar: BarConfig::default(),
            units: WeightUnit::Kg,
            attempts_per_lift: default_attempts_per_lift(),
            timer_seconds: DEFAULT_TIMER_SECONDS,
        }
    }
}

impl MeetConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MeetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!(
            "Loaded meet config from {} ({} plate sizes, {} attempts per lift)",
            path.display(),
            config.plates.len(),
            config.attempts_per_lift
        );
        Ok(config)
    }

    pub fn bar_for(&self, lift: Lift) -> rust_decimal::Decimal {
        self.bar.for_lift(lift)
    }

    pub fn use_kg(&self) -> bool {
        self.units.is_kg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;

    #[test]
    fn test_defaults_are_valid() {
        let config = MeetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bar_for(Lift::Bench), Decimal::new(25, 0));
        assert!(config.use_kg());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MeetConfig::from_json(r#"{ "units": "lbs", "attempts_per_lift": 4 }"#).unwrap();
        assert_eq!(config.units, WeightUnit::Lbs);
        assert_eq!(config.attempts_per_lift, 4);
        assert_eq!(config.timer_seconds, 60);
        assert_eq!(config.plates.len(), 9);
    }

    #[test]
    fn test_rejects_out_of_range_attempts() {
        let result = MeetConfig::from_json(r#"{ "attempts_per_lift": 5 }"#);
        assert_matches!(result, Err(EngineError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_plate() {
        let json = r#"{ "plates": [ { "weight_kg": "-5", "color": "red", "pairs_available": 1 } ] }"#;
        assert_matches!(MeetConfig::from_json(json), Err(EngineError::Validation(_)));
    }

    #[test]
    fn test_rejects_duplicate_plates() {
        let json = r#"{ "plates": [
            { "weight_kg": "25", "color": "red", "pairs_available": 1 },
            { "weight_kg": "25", "color": "red", "pairs_available": 2 }
        ] }"#;
        assert_matches!(MeetConfig::from_json(json), Err(EngineError::Validation(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert_matches!(MeetConfig::from_json("{"), Err(EngineError::Json(_)));
    }
}
