use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::Lift;

/// Kilograms to pounds.
pub const KG_TO_LBS: Decimal = Decimal::from_parts(220462262, 0, 0, false, 8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn is_kg(&self) -> bool {
        matches!(self, Self::Kg)
    }

    /// Convert a kilogram value into this unit, rounded to 2 places.
    pub fn from_kg(&self, kg: Decimal) -> Decimal {
        match self {
            Self::Kg => kg,
            Self::Lbs => (kg * KG_TO_LBS).round_dp(2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lb",
        }
    }
}

/// One plate denomination in the meet's inventory. Weights are in kg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Plate {
    #[validate(custom(function = "non_negative"))]
    pub weight_kg: Decimal,
    pub color: String,
    pub pairs_available: u32,
}

impl Plate {
    pub fn new(weight_kg: Decimal, color: impl Into<String>, pairs_available: u32) -> Self {
        Self {
            weight_kg,
            color: color.into(),
            pairs_available,
        }
    }

    /// IPF competition plate set.
    pub fn ipf_defaults() -> Vec<Plate> {
        vec![
            Plate::new(Decimal::new(25, 0), "#DF4E4E", 8),
            Plate::new(Decimal::new(20, 0), "#4B6BD1", 1),
            Plate::new(Decimal::new(15, 0), "#EACB3D", 1),
            Plate::new(Decimal::new(10, 0), "#4C9D4C", 1),
            Plate::new(Decimal::new(5, 0), "#FFFFFF", 1),
            Plate::new(Decimal::new(25, 1), "#222222", 1),
            Plate::new(Decimal::new(125, 2), "#C0C0C0", 1),
            Plate::new(Decimal::new(5, 1), "#C0C0C0", 1),
            Plate::new(Decimal::new(25, 2), "#C0C0C0", 1),
        ]
    }
}

/// Combined bar and collar weight per lift, in kg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BarConfig {
    #[validate(custom(function = "non_negative"))]
    pub squat_kg: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub bench_kg: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub deadlift_kg: Decimal,
}

impl BarConfig {
    pub fn uniform(weight_kg: Decimal) -> Self {
        Self {
            squat_kg: weight_kg,
            bench_kg: weight_kg,
            deadlift_kg: weight_kg,
        }
    }

    pub fn for_lift(&self, lift: Lift) -> Decimal {
        match lift {
            Lift::Squat => self.squat_kg,
            Lift::Bench => self.bench_kg,
            Lift::Deadlift => self.deadlift_kg,
        }
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self::uniform(Decimal::new(25, 0))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_weight"));
    }
    Ok(())
}
