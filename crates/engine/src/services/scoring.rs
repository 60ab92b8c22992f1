//! IPF GL points.
//!
//! Formula: GL = Total × 100 / (A − B · e^(−C · BW))

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{EngineError, Result};
use crate::models::{Equipment, Event, EventFamily, Sex};

/// Inclusive bodyweight bounds outside of which a score is not valid.
pub const MIN_BODYWEIGHT: Decimal = Decimal::from_parts(35, 0, 0, false, 0);
pub const MAX_BODYWEIGHT: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// GL coefficients for one sex / equipment / event combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

const fn gl(a: f64, b: f64, c: f64) -> GlCoefficients {
    GlCoefficients { a, b, c }
}

// Published 2020 coefficient set.
const MEN_CLASSIC_SBD: GlCoefficients = gl(1199.72839, 1025.18162, 0.00921);
const MEN_CLASSIC_BENCH: GlCoefficients = gl(320.98041, 281.40258, 0.01008);
const MEN_EQUIPPED_SBD: GlCoefficients = gl(1236.25115, 1449.21864, 0.01644);
const MEN_EQUIPPED_BENCH: GlCoefficients = gl(381.22073, 733.79378, 0.02398);
const WOMEN_CLASSIC_SBD: GlCoefficients = gl(610.32796, 1045.59282, 0.03048);
const WOMEN_CLASSIC_BENCH: GlCoefficients = gl(142.40398, 442.52671, 0.04724);
const WOMEN_EQUIPPED_SBD: GlCoefficients = gl(758.63878, 949.31382, 0.02435);
const WOMEN_EQUIPPED_BENCH: GlCoefficients = gl(221.82209, 357.00377, 0.02937);

impl GlCoefficients {
    pub fn lookup(sex: Sex, equipment: Equipment, family: EventFamily) -> Self {
        match (sex, equipment, family) {
            (Sex::M | Sex::Mx, Equipment::Classic, EventFamily::Sbd) => MEN_CLASSIC_SBD,
            (Sex::M | Sex::Mx, Equipment::Classic, EventFamily::Bench) => MEN_CLASSIC_BENCH,
            (Sex::M | Sex::Mx, Equipment::Equipped, EventFamily::Sbd) => MEN_EQUIPPED_SBD,
            (Sex::M | Sex::Mx, Equipment::Equipped, EventFamily::Bench) => MEN_EQUIPPED_BENCH,
            (Sex::F, Equipment::Classic, EventFamily::Sbd) => WOMEN_CLASSIC_SBD,
            (Sex::F, Equipment::Classic, EventFamily::Bench) => WOMEN_CLASSIC_BENCH,
            (Sex::F, Equipment::Equipped, EventFamily::Sbd) => WOMEN_EQUIPPED_SBD,
            (Sex::F, Equipment::Equipped, EventFamily::Bench) => WOMEN_EQUIPPED_BENCH,
        }
    }
}

/// GL points rounded to 2 places, or an error naming why the input cannot be
/// scored.
pub fn try_points(
    total: Decimal,
    bodyweight: Decimal,
    sex: Sex,
    equipment: Equipment,
    event: Event,
) -> Result<Decimal> {
    if total <= Decimal::ZERO {
        return Err(EngineError::InvalidScoringInput(format!(
            "total must be positive, got {}",
            total
        )));
    }
    if bodyweight < MIN_BODYWEIGHT || bodyweight > MAX_BODYWEIGHT {
        return Err(EngineError::InvalidScoringInput(format!(
            "bodyweight {} outside {}-{}",
            bodyweight, MIN_BODYWEIGHT, MAX_BODYWEIGHT
        )));
    }

    let coefficients = GlCoefficients::lookup(sex, equipment, event.family());

    let total = total.to_f64().unwrap_or(0.0);
    let bodyweight = bodyweight.to_f64().unwrap_or(0.0);

    let denominator = coefficients.a - coefficients.b * (-coefficients.c * bodyweight).exp();
    if denominator == 0.0 {
        return Err(EngineError::InvalidScoringInput(
            "formula denominator is zero".to_string(),
        ));
    }

    let score = (total * 100.0) / denominator;
    if !score.is_finite() || score < 0.0 {
        return Err(EngineError::InvalidScoringInput(format!(
            "score is not a finite non-negative number: {}",
            score
        )));
    }

    Decimal::from_f64(score)
        .map(|score| score.round_dp(2))
        .ok_or_else(|| EngineError::InvalidScoringInput(format!("unrepresentable score {}", score)))
}

/// GL points, with 0 standing in for any input that cannot be scored.
pub fn points(
    total: Decimal,
    bodyweight: Decimal,
    sex: Sex,
    equipment: Equipment,
    event: Event,
) -> Decimal {
    try_points(total, bodyweight, sex, equipment, event).unwrap_or(Decimal::ZERO)
}
