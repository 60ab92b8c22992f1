use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{AttemptSlot, Event, Lift};
use crate::error::EngineError;
use crate::services::scoring;

pub type EntryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
    /// Mixed-sex division; scored with the men's coefficients.
    Mx,
}

impl FromStr for Sex {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "MEN" => Ok(Self::M),
            "F" | "FEMALE" | "WOMEN" => Ok(Self::F),
            "MX" | "MIXED" => Ok(Self::Mx),
            _ => Err(EngineError::Config(format!("Unknown sex: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equipment {
    #[serde(alias = "Raw", alias = "Wraps", alias = "Sleeves")]
    Classic,
    #[serde(alias = "Single-ply", alias = "Multi-ply", alias = "Unlimited")]
    Equipped,
}

impl FromStr for Equipment {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "raw" | "wraps" | "sleeves" => Ok(Self::Classic),
            "equipped" | "single-ply" | "multi-ply" | "unlimited" => Ok(Self::Equipped),
            _ => Err(EngineError::Config(format!("Unknown equipment: '{}'", s))),
        }
    }
}

/// Day / platform / flight an entry lifts in. Only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SessionKey {
    pub day: u32,
    pub platform: u32,
    pub flight: String,
}

impl SessionKey {
    pub fn new(day: u32, platform: u32, flight: impl Into<String>) -> Self {
        Self {
            day,
            platform,
            flight: flight.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {} / platform {} / flight {}",
            self.day, self.platform, self.flight
        )
    }
}

/// One competitor registration as seen by the competition-day engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub sex: Sex,
    pub equipment: Equipment,
    pub bodyweight: Option<Decimal>,
    #[serde(default)]
    pub session: SessionKey,
    #[serde(default)]
    pub squat: Vec<AttemptSlot>,
    #[serde(default)]
    pub bench: Vec<AttemptSlot>,
    #[serde(default)]
    pub deadlift: Vec<AttemptSlot>,
}

impl Entry {
    pub fn new(
        name: impl Into<String>,
        sex: Sex,
        equipment: Equipment,
        session: SessionKey,
        attempts_per_lift: u8,
    ) -> Self {
        let slots = vec![AttemptSlot::default(); attempts_per_lift as usize];
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sex,
            equipment,
            bodyweight: None,
            session,
            squat: slots.clone(),
            bench: slots.clone(),
            deadlift: slots,
        }
    }

    pub fn with_bodyweight(mut self, bodyweight: Decimal) -> Self {
        self.bodyweight = Some(bodyweight);
        self
    }

    pub fn attempts(&self, lift: Lift) -> &[AttemptSlot] {
        match lift {
            Lift::Squat => &self.squat,
            Lift::Bench => &self.bench,
            Lift::Deadlift => &self.deadlift,
        }
    }

    pub fn attempts_mut(&mut self, lift: Lift) -> &mut Vec<AttemptSlot> {
        match lift {
            Lift::Squat => &mut self.squat,
            Lift::Bench => &mut self.bench,
            Lift::Deadlift => &mut self.deadlift,
        }
    }

    /// Slot for a 1-based attempt number.
    pub fn slot(&self, lift: Lift, attempt: u8) -> Option<&AttemptSlot> {
        let index = (attempt as usize).checked_sub(1)?;
        self.attempts(lift).get(index)
    }

    /// Make sure every lift has at least `attempts_per_lift` slots, so entries
    /// coming from storage with short arrays can be addressed uniformly.
    pub fn ensure_slots(&mut self, attempts_per_lift: u8) {
        for lift in Lift::ALL {
            let slots = self.attempts_mut(lift);
            if slots.len() < attempts_per_lift as usize {
                slots.resize(attempts_per_lift as usize, AttemptSlot::default());
            }
        }
    }

    /// Heaviest successful attempt of a lift.
    pub fn best_lift(&self, lift: Lift) -> Option<Decimal> {
        self.attempts(lift)
            .iter()
            .filter_map(AttemptSlot::good_weight)
            .max()
    }

    /// Sum of the best lifts, or `None` if any lift has no good attempt.
    pub fn total(&self) -> Option<Decimal> {
        Lift::ALL
            .iter()
            .map(|lift| self.best_lift(*lift))
            .sum::<Option<Decimal>>()
    }

    pub fn points(&self, event: Event) -> Decimal {
        let result = match event.lift() {
            Some(lift) => self.best_lift(lift),
            None => self.total(),
        };

        match (result, self.bodyweight) {
            (Some(result), Some(bodyweight)) => {
                scoring::points(result, bodyweight, self.sex, self.equipment, event)
            }
            _ => Decimal::ZERO,
        }
    }
}
