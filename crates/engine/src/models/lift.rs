use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lift {
    Squat,
    Bench,
    Deadlift,
}

impl Lift {
    pub const ALL: [Lift; 3] = [Lift::Squat, Lift::Bench, Lift::Deadlift];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Squat => "Squat",
            Self::Bench => "Bench",
            Self::Deadlift => "Deadlift",
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lift {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sq" | "squat" => Ok(Self::Squat),
            "b" | "bp" | "bench" | "bench press" => Ok(Self::Bench),
            "d" | "dl" | "deadlift" => Ok(Self::Deadlift),
            _ => Err(EngineError::Config(format!(
                "Unknown lift: '{}'. Expected squat, bench or deadlift",
                s
            ))),
        }
    }
}

/// What a score is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    #[serde(rename = "SBD")]
    Total,
    #[serde(rename = "S")]
    Squat,
    #[serde(rename = "B")]
    Bench,
    #[serde(rename = "D")]
    Deadlift,
}

/// The two coefficient families of the GL formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFamily {
    Sbd,
    Bench,
}

impl Event {
    pub fn family(&self) -> EventFamily {
        match self {
            Self::Bench => EventFamily::Bench,
            Self::Total | Self::Squat | Self::Deadlift => EventFamily::Sbd,
        }
    }

    /// The single lift this event scores, or `None` for a full total.
    pub fn lift(&self) -> Option<Lift> {
        match self {
            Self::Total => None,
            Self::Squat => Some(Lift::Squat),
            Self::Bench => Some(Lift::Bench),
            Self::Deadlift => Some(Lift::Deadlift),
        }
    }
}

impl FromStr for Event {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SBD" | "TOTAL" => Ok(Self::Total),
            "S" | "SQUAT" => Ok(Self::Squat),
            "B" | "BENCH" => Ok(Self::Bench),
            "D" | "DEADLIFT" => Ok(Self::Deadlift),
            _ => Err(EngineError::Config(format!("Unknown event: '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_parsing() {
        assert_eq!("squat".parse::<Lift>().unwrap(), Lift::Squat);
        assert_eq!("BP".parse::<Lift>().unwrap(), Lift::Bench);
        assert_eq!(" Deadlift ".parse::<Lift>().unwrap(), Lift::Deadlift);
        assert!("snatch".parse::<Lift>().is_err());
    }

    #[test]
    fn test_event_families() {
        assert_eq!(Event::Total.family(), EventFamily::Sbd);
        assert_eq!(Event::Squat.family(), EventFamily::Sbd);
        assert_eq!(Event::Deadlift.family(), EventFamily::Sbd);
        assert_eq!(Event::Bench.family(), EventFamily::Bench);
        assert_eq!("sbd".parse::<Event>().unwrap(), Event::Total);
    }
}
