use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{AttemptStatus, EntryId, Lift};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid weight for {lift} attempt {attempt}: {}", display_weight(.weight))]
    InvalidWeight {
        lift: Lift,
        attempt: u8,
        weight: Option<Decimal>,
    },

    #[error("{lift} attempt {attempt} is not open: attempt {prior} has no result yet")]
    AttemptNotOpen { lift: Lift, attempt: u8, prior: u8 },

    #[error(
        "{lift} attempt {attempt} at {weight} must be {} attempt {prior} ({prior_status} at {prior_weight})",
        progression_rule(.prior_status)
    )]
    WeightRegression {
        lift: Lift,
        attempt: u8,
        weight: Decimal,
        prior: u8,
        prior_weight: Decimal,
        prior_status: AttemptStatus,
    },

    #[error("Time exceeded for {lift} attempt {attempt}")]
    TimeExceeded { lift: Lift, attempt: u8 },

    #[error("Cannot {action} {lift} attempt {attempt} while it is {status}")]
    InvalidTransition {
        lift: Lift,
        attempt: u8,
        status: AttemptStatus,
        action: &'static str,
    },

    #[error("Cannot change {lift} attempt {attempt}: attempt {later} already has a result")]
    DownstreamResolved { lift: Lift, attempt: u8, later: u8 },

    #[error("{lift} attempt {attempt} is out of range (1-{max})")]
    AttemptOutOfRange { lift: Lift, attempt: u8, max: u8 },

    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),

    #[error("Invalid scoring input: {0}")]
    InvalidScoringInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn is_time_exceeded(&self) -> bool {
        matches!(self, EngineError::TimeExceeded { .. })
    }

    pub fn is_weight_regression(&self) -> bool {
        matches!(self, EngineError::WeightRegression { .. })
    }

    /// True for rejections of a declaration or mark, as opposed to
    /// configuration or lookup failures.
    pub fn is_attempt_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidWeight { .. }
                | EngineError::AttemptNotOpen { .. }
                | EngineError::WeightRegression { .. }
                | EngineError::TimeExceeded { .. }
                | EngineError::InvalidTransition { .. }
                | EngineError::DownstreamResolved { .. }
        )
    }
}

fn display_weight(weight: &Option<Decimal>) -> String {
    match weight {
        Some(w) => w.to_string(),
        None => "none".to_string(),
    }
}

fn progression_rule(prior_status: &AttemptStatus) -> &'static str {
    match prior_status {
        AttemptStatus::Good => "heavier than",
        _ => "at least",
    }
}
