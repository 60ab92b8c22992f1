use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EntryId, Lift};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttemptStatus {
    #[default]
    Pending,
    Good,
    NoLift,
    NoAttempt,
}

impl AttemptStatus {
    /// Good or NoLift: the bar was actually attempted.
    pub fn is_result(&self) -> bool {
        matches!(self, Self::Good | Self::NoLift)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Good => "good lift",
            Self::NoLift => "no lift",
            Self::NoAttempt => "no attempt",
        };
        write!(f, "{}", label)
    }
}

/// An outcome the operator can record. There is no way to mark a slot back to
/// `Pending`; use `clear_result` or `reopen_attempt` for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptResult {
    Good,
    NoLift,
    NoAttempt,
}

impl From<AttemptResult> for AttemptStatus {
    fn from(result: AttemptResult) -> Self {
        match result {
            AttemptResult::Good => AttemptStatus::Good,
            AttemptResult::NoLift => AttemptStatus::NoLift,
            AttemptResult::NoAttempt => AttemptStatus::NoAttempt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptSlot {
    pub declared_weight: Option<Decimal>,
    #[serde(default)]
    pub status: AttemptStatus,
}

impl AttemptSlot {
    pub fn declared(weight: Decimal) -> Self {
        Self {
            declared_weight: Some(weight),
            status: AttemptStatus::Pending,
        }
    }

    pub fn with_status(weight: Decimal, status: AttemptStatus) -> Self {
        Self {
            declared_weight: Some(weight),
            status,
        }
    }

    /// Weight that counts towards progression: only attempts that were
    /// actually taken.
    pub fn result_weight(&self) -> Option<Decimal> {
        if self.status.is_result() {
            self.declared_weight
        } else {
            None
        }
    }

    pub fn good_weight(&self) -> Option<Decimal> {
        match self.status {
            AttemptStatus::Good => self.declared_weight,
            _ => None,
        }
    }
}

/// Identifies one attempt slot; `attempt` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub entry_id: EntryId,
    pub lift: Lift,
    pub attempt: u8,
}

impl SlotKey {
    pub fn new(entry_id: EntryId, lift: Lift, attempt: u8) -> Self {
        Self {
            entry_id,
            lift,
            attempt,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..*self
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} #{}", self.entry_id, self.lift, self.attempt)
    }
}
