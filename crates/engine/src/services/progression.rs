//! Weight rules between consecutive attempts of one lift.
//!
//! After a good lift the next declared weight must be heavier; after a no
//! lift it may be repeated but not lowered. Forfeited attempts are skipped
//! when looking for the attempt a declaration is compared against.

use rust_decimal::Decimal;

use crate::error::{EngineError, Result};
use crate::models::{AttemptSlot, AttemptStatus, Lift};

/// Attempt a declaration at `index` is compared against: the nearest earlier
/// slot that was actually taken. Returns its 0-based index.
pub fn reference_attempt(slots: &[AttemptSlot], index: usize) -> Option<(usize, Decimal, AttemptStatus)> {
    slots[..index.min(slots.len())]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, slot)| slot.result_weight().map(|weight| (i, weight, slot.status)))
}

/// A slot can only be declared once every attempt before it has a status.
/// A pass on an earlier attempt does not open the ones after it while an
/// attempt before the pass is still pending.
pub fn check_open(lift: Lift, slots: &[AttemptSlot], index: usize) -> Result<()> {
    let earlier = &slots[..index.min(slots.len())];
    match earlier.iter().rposition(|slot| slot.status.is_pending()) {
        Some(pending) => Err(EngineError::AttemptNotOpen {
            lift,
            attempt: index as u8 + 1,
            prior: pending as u8 + 1,
        }),
        None => Ok(()),
    }
}

pub fn check_weight(lift: Lift, slots: &[AttemptSlot], index: usize, weight: Decimal) -> Result<()> {
    let Some((prior, prior_weight, prior_status)) = reference_attempt(slots, index) else {
        return Ok(());
    };

    let allowed = match prior_status {
        AttemptStatus::Good => weight > prior_weight,
        _ => weight >= prior_weight,
    };

    if allowed {
        Ok(())
    } else {
        Err(EngineError::WeightRegression {
            lift,
            attempt: index as u8 + 1,
            weight,
            prior: prior as u8 + 1,
            prior_weight,
            prior_status,
        })
    }
}

/// Re-check every declared, not forfeited slot from `from` onward.
pub fn validate_from(lift: Lift, slots: &[AttemptSlot], from: usize) -> Result<()> {
    for (index, slot) in slots.iter().enumerate().skip(from) {
        if slot.status == AttemptStatus::NoAttempt {
            continue;
        }
        if let Some(weight) = slot.declared_weight {
            check_weight(lift, slots, index, weight)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    fn kg(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_good_requires_heavier() {
        let slots = vec![
            AttemptSlot::with_status(kg("100"), AttemptStatus::Good),
            AttemptSlot::default(),
        ];
        assert_matches!(
            check_weight(Lift::Squat, &slots, 1, kg("100")),
            Err(EngineError::WeightRegression { prior: 1, .. })
        );
        assert!(check_weight(Lift::Squat, &slots, 1, kg("102.5")).is_ok());
    }

    #[test]
    fn test_no_lift_allows_repeat() {
        let slots = vec![
            AttemptSlot::with_status(kg("100"), AttemptStatus::NoLift),
            AttemptSlot::default(),
        ];
        assert!(check_weight(Lift::Bench, &slots, 1, kg("100")).is_ok());
        assert_matches!(
            check_weight(Lift::Bench, &slots, 1, kg("95")),
            Err(EngineError::WeightRegression { prior_status: AttemptStatus::NoLift, .. })
        );
    }

    #[test]
    fn test_forfeited_attempt_is_skipped() {
        let slots = vec![
            AttemptSlot::with_status(kg("100"), AttemptStatus::Good),
            AttemptSlot::with_status(kg("110"), AttemptStatus::NoAttempt),
            AttemptSlot::default(),
        ];
        assert_eq!(
            reference_attempt(&slots, 2),
            Some((0, kg("100"), AttemptStatus::Good))
        );
        assert!(check_weight(Lift::Deadlift, &slots, 2, kg("105")).is_ok());
        assert!(check_weight(Lift::Deadlift, &slots, 2, kg("100")).is_err());
    }

    #[test]
    fn test_check_open() {
        let mut slots = vec![AttemptSlot::declared(kg("100")), AttemptSlot::default()];
        assert!(check_open(Lift::Squat, &slots, 0).is_ok());
        assert_matches!(
            check_open(Lift::Squat, &slots, 1),
            Err(EngineError::AttemptNotOpen { attempt: 2, prior: 1, .. })
        );

        slots[0].status = AttemptStatus::NoAttempt;
        assert!(check_open(Lift::Squat, &slots, 1).is_ok());
    }

    #[test]
    fn test_check_open_looks_past_a_pass() {
        let slots = vec![
            AttemptSlot::declared(kg("100")),
            AttemptSlot {
                declared_weight: None,
                status: AttemptStatus::NoAttempt,
            },
            AttemptSlot::default(),
        ];
        assert_matches!(
            check_open(Lift::Bench, &slots, 2),
            Err(EngineError::AttemptNotOpen { attempt: 3, prior: 1, .. })
        );
        assert_matches!(
            check_open(Lift::Bench, &slots, 1),
            Err(EngineError::AttemptNotOpen { attempt: 2, prior: 1, .. })
        );
    }

    #[test]
    fn test_validate_from_finds_downstream_conflict() {
        let slots = vec![
            AttemptSlot::with_status(kg("105"), AttemptStatus::Good),
            AttemptSlot::with_status(kg("105"), AttemptStatus::NoLift),
            AttemptSlot::default(),
        ];
        assert_matches!(
            validate_from(Lift::Squat, &slots, 1),
            Err(EngineError::WeightRegression { attempt: 2, prior: 1, .. })
        );
        assert!(validate_from(Lift::Squat, &slots, 2).is_ok());
    }
}
