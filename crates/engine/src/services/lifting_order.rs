//! Calling order for a round.
//!
//! Lighter declared weights lift first. Entries without a declared weight go
//! last. The sort is stable, so entries at the same weight keep the order they
//! were given in, which is expected to already reflect lot numbers.

use std::cmp::Ordering;

use crate::models::{AttemptStatus, Entry, Lift, SessionKey};

/// Entries of `session` in the order they are called for `lift` attempt
/// `attempt` (1-based).
pub fn order<'a, I>(entries: I, session: &SessionKey, lift: Lift, attempt: u8) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut ordered: Vec<&Entry> = entries
        .into_iter()
        .filter(|entry| &entry.session == session)
        .collect();

    ordered.sort_by(|a, b| {
        let a = declared(a, lift, attempt);
        let b = declared(b, lift, attempt);
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });

    ordered
}

/// First entry in calling order whose attempt is still waiting to be lifted.
pub fn current_lifter<'a, I>(
    entries: I,
    session: &SessionKey,
    lift: Lift,
    attempt: u8,
) -> Option<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    order(entries, session, lift, attempt)
        .into_iter()
        .find(|entry| {
            entry
                .slot(lift, attempt)
                .is_some_and(|slot| slot.status == AttemptStatus::Pending && slot.declared_weight.is_some())
        })
}

fn declared(entry: &Entry, lift: Lift, attempt: u8) -> Option<rust_decimal::Decimal> {
    entry.slot(lift, attempt).and_then(|slot| slot.declared_weight)
}
