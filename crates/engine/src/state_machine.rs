//! Per-attempt state for a competition session.
//!
//! Each attempt slot moves from `Pending` to one of `Good`, `NoLift` or
//! `NoAttempt`. Marking a result opens a timed window for the lifter's next
//! attempt; if the window runs out before a weight is declared the next
//! attempt is forfeited. Every operation either applies completely or returns
//! an error and leaves the session untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::MeetConfig;
use crate::error::{EngineError, Result};
use crate::models::{
    AttemptResult, AttemptSlot, AttemptStatus, Entry, EntryId, Lift, SessionKey, SlotKey,
};
use crate::services::{lifting_order, progression};
use crate::timer::{Clock, SystemClock, TimerRegistry};

/// Whether an attempt slot can currently take a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Declarations accepted; `deadline` is set while a window timer runs.
    Open { deadline: Option<DateTime<Utc>> },
    /// The previous attempt has no result yet.
    Blocked { prior: u8 },
    /// The declaration window ran out.
    Expired,
    /// Passed by the operator; needs an explicit reopen.
    Forfeited,
    Resolved(AttemptStatus),
}

pub struct AttemptStateMachine<C: Clock = SystemClock> {
    attempts_per_lift: u8,
    entries: Vec<Entry>,
    index: HashMap<EntryId, usize>,
    timers: TimerRegistry,
    expired: HashSet<SlotKey>,
    clock: C,
}

impl AttemptStateMachine<SystemClock> {
    pub fn new(config: &MeetConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> AttemptStateMachine<C> {
    pub fn with_clock(config: &MeetConfig, clock: C) -> Self {
        Self {
            attempts_per_lift: config.attempts_per_lift,
            entries: Vec::new(),
            index: HashMap::new(),
            timers: TimerRegistry::new(config.timer_seconds),
            expired: HashSet::new(),
            clock,
        }
    }

    pub fn with_entries(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        for entry in entries {
            self.upsert_entry(entry);
        }
        self
    }

    /// Add an entry, or replace the stored copy of one with the same id.
    ///
    /// A replaced entry starts over: its running windows are cancelled and
    /// its expired slots are forgotten, so only the incoming slots count.
    pub fn upsert_entry(&mut self, mut entry: Entry) {
        entry.ensure_slots(self.attempts_per_lift);
        if let Some(&position) = self.index.get(&entry.id) {
            let id = entry.id;
            let cancelled = self.timers.cancel_entry(id);
            self.expired.retain(|key| key.entry_id != id);
            self.entries[position] = entry;
            debug!("Replaced entry {} ({} timers cancelled)", id, cancelled);
            return;
        }
        self.index.insert(entry.id, self.entries.len());
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.index.get(&id).map(|&position| &self.entries[position])
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn attempts_per_lift(&self) -> u8 {
        self.attempts_per_lift
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn is_expired(&self, key: &SlotKey) -> bool {
        self.expired.contains(key)
    }

    pub fn order(&self, session: &SessionKey, lift: Lift, attempt: u8) -> Vec<&Entry> {
        lifting_order::order(&self.entries, session, lift, attempt)
    }

    pub fn current_lifter(&self, session: &SessionKey, lift: Lift, attempt: u8) -> Option<&Entry> {
        lifting_order::current_lifter(&self.entries, session, lift, attempt)
    }

    /// Set the declared weight of an attempt, either a fresh declaration or a
    /// correction of an attempt that already has a result.
    pub fn declare_weight(
        &mut self,
        entry_id: EntryId,
        lift: Lift,
        attempt: u8,
        weight: Decimal,
    ) -> Result<()> {
        let key = SlotKey::new(entry_id, lift, attempt);
        self.apply_declaration(key, weight)
            .inspect_err(|e| warn!("Rejected declaration of {} for {}: {}", weight, key, e))
    }

    fn apply_declaration(&mut self, key: SlotKey, weight: Decimal) -> Result<()> {
        let (position, index) = self.locate(&key)?;
        let lift = key.lift;

        if weight <= Decimal::ZERO {
            return Err(EngineError::InvalidWeight {
                lift,
                attempt: key.attempt,
                weight: Some(weight),
            });
        }

        let slots = self.entries[position].attempts(lift);
        let slot = &slots[index];

        if self.expired.contains(&key) && !slot.status.is_result() {
            return Err(EngineError::TimeExceeded {
                lift,
                attempt: key.attempt,
            });
        }
        if slot.status == AttemptStatus::NoAttempt {
            return Err(EngineError::InvalidTransition {
                lift,
                attempt: key.attempt,
                status: slot.status,
                action: "declare",
            });
        }
        progression::check_open(lift, slots, index)?;

        let correction = slot.status.is_result();
        let mut candidate = slots.to_vec();
        candidate[index].declared_weight = Some(weight);
        progression::validate_from(lift, &candidate, index)?;

        *self.entries[position].attempts_mut(lift) = candidate;

        if correction {
            info!("Corrected {} to {}", key, weight);
        } else {
            debug!("Declared {} for {}", weight, key);
        }
        Ok(())
    }

    /// Record the outcome of a pending attempt.
    pub fn mark_attempt(
        &mut self,
        entry_id: EntryId,
        lift: Lift,
        attempt: u8,
        result: AttemptResult,
    ) -> Result<()> {
        let key = SlotKey::new(entry_id, lift, attempt);
        self.apply_mark(key, result)
            .inspect_err(|e| warn!("Rejected {:?} for {}: {}", result, key, e))
    }

    fn apply_mark(&mut self, key: SlotKey, result: AttemptResult) -> Result<()> {
        let (position, index) = self.locate(&key)?;
        let lift = key.lift;
        let slots = self.entries[position].attempts(lift);
        let slot = &slots[index];

        if !slot.status.is_pending() {
            return Err(EngineError::InvalidTransition {
                lift,
                attempt: key.attempt,
                status: slot.status,
                action: "mark",
            });
        }

        if result != AttemptResult::NoAttempt {
            let weight = slot
                .declared_weight
                .filter(|w| *w > Decimal::ZERO)
                .ok_or(EngineError::InvalidWeight {
                    lift,
                    attempt: key.attempt,
                    weight: slot.declared_weight,
                })?;
            progression::check_open(lift, slots, index)?;
            progression::check_weight(lift, slots, index, weight)?;
        }

        let mut candidate = slots.to_vec();
        candidate[index].status = result.into();
        progression::validate_from(lift, &candidate, index + 1)?;

        let next_pending = candidate
            .get(index + 1)
            .is_some_and(|next| next.status.is_pending());
        *self.entries[position].attempts_mut(lift) = candidate;

        self.timers.cancel(&key);
        self.expired.remove(&key);
        info!("Marked {} as {}", key, AttemptStatus::from(result));

        // Forfeits leave the next attempt for the operator to open.
        let opens_window = result != AttemptResult::NoAttempt
            && key.attempt < self.attempts_per_lift
            && next_pending;
        let next = key.next();
        if opens_window && !self.expired.contains(&next) {
            let timer = self.timers.start(next, self.clock.now());
            debug!("Started timer for {} until {}", next, timer.deadline());
        }

        Ok(())
    }

    /// Turn a forfeited attempt back into an open, undeclared one. Not allowed
    /// once a later attempt of the same lift has a result.
    pub fn reopen_attempt(&mut self, entry_id: EntryId, lift: Lift, attempt: u8) -> Result<()> {
        let key = SlotKey::new(entry_id, lift, attempt);
        self.apply_reopen(key)
            .inspect_err(|e| warn!("Rejected reopen of {}: {}", key, e))
    }

    fn apply_reopen(&mut self, key: SlotKey) -> Result<()> {
        let (position, index) = self.locate(&key)?;
        let lift = key.lift;
        let slots = self.entries[position].attempts_mut(lift);

        if slots[index].status != AttemptStatus::NoAttempt {
            return Err(EngineError::InvalidTransition {
                lift,
                attempt: key.attempt,
                status: slots[index].status,
                action: "reopen",
            });
        }
        if let Some(offset) = slots[index + 1..].iter().position(|s| s.status.is_result()) {
            return Err(EngineError::DownstreamResolved {
                lift,
                attempt: key.attempt,
                later: (index + 1 + offset) as u8 + 1,
            });
        }

        slots[index] = AttemptSlot::default();
        self.expired.remove(&key);
        self.timers.cancel(&key);
        info!("Reopened {}", key);
        Ok(())
    }

    /// Undo a good lift / no lift mark. Not allowed once a later attempt of
    /// the same lift has a result of its own.
    pub fn clear_result(&mut self, entry_id: EntryId, lift: Lift, attempt: u8) -> Result<()> {
        let key = SlotKey::new(entry_id, lift, attempt);
        self.apply_clear(key)
            .inspect_err(|e| warn!("Rejected clearing {}: {}", key, e))
    }

    fn apply_clear(&mut self, key: SlotKey) -> Result<()> {
        let (position, index) = self.locate(&key)?;
        let lift = key.lift;
        let slots = self.entries[position].attempts_mut(lift);

        if !slots[index].status.is_result() {
            return Err(EngineError::InvalidTransition {
                lift,
                attempt: key.attempt,
                status: slots[index].status,
                action: "clear",
            });
        }
        if let Some(offset) = slots[index + 1..].iter().position(|s| s.status.is_result()) {
            return Err(EngineError::DownstreamResolved {
                lift,
                attempt: key.attempt,
                later: (index + 1 + offset) as u8 + 1,
            });
        }

        slots[index].status = AttemptStatus::Pending;

        let next = key.next();
        self.timers.cancel(&next);
        if self.expired.remove(&next) {
            if let Some(slot) = slots.get_mut(index + 1) {
                if slot.status == AttemptStatus::NoAttempt {
                    slot.status = AttemptStatus::Pending;
                }
            }
        }

        info!("Cleared result of {}", key);
        Ok(())
    }

    pub fn availability(&self, entry_id: EntryId, lift: Lift, attempt: u8) -> Result<Availability> {
        let key = SlotKey::new(entry_id, lift, attempt);
        let (position, index) = self.locate(&key)?;
        let slots = self.entries[position].attempts(lift);
        let slot = &slots[index];

        if slot.status.is_result() {
            return Ok(Availability::Resolved(slot.status));
        }
        if self.expired.contains(&key) {
            return Ok(Availability::Expired);
        }
        if slot.status == AttemptStatus::NoAttempt {
            return Ok(Availability::Forfeited);
        }
        if let Err(EngineError::AttemptNotOpen { prior, .. }) =
            progression::check_open(lift, slots, index)
        {
            return Ok(Availability::Blocked { prior });
        }

        Ok(Availability::Open {
            deadline: self.timers.get(&key).map(|timer| timer.deadline()),
        })
    }

    /// Expire every window whose deadline has passed. Slots still without a
    /// declared weight are forfeited; declared ones stay pending but no
    /// longer accept weight changes.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<SlotKey> {
        let expired = self.timers.tick(now);

        for key in &expired {
            let Some(&position) = self.index.get(&key.entry_id) else {
                continue;
            };
            let Some(slot) = self.entries[position]
                .attempts_mut(key.lift)
                .get_mut(key.attempt as usize - 1)
            else {
                continue;
            };
            if !slot.status.is_pending() {
                continue;
            }

            self.expired.insert(*key);
            if slot.declared_weight.is_none() {
                slot.status = AttemptStatus::NoAttempt;
                info!("Time exceeded for {}: no attempt", key);
            } else {
                info!("Time exceeded for {}: declaration locked", key);
            }
        }

        expired
    }

    fn locate(&self, key: &SlotKey) -> Result<(usize, usize)> {
        let position = *self
            .index
            .get(&key.entry_id)
            .ok_or(EngineError::UnknownEntry(key.entry_id))?;

        if key.attempt == 0 || key.attempt > self.attempts_per_lift {
            return Err(EngineError::AttemptOutOfRange {
                lift: key.lift,
                attempt: key.attempt,
                max: self.attempts_per_lift,
            });
        }

        Ok((position, key.attempt as usize - 1))
    }
}
