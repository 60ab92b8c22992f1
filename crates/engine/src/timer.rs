//! Countdown windows for declaring the next attempt.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{EntryId, SlotKey};

pub const DEFAULT_TIMER_SECONDS: u32 = 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptTimer {
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
}

impl AttemptTimer {
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + TimeDelta::seconds(self.duration_seconds as i64)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.deadline() - now).max(TimeDelta::zero())
    }
}

/// Active timers, at most one per slot. A timer is dropped as soon as it is
/// cancelled or reported expired.
#[derive(Debug, Clone)]
pub struct TimerRegistry {
    duration_seconds: u32,
    timers: HashMap<SlotKey, AttemptTimer>,
}

impl TimerRegistry {
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            timers: HashMap::new(),
        }
    }

    /// Start the window for `key`, replacing any timer already running for it.
    pub fn start(&mut self, key: SlotKey, now: DateTime<Utc>) -> AttemptTimer {
        let timer = AttemptTimer {
            started_at: now,
            duration_seconds: self.duration_seconds,
        };
        if self.timers.insert(key, timer).is_some() {
            tracing::debug!("Replaced running timer for {}", key);
        }
        timer
    }

    pub fn cancel(&mut self, key: &SlotKey) -> Option<AttemptTimer> {
        self.timers.remove(key)
    }

    /// Drop every running timer that belongs to one entry. Returns how many
    /// were cancelled.
    pub fn cancel_entry(&mut self, entry_id: EntryId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|key, _| key.entry_id != entry_id);
        before - self.timers.len()
    }

    pub fn get(&self, key: &SlotKey) -> Option<&AttemptTimer> {
        self.timers.get(key)
    }

    pub fn is_active(&self, key: &SlotKey) -> bool {
        self.timers.contains_key(key)
    }

    pub fn remaining(&self, key: &SlotKey, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.timers.get(key).map(|timer| timer.remaining(now))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest deadline first.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<SlotKey> {
        let mut expired: Vec<(DateTime<Utc>, SlotKey)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.is_expired(now))
            .map(|(key, timer)| (timer.deadline(), *key))
            .collect();
        expired.sort();

        for (_, key) in &expired {
            self.timers.remove(key);
        }

        expired.into_iter().map(|(_, key)| key).collect()
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lift;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_expires_after_duration() {
        let mut registry = TimerRegistry::default();
        let key = SlotKey::new(Uuid::new_v4(), Lift::Squat, 2);
        registry.start(key, t0());

        assert!(registry.tick(t0() + TimeDelta::seconds(59)).is_empty());
        assert_eq!(registry.remaining(&key, t0() + TimeDelta::seconds(59)), Some(TimeDelta::seconds(1)));
        assert_eq!(registry.tick(t0() + TimeDelta::seconds(60)), vec![key]);
        assert!(!registry.is_active(&key));
        assert!(registry.tick(t0() + TimeDelta::seconds(61)).is_empty());
    }

    #[test]
    fn test_restart_replaces_stale_timer() {
        let mut registry = TimerRegistry::new(30);
        let key = SlotKey::new(Uuid::new_v4(), Lift::Bench, 3);
        registry.start(key, t0());
        registry.start(key, t0() + TimeDelta::seconds(20));

        assert_eq!(registry.len(), 1);
        assert!(registry.tick(t0() + TimeDelta::seconds(30)).is_empty());
        assert_eq!(registry.tick(t0() + TimeDelta::seconds(50)), vec![key]);
    }

    #[test]
    fn test_cancel_prevents_expiry() {
        let mut registry = TimerRegistry::default();
        let key = SlotKey::new(Uuid::new_v4(), Lift::Deadlift, 2);
        registry.start(key, t0());
        assert!(registry.cancel(&key).is_some());
        assert!(registry.tick(t0() + TimeDelta::minutes(5)).is_empty());
    }

    #[test]
    fn test_cancel_entry_leaves_other_lifters_running() {
        let mut registry = TimerRegistry::default();
        let (lena, mia) = (Uuid::new_v4(), Uuid::new_v4());
        registry.start(SlotKey::new(lena, Lift::Squat, 2), t0());
        registry.start(SlotKey::new(lena, Lift::Bench, 3), t0());
        let other = SlotKey::new(mia, Lift::Squat, 2);
        registry.start(other, t0());

        assert_eq!(registry.cancel_entry(lena), 2);
        assert_eq!(registry.cancel_entry(lena), 0);
        assert_eq!(registry.tick(t0() + TimeDelta::minutes(5)), vec![other]);
    }

    #[test]
    fn test_independent_timers_expire_in_deadline_order() {
        let mut registry = TimerRegistry::default();
        let late = SlotKey::new(Uuid::new_v4(), Lift::Squat, 2);
        let early = SlotKey::new(Uuid::new_v4(), Lift::Squat, 2);
        let running = SlotKey::new(Uuid::new_v4(), Lift::Bench, 2);
        registry.start(late, t0() + TimeDelta::seconds(10));
        registry.start(early, t0());
        registry.start(running, t0() + TimeDelta::seconds(40));

        let expired = registry.tick(t0() + TimeDelta::seconds(75));
        assert_eq!(expired, vec![early, late]);
        assert!(registry.is_active(&running));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(t0());
        let handle = clock.clone();
        handle.advance(TimeDelta::seconds(5));
        assert_eq!(clock.now(), t0() + TimeDelta::seconds(5));
    }
}
