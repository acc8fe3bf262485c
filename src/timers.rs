//! Virtual-time timer registry.
//!
//! Time only moves when the owner advances it, so every delay in the page
//! (debounce windows, notification dismissal, the simulated submission) is
//! reproducible in tests without sleeping.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer<T> {
    pub id: TimerId,
    pub at_ms: u64,
    pub task: T,
}

#[derive(Debug)]
struct TimerEntry<T> {
    key: (u64, u64),
    interval_ms: Option<u64>,
    task: T,
}

#[derive(Debug)]
pub struct TimerRegistry<T> {
    now_ms: u64,
    next_id: u32,
    next_seq: u64,
    // (due, arming order) -> timer; ties fire in the order they were armed.
    queue: BTreeMap<(u64, u64), TimerId>,
    timers: HashMap<TimerId, TimerEntry<T>>,
}

impl<T: Clone> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerRegistry<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            next_seq: 0,
            queue: BTreeMap::new(),
            timers: HashMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.arm(delay_ms, None, task)
    }

    /// Intervals shorter than 1 ms are clamped to 1 ms.
    pub fn set_interval(&mut self, period_ms: u64, task: T) -> TimerId {
        let period = period_ms.max(1);
        self.arm(period, Some(period), task)
    }

    fn arm(&mut self, delay_ms: u64, interval_ms: Option<u64>, task: T) -> TimerId {
        let timer_id = TimerId(self.next_id);
        self.next_id += 1;
        let key = self.next_key(self.now_ms.saturating_add(delay_ms));
        self.queue.insert(key, timer_id);
        self.timers.insert(
            timer_id,
            TimerEntry {
                key,
                interval_ms,
                task,
            },
        );
        timer_id
    }

    fn next_key(&mut self, due_ms: u64) -> (u64, u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        (due_ms, seq)
    }

    /// Returns whether a live timer was cancelled.
    pub fn clear_timer(&mut self, timer_id: TimerId) -> bool {
        match self.timers.remove(&timer_id) {
            Some(entry) => {
                self.queue.remove(&entry.key);
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.queue.clear();
        self.timers.clear();
    }

    pub fn is_active(&self, timer_id: TimerId) -> bool {
        self.timers.contains_key(&timer_id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pops the earliest timer due at or before `until_ms`, moving the clock
    /// to its due time. Intervals are re-armed before being returned; one
    /// whose next due time would pass `u64::MAX` fires a last time and ends.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTimer<T>> {
        let (&key, &timer_id) = self.queue.iter().next()?;
        if key.0 > until_ms {
            return None;
        }
        self.queue.remove(&key);
        self.now_ms = self.now_ms.max(key.0);

        let rearm_at = self
            .timers
            .get(&timer_id)?
            .interval_ms
            .and_then(|period| key.0.checked_add(period));
        let task = match rearm_at {
            Some(due_ms) => {
                let next = self.next_key(due_ms);
                self.queue.insert(next, timer_id);
                let entry = self.timers.get_mut(&timer_id)?;
                entry.key = next;
                entry.task.clone()
            }
            None => self.timers.remove(&timer_id)?.task,
        };

        Some(FiredTimer {
            id: timer_id,
            at_ms: key.0,
            task,
        })
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_clock_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(registry: &mut TimerRegistry<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(timer) = registry.pop_due(until) {
            fired.push((timer.at_ms, timer.task));
        }
        registry.advance_clock_to(until);
        fired
    }

    #[test]
    fn fires_in_due_then_arming_order() {
        let mut registry = TimerRegistry::new();
        registry.set_timeout(20, "late");
        registry.set_timeout(10, "first");
        registry.set_timeout(10, "second");

        assert_eq!(
            drain(&mut registry, 25),
            vec![(10, "first"), (10, "second"), (20, "late")]
        );
        assert_eq!(registry.now_ms(), 25);
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn cleared_timers_never_fire() {
        let mut registry = TimerRegistry::new();
        let id = registry.set_timeout(10, "cancelled");
        assert!(registry.clear_timer(id));
        assert!(!registry.clear_timer(id));
        assert!(drain(&mut registry, 100).is_empty());
    }

    #[test]
    fn intervals_rearm_until_cleared() {
        let mut registry = TimerRegistry::new();
        let id = registry.set_interval(16, "tick");
        assert_eq!(drain(&mut registry, 50).len(), 3);
        assert!(registry.is_active(id));
        registry.clear_timer(id);
        assert!(drain(&mut registry, 500).is_empty());
    }

    #[test]
    fn timers_armed_after_advancing_use_the_new_clock() {
        let mut registry = TimerRegistry::new();
        drain(&mut registry, 1_000);
        registry.set_timeout(150, "fade");
        assert_eq!(registry.next_due_ms(), Some(1_150));
        assert!(drain(&mut registry, 1_149).is_empty());
        assert_eq!(drain(&mut registry, 1_150), vec![(1_150, "fade")]);
    }

    #[test]
    fn huge_delays_saturate_instead_of_overflowing() {
        let mut registry = TimerRegistry::new();
        drain(&mut registry, 10);
        registry.set_timeout(u64::MAX, "never");
        assert_eq!(registry.next_due_ms(), Some(u64::MAX));
        assert!(drain(&mut registry, 1_000_000).is_empty());

        let id = registry.set_interval(u64::MAX, "tick");
        assert_eq!(
            drain(&mut registry, u64::MAX),
            vec![(u64::MAX, "never"), (u64::MAX, "tick")]
        );
        assert!(!registry.is_active(id));
        assert_eq!(registry.pending(), 0);
    }
}
