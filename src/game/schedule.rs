//! Virtual-time timers
//!
//! Every delayed or periodic action of a session (spawn cadence, per-shape
//! overlap polls, the delayed restart button) is a timer on the session clock.
//! Timers fire from [`Schedule::pop_due`] one at a time, so a handler that
//! cancels other timers takes effect before they can fire.

use tracing::trace;

use crate::game::body::BodyId;

pub type TimerId = u64;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Spawn,
    OverlapPoll(BodyId),
    ShowRestartButton,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Session time of the next firing
    pub due: f64,
    /// Period for repeating timers
    pub interval: Option<f64>,
}

#[derive(Debug, Default)]
pub struct Schedule {
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: TimerKind, due: f64, interval: Option<f64>) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer {
            id,
            kind,
            due,
            interval,
        });
        id
    }

    /// Fire once at `now + delay`
    pub fn schedule_once(&mut self, kind: TimerKind, now: f64, delay: f64) -> TimerId {
        self.insert(kind, now + delay.max(0.0), None)
    }

    /// Fire at `now + delay`, then every `interval`
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        now: f64,
        delay: f64,
        interval: f64,
    ) -> TimerId {
        // A zero period would fire forever within one advance
        let interval = interval.max(f64::EPSILON);
        self.insert(kind, now + delay.max(0.0), Some(interval))
    }

    /// Returns whether the timer was pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer whose kind matches; returns how many were removed
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&TimerKind) -> bool,
    {
        let before = self.timers.len();
        self.timers.retain(|t| !pred(&t.kind));
        before - self.timers.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            trace!("Cancelled {} timers", self.timers.len());
        }
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Pending timers of the given kind
    #[cfg(test)]
    pub fn count_kind(&self, kind: TimerKind) -> usize {
        self.timers.iter().filter(|t| t.kind == kind).count()
    }

    /// Pop the earliest timer due at or before `now`.
    ///
    /// Ties break on creation order. A repeating timer is rescheduled one
    /// period later and may be returned again by the next call.
    pub fn pop_due(&mut self, now: f64) -> Option<Timer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let fired = self.timers[index];
        match fired.interval {
            Some(interval) => self.timers[index].due += interval,
            None => {
                self.timers.swap_remove(index);
            }
        }
        Some(fired)
    }

    /// Every firing due at or before `now`, in due order
    #[cfg(test)]
    pub fn advance(&mut self, now: f64) -> Vec<Timer> {
        std::iter::from_fn(|| self.pop_due(now)).collect()
    }
}
