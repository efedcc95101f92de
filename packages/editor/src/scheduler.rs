//! # Persistence Scheduler
//!
//! Decides *when* the live component sequence should be written. One
//! scheduler covers every save path so at most one write is ever pending.
//!
//! ## Urgency
//!
//! - `Immediate`: due now
//! - `Debounced`: due once edits have been quiet for the debounce delay;
//!   every new edit re-arms it
//! - `Periodic`: no debounce; due at the latest when the session has been
//!   dirty for the autosave interval
//!
//! The periodic cap applies to every dirty session, so continuous typing
//! still gets persisted.
//!
//! ## State machine
//!
//! ```text
//! Idle ──edit──▶ Dirty ──due──▶ Saving ──ok──▶ Idle (or Dirty if edited meanwhile)
//!                                  │
//!                                 fail
//!                                  ▼
//!                            RetryPending ──retry due──▶ Saving
//!                                  │
//!                      retries exhausted
//!                                  ▼
//!                              Disabled  (left only by a successful manual save)
//! ```

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveUrgency {
    Immediate,
    Debounced,
    Periodic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Dirty,
    Saving,
    RetryPending,
    Disabled,
}

/// Bookkeeping visible to the UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveAttempt {
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub dirty: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTimings {
    pub debounce: Duration,
    pub autosave_interval: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2_000),
            autosave_interval: Duration::from_millis(30_000),
            retry_delay: Duration::from_millis(5_000),
            max_retries: 3,
        }
    }
}

/// What happened after a failed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    RetryScheduled { retry_count: u32, at: Instant },
    Disabled,
}

#[derive(Debug, Clone)]
pub struct PersistenceScheduler {
    timings: SchedulerTimings,
    state: AutosaveState,
    attempt: SaveAttempt,
    dirty_since: Option<Instant>,
    last_edit: Option<Instant>,
    immediate_at: Option<Instant>,
    retry_at: Option<Instant>,
    edited_while_saving: bool,
    /// Set when retries ran out; survives failed manual saves
    disabled: bool,
}

impl PersistenceScheduler {
    pub fn new(timings: SchedulerTimings) -> Self {
        Self {
            timings,
            state: AutosaveState::Idle,
            attempt: SaveAttempt::default(),
            dirty_since: None,
            last_edit: None,
            immediate_at: None,
            retry_at: None,
            edited_while_saving: false,
            disabled: false,
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn attempt(&self) -> &SaveAttempt {
        &self.attempt
    }

    pub fn timings(&self) -> &SchedulerTimings {
        &self.timings
    }

    pub fn is_dirty(&self) -> bool {
        self.attempt.dirty
    }

    /// Forget everything (session reload)
    pub fn reset(&mut self) {
        *self = Self::new(self.timings);
    }

    /// Record a local mutation
    pub fn mark_dirty(&mut self, urgency: SaveUrgency, now: Instant) {
        self.attempt.dirty = true;
        self.dirty_since.get_or_insert(now);

        match urgency {
            SaveUrgency::Immediate => self.immediate_at = Some(now),
            SaveUrgency::Debounced => self.last_edit = Some(now),
            SaveUrgency::Periodic => {}
        }

        match self.state {
            AutosaveState::Idle => self.state = AutosaveState::Dirty,
            AutosaveState::Saving => self.edited_while_saving = true,
            AutosaveState::Dirty | AutosaveState::RetryPending | AutosaveState::Disabled => {}
        }
    }

    /// When the next automatic write is due, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            AutosaveState::Dirty => {
                let periodic = self
                    .dirty_since
                    .map(|since| since + self.timings.autosave_interval);
                let debounced = self.last_edit.map(|at| at + self.timings.debounce);

                [self.immediate_at, debounced, periodic]
                    .into_iter()
                    .flatten()
                    .min()
            }
            AutosaveState::RetryPending => self.retry_at,
            AutosaveState::Idle | AutosaveState::Saving | AutosaveState::Disabled => None,
        }
    }

    /// Move to `Saving` if a write is due at `now`
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) if deadline <= now => {
                self.begin_save();
                true
            }
            _ => false,
        }
    }

    /// Start a user-requested save
    ///
    /// A disabled scheduler is only re-armed once this save succeeds.
    pub fn begin_manual(&mut self) {
        self.attempt.retry_count = 0;
        self.begin_save();
    }

    fn begin_save(&mut self) {
        self.state = AutosaveState::Saving;
        self.immediate_at = None;
        self.retry_at = None;
        self.edited_while_saving = false;
    }

    /// The write started by `take_due`/`begin_manual` succeeded
    pub fn record_success(&mut self, saved_at: DateTime<Utc>, now: Instant) {
        self.attempt.retry_count = 0;
        self.attempt.last_error = None;
        self.attempt.last_saved_at = Some(saved_at);
        self.disabled = false;

        if self.edited_while_saving {
            self.edited_while_saving = false;
            self.state = AutosaveState::Dirty;
            self.dirty_since = Some(now);
        } else {
            self.state = AutosaveState::Idle;
            self.clear_dirty();
        }
    }

    /// The write started by `take_due`/`begin_manual` failed
    pub fn record_failure(&mut self, error: impl Into<String>, now: Instant) -> FailureOutcome {
        self.attempt.retry_count += 1;
        self.attempt.last_error = Some(error.into());
        self.attempt.dirty = true;
        self.edited_while_saving = false;

        if self.disabled || self.attempt.retry_count >= self.timings.max_retries {
            self.disabled = true;
            self.state = AutosaveState::Disabled;
            self.retry_at = None;
            FailureOutcome::Disabled
        } else {
            let at = now + self.timings.retry_delay;
            self.state = AutosaveState::RetryPending;
            self.retry_at = Some(at);
            FailureOutcome::RetryScheduled {
                retry_count: self.attempt.retry_count,
                at,
            }
        }
    }

    /// The full sequence was written outside the scheduler (explicit
    /// operations). A disabled scheduler stays disabled.
    pub fn mark_persisted(&mut self, saved_at: DateTime<Utc>) {
        self.attempt.retry_count = 0;
        self.attempt.last_error = None;
        self.attempt.last_saved_at = Some(saved_at);
        self.clear_dirty();

        if !self.disabled {
            self.state = AutosaveState::Idle;
            self.retry_at = None;
        }
    }

    fn clear_dirty(&mut self) {
        self.attempt.dirty = false;
        self.dirty_since = None;
        self.last_edit = None;
        self.immediate_at = None;
    }
}

impl Default for PersistenceScheduler {
    fn default() -> Self {
        Self::new(SchedulerTimings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_has_no_deadline() {
        let scheduler = PersistenceScheduler::default();
        assert_eq!(scheduler.state(), AutosaveState::Idle);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_debounce_rearms_on_every_edit() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        scheduler.mark_dirty(SaveUrgency::Debounced, t0);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(2_000)));

        scheduler.mark_dirty(SaveUrgency::Debounced, t0 + ms(1_500));
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(3_500)));

        assert!(!scheduler.take_due(t0 + ms(3_000)));
        assert!(scheduler.take_due(t0 + ms(3_500)));
        assert_eq!(scheduler.state(), AutosaveState::Saving);
    }

    #[test]
    fn test_periodic_cap_bounds_continuous_editing() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        // An edit every second for 40 seconds never lets the debounce expire
        for s in 0..40 {
            scheduler.mark_dirty(SaveUrgency::Debounced, t0 + ms(s * 1_000));
        }
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(30_000)));
    }

    #[test]
    fn test_periodic_urgency_waits_for_interval() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        scheduler.mark_dirty(SaveUrgency::Periodic, t0);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(30_000)));
    }

    #[test]
    fn test_immediate_is_due_now() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        scheduler.mark_dirty(SaveUrgency::Immediate, t0);
        assert!(scheduler.take_due(t0));
    }

    #[test]
    fn test_success_returns_to_idle() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        scheduler.mark_dirty(SaveUrgency::Debounced, t0);
        assert!(scheduler.take_due(t0 + ms(2_000)));
        scheduler.record_success(Utc::now(), t0 + ms(2_100));

        assert_eq!(scheduler.state(), AutosaveState::Idle);
        assert!(!scheduler.is_dirty());
        assert!(scheduler.attempt().last_saved_at.is_some());
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();

        scheduler.mark_dirty(SaveUrgency::Debounced, t0);
        assert!(scheduler.take_due(t0 + ms(2_000)));
        scheduler.mark_dirty(SaveUrgency::Debounced, t0 + ms(2_050));
        scheduler.record_success(Utc::now(), t0 + ms(2_100));

        assert_eq!(scheduler.state(), AutosaveState::Dirty);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(4_050)));
    }

    #[test]
    fn test_retries_then_disables() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::default();
        scheduler.mark_dirty(SaveUrgency::Debounced, t0);

        assert!(scheduler.take_due(t0 + ms(2_000)));
        let outcome = scheduler.record_failure("offline", t0 + ms(2_000));
        assert_eq!(
            outcome,
            FailureOutcome::RetryScheduled {
                retry_count: 1,
                at: t0 + ms(7_000),
            }
        );
        assert_eq!(scheduler.state(), AutosaveState::RetryPending);

        assert!(!scheduler.take_due(t0 + ms(6_999)));
        assert!(scheduler.take_due(t0 + ms(7_000)));
        scheduler.record_failure("offline", t0 + ms(7_000));

        assert!(scheduler.take_due(t0 + ms(12_000)));
        let outcome = scheduler.record_failure("offline", t0 + ms(12_000));
        assert_eq!(outcome, FailureOutcome::Disabled);
        assert_eq!(scheduler.state(), AutosaveState::Disabled);
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(scheduler.attempt().retry_count, 3);
        assert_eq!(scheduler.attempt().last_error.as_deref(), Some("offline"));

        // Further edits do not re-arm it
        scheduler.mark_dirty(SaveUrgency::Immediate, t0 + ms(20_000));
        assert!(!scheduler.take_due(t0 + ms(60_000)));
    }

    #[test]
    fn test_manual_save_clears_disabled() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::new(SchedulerTimings {
            max_retries: 1,
            ..SchedulerTimings::default()
        });
        scheduler.mark_dirty(SaveUrgency::Immediate, t0);
        assert!(scheduler.take_due(t0));
        assert_eq!(
            scheduler.record_failure("offline", t0),
            FailureOutcome::Disabled
        );

        scheduler.begin_manual();
        assert_eq!(scheduler.attempt().retry_count, 0);
        scheduler.record_success(Utc::now(), t0 + ms(10));
        assert_eq!(scheduler.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_failed_manual_save_stays_disabled() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::new(SchedulerTimings {
            max_retries: 1,
            ..SchedulerTimings::default()
        });
        scheduler.mark_dirty(SaveUrgency::Immediate, t0);
        assert!(scheduler.take_due(t0));
        scheduler.record_failure("offline", t0);

        scheduler.begin_manual();
        assert_eq!(
            scheduler.record_failure("still offline", t0 + ms(10)),
            FailureOutcome::Disabled
        );
        assert_eq!(scheduler.state(), AutosaveState::Disabled);
        assert_eq!(scheduler.next_deadline(), None);
        assert!(!scheduler.take_due(t0 + ms(60_000)));

        scheduler.begin_manual();
        scheduler.record_success(Utc::now(), t0 + ms(70_000));
        assert_eq!(scheduler.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_mark_persisted_keeps_disabled() {
        let t0 = Instant::now();
        let mut scheduler = PersistenceScheduler::new(SchedulerTimings {
            max_retries: 1,
            ..SchedulerTimings::default()
        });
        scheduler.mark_dirty(SaveUrgency::Immediate, t0);
        scheduler.take_due(t0);
        scheduler.record_failure("offline", t0);

        scheduler.mark_persisted(Utc::now());
        assert_eq!(scheduler.state(), AutosaveState::Disabled);
        assert!(!scheduler.is_dirty());
        assert_eq!(scheduler.attempt().retry_count, 0);
    }
}
