//! Cycle scheduling.
//!
//! Two independent deadlines feed one reconciliation cycle: the mutation
//! debounce, reset by every tree mutation, and the short submit delay armed
//! when the user sends a prompt. Each is supersede-and-replace; when either
//! comes due a single cycle runs.

use std::time::Duration;

use tokio::time::Instant;
use turnmark_settings::SchedulerSettings;

/// Debounce and submit deadlines for reconciliation cycles.
#[derive(Debug)]
pub struct CycleScheduler {
    debounce: Duration,
    submit_delay: Duration,
    debounce_deadline: Option<Instant>,
    submit_deadline: Option<Instant>,
}

impl CycleScheduler {
    /// Build from settings.
    pub fn new(settings: &SchedulerSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.mutation_debounce_ms),
            submit_delay: Duration::from_millis(settings.submit_delay_ms),
            debounce_deadline: None,
            submit_deadline: None,
        }
    }

    /// A tree mutation happened: restart the debounce.
    pub fn notify_mutation(&mut self, now: Instant) {
        self.debounce_deadline = Some(now + self.debounce);
    }

    /// The user submitted a prompt: arm the short delay.
    pub fn schedule_submit(&mut self, now: Instant) {
        self.submit_deadline = Some(now + self.submit_delay);
    }

    /// Consume due deadlines. Returns whether a cycle should run.
    pub fn due(&mut self, now: Instant) -> bool {
        let mut fire = false;
        for deadline in [&mut self.debounce_deadline, &mut self.submit_deadline] {
            if deadline.is_some_and(|at| at <= now) {
                *deadline = None;
                fire = true;
            }
        }
        fire
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.submit_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.next_deadline().is_none()
    }

    /// Drop every pending deadline.
    pub fn cancel_all(&mut self) {
        self.debounce_deadline = None;
        self.submit_deadline = None;
    }
}
