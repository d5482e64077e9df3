//! Work unit state tracking
//!
//! Tracks the precompute rows and per-team tasks of a run.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;

// ─────────────────────────────────────────────────────────────────
// Unit State
// ─────────────────────────────────────────────────────────────────

/// Kind of work a unit performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// One row of the pairwise compatibility matrix
    Precompute,
    /// Formation of a single team
    Formation,
}

/// State of a unit of work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitState {
    /// Submitted, not yet started
    #[default]
    Queued,
    /// Currently executing on a worker
    Running,
    /// Finished successfully
    Completed,
    /// Failed or panicked
    Failed,
    /// Missed its deadline and was discarded
    TimedOut,
    /// Stopped by cancellation
    Cancelled,
}

impl UnitState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UnitState::Queued | UnitState::Running)
    }
}

#[derive(Debug)]
struct TrackedUnit {
    kind: UnitKind,
    state: UnitState,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl TrackedUnit {
    fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            state: UnitState::Queued,
            started_at: None,
            finished_at: None,
        }
    }

    fn finish(&mut self, state: UnitState) {
        self.state = state;
        self.finished_at = Some(Instant::now());
    }

    fn execution_time_ms(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).as_millis() as u64,
            (Some(start), None) => start.elapsed().as_millis() as u64,
            _ => 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Unit Tracker
// ─────────────────────────────────────────────────────────────────

/// Counts of units per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitSummary {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub cancelled: usize,
}

/// Shared registry of unit states for one phase of a run
#[derive(Debug, Default)]
pub struct UnitTracker {
    units: RwLock<HashMap<String, TrackedUnit>>,
}

impl UnitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit as queued
    pub fn add(&self, unit: &str, kind: UnitKind) {
        self.units.write().insert(unit.to_string(), TrackedUnit::new(kind));
    }

    pub fn mark_running(&self, unit: &str) {
        if let Some(u) = self.units.write().get_mut(unit) {
            u.state = UnitState::Running;
            u.started_at = Some(Instant::now());
        }
    }

    pub fn mark_completed(&self, unit: &str) {
        self.finish(unit, UnitState::Completed);
    }

    pub fn mark_failed(&self, unit: &str) {
        self.finish(unit, UnitState::Failed);
    }

    pub fn mark_timed_out(&self, unit: &str) {
        self.finish(unit, UnitState::TimedOut);
    }

    pub fn mark_cancelled(&self, unit: &str) {
        self.finish(unit, UnitState::Cancelled);
    }

    fn finish(&self, unit: &str, state: UnitState) {
        if let Some(u) = self.units.write().get_mut(unit) {
            u.finish(state);
        }
    }

    /// Mark every unit that has not finished as cancelled
    pub fn cancel_pending(&self) {
        for u in self.units.write().values_mut() {
            if !u.state.is_terminal() {
                u.finish(UnitState::Cancelled);
            }
        }
    }

    pub fn state(&self, unit: &str) -> Option<UnitState> {
        self.units.read().get(unit).map(|u| u.state)
    }

    /// Time spent executing, in milliseconds
    pub fn execution_time_ms(&self, unit: &str) -> u64 {
        self.units.read().get(unit).map_or(0, TrackedUnit::execution_time_ms)
    }

    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }

    /// Per-state counts, optionally restricted to one kind of unit
    pub fn summary(&self, kind: Option<UnitKind>) -> UnitSummary {
        let mut summary = UnitSummary::default();
        for u in self.units.read().values() {
            if kind.is_some_and(|k| k != u.kind) {
                continue;
            }
            match u.state {
                UnitState::Queued => summary.queued += 1,
                UnitState::Running => summary.running += 1,
                UnitState::Completed => summary.completed += 1,
                UnitState::Failed => summary.failed += 1,
                UnitState::TimedOut => summary.timed_out += 1,
                UnitState::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_lifecycle() {
        let tracker = UnitTracker::new();
        tracker.add("TEAM-001", UnitKind::Formation);
        assert_eq!(tracker.state("TEAM-001"), Some(UnitState::Queued));

        tracker.mark_running("TEAM-001");
        assert_eq!(tracker.state("TEAM-001"), Some(UnitState::Running));

        tracker.mark_completed("TEAM-001");
        assert_eq!(tracker.state("TEAM-001"), Some(UnitState::Completed));
        assert!(tracker.state("TEAM-001").unwrap().is_terminal());
    }

    #[test]
    fn test_failed_and_cancelled_are_terminal() {
        let tracker = UnitTracker::new();
        tracker.add("row-0", UnitKind::Precompute);
        tracker.add("TEAM-002", UnitKind::Formation);
        tracker.mark_running("row-0");
        tracker.mark_failed("row-0");
        tracker.mark_cancelled("TEAM-002");
        tracker.cancel_pending();

        assert_eq!(tracker.state("row-0"), Some(UnitState::Failed));
        assert_eq!(tracker.state("TEAM-002"), Some(UnitState::Cancelled));
        assert_eq!(tracker.summary(None).failed, 1);
    }

    #[test]
    fn test_unknown_unit_is_ignored() {
        let tracker = UnitTracker::new();
        tracker.mark_running("missing");
        assert_eq!(tracker.state("missing"), None);
        assert_eq!(tracker.execution_time_ms("missing"), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_summary_and_cancel_pending() {
        let tracker = UnitTracker::new();
        tracker.add("row-0", UnitKind::Precompute);
        tracker.add("TEAM-001", UnitKind::Formation);
        tracker.add("TEAM-002", UnitKind::Formation);
        tracker.add("TEAM-003", UnitKind::Formation);

        tracker.mark_completed("row-0");
        tracker.mark_running("TEAM-001");
        tracker.mark_timed_out("TEAM-002");
        tracker.cancel_pending();

        let teams = tracker.summary(Some(UnitKind::Formation));
        assert_eq!(teams.timed_out, 1);
        assert_eq!(teams.cancelled, 2);
        assert_eq!(teams.completed, 0);

        let all = tracker.summary(None);
        assert_eq!(all.completed, 1);
        assert_eq!(tracker.len(), 4);
    }
}
