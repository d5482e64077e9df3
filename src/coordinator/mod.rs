//! Concurrency coordinator
//!
//! Runs a formation in two phases on the [`WorkerPool`]:
//! - Phase 1 scores every unordered pair. Participant `i` against every
//!   `j > i` is one unit; units write into a concurrent map and are awaited
//!   with a per-unit timeout. Any unit failure fails the run.
//! - Phase 2 spawns one task per team against a single lock-guarded pool and
//!   the frozen compatibility map. A task that misses its deadline is
//!   discarded and its members go back to unassigned. A panic fails the run
//!   and dissolves every team formed so far.

mod pool;
mod tracker;

pub use pool::WorkerPool;
pub use tracker::{UnitKind, UnitState, UnitSummary, UnitTracker};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::compatibility::{row_scores, CompatibilityMap, PairKey};
use crate::engine::{build_team, CandidatePool, LeaderPick};
use crate::error::{Error, Result};
use crate::model::{team_id, Participant, Team};

// ─────────────────────────────────────────────────────────────────
// Lock Scope
// ─────────────────────────────────────────────────────────────────

/// How long a formation task holds the shared pool lock
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LockScope {
    /// For the whole formation of one team
    #[default]
    Team,
    /// Only around each select-and-remove step
    Pick,
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockScope::Team => write!(f, "team"),
            LockScope::Pick => write!(f, "pick"),
        }
    }
}

impl FromStr for LockScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "team" => Ok(LockScope::Team),
            "pick" => Ok(LockScope::Pick),
            other => Err(Error::config_field_invalid(
                "formation.lock_scope",
                format!("unknown lock scope '{}' (expected team or pick)", other),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Phase 1: Pairwise Precompute
// ─────────────────────────────────────────────────────────────────

/// Score all unordered pairs, one spawned unit per row
pub async fn precompute(participants: &[Arc<Participant>], unit_timeout: Duration) -> Result<CompatibilityMap> {
    let n = participants.len();
    let shared: Arc<Vec<Arc<Participant>>> = Arc::new(participants.to_vec());
    let scores: Arc<DashMap<PairKey, f64>> = Arc::new(DashMap::with_capacity(n * n.saturating_sub(1) / 2));
    let tracker = Arc::new(UnitTracker::new());

    let mut units = Vec::with_capacity(n);
    for row in 0..n.saturating_sub(1) {
        let unit = format!("precompute-row-{}", row);
        tracker.add(&unit, UnitKind::Precompute);

        let shared = shared.clone();
        let scores = scores.clone();
        let unit_tracker = tracker.clone();
        let name = unit.clone();
        let handle = tokio::spawn(async move {
            unit_tracker.mark_running(&name);
            for (key, score) in row_scores(&shared, row) {
                scores.insert(key, score);
            }
        });
        units.push((unit, handle));
    }

    let mut pending = units.into_iter();
    while let Some((unit, mut handle)) = pending.next() {
        let failure = match tokio::time::timeout(unit_timeout, &mut handle).await {
            Ok(Ok(())) => {
                tracker.mark_completed(&unit);
                continue;
            }
            Ok(Err(join_error)) => {
                tracker.mark_failed(&unit);
                Error::concurrency(format!("{} failed: {}", unit, join_error))
            }
            Err(_) => {
                handle.abort();
                tracker.mark_timed_out(&unit);
                Error::TaskTimeout {
                    unit: unit.clone(),
                    timeout_secs: unit_timeout.as_secs(),
                }
            }
        };

        for (_, rest) in pending {
            rest.abort();
        }
        tracker.cancel_pending();
        error!(unit = %unit, error = %failure, "Compatibility precompute failed");
        return Err(failure);
    }

    let frozen: HashMap<PairKey, f64> = scores
        .iter()
        .map(|entry| (entry.key().clone(), *entry.value()))
        .collect();

    debug!(
        units = tracker.summary(Some(UnitKind::Precompute)).completed,
        pairs = frozen.len(),
        "Compatibility precompute finished"
    );
    Ok(CompatibilityMap::from_scores(frozen))
}

// ─────────────────────────────────────────────────────────────────
// Phase 2: Per-Team Formation
// ─────────────────────────────────────────────────────────────────

/// Parameters of one concurrent formation run
#[derive(Debug, Clone, Copy)]
pub struct FormationPlan {
    pub team_count: usize,
    pub team_size: usize,
    pub lock_scope: LockScope,
    pub task_timeout: Duration,
}

/// Pool that takes the shared lock once per pick
struct PerPickPool<'a>(&'a Mutex<Vec<Arc<Participant>>>);

impl CandidatePool for PerPickPool<'_> {
    fn take_leader(&mut self, team_size: usize) -> LeaderPick {
        self.0.lock().take_leader(team_size)
    }

    fn take_member(&mut self, team: &Team, compatibility: &CompatibilityMap) -> Option<Arc<Participant>> {
        self.0.lock().take_member(team, compatibility)
    }
}

/// Extra check run at every pick of a team task, given the team number
type StepGuard = Arc<dyn Fn(usize) -> Result<()> + Send + Sync>;

/// One team's formation task
struct TeamTask {
    team_number: usize,
    team_size: usize,
    lock_scope: LockScope,
    timeout: Duration,
    pool: Arc<Mutex<Vec<Arc<Participant>>>>,
    compatibility: Arc<CompatibilityMap>,
    token: CancellationToken,
    guard: StepGuard,
}

impl TeamTask {
    fn run(self) -> Result<Option<Team>> {
        let unit = team_id(self.team_number);
        let deadline = Instant::now() + self.timeout;
        let timeout_secs = self.timeout.as_secs();
        let token = self.token.clone();
        let guard = self.guard.clone();
        let team_number = self.team_number;

        let checkpoint = || {
            if token.is_cancelled() {
                Err(Error::Cancelled(unit.clone()))
            } else if Instant::now() >= deadline {
                Err(Error::TaskTimeout {
                    unit: unit.clone(),
                    timeout_secs,
                })
            } else {
                guard(team_number)
            }
        };

        match self.lock_scope {
            LockScope::Team => {
                let mut available = self.pool.lock();
                build_team(self.team_number, self.team_size, &mut *available, &self.compatibility, checkpoint)
            }
            LockScope::Pick => {
                let mut available = PerPickPool(&self.pool);
                build_team(self.team_number, self.team_size, &mut available, &self.compatibility, checkpoint)
            }
        }
    }
}

/// Spawn one task per team and collect the results in submission order.
///
/// On a run-level failure every team formed so far is dissolved and all
/// participants are left unassigned.
pub async fn form_concurrently(
    participants: &[Arc<Participant>],
    compatibility: Arc<CompatibilityMap>,
    plan: FormationPlan,
) -> Result<Vec<Team>> {
    form_guarded(participants, compatibility, plan, Arc::new(|_: usize| -> Result<()> { Ok(()) })).await
}

async fn form_guarded(
    participants: &[Arc<Participant>],
    compatibility: Arc<CompatibilityMap>,
    plan: FormationPlan,
    guard: StepGuard,
) -> Result<Vec<Team>> {
    let pool = Arc::new(Mutex::new(participants.to_vec()));
    let root = CancellationToken::new();
    let tracker = Arc::new(UnitTracker::new());

    let mut tasks: Vec<(String, CancellationToken, JoinHandle<Result<Option<Team>>>)> =
        Vec::with_capacity(plan.team_count);

    for team_number in 1..=plan.team_count {
        let unit = team_id(team_number);
        tracker.add(&unit, UnitKind::Formation);

        let task = TeamTask {
            team_number,
            team_size: plan.team_size,
            lock_scope: plan.lock_scope,
            timeout: plan.task_timeout,
            pool: pool.clone(),
            compatibility: compatibility.clone(),
            token: root.child_token(),
            guard: guard.clone(),
        };
        let token = task.token.clone();
        let task_tracker = tracker.clone();
        let name = unit.clone();
        let handle = tokio::spawn(async move {
            task_tracker.mark_running(&name);
            task.run()
        });
        tasks.push((unit, token, handle));
    }

    let mut teams = Vec::with_capacity(plan.team_count);
    let mut pending = tasks.into_iter();

    while let Some((unit, token, mut handle)) = pending.next() {
        let joined = match tokio::time::timeout(plan.task_timeout, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                // Past the deadline without finishing: stop it at its next
                // checkpoint so its members are released before we move on.
                token.cancel();
                handle.await
            }
        };

        let failure = match joined {
            Ok(Ok(Some(team))) => {
                tracker.mark_completed(&unit);
                debug!(
                    team = %team.id(),
                    size = team.size(),
                    execution_time_ms = tracker.execution_time_ms(&unit),
                    "Team formed"
                );
                teams.push(team);
                continue;
            }
            Ok(Ok(None)) => {
                tracker.mark_completed(&unit);
                continue;
            }
            Ok(Err(e @ (Error::TaskTimeout { .. } | Error::Cancelled(_)))) => {
                tracker.mark_timed_out(&unit);
                warn!(team = %unit, error = %e, "Team formation missed its deadline, discarded");
                continue;
            }
            Ok(Err(e)) => {
                tracker.mark_failed(&unit);
                e
            }
            Err(join_error) => {
                tracker.mark_failed(&unit);
                let cause = if join_error.is_panic() { "panicked" } else { "was aborted" };
                Error::concurrency(format!("formation task {} {}", unit, cause))
            }
        };

        // Stop the remaining tasks, then dissolve everything formed so far
        root.cancel();
        for (sibling, _, rest) in pending {
            match rest.await {
                Ok(Ok(Some(mut team))) => {
                    team.release_all();
                    tracker.mark_cancelled(&sibling);
                }
                Ok(Ok(None)) | Ok(Err(Error::Cancelled(_))) => tracker.mark_cancelled(&sibling),
                Ok(Err(_)) | Err(_) => tracker.mark_failed(&sibling),
            }
        }
        for team in &mut teams {
            team.release_all();
        }
        // A task that died mid-build never returned its members
        for p in participants {
            p.clear_assignment();
        }
        tracker.cancel_pending();

        let summary = tracker.summary(Some(UnitKind::Formation));
        error!(
            team = %unit,
            error = %failure,
            dissolved = teams.len(),
            cancelled = summary.cancelled,
            "Concurrent team formation failed"
        );
        return Err(failure);
    }

    let summary = tracker.summary(Some(UnitKind::Formation));
    info!(
        completed = summary.completed,
        timed_out = summary.timed_out,
        teams = teams.len(),
        unassigned = pool.lock().len(),
        "Formation tasks finished"
    );

    Ok(teams)
}
