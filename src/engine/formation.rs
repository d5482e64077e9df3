//! Team formation
//!
//! Each team is built by one call to [`build_team`]: pick the strongest
//! available leader, then greedily fill the remaining spots. The sequential
//! path runs those calls in a loop over one pool; the concurrent path runs
//! one per task against a lock-guarded pool (see [`crate::coordinator`]).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::compatibility::{self, CompatibilityMap};
use crate::config::FormationSettings;
use crate::coordinator::{self, FormationPlan, WorkerPool};
use crate::error::{FormationError, Result};
use crate::model::{Participant, Team, MIN_TEAM_SIZE};

use super::selection::{select_best_candidate, select_leader};
use super::FormationStatistics;

// ─────────────────────────────────────────────────────────────────
// Candidate Pools
// ─────────────────────────────────────────────────────────────────

/// Outcome of asking a pool for a team's leader
#[derive(Debug)]
pub(crate) enum LeaderPick {
    Found(Arc<Participant>),
    PoolTooSmall { available: usize },
    NoLeader,
}

/// Source of participants for a team being built.
///
/// Each call selects and removes in one step, so an implementation that
/// locks per call never hands the same participant to two teams.
pub(crate) trait CandidatePool {
    /// Remove and return the leader for a new team of `team_size`
    fn take_leader(&mut self, team_size: usize) -> LeaderPick;

    /// Remove and return the best admissible candidate for `team`
    fn take_member(&mut self, team: &Team, compatibility: &CompatibilityMap) -> Option<Arc<Participant>>;
}

impl CandidatePool for Vec<Arc<Participant>> {
    fn take_leader(&mut self, team_size: usize) -> LeaderPick {
        if self.len() < team_size {
            return LeaderPick::PoolTooSmall { available: self.len() };
        }
        match select_leader(self) {
            Some(index) => LeaderPick::Found(self.remove(index)),
            None => LeaderPick::NoLeader,
        }
    }

    fn take_member(&mut self, team: &Team, compatibility: &CompatibilityMap) -> Option<Arc<Participant>> {
        select_best_candidate(team, self, compatibility).map(|index| self.remove(index))
    }
}

/// Build the `team_number`-th team from `pool`.
///
/// `checkpoint` runs before every pick; an error from it releases whatever
/// members were already placed and aborts this team. Teams that end below
/// the minimum size are released and reported as `None`.
pub(crate) fn build_team<P, C>(
    team_number: usize,
    team_size: usize,
    pool: &mut P,
    compatibility: &CompatibilityMap,
    mut checkpoint: C,
) -> Result<Option<Team>>
where
    P: CandidatePool + ?Sized,
    C: FnMut() -> Result<()>,
{
    let mut team = Team::numbered(team_number, team_size)?;

    checkpoint()?;
    match pool.take_leader(team_size) {
        LeaderPick::Found(leader) => team.add_member(leader)?,
        LeaderPick::PoolTooSmall { available } => {
            debug!(team = %team.id(), available, team_size, "Pool exhausted before team could start");
            return Ok(None);
        }
        LeaderPick::NoLeader => {
            warn!(team = %team.id(), "Cannot form team - no leader available");
            return Ok(None);
        }
    }

    while !team.is_full() {
        if let Err(e) = checkpoint() {
            team.release_all();
            return Err(e);
        }
        match pool.take_member(&team, compatibility) {
            Some(candidate) => team.add_member(candidate)?,
            None => break,
        }
    }

    if team.size() < MIN_TEAM_SIZE {
        debug!(team = %team.id(), size = team.size(), "Team below minimum size, dropped");
        team.release_all();
        return Ok(None);
    }

    Ok(Some(team))
}

// ─────────────────────────────────────────────────────────────────
// Preconditions
// ─────────────────────────────────────────────────────────────────

/// Validate a formation request before any work is scheduled
pub fn check_preconditions(
    participants: &[Arc<Participant>],
    team_size: usize,
) -> std::result::Result<(), FormationError> {
    if participants.is_empty() {
        return Err(FormationError::EmptyPool);
    }
    if team_size < MIN_TEAM_SIZE {
        return Err(FormationError::TeamSizeTooSmall {
            minimum: MIN_TEAM_SIZE,
            requested: team_size,
        });
    }
    if participants.len() < team_size {
        return Err(FormationError::InsufficientParticipants {
            required: team_size,
            available: participants.len(),
        });
    }
    if !participants.iter().any(|p| p.is_leader()) {
        return Err(FormationError::NoLeaders);
    }
    Ok(())
}

/// Teams to attempt: one per full team in the pool, at most one per leader
pub fn planned_team_count(participants: &[Arc<Participant>], team_size: usize) -> usize {
    let by_size = participants.len() / team_size.max(1);
    let leaders = participants.iter().filter(|p| p.is_leader()).count();

    if leaders < by_size {
        warn!(
            leaders,
            teams = by_size,
            "Only {} leaders for {} teams - each team requires 1 leader",
            leaders,
            by_size
        );
        leaders
    } else {
        by_size
    }
}

fn reset_assignments(participants: &[Arc<Participant>]) {
    for p in participants {
        p.clear_assignment();
    }
}

// ─────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────

/// Forms teams from a participant list, sequentially or on a worker pool
pub struct TeamFormationEngine {
    settings: FormationSettings,
    pool: WorkerPool,
}

impl TeamFormationEngine {
    /// Create an engine and start its worker pool
    pub fn new(settings: FormationSettings) -> Result<Self> {
        let pool = WorkerPool::new(settings.effective_worker_threads(), settings.shutdown_grace())?;
        info!(
            worker_threads = pool.worker_threads(),
            lock_scope = %settings.lock_scope,
            "Formation engine ready"
        );
        Ok(Self { settings, pool })
    }

    pub fn settings(&self) -> &FormationSettings {
        &self.settings
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.worker_threads()
    }

    /// Score every unordered pair on the worker pool
    pub fn precompute_compatibility(&self, participants: &[Arc<Participant>]) -> Result<CompatibilityMap> {
        self.pool.block_on(coordinator::precompute(
            participants,
            self.settings.unit_timeout(),
        ))
    }

    /// Form teams with the configured strategy
    pub fn form(&self, participants: &[Arc<Participant>], team_size: usize) -> Result<Vec<Team>> {
        if self.settings.sequential {
            self.form_teams_sequential(participants, team_size)
        } else {
            self.form_teams(participants, team_size)
        }
    }

    /// Form teams concurrently, one task per team
    pub fn form_teams(&self, participants: &[Arc<Participant>], team_size: usize) -> Result<Vec<Team>> {
        check_preconditions(participants, team_size)?;
        reset_assignments(participants);
        let team_count = planned_team_count(participants, team_size);

        info!(
            participants = participants.len(),
            team_size,
            team_count,
            lock_scope = %self.settings.lock_scope,
            "Starting concurrent team formation"
        );

        let compatibility = Arc::new(self.precompute_compatibility(participants)?);
        debug!(pairs = compatibility.len(), "Compatibility precomputed");

        let plan = FormationPlan {
            team_count,
            team_size,
            lock_scope: self.settings.lock_scope,
            task_timeout: self.settings.task_timeout(),
        };
        let teams = self
            .pool
            .block_on(coordinator::form_concurrently(participants, compatibility, plan))?;

        info!(teams = teams.len(), "Concurrent team formation complete");
        Ok(teams)
    }

    /// Form teams on the calling thread
    pub fn form_teams_sequential(&self, participants: &[Arc<Participant>], team_size: usize) -> Result<Vec<Team>> {
        check_preconditions(participants, team_size)?;
        reset_assignments(participants);
        let team_count = planned_team_count(participants, team_size);

        info!(
            participants = participants.len(),
            team_size,
            team_count,
            "Starting sequential team formation"
        );

        let compatibility = compatibility::build_sequential(participants);
        let mut available = participants.to_vec();
        let mut teams = Vec::with_capacity(team_count);

        for team_number in 1..=team_count {
            if let Some(team) = build_team(team_number, team_size, &mut available, &compatibility, || Ok(()))? {
                teams.push(team);
            }
        }

        info!(
            teams = teams.len(),
            unassigned = available.len(),
            "Sequential team formation complete"
        );
        Ok(teams)
    }

    /// Aggregate statistics over formed teams
    pub fn statistics(teams: &[Team]) -> FormationStatistics {
        FormationStatistics::from_teams(teams)
    }

    /// Drain the worker pool within the configured grace period
    pub fn shutdown(self) {
        self.pool.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::participant::tests::input;
    use crate::model::{Activity, Role, UNASSIGNED};

    fn participant(id: &str, score: i32, activity: Activity, role: Role, skill: i32) -> Arc<Participant> {
        let mut i = input(id, score);
        i.preferred_activity = activity;
        i.preferred_role = role;
        i.skill_level = skill;
        Arc::new(Participant::new(i).unwrap())
    }

    fn mixed_pool(n: usize) -> Vec<Arc<Participant>> {
        (0..n)
            .map(|i| {
                let score = [95, 82, 60, 45, 75, 91][i % 6];
                participant(
                    &format!("P{:03}", i + 1),
                    score,
                    Activity::ALL[i % Activity::ALL.len()],
                    Role::ALL[i % Role::ALL.len()],
                    (i % 10) as i32 + 1,
                )
            })
            .collect()
    }

    fn engine() -> TeamFormationEngine {
        let settings = FormationSettings {
            worker_threads: 2,
            ..FormationSettings::default()
        };
        TeamFormationEngine::new(settings).unwrap()
    }

    #[test]
    fn test_preconditions() {
        let pool = mixed_pool(6);
        assert_eq!(check_preconditions(&[], 3), Err(FormationError::EmptyPool));
        assert_eq!(
            check_preconditions(&pool, 2),
            Err(FormationError::TeamSizeTooSmall { minimum: 3, requested: 2 })
        );
        assert_eq!(
            check_preconditions(&pool, 7),
            Err(FormationError::InsufficientParticipants { required: 7, available: 6 })
        );

        let thinkers: Vec<_> = (1..=4)
            .map(|i| participant(&format!("P{:03}", i), 50, Activity::Chess, Role::Attacker, 5))
            .collect();
        assert_eq!(check_preconditions(&thinkers, 3), Err(FormationError::NoLeaders));
        assert_eq!(check_preconditions(&pool, 3), Ok(()));
    }

    #[test]
    fn test_planned_team_count_capped_by_leaders() {
        // two leaders (95 and 91) in six participants
        let pool = mixed_pool(6);
        assert_eq!(planned_team_count(&pool, 3), 2);

        let mut one_leader = pool.clone();
        one_leader.remove(5);
        assert_eq!(planned_team_count(&one_leader, 3), 1);
    }

    #[test]
    fn test_build_team_fills_to_size() {
        let pool = mixed_pool(8);
        let map = compatibility::build_sequential(&pool);
        let mut available = pool.clone();

        let team = build_team(1, 4, &mut available, &map, || Ok(())).unwrap().unwrap();
        assert_eq!(team.size(), 4);
        assert_eq!(team.members()[0].id(), "P001", "strongest leader picked first");
        assert_eq!(available.len(), 4);
        assert!(team.members().iter().all(|p| p.assigned_team() == "Alpha"));
    }

    #[test]
    fn test_build_team_pool_too_small() {
        let pool = mixed_pool(3);
        let map = compatibility::build_sequential(&pool);
        let mut available = pool.clone();

        assert!(build_team(1, 4, &mut available, &map, || Ok(())).unwrap().is_none());
        assert_eq!(available.len(), 3);
    }

    #[test]
    fn test_build_team_checkpoint_releases_members() {
        let pool = mixed_pool(6);
        let map = compatibility::build_sequential(&pool);
        let mut available = pool.clone();

        let mut calls = 0;
        let result = build_team(1, 4, &mut available, &map, || {
            calls += 1;
            if calls > 2 {
                Err(Error::Cancelled("TEAM-001".to_string()))
            } else {
                Ok(())
            }
        });

        assert!(matches!(result, Err(Error::Cancelled(_))));
        assert!(pool.iter().all(|p| p.assigned_team() == UNASSIGNED));
    }

    #[test]
    fn test_build_team_drops_undersized() {
        // a third chess player is over the per-activity limit
        let pool = vec![
            participant("P001", 95, Activity::Chess, Role::Attacker, 5),
            participant("P002", 50, Activity::Chess, Role::Defender, 5),
            participant("P003", 50, Activity::Chess, Role::Supporter, 5),
        ];
        let map = compatibility::build_sequential(&pool);
        let mut available = pool.clone();

        assert!(build_team(1, 3, &mut available, &map, || Ok(())).unwrap().is_none());
        assert!(pool.iter().all(|p| p.assigned_team() == UNASSIGNED));
    }

    #[test]
    fn test_sequential_formation() {
        let engine = engine();
        let pool = mixed_pool(20);
        let teams = engine.form_teams_sequential(&pool, 4).unwrap();

        assert!(!teams.is_empty());
        assert_eq!(teams[0].id(), "TEAM-001");
        for pair in teams.windows(2) {
            assert!(pair[0].id() < pair[1].id());
        }
        for team in &teams {
            assert!(team.is_valid());
            assert!(team.size() <= 4);
        }
        engine.shutdown();
    }

    #[test]
    fn test_resets_assignment_between_runs() {
        let engine = engine();
        let pool = mixed_pool(12);

        engine.form_teams_sequential(&pool, 3).unwrap();
        let teams = engine.form_teams_sequential(&pool, 6).unwrap();
        let placed: usize = teams.iter().map(Team::size).sum();
        let assigned = pool.iter().filter(|p| p.is_assigned()).count();
        assert_eq!(placed, assigned);
        engine.shutdown();
    }

    #[test]
    fn test_precondition_error_surfaces() {
        let engine = engine();
        let err = engine.form_teams(&[], 3).unwrap_err();
        assert_eq!(err.as_formation(), Some(&FormationError::EmptyPool));
        engine.shutdown();
    }
}
