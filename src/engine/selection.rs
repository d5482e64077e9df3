//! Greedy selection rules
//!
//! Both selectors scan the pool in order and only replace the current best on
//! a strictly better score, so ties always go to the earliest participant.

use std::sync::Arc;

use crate::compatibility::CompatibilityMap;
use crate::model::{Participant, Team, MAX_LEADERS_PER_TEAM};

/// Most members of a team that may share a preferred activity
pub const MAX_SAME_ACTIVITY: usize = 2;

const ACTIVITY_WEIGHT: f64 = 0.30;
const ROLE_WEIGHT: f64 = 0.25;
const PERSONALITY_WEIGHT: f64 = 0.20;
const SKILL_WEIGHT: f64 = 0.15;
const COMPATIBILITY_WEIGHT: f64 = 0.10;

/// Index of the highest-scoring leader in the pool
pub fn select_leader(pool: &[Arc<Participant>]) -> Option<usize> {
    pool.iter()
        .enumerate()
        .filter(|(_, p)| p.is_leader())
        .fold(None, |best: Option<(usize, u32)>, (i, p)| match best {
            Some((_, score)) if p.personality_score() <= score => best,
            _ => Some((i, p.personality_score())),
        })
        .map(|(i, _)| i)
}

/// Hard constraints a candidate must pass before being scored
pub fn meets_constraints(team: &Team, candidate: &Participant) -> bool {
    if candidate.is_leader() && team.leader_count() >= MAX_LEADERS_PER_TEAM {
        return false;
    }
    team.activity_count(candidate.preferred_activity()) < MAX_SAME_ACTIVITY
}

/// Weighted desirability of adding `candidate` to `team`
pub fn candidate_score(team: &Team, candidate: &Participant, compatibility: &CompatibilityMap) -> f64 {
    let activity = if team.has_activity(candidate.preferred_activity()) { 0.3 } else { 1.0 };
    let role = if team.has_role(candidate.preferred_role()) { 0.4 } else { 1.0 };
    let personality = personality_fit(team, candidate);
    let skill = skill_fit(team, candidate);
    let compat = compatibility.average_with(candidate, team.members());

    activity * ACTIVITY_WEIGHT
        + role * ROLE_WEIGHT
        + personality * PERSONALITY_WEIGHT
        + skill * SKILL_WEIGHT
        + compat * COMPATIBILITY_WEIGHT
}

/// 1.0 for a new tier, 0.3 once the tier holds a majority, 0.6 otherwise
pub fn personality_fit(team: &Team, candidate: &Participant) -> f64 {
    let tier = candidate.personality_type();
    if !team.has_personality(tier) {
        return 1.0;
    }
    let count = team.personality_count(tier) as f64;
    if count > team.size() as f64 / 2.0 {
        0.3
    } else {
        0.6
    }
}

/// Closeness of the candidate's skill to the team average
pub fn skill_fit(team: &Team, candidate: &Participant) -> f64 {
    if team.size() == 0 {
        return 1.0;
    }
    let diff = (team.average_skill() - candidate.skill_level() as f64).abs();
    (1.0 - diff * 0.15).max(0.0)
}

/// Index of the best admissible candidate, if any survive the constraints
pub fn select_best_candidate(
    team: &Team,
    pool: &[Arc<Participant>],
    compatibility: &CompatibilityMap,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, candidate) in pool.iter().enumerate() {
        if !meets_constraints(team, candidate) {
            continue;
        }
        let score = candidate_score(team, candidate, compatibility);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }

    best.map(|(i, _)| i)
}
