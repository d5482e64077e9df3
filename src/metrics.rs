//! Team quality metrics
//!
//! Scores are a pure function of the member set. Teams recompute them from
//! scratch after every membership change instead of updating incrementally.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{Activity, Participant, PersonalityType, Role};

const ACTIVITY_WEIGHT: f64 = 0.30;
const ROLE_WEIGHT: f64 = 0.40;
const PERSONALITY_WEIGHT: f64 = 0.30;

const SKILL_BALANCE_WEIGHT: f64 = 0.40;
const PERSONALITY_BALANCE_WEIGHT: f64 = 0.40;
const LEADER_WEIGHT: f64 = 0.20;

/// Skill variance at which skill balance bottoms out
const SKILL_VARIANCE_CEILING: f64 = 25.0;

/// Diversity and balance of a member set, both in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub diversity: f64,
    pub balance: f64,
}

impl TeamMetrics {
    /// Score a member set. Fewer than two members scores zero on both axes.
    pub fn compute(members: &[Arc<Participant>]) -> Self {
        if members.len() < 2 {
            return Self::default();
        }

        Self {
            diversity: diversity(members),
            balance: balance(members),
        }
    }

    /// Arithmetic mean of diversity and balance
    pub fn overall(&self) -> f64 {
        (self.diversity + self.balance) / 2.0
    }
}

/// Weighted share of distinct activities, roles and personality tiers
pub fn diversity(members: &[Arc<Participant>]) -> f64 {
    let activity = distinct_ratio(members, Activity::ALL.len(), |p| p.preferred_activity());
    let role = distinct_ratio(members, Role::ALL.len(), |p| p.preferred_role());
    let personality = distinct_ratio(members, PersonalityType::ALL.len(), |p| p.personality_type());

    activity * ACTIVITY_WEIGHT + role * ROLE_WEIGHT + personality * PERSONALITY_WEIGHT
}

/// Weighted skill evenness, personality spread and leader presence
pub fn balance(members: &[Arc<Participant>]) -> f64 {
    let has_leader = if members.iter().any(|p| p.is_leader()) { 1.0 } else { 0.0 };

    skill_balance(members) * SKILL_BALANCE_WEIGHT
        + personality_balance(members) * PERSONALITY_BALANCE_WEIGHT
        + has_leader * LEADER_WEIGHT
}

/// `max(0, 1 - variance / 25)` over skill levels (population variance)
pub fn skill_balance(members: &[Arc<Participant>]) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }

    let n = members.len() as f64;
    let mean = members.iter().map(|p| p.skill_level() as f64).sum::<f64>() / n;
    let variance = members
        .iter()
        .map(|p| (p.skill_level() as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    (1.0 - variance / SKILL_VARIANCE_CEILING).max(0.0)
}

/// 1.0 unless one tier holds more than half the team (rounded up)
pub fn personality_balance(members: &[Arc<Participant>]) -> f64 {
    let mut counts: HashMap<PersonalityType, usize> = HashMap::new();
    for p in members {
        *counts.entry(p.personality_type()).or_default() += 1;
    }

    let max_allowed = members.len().div_ceil(2);
    let max_count = counts.values().copied().max().unwrap_or(0);

    if max_count <= max_allowed {
        1.0
    } else {
        max_allowed as f64 / max_count as f64
    }
}

fn distinct_ratio<T, F>(members: &[Arc<Participant>], kinds: usize, key: F) -> f64
where
    T: Eq + Hash,
    F: Fn(&Participant) -> T,
{
    let max_possible = members.len().min(kinds);
    if max_possible == 0 {
        return 0.0;
    }
    let distinct: HashSet<T> = members.iter().map(|p| key(p.as_ref())).collect();
    distinct.len() as f64 / max_possible as f64
}
