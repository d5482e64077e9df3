//! Pairwise compatibility between participants
//!
//! `pair_score` is symmetric and lies in `[0, 1]`. A run computes it once for
//! every unordered pair and freezes the results into a [`CompatibilityMap`],
//! which formation tasks then share read-only.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Participant;

const PERSONALITY_WEIGHT: f64 = 0.40;
const ROLE_WEIGHT: f64 = 0.30;
const SKILL_WEIGHT: f64 = 0.30;

/// Score assumed for a pair that was never computed
pub const DEFAULT_PAIR_SCORE: f64 = 0.5;

/// Affinity of two participants
pub fn pair_score(a: &Participant, b: &Participant) -> f64 {
    let personality = a.personality_type().compatibility_with(b.personality_type());
    let role = if a.preferred_role().complements(b.preferred_role()) { 1.0 } else { 0.5 };
    let skill = a.skill_compatibility(b);

    personality * PERSONALITY_WEIGHT + role * ROLE_WEIGHT + skill * SKILL_WEIGHT
}

/// Order-independent key for a pair of participant ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

/// Frozen pairwise scores for one formation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityMap {
    scores: HashMap<PairKey, f64>,
}

impl CompatibilityMap {
    pub fn from_scores(scores: HashMap<PairKey, f64>) -> Self {
        Self { scores }
    }

    /// Cached score, or [`DEFAULT_PAIR_SCORE`] for an unknown pair
    pub fn get(&self, a: &str, b: &str) -> f64 {
        self.scores
            .get(&PairKey::new(a, b))
            .copied()
            .unwrap_or(DEFAULT_PAIR_SCORE)
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.scores.contains_key(&PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Mean cached score between `candidate` and each member, 1.0 for no members
    pub fn average_with(&self, candidate: &Participant, members: &[Arc<Participant>]) -> f64 {
        if members.is_empty() {
            return 1.0;
        }
        let total: f64 = members.iter().map(|m| self.get(candidate.id(), m.id())).sum();
        total / members.len() as f64
    }
}

/// Scores of participant `row` against every later participant
pub fn row_scores(participants: &[Arc<Participant>], row: usize) -> Vec<(PairKey, f64)> {
    let Some(anchor) = participants.get(row) else {
        return Vec::new();
    };
    participants[row + 1..]
        .iter()
        .map(|other| (PairKey::new(anchor.id(), other.id()), pair_score(anchor, other)))
        .collect()
}

/// Single-threaded precompute over all unordered pairs
pub fn build_sequential(participants: &[Arc<Participant>]) -> CompatibilityMap {
    let scores = (0..participants.len())
        .flat_map(|row| row_scores(participants, row))
        .collect();
    CompatibilityMap::from_scores(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::participant::tests::input;
    use crate::model::Role;

    fn participant(id: &str, score: i32, role: Role, skill: i32) -> Arc<Participant> {
        let mut i = input(id, score);
        i.preferred_role = role;
        i.skill_level = skill;
        Arc::new(Participant::new(i).unwrap())
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(PairKey::new("P002", "P001"), PairKey::new("P001", "P002"));
        let key = PairKey::new("P010", "P002");
        assert_eq!(key.first(), "P002");
        assert_eq!(key.second(), "P010");
    }

    #[test]
    fn test_pair_score_weights() {
        // leader vs thinker, different roles, same skill
        let a = participant("P001", 95, Role::Strategist, 5);
        let b = participant("P002", 50, Role::Attacker, 5);
        assert!((pair_score(&a, &b) - 1.0).abs() < 1e-9);

        // same tier, same role, skill gap 9
        let c = participant("P003", 50, Role::Attacker, 1);
        let d = participant("P004", 60, Role::Attacker, 10);
        let expected = 0.5 * 0.40 + 0.5 * 0.30 + 0.2 * 0.30;
        assert!((pair_score(&c, &d) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pair_score_symmetric_and_bounded() {
        let people = vec![
            participant("P001", 95, Role::Strategist, 8),
            participant("P002", 75, Role::Strategist, 3),
            participant("P003", 40, Role::Defender, 6),
        ];
        for a in &people {
            for b in &people {
                let ab = pair_score(a, b);
                assert_eq!(ab, pair_score(b, a));
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_build_sequential_covers_all_pairs() {
        let people: Vec<_> = (1..=5)
            .map(|i| participant(&format!("P{:03}", i), 50 + i * 9, Role::Supporter, i))
            .collect();
        let map = build_sequential(&people);

        assert_eq!(map.len(), 10);
        assert!(map.contains("P005", "P001"));
        assert!(!map.contains("P001", "P001"));
        assert_eq!(map.get("P001", "P999"), DEFAULT_PAIR_SCORE);
        assert_eq!(map.get("P002", "P004"), pair_score(&people[1], &people[3]));
    }

    #[test]
    fn test_average_with() {
        let people = vec![
            participant("P001", 95, Role::Strategist, 5),
            participant("P002", 50, Role::Attacker, 5),
            participant("P003", 80, Role::Defender, 5),
        ];
        let map = build_sequential(&people);

        assert_eq!(map.average_with(&people[0], &[]), 1.0);
        let avg = map.average_with(&people[0], &people[1..]);
        let expected = (map.get("P001", "P002") + map.get("P001", "P003")) / 2.0;
        assert!((avg - expected).abs() < 1e-12);
    }
}
