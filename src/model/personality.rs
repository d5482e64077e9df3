//! Personality tiers derived from the five-question survey

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest score the survey can produce (5 answers x 1 x 4)
pub const MIN_SCORE: u32 = 20;
/// Highest score the survey can produce (5 answers x 5 x 4)
pub const MAX_SCORE: u32 = 100;
/// Lowest score classified as [`PersonalityType::Balanced`]
pub const BALANCED_MIN: u32 = 70;
/// Lowest score classified as [`PersonalityType::Leader`]
pub const LEADER_MIN: u32 = 90;

/// Personality tier, ordered from lowest to highest band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityType {
    /// Observant and analytical (20-69)
    Thinker,
    /// Adaptive and communicative (70-89)
    Balanced,
    /// Takes charge (90-100); every team needs one
    Leader,
}

impl PersonalityType {
    /// All tiers, lowest band first
    pub const ALL: [PersonalityType; 3] = [
        PersonalityType::Thinker,
        PersonalityType::Balanced,
        PersonalityType::Leader,
    ];

    /// Inclusive score band `(min, max)`
    pub fn band(&self) -> (u32, u32) {
        match self {
            PersonalityType::Thinker => (MIN_SCORE, BALANCED_MIN - 1),
            PersonalityType::Balanced => (BALANCED_MIN, LEADER_MIN - 1),
            PersonalityType::Leader => (LEADER_MIN, MAX_SCORE),
        }
    }

    pub fn min_score(&self) -> u32 {
        self.band().0
    }

    pub fn max_score(&self) -> u32 {
        self.band().1
    }

    /// Check whether a score falls inside this tier's band
    pub fn matches_score(&self, score: u32) -> bool {
        let (min, max) = self.band();
        (min..=max).contains(&score)
    }

    /// Position in the band order (0 = lowest)
    pub fn rank(&self) -> usize {
        match self {
            PersonalityType::Thinker => 0,
            PersonalityType::Balanced => 1,
            PersonalityType::Leader => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PersonalityType::Thinker => "Thinker",
            PersonalityType::Balanced => "Balanced",
            PersonalityType::Leader => "Leader",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PersonalityType::Thinker => "Observant and analytical, prefers planning before action",
            PersonalityType::Balanced => "Adaptive and communicative team-oriented player",
            PersonalityType::Leader => "Confident decision-maker who naturally takes charge",
        }
    }

    /// Affinity between two tiers.
    ///
    /// Contrasting personalities score higher than identical ones.
    pub fn compatibility_with(&self, other: PersonalityType) -> f64 {
        match self.rank().abs_diff(other.rank()) {
            0 => 0.5,
            1 => 0.8,
            _ => 1.0,
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
