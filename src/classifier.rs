//! Personality classification
//!
//! Survey: 5 questions, each rated 1-5. The raw total (5-25) is scaled by 4
//! to the 20-100 score range, which is then split into three tiers:
//!
//! | Tier     | Scores  |
//! |----------|---------|
//! | Thinker  | 20-69   |
//! | Balanced | 70-89   |
//! | Leader   | 90-100  |

use crate::error::{Error, Result};
use crate::model::personality::{MAX_SCORE, MIN_SCORE};
use crate::model::PersonalityType;

/// Number of survey questions
pub const SURVEY_QUESTIONS: usize = 5;
/// Scale factor from the raw survey total to a personality score
pub const SURVEY_SCALE: u32 = 4;

/// Check whether a score lies inside the survey range
pub fn is_valid_score(score: i32) -> bool {
    score >= MIN_SCORE as i32 && score <= MAX_SCORE as i32
}

/// Check whether a single survey answer is on the 1-5 scale
pub fn is_valid_response(response: i32) -> bool {
    (1..=5).contains(&response)
}

/// Map a personality score to its tier
pub fn classify(score: i32) -> Result<PersonalityType> {
    if !is_valid_score(score) {
        return Err(Error::OutOfRangeScore {
            score,
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }

    let score = score as u32;
    Ok(PersonalityType::ALL
        .into_iter()
        .find(|tier| tier.matches_score(score))
        .unwrap_or(PersonalityType::Thinker))
}

/// Compute a personality score from the five raw survey answers
pub fn score_from_responses(responses: &[i32]) -> Result<u32> {
    if responses.len() != SURVEY_QUESTIONS {
        return Err(Error::InvalidInput(format!(
            "exactly {} personality responses required, received {}",
            SURVEY_QUESTIONS,
            responses.len()
        )));
    }

    let mut total = 0u32;
    for (i, &response) in responses.iter().enumerate() {
        if !is_valid_response(response) {
            return Err(Error::InvalidInput(format!(
                "response {} is invalid: {} (must be 1-5)",
                i + 1,
                response
            )));
        }
        total += response as u32;
    }

    Ok(total * SURVEY_SCALE)
}

/// Points needed to reach the next tier.
///
/// Returns `Some(0)` at the top tier and `None` for an out-of-range score.
pub fn points_to_next_tier(score: i32) -> Option<u32> {
    let tier = classify(score).ok()?;
    Some(match next_tier_of(tier) {
        Some(next) => next.min_score() - score as u32,
        None => 0,
    })
}

/// The tier above the one `score` falls in, if any
pub fn next_tier(score: i32) -> Option<PersonalityType> {
    classify(score).ok().and_then(next_tier_of)
}

fn next_tier_of(tier: PersonalityType) -> Option<PersonalityType> {
    PersonalityType::ALL.get(tier.rank() + 1).copied()
}

/// Human-readable description of a score
pub fn describe(score: i32) -> String {
    match classify(score) {
        Ok(tier) => format!("{} ({} points): {}", tier, score, tier.description()),
        Err(_) => "Invalid score - cannot determine personality type".to_string(),
    }
}

/// Suggested in-team responsibilities for a tier
pub fn role_recommendation(tier: PersonalityType) -> &'static str {
    match tier {
        PersonalityType::Leader => {
            "Recommended for: Team Captain, Shot Caller, Strategic Decision Maker. \
             Best suited to coordinate team actions and maintain morale."
        }
        PersonalityType::Balanced => {
            "Recommended for: Flex Player, Adaptable Roles. Excellent at filling gaps \
             in team composition and mediating between team members."
        }
        PersonalityType::Thinker => {
            "Recommended for: Strategist, Analyst, Planner. Best suited for developing \
             tactics, analyzing opponents, and identifying optimal strategies."
        }
    }
}

/// Short verdict on how two tiers work together
pub fn compatibility_analysis(a: PersonalityType, b: PersonalityType) -> String {
    let compatibility = a.compatibility_with(b);

    if compatibility >= 0.9 {
        format!("{} + {} = Excellent complement! These personalities balance each other well.", a, b)
    } else if compatibility >= 0.7 {
        format!("{} + {} = Good synergy. These types work well together.", a, b)
    } else {
        format!("{} + {} = Similar types. Team may benefit from more diversity.", a, b)
    }
}

/// Per-tier counts for a list of scores; invalid scores are skipped
pub fn distribution(scores: &[i32]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for tier in scores.iter().filter_map(|&s| classify(s).ok()) {
        counts[tier.rank()] += 1;
    }
    counts
}

/// Multi-line summary of how scores spread over the tiers
pub fn distribution_summary(scores: &[i32]) -> String {
    if scores.is_empty() {
        return "No scores to analyze.".to_string();
    }

    let counts = distribution(scores);
    let n = scores.len() as f64;
    let pct = |c: usize| c as f64 * 100.0 / n;

    format!(
        "Personality Distribution (n={}):\n   Leaders:  {} ({:.1}%)\n   Balanced: {} ({:.1}%)\n   Thinkers: {} ({:.1}%)",
        scores.len(),
        counts[PersonalityType::Leader.rank()],
        pct(counts[PersonalityType::Leader.rank()]),
        counts[PersonalityType::Balanced.rank()],
        pct(counts[PersonalityType::Balanced.rank()]),
        counts[PersonalityType::Thinker.rank()],
        pct(counts[PersonalityType::Thinker.rank()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        for s in 20..=69 {
            assert_eq!(classify(s).unwrap(), PersonalityType::Thinker, "score {}", s);
        }
        for s in 70..=89 {
            assert_eq!(classify(s).unwrap(), PersonalityType::Balanced, "score {}", s);
        }
        for s in 90..=100 {
            assert_eq!(classify(s).unwrap(), PersonalityType::Leader, "score {}", s);
        }
    }

    #[test]
    fn test_classify_boundaries_split() {
        assert_ne!(classify(69).unwrap(), classify(70).unwrap());
        assert_ne!(classify(89).unwrap(), classify(90).unwrap());
    }

    #[test]
    fn test_classify_out_of_range() {
        for s in [-5, 0, 19, 101, 1000] {
            match classify(s) {
                Err(Error::OutOfRangeScore { score, min, max }) => {
                    assert_eq!(score, s);
                    assert_eq!((min, max), (20, 100));
                }
                other => panic!("expected OutOfRangeScore, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_score_from_responses() {
        assert_eq!(score_from_responses(&[5, 5, 5, 5, 5]).unwrap(), 100);
        assert_eq!(score_from_responses(&[1, 1, 1, 1, 1]).unwrap(), 20);
        assert_eq!(score_from_responses(&[5, 5, 4, 5, 4]).unwrap(), 92);
    }

    #[test]
    fn test_score_from_responses_invalid() {
        assert!(matches!(score_from_responses(&[5, 5, 5, 5]), Err(Error::InvalidInput(_))));
        assert!(matches!(score_from_responses(&[5, 5, 5, 5, 5, 5]), Err(Error::InvalidInput(_))));
        assert!(matches!(score_from_responses(&[5, 5, 0, 5, 5]), Err(Error::InvalidInput(_))));
        assert!(matches!(score_from_responses(&[6, 5, 5, 5, 5]), Err(Error::InvalidInput(_))));
        assert!(matches!(score_from_responses(&[]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_points_to_next_tier() {
        assert_eq!(points_to_next_tier(60), Some(10));
        assert_eq!(points_to_next_tier(85), Some(5));
        assert_eq!(points_to_next_tier(95), Some(0));
        assert_eq!(points_to_next_tier(10), None);
    }

    #[test]
    fn test_next_tier() {
        assert_eq!(next_tier(50), Some(PersonalityType::Balanced));
        assert_eq!(next_tier(75), Some(PersonalityType::Leader));
        assert_eq!(next_tier(90), None);
        assert_eq!(next_tier(200), None);
    }

    #[test]
    fn test_describe() {
        assert!(describe(92).starts_with("Leader (92 points)"));
        assert!(describe(5).contains("Invalid"));
    }

    #[test]
    fn test_compatibility_analysis() {
        let text = compatibility_analysis(PersonalityType::Leader, PersonalityType::Thinker);
        assert!(text.contains("Excellent"));
        let text = compatibility_analysis(PersonalityType::Leader, PersonalityType::Leader);
        assert!(text.contains("Similar"));
    }

    #[test]
    fn test_distribution_skips_invalid() {
        assert_eq!(distribution(&[95, 80, 50, 10, 101]), [1, 1, 1]);
        let summary = distribution_summary(&[95, 95, 80, 50]);
        assert!(summary.contains("n=4"));
        assert!(summary.contains("Leaders:  2 (50.0%)"));
        assert_eq!(distribution_summary(&[]), "No scores to analyze.");
    }
}
