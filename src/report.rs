//! Terminal rendering for the `form` and `classify` commands

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::classifier;
use crate::engine::FormationStatistics;
use crate::model::{Participant, Team};

/// Rosters, statistics, and leftover participants of a formation run
pub fn write_formation_report<W: Write>(
    out: &mut W,
    teams: &[Team],
    statistics: &FormationStatistics,
    participants: &[Arc<Participant>],
) -> Result<()> {
    for team in teams {
        write!(out, "{}", team.detailed_summary()).context("Failed to write team roster")?;
        writeln!(out).context("Failed to write team roster")?;
    }

    writeln!(out, "Formation Statistics").context("Failed to write statistics")?;
    writeln!(out, "{}", statistics).context("Failed to write statistics")?;

    let unassigned: Vec<_> = participants.iter().filter(|p| !p.is_assigned()).collect();
    if !unassigned.is_empty() {
        writeln!(out, "\nUnassigned participants ({}):", unassigned.len())
            .context("Failed to write unassigned list")?;
        for p in unassigned {
            writeln!(out, "  {}", p.summary()).context("Failed to write unassigned list")?;
        }
    }

    let scores: Vec<i32> = participants.iter().map(|p| p.personality_score() as i32).collect();
    writeln!(out, "\n{}", classifier::distribution_summary(&scores)).context("Failed to write distribution")?;
    Ok(())
}

/// Tier, guidance, and progress for a single personality score
pub fn write_classification<W: Write>(out: &mut W, score: i32) -> crate::error::Result<()> {
    let tier = classifier::classify(score)?;

    let render = |out: &mut W| -> Result<()> {
        writeln!(out, "{}", classifier::describe(score))?;
        writeln!(out, "{}", classifier::role_recommendation(tier))?;
        match (classifier::next_tier(score), classifier::points_to_next_tier(score)) {
            (Some(next), Some(points)) => writeln!(out, "{} points to reach {}", points, next)?,
            _ => writeln!(out, "Top tier reached")?,
        }
        Ok(())
    };

    render(out)
        .context("Failed to write classification")
        .map_err(|e| crate::error::Error::Internal(format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility;
    use crate::engine::TeamFormationEngine;
    use crate::model::participant::tests::input;
    use crate::model::{Activity, Role};

    fn people() -> Vec<Arc<Participant>> {
        let roles = [Role::Strategist, Role::Attacker, Role::Defender, Role::Supporter, Role::Coordinator];
        (0..7)
            .map(|i| {
                let score = if i < 2 { 92 } else { 40 + i as i32 * 7 };
                let mut p = input(&format!("P{:03}", i + 1), score);
                p.preferred_role = roles[i % roles.len()];
                p.preferred_activity = Activity::ALL[i % Activity::ALL.len()];
                Arc::new(Participant::new(p).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_formation_report_lists_teams_and_leftovers() {
        let participants = people();
        let compatibility = compatibility::build_sequential(&participants);
        let mut pool = participants.clone();
        let team = crate::engine::build_team(1, 3, &mut pool, &compatibility, || Ok(()))
            .unwrap()
            .unwrap();
        let teams = vec![team];
        let stats = TeamFormationEngine::statistics(&teams);

        let mut buf = Vec::new();
        write_formation_report(&mut buf, &teams, &stats, &participants).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("TEAM-001"));
        assert!(text.contains("Teams formed:        1"));
        assert!(text.contains("Unassigned participants (4):"));
        assert!(text.contains("Personality Distribution (n=7)"));
    }

    #[test]
    fn test_classification_output() {
        let mut buf = Vec::new();
        write_classification(&mut buf, 85).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Balanced"));
        assert!(text.contains("5 points to reach Leader"));

        let mut buf = Vec::new();
        write_classification(&mut buf, 95).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("Top tier reached"));
    }

    #[test]
    fn test_classification_rejects_out_of_range() {
        let mut buf = Vec::new();
        assert!(write_classification(&mut buf, 101).is_err());
        assert!(buf.is_empty());
    }
}
