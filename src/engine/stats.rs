//! Aggregate statistics over a formation result

use std::fmt;

use serde::Serialize;

use crate::model::Team;

/// Summary of one formation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FormationStatistics {
    pub total_teams: usize,
    pub total_participants: usize,
    pub average_diversity: f64,
    pub average_balance: f64,
    pub average_overall: f64,
    pub max_overall: f64,
    pub min_overall: f64,
}

impl FormationStatistics {
    /// All zeros for an empty slice
    pub fn from_teams(teams: &[Team]) -> Self {
        if teams.is_empty() {
            return Self::default();
        }

        let n = teams.len() as f64;
        let overall = teams.iter().map(Team::overall_score);

        Self {
            total_teams: teams.len(),
            total_participants: teams.iter().map(Team::size).sum(),
            average_diversity: teams.iter().map(Team::diversity_score).sum::<f64>() / n,
            average_balance: teams.iter().map(Team::balance_score).sum::<f64>() / n,
            average_overall: overall.clone().sum::<f64>() / n,
            max_overall: overall.clone().fold(f64::MIN, f64::max),
            min_overall: overall.fold(f64::MAX, f64::min),
        }
    }
}

impl fmt::Display for FormationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Teams formed:        {}", self.total_teams)?;
        writeln!(f, "Participants placed: {}", self.total_participants)?;
        writeln!(f, "Average diversity:   {:.1}%", self.average_diversity * 100.0)?;
        writeln!(f, "Average balance:     {:.1}%", self.average_balance * 100.0)?;
        writeln!(f, "Average overall:     {:.1}%", self.average_overall * 100.0)?;
        writeln!(f, "Best team:           {:.1}%", self.max_overall * 100.0)?;
        write!(f, "Lowest team:         {:.1}%", self.min_overall * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::participant::tests::input;
    use crate::model::{Activity, Participant};
    use std::sync::Arc;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(FormationStatistics::from_teams(&[]), FormationStatistics::default());
    }

    #[test]
    fn test_aggregates() {
        let mut a = Team::numbered(1, 3).unwrap();
        let mut b = Team::numbered(2, 3).unwrap();
        for (i, score) in [95, 80, 50].into_iter().enumerate() {
            let mut inp = input(&format!("P{:03}", i + 1), score);
            inp.preferred_activity = Activity::ALL[i];
            a.add_member(Arc::new(Participant::new(inp).unwrap())).unwrap();
        }
        for (i, score) in [95, 96].into_iter().enumerate() {
            b.add_member(Arc::new(Participant::new(input(&format!("P{:03}", i + 10), score)).unwrap()))
                .unwrap();
        }

        let stats = FormationStatistics::from_teams(&[a.clone(), b.clone()]);
        assert_eq!(stats.total_teams, 2);
        assert_eq!(stats.total_participants, 5);
        assert_eq!(stats.max_overall, a.overall_score().max(b.overall_score()));
        assert_eq!(stats.min_overall, a.overall_score().min(b.overall_score()));
        let mean = (a.overall_score() + b.overall_score()) / 2.0;
        assert!((stats.average_overall - mean).abs() < 1e-12);
        assert!(stats.to_string().contains("Teams formed:        2"));
    }
}
