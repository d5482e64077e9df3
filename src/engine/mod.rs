//! Team formation engine
//!
//! Preconditions, leader selection, greedy fill under hard constraints, and
//! run statistics. Concurrent scheduling lives in [`crate::coordinator`].

mod formation;
pub mod selection;
mod stats;

pub(crate) use formation::{build_team, CandidatePool, LeaderPick};
pub use formation::{check_preconditions, planned_team_count, TeamFormationEngine};
pub use stats::FormationStatistics;
