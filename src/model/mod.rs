//! Domain model: participants, teams and the closed sets that describe them

mod activity;
pub mod participant;
pub mod personality;
mod team;

pub use activity::{Activity, ActivityCategory, Role};
pub use participant::{Participant, ParticipantInput, UNASSIGNED};
pub use personality::PersonalityType;
pub use team::{team_id, team_name, Team, MAX_LEADERS_PER_TEAM, MIN_TEAM_SIZE};
