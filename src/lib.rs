//! FitMatch - personality-aware team formation
//!
//! Participants are loaded from CSV, classified into personality tiers, and
//! grouped into teams that each carry a leader and respect role, activity,
//! and leadership limits. Formation runs either on the calling thread or as
//! one task per team on a worker pool sharing a lock-guarded candidate pool.

pub mod classifier;
pub mod cli;
pub mod compatibility;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod report;

pub use config::FitmatchConfig;
pub use engine::{FormationStatistics, TeamFormationEngine};
pub use error::{Error, FormationError, Result};
pub use model::{Participant, ParticipantInput, PersonalityType, Team};
