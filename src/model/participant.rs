//! Participant records
//!
//! A participant is validated once at construction and then shared by
//! reference (`Arc<Participant>`) between the pool and the team that claims
//! it. Only the team assignment label is mutable after construction.

use std::fmt;
use std::sync::LazyLock;

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier;
use crate::error::{Error, Result};
use crate::model::{Activity, PersonalityType, Role};

/// Label carried by participants not on any team
pub const UNASSIGNED: &str = "Unassigned";

pub const MIN_AGE: i32 = 16;
pub const MAX_AGE: i32 = 80;
pub const MIN_SKILL: i32 = 1;
pub const MAX_SKILL: i32 = 10;

static PARTICIPANT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P\d{3,}$").expect("valid regex: participant id"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid regex: email")
});

/// Unvalidated participant fields, as read from a survey or CSV row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub preferred_activity: Activity,
    pub skill_level: i32,
    pub preferred_role: Role,
    pub personality_score: i32,
}

/// A validated club member
#[derive(Debug)]
pub struct Participant {
    id: String,
    name: String,
    email: String,
    age: u8,
    personality_score: u32,
    personality_type: PersonalityType,
    preferred_activity: Activity,
    skill_level: u8,
    preferred_role: Role,
    assigned_team: RwLock<String>,
}

impl Participant {
    /// Validate the input and build a participant
    pub fn new(input: ParticipantInput) -> Result<Self> {
        let id = validate_id(&input.id)?;
        let name = validate_name(&input.name)?;
        let email = validate_email(&input.email)?;
        validate_range("Age", input.age, MIN_AGE, MAX_AGE)?;
        validate_range("SkillLevel", input.skill_level, MIN_SKILL, MAX_SKILL)?;
        let personality_type = classifier::classify(input.personality_score)?;

        Ok(Self {
            id,
            name,
            email,
            age: input.age as u8,
            personality_score: input.personality_score as u32,
            personality_type,
            preferred_activity: input.preferred_activity,
            skill_level: input.skill_level as u8,
            preferred_role: input.preferred_role,
            assigned_team: RwLock::new(UNASSIGNED.to_string()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn personality_score(&self) -> u32 {
        self.personality_score
    }

    pub fn personality_type(&self) -> PersonalityType {
        self.personality_type
    }

    pub fn is_leader(&self) -> bool {
        self.personality_type == PersonalityType::Leader
    }

    pub fn preferred_activity(&self) -> Activity {
        self.preferred_activity
    }

    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    pub fn preferred_role(&self) -> Role {
        self.preferred_role
    }

    /// Name of the team this participant is on, or [`UNASSIGNED`]
    pub fn assigned_team(&self) -> String {
        self.assigned_team.read().clone()
    }

    pub fn is_assigned(&self) -> bool {
        *self.assigned_team.read() != UNASSIGNED
    }

    /// Only teams (and the engine's pre-run reset) move participants around.
    pub(crate) fn set_assigned_team(&self, team_name: &str) {
        *self.assigned_team.write() = team_name.to_string();
    }

    pub(crate) fn clear_assignment(&self) {
        self.set_assigned_team(UNASSIGNED);
    }

    /// Step function of the absolute skill difference
    pub fn skill_compatibility(&self, other: &Participant) -> f64 {
        match self.skill_level.abs_diff(other.skill_level) {
            0..=1 => 1.0,
            2 => 0.8,
            3 => 0.6,
            4 => 0.4,
            _ => 0.2,
        }
    }

    /// One-line table row used by the CLI report
    pub fn summary(&self) -> String {
        format!(
            "{:<6} | {:<18} | {:<8} | {:<12} | Skill:{:<2} | {:<12}",
            self.id,
            self.name,
            self.personality_type.display_name(),
            self.preferred_activity.display_name(),
            self.skill_level,
            self.preferred_role.display_name()
        )
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {}) {}/{}/skill {}",
            self.id,
            self.name,
            self.personality_type,
            self.personality_score,
            self.preferred_activity,
            self.preferred_role,
            self.skill_level
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Field Validation
// ─────────────────────────────────────────────────────────────────

fn validate_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation("ParticipantID", "cannot be empty"));
    }
    if !PARTICIPANT_ID.is_match(id) {
        return Err(Error::validation(
            "ParticipantID",
            format!("'{}' must follow format P### (e.g., P001, P012)", id),
        ));
    }
    Ok(id.to_string())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < 2 {
        return Err(Error::validation("Name", "must be at least 2 characters long"));
    }
    if len > 100 {
        return Err(Error::validation("Name", "cannot exceed 100 characters"));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if !EMAIL.is_match(email) {
        return Err(Error::EmailFormat {
            email: email.to_string(),
        });
    }
    Ok(email.to_lowercase())
}

fn validate_range(field: &str, value: i32, min: i32, max: i32) -> Result<()> {
    if value < min || value > max {
        return Err(Error::validation(
            field,
            format!("must be between {} and {}. Provided: {}", min, max, value),
        ));
    }
    Ok(())
}
