//! Teams and their membership rules

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, MembershipRejection, Result};
use crate::metrics::TeamMetrics;
use crate::model::{Activity, Participant, PersonalityType, Role};

/// Smallest team that counts as formed
pub const MIN_TEAM_SIZE: usize = 3;
/// Most leaders a single team may hold
pub const MAX_LEADERS_PER_TEAM: usize = 2;

/// Call signs cycled through when naming teams
const TEAM_NAMES: [&str; 25] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliet",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Phoenix", "Titans", "Legends", "Storm", "Thunder",
];

/// Id for the n-th team of a run (1-based): `TEAM-001`
pub fn team_id(team_number: usize) -> String {
    format!("TEAM-{:03}", team_number)
}

/// Name for the n-th team of a run (1-based)
pub fn team_name(team_number: usize) -> &'static str {
    TEAM_NAMES[team_number.saturating_sub(1) % TEAM_NAMES.len()]
}

/// A team being formed or already formed.
///
/// Members keep insertion order. Metrics are recomputed after every
/// successful add or remove.
#[derive(Debug, Clone)]
pub struct Team {
    id: String,
    name: String,
    target_size: usize,
    members: Vec<Arc<Participant>>,
    metrics: TeamMetrics,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target_size: usize) -> Result<Self> {
        let id = id.into().trim().to_string();
        let name = name.into().trim().to_string();

        if id.is_empty() {
            return Err(Error::validation("TeamID", "cannot be empty"));
        }
        if name.is_empty() {
            return Err(Error::validation("TeamName", "cannot be empty"));
        }
        if target_size < MIN_TEAM_SIZE {
            return Err(Error::validation(
                "TargetSize",
                format!("team size must be at least {}", MIN_TEAM_SIZE),
            ));
        }

        Ok(Self {
            id,
            name,
            target_size,
            members: Vec::with_capacity(target_size),
            metrics: TeamMetrics::default(),
        })
    }

    /// Create the n-th team of a run with its standard id and name
    pub fn numbered(team_number: usize, target_size: usize) -> Result<Self> {
        Self::new(team_id(team_number), team_name(team_number), target_size)
    }

    /// Add a member, tagging them with this team's name
    pub fn add_member(&mut self, participant: Arc<Participant>) -> Result<()> {
        let reason = if self.is_full() {
            Some(MembershipRejection::TeamFull)
        } else if self.contains(participant.id()) {
            Some(MembershipRejection::AlreadyMember)
        } else if participant.is_leader() && self.leader_count() >= MAX_LEADERS_PER_TEAM {
            Some(MembershipRejection::LeaderLimit)
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(Error::MembershipRejected {
                team_id: self.id.clone(),
                participant_id: participant.id().to_string(),
                reason,
            });
        }

        participant.set_assigned_team(&self.name);
        self.members.push(participant);
        self.recompute();
        Ok(())
    }

    /// Remove a member by id, returning them to the unassigned state
    pub fn remove_member(&mut self, participant_id: &str) -> Result<Arc<Participant>> {
        let index = self
            .members
            .iter()
            .position(|p| p.id() == participant_id)
            .ok_or_else(|| Error::MembershipRejected {
                team_id: self.id.clone(),
                participant_id: participant_id.to_string(),
                reason: MembershipRejection::NotMember,
            })?;

        let participant = self.members.remove(index);
        participant.clear_assignment();
        self.recompute();
        Ok(participant)
    }

    /// Drop every member and release their assignments
    pub(crate) fn release_all(&mut self) {
        for p in self.members.drain(..) {
            p.clear_assignment();
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.metrics = TeamMetrics::compute(&self.members);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Arc<Participant>] {
        &self.members
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.members.iter().any(|p| p.id() == participant_id)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.target_size
    }

    pub fn remaining_spots(&self) -> usize {
        self.target_size.saturating_sub(self.members.len())
    }

    /// At least the minimum size and at least one leader
    pub fn is_complete(&self) -> bool {
        self.members.len() >= MIN_TEAM_SIZE && self.has_personality(PersonalityType::Leader)
    }

    /// At least the minimum size with one or two leaders
    pub fn is_valid(&self) -> bool {
        let leaders = self.leader_count();
        self.members.len() >= MIN_TEAM_SIZE && (1..=MAX_LEADERS_PER_TEAM).contains(&leaders)
    }

    pub fn has_personality(&self, tier: PersonalityType) -> bool {
        self.members.iter().any(|p| p.personality_type() == tier)
    }

    pub fn personality_count(&self, tier: PersonalityType) -> usize {
        self.members.iter().filter(|p| p.personality_type() == tier).count()
    }

    pub fn leader_count(&self) -> usize {
        self.personality_count(PersonalityType::Leader)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.members.iter().any(|p| p.preferred_role() == role)
    }

    pub fn role_count(&self, role: Role) -> usize {
        self.members.iter().filter(|p| p.preferred_role() == role).count()
    }

    pub fn has_activity(&self, activity: Activity) -> bool {
        self.members.iter().any(|p| p.preferred_activity() == activity)
    }

    pub fn activity_count(&self, activity: Activity) -> usize {
        self.members.iter().filter(|p| p.preferred_activity() == activity).count()
    }

    pub fn average_skill(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|p| p.skill_level() as f64).sum::<f64>() / self.members.len() as f64
    }

    pub fn unique_activities(&self) -> HashSet<Activity> {
        self.members.iter().map(|p| p.preferred_activity()).collect()
    }

    pub fn unique_roles(&self) -> HashSet<Role> {
        self.members.iter().map(|p| p.preferred_role()).collect()
    }

    pub fn unique_personalities(&self) -> HashSet<PersonalityType> {
        self.members.iter().map(|p| p.personality_type()).collect()
    }

    pub fn metrics(&self) -> TeamMetrics {
        self.metrics
    }

    pub fn diversity_score(&self) -> f64 {
        self.metrics.diversity
    }

    pub fn balance_score(&self) -> f64 {
        self.metrics.balance
    }

    pub fn overall_score(&self) -> f64 {
        self.metrics.overall()
    }

    /// Multi-line roster for terminal output
    pub fn detailed_summary(&self) -> String {
        let rule = "=".repeat(64);
        let mut out = String::new();
        out.push_str(&format!("{}\n TEAM: {:<20} ID: {}\n{}\n", rule, self.name, self.id, rule));
        out.push_str(&format!(
            " Members: {}/{}   Diversity: {:.1}%   Balance: {:.1}%   Overall: {:.1}%\n{}\n",
            self.size(),
            self.target_size,
            self.diversity_score() * 100.0,
            self.balance_score() * 100.0,
            self.overall_score() * 100.0,
            rule
        ));
        for p in &self.members {
            out.push_str(&format!(
                "  - {} ({}) - {}, {}, Skill:{}\n",
                p.name(),
                p.personality_type(),
                p.preferred_role(),
                p.preferred_activity(),
                p.skill_level()
            ));
        }
        out.push_str(&format!("{}\n Roles: {}\n", rule, self.role_breakdown()));
        out.push_str(&format!(
            " Coverage: {} activities, {} roles, {} personality types\n",
            self.unique_activities().len(),
            self.unique_roles().len(),
            self.unique_personalities().len()
        ));
        out.push_str(&format!(
            " Leaders: {} (Min:1, Max:{})\n{}\n",
            self.leader_count(),
            MAX_LEADERS_PER_TEAM,
            rule
        ));
        out
    }

    /// Roles present on the team with their counts, e.g. `Strategist x2, Defender x1`
    pub fn role_breakdown(&self) -> String {
        let parts: Vec<String> = Role::ALL
            .iter()
            .map(|&role| (role, self.role_count(role)))
            .filter(|&(_, count)| count > 0)
            .map(|(role, count)| format!("{} x{}", role.display_name(), count))
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Team[{} - {}] Size: {}/{}, Diversity: {:.2}%, Balance: {:.2}%",
            self.id,
            self.name,
            self.size(),
            self.target_size,
            self.diversity_score() * 100.0,
            self.balance_score() * 100.0
        )
    }
}
