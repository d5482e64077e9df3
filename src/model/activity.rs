//! Preferred activities (games) and playing roles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Broad grouping of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Esport,
    Sport,
}

impl ActivityCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityCategory::Esport => "E-Sport",
            ActivityCategory::Sport => "Sport",
        }
    }
}

/// Activity a participant prefers to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Chess,
    Fifa,
    Basketball,
    CsGo,
    Dota,
    Valorant,
}

impl Activity {
    pub const ALL: [Activity; 6] = [
        Activity::Chess,
        Activity::Fifa,
        Activity::Basketball,
        Activity::CsGo,
        Activity::Dota,
        Activity::Valorant,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Activity::Chess => "Chess",
            Activity::Fifa => "FIFA",
            Activity::Basketball => "Basketball",
            Activity::CsGo => "CS:GO",
            Activity::Dota => "DOTA 2",
            Activity::Valorant => "Valorant",
        }
    }

    pub fn category(&self) -> ActivityCategory {
        match self {
            Activity::Chess | Activity::Basketball => ActivityCategory::Sport,
            Activity::Fifa | Activity::CsGo | Activity::Dota | Activity::Valorant => {
                ActivityCategory::Esport
            }
        }
    }

    pub fn recommended_team_size(&self) -> usize {
        match self {
            Activity::Chess | Activity::Fifa => 2,
            _ => 5,
        }
    }

    /// In-game positions specific to this activity
    pub fn positions(&self) -> &'static [&'static str] {
        match self {
            Activity::Chess => &["Strategic Player", "Tactical Player"],
            Activity::Fifa => &["Attacker", "Midfielder", "Defender", "Goalkeeper"],
            Activity::Basketball => &[
                "Point Guard",
                "Shooting Guard",
                "Small Forward",
                "Power Forward",
                "Center",
            ],
            Activity::CsGo => &["Entry Fragger", "AWPer", "Support", "Lurker", "IGL"],
            Activity::Dota => &["Carry", "Mid", "Offlane", "Support", "Hard Support"],
            Activity::Valorant => &["Duelist", "Controller", "Sentinel", "Initiator"],
        }
    }

    /// Key used in CSV output
    pub fn code(&self) -> &'static str {
        match self {
            Activity::Chess => "CHESS",
            Activity::Fifa => "FIFA",
            Activity::Basketball => "BASKETBALL",
            Activity::CsGo => "CSGO",
            Activity::Dota => "DOTA",
            Activity::Valorant => "VALORANT",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Activity {
    type Err = Error;

    /// Accepts display names and codes: "CS:GO", "csgo", "DOTA 2", "Dota"...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | ':' | '2'))
            .collect::<String>()
            .to_uppercase();

        Activity::ALL
            .into_iter()
            .find(|a| a.code() == normalized)
            .ok_or_else(|| {
                Error::validation(
                    "PreferredGame",
                    format!(
                        "unknown game type '{}' (valid: Chess, FIFA, Basketball, CS:GO, DOTA 2, Valorant)",
                        s.trim()
                    ),
                )
            })
    }
}

/// General playing role, applicable across activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Strategist,
    Attacker,
    Defender,
    Supporter,
    Coordinator,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Strategist,
        Role::Attacker,
        Role::Defender,
        Role::Supporter,
        Role::Coordinator,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Strategist => "Strategist",
            Role::Attacker => "Attacker",
            Role::Defender => "Defender",
            Role::Supporter => "Supporter",
            Role::Coordinator => "Coordinator",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::Strategist => "S",
            Role::Attacker => "A",
            Role::Defender => "D",
            Role::Supporter => "Su",
            Role::Coordinator => "C",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Strategist => "Focuses on tactics and planning",
            Role::Attacker => "Frontline player with offensive focus",
            Role::Defender => "Protective player focused on defense",
            Role::Supporter => "Jack-of-all-trades adapting to team needs",
            Role::Coordinator => "Communication lead keeping team organized",
        }
    }

    /// Two roles complement each other when they differ
    pub fn complements(&self, other: Role) -> bool {
        *self != other
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(' ', "").to_uppercase();

        Role::ALL
            .into_iter()
            .find(|r| r.display_name().to_uppercase() == normalized)
            .ok_or_else(|| {
                Error::validation(
                    "PreferredRole",
                    format!(
                        "unknown role '{}' (valid: Strategist, Attacker, Defender, Supporter, Coordinator)",
                        s.trim()
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_parsing_is_lenient() {
        assert_eq!("CS:GO".parse::<Activity>().unwrap(), Activity::CsGo);
        assert_eq!("csgo".parse::<Activity>().unwrap(), Activity::CsGo);
        assert_eq!("DOTA 2".parse::<Activity>().unwrap(), Activity::Dota);
        assert_eq!(" Valorant ".parse::<Activity>().unwrap(), Activity::Valorant);
        assert_eq!("basketball".parse::<Activity>().unwrap(), Activity::Basketball);
        assert!("Tetris".parse::<Activity>().is_err());
    }

    #[test]
    fn test_activity_categories() {
        assert_eq!(Activity::Chess.category(), ActivityCategory::Sport);
        assert_eq!(Activity::Valorant.category(), ActivityCategory::Esport);
        assert_eq!(Activity::Basketball.recommended_team_size(), 5);
        assert_eq!(Activity::Fifa.positions().len(), 4);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("strategist".parse::<Role>().unwrap(), Role::Strategist);
        assert_eq!("COORDINATOR".parse::<Role>().unwrap(), Role::Coordinator);
        assert!("Goalie".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_complements() {
        assert!(Role::Attacker.complements(Role::Defender));
        assert!(!Role::Attacker.complements(Role::Attacker));
    }
}
