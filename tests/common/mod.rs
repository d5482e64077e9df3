//! Common test utilities and fixtures
//!
//! Participants are built through the public `ParticipantInput` API so every
//! fixture passes the same validation as CSV rows.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fitmatch::config::FormationSettings;
use fitmatch::model::{Activity, Participant, ParticipantInput, Role};

/// Build one validated participant
pub fn participant(number: usize, score: i32, activity: Activity, role: Role, skill: i32) -> Arc<Participant> {
    let input = ParticipantInput {
        id: format!("P{:03}", number),
        name: format!("Player {}", number),
        email: format!("player{}@university.edu", number),
        age: 21,
        preferred_activity: activity,
        skill_level: skill,
        preferred_role: role,
        personality_score: score,
    };
    Arc::new(Participant::new(input).unwrap())
}

/// `count` participants cycling through activities, roles, and all three tiers.
///
/// Every fifth participant is a leader (score 90-99).
pub fn mixed_pool(count: usize) -> Vec<Arc<Participant>> {
    (0..count)
        .map(|i| {
            let score = match i % 5 {
                0 => 90 + (i % 10) as i32,
                1 | 2 => 70 + (i % 20) as i32,
                _ => 20 + ((i * 7) % 50) as i32,
            };
            participant(
                i + 1,
                score,
                Activity::ALL[i % Activity::ALL.len()],
                Role::ALL[i % Role::ALL.len()],
                (i % 10) as i32 + 1,
            )
        })
        .collect()
}

/// `count` participants none of whom reach the leader band
pub fn leaderless_pool(count: usize) -> Vec<Arc<Participant>> {
    (0..count)
        .map(|i| {
            participant(
                i + 1,
                30 + ((i * 11) % 60) as i32,
                Activity::ALL[i % Activity::ALL.len()],
                Role::ALL[i % Role::ALL.len()],
                5,
            )
        })
        .collect()
}

/// Formation settings sized for tests
pub fn test_settings(threads: usize) -> FormationSettings {
    FormationSettings {
        worker_threads: threads,
        shutdown_grace_secs: 1,
        ..Default::default()
    }
}

/// Participant CSV with the standard header and the given rows
pub fn write_participant_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let mut content = String::from(
        "ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType\n",
    );
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
