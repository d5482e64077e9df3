//! Participant and team files
//!
//! Participants are read from CSV with the columns
//! `ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType`.
//! Rows that fail to parse or validate are skipped with a warning; a file
//! with no usable rows is an error. Teams are written as CSV or as a JSON
//! report with run statistics.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::FormationStatistics;
use crate::error::{Error, Result};
use crate::model::{Activity, Participant, ParticipantInput, PersonalityType, Role, Team};

/// Participant CSV header
pub const PARTICIPANT_HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "PreferredGame",
    "SkillLevel",
    "PreferredRole",
    "PersonalityScore",
    "PersonalityType",
];

/// Team CSV header
pub const TEAM_HEADER: [&str; 9] = [
    "TeamID",
    "TeamName",
    "TargetSize",
    "CurrentSize",
    "MemberIDs",
    "MemberNames",
    "DiversityScore",
    "BalanceScore",
    "OverallScore",
];

/// Age assumed for CSV participants, which carry no age column
pub const DEFAULT_AGE: i32 = 20;

const SAMPLE_ROWS: [&str; 20] = [
    "P001,Alex Chen,alex.chen@university.edu,VALORANT,8,Strategist,95,LEADER",
    "P002,Sarah Johnson,sarah.j@university.edu,FIFA,6,Attacker,80,BALANCED",
    "P003,Mike Williams,mike.w@university.edu,FIFA,5,Defender,66,THINKER",
    "P004,Emma Davis,emma.d@university.edu,Basketball,7,Supporter,91,LEADER",
    "P005,James Brown,james.b@university.edu,CS:GO,9,Coordinator,82,BALANCED",
    "P006,Lisa Anderson,lisa.a@university.edu,CS:GO,3,Strategist,57,THINKER",
    "P007,David Lee,david.l@university.edu,DOTA 2,6,Attacker,93,LEADER",
    "P008,Amy Taylor,amy.t@university.edu,Valorant,8,Defender,81,BALANCED",
    "P009,Chris Martin,chris.m@university.edu,CS:GO,5,Supporter,62,THINKER",
    "P010,Rachel White,rachel.w@university.edu,Valorant,7,Coordinator,96,LEADER",
    "P011,Tom Wilson,tom.w@university.edu,Basketball,6,Strategist,84,BALANCED",
    "P012,Sophie Clark,sophie.c@university.edu,DOTA 2,4,Attacker,63,THINKER",
    "P013,Daniel Kim,daniel.k@university.edu,DOTA 2,5,Defender,97,LEADER",
    "P014,Olivia Hall,olivia.h@university.edu,FIFA,4,Supporter,73,BALANCED",
    "P015,Ryan Scott,ryan.s@university.edu,DOTA 2,7,Coordinator,66,THINKER",
    "P016,Grace Lee,grace.l@university.edu,CS:GO,6,Strategist,90,LEADER",
    "P017,Kevin Park,kevin.p@university.edu,CS:GO,8,Attacker,77,BALANCED",
    "P018,Hannah Adams,hannah.a@university.edu,FIFA,4,Defender,51,THINKER",
    "P019,Jason Miller,jason.m@university.edu,FIFA,7,Supporter,95,LEADER",
    "P020,Chloe Turner,chloe.t@university.edu,Basketball,5,Coordinator,82,BALANCED",
];

// ─────────────────────────────────────────────────────────────────
// Output Format
// ─────────────────────────────────────────────────────────────────

/// File format for formed teams
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::config_field_invalid(
                "data.format",
                format!("unknown output format '{}' (expected csv or json)", other),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Reading Participants
// ─────────────────────────────────────────────────────────────────

/// Load and validate participants from a CSV file
pub fn read_participants(path: impl AsRef<Path>) -> Result<Vec<Arc<Participant>>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::data_load(
            path.display().to_string(),
            None,
            "file not found",
        ));
    }

    info!(path = %path.display(), "Loading participants");
    let file = File::open(path).map_err(|source| Error::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_participants(file, &path.display().to_string())
}

/// Parse participants from any CSV source; `source` names it in errors and logs
pub fn parse_participants<R: Read>(reader: R, source: &str) -> Result<Vec<Arc<Participant>>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = csv
        .headers()
        .map_err(|e| Error::data_load(source, Some(1), e.to_string()))?;
    if header.iter().all(str::is_empty) {
        return Err(Error::data_load(source, Some(1), "CSV is empty or has no header"));
    }

    let mut participants = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for result in csv.records() {
        let (line, parsed) = match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                if record.iter().all(str::is_empty) {
                    continue;
                }
                (line, parse_record(&record).and_then(Participant::new))
            }
            Err(e) => (e.position().map_or(0, |p| p.line()), Err(Error::from(e))),
        };

        match parsed {
            Ok(participant) if !seen.insert(participant.id().to_string()) => {
                skipped += 1;
                warn!(source, line, id = %participant.id(), "Skipping duplicate participant id");
            }
            Ok(participant) => {
                debug!(source, line, name = %participant.name(), "Parsed participant");
                participants.push(Arc::new(participant));
            }
            Err(e) => {
                skipped += 1;
                warn!(source, line, error = %e, "Skipping invalid line");
            }
        }
    }

    info!(source, loaded = participants.len(), skipped, "Participants loaded");

    if participants.is_empty() {
        return Err(Error::data_load(source, None, "No valid participants found"));
    }
    Ok(participants)
}

fn parse_record(record: &StringRecord) -> Result<ParticipantInput> {
    if record.len() < PARTICIPANT_HEADER.len() {
        return Err(Error::validation(
            "Record",
            format!("expected {} fields, found {}", PARTICIPANT_HEADER.len(), record.len()),
        ));
    }

    let field = |i: usize| record.get(i).unwrap_or_default();

    Ok(ParticipantInput {
        id: field(0).to_string(),
        name: field(1).to_string(),
        email: field(2).to_string(),
        age: DEFAULT_AGE,
        preferred_activity: field(3).parse::<Activity>()?,
        skill_level: parse_number("SkillLevel", field(4))?,
        preferred_role: field(5).parse::<Role>()?,
        personality_score: parse_number("PersonalityScore", field(6))?,
    })
}

fn parse_number(name: &str, value: &str) -> Result<i32> {
    value
        .parse()
        .map_err(|_| Error::validation(name, format!("invalid number format: '{}'", value)))
}

// ─────────────────────────────────────────────────────────────────
// Writing Teams
// ─────────────────────────────────────────────────────────────────

/// Write one CSV row per non-empty team
pub fn write_teams_csv(teams: &[Team], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_teams_csv_to(teams, file)?;
    info!(path = %path.display(), teams = written, "Teams written as CSV");
    Ok(())
}

/// CSV rows for `teams` into any writer, returning how many were written
pub fn write_teams_csv_to<W: io::Write>(teams: &[Team], writer: W) -> Result<usize> {
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(TEAM_HEADER)?;

    let mut written = 0;
    for team in teams.iter().filter(|t| t.size() > 0) {
        let ids: Vec<&str> = team.members().iter().map(|p| p.id()).collect();
        let names: Vec<&str> = team.members().iter().map(|p| p.name()).collect();
        csv.write_record([
            team.id().to_string(),
            team.name().to_string(),
            team.target_size().to_string(),
            team.size().to_string(),
            ids.join(";"),
            names.join(";"),
            format!("{:.4}", team.diversity_score()),
            format!("{:.4}", team.balance_score()),
            format!("{:.4}", team.overall_score()),
        ])?;
        written += 1;
    }

    csv.flush()?;
    Ok(written)
}

/// A member as it appears in the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub personality_type: PersonalityType,
    pub personality_score: u32,
    pub preferred_activity: Activity,
    pub preferred_role: Role,
    pub skill_level: u8,
}

/// A team as it appears in the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub target_size: usize,
    pub current_size: usize,
    pub diversity_score: f64,
    pub balance_score: f64,
    pub overall_score: f64,
    pub unique_activities: usize,
    pub unique_roles: usize,
    pub unique_personalities: usize,
    /// Members per role, roles absent from the team omitted
    pub role_counts: BTreeMap<String, usize>,
    pub members: Vec<MemberRecord>,
}

impl From<&Team> for TeamRecord {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id().to_string(),
            name: team.name().to_string(),
            target_size: team.target_size(),
            current_size: team.size(),
            diversity_score: team.diversity_score(),
            balance_score: team.balance_score(),
            overall_score: team.overall_score(),
            unique_activities: team.unique_activities().len(),
            unique_roles: team.unique_roles().len(),
            unique_personalities: team.unique_personalities().len(),
            role_counts: Role::ALL
                .iter()
                .map(|&role| (role.display_name().to_string(), team.role_count(role)))
                .filter(|&(_, count)| count > 0)
                .collect(),
            members: team
                .members()
                .iter()
                .map(|p| MemberRecord {
                    id: p.id().to_string(),
                    name: p.name().to_string(),
                    email: p.email().to_string(),
                    personality_type: p.personality_type(),
                    personality_score: p.personality_score(),
                    preferred_activity: p.preferred_activity(),
                    preferred_role: p.preferred_role(),
                    skill_level: p.skill_level(),
                })
                .collect(),
        }
    }
}

/// JSON report of a formation run
#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub generated_at: DateTime<Utc>,
    pub statistics: FormationStatistics,
    pub teams: Vec<TeamRecord>,
}

impl TeamReport {
    pub fn new(teams: &[Team]) -> Self {
        Self {
            generated_at: Utc::now(),
            statistics: FormationStatistics::from_teams(teams),
            teams: teams.iter().filter(|t| t.size() > 0).map(TeamRecord::from).collect(),
        }
    }
}

/// Write teams plus run statistics as pretty-printed JSON
pub fn write_teams_json(teams: &[Team], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let report = TeamReport::new(teams);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json).map_err(|source| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), teams = report.teams.len(), "Teams written as JSON");
    Ok(())
}

/// Write teams in the requested format
pub fn write_teams(teams: &[Team], path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_teams_csv(teams, path),
        OutputFormat::Json => write_teams_json(teams, path),
    }
}

// ─────────────────────────────────────────────────────────────────
// Sample Data
// ─────────────────────────────────────────────────────────────────

/// Write the 20-participant sample CSV, returning the number of rows
pub fn write_sample(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut content = PARTICIPANT_HEADER.join(",");
    content.push('\n');
    for row in SAMPLE_ROWS {
        content.push_str(row);
        content.push('\n');
    }

    std::fs::write(path, content).map_err(|source| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = SAMPLE_ROWS.len(), "Sample CSV created");
    Ok(SAMPLE_ROWS.len())
}
