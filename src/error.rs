//! Error types for FitMatch
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for the CLI
//!
//! Formation preconditions live in their own [`FormationError`] so callers can
//! match on them without caring about I/O or configuration failures.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for FitMatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO / data load errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,
    DataLoad = 210,
    DataEmpty = 211,

    // Validation errors (3xx)
    ValidationFailed = 300,
    EmailFormat = 301,
    ScoreOutOfRange = 302,
    InvalidInput = 303,

    // Formation errors (4xx)
    EmptyPool = 400,
    TeamSizeTooSmall = 401,
    InsufficientParticipants = 402,
    NoLeaders = 403,
    MembershipRejected = 410,

    // Concurrency errors (5xx)
    ExecutionFailed = 500,
    ExecutionTimeout = 501,
    ExecutionCancelled = 502,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Validation errors
            400..=499 => 40, // Formation errors
            500..=599 => 50, // Concurrency errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Precondition failures of a formation run.
///
/// All of these are detected before any work is scheduled on the pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormationError {
    #[error("Participant list cannot be empty")]
    EmptyPool,

    #[error("Team size must be at least {minimum} (requested {requested})")]
    TeamSizeTooSmall { minimum: usize, requested: usize },

    #[error("Not enough participants ({available}) for team size {required}")]
    InsufficientParticipants { required: usize, available: usize },

    #[error("Cannot form teams: no leaders available. Each team requires at least 1 leader")]
    NoLeaders,
}

/// Why a team refused an add/remove request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRejection {
    /// Team already holds `target_size` members
    TeamFull,
    /// Participant is already a member
    AlreadyMember,
    /// Team already holds the maximum number of leaders
    LeaderLimit,
    /// Participant is not a member (remove only)
    NotMember,
}

impl fmt::Display for MembershipRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MembershipRejection::TeamFull => "team is full",
            MembershipRejection::AlreadyMember => "participant is already a member",
            MembershipRejection::LeaderLimit => "team already has the maximum number of leaders",
            MembershipRejection::NotMember => "participant is not a member",
        };
        f.write_str(text)
    }
}

/// Main error type for FitMatch
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO / Data Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV data could not be loaded
    #[error("Failed to load data from {path}: {message}")]
    DataLoad {
        path: String,
        line: Option<u64>,
        message: String,
    },

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// A participant field failed validation
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Malformed email address
    #[error("Invalid email format: {email}")]
    EmailFormat { email: String },

    /// Personality score outside the survey range
    #[error("Personality score must be between {min} and {max}. Received: {score}")]
    OutOfRangeScore { score: i32, min: u32, max: u32 },

    /// Malformed survey responses or other caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ─────────────────────────────────────────────────────────────
    // Formation Errors
    // ─────────────────────────────────────────────────────────────

    /// Formation preconditions not met
    #[error(transparent)]
    Formation(#[from] FormationError),

    /// Team rejected a membership change
    #[error("Team {team_id} rejected {participant_id}: {reason}")]
    MembershipRejected {
        team_id: String,
        participant_id: String,
        reason: MembershipRejection,
    },

    // ─────────────────────────────────────────────────────────────
    // Concurrency Errors
    // ─────────────────────────────────────────────────────────────

    /// A unit of work failed or was aborted
    #[error("Concurrent execution failed: {message}")]
    Concurrency { message: String },

    /// A unit of work exceeded its deadline
    #[error("{unit} timed out after {timeout_secs}s")]
    TaskTimeout { unit: String, timeout_secs: u64 },

    /// Work was cancelled before it finished
    #[error("Cancelled: {0}")]
    Cancelled(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::IoWrite,
            Error::DataLoad { line: None, .. } => ErrorCode::DataEmpty,
            Error::DataLoad { .. } => ErrorCode::DataLoad,
            Error::Csv(_) => ErrorCode::DataLoad,

            Error::Validation { .. } => ErrorCode::ValidationFailed,
            Error::EmailFormat { .. } => ErrorCode::EmailFormat,
            Error::OutOfRangeScore { .. } => ErrorCode::ScoreOutOfRange,
            Error::InvalidInput(_) => ErrorCode::InvalidInput,

            Error::Formation(e) => match e {
                FormationError::EmptyPool => ErrorCode::EmptyPool,
                FormationError::TeamSizeTooSmall { .. } => ErrorCode::TeamSizeTooSmall,
                FormationError::InsufficientParticipants { .. } => {
                    ErrorCode::InsufficientParticipants
                }
                FormationError::NoLeaders => ErrorCode::NoLeaders,
            },
            Error::MembershipRejected { .. } => ErrorCode::MembershipRejected,

            Error::Concurrency { .. } => ErrorCode::ExecutionFailed,
            Error::TaskTimeout { .. } => ErrorCode::ExecutionTimeout,
            Error::Cancelled(_) => ErrorCode::ExecutionCancelled,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error came from participant validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::EmailFormat { .. }
                | Error::OutOfRangeScore { .. }
                | Error::InvalidInput(_)
        )
    }

    /// Check if a caller-level retry could reasonably succeed.
    ///
    /// Nothing in the crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Concurrency { .. } | Error::TaskTimeout { .. } | Error::Cancelled(_)
        )
    }

    /// Get the formation precondition, if this is one
    pub fn as_formation(&self) -> Option<&FormationError> {
        match self {
            Error::Formation(e) => Some(e),
            _ => None,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'fitmatch config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'fitmatch config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::DataLoad { .. } => Some(
                "Expected columns: ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType. Run 'fitmatch sample' for an example file."
            ),
            Error::EmailFormat { .. } => Some(
                "Emails must look like username@domain.com."
            ),
            Error::OutOfRangeScore { .. } => Some(
                "Personality scores come from 5 survey answers (1-5) multiplied by 4, so they range from 20 to 100."
            ),

            Error::Formation(FormationError::TeamSizeTooSmall { .. }) => Some(
                "Use a team size of 3 or more."
            ),
            Error::Formation(FormationError::InsufficientParticipants { .. }) => Some(
                "Lower the team size or load more participants."
            ),
            Error::Formation(FormationError::NoLeaders) => Some(
                "At least one participant needs a personality score of 90 or higher."
            ),

            Error::TaskTimeout { .. } => Some(
                "Increase 'unit_timeout_secs' in the [formation] section, or rerun with --sequential."
            ),
            Error::Concurrency { .. } | Error::Cancelled(_) => Some(
                "Rerun the formation, or use --sequential to avoid the worker pool."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a participant field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a data load error tied to a source line
    pub fn data_load(path: impl Into<String>, line: Option<u64>, message: impl Into<String>) -> Self {
        Error::DataLoad {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a concurrency failure
    pub fn concurrency(message: impl Into<String>) -> Self {
        Error::Concurrency {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
