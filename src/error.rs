use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationError;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, GymError>;

/// Failures that abort the current operation.
///
/// Data-quality problems found while reading the tables are not errors; they
/// are reported as [`Warning`] values next to the result instead.
#[derive(Debug, Error)]
pub enum GymError {
    /// Wrapper for IO failures such as reading or writing table files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the delimited-text codec fails at the I/O level.
    #[error("table codec error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a report cannot be serialised to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a table needed by a report does not exist yet.
    #[error("table file not found: {0}")]
    MissingTable(PathBuf),

    /// Raised when an operator supplied value fails validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Raised when a member id does not name a member record.
    #[error("unknown member id '{0}'")]
    UnknownMember(String),

    /// Raised when a class id does not name a class row.
    #[error("unknown session id '{0}'")]
    UnknownSession(String),

    /// Raised when a new record would reuse an existing id.
    #[error("id '{0}' is already in use")]
    DuplicateId(String),

    /// Raised when a member is already registered for the selected class.
    #[error("member {member_id} is already registered for {class_id}")]
    AlreadyRegistered { member_id: String, class_id: String },

    /// Raised when every four digit suffix for a prefix is taken.
    #[error("no free ids left for prefix '{0}'")]
    IdSpaceExhausted(char),

    /// Raised when a check-in is committed before both selections are made.
    #[error("check-in is not ready to commit: {0}")]
    IncompleteCheckIn(&'static str),

    /// Raised when the operator runs out of login attempts.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Raised when the console input ends while a prompt is waiting.
    #[error("input closed while waiting for {0}")]
    InputClosed(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Recoverable data-quality findings collected while loading tables or
/// deriving reports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    /// A line that could not be turned into a keyed row.
    #[error("line {line}: skipped malformed row ({reason})")]
    MalformedRow { line: u64, reason: String },

    /// A later row replaced an earlier row with the same id.
    #[error("line {line}: duplicate id '{id}', keeping the later row")]
    DuplicateId { line: u64, id: String },

    /// A row whose fields do not fit the schema implied by its id.
    #[error("record '{id}' kept verbatim: {reason}")]
    UnrecognisedRecord { id: String, reason: String },

    /// A registration naming a class row that exists but could not be read.
    #[error("client {member_id}: class {class_id} is unreadable and was left out")]
    UnreadableClass { member_id: String, class_id: String },

    /// A class whose cost is not a non-negative number.
    #[error("class {class_id}: cost '{raw}' is not a valid amount, using 0.00")]
    UnparsableCost { class_id: String, raw: String },

    /// A member whose membership type has no entry in the fee schedule.
    #[error("unknown membership type '{membership_type}' for client {member_id}")]
    UnknownMembershipType {
        member_id: String,
        membership_type: String,
    },
}
