//! Typed view over the two tables.
//!
//! The store hands out raw `id -> fields` rows; this module gives them names.
//! The leading character of an id decides which schema applies, and rows that
//! do not fit their schema are carried verbatim so a load/save cycle never
//! loses data.

mod fees;
mod people;
mod schedule;

pub use fees::{FeeSchedule, MembershipType};
pub use people::{Directory, Instructor, Member, Record};
pub use schedule::{Schedule, Session};

/// Leading character of member ids.
pub const MEMBER_PREFIX: char = 'M';
/// Leading character of instructor ids.
pub const INSTRUCTOR_PREFIX: char = 'I';
/// Leading character of class ids.
pub const CLASS_PREFIX: char = 'C';

/// Drops empty fields past `keep`, the residue of trailing commas.
pub(crate) fn without_trailing_blanks(fields: &[String], keep: usize) -> &[String] {
    let mut end = fields.len();
    while end > keep && fields[end - 1].trim().is_empty() {
        end -= 1;
    }
    &fields[..end]
}

/// Record kinds of the unified member/instructor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Member,
    Instructor,
}

impl RecordKind {
    /// Resolves the kind from the prefix of an id.
    pub fn of(id: &str) -> Option<Self> {
        match id.chars().next() {
            Some(MEMBER_PREFIX) => Some(RecordKind::Member),
            Some(INSTRUCTOR_PREFIX) => Some(RecordKind::Instructor),
            _ => None,
        }
    }
}
