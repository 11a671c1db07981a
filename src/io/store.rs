use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GymError, Result};
use crate::io::table::{self, LoadOutcome, RawTable};

/// Default file name of the member/instructor table.
pub const MEMBERS_FILE: &str = "members.txt";
/// Default file name of the class table.
pub const CLASSES_FILE: &str = "classes.txt";

/// The two tables the gym keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Members,
    Classes,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Members => write!(f, "members"),
            TableKind::Classes => write!(f, "classes"),
        }
    }
}

/// Storage backend for the raw tables.
pub trait RecordStore {
    /// Reads a whole table. A table that was never saved is empty.
    fn load(&self, kind: TableKind) -> Result<LoadOutcome>;

    /// Replaces a whole table.
    fn save(&self, kind: TableKind, table: &RawTable) -> Result<()>;

    /// Human readable location of a table, used in messages.
    fn describe(&self, kind: TableKind) -> String;
}

/// Tables kept as delimited text files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFileStore {
    members: PathBuf,
    classes: PathBuf,
}

impl FlatFileStore {
    pub fn new(members: impl Into<PathBuf>, classes: impl Into<PathBuf>) -> Self {
        Self {
            members: members.into(),
            classes: classes.into(),
        }
    }

    /// Uses the default file names inside `directory`.
    pub fn in_dir(directory: &Path) -> Self {
        Self::new(directory.join(MEMBERS_FILE), directory.join(CLASSES_FILE))
    }

    pub fn path(&self, kind: TableKind) -> &Path {
        match kind {
            TableKind::Members => &self.members,
            TableKind::Classes => &self.classes,
        }
    }
}

impl RecordStore for FlatFileStore {
    fn load(&self, kind: TableKind) -> Result<LoadOutcome> {
        table::load(self.path(kind))
    }

    fn save(&self, kind: TableKind, table: &RawTable) -> Result<()> {
        table::save(self.path(kind), table)
    }

    fn describe(&self, kind: TableKind) -> String {
        self.path(kind).display().to_string()
    }
}

/// In-memory tables, for tests and for embedding without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<TableKind, RawTable>>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table as if it had been saved before.
    pub fn with_table(self, kind: TableKind, table: RawTable) -> Self {
        self.tables.borrow_mut().insert(kind, table);
        self
    }

    /// Makes every following save fail with an I/O error until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Snapshot of a stored table, `None` if it was never saved.
    pub fn table(&self, kind: TableKind) -> Option<RawTable> {
        self.tables.borrow().get(&kind).cloned()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, kind: TableKind) -> Result<LoadOutcome> {
        Ok(match self.tables.borrow().get(&kind) {
            Some(table) => LoadOutcome {
                table: table.clone(),
                warnings: Vec::new(),
                existed: true,
            },
            None => LoadOutcome::default(),
        })
    }

    fn save(&self, kind: TableKind, table: &RawTable) -> Result<()> {
        if self.fail_saves.get() {
            return Err(GymError::Io(io::Error::other(format!(
                "{kind} table is read-only"
            ))));
        }
        self.tables.borrow_mut().insert(kind, table.clone());
        Ok(())
    }

    fn describe(&self, kind: TableKind) -> String {
        format!("memory:{kind}")
    }
}
