use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, File};
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use rand::Rng;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{GymError, Result, Warning};

/// Fields of one row, without the leading id.
pub type Row = Vec<String>;

/// A table as stored on disk: id -> remaining fields.
pub type RawTable = BTreeMap<String, Row>;

const ID_SUFFIX_MIN: u32 = 1000;
const ID_SUFFIX_MAX: u32 = 9999;
const RANDOM_ID_ATTEMPTS: usize = 64;

/// Result of reading a table file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub table: RawTable,
    pub warnings: Vec<Warning>,
    /// `false` when the backing file did not exist.
    pub existed: bool,
}

/// Anything that can answer whether an id is already taken.
pub trait IdSet {
    fn contains_id(&self, id: &str) -> bool;
}

impl<V> IdSet for BTreeMap<String, V> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}

impl IdSet for BTreeSet<String> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl IdSet for HashSet<String> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Reads a table file into memory.
///
/// A missing file is an empty table. Blank lines are skipped, rows with an
/// empty id are skipped with a warning, and a repeated id keeps the later
/// row. Only I/O failures are returned as errors.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<LoadOutcome> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("table file absent, starting empty");
            return Ok(LoadOutcome::default());
        }
        Err(error) => return Err(error.into()),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut outcome = LoadOutcome {
        existed: true,
        ..LoadOutcome::default()
    };

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                let line = error
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(index as u64 + 1);
                outcome.warnings.push(Warning::MalformedRow {
                    line,
                    reason: error.to_string(),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 1);

        let mut fields = record.iter().map(str::to_string);
        let id = fields.next().unwrap_or_default();
        if id.trim().is_empty() {
            outcome.warnings.push(Warning::MalformedRow {
                line,
                reason: "row has no id".to_string(),
            });
            continue;
        }

        if outcome.table.insert(id.clone(), fields.collect()).is_some() {
            outcome.warnings.push(Warning::DuplicateId { line, id });
        }
    }

    for warning in &outcome.warnings {
        warn!(%warning, "table row skipped or replaced");
    }
    info!(row_count = outcome.table.len(), "table loaded");
    Ok(outcome)
}

/// Replaces the table file with the given rows, one `id,field,...` line per
/// entry in ascending id order.
///
/// The rows are written to a temporary file next to the target which is then
/// renamed over it, so a failure part way through leaves the previous file
/// untouched. An existing file's permissions carry over to the replacement.
/// Values containing commas or quotes are double-quoted.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = table.len()))]
pub fn save(path: &Path, table: &RawTable) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;

    let mut staging = NamedTempFile::new_in(directory)?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(staging.as_file_mut());
        for (id, fields) in table {
            writer.write_record(std::iter::once(id).chain(fields.iter()))?;
        }
        writer.flush()?;
    }
    if let Ok(existing) = fs::metadata(path) {
        staging.as_file().set_permissions(existing.permissions())?;
    }
    staging.as_file_mut().sync_all()?;
    staging.persist(path).map_err(|error| GymError::Io(error.error))?;

    info!("table saved");
    Ok(())
}

/// Produces `prefix` followed by four digits in 1000..=9999 that `existing`
/// does not contain yet.
///
/// Random candidates are tried first; when the space is nearly full the
/// remaining suffixes are scanned from a random starting point, so the call
/// always terminates and fails only when every suffix is taken.
pub fn generate_unique_id<R>(prefix: char, existing: &impl IdSet, rng: &mut R) -> Result<String>
where
    R: Rng + ?Sized,
{
    for _ in 0..RANDOM_ID_ATTEMPTS {
        let candidate = format_id(prefix, rng.gen_range(ID_SUFFIX_MIN..=ID_SUFFIX_MAX));
        if !existing.contains_id(&candidate) {
            return Ok(candidate);
        }
    }

    let span = ID_SUFFIX_MAX - ID_SUFFIX_MIN + 1;
    let start = rng.gen_range(0..span);
    (0..span)
        .map(|offset| ID_SUFFIX_MIN + (start + offset) % span)
        .map(|suffix| format_id(prefix, suffix))
        .find(|candidate| !existing.contains_id(candidate))
        .ok_or(GymError::IdSpaceExhausted(prefix))
}

fn format_id(prefix: char, suffix: u32) -> String {
    format!("{prefix}{suffix:04}")
}
