use std::collections::BTreeMap;

use crate::error::Warning;
use crate::io::table::{IdSet, RawTable};
use crate::model::{RecordKind, without_trailing_blanks};

const MEMBER_FIXED_FIELDS: usize = 4;
const INSTRUCTOR_FIELDS: usize = 5;

/// A gym member and the classes they are registered for.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    /// Stored text of the membership type; not guaranteed to be a known tier.
    pub membership_type: String,
    /// Registered class ids in registration order.
    pub classes: Vec<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_registered(&self, class_id: &str) -> bool {
        self.classes.iter().any(|registered| registered == class_id)
    }

    /// Registered class ids with repeats removed, first occurrence wins.
    pub fn distinct_classes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.classes.len());
        for class_id in &self.classes {
            if !seen.contains(&class_id.as_str()) {
                seen.push(class_id.as_str());
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instructor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub tax_registration_number: String,
    /// ddmmyyyy
    pub date_of_birth: String,
}

impl Instructor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One row of the unified member/instructor table.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Member(Member),
    Instructor(Instructor),
}

impl Record {
    /// Parses a raw row using the schema selected by the id prefix.
    pub fn from_row(id: &str, fields: &[String]) -> Result<Self, String> {
        match RecordKind::of(id) {
            Some(RecordKind::Member) => {
                if fields.len() < MEMBER_FIXED_FIELDS {
                    return Err(format!(
                        "member rows need at least {MEMBER_FIXED_FIELDS} fields, found {}",
                        fields.len()
                    ));
                }
                Ok(Record::Member(Member {
                    id: id.to_string(),
                    first_name: fields[0].clone(),
                    last_name: fields[1].clone(),
                    contact_number: fields[2].clone(),
                    membership_type: fields[3].clone(),
                    classes: fields[MEMBER_FIXED_FIELDS..]
                        .iter()
                        .filter(|class_id| !class_id.is_empty())
                        .cloned()
                        .collect(),
                }))
            }
            Some(RecordKind::Instructor) => {
                match without_trailing_blanks(fields, INSTRUCTOR_FIELDS) {
                    [first_name, last_name, contact_number, trn, dob] => {
                        Ok(Record::Instructor(Instructor {
                            id: id.to_string(),
                            first_name: first_name.clone(),
                            last_name: last_name.clone(),
                            contact_number: contact_number.clone(),
                            tax_registration_number: trn.clone(),
                            date_of_birth: dob.clone(),
                        }))
                    }
                    _ => Err(format!(
                        "instructor rows need {INSTRUCTOR_FIELDS} fields, found {}",
                        fields.len()
                    )),
                }
            }
            None => Err("id prefix is neither a member nor an instructor".to_string()),
        }
    }

    /// Fields after the id, in table order.
    pub fn to_row(&self) -> Vec<String> {
        match self {
            Record::Member(member) => {
                let mut row = vec![
                    member.first_name.clone(),
                    member.last_name.clone(),
                    member.contact_number.clone(),
                    member.membership_type.clone(),
                ];
                row.extend(member.classes.iter().cloned());
                row
            }
            Record::Instructor(instructor) => vec![
                instructor.first_name.clone(),
                instructor.last_name.clone(),
                instructor.contact_number.clone(),
                instructor.tax_registration_number.clone(),
                instructor.date_of_birth.clone(),
            ],
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Member(member) => &member.id,
            Record::Instructor(instructor) => &instructor.id,
        }
    }

    pub fn full_name(&self) -> String {
        match self {
            Record::Member(member) => member.full_name(),
            Record::Instructor(instructor) => instructor.full_name(),
        }
    }
}

/// The unified member/instructor table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    records: BTreeMap<String, Record>,
    unrecognised: RawTable,
}

impl Directory {
    /// Builds the typed table, keeping rows that do not parse as-is.
    pub fn from_table(table: RawTable) -> (Self, Vec<Warning>) {
        let mut directory = Directory::default();
        let mut warnings = Vec::new();

        for (id, fields) in table {
            match Record::from_row(&id, &fields) {
                Ok(record) => {
                    directory.records.insert(id, record);
                }
                Err(reason) => {
                    warnings.push(Warning::UnrecognisedRecord {
                        id: id.clone(),
                        reason,
                    });
                    directory.unrecognised.insert(id, fields);
                }
            }
        }

        (directory, warnings)
    }

    /// Flattens the table back into raw rows, unrecognised rows included.
    pub fn to_table(&self) -> RawTable {
        let mut table = self.unrecognised.clone();
        for (id, record) in &self.records {
            table.insert(id.clone(), record.to_row());
        }
        table
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        match self.records.get(id) {
            Some(Record::Member(member)) => Some(member),
            _ => None,
        }
    }

    pub fn member_mut(&mut self, id: &str) -> Option<&mut Member> {
        match self.records.get_mut(id) {
            Some(Record::Member(member)) => Some(member),
            _ => None,
        }
    }

    /// All parsed records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Member records in ascending id order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.records.values().filter_map(|record| match record {
            Record::Member(member) => Some(member),
            Record::Instructor(_) => None,
        })
    }

    /// Adds or replaces a record under its own id.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let id = record.id().to_string();
        self.unrecognised.remove(&id);
        self.records.insert(id, record)
    }

    /// Rows kept verbatim because they did not fit their schema.
    pub fn unrecognised(&self) -> &RawTable {
        &self.unrecognised
    }

    /// Number of parsed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IdSet for Directory {
    fn contains_id(&self, id: &str) -> bool {
        self.records.contains_key(id) || self.unrecognised.contains_key(id)
    }
}
