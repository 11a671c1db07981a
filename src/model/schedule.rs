use std::collections::BTreeMap;

use crate::error::Warning;
use crate::io::table::{IdSet, RawTable};
use crate::model::without_trailing_blanks;

const SESSION_FIELDS: usize = 5;

/// A class row. Cost stays text, the way it is stored, and is only turned
/// into an amount when a report needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub day: String,
    pub time: String,
    pub cost: String,
    pub instructor: String,
}

impl Session {
    /// Parses a class row. Empty fields after the fifth, left by a trailing
    /// comma, are ignored.
    pub fn from_row(id: &str, fields: &[String]) -> Result<Self, String> {
        match without_trailing_blanks(fields, SESSION_FIELDS) {
            [name, day, time, cost, instructor] => Ok(Session {
                id: id.to_string(),
                name: name.clone(),
                day: day.clone(),
                time: time.clone(),
                cost: cost.clone(),
                instructor: instructor.clone(),
            }),
            _ => Err(format!(
                "class rows need {SESSION_FIELDS} fields, found {}",
                fields.len()
            )),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.day.clone(),
            self.time.clone(),
            self.cost.clone(),
            self.instructor.clone(),
        ]
    }

    /// The cost as a non-negative amount, if it parses as one.
    pub fn cost_amount(&self) -> Option<f64> {
        self.cost
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
    }
}

/// The class table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    sessions: BTreeMap<String, Session>,
    unrecognised: RawTable,
}

impl Schedule {
    pub fn from_table(table: RawTable) -> (Self, Vec<Warning>) {
        let mut schedule = Schedule::default();
        let mut warnings = Vec::new();

        for (id, fields) in table {
            match Session::from_row(&id, &fields) {
                Ok(session) => {
                    schedule.sessions.insert(id, session);
                }
                Err(reason) => {
                    warnings.push(Warning::UnrecognisedRecord {
                        id: id.clone(),
                        reason,
                    });
                    schedule.unrecognised.insert(id, fields);
                }
            }
        }

        (schedule, warnings)
    }

    pub fn to_table(&self) -> RawTable {
        let mut table = self.unrecognised.clone();
        for (id, session) in &self.sessions {
            table.insert(id.clone(), session.to_row());
        }
        table
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Sessions in ascending id order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn insert(&mut self, session: Session) -> Option<Session> {
        self.unrecognised.remove(&session.id);
        self.sessions.insert(session.id.clone(), session)
    }

    pub fn unrecognised(&self) -> &RawTable {
        &self.unrecognised
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl IdSet for Schedule {
    fn contains_id(&self, id: &str) -> bool {
        self.sessions.contains_key(id) || self.unrecognised.contains_key(id)
    }
}
