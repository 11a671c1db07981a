use rand::Rng;
use tracing::{info, instrument, warn};

use crate::checkin::CheckIn;
use crate::error::{GymError, Result, Warning};
use crate::io::store::{RecordStore, TableKind};
use crate::io::table::{IdSet, generate_unique_id};
use crate::model::{
    CLASS_PREFIX, Directory, INSTRUCTOR_PREFIX, Instructor, MEMBER_PREFIX, Member,
    MembershipType, Record, Schedule, Session,
};
use crate::validate;

/// Details of a member to enrol.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub membership_type: MembershipType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInstructor {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub tax_registration_number: String,
    pub date_of_birth: String,
}

/// Fixed fields of a class row.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetails {
    pub name: String,
    pub day: String,
    pub time: String,
    pub cost: String,
    pub instructor: String,
}

/// Partial class update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub name: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub cost: Option<String>,
    pub instructor: Option<String>,
}

/// Loaded gym state bound to the store it came from.
///
/// Every mutation is applied to a copy of the affected table, saved, and only
/// then swapped in, so a failed save leaves memory matching the disk.
#[derive(Debug)]
pub struct Gym<S> {
    store: S,
    directory: Directory,
    schedule: Schedule,
    members_present: bool,
    classes_present: bool,
}

impl<S: RecordStore> Gym<S> {
    /// Loads both tables from `store`.
    #[instrument(level = "info", skip_all)]
    pub fn open(store: S) -> Result<(Self, Vec<Warning>)> {
        let mut gym = Gym {
            store,
            directory: Directory::default(),
            schedule: Schedule::default(),
            members_present: false,
            classes_present: false,
        };
        let warnings = gym.reload()?;
        Ok((gym, warnings))
    }

    /// Re-reads both tables, discarding the in-memory state.
    pub fn reload(&mut self) -> Result<Vec<Warning>> {
        let members = self.store.load(TableKind::Members)?;
        let classes = self.store.load(TableKind::Classes)?;

        let mut warnings = members.warnings;
        let (directory, directory_warnings) = Directory::from_table(members.table);
        let (schedule, schedule_warnings) = Schedule::from_table(classes.table);
        for warning in directory_warnings.iter().chain(&schedule_warnings) {
            warn!(%warning, "record kept aside as unrecognised");
        }
        warnings.extend(directory_warnings);
        warnings.extend(classes.warnings);
        warnings.extend(schedule_warnings);

        info!(
            records = directory.len(),
            sessions = schedule.len(),
            warnings = warnings.len(),
            "gym tables loaded"
        );
        self.directory = directory;
        self.schedule = schedule;
        self.members_present = members.existed;
        self.classes_present = classes.existed;
        Ok(warnings)
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fails with [`GymError::MissingTable`] if the table has never been
    /// written.
    pub fn require_table(&self, kind: TableKind) -> Result<()> {
        let present = match kind {
            TableKind::Members => self.members_present,
            TableKind::Classes => self.classes_present,
        };
        if present {
            Ok(())
        } else {
            Err(GymError::MissingTable(self.store.describe(kind).into()))
        }
    }

    pub fn check_in(&self) -> CheckIn {
        CheckIn::new()
    }

    #[instrument(level = "info", skip(self, member, rng))]
    pub fn add_member<R>(&mut self, member: NewMember, rng: &mut R) -> Result<String>
    where
        R: Rng + ?Sized,
    {
        let id = generate_unique_id(MEMBER_PREFIX, &self.directory, rng)?;
        let mut next = self.directory.clone();
        next.insert(Record::Member(Member {
            id: id.clone(),
            first_name: member.first_name,
            last_name: member.last_name,
            contact_number: member.contact_number,
            membership_type: member.membership_type.to_string(),
            classes: Vec::new(),
        }));
        self.commit_directory(next)?;
        info!(%id, "member added");
        Ok(id)
    }

    #[instrument(level = "info", skip(self, instructor, rng))]
    pub fn add_instructor<R>(&mut self, instructor: NewInstructor, rng: &mut R) -> Result<String>
    where
        R: Rng + ?Sized,
    {
        let id = generate_unique_id(INSTRUCTOR_PREFIX, &self.directory, rng)?;
        let mut next = self.directory.clone();
        next.insert(Record::Instructor(Instructor {
            id: id.clone(),
            first_name: instructor.first_name,
            last_name: instructor.last_name,
            contact_number: instructor.contact_number,
            tax_registration_number: instructor.tax_registration_number,
            date_of_birth: instructor.date_of_birth,
        }));
        self.commit_directory(next)?;
        info!(%id, "instructor added");
        Ok(id)
    }

    /// Adds a class under `id`, or under a generated `C####` id when `None`.
    #[instrument(level = "info", skip(self, details, rng))]
    pub fn add_session<R>(
        &mut self,
        id: Option<&str>,
        details: SessionDetails,
        rng: &mut R,
    ) -> Result<String>
    where
        R: Rng + ?Sized,
    {
        let id = match id {
            Some(id) => {
                let id = validate::session_id(id)?;
                if self.schedule.contains_id(&id) {
                    return Err(GymError::DuplicateId(id));
                }
                id
            }
            None => generate_unique_id(CLASS_PREFIX, &self.schedule, rng)?,
        };

        let mut next = self.schedule.clone();
        next.insert(Session {
            id: id.clone(),
            name: details.name,
            day: details.day,
            time: details.time,
            cost: details.cost,
            instructor: details.instructor,
        });
        self.commit_schedule(next)?;
        info!(%id, "session added");
        Ok(id)
    }

    #[instrument(level = "info", skip(self, update))]
    pub fn update_session(&mut self, id: &str, update: SessionUpdate) -> Result<()> {
        let mut next = self.schedule.clone();
        let session = next
            .get_mut(id)
            .ok_or_else(|| GymError::UnknownSession(id.to_string()))?;

        let SessionUpdate {
            name,
            day,
            time,
            cost,
            instructor,
        } = update;
        if let Some(name) = name {
            session.name = name;
        }
        if let Some(day) = day {
            session.day = day;
        }
        if let Some(time) = time {
            session.time = time;
        }
        if let Some(cost) = cost {
            session.cost = cost;
        }
        if let Some(instructor) = instructor {
            session.instructor = instructor;
        }

        self.commit_schedule(next)?;
        info!(%id, "session updated");
        Ok(())
    }

    /// Appends `class_id` to a member's registrations and saves the member
    /// table.
    pub(crate) fn register(&mut self, member_id: &str, class_id: &str) -> Result<()> {
        if self.schedule.get(class_id).is_none() {
            return Err(GymError::UnknownSession(class_id.to_string()));
        }
        let mut next = self.directory.clone();
        let member = next
            .member_mut(member_id)
            .ok_or_else(|| GymError::UnknownMember(member_id.to_string()))?;
        if member.is_registered(class_id) {
            return Err(GymError::AlreadyRegistered {
                member_id: member_id.to_string(),
                class_id: class_id.to_string(),
            });
        }
        member.classes.push(class_id.to_string());
        self.commit_directory(next)
    }

    fn commit_directory(&mut self, next: Directory) -> Result<()> {
        self.store.save(TableKind::Members, &next.to_table())?;
        self.directory = next;
        self.members_present = true;
        Ok(())
    }

    fn commit_schedule(&mut self, next: Schedule) -> Result<()> {
        self.store.save(TableKind::Classes, &next.to_table())?;
        self.schedule = next;
        self.classes_present = true;
        Ok(())
    }
}
