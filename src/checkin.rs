//! Member check-in: pick a member, pick a class, persist the registration.

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::error::{GymError, Result};
use crate::gym::Gym;
use crate::io::store::RecordStore;
use crate::model::Directory;

/// A committed class registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub member_id: String,
    pub class_id: String,
    pub class_name: String,
    pub registered_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckInState {
    AwaitMemberId,
    AwaitClassSelection { member_id: String },
    Committed(Registration),
}

/// Drives one check-in through its states.
///
/// A rejected selection leaves the state where it was, so the caller can ask
/// again. Dropping the value before commit leaves every table untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    state: CheckInState,
}

impl Default for CheckIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckIn {
    pub fn new() -> Self {
        Self {
            state: CheckInState::AwaitMemberId,
        }
    }

    pub fn state(&self) -> &CheckInState {
        &self.state
    }

    /// Selects the member to register. Only member records qualify.
    pub fn select_member(&mut self, directory: &Directory, member_id: &str) -> Result<()> {
        if !matches!(self.state, CheckInState::AwaitMemberId) {
            return Err(GymError::IncompleteCheckIn("a member is already selected"));
        }
        let member = directory
            .member(member_id.trim())
            .ok_or_else(|| GymError::UnknownMember(member_id.trim().to_string()))?;
        self.state = CheckInState::AwaitClassSelection {
            member_id: member.id.clone(),
        };
        Ok(())
    }

    /// Selects the class and persists the registration through `gym`.
    ///
    /// The in-memory tables only change once the store accepted the write.
    pub fn commit<S: RecordStore>(
        &mut self,
        gym: &mut Gym<S>,
        class_id: &str,
    ) -> Result<Registration> {
        let member_id = match &self.state {
            CheckInState::AwaitClassSelection { member_id } => member_id.clone(),
            CheckInState::AwaitMemberId => {
                return Err(GymError::IncompleteCheckIn("no member selected"));
            }
            CheckInState::Committed(_) => {
                return Err(GymError::IncompleteCheckIn("check-in already committed"));
            }
        };
        let class_id = class_id.trim();

        let class_name = gym
            .schedule()
            .get(class_id)
            .map(|session| session.name.clone())
            .ok_or_else(|| GymError::UnknownSession(class_id.to_string()))?;

        gym.register(&member_id, class_id)?;

        let registration = Registration {
            member_id,
            class_id: class_id.to_string(),
            class_name,
            registered_at: Local::now(),
        };
        info!(
            member_id = %registration.member_id,
            class_id = %registration.class_id,
            "member checked in"
        );
        self.state = CheckInState::Committed(registration.clone());
        Ok(registration)
    }
}
