//! The interactive text menu.

use std::io::{BufRead, Write};

use rand::Rng;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::{GymError, Result};
use crate::gym::{Gym, NewInstructor, NewMember, SessionDetails, SessionUpdate};
use crate::io::store::RecordStore;
use crate::io::table::IdSet;
use crate::model::FeeSchedule;
use crate::render::{self, OutputFormat};
use crate::report::ReportKind;
use crate::validate::{self, ValidationError};

const BANNER_WIDTH: usize = 25;

/// Runs the main menu until the operator confirms exit.
///
/// Problems with a single action (an unknown id, a missing table) are shown
/// and the menu continues; storage failures and closed input end the session
/// with an error.
pub fn run<S, R, W, G>(
    console: &mut Console<R, W>,
    gym: &mut Gym<S>,
    fees: &FeeSchedule,
    rng: &mut G,
) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    loop {
        show_menu(console)?;
        let outcome = match console.prompt("Enter number: ")?.trim() {
            "1" => check_in(console, gym),
            "2" => add_member(console, gym, rng),
            "3" => add_or_update_session(console, gym, rng),
            "4" => add_instructor(console, gym, rng),
            "5" => print_report(console, gym, fees),
            "6" => {
                if console.confirm("Are you sure you want to exit? (Y/N): ")? {
                    console.say("Exiting the Gym Billing System...")?;
                    return Ok(());
                }
                console.say("Returning to the main menu...")
            }
            _ => console.say("Invalid option! Please try again."),
        };

        match outcome {
            Ok(()) => {}
            Err(error) if recoverable(&error) => {
                warn!(%error, "menu action abandoned");
                console.say(format_args!("Error: {error}"))?;
            }
            Err(error) => return Err(error),
        }
    }
}

fn recoverable(error: &GymError) -> bool {
    matches!(
        error,
        GymError::MissingTable(_)
            | GymError::UnknownMember(_)
            | GymError::UnknownSession(_)
            | GymError::DuplicateId(_)
            | GymError::AlreadyRegistered { .. }
            | GymError::IdSpaceExhausted(_)
            | GymError::Validation(_)
    )
}

fn show_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<()> {
    let banner = "=".repeat(BANNER_WIDTH);
    console.say(format_args!("\n\n{banner}"))?;
    console.say("GYM BILLING SYSTEM")?;
    console.say("1. Check-in a Member")?;
    console.say("2. Add Member(s)")?;
    console.say("3. Add/Update Session")?;
    console.say("4. Add Facilitator/Instructor")?;
    console.say("5. Print Report")?;
    console.say("6. Exit")?;
    console.say(banner)
}

fn check_in<S, R, W>(console: &mut Console<R, W>, gym: &mut Gym<S>) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    if gym.directory().members().next().is_none() {
        return console.say("No members registered yet.");
    }
    if gym.schedule().is_empty() {
        return console.say("No classes available for registration.");
    }

    let mut check_in = gym.check_in();
    loop {
        let member_id = console.prompt("Enter your valid membership number: ")?;
        match check_in.select_member(gym.directory(), &member_id) {
            Ok(()) => break,
            Err(GymError::UnknownMember(_)) => console.say(
                "Invalid Membership ID. Please enter a valid membership number.",
            )?,
            Err(error) => return Err(error),
        }
    }

    console.say("\nAvailable Classes for Registration:")?;
    for session in gym.schedule().sessions() {
        console.say(format_args!("- {} {}", session.id, session.name))?;
    }

    let class_id = loop {
        let class_id = console.prompt("\nEnter the id of the class you want to register for: ")?;
        let class_id = class_id.trim().to_string();
        if gym.schedule().get(&class_id).is_some() {
            break class_id;
        }
        console.say("Invalid class selection. Please choose a valid class.")?;
    };

    if !console.confirm(&format!("Register for {class_id}? (Y/N): "))? {
        return console.say("Check-in cancelled.");
    }

    let registration = check_in.commit(gym, &class_id)?;
    console.say("Registration Successful!")?;
    console.say(format_args!("Membership ID: {}", registration.member_id))?;
    console.say(format_args!("Class ID: {}", registration.class_id))?;
    console.say(format_args!("Class Registered: {}", registration.class_name))?;
    console.say(format_args!(
        "Time Registered: {}",
        registration.registered_at.format("%Y-%m-%d %H:%M:%S")
    ))
}

fn add_member<S, R, W, G>(console: &mut Console<R, W>, gym: &mut Gym<S>, rng: &mut G) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let member = NewMember {
        first_name: console.prompt_valid("Enter first name: ", |input| {
            validate::name("first name", input)
        })?,
        last_name: console.prompt_valid("Enter last name: ", |input| {
            validate::name("last name", input)
        })?,
        contact_number: console
            .prompt_valid("Enter contact number: ", validate::contact_number)?,
        membership_type: console
            .prompt_valid("Enter membership type: ", validate::membership_type)?,
    };

    let id = gym.add_member(member, rng)?;
    console.say(format_args!("Membership number: {id}"))?;
    console.say("Member added successfully.")
}

fn add_instructor<S, R, W, G>(
    console: &mut Console<R, W>,
    gym: &mut Gym<S>,
    rng: &mut G,
) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let instructor = NewInstructor {
        first_name: console.prompt_valid("Enter first name: ", |input| {
            validate::name("first name", input)
        })?,
        last_name: console.prompt_valid("Enter last name: ", |input| {
            validate::name("last name", input)
        })?,
        contact_number: console
            .prompt_valid("Enter contact number: ", validate::contact_number)?,
        tax_registration_number: console.prompt_valid(
            "Enter a valid Tax Registration Number: ",
            validate::tax_registration_number,
        )?,
        date_of_birth: console
            .prompt_valid("Enter date of birth (ddmmyyyy): ", validate::date_of_birth)?,
    };

    let id = gym.add_instructor(instructor, rng)?;
    console.say(format_args!("Instructor identification number: {id}"))?;
    console.say("Instructor added successfully.")
}

fn add_or_update_session<S, R, W, G>(
    console: &mut Console<R, W>,
    gym: &mut Gym<S>,
    rng: &mut G,
) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    console.say("1. Add New Session\n2. Update Existing Session\n3. Exit")?;
    match console.prompt("Enter number: ")?.trim() {
        "1" => add_session(console, gym, rng),
        "2" => update_session(console, gym),
        _ => console.say("Exiting session update menu."),
    }
}

fn add_session<S, R, W, G>(console: &mut Console<R, W>, gym: &mut Gym<S>, rng: &mut G) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let id = loop {
        let id = console.prompt_valid(
            "Enter Session ID (C0000, or press Enter to generate one): ",
            |input| optional(input, validate::session_id),
        )?;
        match id {
            Some(id) if gym.schedule().contains_id(&id) => {
                console.say(format_args!("Session {id} already exists."))?;
            }
            other => break other,
        }
    };

    let details = SessionDetails {
        name: console.prompt_valid("Enter Session Name: ", |input| {
            validate::name("session name", input)
        })?,
        day: capitalize(&console.prompt("Enter the Days the Session will be held: ")?),
        time: capitalize(&console.prompt("Enter the Time: ")?),
        cost: console.prompt_valid("Enter the Cost of the Session: ", validate::cost)?,
        instructor: console.prompt_valid("Enter the Name of the Instructor: ", |input| {
            validate::name("instructor name", input)
        })?,
    };

    let id = gym.add_session(id.as_deref(), details, rng)?;
    info!(%id, "session created from menu");
    console.say(format_args!("New session {id} successfully added!"))
}

fn update_session<S, R, W>(console: &mut Console<R, W>, gym: &mut Gym<S>) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    if gym.schedule().is_empty() {
        return console.say("No sessions to update.");
    }

    let id = loop {
        let id = console.prompt("Enter the Session ID you want to update: ")?;
        let id = id.trim().to_string();
        if gym.schedule().get(&id).is_some() {
            break id;
        }
        console.say("Invalid input. Please enter a valid session ID.")?;
    };

    let keep = |input: &str| -> std::result::Result<Option<String>, ValidationError> {
        Ok(Some(input.trim().to_string()).filter(|value| !value.is_empty()))
    };
    let update = SessionUpdate {
        name: console.prompt_valid(
            "Enter New Session Name (or press Enter to keep the current name): ",
            keep,
        )?,
        day: console.prompt_valid(
            "Enter New Days (or press Enter to keep the current days): ",
            keep,
        )?,
        time: console.prompt_valid(
            "Enter New Time (or press Enter to keep the current time): ",
            keep,
        )?,
        cost: console.prompt_valid(
            "Enter New Cost (or press Enter to keep the current cost): ",
            |input| optional(input, validate::cost),
        )?,
        instructor: console.prompt_valid(
            "Enter New Instructor Name (or press Enter to keep the current instructor): ",
            keep,
        )?,
    };

    gym.update_session(&id, update)?;
    console.say("Session successfully updated!")
}

fn print_report<S, R, W>(
    console: &mut Console<R, W>,
    gym: &Gym<S>,
    fees: &FeeSchedule,
) -> Result<()>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    console.say("REPORTS")?;
    console.say("1. Total Members")?;
    console.say("2. Class Schedules")?;
    console.say("3. Membership Summary")?;
    console.say("4. Class Registration Summary")?;
    console.say("5. Client Report")?;
    console.say("6. Exit")?;

    let kind = match console.prompt("Enter number: ")?.trim() {
        "1" => ReportKind::Members,
        "2" => ReportKind::Schedule,
        "3" => ReportKind::Memberships,
        "4" => ReportKind::Classes,
        "5" => ReportKind::Clients,
        "6" => return Ok(()),
        _ => return console.say("Invalid option! Please try again."),
    };
    render::print_report(console.output(), gym, fees, kind, OutputFormat::Text)
}

fn optional<T>(
    input: &str,
    validate: impl Fn(&str) -> std::result::Result<T, ValidationError>,
) -> std::result::Result<Option<T>, ValidationError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        validate(input).map(Some)
    }
}

/// Upper-cases the first letter and lower-cases the rest.
fn capitalize(input: &str) -> String {
    let mut chars = input.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
