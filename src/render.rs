//! Turns derived report data into text or JSON.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::error::{Result, Warning};
use crate::gym::Gym;
use crate::io::store::{RecordStore, TableKind};
use crate::model::FeeSchedule;
use crate::report::{
    self, ClassRoster, ClientFee, Derived, PersonEntry, ReportKind, ScheduleEntry, TierSummary,
};

const RULE_WIDTH: usize = 50;

/// JSON envelope pairing a report with its summary line.
#[derive(Serialize)]
struct Totalled<'a, R, T> {
    report: &'a R,
    totals: T,
}

/// Output encodings for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Derives and writes one report.
///
/// Fails with [`MissingTable`](crate::GymError::MissingTable) when a table the
/// report reads has never been written.
pub fn print_report<S, W>(
    out: &mut W,
    gym: &Gym<S>,
    fees: &FeeSchedule,
    kind: ReportKind,
    format: OutputFormat,
) -> Result<()>
where
    S: RecordStore,
    W: Write,
{
    for table in required_tables(kind) {
        gym.require_table(*table)?;
    }

    let directory = gym.directory();
    let schedule = gym.schedule();
    match (kind, format) {
        (ReportKind::Members, OutputFormat::Text) => people(out, &report::people(directory)),
        (ReportKind::Members, OutputFormat::Json) => json_to(out, &report::people(directory)),
        (ReportKind::Schedule, OutputFormat::Text) => timetable(out, &report::timetable(schedule)),
        (ReportKind::Schedule, OutputFormat::Json) => {
            json_to(out, &report::timetable(schedule))
        }
        (ReportKind::Memberships, OutputFormat::Text) => {
            memberships(out, &report::membership_summary(directory, fees))
        }
        (ReportKind::Memberships, OutputFormat::Json) => {
            json_to(out, &report::membership_summary(directory, fees))
        }
        (ReportKind::Classes, OutputFormat::Text) => {
            class_registrations(out, &report::class_rosters(schedule, directory))
        }
        (ReportKind::Classes, OutputFormat::Json) => {
            let rosters = report::class_rosters(schedule, directory);
            let totals = report::roster_totals(&rosters.value);
            json_to(out, &Totalled { report: &rosters, totals })
        }
        (ReportKind::Clients, OutputFormat::Text) => {
            clients(out, &report::client_fees(schedule, directory, fees), fees)
        }
        (ReportKind::Clients, OutputFormat::Json) => {
            let clients = report::client_fees(schedule, directory, fees);
            let totals = report::fee_totals(&clients.value);
            json_to(out, &Totalled { report: &clients, totals })
        }
    }
}

fn required_tables(kind: ReportKind) -> &'static [TableKind] {
    match kind {
        ReportKind::Members | ReportKind::Memberships => &[TableKind::Members],
        ReportKind::Schedule => &[TableKind::Classes],
        ReportKind::Classes | ReportKind::Clients => &[TableKind::Classes, TableKind::Members],
    }
}

fn json_to<W: Write>(out: &mut W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn warnings<W: Write>(out: &mut W, warnings: &[Warning]) -> Result<()> {
    for warning in warnings {
        writeln!(out, "Warning: {warning}")?;
    }
    Ok(())
}

fn rule<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\n{}\n", "-".repeat(RULE_WIDTH))?;
    Ok(())
}

fn people<W: Write>(out: &mut W, entries: &[PersonEntry]) -> Result<()> {
    writeln!(out, "Total Members: {}\n", entries.len())?;
    writeln!(out, "List of Members:")?;
    for entry in entries {
        writeln!(out, "{} {} ({})", entry.id, entry.name, entry.kind)?;
    }
    Ok(())
}

fn timetable<W: Write>(out: &mut W, entries: &[ScheduleEntry]) -> Result<()> {
    writeln!(out, "Class Schedules:\n")?;
    for entry in entries {
        writeln!(
            out,
            "{}: {} | {} {} | ${} | {}",
            entry.id, entry.name, entry.day, entry.time, entry.cost, entry.instructor
        )?;
    }
    Ok(())
}

fn memberships<W: Write>(
    out: &mut W,
    summary: &Derived<BTreeMap<String, TierSummary>>,
) -> Result<()> {
    warnings(out, &summary.warnings)?;
    writeln!(out, "List of Members with Membership Types:")?;
    for (membership_type, tier) in &summary.value {
        writeln!(out, "\nMembership Type: {membership_type}")?;
        writeln!(out, "Members:")?;
        for name in &tier.members {
            writeln!(out, "- {name}")?;
        }
        writeln!(out, "Total Members: {}", tier.members.len())?;
        writeln!(out, "Total Monthly Fees: ${:.2}", tier.total_fees)?;
    }

    let members: usize = summary.value.values().map(|tier| tier.members.len()).sum();
    let fees: f64 = summary.value.values().map(|tier| tier.total_fees).sum();
    writeln!(out, "\nOverall Totals:")?;
    writeln!(out, "Total Members: {members}")?;
    writeln!(out, "Total Monthly Fees: ${fees:.2}")?;
    Ok(())
}

fn class_registrations<W: Write>(
    out: &mut W,
    rosters: &Derived<BTreeMap<String, ClassRoster>>,
) -> Result<()> {
    warnings(out, &rosters.warnings)?;
    writeln!(out, "\n=== CLASS REGISTRATION AND REVENUE REPORT ===\n")?;

    for (class_id, roster) in &rosters.value {
        writeln!(out, "Class: {} (Code: {class_id})", roster.name)?;
        writeln!(out, "Cost per Member: ${:.2}", roster.cost)?;
        writeln!(out, "Number of Members: {}", roster.roster.len())?;
        writeln!(out, "Total Revenue: ${:.2}", roster.revenue)?;
        writeln!(out, "\nRegistered Members:")?;
        if roster.roster.is_empty() {
            writeln!(out, "- No members registered")?;
        }
        for name in &roster.roster {
            writeln!(out, "- {name}")?;
        }
        rule(out)?;
    }

    let totals = report::roster_totals(&rosters.value);
    writeln!(out, "=== SUMMARY ===")?;
    writeln!(out, "Total Number of Classes: {}", totals.classes)?;
    writeln!(out, "Total Number of Registrations: {}", totals.registrations)?;
    writeln!(out, "Total Revenue: ${:.2}", totals.revenue)?;
    Ok(())
}

fn clients<W: Write>(
    out: &mut W,
    clients: &Derived<BTreeMap<String, ClientFee>>,
    fees: &FeeSchedule,
) -> Result<()> {
    warnings(out, &clients.warnings)?;
    writeln!(out, "\n=== GYM CLIENT MONTHLY FEE REPORT ===\n")?;

    for (member_id, client) in &clients.value {
        writeln!(out, "Client ID: {member_id}")?;
        writeln!(out, "Name: {}", client.name)?;
        writeln!(out, "Membership Type: {}", client.membership_type)?;
        match fees.base_fee(&client.membership_type) {
            Some(base_fee) => writeln!(out, "Base Membership Fee: ${base_fee:.2}")?,
            None => writeln!(out, "Base Membership Fee: Unknown (membership type not found)")?,
        }

        writeln!(out, "\nRegistered Classes:")?;
        if client.class_fees.is_empty() {
            writeln!(out, "- No additional classes registered")?;
        }
        for class_fee in &client.class_fees {
            writeln!(
                out,
                "- {} (ID: {}) - ${:.2}",
                class_fee.name, class_fee.class_id, class_fee.cost
            )?;
        }
        writeln!(out, "\nTotal Class Fees: ${:.2}", client.class_total())?;
        writeln!(out, "\nTOTAL MONTHLY FEE: ${:.2}", client.total_fee)?;
        rule(out)?;
    }

    let totals = report::fee_totals(&clients.value);
    writeln!(out, "=== SUMMARY ===")?;
    writeln!(out, "Total Number of Clients: {}", totals.clients)?;
    writeln!(out, "Total Monthly Revenue: ${:.2}", totals.revenue)?;
    Ok(())
}
