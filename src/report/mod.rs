//! Billing and revenue derivations over loaded tables.
//!
//! Everything here is a pure function of its inputs: no I/O, no mutation,
//! and results keyed by id in ascending order so repeated runs print the
//! same report. Data-quality problems never abort a report; they come back
//! as [`Warning`]s next to the value.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Warning;
use crate::model::{Directory, FeeSchedule, Member, Record, Schedule, Session};

/// The reports an operator can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Everyone in the member/instructor table.
    Members,
    /// Every class row.
    Schedule,
    /// Members grouped by membership type.
    Memberships,
    /// Class rosters and revenue.
    Classes,
    /// Monthly fee per client.
    Clients,
}

/// A derived value together with the warnings raised while computing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derived<T> {
    pub value: T,
    #[serde(serialize_with = "serialize_warnings")]
    pub warnings: Vec<Warning>,
}

/// Registrations and revenue of one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRoster {
    pub name: String,
    pub cost: f64,
    /// Full names of registered members, ordered by member id.
    pub roster: Vec<String>,
    pub revenue: f64,
}

/// One priced class registration of a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassFee {
    pub class_id: String,
    pub name: String,
    pub cost: f64,
}

/// Monthly bill of one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientFee {
    pub name: String,
    pub membership_type: String,
    pub base_fee: f64,
    pub class_fees: Vec<ClassFee>,
    pub total_fee: f64,
}

impl ClientFee {
    pub fn class_total(&self) -> f64 {
        self.class_fees.iter().map(|class_fee| class_fee.cost).sum()
    }
}

/// Members and base fees grouped under one membership type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub members: Vec<String>,
    pub total_fees: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RosterTotals {
    pub classes: usize,
    pub registrations: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeTotals {
    pub clients: usize,
    pub revenue: f64,
}

/// One line of the people listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonEntry {
    pub id: String,
    pub kind: &'static str,
    pub name: String,
}

/// One line of the class schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub name: String,
    pub day: String,
    pub time: String,
    pub cost: String,
    pub instructor: String,
}

/// Lists members and instructors in ascending id order.
pub fn people(directory: &Directory) -> Vec<PersonEntry> {
    directory
        .records()
        .map(|record| PersonEntry {
            id: record.id().to_string(),
            kind: match record {
                Record::Member(_) => "member",
                Record::Instructor(_) => "instructor",
            },
            name: record.full_name(),
        })
        .collect()
}

/// Lists classes in ascending id order.
pub fn timetable(schedule: &Schedule) -> Vec<ScheduleEntry> {
    schedule
        .sessions()
        .map(|session| ScheduleEntry {
            id: session.id.clone(),
            name: session.name.clone(),
            day: session.day.clone(),
            time: session.time.clone(),
            cost: session.cost.clone(),
            instructor: session.instructor.clone(),
        })
        .collect()
}

/// Builds the roster and revenue of every class.
///
/// Only member records are rostered. Class ids that name no class are
/// ignored, and a member listed twice for a class counts once.
pub fn class_rosters(
    schedule: &Schedule,
    directory: &Directory,
) -> Derived<BTreeMap<String, ClassRoster>> {
    let mut warnings = Vec::new();
    let mut rosters: BTreeMap<String, ClassRoster> = schedule
        .sessions()
        .map(|session| {
            let roster = ClassRoster {
                name: session.name.clone(),
                cost: priced(session, &mut warnings),
                roster: Vec::new(),
                revenue: 0.0,
            };
            (session.id.clone(), roster)
        })
        .collect();

    for member in directory.members() {
        for class_id in member.distinct_classes() {
            match rosters.get_mut(class_id) {
                Some(roster) => roster.roster.push(member.full_name()),
                None => unmatched(schedule, member, class_id, &mut warnings),
            }
        }
    }

    for roster in rosters.values_mut() {
        roster.revenue = roster.cost * roster.roster.len() as f64;
    }

    Derived {
        value: rosters,
        warnings,
    }
}

/// Computes the monthly fee of every member: base fee of the membership
/// type plus the cost of each valid registered class.
pub fn client_fees(
    schedule: &Schedule,
    directory: &Directory,
    fees: &FeeSchedule,
) -> Derived<BTreeMap<String, ClientFee>> {
    let mut warnings = Vec::new();
    let costs = class_costs(schedule, &mut warnings);
    let mut clients = BTreeMap::new();

    for member in directory.members() {
        let base_fee = base_fee_or_zero(member, fees, &mut warnings);

        let class_fees: Vec<ClassFee> = member
            .distinct_classes()
            .into_iter()
            .filter_map(|class_id| match costs.get(class_id) {
                Some((name, cost)) => Some(ClassFee {
                    class_id: class_id.to_string(),
                    name: name.clone(),
                    cost: *cost,
                }),
                None => {
                    unmatched(schedule, member, class_id, &mut warnings);
                    None
                }
            })
            .collect();

        let total_fee = base_fee + class_fees.iter().map(|fee| fee.cost).sum::<f64>();
        clients.insert(
            member.id.clone(),
            ClientFee {
                name: member.full_name(),
                membership_type: member.membership_type.clone(),
                base_fee,
                class_fees,
                total_fee,
            },
        );
    }

    Derived {
        value: clients,
        warnings,
    }
}

/// Groups members by membership type, summing their base fees.
pub fn membership_summary(
    directory: &Directory,
    fees: &FeeSchedule,
) -> Derived<BTreeMap<String, TierSummary>> {
    let mut warnings = Vec::new();
    let mut tiers: BTreeMap<String, TierSummary> = BTreeMap::new();

    for member in directory.members() {
        let base_fee = base_fee_or_zero(member, fees, &mut warnings);
        let tier = tiers
            .entry(member.membership_type.clone())
            .or_insert_with(|| TierSummary {
                members: Vec::new(),
                total_fees: 0.0,
            });
        tier.members.push(member.full_name());
        tier.total_fees += base_fee;
    }

    Derived {
        value: tiers,
        warnings,
    }
}

pub fn roster_totals(rosters: &BTreeMap<String, ClassRoster>) -> RosterTotals {
    RosterTotals {
        classes: rosters.len(),
        registrations: rosters.values().map(|roster| roster.roster.len()).sum(),
        revenue: rosters.values().map(|roster| roster.revenue).sum(),
    }
}

pub fn fee_totals(clients: &BTreeMap<String, ClientFee>) -> FeeTotals {
    FeeTotals {
        clients: clients.len(),
        revenue: clients.values().map(|client| client.total_fee).sum(),
    }
}

fn class_costs(
    schedule: &Schedule,
    warnings: &mut Vec<Warning>,
) -> BTreeMap<String, (String, f64)> {
    schedule
        .sessions()
        .map(|session| {
            let cost = priced(session, warnings);
            (session.id.clone(), (session.name.clone(), cost))
        })
        .collect()
}

fn priced(session: &Session, warnings: &mut Vec<Warning>) -> f64 {
    session.cost_amount().unwrap_or_else(|| {
        let warning = Warning::UnparsableCost {
            class_id: session.id.clone(),
            raw: session.cost.clone(),
        };
        warn!(%warning, "class priced at zero");
        warnings.push(warning);
        0.0
    })
}

fn base_fee_or_zero(member: &Member, fees: &FeeSchedule, warnings: &mut Vec<Warning>) -> f64 {
    fees.base_fee(&member.membership_type).unwrap_or_else(|| {
        let warning = Warning::UnknownMembershipType {
            member_id: member.id.clone(),
            membership_type: member.membership_type.clone(),
        };
        warn!(%warning, "base fee set to zero");
        warnings.push(warning);
        0.0
    })
}

/// A registration with no priced class behind it. Ids of rows kept verbatim
/// are flagged; ids naming no row at all are skipped quietly.
fn unmatched(
    schedule: &Schedule,
    member: &Member,
    class_id: &str,
    warnings: &mut Vec<Warning>,
) {
    if schedule.unrecognised().contains_key(class_id) {
        let warning = Warning::UnreadableClass {
            member_id: member.id.clone(),
            class_id: class_id.to_string(),
        };
        warn!(%warning, "registration left out of the report");
        warnings.push(warning);
    } else {
        debug!(member_id = %member.id, class_id, "registration names no class, skipped");
    }
}

fn serialize_warnings<S>(warnings: &[Warning], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(warnings.iter().map(ToString::to_string))
}
