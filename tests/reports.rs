use std::fs;

use gym_billing::Warning;
use gym_billing::gym::Gym;
use gym_billing::io::store::{FlatFileStore, TableKind};
use gym_billing::io::table::RawTable;
use gym_billing::model::{Directory, FeeSchedule, Schedule};
use gym_billing::report::{self, class_rosters, client_fees, membership_summary};
use tempfile::tempdir;

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

fn tables(classes: &[(&str, &[&str])], members: &[(&str, &[&str])]) -> (Schedule, Directory) {
    let classes: RawTable = classes
        .iter()
        .map(|(id, fields)| (id.to_string(), row(fields)))
        .collect();
    let members: RawTable = members
        .iter()
        .map(|(id, fields)| (id.to_string(), row(fields)))
        .collect();
    let (schedule, class_warnings) = Schedule::from_table(classes);
    let (directory, member_warnings) = Directory::from_table(members);
    assert!(class_warnings.is_empty() && member_warnings.is_empty());
    (schedule, directory)
}

fn gym_fixture() -> (Schedule, Directory) {
    tables(
        &[
            ("C0002", &["Spin", "Tue", "6pm", "15.5", "Jill"]),
            ("C0001", &["Yoga", "Mon", "9am", "20.0", "Jane"]),
            ("C0003", &["Boxing", "Wed", "7pm", "30", "Jack"]),
        ],
        &[
            ("M2000", &["Bob", "Jones", "0987654321", "Platinum", "C0002", "C0001"]),
            ("M1001", &["Alice", "Smith", "1234567890", "Gold", "C0001"]),
            ("I3003", &["Jane", "Doe", "5551234567", "123456789", "01011990"]),
            ("M3000", &["Cara", "Lee", "1112223333", "Standard"]),
        ],
    )
}

#[test]
fn empty_tables_give_empty_reports() {
    let (schedule, directory) = tables(&[], &[]);

    let rosters = class_rosters(&schedule, &directory);
    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());

    assert!(rosters.value.is_empty());
    assert!(clients.value.is_empty());
    assert!(rosters.warnings.is_empty());
    assert_eq!(report::roster_totals(&rosters.value).revenue, 0.0);
    assert_eq!(report::fee_totals(&clients.value).revenue, 0.0);
}

#[test]
fn single_registration_prices_roster_and_client() {
    let (schedule, directory) = tables(
        &[("C0001", &["Yoga", "Mon", "9am", "20.0", "Jane"])],
        &[("M1001", &["Alice", "Smith", "1234567890", "Gold", "C0001"])],
    );

    let rosters = class_rosters(&schedule, &directory);
    let yoga = &rosters.value["C0001"];
    assert_eq!(yoga.name, "Yoga");
    assert_eq!(yoga.cost, 20.0);
    assert_eq!(yoga.roster, vec!["Alice Smith"]);
    assert_eq!(yoga.revenue, 20.0);

    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());
    let alice = &clients.value["M1001"];
    assert_eq!(alice.base_fee, 4000.0);
    assert_eq!(alice.total_fee, 4020.0);
    assert_eq!(alice.class_fees.len(), 1);
    assert_eq!(alice.class_fees[0].class_id, "C0001");
}

#[test]
fn dangling_class_ids_are_ignored_without_warnings() {
    let (schedule, directory) = tables(
        &[("C0001", &["Yoga", "Mon", "9am", "20.0", "Jane"])],
        &[(
            "M1001",
            &["Alice", "Smith", "1234567890", "Gold", "C9999", "C0001"],
        )],
    );

    let rosters = class_rosters(&schedule, &directory);
    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());

    assert_eq!(rosters.value.len(), 1);
    assert!(!rosters.value.contains_key("C9999"));
    assert_eq!(rosters.value["C0001"].roster.len(), 1);
    assert!(rosters.warnings.is_empty());
    assert_eq!(clients.value["M1001"].total_fee, 4020.0);
    assert!(clients.warnings.is_empty());
}

#[test]
fn unparsable_cost_is_zero_with_a_warning() {
    let (schedule, directory) = tables(
        &[
            ("C0001", &["Yoga", "Mon", "9am", "free", "Jane"]),
            ("C0002", &["Spin", "Tue", "6pm", "15.0", "Jill"]),
        ],
        &[(
            "M1001",
            &["Alice", "Smith", "1234567890", "Gold", "C0001", "C0002"],
        )],
    );

    let rosters = class_rosters(&schedule, &directory);

    assert_eq!(rosters.value["C0001"].cost, 0.0);
    assert_eq!(rosters.value["C0001"].revenue, 0.0);
    assert_eq!(rosters.value["C0002"].revenue, 15.0);
    assert_eq!(
        rosters.warnings,
        vec![Warning::UnparsableCost {
            class_id: "C0001".to_string(),
            raw: "free".to_string()
        }]
    );

    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());
    assert_eq!(clients.value["M1001"].total_fee, 4015.0);
    assert_eq!(clients.warnings.len(), 1);
}

#[test]
fn unknown_membership_type_has_zero_base_fee() {
    let (schedule, directory) = tables(
        &[("C0001", &["Yoga", "Mon", "9am", "20.0", "Jane"])],
        &[("M1001", &["Alice", "Smith", "1234567890", "Bronze", "C0001"])],
    );

    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());

    assert_eq!(clients.value["M1001"].base_fee, 0.0);
    assert_eq!(clients.value["M1001"].total_fee, 20.0);
    assert_eq!(
        clients.warnings,
        vec![Warning::UnknownMembershipType {
            member_id: "M1001".to_string(),
            membership_type: "Bronze".to_string()
        }]
    );
}

#[test]
fn rosters_match_member_lists_and_revenue_matches_cost() {
    let (schedule, directory) = gym_fixture();

    let rosters = class_rosters(&schedule, &directory);

    for (class_id, roster) in &rosters.value {
        let cost = schedule
            .get(class_id)
            .and_then(|session| session.cost_amount())
            .expect("fixture cost parses");
        let registered = directory
            .members()
            .filter(|member| member.is_registered(class_id))
            .count();
        assert_eq!(roster.roster.len(), registered, "roster of {class_id}");
        assert_eq!(roster.revenue, cost * roster.roster.len() as f64);
    }
    assert_eq!(rosters.value["C0001"].roster, vec!["Alice Smith", "Bob Jones"]);
    assert!(rosters.value["C0003"].roster.is_empty());
}

#[test]
fn total_fee_is_base_fee_plus_class_costs() {
    let (schedule, directory) = gym_fixture();
    let fees = FeeSchedule::default();

    let clients = client_fees(&schedule, &directory, &fees);

    assert_eq!(clients.value.len(), 3, "instructors are not billed");
    for member in directory.members() {
        let client = &clients.value[&member.id];
        let class_costs: f64 = member
            .classes
            .iter()
            .filter_map(|class_id| schedule.get(class_id))
            .filter_map(|session| session.cost_amount())
            .sum();
        let base_fee = fees
            .base_fee(&member.membership_type)
            .expect("fixture types are known");
        assert_eq!(client.total_fee, base_fee + class_costs);
    }
    assert_eq!(clients.value["M2000"].total_fee, 10_035.5);
}

#[test]
fn reports_are_ordered_by_id() {
    let (schedule, directory) = gym_fixture();

    let rosters = class_rosters(&schedule, &directory);
    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());

    let class_ids: Vec<&str> = rosters.value.keys().map(String::as_str).collect();
    let member_ids: Vec<&str> = clients.value.keys().map(String::as_str).collect();
    assert_eq!(class_ids, vec!["C0001", "C0002", "C0003"]);
    assert_eq!(member_ids, vec!["M1001", "M2000", "M3000"]);
}

#[test]
fn derivations_are_repeatable() {
    let (schedule, directory) = gym_fixture();
    let fees = FeeSchedule::default();

    assert_eq!(
        class_rosters(&schedule, &directory),
        class_rosters(&schedule, &directory)
    );
    assert_eq!(
        client_fees(&schedule, &directory, &fees),
        client_fees(&schedule, &directory, &fees)
    );
}

#[test]
fn repeated_registration_counts_once() {
    let (schedule, directory) = tables(
        &[("C0001", &["Yoga", "Mon", "9am", "20.0", "Jane"])],
        &[(
            "M1001",
            &["Alice", "Smith", "1234567890", "Gold", "C0001", "C0001"],
        )],
    );

    let rosters = class_rosters(&schedule, &directory);
    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());

    assert_eq!(rosters.value["C0001"].roster.len(), 1);
    assert_eq!(clients.value["M1001"].total_fee, 4020.0);
}

#[test]
fn membership_summary_groups_by_type() {
    let (_, directory) = gym_fixture();

    let summary = membership_summary(&directory, &FeeSchedule::default());

    assert_eq!(summary.value.len(), 3);
    assert_eq!(summary.value["Gold"].members, vec!["Alice Smith"]);
    assert_eq!(summary.value["Platinum"].total_fees, 10_000.0);
    assert_eq!(summary.value["Standard"].total_fees, 2_000.0);
    assert!(summary.warnings.is_empty());
}

#[test]
fn totals_sum_the_report_lines() {
    let (schedule, directory) = gym_fixture();

    let rosters = class_rosters(&schedule, &directory);
    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());
    let roster_totals = report::roster_totals(&rosters.value);
    let fee_totals = report::fee_totals(&clients.value);

    assert_eq!(roster_totals.classes, 3);
    assert_eq!(roster_totals.registrations, 3);
    assert_eq!(roster_totals.revenue, 55.5);
    assert_eq!(fee_totals.clients, 3);
    assert_eq!(fee_totals.revenue, 4020.0 + 10_035.5 + 2000.0);
}

#[test]
fn empty_table_files_give_empty_reports() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("members.txt"), "").expect("members written");
    fs::write(temp_dir.path().join("classes.txt"), "").expect("classes written");

    let (gym, warnings) = Gym::open(FlatFileStore::in_dir(temp_dir.path())).expect("gym opened");

    assert!(warnings.is_empty());
    assert!(gym.directory().is_empty());
    assert!(gym.schedule().is_empty());
    gym.require_table(TableKind::Members).expect("members table exists");
    gym.require_table(TableKind::Classes).expect("classes table exists");

    let rosters = class_rosters(gym.schedule(), gym.directory());
    let clients = client_fees(gym.schedule(), gym.directory(), &FeeSchedule::default());
    assert!(rosters.value.is_empty() && rosters.warnings.is_empty());
    assert!(clients.value.is_empty() && clients.warnings.is_empty());
    assert_eq!(report::roster_totals(&rosters.value).revenue, 0.0);
    assert_eq!(report::fee_totals(&clients.value).revenue, 0.0);
}

#[test]
fn trailing_comma_on_a_class_row_still_bills_it() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(
        temp_dir.path().join("classes.txt"),
        "C0001,Yoga,Mon,9am,20.0,Jane,\n",
    )
    .expect("classes written");
    fs::write(
        temp_dir.path().join("members.txt"),
        "M1001,Alice,Smith,1234567890,Gold,C0001\n",
    )
    .expect("members written");

    let (gym, warnings) = Gym::open(FlatFileStore::in_dir(temp_dir.path())).expect("gym opened");
    assert!(warnings.is_empty());
    let yoga = gym.schedule().get("C0001").expect("class parsed");
    assert_eq!(yoga.instructor, "Jane");

    let rosters = class_rosters(gym.schedule(), gym.directory());
    assert_eq!(rosters.value["C0001"].roster, vec!["Alice Smith"]);
    let clients = client_fees(gym.schedule(), gym.directory(), &FeeSchedule::default());
    assert_eq!(clients.value["M1001"].total_fee, 4020.0);
    assert!(clients.warnings.is_empty());
}

#[test]
fn registration_for_an_unreadable_class_warns_in_both_reports() {
    let classes: RawTable = RawTable::from([
        ("C0001".to_string(), row(&["Yoga", "Mon", "9am", "20.0", "Jane"])),
        ("C0002".to_string(), row(&["Spin", "Tue"])),
    ]);
    let members: RawTable = RawTable::from([(
        "M1001".to_string(),
        row(&["Alice", "Smith", "1234567890", "Gold", "C0001", "C0002"]),
    )]);
    let (schedule, class_warnings) = Schedule::from_table(classes);
    let (directory, _) = Directory::from_table(members);
    assert_eq!(class_warnings.len(), 1);

    let unreadable = Warning::UnreadableClass {
        member_id: "M1001".to_string(),
        class_id: "C0002".to_string(),
    };
    let rosters = class_rosters(&schedule, &directory);
    assert!(!rosters.value.contains_key("C0002"));
    assert_eq!(rosters.warnings, vec![unreadable.clone()]);

    let clients = client_fees(&schedule, &directory, &FeeSchedule::default());
    assert_eq!(clients.value["M1001"].total_fee, 4020.0);
    assert_eq!(clients.warnings, vec![unreadable]);
}
