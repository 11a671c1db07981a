use gym_billing::GymError;
use gym_billing::checkin::CheckInState;
use gym_billing::gym::{Gym, NewInstructor, NewMember, SessionDetails, SessionUpdate};
use gym_billing::io::store::{FlatFileStore, MemoryStore, RecordStore, TableKind};
use gym_billing::io::table::{self, RawTable};
use gym_billing::model::{MembershipType, Record};
use tempfile::tempdir;

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

fn seeded_store() -> MemoryStore {
    MemoryStore::new()
        .with_table(
            TableKind::Members,
            RawTable::from([
                (
                    "M1001".to_string(),
                    row(&["Alice", "Smith", "1234567890", "Gold"]),
                ),
                (
                    "I2002".to_string(),
                    row(&["Jane", "Doe", "5551234567", "123456789", "01011990"]),
                ),
            ]),
        )
        .with_table(
            TableKind::Classes,
            RawTable::from([(
                "C0001".to_string(),
                row(&["Yoga", "Mon", "9am", "20.0", "Jane"]),
            )]),
        )
}

fn yoga_details() -> SessionDetails {
    SessionDetails {
        name: "Pilates".to_string(),
        day: "Tue".to_string(),
        time: "10am".to_string(),
        cost: "25".to_string(),
        instructor: "Jane Doe".to_string(),
    }
}

#[test]
fn check_in_appends_the_class_and_saves_the_member_table() {
    let (mut gym, warnings) = Gym::open(seeded_store()).expect("gym opened");
    assert!(warnings.is_empty());

    let mut check_in = gym.check_in();
    assert_eq!(check_in.state(), &CheckInState::AwaitMemberId);
    check_in
        .select_member(gym.directory(), "M1001")
        .expect("member selected");
    assert_eq!(
        check_in.state(),
        &CheckInState::AwaitClassSelection {
            member_id: "M1001".to_string()
        }
    );

    let registration = check_in.commit(&mut gym, "C0001").expect("committed");

    assert_eq!(registration.class_name, "Yoga");
    assert!(matches!(check_in.state(), CheckInState::Committed(_)));
    assert!(
        gym.directory()
            .member("M1001")
            .expect("member present")
            .is_registered("C0001")
    );
    let saved = gym
        .store()
        .table(TableKind::Members)
        .expect("members saved");
    assert_eq!(
        saved["M1001"],
        row(&["Alice", "Smith", "1234567890", "Gold", "C0001"])
    );
}

#[test]
fn check_in_guards_reject_unknown_ids_and_keep_the_state() {
    let (mut gym, _) = Gym::open(seeded_store()).expect("gym opened");
    let mut check_in = gym.check_in();

    assert!(matches!(
        check_in.select_member(gym.directory(), "M9999"),
        Err(GymError::UnknownMember(_))
    ));
    assert!(matches!(
        check_in.select_member(gym.directory(), "I2002"),
        Err(GymError::UnknownMember(_))
    ));
    assert_eq!(check_in.state(), &CheckInState::AwaitMemberId);
    assert!(matches!(
        check_in.commit(&mut gym, "C0001"),
        Err(GymError::IncompleteCheckIn(_))
    ));

    check_in
        .select_member(gym.directory(), "M1001")
        .expect("member selected");
    assert!(matches!(
        check_in.commit(&mut gym, "C9999"),
        Err(GymError::UnknownSession(_))
    ));
    assert!(matches!(
        check_in.state(),
        CheckInState::AwaitClassSelection { .. }
    ));
    assert!(gym.store().table(TableKind::Members).expect("seeded")["M1001"].len() == 4);
}

#[test]
fn abandoned_check_in_changes_nothing() {
    let store = seeded_store();
    let before = store.table(TableKind::Members);
    let (gym, _) = Gym::open(store).expect("gym opened");

    let mut check_in = gym.check_in();
    check_in
        .select_member(gym.directory(), "M1001")
        .expect("member selected");
    drop(check_in);

    assert_eq!(gym.store().table(TableKind::Members), before);
    assert!(gym.directory().member("M1001").expect("member").classes.is_empty());
}

#[test]
fn failed_save_leaves_memory_unchanged() {
    let (mut gym, _) = Gym::open(seeded_store()).expect("gym opened");
    let before = gym.directory().clone();

    gym.store().set_fail_saves(true);
    let mut check_in = gym.check_in();
    check_in
        .select_member(gym.directory(), "M1001")
        .expect("member selected");
    let result = check_in.commit(&mut gym, "C0001");

    assert!(matches!(result, Err(GymError::Io(_))));
    assert_eq!(gym.directory(), &before);

    gym.store().set_fail_saves(false);
    check_in
        .commit(&mut gym, "C0001")
        .expect("retry after the store recovers");
    assert!(gym.directory().member("M1001").expect("member").is_registered("C0001"));
}

#[test]
fn second_registration_for_the_same_class_is_refused() {
    let (mut gym, _) = Gym::open(seeded_store()).expect("gym opened");

    for attempt in 0..2 {
        let mut check_in = gym.check_in();
        check_in
            .select_member(gym.directory(), "M1001")
            .expect("member selected");
        let result = check_in.commit(&mut gym, "C0001");
        if attempt == 0 {
            result.expect("first registration");
        } else {
            assert!(matches!(result, Err(GymError::AlreadyRegistered { .. })));
        }
    }

    assert_eq!(
        gym.directory().member("M1001").expect("member").classes,
        vec!["C0001"]
    );
}

#[test]
fn added_people_get_fresh_prefixed_ids() {
    let (mut gym, _) = Gym::open(MemoryStore::new()).expect("gym opened");
    let mut rng = rand::thread_rng();

    let member_id = gym
        .add_member(
            NewMember {
                first_name: "Bob".to_string(),
                last_name: "Jones".to_string(),
                contact_number: "0987654321".to_string(),
                membership_type: MembershipType::Diamond,
            },
            &mut rng,
        )
        .expect("member added");
    let instructor_id = gym
        .add_instructor(
            NewInstructor {
                first_name: "Jill".to_string(),
                last_name: "Hill".to_string(),
                contact_number: "5550001111".to_string(),
                tax_registration_number: "987654321".to_string(),
                date_of_birth: "02021985".to_string(),
            },
            &mut rng,
        )
        .expect("instructor added");

    assert!(member_id.starts_with('M') && member_id.len() == 5);
    assert!(instructor_id.starts_with('I') && instructor_id.len() == 5);
    match gym.directory().get(&member_id) {
        Some(Record::Member(member)) => assert_eq!(member.membership_type, "Diamond"),
        other => panic!("expected a member, got {other:?}"),
    }
    let saved = gym.store().table(TableKind::Members).expect("members saved");
    assert_eq!(
        saved[&instructor_id],
        row(&["Jill", "Hill", "5550001111", "987654321", "02021985"])
    );
}

#[test]
fn sessions_can_be_added_with_or_without_an_id() {
    let (mut gym, _) = Gym::open(seeded_store()).expect("gym opened");
    let mut rng = rand::thread_rng();

    let explicit = gym
        .add_session(Some("C0042"), yoga_details(), &mut rng)
        .expect("session added");
    let generated = gym
        .add_session(None, yoga_details(), &mut rng)
        .expect("session added");

    assert_eq!(explicit, "C0042");
    assert!(generated.starts_with('C') && generated != "C0001" && generated != "C0042");
    assert_eq!(gym.schedule().len(), 3);
    assert!(matches!(
        gym.add_session(Some("C0001"), yoga_details(), &mut rng),
        Err(GymError::DuplicateId(id)) if id == "C0001"
    ));
    assert!(matches!(
        gym.add_session(Some("X1"), yoga_details(), &mut rng),
        Err(GymError::Validation(_))
    ));
}

#[test]
fn update_session_overwrites_only_given_fields() {
    let (mut gym, _) = Gym::open(seeded_store()).expect("gym opened");

    gym.update_session(
        "C0001",
        SessionUpdate {
            cost: Some("22.5".to_string()),
            day: Some("Thu".to_string()),
            ..SessionUpdate::default()
        },
    )
    .expect("session updated");

    let saved = gym.store().table(TableKind::Classes).expect("classes saved");
    assert_eq!(saved["C0001"], row(&["Yoga", "Thu", "9am", "22.5", "Jane"]));
    assert!(matches!(
        gym.update_session("C0404", SessionUpdate::default()),
        Err(GymError::UnknownSession(_))
    ));
}

#[test]
fn missing_tables_are_reported_until_first_save() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = FlatFileStore::in_dir(temp_dir.path());
    let (mut gym, _) = Gym::open(store).expect("gym opened");

    assert!(matches!(
        gym.require_table(TableKind::Classes),
        Err(GymError::MissingTable(_))
    ));

    gym.add_session(None, yoga_details(), &mut rand::thread_rng())
        .expect("session added");

    gym.require_table(TableKind::Classes)
        .expect("classes table written");
    assert!(gym.require_table(TableKind::Members).is_err());
}

#[test]
fn flat_file_state_survives_reopening() {
    let temp_dir = tempdir().expect("temporary directory");
    let mut rng = rand::thread_rng();
    let member_id = {
        let (mut gym, _) =
            Gym::open(FlatFileStore::in_dir(temp_dir.path())).expect("gym opened");
        gym.add_session(Some("C0001"), yoga_details(), &mut rng)
            .expect("session added");
        let member_id = gym
            .add_member(
                NewMember {
                    first_name: "Alice".to_string(),
                    last_name: "Smith".to_string(),
                    contact_number: "1234567890".to_string(),
                    membership_type: MembershipType::Gold,
                },
                &mut rng,
            )
            .expect("member added");
        let mut check_in = gym.check_in();
        check_in
            .select_member(gym.directory(), &member_id)
            .expect("member selected");
        check_in.commit(&mut gym, "C0001").expect("committed");
        member_id
    };

    let store = FlatFileStore::in_dir(temp_dir.path());
    let members = table::load(store.path(TableKind::Members)).expect("members loaded");
    assert_eq!(
        members.table[&member_id],
        row(&["Alice", "Smith", "1234567890", "Gold", "C0001"])
    );

    let (gym, warnings) = Gym::open(store).expect("gym reopened");
    assert!(warnings.is_empty());
    assert!(gym.directory().member(&member_id).expect("member").is_registered("C0001"));
    assert_eq!(
        gym.store().load(TableKind::Classes).expect("classes").table.len(),
        1
    );
}
