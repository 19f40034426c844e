//! BDD step definitions for the patient registry

use cucumber::{given, then, when};

use hospital_admin::config::{PatientsConfig, RosterPolicy};
use hospital_admin::patients::{BedAssignment, PatientBoard};
use hospital_admin::NewPatient;

use crate::world::HospitalWorld;

#[given(expr = "{string} has patient {int} {string}")]
fn facility_has_patient(world: &mut HospitalWorld, facility: String, id: i64, name: String) {
    let url = world.url(&facility, "patients");
    let body = serde_json::json!([[id, name, "555-0100", 40, "F"]]).to_string();
    world.service.respond(&url, 200, &body);
}

#[given(expr = "{string} creates new patients with id {int}")]
fn creates_patients(world: &mut HospitalWorld, facility: String, id: i64) {
    let url = world.url(&facility, "add_patient");
    world
        .service
        .respond(&url, 200, &serde_json::json!([id]).to_string());
}

#[given(expr = "{string} fails bed assignments with status {int}")]
fn fails_bed_assignments(world: &mut HospitalWorld, facility: String, status: u16) {
    let url = world.url(&facility, "set_bed");
    world.service.respond(&url, status, "");
}

#[when(expr = "{string} accepts bed assignments again")]
fn accepts_bed_assignments(world: &mut HospitalWorld, facility: String) {
    let url = world.url(&facility, "set_bed");
    world.service.respond(&url, 200, r#"{"message": "ok"}"#);
}

fn open_patient_board(world: &mut HospitalWorld, policy: RosterPolicy) {
    let board = PatientBoard::new(
        world.http(),
        world.facilities.clone(),
        &PatientsConfig {
            roster_policy: policy,
        },
    )
    .unwrap();
    world.patient_board = Some(board);
}

#[when("I open the patient screen")]
async fn open_patient_screen(world: &mut HospitalWorld) {
    open_patient_board(world, RosterPolicy::AllOrNothing);
    let board = world.patient_board.as_mut().unwrap();
    if let Err(e) = board.refresh().await {
        world.last_error = Some(e.to_string());
    }
}

#[when("I open the patient screen reporting each facility separately")]
async fn open_patient_screen_per_facility(world: &mut HospitalWorld) {
    open_patient_board(world, RosterPolicy::PerFacility);
    let board = world.patient_board.as_mut().unwrap();
    if let Err(e) = board.refresh().await {
        world.last_error = Some(e.to_string());
    }
}

#[when(expr = "I admit {string} into bed {int}")]
async fn admit_into_bed(world: &mut HospitalWorld, name: String, bed_id: i64) {
    let board = world.patient_board.as_mut().expect("patient screen not open");
    board.open_admission().await.unwrap();
    board.admission_draft_mut().unwrap().patient = NewPatient {
        name,
        phone: "555-0199".to_string(),
        age: Some(52),
        sex: "M".to_string(),
        needs_bed: true,
    };
    board.choose_bed(bed_id).unwrap();
    match board.submit_admission().await {
        Ok(outcome) => world.admission = Some(outcome),
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when("I retry the bed assignment")]
async fn retry_assignment(world: &mut HospitalWorld) {
    let board = world.patient_board.as_mut().expect("patient screen not open");
    if let Err(e) = board.retry_bed_assignment().await {
        world.last_error = Some(e.to_string());
    }
}

#[then("the patient roster is empty")]
fn roster_empty(world: &mut HospitalWorld) {
    let board = world.patient_board.as_ref().expect("patient screen not open");
    assert!(board.rosters().is_empty());
}

#[then(expr = "the patient screen shows an error mentioning {string}")]
fn patient_error_mentions(world: &mut HospitalWorld, text: String) {
    let board = world.patient_board.as_ref().expect("patient screen not open");
    let error = board.error().expect("no error shown");
    assert!(error.contains(&text), "{} does not mention {}", error, text);
}

#[then(expr = "the roster of {string} lists {string}")]
fn roster_lists(world: &mut HospitalWorld, facility: String, name: String) {
    let board = world.patient_board.as_ref().expect("patient screen not open");
    let roster = board
        .rosters()
        .iter()
        .find(|r| r.facility.name == facility)
        .expect("no roster for facility");
    assert!(roster.error.is_none());
    assert!(roster.patients.iter().any(|p| p.name() == name));
}

#[then(expr = "the roster of {string} reports an error")]
fn roster_reports_error(world: &mut HospitalWorld, facility: String) {
    let board = world.patient_board.as_ref().expect("patient screen not open");
    let roster = board
        .rosters()
        .iter()
        .find(|r| r.facility.name == facility)
        .expect("no roster for facility");
    assert!(roster.patients.is_empty());
    assert!(roster.error.is_some());
}

#[then(expr = "patient {int} was created")]
fn patient_created(world: &mut HospitalWorld, id: i64) {
    let outcome = world.admission.as_ref().expect("no admission");
    assert_eq!(outcome.patient.id(), id);
}

#[then(expr = "the bed assignment of bed {int} failed")]
fn bed_assignment_failed(world: &mut HospitalWorld, bed_id: i64) {
    let outcome = world.admission.as_ref().expect("no admission");
    match &outcome.bed {
        BedAssignment::Failed { bed_id: failed, .. } => assert_eq!(*failed, bed_id),
        other => panic!("Expected failed assignment, got {:?}", other),
    }
    let board = world.patient_board.as_ref().unwrap();
    let pending = board.pending_assignment().expect("nothing pending");
    assert_eq!(pending.bed_id, bed_id);
}

#[then("no bed assignment is pending")]
fn nothing_pending(world: &mut HospitalWorld) {
    let board = world.patient_board.as_ref().expect("patient screen not open");
    assert!(board.pending_assignment().is_none());
}

#[then(expr = "{string} received {int} bed assignments")]
fn received_assignments(world: &mut HospitalWorld, facility: String, count: usize) {
    let url = world.url(&facility, "set_bed");
    let posts = world
        .service
        .posts()
        .into_iter()
        .filter(|(u, _)| *u == url)
        .count();
    assert_eq!(posts, count);
}
