//! BDD step definitions for bed allotment

use cucumber::{gherkin::Step, given, then, when};

use hospital_admin::beds::BedBoard;
use hospital_admin::config::BedsConfig;
use hospital_admin::BedStatus;

use crate::world::HospitalWorld;

#[given(expr = "{string} reports these beds:")]
fn facility_reports_beds(world: &mut HospitalWorld, facility: String, step: &Step) {
    let table = step.table.as_ref().expect("bed table");
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let occupant = row[4].trim();
            serde_json::json!([
                row[0].parse::<i64>().unwrap(),
                row[1],
                row[2],
                row[3],
                if occupant.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::json!(occupant.parse::<i64>().unwrap())
                },
            ])
        })
        .collect();
    let url = world.url(&facility, "beds");
    world
        .service
        .respond(&url, 200, &serde_json::Value::Array(rows).to_string());
}

#[given(expr = "{string} rejects bed updates with status {int} and body {string}")]
fn rejects_bed_updates(world: &mut HospitalWorld, facility: String, status: u16, body: String) {
    let url = world.url(&facility, "set_bed");
    world.service.respond(&url, status, &body);
}

#[when("I open the bed screen")]
async fn open_bed_screen(world: &mut HospitalWorld) {
    let mut board = BedBoard::new(
        world.http(),
        world.facilities.clone(),
        &BedsConfig::default(),
    )
    .unwrap();
    if let Err(e) = board.refresh().await {
        world.last_error = Some(e.to_string());
    }
    world.bed_board = Some(board);
}

#[when(expr = "I set bed {int} to {string} for patient {int}")]
async fn set_bed_for_patient(world: &mut HospitalWorld, bed_id: i64, status: String, patient: i64) {
    let status: BedStatus = status.parse().unwrap();
    let board = world.bed_board.as_mut().expect("bed screen not open");
    board.open_editor(bed_id).unwrap();
    {
        let edit = board.editor_mut().unwrap();
        edit.status = status;
        edit.patient_id = Some(patient);
    }
    if let Err(e) = board.save_editor().await {
        world.last_error = Some(e.to_string());
    }
}

#[when(expr = "I set bed {int} to {string}")]
async fn set_bed(world: &mut HospitalWorld, bed_id: i64, status: String) {
    let status: BedStatus = status.parse().unwrap();
    let board = world.bed_board.as_mut().expect("bed screen not open");
    if let Err(e) = board.set_bed_status(bed_id, status, None).await {
        world.last_error = Some(e.to_string());
    }
}

#[then(expr = "bed {int} is shown as {string} with occupant {int}")]
fn bed_shown_with_occupant(world: &mut HospitalWorld, bed_id: i64, status: String, occupant: i64) {
    let board = world.bed_board.as_ref().expect("bed screen not open");
    let bed = board.beds().iter().find(|b| b.id() == bed_id).unwrap();
    assert_eq!(bed.status().to_string(), status);
    assert_eq!(bed.occupant(), Some(occupant));
}

#[then(expr = "bed {int} is shown as {string} with no occupant")]
fn bed_shown_without_occupant(world: &mut HospitalWorld, bed_id: i64, status: String) {
    let board = world.bed_board.as_ref().expect("bed screen not open");
    let bed = board.beds().iter().find(|b| b.id() == bed_id).unwrap();
    assert_eq!(bed.status().to_string(), status);
    assert_eq!(bed.occupant(), None);
}

#[then(expr = "{string} received a bed update {string}")]
fn received_bed_update(world: &mut HospitalWorld, facility: String, body: String) {
    let url = world.url(&facility, "set_bed");
    let expected: serde_json::Value = serde_json::from_str(&body).unwrap();
    let posts: Vec<_> = world
        .service
        .posts()
        .into_iter()
        .filter(|(u, _)| *u == url)
        .map(|(_, b)| b)
        .collect();
    assert_eq!(posts, vec![expected]);
}

#[then(expr = "the bed screen shows the error {string}")]
fn bed_screen_error(world: &mut HospitalWorld, message: String) {
    let board = world.bed_board.as_ref().expect("bed screen not open");
    assert_eq!(board.error(), Some(message.as_str()));
}

#[then("the bed edit dialog is still open")]
fn bed_dialog_open(world: &mut HospitalWorld) {
    let board = world.bed_board.as_ref().expect("bed screen not open");
    assert!(board.editor().is_open());
    assert!(board.editor().error().is_some());
}
