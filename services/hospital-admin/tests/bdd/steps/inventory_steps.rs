//! BDD step definitions for the medicine inventory

use cucumber::{given, then, when};

use hospital_admin::config::InventoryConfig;
use hospital_admin::inventory::{InventoryBoard, TransactionKind};

use crate::world::HospitalWorld;

#[given(expr = "{string} stocks medicine {int} {string} at {float} with {int} units expiring {string}")]
fn facility_stocks(
    world: &mut HospitalWorld,
    facility: String,
    id: i64,
    name: String,
    price: f64,
    quantity: i64,
    expiry: String,
) {
    let url = world.url(&facility, "medicines");
    let body = serde_json::json!([[id, name, price, quantity, expiry]]).to_string();
    world.service.respond(&url, 200, &body);
}

#[when("I open the inventory screen")]
async fn open_inventory(world: &mut HospitalWorld) {
    let mut board = InventoryBoard::new(
        world.http(),
        world.facilities.clone(),
        &InventoryConfig::default(),
    )
    .unwrap();
    if let Err(e) = board.refresh().await {
        world.last_error = Some(e.to_string());
    }
    world.inventory_board = Some(board);
}

#[when(expr = "I {word} {int} units of medicine {int}")]
async fn transact(world: &mut HospitalWorld, kind: String, quantity: u32, medicine_id: i64) {
    let kind: TransactionKind = kind.parse().unwrap();
    let board = world.inventory_board.as_mut().expect("inventory screen not open");
    board.open_transaction(kind, Some(medicine_id)).unwrap();
    board.set_quantity(quantity).unwrap();
    match board.confirm_transaction().await {
        Ok(outcome) => world.transaction = Some(outcome),
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when(expr = "I open a {word} of medicine {int}")]
fn open_transaction(world: &mut HospitalWorld, kind: String, medicine_id: i64) {
    let kind: TransactionKind = kind.parse().unwrap();
    let board = world.inventory_board.as_mut().expect("inventory screen not open");
    board.open_transaction(kind, Some(medicine_id)).unwrap();
}

#[when("I act on the low stock notice")]
fn act_on_notice(world: &mut HospitalWorld) {
    let board = world.inventory_board.as_mut().expect("inventory screen not open");
    let notice = board.notices().first().cloned().expect("no notice");
    board.restock_from_notice(&notice).unwrap();
}

#[then(expr = "{string} received a quantity update {string}")]
fn received_quantity_update(world: &mut HospitalWorld, facility: String, body: String) {
    let url = world.url(&facility, "set_medicine");
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

#[then("no quantity update was sent")]
fn no_quantity_update(world: &mut HospitalWorld) {
    assert!(world.service.posts_to("set_medicine").is_empty());
}

#[then(expr = "medicine {int} is shown with {int} units")]
fn medicine_shown(world: &mut HospitalWorld, medicine_id: i64, quantity: u32) {
    let board = world.inventory_board.as_ref().expect("inventory screen not open");
    let medicine = board
        .medicines()
        .iter()
        .find(|m| m.id() == medicine_id)
        .unwrap();
    assert_eq!(medicine.quantity(), quantity);
}

#[then(expr = "a low stock notice for {string} with {int} units is raised")]
fn notice_raised(world: &mut HospitalWorld, name: String, quantity: u32) {
    let board = world.inventory_board.as_ref().expect("inventory screen not open");
    let notice = board.notices().last().expect("no notice");
    assert_eq!(notice.name, name);
    assert_eq!(notice.quantity, quantity);
    let outcome = world.transaction.as_ref().expect("no transaction");
    assert_eq!(outcome.low_stock.as_ref(), Some(notice));
}

#[then("no low stock notice is raised")]
fn no_notice(world: &mut HospitalWorld) {
    let board = world.inventory_board.as_ref().expect("inventory screen not open");
    assert!(board.notices().is_empty());
}

#[then(expr = "the transaction is rejected with {string}")]
fn transaction_rejected(world: &mut HospitalWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}

#[then(expr = "the purchase dialog suggests {int} units")]
fn purchase_suggests(world: &mut HospitalWorld, quantity: u32) {
    let board = world.inventory_board.as_ref().expect("inventory screen not open");
    let draft = board.dialog().draft().expect("dialog closed");
    assert_eq!(draft.kind, TransactionKind::Buy);
    assert_eq!(draft.quantity, quantity);
}
