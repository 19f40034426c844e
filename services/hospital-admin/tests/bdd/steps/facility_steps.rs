//! BDD step definitions for facility selection

use cucumber::{given, then, when};

use hospital_admin::{Facility, FacilitySelector};

use crate::world::HospitalWorld;

#[given(expr = "facilities {string}, {string} and {string}")]
fn three_facilities(world: &mut HospitalWorld, a: String, b: String, c: String) {
    world.facilities = [a, b, c]
        .into_iter()
        .map(|name| {
            let url = format!("http://{}:5000", name.to_lowercase());
            Facility::new(name, url)
        })
        .collect();
}

#[given(expr = "the facility {string} is unreachable")]
fn facility_unreachable(world: &mut HospitalWorld, name: String) {
    let url = world.facility(&name).url;
    world.service.take_down(&url);
}

#[given("a facility selector over those facilities")]
fn selector_over_facilities(world: &mut HospitalWorld) {
    world.selector = Some(FacilitySelector::new(world.facilities.clone()).unwrap());
}

#[when(expr = "I press next {int} times")]
fn press_next(world: &mut HospitalWorld, times: usize) {
    let selector = world.selector.as_mut().expect("no selector");
    for _ in 0..times {
        world.visited.push(selector.next().name.clone());
    }
}

#[when(expr = "I press previous {int} times")]
fn press_previous(world: &mut HospitalWorld, times: usize) {
    let selector = world.selector.as_mut().expect("no selector");
    for _ in 0..times {
        world.visited.push(selector.previous().name.clone());
    }
}

#[then(expr = "the visited facilities are {string}")]
fn visited_are(world: &mut HospitalWorld, expected: String) {
    let expected: Vec<&str> = expected.split(", ").collect();
    assert_eq!(world.visited, expected);
}

#[then(expr = "the selected facility is {string}")]
fn selected_is(world: &mut HospitalWorld, name: String) {
    let selector = world.selector.as_ref().expect("no selector");
    assert_eq!(selector.current().name, name);
}
