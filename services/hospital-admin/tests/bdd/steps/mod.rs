//! BDD step definitions for the hospital admin console

pub mod bed_steps;
pub mod facility_steps;
pub mod inventory_steps;
pub mod patient_steps;
