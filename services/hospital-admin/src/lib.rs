//! Hospital admin - bed, medicine inventory and patient registry client
//!
//! Talks to the REST routes each hospital facility exposes and keeps the
//! per-screen state (record lists, dialogs, notices) consistent with them.

pub mod beds;
pub mod collection;
pub mod config;
pub mod console;
pub mod dialog;
pub mod error;
pub mod facility;
pub mod inventory;
pub mod io;
pub mod models;
pub mod patients;
pub mod wire;

pub use config::{load_config, Config};
pub use error::{HospitalError, Result};
pub use facility::{Facility, FacilitySelector};
pub use models::{Bed, BedStatus, Medicine, NewPatient, Patient};

use std::sync::Arc;

use crate::console::Command;
use crate::io::{HttpClient, ReqwestHttpClient};

/// Run one console command against the configured facilities
pub async fn run(
    config: Config,
    facility: Option<&str>,
    command: Command,
) -> Result<serde_json::Value> {
    config.validate()?;
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.http.request_timeout())?);
    console::execute(&config, facility, http, command).await
}
