//! Console commands: each one drives a screen board the way a user would

use std::sync::Arc;

use clap::Subcommand;

use crate::beds::BedBoard;
use crate::config::Config;
use crate::facility::FacilitySelector;
use crate::inventory::{InventoryBoard, TransactionKind};
use crate::io::HttpClient;
use crate::models::{BedStatus, NewPatient};
use crate::patients::{PatientBoard, PatientRegistryClient};
use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configured facilities
    Facilities,
    /// Bed allotment
    #[command(subcommand)]
    Beds(BedsCommand),
    /// Medicine inventory
    #[command(subcommand)]
    Inventory(InventoryCommand),
    /// Patient registry
    #[command(subcommand)]
    Patients(PatientsCommand),
}

#[derive(Debug, Subcommand)]
pub enum BedsCommand {
    /// List every bed at the facility
    List,
    /// List only available beds
    Available,
    /// Change a bed's status
    Set {
        bed_id: i64,
        /// Available, Occupied or Reserved
        status: BedStatus,
        /// Occupying patient (ignored for Available)
        #[arg(long)]
        patient: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List medicine stock
    List,
    /// Record a purchase (defaults to the suggested replenishment)
    Buy {
        medicine_id: i64,
        #[arg(long)]
        quantity: Option<u32>,
    },
    /// Record a sale
    Sell {
        medicine_id: i64,
        #[arg(long)]
        quantity: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum PatientsCommand {
    /// Rosters of every facility
    List,
    /// Register a patient, optionally assigning an available bed
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        sex: String,
        #[arg(long)]
        bed: Option<i64>,
    },
    /// Assign a bed to an existing patient
    Assign { patient_id: i64, bed_id: i64 },
}

/// Resolve `--facility` as a 0-based index or a facility name
pub fn facility_index(config: &Config, facility: Option<&str>) -> Result<usize> {
    let mut selector = FacilitySelector::new(config.facilities.clone())?;
    match facility {
        None => Ok(0),
        Some(arg) => match arg.trim().parse::<usize>() {
            Ok(index) => Ok(selector.select(index).map(|_| index)?),
            Err(_) => {
                selector.select_by_name(arg)?;
                Ok(selector.index())
            }
        },
    }
}

/// Run one command and return its JSON output
pub async fn execute(
    config: &Config,
    facility: Option<&str>,
    http: Arc<dyn HttpClient>,
    command: Command,
) -> Result<serde_json::Value> {
    let index = facility_index(config, facility)?;
    tracing::debug!("Executing {:?} against facility {}", command, index);

    match command {
        Command::Facilities => Ok(serde_json::to_value(&config.facilities)?),
        Command::Beds(command) => {
            let mut board = BedBoard::new(http, config.facilities.clone(), &config.beds)?;
            board.select_facility(index).await?;
            match command {
                BedsCommand::List => Ok(serde_json::to_value(board.beds())?),
                BedsCommand::Available => {
                    let available: Vec<_> = board
                        .beds()
                        .iter()
                        .filter(|b| b.status() == BedStatus::Available)
                        .collect();
                    Ok(serde_json::to_value(available)?)
                }
                BedsCommand::Set {
                    bed_id,
                    status,
                    patient,
                } => {
                    board.open_editor(bed_id)?;
                    {
                        let edit = board.editor_mut()?;
                        edit.status = status;
                        edit.patient_id = patient;
                    }
                    let bed = board.save_editor().await?;
                    Ok(serde_json::to_value(bed)?)
                }
            }
        }
        Command::Inventory(command) => {
            let mut board =
                InventoryBoard::new(http, config.facilities.clone(), &config.inventory)?;
            board.select_facility(index).await?;
            let (kind, medicine_id, quantity) = match command {
                InventoryCommand::List => return Ok(serde_json::to_value(board.medicines())?),
                InventoryCommand::Buy {
                    medicine_id,
                    quantity,
                } => (TransactionKind::Buy, medicine_id, quantity),
                InventoryCommand::Sell {
                    medicine_id,
                    quantity,
                } => (TransactionKind::Sell, medicine_id, Some(quantity)),
            };
            board.open_transaction(kind, Some(medicine_id))?;
            if let Some(quantity) = quantity {
                board.set_quantity(quantity)?;
            }
            let outcome = board.confirm_transaction().await?;
            Ok(serde_json::to_value(outcome)?)
        }
        Command::Patients(command) => {
            let mut board = PatientBoard::new(
                Arc::clone(&http),
                config.facilities.clone(),
                &config.patients,
            )?;
            board.select_facility(index)?;
            match command {
                PatientsCommand::List => {
                    let rosters = board.refresh().await?;
                    Ok(serde_json::to_value(rosters)?)
                }
                PatientsCommand::Add {
                    name,
                    phone,
                    age,
                    sex,
                    bed,
                } => {
                    let loaded = board.open_admission().await.map(|beds| beds.len());
                    match (bed, loaded) {
                        (Some(_), Err(e)) => return Err(e),
                        (None, Err(e)) => {
                            tracing::debug!("No bed requested, ignoring bed lookup failure: {}", e)
                        }
                        (_, Ok(count)) => tracing::debug!("{} beds available", count),
                    }
                    board.admission_draft_mut()?.patient = NewPatient {
                        name,
                        phone,
                        age: Some(age),
                        sex,
                        needs_bed: bed.is_some(),
                    };
                    if let Some(bed_id) = bed {
                        board.choose_bed(bed_id)?;
                    }
                    let outcome = board.submit_admission().await?;
                    Ok(serde_json::to_value(outcome)?)
                }
                PatientsCommand::Assign { patient_id, bed_id } => {
                    let client = PatientRegistryClient::new(http);
                    client
                        .assign_bed(board.facility(), patient_id, bed_id)
                        .await?;
                    Ok(serde_json::json!({
                        "patient_id": patient_id,
                        "bed_id": bed_id,
                        "status": BedStatus::Occupied,
                    }))
                }
            }
        }
    }
}
