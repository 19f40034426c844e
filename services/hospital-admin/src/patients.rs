//! Patient registry: rosters across every facility and patient admission with optional bed assignment
//!
//! Admission is two independent calls, `add_patient` then `set_bed`. If the
//! second fails the patient stays created; the failed assignment is kept
//! as a pending step that can be retried on its own.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};

use crate::beds::BedRegistryClient;
use crate::config::{PatientsConfig, RosterPolicy};
use crate::dialog::Dialog;
use crate::facility::{Facility, FacilitySelector};
use crate::io::HttpClient;
use crate::models::{Bed, BedStatus, Integer, NewPatient, Patient};
use crate::wire::{self, AddPatientRequest, SetBedRequest};
use crate::{HospitalError, Result};

/// Patients of one facility, or why they could not be loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRoster {
    pub facility: Facility,
    pub patients: Vec<Patient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened to the bed half of an admission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BedAssignment {
    NotRequested,
    Assigned { bed_id: i64 },
    Failed { bed_id: i64, error: String },
}

/// An admission whose patient exists but whose bed was never assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBedAssignment {
    pub facility: Facility,
    pub patient_id: i64,
    pub bed_id: i64,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionOutcome {
    pub patient: Patient,
    pub bed: BedAssignment,
}

/// Contents of the add-patient dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDraft {
    pub patient: NewPatient,
    pub bed_id: Option<i64>,
}

/// Wire client for the patient routes of a hospital service
pub struct PatientRegistryClient {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PatientRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientRegistryClient").finish()
    }
}

impl PatientRegistryClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// `GET /patients`
    pub async fn load_patients(&self, facility: &Facility) -> Result<Vec<Patient>> {
        let url = facility.endpoint(wire::PATIENTS_ROUTE);
        tracing::debug!("Loading patients for {} from {}", facility.name, url);
        let response = self.http.get(&url).await?;
        let response = wire::ensure_success(response)?;
        wire::decode_rows(&response.body)
    }

    /// Fan out to every facility at once; the first failure fails the whole roster
    pub async fn load_all_facilities(&self, facilities: &[Facility]) -> Result<Vec<FacilityRoster>> {
        try_join_all(facilities.iter().map(|facility| async move {
            let patients = self.load_patients(facility).await?;
            Ok::<_, HospitalError>(FacilityRoster {
                facility: facility.clone(),
                patients,
                error: None,
            })
        }))
        .await
    }

    /// Fan out to every facility at once, keeping each facility's own outcome
    pub async fn load_each_facility(&self, facilities: &[Facility]) -> Vec<FacilityRoster> {
        join_all(facilities.iter().map(|facility| async move {
            match self.load_patients(facility).await {
                Ok(patients) => FacilityRoster {
                    facility: facility.clone(),
                    patients,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!("Loading patients for {} failed: {}", facility.name, e);
                    FacilityRoster {
                        facility: facility.clone(),
                        patients: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            }
        }))
        .await
    }

    /// `POST /add_patient`; the service answers with the new patient row
    pub async fn add_patient(&self, facility: &Facility, patient: &NewPatient) -> Result<Patient> {
        let request = AddPatientRequest::from_new_patient(patient)?;
        let url = facility.endpoint(wire::ADD_PATIENT_ROUTE);
        let body = wire::to_body(&request)?;
        let response = self.http.post_json(&url, &body).await?;
        let response = wire::ensure_success(response)?;

        // Only the id at index 0 is guaranteed; fall back to the submitted details
        if let Ok(created) = wire::decode_record::<Patient>(&response.body) {
            return Ok(created);
        }
        let row = wire::decode_ack(&response.body)?;
        let id = row
            .get(0)
            .cloned()
            .and_then(|v| serde_json::from_value::<Integer>(v).ok())
            .ok_or_else(|| HospitalError::Shape("Created patient has no id".to_string()))?
            .into_i64("patient id")?;
        Ok(Patient::new(
            id,
            request.name,
            request.phone,
            request.age,
            request.sex,
        ))
    }

    /// `POST /set_bed` marking the bed occupied by the patient
    pub async fn assign_bed(&self, facility: &Facility, patient_id: i64, bed_id: i64) -> Result<()> {
        let url = facility.endpoint(wire::SET_BED_ROUTE);
        let body = wire::to_body(&SetBedRequest {
            bed_id,
            status: BedStatus::Occupied,
            patient_id: Some(patient_id),
        })?;
        let response = self.http.post_json(&url, &body).await?;
        wire::ensure_success(response)?;
        Ok(())
    }
}

/// State behind the patient registry screen
#[derive(Debug)]
pub struct PatientBoard {
    client: PatientRegistryClient,
    beds: BedRegistryClient,
    selector: FacilitySelector,
    policy: RosterPolicy,
    rosters: Vec<FacilityRoster>,
    error: Option<String>,
    dialog: Dialog<AdmissionDraft>,
    available_beds: Vec<Bed>,
    pending: Option<PendingBedAssignment>,
}

impl PatientBoard {
    pub fn new(
        http: Arc<dyn HttpClient>,
        facilities: Vec<Facility>,
        config: &PatientsConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: PatientRegistryClient::new(Arc::clone(&http)),
            beds: BedRegistryClient::new(http),
            selector: FacilitySelector::new(facilities)?,
            policy: config.roster_policy,
            rosters: Vec::new(),
            error: None,
            dialog: Dialog::new(),
            available_beds: Vec::new(),
            pending: None,
        })
    }

    pub fn facility(&self) -> &Facility {
        self.selector.current()
    }

    pub fn selector(&self) -> &FacilitySelector {
        &self.selector
    }

    pub fn rosters(&self) -> &[FacilityRoster] {
        &self.rosters
    }

    /// Roster of the selected facility, if loaded
    pub fn current_roster(&self) -> Option<&FacilityRoster> {
        let current = self.selector.current();
        self.rosters.iter().find(|r| &r.facility == current)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dialog(&self) -> &Dialog<AdmissionDraft> {
        &self.dialog
    }

    pub fn available_beds(&self) -> &[Bed] {
        &self.available_beds
    }

    pub fn pending_assignment(&self) -> Option<&PendingBedAssignment> {
        self.pending.as_ref()
    }

    /// Load every facility's roster according to the configured policy
    pub async fn refresh(&mut self) -> Result<&[FacilityRoster]> {
        let facilities = self.selector.facilities().to_vec();
        match self.policy {
            RosterPolicy::AllOrNothing => match self.client.load_all_facilities(&facilities).await {
                Ok(rosters) => {
                    self.rosters = rosters;
                    self.error = None;
                }
                Err(e) => {
                    tracing::warn!("Loading patient rosters failed: {}", e);
                    self.rosters.clear();
                    self.error = Some(e.to_string());
                    return Err(e);
                }
            },
            RosterPolicy::PerFacility => {
                self.rosters = self.client.load_each_facility(&facilities).await;
                self.error = None;
            }
        }
        Ok(&self.rosters)
    }

    pub fn next_facility(&mut self) -> &Facility {
        self.selector.next()
    }

    pub fn previous_facility(&mut self) -> &Facility {
        self.selector.previous()
    }

    pub fn select_facility(&mut self, index: usize) -> Result<&Facility> {
        self.selector.select(index)
    }

    /// Open the add-patient dialog and fetch the selected facility's free beds
    pub async fn open_admission(&mut self) -> Result<&[Bed]> {
        self.dialog.open(AdmissionDraft::default());
        self.available_beds.clear();
        let facility = self.selector.current().clone();
        match self.beds.load_available_beds(&facility).await {
            Ok(beds) => {
                self.available_beds = beds;
                Ok(&self.available_beds)
            }
            Err(e) => {
                tracing::warn!("Loading available beds for {} failed: {}", facility.name, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn admission_draft_mut(&mut self) -> Result<&mut AdmissionDraft> {
        self.dialog.draft_mut()
    }

    /// Toggle "needs bed"; switching it off forgets the chosen bed
    pub fn set_needs_bed(&mut self, needs_bed: bool) -> Result<()> {
        let draft = self.dialog.draft_mut()?;
        draft.patient.needs_bed = needs_bed;
        if !needs_bed {
            draft.bed_id = None;
        }
        Ok(())
    }

    /// Pick one of the beds fetched when the dialog opened
    pub fn choose_bed(&mut self, bed_id: i64) -> Result<()> {
        if !self.available_beds.iter().any(|b| b.id() == bed_id) {
            return Err(HospitalError::NotFound(format!(
                "Available bed {}",
                bed_id
            )));
        }
        self.dialog.draft_mut()?.bed_id = Some(bed_id);
        Ok(())
    }

    pub fn close_admission(&mut self) {
        self.dialog.close();
        self.available_beds.clear();
    }

    /// Submit the add-patient dialog
    pub async fn submit_admission(&mut self) -> Result<AdmissionOutcome> {
        let draft = self.dialog.begin_submit()?;
        let result = self.admit(&draft.patient, draft.bed_id).await;
        self.dialog.complete(&result);
        if result.is_ok() {
            self.available_beds.clear();
        }
        result
    }

    /// Create a patient at the selected facility, then assign a bed if one was asked for
    pub async fn admit(&mut self, patient: &NewPatient, bed_id: Option<i64>) -> Result<AdmissionOutcome> {
        let facility = self.selector.current().clone();

        let created = match self.client.add_patient(&facility, patient).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Adding patient at {} failed: {}", facility.name, e);
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        self.error = None;
        tracing::info!(
            "Patient {} ({}) added at {}",
            created.id(),
            created.name(),
            facility.name
        );

        if let Some(roster) = self.rosters.iter_mut().find(|r| r.facility == facility) {
            roster.patients.push(created.clone());
        }

        let bed = match bed_id.filter(|_| patient.needs_bed) {
            None => BedAssignment::NotRequested,
            Some(bed_id) => match self.assign(&facility, created.id(), bed_id).await {
                Ok(()) => BedAssignment::Assigned { bed_id },
                Err(_) => BedAssignment::Failed {
                    bed_id,
                    error: self.error.clone().unwrap_or_default(),
                },
            },
        };

        Ok(AdmissionOutcome {
            patient: created,
            bed,
        })
    }

    /// Re-issue only the bed assignment of the last partially completed admission
    pub async fn retry_bed_assignment(&mut self) -> Result<BedAssignment> {
        let pending = self.pending.take().ok_or_else(|| {
            HospitalError::InvalidState("No bed assignment is pending".to_string())
        })?;
        self.assign(&pending.facility, pending.patient_id, pending.bed_id)
            .await?;
        Ok(BedAssignment::Assigned {
            bed_id: pending.bed_id,
        })
    }

    async fn assign(&mut self, facility: &Facility, patient_id: i64, bed_id: i64) -> Result<()> {
        match self.client.assign_bed(facility, patient_id, bed_id).await {
            Ok(()) => {
                tracing::info!(
                    "Bed {} at {} assigned to patient {}",
                    bed_id,
                    facility.name,
                    patient_id
                );
                self.available_beds.retain(|b| b.id() != bed_id);
                self.pending = None;
                Ok(())
            }
            Err(e) => {
                let error = format!(
                    "Patient {} was created but bed {} was not assigned: {}",
                    patient_id, bed_id, e
                );
                tracing::warn!("{}", error);
                self.error = Some(error.clone());
                self.pending = Some(PendingBedAssignment {
                    facility: facility.clone(),
                    patient_id,
                    bed_id,
                    error,
                });
                Err(e)
            }
        }
    }
}
