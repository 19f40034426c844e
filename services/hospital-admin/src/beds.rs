//! Bed registry: fetch a facility's beds and move them between statuses

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collection::{ResourceCollection, SyncStrategy};
use crate::config::BedsConfig;
use crate::dialog::Dialog;
use crate::facility::{Facility, FacilitySelector};
use crate::io::HttpClient;
use crate::models::{Bed, BedStatus};
use crate::wire::{self, SetBedRequest};
use crate::Result;

/// Wire client for the bed routes of a hospital service
pub struct BedRegistryClient {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BedRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedRegistryClient").finish()
    }
}

impl BedRegistryClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// `GET /beds`
    pub async fn load_beds(&self, facility: &Facility) -> Result<Vec<Bed>> {
        let url = facility.endpoint(wire::BEDS_ROUTE);
        tracing::debug!("Loading beds for {} from {}", facility.name, url);
        let response = self.http.get(&url).await?;
        let response = wire::ensure_success_reporting_bad_request(response)?;
        wire::decode_rows(&response.body)
    }

    /// Beds of `facility` that are currently available
    pub async fn load_available_beds(&self, facility: &Facility) -> Result<Vec<Bed>> {
        let beds = self.load_beds(facility).await?;
        Ok(beds
            .into_iter()
            .filter(|b| b.status() == BedStatus::Available)
            .collect())
    }

    /// `POST /set_bed`
    pub async fn submit_status(&self, facility: &Facility, request: &SetBedRequest) -> Result<()> {
        let url = facility.endpoint(wire::SET_BED_ROUTE);
        let body = wire::to_body(request)?;
        let response = self.http.post_json(&url, &body).await?;
        let response = wire::ensure_success_with_body(response)?;
        let ack = wire::decode_ack(&response.body)?;
        tracing::debug!("set_bed acknowledged by {}: {}", facility.name, ack);
        Ok(())
    }
}

/// Contents of the bed edit dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedEdit {
    pub bed_id: i64,
    pub status: BedStatus,
    pub patient_id: Option<i64>,
}

/// State behind the bed allotment screen
#[derive(Debug)]
pub struct BedBoard {
    client: BedRegistryClient,
    selector: FacilitySelector,
    beds: ResourceCollection<Bed>,
    editor: Dialog<BedEdit>,
    after_write: SyncStrategy,
}

impl BedBoard {
    pub fn new(
        http: Arc<dyn HttpClient>,
        facilities: Vec<Facility>,
        config: &BedsConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: BedRegistryClient::new(http),
            selector: FacilitySelector::new(facilities)?,
            beds: ResourceCollection::new(),
            editor: Dialog::new(),
            after_write: config.after_write,
        })
    }

    pub fn facility(&self) -> &Facility {
        self.selector.current()
    }

    pub fn selector(&self) -> &FacilitySelector {
        &self.selector
    }

    pub fn beds(&self) -> &[Bed] {
        self.beds.items()
    }

    pub fn error(&self) -> Option<&str> {
        self.beds.error()
    }

    pub fn editor(&self) -> &Dialog<BedEdit> {
        &self.editor
    }

    /// Re-fetch the selected facility's beds, replacing the local list
    pub async fn refresh(&mut self) -> Result<&[Bed]> {
        let facility = self.selector.current().clone();
        match self.client.load_beds(&facility).await {
            Ok(beds) => {
                self.beds.replace_all(&facility, beds);
                Ok(self.beds.items())
            }
            Err(e) => {
                tracing::warn!("Fetching bed data for {} failed: {}", facility.name, e);
                // Records of another facility must not stay writable
                if self.beds.source() != Some(&facility) {
                    self.beds.clear();
                }
                self.beds
                    .record_error(format!("Failed to fetch bed data: {}", e));
                Err(e)
            }
        }
    }

    pub async fn next_facility(&mut self) -> Result<&[Bed]> {
        self.selector.next();
        self.refresh().await
    }

    pub async fn previous_facility(&mut self) -> Result<&[Bed]> {
        self.selector.previous();
        self.refresh().await
    }

    pub async fn select_facility(&mut self, index: usize) -> Result<&[Bed]> {
        self.selector.select(index)?;
        self.refresh().await
    }

    /// Open the edit dialog for a bed, pre-filled from its current record
    pub fn open_editor(&mut self, bed_id: i64) -> Result<()> {
        let bed = self.beds.require(bed_id)?;
        self.editor.open(BedEdit {
            bed_id,
            status: bed.status(),
            patient_id: bed.occupant(),
        });
        Ok(())
    }

    pub fn editor_mut(&mut self) -> Result<&mut BedEdit> {
        self.editor.draft_mut()
    }

    pub fn close_editor(&mut self) {
        self.editor.close();
    }

    /// Submit the edit dialog
    pub async fn save_editor(&mut self) -> Result<Bed> {
        let edit = self.editor.begin_submit()?;
        let result = self
            .set_bed_status(edit.bed_id, edit.status, edit.patient_id)
            .await;
        self.editor.complete(&result);
        result
    }

    /// Move a bed to `status`; the occupant is always cleared for `Available`
    pub async fn set_bed_status(
        &mut self,
        bed_id: i64,
        status: BedStatus,
        patient_id: Option<i64>,
    ) -> Result<Bed> {
        let updated = match self.beds.require(bed_id) {
            Ok(current) => current.with_status(status, patient_id),
            Err(e) => {
                self.beds
                    .record_error(format!("Failed to update bed status: {}", e));
                return Err(e);
            }
        };

        let request = SetBedRequest {
            bed_id,
            status: updated.status(),
            patient_id: updated.occupant(),
        };
        let facility = self.selector.current().clone();

        if let Err(e) = self.client.submit_status(&facility, &request).await {
            tracing::warn!("Updating bed {} at {} failed: {}", bed_id, facility.name, e);
            self.beds
                .record_error(format!("Failed to update bed status: {}", e));
            return Err(e);
        }

        tracing::info!(
            "Bed {} at {} set to {} (patient {:?})",
            bed_id,
            facility.name,
            updated.status(),
            updated.occupant()
        );

        match self.after_write {
            SyncStrategy::Patch => {
                self.beds.patch(updated.clone())?;
                Ok(updated)
            }
            SyncStrategy::Refresh => {
                let refreshed = self.refresh().await.map(|_| ());
                match refreshed {
                    Ok(()) => Ok(self.beds.get(bed_id).cloned().unwrap_or(updated)),
                    Err(e) => {
                        // The write stands; keep the fetch error shown and patch locally
                        tracing::warn!("Bed {} saved but re-fetch failed: {}", bed_id, e);
                        if let Err(e) = self.beds.patch(updated.clone()) {
                            tracing::debug!("Bed {} not patched: {}", bed_id, e);
                        }
                        Ok(updated)
                    }
                }
            }
        }
    }
}
