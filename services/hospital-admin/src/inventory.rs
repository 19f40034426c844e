//! Medicine inventory: stock levels per facility, buy/sell transactions and low-stock notices

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collection::{ResourceCollection, SyncStrategy};
use crate::config::InventoryConfig;
use crate::dialog::Dialog;
use crate::facility::{Facility, FacilitySelector};
use crate::io::HttpClient;
use crate::models::Medicine;
use crate::wire::{self, SetMedicineRequest};
use crate::{HospitalError, Result};

/// Default stock level at or below which a sale raises a notice
pub const THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "buy"),
            TransactionKind::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = HospitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionKind::Buy),
            "sell" => Ok(TransactionKind::Sell),
            other => Err(HospitalError::Validation(format!(
                "Unknown transaction kind '{}'",
                other
            ))),
        }
    }
}

/// Stock after a transaction; a sale never takes stock below zero
pub fn new_quantity(kind: TransactionKind, current: u32, delta: u32) -> u32 {
    match kind {
        TransactionKind::Buy => current.saturating_add(delta),
        TransactionKind::Sell => current.saturating_sub(delta),
    }
}

/// Largest quantity a transaction may carry: current stock for a sale, unbounded for a purchase
pub fn max_quantity(kind: TransactionKind, medicine: &Medicine) -> Option<u32> {
    match kind {
        TransactionKind::Buy => None,
        TransactionKind::Sell => Some(medicine.quantity()),
    }
}

pub fn validate_delta(kind: TransactionKind, medicine: &Medicine, delta: u32) -> Result<()> {
    if delta == 0 {
        return Err(HospitalError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if let Some(max) = max_quantity(kind, medicine) {
        if delta > max {
            return Err(HospitalError::Validation(format!(
                "Cannot sell {} of {}: only {} in stock",
                delta,
                medicine.name(),
                max
            )));
        }
    }
    Ok(())
}

/// Quantity the dialog starts with: enough to lift low stock one above the threshold
pub fn suggested_quantity(kind: TransactionKind, current: u32, threshold: u32) -> u32 {
    if kind == TransactionKind::Buy && current <= threshold {
        (threshold - current).saturating_add(1)
    } else {
        1
    }
}

/// Only sales raise low-stock notices
pub fn is_low_stock(kind: TransactionKind, new_quantity: u32, threshold: u32) -> bool {
    kind == TransactionKind::Sell && new_quantity <= threshold
}

/// Raised after a sale leaves a medicine at or below the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockNotice {
    pub medicine_id: i64,
    pub name: String,
    pub quantity: u32,
    pub threshold: u32,
}

/// Contents of the buy/sell dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub medicine_id: Option<i64>,
    pub quantity: u32,
}

/// A completed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub kind: TransactionKind,
    pub medicine: Medicine,
    pub low_stock: Option<LowStockNotice>,
}

/// Wire client for the medicine routes of a hospital service
pub struct InventoryClient {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryClient").finish()
    }
}

impl InventoryClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// `GET /medicines`
    pub async fn load_inventory(&self, facility: &Facility) -> Result<Vec<Medicine>> {
        let url = facility.endpoint(wire::MEDICINES_ROUTE);
        tracing::debug!("Loading inventory for {} from {}", facility.name, url);
        let response = self.http.get(&url).await?;
        let response = wire::ensure_success(response)?;
        wire::decode_rows(&response.body)
    }

    /// `POST /set_medicine` with the absolute new quantity
    pub async fn set_quantity(
        &self,
        facility: &Facility,
        medicine_id: i64,
        quantity: u32,
    ) -> Result<()> {
        let url = facility.endpoint(wire::SET_MEDICINE_ROUTE);
        let body = wire::to_body(&SetMedicineRequest {
            medicine_id,
            quantity,
        })?;
        let response = self.http.post_json(&url, &body).await?;
        wire::ensure_success(response)?;
        Ok(())
    }
}

/// State behind the medicine inventory screen
#[derive(Debug)]
pub struct InventoryBoard {
    client: InventoryClient,
    selector: FacilitySelector,
    medicines: ResourceCollection<Medicine>,
    dialog: Dialog<TransactionDraft>,
    notices: Vec<LowStockNotice>,
    threshold: u32,
    after_write: SyncStrategy,
}

impl InventoryBoard {
    pub fn new(
        http: Arc<dyn HttpClient>,
        facilities: Vec<Facility>,
        config: &InventoryConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: InventoryClient::new(http),
            selector: FacilitySelector::new(facilities)?,
            medicines: ResourceCollection::new(),
            dialog: Dialog::new(),
            notices: Vec::new(),
            threshold: config.low_stock_threshold,
            after_write: config.after_write,
        })
    }

    pub fn facility(&self) -> &Facility {
        self.selector.current()
    }

    pub fn selector(&self) -> &FacilitySelector {
        &self.selector
    }

    pub fn medicines(&self) -> &[Medicine] {
        self.medicines.items()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn error(&self) -> Option<&str> {
        self.medicines.error()
    }

    pub fn dialog(&self) -> &Dialog<TransactionDraft> {
        &self.dialog
    }

    pub fn notices(&self) -> &[LowStockNotice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<LowStockNotice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn refresh(&mut self) -> Result<&[Medicine]> {
        let facility = self.selector.current().clone();
        match self.client.load_inventory(&facility).await {
            Ok(medicines) => {
                self.medicines.replace_all(&facility, medicines);
                Ok(self.medicines.items())
            }
            Err(e) => {
                tracing::warn!("Fetching inventory for {} failed: {}", facility.name, e);
                // Records of another facility must not stay writable
                if self.medicines.source() != Some(&facility) {
                    self.medicines.clear();
                }
                self.medicines
                    .record_error(format!("Failed to load inventory: {}", e));
                Err(e)
            }
        }
    }

    pub async fn next_facility(&mut self) -> Result<&[Medicine]> {
        self.selector.next();
        self.refresh().await
    }

    pub async fn previous_facility(&mut self) -> Result<&[Medicine]> {
        self.selector.previous();
        self.refresh().await
    }

    pub async fn select_facility(&mut self, index: usize) -> Result<&[Medicine]> {
        self.selector.select(index)?;
        self.refresh().await
    }

    /// Open the buy/sell dialog, optionally against a known medicine
    pub fn open_transaction(&mut self, kind: TransactionKind, medicine_id: Option<i64>) -> Result<()> {
        let quantity = match medicine_id {
            Some(id) => {
                let medicine = self.medicines.require(id)?;
                suggested_quantity(kind, medicine.quantity(), self.threshold)
            }
            None => 1,
        };
        self.dialog.open(TransactionDraft {
            kind,
            medicine_id,
            quantity,
        });
        Ok(())
    }

    /// Pick the medicine inside an open dialog; unknown ids leave nothing selected
    pub fn select_medicine(&mut self, medicine_id: i64) -> Result<()> {
        let found = self
            .medicines
            .get(medicine_id)
            .map(|m| (m.id(), m.quantity()));
        let threshold = self.threshold;
        let draft = self.dialog.draft_mut()?;
        match found {
            Some((id, stock)) => {
                draft.medicine_id = Some(id);
                draft.quantity = suggested_quantity(draft.kind, stock, threshold);
            }
            None => {
                draft.medicine_id = None;
                draft.quantity = 1;
            }
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: u32) -> Result<()> {
        self.dialog.draft_mut()?.quantity = quantity.max(1);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
    }

    /// Submit the buy/sell dialog
    pub async fn confirm_transaction(&mut self) -> Result<TransactionOutcome> {
        let draft = self.dialog.begin_submit()?;
        let result = match draft.medicine_id {
            Some(id) => self.apply_transaction(draft.kind, id, draft.quantity).await,
            None => Err(HospitalError::Validation(
                "Select a medicine first".to_string(),
            )),
        };
        self.dialog.complete(&result);
        result
    }

    /// Apply a buy or sell of `delta` units to one medicine
    pub async fn apply_transaction(
        &mut self,
        kind: TransactionKind,
        medicine_id: i64,
        delta: u32,
    ) -> Result<TransactionOutcome> {
        let medicine = match self
            .medicines
            .require(medicine_id)
            .and_then(|m| validate_delta(kind, m, delta).map(|_| m.clone()))
        {
            Ok(m) => m,
            Err(e) => {
                self.medicines
                    .record_error(format!("Failed to update inventory: {}", e));
                return Err(e);
            }
        };

        let quantity = new_quantity(kind, medicine.quantity(), delta);
        let facility = self.selector.current().clone();

        if let Err(e) = self
            .client
            .set_quantity(&facility, medicine_id, quantity)
            .await
        {
            tracing::warn!(
                "Updating medicine {} at {} failed: {}",
                medicine_id,
                facility.name,
                e
            );
            self.medicines
                .record_error(format!("Failed to update inventory: {}", e));
            return Err(e);
        }

        tracing::info!(
            "{} {} x{} at {}: stock {} -> {}",
            kind,
            medicine.name(),
            delta,
            facility.name,
            medicine.quantity(),
            quantity
        );

        let updated = match self.after_write {
            SyncStrategy::Patch => {
                let updated = medicine.with_quantity(quantity);
                self.medicines.patch(updated.clone())?;
                updated
            }
            SyncStrategy::Refresh => {
                let patched = medicine.with_quantity(quantity);
                let refreshed = self.refresh().await.map(|_| ());
                match refreshed {
                    Ok(()) => self
                        .medicines
                        .get(medicine_id)
                        .cloned()
                        .unwrap_or(patched),
                    Err(e) => {
                        // The write stands; keep the fetch error shown and patch locally
                        tracing::warn!(
                            "Medicine {} saved but re-fetch failed: {}",
                            medicine_id,
                            e
                        );
                        if let Err(e) = self.medicines.patch(patched.clone()) {
                            tracing::debug!("Medicine {} not patched: {}", medicine_id, e);
                        }
                        patched
                    }
                }
            }
        };

        let low_stock = if is_low_stock(kind, quantity, self.threshold) {
            let notice = LowStockNotice {
                medicine_id,
                name: medicine.name().to_string(),
                quantity,
                threshold: self.threshold,
            };
            tracing::warn!(
                "Low stock: {} at {} has {} left (threshold {})",
                notice.name,
                facility.name,
                notice.quantity,
                notice.threshold
            );
            self.notices.push(notice.clone());
            Some(notice)
        } else {
            None
        };

        Ok(TransactionOutcome {
            kind,
            medicine: updated,
            low_stock,
        })
    }

    /// Act on a notice: open a purchase for that medicine with the suggested quantity
    pub fn restock_from_notice(&mut self, notice: &LowStockNotice) -> Result<()> {
        self.notices.retain(|n| n.medicine_id != notice.medicine_id);
        self.open_transaction(TransactionKind::Buy, Some(notice.medicine_id))
    }
}
