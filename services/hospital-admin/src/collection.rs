//! Per-screen resource list: the single local copy of what a facility returned

use serde::{Deserialize, Serialize};

use crate::facility::Facility;
use crate::models::{Bed, Medicine, Patient};
use crate::{HospitalError, Result};

/// A record with a stable integer identity
pub trait Record: Clone {
    fn id(&self) -> i64;

    /// Human-readable kind used in error messages
    fn kind() -> &'static str;
}

impl Record for Bed {
    fn id(&self) -> i64 {
        Bed::id(self)
    }

    fn kind() -> &'static str {
        "Bed"
    }
}

impl Record for Medicine {
    fn id(&self) -> i64 {
        Medicine::id(self)
    }

    fn kind() -> &'static str {
        "Medicine"
    }
}

impl Record for Patient {
    fn id(&self) -> i64 {
        Patient::id(self)
    }

    fn kind() -> &'static str {
        "Patient"
    }
}

/// How local state catches up with the server after a successful write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Replace the one written record in place
    #[default]
    Patch,
    /// Re-fetch the whole list from the facility
    Refresh,
}

/// Records fetched from one facility, plus the last error shown for them
#[derive(Debug, Clone)]
pub struct ResourceCollection<T: Record> {
    items: Vec<T>,
    source: Option<Facility>,
    error: Option<String>,
}

impl<T: Record> Default for ResourceCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            source: None,
            error: None,
        }
    }
}

impl<T: Record> ResourceCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Like `get`, but a missing record is an error
    pub fn require(&self, id: i64) -> Result<&T> {
        self.get(id)
            .ok_or_else(|| HospitalError::NotFound(format!("{} {}", T::kind(), id)))
    }

    /// Facility the current items were fetched from
    pub fn source(&self) -> Option<&Facility> {
        self.source.as_ref()
    }

    /// Wholesale replacement after a successful fetch
    pub fn replace_all(&mut self, source: &Facility, items: Vec<T>) {
        tracing::debug!(
            "Loaded {} {} records from {}",
            items.len(),
            T::kind(),
            source.name
        );
        self.items = items;
        self.source = Some(source.clone());
        self.error = None;
    }

    /// Replace the record sharing `item`'s id
    pub fn patch(&mut self, item: T) -> Result<()> {
        let id = item.id();
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(HospitalError::NotFound(format!("{} {}", T::kind(), id))),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drop everything, as when the screen is left
    pub fn clear(&mut self) {
        self.items.clear();
        self.source = None;
        self.error = None;
    }
}
