//! Hospital records: beds, medicines and patients
//!
//! The remote service sends every record as a positional JSON array. Each
//! record here is a named structure that can only be built through a
//! validating constructor, and deserializes from the positional row via
//! `TryFrom`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{HospitalError, Result};

/// Occupancy status of a bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedStatus {
    Available,
    Occupied,
    Reserved,
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BedStatus::Available => write!(f, "Available"),
            BedStatus::Occupied => write!(f, "Occupied"),
            BedStatus::Reserved => write!(f, "Reserved"),
        }
    }
}

impl FromStr for BedStatus {
    type Err = HospitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(BedStatus::Available),
            "occupied" => Ok(BedStatus::Occupied),
            "reserved" => Ok(BedStatus::Reserved),
            other => Err(HospitalError::Validation(format!(
                "Unknown bed status '{}'",
                other
            ))),
        }
    }
}

/// Integer field that some services send as a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Integer {
    Number(i64),
    Text(String),
}

impl Integer {
    pub(crate) fn into_i64(self, field: &str) -> Result<i64> {
        match self {
            Integer::Number(n) => Ok(n),
            Integer::Text(s) => s.trim().parse().map_err(|_| {
                HospitalError::Shape(format!("{} is not an integer: '{}'", field, s))
            }),
        }
    }
}

/// Positional bed row: `[id, type, location, status, occupant]`
#[derive(Debug, Deserialize)]
struct BedRow(i64, String, String, BedStatus, Option<Integer>);

/// A hospital bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BedRow")]
pub struct Bed {
    id: i64,
    bed_type: String,
    location: String,
    status: BedStatus,
    occupant: Option<i64>,
}

impl Bed {
    /// Build a bed, rejecting an occupant on an available bed
    pub fn new(
        id: i64,
        bed_type: impl Into<String>,
        location: impl Into<String>,
        status: BedStatus,
        occupant: Option<i64>,
    ) -> Result<Self> {
        if status == BedStatus::Available && occupant.is_some() {
            return Err(HospitalError::Validation(format!(
                "Bed {} is Available but has occupant {:?}",
                id, occupant
            )));
        }
        Ok(Self {
            id,
            bed_type: bed_type.into(),
            location: location.into(),
            status,
            occupant,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn bed_type(&self) -> &str {
        &self.bed_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> BedStatus {
        self.status
    }

    pub fn occupant(&self) -> Option<i64> {
        self.occupant
    }

    /// Copy of this bed in a new status; the occupant is dropped when the bed becomes available
    pub fn with_status(&self, status: BedStatus, occupant: Option<i64>) -> Bed {
        Bed {
            status,
            occupant: if status == BedStatus::Available {
                None
            } else {
                occupant
            },
            ..self.clone()
        }
    }
}

impl TryFrom<BedRow> for Bed {
    type Error = HospitalError;

    fn try_from(row: BedRow) -> Result<Self> {
        let BedRow(id, bed_type, location, status, occupant) = row;
        let occupant = occupant.map(|o| o.into_i64("bed occupant")).transpose()?;
        Bed::new(id, bed_type, location, status, occupant)
            .map_err(|e| HospitalError::Shape(e.to_string()))
    }
}

/// Positional medicine row: `[id, name, unit price, quantity, expiry date]`
#[derive(Debug, Deserialize)]
struct MedicineRow(i64, String, f64, i64, String);

/// A medicine stock line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MedicineRow")]
pub struct Medicine {
    id: i64,
    name: String,
    unit_price: f64,
    quantity: u32,
    expiry_date: String,
}

impl Medicine {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        unit_price: f64,
        quantity: u32,
        expiry_date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
            expiry_date: expiry_date.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn expiry_date(&self) -> &str {
        &self.expiry_date
    }

    pub fn with_quantity(&self, quantity: u32) -> Medicine {
        Medicine {
            quantity,
            ..self.clone()
        }
    }
}

impl TryFrom<MedicineRow> for Medicine {
    type Error = HospitalError;

    fn try_from(row: MedicineRow) -> Result<Self> {
        let MedicineRow(id, name, unit_price, quantity, expiry_date) = row;
        let quantity = u32::try_from(quantity).map_err(|_| {
            HospitalError::Shape(format!(
                "Medicine {} has invalid quantity {}",
                id, quantity
            ))
        })?;
        Ok(Medicine::new(id, name, unit_price, quantity, expiry_date))
    }
}

/// Positional patient row: `[id, name, phone, age, sex]`
#[derive(Debug, Deserialize)]
struct PatientRow(Integer, String, String, Integer, String);

/// A registered patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatientRow")]
pub struct Patient {
    id: i64,
    name: String,
    phone: String,
    age: u32,
    sex: String,
}

impl Patient {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
        age: u32,
        sex: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            age,
            sex: sex.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn sex(&self) -> &str {
        &self.sex
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = HospitalError;

    fn try_from(row: PatientRow) -> Result<Self> {
        let PatientRow(id, name, phone, age, sex) = row;
        let id = id.into_i64("patient id")?;
        let age = age.into_i64("patient age")?;
        let age = u32::try_from(age)
            .map_err(|_| HospitalError::Shape(format!("Patient {} has invalid age {}", id, age)))?;
        Ok(Patient::new(id, name, phone, age, sex))
    }
}

/// Details entered for a patient that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub phone: String,
    pub age: Option<u32>,
    pub sex: String,
    pub needs_bed: bool,
}

impl NewPatient {
    /// Check every field is present
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.sex.trim().is_empty() {
            missing.push("sex");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(HospitalError::Validation(format!(
                "Missing patient fields: {}",
                missing.join(", ")
            )))
        }
    }
}
