//! Request bodies and response decoding for the hospital service routes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::io::HttpResponse;
use crate::models::{BedStatus, NewPatient};
use crate::{HospitalError, Result};

pub const BEDS_ROUTE: &str = "beds";
pub const SET_BED_ROUTE: &str = "set_bed";
pub const MEDICINES_ROUTE: &str = "medicines";
pub const SET_MEDICINE_ROUTE: &str = "set_medicine";
pub const PATIENTS_ROUTE: &str = "patients";
pub const ADD_PATIENT_ROUTE: &str = "add_patient";

/// Body of `POST /set_bed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBedRequest {
    #[serde(rename = "bedID")]
    pub bed_id: i64,
    pub status: BedStatus,
    #[serde(rename = "Pid")]
    pub patient_id: Option<i64>,
}

/// Body of `POST /set_medicine`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMedicineRequest {
    #[serde(rename = "MediID")]
    pub medicine_id: i64,
    #[serde(rename = "Qty")]
    pub quantity: u32,
}

/// Body of `POST /add_patient`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddPatientRequest {
    pub name: String,
    pub phone: String,
    pub age: u32,
    pub sex: String,
    #[serde(rename = "needsBed")]
    pub needs_bed: bool,
}

impl AddPatientRequest {
    pub fn from_new_patient(patient: &NewPatient) -> Result<Self> {
        patient.validate()?;
        Ok(Self {
            name: patient.name.trim().to_string(),
            phone: patient.phone.trim().to_string(),
            age: patient.age.unwrap_or_default(),
            sex: patient.sex.trim().to_string(),
            needs_bed: patient.needs_bed,
        })
    }
}

/// Error payload some routes return with a 400
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub fn to_body<T: Serialize>(request: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(request)?)
}

/// Pass 2xx responses through, turn anything else into a generic HTTP error
pub fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(HospitalError::http_status(response.status))
    }
}

/// Like `ensure_success`, but a 400 surfaces the server's `error` field
pub fn ensure_success_reporting_bad_request(response: HttpResponse) -> Result<HttpResponse> {
    if response.status == 400 {
        let message = serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| "Invalid query parameters".to_string());
        return Err(HospitalError::Http {
            status: 400,
            message,
        });
    }
    ensure_success(response)
}

/// Like `ensure_success`, but the error message carries the response body
pub fn ensure_success_with_body(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let message = if response.body.trim().is_empty() {
        format!("HTTP error! status: {}", response.status)
    } else {
        format!(
            "HTTP error! status: {}, message: {}",
            response.status,
            response.body.trim()
        )
    };
    Err(HospitalError::Http {
        status: response.status,
        message,
    })
}

/// Check a write acknowledgement is JSON, returning it
pub fn decode_ack(body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body)
        .map_err(|e| HospitalError::Shape(format!("Response is not valid JSON: {}", e)))
}

/// Decode a JSON array of positional rows
pub fn decode_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| HospitalError::Shape(format!("Response is not valid JSON: {}", e)))?;

    let serde_json::Value::Array(rows) = value else {
        return Err(HospitalError::Shape(
            "Received data is not an array".to_string(),
        ));
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value(row)
                .map_err(|e| HospitalError::Shape(format!("Row {}: {}", i, e)))
        })
        .collect()
}

/// Decode a single positional row
pub fn decode_record<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| HospitalError::Shape(format!("Unexpected record: {}", e)))
}
