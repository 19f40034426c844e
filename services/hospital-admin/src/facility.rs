//! Hospital facilities and the ring selector used to page through them

use serde::{Deserialize, Serialize};

use crate::{HospitalError, Result};

/// One hospital site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub url: String,
}

impl Facility {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Full URL of a service route, e.g. `endpoint("beds")`
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

/// Cycles through an ordered, non-empty list of facilities with wraparound
#[derive(Debug, Clone)]
pub struct FacilitySelector {
    facilities: Vec<Facility>,
    index: usize,
}

impl FacilitySelector {
    pub fn new(facilities: Vec<Facility>) -> Result<Self> {
        if facilities.is_empty() {
            return Err(HospitalError::Config(
                "At least one facility must be configured".to_string(),
            ));
        }
        Ok(Self {
            facilities,
            index: 0,
        })
    }

    pub fn current(&self) -> &Facility {
        &self.facilities[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Advance to the next facility, wrapping from the last to the first
    pub fn next(&mut self) -> &Facility {
        self.index = (self.index + 1) % self.facilities.len();
        tracing::debug!("Selected facility {} ({})", self.index, self.current().name);
        self.current()
    }

    /// Step back to the previous facility, wrapping from the first to the last
    pub fn previous(&mut self) -> &Facility {
        self.index = if self.index == 0 {
            self.facilities.len() - 1
        } else {
            self.index - 1
        };
        tracing::debug!("Selected facility {} ({})", self.index, self.current().name);
        self.current()
    }

    pub fn select(&mut self, index: usize) -> Result<&Facility> {
        if index >= self.facilities.len() {
            return Err(HospitalError::NotFound(format!(
                "Facility index {} (have {})",
                index,
                self.facilities.len()
            )));
        }
        self.index = index;
        Ok(self.current())
    }

    pub fn select_by_name(&mut self, name: &str) -> Result<&Facility> {
        let index = self
            .facilities
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| HospitalError::NotFound(format!("Facility '{}'", name)))?;
        self.select(index)
    }
}
