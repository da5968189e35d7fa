use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplianceId(pub i64);

impl fmt::Display for ApplianceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored appliance. Records are append-only: nothing updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceRecord {
    pub id: ApplianceId,
    pub name: String,
    /// Annual consumption in kWh, when one could be read off the label.
    pub energy_kwh: Option<f64>,
    /// Unit energy price.
    pub price: f64,
    /// Usage/rate multiplier applied to the price.
    pub energy_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// Insert payload. Call [`NewAppliance::validate`] before handing it to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppliance {
    pub name: String,
    pub energy_kwh: Option<f64>,
    pub price: f64,
    pub energy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplianceError {
    #[error("Appliance name must not be empty")]
    EmptyName,
    #[error("Field '{0}' must be a finite number")]
    NonFinite(&'static str),
    #[error("Energy consumption cannot be negative: {0}")]
    NegativeEnergy(f64),
}

impl NewAppliance {
    pub fn new(name: &str, energy_kwh: Option<f64>, price: f64, energy_rate: f64) -> Self {
        NewAppliance {
            name: name.to_string(),
            energy_kwh,
            price,
            energy_rate,
        }
    }

    /// Trims the name and checks the numeric invariants of a record.
    pub fn validate(self) -> Result<Self, ApplianceError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ApplianceError::EmptyName);
        }
        if !self.price.is_finite() {
            return Err(ApplianceError::NonFinite("price"));
        }
        if !self.energy_rate.is_finite() {
            return Err(ApplianceError::NonFinite("energy_rate"));
        }
        if let Some(kwh) = self.energy_kwh {
            if !kwh.is_finite() {
                return Err(ApplianceError::NonFinite("energy_kwh"));
            }
            if kwh < 0.0 {
                return Err(ApplianceError::NegativeEnergy(kwh));
            }
        }
        Ok(NewAppliance { name, ..self })
    }
}
