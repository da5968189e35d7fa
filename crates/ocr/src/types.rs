use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnergyUnit {
    #[serde(rename = "kwh")]
    KilowattHours,
    #[serde(rename = "kw")]
    Kilowatts,
}

impl std::fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyUnit::KilowattHours => write!(f, "kWh"),
            EnergyUnit::Kilowatts => write!(f, "kW"),
        }
    }
}

impl std::str::FromStr for EnergyUnit {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kwh" => Ok(EnergyUnit::KilowattHours),
            "kw" => Ok(EnergyUnit::Kilowatts),
            other => Err(format!("Unknown energy unit: '{other}'")),
        }
    }
}

/// A number and unit as printed on the label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnergyQuantity {
    pub value: f64,
    pub unit: EnergyUnit,
}

impl EnergyQuantity {
    pub fn new(value: f64, unit: EnergyUnit) -> Self {
        Self { value, unit }
    }

    /// Yearly consumption in kWh. A kW rating is assumed to draw around the clock,
    /// 24 hours a day for 365 days, multiplied in that order.
    pub fn annual_kwh(&self) -> f64 {
        match self.unit {
            EnergyUnit::KilowattHours => self.value,
            EnergyUnit::Kilowatts => self.value * 24.0 * 365.0,
        }
    }
}

/// Outcome of reading one label: the normalized figure (if any) plus the OCR text it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnergyReading {
    pub energy_kwh: Option<f64>,
    pub raw_text: String,
}
