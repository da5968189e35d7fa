use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::appliance::ApplianceRecord;

/// Estimated carbon per unit of annual cost.
pub const CARBON_FACTOR: Decimal = Decimal::from_parts(82, 0, 0, false, 2);

/// Which side of a comparison is cheaper to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Left,
    Right,
    /// At least one side has no cost, so the pair cannot be ordered.
    Unranked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub name: String,
    pub annual_cost: Option<f64>,
    pub carbon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: CostSummary,
    pub right: CostSummary,
    pub recommendation: Recommendation,
}

impl Comparison {
    /// Name of the recommended appliance, if the pair could be ranked.
    pub fn recommended_name(&self) -> Option<&str> {
        match self.recommendation {
            Recommendation::Left => Some(&self.left.name),
            Recommendation::Right => Some(&self.right.name),
            Recommendation::Unranked => None,
        }
    }
}

/// `price × energy_rate`, or `None` when either factor is zero.
pub fn annual_cost(record: &ApplianceRecord) -> Option<Decimal> {
    if record.price == 0.0 || record.energy_rate == 0.0 {
        return None;
    }
    let price = Decimal::from_f64(record.price)?;
    let rate = Decimal::from_f64(record.energy_rate)?;
    price.checked_mul(rate)
}

fn summarize(record: &ApplianceRecord) -> (Option<Decimal>, CostSummary) {
    let cost = annual_cost(record);
    let carbon = cost.and_then(|c| c.checked_mul(CARBON_FACTOR));
    let summary = CostSummary {
        name: record.name.clone(),
        annual_cost: cost.and_then(|c| c.to_f64()),
        carbon: carbon.and_then(|c| c.to_f64()),
    };
    (cost, summary)
}

/// Compare the yearly running cost of two appliances.
///
/// Ties go to the right-hand record.
pub fn compare(left: &ApplianceRecord, right: &ApplianceRecord) -> Comparison {
    let (left_cost, left) = summarize(left);
    let (right_cost, right) = summarize(right);

    let recommendation = match (left_cost, right_cost) {
        (Some(l), Some(r)) if l < r => Recommendation::Left,
        (Some(_), Some(_)) => Recommendation::Right,
        _ => Recommendation::Unranked,
    };

    Comparison {
        left,
        right,
        recommendation,
    }
}
