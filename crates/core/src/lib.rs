pub mod appliance;
pub mod compare;

pub use appliance::{ApplianceError, ApplianceId, ApplianceRecord, NewAppliance};
pub use compare::{annual_cost, compare, Comparison, CostSummary, Recommendation, CARBON_FACTOR};
