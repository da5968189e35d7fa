use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use wattcompare_core::{ApplianceId, CostSummary, Recommendation};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub compare: CompareBody,
}

#[derive(Debug, Serialize)]
pub struct CompareBody {
    #[serde(rename = "A")]
    pub a: CostSummary,
    #[serde(rename = "B")]
    pub b: CostSummary,
    /// Name of the cheaper appliance; null when either side has no cost.
    pub recommended: Option<String>,
    pub recommendation: Recommendation,
}

pub async fn compare(
    State(state): State<AppState>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<CompareResponse>, ApiError> {
    let Json(request) = body?;
    let [first, second] = request.ids.as_slice() else {
        return Err(ApiError::BadRequest("Exactly 2 IDs required".to_string()));
    };
    let (first, second) = (ApplianceId(*first), ApplianceId(*second));

    // Two distinct, existing ids. Repeating an id yields one row and is rejected.
    let records = state.store.get_by_ids(first, second).await?;
    if records.len() != 2 {
        return Err(ApiError::NotFound("Invalid appliance IDs".to_string()));
    }
    let lookup = |id: ApplianceId| {
        records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound("Invalid appliance IDs".to_string()))
    };
    let (a, b) = (lookup(first)?, lookup(second)?);

    let comparison = wattcompare_core::compare(a, b);
    tracing::debug!(%first, %second, recommendation = ?comparison.recommendation, "compared");

    let recommended = comparison.recommended_name().map(str::to_string);
    Ok(Json(CompareResponse {
        compare: CompareBody {
            a: comparison.left,
            b: comparison.right,
            recommended,
            recommendation: comparison.recommendation,
        },
    }))
}
