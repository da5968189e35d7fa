use axum::{extract::State, Json};
use wattcompare_ocr::EnergyReading;

use crate::error::ApiError;
use crate::routes::form::UploadForm;
use crate::AppState;

pub async fn ocr(
    State(state): State<AppState>,
    form: UploadForm,
) -> Result<Json<EnergyReading>, ApiError> {
    let image = form
        .image
        .ok_or_else(|| ApiError::BadRequest("No image uploaded".to_string()))?;

    let reading = state.pipeline.process_bytes(image).await?;
    tracing::info!(energy_kwh = ?reading.energy_kwh, "label read");
    Ok(Json(reading))
}
