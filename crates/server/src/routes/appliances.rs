use axum::{extract::State, Json};
use serde::Serialize;
use wattcompare_core::{ApplianceId, ApplianceRecord, NewAppliance};

use crate::error::ApiError;
use crate::routes::form::UploadForm;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SavedAppliance {
    pub message: &'static str,
    pub id: ApplianceId,
    pub name: String,
    pub energy_kwh: Option<f64>,
}

/// Save an appliance. When a label image is attached its energy figure is read by OCR.
pub async fn add_appliance(
    State(state): State<AppState>,
    form: UploadForm,
) -> Result<Json<SavedAppliance>, ApiError> {

    let mut appliance = NewAppliance::new(
        form.text("name").unwrap_or_default(),
        None,
        form.number("price")?.unwrap_or(0.0),
        form.number("energy_rate")?.unwrap_or(0.0),
    )
    .validate()?;

    if let Some(image) = form.image {
        appliance.energy_kwh = state.pipeline.process_bytes(image).await?.energy_kwh;
    }

    let id = state.store.insert(&appliance).await?;
    tracing::info!(
        %id,
        name = %appliance.name,
        energy_kwh = ?appliance.energy_kwh,
        "appliance saved"
    );

    Ok(Json(SavedAppliance {
        message: "Saved",
        id,
        name: appliance.name,
        energy_kwh: appliance.energy_kwh,
    }))
}

pub async fn list_appliances(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplianceRecord>>, ApiError> {
    Ok(Json(state.store.list().await?))
}
