use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use wattcompare_pdf::{render_report, REPORT_FILENAME};

use crate::error::ApiError;
use crate::AppState;

pub async fn export_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = state.store.list().await?;
    let count = records.len();
    let pdf = tokio::task::spawn_blocking(move || render_report(&records)).await??;
    tracing::info!(records = count, bytes = pdf.len(), "report exported");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{REPORT_FILENAME}\""),
        ),
    ];
    Ok((headers, pdf))
}
