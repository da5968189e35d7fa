pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use wattcompare_ocr::{LabelPipeline, OcrBackend, TesseractCli};
use wattcompare_storage::ApplianceStore;

use crate::config::{Config, OcrEngine};

/// Shared handler state. Both members are cheap handles, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: ApplianceStore,
    pub pipeline: LabelPipeline,
}

impl AppState {
    pub fn new(store: ApplianceStore, pipeline: LabelPipeline) -> Self {
        Self { store, pipeline }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = wattcompare_storage::create_db(&config.database_path).await?;
        let pipeline = LabelPipeline::new(recognizer_from_config(config)?, config.ocr_timeout());
        Ok(Self::new(ApplianceStore::new(pool), pipeline))
    }
}

pub fn recognizer_from_config(config: &Config) -> anyhow::Result<Arc<dyn OcrBackend>> {
    match config.ocr_engine {
        OcrEngine::Cli => Ok(Arc::new(TesseractCli::new(
            &config.tesseract_cmd,
            &config.ocr_languages,
        ))),
        #[cfg(feature = "tesseract")]
        OcrEngine::Leptess => Ok(Arc::new(
            wattcompare_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(
                config.tesseract_data_path.clone(),
                &config.ocr_languages,
            ),
        )),
        #[cfg(not(feature = "tesseract"))]
        OcrEngine::Leptess => {
            anyhow::bail!("ocr_engine = \"leptess\" requires building with the `tesseract` feature")
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/ocr", post(routes::ocr::ocr))
        .route("/add_appliance", post(routes::appliances::add_appliance))
        .route("/list_appliances", get(routes::appliances::list_appliances))
        .route("/compare", post(routes::compare::compare))
        .route("/export_pdf", get(routes::report::export_pdf))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
