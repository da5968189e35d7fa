use axum::Json;
use serde_json::{json, Value};

/// Capability listing.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "WattCompare backend",
        "endpoints": {
            "POST /ocr": "Upload an energy label image, returns the detected annual kWh",
            "POST /add_appliance": "Save an appliance",
            "GET /list_appliances": "List all appliances",
            "POST /compare": "Compare two appliances",
            "GET /export_pdf": "Download a PDF report"
        }
    }))
}
