use axum::Json;
use serde_json::{json, Value};

/// `GET /healthz` — liveness probe. Unauthenticated and un-enveloped, the
/// one endpoint that doesn't go through [`crate::envelope::Envelope`].
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
