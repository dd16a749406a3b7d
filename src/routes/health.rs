use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::error;
use serde_json::json;

use crate::state::AppState;

/// Liveness probe, served outside `/api` and without authentication.
///
/// Answers 503 when the store cannot be reached.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let store = state.store.backend();
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "store": store,
            "timestamp": Utc::now()
        })),
        Err(e) => {
            error!("Health check failed, {} store unreachable: {}", store, e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "store": store,
                "timestamp": Utc::now()
            }))
        }
    }
}
