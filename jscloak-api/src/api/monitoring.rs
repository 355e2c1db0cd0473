use actix_web::{web, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::MonitoringService;

// Prometheus metrics endpoint
pub async fn metrics(
    monitoring: web::Data<Arc<MonitoringService>>,
) -> Result<HttpResponse, ApiError> {
    let metrics_text = monitoring
        .metrics
        .render_metrics()
        .map_err(|e| ApiError::InternalError(format!("failed to render metrics: {}", e)))?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(metrics_text))
}

pub async fn health(monitoring: web::Data<Arc<MonitoringService>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(monitoring.health()))
}

// Liveness probe
pub async fn live() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn openapi_json() -> ActixResult<HttpResponse> {
    use utoipa::OpenApi;
    Ok(HttpResponse::Ok().json(super::openapi::ApiDoc::openapi()))
}
