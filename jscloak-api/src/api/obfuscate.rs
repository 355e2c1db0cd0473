use actix_web::{post, web, HttpRequest, HttpResponse, Result};
use jscloak_core::{ObfuscationRequest, RequestHandler, SecurityLevel};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ApiError;
use crate::middleware::request_id_of;
use crate::models::{ObfuscateRequest, ObfuscateResponse};
use crate::services::MonitoringService;

/// Obfuscate JavaScript source
///
/// Resolves the requested security level (unknown names fall back to
/// `standard`), validates the source and domain lock, and runs the
/// external obfuscator with the resolved configuration.
#[utoipa::path(
    post,
    path = "/api/obfuscate",
    tag = "obfuscate",
    request_body = ObfuscateRequest,
    responses(
        (status = 200, description = "Source obfuscated", body = ObfuscateResponse),
        (status = 400, description = "Missing code, malformed domain or malformed body", body = crate::models::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::models::ErrorResponse),
        (status = 500, description = "The obfuscator rejected the source", body = crate::models::ErrorResponse)
    )
)]
#[post("/obfuscate")]
pub async fn obfuscate_endpoint(
    http_req: HttpRequest,
    req: web::Json<ObfuscateRequest>,
    handler: web::Data<Arc<RequestHandler>>,
    monitoring: web::Data<Arc<MonitoringService>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = request_id_of(&http_req);
    let request: ObfuscationRequest = req.into_inner().into();
    let level = SecurityLevel::resolve(request.security_level.as_deref());

    let started = Instant::now();
    let outcome = handler.handle_with_id(request_id, request).await;
    let elapsed = started.elapsed().as_secs_f64();

    match outcome {
        Ok(result) => {
            monitoring
                .metrics
                .record_obfuscation(level.as_str(), "success", Some(elapsed));
            Ok(HttpResponse::Ok().json(ObfuscateResponse::from(result)))
        }
        Err(err) => {
            let (label, obfuscator_seconds) = if err.is_validation() {
                ("rejected", None)
            } else {
                ("transform_failed", Some(elapsed))
            };
            monitoring
                .metrics
                .record_obfuscation(level.as_str(), label, obfuscator_seconds);
            Err(err.into())
        }
    }
}
