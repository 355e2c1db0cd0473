//! Request handling: validate, resolve the preset, call the obfuscator

use crate::domain::validate_domain_lock;
use crate::errors::{HandleError, ValidationError};
use crate::levels::SecurityLevel;
use crate::obfuscator::Obfuscator;
use crate::presets::PresetResolver;
use crate::request::{ObfuscationRequest, ObfuscationResult, RequestId};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Structural checks, first violation wins: empty source, malformed domain,
/// duplicate domain.
pub fn validate(request: &ObfuscationRequest) -> Result<(), ValidationError> {
    if request.source_code.trim().is_empty() {
        return Err(ValidationError::CodeRequired);
    }
    validate_domain_lock(&request.domain_lock)
}

pub struct RequestHandler {
    resolver: PresetResolver,
    obfuscator: Arc<dyn Obfuscator>,
}

impl RequestHandler {
    pub fn new(obfuscator: Arc<dyn Obfuscator>) -> Self {
        Self::with_resolver(obfuscator, PresetResolver::new())
    }

    pub fn with_resolver(obfuscator: Arc<dyn Obfuscator>, resolver: PresetResolver) -> Self {
        Self {
            resolver,
            obfuscator,
        }
    }

    /// Handle a request under a freshly generated identifier.
    pub async fn handle(
        &self,
        request: ObfuscationRequest,
    ) -> Result<ObfuscationResult, HandleError> {
        self.handle_with_id(RequestId::generate(), request).await
    }

    /// Handle a request under an identifier the caller already assigned, so
    /// transport logs and the audit event share it.
    pub async fn handle_with_id(
        &self,
        request_id: RequestId,
        request: ObfuscationRequest,
    ) -> Result<ObfuscationResult, HandleError> {
        let level = SecurityLevel::resolve(request.security_level.as_deref());

        if let Err(err) = validate(&request) {
            warn!(
                request_id = %request_id,
                level = %level,
                outcome = "rejected",
                error = %err,
                "Obfuscation request rejected"
            );
            return Err(HandleError::validation(request_id, err));
        }

        let config = self.resolver.resolve(level, &request.domain_lock);
        let started = Instant::now();

        match self.obfuscator.obfuscate(&request.source_code, &config).await {
            Ok(output) => {
                info!(
                    request_id = %request_id,
                    level = %level,
                    outcome = "success",
                    domains = request.domain_lock.len(),
                    input_bytes = request.source_code.len(),
                    output_bytes = output.code.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Obfuscation completed"
                );
                Ok(ObfuscationResult {
                    obfuscated_code: output.code,
                    source_map: output.source_map,
                    request_id,
                })
            }
            Err(err) => {
                error!(
                    request_id = %request_id,
                    level = %level,
                    outcome = "transform_failed",
                    error = %err,
                    "Obfuscation failed"
                );
                Err(HandleError::transform(request_id, err.to_string()))
            }
        }
    }
}
