use jscloak_core::{ObfuscationRequest, ObfuscationResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Obfuscate endpoint models
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscateRequest {
    /// JavaScript source to obfuscate
    #[serde(default)]
    #[schema(example = "function hello() { console.log('hi'); }")]
    pub code: String,
    /// One of basic, standard, advanced, enterprise, ultra. Unknown names fall back to standard.
    #[serde(default)]
    #[schema(example = "advanced")]
    pub security_level: Option<String>,
    /// Hostnames the output is allowed to run on
    #[serde(default)]
    pub domain_lock: Option<Vec<String>>,
}

impl From<ObfuscateRequest> for ObfuscationRequest {
    fn from(req: ObfuscateRequest) -> Self {
        ObfuscationRequest {
            source_code: req.code,
            security_level: req.security_level,
            domain_lock: req.domain_lock.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscateResponse {
    pub obfuscated_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    pub request_id: String,
}

impl From<ObfuscationResult> for ObfuscateResponse {
    fn from(result: ObfuscationResult) -> Self {
        Self {
            obfuscated_code: result.obfuscated_code,
            source_map: result.source_map,
            request_id: result.request_id.into_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Underlying obfuscator message, transform failures only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// Monitoring models
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub timestamp: String,
}
