use crate::models::*;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::obfuscate::obfuscate_endpoint),
    components(schemas(ObfuscateRequest, ObfuscateResponse, ErrorResponse, HealthResponse)),
    tags((name = "obfuscate", description = "JavaScript obfuscation")),
    info(
        title = "JsCloak API",
        version = "0.1.0",
        description = "Obfuscate JavaScript at one of five named security levels",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_obfuscate_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/obfuscate"));
    }
}
