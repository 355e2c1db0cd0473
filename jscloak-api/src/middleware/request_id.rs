use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use jscloak_core::RequestId;
use std::future::{ready, Ready};
use tracing::debug;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INCOMING_ID_LEN: usize = 128;

/// A caller-supplied id is only logged, and only when it is short and made
/// of characters that are safe to write into logs.
fn sanitize_incoming(value: &str) -> Option<String> {
    let value = value.trim();
    let acceptable = !value.is_empty()
        && value.len() <= MAX_INCOMING_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    acceptable.then(|| value.to_string())
}

/// The id assigned by [`RequestIdMiddleware`], or a fresh one when the
/// middleware is not installed.
pub fn request_id_of(req: &HttpRequest) -> RequestId {
    req.extensions()
        .get::<RequestId>()
        .cloned()
        .unwrap_or_else(RequestId::generate)
}

// Request ID middleware for log correlation
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Every request gets a server-minted id; the client's value never
        // replaces it.
        let request_id = RequestId::generate();
        if let Some(client_id) = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(sanitize_incoming)
        {
            debug!(
                request_id = %request_id,
                client_request_id = %client_id,
                "client supplied its own request id"
            );
        }

        // Handlers and error mappers read it back from the extensions
        req.extensions_mut().insert(request_id.clone());

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut result = fut.await?;

            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                result
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_uuid_like_ids() {
        assert_eq!(
            sanitize_incoming(" 3f2a-b_c.9 "),
            Some("3f2a-b_c.9".to_string())
        );
    }

    #[test]
    fn test_sanitize_rejects_unsafe_ids() {
        assert_eq!(sanitize_incoming(""), None);
        assert_eq!(sanitize_incoming("a b"), None);
        assert_eq!(sanitize_incoming("id\r\nx-evil: 1"), None);
        assert_eq!(sanitize_incoming(&"a".repeat(MAX_INCOMING_ID_LEN + 1)), None);
    }
}
