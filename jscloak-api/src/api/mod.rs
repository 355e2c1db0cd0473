use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::DefaultHeaders,
    web, App, HttpServer,
};
use jscloak_core::{Obfuscator, RequestHandler};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_actix_web::TracingLogger;

use crate::errors::ApiError;
use crate::middleware::{
    request_id_of, MetricsMiddleware, RateLimitState, RateLimiter, RequestIdMiddleware,
};
use crate::services::MonitoringService;
use crate::settings::Settings;

pub mod monitoring;
pub mod obfuscate;
pub mod openapi;
pub mod static_files;

use self::static_files::StaticRoot;

/// Everything the workers share. Cloned once per worker.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
    pub monitoring: Arc<MonitoringService>,
    pub rate_limit: Arc<RateLimitState>,
    pub static_root: StaticRoot,
    pub json_limit_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings, obfuscator: Arc<dyn Obfuscator>) -> anyhow::Result<Self> {
        Ok(Self {
            handler: Arc::new(RequestHandler::new(obfuscator)),
            monitoring: Arc::new(MonitoringService::new(
                env!("CARGO_PKG_VERSION").to_string(),
            )?),
            rate_limit: Arc::new(RateLimitState::new(&settings.rate_limit)),
            static_root: StaticRoot(settings.server.static_dir.clone()),
            json_limit_bytes: settings.server.json_limit_bytes,
        })
    }
}

fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("X-XSS-Protection", "0"))
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            ApiError::BadRequest {
                message: err.to_string(),
                request_id: request_id_of(req),
            }
            .into()
        })
}

pub fn create_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(MetricsMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(security_headers())
        .wrap(TracingLogger::default())
        .app_data(web::Data::new(Arc::clone(&state.handler)))
        .app_data(web::Data::new(Arc::clone(&state.monitoring)))
        .app_data(web::Data::new(state.static_root.clone()))
        .app_data(json_config(state.json_limit_bytes))
        .service(
            web::scope("/api")
                .wrap(RateLimiter::new(Arc::clone(&state.rate_limit)))
                .service(obfuscate::obfuscate_endpoint),
        )
        .service(
            web::scope("/monitoring")
                .route("/metrics", web::get().to(monitoring::metrics))
                .route("/health", web::get().to(monitoring::health))
                .route("/live", web::get().to(monitoring::live)),
        )
        .route("/api-docs/openapi.json", web::get().to(monitoring::openapi_json))
        .service(web::resource("/{tail:.*}").route(web::get().to(static_files::serve)))
}

/// Periodically drop ended rate limit windows so idle clients do not
/// accumulate.
fn spawn_rate_limit_purge(state: Arc<RateLimitState>) {
    let period = state.window().max(Duration::from_secs(1));
    actix_rt::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            state.purge_expired();
            debug!(tracked = state.len(), "purged rate limit windows");
        }
    });
}

pub async fn start_server(settings: Settings, state: AppState) -> std::io::Result<()> {
    spawn_rate_limit_purge(Arc::clone(&state.rate_limit));

    let bind_address = (settings.server.host.clone(), settings.server.port);
    info!(
        host = %bind_address.0,
        port = bind_address.1,
        static_dir = %settings.server.static_dir.display(),
        "Starting JsCloak API server"
    );

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if settings.server.workers > 0 {
        server = server.workers(settings.server.workers);
    }
    server.bind(bind_address)?.run().await
}
