//! Fixed-window rate limiting per client IP.
//!
//! Each address gets `max_requests` per window. The window starts with the
//! first request from that address and is replaced wholesale once it has
//! elapsed, so the counter never slides.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use dashmap::DashMap;
use futures::future::LocalBoxFuture;
use jscloak_core::RequestId;
use std::future::{ready, Ready};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::ApiError;
use crate::services::monitoring::MonitoringService;
use crate::settings::RateLimitSettings;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Limiter state shared by every worker
pub struct RateLimitState {
    windows: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimitState {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: settings.max_requests,
            window: settings.window(),
            enabled: settings.enabled,
        }
    }

    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        self.check_at(ip, Instant::now())
    }

    /// Count one request from `ip` at `now`. On rejection returns how long
    /// until the current window ends.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }

        let mut entry = self.windows.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "Opening rate limit window");
            Window {
                started: now,
                count: 0,
            }
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let ends = entry.started + self.window;
            return Err(ends.saturating_duration_since(now));
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have already ended (call periodically)
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    pub fn purge_expired_at(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, entry| now.saturating_duration_since(entry.started) < window);
    }

    /// Number of tracked addresses
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Whole seconds for a `Retry-After` header, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

// Middleware factory
pub struct RateLimiter {
    state: Arc<RateLimitState>,
}

impl RateLimiter {
    pub fn new(state: Arc<RateLimitState>) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    state: Arc<RateLimitState>,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = req
            .peer_addr()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        if let Err(wait) = self.state.check(ip) {
            if let Some(monitoring) = req.app_data::<web::Data<Arc<MonitoringService>>>() {
                monitoring.metrics.record_rate_limited(&ip.to_string());
            }
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .cloned()
                .unwrap_or_else(RequestId::generate);
            let error = ApiError::RateLimited {
                request_id,
                retry_after_secs: retry_after_secs(wait),
            };
            let response = req.into_response(error.error_response());
            return Box::pin(async move { Ok(response.map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
