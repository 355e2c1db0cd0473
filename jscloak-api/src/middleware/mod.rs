pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use metrics::MetricsMiddleware;
pub use rate_limit::{RateLimitState, RateLimiter};
pub use request_id::{request_id_of, RequestIdMiddleware, REQUEST_ID_HEADER};
