use anyhow::Result;
use chrono::{DateTime, Utc};
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use tracing::{info, warn};

use crate::models::HealthResponse;

// Service metrics structure
#[derive(Clone)]
pub struct ServiceMetrics {
    // HTTP metrics
    pub api_requests_total: Counter,
    pub api_request_duration: Histogram,
    pub api_errors_total: Counter,

    // Obfuscation metrics
    pub obfuscations_total: CounterVec,
    pub obfuscation_duration: Histogram,
    pub rate_limited_total: Counter,

    registry: Registry,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let api_requests_total = Counter::with_opts(
            Opts::new("jscloak_api_requests_total", "Total number of API requests")
                .const_labels(
                    vec![("service".to_string(), "jscloak-api".to_string())]
                        .into_iter()
                        .collect(),
                ),
        )?;
        registry.register(Box::new(api_requests_total.clone()))?;

        let api_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "jscloak_api_request_duration_seconds",
                "Duration of API requests in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(api_request_duration.clone()))?;

        let api_errors_total = Counter::with_opts(Opts::new(
            "jscloak_api_errors_total",
            "Total number of API responses with status >= 400",
        ))?;
        registry.register(Box::new(api_errors_total.clone()))?;

        let obfuscations_total = CounterVec::new(
            Opts::new(
                "jscloak_obfuscations_total",
                "Obfuscation requests by security level and outcome",
            ),
            &["level", "outcome"],
        )?;
        registry.register(Box::new(obfuscations_total.clone()))?;

        let obfuscation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "jscloak_obfuscation_duration_seconds",
                "Time spent in the external obfuscator",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(obfuscation_duration.clone()))?;

        let rate_limited_total = Counter::with_opts(Opts::new(
            "jscloak_rate_limited_total",
            "Requests rejected by the rate limiter",
        ))?;
        registry.register(Box::new(rate_limited_total.clone()))?;

        Ok(Self {
            api_requests_total,
            api_request_duration,
            api_errors_total,
            obfuscations_total,
            obfuscation_duration,
            rate_limited_total,
            registry,
        })
    }

    pub fn render_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_api_request(
        &self,
        endpoint: &str,
        method: &str,
        duration_seconds: f64,
        status_code: u16,
    ) {
        self.api_requests_total.inc();
        self.api_request_duration.observe(duration_seconds);

        if status_code >= 400 {
            self.api_errors_total.inc();
        }

        info!(
            endpoint = endpoint,
            method = method,
            duration_ms = duration_seconds * 1000.0,
            status_code = status_code,
            "API request completed"
        );
    }

    /// `outcome` is one of `success`, `rejected`, `transform_failed`.
    /// `obfuscator_seconds` is `None` when the obfuscator was never called.
    pub fn record_obfuscation(&self, level: &str, outcome: &str, obfuscator_seconds: Option<f64>) {
        self.obfuscations_total
            .with_label_values(&[level, outcome])
            .inc();
        if let Some(seconds) = obfuscator_seconds {
            self.obfuscation_duration.observe(seconds);
        }
    }

    pub fn record_rate_limited(&self, client: &str) {
        self.rate_limited_total.inc();
        warn!(client = client, "request rejected by rate limiter");
    }
}

pub struct MonitoringService {
    pub metrics: ServiceMetrics,
    version: String,
    started_at: DateTime<Utc>,
}

impl MonitoringService {
    pub fn new(version: String) -> Result<Self> {
        Ok(Self {
            metrics: ServiceMetrics::new()?,
            version,
            started_at: Utc::now(),
        })
    }

    pub fn health(&self) -> HealthResponse {
        let now = Utc::now();
        HealthResponse {
            status: "healthy".to_string(),
            version: self.version.clone(),
            uptime_seconds: (now - self.started_at).num_seconds(),
            timestamp: now.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_series() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_api_request("/api/obfuscate", "POST", 0.2, 500);
        metrics.record_obfuscation("ultra", "transform_failed", Some(0.2));
        metrics.record_rate_limited("127.0.0.1");

        let text = metrics.render_metrics().unwrap();
        assert!(text.contains("jscloak_api_requests_total"));
        assert!(text.contains("jscloak_api_errors_total 1"));
        assert!(text.contains(r#"level="ultra""#));
        assert!(text.contains(r#"outcome="transform_failed""#));
        assert!(text.contains("jscloak_rate_limited_total 1"));
    }

    #[test]
    fn test_rejections_do_not_observe_obfuscator_duration() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_obfuscation("basic", "rejected", None);
        metrics.record_obfuscation("basic", "rejected", None);
        assert_eq!(metrics.obfuscation_duration.get_sample_count(), 0);
        assert_eq!(
            metrics
                .obfuscations_total
                .with_label_values(&["basic", "rejected"])
                .get(),
            2.0
        );

        metrics.record_obfuscation("basic", "success", Some(0.4));
        assert_eq!(metrics.obfuscation_duration.get_sample_count(), 1);
    }

    #[test]
    fn test_instances_use_separate_registries() {
        let first = ServiceMetrics::new().unwrap();
        let second = ServiceMetrics::new().unwrap();
        first.record_rate_limited("10.0.0.1");
        assert!(second
            .render_metrics()
            .unwrap()
            .contains("jscloak_rate_limited_total 0"));
    }

    #[test]
    fn test_health_reports_version() {
        let service = MonitoringService::new("1.2.3".to_string()).unwrap();
        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "1.2.3");
        assert!(health.uptime_seconds >= 0);
    }
}
