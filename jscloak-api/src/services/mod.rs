pub mod monitoring;

pub use monitoring::{MonitoringService, ServiceMetrics};
