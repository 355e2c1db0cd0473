pub mod api;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod settings;
