use config as config_rs;
use jscloak_core::NodeObfuscatorConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "jscloak";
pub const ENV_PREFIX: &str = "JSCLOAK";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub rate_limit: RateLimitSettings,
    pub obfuscator: ObfuscatorSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding the single-page client
    pub static_dir: PathBuf,
    /// Largest accepted JSON body
    pub json_limit_bytes: usize,
    /// Worker threads, 0 = one per core
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObfuscatorSettings {
    pub node_binary: PathBuf,
    pub node_path: Option<PathBuf>,
}

impl From<&ObfuscatorSettings> for NodeObfuscatorConfig {
    fn from(settings: &ObfuscatorSettings) -> Self {
        NodeObfuscatorConfig {
            node_binary: settings.node_binary.clone(),
            node_path: settings.node_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] config_rs::ConfigError),
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: PathBuf::from("public"),
                json_limit_bytes: 1024 * 1024,
                workers: 0,
            },
            rate_limit: RateLimitSettings {
                enabled: true,
                max_requests: 100,
                window_secs: 15 * 60,
            },
            obfuscator: ObfuscatorSettings {
                node_binary: PathBuf::from("node"),
                node_path: None,
            },
            log: LogSettings {
                level: "info".to_string(),
                json: true,
            },
        }
    }
}

fn with_defaults(
    mut builder: config_rs::ConfigBuilder<config_rs::builder::DefaultState>,
) -> Result<config_rs::ConfigBuilder<config_rs::builder::DefaultState>, SettingsError> {
    let defaults = Settings::default();
    builder = builder
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default(
            "server.static_dir",
            defaults.server.static_dir.to_string_lossy().into_owned(),
        )?
        .set_default("server.json_limit_bytes", defaults.server.json_limit_bytes as i64)?
        .set_default("server.workers", defaults.server.workers as i64)?
        .set_default("rate_limit.enabled", defaults.rate_limit.enabled)?
        .set_default("rate_limit.max_requests", i64::from(defaults.rate_limit.max_requests))?
        .set_default("rate_limit.window_secs", defaults.rate_limit.window_secs as i64)?
        .set_default(
            "obfuscator.node_binary",
            defaults.obfuscator.node_binary.to_string_lossy().into_owned(),
        )?
        .set_default("log.level", defaults.log.level)?
        .set_default("log.json", defaults.log.json)?;
    Ok(builder)
}

/// Load settings in layers: built-in defaults, then the optional TOML file
/// (`jscloak.toml` in the working directory unless `path` is given), then
/// `JSCLOAK__SECTION__KEY` environment variables, then `PORT`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_settings_with(path, std::env::vars().collect())
}

/// Same layering as [`load_settings`], reading variables from `env` instead
/// of the process environment.
pub fn load_settings_with(
    path: Option<&Path>,
    env: HashMap<String, String>,
) -> Result<Settings, SettingsError> {
    let mut builder = with_defaults(config_rs::Config::builder())?;

    builder = match path {
        Some(path) => builder.add_source(config_rs::File::from(path).required(true)),
        None => builder.add_source(config_rs::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let port = env.get("PORT").cloned();

    builder = builder.add_source(
        config_rs::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(env)),
    );

    if let Some(port) = port {
        let parsed: u16 = port
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidPort(port.clone()))?;
        builder = builder.set_override("server.port", i64::from(parsed))?;
    }

    let cfg = builder.build()?;
    Ok(cfg.try_deserialize()?)
}
