use anyhow::Context;
use jscloak_api::api::{start_server, AppState};
use jscloak_api::logging::{init_logging, install_panic_hook};
use jscloak_api::settings::load_settings;
use jscloak_core::{NodeObfuscator, NodeObfuscatorConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Explicit settings file; when unset `jscloak.toml` is read if present.
const CONFIG_FILE_ENV: &str = "JSCLOAK_CONFIG_FILE";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
    let settings = load_settings(config_file.as_deref()).context("failed to load settings")?;

    init_logging(&settings.log);
    install_panic_hook();

    let node_config: NodeObfuscatorConfig = (&settings.obfuscator).into();
    info!(node = %node_config.node_binary.display(), "using Node.js obfuscator bridge");
    let obfuscator = Arc::new(NodeObfuscator::new(node_config));

    let state = AppState::new(&settings, obfuscator)?;
    start_server(settings, state)
        .await
        .context("HTTP server failed")
}
