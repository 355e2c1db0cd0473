use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use jscloak_core::ui::{apply, build_request, download_file_name};
use jscloak_core::{
    parse_domain_list, validate_domain_lock, FixedSeed, NodeObfuscator, NodeObfuscatorConfig,
    PresetResolver, RequestHandler, SecurityLevel, UiEvent, UiState,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "jscloak-cli")]
#[command(about = "JsCloak CLI: inspect security-level presets and obfuscate JavaScript files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the security levels
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the obfuscator options a level resolves to
    Resolve {
        #[arg(short, long, default_value = "standard")]
        level: String,
        /// Comma-separated domain lock
        #[arg(short, long)]
        domains: Option<String>,
        /// Fixed seed for the ultra level
        #[arg(long)]
        seed: Option<String>,
    },
    /// Obfuscate a JavaScript file through Node.js
    Obfuscate(ObfuscateArgs),
}

#[derive(Args)]
pub struct ObfuscateArgs {
    /// Source file, `-` for stdin
    pub file: PathBuf,
    #[arg(short, long, default_value = "standard")]
    pub level: String,
    /// Comma-separated domain lock
    #[arg(short, long)]
    pub domains: Option<String>,
    /// Write the result here instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    pub output: Option<PathBuf>,
    /// Write the result to `obfuscated-<level>-<millis>.js` in the current directory
    #[arg(long)]
    pub save: bool,
    /// Fixed seed for the ultra level
    #[arg(long)]
    pub seed: Option<String>,
    /// Omit the attribution header
    #[arg(long)]
    pub no_banner: bool,
    /// Node.js executable
    #[arg(long, default_value = "node")]
    pub node: PathBuf,
    /// Directory holding node_modules/javascript-obfuscator
    #[arg(long)]
    pub node_path: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetSummary {
    level: SecurityLevel,
    description: &'static str,
    performance_score: u8,
    performance: String,
}

fn parse_level(name: &str) -> SecurityLevel {
    SecurityLevel::from_name(name).unwrap_or_else(|| {
        warn!(requested = name, "unknown security level, using standard");
        SecurityLevel::Standard
    })
}

fn resolver_for(seed: Option<String>) -> PresetResolver {
    match seed {
        Some(seed) => PresetResolver::with_seed_source(Arc::new(FixedSeed::new(seed))),
        None => PresetResolver::new(),
    }
}

pub fn presets_command(json: bool) -> Result<()> {
    let summaries: Vec<PresetSummary> = SecurityLevel::all()
        .into_iter()
        .map(|level| PresetSummary {
            level,
            description: level.description(),
            performance_score: level.performance_score(),
            performance: level.performance_band().to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{:<12} {:>5}  {:<9} {}", "LEVEL", "PERF", "BAND", "DESCRIPTION");
    for summary in &summaries {
        println!(
            "{:<12} {:>5}  {:<9} {}",
            summary.level.as_str(),
            summary.performance_score,
            summary.performance,
            summary.description
        );
    }
    Ok(())
}

pub fn resolve_command(level: String, domains: Option<String>, seed: Option<String>) -> Result<()> {
    let level = parse_level(&level);
    let domains = domains
        .as_deref()
        .map(parse_domain_list)
        .unwrap_or_default();
    validate_domain_lock(&domains)?;

    let config = resolver_for(seed).resolve(level, &domains);
    println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    Ok(())
}

async fn read_source(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .context("failed to read source from stdin")?;
        return Ok(source);
    }
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))
}

pub async fn obfuscate_command(args: ObfuscateArgs) -> Result<()> {
    let source = read_source(&args.file).await?;
    let level = parse_level(&args.level);

    let mut state = UiState::new();
    state = apply(&state, UiEvent::SelectLevel(level));
    state = apply(&state, UiEvent::EditSource(source));
    state = apply(
        &state,
        UiEvent::EditDomains(args.domains.clone().unwrap_or_default()),
    );
    state = apply(&state, UiEvent::Submit);

    let obfuscator = NodeObfuscator::new(NodeObfuscatorConfig {
        node_binary: args.node.clone(),
        node_path: args.node_path.clone(),
    });
    let handler = RequestHandler::with_resolver(Arc::new(obfuscator), resolver_for(args.seed));

    let result = match handler.handle(build_request(&state)).await {
        Ok(result) => result,
        Err(err) => {
            state = apply(&state, UiEvent::Failed(err.to_string()));
            bail!(state.error.unwrap_or_else(|| err.to_string()));
        }
    };

    let at = Utc::now();
    let raw = result.obfuscated_code.clone();
    state = apply(&state, UiEvent::Completed { code: raw.clone(), at });
    let output = if args.no_banner { raw } else { state.output };

    let target = match (args.output, args.save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(download_file_name(level, at))),
        (None, false) => None,
    };

    match target {
        Some(path) => {
            tokio::fs::write(&path, &output)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                request_id = %result.request_id,
                path = %path.display(),
                bytes = output.len(),
                "obfuscated output written"
            );
            eprintln!("wrote {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}
