//! Client-side session state
//!
//! The single-page client and the CLI drive the same state machine: events
//! go in, a new [`UiState`] comes out, and rendering reads the state. No
//! transition touches I/O.

use crate::domain::parse_domain_list;
use crate::levels::SecurityLevel;
use crate::request::ObfuscationRequest;
use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Editing,
    Processing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub level: SecurityLevel,
    pub source: String,
    /// Comma-separated domain field exactly as typed.
    pub domains: String,
    pub phase: Phase,
    pub output: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectLevel(SecurityLevel),
    EditSource(String),
    EditDomains(String),
    Submit,
    Completed { code: String, at: DateTime<Utc> },
    Failed(String),
    Reset,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Processing
    }
}

/// Compute the next state. Events that make no sense in the current phase
/// (a second submit while processing, a result arriving while editing) leave
/// the state unchanged.
pub fn apply(state: &UiState, event: UiEvent) -> UiState {
    let mut next = state.clone();
    match event {
        UiEvent::SelectLevel(level) if !state.is_busy() => next.level = level,
        UiEvent::EditSource(source) if !state.is_busy() => next.source = source,
        UiEvent::EditDomains(domains) if !state.is_busy() => next.domains = domains,
        UiEvent::Submit if !state.is_busy() => {
            next.phase = Phase::Processing;
            next.error = None;
        }
        UiEvent::Completed { code, at } if state.is_busy() => {
            next.output = format!("{}{}", attribution_banner(state.level, at), code);
            next.phase = Phase::Done;
        }
        UiEvent::Failed(message) if state.is_busy() => {
            next.error = Some(message);
            next.phase = Phase::Failed;
        }
        UiEvent::Reset => {
            next.phase = Phase::Editing;
            next.output.clear();
            next.error = None;
        }
        _ => {}
    }
    next
}

/// The request a submit in this state sends.
pub fn build_request(state: &UiState) -> ObfuscationRequest {
    ObfuscationRequest::new(state.source.clone())
        .with_level(state.level.as_str())
        .with_domains(parse_domain_list(&state.domains))
}

/// Comment header prepended to delivered output.
pub fn attribution_banner(level: SecurityLevel, at: DateTime<Utc>) -> String {
    format!(
        "// Obfuscated with JsCloak (Security Level: {})\n// {}\n",
        level.as_str().to_uppercase(),
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

pub fn download_file_name(level: SecurityLevel, at: DateTime<Utc>) -> String {
    format!("obfuscated-{}-{}.js", level, at.timestamp_millis())
}
