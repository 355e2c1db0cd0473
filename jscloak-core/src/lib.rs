//! JsCloak: security-level presets and request handling for a
//! `javascript-obfuscator` front-end

pub mod domain;
pub mod errors;
pub mod handler;
pub mod levels;
pub mod obfuscator;
pub mod options;
pub mod presets;
pub mod request;
pub mod seed;
pub mod ui;

// Re-exports
pub use domain::{is_valid_domain, parse_domain_list, validate_domain_lock};
pub use errors::{HandleError, HandleErrorKind, ObfuscatorError, TransformError, ValidationError};
pub use handler::{validate, RequestHandler};
pub use levels::{PerformanceBand, SecurityLevel};
pub use obfuscator::{NodeObfuscator, NodeObfuscatorConfig, ObfuscatedOutput, Obfuscator};
pub use options::{ObfuscationConfig, OptionValue};
pub use presets::{resolve, PresetResolver, DOMAIN_LOCK_KEY, SEED_KEY};
pub use request::{ObfuscationRequest, ObfuscationResult, RequestId};
pub use seed::{FixedSeed, RandomSeed, SeedSource};
pub use ui::{UiEvent, UiState};
