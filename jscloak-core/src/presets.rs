//! Security-level presets
//!
//! Every level starts from [`BASELINE`] and layers its own overrides on top.
//! The override table is ordered weakest to strongest; the monotonicity
//! tests in `tests/preset_tests.rs` guard the ordering.

use crate::levels::SecurityLevel;
use crate::options::{ObfuscationConfig, OptionValue};
use crate::seed::{RandomSeed, SeedSource};
use std::sync::Arc;

pub const DOMAIN_LOCK_KEY: &str = "domainLock";
pub const DOMAIN_LOCK_REDIRECT_KEY: &str = "domainLockRedirectUrl";
pub const SEED_KEY: &str = "seed";

#[derive(Debug, Clone, Copy)]
enum Preset {
    Bool(bool),
    Int(i64),
    Num(f64),
    Text(&'static str),
    List(&'static [&'static str]),
    /// Drawn from the resolver's seed source on every call.
    FreshSeed,
}

type Entry = (&'static str, Preset);

struct LevelPreset {
    level: SecurityLevel,
    overrides: &'static [Entry],
    /// Applied only when a domain lock is requested.
    when_locked: &'static [Entry],
}

const BASELINE: &[Entry] = &[
    ("compact", Preset::Bool(true)),
    ("controlFlowFlattening", Preset::Bool(false)),
    ("controlFlowFlatteningThreshold", Preset::Num(0.0)),
    ("deadCodeInjection", Preset::Bool(false)),
    ("deadCodeInjectionThreshold", Preset::Num(0.0)),
    ("debugProtection", Preset::Bool(false)),
    ("debugProtectionInterval", Preset::Int(0)),
    ("disableConsoleOutput", Preset::Bool(false)),
    ("identifierNamesGenerator", Preset::Text("hexadecimal")),
    ("log", Preset::Bool(false)),
    ("numbersToExpressions", Preset::Bool(false)),
    ("renameGlobals", Preset::Bool(false)),
    ("renameProperties", Preset::Bool(false)),
    ("selfDefending", Preset::Bool(false)),
    ("simplify", Preset::Bool(true)),
    ("splitStrings", Preset::Bool(false)),
    ("splitStringsChunkLength", Preset::Int(10)),
    ("stringArray", Preset::Bool(true)),
    ("stringArrayEncoding", Preset::List(&[])),
    ("stringArrayIndexShift", Preset::Bool(false)),
    ("stringArrayThreshold", Preset::Num(0.75)),
    ("stringArrayWrappersChainedCalls", Preset::Bool(false)),
    ("stringArrayWrappersCount", Preset::Int(1)),
    ("target", Preset::Text("browser")),
    ("transformObjectKeys", Preset::Bool(false)),
    ("unicodeEscapeSequence", Preset::Bool(false)),
];

static PRESETS: [LevelPreset; 5] = [
    LevelPreset {
        level: SecurityLevel::Basic,
        overrides: &[],
        when_locked: &[],
    },
    LevelPreset {
        level: SecurityLevel::Standard,
        overrides: &[
            ("controlFlowFlattening", Preset::Bool(true)),
            ("controlFlowFlatteningThreshold", Preset::Num(0.75)),
            ("debugProtection", Preset::Bool(true)),
            ("stringArrayEncoding", Preset::List(&["base64"])),
            ("stringArrayThreshold", Preset::Num(0.5)),
            ("stringArrayWrappersChainedCalls", Preset::Bool(true)),
        ],
        when_locked: &[],
    },
    LevelPreset {
        level: SecurityLevel::Advanced,
        overrides: &[
            ("controlFlowFlattening", Preset::Bool(true)),
            ("controlFlowFlatteningThreshold", Preset::Num(0.85)),
            ("deadCodeInjection", Preset::Bool(true)),
            ("deadCodeInjectionThreshold", Preset::Num(0.3)),
            ("debugProtection", Preset::Bool(true)),
            ("debugProtectionInterval", Preset::Int(1000)),
            ("disableConsoleOutput", Preset::Bool(true)),
            ("selfDefending", Preset::Bool(true)),
            ("simplify", Preset::Bool(false)),
            ("stringArrayEncoding", Preset::List(&["rc4"])),
            ("stringArrayThreshold", Preset::Num(0.4)),
            ("stringArrayWrappersChainedCalls", Preset::Bool(true)),
            ("stringArrayWrappersCount", Preset::Int(2)),
            ("transformObjectKeys", Preset::Bool(true)),
            ("unicodeEscapeSequence", Preset::Bool(true)),
        ],
        when_locked: &[],
    },
    LevelPreset {
        level: SecurityLevel::Enterprise,
        overrides: &[
            ("compact", Preset::Bool(false)),
            ("controlFlowFlattening", Preset::Bool(true)),
            ("controlFlowFlatteningThreshold", Preset::Num(1.0)),
            ("deadCodeInjection", Preset::Bool(true)),
            ("deadCodeInjectionThreshold", Preset::Num(0.5)),
            ("debugProtection", Preset::Bool(true)),
            ("debugProtectionInterval", Preset::Int(500)),
            ("disableConsoleOutput", Preset::Bool(true)),
            ("identifierNamesGenerator", Preset::Text("mangled")),
            ("numbersToExpressions", Preset::Bool(true)),
            ("renameGlobals", Preset::Bool(true)),
            ("renameProperties", Preset::Bool(true)),
            ("renamePropertiesMode", Preset::Text("safe")),
            ("selfDefending", Preset::Bool(true)),
            ("simplify", Preset::Bool(false)),
            ("splitStrings", Preset::Bool(true)),
            ("splitStringsChunkLength", Preset::Int(8)),
            ("stringArrayEncoding", Preset::List(&["rc4", "base64"])),
            ("stringArrayIndexShift", Preset::Bool(true)),
            ("stringArrayThreshold", Preset::Num(0.3)),
            ("stringArrayWrappersChainedCalls", Preset::Bool(true)),
            ("stringArrayWrappersCount", Preset::Int(3)),
            ("transformObjectKeys", Preset::Bool(true)),
            ("unicodeEscapeSequence", Preset::Bool(true)),
        ],
        when_locked: &[],
    },
    LevelPreset {
        level: SecurityLevel::Ultra,
        overrides: &[
            ("compact", Preset::Bool(false)),
            ("controlFlowFlattening", Preset::Bool(true)),
            ("controlFlowFlatteningThreshold", Preset::Num(1.0)),
            ("deadCodeInjection", Preset::Bool(true)),
            ("deadCodeInjectionThreshold", Preset::Num(0.75)),
            ("debugProtection", Preset::Bool(true)),
            ("debugProtectionInterval", Preset::Int(200)),
            ("disableConsoleOutput", Preset::Bool(true)),
            (
                "forceTransformStrings",
                Preset::List(&["eval", "Function", "constructor", "^get", "^set"]),
            ),
            ("identifierNamesGenerator", Preset::Text("mangled-shuffled")),
            ("numbersToExpressions", Preset::Bool(true)),
            ("renameGlobals", Preset::Bool(true)),
            ("renameProperties", Preset::Bool(true)),
            ("renamePropertiesMode", Preset::Text("unsafe")),
            ("reservedNames", Preset::List(&["^_$"])),
            (SEED_KEY, Preset::FreshSeed),
            ("selfDefending", Preset::Bool(true)),
            ("simplify", Preset::Bool(false)),
            ("splitStrings", Preset::Bool(true)),
            ("splitStringsChunkLength", Preset::Int(5)),
            ("stringArrayEncoding", Preset::List(&["rc4", "base64", "none"])),
            ("stringArrayIndexShift", Preset::Bool(true)),
            ("stringArrayRotate", Preset::Bool(true)),
            ("stringArrayShuffle", Preset::Bool(true)),
            ("stringArrayThreshold", Preset::Num(0.1)),
            ("stringArrayWrappersChainedCalls", Preset::Bool(true)),
            ("stringArrayWrappersCount", Preset::Int(5)),
            ("stringArrayWrappersParametersMaxCount", Preset::Int(5)),
            ("transformObjectKeys", Preset::Bool(true)),
            ("unicodeEscapeSequence", Preset::Bool(true)),
        ],
        when_locked: &[(DOMAIN_LOCK_REDIRECT_KEY, Preset::Text("about:blank"))],
    },
];

fn preset_for(level: SecurityLevel) -> &'static LevelPreset {
    PRESETS
        .iter()
        .find(|preset| preset.level == level)
        .unwrap_or(&PRESETS[1])
}

/// Builds the obfuscator option bag for a level and domain lock.
#[derive(Clone)]
pub struct PresetResolver {
    seeds: Arc<dyn SeedSource>,
}

impl PresetResolver {
    /// Resolver drawing ultra seeds from the thread-local RNG
    pub fn new() -> Self {
        Self::with_seed_source(Arc::new(RandomSeed))
    }

    pub fn with_seed_source(seeds: Arc<dyn SeedSource>) -> Self {
        Self { seeds }
    }

    /// Resolve a level by name; absent or unknown names get the standard preset.
    pub fn resolve_named(&self, level: Option<&str>, domain_lock: &[String]) -> ObfuscationConfig {
        self.resolve(SecurityLevel::resolve(level), domain_lock)
    }

    /// An empty `domain_lock` leaves the `domainLock` key out entirely so the
    /// obfuscator does not switch domain locking on.
    pub fn resolve(&self, level: SecurityLevel, domain_lock: &[String]) -> ObfuscationConfig {
        let preset = preset_for(level);
        let mut config = ObfuscationConfig::new();

        for entry in BASELINE.iter().chain(preset.overrides) {
            self.apply(&mut config, entry);
        }

        if !domain_lock.is_empty() {
            config.insert(DOMAIN_LOCK_KEY, OptionValue::List(domain_lock.to_vec()));
            for entry in preset.when_locked {
                self.apply(&mut config, entry);
            }
        }

        config
    }

    fn apply(&self, config: &mut ObfuscationConfig, (key, preset): &Entry) {
        let value = match *preset {
            Preset::Bool(value) => OptionValue::Bool(value),
            Preset::Int(value) => OptionValue::Integer(value),
            Preset::Num(value) => OptionValue::Number(value),
            Preset::Text(value) => OptionValue::Text(value.to_string()),
            Preset::List(values) => {
                OptionValue::List(values.iter().map(|value| value.to_string()).collect())
            }
            Preset::FreshSeed => OptionValue::Text(self.seeds.next_seed()),
        };
        config.insert(*key, value);
    }
}

impl Default for PresetResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetResolver").finish_non_exhaustive()
    }
}

/// Resolve with a fresh random seed source.
pub fn resolve(level: Option<&str>, domain_lock: &[String]) -> ObfuscationConfig {
    PresetResolver::new().resolve_named(level, domain_lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::FixedSeed;
    use std::collections::HashSet;

    #[test]
    fn test_every_level_has_a_preset() {
        for level in SecurityLevel::all() {
            assert_eq!(preset_for(level).level, level);
        }
    }

    #[test]
    fn test_baseline_has_no_duplicate_keys() {
        let keys: HashSet<&str> = BASELINE.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys.len(), BASELINE.len());
    }

    #[test]
    fn test_overrides_have_no_duplicate_keys() {
        for preset in &PRESETS {
            let keys: HashSet<&str> = preset.overrides.iter().map(|(key, _)| *key).collect();
            assert_eq!(keys.len(), preset.overrides.len(), "{}", preset.level);
        }
    }

    #[test]
    fn test_basic_is_the_baseline() {
        let resolver = PresetResolver::new();
        let config = resolver.resolve(SecurityLevel::Basic, &[]);
        assert_eq!(config.len(), BASELINE.len());
        assert_eq!(config.get_f64("stringArrayThreshold"), Some(0.75));
        assert_eq!(config.get_bool("controlFlowFlattening"), Some(false));
    }

    #[test]
    fn test_redirect_only_with_lock() {
        let resolver = PresetResolver::with_seed_source(Arc::new(FixedSeed::new("s")));
        let open = resolver.resolve(SecurityLevel::Ultra, &[]);
        assert!(!open.contains_key(DOMAIN_LOCK_REDIRECT_KEY));

        let locked = resolver.resolve(SecurityLevel::Ultra, &["example.com".to_string()]);
        assert_eq!(locked.get_str(DOMAIN_LOCK_REDIRECT_KEY), Some("about:blank"));

        let enterprise = resolver.resolve(SecurityLevel::Enterprise, &["example.com".to_string()]);
        assert!(!enterprise.contains_key(DOMAIN_LOCK_REDIRECT_KEY));
    }

    #[test]
    fn test_only_ultra_is_seeded() {
        let resolver = PresetResolver::with_seed_source(Arc::new(FixedSeed::new("abc")));
        for level in SecurityLevel::all() {
            let config = resolver.resolve(level, &[]);
            if level == SecurityLevel::Ultra {
                assert_eq!(config.get_str(SEED_KEY), Some("abc"));
            } else {
                assert!(!config.contains_key(SEED_KEY), "{} should not be seeded", level);
            }
        }
    }
}
