//! Security level definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named presets selecting obfuscation aggressiveness, weakest first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Basic,
    #[default]
    Standard,
    Advanced,
    Enterprise,
    Ultra,
}

/// Coarse runtime cost of the obfuscated output, shown next to each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Fast,
    Moderate,
    Slow,
}

impl SecurityLevel {
    pub const ALL: [SecurityLevel; 5] = [
        SecurityLevel::Basic,
        SecurityLevel::Standard,
        SecurityLevel::Advanced,
        SecurityLevel::Enterprise,
        SecurityLevel::Ultra,
    ];

    /// Get all levels in ascending strength
    pub fn all() -> Vec<SecurityLevel> {
        Self::ALL.to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Basic => "basic",
            SecurityLevel::Standard => "standard",
            SecurityLevel::Advanced => "advanced",
            SecurityLevel::Enterprise => "enterprise",
            SecurityLevel::Ultra => "ultra",
        }
    }

    /// Look up a level by name. Matching ignores case and surrounding
    /// whitespace; `low`, `medium` and `high` are accepted for clients that
    /// still send the three-level names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "basic" | "low" => Some(SecurityLevel::Basic),
            "standard" | "medium" => Some(SecurityLevel::Standard),
            "advanced" | "high" => Some(SecurityLevel::Advanced),
            "enterprise" => Some(SecurityLevel::Enterprise),
            "ultra" => Some(SecurityLevel::Ultra),
            _ => None,
        }
    }

    /// Resolve an optional requested name, falling back to `Standard` when it
    /// is absent or unrecognized.
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(Self::from_name).unwrap_or_default()
    }

    pub fn description(&self) -> &'static str {
        match self {
            SecurityLevel::Basic => "Basic obfuscation (minimal protection, fastest performance)",
            SecurityLevel::Standard => {
                "Standard protection (control flow flattening + debug protection)"
            }
            SecurityLevel::Advanced => "Enhanced security (self-defending + identifier mangling)",
            SecurityLevel::Enterprise => "Professional-grade (multiple layers + anti-debugging)",
            SecurityLevel::Ultra => "Maximum security (all techniques, slowest output)",
        }
    }

    /// Relative speed of the generated code, 0-100.
    pub fn performance_score(&self) -> u8 {
        match self {
            SecurityLevel::Basic => 95,
            SecurityLevel::Standard => 80,
            SecurityLevel::Advanced => 65,
            SecurityLevel::Enterprise => 45,
            SecurityLevel::Ultra => 20,
        }
    }

    pub fn performance_band(&self) -> PerformanceBand {
        match self.performance_score() {
            score if score > 70 => PerformanceBand::Fast,
            score if score > 40 => PerformanceBand::Moderate,
            _ => PerformanceBand::Slow,
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Fast => write!(f, "fast"),
            PerformanceBand::Moderate => write!(f, "moderate"),
            PerformanceBand::Slow => write!(f, "slow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(SecurityLevel::from_name("ULTRA"), Some(SecurityLevel::Ultra));
        assert_eq!(SecurityLevel::from_name(" Advanced "), Some(SecurityLevel::Advanced));
        assert_eq!(SecurityLevel::from_name("paranoid"), None);
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(SecurityLevel::from_name("low"), Some(SecurityLevel::Basic));
        assert_eq!(SecurityLevel::from_name("medium"), Some(SecurityLevel::Standard));
        assert_eq!(SecurityLevel::from_name("high"), Some(SecurityLevel::Advanced));
    }

    #[test]
    fn test_resolve_falls_back_to_standard() {
        assert_eq!(SecurityLevel::resolve(None), SecurityLevel::Standard);
        assert_eq!(SecurityLevel::resolve(Some("")), SecurityLevel::Standard);
        assert_eq!(SecurityLevel::resolve(Some("unknown-level")), SecurityLevel::Standard);
        assert_eq!(SecurityLevel::resolve(Some("basic")), SecurityLevel::Basic);
    }

    #[test]
    fn test_round_trips_through_display() {
        for level in SecurityLevel::all() {
            assert_eq!(SecurityLevel::from_name(&level.to_string()), Some(level));
        }
    }

    #[test]
    fn test_performance_decreases_with_strength() {
        let scores: Vec<u8> = SecurityLevel::all()
            .iter()
            .map(|level| level.performance_score())
            .collect();
        assert!(scores.windows(2).all(|pair| pair[0] > pair[1]));

        assert_eq!(SecurityLevel::Basic.performance_band(), PerformanceBand::Fast);
        assert_eq!(SecurityLevel::Advanced.performance_band(), PerformanceBand::Moderate);
        assert_eq!(SecurityLevel::Ultra.performance_band(), PerformanceBand::Slow);
    }
}
