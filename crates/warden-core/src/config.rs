//! Configuration types for the Prompt Warden pipeline.

use serde::{Deserialize, Serialize};
use warden_detect::Sensitivity;
use warden_sanitize::PaddingStrategy;

/// Security enforcement tiers, ordered from most to least permissive.
///
/// The tier controls which checks participate in blocking decisions:
///
/// | Level | Secret block | Entropy block | Heuristic checks |
/// |-------|--------------|---------------|------------------|
/// | `Permissive` | yes | no | no |
/// | `Normal` | yes | no | no |
/// | `Strict` | yes | no | yes |
/// | `Paranoid` | yes | yes | yes |
///
/// The fail-closed processing deadline applies at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Log-and-forward posture; only high-confidence secrets block.
    Permissive,
    /// Default posture.
    Normal,
    /// Adds length and suspicious-phrase heuristics.
    Strict,
    /// Everything blocks, including entropy findings.
    Paranoid,
}

impl SecurityLevel {
    /// Stable string identifier used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Permissive => "permissive",
            SecurityLevel::Normal => "normal",
            SecurityLevel::Strict => "strict",
            SecurityLevel::Paranoid => "paranoid",
        }
    }

    /// Detector sensitivity tier for this level.
    pub fn sensitivity(&self) -> Sensitivity {
        match self {
            SecurityLevel::Permissive => Sensitivity::Low,
            SecurityLevel::Normal => Sensitivity::Standard,
            SecurityLevel::Strict => Sensitivity::High,
            SecurityLevel::Paranoid => Sensitivity::Paranoid,
        }
    }

    /// True when the level-gated heuristic checks run.
    pub fn runs_heuristics(&self) -> bool {
        matches!(self, SecurityLevel::Strict | SecurityLevel::Paranoid)
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration for a [`SecurityWrapper`].
///
/// Constructed once and shared by reference with every component; there
/// is no global default state and no post-construction mutation.
///
/// [`SecurityWrapper`]: crate::SecurityWrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Enforcement tier.
    pub security_level: SecurityLevel,

    /// Run the secret detector during validation.
    pub secret_detection_enabled: bool,
    /// Rewrite detected paths during sanitization.
    pub path_aliasing_enabled: bool,
    /// Pad output to the target length during sanitization.
    pub prompt_padding_enabled: bool,
    /// Run the entropy analyzer during validation.
    pub entropy_analysis_enabled: bool,

    /// Padding target in characters.
    pub padding_target_length: usize,
    /// Filler strategy.
    pub padding_strategy: PaddingStrategy,

    /// Minimum confidence for a secret match to block.
    pub secret_confidence_threshold: f64,
    /// Entropy threshold in bits per character.
    pub entropy_threshold: f64,

    /// Fail-closed validation deadline in milliseconds.
    pub max_processing_time_ms: f64,

    /// Include internal fault messages in error outcomes.
    pub debug_errors: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            security_level: SecurityLevel::Normal,
            secret_detection_enabled: true,
            path_aliasing_enabled: true,
            prompt_padding_enabled: true,
            entropy_analysis_enabled: true,
            padding_target_length: 4096,
            padding_strategy: PaddingStrategy::Whitespace,
            secret_confidence_threshold: 0.7,
            entropy_threshold: 4.5,
            max_processing_time_ms: 15.0,
            debug_errors: false,
        }
    }
}

impl GuardConfig {
    /// Default configuration at the given level.
    pub fn with_level(level: SecurityLevel) -> Self {
        Self {
            security_level: level,
            ..Self::default()
        }
    }

    /// Sets the padding target length.
    #[must_use]
    pub fn with_padding_target(mut self, length: usize) -> Self {
        self.padding_target_length = length;
        self
    }

    /// Sets the padding strategy.
    #[must_use]
    pub fn with_padding_strategy(mut self, strategy: PaddingStrategy) -> Self {
        self.padding_strategy = strategy;
        self
    }

    /// Sets the secret confidence threshold.
    #[must_use]
    pub fn with_secret_confidence_threshold(mut self, threshold: f64) -> Self {
        self.secret_confidence_threshold = threshold;
        self
    }

    /// Sets the entropy threshold.
    #[must_use]
    pub fn with_entropy_threshold(mut self, threshold: f64) -> Self {
        self.entropy_threshold = threshold;
        self
    }

    /// Sets the fail-closed processing deadline.
    #[must_use]
    pub fn with_max_processing_time_ms(mut self, budget: f64) -> Self {
        self.max_processing_time_ms = budget;
        self
    }

    /// Enables fault messages in error outcomes.
    #[must_use]
    pub fn with_debug_errors(mut self, enabled: bool) -> Self {
        self.debug_errors = enabled;
        self
    }

    /// Preset for local development: normal level, smaller padding,
    /// a lenient deadline.
    pub fn development() -> Self {
        Self::with_level(SecurityLevel::Normal)
            .with_padding_target(2048)
            .with_max_processing_time_ms(50.0)
    }

    /// Preset for production: strict level, defaults elsewhere.
    pub fn production() -> Self {
        Self::with_level(SecurityLevel::Strict)
    }

    /// Preset for maximum suspicion: paranoid level, larger padding,
    /// lower thresholds, extra deadline headroom for the deeper scans.
    pub fn paranoid() -> Self {
        Self::with_level(SecurityLevel::Paranoid)
            .with_padding_target(8192)
            .with_entropy_threshold(4.0)
            .with_secret_confidence_threshold(0.5)
            .with_max_processing_time_ms(25.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.security_level, SecurityLevel::Normal);
        assert_eq!(config.padding_target_length, 4096);
        assert_eq!(config.secret_confidence_threshold, 0.7);
        assert_eq!(config.entropy_threshold, 4.5);
        assert_eq!(config.max_processing_time_ms, 15.0);
        assert!(!config.debug_errors);
    }

    #[test]
    fn test_level_ordering() {
        assert!(SecurityLevel::Permissive < SecurityLevel::Normal);
        assert!(SecurityLevel::Strict < SecurityLevel::Paranoid);
    }

    #[test]
    fn test_heuristics_gate() {
        assert!(!SecurityLevel::Permissive.runs_heuristics());
        assert!(!SecurityLevel::Normal.runs_heuristics());
        assert!(SecurityLevel::Strict.runs_heuristics());
        assert!(SecurityLevel::Paranoid.runs_heuristics());
    }

    #[test]
    fn test_presets() {
        let dev = GuardConfig::development();
        assert_eq!(dev.padding_target_length, 2048);
        assert_eq!(dev.max_processing_time_ms, 50.0);

        let prod = GuardConfig::production();
        assert_eq!(prod.security_level, SecurityLevel::Strict);

        let paranoid = GuardConfig::paranoid();
        assert_eq!(paranoid.security_level, SecurityLevel::Paranoid);
        assert_eq!(paranoid.entropy_threshold, 4.0);
        assert_eq!(paranoid.secret_confidence_threshold, 0.5);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = GuardConfig::paranoid();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GuardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.security_level, config.security_level);
        assert_eq!(parsed.padding_target_length, config.padding_target_length);
    }
}
