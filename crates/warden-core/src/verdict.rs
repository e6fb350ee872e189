//! Verdict and outcome types for pipeline results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use warden_detect::{EntropySegment, SecretMatch};
use warden_sanitize::PaddedPrompt;

/// Why a request was blocked.
///
/// Every variant maps to a stable string code via [`BlockReason::code`]
/// so callers can branch without matching the full enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockReason {
    /// One or more secret matches at or above the confidence threshold.
    Secrets {
        /// Number of qualifying matches.
        count: usize,
    },

    /// High-entropy segments found at the paranoid level.
    HighEntropy {
        /// Number of suspicious segments.
        count: usize,
    },

    /// Prompt exceeds the safe length ceiling.
    OversizedPrompt {
        /// Prompt length in characters.
        length: usize,
        /// The ceiling.
        limit: usize,
    },

    /// Prompt contains a known data-dump or raw-SQL idiom.
    SuspiciousPhrase {
        /// The phrase that matched.
        phrase: String,
    },

    /// Validation ran past the deadline; fail-closed override.
    ProcessingTimeout {
        /// Measured validation time.
        elapsed_ms: f64,
        /// The configured budget.
        budget_ms: f64,
    },
}

impl BlockReason {
    /// Stable string code for this reason.
    pub fn code(&self) -> &'static str {
        match self {
            BlockReason::Secrets { .. } => "secrets",
            BlockReason::HighEntropy { .. } => "entropy",
            BlockReason::OversizedPrompt { .. } => "oversized-prompt",
            BlockReason::SuspiciousPhrase { .. } => "suspicious-phrase",
            BlockReason::ProcessingTimeout { .. } => "processing-timeout",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secrets { count } => {
                write!(f, "Detected {} high-confidence secrets", count)
            }
            Self::HighEntropy { count } => {
                write!(f, "Detected {} high-entropy segments", count)
            }
            Self::OversizedPrompt { length, limit } => {
                write!(f, "Prompt length {} exceeds safe ceiling {}", length, limit)
            }
            Self::SuspiciousPhrase { phrase } => {
                write!(f, "Detected suspicious phrase: {}", phrase)
            }
            Self::ProcessingTimeout { elapsed_ms, budget_ms } => {
                write!(f, "Validation took {:.2}ms, budget {:.2}ms", elapsed_ms, budget_ms)
            }
        }
    }
}

/// Result of the validation phase, produced once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no check blocked.
    pub is_safe: bool,
    /// The blocking reason, when one fired.
    pub blocked_reason: Option<BlockReason>,
    /// All secret matches found, regardless of threshold.
    pub secrets: Vec<SecretMatch>,
    /// All suspicious entropy segments found.
    pub entropy_alerts: Vec<EntropySegment>,
    /// Validation wall time against a monotonic clock.
    pub elapsed_ms: f64,
}

/// Final outcome of one `process` call.
///
/// Serializes with a `status` tag of `success`, `blocked`, or `error`;
/// exactly one of the three is returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// Validation passed; the sanitized text is safe to forward.
    Success {
        /// Aliased and padded prompt text.
        sanitized_text: String,
        /// Alias token → original path mapping accumulated so far.
        path_mappings: HashMap<String, String>,
        /// Padding metadata, when padding ran.
        padding_info: Option<PaddedPrompt>,
        /// The validation report backing the decision.
        validation_info: ValidationReport,
        /// End-to-end processing time in milliseconds.
        elapsed_ms: f64,
    },

    /// Validation blocked the request; nothing was sanitized.
    Blocked {
        /// Why the request was blocked.
        reason: BlockReason,
        /// Secret matches found during validation.
        secrets_found: Vec<SecretMatch>,
        /// Entropy segments found during validation.
        entropy_alerts: Vec<EntropySegment>,
        /// End-to-end processing time in milliseconds.
        elapsed_ms: f64,
    },

    /// An internal fault was caught at the pipeline boundary.
    Error {
        /// Fault description; redacted unless debug errors are enabled.
        message: String,
        /// End-to-end processing time in milliseconds.
        elapsed_ms: f64,
    },
}

impl ProcessOutcome {
    /// True for a success outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True for a blocked outcome.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// True for an error outcome.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The block reason, when blocked.
    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            Self::Blocked { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(BlockReason::Secrets { count: 2 }.code(), "secrets");
        assert_eq!(BlockReason::HighEntropy { count: 1 }.code(), "entropy");
        assert_eq!(
            BlockReason::ProcessingTimeout { elapsed_ms: 20.0, budget_ms: 15.0 }.code(),
            "processing-timeout"
        );
    }

    #[test]
    fn test_reason_display() {
        let reason = BlockReason::SuspiciousPhrase { phrase: "dump all".to_string() };
        assert_eq!(reason.to_string(), "Detected suspicious phrase: dump all");
    }

    #[test]
    fn test_outcome_predicates() {
        let blocked = ProcessOutcome::Blocked {
            reason: BlockReason::Secrets { count: 1 },
            secrets_found: vec![],
            entropy_alerts: vec![],
            elapsed_ms: 1.0,
        };
        assert!(blocked.is_blocked());
        assert!(!blocked.is_success());
        assert_eq!(blocked.block_reason().map(BlockReason::code), Some("secrets"));
    }

    #[test]
    fn test_outcome_status_tag() {
        let error = ProcessOutcome::Error { message: "internal error".to_string(), elapsed_ms: 0.5 };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["status"], "error");
    }
}
