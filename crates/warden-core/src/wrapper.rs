//! The unified security wrapper facade.
//!
//! This module provides the main entry point for the Prompt Warden
//! pipeline. The [`SecurityWrapper`] struct orchestrates validation and
//! sanitization and enforces the fail-closed time budget.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_detect::{EntropyAnalyzer, SecretDetector, DEFAULT_WINDOW_SIZE};
use warden_sanitize::{PaddedPrompt, PathAliaser, PromptPadder};

use crate::{
    config::{GuardConfig, SecurityLevel},
    error::{GuardError, Result},
    stats::GuardStats,
    verdict::{BlockReason, ProcessOutcome, ValidationReport},
};

/// Prompts longer than this are rejected at strict/paranoid levels.
const MAX_PROMPT_CHARS: usize = 50_000;

/// Imperative phrases rejected at strict/paranoid levels. Matched
/// case-insensitively against the lowercased prompt.
const SUSPICIOUS_PHRASES: [&str; 8] = [
    "print all",
    "dump all",
    "show me everything",
    "export all data",
    "cat /etc/passwd",
    "ls -la",
    "select * from",
    "show tables",
];

/// The unified prompt security facade.
///
/// Orchestrates two phases per request:
/// - **Validate**: secret detection, entropy analysis, level-gated
///   heuristics, then the fail-closed deadline check
/// - **Sanitize** (only if validation passed): path aliasing, then
///   constant-length padding
///
/// # Security Model
///
/// Detection runs strictly sequentially within a request; blocking
/// precedence is secrets over entropy over heuristics, and a deadline
/// overrun overrides everything. Errors surface as
/// [`ProcessOutcome::Error`], never as a silent pass.
///
/// # Concurrency
///
/// A single wrapper serves many concurrent requests. The alias cache and
/// statistics are each guarded by one `std::sync::Mutex`; neither lock is
/// held across an await point. Timing jitter suspends only the calling
/// task. If a caller drops the `process` future mid-pipeline, work stops
/// at the next detector boundary and no sanitized output escapes.
///
/// # Example
///
/// ```rust,ignore
/// let warden = SecurityWrapper::new(GuardConfig::production())?;
///
/// match warden.process("summarize /etc/passwd", None).await {
///     ProcessOutcome::Success { sanitized_text, .. } => forward(sanitized_text),
///     ProcessOutcome::Blocked { reason, .. } => reject(reason),
///     ProcessOutcome::Error { message, .. } => alert(message),
/// }
/// ```
pub struct SecurityWrapper {
    /// Immutable configuration shared with all components.
    config: GuardConfig,

    /// Secret pattern detector, when enabled.
    secrets: Option<SecretDetector>,

    /// Entropy analyzer, when enabled.
    entropy: Option<EntropyAnalyzer>,

    /// Path aliaser with its process-lifetime cache, when enabled.
    aliaser: Option<Mutex<PathAliaser>>,

    /// Constant-length padder, when enabled.
    padder: Option<PromptPadder>,

    /// Request counters, updated exactly once per request.
    stats: Mutex<GuardStats>,
}

impl SecurityWrapper {
    /// Create a wrapper with the given configuration.
    ///
    /// Components are constructed only when their enable flag is set.
    ///
    /// # Errors
    ///
    /// Returns an error if any detector or sanitizer pattern fails to
    /// compile. A wrapper never starts with a silently narrower catalog.
    pub fn new(config: GuardConfig) -> Result<Self> {
        let secrets = if config.secret_detection_enabled {
            Some(SecretDetector::new(config.security_level.sensitivity())?)
        } else {
            None
        };

        let entropy = if config.entropy_analysis_enabled {
            Some(EntropyAnalyzer::new(config.entropy_threshold)?)
        } else {
            None
        };

        let aliaser = if config.path_aliasing_enabled {
            Some(Mutex::new(PathAliaser::new()?))
        } else {
            None
        };

        let padder = if config.prompt_padding_enabled {
            Some(PromptPadder::new(
                config.padding_target_length,
                config.padding_strategy,
            ))
        } else {
            None
        };

        info!(
            level = %config.security_level,
            budget_ms = config.max_processing_time_ms,
            "security wrapper initialized"
        );

        Ok(Self {
            config,
            secrets,
            entropy,
            aliaser,
            padder,
            stats: Mutex::new(GuardStats::default()),
        })
    }

    /// The wrapper's configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Validate a prompt against all enabled checks.
    ///
    /// Checks run in precedence order; the first to fire sets the
    /// blocking reason and later detectors are skipped. After all checks,
    /// a deadline overrun (monotonic clock) overrides the decision to
    /// [`BlockReason::ProcessingTimeout`] regardless of content and
    /// security level. The yields between detectors are cancellation
    /// boundaries for callers that abort mid-request.
    pub async fn validate(&self, prompt: &str) -> ValidationReport {
        let started = Instant::now();
        let mut secrets = Vec::new();
        let mut entropy_alerts = Vec::new();
        let mut blocked_reason: Option<BlockReason> = None;

        if let Some(detector) = &self.secrets {
            secrets = detector.detect(prompt);
            let qualifying = secrets
                .iter()
                .filter(|m| m.confidence >= self.config.secret_confidence_threshold)
                .count();
            if qualifying > 0 {
                debug!(count = qualifying, "high-confidence secrets found");
                blocked_reason = Some(BlockReason::Secrets { count: qualifying });
            }
        }

        tokio::task::yield_now().await;

        if blocked_reason.is_none() {
            if let Some(analyzer) = &self.entropy {
                entropy_alerts = analyzer.find_segments(prompt, DEFAULT_WINDOW_SIZE);
                if self.config.security_level == SecurityLevel::Paranoid
                    && !entropy_alerts.is_empty()
                {
                    blocked_reason = Some(BlockReason::HighEntropy {
                        count: entropy_alerts.len(),
                    });
                }
            }
        }

        tokio::task::yield_now().await;

        if blocked_reason.is_none() {
            blocked_reason = self.heuristic_checks(prompt);
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms > self.config.max_processing_time_ms {
            warn!(elapsed_ms, budget_ms = self.config.max_processing_time_ms, "validation deadline exceeded");
            blocked_reason = Some(BlockReason::ProcessingTimeout {
                elapsed_ms,
                budget_ms: self.config.max_processing_time_ms,
            });
        }

        ValidationReport {
            is_safe: blocked_reason.is_none(),
            blocked_reason,
            secrets,
            entropy_alerts,
            elapsed_ms,
        }
    }

    /// Process a prompt through validation and, if it passes,
    /// sanitization.
    ///
    /// Always returns one of the three outcome variants; no error escapes
    /// this boundary. Statistics are updated exactly once per call on
    /// every path.
    pub async fn process(
        &self,
        prompt: &str,
        context: Option<&HashMap<String, String>>,
    ) -> ProcessOutcome {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        debug!(
            request = %request_id,
            prompt_chars = prompt.chars().count(),
            context_keys = context.map_or(0, HashMap::len),
            "processing prompt"
        );

        let report = self.validate(prompt).await;
        let secrets_found = report.secrets.len();
        let alerts_found = report.entropy_alerts.len();

        if let Some(reason) = report.blocked_reason.clone() {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            warn!(request = %request_id, reason = reason.code(), "prompt blocked");
            self.record(true, secrets_found, alerts_found, elapsed_ms);
            return ProcessOutcome::Blocked {
                reason,
                secrets_found: report.secrets,
                entropy_alerts: report.entropy_alerts,
                elapsed_ms,
            };
        }

        match self.sanitize_phase(prompt).await {
            Ok((sanitized_text, path_mappings, padding_info)) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                info!(request = %request_id, elapsed_ms, "prompt approved");
                self.record(false, secrets_found, alerts_found, elapsed_ms);
                ProcessOutcome::Success {
                    sanitized_text,
                    path_mappings,
                    padding_info,
                    validation_info: report,
                    elapsed_ms,
                }
            }
            Err(fault) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                warn!(request = %request_id, error = %fault, "internal fault during sanitization");
                self.record(false, secrets_found, alerts_found, elapsed_ms);
                ProcessOutcome::Error {
                    message: if self.config.debug_errors {
                        fault.to_string()
                    } else {
                        "internal error".to_string()
                    },
                    elapsed_ms,
                }
            }
        }
    }

    /// Alias paths, then pad, in that order.
    async fn sanitize_phase(
        &self,
        prompt: &str,
    ) -> Result<(String, HashMap<String, String>, Option<PaddedPrompt>)> {
        let mut text = prompt.to_string();
        let mut path_mappings = HashMap::new();

        if let Some(aliaser) = &self.aliaser {
            // Lock scope ends before the padder's await point.
            let mut guard = aliaser
                .lock()
                .map_err(|_| GuardError::Internal("alias cache lock poisoned".to_string()))?;
            text = guard.sanitize(&text);
            path_mappings = guard.mappings();
        }

        let mut padding = None;
        if let Some(padder) = &self.padder {
            let padded = padder.pad(&text).await;
            text = padded.padded.clone();
            padding = Some(padded);
        }

        Ok((text, path_mappings, padding))
    }

    /// Length and phrase heuristics, active at strict/paranoid only.
    fn heuristic_checks(&self, prompt: &str) -> Option<BlockReason> {
        if !self.config.security_level.runs_heuristics() {
            return None;
        }

        let length = prompt.chars().count();
        if length > MAX_PROMPT_CHARS {
            return Some(BlockReason::OversizedPrompt {
                length,
                limit: MAX_PROMPT_CHARS,
            });
        }

        let lowered = prompt.to_lowercase();
        for phrase in SUSPICIOUS_PHRASES {
            if lowered.contains(phrase) {
                return Some(BlockReason::SuspiciousPhrase {
                    phrase: phrase.to_string(),
                });
            }
        }

        None
    }

    /// Record one finished request in the shared counters.
    fn record(&self, blocked: bool, secrets: usize, alerts: usize, elapsed_ms: f64) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.record(blocked, secrets, alerts, elapsed_ms);
    }

    /// Snapshot of the request counters.
    pub fn statistics(&self) -> GuardStats {
        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Reset the request counters.
    pub fn reset_statistics(&self) {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).reset();
    }

    /// Resolve an alias token back to its original path.
    pub fn resolve_alias(&self, token: &str) -> Option<String> {
        let aliaser = self.aliaser.as_ref()?;
        let guard = aliaser.lock().unwrap_or_else(|e| e.into_inner());
        guard.resolve(token).map(str::to_string)
    }

    /// Number of cached path aliases; 0 when aliasing is disabled.
    pub fn alias_cache_len(&self) -> usize {
        self.aliaser
            .as_ref()
            .map(|a| a.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    /// Drop all cached path aliases.
    pub fn clear_alias_cache(&self) {
        if let Some(aliaser) = &self.aliaser {
            aliaser.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }
}
