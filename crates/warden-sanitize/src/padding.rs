//! # Constant-Length Prompt Padding
//!
//! Pads (or truncates) prompts to a fixed length so downstream observers
//! cannot infer anything from length variation. Three filler strategies
//! trade blend-in quality against simplicity:
//!
//! - **Whitespace**: repeat `' '` to the target
//! - **SemanticNoise**: neutral discourse words, exact-length fill
//! - **Structured**: a comment-like template plus whitespace remainder
//!
//! ## Timing Jitter
//!
//! An optional sub-millisecond to low-millisecond random delay runs
//! before padding to blur timing differences between code paths. The
//! delay is a `tokio::time::sleep`, suspending only the current task;
//! under concurrent load a blocking sleep here would cut throughput
//! linearly with the jitter duration.
//!
//! Lengths are measured in characters throughout, matching how the
//! orchestrator's validation measures prompts.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default padding target in characters.
pub const DEFAULT_TARGET_LENGTH: usize = 4096;

/// Validation tolerance around the target, in characters.
const LENGTH_TOLERANCE: usize = 10;

/// Jitter bounds in microseconds (0.1 ms to 2 ms).
const JITTER_MIN_US: u64 = 100;
const JITTER_MAX_US: u64 = 2_000;

/// Neutral discourse vocabulary for semantic-noise filler.
const NOISE_VOCABULARY: [&str; 16] = [
    "furthermore",
    "additionally",
    "consequently",
    "nevertheless",
    "specifically",
    "particularly",
    "essentially",
    "fundamentally",
    "accordingly",
    "subsequently",
    "alternatively",
    "conversely",
    "meanwhile",
    "simultaneously",
    "ultimately",
    "precisely",
];

/// Comment-like templates for structured filler.
const STRUCTURED_TEMPLATES: [&str; 4] = [
    "\n\n--- Additional context markers ---",
    "\n\n<!-- Padding section -->",
    "\n\n/* Security padding */",
    "\n\n## Metadata section",
];

/// Filler generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingStrategy {
    /// Space repetition; cheapest, visibly artificial.
    Whitespace,
    /// Neutral vocabulary words; blends into prose.
    SemanticNoise,
    /// Comment-like template plus whitespace.
    Structured,
}

/// A padded prompt with its sizing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddedPrompt {
    /// The input text.
    pub original: String,
    /// The padded (or truncated) output.
    pub padded: String,
    /// Input length in characters.
    pub original_len: usize,
    /// Output length in characters.
    pub padded_len: usize,
    /// Characters of filler appended; 0 when truncated.
    pub added: usize,
    /// Strategy that produced the filler.
    pub strategy: PaddingStrategy,
}

/// Padder configuration snapshot for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadderStats {
    /// Target length in characters.
    pub target_length: usize,
    /// Active strategy.
    pub strategy: PaddingStrategy,
    /// Whether timing jitter runs before padding.
    pub timing_jitter: bool,
    /// Size of the semantic-noise vocabulary.
    pub vocabulary_size: usize,
}

/// Constant-length prompt padder.
pub struct PromptPadder {
    target_length: usize,
    strategy: PaddingStrategy,
    timing_jitter: bool,
}

impl PromptPadder {
    /// Create a padder for the given target length and strategy, with
    /// timing jitter enabled.
    pub fn new(target_length: usize, strategy: PaddingStrategy) -> Self {
        Self {
            target_length,
            strategy,
            timing_jitter: true,
        }
    }

    /// Enable or disable the pre-padding timing jitter.
    #[must_use]
    pub fn with_timing_jitter(mut self, enabled: bool) -> Self {
        self.timing_jitter = enabled;
        self
    }

    /// The configured target length in characters.
    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Pad or truncate `prompt` to exactly the target length.
    ///
    /// Applies the bounded timing jitter first when enabled; the jitter
    /// suspends only the calling task.
    pub async fn pad(&self, prompt: &str) -> PaddedPrompt {
        if self.timing_jitter {
            let jitter_us = rand::thread_rng().gen_range(JITTER_MIN_US..=JITTER_MAX_US);
            tokio::time::sleep(Duration::from_micros(jitter_us)).await;
        }

        self.build(prompt)
    }

    /// Deterministic padding core, no jitter.
    pub fn build(&self, prompt: &str) -> PaddedPrompt {
        let original_len = prompt.chars().count();

        let (padded, added) = if original_len >= self.target_length {
            let truncated: String = prompt.chars().take(self.target_length).collect();
            (truncated, 0)
        } else {
            let needed = self.target_length - original_len;
            let filler = self.filler(needed);
            (format!("{}{}", prompt, filler), needed)
        };

        PaddedPrompt {
            original: prompt.to_string(),
            padded_len: padded.chars().count(),
            padded,
            original_len,
            added,
            strategy: self.strategy,
        }
    }

    /// True iff the padded length is within tolerance of the target.
    pub fn validate(&self, padded: &PaddedPrompt) -> bool {
        padded.padded_len.abs_diff(self.target_length) <= LENGTH_TOLERANCE
    }

    /// Configuration snapshot for monitoring.
    pub fn stats(&self) -> PadderStats {
        PadderStats {
            target_length: self.target_length,
            strategy: self.strategy,
            timing_jitter: self.timing_jitter,
            vocabulary_size: NOISE_VOCABULARY.len(),
        }
    }

    /// Generate exactly `length` characters of filler.
    fn filler(&self, length: usize) -> String {
        match self.strategy {
            PaddingStrategy::Whitespace => " ".repeat(length),
            PaddingStrategy::SemanticNoise => semantic_noise(length),
            PaddingStrategy::Structured => structured_filler(length),
        }
    }
}

impl Default for PromptPadder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_LENGTH, PaddingStrategy::Whitespace)
    }
}

/// Neutral words after a fixed preamble, truncated to exact length.
fn semantic_noise(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut noise = String::from("\n\nAdditional context: ");

    while noise.chars().count() < length {
        let word = NOISE_VOCABULARY[rng.gen_range(0..NOISE_VOCABULARY.len())];
        noise.push_str(word);
        noise.push(' ');
    }

    noise.chars().take(length).collect()
}

/// One template, whitespace remainder, truncated to exact length.
fn structured_filler(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let template = STRUCTURED_TEMPLATES[rng.gen_range(0..STRUCTURED_TEMPLATES.len())];

    let template_len = template.chars().count();
    if template_len >= length {
        template.chars().take(length).collect()
    } else {
        format!("{}{}", template, " ".repeat(length - template_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_short_prompt_whitespace() {
        let padder = PromptPadder::new(10, PaddingStrategy::Whitespace);
        let result = padder.build("hello");
        assert_eq!(result.padded, "hello     ");
        assert_eq!(result.padded_len, 10);
        assert_eq!(result.added, 5);
        assert_eq!(result.original_len, 5);
    }

    #[test]
    fn test_truncate_long_prompt() {
        let padder = PromptPadder::new(5, PaddingStrategy::Whitespace);
        let result = padder.build("hello world");
        assert_eq!(result.padded, "hello");
        assert_eq!(result.padded_len, 5);
        assert_eq!(result.added, 0);
    }

    #[test]
    fn test_exact_length_untouched() {
        let padder = PromptPadder::new(5, PaddingStrategy::Whitespace);
        let result = padder.build("hello");
        assert_eq!(result.padded, "hello");
        assert_eq!(result.added, 0);
    }

    #[test]
    fn test_semantic_noise_exact_length() {
        let padder = PromptPadder::new(200, PaddingStrategy::SemanticNoise);
        let result = padder.build("summarize this");
        assert_eq!(result.padded_len, 200);
        assert!(result.padded.starts_with("summarize this"));
        assert!(result.padded.contains("Additional context:"));
    }

    #[test]
    fn test_semantic_noise_tiny_gap() {
        // Gap smaller than the preamble still fills to the exact target.
        let padder = PromptPadder::new(20, PaddingStrategy::SemanticNoise);
        let result = padder.build("0123456789012345");
        assert_eq!(result.padded_len, 20);
    }

    #[test]
    fn test_structured_exact_length() {
        let padder = PromptPadder::new(120, PaddingStrategy::Structured);
        let result = padder.build("check the logs");
        assert_eq!(result.padded_len, 120);
        assert!(result.padded.starts_with("check the logs\n\n"));
    }

    #[test]
    fn test_validate_tolerance() {
        let padder = PromptPadder::new(100, PaddingStrategy::Whitespace);
        let good = padder.build("short");
        assert!(padder.validate(&good));

        let off = PaddedPrompt {
            original: String::new(),
            padded: String::new(),
            original_len: 0,
            padded_len: 80,
            added: 0,
            strategy: PaddingStrategy::Whitespace,
        };
        assert!(!padder.validate(&off));
    }

    #[test]
    fn test_multibyte_prompt_counts_chars() {
        let padder = PromptPadder::new(10, PaddingStrategy::Whitespace);
        let result = padder.build("héllo");
        assert_eq!(result.original_len, 5);
        assert_eq!(result.padded_len, 10);
        assert_eq!(result.added, 5);
    }

    #[tokio::test]
    async fn test_pad_with_jitter_still_exact() {
        let padder = PromptPadder::new(64, PaddingStrategy::Whitespace);
        let result = padder.pad("jittered").await;
        assert_eq!(result.padded_len, 64);
        assert_eq!(result.added, 64 - 8);
    }

    #[test]
    fn test_stats_snapshot() {
        let padder =
            PromptPadder::new(2048, PaddingStrategy::SemanticNoise).with_timing_jitter(false);
        let stats = padder.stats();
        assert_eq!(stats.target_length, 2048);
        assert_eq!(stats.strategy, PaddingStrategy::SemanticNoise);
        assert!(!stats.timing_jitter);
        assert_eq!(stats.vocabulary_size, 16);
    }
}
