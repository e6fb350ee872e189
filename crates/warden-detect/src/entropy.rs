//! # Shannon Entropy Analysis
//!
//! Statistical detection of encoded or obfuscated secrets that no fixed
//! pattern knows about. Complements the catalog-based [`SecretDetector`]
//! by flagging substrings whose character distribution is too uniform to
//! be natural language.
//!
//! ## Shannon Entropy
//!
//! For a text with empirical character distribution P:
//!
//! ```text
//! H = -Σ P(c) log₂ P(c)
//! ```
//!
//! ### Entropy Benchmarks
//!
//! | Content Type | Typical Entropy (bits/char) |
//! |--------------|----------------------------|
//! | English prose | 3.5 - 4.2 |
//! | Source code | 4.2 - 4.8 |
//! | Base64 data | 5.9 - 6.0 |
//! | Random ASCII | 6.0 - 6.5 |
//!
//! ## Detection Strategy
//!
//! [`EntropyAnalyzer::find_segments`] runs three stages:
//!
//! 1. **Shape scan** - match four fixed shape patterns (base64-like, long
//!    hex, URL-safe base64, upper-alphanumeric runs) directly and keep any
//!    sufficiently long, suspicious hit.
//! 2. **Sliding window** - slide a fixed window over the text, skipping
//!    spans already covered; suspicious windows are extended over adjacent
//!    alphanumeric runs to natural token boundaries and re-checked.
//! 3. **Greedy dedup** - sort candidates by entropy descending and keep a
//!    candidate only if its textual overlap ratio with every kept one is
//!    at most 0.7. Greedy and order-dependent, not an exact maximum
//!    independent set.
//!
//! The scan is O(window_count × window_size) plus O(n²) in the number of
//! candidates; callers bound input size (padding targets stay ≤ 8192).
//!
//! ## References
//!
//! - Shannon, C.E. (1948) - "A Mathematical Theory of Communication"
//! - Jain et al. (2023) - "Baseline Defenses for Adversarial Attacks
//!   Against Aligned Language Models" <https://arxiv.org/abs/2309.00614>
//!
//! [`SecretDetector`]: crate::secrets::SecretDetector

use std::collections::{HashMap, HashSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{DetectError, EntropySegment, SegmentMetrics};

/// Default entropy threshold in bits per character.
///
/// Natural English rarely exceeds ~4.2 bits/char; base64 and random
/// material sit near 6. 4.5 balances detection against false positives
/// on dense technical text.
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 4.5;

/// Minimum segment length (characters) for a suspicion verdict.
///
/// Shorter strings do not provide enough samples for a meaningful
/// entropy estimate.
pub const MIN_SEGMENT_LENGTH: usize = 16;

/// Default sliding-window width in characters.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Maximum textual overlap ratio tolerated between retained segments.
const MAX_OVERLAP_RATIO: f64 = 0.7;

/// Calculate Shannon entropy of text in bits per character.
///
/// Returns 0.0 for empty input and for a single repeated character.
/// A uniformly distributed n-symbol alphabet yields exactly `log2(n)`.
///
/// # Example
///
/// ```rust
/// use warden_detect::entropy::shannon_entropy;
///
/// assert_eq!(shannon_entropy(""), 0.0);
/// assert_eq!(shannon_entropy("aaaa"), 0.0);
/// assert!((shannon_entropy("abab") - 1.0).abs() < 1e-9);
/// ```
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *freq.entry(c).or_insert(0) += 1;
        total += 1;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for &count in freq.values() {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }

    entropy
}

/// Configuration snapshot exposed for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerStats {
    /// Minimum segment length for suspicion.
    pub min_length: usize,
    /// Entropy threshold in bits per character.
    pub entropy_threshold: f64,
    /// Number of compiled shape patterns.
    pub shape_patterns: usize,
}

/// Entropy-based detector for encoded or random-looking substrings.
///
/// Holds compiled shape patterns and thresholds; all scan state is local
/// to each call, so a shared reference can serve concurrent requests.
pub struct EntropyAnalyzer {
    min_length: usize,
    entropy_threshold: f64,
    shapes: Vec<Regex>,
}

impl EntropyAnalyzer {
    /// Create an analyzer with the given entropy threshold and the
    /// default minimum segment length.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidPattern`] if a shape pattern fails
    /// to compile.
    pub fn new(entropy_threshold: f64) -> Result<Self, DetectError> {
        Self::with_params(MIN_SEGMENT_LENGTH, entropy_threshold)
    }

    /// Create an analyzer with explicit length and entropy thresholds.
    pub fn with_params(min_length: usize, entropy_threshold: f64) -> Result<Self, DetectError> {
        let sources = [
            r"[A-Za-z0-9+/]{20,}={0,2}", // base64-like
            r"[A-Fa-f0-9]{32,}",         // long hex
            r"[A-Za-z0-9_-]{20,}",       // URL-safe base64
            r"[A-Z0-9]{20,}",            // upper-alphanumeric run
        ];

        let mut shapes = Vec::with_capacity(sources.len());
        for source in sources {
            let re = Regex::new(source).map_err(|source_err| DetectError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })?;
            shapes.push(re);
        }

        Ok(Self {
            min_length,
            entropy_threshold,
            shapes,
        })
    }

    /// The configured entropy threshold in bits per character.
    pub fn entropy_threshold(&self) -> f64 {
        self.entropy_threshold
    }

    /// Analyze one segment: entropy, composition metrics, and the
    /// suspicion verdict.
    ///
    /// A segment is suspicious iff its entropy reaches the threshold,
    /// its length reaches the minimum, and the whole segment matches at
    /// least one shape pattern.
    pub fn analyze(&self, text: &str) -> EntropySegment {
        let entropy = shannon_entropy(text);
        let length = text.chars().count();

        EntropySegment {
            text: text.to_string(),
            entropy,
            length,
            is_suspicious: self.is_suspicious(text, entropy, length),
            metrics: segment_metrics(text),
        }
    }

    /// The suspicion gate alone, without allocating a full report.
    ///
    /// The sliding-window scan calls this for every window; full metrics
    /// are computed only for segments that pass.
    fn is_suspicious(&self, text: &str, entropy: f64, length: usize) -> bool {
        entropy >= self.entropy_threshold && length >= self.min_length && self.matches_shape(text)
    }

    fn gate(&self, text: &str) -> bool {
        self.is_suspicious(text, shannon_entropy(text), text.chars().count())
    }

    /// Find deduplicated suspicious segments in `text`.
    ///
    /// See the module docs for the three-stage algorithm. Returned
    /// segments pairwise overlap by at most 0.7 of the shorter text.
    pub fn find_segments(&self, text: &str, window_size: usize) -> Vec<EntropySegment> {
        let chars: Vec<char> = text.chars().collect();
        // Byte offset of each char, plus one-past-the-end.
        let mut byte_of: Vec<usize> = Vec::with_capacity(chars.len() + 1);
        for (idx, _) in text.char_indices() {
            byte_of.push(idx);
        }
        byte_of.push(text.len());

        let mut candidates: Vec<EntropySegment> = Vec::new();
        // Char-index spans of everything found so far; later windows
        // overlapping any of these are skipped.
        let mut found_spans: Vec<(usize, usize)> = Vec::new();

        // Stage 1: direct shape scan.
        for shape in &self.shapes {
            for m in shape.find_iter(text) {
                let segment = m.as_str();
                if segment.chars().count() < self.min_length {
                    continue;
                }
                if self.gate(segment) {
                    let start = char_index_of(&byte_of, m.start());
                    let end = char_index_of(&byte_of, m.end());
                    found_spans.push((start, end));
                    candidates.push(self.analyze(segment));
                }
            }
        }

        // Stage 2: sliding window over spans not already covered.
        if window_size > 0 && chars.len() >= window_size {
            for start in 0..=(chars.len() - window_size) {
                let end = start + window_size;
                if found_spans
                    .iter()
                    .any(|&(s, e)| spans_overlap(start, end, s, e))
                {
                    continue;
                }

                let window: String = chars[start..end].iter().collect();
                if !self.gate(&window) {
                    continue;
                }

                // Extend both ends over alphanumeric runs to reach
                // natural token boundaries, then re-check.
                let (ext_start, ext_end) = extend_over_alphanumeric(&chars, start, end);
                let extended: String = chars[ext_start..ext_end].iter().collect();
                if self.gate(&extended) {
                    found_spans.push((ext_start, ext_end));
                    candidates.push(self.analyze(&extended));
                }
            }
        }

        dedup_by_overlap(candidates)
    }

    /// Configuration snapshot for monitoring.
    pub fn stats(&self) -> AnalyzerStats {
        AnalyzerStats {
            min_length: self.min_length,
            entropy_threshold: self.entropy_threshold,
            shape_patterns: self.shapes.len(),
        }
    }

    /// True when a shape pattern matches the entire text.
    fn matches_shape(&self, text: &str) -> bool {
        self.shapes
            .iter()
            .any(|re| re.find(text).is_some_and(|m| m.start() == 0 && m.end() == text.len()))
    }
}

/// Compute composition metrics for a segment.
fn segment_metrics(text: &str) -> SegmentMetrics {
    let length = text.chars().count();
    if length == 0 {
        return SegmentMetrics {
            unique_chars: 0,
            char_diversity: 0.0,
            compression_ratio: 0.0,
            lowercase_ratio: 0.0,
            uppercase_ratio: 0.0,
            digit_ratio: 0.0,
            special_ratio: 0.0,
            base64_ratio: 0.0,
            hex_ratio: 0.0,
        };
    }

    let mut seen: HashSet<char> = HashSet::new();
    let (mut lower, mut upper, mut digit, mut special, mut b64, mut hex) = (0, 0, 0, 0, 0, 0);
    for c in text.chars() {
        seen.insert(c);
        if c.is_ascii_lowercase() {
            lower += 1;
        }
        if c.is_ascii_uppercase() {
            upper += 1;
        }
        if c.is_ascii_digit() {
            digit += 1;
        }
        if !c.is_ascii_alphanumeric() {
            special += 1;
        }
        if c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' {
            b64 += 1;
        }
        if c.is_ascii_hexdigit() {
            hex += 1;
        }
    }

    let len = length as f64;
    SegmentMetrics {
        unique_chars: seen.len(),
        char_diversity: seen.len() as f64 / len,
        compression_ratio: compression_ratio(text),
        lowercase_ratio: lower as f64 / len,
        uppercase_ratio: upper as f64 / len,
        digit_ratio: digit as f64 / len,
        special_ratio: special as f64 / len,
        base64_ratio: b64 as f64 / len,
        hex_ratio: hex as f64 / len,
    }
}

/// Deflate-based compression ratio: output bytes over input bytes.
///
/// Falls back to the unique-character ratio if the encoder fails.
fn compression_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(text.as_bytes()).is_ok() {
        if let Ok(compressed) = encoder.finish() {
            return compressed.len() as f64 / text.len() as f64;
        }
    }

    let unique: HashSet<char> = text.chars().collect();
    unique.len() as f64 / text.chars().count() as f64
}

/// Map a byte offset to its char index via the precomputed offset table.
fn char_index_of(byte_of: &[usize], byte: usize) -> usize {
    match byte_of.binary_search(&byte) {
        Ok(idx) => idx,
        Err(idx) => idx.saturating_sub(1),
    }
}

fn spans_overlap(start1: usize, end1: usize, start2: usize, end2: usize) -> bool {
    !(end1 <= start2 || end2 <= start1)
}

/// Widen `[start, end)` over adjacent alphanumeric characters.
fn extend_over_alphanumeric(chars: &[char], mut start: usize, mut end: usize) -> (usize, usize) {
    while start > 0 && chars[start - 1].is_alphanumeric() {
        start -= 1;
    }
    while end < chars.len() && chars[end].is_alphanumeric() {
        end += 1;
    }
    (start, end)
}

/// Longest-common-substring length over the shorter input's length.
fn overlap_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev = vec![0usize; b.len() + 1];
    let mut best = 0usize;

    for i in 1..=a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                cur[j] = prev[j - 1] + 1;
                best = best.max(cur[j]);
            }
        }
        prev = cur;
    }

    best as f64 / a.len().min(b.len()) as f64
}

/// Greedy maximal-priority selection: entropy-descending order, keep a
/// candidate unless it overlaps a kept one beyond [`MAX_OVERLAP_RATIO`].
fn dedup_by_overlap(mut candidates: Vec<EntropySegment>) -> Vec<EntropySegment> {
    candidates.sort_by(|a, b| b.entropy.partial_cmp(&a.entropy).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<EntropySegment> = Vec::new();
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|existing| overlap_ratio(&candidate.text, &existing.text) > MAX_OVERLAP_RATIO);
        if !overlaps {
            kept.push(candidate);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> EntropyAnalyzer {
        EntropyAnalyzer::new(DEFAULT_ENTROPY_THRESHOLD).unwrap()
    }

    #[test]
    fn test_entropy_empty() {
        assert_eq!(shannon_entropy(""), 0.0);
    }

    #[test]
    fn test_entropy_single_char() {
        assert_eq!(shannon_entropy("aaaaaaaa"), 0.0);
    }

    #[test]
    fn test_entropy_uniform_alphabet() {
        // n equally frequent symbols have entropy exactly log2(n).
        assert!((shannon_entropy("abababab") - 1.0).abs() < 1e-9);
        assert!((shannon_entropy("abcdabcd") - 2.0).abs() < 1e-9);
        assert!((shannon_entropy("abcdefghijklmnop") - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_normal_text() {
        let entropy = shannon_entropy("The quick brown fox jumps over the lazy dog");
        assert!(entropy < DEFAULT_ENTROPY_THRESHOLD, "prose entropy: {}", entropy);
    }

    #[test]
    fn test_analyze_base64_blob_suspicious() {
        let result = analyzer().analyze("kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZ");
        assert!(result.entropy >= DEFAULT_ENTROPY_THRESHOLD);
        assert!(result.is_suspicious);
        assert_eq!(result.length, 32);
    }

    #[test]
    fn test_analyze_short_blob_not_suspicious() {
        // High entropy but below the minimum length.
        let result = analyzer().analyze("kJ8vQ2xR9mN");
        assert!(!result.is_suspicious);
    }

    #[test]
    fn test_analyze_prose_not_suspicious() {
        let result = analyzer().analyze("please summarize the meeting notes");
        assert!(!result.is_suspicious);
    }

    #[test]
    fn test_shape_gate_requires_full_match() {
        // Entropy and length are fine, but embedded spaces break every shape.
        let result = analyzer().analyze("kJ8vQ2xR9m N4pL7wT3bY 6fD1sG5hU0");
        assert!(!result.is_suspicious);
    }

    #[test]
    fn test_metrics_composition() {
        let metrics = analyzer().analyze("abcABC123!").metrics;
        assert_eq!(metrics.unique_chars, 10);
        assert!((metrics.char_diversity - 1.0).abs() < 1e-9);
        assert!((metrics.lowercase_ratio - 0.3).abs() < 1e-9);
        assert!((metrics.uppercase_ratio - 0.3).abs() < 1e-9);
        assert!((metrics.digit_ratio - 0.3).abs() < 1e-9);
        assert!((metrics.special_ratio - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_compression_ratio_repetitive_vs_random() {
        let repetitive = compression_ratio(&"a".repeat(200));
        let random = compression_ratio("kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZcEiOqXnMvB84rW6tY1uI");
        assert!(repetitive < random, "{} vs {}", repetitive, random);
        assert!(repetitive < 0.2);
    }

    #[test]
    fn test_find_segments_detects_embedded_blob() {
        let text = "The deploy token is kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZ so rotate it.";
        let segments = analyzer().find_segments(text, DEFAULT_WINDOW_SIZE);
        assert!(!segments.is_empty());
        assert!(segments.iter().any(|s| s.text.contains("kJ8vQ2xR9mN4")));
    }

    #[test]
    fn test_find_segments_clean_prose() {
        let text = "This is completely normal English text without any encoded payloads.";
        let segments = analyzer().find_segments(text, DEFAULT_WINDOW_SIZE);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_find_segments_dedup_invariant() {
        // The blob matches both the base64-like and the URL-safe shapes;
        // dedup must retain a single segment per cluster.
        let text = "key kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZcEiOqXnMvB8r end";
        let segments = analyzer().find_segments(text, DEFAULT_WINDOW_SIZE);
        for (i, a) in segments.iter().enumerate() {
            for b in segments.iter().skip(i + 1) {
                assert!(
                    overlap_ratio(&a.text, &b.text) <= MAX_OVERLAP_RATIO,
                    "retained segments overlap: {:?} / {:?}",
                    a.text,
                    b.text
                );
            }
        }
    }

    #[test]
    fn test_dedup_keeps_highest_entropy() {
        let high = analyzer().analyze("kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZ");
        let low = analyzer().analyze("kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aa");
        let kept = dedup_by_overlap(vec![low.clone(), high.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, high.text);
    }

    #[test]
    fn test_overlap_ratio_identical_and_disjoint() {
        assert!((overlap_ratio("abcdef", "abcdef") - 1.0).abs() < 1e-9);
        assert_eq!(overlap_ratio("abc", "xyz"), 0.0);
        assert_eq!(overlap_ratio("", "abc"), 0.0);
    }

    #[test]
    fn test_extend_over_alphanumeric() {
        let chars: Vec<char> = "ab cdefgh ij".chars().collect();
        // A span inside "cdefgh" widens to the whole run, not past spaces.
        assert_eq!(extend_over_alphanumeric(&chars, 4, 6), (3, 9));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "résumé 日本語テキスト kJ8vQ2xR9mN4pL7wT3bY6fD1sG5hU0aZ fin";
        let segments = analyzer().find_segments(text, DEFAULT_WINDOW_SIZE);
        assert!(!segments.is_empty());
    }
}
