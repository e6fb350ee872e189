//! # Warden Detect - Secret and Entropy Detection
//!
//! Detection layer for the Prompt Warden pipeline. This crate decides
//! whether a prompt *contains* leakable material; it never rewrites text
//! beyond offset-safe redaction helpers.
//!
//! ## Components
//!
//! 1. **Secret Detection** - an ordered catalog of secret-shaped patterns
//!    (API keys, AWS and Stripe keys, JWTs, PEM headers, passwords,
//!    connection strings) with fixed heuristic confidence scores.
//!
//! 2. **Entropy Analysis** - Shannon-entropy scanning with a sliding
//!    window, token-boundary extension, and greedy overlap deduplication
//!    for encoded secrets no pattern knows about.
//!
//! ## Detection Coverage
//!
//! | Signal | Detector | Method |
//! |--------|----------|--------|
//! | Known secret shapes | `SecretDetector` | Regex catalog + confidence |
//! | JWT structure | `SecretDetector` | Base64 segment validation |
//! | Encoded/obfuscated blobs | `EntropyAnalyzer` | Shannon entropy + shapes |
//!
//! ## Security Notes
//!
//! - Confidence scores are fixed heuristics, not learned estimates
//! - An empty result does NOT prove the text is safe; combine with the
//!   orchestrator's level-gated checks
//! - Pattern compilation failures are constructor errors, never silent
//!   detector downgrades

pub mod entropy;
pub mod models;
pub mod secrets;

pub use entropy::{
    shannon_entropy, AnalyzerStats, EntropyAnalyzer, DEFAULT_ENTROPY_THRESHOLD,
    DEFAULT_WINDOW_SIZE, MIN_SEGMENT_LENGTH,
};
pub use models::{
    DetectError, EntropySegment, SecretKind, SecretMatch, SegmentMetrics, Sensitivity,
};
pub use secrets::{DetectorStats, SecretDetector};
