//! # Prompt Warden Core
//!
//! Unified security facade for request-time prompt screening. Decides,
//! within a strict latency budget, whether a prompt is safe to forward to
//! a downstream model service, and if so rewrites it to remove
//! organizational-structure and secret-material leakage.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       SECURITY WRAPPER                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   VALIDATE                         SANITIZE (if approved)       │
//! │  ┌──────────────┐ ┌────────────┐  ┌────────────┐ ┌───────────┐  │
//! │  │    SECRET    │ │  ENTROPY   │  │    PATH    │ │  PROMPT   │  │
//! │  │   DETECTOR   │ │  ANALYZER  │  │  ALIASER   │ │  PADDER   │  │
//! │  └──────┬───────┘ └─────┬──────┘  └─────┬──────┘ └─────┬─────┘  │
//! │         └─────────┬─────┘               └────────┬─────┘        │
//! │                   ▼                              ▼              │
//! │            blocking decision              sanitized output      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decision Precedence
//!
//! | Priority | Check | Levels |
//! |----------|-------|--------|
//! | 1 | High-confidence secrets | all |
//! | 2 | Entropy alerts | paranoid |
//! | 3 | Length / phrase heuristics | strict, paranoid |
//! | override | Processing deadline | all (fail-closed) |
//!
//! ## Security Notes
//!
//! - The pipeline is fail-closed: analysis that runs past the deadline
//!   blocks the request regardless of content
//! - A blocked verdict is terminal; retry policy belongs to the caller
//! - Every `process` call returns exactly one of success / blocked /
//!   error; internal faults never escape the boundary
//! - The transport receiving requests and the tool router consuming
//!   approved prompts live outside this workspace

mod config;
mod error;
mod stats;
mod verdict;
mod wrapper;

pub use config::{GuardConfig, SecurityLevel};
pub use error::{GuardError, Result};
pub use stats::GuardStats;
pub use verdict::{BlockReason, ProcessOutcome, ValidationReport};
pub use wrapper::SecurityWrapper;

// Re-export component types for convenience
pub use warden_detect::{
    EntropyAnalyzer, EntropySegment, SecretDetector, SecretKind, SecretMatch, Sensitivity,
};
pub use warden_sanitize::{
    AliasEntry, PaddedPrompt, PaddingStrategy, PathAliaser, PromptPadder, ALIAS_PREFIX,
};

#[cfg(test)]
mod tests;
