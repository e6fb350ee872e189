//! # Warden Sanitize - Leakage-Resistant Prompt Rewriting
//!
//! Sanitization layer for the Prompt Warden pipeline, applied only after
//! a prompt has passed validation:
//!
//! 1. **Path Aliasing** - filesystem-path-shaped substrings become
//!    deterministic `FILE_xxxxxxxx` tokens, hiding organizational
//!    structure while staying resolvable on the way back.
//!
//! 2. **Prompt Padding** - output is padded or truncated to a constant
//!    length, with optional non-blocking timing jitter, closing
//!    length- and timing-based side channels.
//!
//! ## Security Notes
//!
//! - Aliasing is pseudonymization over a 32-bit token space, not
//!   encryption; collisions are improbable, not impossible
//! - The alias cache grows for the aliaser's lifetime; callers monitor
//!   it via `stats()` and serialize access behind their own lock
//! - Padding defeats length inference only if every forwarded prompt
//!   goes through the same target length

pub mod alias;
pub mod padding;

pub use alias::{AliasEntry, AliaserStats, PathAliaser, SanitizeError, ALIAS_PREFIX};
pub use padding::{
    PaddedPrompt, PadderStats, PaddingStrategy, PromptPadder, DEFAULT_TARGET_LENGTH,
};
