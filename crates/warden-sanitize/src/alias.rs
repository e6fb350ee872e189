//! # Deterministic Path Aliasing
//!
//! Replaces filesystem-path-shaped substrings with opaque, deterministic
//! tokens so forwarded prompts stop disclosing organizational structure.
//!
//! ## Algorithm
//!
//! ```text
//! normalized = logical_normalize(path)      (no filesystem access)
//! digest     = sha256(normalized)
//! token      = "FILE_" + hex(digest)[..8]
//! ```
//!
//! Normalization is purely textual: separators collapse to `/`, `.`
//! segments drop, `..` segments pop. Resolving against the real
//! filesystem would leak container-specific roots into the hash input,
//! so it is never done.
//!
//! ## Token Grammar
//!
//! `FILE_` followed by exactly 8 lowercase hex characters, 13 characters
//! total. Consumers may test membership with this exact grammar. The
//! 32-bit truncated hash space makes collisions unlikely, not impossible;
//! this is pseudonymization, not a cryptographic guarantee.
//!
//! ## Cache Behavior
//!
//! The bidirectional mapping lives for the aliaser's lifetime and grows
//! monotonically; there is no eviction. Deployments monitor growth via
//! [`PathAliaser::stats`] and reset with [`PathAliaser::clear`]. The
//! aliaser itself is not internally synchronized; the orchestrator owns
//! it behind a single documented lock.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Fixed prefix for alias tokens.
pub const ALIAS_PREFIX: &str = "FILE_";

/// Hex characters of the digest kept in the token.
const TOKEN_HEX_LEN: usize = 8;

/// Hex characters of the digest stored on the entry (8 bytes).
const DIGEST_HEX_LEN: usize = 16;

/// Errors raised while constructing the aliaser.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// A path-shape pattern failed to compile.
    #[error("invalid path pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// The compile error from the regex engine.
        #[source]
        source: regex::Error,
    },
}

/// One aliased path: original form, opaque token, truncated digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// The path as it appeared in the input.
    pub original: String,
    /// `FILE_` + first 8 hex chars of the normalized path's sha256.
    pub token: String,
    /// First 16 hex chars (8 bytes) of the same digest.
    pub digest: String,
}

/// Cache size snapshot for monitoring unbounded growth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AliaserStats {
    /// Number of cached aliases.
    pub entries: usize,
    /// Approximate bytes held by originals and tokens.
    pub approx_bytes: usize,
}

/// Deterministic path-to-token aliaser with a bidirectional cache.
pub struct PathAliaser {
    prefix: String,
    cache: HashMap<String, AliasEntry>,
    reverse: HashMap<String, String>,
    patterns: Vec<Regex>,
}

impl PathAliaser {
    /// Create an aliaser with the default `FILE_` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::InvalidPattern`] if a path-shape pattern
    /// fails to compile.
    pub fn new() -> Result<Self, SanitizeError> {
        Self::with_prefix(ALIAS_PREFIX)
    }

    /// Create an aliaser with a custom token prefix.
    pub fn with_prefix(prefix: &str) -> Result<Self, SanitizeError> {
        // Ordered path shapes: absolute, Windows drive, home-relative,
        // current-dir relative, parent-dir relative.
        let sources = [
            r"/[a-zA-Z0-9_\-./~]{3,}",
            r"[A-Za-z]:\\[a-zA-Z0-9_\-\\. ]{2,}",
            r"~[a-zA-Z0-9_\-./]{2,}",
            r"\./[a-zA-Z0-9_\-./]{2,}",
            r"\.\./[a-zA-Z0-9_\-./]{2,}",
        ];

        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            let re = Regex::new(source).map_err(|err| SanitizeError::InvalidPattern {
                pattern: source.to_string(),
                source: err,
            })?;
            patterns.push(re);
        }

        Ok(Self {
            prefix: prefix.to_string(),
            cache: HashMap::new(),
            reverse: HashMap::new(),
            patterns,
        })
    }

    /// Alias a path, returning the cached entry when one exists.
    ///
    /// Deterministic: the same input always yields the same token, within
    /// and across aliaser instances sharing a prefix.
    pub fn alias(&mut self, path: &str) -> AliasEntry {
        if let Some(entry) = self.cache.get(path) {
            return entry.clone();
        }

        let normalized = normalize_path(path);
        let digest_hex = hex_digest(&normalized);
        let token = format!("{}{}", self.prefix, &digest_hex[..TOKEN_HEX_LEN]);

        let entry = AliasEntry {
            original: path.to_string(),
            token: token.clone(),
            digest: digest_hex[..DIGEST_HEX_LEN].to_string(),
        };

        self.cache.insert(path.to_string(), entry.clone());
        self.reverse.insert(token, path.to_string());
        entry
    }

    /// Resolve a token back to its original path.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.reverse.get(token).map(String::as_str)
    }

    /// Replace every detected path in `text` with its alias token.
    ///
    /// Each pattern scans the *original* input; every occurrence of a
    /// matched path literal is then replaced in the working copy. An
    /// unrelated substring that happens to equal a detected path is
    /// rewritten too; callers accept this global-literal contract.
    pub fn sanitize(&mut self, text: &str) -> String {
        let mut sanitized = text.to_string();

        for i in 0..self.patterns.len() {
            let paths: Vec<String> = self.patterns[i]
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();
            for path in paths {
                let entry = self.alias(&path);
                sanitized = sanitized.replace(&path, &entry.token);
            }
        }

        sanitized
    }

    /// Token → original mapping accumulated so far.
    pub fn mappings(&self) -> HashMap<String, String> {
        self.reverse.clone()
    }

    /// Number of cached aliases.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when nothing has been aliased yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache growth snapshot for monitoring.
    pub fn stats(&self) -> AliaserStats {
        AliaserStats {
            entries: self.cache.len(),
            approx_bytes: self
                .cache
                .iter()
                .map(|(k, v)| k.len() + v.original.len() + v.token.len() + v.digest.len())
                .sum(),
        }
    }

    /// Drop all cached mappings (tests and explicit resets).
    pub fn clear(&mut self) {
        self.cache.clear();
        self.reverse.clear();
    }
}

/// Textual normalization: separators to `/`, drop `.`, pop on `..`.
///
/// Never consults the filesystem. A leading root (`/`, `~`, drive
/// letter) is preserved; `..` at the start of a relative path is kept
/// since there is nothing to pop.
fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let poppable = segments
                    .last()
                    .map(|last| *last != ".." && !last.ends_with(':') && *last != "~")
                    .unwrap_or(false);
                if poppable {
                    segments.pop();
                } else if !absolute {
                    // Nothing to pop in a relative path; keep the segment.
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn hex_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliaser() -> PathAliaser {
        PathAliaser::new().unwrap()
    }

    #[test]
    fn test_alias_deterministic() {
        let mut a = aliaser();
        let first = a.alias("/etc/passwd");
        let second = a.alias("/etc/passwd");
        assert_eq!(first, second);

        // Same token from an independent instance.
        let mut b = aliaser();
        assert_eq!(b.alias("/etc/passwd").token, first.token);
    }

    #[test]
    fn test_token_grammar() {
        let mut a = aliaser();
        let token = a.alias("/var/log/auth.log").token;
        assert_eq!(token.len(), 13);
        assert!(token.starts_with(ALIAS_PREFIX));
        assert!(token[ALIAS_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_distinct_paths_distinct_tokens() {
        let mut a = aliaser();
        let t1 = a.alias("/etc/passwd").token;
        let t2 = a.alias("/etc/shadow").token;
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_resolve_round_trip() {
        let mut a = aliaser();
        let entry = a.alias("~/projects/secret-repo/src/main.rs");
        assert_eq!(a.resolve(&entry.token), Some("~/projects/secret-repo/src/main.rs"));
        assert_eq!(a.resolve("FILE_00000000"), None);
    }

    #[test]
    fn test_normalization_equivalent_paths_share_token() {
        let mut a = aliaser();
        let plain = a.alias("/etc/passwd").token;
        let dotted = a.alias("/etc//./passwd").token;
        let parent = a.alias("/etc/x/../passwd").token;
        assert_eq!(plain, dotted);
        assert_eq!(plain, parent);
    }

    #[test]
    fn test_normalize_windows_separators() {
        assert_eq!(normalize_path(r"C:\Users\admin\notes.txt"), "C:/Users/admin/notes.txt");
    }

    #[test]
    fn test_normalize_keeps_leading_parent_segments() {
        assert_eq!(normalize_path("../shared/config.yaml"), "../shared/config.yaml");
        assert_eq!(normalize_path("./a/b/../c"), "a/c");
    }

    #[test]
    fn test_sanitize_replaces_paths() {
        let mut a = aliaser();
        let text = "read /etc/passwd and also ./local/notes.md please";
        let sanitized = a.sanitize(text);
        assert!(!sanitized.contains("/etc/passwd"));
        assert!(!sanitized.contains("./local/notes.md"));
        assert_eq!(sanitized.matches(ALIAS_PREFIX).count(), 2);
    }

    #[test]
    fn test_sanitize_replaces_every_occurrence_of_literal() {
        let mut a = aliaser();
        let text = "/etc/passwd then once more /etc/passwd";
        let sanitized = a.sanitize(text);
        assert!(!sanitized.contains("/etc/passwd"));
        let token = a.alias("/etc/passwd").token;
        assert_eq!(sanitized.matches(&token).count(), 2);
    }

    #[test]
    fn test_sanitize_leaves_plain_text_alone() {
        let mut a = aliaser();
        let text = "no paths here, just words";
        assert_eq!(a.sanitize(text), text);
        assert!(a.is_empty());
    }

    #[test]
    fn test_stats_and_clear() {
        let mut a = aliaser();
        a.alias("/etc/passwd");
        a.alias("/etc/shadow");
        let stats = a.stats();
        assert_eq!(stats.entries, 2);
        assert!(stats.approx_bytes > 0);

        a.clear();
        assert_eq!(a.len(), 0);
        assert_eq!(a.resolve("FILE_00000000"), None);
    }

    #[test]
    fn test_mappings_reflect_cache() {
        let mut a = aliaser();
        let entry = a.alias("/srv/data/export.csv");
        let mappings = a.mappings();
        assert_eq!(mappings.get(&entry.token).map(String::as_str), Some("/srv/data/export.csv"));
    }
}
