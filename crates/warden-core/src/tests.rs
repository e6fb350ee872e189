//! Unit tests for warden-core.

#[test]
fn test_crate_structure() {
    // Smoke test - verifies the module structure compiles
    use crate::{BlockReason, GuardConfig, GuardStats, ProcessOutcome, SecurityLevel};

    let _config = GuardConfig::with_level(SecurityLevel::Strict);
    let _stats = GuardStats::default();
    let _reason = BlockReason::Secrets { count: 1 };
    let _outcome = ProcessOutcome::Error {
        message: "internal error".to_string(),
        elapsed_ms: 0.0,
    };
}
