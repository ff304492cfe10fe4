//! Coarse pre-generation coverage estimate.
//!
//! Runs before code generation and deliberately does not consult the mapping
//! table: it only needs the table's coverage marker, not its exact targets.
//! The generator performs the exact prefix lookup later; the two checks are
//! intentionally separate algorithms.

use crate::types::{CapabilityPlan, CapabilityStatus, SyntaxTree};

/// Literal marker flagging commands already known to have no target
/// equivalent. Checked as a substring so annotated or rewritten names keep
/// tripping it.
pub const UNMAPPABLE_MARKER: &str = "unmapped";

/// Classify how much of `tree` can be translated mechanically.
///
/// Pure function; the result does not depend on iteration order.
pub fn analyze(tree: &SyntaxTree) -> CapabilityPlan {
    let mut total = 0usize;
    let mut mapped = 0usize;
    for event in &tree.events {
        for node in &event.body {
            total += 1;
            if !node.name.contains(UNMAPPABLE_MARKER) {
                mapped += 1;
            }
        }
    }
    CapabilityPlan {
        status: derive_status(mapped, total),
        mapped,
        total,
    }
}

/// Exact three-way classification from the two counts.
///
/// The trichotomy is exhaustive and mutually exclusive; the degenerate empty
/// tree (`total == 0`) counts as blocked.
pub fn derive_status(mapped: usize, total: usize) -> CapabilityStatus {
    if total > 0 && mapped == total {
        CapabilityStatus::Full
    } else if mapped > 0 {
        CapabilityStatus::Partial
    } else {
        CapabilityStatus::Blocked
    }
}
