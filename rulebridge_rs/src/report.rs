//! Migration report assembly.
//!
//! The only module that constructs a [`MigrationReport`]. Fields are set
//! exactly once; the result is the immutable terminal artifact of a
//! migration request.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::mapping::MappingTable;
use crate::types::{CapabilityPlan, CapabilityStatus, Diagnostic, TranslationRecord};

/// Machine-readable explanation attached to non-full migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: String,
    pub detail: String,
}

/// Provenance block: enough to reproduce and audit a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAudit {
    /// SHA-256 of the exact source bytes that were translated.
    pub source_sha256: String,
    /// RFC 3339 UTC timestamp of assembly.
    pub generated_at: String,
    pub tool_version: String,
    /// Version of the mapping table that actually ran (built-in or external).
    pub table_version: String,
}

/// Terminal artifact of a migration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub status: CapabilityStatus,
    /// Fraction of source commands resolved to a target command, 0.0 to 1.0.
    pub coverage: f64,
    pub diagnostics: Vec<Diagnostic>,
    /// One record per source command, in source traversal order.
    pub mapping: Vec<TranslationRecord>,
    /// Complement of the mapped set within `mapping`, order preserved.
    pub unmapped: Vec<TranslationRecord>,
    /// Generated target script.
    pub script: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
    pub audit: ReportAudit,
}

impl MigrationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of commands that resolved to a target.
    pub fn mapped_count(&self) -> usize {
        self.mapping.len() - self.unmapped.len()
    }
}

/// Merge the pipeline outputs into one report.
///
/// `status` is copied from the plan (the coarse pre-generation estimate);
/// `coverage` is computed from the exact translation records:
/// `mapped / max(total, 1)`, where the `max` guards the degenerate
/// empty-source case so a blocked report still carries a well-defined 0.0.
pub fn assemble(
    source: &str,
    plan: &CapabilityPlan,
    script: String,
    mapping: Vec<TranslationRecord>,
    unmapped: Vec<TranslationRecord>,
    diagnostics: Vec<Diagnostic>,
    table: &MappingTable,
) -> MigrationReport {
    let total = mapping.len();
    let mapped = total - unmapped.len();
    let coverage = mapped as f64 / total.max(1) as f64;

    MigrationReport {
        status: plan.status,
        coverage,
        reasons: derive_reasons(plan.status, &unmapped, total),
        audit: audit_for(source, table),
        diagnostics,
        mapping,
        unmapped,
        script,
    }
}

fn derive_reasons(
    status: CapabilityStatus,
    unmapped: &[TranslationRecord],
    total: usize,
) -> Vec<Reason> {
    let mut reasons = Vec::new();
    if !unmapped.is_empty() {
        reasons.push(Reason {
            code: "unmapped_commands".to_string(),
            detail: format!(
                "{} of {} commands have no target equivalent",
                unmapped.len(),
                total
            ),
        });
    }
    if status == CapabilityStatus::Blocked {
        reasons.push(if total == 0 {
            Reason {
                code: "empty_source".to_string(),
                detail: "no commands found in the source script".to_string(),
            }
        } else {
            Reason {
                code: "no_translatable_commands".to_string(),
                detail: format!("none of the {total} commands passed the coarse capability check"),
            }
        });
    }
    reasons
}

fn audit_for(source: &str, table: &MappingTable) -> ReportAudit {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    ReportAudit {
        source_sha256: format!("{:x}", hasher.finalize()),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        table_version: table.version.clone(),
    }
}
