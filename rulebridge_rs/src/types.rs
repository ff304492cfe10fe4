//! Core data model shared by every pipeline stage.
//!
//! Everything here is created fresh per request and discarded once the
//! report is handed back. The mapping table (see [`crate::mapping`]) is the
//! only structure that outlives a request.

use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A parser observation tied to a 1-based source line. Append-only; never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity,
            line,
            message: message.into(),
        }
    }
}

/// One command extracted from an event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    /// Leading command token, possibly namespaced (`HTTP::header`).
    pub name: String,
    /// 1-based line the command was found on.
    pub source_line: usize,
    /// Trimmed source line the token was extracted from.
    pub raw_text: String,
}

/// A named trigger section (`when <EVENT>`) with its ordered command body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBlock {
    pub name: String,
    pub source_line: usize,
    pub body: Vec<CommandNode>,
}

/// Root of a parse result. Immutable after parsing completes; one tree per
/// translation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub events: Vec<EventBlock>,
    /// Newline-delimited line count of the raw input, including lines that
    /// produced no node.
    pub total_lines: usize,
}

impl SyntaxTree {
    /// Total number of command nodes across all event bodies.
    pub fn command_count(&self) -> usize {
        self.events.iter().map(|event| event.body.len()).sum()
    }
}

/// Overall translatability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityStatus {
    Full,
    Partial,
    Blocked,
}

impl CapabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityStatus::Full => "full",
            CapabilityStatus::Partial => "partial",
            CapabilityStatus::Blocked => "blocked",
        }
    }
}

/// Coarse coverage estimate computed before code generation.
///
/// `status` is a pure function of the two counts; see
/// [`crate::analyzer::derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPlan {
    pub status: CapabilityStatus,
    pub mapped: usize,
    pub total: usize,
}

/// Per-command translation outcome, in source traversal order.
///
/// `target_command == None` signals an unmapped command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub source_command: String,
    pub source_line: usize,
    pub target_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<String>,
}
