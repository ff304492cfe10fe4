//! # rulebridge
//!
//! Mechanical migration core for legacy F5 iRule scripts: parse, estimate
//! coverage, emit AppShape++ through a curated mapping table, and assemble an
//! auditable migration report.
//!
//! rulebridge does not promise a complete or semantically verified
//! translation. It maps the constructs it knows, marks everything else as
//! unmapped, and tells you exactly how much of the script it covered.
//!
//! ## Pipeline
//!
//! Data flows strictly forward, one request at a time:
//!
//! ```text
//! source text -> parser -> analyzer -> generator -> verifier -> report
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use rulebridge::mapping::MappingTable;
//!
//! let report = rulebridge::translate(
//!     "when HTTP_REQUEST {\n    HTTP::header replace Host example.com\n}\n",
//!     MappingTable::builtin(),
//! );
//! assert_eq!(report.mapping.len(), 1);
//! assert_eq!(report.coverage, 1.0);
//! ```
//!
//! ## Mapping configuration
//!
//! The command-mapping table is external, versioned TOML; operators extend it
//! without touching the generator. See [`mapping::MappingTable::load`] for
//! the fallback behavior and [`mapping::TableHandle`] for hot reloads.

/// Coarse pre-generation coverage estimate (the capability analyzer).
pub mod analyzer;

/// Request orchestration: router, stage machine, and the composed
/// [`translate`] entry point.
pub mod flow;

/// AppShape++ emission driven by the mapping table.
pub mod generator;

/// Externally curated, versioned, hot-swappable command-mapping table.
pub mod mapping;

/// Line-oriented iRule scanner producing a [`types::SyntaxTree`] plus
/// diagnostics.
pub mod parser;

/// Question-answering collaborator boundary (interface only; retrieval lives
/// outside the core).
pub mod qa;

/// Migration report assembly, the terminal artifact of a request.
pub mod report;

/// Core data model shared by every stage.
pub mod types;

/// Post-generation verification pass.
pub mod verifier;

pub use flow::{Flow, Outcome, Request, translate};
pub use mapping::{MappingTable, TableHandle};
pub use report::MigrationReport;
pub use types::{CapabilityPlan, CapabilityStatus, Diagnostic, Severity, SyntaxTree};
