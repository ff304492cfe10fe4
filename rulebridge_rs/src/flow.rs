//! Request orchestration.
//!
//! An explicit finite-state dispatcher: a tagged union of stage identifiers
//! plus a pure transition function. The router is the single conditional
//! branch; the migration path is strictly linear with no cycles or
//! skip-aheads and always terminates at report assembly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer;
use crate::generator::{self, GeneratedScript};
use crate::mapping::MappingTable;
use crate::parser::{self, ParseOutcome};
use crate::qa::{QaAnswer, QaRequest, QuestionAnswerer};
use crate::report::{self, MigrationReport};
use crate::types::{CapabilityPlan, TranslationRecord};
use crate::verifier;

/// Pipeline stages. `ReportAssembly` is the sole terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Router,
    QuestionAnswering,
    Parse,
    CapabilityAnalysis,
    CodeGeneration,
    Verification,
    ReportAssembly,
}

/// What the router decided a request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Question,
    Migrate,
    Status,
}

/// Incoming request. A question takes precedence over source text; a request
/// carrying neither yields a degenerate status outcome.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub question: Option<String>,
    pub source_text: Option<String>,
}

impl Request {
    pub fn migrate(source: impl Into<String>) -> Self {
        Self {
            question: None,
            source_text: Some(source.into()),
        }
    }

    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            source_text: None,
        }
    }
}

/// Degenerate report for requests carrying no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
    pub detail: String,
}

/// Terminal payload of a request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Migration(Box<MigrationReport>),
    Answer(QaAnswer),
    Status(StatusReport),
}

/// Classify a request. The only conditional dispatch in the machine.
pub fn route(request: &Request) -> Intent {
    if request.question.is_some() {
        Intent::Question
    } else if request.source_text.is_some() {
        Intent::Migrate
    } else {
        Intent::Status
    }
}

/// Pure transition function. Returns `None` once the terminal stage is
/// reached. Only `Router` consults the intent.
pub fn next_stage(stage: Stage, intent: Intent) -> Option<Stage> {
    match (stage, intent) {
        (Stage::Router, Intent::Question) => Some(Stage::QuestionAnswering),
        (Stage::Router, Intent::Migrate) => Some(Stage::Parse),
        (Stage::Router, Intent::Status) => Some(Stage::ReportAssembly),
        (Stage::QuestionAnswering, _) => Some(Stage::ReportAssembly),
        (Stage::Parse, _) => Some(Stage::CapabilityAnalysis),
        (Stage::CapabilityAnalysis, _) => Some(Stage::CodeGeneration),
        (Stage::CodeGeneration, _) => Some(Stage::Verification),
        (Stage::Verification, _) => Some(Stage::ReportAssembly),
        (Stage::ReportAssembly, _) => None,
    }
}

/// Run the full parse-to-report pipeline on `source` against `table`.
///
/// This is the composed core entry point; the [`Flow`] runner drives the
/// same stages through the state machine and produces an identical report.
pub fn translate(source: &str, table: &MappingTable) -> MigrationReport {
    let parsed = parser::parse(source);
    let plan = analyzer::analyze(&parsed.tree);
    let generated = generator::generate(&parsed.tree, table);
    let unmapped = verifier::verify(&generated.mapping);
    report::assemble(
        source,
        &plan,
        generated.script,
        generated.mapping,
        unmapped,
        parsed.diagnostics,
        table,
    )
}

/// Drives one request through the state machine.
///
/// Owns nothing but a table snapshot and an optional question-answering
/// collaborator; all other state is request-scoped and discarded when the
/// outcome is returned.
pub struct Flow<'a> {
    table: Arc<MappingTable>,
    answerer: Option<&'a dyn QuestionAnswerer>,
}

impl<'a> Flow<'a> {
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self {
            table,
            answerer: None,
        }
    }

    pub fn with_answerer(mut self, answerer: &'a dyn QuestionAnswerer) -> Self {
        self.answerer = Some(answerer);
        self
    }

    pub fn run(&self, request: &Request) -> Outcome {
        let intent = route(request);
        let mut stage = Stage::Router;

        // Request-scoped intermediates; dropped wholesale on return.
        let mut parsed: Option<ParseOutcome> = None;
        let mut plan: Option<CapabilityPlan> = None;
        let mut generated: Option<GeneratedScript> = None;
        let mut unmapped: Option<Vec<TranslationRecord>> = None;
        let mut answer: Option<QaAnswer> = None;

        while let Some(next) = next_stage(stage, intent) {
            stage = next;
            debug!(stage = ?stage, "entering stage");
            match stage {
                Stage::Router => unreachable!("router is the entry state"),
                Stage::QuestionAnswering => {
                    let question = request
                        .question
                        .clone()
                        .expect("question intent implies a question payload");
                    answer = self
                        .answerer
                        .map(|a| a.answer(&QaRequest::new(question)));
                }
                Stage::Parse => {
                    let source = request
                        .source_text
                        .as_deref()
                        .expect("migrate intent implies source text");
                    parsed = Some(parser::parse(source));
                }
                Stage::CapabilityAnalysis => {
                    let outcome = parsed.as_ref().expect("parse precedes analysis");
                    plan = Some(analyzer::analyze(&outcome.tree));
                }
                Stage::CodeGeneration => {
                    let outcome = parsed.as_ref().expect("parse precedes generation");
                    generated = Some(generator::generate(&outcome.tree, &self.table));
                }
                Stage::Verification => {
                    let script = generated.as_ref().expect("generation precedes verification");
                    unmapped = Some(verifier::verify(&script.mapping));
                }
                Stage::ReportAssembly => break,
            }
        }

        match intent {
            Intent::Question => match answer {
                Some(answer) => Outcome::Answer(answer),
                None => Outcome::Status(StatusReport {
                    status: "unavailable".to_string(),
                    detail: "no question-answering collaborator is configured".to_string(),
                }),
            },
            Intent::Migrate => {
                let parsed = parsed.expect("migration path ran parse");
                let plan = plan.expect("migration path ran analysis");
                let generated = generated.expect("migration path ran generation");
                let unmapped = unmapped.expect("migration path ran verification");
                let source = request
                    .source_text
                    .as_deref()
                    .expect("migrate intent implies source text");
                Outcome::Migration(Box::new(report::assemble(
                    source,
                    &plan,
                    generated.script,
                    generated.mapping,
                    unmapped,
                    parsed.diagnostics,
                    &self.table,
                )))
            }
            Intent::Status => Outcome::Status(StatusReport {
                status: "status".to_string(),
                detail: "request carried neither a question nor source text".to_string(),
            }),
        }
    }
}
