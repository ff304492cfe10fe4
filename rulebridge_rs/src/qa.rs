//! Question-answering collaborator boundary.
//!
//! Retrieval and answer synthesis live outside the core. The flow only needs
//! this interface to route a question and carry the answer into the terminal
//! outcome.

use serde::{Deserialize, Serialize};

/// Default number of retrieval candidates a collaborator should consider.
pub const DEFAULT_TOP_K: usize = 6;

/// A question routed past the migration pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub top_k: usize,
}

impl QaRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            tags: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Pointer back into the document corpus the answer was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub title: String,
    /// Page, slide, or section within the document.
    pub locator: String,
}

/// Collaborator response carried into the request outcome unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaAnswer {
    pub answer_text: String,
    pub citations: Vec<Citation>,
}

/// The document-retrieval collaborator. Implementations are expected to have
/// finished all blocking work (index lookups, model calls) before returning;
/// the core pipeline itself never waits on external services.
pub trait QuestionAnswerer {
    fn answer(&self, request: &QaRequest) -> QaAnswer;
}
