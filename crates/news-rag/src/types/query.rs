//! Query request type

use serde::{Deserialize, Serialize};

use crate::config::MAX_RESULTS_LIMIT;
use crate::error::{Error, Result};

/// Minimum question length in characters
pub const MIN_QUESTION_CHARS: usize = 3;
/// Maximum question length in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Request to query the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
    /// Number of chunks to retrieve
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    5
}

impl QueryRequest {
    /// Create a request with the default result count
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            max_results: default_max_results(),
        }
    }

    /// Set the number of chunks to retrieve
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Reject out-of-range input before any backend is called
    pub fn validate(&self) -> Result<()> {
        let len = self.question.trim().chars().count();
        if len < MIN_QUESTION_CHARS || len > MAX_QUESTION_CHARS {
            return Err(Error::Validation(format!(
                "question must be between {} and {} characters",
                MIN_QUESTION_CHARS, MAX_QUESTION_CHARS
            )));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(Error::Validation(format!(
                "max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            )));
        }
        Ok(())
    }
}
