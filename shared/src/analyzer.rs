//! Orchestrates one analysis: model call, validation, enrichment.
//!
//! [`Analyzer::analyze`] never returns an error and never panics on bad model
//! output. Every failure becomes an [`AnalysisOutcome::Failure`] carrying a
//! fixed message; details only go to the log.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{error, info, warn};

use crate::catalog::{CategoryCatalog, IssueCategory};
use crate::enrich::{enrich, AnalysisRecord};
use crate::error::ResponseError;
use crate::model_client::{ImagePayload, ModelError, VisionModel};
use crate::prompt::build_prompt;
use crate::severity::Severity;
use crate::validator::validate_response;

pub const VALIDATION_FAILED_MESSAGE: &str = "Analysis response could not be validated.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed.";

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Upper bound for a single model call.
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub retries: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            timeout: Duration::from_secs(30),
            retries: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model answered but the answer was structurally unusable.
    Validation,
    /// The model could not be reached or refused the request.
    Upstream,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Success(AnalysisRecord),
    Failure { kind: FailureKind, message: &'static str },
}

impl AnalysisOutcome {
    fn failure(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Validation => VALIDATION_FAILED_MESSAGE,
            FailureKind::Upstream => ANALYSIS_FAILED_MESSAGE,
        };
        AnalysisOutcome::Failure { kind, message }
    }
}

#[derive(thiserror::Error, Debug)]
enum AnalysisError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

pub struct Analyzer {
    catalog: Arc<CategoryCatalog>,
    categories: BTreeSet<IssueCategory>,
    severities: Vec<Severity>,
    prompt: String,
    model: Arc<dyn VisionModel>,
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(catalog: Arc<CategoryCatalog>, model: Arc<dyn VisionModel>, options: AnalyzerOptions) -> Self {
        let categories = catalog.valid_categories();
        let severities = Severity::all();
        let prompt = build_prompt(&categories, &severities);
        Analyzer {
            catalog,
            categories,
            severities,
            prompt,
            model,
            options,
        }
    }

    pub async fn analyze(&self, image: &ImagePayload) -> AnalysisOutcome {
        match self.run(image).await {
            Ok(record) => {
                info!(
                    issue_type = %record.issue_type,
                    severity = %record.severity,
                    confidence = record.confidence,
                    "analysis complete"
                );
                AnalysisOutcome::Success(record)
            }
            Err(AnalysisError::Response(e)) => {
                warn!(%e, "model answer rejected");
                AnalysisOutcome::failure(FailureKind::Validation)
            }
            Err(AnalysisError::Model(e)) => {
                error!(%e, "model call failed");
                AnalysisOutcome::failure(FailureKind::Upstream)
            }
        }
    }

    async fn run(&self, image: &ImagePayload) -> Result<AnalysisRecord, AnalysisError> {
        let answer = self.call_with_retries(image).await?;
        let normalized = validate_response(&answer, &self.categories, &self.severities)?;
        Ok(enrich(normalized, &self.catalog))
    }

    async fn call_with_retries(&self, image: &ImagePayload) -> Result<String, ModelError> {
        let mut attempt = 0usize;
        loop {
            let result = match time::timeout(self.options.timeout, self.model.generate(&self.prompt, image)).await {
                Ok(r) => r,
                Err(_) => Err(ModelError::Timeout(self.options.timeout)),
            };
            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.options.retries => {
                    let wait = 100 * (1u64 << attempt.min(3));
                    warn!(%e, retry = attempt, wait_ms = wait, "model call failed, retrying");
                    time::sleep(Duration::from_millis(wait)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
