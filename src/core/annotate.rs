//! Optional post-analysis annotation pass.
//!
//! An [`Annotator`] receives each analyzed file read-only and may return
//! free-text documentation for it. The pass never touches structural fields
//! and a failing file never stops the others.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::{AnalysisResult, FileEntity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub documentation: Option<String>,
    pub summary: Option<String>,
    pub purpose: Option<String>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.documentation.is_none() && self.summary.is_none() && self.purpose.is_none()
    }
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotator unavailable: {0}")]
    Unavailable(String),
    #[error("annotation failed for {path}: {message}")]
    Failed { path: String, message: String },
    #[error("annotator panicked on {path}: {message}")]
    Panicked { path: String, message: String },
}

pub trait Annotator {
    fn annotate(&self, file: &FileEntity) -> Result<Annotation, AnnotationError>;

    fn name(&self) -> &str {
        "annotator"
    }
}

/// Outcome counts of one annotation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    pub annotated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<(String, String)>,
}

/// Runs `annotator` over the files of `result` in discovery order, at most
/// `limit` files when given.
pub fn annotate_files(
    result: &mut AnalysisResult,
    annotator: &dyn Annotator,
    limit: Option<usize>,
) -> AnnotationReport {
    let mut report = AnnotationReport::default();
    let budget = limit.unwrap_or(usize::MAX);

    let outcomes: Vec<(String, Result<Annotation, AnnotationError>)> = result
        .files
        .values()
        .take(budget)
        .map(|file| (file.path.clone(), annotate_one(annotator, file)))
        .collect();
    report.skipped = result.files.len() - outcomes.len();

    for (path, outcome) in outcomes {
        match outcome {
            Ok(annotation) if annotation.is_empty() => {
                debug!(file = %path, annotator = annotator.name(), "empty annotation");
                report.skipped += 1;
            }
            Ok(annotation) => {
                if let Some(file) = result.files.get_mut(&path) {
                    file.ai_documentation = annotation.documentation;
                    file.ai_summary = annotation.summary;
                    file.ai_purpose = annotation.purpose;
                    report.annotated += 1;
                }
            }
            Err(err) => {
                warn!(file = %path, annotator = annotator.name(), "annotation failed: {err}");
                report.failed += 1;
                report.failures.push((path, err.to_string()));
            }
        }
    }

    report
}

fn annotate_one(
    annotator: &dyn Annotator,
    file: &FileEntity,
) -> Result<Annotation, AnnotationError> {
    catch_unwind(AssertUnwindSafe(|| annotator.annotate(file))).unwrap_or_else(|payload| {
        Err(AnnotationError::Panicked {
            path: file.path.clone(),
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
