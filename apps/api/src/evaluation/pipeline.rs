//! Evaluation pipeline — orchestrates one submission.
//!
//! Flow per file: extract_text → build_prompt → generator.generate →
//!                parse_response → ResultRow::from_outcome.
//!
//! Files run on a bounded pool (`EVAL_CONCURRENCY`). `buffered` yields results
//! in input order, so the table is always in upload order. Each per-file future
//! owns its inputs (the upload, an `Arc` of the JD and of the generator); the
//! submission future must stay `Send` to run inside axum handlers.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::evaluation::extractor::{extract_text, find_email, ExtractorOptions};
use crate::evaluation::parser::parse_response;
use crate::evaluation::prompts::{build_prompt, PromptLimits};
use crate::evaluation::submission::{Submission, UploadedResume};
use crate::evaluation::table::{EvaluationOutcome, ResultRow, ResultTable};
use crate::llm_client::TextGenerator;

/// Everything the pipeline needs from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub extractor: ExtractorOptions,
    pub prompt: PromptLimits,
    pub concurrency: usize,
    pub show_email: bool,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            extractor: ExtractorOptions {
                accept_any_file_type: config.accept_any_file_type,
                max_upload_bytes: config.max_upload_bytes,
            },
            prompt: PromptLimits {
                max_resume_chars: config.max_resume_chars,
                max_jd_chars: config.max_jd_chars,
            },
            concurrency: config.eval_concurrency.max(1),
            show_email: config.show_email_column,
        }
    }
}

/// Runs every uploaded resume through the pipeline. Never fails: per-file
/// errors become sentinel rows, so the table has one row per upload.
pub async fn evaluate_submission(
    submission: &Submission,
    generator: Arc<dyn TextGenerator>,
    options: &PipelineOptions,
) -> ResultTable {
    let job_description: Arc<str> = Arc::from(submission.job_description());
    let options = *options;

    let mut rows = stream::iter(submission.resumes().to_vec())
        .map(move |resume| {
            let job_description = Arc::clone(&job_description);
            let generator = Arc::clone(&generator);
            let span = info_span!("resume", file = %resume.file_name);
            async move {
                evaluate_resume(&resume, &job_description, generator.as_ref(), &options).await
            }
            .instrument(span)
        })
        .buffered(options.concurrency.max(1));

    let mut table = ResultTable::new(options.show_email);
    while let Some(row) = rows.next().await {
        table.push(row);
    }

    info!(
        "Evaluated {} resume(s), {} failed",
        table.len(),
        table.failures()
    );
    table
}

async fn evaluate_resume(
    resume: &UploadedResume,
    job_description: &str,
    generator: &dyn TextGenerator,
    options: &PipelineOptions,
) -> ResultRow {
    let file_name = resume.file_name.clone();

    let resume_text = match extract_text(resume, options.extractor).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Extraction failed: {e}");
            return ResultRow::from_outcome(
                file_name,
                None,
                EvaluationOutcome::ExtractionFailed(e),
            );
        }
    };

    let email_id = if options.show_email {
        find_email(&resume_text)
    } else {
        None
    };

    let prompt = build_prompt(&resume_text, job_description, options.prompt);

    let raw = match generator.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Generation failed: {e}");
            return ResultRow::from_outcome(
                file_name,
                email_id,
                EvaluationOutcome::GenerationFailed(e),
            );
        }
    };

    let outcome = match parse_response(&raw) {
        Ok(result) => EvaluationOutcome::Evaluated(result),
        Err(e) => {
            warn!("Unparseable model response ({e}): {:.200}", raw);
            EvaluationOutcome::ParseFailed
        }
    };

    ResultRow::from_outcome(file_name, email_id, outcome)
}
