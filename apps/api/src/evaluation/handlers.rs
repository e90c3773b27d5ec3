//! Axum route handlers for the evaluation surface.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::page::{FormPage, ResultsPage};
use crate::evaluation::pipeline::{evaluate_submission, PipelineOptions};
use crate::evaluation::submission::{Submission, SubmissionForm, INPUT_WARNING};
use crate::evaluation::table::{ResultRow, ResultTable, CSV_FILE_NAME};
use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub submission_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<ResultRow>,
}

struct SubmissionReport {
    submission_id: Uuid,
    evaluated_at: DateTime<Utc>,
    table: ResultTable,
}

async fn run_submission(state: &AppState, submission: &Submission) -> SubmissionReport {
    let submission_id = Uuid::new_v4();
    let span = info_span!(
        "submission",
        id = %submission_id,
        files = submission.resumes().len()
    );
    let options = PipelineOptions::from(&state.config);

    let table = async {
        info!("Evaluating {} resume(s)", submission.resumes().len());
        evaluate_submission(submission, state.generator.clone(), &options).await
    }
    .instrument(span)
    .await;

    SubmissionReport {
        submission_id,
        evaluated_at: Utc::now(),
        table,
    }
}

async fn validated_submission(multipart: Multipart) -> Result<Submission, AppError> {
    let form = SubmissionForm::from_multipart(multipart).await?;
    form.validate().map_err(|e| {
        warn!("Submission rejected: {e}");
        AppError::from(e)
    })
}

// ────────────────────────────────────────────────────────────────────────────
// HTML handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = FormPage::new(None, "", state.config.accept_any_file_type);
    Ok(Html(page.render()?))
}

/// POST /evaluate
///
/// Missing input re-renders the form with a warning and runs nothing.
pub async fn handle_evaluate_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let accept_any = state.config.accept_any_file_type;
    let form = SubmissionForm::from_multipart(multipart).await?;
    let job_description = form.job_description.clone();

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(e) => {
            warn!("Submission rejected: {e}");
            let page = FormPage::new(Some(INPUT_WARNING), &job_description, accept_any);
            return Ok((StatusCode::BAD_REQUEST, Html(page.render()?)).into_response());
        }
    };

    let report = run_submission(&state, &submission).await;
    let csv = report.table.to_csv()?;

    let page = ResultsPage::new(&report.table, &csv, &job_description, accept_any);

    Ok(Html(page.render()?).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// API handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
pub async fn handle_create_evaluation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let submission = validated_submission(multipart).await?;
    let report = run_submission(&state, &submission).await;

    Ok(Json(EvaluationResponse {
        submission_id: report.submission_id,
        evaluated_at: report.evaluated_at,
        columns: report.table.columns(),
        rows: report.table.rows,
    }))
}

/// POST /api/v1/evaluations/csv
///
/// Same pipeline, returned as a CSV attachment named `ATS_Results.csv`.
pub async fn handle_export_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = validated_submission(multipart).await?;
    let report = run_submission(&state, &submission).await;
    let csv = report.table.to_csv()?;

    let disposition = format!("attachment; filename=\"{CSV_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
