//! Result Aggregator — one row per uploaded file, in upload order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::evaluation::extractor::ExtractionError;
use crate::evaluation::parser::{EvaluationResult, SENTINEL_MATCH};
use crate::llm_client::LlmError;

pub const CSV_FILE_NAME: &str = "ATS_Results.csv";

const COL_FILE: &str = "Resume File";
const COL_EMAIL: &str = "Email ID";
const COL_MATCH: &str = "JD Match";
const COL_KEYWORDS: &str = "Missing Keywords";
const COL_SUMMARY: &str = "Profile Summary";
const COL_STATUS: &str = "Status";

/// What happened to one file. Kept apart from the match field so a 0% match
/// never looks like a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Ok,
    /// Valid JSON, but at least one of the three keys was absent.
    Incomplete,
    ExtractionFailed,
    GenerationFailed,
    ParseFailed,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Ok => "ok",
            RowStatus::Incomplete => "incomplete",
            RowStatus::ExtractionFailed => "extraction_failed",
            RowStatus::GenerationFailed => "generation_failed",
            RowStatus::ParseFailed => "parse_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RowStatus::ExtractionFailed | RowStatus::GenerationFailed | RowStatus::ParseFailed
        )
    }
}

/// Result of running one file through extract → generate → parse.
/// The parse error itself is logged by the pipeline; the row only carries the
/// fixed sentinel.
#[derive(Debug)]
pub enum EvaluationOutcome {
    Evaluated(EvaluationResult),
    ExtractionFailed(ExtractionError),
    GenerationFailed(LlmError),
    ParseFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub file_name: String,
    /// `None` only when the Email ID column is off; `Some("")` when it is on
    /// and no address was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    pub match_percent: String,
    /// Pre-joined with ", ".
    pub missing_keywords: String,
    pub profile_summary: String,
    pub status: RowStatus,
}

impl ResultRow {
    /// Applies the sentinel fallback: every outcome becomes exactly one row.
    pub fn from_outcome(
        file_name: String,
        email_id: Option<String>,
        outcome: EvaluationOutcome,
    ) -> Self {
        let (result, status) = match outcome {
            EvaluationOutcome::Evaluated(result) => {
                let status = if result.is_complete() {
                    RowStatus::Ok
                } else {
                    RowStatus::Incomplete
                };
                (result, status)
            }
            EvaluationOutcome::ParseFailed => (EvaluationResult::sentinel(), RowStatus::ParseFailed),
            EvaluationOutcome::GenerationFailed(e) => (
                failure_record(format!("Error: {e}")),
                RowStatus::GenerationFailed,
            ),
            EvaluationOutcome::ExtractionFailed(e) => (
                failure_record(format!("Error reading resume: {e}")),
                RowStatus::ExtractionFailed,
            ),
        };

        ResultRow {
            file_name,
            email_id,
            match_percent: result.match_percent.unwrap_or_default(),
            missing_keywords: result.missing_keywords.unwrap_or_default().join(", "),
            profile_summary: result.profile_summary.unwrap_or_default(),
            status,
        }
    }

    fn cells(&self, show_email: bool) -> Vec<&str> {
        let mut cells = vec![self.file_name.as_str()];
        if show_email {
            cells.push(self.email_id.as_deref().unwrap_or(""));
        }
        cells.extend([
            self.match_percent.as_str(),
            self.missing_keywords.as_str(),
            self.profile_summary.as_str(),
            self.status.as_str(),
        ]);
        cells
    }
}

fn failure_record(summary: String) -> EvaluationResult {
    EvaluationResult {
        match_percent: Some(SENTINEL_MATCH.to_string()),
        missing_keywords: Some(Vec::new()),
        profile_summary: Some(summary),
    }
}

/// Ordered rows for one submission. Never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
    #[serde(skip)]
    pub show_email: bool,
}

impl ResultTable {
    pub fn new(show_email: bool) -> Self {
        Self {
            rows: Vec::new(),
            show_email,
        }
    }

    /// Appends a row, aligning its Email ID with the table's columns.
    pub fn push(&mut self, mut row: ResultRow) {
        row.email_id = if self.show_email {
            Some(row.email_id.unwrap_or_default())
        } else {
            None
        };
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.rows.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Column headers in display order; CSV uses the same order.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![COL_FILE];
        if self.show_email {
            columns.push(COL_EMAIL);
        }
        columns.extend([COL_MATCH, COL_KEYWORDS, COL_SUMMARY, COL_STATUS]);
        columns
    }

    /// Row cells in display order.
    pub fn cells(&self) -> impl Iterator<Item = Vec<&str>> {
        self.rows.iter().map(|row| row.cells(self.show_email))
    }

    /// Header row followed by one record per row, UTF-8, RFC 4180 quoting.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.columns())
            .context("Failed to write CSV header")?;
        for cells in self.cells() {
            writer
                .write_record(cells)
                .context("Failed to write CSV record")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}
