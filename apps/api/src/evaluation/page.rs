//! Server-rendered HTML for the interactive form and the results table.
//!
//! Templates live in `apps/api/templates/`; askama escapes every interpolated
//! value, file names and model output included.

use askama::Template;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::evaluation::submission::{JOB_DESCRIPTION_FIELD, RESUMES_FIELD};
use crate::evaluation::table::{ResultTable, CSV_FILE_NAME};

/// One table row as the template sees it.
pub struct RowView<'a> {
    pub failed: bool,
    pub cells: Vec<&'a str>,
}

/// Form page. `warning` is shown above the form when the last submit was rejected.
#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPage<'a> {
    pub warning: Option<&'a str>,
    pub job_description: &'a str,
    pub accept_any_file_type: bool,
    pub jd_field: &'static str,
    pub resumes_field: &'static str,
}

impl<'a> FormPage<'a> {
    pub fn new(
        warning: Option<&'a str>,
        job_description: &'a str,
        accept_any_file_type: bool,
    ) -> Self {
        Self {
            warning,
            job_description,
            accept_any_file_type,
            jd_field: JOB_DESCRIPTION_FIELD,
            resumes_field: RESUMES_FIELD,
        }
    }
}

/// Results page: the table, a CSV download link, and the form again.
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage<'a> {
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView<'a>>,
    pub csv_file_name: &'static str,
    /// CSV bytes for the `data:` URI download link.
    pub csv_base64: String,
    pub job_description: &'a str,
    pub accept_any_file_type: bool,
    pub jd_field: &'static str,
    pub resumes_field: &'static str,
}

impl<'a> ResultsPage<'a> {
    pub fn new(
        table: &'a ResultTable,
        csv: &str,
        job_description: &'a str,
        accept_any_file_type: bool,
    ) -> Self {
        let rows = table
            .rows
            .iter()
            .zip(table.cells())
            .map(|(row, cells)| RowView {
                failed: row.status.is_failure(),
                cells,
            })
            .collect();

        Self {
            columns: table.columns(),
            rows,
            csv_file_name: CSV_FILE_NAME,
            csv_base64: BASE64.encode(csv.as_bytes()),
            job_description,
            accept_any_file_type,
            jd_field: JOB_DESCRIPTION_FIELD,
            resumes_field: RESUMES_FIELD,
        }
    }
}
