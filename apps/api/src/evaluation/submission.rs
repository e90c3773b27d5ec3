//! Submission intake — reads the multipart form and enforces the input rules
//! (non-empty job description, at least one resume) before any work starts.

use axum::extract::Multipart;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

pub const JOB_DESCRIPTION_FIELD: &str = "job_description";
pub const RESUMES_FIELD: &str = "resumes";

pub const INPUT_WARNING: &str =
    "Please upload at least one resume and provide a job description.";

/// One uploaded file, exactly as the browser sent it.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw form contents. May still be missing the job description or files.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub job_description: String,
    pub resumes: Vec<UploadedResume>,
}

/// A form that passed validation; the only thing the pipeline accepts.
#[derive(Debug)]
pub struct Submission {
    job_description: String,
    resumes: Vec<UploadedResume>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("a job description is required")]
    MissingJobDescription,

    #[error("at least one resume must be uploaded")]
    NoResumes,
}

impl SubmissionForm {
    /// Reads every multipart field. Unknown fields are drained and ignored,
    /// as are file inputs submitted without a file.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SubmissionForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                JOB_DESCRIPTION_FIELD => {
                    form.job_description = field.text().await?;
                }
                RESUMES_FIELD => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field.content_type().map(String::from);
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.resumes.push(UploadedResume {
                        file_name: if file_name.is_empty() {
                            format!("resume-{}", form.resumes.len() + 1)
                        } else {
                            file_name
                        },
                        content_type,
                        bytes,
                    });
                }
                other => {
                    debug!("Ignoring unexpected form field '{other}'");
                    field.bytes().await?;
                }
            }
        }

        Ok(form)
    }

    pub fn validate(self) -> Result<Submission, SubmissionError> {
        if self.job_description.trim().is_empty() {
            return Err(SubmissionError::MissingJobDescription);
        }
        if self.resumes.is_empty() {
            return Err(SubmissionError::NoResumes);
        }
        Ok(Submission {
            job_description: self.job_description,
            resumes: self.resumes,
        })
    }
}

impl Submission {
    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn resumes(&self) -> &[UploadedResume] {
        &self.resumes
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        AppError::Validation(format!("{err}. {INPUT_WARNING}"))
    }
}
