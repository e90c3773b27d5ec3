// ATS evaluation prompt template.
// The JSON shape requested here is what `parser::parse_response` expects back.

use tracing::warn;

pub const ATS_PROMPT_TEMPLATE: &str = r#"
Hey Act Like a skilled or very experienced ATS (Application Tracking System)
with a deep understanding of tech field, software engineering, data science, data analyst,
and big data engineering. Your task is to evaluate the resume based on the given job description.
You must consider the job market is very competitive and you should provide
the best assistance for improving resumes. Assign the percentage Matching based
on the JD and the missing keywords with high accuracy.
resume: {resume}
description: {jd}

I want the response in one single string having the structure as json only:
{"JD Match": "%", "MissingKeywords": [], "Profile Summary": ""}
"#;

/// Input caps applied before the texts are placed in the template.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub max_resume_chars: usize,
    pub max_jd_chars: usize,
}

/// Substitutes the resume and job description into the ATS template.
pub fn build_prompt(resume_text: &str, job_description: &str, limits: PromptLimits) -> String {
    let resume = truncate_chars(resume_text, limits.max_resume_chars, "resume");
    let jd = truncate_chars(job_description, limits.max_jd_chars, "job description");

    // Single pass so a literal "{jd}" inside the resume is never substituted.
    let mut prompt = String::with_capacity(ATS_PROMPT_TEMPLATE.len() + resume.len() + jd.len());
    let mut rest = ATS_PROMPT_TEMPLATE;
    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{resume}") {
            prompt.push_str(resume);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{jd}") {
            prompt.push_str(jd);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Cuts `text` to at most `max_chars` characters, on a char boundary.
fn truncate_chars<'a>(text: &'a str, max_chars: usize, what: &str) -> &'a str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            warn!(
                "Truncating {} from {} to {} characters",
                what,
                text.chars().count(),
                max_chars
            );
            &text[..byte_idx]
        }
        None => text,
    }
}
