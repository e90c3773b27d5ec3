use std::str::FromStr;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    /// Size of the per-submission worker pool. 1 = strictly sequential.
    pub eval_concurrency: usize,
    /// Resume text beyond this many characters is cut before prompting.
    pub max_resume_chars: usize,
    pub max_jd_chars: usize,
    pub max_upload_bytes: usize,
    /// Limit for a whole multipart request, all files included.
    pub max_request_bytes: usize,
    /// Accept non-PDF uploads (plain text is used as-is).
    pub accept_any_file_type: bool,
    pub show_email_column: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            eval_concurrency: parse_env::<usize>("EVAL_CONCURRENCY", 4)?.max(1),
            max_resume_chars: parse_env("MAX_RESUME_CHARS", 30_000)?,
            max_jd_chars: parse_env("MAX_JD_CHARS", 20_000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            max_request_bytes: parse_env("MAX_REQUEST_BYTES", 50 * 1024 * 1024)?,
            accept_any_file_type: parse_env("ACCEPT_ANY_FILE_TYPE", false)?,
            show_email_column: parse_env("SHOW_EMAIL_COLUMN", false)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Defaults for everything except the credential. Used by tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            google_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            llm_timeout_secs: 5,
            llm_max_retries: 1,
            eval_concurrency: 4,
            max_resume_chars: 30_000,
            max_jd_chars: 20_000,
            max_upload_bytes: 1024 * 1024,
            max_request_bytes: 4 * 1024 * 1024,
            accept_any_file_type: true,
            show_email_column: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
