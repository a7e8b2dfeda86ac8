// Endpoint and model defaults. Each can be overridden through the environment
// and again on the command line.

use std::env;

lazy_static::lazy_static! {
    pub static ref GROQ_BASE_URL: String = env::var("GROQ_BASE_URL").unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
    pub static ref GROQ_MODEL: String = env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());
    pub static ref NASA_FEED_URL: String = env::var("NASA_FEED_URL").unwrap_or_else(|_| "https://api.nasa.gov/neo/rest/v1/feed".to_string());
    pub static ref TEMPLATE_DIR: String = env::var("SPACE_EXPLORER_TEMPLATES").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("SPACE_EXPLORER_STATIC").unwrap_or_else(|_| "static".to_string());
}

pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Session retention. Idle sessions are dropped; when the store is full the
// least recently used one makes room for a new session.
pub const SESSION_IDLE_SECS: i64 = 60 * 60;
pub const MAX_SESSIONS: usize = 1000;

pub const PAGE_TITLE: &str = "🚀 AI Space Data Explorer";
pub const ABOUT_TEXT: &str = "This application provides AI-powered insights into space using NASA APIs and a fixed two-step AI pipeline.";
pub const BUILT_WITH_TEXT: &str = "💡 Built with axum, minijinja and reqwest.";
