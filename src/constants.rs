// Defaults, overridable from the environment (a `.env` file is loaded first in main).

use std::env;

lazy_static::lazy_static! {
    pub static ref GEMINI_MODEL: String = env::var("FITPLAN_MODEL").unwrap_or_else(|_| "gemini-2.5-flash-preview-05-20".to_string());
    pub static ref GEMINI_API_BASE: String = env::var("FITPLAN_API_BASE").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref TEMPLATES_DIR: String = env::var("FITPLAN_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("FITPLAN_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}

pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

pub const SESSION_COOKIE: &str = "fitplan_session";
pub const PAGE_TITLE: &str = "AI Health & Fitness Planner";
