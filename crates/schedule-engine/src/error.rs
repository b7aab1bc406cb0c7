//! Error types for parsing schedule-engine inputs.
//!
//! The engine operations themselves are total; only turning raw strings and
//! JSON into model values can fail.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid repeat rule: {0}")]
    InvalidRule(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
