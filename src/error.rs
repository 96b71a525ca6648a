//! Error types for each layer of the planner.
//!
//! Classification and load failures are recovered where they happen and never
//! reach the caller as errors; these types exist so the inner steps can use `?`
//! and so write failures can propagate.

use std::time::Duration;
use thiserror::Error;

/// Failure of the key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("store connection lock poisoned")]
    Poisoned,

    #[error("store task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure reading or writing the persisted task collection.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored tasks under '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tasks could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure at any step of a classification request.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification is disabled")]
    Disabled,

    #[error("request to classification endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classification endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classification response contained no text")]
    EmptyContent,

    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("classification reply is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a pipeline intent. Only persistence errors surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A string that does not name a member of one of the task enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
