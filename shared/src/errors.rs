//! Shared error types for the pipeline board

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid project identifier: {input:?}")]
    InvalidProjectId { input: String },

    #[error("Unknown pipeline status: {input}")]
    UnknownStatus { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
