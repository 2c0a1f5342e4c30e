//! Feedback Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("No JSON object found in model output")]
    NoJsonObject,

    #[error("Feedback payload has unexpected shape: {0}")]
    InvalidShape(String),
}
