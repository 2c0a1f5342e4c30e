//! Session Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionContextError {
    #[error("Session id cannot be empty")]
    EmptySessionId,

    #[error("Candidate name cannot be empty")]
    EmptyCandidateName,

    #[error("Job position cannot be empty")]
    EmptyJobPosition,

    #[error("Question {0} is blank")]
    BlankQuestion(usize),
}
