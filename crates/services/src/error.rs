//! Shared error types for the services crate.

use thiserror::Error;

use review_core::composer::ComposeError;
use review_core::model::SessionSummaryError;

/// Errors emitted by remote collaborators (the external scheduler and quiz
/// services).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("remote service is not configured")]
    Disabled,
    #[error("remote request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ReviewSessionController` and the session workflows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no cards available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("{command} is not valid in state {state}")]
    InvalidTransition {
        command: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
