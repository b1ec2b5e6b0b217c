use thiserror::Error;

pub type MatchingResult<T> = Result<T, MatchingError>;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error("matcher failure: {0}")]
    MatcherFailure(String),
    #[error("unsatisfiable instance op: {0}")]
    UnsatisfiableOp(String),
}

impl From<berth_common::error::CommonError> for MatchingError {
    fn from(error: berth_common::error::CommonError) -> Self {
        use berth_common::error::CommonError;

        match error {
            CommonError::InvalidArgument(x) => MatchingError::InvalidArgument(x),
            CommonError::InternalError(x) => MatchingError::InternalError(x),
        }
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for MatchingError {
    fn from(error: tokio::sync::mpsc::error::SendError<T>) -> Self {
        MatchingError::InternalError(format!("failed to send message to actor: {error}"))
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for MatchingError {
    fn from(error: tokio::sync::oneshot::error::RecvError) -> Self {
        MatchingError::InternalError(format!("failed to receive actor reply: {error}"))
    }
}
